//! Development proxy rules.
//!
//! A rule maps a path pattern to an upstream target. Patterns starting with `^`
//! are regular expressions; everything else is a literal path prefix. The table
//! keeps declaration order so the request router can take the first match.

use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, Result};

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ws", "wss"];

/// Proxy rule as written in `weft.toml` (`[[proxy]]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProxyRuleConfig {
    pub pattern: String,

    pub target: String,

    /// Tunnel transport-upgrade (WebSocket) requests instead of buffering them
    #[serde(default, alias = "ws")]
    pub upgrade: bool,
}

impl ProxyRuleConfig {
    pub fn new(pattern: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            target: target.into(),
            upgrade: false,
        }
    }

    pub fn upgrade(mut self, upgrade: bool) -> Self {
        self.upgrade = upgrade;
        self
    }
}

#[derive(Debug, Clone)]
pub enum PathPattern {
    Prefix(String),
    Regex(Regex),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern.starts_with('^') {
            let regex = Regex::new(pattern).map_err(|err| ConfigError::InvalidProxyPattern {
                pattern: pattern.to_string(),
                message: err.to_string(),
            })?;
            return Ok(PathPattern::Regex(regex));
        }

        if !pattern.starts_with('/') {
            return Err(ConfigError::InvalidProxyPattern {
                pattern: pattern.to_string(),
                message: "literal patterns must start with '/' (prefix a regex with '^')"
                    .to_string(),
            });
        }

        if pattern.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidProxyPattern {
                pattern: pattern.to_string(),
                message: "literal patterns cannot contain whitespace".to_string(),
            });
        }

        Ok(PathPattern::Prefix(pattern.to_string()))
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Prefix(prefix) => path.starts_with(prefix.as_str()),
            PathPattern::Regex(regex) => regex.is_match(path),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProxyRule {
    pattern: PathPattern,
    target: Url,
    config: ProxyRuleConfig,
}

impl ProxyRule {
    pub fn from_config(config: ProxyRuleConfig) -> Result<Self> {
        let pattern = PathPattern::parse(&config.pattern)?;
        let target = parse_target(&config.pattern, &config.target)?;
        Ok(Self {
            pattern,
            target,
            config,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.config.pattern
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Target exactly as configured.
    pub fn target_str(&self) -> &str {
        &self.config.target
    }

    pub fn upgrade(&self) -> bool {
        self.config.upgrade
    }

    pub fn matches(&self, path: &str) -> bool {
        self.pattern.matches(path)
    }
}

fn parse_target(pattern: &str, target: &str) -> Result<Url> {
    let invalid = |message: String| ConfigError::InvalidProxyTarget {
        pattern: pattern.to_string(),
        target: target.to_string(),
        message,
    };

    let url = Url::parse(target).map_err(|err| invalid(err.to_string()))?;
    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        return Err(invalid(format!(
            "scheme '{}' is not one of {}",
            url.scheme(),
            ALLOWED_SCHEMES.join(", ")
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("target has no host".to_string()));
    }
    Ok(url)
}

/// What the router should do with a matched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Plain HTTP forwarding
    Forward,
    /// Bidirectional byte stream after a transport upgrade
    Tunnel,
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteKind::Forward => f.write_str("forward"),
            RouteKind::Tunnel => f.write_str("tunnel"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProxyRoute<'a> {
    pub rule: &'a ProxyRule,
    pub kind: RouteKind,
}

impl ProxyRoute<'_> {
    pub fn target(&self) -> &Url {
        self.rule.target()
    }
}

/// Ordered, read-only proxy table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<ProxyRuleConfig>", into = "Vec<ProxyRuleConfig>")]
pub struct ProxyTable {
    rules: IndexMap<String, ProxyRule>,
}

impl ProxyTable {
    /// Build a table from rules in declaration order.
    ///
    /// Fails on the first invalid pattern or target, or on a repeated pattern.
    pub fn build(rules: impl IntoIterator<Item = ProxyRuleConfig>) -> Result<Self> {
        let mut table = IndexMap::new();
        for config in rules {
            if table.contains_key(&config.pattern) {
                return Err(ConfigError::DuplicateProxyPattern(config.pattern));
            }
            let rule = ProxyRule::from_config(config)?;
            tracing::debug!(
                pattern = rule.pattern(),
                target = rule.target_str(),
                upgrade = rule.upgrade(),
                "proxy rule"
            );
            table.insert(rule.pattern().to_string(), rule);
        }
        Ok(Self { rules: table })
    }

    /// First rule matching `path`, in declaration order.
    pub fn resolve(&self, path: &str) -> Option<ProxyRoute<'_>> {
        self.rules
            .values()
            .find(|rule| rule.matches(path))
            .map(|rule| ProxyRoute {
                rule,
                kind: if rule.upgrade() {
                    RouteKind::Tunnel
                } else {
                    RouteKind::Forward
                },
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProxyRule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl TryFrom<Vec<ProxyRuleConfig>> for ProxyTable {
    type Error = ConfigError;

    fn try_from(rules: Vec<ProxyRuleConfig>) -> Result<Self> {
        Self::build(rules)
    }
}

impl From<ProxyTable> for Vec<ProxyRuleConfig> {
    fn from(table: ProxyTable) -> Self {
        table.rules.into_values().map(|rule| rule.config).collect()
    }
}
