//! Installable web app manifest.
//!
//! [`ManifestSource`] is the shape read from configuration. [`compose`] validates it
//! and produces a [`ManifestDescriptor`], the only form the rest of the pipeline
//! accepts. Field names serialize with the keys browsers expect (`short_name`,
//! `start_url`, `display`, `type`, ...).

use std::ops::Deref;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, Result};

const FIELD: &str = "manifest";

/// Icon MIME types install flows understand.
const ICON_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/gif",
    "image/svg+xml",
    "image/avif",
    "image/x-icon",
    "image/vnd.microsoft.icon",
];

const ICON_PURPOSES: &[&str] = &["any", "maskable", "monochrome"];

/// Smallest edge (px) an icon needs to count as an install icon.
pub const MIN_INSTALL_ICON_PX: u32 = 144;

/// Stand-in origin relative manifest URLs are resolved against.
const REFERENCE_ORIGIN: &str = "https://app.invalid/";

const ENCTYPE_MULTIPART: &str = "multipart/form-data";
const ENCTYPE_URLENCODED: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    Fullscreen,
    #[default]
    Standalone,
    MinimalUi,
    Browser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconRef {
    pub src: String,

    /// `WxH` tokens separated by spaces, or `any`
    #[serde(default)]
    pub sizes: String,

    #[serde(rename = "type")]
    pub mime_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl IconRef {
    pub fn new(src: impl Into<String>, sizes: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            sizes: sizes.into(),
            mime_type: mime_type.into(),
            purpose: None,
        }
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    fn serves_any_purpose(&self) -> bool {
        match &self.purpose {
            None => true,
            Some(purpose) => purpose.split_whitespace().any(|token| token == "any"),
        }
    }

    fn is_install_icon(&self) -> bool {
        if !self.serves_any_purpose() {
            return false;
        }
        parse_sizes(&self.sizes).is_some_and(|sizes| {
            sizes.iter().any(|size| match size {
                IconSize::Any => true,
                IconSize::Fixed(w, h) => (*w).max(*h) >= MIN_INSTALL_ICON_PX,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutRef {
    pub name: String,

    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolHandler {
    pub protocol: String,

    /// Handler URL; `%s` is replaced with the activated link
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareTargetSpec {
    pub action: String,

    #[serde(default = "default_share_method")]
    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enctype: Option<String>,

    #[serde(default)]
    pub params: ShareTargetParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShareTargetParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<ShareTargetFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareTargetFile {
    pub name: String,

    /// MIME types (`image/*`) or extensions (`.csv`)
    pub accept: Vec<String>,
}

/// Manifest fields as configured, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSource {
    pub name: String,

    pub short_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    #[serde(default, rename = "display")]
    pub display_mode: DisplayMode,

    #[serde(default = "default_root_path")]
    pub scope: String,

    #[serde(default = "default_root_path")]
    pub start_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub categories: IndexSet<String>,

    #[serde(default)]
    pub icons: Vec<IconRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shortcuts: Vec<ShortcutRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocol_handlers: Vec<ProtocolHandler>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_target: Option<ShareTargetSpec>,
}

impl ManifestSource {
    pub fn new(name: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.into(),
            description: None,
            theme_color: None,
            background_color: None,
            display_mode: DisplayMode::default(),
            scope: default_root_path(),
            start_url: default_root_path(),
            lang: None,
            categories: IndexSet::new(),
            icons: Vec::new(),
            shortcuts: Vec::new(),
            protocol_handlers: Vec::new(),
            share_target: None,
        }
    }
}

/// A validated manifest. Obtainable only through [`compose`] or [`ManifestDescriptor::from_json`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ManifestSource", into = "ManifestSource")]
pub struct ManifestDescriptor(ManifestSource);

impl ManifestDescriptor {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            field: FIELD.to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Parse a serialized manifest, re-running every validation rule.
    pub fn from_json(json: &str) -> Result<Self> {
        let source: ManifestSource =
            serde_json::from_str(json).map_err(|e| ConfigError::InvalidValue {
                field: FIELD.to_string(),
                hint: Some(format!("Invalid manifest JSON: {e}")),
            })?;
        compose(source)
    }

    pub fn into_source(self) -> ManifestSource {
        self.0
    }
}

impl Deref for ManifestDescriptor {
    type Target = ManifestSource;

    fn deref(&self) -> &ManifestSource {
        &self.0
    }
}

impl TryFrom<ManifestSource> for ManifestDescriptor {
    type Error = ConfigError;

    fn try_from(source: ManifestSource) -> Result<Self> {
        compose(source)
    }
}

impl From<ManifestDescriptor> for ManifestSource {
    fn from(descriptor: ManifestDescriptor) -> Self {
        descriptor.0
    }
}

/// Validate configured manifest fields into a descriptor.
pub fn compose(source: ManifestSource) -> Result<ManifestDescriptor> {
    require_non_empty("name", &source.name)?;
    require_non_empty("short_name", &source.short_name)?;
    require_relative_url("scope", &source.scope)?;
    require_relative_url("start_url", &source.start_url)?;

    if !source.start_url.starts_with(source.scope.as_str()) {
        return Err(ConfigError::schema_with_hint(
            field("start_url"),
            format!(
                "'{}' is outside the manifest scope '{}'",
                source.start_url, source.scope
            ),
            "Make start_url a path under scope",
        ));
    }

    for (idx, category) in source.categories.iter().enumerate() {
        require_non_empty(&format!("categories[{idx}]"), category)?;
    }

    validate_icons(&source.icons)?;

    for (idx, shortcut) in source.shortcuts.iter().enumerate() {
        require_non_empty(&format!("shortcuts[{idx}].name"), &shortcut.name)?;
        require_relative_url(&format!("shortcuts[{idx}].url"), &shortcut.url)?;
    }

    for (idx, handler) in source.protocol_handlers.iter().enumerate() {
        validate_protocol_handler(idx, handler)?;
    }

    if let Some(share_target) = &source.share_target {
        validate_share_target(share_target)?;
    }

    tracing::debug!(
        name = %source.name,
        icons = source.icons.len(),
        shortcuts = source.shortcuts.len(),
        share_target = source.share_target.is_some(),
        "composed manifest"
    );

    Ok(ManifestDescriptor(source))
}

fn validate_icons(icons: &[IconRef]) -> Result<()> {
    for (idx, icon) in icons.iter().enumerate() {
        require_non_empty(&format!("icons[{idx}].src"), &icon.src)?;

        if parse_sizes(&icon.sizes).is_none() {
            return Err(ConfigError::schema_with_hint(
                field(&format!("icons[{idx}].sizes")),
                format!("'{}' is not a valid icon size list", icon.sizes),
                "Use space-separated WxH values such as \"192x192\", or \"any\" for vector icons",
            ));
        }

        if !ICON_MIME_TYPES.contains(&icon.mime_type.as_str()) {
            return Err(ConfigError::schema_with_hint(
                field(&format!("icons[{idx}].type")),
                format!("unrecognized icon type '{}'", icon.mime_type),
                format!("Use one of: {}", ICON_MIME_TYPES.join(", ")),
            ));
        }

        if let Some(purpose) = &icon.purpose {
            let tokens: Vec<&str> = purpose.split_whitespace().collect();
            if tokens.is_empty() || tokens.iter().any(|t| !ICON_PURPOSES.contains(t)) {
                return Err(ConfigError::schema_with_hint(
                    field(&format!("icons[{idx}].purpose")),
                    format!("invalid icon purpose '{purpose}'"),
                    "Combine any of: any, maskable, monochrome",
                ));
            }
        }
    }

    if !icons.iter().any(IconRef::is_install_icon) {
        return Err(ConfigError::schema_with_hint(
            field("icons"),
            format!(
                "no icon is usable for installation (purpose 'any' and at least {MIN_INSTALL_ICON_PX}px)"
            ),
            "Add a 192x192 or 512x512 PNG icon without a purpose or with purpose \"any\"",
        ));
    }

    Ok(())
}

fn validate_protocol_handler(idx: usize, handler: &ProtocolHandler) -> Result<()> {
    let protocol_field = format!("protocol_handlers[{idx}].protocol");
    require_non_empty(&protocol_field, &handler.protocol)?;
    let valid_scheme = handler
        .protocol
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '+');
    if !valid_scheme {
        return Err(ConfigError::schema(
            field(&protocol_field),
            format!("'{}' is not a lowercase URL scheme", handler.protocol),
        ));
    }

    let url_field = format!("protocol_handlers[{idx}].url");
    require_relative_url(&url_field, &handler.url)?;
    if !handler.url.contains("%s") {
        return Err(ConfigError::schema_with_hint(
            field(&url_field),
            format!("'{}' has no %s placeholder", handler.url),
            "The handler URL must contain %s where the activated link is substituted",
        ));
    }
    Ok(())
}

fn validate_share_target(target: &ShareTargetSpec) -> Result<()> {
    require_relative_url("share_target.action", &target.action)?;

    let method = target.method.to_ascii_uppercase();
    let enctype = target.enctype.as_deref();
    match method.as_str() {
        "GET" => {
            if let Some(enctype) = enctype {
                if enctype != ENCTYPE_URLENCODED {
                    return Err(ConfigError::schema(
                        field("share_target.enctype"),
                        format!("GET share targets only support '{ENCTYPE_URLENCODED}', not '{enctype}'"),
                    ));
                }
            }
        }
        "POST" => match enctype {
            Some(ENCTYPE_MULTIPART) | Some(ENCTYPE_URLENCODED) => {}
            Some(other) => {
                return Err(ConfigError::schema_with_hint(
                    field("share_target.enctype"),
                    format!("unsupported enctype '{other}'"),
                    format!("Use '{ENCTYPE_MULTIPART}' or '{ENCTYPE_URLENCODED}'"),
                ));
            }
            None => {
                return Err(ConfigError::schema_with_hint(
                    field("share_target.enctype"),
                    "POST share targets must declare an enctype",
                    format!("Use '{ENCTYPE_MULTIPART}' or '{ENCTYPE_URLENCODED}'"),
                ));
            }
        },
        _ => {
            return Err(ConfigError::schema_with_hint(
                field("share_target.method"),
                format!("unsupported method '{}'", target.method),
                "Share targets accept GET or POST",
            ));
        }
    }

    let files = &target.params.files;
    if !files.is_empty() && (method != "POST" || enctype != Some(ENCTYPE_MULTIPART)) {
        return Err(ConfigError::schema_with_hint(
            field("share_target.params.files"),
            "file parameters need a POST share target",
            format!("Set method = \"POST\" and enctype = \"{ENCTYPE_MULTIPART}\""),
        ));
    }

    for (idx, file) in files.iter().enumerate() {
        require_non_empty(&format!("share_target.params.files[{idx}].name"), &file.name)?;
        let accept_field = format!("share_target.params.files[{idx}].accept");
        if file.accept.is_empty() {
            return Err(ConfigError::schema_with_hint(
                field(&accept_field),
                "accept list is empty",
                "List at least one MIME type (\"image/png\") or extension (\".png\")",
            ));
        }
        if let Some(bad) = file.accept.iter().find(|entry| !is_accept_token(entry)) {
            return Err(ConfigError::schema(
                field(&accept_field),
                format!("'{bad}' is neither a MIME type nor a file extension"),
            ));
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IconSize {
    Any,
    Fixed(u32, u32),
}

/// `None` when the list is empty or any token is malformed.
fn parse_sizes(sizes: &str) -> Option<Vec<IconSize>> {
    let parsed = sizes
        .split_whitespace()
        .map(|token| {
            if token.eq_ignore_ascii_case("any") {
                return Some(IconSize::Any);
            }
            let (w, h) = token.split_once(['x', 'X'])?;
            let w: u32 = w.parse().ok()?;
            let h: u32 = h.parse().ok()?;
            (w > 0 && h > 0).then_some(IconSize::Fixed(w, h))
        })
        .collect::<Option<Vec<_>>>()?;
    (!parsed.is_empty()).then_some(parsed)
}

fn is_accept_token(token: &str) -> bool {
    if let Some(ext) = token.strip_prefix('.') {
        return !ext.is_empty()
            && !ext.starts_with('.')
            && !ext.ends_with('.')
            && ext.chars().all(|c| c.is_ascii_alphanumeric() || c == '.');
    }
    match token.split_once('/') {
        Some((kind, sub)) => {
            let valid = |part: &str| {
                !part.is_empty()
                    && part
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || "*+-.".contains(c))
            };
            valid(kind) && valid(sub)
        }
        None => false,
    }
}

fn require_non_empty(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::schema(field(name), "cannot be empty"));
    }
    Ok(())
}

/// Same-origin relative path: rooted, not protocol-relative, and resolving to
/// the page's own origin. Queries and fragments may carry anything.
fn is_same_origin_path(value: &str) -> bool {
    if !value.starts_with('/') || value.starts_with("//") {
        return false;
    }
    let Ok(base) = Url::parse(REFERENCE_ORIGIN) else {
        return false;
    };
    base.join(value)
        .is_ok_and(|joined| joined.origin() == base.origin())
}

fn require_relative_url(name: &str, value: &str) -> Result<()> {
    if !is_same_origin_path(value) {
        return Err(ConfigError::schema_with_hint(
            field(name),
            format!("'{value}' is not a same-origin relative path"),
            "Use a path starting with a single '/'",
        ));
    }
    Ok(())
}

fn field(name: &str) -> String {
    format!("{FIELD}.{name}")
}

fn default_root_path() -> String {
    "/".into()
}

fn default_share_method() -> String {
    "GET".into()
}
