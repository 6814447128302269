//! Formatting for sizes, proxy routes and plan summaries.

use console::Term;
use owo_colors::OwoColorize;
use weft_config::{PipelinePlan, PluginSpec, ProxyRoute, RouteKind};

use super::colors_enabled;

/// Format file size in human-readable format.
///
/// # Examples
///
/// ```
/// use weft_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// assert_eq!(format_size(18_000_000), "17.17 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// One line describing where a request path goes.
pub fn render_route(path: &str, route: Option<&ProxyRoute<'_>>) -> String {
    match route {
        Some(route) => {
            let kind = match route.kind {
                RouteKind::Forward => "forward",
                RouteKind::Tunnel => "tunnel",
            };
            format!(
                "{path} -> {} ({kind}, rule '{}')",
                route.rule.target_str(),
                route.rule.pattern()
            )
        }
        None => format!("{path} -> served locally (no proxy rule matches)"),
    }
}

/// Print a summary of a resolved plan to stderr.
pub fn print_plan_summary(plan: &PipelinePlan) {
    let width = (Term::stderr().size().1 as usize).min(80);
    let rule = "─".repeat(width);

    let title = format!("{} plan", plan.context.mode);
    if colors_enabled() {
        eprintln!("\n{}", title.bold().underline());
    } else {
        eprintln!("\n{title}");
    }
    eprintln!("{rule}");

    row("variant", &plan.context.artifact_variant().to_string());
    row("root", &plan.root.display().to_string());
    row("out_dir", &plan.out_dir.display().to_string());
    if let Some(port) = plan.server.port {
        row("server", &format!("port {port}, cors {}", plan.server.cors));
    }
    if let Some(port) = plan.preview.port {
        row("preview", &format!("port {port}"));
    }

    let chain: Vec<&str> = plan.plugins.iter().map(|p| p.kind().name()).collect();
    row("plugins", &chain.join(" -> "));

    for plugin in &plan.plugins {
        match plugin {
            PluginSpec::PwaInject(pwa) => {
                let sw = &pwa.service_worker;
                row("worker", &sw.source_path.display().to_string());
                row(
                    "precache",
                    &format!("up to {}", format_size(sw.max_cacheable_bytes)),
                );
                row("manifest", &pwa.manifest.name);
            }
            PluginSpec::Compression(options) => {
                row(
                    "compress",
                    &format!("{} (*{})", options.algorithm.name(), options.ext()),
                );
            }
            PluginSpec::CompilerBridge(_) => {}
        }
    }

    for proxy in plan.proxy.iter() {
        let marker = if proxy.upgrade() { "ws" } else { "http" };
        row(
            "proxy",
            &format!("{} -> {} [{marker}]", proxy.pattern(), proxy.target_str()),
        );
    }

    eprintln!("{rule}");
}

fn row(label: &str, value: &str) {
    if colors_enabled() {
        eprintln!("  {} {:<9} {}", "▸".blue(), label.dimmed(), value);
    } else {
        eprintln!("  ▸ {label:<9} {value}");
    }
}
