//! Starter files written by `weft init`.

/// Starter `weft.toml`. Every value here resolves for both modes.
pub const STARTER_CONFIG: &str = r##"# weft.toml
root = "./web"
out_dir = "./dist"

[server]
cors = true

[preview]
port = 8090

[compiler]
cwd = "."
project_id = "webapp"
uri_prefix = "compiled"

[service_worker]
# "{variant}" becomes "fastopt" for serve and "opt" for build
source_template = "../serviceworker/target/serviceworker-{variant}"
filename = "sw.js"
strategy = "inject-manifest"
max_cacheable_bytes = 18000000
dev_enabled = true

[compression]
algorithm = "gzip"

[manifest]
name = "My App"
short_name = "App"
description = "An installable web app"
theme_color = "#6200ee"
background_color = "#018786"
display = "standalone"
scope = "/"
start_url = "/"
lang = "en"
categories = ["utilities"]

[[manifest.icons]]
src = "/icons/icon-72x72.png"
sizes = "72x72"
type = "image/png"

[[manifest.icons]]
src = "/icons/icon-144x144.png"
sizes = "144x144"
type = "image/png"
purpose = "any maskable"

[[manifest.icons]]
src = "/icons/icon-512x512.png"
sizes = "512x512"
type = "image/png"

# Rules are tried in order; the first match wins.
[[proxy]]
pattern = "/api"
target = "http://localhost:8080"

[[proxy]]
pattern = "^/ws"
target = "ws://localhost:8080"
upgrade = true

# `weft build --profile lean` lowers the precache ceiling.
[profiles.lean.service_worker]
max_cacheable_bytes = 12000000
"##;
