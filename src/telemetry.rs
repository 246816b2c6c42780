//! Tracing setup for the server and the content subcommands.
//!
//! LOG_LEVEL takes a full `EnvFilter` directive string and replaces the
//! default below. LOG_FORMAT=json switches to one JSON object per event.

use tracing_subscriber::EnvFilter;

/// Log targets this crate emits under, all shown at debug by default.
const CRATE_TARGETS: [&str; 5] = ["picmatch_backend", "round", "catalog", "score", "content"];

/// Dependencies worth hearing from, kept at info.
const DEPENDENCY_TARGETS: [&str; 2] = ["tower_http", "axum"];

fn default_directives() -> String {
    let crate_level = CRATE_TARGETS.iter().map(|t| format!("{t}=debug"));
    let dep_level = DEPENDENCY_TARGETS.iter().map(|t| format!("{t}=info"));
    std::iter::once("info".to_string())
        .chain(crate_level)
        .chain(dep_level)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(default_directives()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
