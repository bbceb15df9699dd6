//! Shared CLI definitions for moviescope.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser};
use std::path::PathBuf;

/// Command-line arguments for moviescope
#[derive(Clone, Parser, Debug, Default)]
#[command(
    name = "moviescope",
    version,
    about = "IMDB vs. Rotten Tomatoes rating explorer",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Address to bind the web server to (overrides config [server] host)
    #[arg(long = "host", value_name = "HOST")]
    pub host: Option<String>,

    /// Port to bind the web server to (overrides config [server] port)
    #[arg(long = "port", short = 'p', value_name = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the record store (overrides config [store] base_url). Example: https://api.easybase.io
    #[arg(long = "store-url", value_name = "URL")]
    pub store_url: Option<String>,

    /// Record store collection (integration) id to read movies from
    #[arg(long = "collection", value_name = "ID")]
    pub collection: Option<String>,

    /// Opaque authentication token passed through to the record store
    #[arg(long = "auth-token", value_name = "TOKEN")]
    pub auth_token: Option<String>,

    /// Maximum number of records to fetch per page load (default: 2000)
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<usize>,

    /// Enable debug logging (request bodies, record counts)
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Generate default configuration file at ~/.config/moviescope/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,

    /// Fetch once, render the filtered chart to this SVG file and exit instead of serving
    #[arg(long = "export", value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Only export movies with more than this many IMDB votes (default: 10)
    #[arg(long = "min-reviews", value_name = "N", requires = "export")]
    pub min_reviews: Option<i64>,

    /// First release year to export, inclusive (default: 1970)
    #[arg(long = "min-year", value_name = "YEAR", requires = "export")]
    pub min_year: Option<i64>,

    /// Last release year to export, inclusive (default: 2021)
    #[arg(long = "max-year", value_name = "YEAR", requires = "export")]
    pub max_year: Option<i64>,

    /// Genre to export, or "All" (default: All)
    #[arg(long = "genre", value_name = "GENRE", requires = "export")]
    pub genre: Option<String>,
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Render command-line options as markdown.
///
/// Used by the gen_docs binary; output is written to stdout and then
/// to `docs/reference/command-line-options.md` by the docs build process.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let mut parts = Vec::new();
        if let Some(s) = arg.get_short() {
            parts.push(format!("-{s}"));
        }
        if let Some(l) = arg.get_long() {
            parts.push(format!("--{l}"));
        }
        let op = parts.join(", ");
        let placeholder: String = if arg.get_action().takes_values() {
            arg.get_value_names()
                .map(|names| {
                    names
                        .iter()
                        .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default()
        } else {
            String::new()
        };
        let option_str = if placeholder.is_empty() {
            op
        } else {
            format!("{op} {placeholder}")
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}
