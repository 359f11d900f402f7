use crate::config::LogLevel;
use crate::models::SearchType;
use clap::Parser;
use std::path::PathBuf;

/// Search a social network for people, pages or groups and stream what the results page shows.
///
/// While running, type `pause`, `resume` or `stop` on stdin to control the search.
#[derive(Parser, Debug)]
#[command(name = "lead-scout")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, help = "Search term")]
    pub term: String,

    #[arg(
        short = 'k',
        long = "type",
        value_enum,
        default_value_t = SearchType::People,
        help = "Kind of entity to search for"
    )]
    pub search_type: SearchType,

    #[arg(short, long, help = "Optional city filter")]
    pub city: Option<String>,

    #[arg(long, help = "TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(
        short,
        long,
        help = "Stop automatically after this many seconds (runs until Ctrl-C otherwise)"
    )]
    pub duration_secs: Option<u64>,

    #[arg(short, long, help = "Where to write the discovered entities as JSON")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Show the browser window")]
    pub headed: bool,

    #[arg(long, value_enum, help = "Log level (RUST_LOG takes precedence)")]
    pub log_level: Option<LogLevel>,
}
