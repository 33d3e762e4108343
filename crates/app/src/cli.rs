use chatter_core::common::Granularity;
use chatter_core::common::time::parse_timestamp;
use chatter_core::merge::entity::PostMetric;
use chrono::{DateTime, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "chatter",
    version,
    about = "Collect subreddit posts, collapse duplicates and align them with a price series"
)]
pub struct Cli {
    /// Configuration file (TOML/JSON/YAML); `chatter.toml` is picked up when present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Also write daily-rolling log files into this directory
    #[arg(long = "log-dir", global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Page backwards through the submission API and save the raw table
    Collect(CollectArgs),
    /// Collapse (title, author) duplicates and save the cleaned table
    Dedup(DedupArgs),
    /// Left-join bucketed post activity onto a price series
    Merge(MergeArgs),
    /// collect, dedup and merge at hourly and daily granularity
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct WindowArgs {
    /// Upper bound (inclusive): unix seconds, RFC 3339 or YYYY-MM-DD
    #[arg(long, value_parser = parse_time)]
    pub before: DateTime<Utc>,

    /// Lower bound (exclusive)
    #[arg(long, value_parser = parse_time)]
    pub after: DateTime<Utc>,

    /// Defaults to `collector.subreddit`
    #[arg(long)]
    pub subreddit: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CollectArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    #[arg(short = 'o', long = "out")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct DedupArgs {
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    #[arg(short = 'o', long = "out")]
    pub out: Option<PathBuf>,

    /// Skip title sentiment scoring
    #[arg(long = "no-sentiment", action = ArgAction::SetTrue)]
    pub no_sentiment: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Summed column: posts, score, comments, crossposts, awards
    #[arg(long, default_value = "posts")]
    pub metric: PostMetric,

    /// Keep only posts whose title mentions one of these words (repeatable)
    #[arg(long = "keyword")]
    pub keywords: Vec<String>,

    #[arg(long = "case-sensitive", action = ArgAction::SetTrue)]
    pub case_sensitive: bool,

    /// Defaults to `merge.symbol`
    #[arg(long)]
    pub symbol: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    #[arg(long)]
    pub posts: PathBuf,

    #[arg(long)]
    pub prices: PathBuf,

    /// hour or day
    #[arg(long, default_value = "hour")]
    pub granularity: Granularity,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(short = 'o', long = "out")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    #[arg(long)]
    pub prices: PathBuf,

    #[arg(long = "no-sentiment", action = ArgAction::SetTrue)]
    pub no_sentiment: bool,

    #[command(flatten)]
    pub selection: SelectionArgs,
}

fn parse_time(text: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(text).ok_or_else(|| format!("unrecognised timestamp `{text}`"))
}
