use crate::aggregator::Combiner;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "lure-scan",
    version,
    about = "Multi-signal phishing and social-engineering risk scorer",
    long_about = "lure-scan reads an analysis context (channel plus per-module inputs) as JSON, runs every signal module, and prints a combined 0-100 risk verdict with flags and evidence."
)]
pub struct Cli {
    /// Analysis context JSON file ("-" or omitted reads stdin)
    pub input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,

    /// Config file (default: search .lure-scan.* in the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the delivery channel from the input
    #[arg(long)]
    pub channel: Option<String>,

    /// Score combination policy (overrides config)
    #[arg(long, value_enum)]
    pub combiner: Option<Combiner>,

    /// Run signal modules one after another instead of in parallel
    #[arg(long)]
    pub sequential: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Input path, or `None` when reading stdin.
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|path| path.as_os_str() != "-")
    }
}
