use crate::utils::constants::DEFAULT_MAX_INPUT_BYTES;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agri-analyzer")]
#[command(about = "Rainfall and crop-growth data analyzer")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean a CSV/Excel file and print summary statistics and weekly trends
    Analyze {
        #[arg(short, long, help = "Input CSV or Excel file")]
        input: PathBuf,

        #[arg(long, default_value = "false", help = "Print the full report as JSON")]
        json: bool,

        #[arg(long, help = "Write the four chart series as JSON to this path")]
        series_out: Option<PathBuf>,

        #[arg(long, default_value_t = DEFAULT_MAX_INPUT_BYTES)]
        max_bytes: u64,
    },

    /// Run a local file through the upload endpoint and print its JSON response
    Upload {
        #[arg(short, long, help = "File to upload")]
        file: PathBuf,

        #[arg(short, long, help = "Settings file (TOML) with an [upload] table")]
        config: Option<PathBuf>,
    },

    /// Write the sample CSV template
    Template {
        #[arg(short, long, help = "Output path [default: stdout]")]
        output: Option<PathBuf>,
    },
}
