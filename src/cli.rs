use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ordersplit",
    version,
    about = "Split a multi-buyer order export into per-buyer batches covering every item"
)]
pub struct Cli {
    #[arg(long, global = true, help = "JSON file overriding the export format")]
    pub config: Option<PathBuf>,
    #[arg(short, long, global = true, help = "Log debug output")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split one batch file
    Split(SplitArgs),
    /// Split every batch file found under a directory
    Scan(ScanArgs),
    /// Show which buyers would be selected, without writing anything
    Plan(PlanArgs),
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    #[arg(long, help = "Also write summary.json with itemized rows")]
    pub summary: bool,
    #[arg(long, help = "Append the partition sequence number to file names")]
    pub index_in_name: bool,
}

#[derive(Args, Debug)]
pub struct SplitArgs {
    pub input: PathBuf,
    #[arg(long, help = "Directory for partition files [default: <input>-split]")]
    pub out: Option<PathBuf>,
    #[arg(long, help = "Write all partitions into one ZIP archive")]
    pub zip: Option<PathBuf>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    pub dir: PathBuf,
    #[arg(long, help = "Output root; each batch gets a subdirectory [default: <dir>/split]")]
    pub out: Option<PathBuf>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    pub input: PathBuf,
    #[arg(long, help = "Output machine-readable JSON")]
    pub json: bool,
}
