mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, OutputArgs, PlanArgs, ScanArgs, SplitArgs};
use ordersplit::{
    BatchSplitter, BundleWriter, CoverageIndex, FormatConfig, SplitReport, SplitStatus,
    extract_path, scan, select_cover, write_partitions,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status when some items could not be covered
const EXIT_INCOMPLETE: u8 = 2;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config = match &cli.config {
        Some(path) => FormatConfig::from_json_file(path)
            .context(format!("Failed to load config: {}", path.display()))?,
        None => FormatConfig::default(),
    };

    match cli.command {
        Commands::Split(args) => run_split(args, config),
        Commands::Scan(args) => run_scan(args, config),
        Commands::Plan(args) => run_plan(args, config),
    }
}

fn apply_output_args(config: FormatConfig, args: &OutputArgs) -> FormatConfig {
    if args.index_in_name {
        config.index_in_name(true)
    } else {
        config
    }
}

fn default_out_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "batch".to_string());
    input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{}-split", stem))
}

fn run_split(args: SplitArgs, config: FormatConfig) -> Result<ExitCode> {
    let start = Instant::now();
    let splitter = BatchSplitter::new(apply_output_args(config, &args.output));

    let report = splitter
        .split_file(&args.input)
        .context(format!("Failed to split {}", args.input.display()))?;

    print_report(&report);

    if !report.partitions.is_empty() {
        if let Some(zip_path) = &args.zip {
            BundleWriter::new(&report)
                .with_summary(args.output.summary)
                .write_to_file(zip_path)?;
            println!("✓ Bundle written: {}", zip_path.display());
        }

        if args.out.is_some() || args.zip.is_none() {
            let out = args.out.clone().unwrap_or_else(|| default_out_dir(&args.input));
            let written = write_partitions(&report, &out, args.output.summary)?;
            for path in &written {
                println!("✓ {}", path.display());
            }
        }
    }

    println!("\nDone in {:.2}s", start.elapsed().as_secs_f64());
    Ok(exit_code(&report))
}

fn run_scan(args: ScanArgs, config: FormatConfig) -> Result<ExitCode> {
    let splitter = BatchSplitter::new(apply_output_args(config, &args.output));
    let out_root = args.out.clone().unwrap_or_else(|| args.dir.join("split"));

    let files = scan::find_batch_files(&args.dir, &splitter.config().extension, Some(&out_root))?;
    if files.is_empty() {
        println!("No batch files found in {}", args.dir.display());
        return Ok(ExitCode::SUCCESS);
    }

    let mut failures = 0usize;
    let mut incomplete = 0usize;

    for file in &files {
        println!("=== {} ===", file.display());

        let report = match splitter.split_file(file) {
            Ok(report) => report,
            Err(e) => {
                error!(path = %file.display(), error = %e, "failed to split batch");
                println!("✗ {}\n", e);
                failures += 1;
                continue;
            }
        };

        print_report(&report);
        if !report.is_complete() && report.status != SplitStatus::EmptyBatch {
            incomplete += 1;
        }

        if report.partitions.is_empty() {
            println!();
            continue;
        }

        let out_dir = scan::output_dir_for(file, &args.dir, &out_root);
        let written = write_partitions(&report, &out_dir, args.output.summary)?;
        for path in &written {
            println!("✓ {}", path.display());
        }
        println!();
    }

    println!(
        "Processed {} file(s): {} failed, {} incomplete",
        files.len(),
        failures,
        incomplete
    );

    if failures > 0 {
        Ok(ExitCode::FAILURE)
    } else if incomplete > 0 {
        Ok(ExitCode::from(EXIT_INCOMPLETE))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn run_plan(args: PlanArgs, config: FormatConfig) -> Result<ExitCode> {
    config.validate()?;
    let Some(batch) = extract_path(&args.input, &config)
        .context(format!("Failed to read {}", args.input.display()))?
        .into_batch()
    else {
        println!("⚠ No orders found in {}", args.input.display());
        return Ok(ExitCode::SUCCESS);
    };

    let index = CoverageIndex::build(&batch.records);
    let plan = select_cover(&index);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?
        );
    } else {
        println!(
            "{} records, {} buyers, {} items ({} records skipped)\n",
            batch.records.len(),
            index.buyer_count(),
            index.universe().len(),
            index.skipped()
        );
        for (i, selection) in plan.selections.iter().enumerate() {
            println!(
                "  {}. {} - {} records, {} new items",
                i + 1,
                selection.buyer_id,
                selection.records.len(),
                selection.new_items.len()
            );
        }
        if !plan.is_complete() {
            println!("\n✗ Uncoverable items: {}", join(plan.uncovered.iter()));
        }
    }

    if plan.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_INCOMPLETE))
    }
}

fn print_report(report: &SplitReport) {
    let stats = &report.stats;
    match &report.status {
        SplitStatus::EmptyBatch => {
            println!("⚠ No orders found in the batch ({} records)", stats.record_count);
            return;
        }
        SplitStatus::Complete => {
            println!(
                "✓ {} items covered by {} of {} buyers",
                stats.item_count, stats.partition_count, stats.buyer_count
            );
        }
        SplitStatus::Incomplete { uncovered } => {
            println!(
                "✗ {} of {} items could not be covered: {}",
                uncovered.len(),
                stats.item_count,
                join(uncovered.iter())
            );
        }
    }

    if stats.skipped_count > 0 {
        println!(
            "  {} record(s) without buyer or item id were left out",
            stats.skipped_count
        );
    }

    for partition in &report.partitions {
        println!(
            "  {}. {} [{}] - {} records, {} new items",
            partition.sequence,
            partition.file_name,
            partition.buyer_id,
            partition.record_count,
            partition.new_items.len()
        );
    }
}

fn exit_code(report: &SplitReport) -> ExitCode {
    match report.status {
        SplitStatus::Incomplete { .. } => ExitCode::from(EXIT_INCOMPLETE),
        _ => ExitCode::SUCCESS,
    }
}

fn join<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items.map(String::as_str).collect::<Vec<_>>().join(", ")
}
