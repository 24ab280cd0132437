use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{info, warn};
use serde::Serialize;

use msg_database::database::{
    closure_size_histogram, closure_sizes, compare_with_reference, unclosed_groups, DatabaseAssembler,
    RawFormatParser, TextGeneratorSource,
};
use msg_database::interfaces::setting::Bns;
use msg_database::symmetries::{closure_sorted, parse_one_line_generators};
use msg_database::MagneticSpaceGroupDatabase;

#[derive(Parser)]
#[command(name = "msg-database")]
#[command(about = "Exact database of the 1651 magnetic space groups")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Number of threads to use (default: all available cores)
    #[arg(short, long)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and assemble the table, then write every group as JSON
    Build {
        /// crysFML magnetic space group table
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reject groups whose stored operations are not closed
        #[arg(long)]
        check: bool,
    },
    /// Check that every group's stored operations form a closed set
    Check {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Print one group as JSON
    Show {
        #[arg(short, long)]
        input: PathBuf,

        /// 1-based group number
        #[arg(short, long)]
        group: usize,
    },
    /// Close a generator list such as "(x,y,z)';(-x,-y,-z)" and print the group
    Closure {
        generators: String,
    },
    /// Compare every group against a file of reference generators
    Compare {
        #[arg(short, long)]
        input: PathBuf,

        /// Lines of "<group number> <generators>"
        #[arg(short, long)]
        reference: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Set thread pool size if specified
    if let Some(threads) = cli.threads {
        #[cfg(feature = "parallel")]
        {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .context("Failed to set thread pool size")?;
            info!("Using {} threads", threads);
        }
        #[cfg(not(feature = "parallel"))]
        {
            warn!("Thread count {} specified but parallel feature not enabled. Ignoring.", threads);
        }
    }

    info!("Starting msg-database v{}", msg_database::VERSION);

    match cli.command {
        Commands::Build { input, output, check } => build(&input, output.as_deref(), check),
        Commands::Check { input } => check(&input),
        Commands::Show { input, group } => show(&input, group),
        Commands::Closure { generators } => close(&generators),
        Commands::Compare { input, reference } => compare(&input, &reference),
    }
}

fn load(input: &Path, closure_check: bool) -> anyhow::Result<MagneticSpaceGroupDatabase> {
    let raw = RawFormatParser::from_path(input)
        .and_then(|parser| parser.parse())
        .with_context(|| format!("Failed to read {}", input.display()))?;
    DatabaseAssembler::new()
        .with_closure_check(closure_check)
        .assemble(&raw)
        .with_context(|| format!("Failed to assemble groups from {}", input.display()))
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
            info!("Wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, value)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

fn build(input: &Path, output: Option<&Path>, closure_check: bool) -> anyhow::Result<()> {
    let database = load(input, closure_check)?;
    write_json(&database, output)
}

fn check(input: &Path) -> anyhow::Result<()> {
    let database = load(input, false)?;
    let sizes = closure_sizes(&database);
    let findings = unclosed_groups(&sizes);
    for (size, count) in closure_size_histogram(&sizes) {
        println!("{:>4} operations: {} groups", size, count);
    }
    if !findings.is_empty() {
        bail!("{} of {} groups are not closed", findings.len(), database.len());
    }
    Ok(())
}

fn show(input: &Path, number: usize) -> anyhow::Result<()> {
    let database = load(input, false)?;
    let Some(group) = database.group(number) else {
        bail!("No group {} (the database has {} groups)", number, database.len());
    };
    write_json(group, None)
}

fn close(generators: &str) -> anyhow::Result<()> {
    let seeds = parse_one_line_generators::<Bns>(generators)
        .with_context(|| format!("Failed to parse generators {:?}", generators))?;
    let group = closure_sorted(&seeds)?;
    println!("{} operations", group.len());
    for op in &group {
        println!("{}", op.text_form());
    }
    Ok(())
}

fn compare(input: &Path, reference: &Path) -> anyhow::Result<()> {
    let database = load(input, false)?;
    let source = TextGeneratorSource::from_path(reference)
        .with_context(|| format!("Failed to read {}", reference.display()))?;
    if source.len() < database.len() {
        warn!(
            "Reference has generators for {} of {} groups",
            source.len(),
            database.len()
        );
    }
    let report = compare_with_reference(&database, &source);
    write_json(&report, None)?;
    if !report.is_clean() {
        bail!("{} of {} groups differ from the reference", report.mismatches.len(), report.compared);
    }
    Ok(())
}
