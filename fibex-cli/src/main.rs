//! xls2fbx command line tool
//!
//! Serializes a FlexRay network description into a FIBEX database using the
//! fibex-writer library, and optionally writes the CAPL channel sync scripts.

use anyhow::{Context, Result};
use clap::Parser;
use fibex_writer::{capl, DocumentOrder, FibexWriter};
use std::path::PathBuf;

mod config;

/// xls2fbx - Generate FIBEX databases for FlexRay networks
#[derive(Parser, Debug)]
#[command(name = "xls2fbx")]
#[command(about = "Generate a FlexRay FIBEX database from a network description", long_about = None)]
#[command(version)]
struct Args {
    /// Network description (.json or .toml)
    #[arg(value_name = "FILE")]
    network: PathBuf,

    /// FIBEX template file
    #[arg(short, long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Output FIBEX file (default: network file with .xml extension)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also write one CAPL channel sync script per ECU into this directory
    #[arg(long, value_name = "DIR")]
    capl_dir: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Keep generated elements in network order instead of inserting at the head
    #[arg(long)]
    append: bool,

    /// Skip the ID-REF resolution check
    #[arg(long)]
    no_verify: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("xls2fbx v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using writer library v{}", fibex_writer::VERSION);

    let mut app_config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::AppConfig::default(),
    };

    // Command line flags override the configuration file
    if args.append {
        app_config.writer.document_order = DocumentOrder::Append;
    }
    if args.no_verify {
        app_config.writer.verify_references = false;
    }
    let template = args
        .template
        .or(app_config.template)
        .context("No template given (use --template or set `template` in the config file)")?;
    let output = args
        .output
        .or(app_config.output)
        .unwrap_or_else(|| args.network.with_extension("xml"));
    let capl_dir = args.capl_dir.or(app_config.capl_dir);

    log::info!("Loading network: {:?}", args.network);
    let network = config::load_network(&args.network)?;

    let writer = FibexWriter::with_config(app_config.writer);
    let stats = writer
        .write_file(&template, &network, &output)
        .with_context(|| format!("Failed to generate {:?}", output))?;

    if let Some(dir) = capl_dir {
        capl::write_scripts(&network, &dir)
            .with_context(|| format!("Failed to write CAPL scripts to {:?}", dir))?;
    }

    if !args.quiet {
        println!("Generated {:?}", output);
        println!("  ECUs:               {}", stats.num_ecus);
        println!("  Frames:             {}", stats.num_frames);
        println!("  Signals:            {}", stats.num_signals);
        println!("  Frame triggerings:  {}", stats.num_triggerings);
        println!("  Compu methods:      {}", stats.num_compu_methods);
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args()))
        .init();
}
