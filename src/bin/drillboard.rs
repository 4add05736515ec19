use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "drillboard", version)]
struct Cli {
    /// Log engine diagnostics to stderr (repeat for more detail).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Engine tuning overrides (JSON); missing fields keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a starter drill (one player, one ball).
    New(NewArgs),
    /// Print the scene at a time as JSON.
    Scrub(ScrubArgs),
    /// Print the schedule layout as JSON.
    Layout(LayoutArgs),
    /// Summarize a drill.
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct NewArgs {
    /// Output drill JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ScrubArgs {
    /// Input drill JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Query time in seconds.
    #[arg(long)]
    time: f64,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Input drill JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Strip width in pixels.
    #[arg(long, default_value_t = 800.0)]
    width: f64,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input drill JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::New(args) => cmd_new(args, config),
        Command::Scrub(args) => cmd_scrub(args, config),
        Command::Layout(args) => cmd_layout(args, config),
        Command::Info(args) => cmd_info(args, config),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<drillboard::DrillConfig> {
    let Some(path) = path else {
        return Ok(drillboard::DrillConfig::default());
    };
    drillboard::DrillConfig::from_path(path)
        .with_context(|| format!("load config '{}'", path.display()))
}

fn open(path: &Path, config: drillboard::DrillConfig) -> anyhow::Result<drillboard::Document> {
    drillboard::Document::from_path(path, config)
        .with_context(|| format!("load drill '{}'", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("encode output JSON")?;
    println!("{json}");
    Ok(())
}

fn cmd_new(args: NewArgs, config: drillboard::DrillConfig) -> anyhow::Result<()> {
    let doc = drillboard::Document::starter(config);
    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    doc.save_to_path(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_scrub(args: ScrubArgs, config: drillboard::DrillConfig) -> anyhow::Result<()> {
    let mut doc = open(&args.in_path, config)?;
    let scene = doc.scrub(args.time)?;
    print_json(&scene)
}

fn cmd_layout(args: LayoutArgs, config: drillboard::DrillConfig) -> anyhow::Result<()> {
    let doc = open(&args.in_path, config)?;
    print_json(&doc.layout(args.width)?)
}

fn cmd_info(args: InfoArgs, config: drillboard::DrillConfig) -> anyhow::Result<()> {
    let doc = open(&args.in_path, config)?;
    let reg = doc.registry();
    let movements = doc
        .timeline()
        .iter()
        .filter(|e| e.as_movement().is_some())
        .count();
    println!("duration: {}", doc.duration());
    println!("field height: {}", doc.field_height());
    println!(
        "entities: {} players, {} cones, {} balls",
        reg.players().len(),
        reg.cones().len(),
        reg.balls().len()
    );
    println!(
        "timeline: {} buckets, {} movements, {} notes",
        doc.timeline().keys().count(),
        movements,
        doc.notes().len()
    );
    for note in doc.notes().iter() {
        println!(
            "  [{:>6.2} .. {:>6.2}] {}",
            note.start_time, note.end_time, note.text
        );
    }
    Ok(())
}
