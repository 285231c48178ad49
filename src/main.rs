use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cellrs::{catalogs, pos, FileStorage, Format, Pattern, World};

pub use sim::{Sim, SimHandle};
mod sim;

pub use view::View;
mod view;

/// Runs a cellular automaton on a toroidal grid in the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// text pattern to paint in the middle of the world, one character per cell.
    pattern: Option<PathBuf>,

    /// label shown in the status line.
    #[arg(long)]
    name: Option<String>,

    /// `life`, `wireworld` or a life-like rulestring such as `B36/S23`.
    #[arg(short, long, default_value = "life")]
    rules: String,

    #[arg(long, default_value_t = 80)]
    width: usize,

    #[arg(long, default_value_t = 40)]
    height: usize,

    /// state every cell starts in, defaults to `e`.
    #[arg(long, default_value_t = 'e')]
    initial: char,

    #[arg(short, long, default_value_t = 200)]
    interval_ms: u64,

    /// start paused.
    #[arg(long)]
    paused: bool,

    /// where `s` saves and `r` restores the world.
    #[arg(long, default_value = "cellrs.save")]
    save: PathBuf,

    #[arg(long, value_enum, default_value_t = SaveFormat::Rle)]
    format: SaveFormat,

    /// log file, the terminal is taken by the view.
    #[arg(long)]
    log: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SaveFormat {
    Json,
    Rle,
}

impl From<SaveFormat> for Format {
    fn from(format: SaveFormat) -> Self {
        match format {
            SaveFormat::Json => Format::Json,
            SaveFormat::Rle => Format::Rle,
        }
    }
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("could not create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn build_world(args: &Args) -> anyhow::Result<World> {
    let rules = catalogs::by_name(&args.rules)?;
    let mut builder = World::builder();
    if let Some(name) = &args.name {
        builder = builder.name(name.as_str());
    }
    let mut world = builder
        .width(args.width)
        .height(args.height)
        .rules(rules)
        .initial_state(args.initial)
        .storage(FileStorage::new(&args.save, args.format.into()))
        .init()?;

    if let Some(path) = &args.pattern {
        let content = fs::read_to_string(path)
            .with_context(|| format!("could not read pattern {}", path.display()))?;
        let pattern = Pattern::parse(&content);
        let (width, height) = pattern.size();
        let origin = pos!(
            (args.width as i32 - width as i32) / 2,
            (args.height as i32 - height as i32) / 2
        );
        world.paint(&pattern, origin)?;
        info!(path = %path.display(), cells = pattern.cells().len(), "pattern loaded");
    }
    Ok(world)
}

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log {
        init_logging(path)?;
    }

    let world = build_world(&args)?;
    let interval = Duration::from_millis(args.interval_ms);
    let simulation = Sim::spawn(world, interval, !args.paused);
    let view = View::spawn(simulation.handle());

    view.join();
    simulation.join();
    Ok(())
}
