//! Rabbit
//!
//! Hunt rabbits in your directories. Every invocation runs one action from
//! the current directory, then saves the forest for next time.

use clap::{CommandFactory, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use rabbit_core::{
    ConfigError, DirectoryTerrain, Forest, HuntConfig, Location, SaveError, SaveFile, Timestamp,
};

mod art;
mod narrator;

use narrator::Narrator;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "rabbit")]
#[command(about = "Hunt the rabbits living in your directories")]
struct Args {
    /// Draw the rabbit as well as describing it
    #[arg(short, long)]
    ascii: bool,

    /// Log what the rabbits are up to on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Top of the forest; rabbits never go above it [default: $HOME]
    #[arg(long)]
    home: Option<PathBuf>,

    /// Where the forest is saved between hunts [default: $HOME/.rabbit]
    #[arg(long)]
    save: Option<PathBuf>,

    /// Tuning file [default: $HOME/.rabbit.toml, if present]
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show how many rabbits you have spotted, caught and killed
    Stats,
    /// Look around the current directory
    Check,
    /// Try to catch the rabbit in the current directory
    Catch,
    /// Give the rabbit in the current directory a name
    Tag {
        #[arg(value_parser = clap::builder::NonEmptyStringValueParser::new())]
        name: String,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("HOME is not set; pass --home and --save")]
    NoHome,
    #[error("could not read current directory: {0}")]
    CurrentDir(#[source] io::Error),
    #[error("could not write output: {0}")]
    Output(#[from] io::Error),
    #[error("bad config: {0}")]
    Config(#[from] ConfigError),
    #[error("{}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: SaveError,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("rabbit: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<ExitCode, CliError> {
    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(ExitCode::from(2));
    };

    let user_home = std::env::var_os("HOME").map(PathBuf::from);
    let home = args.home.or_else(|| user_home.clone()).ok_or(CliError::NoHome)?;
    let home = home.canonicalize().unwrap_or(home);
    let save_path = args
        .save
        .or_else(|| user_home.as_ref().map(|h| h.join(".rabbit")))
        .ok_or(CliError::NoHome)?;
    let config = match args.config {
        Some(path) => HuntConfig::from_file(&path)?,
        None => user_home
            .map(|h| HuntConfig::load_or_default(&h.join(".rabbit.toml")))
            .unwrap_or_default(),
    };

    let save = SaveFile::new(&save_path);
    let record = save.load().map_err(|source| CliError::Save {
        path: save_path.clone(),
        source,
    })?;
    let mut forest = Forest::restore(record, DirectoryTerrain::new(&home), config);

    let here = Location::from_path(&std::env::current_dir().map_err(CliError::CurrentDir)?);
    let now = Timestamp::now();
    let mut rng = StdRng::from_entropy();
    let stdout = io::stdout();
    let mut narrator = Narrator::new(stdout.lock(), args.ascii);

    tracing::debug!("Hunting at {} in {}", here, home.display());
    match command {
        Command::Stats => {
            narrator.stats(&forest)?;
            narrator.into_inner().flush()?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Check => narrator.check(&mut forest, &here, now, &mut rng)?,
        Command::Catch => narrator.catch(&mut forest, &here, now, &mut rng)?,
        Command::Tag { name } => narrator.tag(&mut forest, &here, &name, now, &mut rng)?,
    }
    narrator.into_inner().flush()?;

    store(&save, &forest)?;
    Ok(ExitCode::SUCCESS)
}

fn store(save: &SaveFile, forest: &Forest<DirectoryTerrain>) -> Result<(), CliError> {
    save.store(&forest.to_record()).map_err(|source| CliError::Save {
        path: save.path().to_path_buf(),
        source,
    })
}
