mod check;
mod generate;

use std::{
    env,
    path::{Path, PathBuf},
};

use bridgegen_manifest::{BridgeToml, Manifest, ResolvedSources, Roots};
use check::CheckCommand;
use clap::{ArgAction, Args, Parser, Subcommand};
use eyre::{Result, WrapErr};
use generate::GenerateCommand;

/// Extension trait for exiting on manifest errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for bridgegen_manifest::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

/// Extension trait for exiting on C++ front-end errors, which carry a source
/// span and render best through miette.
pub(crate) trait ExitOnSourceError<T> {
    fn exit_on_source_error(self) -> Result<T>;
}

impl<T> ExitOnSourceError<T> for Result<T> {
    fn exit_on_source_error(self) -> Result<T> {
        self.map_err(|report| match report.downcast::<bridgegen_cpp::Error>() {
            Ok(e) => {
                eprintln!("{:?}", miette::Report::new(e));
                std::process::exit(1);
            }
            Err(report) => report,
        })
    }
}

#[derive(Parser)]
#[command(name = "bridgegen")]
#[command(version)]
#[command(about = "Bridge a Thrift server skeleton to the OpenZWave Manager")]
pub(crate) struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Generate(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write the server source with every handler method bridged
    Generate(GenerateCommand),

    /// Report coverage and bridging problems without writing anything
    Check(CheckCommand),
}

/// Source tree and configuration arguments shared by all commands.
#[derive(Args)]
pub(crate) struct SourceArgs {
    /// OpenZWave source tree
    #[arg(long = "library-root", visible_alias = "ozwroot", value_name = "DIR")]
    pub library_root: PathBuf,

    /// Thrift C++ include directory
    #[arg(long = "thrift-root", visible_alias = "thriftroot", value_name = "DIR")]
    pub thrift_root: PathBuf,

    /// Path to bridge.toml (defaults to ./bridge.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Configuration and source paths for one run.
pub(crate) struct Job {
    pub manifest: Manifest,
    pub sources: ResolvedSources,
    /// The manifest file, or `None` for the built-in defaults.
    pub config_path: Option<PathBuf>,
    pub working_dir: PathBuf,
}

impl SourceArgs {
    /// Load the manifest and resolve source paths against the working
    /// directory. Exits on manifest errors.
    pub fn load(&self) -> Result<Job> {
        let working_dir = env::current_dir().wrap_err("failed to read the working directory")?;
        let bridge_toml = match &self.config {
            Some(path) => Some(BridgeToml::open(path).unwrap_or_exit()),
            None => BridgeToml::discover(&working_dir).unwrap_or_exit(),
        };
        let config_path = bridge_toml.as_ref().map(|t| t.path().to_path_buf());
        let manifest = bridge_toml
            .map(BridgeToml::into_manifest)
            .unwrap_or_default();

        let roots = Roots {
            library: absolute(&working_dir, &self.library_root),
            thrift: absolute(&working_dir, &self.thrift_root),
        };
        let sources = manifest.sources.resolve(&roots, &working_dir);
        Ok(Job {
            manifest,
            sources,
            config_path,
            working_dir,
        })
    }
}

fn absolute(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
