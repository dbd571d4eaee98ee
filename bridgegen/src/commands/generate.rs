use clap::Args;
use eyre::Result;

use super::{ExitOnSourceError, SourceArgs};
use crate::{
    ops::{self, GenerateOptions},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct GenerateCommand {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Print the generated server instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Write a JSON snapshot of each pipeline phase to .bridgegen/debug
    #[arg(long)]
    pub visualize: bool,
}

impl GenerateCommand {
    /// Run the generate command
    pub fn run(&self) -> Result<()> {
        let job = self.sources.load()?;
        let report = ops::generate(
            job,
            GenerateOptions {
                dry_run: self.dry_run,
                visualize: self.visualize,
            },
        )
        .exit_on_source_error()?;

        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
