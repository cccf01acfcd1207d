//! `explainer show` command implementation.

use clap::Args;
use explainer_pipeline::Pipeline;

use super::ConfigArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the show command.
#[derive(Args)]
pub(crate) struct ShowArgs {
    /// Explainer id.
    id: String,

    #[command(flatten)]
    config: ConfigArgs,
}

impl ShowArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load()?;
        let pipeline = Pipeline::from_config(&config)?;

        let document = pipeline.get(&self.id)?;
        output.result(&serde_json::to_string_pretty(&document)?)?;
        Ok(())
    }
}
