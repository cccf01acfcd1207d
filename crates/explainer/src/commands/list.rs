//! `explainer list` command implementation.

use clap::Args;
use explainer_pipeline::Pipeline;

use super::ConfigArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    #[command(flatten)]
    config: ConfigArgs,
}

impl ListArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load()?;
        let pipeline = Pipeline::from_config(&config)?;

        let summaries = pipeline.list()?;
        output.highlight(&format!(
            "{} explainer(s) in {}",
            summaries.len(),
            config.store_resolved.dir.display()
        ));
        for summary in summaries {
            output.result(&format!("{}\t{}", summary.id, summary.name))?;
        }
        Ok(())
    }
}
