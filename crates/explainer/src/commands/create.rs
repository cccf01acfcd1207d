//! `explainer create` command implementation.

use std::path::PathBuf;

use clap::Args;
use explainer_pipeline::Pipeline;

use super::{ConfigArgs, read_markdown};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the create command.
#[derive(Args)]
pub(crate) struct CreateArgs {
    /// Annotated markdown file, or `-` for stdin.
    file: PathBuf,

    /// Title (default: the document's first H1 heading).
    #[arg(short, long)]
    title: Option<String>,

    #[command(flatten)]
    config: ConfigArgs,
}

impl CreateArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load()?;
        let pipeline = Pipeline::from_config(&config)?;

        output.info(&format!(
            "Store: {}",
            config.store_resolved.dir.display()
        ));

        let markdown = read_markdown(&self.file)?;
        let created = pipeline.create(self.title.as_deref(), &markdown)?;
        for warning in &created.warnings {
            output.warning(&format!("Warning: {warning}"));
        }

        if created.reused {
            output.success(&format!("Already stored: {}", created.id));
        } else {
            output.success(&format!("Created: {}", created.id));
        }
        output.result(&created.id)?;
        Ok(())
    }
}
