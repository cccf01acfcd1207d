//! `explainer render` command implementation.

use std::path::PathBuf;

use clap::Args;
use explainer_pipeline::Pipeline;
use serde_json::json;

use super::{ConfigArgs, read_markdown};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Annotated markdown file, or `-` for stdin.
    file: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load()?;
        let pipeline = Pipeline::from_config(&config)?;

        let markdown = read_markdown(&self.file)?;
        let result = pipeline.render(&markdown)?;
        for warning in &result.warnings {
            output.warning(&format!("Warning: {warning}"));
        }

        let value = json!({
            "title": result.title,
            "blocks": result.blocks,
            "warnings": result.warnings,
        });
        output.result(&serde_json::to_string_pretty(&value)?)?;
        Ok(())
    }
}
