//! CLI command implementations.

mod create;
mod list;
mod render;
mod show;

use std::path::{Path, PathBuf};

use clap::Args;
use explainer_config::{CliSettings, Config};
use explainer_id::IdStrategy;

use crate::error::CliError;

pub(crate) use create::CreateArgs;
pub(crate) use list::ListArgs;
pub(crate) use render::RenderArgs;
pub(crate) use show::ShowArgs;

/// Configuration options shared by every command.
#[derive(Args, Debug)]
pub(crate) struct ConfigArgs {
    /// Path to configuration file (default: auto-discover explainer.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Explainer store directory (overrides config).
    #[arg(long, env = "EXPLAINER_STORE_DIR")]
    store_dir: Option<PathBuf>,

    /// Language allow-list YAML file (overrides config).
    #[arg(long)]
    languages: Option<PathBuf>,

    /// Id strategy: `random` or `content` (overrides config).
    #[arg(long)]
    id_strategy: Option<IdStrategy>,

    /// Disable syntax highlighting.
    #[arg(long)]
    no_highlight: bool,
}

impl ConfigArgs {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            store_dir: self.store_dir.clone(),
            languages_file: self.languages.clone(),
            id_strategy: self.id_strategy,
            highlight: self.no_highlight.then_some(false),
        }
    }

    /// Load configuration with CLI overrides applied.
    pub(crate) fn load(&self) -> Result<Config, CliError> {
        let settings = self.cli_settings();
        Ok(Config::load(self.config.as_deref(), Some(&settings))?)
    }
}

/// Read markdown from a file, or stdin for `-`.
fn read_markdown(path: &Path) -> Result<String, CliError> {
    let read = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin())
    } else {
        std::fs::read_to_string(path)
    };
    read.map_err(|source| CliError::Input {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: ConfigArgs,
    }

    fn settings(args: &[&str]) -> CliSettings {
        let cli = TestCli::try_parse_from(std::iter::once("explainer").chain(args.iter().copied()))
            .unwrap();
        cli.config.cli_settings()
    }

    #[test]
    fn test_no_overrides() {
        let settings = settings(&[]);
        assert_eq!(settings.languages_file, None);
        assert_eq!(settings.id_strategy, None);
        assert_eq!(settings.highlight, None);
    }

    #[test]
    fn test_overrides() {
        let settings = settings(&[
            "--store-dir",
            "/tmp/explainers",
            "--languages",
            "langs.yml",
            "--id-strategy",
            "content",
            "--no-highlight",
        ]);
        assert_eq!(settings.store_dir, Some(PathBuf::from("/tmp/explainers")));
        assert_eq!(settings.languages_file, Some(PathBuf::from("langs.yml")));
        assert_eq!(settings.id_strategy, Some(IdStrategy::Content));
        assert_eq!(settings.highlight, Some(false));
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let result = TestCli::try_parse_from(["explainer", "--id-strategy", "sequential"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_markdown(Path::new("/nonexistent/explainer.md")).unwrap_err();
        assert!(err.to_string().starts_with("failed to read /nonexistent/explainer.md"));
    }
}
