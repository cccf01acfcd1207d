//! Create and read explainers.

use explainer_config::Config;
use explainer_id::IdStrategy;
use explainer_parser::{AnnotationParser, Document};
use explainer_renderer::{
    Highlighter, LanguageAllowList, PlainHighlighter, RenderResult, RenderWarning,
    RenderedDocument, Renderer, SyntectHighlighter,
};
use explainer_storage::{DocumentStore, DocumentSummary, FsStore};

use crate::error::PipelineError;

/// Attempts at storing under a fresh random id before giving up.
pub const MAX_PUT_ATTEMPTS: usize = 3;

/// Prefix `body` with an H1 title, the stored shape of generated explainers.
///
/// ```
/// use explainer_pipeline::compose_markdown;
///
/// assert_eq!(compose_markdown("Sorting", "Body"), "# Sorting\n\nBody");
/// ```
#[must_use]
pub fn compose_markdown(title: &str, body: &str) -> String {
    format!("# {}\n\n{body}", title.trim())
}

/// Outcome of [`Pipeline::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub id: String,
    pub document: RenderedDocument,
    pub warnings: Vec<RenderWarning>,
    /// True when a content-addressed id was already stored and reused.
    pub reused: bool,
}

/// Parse → render → identify → store.
///
/// Independent documents may run through one pipeline concurrently: the
/// parser, renderer and allow-list are read-only and the store handles its
/// own synchronization.
pub struct Pipeline<S> {
    parser: AnnotationParser,
    renderer: Renderer<Box<dyn Highlighter>>,
    allow_list: LanguageAllowList,
    strategy: IdStrategy,
    store: S,
}

impl Pipeline<FsStore> {
    /// Build a pipeline over a filesystem store from configuration.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let languages = &config.languages_resolved;
        let allow_list = match &languages.file {
            Some(file) => LanguageAllowList::from_file(file, &languages.fallback)?,
            None => LanguageAllowList::builtin(&languages.fallback)?,
        };

        let highlighter: Box<dyn Highlighter> = if config.render.highlight {
            Box::new(SyntectHighlighter::with_theme(&config.render.theme)?)
        } else {
            Box::new(PlainHighlighter)
        };

        tracing::debug!(
            store = %config.store_resolved.dir.display(),
            languages = allow_list.len(),
            strategy = %config.ids.strategy,
            highlight = config.render.highlight,
            "configured pipeline"
        );

        Ok(Self::new(FsStore::new(&config.store_resolved.dir), allow_list)
            .with_highlighter(highlighter)
            .with_strategy(config.ids.strategy))
    }
}

impl<S: DocumentStore> Pipeline<S> {
    /// Create a pipeline with syntect highlighting and random ids.
    pub fn new(store: S, allow_list: LanguageAllowList) -> Self {
        Self {
            parser: AnnotationParser::new(),
            renderer: Renderer::with_highlighter(Box::new(SyntectHighlighter::new())),
            allow_list,
            strategy: IdStrategy::default(),
            store,
        }
    }

    #[must_use]
    pub fn with_highlighter(mut self, highlighter: Box<dyn Highlighter>) -> Self {
        self.renderer = Renderer::with_highlighter(highlighter);
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: IdStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn allow_list(&self) -> &LanguageAllowList {
        &self.allow_list
    }

    /// Parse and render without storing.
    pub fn render(&self, markdown: &str) -> Result<RenderResult, PipelineError> {
        let doc = self.parser.parse(markdown)?;
        Ok(self.renderer.render(&doc, &self.allow_list)?)
    }

    /// Run the full pipeline and store the result.
    ///
    /// `title` overrides the document's own H1; when the markdown has no H1
    /// the title is prepended with [`compose_markdown`]. Render warnings are
    /// returned, never dropped.
    pub fn create(&self, title: Option<&str>, markdown: &str) -> Result<Created, PipelineError> {
        let (source, doc) = self.parse_with_title(title, markdown)?;
        let mut result = self.renderer.render(&doc, &self.allow_list)?;
        if let Some(title) = title {
            title.trim().clone_into(&mut result.title);
        }

        for warning in &result.warnings {
            tracing::warn!(%warning, "render warning");
        }

        match self.strategy {
            IdStrategy::Random => self.store_random(result),
            IdStrategy::Content => self.store_content(&source, result),
        }
    }

    /// Retrieve a stored explainer.
    pub fn get(&self, id: &str) -> Result<RenderedDocument, PipelineError> {
        Ok(self.store.get(id)?)
    }

    /// Stored explainers with display names, sorted by id.
    pub fn list(&self) -> Result<Vec<DocumentSummary>, PipelineError> {
        Ok(self.store.summaries()?)
    }

    fn parse_with_title(
        &self,
        title: Option<&str>,
        markdown: &str,
    ) -> Result<(String, Document), PipelineError> {
        let doc = self.parser.parse(markdown)?;
        match title {
            Some(title) if doc.title.is_empty() && !title.trim().is_empty() => {
                let source = compose_markdown(title, markdown);
                let doc = self.parser.parse(&source)?;
                Ok((source, doc))
            }
            _ => Ok((markdown.to_owned(), doc)),
        }
    }

    /// Store under random ids, retrying collisions.
    fn store_random(&self, result: RenderResult) -> Result<Created, PipelineError> {
        let mut attempt = 1;
        loop {
            let id = IdStrategy::Random.generate(&result.title, "");
            let document = result.clone().into_document(&id);
            match self.store.put(&id, &document) {
                Ok(()) => {
                    tracing::info!(id, attempt, "created explainer");
                    return Ok(Created {
                        id,
                        document,
                        warnings: result.warnings,
                        reused: false,
                    });
                }
                Err(err) if err.is_already_exists() && attempt < MAX_PUT_ATTEMPTS => {
                    tracing::warn!(id, attempt, "id collision, regenerating");
                    attempt += 1;
                }
                Err(err) if err.is_already_exists() => {
                    return Err(PipelineError::IdExhausted {
                        attempts: attempt,
                        source: err,
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Store under the content-addressed id; an existing entry is reused.
    fn store_content(&self, source: &str, result: RenderResult) -> Result<Created, PipelineError> {
        let id = IdStrategy::Content.generate(&result.title, source);
        let document = result.clone().into_document(&id);
        match self.store.put(&id, &document) {
            Ok(()) => {
                tracing::info!(id, "created explainer");
                Ok(Created {
                    id,
                    document,
                    warnings: result.warnings,
                    reused: false,
                })
            }
            Err(err) if err.is_already_exists() => {
                tracing::info!(id, "explainer already stored, reusing");
                let document = self.store.get(&id)?;
                Ok(Created {
                    id,
                    document,
                    warnings: result.warnings,
                    reused: true,
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}
