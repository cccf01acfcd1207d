//! Permitted code-block languages.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AllowListError;

/// Tag substituted for languages outside the allow-list.
pub const DEFAULT_FALLBACK: &str = "text";

/// Built-in languages: (tag, display name, comment style).
const BUILTIN_LANGUAGES: &[(&str, &str, Option<&str>)] = &[
    ("bash", "Bash", Some("number")),
    ("c", "C", Some("slash")),
    ("cpp", "C++", Some("slash")),
    ("csharp", "C#", Some("slash")),
    ("css", "CSS", Some("slash")),
    ("diff", "Diff", None),
    ("go", "Go", Some("slash")),
    ("graphql", "GraphQL", Some("number")),
    ("html", "HTML", Some("html")),
    ("java", "Java", Some("slash")),
    ("javascript", "JavaScript", Some("slash")),
    ("json", "JSON", None),
    ("kotlin", "Kotlin", Some("slash")),
    ("markdown", "Markdown", Some("html")),
    ("php", "PHP", Some("slash")),
    ("powershell", "PowerShell", Some("number")),
    ("python", "Python", Some("number")),
    ("ruby", "Ruby", Some("number")),
    ("rust", "Rust", Some("slash")),
    ("scss", "SCSS", Some("slash")),
    ("shell", "Shell", Some("number")),
    ("sql", "SQL", Some("dash")),
    ("swift", "Swift", Some("slash")),
    ("text", "Plain text", None),
    ("toml", "TOML", Some("number")),
    ("typescript", "TypeScript", Some("slash")),
    ("xml", "XML", Some("html")),
    ("yaml", "YAML", Some("number")),
];

/// Display metadata of one language.
///
/// Only the tag set matters for rendering; the metadata is carried so a
/// presentation layer can label code blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
    /// Line comment style (`slash`, `number`, `html`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Immutable set of permitted language tags plus a fallback tag.
///
/// Built once and passed by reference to the renderer; it is never mutated,
/// so concurrent renders can share it freely. The fallback is always a
/// member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageAllowList {
    languages: BTreeMap<String, LanguageInfo>,
    fallback: String,
}

impl LanguageAllowList {
    /// Build an allow-list from bare tags.
    pub fn new<I, S>(tags: I, fallback: &str) -> Result<Self, AllowListError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let languages = tags
            .into_iter()
            .map(|tag| {
                let tag = tag.into();
                let info = LanguageInfo {
                    name: tag.clone(),
                    comment: None,
                };
                (tag.to_ascii_lowercase(), info)
            })
            .collect();
        Self::from_map(languages, fallback)
    }

    /// Parse a YAML mapping of tag to [`LanguageInfo`].
    ///
    /// ```
    /// use explainer_renderer::LanguageAllowList;
    ///
    /// let yaml = "python:\n  name: Python\n  comment: number\n";
    /// let list = LanguageAllowList::from_yaml_str(yaml, "text").unwrap();
    /// assert!(list.contains("python"));
    /// assert!(list.contains("text"));
    /// ```
    pub fn from_yaml_str(yaml: &str, fallback: &str) -> Result<Self, AllowListError> {
        let parsed: Option<BTreeMap<String, LanguageInfo>> = serde_yaml::from_str(yaml)?;
        let languages = parsed
            .unwrap_or_default()
            .into_iter()
            .map(|(tag, info)| (tag.to_ascii_lowercase(), info))
            .collect();
        Self::from_map(languages, fallback)
    }

    /// Load a YAML allow-list file.
    pub fn from_file(path: &Path, fallback: &str) -> Result<Self, AllowListError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| AllowListError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let list = Self::from_yaml_str(&yaml, fallback)?;
        tracing::debug!(
            path = %path.display(),
            languages = list.len(),
            "loaded language allow-list"
        );
        Ok(list)
    }

    /// Built-in allow-list with a custom fallback tag.
    pub fn builtin(fallback: &str) -> Result<Self, AllowListError> {
        Self::from_map(builtin_languages(), fallback)
    }

    fn from_map(
        mut languages: BTreeMap<String, LanguageInfo>,
        fallback: &str,
    ) -> Result<Self, AllowListError> {
        let fallback = fallback.trim().to_ascii_lowercase();
        if fallback.is_empty() || fallback.contains(char::is_whitespace) {
            return Err(AllowListError::InvalidFallback(fallback));
        }
        languages
            .entry(fallback.clone())
            .or_insert_with(|| LanguageInfo {
                name: "Plain text".to_owned(),
                comment: None,
            });
        Ok(Self {
            languages,
            fallback,
        })
    }

    /// Whether `tag` is permitted. Tags compare ASCII case-insensitively.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.resolve(tag).is_some()
    }

    /// Canonical (lowercase) form of `tag` if it is permitted.
    #[must_use]
    pub fn resolve(&self, tag: &str) -> Option<&str> {
        self.languages
            .get_key_value(tag.to_ascii_lowercase().as_str())
            .map(|(key, _)| key.as_str())
    }

    /// Display metadata for `tag`.
    #[must_use]
    pub fn info(&self, tag: &str) -> Option<&LanguageInfo> {
        self.languages.get(tag.to_ascii_lowercase().as_str())
    }

    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Permitted tags in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.languages.len()
    }

    /// Always false; the fallback is a member.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

impl Default for LanguageAllowList {
    fn default() -> Self {
        Self {
            languages: builtin_languages(),
            fallback: DEFAULT_FALLBACK.to_owned(),
        }
    }
}

fn builtin_languages() -> BTreeMap<String, LanguageInfo> {
    BUILTIN_LANGUAGES
        .iter()
        .map(|(tag, name, comment)| {
            let info = LanguageInfo {
                name: (*name).to_owned(),
                comment: comment.map(str::to_owned),
            };
            ((*tag).to_owned(), info)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_new_adds_fallback() {
        let list = LanguageAllowList::new(["rust", "python"], "text").unwrap();
        assert!(list.contains("text"));
        assert_eq!(list.tags().collect::<Vec<_>>(), vec!["python", "rust", "text"]);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let list = LanguageAllowList::new(["JavaScript"], "text").unwrap();
        assert!(list.contains("javascript"));
        assert_eq!(list.resolve("JAVASCRIPT"), Some("javascript"));
        assert_eq!(list.resolve("java"), None);
    }

    #[test]
    fn test_invalid_fallback() {
        assert!(matches!(
            LanguageAllowList::new(["rust"], "  "),
            Err(AllowListError::InvalidFallback(_))
        ));
        assert!(matches!(
            LanguageAllowList::new(["rust"], "plain text"),
            Err(AllowListError::InvalidFallback(_))
        ));
    }

    #[test]
    fn test_from_yaml_metadata() {
        let yaml = "\
javascript:
  name: JavaScript
  comment: slash
plaintext:
  name: Plain text
";
        let list = LanguageAllowList::from_yaml_str(yaml, "plaintext").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.fallback(), "plaintext");
        assert_eq!(
            list.info("javascript"),
            Some(&LanguageInfo {
                name: "JavaScript".to_owned(),
                comment: Some("slash".to_owned()),
            })
        );
    }

    #[test]
    fn test_from_yaml_empty_document() {
        let list = LanguageAllowList::from_yaml_str("", "text").unwrap();
        assert_eq!(list.tags().collect::<Vec<_>>(), vec!["text"]);
    }

    #[test]
    fn test_from_yaml_malformed() {
        let result = LanguageAllowList::from_yaml_str("- just\n- a list\n", "text");
        assert!(matches!(result, Err(AllowListError::Parse(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "go:\n  name: Go\n").unwrap();

        let list = LanguageAllowList::from_file(file.path(), "text").unwrap();
        assert!(list.contains("go"));
    }

    #[test]
    fn test_from_missing_file() {
        let result = LanguageAllowList::from_file(Path::new("/nonexistent/langs.yml"), "text");
        assert!(matches!(result, Err(AllowListError::Io { .. })));
    }

    #[test]
    fn test_builtin_matches_default() {
        assert_eq!(LanguageAllowList::builtin("text").unwrap(), LanguageAllowList::default());
        assert!(LanguageAllowList::default().contains("python"));
        assert!(LanguageAllowList::default().contains(DEFAULT_FALLBACK));
    }
}
