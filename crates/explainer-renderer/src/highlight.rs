//! Syntax highlighting of code block lines.
//!
//! Highlighters work line by line and return exactly one markup string per
//! source line, so annotation line ranges keep pointing at the right code.

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

use crate::error::{HighlightError, RenderError};
use crate::markup::escape_html;

/// Theme used when none is configured.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// Turns source lines into HTML markup, one string per input line.
pub trait Highlighter: Send + Sync {
    /// Highlight `lines` as `language`.
    ///
    /// Implementations must return `lines.len()` entries, each free of line
    /// breaks.
    fn highlight(&self, language: &str, lines: &[String]) -> Result<Vec<String>, HighlightError>;
}

impl<H: Highlighter + ?Sized> Highlighter for &H {
    fn highlight(&self, language: &str, lines: &[String]) -> Result<Vec<String>, HighlightError> {
        (**self).highlight(language, lines)
    }
}

impl<H: Highlighter + ?Sized> Highlighter for Box<H> {
    fn highlight(&self, language: &str, lines: &[String]) -> Result<Vec<String>, HighlightError> {
        (**self).highlight(language, lines)
    }
}

/// Escapes lines without highlighting.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, _language: &str, lines: &[String]) -> Result<Vec<String>, HighlightError> {
        Ok(lines.iter().map(|line| escape_html(line)).collect())
    }
}

/// Highlighter backed by syntect's bundled grammars and themes.
///
/// Emits `<span style="color:#rrggbb">` runs. Unknown languages highlight
/// as plain text.
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl SyntectHighlighter {
    /// Create a highlighter with the [`DEFAULT_THEME`].
    #[must_use]
    pub fn new() -> Self {
        let theme = ThemeSet::load_defaults()
            .themes
            .remove(DEFAULT_THEME)
            .unwrap_or_default();
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    /// Create a highlighter with a named bundled theme.
    pub fn with_theme(name: &str) -> Result<Self, RenderError> {
        let theme = ThemeSet::load_defaults()
            .themes
            .remove(name)
            .ok_or_else(|| RenderError::UnknownTheme(name.to_owned()))?;
        Ok(Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    /// Names of the bundled themes.
    #[must_use]
    pub fn theme_names() -> Vec<String> {
        ThemeSet::load_defaults().themes.into_keys().collect()
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SyntectHighlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntectHighlighter")
            .field("theme", &self.theme.name)
            .finish_non_exhaustive()
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, language: &str, lines: &[String]) -> Result<Vec<String>, HighlightError> {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(language)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        let mut highlighter = HighlightLines::new(syntax, &self.theme);

        let mut rendered = Vec::with_capacity(lines.len());
        for line in lines {
            // Grammars loaded with newlines expect each line to end in one.
            let with_newline = format!("{line}\n");
            let ranges = highlighter
                .highlight_line(&with_newline, &self.syntax_set)
                .map_err(|e| HighlightError {
                    language: language.to_owned(),
                    reason: e.to_string(),
                })?;

            let mut markup = String::new();
            for (style, text) in ranges {
                let text = text.trim_end_matches('\n');
                if text.is_empty() {
                    continue;
                }
                let fg = style.foreground;
                markup.push_str(&format!(
                    r#"<span style="color:#{:02x}{:02x}{:02x}">{}</span>"#,
                    fg.r,
                    fg.g,
                    fg.b,
                    escape_html(text)
                ));
            }
            rendered.push(markup);
        }
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(source: &[&str]) -> Vec<String> {
        source.iter().map(|&l| l.to_owned()).collect()
    }

    fn strip_tags(markup: &str) -> String {
        let mut text = String::new();
        let mut in_tag = false;
        for c in markup.chars() {
            match c {
                '<' => in_tag = true,
                '>' => in_tag = false,
                _ if !in_tag => text.push(c),
                _ => {}
            }
        }
        text
    }

    #[test]
    fn test_plain_escapes() {
        let out = PlainHighlighter
            .highlight("html", &lines(&["<b>", "a & b"]))
            .unwrap();
        assert_eq!(out, vec!["&lt;b&gt;", "a &amp; b"]);
    }

    #[test]
    fn test_syntect_preserves_line_count() {
        let source = lines(&["def f(x):", "", "    return x * 2"]);
        let out = SyntectHighlighter::new().highlight("python", &source).unwrap();

        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|line| !line.contains('\n')));
        assert_eq!(out[1], "");
        assert_eq!(strip_tags(&out[2]), "    return x * 2");
    }

    #[test]
    fn test_syntect_emits_color_spans() {
        let out = SyntectHighlighter::new()
            .highlight("rust", &lines(&["fn main() {}"]))
            .unwrap();
        assert!(out[0].starts_with(r#"<span style="color:#"#));
        assert_eq!(strip_tags(&out[0]), "fn main() {}");
    }

    #[test]
    fn test_syntect_escapes_markup() {
        let out = SyntectHighlighter::new()
            .highlight("text", &lines(&["<script>"]))
            .unwrap();
        assert!(out[0].contains("&lt;script&gt;"));
    }

    #[test]
    fn test_syntect_unknown_language_is_plain() {
        let out = SyntectHighlighter::new()
            .highlight("no-such-language", &lines(&["x = 1"]))
            .unwrap();
        assert_eq!(strip_tags(&out[0]), "x = 1");
    }

    #[test]
    fn test_unknown_theme() {
        assert_eq!(
            SyntectHighlighter::with_theme("Nope").unwrap_err(),
            RenderError::UnknownTheme("Nope".to_owned())
        );
        assert!(SyntectHighlighter::theme_names().contains(&DEFAULT_THEME.to_owned()));
    }
}
