//! CommonMark to HTML transform for prose blocks and annotation bodies.
//!
//! Plain CommonMark only (no tables, footnotes or other extensions). Raw HTML
//! in the input is escaped rather than passed through, and links with
//! script-capable schemes are neutralized, so the output is safe to embed.

use std::collections::HashMap;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Render markdown to an HTML fragment.
///
/// # Example
///
/// ```
/// use explainer_renderer::markdown_to_html;
///
/// assert_eq!(markdown_to_html("Hello *world*"), "<p>Hello <em>world</em></p>");
/// ```
#[must_use]
pub fn markdown_to_html(markdown: &str) -> String {
    let mut writer = MarkupWriter::default();
    for event in Parser::new_ext(markdown, Options::empty()) {
        writer.process_event(event);
    }
    writer.output.trim().to_owned()
}

/// Heading being captured until its end tag, when the id is known.
struct HeadingCapture {
    level: u8,
    text: String,
    html: String,
}

#[derive(Default)]
struct MarkupWriter {
    output: String,
    heading: Option<HeadingCapture>,
    heading_ids: HashMap<String, usize>,
    /// Language and buffered content of the open code block.
    code: Option<(Option<String>, String)>,
    /// Source, title and alt text of the open image.
    image: Option<(String, String, String)>,
}

impl MarkupWriter {
    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                if let Some((_, _, alt)) = &mut self.image {
                    alt.push_str(&code);
                    return;
                }
                if let Some(heading) = &mut self.heading {
                    heading.text.push_str(&code);
                }
                self.push_inline(&format!("<code>{}</code>", escape_html(&code)));
            }
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            Event::SoftBreak => {
                if let Some((_, content)) = &mut self.code {
                    content.push('\n');
                } else {
                    self.push_inline("\n");
                }
            }
            Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(_)
            | Event::FootnoteReference(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => {
                // Extensions are not enabled
            }
        }
    }

    /// Push content to the heading buffer or the output.
    ///
    /// Markup inside an image is dropped; only its text becomes alt text.
    fn push_inline(&mut self, content: &str) {
        if self.image.is_some() {
            return;
        }
        match &mut self.heading {
            Some(heading) => heading.html.push_str(content),
            None => self.output.push_str(content),
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                self.heading = Some(HeadingCapture {
                    level: heading_level_to_num(level),
                    text: String::new(),
                    html: String::new(),
                });
            }
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some((lang, String::new()));
            }
            Tag::List(Some(1)) => self.output.push_str("<ol>"),
            Tag::List(Some(start)) => {
                self.output.push_str(&format!(r#"<ol start="{start}">"#));
            }
            Tag::List(None) => self.output.push_str("<ul>"),
            Tag::Item => self.output.push_str("<li>"),
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let title_attr = if title.is_empty() {
                    String::new()
                } else {
                    format!(r#" title="{}""#, escape_html(&title))
                };
                let link = format!(
                    r#"<a href="{}"{title_attr}>"#,
                    escape_html(safe_url(&dest_url))
                );
                self.push_inline(&link);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image = Some((
                    safe_url(&dest_url).to_owned(),
                    title.to_string(),
                    String::new(),
                ));
            }
            Tag::HtmlBlock
            | Tag::FootnoteDefinition(_)
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Table(_)
            | Tag::TableHead
            | Tag::TableRow
            | Tag::TableCell => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => {
                if let Some(heading) = self.heading.take() {
                    let id = self.unique_heading_id(&heading.text);
                    self.output.push_str(&format!(
                        r#"<h{level} id="{id}">{html}</h{level}>"#,
                        level = heading.level,
                        html = heading.html.trim(),
                    ));
                }
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => {
                if let Some((lang, content)) = self.code.take() {
                    match lang {
                        Some(lang) => self.output.push_str(&format!(
                            r#"<pre><code class="language-{}">{}</code></pre>"#,
                            escape_html(&lang),
                            escape_html(&content)
                        )),
                        None => self.output.push_str(&format!(
                            "<pre><code>{}</code></pre>",
                            escape_html(&content)
                        )),
                    }
                }
            }
            TagEnd::List(ordered) => self.output.push_str(if ordered { "</ol>" } else { "</ul>" }),
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Image => {
                if let Some((src, title, alt)) = self.image.take() {
                    let title_attr = if title.is_empty() {
                        String::new()
                    } else {
                        format!(r#" title="{}""#, escape_html(&title))
                    };
                    let img = format!(
                        r#"<img src="{}"{title_attr} alt="{}">"#,
                        escape_html(&src),
                        escape_html(&alt)
                    );
                    self.push_inline(&img);
                }
            }
            TagEnd::HtmlBlock
            | TagEnd::FootnoteDefinition
            | TagEnd::MetadataBlock(_)
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
            | TagEnd::Table
            | TagEnd::TableHead
            | TagEnd::TableRow
            | TagEnd::TableCell => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some((_, content)) = &mut self.code {
            content.push_str(text);
        } else if let Some((_, _, alt)) = &mut self.image {
            alt.push_str(text);
        } else {
            if let Some(heading) = &mut self.heading {
                heading.text.push_str(text);
            }
            self.push_inline(&escape_html(text));
        }
    }

    /// Slug for a heading, suffixed with a counter when already used.
    fn unique_heading_id(&mut self, text: &str) -> String {
        let mut slug = slugify(text);
        if slug.is_empty() {
            slug.push_str("section");
        }
        let seen = self.heading_ids.entry(slug.clone()).or_insert(0);
        *seen += 1;
        if *seen == 1 {
            slug
        } else {
            format!("{slug}-{}", *seen - 1)
        }
    }
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Replace URLs with script-capable schemes by `#`.
fn safe_url(url: &str) -> &str {
    let lowered = url.trim_start().to_ascii_lowercase();
    let dangerous = ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme));
    if dangerous { "#" } else { url }
}

/// Convert heading text to an id: lowercase ASCII alphanumerics joined by dashes.
fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }
    result
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
