//! Markdown to HTML conversion with classed syntax highlighting.

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Class style shared by highlighted spans and the generated theme stylesheet.
pub const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// Fence language that opts a code block out of highlighting.
pub const DEFAULT_PLAIN_LANGUAGE: &str = "text";

/// Fence languages without a bundled grammar, mapped to the token of a close relative.
const LANGUAGE_FALLBACKS: &[(&str, &str)] = &[
    ("ts", "js"),
    ("typescript", "js"),
    ("tsx", "js"),
    ("jsx", "js"),
    ("mjs", "js"),
    ("cjs", "js"),
    ("toml", "yaml"),
    ("zsh", "bash"),
    ("shell", "bash"),
    ("console", "bash"),
];

/// Parser options shared by conversion and indexing.
pub(crate) fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// Errors that can occur while converting Markdown.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Unknown code block language: {language}")]
    UnknownLanguage { language: String },

    #[error("Unknown highlighting theme: {0}")]
    UnknownTheme(String),

    #[error("Highlighting failed: {0}")]
    Highlight(#[from] syntect::Error),
}

/// How fenced code blocks are treated during a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Highlighting {
    /// Leave every code block as pulldown-cmark renders it
    Off,

    /// Highlight into classed spans, except blocks tagged `plain_language`
    Classed { plain_language: String },
}

impl Default for Highlighting {
    fn default() -> Self {
        Self::Classed {
            plain_language: DEFAULT_PLAIN_LANGUAGE.to_string(),
        }
    }
}

/// Markdown converter owning its syntax definitions.
pub struct MarkdownConverter {
    syntax_set: SyntaxSet,
    options: Options,
}

impl MarkdownConverter {
    /// Create a converter with syntect's bundled syntaxes.
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            options: markdown_options(),
        }
    }

    /// Convert a Markdown document to an HTML fragment.
    ///
    /// A fenced block naming a language the syntax set does not know is an
    /// error; callers are expected to fail the document rather than guess.
    pub fn convert(
        &self,
        source: &str,
        highlighting: &Highlighting,
    ) -> Result<String, ConvertError> {
        let parser = Parser::new_ext(source, self.options);

        let plain_language = match highlighting {
            Highlighting::Off => {
                let mut out = String::new();
                html::push_html(&mut out, parser);
                return Ok(out);
            }
            Highlighting::Classed { plain_language } => plain_language.as_str(),
        };

        let mut events = Vec::new();
        // (language, accumulated code) while inside a fenced block
        let mut fence: Option<(String, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(ref info)))
                    if !fence_language(info).is_empty() =>
                {
                    fence = Some((fence_language(info).to_string(), String::new()));
                }

                Event::Text(ref text) if fence.is_some() => {
                    if let Some((_, code)) = fence.as_mut() {
                        code.push_str(text);
                    }
                }

                Event::End(TagEnd::CodeBlock) if fence.is_some() => {
                    if let Some((language, code)) = fence.take() {
                        let body = if language == plain_language {
                            html_escape::encode_text(&code).into_owned()
                        } else {
                            self.highlight(&code, &language)?
                        };
                        events.push(Event::Html(
                            format!(
                                "<pre><code class=\"language-{}\">{}</code></pre>\n",
                                html_escape::encode_double_quoted_attribute(&language),
                                body
                            )
                            .into(),
                        ));
                    }
                }

                other => events.push(other),
            }
        }

        let mut out = String::new();
        html::push_html(&mut out, events.into_iter());

        Ok(out)
    }

    /// Highlight `code` as `language` into classed spans.
    fn highlight(&self, code: &str, language: &str) -> Result<String, ConvertError> {
        let syntax = self
            .find_syntax(language)
            .ok_or_else(|| ConvertError::UnknownLanguage {
                language: language.to_string(),
            })?;

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }

        Ok(generator.finalize())
    }

    fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
        self.syntax_set.find_syntax_by_token(language).or_else(|| {
            let lowered = language.to_ascii_lowercase();
            LANGUAGE_FALLBACKS
                .iter()
                .find(|(token, _)| *token == lowered)
                .and_then(|(_, fallback)| self.syntax_set.find_syntax_by_token(fallback))
        })
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the stylesheet for one of syntect's bundled themes.
///
/// The selectors match the spans produced by [`MarkdownConverter::convert`].
pub fn theme_css(theme_name: &str) -> Result<String, ConvertError> {
    let themes = ThemeSet::load_defaults();
    let theme = themes
        .themes
        .get(theme_name)
        .ok_or_else(|| ConvertError::UnknownTheme(theme_name.to_string()))?;

    Ok(css_for_theme_with_class_style(theme, CLASS_STYLE)?)
}

/// First token of a fence info string (`rust,ignore` and `rust title=x` give `rust`).
fn fence_language(info: &str) -> &str {
    info.split(|c: char| c.is_whitespace() || c == ',')
        .next()
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn converts_plain_markdown() {
        let converter = MarkdownConverter::new();

        let html = converter
            .convert("# Title\n\nSome *text*.", &Highlighting::default())
            .unwrap();

        assert_eq!(html, "<h1>Title</h1>\n<p>Some <em>text</em>.</p>\n");
    }

    #[test]
    fn plain_language_is_escaped_not_highlighted() {
        let converter = MarkdownConverter::new();

        let html = converter
            .convert("```text\na < b\n```\n", &Highlighting::default())
            .unwrap();

        assert_eq!(
            html,
            "<pre><code class=\"language-text\">a &lt; b\n</code></pre>\n"
        );
    }

    #[test]
    fn highlights_known_language() {
        let converter = MarkdownConverter::new();

        let html = converter
            .convert("```rust\nfn main() {}\n```\n", &Highlighting::default())
            .unwrap();

        assert!(html.starts_with("<pre><code class=\"language-rust\">"));
        assert!(html.contains("<span class=\"hl-"));
        assert!(html.contains("main"));
    }

    #[test]
    fn info_string_extras_are_ignored() {
        let converter = MarkdownConverter::new();

        let html = converter
            .convert("```rust,ignore\nlet x = 1;\n```\n", &Highlighting::default())
            .unwrap();

        assert!(html.contains("class=\"language-rust\""));
    }

    #[test]
    fn unknown_language_is_an_error() {
        let converter = MarkdownConverter::new();

        let result = converter.convert("```nosuchlang\nx\n```\n", &Highlighting::default());

        assert!(matches!(
            result,
            Err(ConvertError::UnknownLanguage { ref language }) if language == "nosuchlang"
        ));
    }

    #[test]
    fn highlights_languages_without_bundled_grammar() {
        let converter = MarkdownConverter::new();

        for language in ["ts", "typescript", "tsx", "jsx", "toml", "TS"] {
            let source = format!("```{language}\nconst x = 1;\n```\n");

            let html = converter
                .convert(&source, &Highlighting::default())
                .unwrap_or_else(|e| panic!("{language}: {e}"));

            assert!(html.contains(&format!("class=\"language-{language}\"")));
            assert!(html.contains("<span class=\"hl-"), "{language} not highlighted");
        }
    }

    #[test]
    fn fallback_grammars_exist() {
        let converter = MarkdownConverter::new();

        for (token, fallback) in LANGUAGE_FALLBACKS {
            assert!(
                converter.syntax_set.find_syntax_by_token(fallback).is_some(),
                "{token} falls back to missing grammar {fallback}"
            );
        }
    }

    #[test]
    fn custom_plain_language() {
        let converter = MarkdownConverter::new();
        let highlighting = Highlighting::Classed {
            plain_language: "nosuchlang".to_string(),
        };

        let html = converter
            .convert("```nosuchlang\nx\n```\n", &highlighting)
            .unwrap();

        assert!(html.contains("<code class=\"language-nosuchlang\">x\n</code>"));
    }

    #[test]
    fn untagged_blocks_pass_through() {
        let converter = MarkdownConverter::new();

        let html = converter
            .convert("```\nraw\n```\n\n    indented\n", &Highlighting::default())
            .unwrap();

        assert!(html.contains("<pre><code>raw\n</code></pre>"));
        assert!(html.contains("<pre><code>indented\n</code></pre>"));
    }

    #[test]
    fn highlighting_off_keeps_unknown_languages() {
        let converter = MarkdownConverter::new();

        let html = converter
            .convert("```nosuchlang\nx\n```\n", &Highlighting::Off)
            .unwrap();

        assert_eq!(
            html,
            "<pre><code class=\"language-nosuchlang\">x\n</code></pre>\n"
        );
    }

    #[test]
    fn theme_css_uses_prefixed_classes() {
        let css = theme_css("base16-ocean.dark").unwrap();

        assert!(css.contains(".hl-"));
    }

    #[test]
    fn unknown_theme_is_an_error() {
        assert!(matches!(
            theme_css("darcula"),
            Err(ConvertError::UnknownTheme(_))
        ));
    }
}
