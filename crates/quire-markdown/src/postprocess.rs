//! Textual post-processing of converted HTML.
//!
//! Every pass works on the serialized HTML with patterns rather than on a
//! parsed tree. Callers only see [`PostProcessor::process`], so a pass can
//! be swapped for a structural transform without touching them.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Source file name that maps to a directory index.
pub const INDEX_SOURCE: &str = "README.md";

/// Output file name of a directory index.
pub const INDEX_TARGET: &str = "index.html";

static PRE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<pre>").expect("valid regex"));

static H2_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<h2([^>]*)>(.*?)</h2>").expect("valid regex"));

static MARKDOWN_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="([^"]*?)\.md(#[^"]*)?""#).expect("valid regex"));

/// A single rewrite over an HTML fragment.
pub trait HtmlPass: Send + Sync {
    /// Pass identifier, used in logs
    fn name(&self) -> &'static str;

    /// Rewrite `html`, returning the new fragment.
    fn apply(&self, html: &str) -> String;
}

/// Adds a highlighting class to every bare `<pre>` element.
#[derive(Debug, Clone)]
pub struct PreClass {
    class: String,
}

impl PreClass {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
        }
    }
}

impl Default for PreClass {
    fn default() -> Self {
        Self::new("hljs")
    }
}

impl HtmlPass for PreClass {
    fn name(&self) -> &'static str {
        "pre-class"
    }

    fn apply(&self, html: &str) -> String {
        let tag = format!(
            "<pre class=\"{}\">",
            html_escape::encode_double_quoted_attribute(&self.class)
        );
        PRE_TAG.replace_all(html, tag.as_str()).into_owned()
    }
}

/// Numbers level-2 headings and wraps their text in a named anchor.
///
/// Numbering starts at 1 on every call, so each document gets `#1`, `#2`, ...
/// in the order its sections appear.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionAnchors;

impl HtmlPass for SectionAnchors {
    fn name(&self) -> &'static str {
        "section-anchors"
    }

    fn apply(&self, html: &str) -> String {
        let mut counter = 0usize;
        H2_ELEMENT
            .replace_all(html, |caps: &Captures<'_>| {
                counter += 1;
                format!(
                    "<h2{attrs}><a name=\"{n}\" href=\"#{n}\">{text}</a></h2>",
                    attrs = &caps[1],
                    n = counter,
                    text = &caps[2]
                )
            })
            .into_owned()
    }
}

/// Points links at generated pages instead of Markdown sources.
///
/// `README.md` targets become the directory index; any other `.md` target
/// becomes `.html`. Fragments are kept. Targets are not checked for existence.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    index_href: Regex,
    index_target: String,
}

impl LinkRewriter {
    /// Build a rewriter for the given index file names.
    pub fn new(index_source: &str, index_target: &str) -> Result<Self, regex::Error> {
        let index_href = Regex::new(&format!(
            r#"href="((?:[^"]*/)?){}(#[^"]*)?""#,
            regex::escape(index_source)
        ))?;

        Ok(Self {
            index_href,
            index_target: index_target.to_string(),
        })
    }
}

impl Default for LinkRewriter {
    fn default() -> Self {
        Self::new(INDEX_SOURCE, INDEX_TARGET).expect("escaped index pattern is valid")
    }
}

impl HtmlPass for LinkRewriter {
    fn name(&self) -> &'static str {
        "link-rewriter"
    }

    fn apply(&self, html: &str) -> String {
        let html = self.index_href.replace_all(html, |caps: &Captures<'_>| {
            format!(
                "href=\"{}{}{}\"",
                &caps[1],
                self.index_target,
                caps.get(2).map_or("", |m| m.as_str())
            )
        });

        MARKDOWN_HREF
            .replace_all(&html, |caps: &Captures<'_>| {
                format!(
                    "href=\"{}.html{}\"",
                    &caps[1],
                    caps.get(2).map_or("", |m| m.as_str())
                )
            })
            .into_owned()
    }
}

/// Ordered pipeline of HTML passes.
pub struct PostProcessor {
    passes: Vec<Box<dyn HtmlPass>>,
}

impl PostProcessor {
    /// The standard pipeline: `<pre>` classes, section anchors, link rewriting.
    pub fn new() -> Self {
        Self::with_passes(vec![
            Box::new(PreClass::default()),
            Box::new(SectionAnchors),
            Box::new(LinkRewriter::default()),
        ])
    }

    pub fn with_passes(passes: Vec<Box<dyn HtmlPass>>) -> Self {
        Self { passes }
    }

    /// Names of the configured passes, in order.
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run every pass over `html`.
    pub fn process(&self, html: &str) -> String {
        self.passes
            .iter()
            .fold(html.to_string(), |acc, pass| pass.apply(&acc))
    }
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self::new()
    }
}
