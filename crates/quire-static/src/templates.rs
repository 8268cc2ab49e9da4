//! Template engine for rendering documentation pages.

use minijinja::{context, Environment, UndefinedBehavior, Value};

use crate::menu::MenuEntry;

/// Name under which the page template is registered.
pub const PAGE_TEMPLATE: &str = "page.html";

/// Context for rendering a page template.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Context {
    /// Page title
    pub title: String,
    /// Post-processed content HTML
    pub content: String,
    /// Build version from the metadata file
    pub version: String,
    /// Prefix leading back to the output root (`""`, `"../"`, ...)
    pub root: String,
    /// Menu localized for this page
    pub menu: Vec<MenuEntry>,
}

/// Template engine using minijinja.
///
/// Undefined values are errors, so a template asking for something the
/// context does not provide fails the page instead of rendering blanks.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a template engine with the built-in page template.
    pub fn new() -> Self {
        Self::with_page_template(PAGE_TEMPLATE_SOURCE.to_string())
            .expect("Failed to add built-in page template")
    }

    /// Create a template engine whose page template is `source`.
    ///
    /// The built-in `base.html` and `menu.html` stay available for the
    /// custom template to extend or include.
    pub fn with_page_template(source: String) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_filter("href", href);

        env.add_template_owned("base.html".to_string(), BASE_TEMPLATE.to_string())?;
        env.add_template_owned("menu.html".to_string(), MENU_TEMPLATE.to_string())?;
        env.add_template_owned(PAGE_TEMPLATE.to_string(), source)?;

        Ok(Self { env })
    }

    /// Render the page template.
    pub fn render_page(&self, context: &Context) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(PAGE_TEMPLATE)?;

        tmpl.render(context! {
            title => &context.title,
            content => &context.content,
            version => &context.version,
            root => &context.root,
            menu => &context.menu,
        })
    }
}

/// Escape a URL for a double-quoted attribute.
///
/// Unlike the default HTML escaping, slashes are kept readable.
fn href(url: String) -> Value {
    Value::from_safe_string(html_escape::encode_double_quoted_attribute(&url).into_owned())
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <meta name="generator" content="quire {{ version }}">
  <title>{{ title }}</title>
  <link rel="stylesheet" href="{{ root | href }}reset.css?v={{ version }}">
  <link rel="stylesheet" href="{{ root | href }}main.css?v={{ version }}">
  <link rel="stylesheet" href="{{ root | href }}markdown.css?v={{ version }}">
  <link rel="stylesheet" href="{{ root | href }}hljs-theme.css?v={{ version }}">
</head>
<body>
  <div class="layout">
    {% if menu %}
    <nav class="menu">
      {% include "menu.html" %}
    </nav>
    {% endif %}
    <main class="main">
      {% block content %}{% endblock %}
    </main>
  </div>
</body>
</html>"##;

const PAGE_TEMPLATE_SOURCE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="markdown">
  {{ content | safe }}
</article>
{% endblock %}"##;

const MENU_TEMPLATE: &str = r##"<ul class="menu-list">
{% for entry in menu %}
  <li class="menu-item depth-{{ entry.depth }}{% if entry.selected %} selected{% endif %}">
    <a href="{{ entry.url | href }}">{{ entry.title }}</a>
    {% if entry.sections %}
    <ul class="menu-sections">
      {% for section in entry.sections %}
      <li><a href="{{ entry.url | href }}{% if section.anchor %}#{{ section.anchor }}{% endif %}">{{ section.title }}</a></li>
      {% endfor %}
    </ul>
    {% endif %}
  </li>
{% endfor %}
</ul>"##;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::menu::MenuSection;

    fn section(title: &str, anchor: Option<usize>) -> MenuSection {
        MenuSection {
            title: title.to_string(),
            anchor,
        }
    }

    fn context(menu: Vec<MenuEntry>) -> Context {
        Context {
            title: "Guide".to_string(),
            content: "<p>Hello world</p>".to_string(),
            version: "1.2.3".to_string(),
            root: "../".to_string(),
            menu,
        }
    }

    fn menu_entry(title: &str, url: &str, selected: bool) -> MenuEntry {
        MenuEntry {
            source_path: PathBuf::from(format!("book/{url}")),
            depth: 1,
            title: title.to_string(),
            sections: vec![
                section("Install", Some(1)),
                section("Example", None),
                section("Usage", Some(3)),
            ],
            url: url.to_string(),
            selected,
        }
    }

    #[test]
    fn renders_basic_page() {
        let engine = TemplateEngine::new();

        let html = engine.render_page(&context(vec![])).unwrap();

        assert!(html.contains("<title>Guide</title>"));
        assert!(html.contains("<p>Hello world</p>"));
        assert!(html.contains("href=\"../main.css?v=1.2.3\""));
        assert!(!html.contains("class=\"menu\""));
    }

    #[test]
    fn renders_menu_with_sections() {
        let engine = TemplateEngine::new();
        let menu = vec![
            menu_entry("Intro", "../index.html", false),
            menu_entry("Guide", "a.html", true),
        ];

        let html = engine.render_page(&context(menu)).unwrap();

        assert!(html.contains("<a href=\"../index.html\">Intro</a>"));
        assert!(html.contains("menu-item depth-1 selected"));
        assert!(html.contains("<a href=\"a.html#1\">Install</a>"));
        assert!(html.contains("<a href=\"a.html\">Example</a>"));
        assert!(html.contains("<a href=\"a.html#3\">Usage</a>"));
    }

    #[test]
    fn urls_are_attribute_escaped() {
        let engine = TemplateEngine::new();
        let menu = vec![menu_entry("Quote", "say\"hi\".html", false)];

        let html = engine.render_page(&context(menu)).unwrap();

        assert!(html.contains("<a href=\"say&quot;hi&quot;.html\">Quote</a>"));
        assert!(!html.contains("say\"hi"));
    }

    #[test]
    fn custom_page_template() {
        let source = "{{ version }}|{{ root | safe }}|{{ content | safe }}";
        let engine = TemplateEngine::with_page_template(source.to_string()).unwrap();

        let html = engine.render_page(&context(vec![])).unwrap();

        assert_eq!(html, "1.2.3|../|<p>Hello world</p>");
    }

    #[test]
    fn missing_value_is_an_error() {
        let engine = TemplateEngine::with_page_template("{{ author }}".to_string()).unwrap();

        assert!(engine.render_page(&context(vec![])).is_err());
    }

    #[test]
    fn malformed_template_is_an_error() {
        assert!(TemplateEngine::with_page_template("{% if %}".to_string()).is_err());
    }
}
