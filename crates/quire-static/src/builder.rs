//! Static site builder.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use quire_markdown::{
    index_document, ConvertError, Highlighting, MarkdownConverter, PostProcessor,
};

use crate::assets::{AssetCopier, AssetError, Overlay};
use crate::menu::{Menu, MenuEntry};
use crate::metadata::BuildMetadata;
use crate::paths;
use crate::templates::{Context, TemplateEngine};
use crate::walker::{self, SourceFile, WalkError};

/// Whether pages carry the navigation menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuMode {
    /// Index every document and render the localized menu on each page
    #[default]
    Menu,

    /// Skip indexing; pages get an empty menu
    Plain,
}

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source Markdown tree
    pub source_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Directory holding the overlay stylesheets
    pub overlay_dir: PathBuf,

    /// Page template; the built-in template is used when unset
    pub template: Option<PathBuf>,

    /// JSON file providing the build version
    pub metadata: PathBuf,

    /// Build profile
    pub menu: MenuMode,

    /// Highlight fenced code blocks
    pub highlight: bool,

    /// Bundled syntect theme written as the highlighting stylesheet
    pub highlight_theme: String,

    /// Fence language that is never highlighted
    pub plain_language: String,

    /// Extensions of files copied verbatim
    pub asset_extensions: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("book"),
            output_dir: PathBuf::from("docs"),
            overlay_dir: PathBuf::from("overlay"),
            template: None,
            metadata: PathBuf::from("build.json"),
            menu: MenuMode::Menu,
            highlight: true,
            highlight_theme: "base16-ocean.dark".to_string(),
            plain_language: quire_markdown::DEFAULT_PLAIN_LANGUAGE.to_string(),
            asset_extensions: vec!["png".to_string(), "jpg".to_string()],
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildReport {
    /// Number of pages generated
    pub pages: usize,

    /// Number of binary assets copied
    pub assets: usize,

    /// Number of overlay files written
    pub overlays: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to access {}: {source}", path.display())]
    Filesystem { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error("Invalid build metadata in {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to convert {}: {source}", path.display())]
    Conversion { path: PathBuf, source: ConvertError },

    #[error("Failed to render template for {}: {source}", path.display())]
    Template {
        path: PathBuf,
        source: minijinja::Error,
    },

    #[error(transparent)]
    Asset(#[from] AssetError),
}

fn fs_error(path: &Path) -> impl FnOnce(io::Error) -> BuildError + '_ {
    move |source| BuildError::Filesystem {
        path: path.to_path_buf(),
        source,
    }
}

/// Static site builder.
pub struct SiteBuilder {
    config: BuildConfig,
    converter: MarkdownConverter,
    postprocessor: PostProcessor,
    copier: AssetCopier,
    overlay: Overlay,
}

impl SiteBuilder {
    /// Create a new site builder.
    pub fn new(config: BuildConfig) -> Self {
        let copier = AssetCopier::new(config.asset_extensions.iter().cloned());
        let overlay = Overlay::new(&config.overlay_dir, &config.highlight_theme);

        Self {
            config,
            converter: MarkdownConverter::new(),
            postprocessor: PostProcessor::new(),
            copier,
            overlay,
        }
    }

    /// Build the static site.
    ///
    /// Any failure aborts the build; files already written stay in place.
    pub async fn build(&self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        let output_dir = &self.config.output_dir;

        let metadata = self.read_metadata().await?;
        let templates = self.load_templates().await?;

        let files = walker::walk(&self.config.source_dir)?;
        tracing::info!(
            "Found {} files in {}",
            files.len(),
            self.config.source_dir.display()
        );

        let menu = match self.config.menu {
            MenuMode::Menu => self.build_menu(&files).await?,
            MenuMode::Plain => Menu::default(),
        };
        tracing::debug!("Menu has {} entries", menu.len());

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(fs_error(output_dir))?;

        let mut pages = 0;
        let mut assets = 0;

        for file in &files {
            let target = paths::output_path(output_dir, &file.relative);
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(fs_error(parent))?;
            }

            if file.is_markdown() {
                self.build_page(file, &target, &menu, &metadata, &templates)
                    .await?;
                pages += 1;
            } else if self.copier.is_asset(file) {
                self.copier.copy(&file.path, &target).await?;
                tracing::debug!("Copied {}", file.relative.display());
                assets += 1;
            } else {
                tracing::debug!("Skipping {}", file.relative.display());
            }
        }

        let overlays = self.overlay.write(output_dir).await?;

        Ok(BuildReport {
            pages,
            assets,
            overlays,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: output_dir.clone(),
        })
    }

    async fn read_metadata(&self) -> Result<BuildMetadata, BuildError> {
        let path = &self.config.metadata;
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(fs_error(path))?;

        BuildMetadata::parse(&json).map_err(|source| BuildError::Metadata {
            path: path.clone(),
            source,
        })
    }

    async fn load_templates(&self) -> Result<TemplateEngine, BuildError> {
        let Some(path) = &self.config.template else {
            return Ok(TemplateEngine::new());
        };

        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(fs_error(path))?;
        tracing::debug!("Loaded page template from {}", path.display());

        TemplateEngine::with_page_template(source).map_err(|source| BuildError::Template {
            path: path.clone(),
            source,
        })
    }

    /// Index every Markdown file into the global menu.
    async fn build_menu(&self, files: &[SourceFile]) -> Result<Menu, BuildError> {
        let mut entries = Vec::new();

        for file in files.iter().filter(|f| f.is_markdown()) {
            let markdown = tokio::fs::read_to_string(&file.path)
                .await
                .map_err(fs_error(&file.path))?;

            let index = index_document(&markdown);
            let url = paths::output_url(&file.relative);

            entries.push(MenuEntry {
                source_path: file.path.clone(),
                depth: paths::depth(&url),
                title: index.title,
                sections: index.sections.into_iter().map(Into::into).collect(),
                url,
                selected: false,
            });
        }

        Ok(Menu::build(entries))
    }

    fn highlighting(&self) -> Highlighting {
        if self.config.highlight {
            Highlighting::Classed {
                plain_language: self.config.plain_language.clone(),
            }
        } else {
            Highlighting::Off
        }
    }

    /// Render one Markdown file to `target`.
    async fn build_page(
        &self,
        file: &SourceFile,
        target: &Path,
        menu: &Menu,
        metadata: &BuildMetadata,
        templates: &TemplateEngine,
    ) -> Result<(), BuildError> {
        let markdown = tokio::fs::read_to_string(&file.path)
            .await
            .map_err(fs_error(&file.path))?;

        let html = self
            .converter
            .convert(&markdown, &self.highlighting())
            .map_err(|source| BuildError::Conversion {
                path: file.path.clone(),
                source,
            })?;

        let url = paths::output_url(&file.relative);
        let root = paths::relative_root(paths::depth(&url));

        let context = Context {
            title: index_document(&markdown).title,
            content: self.postprocessor.process(&html),
            version: metadata.version.clone(),
            menu: menu.localize(&file.path, &root),
            root,
        };

        let page = templates
            .render_page(&context)
            .map_err(|source| BuildError::Template {
                path: file.path.clone(),
                source,
            })?;

        tokio::fs::write(target, page)
            .await
            .map_err(fs_error(target))?;
        tracing::debug!("Rendered {} -> {}", file.relative.display(), url);

        Ok(())
    }
}
