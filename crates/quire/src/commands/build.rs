//! Static site build command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use quire_static::{BuildConfig, MenuMode, SiteBuilder};
use serde::Deserialize;

/// File name of the page template looked up in the overlay directory.
const OVERLAY_TEMPLATE: &str = "index.html";

/// Command-line overrides for the build command.
#[derive(Debug, Default, Args)]
pub struct BuildArgs {
    /// Source directory (defaults to config or "book")
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Output directory (defaults to config or "docs")
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overlay directory with stylesheets and page template
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Render pages without the navigation menu
    #[arg(long)]
    no_menu: bool,
}

/// Configuration file structure (quire.toml).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    site: SiteSection,
    build: BuildSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SiteSection {
    source: PathBuf,
    output: PathBuf,
    overlay: PathBuf,
    /// Page template; `<overlay>/index.html` when unset and present
    template: Option<PathBuf>,
    metadata: PathBuf,
}

impl Default for SiteSection {
    fn default() -> Self {
        let defaults = BuildConfig::default();
        Self {
            source: defaults.source_dir,
            output: defaults.output_dir,
            overlay: defaults.overlay_dir,
            template: None,
            metadata: defaults.metadata,
        }
    }
}

impl SiteSection {
    /// Resolve relative paths against `base`, the directory holding the config file.
    fn rebase(&mut self, base: &Path) {
        for path in [
            &mut self.source,
            &mut self.output,
            &mut self.overlay,
            &mut self.metadata,
        ] {
            *path = base.join(&*path);
        }
        if let Some(template) = &mut self.template {
            *template = base.join(&*template);
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct BuildSection {
    menu: bool,
    highlight: bool,
    highlight_theme: String,
    plain_language: String,
    assets: Vec<String>,
}

impl Default for BuildSection {
    fn default() -> Self {
        let defaults = BuildConfig::default();
        Self {
            menu: true,
            highlight: defaults.highlight,
            highlight_theme: defaults.highlight_theme,
            plain_language: defaults.plain_language,
            assets: defaults.asset_extensions,
        }
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
///
/// Paths in `[site]` are relative to the config file, not the working directory.
fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let mut config: ConfigFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        config
            .site
            .rebase(path.parent().unwrap_or_else(|| Path::new("")));
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

/// Merge the config file with command-line overrides.
fn resolve(file: ConfigFile, args: BuildArgs) -> BuildConfig {
    let overlay_dir = args.overlay.unwrap_or(file.site.overlay);

    let template = file.site.template.or_else(|| {
        let candidate = overlay_dir.join(OVERLAY_TEMPLATE);
        candidate.exists().then_some(candidate)
    });

    let menu = if args.no_menu || !file.build.menu {
        MenuMode::Plain
    } else {
        MenuMode::Menu
    };

    BuildConfig {
        source_dir: args.source.unwrap_or(file.site.source),
        output_dir: args.output.unwrap_or(file.site.output),
        overlay_dir,
        template,
        metadata: file.site.metadata,
        menu,
        highlight: file.build.highlight,
        highlight_theme: file.build.highlight_theme,
        plain_language: file.build.plain_language,
        asset_extensions: file.build.assets,
    }
}

/// Run the build command.
pub async fn run(config_path: &Path, args: BuildArgs) -> Result<()> {
    tracing::info!("Building static site...");

    let config = resolve(load_config(config_path)?, args);
    match &config.template {
        Some(template) => tracing::info!("Using page template {}", template.display()),
        None => tracing::info!("Using built-in page template"),
    }

    let report = SiteBuilder::new(config).build().await?;

    tracing::info!(
        "Built {} pages and copied {} assets in {}ms",
        report.pages,
        report.assets,
        report.duration_ms
    );

    tracing::info!("Output: {}", report.output_dir.display());

    Ok(())
}
