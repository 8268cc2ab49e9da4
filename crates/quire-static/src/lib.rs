//! Static site generator for quire documentation.
//!
//! Walks a tree of Markdown sources, builds a navigation menu from their
//! headings, and renders every document into a page template next to
//! copied image assets and overlay stylesheets.

pub mod assets;
pub mod builder;
pub mod menu;
pub mod metadata;
pub mod paths;
pub mod templates;
pub mod walker;

pub use assets::{AssetCopier, AssetError, Overlay};
pub use builder::{BuildConfig, BuildError, BuildReport, MenuMode, SiteBuilder};
pub use menu::{Menu, MenuEntry, MenuSection};
pub use metadata::BuildMetadata;
pub use walker::{walk, SourceFile, WalkError};
