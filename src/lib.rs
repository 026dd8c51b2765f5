pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::InMemoryNetwork;
pub use config::{network::NetworkConfig, DirectorySettings};
pub use crate::core::{
    assets::AssetRegistry, context::RenderContext, directory::SiteDirectory,
    registry::ShortcodeRegistry, SHORTCODE_TAG,
};
pub use domain::model::RawAttributes;
pub use utils::error::{DirectoryError, Result};
