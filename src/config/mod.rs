#[cfg(feature = "cli")]
pub mod cli;
pub mod network;

use crate::domain::model::{ImageSizes, SiteId};
use crate::domain::ports::ConfigProvider;

pub const DEFAULT_PLUGIN_URL: &str = "http://localhost/wp-content/plugins/multisite-directory";

/// Plain settings for embedding the directory without a network file.
#[derive(Debug, Clone)]
pub struct DirectorySettings {
    pub directory_site: Option<SiteId>,
    pub plugin_url: String,
    pub image_sizes: ImageSizes,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            directory_site: None,
            plugin_url: DEFAULT_PLUGIN_URL.to_string(),
            image_sizes: ImageSizes::default(),
        }
    }
}

impl ConfigProvider for DirectorySettings {
    fn directory_site(&self) -> Option<SiteId> {
        self.directory_site
    }

    fn plugin_url(&self) -> &str {
        &self.plugin_url
    }

    fn image_sizes(&self) -> &ImageSizes {
        &self.image_sizes
    }
}
