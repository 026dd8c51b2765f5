use crate::config::DEFAULT_PLUGIN_URL;
use crate::domain::model::{Image, ImageSizes, SiteId, TermId, PostId};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{DirectoryError, Result};
use crate::utils::validation::{validate_positive_number, validate_unique_ids, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// A network description: sites, directory categories and directory entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub network: NetworkSection,
    #[serde(default)]
    pub assets: HostAssets,
    #[serde(default)]
    pub image_sizes: BTreeMap<String, (u32, u32)>,
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
    #[serde(default)]
    pub terms: Vec<TermConfig>,
    #[serde(default)]
    pub entries: Vec<EntryConfig>,
    #[serde(skip)]
    resolved_sizes: ImageSizes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSection {
    #[serde(default = "default_true")]
    pub multisite: bool,
    #[serde(default = "default_main_site")]
    pub main_site: SiteId,
    pub directory_site: Option<SiteId>,
    #[serde(default = "default_plugin_url")]
    pub plugin_url: String,
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            multisite: true,
            main_site: default_main_site(),
            directory_site: None,
            plugin_url: default_plugin_url(),
        }
    }
}

/// Libraries the host page already provides (Leaflet, jQuery).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostAssets {
    #[serde(default = "default_leaflet_script")]
    pub leaflet_script: String,
    #[serde(default = "default_leaflet_style")]
    pub leaflet_style: String,
    #[serde(default = "default_jquery_script")]
    pub jquery_script: String,
}

impl Default for HostAssets {
    fn default() -> Self {
        Self {
            leaflet_script: default_leaflet_script(),
            leaflet_style: default_leaflet_style(),
            jquery_script: default_jquery_script(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub id: SiteId,
    pub name: String,
    pub url: String,
    pub custom_logo: Option<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermConfig {
    pub id: TermId,
    pub name: String,
    pub slug: String,
    /// `"lat,lng"` string or an already-structured value.
    pub geo: Option<serde_json::Value>,
    #[serde(default)]
    pub meta: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryConfig {
    pub id: PostId,
    pub site: SiteId,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    /// Category slugs.
    #[serde(default)]
    pub categories: Vec<String>,
    pub thumbnail: Option<Image>,
}

fn default_true() -> bool {
    true
}

fn default_main_site() -> SiteId {
    1
}

fn default_plugin_url() -> String {
    DEFAULT_PLUGIN_URL.to_string()
}

fn default_leaflet_script() -> String {
    "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js".to_string()
}

fn default_leaflet_style() -> String {
    "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css".to_string()
}

fn default_jquery_script() -> String {
    "https://code.jquery.com/jquery-3.7.1.min.js".to_string()
}

impl NetworkConfig {
    /// 從 TOML 檔案載入網路設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DirectoryError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let mut config: Self = toml::from_str(&processed_content).map_err(|e| DirectoryError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })?;

        let mut sizes = ImageSizes::default();
        for (name, dimensions) in &config.image_sizes {
            sizes.insert(name.clone(), *dimensions);
        }
        config.resolved_sizes = sizes;

        tracing::debug!(
            "Loaded network: {} sites, {} categories, {} entries",
            config.sites.len(),
            config.terms.len(),
            config.entries.len()
        );
        Ok(config)
    }

    /// 替換環境變數 (例如 ${SITE_URL})
    fn substitute_env_vars(content: &str) -> String {
        static RE: OnceLock<regex::Regex> = OnceLock::new();
        let re = RE.get_or_init(|| regex::Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn directory_tenant(&self) -> SiteId {
        self.network.directory_site.unwrap_or(self.network.main_site)
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_positive_number("network.main_site", self.network.main_site, 1)?;
        validate_url("network.plugin_url", &self.network.plugin_url)?;
        validate_url("assets.leaflet_script", &self.assets.leaflet_script)?;
        validate_url("assets.leaflet_style", &self.assets.leaflet_style)?;
        validate_url("assets.jquery_script", &self.assets.jquery_script)?;

        validate_unique_ids("sites.id", self.sites.iter().map(|s| s.id))?;
        validate_unique_ids("terms.id", self.terms.iter().map(|t| t.id))?;
        validate_unique_ids("entries.id", self.entries.iter().map(|e| e.id))?;

        for site in &self.sites {
            validate_url(&format!("sites[{}].url", site.id), &site.url)?;
        }

        let tenant = self.directory_tenant();
        if !self.sites.is_empty() && !self.sites.iter().any(|s| s.id == tenant) {
            return Err(DirectoryError::InvalidConfigValueError {
                field: "network.directory_site".to_string(),
                value: tenant.to_string(),
                reason: "Directory site is not one of the configured sites".to_string(),
            });
        }

        for entry in &self.entries {
            if !self.sites.iter().any(|s| s.id == entry.site) {
                return Err(DirectoryError::InvalidConfigValueError {
                    field: format!("entries[{}].site", entry.id),
                    value: entry.site.to_string(),
                    reason: "Unknown site".to_string(),
                });
            }
            if let Some(slug) = entry
                .categories
                .iter()
                .find(|slug| !self.terms.iter().any(|t| &t.slug == *slug))
            {
                return Err(DirectoryError::InvalidConfigValueError {
                    field: format!("entries[{}].categories", entry.id),
                    value: slug.clone(),
                    reason: "Unknown category slug".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl ConfigProvider for NetworkConfig {
    fn directory_site(&self) -> Option<SiteId> {
        self.network.directory_site
    }

    fn plugin_url(&self) -> &str {
        &self.network.plugin_url
    }

    fn image_sizes(&self) -> &ImageSizes {
        &self.resolved_sizes
    }
}

impl Validate for NetworkConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
