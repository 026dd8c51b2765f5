use crate::domain::model::{
    CategoryTerm, DirectoryEntry, EntryQuery, ImageSizes, SiteDetails, SiteId, TermQuery,
};
use crate::utils::error::Result;

/// The host platform's taxonomy, content and site registry.
///
/// Every directory lookup names the tenant it runs against, so there is no
/// ambient "current site" to switch and restore.
pub trait DirectoryStore: Send + Sync {
    fn is_multisite(&self) -> bool;

    /// Main site of the network; hosts the directory unless configured otherwise.
    fn main_site_id(&self) -> SiteId;

    fn terms(&self, tenant: SiteId, query: &TermQuery) -> Result<Vec<CategoryTerm>>;

    fn entries(&self, tenant: SiteId, query: &EntryQuery) -> Result<Vec<DirectoryEntry>>;

    fn site_details(&self, site: SiteId) -> Result<Option<SiteDetails>>;
}

pub trait ConfigProvider: Send + Sync {
    /// Explicit directory tenant; `None` falls back to the main site.
    fn directory_site(&self) -> Option<SiteId>;
    fn plugin_url(&self) -> &str;
    fn image_sizes(&self) -> &ImageSizes;
}
