use crate::core::assets::AssetRegistry;
use crate::domain::model::SiteId;

/// Per-page render state: the site being viewed, the shortcode invocation
/// counter and the page's asset queue.
#[derive(Debug, Clone)]
pub struct RenderContext {
    current_site: SiteId,
    invocation: u32,
    assets: AssetRegistry,
}

impl RenderContext {
    pub fn new(current_site: SiteId, assets: AssetRegistry) -> Self {
        Self {
            current_site,
            invocation: 0,
            assets,
        }
    }

    pub fn current_site(&self) -> SiteId {
        self.current_site
    }

    /// Zero-based number of the invocation being rendered.
    pub fn invocation(&self) -> u32 {
        self.invocation
    }

    pub fn advance_invocation(&mut self) {
        self.invocation += 1;
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetRegistry {
        &mut self.assets
    }

    pub fn into_assets(self) -> AssetRegistry {
        self.assets
    }
}
