use crate::core::assets::AssetRegistry;
use crate::core::attributes::ShortcodeOptions;
use crate::core::context::RenderContext;
use crate::core::geojson::MapDataBuilder;
use crate::core::list::render_list;
use crate::core::map::{render_map, MAP_HANDLE};
use crate::core::query::DirectoryQuery;
use crate::core::registry::ShortcodeRegistry;
use crate::core::SHORTCODE_TAG;
use crate::domain::model::{DisplayMode, RawAttributes, SiteId};
use crate::domain::ports::{ConfigProvider, DirectoryStore};
use crate::utils::error::{DirectoryError, Result};

/// One parsed `[site-directory]` invocation.
#[derive(Debug, Clone)]
pub struct SiteDirectoryShortcode {
    options: ShortcodeOptions,
    content: Option<String>,
}

impl SiteDirectoryShortcode {
    pub fn new(raw: &RawAttributes, content: Option<&str>) -> Result<Self> {
        Ok(Self {
            options: ShortcodeOptions::from_attributes(raw)?,
            content: content.map(str::to_string),
        })
    }
}

/// The site directory feature bound to a store and its settings.
pub struct SiteDirectory<S: DirectoryStore, C: ConfigProvider> {
    store: S,
    config: C,
}

impl<S: DirectoryStore, C: ConfigProvider> SiteDirectory<S, C> {
    pub fn new(store: S, config: C) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// Tenant holding the directory data.
    pub fn directory_site(&self) -> SiteId {
        self.config
            .directory_site()
            .unwrap_or_else(|| self.store.main_site_id())
    }

    pub fn query(&self) -> DirectoryQuery<'_, S> {
        DirectoryQuery::new(&self.store, self.directory_site())
    }

    /// Declare the shortcode and the map assets. Nothing is enqueued here.
    pub fn register<'a>(&'a self, shortcodes: &mut ShortcodeRegistry<'a>, assets: &mut AssetRegistry) {
        shortcodes.add(SHORTCODE_TAG, move |ctx, raw, content| {
            self.do_shortcode(ctx, raw, content)
        });

        let base = self.config.plugin_url().trim_end_matches('/');
        assets.register_style(MAP_HANDLE, &format!("{}/public/css/multisite-directory-map.css", base), &[]);
        assets.register_script(
            MAP_HANDLE,
            &format!("{}/public/js/multisite-directory-map.js", base),
            &["leaflet", "jquery"],
            true,
        );

        tracing::debug!("Registered [{}] shortcode and map assets", SHORTCODE_TAG);
    }

    /// Shortcode handler. Always returns markup (possibly empty) and advances
    /// the invocation counter.
    pub fn do_shortcode(&self, ctx: &mut RenderContext, raw: &RawAttributes, content: Option<&str>) -> String {
        let html = match self.render(ctx, raw, content) {
            Ok(html) => html,
            Err(DirectoryError::NotApplicable) => {
                tracing::debug!("[{}] used outside a multisite network", SHORTCODE_TAG);
                String::new()
            }
            Err(e) => {
                tracing::warn!("[{}] rendered empty: {} ({:?})", SHORTCODE_TAG, e, e.category());
                String::new()
            }
        };
        ctx.advance_invocation();
        html
    }

    pub fn render(&self, ctx: &mut RenderContext, raw: &RawAttributes, content: Option<&str>) -> Result<String> {
        if !self.store.is_multisite() {
            return Err(DirectoryError::NotApplicable);
        }
        let shortcode = SiteDirectoryShortcode::new(raw, content)?;
        self.prepare(ctx, &shortcode)
    }

    fn prepare(&self, ctx: &mut RenderContext, shortcode: &SiteDirectoryShortcode) -> Result<String> {
        let options = &shortcode.options;
        let query = self.query();
        let sizes = self.config.image_sizes();

        match &options.display {
            DisplayMode::Map => {
                let terms = query.location_terms(&options.query_args).unwrap_or_else(|e| {
                    tracing::warn!("Site directory location query failed: {}", e);
                    Vec::new()
                });
                let data = MapDataBuilder::new(&query, &options.logo_size, sizes).build(&terms);
                render_map(ctx, &data, &options.style, shortcode.content.as_deref())
            }
            DisplayMode::List => Ok(render_list(&query, ctx.current_site(), options, sizes)),
            DisplayMode::Other(mode) => {
                tracing::debug!("Unknown display '{}', nothing to render", mode);
                Ok(String::new())
            }
        }
    }
}
