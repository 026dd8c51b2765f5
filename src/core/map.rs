use crate::core::context::RenderContext;
use crate::core::geojson::FeatureCollection;
use crate::core::SHORTCODE_TAG;
use crate::utils::error::Result;
use crate::utils::escape::{esc_attr, esc_html};
use serde_json::json;

pub const LEAFLET_HANDLE: &str = "leaflet";
pub const MAP_HANDLE: &str = "multisite-directory-map";
pub const UI_STRINGS_OBJECT: &str = "multisite_directory_map_ui_strings";

/// Container id for the current invocation, e.g. `site-directory-0`.
pub fn container_id(ctx: &RenderContext) -> String {
    format!("{}-{}", SHORTCODE_TAG, ctx.invocation())
}

/// JS global holding a container's feature collection.
pub fn data_object_name(id: &str) -> String {
    format!("multisite_directory_{}", id).replace('-', "_")
}

/// Queue map assets, hand `data` to the client script and emit the container.
pub fn render_map(
    ctx: &mut RenderContext,
    data: &FeatureCollection,
    style: &str,
    content: Option<&str>,
) -> Result<String> {
    let id = container_id(ctx);
    let assets = ctx.assets_mut();

    if !assets.script_is_enqueued(LEAFLET_HANDLE) || !assets.style_is_enqueued(LEAFLET_HANDLE) {
        assets.enqueue_style(LEAFLET_HANDLE);
        assets.enqueue_script(LEAFLET_HANDLE);
    }

    assets.localize_script(MAP_HANDLE, &data_object_name(&id), data)?;
    assets.localize_script(
        MAP_HANDLE,
        UI_STRINGS_OBJECT,
        &json!({ "i18n_no_sites_at_location": "No sites at this location." }),
    )?;

    assets.enqueue_style(MAP_HANDLE);
    assets.enqueue_script(MAP_HANDLE);

    let class = format!("{}-map", SHORTCODE_TAG);
    let mut html = format!(
        "<div id=\"{}\" class=\"{}\" style=\"{}\">",
        esc_attr(&id),
        esc_attr(&class),
        esc_attr(style)
    );
    if let Some(fallback) = content.filter(|c| !c.is_empty()) {
        html.push_str("<noscript>");
        html.push_str(&esc_html(fallback));
        html.push_str("</noscript>");
    }
    html.push_str("</div>");

    tracing::debug!("Rendered map container '{}' with {} features", id, data.features.len());
    Ok(html)
}
