mod common;

use serde_json::json;
use site_directory::core::geojson::FeatureCollection;
use site_directory::core::map::{LEAFLET_HANDLE, MAP_HANDLE, UI_STRINGS_OBJECT};
use site_directory::{RawAttributes, SHORTCODE_TAG};

fn feature_collection(ctx: &site_directory::RenderContext, object_name: &str) -> FeatureCollection {
    let payload = ctx.assets().localized(object_name).unwrap().clone();
    serde_json::from_value(payload).unwrap()
}

#[test]
fn test_map_container_markup() {
    let directory = common::directory();
    let (shortcodes, mut ctx) = common::setup(&directory, 1);

    let html = shortcodes
        .invoke(
            SHORTCODE_TAG,
            &mut ctx,
            &RawAttributes::new().with("style", "height: 400px;"),
            None,
        )
        .unwrap();

    assert_eq!(
        html,
        "<div id=\"site-directory-0\" class=\"site-directory-map\" style=\"height: 400px;\"></div>"
    );
}

#[test]
fn test_sequential_maps_get_distinct_ids() {
    let directory = common::directory();
    let (shortcodes, mut ctx) = common::setup(&directory, 1);

    let first = shortcodes
        .invoke(SHORTCODE_TAG, &mut ctx, &RawAttributes::new(), None)
        .unwrap();
    let second = shortcodes
        .invoke(SHORTCODE_TAG, &mut ctx, &RawAttributes::new(), None)
        .unwrap();

    assert!(first.contains("id=\"site-directory-0\""));
    assert!(second.contains("id=\"site-directory-1\""));
    assert!(ctx.assets().localized("multisite_directory_site_directory_0").is_some());
    assert!(ctx.assets().localized("multisite_directory_site_directory_1").is_some());
}

#[test]
fn test_feature_positions_are_lng_lat() {
    let directory = common::directory();
    let (shortcodes, mut ctx) = common::setup(&directory, 1);
    shortcodes.invoke(SHORTCODE_TAG, &mut ctx, &RawAttributes::new(), None);

    let payload = ctx
        .assets()
        .localized("multisite_directory_site_directory_0")
        .unwrap();
    assert_eq!(payload["type"], "FeatureCollection");

    let features = payload["features"].as_array().unwrap();
    let slugs: Vec<_> = features
        .iter()
        .map(|f| f["properties"]["slug"].as_str().unwrap())
        .collect();
    // 沒有 geo 的分類不在地圖上
    assert_eq!(slugs, vec!["news", "sports", "structured"]);

    assert_eq!(features[0]["geometry"], json!({"type": "Point", "coordinates": [-71.06, 42.36]}));
    assert_eq!(features[1]["geometry"]["coordinates"], json!([-74.01, 40.71]));
    assert_eq!(features[2]["geometry"]["coordinates"], json!([1.5, 2.5]));
}

#[test]
fn test_feature_site_summaries() {
    let directory = common::directory();
    let (shortcodes, mut ctx) = common::setup(&directory, 1);
    shortcodes.invoke(SHORTCODE_TAG, &mut ctx, &RawAttributes::new(), None);

    let collection = feature_collection(&ctx, "multisite_directory_site_directory_0");
    let news = &collection.features[0];
    assert_eq!(news.properties.id, 10);
    assert_eq!(news.properties.name, "News");
    assert_eq!(news.properties.sites.len(), 2);

    let harbor = &news.properties.sites[0];
    assert_eq!(harbor.post_name, "harbor-news");
    assert_eq!(harbor.post_title, "Harbor News");
    assert_eq!(harbor.post_excerpt, "Daily news from the harbor");
    assert_eq!(harbor.meta.siteurl, "https://harbor.example.com");
    assert!(harbor.meta.sitelogo.starts_with("<img width=\"72\" height=\"72\""));

    let valley = &news.properties.sites[1];
    assert_eq!(valley.meta.siteurl, "https://valley.example.com");
    assert!(valley.meta.sitelogo.contains("custom-logo"));

    assert!(collection.features[2].properties.sites.is_empty());
}

#[test]
fn test_ui_strings_are_localized() {
    let directory = common::directory();
    let (shortcodes, mut ctx) = common::setup(&directory, 1);
    shortcodes.invoke(SHORTCODE_TAG, &mut ctx, &RawAttributes::new(), None);

    assert_eq!(
        ctx.assets().localized(UI_STRINGS_OBJECT),
        Some(&json!({"i18n_no_sites_at_location": "No sites at this location."}))
    );
}

#[test]
fn test_assets_are_enqueued_once() {
    let directory = common::directory();
    let (shortcodes, mut ctx) = common::setup(&directory, 1);

    // 註冊時不應排入佇列
    assert!(!ctx.assets().script_is_enqueued(MAP_HANDLE));

    shortcodes.invoke(SHORTCODE_TAG, &mut ctx, &RawAttributes::new(), None);
    shortcodes.invoke(SHORTCODE_TAG, &mut ctx, &RawAttributes::new(), None);

    assert!(ctx.assets().script_is_enqueued(LEAFLET_HANDLE));
    assert!(ctx.assets().style_is_enqueued(MAP_HANDLE));

    let head = ctx.assets().print_head().unwrap();
    assert_eq!(head.matches("id='leaflet-css'").count(), 1);
    assert!(head.contains(
        "href='https://example.com/wp-content/plugins/multisite-directory/public/css/multisite-directory-map.css'"
    ));
    assert!(head.contains("jquery-js"));

    let footer = ctx.assets().print_footer().unwrap();
    assert_eq!(footer.matches("id=\"leaflet-js\"").count(), 1);
    assert_eq!(footer.matches("id=\"multisite-directory-map-js\"").count(), 1);
    let leaflet = footer.find("id=\"leaflet-js\"").unwrap();
    let extra = footer.find("multisite-directory-map-js-extra").unwrap();
    let script = footer.find("id=\"multisite-directory-map-js\"").unwrap();
    assert!(leaflet < extra && extra < script);
    assert!(footer.contains("var multisite_directory_site_directory_0 = {\"type\":\"FeatureCollection\""));
    assert!(footer.contains("var multisite_directory_site_directory_1 = "));
}

#[test]
fn test_noscript_fallback_content() {
    let directory = common::directory();
    let (shortcodes, mut ctx) = common::setup(&directory, 1);

    let html = shortcodes
        .invoke(
            SHORTCODE_TAG,
            &mut ctx,
            &RawAttributes::new(),
            Some("Enable JavaScript <please>"),
        )
        .unwrap();
    assert!(html.ends_with("<noscript>Enable JavaScript &lt;please&gt;</noscript></div>"));
}

#[test]
fn test_map_category_filter() {
    let directory = common::directory();
    let (shortcodes, mut ctx) = common::setup(&directory, 1);
    let query_args = urlencoding::encode(r#"{"slug":["sports"]}"#).into_owned();
    shortcodes.invoke(
        SHORTCODE_TAG,
        &mut ctx,
        &RawAttributes::new().with("query_args", query_args),
        None,
    );

    let collection = feature_collection(&ctx, "multisite_directory_site_directory_0");
    assert_eq!(collection.features.len(), 1);
    assert_eq!(collection.features[0].properties.slug, "sports");
}
