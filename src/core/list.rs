use crate::core::attributes::ShortcodeOptions;
use crate::core::query::DirectoryQuery;
use crate::domain::model::{CategoryTerm, ImageSizes, QueryArgs, SiteDetails, SiteId};
use crate::domain::ports::DirectoryStore;
use crate::utils::error::Result;
use crate::utils::escape::{esc_html, esc_url};
use serde_json::Value;
use std::fmt::Write;

/// Render the directory as nested category/site lists.
///
/// Query failures render nothing.
pub fn render_list<S: DirectoryStore + ?Sized>(
    query: &DirectoryQuery<'_, S>,
    current_site: SiteId,
    options: &ShortcodeOptions,
    sizes: &ImageSizes,
) -> String {
    let terms = match list_terms(query, options) {
        Ok(terms) => terms,
        Err(e) => {
            tracing::warn!("Site directory category query failed: {}", e);
            return String::new();
        }
    };
    if terms.is_empty() {
        return String::new();
    }

    let mut html = String::from("<ul class=\"network-directory-sites\">\n");
    for term in &terms {
        let sites: Vec<SiteDetails> = match query.sites_by_term(term, &options.query_args) {
            Ok(sites) => sites
                .into_iter()
                .filter(|site| site.blog_id != current_site)
                .collect(),
            Err(e) => {
                tracing::warn!("Site lookup for category '{}' failed: {}", term.slug, e);
                continue;
            }
        };
        if sites.is_empty() {
            continue;
        }

        let _ = writeln!(html, "<li>{}", esc_html(&term.name));
        html.push_str("<ul>\n");
        for site in &sites {
            html.push_str("<li>");
            if options.show_site_logo {
                match query.logo(site.blog_id, &options.logo_size, sizes) {
                    Ok(logo) => html.push_str(&logo),
                    Err(e) => tracing::warn!("Logo lookup for site {} failed: {}", site.blog_id, e),
                }
            }
            let _ = writeln!(
                html,
                "<a href=\"{}\">{}</a></li>",
                esc_url(&site.siteurl),
                esc_html(&site.blogname)
            );
        }
        html.push_str("</ul>\n</li>\n");
    }
    html.push_str("</ul>\n");

    html
}

fn list_terms<S: DirectoryStore + ?Sized>(
    query: &DirectoryQuery<'_, S>,
    options: &ShortcodeOptions,
) -> Result<Vec<CategoryTerm>> {
    match &options.query_terms {
        Some(slugs) => {
            let mut args = QueryArgs::new();
            args.insert(
                "slug".to_string(),
                Value::Array(slugs.iter().cloned().map(Value::String).collect()),
            );
            query.terms(&args)
        }
        None => query.terms(&options.query_args),
    }
}
