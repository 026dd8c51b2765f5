use crate::domain::model::{Image, ImageSizes, LogoSize, SiteDetails};
use crate::utils::escape::{esc_attr, esc_url};
use std::fmt::Write;

/// Featured-image markup for a directory entry, sized for `size`.
pub fn thumbnail_html(image: &Image, size: &LogoSize, sizes: &ImageSizes) -> String {
    let src = esc_url(&image.src);
    if src.is_empty() {
        return String::new();
    }

    let dimensions = sizes
        .resolve(size)
        .or_else(|| image.width.zip(image.height));
    let suffix = size.class_suffix();

    let mut html = String::from("<img");
    if let Some((width, height)) = dimensions {
        let _ = write!(html, " width=\"{}\" height=\"{}\"", width, height);
    }
    let _ = write!(
        html,
        " src=\"{}\" class=\"attachment-{} size-{} wp-post-image\" alt=\"{}\" />",
        src,
        esc_attr(&suffix),
        esc_attr(&suffix),
        esc_attr(&image.alt)
    );
    html
}

/// The site's own custom logo, linked to its home page. Empty when it has none.
pub fn custom_logo_html(site: &SiteDetails) -> String {
    let Some(image) = &site.custom_logo else {
        return String::new();
    };
    let src = esc_url(&image.src);
    if src.is_empty() {
        return String::new();
    }

    let alt = if image.alt.is_empty() {
        &site.blogname
    } else {
        &image.alt
    };

    let mut html = format!(
        "<a href=\"{}\" class=\"custom-logo-link\" rel=\"home\"><img",
        esc_url(&site.siteurl)
    );
    if let (Some(width), Some(height)) = (image.width, image.height) {
        let _ = write!(html, " width=\"{}\" height=\"{}\"", width, height);
    }
    let _ = write!(
        html,
        " src=\"{}\" class=\"custom-logo\" alt=\"{}\" /></a>",
        src,
        esc_attr(alt)
    );
    html
}
