//! Image URL resolution for backend-hosted images.

/// Shown when a product or collection has no image.
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder.svg";

/// Resolve an image path from the backend.
///
/// - empty or missing: [`PLACEHOLDER_IMAGE`]
/// - `http://` or `https://`: used as is
/// - leading `/`: appended to the base URL
/// - bare file name: served from the base URL's `/images/` directory
#[must_use]
pub fn image_url(base_url: &str, path: Option<&str>) -> String {
    let Some(path) = path.map(str::trim).filter(|p| !p.is_empty()) else {
        return PLACEHOLDER_IMAGE.to_owned();
    };
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_owned();
    }

    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/images/{path}")
    }
}

/// First non-empty image of a list, else `fallback`, resolved.
#[must_use]
pub fn product_image(base_url: &str, images: &[String], fallback: Option<&str>) -> String {
    let first = images
        .iter()
        .map(String::as_str)
        .find(|i| !i.trim().is_empty())
        .or(fallback);
    image_url(base_url, first)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://api.example.com/";

    #[test]
    fn test_image_url_variants() {
        assert_eq!(image_url(BASE, None), PLACEHOLDER_IMAGE);
        assert_eq!(image_url(BASE, Some("  ")), PLACEHOLDER_IMAGE);
        assert_eq!(
            image_url(BASE, Some("https://cdn.example.com/a.jpg")),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(
            image_url(BASE, Some("/uploads/a.jpg")),
            "https://api.example.com/uploads/a.jpg"
        );
        assert_eq!(image_url(BASE, Some("a.jpg")), "https://api.example.com/images/a.jpg");
    }

    #[test]
    fn test_product_image_falls_back() {
        assert_eq!(
            product_image(BASE, &[String::new(), "b.jpg".into()], None),
            "https://api.example.com/images/b.jpg"
        );
        assert_eq!(product_image(BASE, &[], Some("/c.png")), "https://api.example.com/c.png");
        assert_eq!(product_image(BASE, &[], None), PLACEHOLDER_IMAGE);
    }
}
