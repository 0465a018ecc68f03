//! HTML gallery rendering for fetched media items
//!
//! The output is a single container element wrapping one `<img>` per
//! item, in input order. Both attribute values come from the remote
//! service, so they are treated as untrusted: the URL is re-serialized
//! through a parser and every attribute value is HTML-escaped.

use url::Url;

use crate::media::MediaItem;

/// CSS class applied to the gallery container.
pub const GALLERY_CLASS: &str = "photo-album-gallery";

/// Renders media items as an embeddable HTML gallery fragment.
///
/// An empty input yields the empty container, not an error.
///
/// # Examples
///
/// ```
/// use photoembed::media::MediaItem;
/// use photoembed::render::render_gallery;
///
/// let items = vec![MediaItem {
///     id: "m1".to_string(),
///     base_url: "https://x/y".to_string(),
///     description: "cat".to_string(),
/// }];
///
/// let html = render_gallery(&items);
/// assert_eq!(
///     html,
///     "<div class=\"photo-album-gallery\"><img src=\"https://x/y\" alt=\"cat\"></div>"
/// );
/// ```
pub fn render_gallery(items: &[MediaItem]) -> String {
    let mut html = format!("<div class=\"{GALLERY_CLASS}\">");
    for item in items {
        let src = sanitize_url(&item.base_url);
        html.push_str("<img src=\"");
        html.push_str(&escape_attr(&src));
        html.push_str("\" alt=\"");
        html.push_str(&escape_attr(&item.description));
        html.push_str("\">");
    }
    html.push_str("</div>");
    html
}

/// Sanitizes an upstream-supplied URL for use in a `src` attribute.
///
/// The value is parsed and re-serialized so that reserved characters are
/// percent-encoded. Anything unparsable, or with a scheme other than
/// http(s), renders as an empty `src` rather than being echoed through.
fn sanitize_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url.to_string(),
        _ => String::new(),
    }
}

/// Escapes a string for use inside a double-quoted HTML attribute.
fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
