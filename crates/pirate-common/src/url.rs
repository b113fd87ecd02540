//! URL resolution utilities.
//!
//! [URL Standard](https://url.spec.whatwg.org/)

use url::Url;

/// Fixed base used when a source string is not a full URL by itself.
///
/// Synthetic sheet identifiers (`internal_0`) and protocol-relative hrefs
/// still need a pathname so a display filename can be derived from them.
const DUMMY_BASE: &str = "https://example.com/";

/// [§ 2.5 URLs](https://html.spec.whatwg.org/multipage/urls-and-fetching.html#resolving-urls)
///
/// Resolve a potentially relative URL against a base URL.
///
/// STEP 1: "If url is an absolute URL, return url."
///
/// STEP 2: "Otherwise, resolve url relative to base."
///
/// Resolution failures fall back to returning `href` unchanged; rebasing is a
/// preview convenience, and a reference we cannot resolve is still better
/// displayed than dropped.
#[must_use]
pub fn resolve_url(href: &str, base_url: Option<&str>) -> String {
    if let Ok(absolute) = Url::parse(href) {
        return absolute.into();
    }

    let Some(base) = base_url else {
        return href.to_string();
    };

    match Url::parse(base).and_then(|base| base.join(href)) {
        Ok(resolved) => resolved.into(),
        Err(_) => href.to_string(),
    }
}

/// Derive the display filename of a stylesheet source: the final path segment
/// of the source resolved against a fixed dummy base.
///
/// The dummy base tolerates protocol-relative hrefs (`//cdn.example.com/a.css`)
/// and bare identifiers (`internal_0`) that are not URLs on their own.
#[must_use]
pub fn filename_of(source: &str) -> String {
    let path = match Url::parse(DUMMY_BASE).and_then(|base| base.join(source)) {
        Ok(url) => url.path().to_string(),
        Err(_) => source.to_string(),
    };
    path.rsplit('/').next().unwrap_or(&path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_url_passes_through() {
        assert_eq!(
            resolve_url("https://a.com/x.png", Some("https://b.com/")),
            "https://a.com/x.png"
        );
    }

    #[test]
    fn relative_url_joins_base_directory() {
        assert_eq!(
            resolve_url("a.png", Some("https://x.com/dir/")),
            "https://x.com/dir/a.png"
        );
        assert_eq!(
            resolve_url("../a.png", Some("https://x.com/dir/sub/page.html")),
            "https://x.com/dir/a.png"
        );
    }

    #[test]
    fn absolute_path_joins_origin() {
        assert_eq!(
            resolve_url("/a.png", Some("https://x.com/dir/page.html")),
            "https://x.com/a.png"
        );
    }

    #[test]
    fn protocol_relative_url_takes_base_scheme() {
        assert_eq!(
            resolve_url("//cdn.com/a.css", Some("https://x.com/")),
            "https://cdn.com/a.css"
        );
    }

    #[test]
    fn missing_base_returns_input() {
        assert_eq!(resolve_url("a.png", None), "a.png");
    }

    #[test]
    fn filename_of_href_strips_directories_and_query() {
        assert_eq!(filename_of("https://x.com/css/site.css?v=3"), "site.css");
        assert_eq!(filename_of("//cdn.com/theme/dark.css"), "dark.css");
    }

    #[test]
    fn filename_of_synthetic_source_is_the_source() {
        assert_eq!(filename_of("internal_0"), "internal_0");
    }
}
