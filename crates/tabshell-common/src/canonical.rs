//! URL canonicalisation and destination classes.
//!
//! Canonical URLs are only used for equivalence checks (duplicate tabs,
//! no-op navigations, in-flight keys). They are never loaded.

use serde::{Deserialize, Serialize};
use url::Url;

/// Reserved scheme for first-party destinations.
pub const INTERNAL_SCHEME: &str = "tabshell";

/// Query parameters that never change what a page shows.
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_cid", "mc_eid", "ref_src"];

/// The only kind distinction the view pool cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationClass {
    /// `tabshell://` pages: content viewer, notebook viewer, core pages.
    Internal,
    /// Everything else.
    Web,
}

impl DestinationClass {
    pub const ALL: [DestinationClass; 2] = [DestinationClass::Internal, DestinationClass::Web];

    /// Classify by scheme only.
    pub fn of(url: &str) -> Self {
        if is_internal(url) {
            Self::Internal
        } else {
            Self::Web
        }
    }

    /// The URL a pre-warmed surface of this class idles on.
    pub fn blank_url(self) -> &'static str {
        match self {
            Self::Internal => "tabshell://core/blank",
            Self::Web => "about:blank",
        }
    }
}

/// Whether `url` uses the reserved internal scheme.
pub fn is_internal(url: &str) -> bool {
    let trimmed = url.trim_start();
    trimmed
        .get(..INTERNAL_SCHEME.len() + 1)
        .map(|prefix| prefix.eq_ignore_ascii_case("tabshell:"))
        .unwrap_or(false)
}

/// First-party routes under the internal scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalRoute {
    /// Content viewer for a resource in the content store.
    Resource(String),
    /// Notebook viewer.
    Notebook(String),
    /// Any other built-in page (`core/<page>`).
    Core(String),
}

impl InternalRoute {
    pub fn parse(url: &str) -> Option<Self> {
        if !is_internal(url) {
            return None;
        }
        let rest = url.trim()[INTERNAL_SCHEME.len() + 1..].trim_start_matches('/');
        let rest = rest.split(['?', '#']).next().unwrap_or("");
        let (section, id) = rest.split_once('/').unwrap_or((rest, ""));
        let id = id.trim_end_matches('/');

        match section {
            "resource" if !id.is_empty() => Some(Self::Resource(id.to_string())),
            "notebook" if !id.is_empty() => Some(Self::Notebook(id.to_string())),
            "core" if !id.is_empty() => Some(Self::Core(id.to_string())),
            _ => None,
        }
    }

    pub fn to_url(&self) -> String {
        match self {
            Self::Resource(id) => format!("{INTERNAL_SCHEME}://resource/{id}"),
            Self::Notebook(id) => format!("{INTERNAL_SCHEME}://notebook/{id}"),
            Self::Core(page) => format!("{INTERNAL_SCHEME}://core/{page}"),
        }
    }
}

/// Normalise a URL for equivalence checks.
///
/// Drops fragments, a leading `www.`, trailing path slashes and tracking
/// parameters. Unparseable input is returned trimmed.
pub fn canonical_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(mut url) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };

    url.set_fragment(None);

    if !matches!(url.scheme(), "http" | "https") {
        let mut s = url.to_string();
        while s.ends_with('/') && !s.ends_with("://") {
            s.pop();
        }
        return s;
    }

    if let Some(stripped) = url.host_str().and_then(|h| h.strip_prefix("www.")) {
        let stripped = stripped.to_string();
        url.set_host(Some(&stripped)).ok();
    }

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let kept: Vec<&(String, String)> = pairs
        .iter()
        .filter(|(k, _)| !is_tracking_param(k))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else if kept.len() != pairs.len() {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    let mut s = url.to_string();
    if url.path() == "/" && url.query().is_none() {
        s.pop();
    }
    s
}

/// Canonical equivalence of two URLs.
pub fn is_same_destination(a: &str, b: &str) -> bool {
    canonical_url(a) == canonical_url(b)
}

/// Host of a URL without `www.`, lowercased.
pub fn host_of(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_ascii_lowercase())
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Destination classes --

    #[test]
    fn classifies_internal_scheme() {
        assert_eq!(
            DestinationClass::of("tabshell://resource/abc"),
            DestinationClass::Internal
        );
        assert_eq!(
            DestinationClass::of("TABSHELL://core/home"),
            DestinationClass::Internal
        );
    }

    #[test]
    fn classifies_everything_else_as_web() {
        assert_eq!(DestinationClass::of("https://example.com"), DestinationClass::Web);
        assert_eq!(DestinationClass::of("about:blank"), DestinationClass::Web);
        assert_eq!(DestinationClass::of("tab"), DestinationClass::Web);
        assert_eq!(DestinationClass::of(""), DestinationClass::Web);
    }

    #[test]
    fn blank_urls_match_their_class() {
        for class in DestinationClass::ALL {
            assert_eq!(DestinationClass::of(class.blank_url()), class);
        }
    }

    // -- Internal routes --

    #[test]
    fn parses_resource_route() {
        assert_eq!(
            InternalRoute::parse("tabshell://resource/r-42"),
            Some(InternalRoute::Resource("r-42".into()))
        );
    }

    #[test]
    fn parses_notebook_route_with_query() {
        assert_eq!(
            InternalRoute::parse("tabshell://notebook/n1?view=grid"),
            Some(InternalRoute::Notebook("n1".into()))
        );
    }

    #[test]
    fn rejects_unknown_or_empty_routes() {
        assert_eq!(InternalRoute::parse("tabshell://resource/"), None);
        assert_eq!(InternalRoute::parse("tabshell://settings"), None);
        assert_eq!(InternalRoute::parse("https://resource/abc"), None);
    }

    #[test]
    fn route_round_trips_through_url() {
        let route = InternalRoute::Core("home".into());
        assert_eq!(InternalRoute::parse(&route.to_url()), Some(route));
    }

    // -- Canonical URLs --

    #[test]
    fn strips_fragment_and_trailing_slash() {
        assert_eq!(
            canonical_url("https://example.com/docs/#intro"),
            "https://example.com/docs"
        );
    }

    #[test]
    fn strips_www_and_root_slash() {
        assert_eq!(canonical_url("https://www.example.com/"), "https://example.com");
        assert_eq!(canonical_url("https://EXAMPLE.com"), "https://example.com");
    }

    #[test]
    fn drops_default_port() {
        assert_eq!(canonical_url("https://example.com:443/a"), "https://example.com/a");
    }

    #[test]
    fn removes_tracking_params_only() {
        assert_eq!(
            canonical_url("https://example.com/a?utm_source=x&id=7&fbclid=abc"),
            "https://example.com/a?id=7"
        );
        assert_eq!(
            canonical_url("https://example.com/a?utm_source=x"),
            "https://example.com/a"
        );
    }

    #[test]
    fn keeps_meaningful_query() {
        assert_eq!(
            canonical_url("https://example.com/search?q=rust"),
            "https://example.com/search?q=rust"
        );
    }

    #[test]
    fn internal_urls_lose_trailing_slash() {
        assert_eq!(
            canonical_url("tabshell://resource/abc/"),
            "tabshell://resource/abc"
        );
    }

    #[test]
    fn unparseable_input_is_trimmed() {
        assert_eq!(canonical_url("  not a url "), "not a url");
    }

    #[test]
    fn same_destination_ignores_cosmetic_differences() {
        assert!(is_same_destination(
            "https://www.example.com/page/#top",
            "https://example.com/page"
        ));
        assert!(!is_same_destination(
            "https://example.com/a",
            "https://example.com/b"
        ));
    }

    #[test]
    fn host_of_strips_www() {
        assert_eq!(host_of("https://www.YouTube.com/watch?v=1"), Some("youtube.com".into()));
        assert_eq!(host_of("about:blank"), None);
    }
}
