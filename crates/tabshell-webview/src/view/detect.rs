//! Recognise well-known services from a URL.

use tabshell_common::canonical::host_of;
use tabshell_common::InternalRoute;
use url::Url;

use super::state::{AppKind, DetectedApp};

const HOSTS: &[(&str, AppKind)] = &[
    ("youtube.com", AppKind::Youtube),
    ("m.youtube.com", AppKind::Youtube),
    ("youtu.be", AppKind::Youtube),
    ("github.com", AppKind::Github),
    ("notion.so", AppKind::Notion),
    ("figma.com", AppKind::Figma),
    ("twitter.com", AppKind::Twitter),
    ("x.com", AppKind::Twitter),
    ("docs.google.com", AppKind::GoogleDocs),
];

pub fn detect_app(raw: &str) -> Option<DetectedApp> {
    if let Some(route) = InternalRoute::parse(raw) {
        return match route {
            InternalRoute::Resource(id) => Some(app(AppKind::Resource, Some(id))),
            InternalRoute::Notebook(id) => Some(app(AppKind::Notebook, Some(id))),
            InternalRoute::Core(_) => None,
        };
    }

    let url = Url::parse(raw.trim()).ok()?;
    if url.path().to_ascii_lowercase().ends_with(".pdf") {
        return Some(app(AppKind::Pdf, None));
    }

    let host = host_of(raw)?;
    if host.ends_with("wikipedia.org") {
        let title = url.path().strip_prefix("/wiki/").map(str::to_string);
        return Some(app(AppKind::Wikipedia, title));
    }

    let kind = HOSTS
        .iter()
        .find(|(known, _)| *known == host)
        .map(|(_, kind)| *kind)?;

    let id = match kind {
        AppKind::Youtube if host == "youtu.be" => first_segment(&url, 1),
        AppKind::Youtube => url
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned()),
        AppKind::Github => first_segment(&url, 2),
        _ => None,
    };
    Some(app(kind, id))
}

fn app(kind: AppKind, id: Option<String>) -> DetectedApp {
    DetectedApp { kind, id }
}

/// The first `n` path segments joined with `/`, if there are that many.
fn first_segment(url: &Url, n: usize) -> Option<String> {
    let segments: Vec<&str> = url
        .path_segments()?
        .filter(|s| !s.is_empty())
        .take(n)
        .collect();
    (segments.len() == n).then(|| segments.join("/"))
}
