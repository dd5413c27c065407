//! Player route patterns.

use regex::Regex;
use std::sync::OnceLock;

pub const HOME_PATH: &str = "/player/home";
pub const LOGIN_PATH: &str = "/player/login";
pub const CHANNEL_LINEAR_PATH: &str = "/player/channel-linear/";

/// `/player/home/for-you/{id}`; group 1 is the id.
pub fn for_you_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"/player/home/for-you/([a-f0-9-]{36})(?:[/?#]|$)")
            .expect("for-you pattern is valid")
    })
}

fn player_route_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"/player/(?:channel-linear|episode-audio|episode-video|show|album|playlist)/[^/?#]+")
            .expect("player route pattern is valid")
    })
}

/// Session-specific id the For You route carries once client-side routing has
/// run, e.g. `/player/home/for-you/3f2c...` (36 chars of `[a-f0-9-]`).
pub fn for_you_id(href: &str) -> Option<&str> {
    for_you_regex()
        .captures(href)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

pub fn is_for_you_route(href: &str) -> bool {
    for_you_id(href).is_some()
}

/// Slug of a `/player/channel-linear/{slug}/{id}` URL.
pub fn channel_slug(url: &str) -> Option<&str> {
    let rest = &url[url.find(CHANNEL_LINEAR_PATH)? + CHANNEL_LINEAR_PATH.len()..];
    let slug = rest.split(['/', '?', '#']).next()?;
    (!slug.is_empty()).then_some(slug)
}

/// Glob-free URL check used by `wait_for_url`: is the path component of
/// `url` exactly `path`? Query, fragment and a trailing slash are ignored.
pub fn is_on_path(url: &str, path: &str) -> bool {
    let before_query = url.split(['?', '#']).next().unwrap_or(url);
    let url_path = match before_query.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("/", |i| &rest[i..]),
        None => before_query,
    };
    url_path == path || url_path.strip_suffix('/') == Some(path)
}

/// Predicate over a tile's href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HrefMatcher {
    /// A specific channel-linear slug.
    Slug(String),
    /// Any playable player route, used when no preferred channel is present.
    AnyPlayerRoute,
}

impl HrefMatcher {
    pub fn slug(slug: impl Into<String>) -> Self {
        HrefMatcher::Slug(slug.into())
    }

    pub fn matches(&self, href: &str) -> bool {
        match self {
            HrefMatcher::Slug(slug) => channel_slug(href) == Some(slug.as_str()),
            HrefMatcher::AnyPlayerRoute => player_route_regex().is_match(href),
        }
    }
}

impl std::fmt::Display for HrefMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HrefMatcher::Slug(slug) => write!(f, "channel '{}'", slug),
            HrefMatcher::AnyPlayerRoute => write!(f, "any player route"),
        }
    }
}
