//! Relationship between a `<d:href>` and the resource a PROPFIND targeted.

use percent_encoding::percent_decode_str;

use super::types::HrefRelation;

/// Path component of an href or URL, percent-decoded, with duplicate
/// separators collapsed. A trailing separator is kept.
pub fn clean_path(uri: &str) -> String {
    let decoded = percent_decode_str(path_of(uri)).decode_utf8_lossy();

    let mut out = String::with_capacity(decoded.len() + 1);
    if !decoded.starts_with('/') {
        out.push('/');
    }
    for c in decoded.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}

// Servers may send absolute URLs, possibly not valid for `http::Uri`
// (unencoded spaces), so the authority is cut by hand.
fn path_of(uri: &str) -> &str {
    let rest = match uri.find("://") {
        Some(idx) => &uri[idx + 3..],
        None => return uri,
    };
    let path = match rest.find('/') {
        Some(idx) => &rest[idx..],
        None => return "/",
    };
    match path.find(|c| c == '?' || c == '#') {
        Some(idx) => &path[..idx],
        None => path,
    }
}

/// Same as [`clean_path`] without the trailing separator, `/` stays `/`
pub fn normalize(uri: &str) -> String {
    let mut path = clean_path(uri);
    while path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    path
}

fn parent(path: &str) -> Option<&str> {
    match path.rfind('/') {
        _ if path == "/" => None,
        Some(0) => Some("/"),
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

/// True if `path` is `root` or lies below it, both normalized
pub fn is_within(root: &str, path: &str) -> bool {
    root == "/"
        || path == root
        || path
            .strip_prefix(root)
            .map_or(false, |rest| rest.starts_with('/'))
}

/// Classify a response href against the requested URI with depth 1
/// semantics.
///
/// Hrefs outside of `dav_root` can not be related to the request and are
/// always `Other`.
pub fn classify(requested: &str, href: &str, dav_root: Option<&str>) -> HrefRelation {
    let target = normalize(requested);
    let candidate = normalize(href);

    if let Some(root) = dav_root {
        if !is_within(&normalize(root), &candidate) {
            tracing::debug!(href=%href, root=%root, "href outside of the dav root");
            return HrefRelation::Other;
        }
    }

    if candidate == target {
        HrefRelation::SelfRef
    } else if parent(&candidate) == Some(target.as_str()) {
        HrefRelation::Member
    } else {
        HrefRelation::Other
    }
}
