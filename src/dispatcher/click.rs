// Click Target Selection
//
// Decides whether a notification click focuses an open page or opens a
// new one. The first matching page in host enumeration order wins.

use crate::types::ClientWindow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientChoice {
    Focus(ClientWindow),
    Open(String),
}

/// Pick the page to focus for `target`, or the URL to open
pub fn choose_client(clients: &[ClientWindow], target: &str) -> ClientChoice {
    let wanted = url_path(target);
    clients
        .iter()
        .find(|client| path_matches(url_path(&client.url), wanted))
        .cloned()
        .map(ClientChoice::Focus)
        .unwrap_or_else(|| ClientChoice::Open(target.to_string()))
}

/// Path component of an absolute URL or an absolute path, without query
/// or fragment
pub fn url_path(url: &str) -> &str {
    let rest = match url.find("://") {
        Some(scheme_end) => {
            let after_scheme = &url[scheme_end + 3..];
            match after_scheme.find(|c: char| matches!(c, '/' | '?' | '#')) {
                Some(start) if after_scheme[start..].starts_with('/') => &after_scheme[start..],
                _ => "/",
            }
        }
        None => url,
    };

    let end = rest.find(|c: char| matches!(c, '?' | '#')).unwrap_or(rest.len());
    let path = &rest[..end];
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

/// Same path, or a sub-path of it (`/cliente/12` matches `/cliente`)
fn path_matches(candidate: &str, wanted: &str) -> bool {
    let candidate = trim_trailing_slash(candidate);
    let wanted = trim_trailing_slash(wanted);

    if wanted == "/" {
        return candidate == "/";
    }
    candidate == wanted
        || candidate
            .strip_prefix(wanted)
            .map_or(false, |rest| rest.starts_with('/'))
}

fn trim_trailing_slash(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}
