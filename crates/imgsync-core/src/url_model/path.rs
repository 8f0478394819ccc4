//! Filename extraction from a URL path.

/// Returns the last path segment of `url` (query and fragment excluded).
///
/// Absolute URLs are parsed with the `url` crate; anything else (relative
/// `src` values such as `img/a.png?v=1`) is split by hand. Returns `None`
/// when the path ends in `/` or is empty.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let segment = match url::Url::parse(url) {
        Ok(parsed) => last_segment(parsed.path())?.to_string(),
        Err(_) => {
            let path = url.split(['?', '#']).next().unwrap_or("");
            last_segment(path)?.to_string()
        }
    };
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment)
}

fn last_segment(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next()?;
    if segment.is_empty() {
        None
    } else {
        Some(segment)
    }
}
