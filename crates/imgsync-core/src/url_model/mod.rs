//! URL modeling and local filename derivation.

mod path;
mod sanitize;

use sha2::{Digest, Sha256};

pub use path::filename_from_url_path;
pub use sanitize::sanitize_filename;

/// Hex chars of the URL digest used in synthesized names.
const HASH_LEN: usize = 16;

/// Name used when the URL yields no usable file name: `image_<hash>.<ext>`.
///
/// The hash is the first 16 hex chars of SHA-256 over the URL bytes, so the
/// same URL always maps to the same file across runs.
pub fn synthesized_filename(url: &str, extension: &str) -> String {
    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    format!("image_{}.{}", &digest[..HASH_LEN], extension)
}

/// Derives the local filename for a downloaded image.
///
/// Uses the last URL path segment; falls back to [`synthesized_filename`] when
/// there is none, it has no `.`, or it sanitizes to nothing. The result always
/// ends with `.<extension>` (appended if missing).
///
/// # Examples
///
/// - `derive_local_filename("https://host/path/pic.png", "png")` → `"pic.png"`
/// - `derive_local_filename("https://host/path/", "png")` → `"image_<hash>.png"`
/// - `derive_local_filename("https://host/pic.jpg", "png")` → `"pic.jpg.png"`
pub fn derive_local_filename(url: &str, extension: &str) -> String {
    let ext = extension.trim_start_matches('.');
    let candidate = filename_from_url_path(url)
        .filter(|s| s.contains('.'))
        .map(|s| sanitize_filename(&s))
        .filter(|s| !s.is_empty());

    let mut name = match candidate {
        Some(c) => c,
        None => return synthesized_filename(url, ext),
    };
    let suffix = format!(".{}", ext);
    if !name.ends_with(&suffix) {
        name.push_str(&suffix);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_synthesized(name: &str) -> bool {
        name.len() == "image_".len() + HASH_LEN + ".png".len()
            && name.starts_with("image_")
            && name.ends_with(".png")
            && name["image_".len()..name.len() - 4]
                .chars()
                .all(|c| c.is_ascii_hexdigit())
    }

    #[test]
    fn derive_from_url_path() {
        assert_eq!(derive_local_filename("https://host/path/pic.png", "png"), "pic.png");
        assert_eq!(
            derive_local_filename("https://cdn.example.com/a/b/chart-1.png?x=1", "png"),
            "chart-1.png"
        );
    }

    #[test]
    fn no_segment_synthesizes_hash_name() {
        let name = derive_local_filename("https://host/path/", "png");
        assert!(is_synthesized(&name), "{name}");
    }

    #[test]
    fn segment_without_dot_synthesizes() {
        let name = derive_local_filename("https://host/render/abc123", "png");
        assert!(is_synthesized(&name), "{name}");
    }

    #[test]
    fn synthesized_name_is_deterministic_per_url() {
        let a = derive_local_filename("https://host/a/", "png");
        let b = derive_local_filename("https://host/a/", "png");
        let c = derive_local_filename("https://host/b/", "png");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn appends_extension_when_missing() {
        assert_eq!(derive_local_filename("https://host/pic.jpg", "png"), "pic.jpg.png");
        // Case differs: suffix check is exact, like the extension written to disk.
        assert_eq!(derive_local_filename("https://host/pic.PNG", "png"), "pic.PNG.png");
    }

    #[test]
    fn dotted_extension_argument() {
        assert!(derive_local_filename("https://host/x/", ".png").ends_with(".png"));
        assert_eq!(derive_local_filename("https://host/p.png", ".png"), "p.png");
    }

    #[test]
    fn dot_only_segment_falls_back() {
        let name = derive_local_filename("img/..", "png");
        assert!(is_synthesized(&name), "{name}");
    }
}
