//! `<img src>` discovery by pattern matching (no DOM parsing).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static IMG_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<img[^>]+src=["']([^"']+)["'][^>]*>"#).expect("static img regex")
});

/// How a captured `src` value is matched against the target extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionMatch {
    /// Ends with `.ext`, or contains `ext` anywhere (case-insensitive).
    /// Overincludes values such as `pngfile.jpg`.
    #[default]
    Loose,
    /// Path part (before `?` / `#`) ends with `.ext`, case-insensitive.
    Suffix,
}

impl ExtensionMatch {
    pub fn matches(self, value: &str, extension: &str) -> bool {
        let ext = extension.trim_start_matches('.');
        if ext.is_empty() {
            return false;
        }
        let dotted = format!(".{}", ext.to_ascii_lowercase());
        match self {
            ExtensionMatch::Loose => {
                value.ends_with(&format!(".{}", ext))
                    || value
                        .to_ascii_lowercase()
                        .contains(&ext.to_ascii_lowercase())
            }
            ExtensionMatch::Suffix => {
                let path = value.split(['?', '#']).next().unwrap_or("");
                path.to_ascii_lowercase().ends_with(&dotted)
            }
        }
    }
}

/// Returns every `src` value of an `<img>` tag in `text` that matches `extension`,
/// in document order. Duplicates are kept.
pub fn extract_image_urls(text: &str, extension: &str, mode: ExtensionMatch) -> Vec<String> {
    IMG_SRC_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|v| mode.matches(v, extension))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_png_case_insensitive_in_order() {
        let html = r#"<p><img src="a.png"></p><img alt="x" src="b.jpg"/><img src='c.PNG' width="3">"#;
        assert_eq!(
            extract_image_urls(html, "png", ExtensionMatch::Loose),
            vec!["a.png", "c.PNG"]
        );
    }

    #[test]
    fn duplicates_preserved() {
        let html = r#"<img src="https://x/a.png"><img src="https://x/a.png">"#;
        assert_eq!(
            extract_image_urls(html, "png", ExtensionMatch::Loose).len(),
            2
        );
    }

    #[test]
    fn loose_filter_overincludes_substring() {
        let html = r#"<img src="https://cdn/pngfile.jpg"><img src="https://cdn/render?fmt=png">"#;
        assert_eq!(
            extract_image_urls(html, "png", ExtensionMatch::Loose),
            vec!["https://cdn/pngfile.jpg", "https://cdn/render?fmt=png"]
        );
    }

    #[test]
    fn suffix_filter_is_strict() {
        let html = r#"<img src="https://cdn/pngfile.jpg"><img src="https://cdn/pic.PNG?v=2"><img src="https://cdn/render?fmt=png">"#;
        assert_eq!(
            extract_image_urls(html, "png", ExtensionMatch::Suffix),
            vec!["https://cdn/pic.PNG?v=2"]
        );
    }

    #[test]
    fn ignores_non_img_tags_and_tags_without_src() {
        let html = r#"<script src="app.png.js"></script><img alt="none"><a href="x.png">x</a>"#;
        assert!(extract_image_urls(html, "png", ExtensionMatch::Loose).is_empty());
    }

    #[test]
    fn multiline_tag_attributes() {
        let html = "<img\n  class=\"hero\"\n  src=\"https://h/hero.png\"\n/>";
        assert_eq!(
            extract_image_urls(html, "png", ExtensionMatch::Loose),
            vec!["https://h/hero.png"]
        );
    }

    #[test]
    fn other_extension() {
        let html = r#"<img src="a.png"><img src="b.webp">"#;
        assert_eq!(
            extract_image_urls(html, ".webp", ExtensionMatch::Suffix),
            vec!["b.webp"]
        );
    }

    #[test]
    fn empty_extension_matches_nothing() {
        assert!(!ExtensionMatch::Loose.matches("a.png", ""));
    }
}
