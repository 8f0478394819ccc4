//! Filename sanitization for local image files.

const NAME_MAX: usize = 255;

/// Characters that are unsafe in a filename on Linux or Windows.
fn is_unsafe(c: char) -> bool {
    c.is_control() || matches!(c, '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*')
}

/// Replaces unsafe characters with `_`, trims surrounding dots and spaces,
/// and caps the result at 255 bytes on a char boundary.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if is_unsafe(c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches(|c: char| c == ' ' || c == '.');

    if trimmed.len() <= NAME_MAX {
        return trimmed.to_string();
    }
    let mut take = NAME_MAX;
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_separators_and_reserved() {
        assert_eq!(sanitize_filename("a\\b:c?.png"), "a_b_c_.png");
    }

    #[test]
    fn trims_dots_and_spaces() {
        assert_eq!(sanitize_filename(" ..pic.png.. "), "pic.png");
    }

    #[test]
    fn control_chars() {
        assert_eq!(sanitize_filename("pic\x00name.png"), "pic_name.png");
    }

    #[test]
    fn caps_length_on_char_boundary() {
        let long = "é".repeat(200);
        let out = sanitize_filename(&long);
        assert!(out.len() <= NAME_MAX);
        assert!(out.chars().all(|c| c == 'é'));
    }
}
