/// Filename used when the caller sends none, or nothing usable survives
/// sanitizing.
pub const DEFAULT_FILENAME: &str = "upload";

const MAX_FILENAME_LENGTH: usize = 255;

/// Reduces a caller-supplied filename to a safe display name.
///
/// Directory components are dropped, characters outside
/// `[alphanumeric . - _ space]` become `_`, leading dots are removed and the
/// result is capped at 255 characters.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_LENGTH)
        .collect();

    let cleaned = cleaned.trim().trim_start_matches('.');
    if cleaned.is_empty() {
        DEFAULT_FILENAME.to_owned()
    } else {
        cleaned.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_plain_names() {
        assert_eq!(sanitize_filename("receipt 01.png"), "receipt 01.png");
    }

    #[test]
    fn strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\scans\\page.tiff"), "page.tiff");
    }

    #[test]
    fn replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("a<b>c;.jpg"), "a_b_c_.jpg");
        assert_eq!(sanitize_filename(".hidden.png"), "hidden.png");
    }

    #[test]
    fn falls_back_when_empty() {
        assert_eq!(sanitize_filename(""), DEFAULT_FILENAME);
        assert_eq!(sanitize_filename("..."), DEFAULT_FILENAME);
        assert_eq!(sanitize_filename("dir/"), DEFAULT_FILENAME);
    }

    #[test]
    fn caps_length() {
        let long = "x".repeat(400);
        assert_eq!(sanitize_filename(&long).len(), 255);
    }
}
