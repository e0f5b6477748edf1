use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Characters stripped from uploaded file names.
    /// `#`, `/`, `\` and whitespace would break storage keys and URLs.
    static ref FILE_NAME_UNSAFE: Regex = Regex::new(r"[#/\\\s]").unwrap();
}

/// Sanitise a file name for use in storage keys.
///
/// Replaces `#`, `/`, `\` and whitespace with `-`. Everything else is kept
/// as-is, including the extension.
pub fn sanitise_file_name(file_name: &str) -> String {
    FILE_NAME_UNSAFE.replace_all(file_name, "-").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitise_replaces_unsafe_characters() {
        assert_eq!(sanitise_file_name("my file.txt"), "my-file.txt");
        assert_eq!(sanitise_file_name("a#b/c\\d.png"), "a-b-c-d.png");
        assert_eq!(sanitise_file_name("tabs\there.pdf"), "tabs-here.pdf");
    }

    #[test]
    fn test_sanitise_keeps_safe_names() {
        assert_eq!(sanitise_file_name("report-2024.pdf"), "report-2024.pdf");
        assert_eq!(sanitise_file_name("IMG_0001.JPG"), "IMG_0001.JPG");
        assert_eq!(sanitise_file_name(""), "");
    }
}
