//! Line splitting and whitespace normalisation shared by every crate.

/// Split text into lines on `'\n'`.
///
/// A text containing `n` newlines always yields `n + 1` lines, so the empty
/// string is one empty line and `"a\n"` is `["a", ""]`. This matches how the
/// document model counts lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

/// Returns `true` if the line contains nothing but whitespace.
pub fn is_blank(line: &str) -> bool {
    line.chars().all(char::is_whitespace)
}

/// Comparison key used when whitespace is ignored: the line with every
/// whitespace character removed.
pub fn whitespace_key(line: &str) -> String {
    line.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_text_is_one_line() {
        assert_eq!(split_lines(""), vec![String::new()]);
    }

    #[test]
    fn trailing_newline_yields_empty_last_line() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b", ""]);
    }

    #[test]
    fn carriage_returns_stay_part_of_the_line() {
        assert_eq!(split_lines("a\r\nb"), vec!["a\r", "b"]);
    }

    #[test]
    fn whitespace_key_drops_all_whitespace() {
        assert_eq!(whitespace_key("  fn  main ( )\t{"), "fnmain(){");
        assert!(is_blank(" \t "));
        assert!(!is_blank(" x "));
    }

    proptest! {
        #[test]
        fn line_count_is_newlines_plus_one(text in "[a-c\n]{0,40}") {
            let newlines = text.matches('\n').count();
            prop_assert_eq!(split_lines(&text).len(), newlines + 1);
        }
    }
}
