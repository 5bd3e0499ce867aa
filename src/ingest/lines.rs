//! Text decoding and line splitting for uploaded payloads

/// Decode bytes as UTF-8, dropping any invalid sequences
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

/// Length in bytes of the line break starting at `bytes[at]`, if any.
///
/// Breaks are `\n`, `\r`, `\r\n`, `\x0b`, `\x0c`, `\x1c`..`\x1e`,
/// U+0085, U+2028 and U+2029. `bytes` must be valid UTF-8, so a lead byte
/// match is never part of another character.
fn line_break_len(bytes: &[u8], at: usize) -> Option<usize> {
    match bytes[at] {
        b'\r' if bytes.get(at + 1) == Some(&b'\n') => Some(2),
        b'\n' | b'\r' | 0x0b | 0x0c | 0x1c..=0x1e => Some(1),
        0xc2 if bytes.get(at + 1) == Some(&0x85) => Some(2),
        0xe2 if bytes.get(at + 1) == Some(&0x80)
            && matches!(bytes.get(at + 2), Some(0xa8 | 0xa9)) =>
        {
            Some(3)
        }
        _ => None,
    }
}

/// Split text into lines on every Unicode line boundary.
///
/// `\r\n` counts as a single break. A trailing terminator does not produce an
/// empty last line, so `"a\nb\n"` yields two lines and `""` yields none.
pub fn split_lines(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut at = 0;

    while at < bytes.len() {
        match line_break_len(bytes, at) {
            Some(len) => {
                lines.push(text[start..at].to_string());
                at += len;
                start = at;
            }
            None => at += 1,
        }
    }

    if start < bytes.len() {
        lines.push(text[start..].to_string());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_mixed_terminators() {
        assert_eq!(split_lines("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_split_unicode_boundaries() {
        assert_eq!(
            split_lines("a\x0bb\x0cc\u{2028}d\u{85}e"),
            vec!["a", "b", "c", "d", "e"]
        );
        assert_eq!(
            split_lines("f\x1cg\x1dh\x1ei\u{2029}"),
            vec!["f", "g", "h", "i"]
        );
    }

    #[test]
    fn test_crlf_is_one_break() {
        assert_eq!(split_lines("a\r\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\rb"), vec!["a", "", "b"]);
        assert_eq!(split_lines("a\n\rb"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_non_breaking_multibyte_text_is_kept() {
        // U+00A9 and U+2026 start like U+0085 and U+2028
        assert_eq!(split_lines("©…\u{2029}ok"), vec!["©…", "ok"]);
    }

    #[test]
    fn test_trailing_newline() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("\n"), vec![""]);
    }

    #[test]
    fn test_decode_drops_invalid_bytes() {
        let bytes = b"Ivan\xff\xfeov;Moscow";
        assert_eq!(decode_lossy(bytes), "Ivanov;Moscow");

        let cyrillic = "Иванов".as_bytes();
        assert_eq!(decode_lossy(cyrillic), "Иванов");
    }

    #[test]
    fn test_truncated_multibyte_sequence() {
        let mut bytes = "ok\n".as_bytes().to_vec();
        bytes.push(0xD0);
        assert_eq!(split_lines(&decode_lossy(&bytes)), vec!["ok"]);
    }
}
