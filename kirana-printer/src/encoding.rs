//! Text width and code page utilities
//!
//! Receipt text is laid out in character columns and sent to the printer in
//! the WPC1252 code page. This module provides utilities for:
//! - Measuring, truncating and padding strings to column widths
//! - Converting UTF-8 text to printer bytes and back

use encoding_rs::WINDOWS_1252;

/// Marker appended to truncated labels
pub const ELLIPSIS: &str = "...";

/// ESC t n value selecting WPC1252 on Epson-compatible printers
pub const CODE_PAGE_WPC1252: u8 = 16;

/// Column width of a string (one column per character)
pub fn text_width(s: &str) -> usize {
    s.chars().count()
}

/// Truncate a string to fit within a column width
pub fn truncate_width(s: &str, max_width: usize) -> String {
    s.chars().take(max_width).collect()
}

/// Truncate a string and mark the cut with an ellipsis
///
/// Strings that already fit are returned unchanged. Widths too small to hold
/// the marker fall back to a plain cut.
pub fn ellipsize(s: &str, max_width: usize) -> String {
    if text_width(s) <= max_width {
        return s.to_string();
    }
    let marker = text_width(ELLIPSIS);
    if max_width <= marker {
        return truncate_width(s, max_width);
    }
    let mut out = truncate_width(s, max_width - marker);
    out.push_str(ELLIPSIS);
    out
}

/// Pad a string to a specific column width
///
/// If the string is longer than the width, it will be truncated.
pub fn pad_width(s: &str, width: usize, align_right: bool) -> String {
    let current_width = text_width(s);
    if current_width >= width {
        return truncate_width(s, width);
    }
    let spaces = width - current_width;
    if align_right {
        format!("{}{}", " ".repeat(spaces), s)
    } else {
        format!("{}{}", s, " ".repeat(spaces))
    }
}

/// Center a string within a column width, truncating if needed
pub fn center_width(s: &str, width: usize) -> String {
    let current_width = text_width(s);
    if current_width >= width {
        return truncate_width(s, width);
    }
    let free = width - current_width;
    let left = free / 2;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(free - left))
}

/// Convert UTF-8 text to WPC1252 printer bytes
///
/// Control characters become spaces so text can never smuggle printer
/// commands. Characters with no WPC1252 mapping become `?`, keeping one byte
/// per column.
pub fn encode_text(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    let mut char_buf = [0u8; 4];
    for c in s.chars() {
        if c.is_ascii() {
            out.push(if c.is_ascii_control() { b' ' } else { c as u8 });
            continue;
        }
        if c.is_control() {
            out.push(b' ');
            continue;
        }
        let (bytes, _, had_errors) = WINDOWS_1252.encode(c.encode_utf8(&mut char_buf));
        if had_errors || bytes.len() != 1 {
            out.push(b'?');
        } else {
            out.push(bytes[0]);
        }
    }
    out
}

/// Convert WPC1252 printer bytes back to UTF-8 text
pub fn decode_text(bytes: &[u8]) -> String {
    WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("hello"), 5);
        assert_eq!(text_width("café"), 4);
        assert_eq!(text_width(""), 0);
    }

    #[test]
    fn test_truncate_width() {
        assert_eq!(truncate_width("hello world", 5), "hello");
        assert_eq!(truncate_width("hi", 5), "hi");
    }

    #[test]
    fn test_ellipsize() {
        assert_eq!(ellipsize("Basmati Rice Premium", 10), "Basmati...");
        assert_eq!(ellipsize("Rice", 10), "Rice");
        assert_eq!(ellipsize("Rice Bag", 3), "Ric");
        assert_eq!(text_width(&ellipsize(&"x".repeat(40), 17)), 17);
    }

    #[test]
    fn test_pad_width() {
        assert_eq!(pad_width("hi", 5, false), "hi   ");
        assert_eq!(pad_width("hi", 5, true), "   hi");
        assert_eq!(pad_width("hello world", 5, false), "hello");
    }

    #[test]
    fn test_center_width() {
        assert_eq!(center_width("ab", 6), "  ab  ");
        assert_eq!(center_width("ab", 5), " ab  ");
        assert_eq!(center_width("abcdef", 4), "abcd");
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(encode_text("Rs. 95"), b"Rs. 95".to_vec());
        assert_eq!(encode_text("café"), vec![b'c', b'a', b'f', 0xE9]);
        // No rupee glyph in WPC1252
        assert_eq!(encode_text("₹95"), b"?95".to_vec());
        // Control bytes never reach the printer
        assert_eq!(encode_text("a\x1Bb\nc"), b"a b c".to_vec());
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text(&[b'c', b'a', b'f', 0xE9]), "café");
    }
}
