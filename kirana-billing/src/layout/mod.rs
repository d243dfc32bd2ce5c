//! Fixed-width Layout Engine
//!
//! Every line produced here is exactly `width` characters wide. Amounts are
//! never truncated; labels and item names give way with an ellipsis.

mod receipt;

pub use receipt::{ReceiptExtras, layout_receipt};

use kirana_printer::{Align, TextLine, center_width, ellipsize, pad_width, text_width};

/// Full-width separator characters
pub const SEPARATOR: char = '-';
pub const DOUBLE_SEPARATOR: char = '=';
/// Narrowest text column a table may print; below this callers stack rows
pub const MIN_TEXT_COLUMN: usize = 4;

/// Accumulates fixed-width lines for one receipt
pub struct LineWriter {
    width: usize,
    lines: Vec<TextLine>,
}

impl LineWriter {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn push(&mut self, line: TextLine) -> &mut Self {
        self.lines.push(line);
        self
    }

    /// Separator built by repeating `fill`
    pub fn separator(&mut self, fill: char) -> &mut Self {
        let text: String = std::iter::repeat_n(fill, self.width).collect();
        self.push(TextLine::new(text))
    }

    pub fn blank(&mut self) -> &mut Self {
        self.push(TextLine::new(" ".repeat(self.width)))
    }

    pub fn left(&self, text: &str) -> TextLine {
        TextLine::new(pad_width(text, self.width, false))
    }

    pub fn center(&self, text: &str) -> TextLine {
        TextLine::new(center_width(text, self.width)).align(Align::Center)
    }

    pub fn right(&self, text: &str) -> TextLine {
        TextLine::new(pad_width(text, self.width, true))
    }

    /// `label ........ value` on one line
    pub fn label_value(&self, label: &str, value: &str) -> TextLine {
        TextLine::new(label_value(label, value, self.width))
    }

    /// Hard-wrap free text and push every piece with `align`
    pub fn wrapped(&mut self, text: &str, align: Align) -> &mut Self {
        for piece in wrap(text, self.width) {
            let line = match align {
                Align::Left => self.left(&piece),
                Align::Center => self.center(&piece),
                Align::Right => self.right(&piece),
            };
            self.lines.push(line);
        }
        self
    }

    pub fn finish(self) -> Vec<TextLine> {
        self.lines
    }
}

/// Two-column line: label left, value right, exactly `width` wide
///
/// On overflow the label is shortened with an ellipsis. A value wider than
/// the line keeps its rightmost characters.
pub fn label_value(label: &str, value: &str, width: usize) -> String {
    let value_width = text_width(value);
    if value_width >= width {
        return value.chars().skip(value_width - width).collect();
    }
    // Keep at least one space between label and value
    let label_room = width - value_width - 1;
    let label = ellipsize(label, label_room);
    format!("{} {}", pad_width(&label, label_room, false), value)
}

/// Split text into pieces of at most `width` characters
///
/// Newlines start a new piece; an empty paragraph yields an empty piece.
/// Characters are kept as they are, nothing is dropped.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut pieces = Vec::new();
    for paragraph in text.lines() {
        let chars: Vec<char> = paragraph.chars().collect();
        if chars.is_empty() {
            pieces.push(String::new());
            continue;
        }
        pieces.extend(chars.chunks(width).map(|c| c.iter().collect::<String>()));
    }
    pieces
}

/// Column widths of a table row
///
/// The first column is text, left-aligned and ellipsized; the remaining
/// numeric columns are right-aligned and sized to fit their widest value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    pub first: usize,
    pub numeric: Vec<usize>,
}

impl Columns {
    /// Fit numeric columns of at least `minimums` wide; the first column takes
    /// whatever is left of `width`
    pub fn fit<'a, I>(width: usize, minimums: &[usize], rows: I) -> Self
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let mut numeric = minimums.to_vec();
        for row in rows {
            for (col, value) in numeric.iter_mut().zip(row) {
                *col = (*col).max(text_width(value));
            }
        }
        let used: usize = numeric.iter().sum::<usize>() + numeric.len();
        Self {
            first: width.saturating_sub(used),
            numeric,
        }
    }

    /// Render one row, exactly the table width
    pub fn row(&self, first: &str, values: &[String]) -> String {
        let mut out = pad_width(&ellipsize(first, self.first), self.first, false);
        for (col, value) in self.numeric.iter().zip(values) {
            out.push(' ');
            out.push_str(&pad_width(value, *col, true));
        }
        out
    }

    /// Whether the first column kept at least `min_first` characters
    pub fn fits(&self, min_first: usize) -> bool {
        self.first >= min_first
    }

    pub fn width(&self) -> usize {
        self.first + self.numeric.iter().sum::<usize>() + self.numeric.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_label_value_fits() {
        let line = label_value("Subtotal", "90.00", 32);
        assert_eq!(text_width(&line), 32);
        assert!(line.starts_with("Subtotal "));
        assert!(line.ends_with(" 90.00"));
    }

    #[test]
    fn test_label_value_truncates_label_only() {
        let line = label_value("A very long label that cannot fit", "123456.78", 20);
        assert_eq!(line, "A very ... 123456.78");
        assert_eq!(text_width(&line), 20);
    }

    #[test]
    fn test_label_value_oversized_value() {
        assert_eq!(label_value("Total", "1234567890", 6), "567890");
    }

    #[test]
    fn test_wrap_keeps_content() {
        let text = "Goods once sold will not be taken back.\n\nThank you!";
        let pieces = wrap(text, 16);
        assert_eq!(
            pieces,
            vec![
                "Goods once sold ",
                "will not be take",
                "n back.",
                "",
                "Thank you!"
            ]
        );
        let joined: String = pieces.concat();
        assert_eq!(joined, text.replace('\n', ""));
    }

    #[test]
    fn test_writer_lines_exact_width() {
        let mut w = LineWriter::new(32);
        w.separator(SEPARATOR).blank();
        let centered = w.center("TAX INVOICE");
        w.push(centered);
        let right = w.right("Rs. 95.00");
        w.push(right);
        w.wrapped(&"x".repeat(70), Align::Left);

        let lines = w.finish();
        assert_eq!(lines.len(), 7);
        for line in &lines {
            assert_eq!(text_width(&line.text), 32, "{:?}", line.text);
        }
        assert_eq!(lines[2].align, Align::Center);
        assert_eq!(
            lines[2].text,
            format!("{}TAX INVOICE{}", " ".repeat(10), " ".repeat(11))
        );
    }

    #[test]
    fn test_columns_grow_for_values() {
        let rows = [strings(&["12", "123456.00"])];
        let cols = Columns::fit(32, &[4, 9], rows.iter().map(|r| r.as_slice()));
        assert_eq!(cols.numeric, vec![4, 9]);
        assert_eq!(cols.first, 17);

        let rows = [strings(&["12", "12345678.00"])];
        let cols = Columns::fit(32, &[4, 9], rows.iter().map(|r| r.as_slice()));
        assert_eq!(cols.numeric, vec![4, 11]);
        assert_eq!(cols.first, 15);
        assert_eq!(cols.width(), 32);

        let line = cols.row("Basmati Rice Premium 5kg", &strings(&["2", "12345678.00"]));
        assert_eq!(text_width(&line), 32);
        assert!(line.starts_with("Basmati Rice... "));
        assert!(line.ends_with("12345678.00"));
        assert!(cols.fits(MIN_TEXT_COLUMN));
    }

    #[test]
    fn test_columns_overflow_leaves_no_text_column() {
        let rows = [strings(&["12", "100000000000000000000.00"])];
        let cols = Columns::fit(32, &[4, 9], rows.iter().map(|r| r.as_slice()));
        assert_eq!(cols.first, 2);
        assert!(!cols.fits(MIN_TEXT_COLUMN));

        let rows = [strings(&["1", "1", "1", "1"])];
        let cols = Columns::fit(20, &[5, 5, 5, 5], rows.iter().map(|r| r.as_slice()));
        assert_eq!(cols.first, 0);
        assert!(!cols.fits(1));
    }
}
