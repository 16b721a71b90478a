//! Report rendering for certforge.
//!
//! Converts the markdown-like report text returned by the generation
//! endpoint into display-ready structured blocks. Parsing is best-effort:
//! recognized structure (headings, tables, lists, emphasis, rules) becomes
//! typed blocks, and anything else passes through as literal paragraph text.
//! Malformed input never fails.

pub mod export;

pub use export::{clipboard_sequence, download_file_name, print_html};

/// Inline emphasis of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStyle {
    Plain,
    Bold,
    Italic,
}

/// A run of text with one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    pub text: String,
    pub style: SpanStyle,
}

impl TextSpan {
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), style: SpanStyle::Plain }
    }

    #[must_use]
    pub fn bold(text: impl Into<String>) -> Self {
        Self { text: text.into(), style: SpanStyle::Bold }
    }

    #[must_use]
    pub fn italic(text: impl Into<String>) -> Self {
        Self { text: text.into(), style: SpanStyle::Italic }
    }
}

/// One display block of the rendered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Heading with level 1..=6.
    Heading { level: u8, spans: Vec<TextSpan> },
    /// Paragraph of styled text runs.
    Paragraph { spans: Vec<TextSpan> },
    /// Bullet list; one span list per item.
    List { items: Vec<Vec<TextSpan>> },
    /// Table with a header row and body rows.
    Table { header: Vec<String>, rows: Vec<Vec<String>> },
    /// Horizontal rule.
    Rule,
}

/// Display-ready structured report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayDocument {
    pub blocks: Vec<Block>,
}

impl DisplayDocument {
    /// Flatten back to unstyled text, one line per block element.
    ///
    /// Used for width estimation and as a fallback display path; exports use
    /// the raw report text instead.
    #[must_use]
    pub fn to_plain_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Heading { spans, .. } | Block::Paragraph { spans } => {
                    lines.push(spans_text(spans));
                }
                Block::List { items } => {
                    for item in items {
                        lines.push(format!("- {}", spans_text(item)));
                    }
                }
                Block::Table { header, rows } => {
                    lines.push(header.join(" | "));
                    for row in rows {
                        lines.push(row.join(" | "));
                    }
                }
                Block::Rule => lines.push("---".to_string()),
            }
        }
        lines
    }
}

fn spans_text(spans: &[TextSpan]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

/// Parse report text into display blocks.
///
/// Recognized structure:
/// - `#`..`######` headings
/// - `|`-delimited tables, with an optional `---` separator row after the
///   header
/// - `-` / `*` bullet lists
/// - `**bold**` and `*italic*` emphasis (unclosed markers stay literal)
/// - `---` / `***` / `___` rules
///
/// Everything else is a literal paragraph.
#[must_use]
pub fn render(text: &str) -> DisplayDocument {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();
    let mut table: Vec<String> = Vec::new();
    let mut list: Vec<Vec<TextSpan>> = Vec::new();

    let flush_paragraph = |blocks: &mut Vec<Block>, paragraph: &mut Vec<String>| {
        if !paragraph.is_empty() {
            let joined = paragraph.join(" ");
            blocks.push(Block::Paragraph { spans: parse_inline(&joined) });
            paragraph.clear();
        }
    };
    let flush_table = |blocks: &mut Vec<Block>, table: &mut Vec<String>| {
        if !table.is_empty() {
            blocks.push(parse_table(table));
            table.clear();
        }
    };
    let flush_list = |blocks: &mut Vec<Block>, list: &mut Vec<Vec<TextSpan>>| {
        if !list.is_empty() {
            blocks.push(Block::List { items: std::mem::take(list) });
        }
    };

    for raw_line in text.lines() {
        let line = raw_line.trim_end();
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            flush_paragraph(&mut blocks, &mut paragraph);
            flush_table(&mut blocks, &mut table);
            flush_list(&mut blocks, &mut list);
            continue;
        }

        if let Some((level, rest)) = parse_heading(trimmed) {
            flush_paragraph(&mut blocks, &mut paragraph);
            flush_table(&mut blocks, &mut table);
            flush_list(&mut blocks, &mut list);
            blocks.push(Block::Heading { level, spans: parse_inline(rest) });
            continue;
        }

        if is_rule(trimmed) {
            flush_paragraph(&mut blocks, &mut paragraph);
            flush_table(&mut blocks, &mut table);
            flush_list(&mut blocks, &mut list);
            blocks.push(Block::Rule);
            continue;
        }

        if trimmed.starts_with('|') {
            flush_paragraph(&mut blocks, &mut paragraph);
            flush_list(&mut blocks, &mut list);
            table.push(trimmed.to_string());
            continue;
        }

        if let Some(item) = parse_list_item(trimmed) {
            flush_paragraph(&mut blocks, &mut paragraph);
            flush_table(&mut blocks, &mut table);
            list.push(parse_inline(item));
            continue;
        }

        flush_table(&mut blocks, &mut table);
        flush_list(&mut blocks, &mut list);
        paragraph.push(trimmed.to_string());
    }

    flush_paragraph(&mut blocks, &mut paragraph);
    flush_table(&mut blocks, &mut table);
    flush_list(&mut blocks, &mut list);

    DisplayDocument { blocks }
}

/// Heading marker: 1-6 `#` characters followed by a space.
fn parse_heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    rest.strip_prefix(' ').map(|text| (hashes as u8, text.trim_start()))
}

/// Rule: three or more of the same `-`, `*`, or `_` and nothing else.
fn is_rule(line: &str) -> bool {
    let stripped: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    stripped.len() >= 3
        && (stripped.chars().all(|c| c == '-')
            || stripped.chars().all(|c| c == '*')
            || stripped.chars().all(|c| c == '_'))
}

/// Bullet item: `- ` or `* ` prefix.
fn parse_list_item(line: &str) -> Option<&str> {
    line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))
}

/// Split a `|`-delimited row into trimmed cells.
fn split_row(line: &str) -> Vec<String> {
    line.trim()
        .trim_start_matches('|')
        .trim_end_matches('|')
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect()
}

/// A separator row consists of cells like `---` or `:---:`.
fn is_separator_row(cells: &[String]) -> bool {
    !cells.is_empty()
        && cells.iter().all(|cell| {
            let inner = cell.trim_start_matches(':').trim_end_matches(':');
            !inner.is_empty() && inner.chars().all(|c| c == '-')
        })
}

fn parse_table(lines: &[String]) -> Block {
    let mut rows: Vec<Vec<String>> = lines.iter().map(|l| split_row(l)).collect();
    let header = rows.remove(0);
    if rows.first().is_some_and(|r| is_separator_row(r)) {
        rows.remove(0);
    }
    Block::Table { header, rows }
}

/// Parse `**bold**` and `*italic*` runs. Unclosed markers are literal.
fn parse_inline(text: &str) -> Vec<TextSpan> {
    let mut spans = Vec::new();
    let mut literal = String::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    let flush_literal = |spans: &mut Vec<TextSpan>, literal: &mut String| {
        if !literal.is_empty() {
            spans.push(TextSpan::plain(std::mem::take(literal)));
        }
    };

    while i < chars.len() {
        if chars[i] == '*' && i + 1 < chars.len() && chars[i + 1] == '*' {
            if let Some(end) = find_marker(&chars, i + 2, "**") {
                flush_literal(&mut spans, &mut literal);
                spans.push(TextSpan::bold(chars[i + 2..end].iter().collect::<String>()));
                i = end + 2;
                continue;
            }
        } else if chars[i] == '*'
            && let Some(end) = find_marker(&chars, i + 1, "*")
        {
            flush_literal(&mut spans, &mut literal);
            spans.push(TextSpan::italic(chars[i + 1..end].iter().collect::<String>()));
            i = end + 1;
            continue;
        }
        literal.push(chars[i]);
        i += 1;
    }

    flush_literal(&mut spans, &mut literal);
    if spans.is_empty() {
        spans.push(TextSpan::plain(""));
    }
    spans
}

/// Find the next occurrence of a closing marker at or after `start`.
fn find_marker(chars: &[char], start: usize, marker: &str) -> Option<usize> {
    let marker_chars: Vec<char> = marker.chars().collect();
    let mut i = start;
    while i + marker_chars.len() <= chars.len() {
        if chars[i..i + marker_chars.len()] == marker_chars[..] {
            // An empty emphasis run (`****` or `**`) is not a match.
            if i > start {
                return Some(i);
            }
            return None;
        }
        i += 1;
    }
    None
}

/// Presentational zoom percentage: 80-150% in steps of 10.
///
/// Purely a display control; it never touches the underlying report text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomLevel(u16);

impl Default for ZoomLevel {
    fn default() -> Self {
        Self(100)
    }
}

impl ZoomLevel {
    pub const MIN: u16 = 80;
    pub const MAX: u16 = 150;
    pub const STEP: u16 = 10;

    /// Construct a zoom level, clamped to the valid range and rounded down
    /// to a step boundary.
    #[must_use]
    pub fn new(percent: u16) -> Self {
        let clamped = percent.clamp(Self::MIN, Self::MAX);
        Self(clamped - (clamped % Self::STEP))
    }

    #[must_use]
    pub fn percent(&self) -> u16 {
        self.0
    }

    #[must_use]
    pub fn zoom_in(&self) -> Self {
        Self::new(self.0.saturating_add(Self::STEP))
    }

    #[must_use]
    pub fn zoom_out(&self) -> Self {
        Self::new(self.0.saturating_sub(Self::STEP))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels() {
        let doc = render("# Title\n\n### Sub");
        assert_eq!(doc.blocks.len(), 2);
        assert!(matches!(&doc.blocks[0], Block::Heading { level: 1, .. }));
        assert!(matches!(&doc.blocks[1], Block::Heading { level: 3, .. }));
    }

    #[test]
    fn test_paragraph_lines_join() {
        let doc = render("first line\nsecond line");
        assert_eq!(doc.blocks.len(), 1);
        match &doc.blocks[0] {
            Block::Paragraph { spans } => assert_eq!(spans_text(spans), "first line second line"),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_table_with_separator() {
        let doc = render("| Field | Value |\n| --- | --- |\n| Client | J. Smith |");
        match &doc.blocks[0] {
            Block::Table { header, rows } => {
                assert_eq!(header, &vec!["Field".to_string(), "Value".to_string()]);
                assert_eq!(rows, &vec![vec!["Client".to_string(), "J. Smith".to_string()]]);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_list_items() {
        let doc = render("- one\n- two\n* three");
        match &doc.blocks[0] {
            Block::List { items } => assert_eq!(items.len(), 3),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_emphasis_spans() {
        let doc = render("a **bold** and *italic* word");
        match &doc.blocks[0] {
            Block::Paragraph { spans } => {
                assert_eq!(
                    spans,
                    &vec![
                        TextSpan::plain("a "),
                        TextSpan::bold("bold"),
                        TextSpan::plain(" and "),
                        TextSpan::italic("italic"),
                        TextSpan::plain(" word"),
                    ]
                );
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_unclosed_emphasis_stays_literal() {
        let doc = render("a **dangling marker");
        match &doc.blocks[0] {
            Block::Paragraph { spans } => assert_eq!(spans_text(spans), "a **dangling marker"),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_rule_detection() {
        let doc = render("above\n\n---\n\nbelow");
        assert!(matches!(doc.blocks[1], Block::Rule));
    }

    #[test]
    fn test_malformed_input_never_fails() {
        let doc = render("|||\n##nospace\n****\n| lonely row");
        // Everything parses into some block; nothing panics or is dropped
        // silently into the void.
        assert!(!doc.blocks.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(render("").blocks.is_empty());
    }

    #[test]
    fn test_zoom_clamp_and_step() {
        assert_eq!(ZoomLevel::new(100).percent(), 100);
        assert_eq!(ZoomLevel::new(40).percent(), 80);
        assert_eq!(ZoomLevel::new(999).percent(), 150);
        assert_eq!(ZoomLevel::new(125).percent(), 120);
        assert_eq!(ZoomLevel::new(150).zoom_in().percent(), 150);
        assert_eq!(ZoomLevel::new(80).zoom_out().percent(), 80);
        assert_eq!(ZoomLevel::default().zoom_in().percent(), 110);
    }
}
