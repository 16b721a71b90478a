//! Report export surfaces: download naming, print HTML, clipboard.
//!
//! Exports always carry the raw report text verbatim; only the print surface
//! renders structure (via the parsed display blocks) into HTML.

use base64::Engine;
use chrono::{DateTime, Utc};

use crate::{Block, SpanStyle, TextSpan, render};

/// Plain-text download file name: `{templateId}-report-{ISODate}.txt`.
#[must_use]
pub fn download_file_name(template_id: &str, date: DateTime<Utc>) -> String {
    format!("{}-report-{}.txt", template_id, date.format("%Y-%m-%d"))
}

/// OSC 52 escape sequence that copies `text` into the terminal clipboard.
///
/// Writing this to a controlling terminal asks the terminal emulator to set
/// the system clipboard; terminals without OSC 52 support ignore it, and the
/// caller reports a "copy failed" notification when no terminal is attached.
#[must_use]
pub fn clipboard_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}

/// Standalone print-formatted HTML document for the report.
///
/// Wraps the rendered content in a minimal print stylesheet with a title and
/// generation date; the document is self-contained and can be handed to any
/// browser's print dialog.
#[must_use]
pub fn print_html(report_text: &str, title: &str, generated_at: DateTime<Utc>) -> String {
    let document = render(report_text);
    let mut body = String::new();

    for block in &document.blocks {
        match block {
            Block::Heading { level, spans } => {
                let level = (*level).clamp(1, 6);
                body.push_str(&format!("<h{level}>{}</h{level}>\n", spans_html(spans)));
            }
            Block::Paragraph { spans } => {
                body.push_str(&format!("<p>{}</p>\n", spans_html(spans)));
            }
            Block::List { items } => {
                body.push_str("<ul>\n");
                for item in items {
                    body.push_str(&format!("  <li>{}</li>\n", spans_html(item)));
                }
                body.push_str("</ul>\n");
            }
            Block::Table { header, rows } => {
                body.push_str("<table>\n  <thead><tr>");
                for cell in header {
                    body.push_str(&format!("<th>{}</th>", escape_html(cell)));
                }
                body.push_str("</tr></thead>\n  <tbody>\n");
                for row in rows {
                    body.push_str("    <tr>");
                    for cell in row {
                        body.push_str(&format!("<td>{}</td>", escape_html(cell)));
                    }
                    body.push_str("</tr>\n");
                }
                body.push_str("  </tbody>\n</table>\n");
            }
            Block::Rule => body.push_str("<hr>\n"),
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
  body {{ font-family: Georgia, serif; margin: 2rem auto; max-width: 48rem; color: #111; }}
  h1, h2, h3 {{ font-family: Helvetica, Arial, sans-serif; }}
  table {{ border-collapse: collapse; width: 100%; margin: 1rem 0; }}
  th, td {{ border: 1px solid #999; padding: 0.4rem 0.6rem; text-align: left; }}
  th {{ background: #eee; }}
  .meta {{ color: #555; font-size: 0.9rem; }}
  @media print {{
    body {{ margin: 0; max-width: none; }}
    .meta {{ page-break-after: avoid; }}
  }}
</style>
</head>
<body>
<p class="meta">{title} &mdash; generated {generated}</p>
{body}</body>
</html>
"#,
        title = escape_html(title),
        generated = generated_at.format("%Y-%m-%d %H:%M UTC"),
        body = body
    )
}

fn spans_html(spans: &[TextSpan]) -> String {
    spans
        .iter()
        .map(|span| {
            let text = escape_html(&span.text);
            match span.style {
                SpanStyle::Plain => text,
                SpanStyle::Bold => format!("<strong>{text}</strong>"),
                SpanStyle::Italic => format!("<em>{text}</em>"),
            }
        })
        .collect()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
