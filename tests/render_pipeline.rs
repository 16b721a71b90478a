//! Report rendering pipeline tests: parsing, best-effort behavior on
//! malformed input, and the export surfaces.

use chrono::{TimeZone, Utc};

use certforge::render::{
    Block, SpanStyle, ZoomLevel, clipboard_sequence, download_file_name, print_html, render,
};

const SAMPLE_REPORT: &str = r#"# Electrical Installation Condition Report

**Overall assessment:** satisfactory

## Observations

| Code | Observation | Location |
| --- | --- | --- |
| C3 | No RCD on socket circuit | Garage |

- Supply verified at intake
- Bonding present to water and gas

---

*End of report*
"#;

#[test]
fn recognized_structure_becomes_typed_blocks() {
    let document = render(SAMPLE_REPORT);

    assert!(matches!(
        document.blocks.first(),
        Some(Block::Heading { level: 1, .. })
    ));
    assert!(document
        .blocks
        .iter()
        .any(|b| matches!(b, Block::Table { header, .. } if header.len() == 3)));
    assert!(document
        .blocks
        .iter()
        .any(|b| matches!(b, Block::List { items } if items.len() == 2)));
    assert!(document.blocks.iter().any(|b| matches!(b, Block::Rule)));
}

#[test]
fn emphasis_survives_into_spans() {
    let document = render("**Overall assessment:** satisfactory");
    match &document.blocks[0] {
        Block::Paragraph { spans } => {
            assert_eq!(spans[0].style, SpanStyle::Bold);
            assert_eq!(spans[0].text, "Overall assessment:");
        }
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn unrecognized_syntax_passes_through_as_literal_text() {
    let weird = "::: custom-directive\n<not html>\n%%% noise";
    let document = render(weird);
    let text = document.to_plain_lines().join("\n");
    assert!(text.contains("::: custom-directive"));
    assert!(text.contains("<not html>"));
    assert!(text.contains("%%% noise"));
}

#[test]
fn malformed_markdown_never_fails() {
    for input in ["", "|", "| a |\n|", "#", "######a", "**", "* ", "---x---"] {
        // Best-effort rendering: no panic whatever the input.
        let _ = render(input);
    }
}

#[test]
fn download_name_embeds_template_and_date() {
    let date = Utc.with_ymd_and_hms(2026, 8, 7, 9, 0, 0).unwrap();
    assert_eq!(
        download_file_name("eicr", date),
        "eicr-report-2026-08-07.txt"
    );
}

#[test]
fn clipboard_payload_is_the_raw_text() {
    use base64::Engine;
    let seq = clipboard_sequence(SAMPLE_REPORT);
    let payload = seq
        .strip_prefix("\x1b]52;c;")
        .and_then(|s| s.strip_suffix('\x07'))
        .unwrap();
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .unwrap();
    assert_eq!(decoded, SAMPLE_REPORT.as_bytes());
}

#[test]
fn print_html_wraps_content_in_a_standalone_document() {
    let date = Utc.with_ymd_and_hms(2026, 8, 7, 9, 0, 0).unwrap();
    let html = print_html(SAMPLE_REPORT, "Electrical Installation Condition Report", date);

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Electrical Installation Condition Report</title>"));
    assert!(html.contains("generated 2026-08-07 09:00 UTC"));
    assert!(html.contains("@media print"));
    assert!(html.contains("<th>Code</th>"));
    assert!(html.contains("<li>Supply verified at intake</li>"));
    assert!(html.contains("<strong>Overall assessment:</strong>"));
}

#[test]
fn zoom_is_bounded_and_stepped() {
    let mut zoom = ZoomLevel::default();
    assert_eq!(zoom.percent(), 100);

    for _ in 0..20 {
        zoom = zoom.zoom_in();
    }
    assert_eq!(zoom.percent(), 150);

    for _ in 0..20 {
        zoom = zoom.zoom_out();
    }
    assert_eq!(zoom.percent(), 80);
}

#[test]
fn zoom_never_touches_the_report_text() {
    // Zoom is purely presentational; rendering is independent of it.
    let before = render(SAMPLE_REPORT);
    let _zoom = ZoomLevel::new(150);
    let after = render(SAMPLE_REPORT);
    assert_eq!(before, after);
}
