//! Text rendering of previews, payloads and apply summaries

use anyhow::{Context, Result};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::types::{ApplySummary, ChangeRecord, ReconcileReport, UpdatePayload};

const PREVIEW_HEADERS: [&str; 10] = [
    "ID",
    "Previous name",
    "New name",
    "Previous latitude",
    "New latitude",
    "Previous longitude",
    "New longitude",
    "Previous metadata",
    "New metadata",
    "Status",
];

/// "File loaded: <name> (<n> rows)"
pub fn file_loaded_message(filename: &str, rows: usize) -> String {
    format!("File loaded: {} ({} rows)", filename, rows)
}

/// "Changes overview (changing: X / Y)"
pub fn preview_header(report: &ReconcileReport) -> String {
    format!(
        "Changes overview (changing: {} / {})",
        report.changed_count, report.total_count
    )
}

/// Preview table with old and new values side by side
pub fn preview_table(records: &[ChangeRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(PREVIEW_HEADERS);

    for record in records {
        let status = Cell::new(record.status.label()).fg(if record.is_changed() {
            Color::Yellow
        } else {
            Color::Green
        });

        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(text(&record.name.old)),
            Cell::new(text(&record.name.new)),
            Cell::new(record.latitude.old),
            Cell::new(record.latitude.new),
            Cell::new(record.longitude.old),
            Cell::new(record.longitude.new),
            Cell::new(text(&record.metadata.old)),
            Cell::new(text(&record.metadata.new)),
            status,
        ]);
    }

    table
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// Payload as pretty JSON with 4-space indent, non-ASCII kept as is
pub fn payload_json(payload: &[UpdatePayload]) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    payload
        .serialize(&mut serializer)
        .context("Failed to serialize payload")?;
    String::from_utf8(buf).context("Payload JSON is not valid UTF-8")
}

/// Question shown before applying
pub fn confirm_question(count: usize) -> String {
    format!("Are you sure you want to change {} devices?", count)
}

/// Final success/failure summary
pub fn apply_summary_text(summary: &ApplySummary) -> String {
    if summary.is_clean() {
        return format!("{} devices updated successfully.", summary.succeeded);
    }

    let mut text = format!("Updated: {}\n", summary.succeeded);
    text.push_str(&format!("Errors: {}\n", summary.failures.len()));
    for line in summary.failure_lines() {
        text.push_str(&format!("  - {}\n", line));
    }
    text
}
