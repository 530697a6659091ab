//! Interactive preview/apply flow on top of the editing session.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::cli::InputArgs;
use crate::services::registry::DeviceRegistry;
use crate::services::report::{
    apply_summary_text, file_loaded_message, payload_json, preview_header, preview_table,
};
use crate::services::session::Session;

/// Load the file and print the change preview. Returns the session in
/// `PreviewGenerated` state.
pub async fn preview(registry: &dyn DeviceRegistry, input: &InputArgs) -> Result<Session> {
    let content = std::fs::read(&input.file)
        .with_context(|| format!("Failed to read {}", input.file.display()))?;
    let filename = display_name(&input.file);

    let mut session = Session::new();
    let rows = session
        .load_file(&filename, &content, input.delimiter)
        .with_context(|| format!("Failed to parse {}", filename))?;
    println!("{}", file_loaded_message(&filename, rows));

    let report = session.generate_preview(registry).await?;

    println!();
    println!("{}", preview_header(&report));
    println!("{}", preview_table(&report.preview));

    if report.skipped > 0 {
        info!(
            "{} of {} rows had no matching device and were left out",
            report.skipped, report.rows_read
        );
    }

    if input.show_payload {
        println!("{}", payload_json(&report.payload)?);
    }

    Ok(session)
}

/// Write the payload of a previewed session to `path`
pub fn write_payload(session: &Session, path: &Path) -> Result<()> {
    let payload = session.report().map(|r| r.payload.as_slice()).unwrap_or_default();
    std::fs::write(path, payload_json(payload)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Payload with {} devices written to {}", payload.len(), path.display());
    Ok(())
}

/// Preview, confirm, apply and print the summary.
///
/// Fails when any device update failed so the exit code reflects it.
pub async fn apply(registry: &dyn DeviceRegistry, input: &InputArgs, assume_yes: bool) -> Result<()> {
    let mut session = preview(registry, input).await?;

    if session.report().map_or(true, |r| !r.has_changes()) {
        println!("Nothing to apply.");
        return Ok(());
    }

    let question = session.request_apply()?;

    let confirmed = assume_yes || {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        confirm(&question, &mut stdin.lock(), &mut stdout.lock())?
    };

    if !confirmed {
        session.cancel()?;
        println!("Cancelled, no devices were changed.");
        return Ok(());
    }

    let summary = session.confirm_apply(registry).await?;
    println!("{}", apply_summary_text(&summary));

    if !summary.is_clean() {
        bail!("{} of {} updates failed", summary.failures.len(), summary.attempted());
    }
    Ok(())
}

/// Ask a yes/no question; anything but "y"/"yes" is a no
pub fn confirm(question: &str, input: &mut impl BufRead, output: &mut impl Write) -> Result<bool> {
    write!(output, "{} [y/N] ", question).context("Failed to write prompt")?;
    output.flush().context("Failed to flush prompt")?;

    let mut answer = String::new();
    input.read_line(&mut answer).context("Failed to read answer")?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
