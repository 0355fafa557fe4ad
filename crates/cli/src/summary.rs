//! Human-readable reports for the terminal.

use std::collections::BTreeMap;

use accredit_core::{ArchiveManifest, BatchResult, BatchTally, ColumnMapping, RecordFailure, Role};

/// Run report: counts per role, rejected rows and the archive.
pub fn render(result: &BatchResult) -> String {
    let mut out = format!("Run {}\n", result.run_id);
    out.push_str(&format!("  Roster:     {}\n", result.input_path.display()));
    out.push_str(&format!(
        "  Processed:  {} rows in {} ms\n",
        result.total_processed, result.duration_ms
    ));
    out.push_str(&counts(result.generated, &result.role_counts, &result.failures));
    out.push_str(&archive(&result.archive));
    out
}

/// Report for a run whose packaging failed: the cards are still on disk.
pub fn render_incomplete(tally: &BatchTally) -> String {
    let mut out = String::from("Run incomplete: packaging failed\n");
    out.push_str(&format!("  Processed:  {} rows\n", tally.total_processed));
    out.push_str(&counts(
        tally.documents.len(),
        &tally.role_counts,
        &tally.failures,
    ));
    out.push_str("  Cards kept for `accredit package`:\n");
    for document in &tally.documents {
        out.push_str(&format!("    {}\n", document.path.display()));
    }
    out
}

/// Report for `accredit package`.
pub fn render_package(manifest: &ArchiveManifest) -> String {
    let mut out = format!(
        "Packaged {} pending cards\n",
        manifest.entries.len()
    );
    out.push_str(&archive(manifest));
    out
}

fn counts(
    generated: usize,
    role_counts: &BTreeMap<Role, usize>,
    failures: &[RecordFailure],
) -> String {
    let mut out = format!("  Generated:  {}\n", generated);
    for role in Role::ALL {
        let count = role_counts.get(&role).copied().unwrap_or(0);
        out.push_str(&format!("    {:<9} {}\n", role.as_str(), count));
    }

    if !failures.is_empty() {
        out.push_str(&format!("  Failed:     {}\n", failures.len()));
        for failure in failures {
            let id = failure.attendee_id.as_deref().unwrap_or("-");
            out.push_str(&format!(
                "    row {:>4}  {:<14} {}: {}\n",
                failure.row, id, failure.reason, failure.message
            ));
        }
    }
    out
}

fn archive(manifest: &ArchiveManifest) -> String {
    format!(
        "  Archive:    {}\n    {} entries, {} bytes, sha256 {}\n",
        manifest.path.display(),
        manifest.entries.len(),
        manifest.size_bytes,
        manifest.sha256
    )
}

/// Header listing plus a `[columns]` snippet ready to paste into the config.
pub fn render_columns(headers: &[String], mapping: &ColumnMapping) -> String {
    let mut out = String::from("Headers:\n");
    for (index, header) in headers.iter().enumerate() {
        out.push_str(&format!("  {:>3}  {}\n", index + 1, header));
    }

    out.push_str("\n[columns]\n");
    out.push_str(&format!("attendee_id = {}\n", quoted(&mapping.attendee_id)));
    out.push_str(&format!("first_name = {}\n", quoted(&mapping.first_name)));
    out.push_str(&format!("last_name = {}\n", quoted(&mapping.last_name)));
    out.push_str(&format!("ticket_type = {}\n", quoted(&mapping.ticket_type)));
    if let Some(company) = &mapping.company {
        out.push_str(&format!("company = {}\n", quoted(company)));
    }
    out
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
