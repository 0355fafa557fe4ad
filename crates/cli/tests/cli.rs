//! End-to-end tests that run the `accredit` binary against a temp workspace.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use accredit_core::testing::fixtures;
use tempfile::TempDir;

/// Write templates plus a config file under `root` and return the config path.
fn write_workspace(root: &Path, qr_size: i64) -> PathBuf {
    let templates = root.join("templates");
    fs::create_dir_all(root.join("input")).unwrap();
    fs::create_dir_all(&templates).unwrap();
    fixtures::blank_template_pdf(&templates.join("attendee.pdf"), 842.0, 595.0).unwrap();
    fixtures::blank_template_pdf(&templates.join("staff.pdf"), 842.0, 595.0).unwrap();

    let config = format!(
        r#"
[folders]
input = '{root}/input'
output = '{root}/output'

[templates]
attendee = '{root}/templates/attendee.pdf'
staff = '{root}/templates/staff.pdf'

[ticket_types]
staff = ["Helpers"]
speaker = ["Speakers"]

[qr]
position = "40,40"
size = {qr_size}
"#,
        root = root.display(),
        qr_size = qr_size
    );
    let path = root.join("accredit.toml");
    fs::write(&path, config).unwrap();
    path
}

/// Run the binary with a quiet log level from inside `cwd`.
fn accredit(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_accredit"))
        .args(args)
        .current_dir(cwd)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .env_remove("ACCREDIT_CONFIG")
        .output()
        .expect("Failed to run accredit")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_batch_json_summary() {
    let temp = TempDir::new().unwrap();
    let config = write_workspace(temp.path(), 150);
    fixtures::write_csv_roster(
        &temp.path().join("input/roster.csv"),
        &[
            ["A1", "Ana", "Ruiz", "Helpers"],
            ["A2", "Ben", "Ode", "General"],
            ["", "No", "Id", "General"],
        ],
    )
    .unwrap();

    let output = accredit(
        temp.path(),
        &["--config", config.to_str().unwrap(), "batch", "--json"],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let summary: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(summary["total_processed"], 3);
    assert_eq!(summary["generated"], 2);
    assert_eq!(summary["role_counts"]["staff"], 1);
    assert_eq!(summary["role_counts"]["attendee"], 1);
    assert_eq!(summary["failures"].as_array().unwrap().len(), 1);

    let archive = PathBuf::from(summary["archive"]["path"].as_str().unwrap());
    assert!(archive.exists());
    assert!(!temp.path().join("output/attendee-A1.pdf").exists());
}

#[test]
fn test_batch_text_summary_with_explicit_roster() {
    let temp = TempDir::new().unwrap();
    let config = write_workspace(temp.path(), 150);
    let roster = temp.path().join("elsewhere.csv");
    fixtures::write_csv_roster(&roster, &[["B7", "Cleo", "Marsh", "Speakers"]]).unwrap();

    let output = accredit(
        temp.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "batch",
            roster.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("Generated:  1"));
    assert!(text.contains("speaker   1"));
    assert!(text.contains("Archive:"));
}

#[test]
fn test_invalid_qr_size_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_workspace(temp.path(), 0);
    fixtures::write_csv_roster(
        &temp.path().join("input/roster.csv"),
        &[["A1", "Ana", "Ruiz", "Helpers"]],
    )
    .unwrap();

    let output = accredit(temp.path(), &["--config", config.to_str().unwrap(), "batch"]);

    assert!(!output.status.success());
    assert!(!temp.path().join("output").exists());
}

#[test]
fn test_batch_without_roster_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_workspace(temp.path(), 150);

    let output = accredit(temp.path(), &["--config", config.to_str().unwrap(), "batch"]);

    assert!(!output.status.success());
}

#[test]
fn test_single_random_card() {
    let temp = TempDir::new().unwrap();
    write_workspace(temp.path(), 150);

    // accredit.toml in the working directory is picked up without --config
    let output = accredit(
        temp.path(),
        &[
            "single",
            "--random",
            "--first-name",
            "Dana",
            "--last-name",
            "Vale",
            "--role",
            "staff",
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let path = PathBuf::from(stdout(&output).trim());
    assert!(path.exists());
    assert!(path.starts_with(temp.path().join("output")));
    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn test_columns_suggestion() {
    let temp = TempDir::new().unwrap();
    let roster = temp.path().join("export.csv");
    fs::write(
        &roster,
        "Attendee #;First Name;Apellidos;Tipo de entrada;Empresa\n1;Ana;Ruiz;General;Acme\n",
    )
    .unwrap();

    let output = accredit(temp.path(), &["columns", roster.to_str().unwrap(), "--json"]);
    assert!(output.status.success());

    let mapping: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(mapping["attendee_id"], "Attendee #");
    assert_eq!(mapping["last_name"], "Apellidos");
    assert_eq!(mapping["ticket_type"], "Tipo de entrada");
    assert_eq!(mapping["company"], "Empresa");
}

#[test]
fn test_config_command_prints_sanitized_view() {
    let temp = TempDir::new().unwrap();
    let config = write_workspace(temp.path(), 150);

    let output = accredit(temp.path(), &["--config", config.to_str().unwrap(), "config"]);
    assert!(output.status.success());

    let view: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(view["qr_size"], 150);
    assert_eq!(view["qr_position"], "40,40");
}

#[test]
fn test_metrics_file_written() {
    let temp = TempDir::new().unwrap();
    let config = write_workspace(temp.path(), 150);
    fixtures::write_csv_roster(
        &temp.path().join("input/roster.csv"),
        &[["A1", "Ana", "Ruiz", "Helpers"]],
    )
    .unwrap();
    let metrics = temp.path().join("metrics.prom");

    let output = accredit(
        temp.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "--metrics-file",
            metrics.to_str().unwrap(),
            "batch",
        ],
    );
    assert!(output.status.success());

    let text = fs::read_to_string(&metrics).unwrap();
    assert!(text.contains("accredit_cards_rendered_total"));
}

#[test]
fn test_failed_packaging_reports_then_package_recovers() {
    let temp = TempDir::new().unwrap();
    let config = write_workspace(temp.path(), 150);
    let archive_dir = temp.path().join("archive");
    let text = fs::read_to_string(&config).unwrap().replace(
        "[folders]\n",
        &format!("[folders]\narchive = '{}'\n", archive_dir.display()),
    );
    fs::write(&config, text).unwrap();
    // A regular file where the archive folder should be
    fs::write(&archive_dir, "not a folder").unwrap();
    fixtures::write_csv_roster(
        &temp.path().join("input/roster.csv"),
        &[
            ["A1", "Ana", "Ruiz", "Helpers"],
            ["", "No", "Id", "General"],
        ],
    )
    .unwrap();

    let output = accredit(temp.path(), &["--config", config.to_str().unwrap(), "batch"]);

    assert!(!output.status.success());
    let report = stdout(&output);
    assert!(report.contains("packaging failed"));
    assert!(report.contains("Generated:  1"));
    assert!(report.contains("staff     1"));
    assert!(report.contains("Failed:     1"));
    assert!(report.contains("missing_id"));
    let card = temp.path().join("output/attendee-A1.pdf");
    assert!(card.exists());

    fs::remove_file(&archive_dir).unwrap();
    let output = accredit(
        temp.path(),
        &["--config", config.to_str().unwrap(), "package", "--json"],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let manifest: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(manifest["entries"], serde_json::json!(["attendee-A1.pdf"]));
    assert!(PathBuf::from(manifest["path"].as_str().unwrap()).starts_with(&archive_dir));
    assert!(!card.exists());

    // Nothing left to package
    let output = accredit(temp.path(), &["--config", config.to_str().unwrap(), "package"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No pending cards"));
}
