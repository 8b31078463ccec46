use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const REPORT: &str = "REPORT zorders.\n\
DATA lv_total TYPE i.\n\
SELECT * FROM vbak INTO TABLE @DATA(lt_vbak).\n\
PERFORM compute.\n\
WRITE lv_total.\n";

/// Workspace with a config that keeps the audit log inside the temp dir
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("audit.log");
    fs::write(
        dir.path().join("config.toml"),
        format!("[audit]\nenabled = true\nlog_file = {:?}\n", log.to_string_lossy()),
    )
    .unwrap();
    fs::write(dir.path().join("zorders.abap"), REPORT).unwrap();
    dir
}

fn cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("abap-assist").unwrap();
    cmd.current_dir(dir)
        .arg("--config")
        .arg(dir.join("config.toml"));
    cmd
}

#[test]
fn analyze_file_as_json() {
    let dir = workspace();
    cmd(dir.path())
        .args(["analyze", "zorders.abap", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"program_type\": \"REPORT\""))
        .stdout(predicate::str::contains("\"vbak\""))
        .stdout(predicate::str::contains("\"lv_total\""));
}

#[test]
fn analyze_directory_summaries() {
    let dir = workspace();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src").join("zcl.abap"), "CLASS zcl_util DEFINITION.\nENDCLASS.").unwrap();

    cmd(dir.path())
        .args(["analyze", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("File: zcl.abap"))
        .stdout(predicate::str::contains("Type: CLASS"))
        .stdout(predicate::str::contains("2 files analyzed"));
}

#[test]
fn analyze_missing_path_fails() {
    let dir = workspace();
    cmd(dir.path())
        .args(["analyze", "nope.abap"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found"));
}

#[test]
fn insights_report() {
    let dir = workspace();
    cmd(dir.path())
        .args(["insights", "zorders.abap"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PERFORMANCE ISSUES:"))
        .stdout(predicate::str::contains("SELECT *"));
}

#[test]
fn prompt_with_documents() {
    let dir = workspace();
    fs::write(dir.path().join("requirements.txt"), "Totals exclude cancelled orders.").unwrap();

    cmd(dir.path())
        .args(["prompt", "explain", "zorders.abap", "--doc", "requirements.txt"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("📋 CONTEXT DOCUMENTATION:\n📄 Document: requirements.txt"))
        .stdout(predicate::str::contains("Please explain this ABAP code in detail."))
        .stdout(predicate::str::contains("Type: REPORT"));
}

#[test]
fn custom_prompt_needs_instruction() {
    let dir = workspace();
    cmd(dir.path())
        .args(["prompt", "custom", "zorders.abap"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--instruction"));

    cmd(dir.path())
        .args(["prompt", "custom", "zorders.abap", "--instruction", "List all tables"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("List all tables\n\nContext: File: zorders.abap"));
}

#[test]
fn context_summary_with_disabled_document() {
    let dir = workspace();
    fs::write(dir.path().join("a.txt"), "alpha").unwrap();
    fs::write(dir.path().join("b.txt"), "beta").unwrap();

    cmd(dir.path())
        .args(["context", "a.txt", "b.txt", "--disable", "b.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/2 docs enabled"))
        .stdout(predicate::str::contains("📄 Document: a.txt"))
        .stdout(predicate::str::contains("beta").not());
}

#[test]
fn mark_modification_writes_audit_log() {
    let dir = workspace();
    fs::write(dir.path().join("new.abap"), "lv_total = lv_total + 1.").unwrap();

    cmd(dir.path())
        .args(["mark", "zorders.abap", "--new", "new.abap", "--ticket", "chg-4567", "--user", "jdoe"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("*BEGIN MOD CHG-4567 JDOE "))
        .stdout(predicate::str::contains("*REPORT zorders.\n"))
        .stdout(predicate::str::contains("lv_total = lv_total + 1.\n*END MOD CHG-4567 JDOE "));

    let log = fs::read_to_string(dir.path().join("audit.log")).unwrap();
    assert!(log.contains("MARK_MODIFICATION (Ticket: CHG-4567) by JDOE on zorders.abap"));
}

#[test]
fn mark_invalid_ticket_fails_without_terminal() {
    let dir = workspace();
    cmd(dir.path())
        .args(["mark", "zorders.abap", "--ticket", "123-ABC"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid ticket number"));
}

#[test]
fn mark_insertion_without_ticket() {
    let dir = workspace();
    cmd(dir.path())
        .args(["mark", "zorders.abap", "--user", "jdoe"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("*BEGIN INS UNKNOWN JDOE "))
        .stdout(predicate::str::contains("WRITE lv_total.\n*END INS UNKNOWN JDOE "));
}

#[test]
fn config_init_and_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf").join("config.toml");

    Command::cargo_bin("abap-assist")
        .unwrap()
        .args(["--config", path.to_str().unwrap(), "config", "--init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration initialized"));

    Command::cargo_bin("abap-assist")
        .unwrap()
        .args(["--config", path.to_str().unwrap(), "config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_context_tokens = 8000"))
        .stdout(predicate::str::contains("*BEGIN MOD {TICKET} {USER} {DATE}"));
}

#[test]
fn apply_fix_reply_with_markers() {
    let dir = workspace();
    fs::write(
        dir.path().join("reply.md"),
        "Fixed version:\n```abap\nSELECT vbeln FROM vbak INTO TABLE @DATA(lt_vbak).\n```\n",
    )
    .unwrap();

    cmd(dir.path())
        .args(["apply", "zorders.abap", "--response", "reply.md", "--ticket", "INC-77", "--user", "jdoe"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("*BEGIN MOD INC-77 JDOE "))
        .stdout(predicate::str::contains("*SELECT * FROM vbak"))
        .stdout(predicate::str::contains("SELECT vbeln FROM vbak INTO TABLE @DATA(lt_vbak).\n*END MOD INC-77 JDOE "));

    let log = fs::read_to_string(dir.path().join("audit.log")).unwrap();
    assert!(log.contains("AUTO_FIX_MARKED (Ticket: INC-77) by JDOE on zorders.abap"));
}

#[test]
fn apply_rejects_reply_without_code() {
    let dir = workspace();
    fs::write(dir.path().join("reply.md"), "Sorry, I cannot see a problem here").unwrap();

    cmd(dir.path())
        .args(["apply", "zorders.abap", "--response", "reply.md", "--ticket", "INC-77", "--optimize"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not contain ABAP code"));

    assert!(!dir.path().join("audit.log").exists());

    cmd(dir.path())
        .args(["apply", "zorders.abap", "--response", "reply.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ticket number is required"));
}

#[test]
fn context_reads_docx_and_rejects_legacy_doc() {
    use std::io::Write;

    let dir = workspace();
    let mut zip = zip::ZipWriter::new(fs::File::create(dir.path().join("req.docx")).unwrap());
    zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.write_all(
        br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Credit checks run before release.</w:t></w:r></w:p></w:body></w:document>"#,
    )
    .unwrap();
    zip.finish().unwrap();
    fs::write(dir.path().join("old.doc"), [0xD0u8, 0xCF, 0x11, 0xE0]).unwrap();

    cmd(dir.path())
        .args(["context", "req.docx", "old.doc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/1 docs enabled"))
        .stdout(predicate::str::contains("📄 Document: req.docx"))
        .stdout(predicate::str::contains("Credit checks run before release."))
        .stderr(predicate::str::contains("legacy Word format"));
}
