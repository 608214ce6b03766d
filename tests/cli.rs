use assert_cmd::Command;
use image::RgbImage;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn crawler() -> Command {
    Command::cargo_bin("image-size-crawler").unwrap()
}

fn build_tree(root: &Path) {
    fs::create_dir_all(root.join("sub")).unwrap();
    RgbImage::new(10, 20).save(root.join("a.png")).unwrap();
    fs::write(root.join("b.txt"), "notes").unwrap();
    fs::write(root.join("sub").join("c.jpg"), "corrupt").unwrap();
}

#[test]
fn writes_report_to_requested_file() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("photos");
    build_tree(&root);
    let report = temp_dir.path().join("report.csv");

    crawler()
        .arg(&root)
        .arg("--output-file")
        .arg(&report)
        .arg("--quiet")
        .assert()
        .success();

    let content = fs::read_to_string(&report).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "Filename,FullFilepath,Height,Width,LastModified,Notes");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("a.png,"));
    assert!(lines[1].contains(",20,10,"));
    assert!(lines[2].starts_with("c.jpg,"));
    assert!(lines[2].ends_with(",0,0,,EXCEPTION. ERROR READING FILE."));
}

#[test]
fn default_output_lands_in_output_folder() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("empty");
    fs::create_dir(&root).unwrap();

    crawler()
        .current_dir(temp_dir.path())
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Output was saved here"));

    let reports: Vec<_> = fs::read_dir(temp_dir.path().join("Output"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(reports.len(), 1);

    let name = reports[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("ImageSizeCrawler-output-"));
    assert!(name.ends_with(".csv"));

    let content = fs::read_to_string(&reports[0]).unwrap();
    assert_eq!(content.lines().count(), 1);
}

#[test]
fn plain_output_reports_save_location() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("photos");
    build_tree(&root);

    crawler()
        .arg(&root)
        .arg("--output-file")
        .arg(temp_dir.path().join("reports").join("scan.csv"))
        .arg("--output-format")
        .arg("plain")
        .assert()
        .success()
        .stdout(predicate::str::contains("Output was saved here"))
        .stdout(predicate::str::contains("reports"));
}

#[cfg(not(feature = "parallel"))]
#[test]
fn warns_when_workers_cannot_apply() {
    let temp_dir = TempDir::new().unwrap();

    crawler()
        .arg(temp_dir.path())
        .arg("--output-file")
        .arg(temp_dir.path().join("report.csv"))
        .arg("--workers")
        .arg("4")
        .assert()
        .success()
        .stdout(predicate::str::contains("--workers has no effect"));
}

#[test]
fn missing_root_exits_without_report() {
    let temp_dir = TempDir::new().unwrap();

    crawler()
        .current_dir(temp_dir.path())
        .arg(temp_dir.path().join("does-not-exist"))
        .assert()
        .code(3);

    assert!(!temp_dir.path().join("Output").exists());
}

#[test]
fn prompts_for_path_when_missing() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("photos");
    build_tree(&root);

    crawler()
        .current_dir(temp_dir.path())
        .write_stdin(format!("{}\n", root.display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("Enter the path of the folder"));
}

#[test]
fn generates_sample_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("crawler.toml");

    crawler()
        .arg("--generate-config")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated sample configuration file"));

    assert!(fs::read_to_string(&config).unwrap().contains("[output]"));
}

#[test]
fn json_report_is_machine_readable() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("photos");
    build_tree(&root);

    let output = crawler()
        .arg(&root)
        .arg("--output-file")
        .arg(temp_dir.path().join("report.csv"))
        .arg("--output-format")
        .arg("json")
        .output()
        .unwrap();

    let stdout = String::from_utf8(output.stdout).unwrap();
    // Progress messages are single-line objects; the report is pretty-printed
    let start = stdout.find("\n{\n").map(|i| i + 1).unwrap_or(0);
    let json: serde_json::Value = serde_json::from_str(&stdout[start..]).unwrap();
    assert_eq!(json["images_recorded"], 2);
    assert_eq!(json["extraction_failures"], 1);
}
