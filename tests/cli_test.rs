use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const ENGLISH: &str = "Every evening the old keeper climbed the narrow stairs of the \
                       lighthouse and lit the great lamp. Ships passing the rocky coast \
                       during the night trusted that light to guide them home.";

fn write_config(dir: &Path) -> std::path::PathBuf {
    let config_path = dir.join("settings.toml");
    let index_path = dir.join("index");
    let content = format!(
        "index_path = \"{}\"\n\n[indexing]\nwriter_heap_bytes = 20000000\n",
        index_path.display()
    );
    std::fs::write(&config_path, content).unwrap();
    config_path
}

fn indexer(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_langsift"))
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("Failed to run langsift")
}

fn search(config: &Path, input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_langsift-search"))
        .arg("--config")
        .arg(config)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run langsift-search");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_add_list_search_remove() {
    let temp_dir = TempDir::new().unwrap();
    let docs = TempDir::new().unwrap();
    std::fs::write(docs.path().join("keeper.txt"), ENGLISH).unwrap();
    let config = write_config(temp_dir.path());
    let root = docs.path().canonicalize().unwrap();

    let output = indexer(&config, &["--add", docs.path().to_str().unwrap()]);
    assert!(output.status.success());

    let output = indexer(&config, &["--list"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        format!("{}\n", root.display())
    );

    let output = search(&config, "lighthouse\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("File count: 1"));
    assert!(stdout.contains(&root.join("keeper.txt").display().to_string()));

    let output = indexer(&config, &["--rm", docs.path().to_str().unwrap()]);
    assert!(output.status.success());

    let output = indexer(&config, &["--list"]);
    assert!(output.stdout.is_empty());
}

#[test]
fn test_remove_unregistered_root_fails() {
    let temp_dir = TempDir::new().unwrap();
    let docs = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    let output = indexer(&config, &["--rm", docs.path().to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Not a watched root"));
}

#[test]
fn test_conflicting_actions_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    let output = indexer(&config, &["--list", "--purge"]);
    assert!(!output.status.success());
}

#[test]
fn test_init_writes_config_once() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("fresh").join("settings.toml");

    let output = indexer(&config, &["--init"]);
    assert!(output.status.success());
    let content = std::fs::read_to_string(&config).unwrap();
    assert!(content.contains("[search]"));
    assert!(content.contains("debounce_ms = 300"));

    let output = indexer(&config, &["--init"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));
}
