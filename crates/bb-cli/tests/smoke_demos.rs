use std::fs;
use std::process::Command;

#[test]
fn check_runs_all_demos() {
    let bin = env!("CARGO_BIN_EXE_bb-cli");
    let manifest_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let demos_root = manifest_dir
        .join("..")
        .join("..")
        .join("demos")
        .join("dialogues");

    let mut directories = fs::read_dir(&demos_root)
        .expect("demos root must exist")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect::<Vec<_>>();
    directories.sort();

    assert!(!directories.is_empty(), "expected dialogue demos");

    for directory in directories {
        let output = Command::new(bin)
            .arg("check")
            .arg("--dialogue-dir")
            .arg(&directory)
            .output()
            .expect("cli should execute");

        if !output.status.success() {
            panic!(
                "demo {} failed\nstdout:\n{}\nstderr:\n{}",
                directory.display(),
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            stdout.contains("RESULT:OK"),
            "stdout missing RESULT:OK for {}",
            directory.display()
        );
    }
}

#[test]
fn play_stops_at_options_and_lists_them() {
    let bin = env!("CARGO_BIN_EXE_bb-cli");
    let market = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
        .join("dialogues")
        .join("02-options");

    let output = Command::new(bin)
        .arg("play")
        .arg("--dialogue-dir")
        .arg(&market)
        .output()
        .expect("cli should execute");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("EVENT:OPTIONS"));
    assert!(stdout.contains("LINE_JSON:\"The merchant eyes your purse.\""));
    assert!(stdout.contains("OPTION:0|false|\"Buy the sword (10 gold)\""));
    assert!(stdout.contains("OPTION:1|true|\"Haggle with 5 gold\""));
}
