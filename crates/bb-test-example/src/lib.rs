use std::path::PathBuf;

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

pub fn demos_root() -> PathBuf {
    workspace_root().join("demos").join("dialogues")
}

pub fn demo_dir(name: &str) -> PathBuf {
    demos_root().join(name)
}

pub fn testcase_path(name: &str) -> PathBuf {
    demo_dir(name).join("testcase.json")
}

/// Every fixture directory under `demos/dialogues`, sorted by name.
pub fn demo_dirs() -> std::io::Result<Vec<PathBuf>> {
    let mut directories = std::fs::read_dir(demos_root())?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect::<Vec<_>>();
    directories.sort();
    Ok(directories)
}
