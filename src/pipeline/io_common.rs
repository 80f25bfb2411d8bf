use std::path::{Path, PathBuf};

/// Resolves an input file name against the data directory.
pub fn input_path(root: &str, file_name: &str) -> PathBuf {
    [root, file_name].iter().collect()
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string()
}
