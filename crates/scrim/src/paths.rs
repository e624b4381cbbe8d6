// Author: Dustin Pilgrim
// License: MIT

use std::env;
use std::io;
use std::path::{Path, PathBuf};

fn xdg_dir(var: &str, fallback: &[&str]) -> PathBuf {
    if let Some(v) = env::var_os(var).filter(|v| !v.is_empty()) {
        return PathBuf::from(v);
    }

    let home = env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    fallback.iter().fold(home, |p, part| p.join(part))
}

/// `$XDG_STATE_HOME/scrim/scrim.log`, falling back to `~/.local/state`.
pub fn default_log_path() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", &[".local", "state"])
        .join("scrim")
        .join("scrim.log")
}

/// `$XDG_CONFIG_HOME/scrim/scrim.rune`, falling back to `~/.config`.
pub fn default_config_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", &[".config"])
        .join("scrim")
        .join("scrim.rune")
}

pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_stable() {
        assert!(default_log_path().ends_with("scrim/scrim.log"));
        assert!(default_config_path().ends_with("scrim/scrim.rune"));
    }

    #[test]
    fn creates_missing_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a").join("b").join("out.png");
        ensure_parent_dir(&target).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());

        ensure_parent_dir(Path::new("bare.png")).unwrap();
    }
}
