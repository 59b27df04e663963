//! Filesystem helpers for generated project files

use std::path::Path;

use anyhow::{Context, Result};

/// Ensure a directory exists
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write `content` to `path`, creating parent directories as needed
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Append `content` to `path` unless the file already contains `marker`
///
/// Missing files are created. Returns whether anything was written.
pub fn append_once(path: &Path, marker: &str, content: &str) -> Result<bool> {
    let existing = match std::fs::read_to_string(path) {
        Ok(existing) => existing,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };
    if existing.contains(marker) {
        return Ok(false);
    }

    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(content);
    write_file(path, &updated)?;
    Ok(true)
}

/// Mark a generated script as executable (rwxr-xr-x)
#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)
        .with_context(|| format!("Failed to chmod {}", path.display()))
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_file_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a/b/c.txt");
        write_file(&path, "hi").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hi");
    }

    #[test]
    fn test_append_once_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("__init__.py");
        std::fs::write(&path, "# package").unwrap();

        assert!(append_once(&path, "import x", "import x\n").unwrap());
        assert!(!append_once(&path, "import x", "import x\n").unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# package\nimport x\n");
    }

    #[test]
    fn test_append_once_creates_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("new.py");
        assert!(append_once(&path, "x", "x = 1\n").unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x = 1\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_make_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run.sh");
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        make_executable(&path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
