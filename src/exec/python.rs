//! Python interpreter discovery

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::subprocess::{command_exists, run_command};
use crate::error::{hints, PorosError};

/// Find the Python 3 interpreter the generated project should use
///
/// An active virtual environment wins; otherwise `python3` then `python`
/// from PATH, as long as it reports Python 3.
pub fn find_python() -> Result<String> {
    if let Some(venv) = env::var_os("VIRTUAL_ENV") {
        let candidate = venv_python(Path::new(&venv));
        if candidate.is_file() {
            return Ok(candidate.to_string_lossy().into_owned());
        }
    }

    let cwd = env::current_dir().unwrap_or_else(|_| env::temp_dir());
    for python in &["python3", "python"] {
        if command_exists(python) {
            // Verify it's Python 3
            let result = run_command(python, &["--version".to_string()], &cwd, false)?;
            if result.success && reports_python3(&result.stdout, &result.stderr) {
                return Ok(python.to_string());
            }
        }
    }

    Err(PorosError::missing_tool("python3", "running manage.py and pip", hints::python()).into())
}

/// Interpreter path inside a virtual environment
pub fn venv_python(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv.join("Scripts").join("python.exe")
    } else {
        venv.join("bin").join("python")
    }
}

// Python 2 printed its version to stderr
fn reports_python3(stdout: &str, stderr: &str) -> bool {
    stdout.contains("Python 3") || stderr.contains("Python 3")
}
