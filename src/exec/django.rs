//! Wrappers around Django's own generators and pip

use std::path::PathBuf;

use anyhow::Result;

use super::subprocess::{CommandResult, CommandRunner};
use crate::error::{hints, PorosError};

/// Runs django-admin, manage.py and pip inside the project root
pub struct DjangoCommands<'a> {
    runner: &'a dyn CommandRunner,
    python: String,
    root: PathBuf,
}

impl<'a> DjangoCommands<'a> {
    pub fn new(runner: &'a dyn CommandRunner, python: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            python: python.into(),
            root: root.into(),
        }
    }

    /// `django-admin startproject <name> .`
    pub fn startproject(&self, name: &str) -> Result<(), PorosError> {
        let args = vec!["startproject".to_string(), name.to_string(), ".".to_string()];
        match self.runner.run("django-admin", &args, &self.root) {
            Ok(result) if result.success => Ok(()),
            Ok(result) => Err(PorosError::project_creation(
                format!("django-admin exited with {}", result.failure_summary()),
                hints::django_admin(),
            )),
            Err(e) => Err(PorosError::project_creation(
                "django-admin could not be started",
                hints::django_admin(),
            )
            .with_source(e)),
        }
    }

    /// `<python> manage.py startapp <name>`
    pub fn startapp(&self, name: &str) -> Result<(), PorosError> {
        let result = self.manage(&["startapp", name]);
        match result {
            Ok(result) if result.success => Ok(()),
            Ok(result) => Err(PorosError::app_creation(name, result.failure_summary())),
            Err(e) => Err(PorosError::app_creation(name, "manage.py could not be started").with_source(e)),
        }
    }

    /// `<python> -m pip install -r requirements.txt`
    pub fn install_dependencies(&self) -> Result<(), PorosError> {
        let args = ["-m", "pip", "install", "-r", "requirements.txt"]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();

        match self.runner.run(&self.python, &args, &self.root) {
            Ok(result) if result.success => Ok(()),
            Ok(result) => Err(PorosError::dependency_install(format!(
                "pip exited with {}",
                result.failure_summary()
            ))),
            Err(e) => Err(PorosError::dependency_install("pip could not be started").with_source(e)),
        }
    }

    /// `makemigrations` followed by `migrate`
    pub fn run_migrations(&self) -> Result<(), PorosError> {
        for step in ["makemigrations", "migrate"] {
            match self.manage(&[step]) {
                Ok(result) if result.success => {}
                Ok(result) => {
                    return Err(PorosError::migration(format!(
                        "manage.py {} exited with {}",
                        step,
                        result.failure_summary()
                    )))
                }
                Err(e) => {
                    return Err(PorosError::migration(format!("manage.py {} could not be started", step))
                        .with_source(e))
                }
            }
        }
        Ok(())
    }

    fn manage(&self, args: &[&str]) -> Result<CommandResult> {
        let mut full_args = vec!["manage.py".to_string()];
        full_args.extend(args.iter().map(|s| s.to_string()));
        self.runner.run(&self.python, &full_args, &self.root)
    }
}
