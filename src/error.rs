//! Error types and helpers for user-friendly error messages
//!
//! Every failure that stops the scaffold carries a hint telling the user
//! how to recover or finish the step by hand.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Custom error types with helpful context and suggestions
#[derive(Error, Debug)]
pub enum PorosError {
    /// `django-admin startproject` failed
    #[error("Failed to create Django project: {message}")]
    ProjectCreation {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },

    /// `manage.py startapp` failed
    #[error("Failed to create app '{app}': {message}")]
    AppCreation {
        app: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },

    /// settings.py could not be read, patched or written
    #[error("Failed to update {}: {message}", path.display())]
    SettingsUpdate {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },

    /// pip install failed
    #[error("Failed to install dependencies: {message}")]
    DependencyInstall {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },

    /// makemigrations or migrate failed
    #[error("Failed to run migrations: {message}")]
    Migration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },

    /// A bundled template failed to render or its output could not be written
    #[error("Failed to render template '{template}': {message}")]
    TemplateRender {
        template: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: String,
    },

    /// Project, app or docker name is not usable as a Python package
    #[error("{message}")]
    InvalidAppName {
        name: String,
        message: String,
        hint: String,
    },

    /// Tool/executable not found or misconfigured
    #[error("Missing tool: {tool}")]
    MissingTool {
        tool: String,
        required_for: String,
        hint: String,
    },
}

impl PorosError {
    /// Create a project creation error with a hint
    pub fn project_creation(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::ProjectCreation {
            message: message.into(),
            source: None,
            hint: Some(hint.into()),
        }
    }

    /// Create an app creation error
    pub fn app_creation(app: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AppCreation {
            app: app.into(),
            message: message.into(),
            source: None,
            hint: Some(hints::app_name_clash().to_string()),
        }
    }

    /// Create a settings update error with an optional source
    pub fn settings_update(
        path: impl AsRef<Path>,
        message: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::SettingsUpdate {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
            source,
            hint: Some(hints::manual_settings().to_string()),
        }
    }

    /// Create a dependency installation error
    pub fn dependency_install(message: impl Into<String>) -> Self {
        Self::DependencyInstall {
            message: message.into(),
            source: None,
            hint: Some(hints::pip().to_string()),
        }
    }

    /// Create a migration error
    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration {
            message: message.into(),
            source: None,
            hint: Some(hints::migrations().to_string()),
        }
    }

    /// Create a template rendering error
    pub fn template_render(
        template: impl Into<String>,
        message: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::TemplateRender {
            template: template.into(),
            message: message.into(),
            source,
            hint: hints::templates().to_string(),
        }
    }

    /// Create an invalid name error
    pub fn invalid_app_name(
        name: impl Into<String>,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::InvalidAppName {
            name: name.into(),
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create a missing tool error
    pub fn missing_tool(
        tool: impl Into<String>,
        required_for: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::MissingTool {
            tool: tool.into(),
            required_for: required_for.into(),
            hint: hint.into(),
        }
    }

    /// Attach a source error, keeping everything else
    pub fn with_source(mut self, err: anyhow::Error) -> Self {
        match &mut self {
            PorosError::ProjectCreation { source, .. }
            | PorosError::AppCreation { source, .. }
            | PorosError::SettingsUpdate { source, .. }
            | PorosError::DependencyInstall { source, .. }
            | PorosError::Migration { source, .. }
            | PorosError::TemplateRender { source, .. } => *source = Some(err),
            PorosError::InvalidAppName { .. } | PorosError::MissingTool { .. } => {}
        }
        self
    }

    /// The hint shown under the error, if any
    pub fn hint(&self) -> Option<&str> {
        match self {
            PorosError::ProjectCreation { hint, .. }
            | PorosError::AppCreation { hint, .. }
            | PorosError::SettingsUpdate { hint, .. }
            | PorosError::DependencyInstall { hint, .. }
            | PorosError::Migration { hint, .. } => hint.as_deref(),
            PorosError::TemplateRender { hint, .. }
            | PorosError::InvalidAppName { hint, .. }
            | PorosError::MissingTool { hint, .. } => Some(hint),
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        use console::style;

        eprintln!("\n{} {}", style("ERROR:").red().bold(), self);

        if let Some(source) = std::error::Error::source(self) {
            eprintln!("  {} {}", style("caused by:").dim(), source);
        }

        if let PorosError::MissingTool { required_for, .. } = self {
            eprintln!("  {} {}", style("required for:").dim(), required_for);
        }

        if let Some(h) = self.hint() {
            eprintln!("\n{} {}", style("HINT:").yellow().bold(), h);
        }

        eprintln!();
    }
}

/// Common error hints
pub mod hints {
    /// Get hint for missing Python
    pub fn python() -> &'static str {
        "Install Python 3.10+ from https://www.python.org/ or use your package manager:\n\
         • macOS: brew install python3\n\
         • Ubuntu: sudo apt install python3 python3-venv\n\
         • Windows: winget install Python.Python.3.12\n\
         \n\
         Activating a virtual environment first is recommended."
    }

    /// Get hint for missing django-admin
    pub fn django_admin() -> &'static str {
        "Make sure Django is installed in the active environment:\n\
         • Run: python -m pip install -r requirements.txt\n\
         • Check that django-admin is on your PATH"
    }

    /// Get hint for pip failures
    pub fn pip() -> &'static str {
        "Install the requirements manually once the problem is fixed:\n\
         • Run: python -m pip install -r requirements.txt\n\
         • Check your network connection and package index settings"
    }

    /// Get hint for failed migrations
    pub fn migrations() -> &'static str {
        "You may need to run them manually:\n\
         • Run: python manage.py makemigrations\n\
         • Run: python manage.py migrate"
    }

    /// Get hint for a settings.py that could not be patched
    pub fn manual_settings() -> &'static str {
        "settings.py does not look like the file django-admin generates.\n\
         Manual update required:\n\
         • Add 'rest_framework' and 'auth_app' to INSTALLED_APPS\n\
         • Add AUTH_USER_MODEL = 'auth_app.User'"
    }

    /// Get hint for a failed `manage.py startapp`
    pub fn app_name_clash() -> &'static str {
        "The app name may clash with an existing module or directory:\n\
         • Check that no folder with that name exists in the project\n\
         • Check that it does not shadow an installed Python package\n\
         • Run: python manage.py startapp <name> to see Django's own error"
    }

    /// Get hint for a bundled template that fails to render
    pub fn templates() -> &'static str {
        "The embedded templates are broken; rebuild or reinstall porosdjango"
    }

    /// Get hint for invalid Python identifiers
    pub fn identifier() -> &'static str {
        "Names must:\n\
         • Start with a letter or underscore\n\
         • Contain only letters, digits, or underscores\n\
         • Examples: blog, api_v1, accounts"
    }
}
