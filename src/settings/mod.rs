//! settings.py modifications applied after `startproject`

pub mod patcher;

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::defaults::AUTH_APP_NAME;
use crate::error::PorosError;
use patcher::{PatchError, SettingsDocument};

const AUTH_USER_MODEL_LINE: &str = "AUTH_USER_MODEL = 'auth_app.User'";
const DOCKER_MARKER: &str = "# Docker integration";

/// Applies the tool's opinions to a generated settings.py
#[derive(Debug, Clone)]
pub struct SettingsModifier {
    path: PathBuf,
}

impl SettingsModifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<root>/<project>/settings.py`
    pub fn for_project(root: &Path, project_name: &str) -> Self {
        Self::new(root.join(project_name).join("settings.py"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register DRF, auth_app and the custom app, and point AUTH_USER_MODEL at auth_app
    pub fn add_apps_and_auth(&self, custom_app: Option<&str>) -> Result<(), PorosError> {
        let mut doc = self.read()?;

        let mut apps = vec!["rest_framework", AUTH_APP_NAME];
        apps.extend(custom_app);
        doc.insert_list_entries("INSTALLED_APPS", &apps)
            .map_err(|e| self.patch_error(e))?;

        if doc.has_assignment("AUTH_USER_MODEL") {
            doc.replace_assignment("AUTH_USER_MODEL", AUTH_USER_MODEL_LINE)
                .map_err(|e| self.patch_error(e))?;
        } else {
            doc.append_lines(["", "# Custom user model", AUTH_USER_MODEL_LINE]);
        }

        self.write(&doc)
    }

    /// Switch settings to environment-driven values for the Docker stack
    pub fn add_docker_settings(&self, project_name: &str, docker_project_name: &str) -> Result<(), PorosError> {
        let mut doc = self.read()?;

        doc.ensure_import("import os");

        let secret_default = doc
            .assignment_value("SECRET_KEY")
            .map(str::to_string)
            .unwrap_or_else(|| "'change-me'".to_string());
        let replacements = [
            (
                "SECRET_KEY",
                format!("SECRET_KEY = os.environ.get('DJANGO_SECRET_KEY', {})", secret_default),
            ),
            (
                "DEBUG",
                "DEBUG = os.environ.get('DJANGO_DEBUG', 'True') == 'True'".to_string(),
            ),
            (
                "ALLOWED_HOSTS",
                "ALLOWED_HOSTS = os.environ.get('DJANGO_ALLOWED_HOSTS', 'localhost,127.0.0.1').split(',')"
                    .to_string(),
            ),
        ];
        for (name, line) in &replacements {
            let already_env = doc
                .assignment_value(name)
                .map_or(false, |value| value.starts_with("os.environ"));
            if !already_env {
                doc.replace_assignment(name, line).map_err(|e| self.patch_error(e))?;
            }
        }

        doc.insert_list_entries(
            "INSTALLED_APPS",
            &["django_extensions", "django_prometheus", "django_celery_beat", "debug_toolbar"],
        )
        .map_err(|e| self.patch_error(e))?;

        doc.prepend_list_entries("MIDDLEWARE", &["django_prometheus.middleware.PrometheusBeforeMiddleware"])
            .map_err(|e| self.patch_error(e))?;
        doc.insert_list_entries(
            "MIDDLEWARE",
            &[
                "debug_toolbar.middleware.DebugToolbarMiddleware",
                "django_prometheus.middleware.PrometheusAfterMiddleware",
            ],
        )
        .map_err(|e| self.patch_error(e))?;

        doc.replace_dict_block("DATABASES", &databases_block(docker_project_name))
            .map_err(|e| self.patch_error(e))?;

        if !doc.contains_line(DOCKER_MARKER) {
            doc.append_lines(docker_settings(project_name).lines().map(str::to_string));
        }

        self.write(&doc)
    }

    fn read(&self) -> Result<SettingsDocument, PorosError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            PorosError::settings_update(
                &self.path,
                format!("Cannot read settings file {}", self.path.display()),
                Some(e.into()),
            )
        })?;
        Ok(SettingsDocument::parse(&content))
    }

    fn write(&self, doc: &SettingsDocument) -> Result<(), PorosError> {
        fs::write(&self.path, doc.render()).map_err(|e| {
            PorosError::settings_update(
                &self.path,
                format!("Cannot write settings file {}", self.path.display()),
                Some(e.into()),
            )
        })
    }

    fn patch_error(&self, err: PatchError) -> PorosError {
        PorosError::settings_update(&self.path, err.to_string(), None)
    }
}

/// PostgreSQL when POSTGRES_HOST is set, SQLite otherwise
fn databases_block(db_name: &str) -> String {
    format!(
        "DATABASES = {{
    'default': {{
        'ENGINE': 'django.db.backends.postgresql',
        'NAME': os.environ.get('POSTGRES_DB', '{db}'),
        'USER': os.environ.get('POSTGRES_USER', '{db}'),
        'PASSWORD': os.environ.get('POSTGRES_PASSWORD', ''),
        'HOST': os.environ.get('POSTGRES_HOST', 'localhost'),
        'PORT': os.environ.get('POSTGRES_PORT', '5432'),
    }}
    if os.environ.get('POSTGRES_HOST')
    else {{
        'ENGINE': 'django.db.backends.sqlite3',
        'NAME': BASE_DIR / 'db.sqlite3',
    }}
}}",
        db = db_name
    )
}

fn docker_settings(project_name: &str) -> String {
    format!(
        "
{marker}
STATIC_ROOT = BASE_DIR / 'staticfiles'

INTERNAL_IPS = ['127.0.0.1']

REDIS_URL = os.environ.get('REDIS_URL', 'redis://localhost:6379/0')
CELERY_BROKER_URL = os.environ.get('CELERY_BROKER_URL', REDIS_URL)
CELERY_RESULT_BACKEND = os.environ.get('CELERY_RESULT_BACKEND', REDIS_URL)
CELERY_ACCEPT_CONTENT = ['json']
CELERY_TASK_SERIALIZER = 'json'
CELERY_RESULT_SERIALIZER = 'json'
CELERY_TIMEZONE = TIME_ZONE
CELERY_BEAT_SCHEDULER = 'django_celery_beat.schedulers:DatabaseScheduler'

EMAIL_HOST = os.environ.get('EMAIL_HOST', 'localhost')
EMAIL_PORT = int(os.environ.get('EMAIL_PORT', '1025'))
DEFAULT_FROM_EMAIL = os.environ.get('DEFAULT_FROM_EMAIL', 'noreply@localhost')

LOGGING = {{
    'version': 1,
    'disable_existing_loggers': False,
    'handlers': {{
        'console': {{'class': 'logging.StreamHandler'}},
    }},
    'root': {{'handlers': ['console'], 'level': 'INFO'}},
    'loggers': {{
        '{project}': {{
            'handlers': ['console'],
            'level': os.environ.get('DJANGO_LOG_LEVEL', 'INFO'),
            'propagate': False,
        }},
    }},
}}",
        marker = DOCKER_MARKER,
        project = project_name
    )
}
