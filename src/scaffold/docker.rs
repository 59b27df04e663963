//! Docker, Celery and observability stack

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::templates::project_context;
use super::ProjectScaffold;
use crate::settings::patcher::SettingsDocument;
use crate::utils::paths::{append_once, ensure_dir, make_executable, write_file};
use crate::utils::terminal::print_warning;

const DOCKER_ROOT: &str = "infrastructure/docker";

/// How a planned file is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    /// Rendered with the project context
    Template(&'static str),
    /// Rendered, then marked executable
    Script(&'static str),
    /// Copied without rendering
    Static(&'static str),
}

/// Every file of the Docker setup, relative to the project root
const DOCKER_FILES: &[(&str, Source)] = &[
    ("infrastructure/docker/Dockerfile", Source::Template("docker/Dockerfile.tera")),
    ("docker-compose.yml", Source::Template("docker/docker-compose.yml.tera")),
    (".dockerignore", Source::Template("docker/dockerignore.tera")),
    (".env.example", Source::Template("docker/env.example.tera")),
    ("infrastructure/docker/scripts/dev.sh", Source::Script("docker/scripts/dev.sh.tera")),
    (
        "infrastructure/docker/scripts/celery_worker.sh",
        Source::Script("docker/scripts/celery_worker.sh.tera"),
    ),
    (
        "infrastructure/docker/scripts/celery_beat.sh",
        Source::Script("docker/scripts/celery_beat.sh.tera"),
    ),
    ("infrastructure/docker/scripts/flower.sh", Source::Script("docker/scripts/flower.sh.tera")),
    ("infrastructure/docker/nginx/nginx.conf", Source::Template("docker/nginx/nginx.conf.tera")),
    (
        "infrastructure/docker/prometheus/prometheus.yml",
        Source::Template("docker/prometheus/prometheus.yml.tera"),
    ),
    (
        "infrastructure/docker/prometheus/alert_rules.yml",
        Source::Template("docker/prometheus/alert_rules.yml.tera"),
    ),
    (
        "infrastructure/docker/alertmanager/alertmanager.yml",
        Source::Template("docker/alertmanager/alertmanager.yml.tera"),
    ),
    (
        "infrastructure/docker/grafana/provisioning/datasources/datasource.yml",
        Source::Template("docker/grafana/datasource.yml.tera"),
    ),
    (
        "infrastructure/docker/grafana/provisioning/dashboards/dashboard.yml",
        Source::Template("docker/grafana/dashboard.yml.tera"),
    ),
    (
        "infrastructure/docker/grafana/provisioning/dashboards/json/django-app.json",
        Source::Static("docker/grafana/dashboards/django-app.json"),
    ),
    (
        "infrastructure/docker/grafana/provisioning/dashboards/json/infrastructure.json",
        Source::Static("docker/grafana/dashboards/infrastructure.json"),
    ),
    (
        "infrastructure/docker/grafana/provisioning/dashboards/json/celery.json",
        Source::Static("docker/grafana/dashboards/celery.json"),
    ),
];

const DOCKER_DIRS: &[&str] = &[
    "scripts",
    "nginx",
    "prometheus",
    "alertmanager",
    "grafana/provisioning/datasources",
    "grafana/provisioning/dashboards/json",
];

const CELERY_IMPORT: &str = "from .celery import app as celery_app";

const URL_MARKER: &str = "django_prometheus.urls";

const MONITORING_URLS: &str = "
urlpatterns += [
    path(\"\", include(\"django_prometheus.urls\")),
    path(\"__debug__/\", include(\"debug_toolbar.urls\")),
]";

impl ProjectScaffold {
    /// Write the Docker stack and wire Celery into the project package
    ///
    /// `docker_project_name` defaults to `project_name`. Returns the files
    /// written, in plan order.
    pub fn create_docker_setup(
        &self,
        project_name: &str,
        docker_project_name: Option<&str>,
    ) -> Result<Vec<PathBuf>> {
        let docker_name = docker_project_name.unwrap_or(project_name);
        let context = project_context(project_name, docker_name);

        let docker_root = self.root.join(DOCKER_ROOT);
        for dir in DOCKER_DIRS {
            ensure_dir(&docker_root.join(dir))?;
        }

        let mut written = Vec::with_capacity(DOCKER_FILES.len());
        for (target, source) in DOCKER_FILES {
            let path = self.root.join(target);
            let content = match source {
                Source::Template(name) | Source::Script(name) => self.renderer.render(name, &context)?,
                Source::Static(name) => self.renderer.static_asset(name)?.to_string(),
            };
            write_file(&path, &content)?;
            if matches!(source, Source::Script(_)) {
                make_executable(&path)?;
            }
            written.push(path);
        }

        self.wire_celery(project_name, &context)?;
        self.add_monitoring_urls(project_name)?;

        Ok(written)
    }

    /// `<project>/celery.py` plus the import that loads it at startup
    fn wire_celery(&self, project_name: &str, context: &tera::Context) -> Result<()> {
        let package = self.root.join(project_name);
        let celery = self.renderer.render("project/celery.py.tera", context)?;
        write_file(&package.join("celery.py"), &celery)?;

        append_once(
            &package.join("__init__.py"),
            CELERY_IMPORT,
            &format!("{}\n\n__all__ = (\"celery_app\",)\n", CELERY_IMPORT),
        )?;
        Ok(())
    }

    /// Expose /metrics and the debug toolbar from the root URLconf
    fn add_monitoring_urls(&self, project_name: &str) -> Result<()> {
        let urls = self.root.join(project_name).join("urls.py");
        if !urls.is_file() {
            print_warning(&format!(
                "{} not found, add the django_prometheus and debug_toolbar routes by hand",
                display_relative(&urls, &self.root)
            ));
            return Ok(());
        }

        let content = std::fs::read_to_string(&urls)
            .with_context(|| format!("Failed to read {}", urls.display()))?;
        if content.contains(URL_MARKER) {
            return Ok(());
        }

        let mut doc = SettingsDocument::parse(&content);
        for name in ["include", "path"] {
            if !doc.imports_from("django.urls", name) {
                doc.ensure_import(&format!("from django.urls import {}", name));
            }
        }
        doc.append_lines(MONITORING_URLS.lines());

        write_file(&urls, &doc.render())?;
        Ok(())
    }
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
