//! Files written around Django's own generators
//!
//! `ProjectScaffold` owns everything the tool writes itself: the
//! requirements file, `.gitignore`, the helpers package, the custom user
//! model and the optional Docker stack. All paths are relative to the
//! project root it was created with.

mod docker;
mod gitignore;
mod templates;

use std::path::PathBuf;

use anyhow::Result;

use crate::config::defaults::{AUTH_APP_NAME, DOCKER_REQUIREMENTS, FALLBACK_GITIGNORE};
use crate::config::ToolConfig;
use crate::utils::paths::write_file;
use crate::utils::terminal::{create_spinner, print_warning};

pub use gitignore::{fetch_gitignore, GitignoreSource};
pub use templates::{project_context, TemplateRenderer};

/// Writes the tool's own files into a project directory
pub struct ProjectScaffold {
    renderer: TemplateRenderer,
    config: ToolConfig,
    root: PathBuf,
}

impl ProjectScaffold {
    pub fn new(renderer: TemplateRenderer, config: ToolConfig, root: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            config,
            root: root.into(),
        }
    }

    /// Contents of requirements.txt
    pub fn requirements(&self, docker: bool) -> String {
        let versions = &self.config.versions;
        let mut lines = vec![
            format!("Django=={}", versions.django),
            format!("djangorestframework=={}", versions.djangorestframework),
        ];
        if docker {
            lines.extend(DOCKER_REQUIREMENTS.iter().map(|r| r.to_string()));
        }
        for extra in &self.config.requirements.extra {
            if !lines.contains(extra) {
                lines.push(extra.clone());
            }
        }

        let mut content = lines.join("\n");
        content.push('\n');
        content
    }

    /// Write requirements.txt
    pub fn create_requirements(&self, docker: bool) -> Result<PathBuf> {
        let path = self.root.join("requirements.txt");
        write_file(&path, &self.requirements(docker))?;
        Ok(path)
    }

    /// Write .gitignore, downloading it when possible
    ///
    /// Network problems only downgrade to the bundled fallback. An error is
    /// returned when the file itself cannot be written.
    pub fn create_gitignore(&self) -> Result<GitignoreSource> {
        let gitignore = &self.config.gitignore;
        let spinner = create_spinner("Fetching .gitignore...");
        let fetched = fetch_gitignore(&gitignore.url, gitignore.timeout());
        spinner.finish_and_clear();

        let (content, source) = match fetched {
            Ok(body) => (body, GitignoreSource::Downloaded),
            Err(e) => {
                print_warning(&format!("{:#}; using the bundled .gitignore", e));
                (FALLBACK_GITIGNORE.to_string(), GitignoreSource::Fallback)
            }
        };

        write_file(&self.root.join(".gitignore"), &content)?;
        Ok(source)
    }

    /// helpers/ package with the abstract timestamped model
    pub fn create_helpers_module(&self, project_name: &str) -> Result<()> {
        let context = project_context(project_name, project_name);
        let helpers = self.root.join("helpers");
        write_file(
            &helpers.join("__init__.py"),
            &self.renderer.render("helpers/__init__.py.tera", &context)?,
        )?;
        write_file(
            &helpers.join("models.py"),
            &self.renderer.render("helpers/models.py.tera", &context)?,
        )?;
        Ok(())
    }

    /// Custom user model and its admin registration
    pub fn create_auth_app_files(&self, project_name: &str) -> Result<()> {
        let context = project_context(project_name, project_name);
        let app = self.root.join(AUTH_APP_NAME);
        write_file(
            &app.join("models.py"),
            &self.renderer.render("auth_app/models.py.tera", &context)?,
        )?;
        write_file(
            &app.join("admin.py"),
            &self.renderer.render("auth_app/admin.py.tera", &context)?,
        )?;
        Ok(())
    }
}
