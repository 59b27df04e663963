//! End-to-end project setup
//!
//! `DjangoProjectBuilder` runs Django's generators, then layers the tool's
//! own files and settings edits on top. Steps that leave the project
//! unusable abort the run; installing packages, fetching `.gitignore` and
//! migrating only warn, since the user can redo them by hand.

use std::path::{Path, PathBuf};

use anyhow::Result;
use console::style;

use crate::config::defaults::AUTH_APP_NAME;
use crate::config::validation::validate_app_name;
use crate::config::ToolConfig;
use crate::error::{hints, PorosError};
use crate::exec::{CommandRunner, DjangoCommands};
use crate::scaffold::{GitignoreSource, ProjectScaffold, TemplateRenderer};
use crate::settings::SettingsModifier;
use crate::utils::terminal::{print_info, print_step, print_success, print_warning};

/// What to build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Django project package (holds settings.py)
    pub project_name: String,

    /// Extra app created next to auth_app
    pub custom_app: Option<String>,

    /// Compose project name; `Some` enables the Docker stack
    pub docker: Option<String>,

    pub skip_install: bool,
    pub skip_migrations: bool,
}

impl BuildOptions {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            custom_app: None,
            docker: None,
            skip_install: false,
            skip_migrations: false,
        }
    }

    /// Check every name before anything touches the disk
    pub fn validate(&self) -> Result<(), PorosError> {
        validate_app_name(&self.project_name)?;

        if let Some(app) = &self.custom_app {
            validate_app_name(app)?;
            if app == AUTH_APP_NAME || *app == self.project_name {
                return Err(PorosError::invalid_app_name(
                    app.as_str(),
                    format!("'{}' is already used by the generated project.", app),
                    hints::identifier(),
                ));
            }
        }

        if let Some(docker) = &self.docker {
            validate_app_name(docker)?;
        }
        Ok(())
    }
}

/// Outcome of a successful setup
#[derive(Debug, Default)]
pub struct SetupReport {
    /// Non-fatal problems, in the order they happened
    pub warnings: Vec<String>,

    /// `None` when .gitignore could not be written at all
    pub gitignore: Option<GitignoreSource>,

    /// Files written by the Docker setup
    pub docker_files: Vec<PathBuf>,
}

impl SetupReport {
    fn warn(&mut self, message: String) {
        print_warning(&message);
        self.warnings.push(message);
    }
}

/// Builds a Django project inside `root`
pub struct DjangoProjectBuilder<'a> {
    options: BuildOptions,
    root: PathBuf,
    scaffold: ProjectScaffold,
    settings: SettingsModifier,
    commands: DjangoCommands<'a>,
}

impl<'a> DjangoProjectBuilder<'a> {
    pub fn new(
        options: BuildOptions,
        config: ToolConfig,
        root: impl Into<PathBuf>,
        runner: &'a dyn CommandRunner,
        python: impl Into<String>,
    ) -> Result<Self, PorosError> {
        let root = root.into();
        let scaffold = ProjectScaffold::new(TemplateRenderer::new()?, config, &root);
        let settings = SettingsModifier::for_project(&root, &options.project_name);
        let commands = DjangoCommands::new(runner, python, &root);

        Ok(Self {
            options,
            root,
            scaffold,
            settings,
            commands,
        })
    }

    /// Run every step in order
    pub fn setup(&self) -> Result<SetupReport> {
        self.options.validate()?;

        let project = self.options.project_name.as_str();
        let custom_app = self.options.custom_app.as_deref();
        let mut report = SetupReport::default();

        print_step("Creating requirements.txt");
        self.scaffold.create_requirements(self.options.docker.is_some())?;

        if self.options.skip_install {
            print_info("Skipping dependency installation");
        } else {
            print_step("Installing dependencies from requirements.txt");
            match self.commands.install_dependencies() {
                Ok(()) => print_success("Dependencies installed"),
                Err(e) => report.warn(format!("{}. Continuing with setup...", e)),
            }
        }

        print_step(&format!("Creating Django project '{}'", project));
        self.commands.startproject(project)?;

        match custom_app {
            Some(app) => {
                print_step(&format!("Creating application '{}'", app));
                self.commands.startapp(app)?;
            }
            None => print_info("Skipping custom app creation as none was specified"),
        }

        print_step(&format!("Creating {}", AUTH_APP_NAME));
        self.commands.startapp(AUTH_APP_NAME)?;

        print_step("Setting up helpers and the custom User model");
        self.scaffold.create_helpers_module(project)?;
        self.scaffold.create_auth_app_files(project)?;

        print_step(&format!("Updating {}", self.relative(self.settings.path())));
        self.settings.add_apps_and_auth(custom_app)?;

        if let Some(docker_name) = &self.options.docker {
            print_step(&format!("Setting up Docker for '{}'", docker_name));
            report.docker_files = self.scaffold.create_docker_setup(project, Some(docker_name.as_str()))?;
            self.settings.add_docker_settings(project, docker_name)?;
        }

        print_step("Fetching .gitignore for Django");
        match self.scaffold.create_gitignore() {
            Ok(source) => report.gitignore = Some(source),
            Err(e) => report.warn(format!("Failed to create .gitignore: {:#}", e)),
        }

        if self.options.skip_migrations {
            print_info("Skipping migrations");
        } else {
            print_step("Running migrations");
            if let Err(e) = self.commands.run_migrations() {
                report.warn(e.to_string());
                if let Some(hint) = e.hint() {
                    eprintln!("{}", hint);
                }
            }
        }

        self.print_next_steps();
        Ok(report)
    }

    fn print_next_steps(&self) {
        println!("\n{}", style("Setup complete!").green().bold());
        println!("\nNext steps:");
        if self.options.docker.is_some() {
            println!("  cp .env.example .env");
            println!("  docker compose up --build");
        } else {
            if self.options.skip_install {
                println!("  python -m pip install -r requirements.txt");
            }
            println!("  python manage.py runserver");
        }
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root).unwrap_or(path).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::porosdjango_toml::GitignoreConfig;
    use crate::exec::CommandResult;
    use crate::fixtures;
    use std::cell::RefCell;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Imitates django-admin and manage.py by writing the files they would
    struct FakeDjango {
        calls: RefCell<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl FakeDjango {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_on: None,
            }
        }

        fn failing(step: &'static str) -> Self {
            Self {
                fail_on: Some(step),
                ..Self::new()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for FakeDjango {
        fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandResult> {
            let line = format!("{} {}", program, args.join(" "));
            self.calls.borrow_mut().push(line);

            let failed = self.fail_on.map_or(false, |step| args.iter().any(|a| a == step));
            if !failed {
                match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
                    ["startproject", name, "."] => {
                        let package = cwd.join(name);
                        std::fs::create_dir_all(&package)?;
                        std::fs::write(package.join("__init__.py"), "")?;
                        std::fs::write(package.join("settings.py"), fixtures::SETTINGS)?;
                        std::fs::write(package.join("urls.py"), fixtures::URLS)?;
                        std::fs::write(cwd.join("manage.py"), "#!/usr/bin/env python\n")?;
                    }
                    ["manage.py", "startapp", name] => {
                        let app = cwd.join(name);
                        std::fs::create_dir_all(&app)?;
                        std::fs::write(app.join("models.py"), "from django.db import models\n")?;
                        std::fs::write(app.join("admin.py"), "from django.contrib import admin\n")?;
                    }
                    _ => {}
                }
            }

            Ok(CommandResult {
                success: !failed,
                exit_code: if failed { 1 } else { 0 },
                stdout: String::new(),
                stderr: String::new(),
                duration: Duration::ZERO,
            })
        }
    }

    fn offline_config() -> ToolConfig {
        ToolConfig {
            gitignore: GitignoreConfig {
                url: "http://127.0.0.1:9/django".to_string(),
                timeout_secs: 2,
            },
            ..ToolConfig::default()
        }
    }

    fn options(custom_app: Option<&str>) -> BuildOptions {
        BuildOptions {
            custom_app: custom_app.map(str::to_string),
            ..BuildOptions::new("config")
        }
    }

    fn read(temp: &TempDir, rel: &str) -> String {
        std::fs::read_to_string(temp.path().join(rel)).unwrap()
    }

    #[test]
    fn test_full_setup_runs_steps_in_order() {
        let temp = TempDir::new().unwrap();
        let fake = FakeDjango::new();
        let builder =
            DjangoProjectBuilder::new(options(Some("blog")), offline_config(), temp.path(), &fake, "python3")
                .unwrap();

        let report = builder.setup().unwrap();

        assert_eq!(
            fake.calls(),
            vec![
                "python3 -m pip install -r requirements.txt",
                "django-admin startproject config .",
                "python3 manage.py startapp blog",
                "python3 manage.py startapp auth_app",
                "python3 manage.py makemigrations",
                "python3 manage.py migrate",
            ]
        );
        assert!(report.warnings.is_empty());
        assert_eq!(report.gitignore, Some(GitignoreSource::Fallback));

        let settings = read(&temp, "config/settings.py");
        assert!(settings.contains("    'rest_framework',\n    'auth_app',\n    'blog',\n]"));
        assert!(settings.contains("AUTH_USER_MODEL = 'auth_app.User'"));
        assert!(read(&temp, "auth_app/models.py").contains("class User(AbstractUser)"));
        assert!(temp.path().join("helpers/models.py").is_file());
        assert!(temp.path().join(".gitignore").is_file());
        assert_eq!(read(&temp, "requirements.txt"), "Django==6.0\ndjangorestframework==3.16.1\n");
    }

    #[test]
    fn test_setup_without_custom_app() {
        let temp = TempDir::new().unwrap();
        let fake = FakeDjango::new();
        let builder =
            DjangoProjectBuilder::new(options(None), offline_config(), temp.path(), &fake, "python3").unwrap();

        builder.setup().unwrap();

        let startapps: Vec<_> = fake.calls().into_iter().filter(|c| c.contains("startapp")).collect();
        assert_eq!(startapps, vec!["python3 manage.py startapp auth_app"]);
        assert!(!read(&temp, "config/settings.py").contains("'blog'"));
    }

    #[test]
    fn test_install_failure_is_a_warning() {
        let temp = TempDir::new().unwrap();
        let fake = FakeDjango::failing("pip");
        let builder =
            DjangoProjectBuilder::new(options(None), offline_config(), temp.path(), &fake, "python3").unwrap();

        let report = builder.setup().unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Failed to install dependencies"));
        assert!(temp.path().join("config/settings.py").is_file());
    }

    #[test]
    fn test_startproject_failure_aborts() {
        let temp = TempDir::new().unwrap();
        let fake = FakeDjango::failing("startproject");
        let builder =
            DjangoProjectBuilder::new(options(Some("blog")), offline_config(), temp.path(), &fake, "python3")
                .unwrap();

        let err = builder.setup().unwrap_err();

        assert!(err.to_string().contains("Failed to create Django project"));
        assert!(!fake.calls().iter().any(|c| c.contains("startapp")));
        assert!(!temp.path().join(".gitignore").exists());
    }

    #[test]
    fn test_custom_app_failure_aborts() {
        let temp = TempDir::new().unwrap();
        let fake = FakeDjango::failing("blog");
        let builder =
            DjangoProjectBuilder::new(options(Some("blog")), offline_config(), temp.path(), &fake, "python3")
                .unwrap();

        let err = builder.setup().unwrap_err();

        assert!(err.to_string().contains("Failed to create app 'blog'"));
        assert!(!fake.calls().iter().any(|c| c.contains("auth_app")));
    }

    #[test]
    fn test_migration_failure_is_a_warning() {
        let temp = TempDir::new().unwrap();
        let fake = FakeDjango::failing("migrate");
        let builder =
            DjangoProjectBuilder::new(options(None), offline_config(), temp.path(), &fake, "python3").unwrap();

        let report = builder.setup().unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Failed to run migrations"));
    }

    #[test]
    fn test_skip_flags() {
        let temp = TempDir::new().unwrap();
        let fake = FakeDjango::new();
        let opts = BuildOptions {
            skip_install: true,
            skip_migrations: true,
            ..options(None)
        };
        let builder = DjangoProjectBuilder::new(opts, offline_config(), temp.path(), &fake, "python3").unwrap();

        builder.setup().unwrap();

        assert_eq!(
            fake.calls(),
            vec![
                "django-admin startproject config .",
                "python3 manage.py startapp auth_app",
            ]
        );
    }

    #[test]
    fn test_docker_setup() {
        let temp = TempDir::new().unwrap();
        let fake = FakeDjango::new();
        let opts = BuildOptions {
            docker: Some("shop".to_string()),
            skip_install: true,
            ..options(Some("blog"))
        };
        let builder = DjangoProjectBuilder::new(opts, offline_config(), temp.path(), &fake, "python3").unwrap();

        let report = builder.setup().unwrap();

        assert_eq!(report.docker_files.len(), 17);
        assert!(read(&temp, "requirements.txt").contains("celery=="));
        assert!(read(&temp, "docker-compose.yml").contains("name: shop"));
        assert!(read(&temp, "config/__init__.py").contains("from .celery import app as celery_app"));
        assert!(read(&temp, "config/urls.py").contains("django_prometheus.urls"));

        let settings = read(&temp, "config/settings.py");
        assert!(settings.contains("'django_prometheus',"));
        assert!(settings.contains("# Docker integration"));
        assert!(settings.contains("os.environ.get('POSTGRES_DB', 'shop')"));
        assert!(settings.contains(&format!(
            "SECRET_KEY = os.environ.get('DJANGO_SECRET_KEY', '{}')",
            fixtures::SECRET_KEY
        )));
        assert_eq!(settings.matches("DATABASES = {").count(), 1);

        let urls = read(&temp, "config/urls.py");
        assert!(fixtures::url_imports(&urls).contains(&"include".to_string()));
    }

    #[test]
    fn test_invalid_name_runs_nothing() {
        let temp = TempDir::new().unwrap();
        let fake = FakeDjango::new();
        let builder =
            DjangoProjectBuilder::new(options(Some("my-app")), offline_config(), temp.path(), &fake, "python3")
                .unwrap();

        let err = builder.setup().unwrap_err();

        assert!(err.to_string().contains("is not a valid Python identifier"));
        assert!(fake.calls().is_empty());
        assert!(!temp.path().join("requirements.txt").exists());
    }

    #[test]
    fn test_validate_rejects_clashing_app() {
        let opts = options(Some("auth_app"));
        assert!(opts.validate().unwrap_err().to_string().contains("already used"));

        let opts = options(Some("config"));
        assert!(opts.validate().is_err());

        let opts = BuildOptions {
            docker: Some("class".to_string()),
            ..options(None)
        };
        assert!(opts.validate().unwrap_err().to_string().contains("reserved"));
    }
}
