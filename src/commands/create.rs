//! Create command implementation

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::builder::{BuildOptions, DjangoProjectBuilder};
use crate::config::defaults::DEFAULT_PROJECT_NAME;
use crate::config::validation::validate_app_name;
use crate::config::ToolConfig;
use crate::exec::python::find_python;
use crate::exec::SystemRunner;
use crate::prompt::Prompter;
use crate::utils::paths::ensure_dir;
use crate::utils::terminal::print_info;

/// Create a new Django project with custom preferences
#[derive(Args, Debug, Default)]
pub struct CreateCommand {
    /// Name of the project package holding settings.py
    #[arg(long)]
    pub project_name: Option<String>,

    /// Create a custom app with this name
    #[arg(long, conflicts_with = "no_app")]
    pub app_name: Option<String>,

    /// Do not create a custom app
    #[arg(long)]
    pub no_app: bool,

    /// Add Docker, Celery and monitoring setup
    #[arg(long)]
    pub docker: bool,

    /// Compose project name (implies --docker, defaults to the project name)
    #[arg(long)]
    pub docker_project_name: Option<String>,

    /// Do not run pip install
    #[arg(long)]
    pub skip_install: bool,

    /// Do not run makemigrations and migrate
    #[arg(long)]
    pub skip_migrations: bool,

    /// Use default values (no prompts)
    #[arg(short = 'y', long)]
    pub defaults: bool,

    /// Path to a porosdjango.toml
    #[arg(long, env = "POROSDJANGO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory to create the project in (default: current directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

impl CreateCommand {
    /// Execute the create command
    pub fn execute(self, verbose: bool) -> Result<()> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        let config = ToolConfig::load(self.config.as_deref(), &cwd)?;

        let options = self.resolve_options(&mut Prompter::stdio())?;
        options.validate()?;

        let root = match &self.dir {
            Some(dir) => {
                ensure_dir(dir)?;
                dir.clone()
            }
            None => cwd,
        };
        if verbose {
            print_info(&format!("Creating project in {}", root.display()));
        }

        let python = find_python()?;
        let runner = SystemRunner::new(verbose);
        let builder = DjangoProjectBuilder::new(options, config, root, &runner, python)?;
        builder.setup()?;
        Ok(())
    }

    /// Fill in everything not given on the command line
    ///
    /// Each name is validated as soon as it is known.
    pub fn resolve_options<R: BufRead, W: Write>(&self, prompter: &mut Prompter<R, W>) -> Result<BuildOptions> {
        let interactive = !self.defaults;

        let project_name = match &self.project_name {
            Some(name) => name.clone(),
            None if interactive => prompter.text(
                "What would you like to name your Django project app?",
                DEFAULT_PROJECT_NAME,
            )?,
            None => DEFAULT_PROJECT_NAME.to_string(),
        };
        validate_app_name(&project_name)?;

        let custom_app = if self.no_app {
            None
        } else if let Some(app) = &self.app_name {
            Some(app.clone())
        } else if interactive && prompter.confirm("Would you like to create a custom app?", true)? {
            Some(prompter.required("What would you like to name your application?")?)
        } else {
            None
        };
        if let Some(app) = &custom_app {
            validate_app_name(app)?;
        }

        let wants_docker = self.docker
            || self.docker_project_name.is_some()
            || (interactive && prompter.confirm("Would you like to set up Docker integration?", false)?);
        let docker = if wants_docker {
            let name = match &self.docker_project_name {
                Some(name) => name.clone(),
                None if interactive => {
                    prompter.text("What would you like to name the Docker project?", &project_name)?
                }
                None => project_name.clone(),
            };
            validate_app_name(&name)?;
            Some(name)
        } else {
            None
        };

        Ok(BuildOptions {
            project_name,
            custom_app,
            docker,
            skip_install: self.skip_install,
            skip_migrations: self.skip_migrations,
        })
    }
}
