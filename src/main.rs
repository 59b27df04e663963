//! porosdjango - opinionated Django project setup
//!
//! Runs `django-admin` and `manage.py` to generate a project, then writes
//! the tool's own files and patches `settings.py` in place.
//!
//! ## Architecture
//!
//! ```text
//! cli → commands::create → builder → exec (django-admin, manage.py, pip)
//!                                  → scaffold (templates, .gitignore, Docker)
//!                                  → settings (line-based settings.py patcher)
//! ```

mod builder;
mod cli;
mod commands;
mod config;
mod error;
mod exec;
#[cfg(test)]
mod fixtures;
mod prompt;
mod scaffold;
mod settings;
mod utils;

use clap::Parser;

use cli::Cli;
use error::PorosError;
use utils::terminal::print_error;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = cli.execute() {
        match err.downcast_ref::<PorosError>() {
            Some(poros) => poros.display_with_hints(),
            None => print_error(&format!("{:#}", err)),
        }
        std::process::exit(1);
    }
}
