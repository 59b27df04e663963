//! External process execution: Python discovery, Django generators and pip

pub mod django;
pub mod python;
pub mod subprocess;

pub use django::DjangoCommands;
pub use subprocess::{CommandResult, CommandRunner, SystemRunner};
