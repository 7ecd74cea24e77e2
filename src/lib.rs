pub mod config;
pub mod error;
pub mod exec;
pub mod nim;

pub use config::Settings;
pub use error::{ExecError, NimError};
pub use exec::{CommandRunner, ShellRunner};
pub use nim::collect_nim_inventory;
