pub mod inventory;

pub use inventory::handle_command;
