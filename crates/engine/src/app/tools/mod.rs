mod console;
mod console_commands;

pub use console::ConsoleState;
pub use console_commands::{ConsoleCommandProcessor, ConsoleCommandRegistry, HostCommand};
