pub mod output;
pub mod process;
pub mod writers;

pub use output::{create_writer, ChurnWriter, OutputFormat};
pub use process::{run_command, run_command_line};
