pub mod output;
pub mod walker;

pub use output::{write_report, OutputFormat, TerminalReport};
pub use walker::{relative_source, FileWalker};
