//! Local implementations of the view's ports for running in a terminal.

pub mod fs_editor;
pub mod html_report;
pub mod logging_host;
pub mod stdio;

pub use fs_editor::FsEditor;
pub use html_report::HtmlPlanReport;
pub use logging_host::LoggingHost;
pub use stdio::{pump_messages, read_surface_input, SurfaceInput};
