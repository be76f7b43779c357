//! Command-line workflow, kept apart from argument parsing in `main.rs`.

pub mod orchestration;

pub use orchestration::{render_output, run_release_workflow, OutputFormat, ReleaseWorkflowArgs, WorkflowResult};
