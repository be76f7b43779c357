//! User interface module.
//!
//! Everything here is output only; a release run never prompts.
//! - `formatter` - rendering and coloured display functions

pub mod formatter;

pub use formatter::{
    display_available_branches, display_boundary_warning, display_error, display_rejections,
    display_result, display_status, display_success, render_markdown, render_rejections,
};
