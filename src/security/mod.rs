//! Fixed safety policy shared by the sandboxes.

pub mod escape;
pub mod url_validation;

pub use escape::{quote, render_command_line};
pub use url_validation::{AddressPolicy, BLOCKED_RANGES, BlockedRange, blocked_range};
