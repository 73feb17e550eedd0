//! Shared filesystem helpers.

pub mod files;
pub mod paths;

pub use files::{append_line_once, write_file_with_dirs};
pub use paths::{ensure_dir_exists, first_subdir, is_empty_dir};
