//! Path utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `clean_path`, `relative_path`)

pub mod fs;

pub use fs::{clean_path, is_within, normalize_path, relative_path, to_slash};
