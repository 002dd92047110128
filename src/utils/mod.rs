//! Shared utilities.

pub mod exec;
pub mod html;
pub mod mime;
pub mod path;

/// Format count with singular/plural noun.
pub fn plural_count(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
