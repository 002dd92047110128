//! `[output]` section configuration.
//!
//! ```toml
//! [output]
//! dir = "dist"            # Bundle directory (cleared before every build)
//! filename = "index.js"   # Name of the emitted bundle
//! clean = true            # Remove previous output before writing
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

/// Bundle destination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory, relative to the project root.
    pub dir: PathBuf,

    /// File name of the emitted bundle.
    pub filename: String,

    /// Clear the whole output directory before each build.
    pub clean: bool,
}

impl OutputConfig {
    pub const DIR: FieldPath = FieldPath::new("output.dir");
    pub const FILENAME: FieldPath = FieldPath::new("output.filename");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        super::validate_file_name(&self.filename, Self::FILENAME, diag);
        if self.dir.as_os_str().is_empty() {
            diag.error(Self::DIR, "must not be empty");
        }
    }

    /// File name of the external source map for the bundle.
    pub fn map_filename(&self) -> String {
        format!("{}.map", self.filename)
    }

    /// Absolute path of the bundle file.
    pub fn bundle_path(&self) -> PathBuf {
        self.dir.join(&self.filename)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "dist".into(),
            filename: "index.js".into(),
            clean: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};
    use std::path::PathBuf;

    #[test]
    fn test_output_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.output.dir, PathBuf::from("dist"));
        assert_eq!(config.output.filename, "index.js");
        assert!(config.output.clean);
        assert_eq!(config.output.map_filename(), "index.js.map");
    }

    #[test]
    fn test_output_override() {
        let config = test_parse_config("[output]\ndir = \"public\"\nfilename = \"app.js\"");
        assert_eq!(config.output.dir, PathBuf::from("public"));
        assert_eq!(config.output.filename, "app.js");
        assert!(config.output.clean);
    }

    #[test]
    fn test_filename_with_separator_rejected() {
        let config = test_parse_config("[output]\nfilename = \"js/app.js\"");
        let mut diag = ConfigDiagnostics::new();
        config.output.validate(&mut diag);
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.errors()[0].field.as_str(), "output.filename");
    }
}
