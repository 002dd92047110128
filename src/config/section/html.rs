//! `[html]` section configuration.
//!
//! ```toml
//! [html]
//! template = "index.html"   # Template populated with the bundle reference
//! filename = "index.html"   # Generated document name inside output.dir
//! inject = "head"           # Where the script tag goes: "head" or "body"
//! title = "My App"          # Optional: replaces the template's <title>
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

/// Where the bundle's `<script>` tag is inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjectPosition {
    /// Before `</head>`. Module scripts are deferred, so this is safe.
    #[default]
    Head,
    /// Before `</body>`.
    Body,
}

/// HTML document generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    pub template: PathBuf,
    pub filename: String,
    pub inject: InjectPosition,
    pub title: Option<String>,
}

impl HtmlConfig {
    pub const TEMPLATE: FieldPath = FieldPath::new("html.template");
    pub const FILENAME: FieldPath = FieldPath::new("html.filename");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        super::validate_file_name(&self.filename, Self::FILENAME, diag);
        if !self.template.is_file() {
            diag.error_with_hint(
                Self::TEMPLATE,
                format!("template `{}` not found", self.template.display()),
                "create the template or point `html.template` at an existing file",
            );
        }
    }
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            template: "index.html".into(),
            filename: "index.html".into(),
            inject: InjectPosition::Head,
            title: None,
        }
    }
}
