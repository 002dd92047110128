//! Build mode resolution and the debug-info policy derived from it.
//!
//! The mode comes from the `--mode` argument. Only the exact string
//! `"production"` selects production; everything else, including an absent
//! or empty argument, resolves to development.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating mode for a single invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Development,
    Production,
}

impl BuildMode {
    /// Resolve the mode from an optional external argument.
    ///
    /// Strict equality with `"production"`, never truthiness: `Some("")`,
    /// `Some("Production")` and `None` all resolve to development.
    pub fn resolve(arg: Option<&str>) -> Self {
        match arg {
            Some("production") => Self::Production,
            Some("development") | None => Self::Development,
            Some(other) => {
                if !other.is_empty() {
                    crate::log!("warning"; "unknown mode `{}`, using development", other);
                }
                Self::Development
            }
        }
    }

    /// Canonical name, matching the accepted `--mode` values.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    #[inline]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How debug information for the bundle is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevtoolPolicy {
    /// Complete map in a separate `.map` file, with column mappings and
    /// embedded sources. Suitable for shipping.
    SourceMap,
    /// Inline, line-only map. Cheap to regenerate on every rebuild.
    EvalCheapModuleSourceMap,
}

impl DevtoolPolicy {
    pub const fn for_mode(mode: BuildMode) -> Self {
        match mode {
            BuildMode::Production => Self::SourceMap,
            BuildMode::Development => Self::EvalCheapModuleSourceMap,
        }
    }

    /// Whether the map is written next to the bundle instead of inlined.
    pub const fn is_external(self) -> bool {
        matches!(self, Self::SourceMap)
    }

    /// Whether segments carry column positions (otherwise column 0 per line).
    pub const fn maps_columns(self) -> bool {
        matches!(self, Self::SourceMap)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SourceMap => "source-map",
            Self::EvalCheapModuleSourceMap => "eval-cheap-module-source-map",
        }
    }
}
