use std::path::{Path, PathBuf};

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }

    /// Combine a pending change with a newer one for the same path.
    ///
    /// `None` means the two cancel out (created then removed in one window).
    pub(super) fn then(self, next: Self) -> Option<Self> {
        match (self, next) {
            // deleted then restored (atomic save)
            (Self::Removed, Self::Created | Self::Modified) => Some(next),
            (Self::Modified, Self::Removed) => Some(Self::Removed),
            (Self::Created, Self::Removed) => None,
            // first event wins
            (current, _) => Some(current),
        }
    }
}

/// What a changed path means for the build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FileCategory {
    /// `wasm.crate_dir/src/**` or the crate manifest
    Crate,
    /// Entry module or HTML template
    Web,
    /// The loaded config file
    Config,
    /// Anything else in a watched directory
    Unrelated,
}

/// Editor temp/backup files
pub(super) fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
        || name.starts_with('#')
}

/// A debounced, classified change
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Change {
    pub(super) path: PathBuf,
    pub(super) kind: ChangeKind,
    pub(super) category: FileCategory,
}
