use std::path::PathBuf;

use super::types::{Change, FileCategory};
use crate::actor::messages::BuildMsg;
use crate::plugin::BuildScope;

pub(super) fn log_changes(changes: &[Change]) {
    for change in changes {
        crate::debug!("watch"; "{}: {}", change.kind.label(), change.path.display());
    }
}

/// Convert classified changes to BuildMsg(s)
///
/// - config file → `ConfigChanged` (the running config stays as loaded)
/// - crate sources → full rebuild
/// - entry/template only → restage the previous package
pub(super) fn changes_to_messages(changes: Vec<Change>) -> Vec<BuildMsg> {
    let mut messages = Vec::new();
    let mut changed: Vec<PathBuf> = Vec::new();
    let mut scope = None;

    for change in changes {
        match change.category {
            FileCategory::Config => messages.push(BuildMsg::ConfigChanged(change.path)),
            FileCategory::Crate => {
                scope = Some(BuildScope::Full);
                changed.push(change.path);
            }
            FileCategory::Web => {
                scope.get_or_insert(BuildScope::Restage);
                changed.push(change.path);
            }
            FileCategory::Unrelated => {}
        }
    }

    if let Some(scope) = scope {
        messages.push(BuildMsg::Rebuild { scope, changed });
    }
    messages
}
