//! Save Backend
//!
//! Executes the save sequence: read the file, locate and patch the element,
//! mark the self-edit hold, write the file back. Each call runs to
//! completion before its response frame is written; the hold expiry is the
//! only asynchronous piece.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::core::Document;
use crate::patch::{self, SaveRequest};
use crate::reload::EditHold;

/// Stateful handler behind the RPC surface
pub struct EditorBackend {
    config: Config,
    edit_hold: EditHold,
}

impl EditorBackend {
    pub fn new(config: Config, edit_hold: EditHold) -> Self {
        Self { config, edit_hold }
    }

    /// The hold shared with the file watcher
    pub fn edit_hold(&self) -> &EditHold {
        &self.edit_hold
    }

    /// Resolve a wire file name against the project root
    fn resolve(&self, file_name: &str) -> PathBuf {
        let path = Path::new(file_name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config.root.join(path)
        }
    }

    /// Handle one `save` call: parse, locate, mutate, write
    pub async fn save(&self, request: SaveRequest) -> Result<()> {
        let path = self.resolve(&request.source.file_name);
        let path = tokio::fs::canonicalize(&path)
            .await
            .with_context(|| format!("no such source file: {}", path.display()))?;

        let source = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let document = Document::new(source);

        let outcome = patch::apply_save(&document, &request)?;

        // Hold before writing so the watcher event for our own write is
        // already suppressed. Inserted attributes change the element's
        // structure, so in that case the reload must go through.
        if outcome.inserted_any {
            self.edit_hold.release(&path).await;
        } else {
            self.edit_hold.hold(path.clone()).await;
        }

        tokio::fs::write(&path, &outcome.text)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        log::info!(
            "patched {} prop(s) in {}:{}:{}",
            request.value.len(),
            path.display(),
            request.source.line_number,
            request.source.column_number,
        );
        Ok(())
    }
}
