//! Maps a state's planner id (`origId`) to the first log line that mentions it.
//!
//! Lookups are memoised per `origId`. A cached entry is only dropped by
//! [`StateLogCorrelator::reset_cache`] or [`StateLogCorrelator::clear`];
//! misses are never cached so a log that keeps growing can still match later.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use search_debugger_core_types::SearchState;
use tracing::{debug, info};

use crate::errors::ViewResult;
use crate::model::EditorHandle;
use crate::policy::LogPattern;
use crate::ports::EditorPort;

#[derive(Clone, Debug)]
struct LogBinding {
    path: PathBuf,
    editor: EditorHandle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    Unbound,
    Bound(PathBuf),
    /// The picker was dismissed; nothing changed.
    Unchanged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollOutcome {
    NoLog,
    UnknownState,
    Cached(usize),
    Scanned(usize),
    NotFound,
}

#[derive(Debug, Default)]
pub struct StateLogCorrelator {
    binding: Option<LogBinding>,
    cache: HashMap<String, usize>,
}

impl StateLogCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bound_path(&self) -> Option<&Path> {
        self.binding.as_ref().map(|b| b.path.as_path())
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn cached_line(&self, orig_id: &str) -> Option<usize> {
        self.cache.get(orig_id).copied()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub async fn toggle(&mut self, editor: &dyn EditorPort) -> ViewResult<ToggleOutcome> {
        if let Some(previous) = self.binding.take() {
            info!(path = %previous.path.display(), "state log unbound");
            return Ok(ToggleOutcome::Unbound);
        }
        let Some(path) = editor.pick_log_file().await? else {
            debug!("state log selection dismissed");
            return Ok(ToggleOutcome::Unchanged);
        };
        let handle = editor.open_beside(&path).await?;
        info!(path = %path.display(), "state log bound");
        self.binding = Some(LogBinding {
            path: path.clone(),
            editor: handle,
        });
        Ok(ToggleOutcome::Bound(path))
    }

    pub async fn scroll_to(
        &mut self,
        state: &SearchState,
        pattern: &LogPattern,
        editor: &dyn EditorPort,
    ) -> ViewResult<ScrollOutcome> {
        let Some(binding) = self.binding.as_mut() else {
            return Ok(ScrollOutcome::NoLog);
        };

        if editor.is_document_closed(&binding.editor) {
            debug!(path = %binding.path.display(), "state log document closed, reopening");
            binding.editor = editor.open_beside(&binding.path).await?;
        }

        if let Some(line) = self.cache.get(&state.orig_id).copied() {
            editor.reveal_line(&binding.editor, line);
            return Ok(ScrollOutcome::Cached(line));
        }

        let text = editor.document_text(&binding.editor).await?;
        match find_first_match(&text, pattern, &state.orig_id) {
            Some(line) => {
                editor.reveal_line(&binding.editor, line);
                self.cache.insert(state.orig_id.clone(), line);
                debug!(orig_id = %state.orig_id, line, "state log line correlated");
                Ok(ScrollOutcome::Scanned(line))
            }
            None => {
                debug!(orig_id = %state.orig_id, "no state log line matches");
                Ok(ScrollOutcome::NotFound)
            }
        }
    }

    pub fn reset_cache(&mut self) {
        self.cache.clear();
    }

    /// Session reset: forgets the cache and the bound log together.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.binding = None;
    }
}

/// Zero-based index of the first line whose capture equals `orig_id`.
pub fn find_first_match(text: &str, pattern: &LogPattern, orig_id: &str) -> Option<usize> {
    text.lines()
        .position(|line| pattern.capture(line) == Some(orig_id))
}
