use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use search_view::model::EditorHandle;
use search_view::ports::EditorPort;
use search_view::{ViewError, ViewResult};
use tracing::info;

/// Editor port backed by the local file system.
///
/// A terminal has no file picker, so the log chosen on the command line is
/// handed out every time one is requested. "Revealing" a line logs it and
/// remembers it.
pub struct FsEditor {
    log_file: Option<PathBuf>,
    next_id: AtomicU64,
    closed: Mutex<HashSet<u64>>,
    last_revealed: Mutex<Option<(PathBuf, usize)>>,
}

impl FsEditor {
    pub fn new(log_file: Option<PathBuf>) -> Self {
        Self {
            log_file,
            next_id: AtomicU64::new(1),
            closed: Mutex::new(HashSet::new()),
            last_revealed: Mutex::new(None),
        }
    }

    /// Marks the editor closed; the next scroll reopens the document.
    pub fn close(&self, editor: &EditorHandle) {
        self.closed.lock().insert(editor.id);
    }

    pub fn last_revealed(&self) -> Option<(PathBuf, usize)> {
        self.last_revealed.lock().clone()
    }
}

#[async_trait]
impl EditorPort for FsEditor {
    async fn pick_log_file(&self) -> ViewResult<Option<PathBuf>> {
        Ok(self.log_file.clone())
    }

    async fn open_beside(&self, path: &Path) -> ViewResult<EditorHandle> {
        if !tokio::fs::try_exists(path).await? {
            return Err(ViewError::Editor(format!(
                "log file {} does not exist",
                path.display()
            )));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(EditorHandle {
            id,
            path: path.to_path_buf(),
        })
    }

    fn is_document_closed(&self, editor: &EditorHandle) -> bool {
        self.closed.lock().contains(&editor.id)
    }

    async fn document_text(&self, editor: &EditorHandle) -> ViewResult<String> {
        tokio::fs::read_to_string(&editor.path)
            .await
            .map_err(|err| ViewError::Editor(format!("{}: {err}", editor.path.display())))
    }

    fn reveal_line(&self, editor: &EditorHandle, line: usize) {
        info!(path = %editor.path.display(), line, "revealing log line");
        *self.last_revealed.lock() = Some((editor.path.clone(), line));
    }
}
