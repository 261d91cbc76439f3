use std::fs;

use search_debugger_cli::adapters::{FsEditor, LoggingHost};
use search_debugger_core_types::{DebuggerStatus, SearchState};
use search_view::ports::{DebuggerHost, EditorPort};
use search_view::{HostCommand, LogPattern, ScrollOutcome, StateLogCorrelator, ToggleOutcome};
use tempfile::tempdir;

#[tokio::test]
async fn fs_editor_binds_scrolls_and_reopens_closed_logs() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("planner.log");
    fs::write(&log, "; 1 root\n; 5 child\n").unwrap();

    let editor = FsEditor::new(Some(log.clone()));
    let pattern = LogPattern::compile(r"^; (\d+)").unwrap();
    let mut correlator = StateLogCorrelator::new();

    assert_eq!(
        correlator.toggle(&editor).await.unwrap(),
        ToggleOutcome::Bound(log.clone())
    );
    let state = SearchState::new(4, "5");
    assert_eq!(
        correlator.scroll_to(&state, &pattern, &editor).await.unwrap(),
        ScrollOutcome::Scanned(1)
    );
    assert_eq!(editor.last_revealed(), Some((log.clone(), 1)));

    let handle = editor.open_beside(&log).await.unwrap();
    assert!(!editor.is_document_closed(&handle));
    editor.close(&handle);
    assert!(editor.is_document_closed(&handle));

    fs::write(&log, "; 5 rewritten\n").unwrap();
    correlator.reset_cache();
    assert_eq!(
        correlator.scroll_to(&state, &pattern, &editor).await.unwrap(),
        ScrollOutcome::Scanned(0)
    );
}

#[tokio::test]
async fn fs_editor_without_log_leaves_binding_unchanged() {
    let editor = FsEditor::new(None);
    let mut correlator = StateLogCorrelator::new();
    assert_eq!(
        correlator.toggle(&editor).await.unwrap(),
        ToggleOutcome::Unchanged
    );
    assert!(!correlator.is_bound());

    let dir = tempdir().unwrap();
    assert!(editor.open_beside(&dir.path().join("gone.log")).await.is_err());
}

#[tokio::test]
async fn logging_host_tracks_status_and_errors() {
    let host = LoggingHost::new(8899);
    assert_eq!(host.status(), DebuggerStatus::off());

    let started = host.execute(HostCommand::Start).await.unwrap();
    assert_eq!(started, DebuggerStatus::new(true, 8899));
    assert_eq!(host.status(), started);
    assert_eq!(host.execute(HostCommand::Reset).await.unwrap(), started);
    assert_eq!(
        host.execute(HostCommand::Stop).await.unwrap(),
        DebuggerStatus::off()
    );
    assert_eq!(host.status(), DebuggerStatus::off());

    host.show_error("Error while displaying state-plan: boom").await;
    assert_eq!(
        host.errors(),
        vec!["Error while displaying state-plan: boom".to_string()]
    );
}
