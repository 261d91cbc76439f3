use std::fs;
use std::path::PathBuf;

use search_debugger_cli::adapters::{pump_messages, read_surface_input};
use search_debugger_cli::cli::correlate::{correlate_log, CorrelateArgs};
use search_debugger_cli::cli::replay::{parse_events, replay_session, ReplaySession};
use search_debugger_cli::AppConfig;
use search_view::adapters::ChannelSurface;
use search_view::ports::PresentationSurface;
use search_view::OutboundMessage;
use serde_json::{json, Value};
use tempfile::tempdir;
use tokio::sync::mpsc;

const EVENTS: &str = r#"
{"event":"stateAdded","state":{"id":0,"origId":"1","g":0}}
{"event":"stateAdded","state":{"id":1,"origId":"2","g":1,"actionName":"(drive a b)"}}

{"event":"planFound","states":[{"id":0,"origId":"1"},{"id":1,"origId":"2"}]}
"#;

fn drain(outbound: &mut mpsc::UnboundedReceiver<OutboundMessage>) -> Vec<OutboundMessage> {
    let mut messages = Vec::new();
    while let Ok(message) = outbound.try_recv() {
        messages.push(message);
    }
    messages
}

#[tokio::test]
async fn replay_relays_events_and_answers_selection() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("planner.log");
    fs::write(&log, "; 1 root\n; 2 expanded\n; 2 again\n").unwrap();

    let (surface, mut outbound) = ChannelSurface::new(true);
    let (inbound_tx, inbound_rx) = mpsc::channel(8);
    let (_visibility_tx, visibility_rx) = mpsc::channel(8);
    inbound_tx.send(json!({"command": "onload"})).await.unwrap();
    inbound_tx
        .send(json!({"command": "stateSelected", "stateId": 1, "stateInfo": "(at a)"}))
        .await
        .unwrap();
    drop(inbound_tx);

    let session = ReplaySession {
        log: Some(log.clone()),
        ..ReplaySession::default()
    };
    replay_session(
        &AppConfig::default(),
        session,
        parse_events(EVENTS).unwrap(),
        surface,
        inbound_rx,
        visibility_rx,
    )
    .await
    .unwrap();

    let messages = drain(&mut outbound);
    let kinds: Vec<_> = messages.iter().map(OutboundMessage::kind).collect();
    assert_eq!(
        kinds,
        vec![
            "stateLog",
            "stateAdded",
            "stateAdded",
            "showPlan",
            "debuggerState",
            "showStatePlan"
        ]
    );
    assert_eq!(
        messages[0],
        OutboundMessage::StateLog {
            state: Some(log.display().to_string())
        }
    );
    match &messages[5] {
        OutboundMessage::ShowStatePlan { state } => {
            assert!(state.contains("(drive a b)"));
        }
        other => panic!("unexpected message {other:?}"),
    }
}

#[tokio::test]
async fn hidden_replay_resends_everything_once_visible() {
    let (surface, mut outbound) = ChannelSurface::new(false);
    let (inbound_tx, inbound_rx) = mpsc::channel::<Value>(8);
    let (visibility_tx, visibility_rx) = mpsc::channel(8);
    let display = surface.clone();

    let driver = async move {
        let mut seen = Vec::new();
        while let Some(message) = outbound.recv().await {
            let replayed = matches!(message, OutboundMessage::ShowPlan { .. });
            let done = matches!(message, OutboundMessage::ShowAllStates { .. });
            seen.push(message);
            if replayed {
                display.set_visible(true);
                visibility_tx.send(true).await.unwrap();
            }
            if done {
                break;
            }
        }
        drop(inbound_tx);
        seen
    };

    let config = AppConfig::default();
    let (result, seen) = tokio::join!(
        replay_session(
            &config,
            ReplaySession::default(),
            parse_events(EVENTS).unwrap(),
            surface,
            inbound_rx,
            visibility_rx,
        ),
        driver
    );
    result.unwrap();

    let kinds: Vec<_> = seen.iter().map(OutboundMessage::kind).collect();
    assert_eq!(
        kinds,
        vec![
            "stateAdded",
            "stateAdded",
            "showPlan",
            "debuggerState",
            "showAllStates"
        ]
    );
    match seen.last() {
        Some(OutboundMessage::ShowAllStates { state }) => assert_eq!(state.len(), 2),
        other => panic!("unexpected message {other:?}"),
    }
}

#[test]
fn malformed_event_lines_are_reported_with_their_number() {
    let err = parse_events("{\"event\":\"stateAdded\",\"state\":{\"id\":0,\"origId\":\"1\"}}\n{\"event\":\"bogus\"}\n")
        .unwrap_err();
    assert!(format!("{err:#}").contains("line 2"));
}

#[tokio::test]
async fn surface_input_splits_visibility_from_commands() {
    let input: &[u8] =
        b"{\"command\":\"onload\"}\n\n{\"visible\":false}\nnot json\n{\"command\":\"reset\",\"visible\":true}\n";
    let (surface, _outbound) = ChannelSurface::new(true);
    let (inbound_tx, mut inbound_rx) = mpsc::channel(8);
    let (visibility_tx, mut visibility_rx) = mpsc::channel(8);

    let forwarded = read_surface_input(input, surface.clone(), inbound_tx, visibility_tx)
        .await
        .unwrap();

    assert_eq!(forwarded, 3);
    assert!(!surface.is_visible());
    assert_eq!(visibility_rx.recv().await, Some(false));
    assert_eq!(inbound_rx.recv().await, Some(json!({"command": "onload"})));
    assert_eq!(
        inbound_rx.recv().await,
        Some(json!({"command": "reset", "visible": true}))
    );
    assert_eq!(inbound_rx.recv().await, None);
}

#[tokio::test]
async fn outbound_messages_become_json_lines() {
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(OutboundMessage::clear()).unwrap();
    tx.send(OutboundMessage::StateLog { state: None }).unwrap();
    drop(tx);

    let mut buffer = Vec::new();
    let written = pump_messages(rx, &mut buffer).await.unwrap();
    assert_eq!(written, 2);

    let lines: Vec<Value> = String::from_utf8(buffer)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines[0], json!({"command": "clear", "state": "n/a"}));
    assert_eq!(lines[1], json!({"command": "stateLog", "state": null}));
}

#[tokio::test]
async fn correlate_reports_first_matching_line() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("planner.log");
    fs::write(&log, "header\n; 7 a\n; 42 first\n; 42 second\n").unwrap();

    let args = CorrelateArgs {
        log: log.clone(),
        orig_id: "42".into(),
        pattern: None,
    };
    assert_eq!(correlate_log(&args, &AppConfig::default()).await.unwrap(), 2);

    let custom = CorrelateArgs {
        pattern: Some(r"(\d+) first".into()),
        ..args.clone()
    };
    assert_eq!(correlate_log(&custom, &AppConfig::default()).await.unwrap(), 2);

    let missing = CorrelateArgs {
        orig_id: "99".into(),
        ..args
    };
    assert!(correlate_log(&missing, &AppConfig::default()).await.is_err());

    let unreadable = CorrelateArgs {
        log: PathBuf::from("/nonexistent/planner.log"),
        orig_id: "1".into(),
        pattern: None,
    };
    assert!(correlate_log(&unreadable, &AppConfig::default()).await.is_err());
}

#[tokio::test]
async fn replay_reports_host_status_after_start() {
    let mut config = AppConfig::default();
    config.search_debugger.port = 8898;

    let (surface, mut outbound) = ChannelSurface::new(true);
    let (inbound_tx, inbound_rx) = mpsc::channel(8);
    let (_visibility_tx, visibility_rx) = mpsc::channel(8);
    inbound_tx
        .send(json!({"command": "startDebugger"}))
        .await
        .unwrap();
    inbound_tx.send(json!({"command": "onload"})).await.unwrap();
    inbound_tx
        .send(json!({"command": "stopDebugger"}))
        .await
        .unwrap();
    drop(inbound_tx);

    replay_session(
        &config,
        ReplaySession::default(),
        Vec::new(),
        surface,
        inbound_rx,
        visibility_rx,
    )
    .await
    .unwrap();

    let states: Vec<Value> = drain(&mut outbound)
        .iter()
        .map(|message| serde_json::to_value(message).unwrap())
        .filter(|value| value["command"] == "debuggerState")
        .map(|value| value["state"].clone())
        .collect();
    assert_eq!(
        states,
        vec![
            json!({"running": "on", "port": 8898}),
            json!({"running": "on", "port": 8898}),
            json!({"running": "off", "port": 0}),
        ]
    );
}

#[tokio::test]
async fn long_traces_are_relayed_without_loss_or_duplicates() {
    let mut lines: Vec<String> = (0..1100)
        .map(|id| {
            json!({"event": "stateAdded", "state": {"id": id, "origId": id.to_string()}})
                .to_string()
        })
        .collect();
    lines.push(
        json!({"event": "planFound", "states": [{"id": 0, "origId": "0"}, {"id": 1099, "origId": "1099"}]})
            .to_string(),
    );
    let events = parse_events(&lines.join("\n")).unwrap();

    let (surface, mut outbound) = ChannelSurface::new(true);
    let (inbound_tx, inbound_rx) = mpsc::channel::<Value>(8);
    let (_visibility_tx, visibility_rx) = mpsc::channel(8);
    drop(inbound_tx);

    replay_session(
        &AppConfig::default(),
        ReplaySession::default(),
        events,
        surface,
        inbound_rx,
        visibility_rx,
    )
    .await
    .unwrap();

    let messages = drain(&mut outbound);
    let count = |kind: &str| messages.iter().filter(|m| m.kind() == kind).count();
    assert_eq!(count("stateAdded"), 1100);
    assert_eq!(count("showPlan"), 1);
    assert_eq!(count("showAllStates"), 0);
    assert_eq!(messages.last().map(OutboundMessage::kind), Some("showPlan"));
}
