mod support;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cineplayer::app::{App, Focus};
use cineplayer::controller::ControllerOptions;
use cineplayer::domain::keys::{KeyOutcome, PlayerKey};
use cineplayer::domain::timer::ManualClock;
use cineplayer::integrations::decoder::DecoderEvent;
use support::{CallLog, ScriptedDecoder, ScriptedHost, MEDIA_URL};

struct Session {
    app: App,
    calls: CallLog,
    events: Arc<Mutex<VecDeque<DecoderEvent>>>,
    host: ScriptedHost,
    clock: ManualClock,
}

fn start_session() -> Session {
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let decoder = ScriptedDecoder::new(calls.clone());
    let events = decoder.event_queue();
    let host = ScriptedHost::new();
    let clock = ManualClock::new();

    let app = App::new_with_options(
        MEDIA_URL,
        Box::new(decoder),
        Box::new(host.clone()),
        ControllerOptions {
            clock: Arc::new(clock.clone()),
            ..ControllerOptions::default()
        },
    );

    Session {
        app,
        calls,
        events,
        host,
        clock,
    }
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        let outcome = app.press_key(PlayerKey::from_char(c), Some(c));
        assert_eq!(outcome, KeyOutcome::IGNORED, "typed {c:?} reached the player");
    }
}

fn run_command(app: &mut App, command: &str) {
    app.focus = Focus::Command;
    app.command_input = command.to_string();
    app.submit_command().expect("execute command");
}

#[test]
fn e2e_mock_user_flow_play_volume_seek_mute_quit() {
    let Session {
        mut app,
        calls,
        events,
        ..
    } = start_session();
    assert_eq!(app.status_message, format!("Loaded {MEDIA_URL}"));

    let outcome = app.press_key(PlayerKey::Space, Some(' '));
    assert!(outcome.prevent_default);
    assert!(app.playback_state().is_playing);

    events
        .lock()
        .expect("lock events")
        .push_back(DecoderEvent::Duration(200.0));
    app.poll_decoder();
    assert_eq!(app.playback_state().duration_seconds, 200.0);

    app.open_command_line();
    type_text(&mut app, "volume 30");
    assert_eq!(app.command_input, "/volume 30");
    app.submit_command().expect("execute /volume");
    assert_eq!(app.focus, Focus::Player);
    assert_eq!(app.status_message, "Volume 30%");
    assert!(
        app.playback_state().is_playing,
        "space typed into the command line must not pause"
    );

    run_command(&mut app, "/seek 50%");
    assert_eq!(app.playback_state().played_fraction, 0.5);

    run_command(&mut app, "/mute");
    assert_eq!(app.status_message, "Muted");

    run_command(&mut app, "/forward 20");
    assert_eq!(app.status_message, "Skipped 20s");

    run_command(&mut app, "/quit");

    let calls = calls.lock().expect("lock calls").clone();
    assert_eq!(
        calls,
        vec![
            format!("load:{MEDIA_URL}"),
            "volume:0.5".to_string(),
            "muted:false".to_string(),
            "play".to_string(),
            "volume:0.3".to_string(),
            "muted:false".to_string(),
            "seek:100".to_string(),
            "muted:true".to_string(),
            "seek:120".to_string(),
            "shutdown".to_string(),
        ]
    );
    assert!(!app.running);
    assert_eq!(app.status_message, "Bye");
}

#[test]
fn e2e_controls_hide_and_return_with_pointer_activity() {
    let Session {
        mut app, clock, ..
    } = start_session();

    clock.advance(Duration::from_millis(1_499));
    app.tick();
    assert!(app.playback_state().controls_visible);

    clock.advance(Duration::from_millis(1));
    app.tick();
    assert!(!app.playback_state().controls_visible);

    app.pointer_move();
    assert!(app.playback_state().controls_visible);
}

#[test]
fn e2e_fullscreen_follows_host_after_system_exit() {
    let Session {
        mut app, host, ..
    } = start_session();

    app.press_key(PlayerKey::KeyF, Some('f'));
    assert!(app.playback_state().is_fullscreen);

    host.exit_outside_controller();
    app.tick();
    assert!(!app.playback_state().is_fullscreen);

    run_command(&mut app, "/fullscreen");
    assert!(app.playback_state().is_fullscreen);
    assert_eq!(app.status_message, "Fullscreen (Esc to leave)");
    assert_eq!(host.requests(), vec!["enter", "enter"]);
}

#[test]
fn e2e_loading_new_media_resets_transport() {
    let Session {
        mut app, calls, ..
    } = start_session();
    app.press_key(PlayerKey::Space, Some(' '));
    calls.lock().expect("lock calls").clear();

    let next = "https://cdn.example.com/films/stalker/master.m3u8";
    run_command(&mut app, &format!("/load {next}"));

    assert_eq!(app.media_url(), next);
    assert!(!app.playback_state().is_playing);
    assert_eq!(app.status_message, format!("Loaded {next}"));
    assert_eq!(
        calls.lock().expect("lock calls").first().cloned(),
        Some(format!("load:{next}"))
    );
}
