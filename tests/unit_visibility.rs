mod support;

use cineplayer::domain::keys::{KeyInput, PlayerKey};
use cineplayer::domain::models::VolumeDirection;
use support::Harness;

#[test]
fn controls_start_visible_with_countdown_armed() {
    let harness = Harness::new();
    assert!(harness.controller.state().controls_visible);
    assert!(harness.controller.controls_countdown_pending());
}

#[test]
fn controls_hide_after_exactly_1500ms_of_inactivity() {
    let mut harness = Harness::new();

    harness.advance(1_499);
    assert!(harness.controller.state().controls_visible);

    harness.advance(1);
    assert!(!harness.controller.state().controls_visible);
    assert!(!harness.controller.controls_countdown_pending());
}

#[test]
fn any_input_while_hidden_shows_controls() {
    let mut harness = Harness::new();
    harness.advance(1_500);
    assert!(!harness.controller.state().controls_visible);

    harness.controller.pointer_move();
    assert!(harness.controller.state().controls_visible);

    harness.advance(1_500);
    harness.controller.pointer_down();
    assert!(harness.controller.state().controls_visible);

    harness.advance(1_500);
    harness.controller.handle_key(KeyInput::player(PlayerKey::ArrowUp));
    assert!(harness.controller.state().controls_visible);

    harness.advance(1_500);
    harness.controller.adjust_volume(VolumeDirection::Down, 0.1);
    assert!(harness.controller.state().controls_visible);
}

#[test]
fn activity_restarts_the_countdown() {
    let mut harness = Harness::new();

    harness.advance(1_000);
    harness.controller.pointer_move();

    harness.advance(1_000);
    assert!(
        harness.controller.state().controls_visible,
        "old countdown must not fire after a reset"
    );

    harness.advance(499);
    assert!(harness.controller.state().controls_visible);

    harness.advance(1);
    assert!(!harness.controller.state().controls_visible);
}

#[test]
fn decoder_progress_does_not_keep_controls_visible() {
    let mut harness = Harness::new();
    harness.controller.on_duration(60.0);

    harness.advance(1_000);
    harness.controller.on_progress(0.5);
    harness.advance(500);

    assert!(!harness.controller.state().controls_visible);
}

#[test]
fn every_transport_operation_resets_visibility() {
    let mut harness = Harness::new().with_media(60.0, 30.0);
    let operations: Vec<fn(&mut Harness)> = vec![
        |h: &mut Harness| h.controller.toggle_play_pause(),
        |h: &mut Harness| h.controller.set_volume(0.2),
        |h: &mut Harness| h.controller.toggle_mute(),
        |h: &mut Harness| h.controller.rewind(10.0),
        |h: &mut Harness| h.controller.fast_forward(10.0),
        |h: &mut Harness| h.controller.toggle_fullscreen(),
    ];

    for operation in operations {
        harness.advance(1_500);
        assert!(!harness.controller.state().controls_visible);
        operation(&mut harness);
        assert!(harness.controller.state().controls_visible);
    }
}

#[test]
fn unmount_cancels_pending_countdown() {
    let mut harness = Harness::new();
    harness.advance(200);

    harness.controller.shutdown();
    assert!(!harness.controller.controls_countdown_pending());

    harness.advance(5_000);
    assert!(harness.controller.state().controls_visible);
}

#[test]
fn remount_on_new_media_shows_controls() {
    let mut harness = Harness::new();
    harness.advance(1_500);
    assert!(!harness.controller.state().controls_visible);

    harness
        .controller
        .set_media_url("https://cdn.example.com/films/solaris/master.m3u8");
    assert!(harness.controller.state().controls_visible);

    harness.advance(1_500);
    assert!(!harness.controller.state().controls_visible);
}
