use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::domain::keys::{InputTarget, KeyInput, KeyMap, KeyOutcome, PlayerAction};
use crate::domain::models::{PlaybackState, SeekTarget, Volume, VolumeDirection};
use crate::domain::timer::{Clock, InactivityTimer, SystemClock, DEFAULT_HIDE_CONTROLS_DELAY};
use crate::integrations::decoder::{DecoderEvent, MediaDecoder};
use crate::integrations::host::HostEnvironment;

/// Receives a human readable message whenever playback fails.
pub type ErrorHandler = Box<dyn FnMut(&str) + Send>;

pub struct ControllerOptions {
    pub clock: Arc<dyn Clock>,
    pub hide_controls_delay: Duration,
    pub key_map: KeyMap,
    pub initial_volume: Volume,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            clock: Arc::new(SystemClock::new()),
            hide_controls_delay: DEFAULT_HIDE_CONTROLS_DELAY,
            key_map: KeyMap::default(),
            initial_volume: Volume::default(),
        }
    }
}

/// Transport state machine for one mounted player.
///
/// Every input, timer and decoder notification goes through a method here and
/// lands in [`PlaybackState`]. None of the operations fail: collaborator
/// errors are routed to the caller's [`ErrorHandler`] and playback is
/// considered stopped.
pub struct PlaybackController {
    state: PlaybackState,
    media_url: String,
    decoder: Box<dyn MediaDecoder>,
    host: Box<dyn HostEnvironment>,
    clock: Arc<dyn Clock>,
    controls_timer: InactivityTimer,
    key_map: KeyMap,
    error_handler: ErrorHandler,
    mounted: bool,
}

impl PlaybackController {
    pub fn new(
        media_url: impl Into<String>,
        decoder: Box<dyn MediaDecoder>,
        host: Box<dyn HostEnvironment>,
        error_handler: ErrorHandler,
    ) -> Self {
        Self::new_with_options(
            media_url,
            decoder,
            host,
            error_handler,
            ControllerOptions::default(),
        )
    }

    pub fn new_with_options(
        media_url: impl Into<String>,
        decoder: Box<dyn MediaDecoder>,
        host: Box<dyn HostEnvironment>,
        error_handler: ErrorHandler,
        options: ControllerOptions,
    ) -> Self {
        let mut controller = Self {
            state: PlaybackState::with_volume(options.initial_volume),
            media_url: media_url.into(),
            decoder,
            host,
            clock: options.clock,
            controls_timer: InactivityTimer::new(options.hide_controls_delay),
            key_map: options.key_map,
            error_handler,
            mounted: false,
        };
        controller.mount();
        controller
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn media_url(&self) -> &str {
        &self.media_url
    }

    pub fn key_map(&self) -> KeyMap {
        self.key_map
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn controls_countdown_pending(&self) -> bool {
        self.controls_timer.is_armed()
    }

    pub fn toggle_play_pause(&mut self) {
        self.state.is_playing = !self.state.is_playing;
        debug!(playing = self.state.is_playing, "toggle play/pause");
        let result = if self.state.is_playing {
            self.decoder.play()
        } else {
            self.decoder.pause()
        };
        self.forward(result.context("play/pause failed"));
        self.show_controls();
    }

    pub fn set_volume(&mut self, value: f64) {
        self.state.volume = Volume::new(value);
        self.state.is_muted = self.state.volume.is_zero();
        debug!(volume = self.state.volume.value(), muted = self.state.is_muted, "set volume");
        let result = self.push_audio();
        self.forward(result);
        self.show_controls();
    }

    pub fn toggle_mute(&mut self) {
        self.state.is_muted = !self.state.is_muted;
        debug!(muted = self.state.is_muted, "toggle mute");
        let result = self.decoder.set_muted(self.state.is_muted);
        self.forward(result.context("mute failed"));
        self.show_controls();
    }

    pub fn seek_to(&mut self, target: SeekTarget) {
        let duration = self.state.duration_seconds;
        let seconds = match target {
            SeekTarget::Fraction(fraction) => clamp_unit(fraction) * duration,
            SeekTarget::Seconds(seconds) if self.state.duration_known() => {
                non_negative(seconds).min(duration)
            }
            SeekTarget::Seconds(seconds) => non_negative(seconds),
        };

        self.state.played_fraction = if self.state.duration_known() {
            clamp_unit(seconds / duration)
        } else {
            0.0
        };
        debug!(seconds, "seek");
        let result = self.decoder.seek(seconds);
        self.forward(result.context("seek failed"));
        self.show_controls();
    }

    pub fn rewind(&mut self, delta_seconds: f64) {
        let target = self.state.current_seconds() - non_negative(delta_seconds);
        self.seek_to(SeekTarget::Seconds(target.clamp(0.0, self.state.duration_seconds)));
    }

    pub fn fast_forward(&mut self, delta_seconds: f64) {
        let target = self.state.current_seconds() + non_negative(delta_seconds);
        self.seek_to(SeekTarget::Seconds(target.clamp(0.0, self.state.duration_seconds)));
    }

    /// Steps the volume. Stepping up always unmutes; stepping down never
    /// touches the mute flag, even when it reaches zero.
    pub fn adjust_volume(&mut self, direction: VolumeDirection, step: f64) {
        let step = non_negative(step);
        self.state.volume = match direction {
            VolumeDirection::Up => self.state.volume.stepped(step),
            VolumeDirection::Down => self.state.volume.stepped(-step),
        };
        if direction == VolumeDirection::Up {
            self.state.is_muted = false;
        }
        debug!(?direction, volume = self.state.volume.value(), "adjust volume");
        let result = self.push_audio();
        self.forward(result);
        self.show_controls();
    }

    pub fn toggle_fullscreen(&mut self) {
        let wanted = !self.state.is_fullscreen;
        self.state.is_fullscreen = wanted;
        let result = if wanted {
            self.host.request_fullscreen()
        } else {
            self.host.exit_fullscreen()
        };
        if let Err(err) = result {
            self.state.is_fullscreen = self.host.is_fullscreen();
            warn!(error = ?err, wanted, "host refused fullscreen change");
        }
        self.show_controls();
    }

    pub fn on_fullscreen_change(&mut self, fullscreen: bool) {
        if self.state.is_fullscreen != fullscreen {
            debug!(fullscreen, "host changed fullscreen");
        }
        self.state.is_fullscreen = fullscreen;
    }

    pub fn on_progress(&mut self, played_fraction: f64) {
        if played_fraction.is_nan() {
            return;
        }
        self.state.played_fraction = if self.state.duration_known() {
            clamp_unit(played_fraction)
        } else {
            0.0
        };
    }

    pub fn on_duration(&mut self, seconds: f64) {
        if self.state.duration_known() || !seconds.is_finite() || seconds <= 0.0 {
            return;
        }
        debug!(seconds, "duration reported");
        self.state.duration_seconds = seconds;
    }

    pub fn on_error(&mut self, message: &str) {
        self.state.is_playing = false;
        warn!(error = message, url = %self.media_url, "playback error");
        (self.error_handler)(&format!("Video playback error: {message}"));
    }

    pub fn handle_decoder_event(&mut self, event: DecoderEvent) {
        match event {
            DecoderEvent::Progress(fraction) => self.on_progress(fraction),
            DecoderEvent::Duration(seconds) => self.on_duration(seconds),
            DecoderEvent::Error(message) => self.on_error(&message),
        }
    }

    pub fn pointer_move(&mut self) {
        self.show_controls();
    }

    pub fn pointer_down(&mut self) {
        self.show_controls();
    }

    pub fn handle_key(&mut self, input: KeyInput) -> KeyOutcome {
        if input.target == InputTarget::TextField {
            return KeyOutcome::IGNORED;
        }
        let Some(binding) = self.key_map.binding(input.key) else {
            return KeyOutcome::IGNORED;
        };
        self.apply(binding.action);
        KeyOutcome {
            handled: true,
            prevent_default: binding.prevent_default,
        }
    }

    pub fn apply(&mut self, action: PlayerAction) {
        match action {
            PlayerAction::TogglePlayPause => self.toggle_play_pause(),
            PlayerAction::Rewind(seconds) => self.rewind(seconds),
            PlayerAction::FastForward(seconds) => self.fast_forward(seconds),
            PlayerAction::AdjustVolume(direction, step) => self.adjust_volume(direction, step),
            PlayerAction::ToggleFullscreen => self.toggle_fullscreen(),
        }
    }

    /// Hides the controls once the inactivity countdown has elapsed.
    pub fn tick(&mut self) {
        if !self.mounted {
            return;
        }
        if self.controls_timer.poll(self.clock.now()) {
            debug!("controls hidden after inactivity");
            self.state.controls_visible = false;
        }
    }

    /// Drains host fullscreen notifications and decoder events.
    pub fn process_events(&mut self) {
        self.process_host_events();
        self.process_decoder_events();
    }

    pub fn process_host_events(&mut self) {
        if !self.mounted {
            return;
        }
        while let Some(fullscreen) = self.host.take_fullscreen_change() {
            self.on_fullscreen_change(fullscreen);
        }
    }

    pub fn process_decoder_events(&mut self) {
        if !self.mounted {
            return;
        }
        match self.decoder.poll_events() {
            Ok(events) => {
                for event in events {
                    self.handle_decoder_event(event);
                }
            }
            Err(err) => self.on_error(&format!("{err:#}")),
        }
    }

    pub fn set_media_url(&mut self, media_url: impl Into<String>) {
        let media_url = media_url.into();
        if media_url == self.media_url && self.mounted {
            return;
        }
        info!(from = %self.media_url, to = %media_url, "media source changed");
        self.media_url = media_url;
        self.state = PlaybackState::with_volume(self.state.volume);
        self.mount();
    }

    /// Unmounts the player: cancels the countdown and stops the decoder.
    pub fn shutdown(&mut self) {
        if !self.mounted {
            return;
        }
        self.controls_timer.cancel();
        self.mounted = false;
        if let Err(err) = self.decoder.shutdown() {
            warn!(error = ?err, "decoder shutdown failed");
        }
    }

    fn mount(&mut self) {
        self.mounted = true;
        self.state.is_fullscreen = self.host.is_fullscreen();
        info!(url = %self.media_url, "mounting player");
        let result = self.load_media();
        self.forward(result);
        self.show_controls();
    }

    fn show_controls(&mut self) {
        self.state.controls_visible = true;
        if self.mounted {
            self.controls_timer.arm(self.clock.now());
        }
    }

    fn load_media(&mut self) -> Result<()> {
        self.decoder
            .load(&self.media_url)
            .context("load failed")?;
        self.push_audio()
    }

    /// Sends volume then mute, stopping at the first failure.
    fn push_audio(&mut self) -> Result<()> {
        self.decoder
            .set_volume(self.state.volume.value())
            .context("volume failed")?;
        self.decoder
            .set_muted(self.state.is_muted)
            .context("mute failed")
    }

    /// Reports a failed decoder operation once through `on_error`.
    fn forward(&mut self, result: Result<()>) {
        if let Err(err) = result {
            self.on_error(&format!("{err:#}"));
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}
