#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use cineplayer::controller::{ControllerOptions, ErrorHandler, PlaybackController};
use cineplayer::domain::timer::ManualClock;
use cineplayer::integrations::decoder::{DecoderEvent, MediaDecoder};
use cineplayer::integrations::host::HostEnvironment;

pub const MEDIA_URL: &str = "https://cdn.example.com/films/arrival/master.m3u8";

pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Decoder double that records every command and replays queued events.
pub struct ScriptedDecoder {
    calls: CallLog,
    events: Arc<Mutex<VecDeque<DecoderEvent>>>,
    fail_commands: bool,
}

impl ScriptedDecoder {
    pub fn new(calls: CallLog) -> Self {
        Self {
            calls,
            events: Arc::new(Mutex::new(VecDeque::new())),
            fail_commands: false,
        }
    }

    pub fn failing(calls: CallLog) -> Self {
        Self {
            fail_commands: true,
            ..Self::new(calls)
        }
    }

    pub fn event_queue(&self) -> Arc<Mutex<VecDeque<DecoderEvent>>> {
        self.events.clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().expect("lock calls").push(call.clone());
        if self.fail_commands {
            return Err(anyhow!("simulated {call} failure"));
        }
        Ok(())
    }
}

impl MediaDecoder for ScriptedDecoder {
    fn load(&mut self, media_url: &str) -> Result<()> {
        self.record(format!("load:{media_url}"))
    }

    fn play(&mut self) -> Result<()> {
        self.record("play".to_string())
    }

    fn pause(&mut self) -> Result<()> {
        self.record("pause".to_string())
    }

    fn seek(&mut self, seconds: f64) -> Result<()> {
        self.record(format!("seek:{seconds}"))
    }

    fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.record(format!("volume:{volume}"))
    }

    fn set_muted(&mut self, muted: bool) -> Result<()> {
        self.record(format!("muted:{muted}"))
    }

    fn poll_events(&mut self) -> Result<Vec<DecoderEvent>> {
        Ok(self.events.lock().expect("lock events").drain(..).collect())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.calls
            .lock()
            .expect("lock calls")
            .push("shutdown".to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct HostState {
    pub fullscreen: bool,
    pub deny_requests: bool,
    pub pending_change: Option<bool>,
    pub requests: Vec<&'static str>,
}

/// Host double whose fullscreen state and refusals are set by the test.
#[derive(Clone, Default)]
pub struct ScriptedHost {
    pub state: Arc<Mutex<HostState>>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deny_requests(&self) {
        self.state.lock().expect("lock host").deny_requests = true;
    }

    pub fn exit_outside_controller(&self) {
        let mut state = self.state.lock().expect("lock host");
        state.fullscreen = false;
        state.pending_change = Some(false);
    }

    pub fn requests(&self) -> Vec<&'static str> {
        self.state.lock().expect("lock host").requests.clone()
    }
}

impl HostEnvironment for ScriptedHost {
    fn request_fullscreen(&mut self) -> Result<()> {
        let mut state = self.state.lock().expect("lock host");
        state.requests.push("enter");
        if state.deny_requests {
            return Err(anyhow!("fullscreen requires a user gesture"));
        }
        state.fullscreen = true;
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<()> {
        let mut state = self.state.lock().expect("lock host");
        state.requests.push("exit");
        if state.deny_requests {
            return Err(anyhow!("exit refused"));
        }
        state.fullscreen = false;
        Ok(())
    }

    fn is_fullscreen(&self) -> bool {
        self.state.lock().expect("lock host").fullscreen
    }

    fn take_fullscreen_change(&mut self) -> Option<bool> {
        self.state.lock().expect("lock host").pending_change.take()
    }
}

/// A mounted controller wired to recording doubles and a virtual clock.
pub struct Harness {
    pub controller: PlaybackController,
    pub calls: CallLog,
    pub errors: Arc<Mutex<Vec<String>>>,
    pub events: Arc<Mutex<VecDeque<DecoderEvent>>>,
    pub host: ScriptedHost,
    pub clock: ManualClock,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_decoder(ScriptedDecoder::new)
    }

    pub fn with_decoder(build: impl FnOnce(CallLog) -> ScriptedDecoder) -> Self {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let errors = Arc::new(Mutex::new(Vec::new()));
        let decoder = build(calls.clone());
        let events = decoder.event_queue();
        let host = ScriptedHost::new();
        let clock = ManualClock::new();

        let sink = errors.clone();
        let error_handler: ErrorHandler = Box::new(move |message: &str| {
            sink.lock().expect("lock errors").push(message.to_string());
        });
        let controller = PlaybackController::new_with_options(
            MEDIA_URL,
            Box::new(decoder),
            Box::new(host.clone()),
            error_handler,
            ControllerOptions {
                clock: Arc::new(clock.clone()),
                ..ControllerOptions::default()
            },
        );

        Self {
            controller,
            calls,
            errors,
            events,
            host,
            clock,
        }
    }

    /// Reports a duration and position, as the decoder would once media is parsed.
    pub fn with_media(mut self, duration: f64, position_seconds: f64) -> Self {
        self.controller.on_duration(duration);
        self.controller.on_progress(position_seconds / duration);
        self.clear_calls();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock calls").clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().expect("lock calls").clear();
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().expect("lock errors").clone()
    }

    pub fn push_event(&self, event: DecoderEvent) {
        self.events.lock().expect("lock events").push_back(event);
    }

    pub fn advance(&mut self, millis: u64) {
        self.clock.advance(Duration::from_millis(millis));
        self.controller.tick();
    }
}
