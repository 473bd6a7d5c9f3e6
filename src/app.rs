use std::env;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::controller::{ControllerOptions, PlaybackController};
use crate::domain::commands::SlashCommand;
use crate::domain::keys::{InputTarget, KeyInput, KeyMap, KeyOutcome, PlayerKey};
use crate::domain::models::{PlaybackState, SeekTarget, Volume};
use crate::domain::timer::SystemClock;
use crate::integrations::decoder::MediaDecoder;
use crate::integrations::host::{HostEnvironment, TerminalHost};
use crate::integrations::vlc_http::VlcHttpDecoder;
use crate::integrations::vlc_process::VlcProcessDecoder;
use crate::storage::config::{PlaybackMode, RuntimeConfig};
use crate::ui::Tui;

const HELP_TEXT: &str = "Keys: Space play/pause | \u{2190}/\u{2192} seek | \u{2191}/\u{2193} volume | f fullscreen | m mute | : command | q quit. Commands: /load /play /pause /seek /volume /mute /rewind /forward /fullscreen /quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Player,
    Command,
}

impl Focus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Player => "Player",
            Self::Command => "Command",
        }
    }

    fn input_target(self) -> InputTarget {
        match self {
            Self::Player => InputTarget::Player,
            Self::Command => InputTarget::TextField,
        }
    }
}

pub struct App {
    pub running: bool,
    pub status_message: String,
    pub focus: Focus,
    pub command_input: String,
    last_error: Option<String>,
    controller: PlaybackController,
    errors: Receiver<String>,
}

impl App {
    pub fn new(
        media_url: impl Into<String>,
        decoder: Box<dyn MediaDecoder>,
        host: Box<dyn HostEnvironment>,
    ) -> Self {
        Self::new_with_options(media_url, decoder, host, ControllerOptions::default())
    }

    pub fn new_with_options(
        media_url: impl Into<String>,
        decoder: Box<dyn MediaDecoder>,
        host: Box<dyn HostEnvironment>,
        options: ControllerOptions,
    ) -> Self {
        let (tx, errors) = mpsc::channel();
        let error_handler = Box::new(move |message: &str| {
            let _ = tx.send(message.to_string());
        });
        let controller =
            PlaybackController::new_with_options(media_url, decoder, host, error_handler, options);

        let mut app = Self {
            running: true,
            status_message: "Ready".to_string(),
            focus: Focus::Player,
            command_input: String::new(),
            last_error: None,
            controller,
            errors,
        };
        app.drain_errors();
        if app.last_error.is_none() {
            app.status_message = format!("Loaded {}", app.controller.media_url());
        }
        app
    }

    pub fn playback_state(&self) -> &PlaybackState {
        self.controller.state()
    }

    pub fn media_url(&self) -> &str {
        self.controller.media_url()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    /// Forwards a key to the player. While the command line has focus the
    /// player sees it as text entry and ignores it; the typed character goes
    /// to the command line instead.
    pub fn press_key(&mut self, key: PlayerKey, typed: Option<char>) -> KeyOutcome {
        let outcome = self
            .controller
            .handle_key(KeyInput::new(key, self.focus.input_target()));
        if self.focus == Focus::Command {
            if let Some(c) = typed {
                self.command_input.push(c);
            }
        }
        self.drain_errors();
        outcome
    }

    pub fn pointer_move(&mut self) {
        self.controller.pointer_move();
    }

    pub fn pointer_down(&mut self) {
        self.controller.pointer_down();
    }

    pub fn toggle_mute(&mut self) {
        self.controller.toggle_mute();
        self.drain_errors();
    }

    pub fn open_command_line(&mut self) {
        self.focus = Focus::Command;
        if self.command_input.is_empty() {
            self.command_input.push('/');
        }
        self.status_message = format!("Focus: {}", self.focus.label());
    }

    pub fn close_command_line(&mut self) {
        self.focus = Focus::Player;
        self.command_input.clear();
        self.status_message = format!("Focus: {}", self.focus.label());
    }

    pub fn backspace_input(&mut self) {
        self.command_input.pop();
    }

    pub fn submit_command(&mut self) -> Result<()> {
        let input = std::mem::take(&mut self.command_input);
        self.focus = Focus::Player;
        let command = SlashCommand::parse(&input)?;
        self.execute_command(command)
    }

    pub fn execute_command(&mut self, command: SlashCommand) -> Result<()> {
        let key_map = self.controller.key_map();
        match command {
            SlashCommand::Load(url) => {
                self.controller.set_media_url(url);
                self.status_message = format!("Loaded {}", self.controller.media_url());
            }
            SlashCommand::Play => {
                if !self.playback_state().is_playing {
                    self.controller.toggle_play_pause();
                }
                self.status_message = "Playing".to_string();
            }
            SlashCommand::Pause => {
                if self.playback_state().is_playing {
                    self.controller.toggle_play_pause();
                }
                self.status_message = "Paused".to_string();
            }
            SlashCommand::Seek(target) => {
                self.controller.seek_to(target);
                self.status_message = match target {
                    SeekTarget::Fraction(fraction) => format!("Seeked to {:.0}%", fraction * 100.0),
                    SeekTarget::Seconds(seconds) => format!("Seeked to {seconds:.0}s"),
                };
            }
            SlashCommand::Volume(percent) => {
                self.controller.set_volume(f64::from(percent) / 100.0);
                self.status_message = format!("Volume {percent}%");
            }
            SlashCommand::Mute => {
                self.controller.toggle_mute();
                self.status_message = if self.playback_state().is_muted {
                    "Muted".to_string()
                } else {
                    "Unmuted".to_string()
                };
            }
            SlashCommand::Rewind(seconds) => {
                let seconds = seconds.unwrap_or(key_map.seek_step_secs);
                self.controller.rewind(seconds);
                self.status_message = format!("Rewound {seconds:.0}s");
            }
            SlashCommand::Forward(seconds) => {
                let seconds = seconds.unwrap_or(key_map.seek_step_secs);
                self.controller.fast_forward(seconds);
                self.status_message = format!("Skipped {seconds:.0}s");
            }
            SlashCommand::Fullscreen => {
                self.controller.toggle_fullscreen();
                self.status_message = if self.playback_state().is_fullscreen {
                    "Fullscreen (Esc to leave)".to_string()
                } else {
                    "Windowed".to_string()
                };
            }
            SlashCommand::Quit => self.request_quit(),
            SlashCommand::Help => {
                self.status_message = HELP_TEXT.to_string();
            }
        }

        self.drain_errors();
        Ok(())
    }

    /// Advances the controls countdown and picks up host notifications.
    pub fn tick(&mut self) {
        self.controller.tick();
        self.controller.process_host_events();
        self.drain_errors();
    }

    pub fn poll_decoder(&mut self) {
        self.controller.process_decoder_events();
        self.drain_errors();
    }

    pub fn request_quit(&mut self) {
        self.controller.shutdown();
        self.running = false;
        self.status_message = "Bye".to_string();
    }

    pub fn shutdown_playback(&mut self) {
        self.controller.shutdown();
    }

    fn drain_errors(&mut self) {
        while let Ok(message) = self.errors.try_recv() {
            self.status_message = message.clone();
            self.last_error = Some(message);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub media_url: String,
    pub debug: bool,
    pub config_path: Option<PathBuf>,
    pub mode: Option<PlaybackMode>,
}

pub fn run(options: RunOptions) -> Result<()> {
    init_tracing(options.debug);

    let mut config = match &options.config_path {
        Some(path) => RuntimeConfig::load_from_path(path),
        None => RuntimeConfig::load(),
    }
    .context("load runtime config")?;
    if let Some(mode) = options.mode {
        config.playback.mode = mode;
    }

    let decoder: Box<dyn MediaDecoder> = match config.playback.mode {
        PlaybackMode::Rc => Box::new(VlcProcessDecoder::new_with_program(
            config.vlc.program.clone(),
        )),
        PlaybackMode::Http => Box::new(VlcHttpDecoder::new(
            config.vlc.http_base_url.clone(),
            config.vlc.http_password.clone(),
        )),
    };
    info!(mode = ?config.playback.mode, url = %options.media_url, "starting player");

    let host = TerminalHost::new();
    let controller_options = ControllerOptions {
        clock: Arc::new(SystemClock::new()),
        hide_controls_delay: Duration::from_millis(config.player.hide_controls_ms),
        key_map: KeyMap {
            seek_step_secs: config.player.seek_step_secs,
            volume_step: config.player.volume_step,
        },
        initial_volume: Volume::new(config.player.initial_volume),
    };
    let mut app = App::new_with_options(
        options.media_url,
        decoder,
        Box::new(host.clone()),
        controller_options,
    );
    let mut tui = Tui::new(host, Duration::from_millis(config.player.poll_interval_ms))?;

    if let Err(err) = tui.run(&mut app) {
        warn!(error = ?err, "tui exited with error");
        app.shutdown_playback();
        return Err(err);
    }

    app.shutdown_playback();
    Ok(())
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "cineplayer=debug"
    } else {
        "cineplayer=info"
    };
    let path = env::var("CINEPLAYER_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| RuntimeConfig::config_dir().join("cineplayer.log"));
    // The terminal belongs to the UI, so logs only go to a file.
    let Ok(file) = open_log_file(&path) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory: {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file: {}", path.display()))
}
