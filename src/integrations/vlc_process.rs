use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, warn};

use super::decoder::{validate_media_url, volume_to_vlc_scale, DecoderEvent, MediaDecoder};

const SHUTDOWN_WAIT: Duration = Duration::from_millis(500);
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);
const MAX_STALE_POLLS: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusQuery {
    Length,
    Time,
}

/// Drives a local VLC through its RC (remote control) interface on stdin/stdout.
pub struct VlcProcessDecoder {
    program: String,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    replies: Option<Receiver<String>>,
    pending: VecDeque<StatusQuery>,
    stale_polls: u32,
    loaded: bool,
    playing: bool,
    volume: f64,
    muted: bool,
    length_seconds: f64,
}

impl VlcProcessDecoder {
    pub fn new() -> Self {
        Self::new_with_program("vlc")
    }

    pub fn new_with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            child: None,
            stdin: None,
            replies: None,
            pending: VecDeque::new(),
            stale_polls: 0,
            loaded: false,
            playing: false,
            volume: 1.0,
            muted: false,
            length_seconds: 0.0,
        }
    }

    fn spawn_if_needed(&mut self) -> Result<()> {
        if self.child_is_running()? {
            return Ok(());
        }

        self.reset_process_handles();

        let mut child = Command::new(&self.program)
            .args(["--intf", "rc", "--rc-fake-tty", "--quiet"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| {
                if err.kind() == std::io::ErrorKind::NotFound {
                    anyhow!(
                        "failed to start VLC: '{}' not found on PATH; install VLC (e.g. apt install vlc)",
                        self.program
                    )
                } else {
                    anyhow!(
                        "failed to start VLC process '{} --intf rc --rc-fake-tty --quiet': {err}",
                        self.program
                    )
                }
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("failed to capture VLC stdin for RC commands"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("failed to capture VLC stdout for RC replies"))?;

        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("vlc-rc-reader".to_string())
            .spawn(move || {
                for line in BufReader::new(stdout).lines() {
                    let Ok(line) = line else { break };
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            })
            .context("failed to spawn VLC reply reader thread")?;

        debug!(program = %self.program, "spawned VLC process");
        self.stdin = Some(stdin);
        self.replies = Some(rx);
        self.child = Some(child);
        Ok(())
    }

    fn reset_process_handles(&mut self) {
        self.child = None;
        self.stdin = None;
        self.replies = None;
        self.pending.clear();
        self.loaded = false;
        self.playing = false;
    }

    fn child_is_running(&mut self) -> Result<bool> {
        if let Some(child) = self.child.as_mut() {
            if child
                .try_wait()
                .context("failed checking VLC process status")?
                .is_none()
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn send_command(&mut self, command: &str) -> Result<()> {
        if !self.child_is_running()? {
            return Err(anyhow!(
                "VLC process is not running; load a media URL with /load to restart it"
            ));
        }

        let stdin = self.stdin.as_mut().ok_or_else(|| {
            anyhow!("VLC command channel unavailable; reload the media with /load")
        })?;

        stdin
            .write_all(format!("{command}\n").as_bytes())
            .with_context(|| {
                format!(
                    "failed writing command to VLC process ({command}); VLC may have exited unexpectedly"
                )
            })?;
        stdin
            .flush()
            .context("failed flushing VLC command stream; VLC may have exited unexpectedly")?;
        Ok(())
    }

    fn send_audio_level(&mut self) -> Result<()> {
        let level = if self.muted {
            0
        } else {
            volume_to_vlc_scale(self.volume)
        };
        self.send_command(&format!("volume {level}"))
    }

    fn drain_replies(&mut self) -> Result<Vec<DecoderEvent>> {
        let mut events = Vec::new();
        let Some(replies) = self.replies.as_ref() else {
            return Ok(events);
        };

        let mut lines = Vec::new();
        loop {
            match replies.try_recv() {
                Ok(line) => lines.push(line),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        for line in lines {
            let Some(value) = parse_numeric_reply(&line) else {
                continue;
            };
            match self.pending.pop_front() {
                Some(StatusQuery::Length) => {
                    self.length_seconds = value;
                    if value > 0.0 {
                        events.push(DecoderEvent::Duration(value));
                    }
                }
                Some(StatusQuery::Time) => {
                    if self.length_seconds > 0.0 {
                        events.push(DecoderEvent::Progress(
                            (value / self.length_seconds).clamp(0.0, 1.0),
                        ));
                    }
                }
                None => {}
            }
        }

        Ok(events)
    }
}

impl Default for VlcProcessDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaDecoder for VlcProcessDecoder {
    fn load(&mut self, media_url: &str) -> Result<()> {
        let validated = validate_media_url(media_url)?;
        self.spawn_if_needed()?;
        if self.loaded {
            self.send_command("clear")?;
        }
        self.send_command(&format!("enqueue {validated}"))?;
        self.loaded = true;
        self.playing = false;
        self.length_seconds = 0.0;
        self.pending.clear();
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if !self.loaded {
            return Err(anyhow!("cannot play because no media is loaded"));
        }
        self.send_command("play")?;
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        // RC `pause` toggles, so only send it while playing.
        if self.playing {
            self.send_command("pause")?;
            self.playing = false;
        }
        Ok(())
    }

    fn seek(&mut self, seconds: f64) -> Result<()> {
        let target = seconds.max(0.0).round() as u64;
        self.send_command(&format!("seek {target}"))
    }

    fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.volume = volume;
        if self.child.is_none() {
            return Ok(());
        }
        self.send_audio_level()
    }

    fn set_muted(&mut self, muted: bool) -> Result<()> {
        self.muted = muted;
        if self.child.is_none() {
            return Ok(());
        }
        self.send_audio_level()
    }

    fn poll_events(&mut self) -> Result<Vec<DecoderEvent>> {
        if let Some(child) = self.child.as_mut() {
            if let Some(status) = child
                .try_wait()
                .context("failed checking VLC process status")?
            {
                warn!(%status, "VLC process exited");
                self.reset_process_handles();
                return Ok(vec![DecoderEvent::Error(format!(
                    "VLC exited unexpectedly ({status})"
                ))]);
            }
        } else {
            return Ok(Vec::new());
        }

        let outstanding = self.pending.len();
        let events = self.drain_replies()?;

        if outstanding > 0 && self.pending.len() == outstanding {
            self.stale_polls += 1;
            if self.stale_polls >= MAX_STALE_POLLS {
                // A reply went missing; start a fresh round of queries.
                self.pending.clear();
            }
        }
        if self.pending.is_empty() {
            self.stale_polls = 0;
        }
        if self.loaded && self.pending.is_empty() {
            self.send_command("get_length")?;
            self.pending.push_back(StatusQuery::Length);
            self.send_command("get_time")?;
            self.pending.push_back(StatusQuery::Time);
        }

        Ok(events)
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.child.is_none() {
            self.reset_process_handles();
            return Ok(());
        }

        let _ = self.send_command("quit");
        let deadline = Instant::now() + SHUTDOWN_WAIT;
        if let Some(child) = self.child.as_mut() {
            loop {
                if child
                    .try_wait()
                    .context("failed waiting for VLC process exit")?
                    .is_some()
                {
                    break;
                }
                if Instant::now() >= deadline {
                    child.kill().context("failed to force-kill VLC process")?;
                    let _ = child.wait();
                    break;
                }
                thread::sleep(SHUTDOWN_POLL);
            }
        }

        self.reset_process_handles();
        Ok(())
    }
}

impl Drop for VlcProcessDecoder {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

fn parse_numeric_reply(line: &str) -> Option<f64> {
    let trimmed = line.trim().trim_start_matches('>').trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}
