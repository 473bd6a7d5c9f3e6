use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::warn;

use super::decoder::{validate_media_url, volume_to_vlc_scale, DecoderEvent, MediaDecoder};

/// Subset of VLC's `/requests/status.json` the player cares about.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct VlcStatus {
    #[serde(default)]
    pub time: f64,
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub position: f64,
    #[serde(default)]
    pub state: String,
}

impl VlcStatus {
    pub fn events(&self) -> Vec<DecoderEvent> {
        let mut events = Vec::new();
        if self.length > 0.0 {
            events.push(DecoderEvent::Duration(self.length));
            let fraction = if self.position > 0.0 {
                self.position
            } else {
                self.time / self.length
            };
            events.push(DecoderEvent::Progress(fraction.clamp(0.0, 1.0)));
        }
        events
    }
}

/// Drives VLC through its web interface (`vlc --intf http`).
pub struct VlcHttpDecoder {
    client: Client,
    base_url: String,
    password: String,
    started: bool,
    volume: f64,
    muted: bool,
    poll_failed: bool,
}

impl VlcHttpDecoder {
    pub fn new(base_url: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            password: password.into(),
            started: false,
            volume: 1.0,
            muted: false,
            poll_failed: false,
        }
    }

    fn request_status(&self, params: &[(&str, &str)]) -> Result<VlcStatus> {
        let command = params
            .iter()
            .find(|(key, _)| *key == "command")
            .map(|(_, value)| *value)
            .unwrap_or("status");

        let response = self
            .client
            .get(format!("{}/requests/status.json", self.base_url))
            .basic_auth("", Some(self.password.clone()))
            .query(params)
            .send()
            .with_context(|| {
                format!(
                    "failed sending VLC HTTP request to {}; enable VLC web interface and verify host/port",
                    self.base_url
                )
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(anyhow!(
                "VLC HTTP authentication failed (401); check CINEPLAYER_VLC_HTTP_PASSWORD"
            ));
        }
        response
            .error_for_status()
            .with_context(|| format!("VLC HTTP command '{command}' returned HTTP {status}"))?
            .json::<VlcStatus>()
            .context("failed to deserialize VLC status response")
    }

    fn send_command(&self, command: &str, extra: &[(&str, &str)]) -> Result<()> {
        let mut params = vec![("command", command)];
        params.extend_from_slice(extra);
        self.request_status(&params)?;
        Ok(())
    }

    fn send_audio_level(&self) -> Result<()> {
        let level = if self.muted {
            0
        } else {
            volume_to_vlc_scale(self.volume)
        };
        let level = level.to_string();
        self.send_command("volume", &[("val", level.as_str())])
    }
}

impl MediaDecoder for VlcHttpDecoder {
    fn load(&mut self, media_url: &str) -> Result<()> {
        let validated = validate_media_url(media_url)?;
        self.send_command("pl_empty", &[])?;
        self.send_command("in_enqueue", &[("input", validated)])?;
        self.started = false;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if self.started {
            self.send_command("pl_forceresume", &[])
        } else {
            self.send_command("pl_play", &[])?;
            self.started = true;
            Ok(())
        }
    }

    fn pause(&mut self) -> Result<()> {
        if !self.started {
            return Ok(());
        }
        self.send_command("pl_forcepause", &[])
    }

    fn seek(&mut self, seconds: f64) -> Result<()> {
        let target = (seconds.max(0.0).round() as u64).to_string();
        self.send_command("seek", &[("val", target.as_str())])
    }

    fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.volume = volume;
        self.send_audio_level()
    }

    fn set_muted(&mut self, muted: bool) -> Result<()> {
        self.muted = muted;
        self.send_audio_level()
    }

    fn poll_events(&mut self) -> Result<Vec<DecoderEvent>> {
        match self.request_status(&[]) {
            Ok(status) => {
                self.poll_failed = false;
                Ok(status.events())
            }
            // Report a dead web interface once, not on every poll.
            Err(err) if !self.poll_failed => {
                warn!(error = ?err, "VLC status poll failed");
                self.poll_failed = true;
                Ok(vec![DecoderEvent::Error(format!("{err:#}"))])
            }
            Err(_) => Ok(Vec::new()),
        }
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.started {
            self.send_command("pl_stop", &[])?;
            self.started = false;
        }
        Ok(())
    }
}
