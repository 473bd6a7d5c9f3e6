use anyhow::Result;

/// Notifications a decoder reports back to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum DecoderEvent {
    Progress(f64),
    Duration(f64),
    Error(String),
}

/// External media engine that fetches, decodes and renders the stream.
pub trait MediaDecoder: Send {
    fn load(&mut self, media_url: &str) -> Result<()>;
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    fn seek(&mut self, seconds: f64) -> Result<()>;
    fn set_volume(&mut self, volume: f64) -> Result<()>;
    fn set_muted(&mut self, muted: bool) -> Result<()>;
    fn poll_events(&mut self) -> Result<Vec<DecoderEvent>>;
    fn shutdown(&mut self) -> Result<()>;
}

pub fn volume_to_vlc_scale(volume: f64) -> u16 {
    // VLC's RC/HTTP volume uses a 0-512 scale with 256 as nominal 100%.
    (volume.clamp(0.0, 1.0) * 256.0).round() as u16
}

pub fn validate_media_url(url: &str) -> Result<&str> {
    if url.is_empty() {
        return Err(anyhow::anyhow!("media URL is empty"));
    }
    if url.trim() != url || url.chars().any(|ch| ch.is_ascii_control()) {
        return Err(anyhow::anyhow!(
            "invalid media URL characters detected; remove control characters and leading/trailing whitespace"
        ));
    }
    Ok(url)
}
