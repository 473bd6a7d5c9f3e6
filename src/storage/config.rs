use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::domain::keys::{DEFAULT_SEEK_STEP_SECS, DEFAULT_VOLUME_STEP};
use crate::domain::models::DEFAULT_VOLUME;

const DEFAULT_VLC_PROGRAM: &str = "vlc";
const DEFAULT_VLC_HTTP_BASE: &str = "http://127.0.0.1:8080";
const DEFAULT_HIDE_CONTROLS_MS: u64 = 1_500;
const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    Rc,
    Http,
}

impl PlaybackMode {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rc" => Ok(Self::Rc),
            "http" => Ok(Self::Http),
            _ => Err(anyhow!(
                "invalid playback mode '{value}' (expected rc or http)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackConfig {
    pub mode: PlaybackMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlcConfig {
    pub program: String,
    pub http_base_url: String,
    pub http_password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    pub hide_controls_ms: u64,
    pub seek_step_secs: f64,
    pub volume_step: f64,
    pub initial_volume: f64,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub playback: PlaybackConfig,
    pub vlc: VlcConfig,
    pub player: PlayerConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig {
                mode: PlaybackMode::Rc,
            },
            vlc: VlcConfig {
                program: DEFAULT_VLC_PROGRAM.to_string(),
                http_base_url: DEFAULT_VLC_HTTP_BASE.to_string(),
                http_password: String::new(),
            },
            player: PlayerConfig {
                hide_controls_ms: DEFAULT_HIDE_CONTROLS_MS,
                seek_step_secs: DEFAULT_SEEK_STEP_SECS,
                volume_step: DEFAULT_VOLUME_STEP,
                initial_volume: DEFAULT_VOLUME,
                poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            },
        }
    }
}

impl RuntimeConfig {
    pub fn config_dir() -> PathBuf {
        env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".config/cineplayer")
    }

    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge_file(path)?;
        config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed reading config file: {}", path.display()))?;
        self.merge_toml_text(&content)
            .with_context(|| format!("failed parsing config TOML: {}", path.display()))
    }

    fn merge_toml_text(&mut self, content: &str) -> Result<()> {
        let mut section = String::new();

        for (idx, raw_line) in content.lines().enumerate() {
            let line = strip_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('[') {
                if !line.ends_with(']') {
                    return Err(anyhow!("line {}: invalid section syntax", idx + 1));
                }
                section = line[1..line.len() - 1].trim().to_string();
                continue;
            }

            let (key, value_raw) = line
                .split_once('=')
                .ok_or_else(|| anyhow!("line {}: expected key=value", idx + 1))?;
            let key = key.trim();
            let value = parse_value(value_raw.trim())
                .with_context(|| format!("line {}: invalid value", idx + 1))?;

            self.apply_file_value(&section, key, value)
                .with_context(|| format!("line {}: invalid {section}.{key}", idx + 1))?;
        }

        Ok(())
    }

    fn apply_file_value(&mut self, section: &str, key: &str, value: TomlValue) -> Result<()> {
        match (section, key) {
            ("playback", "mode") => {
                self.playback.mode = PlaybackMode::parse(value.as_str()?)?;
            }
            ("vlc", "program") => {
                self.vlc.program = value.into_string()?;
            }
            ("vlc", "http_base_url") => {
                self.vlc.http_base_url = value.into_string()?;
            }
            ("vlc", "http_password") => {
                self.vlc.http_password = value.into_string()?;
            }
            ("player", "hide_controls_ms") => {
                self.player.hide_controls_ms = value.as_u64()?;
            }
            ("player", "seek_step_secs") => {
                self.player.seek_step_secs = value.as_f64()?;
            }
            ("player", "volume_step") => {
                self.player.volume_step = value.as_f64()?;
            }
            ("player", "initial_volume") => {
                self.player.initial_volume = value.as_f64()?;
            }
            ("player", "poll_interval_ms") => {
                self.player.poll_interval_ms = value.as_u64()?;
            }
            _ => {}
        }

        Ok(())
    }

    fn merge_env(&mut self) -> Result<()> {
        if let Ok(mode) = env::var("CINEPLAYER_PLAYBACK_MODE") {
            self.playback.mode = PlaybackMode::parse(&mode)
                .with_context(|| "invalid CINEPLAYER_PLAYBACK_MODE".to_string())?;
        }

        if let Ok(program) = env::var("CINEPLAYER_VLC_PROGRAM") {
            self.vlc.program = program;
        }
        if let Ok(base_url) = env::var("CINEPLAYER_VLC_HTTP_BASE") {
            self.vlc.http_base_url = base_url;
        }
        if let Ok(password) = env::var("CINEPLAYER_VLC_HTTP_PASSWORD") {
            self.vlc.http_password = password;
        }

        if let Ok(value) = env::var("CINEPLAYER_HIDE_CONTROLS_MS") {
            self.player.hide_controls_ms = value
                .parse::<u64>()
                .with_context(|| "invalid CINEPLAYER_HIDE_CONTROLS_MS".to_string())?;
        }
        if let Ok(value) = env::var("CINEPLAYER_SEEK_STEP_SECS") {
            self.player.seek_step_secs = value
                .parse::<f64>()
                .with_context(|| "invalid CINEPLAYER_SEEK_STEP_SECS".to_string())?;
        }
        if let Ok(value) = env::var("CINEPLAYER_VOLUME_STEP") {
            self.player.volume_step = value
                .parse::<f64>()
                .with_context(|| "invalid CINEPLAYER_VOLUME_STEP".to_string())?;
        }
        if let Ok(value) = env::var("CINEPLAYER_INITIAL_VOLUME") {
            self.player.initial_volume = value
                .parse::<f64>()
                .with_context(|| "invalid CINEPLAYER_INITIAL_VOLUME".to_string())?;
        }
        if let Ok(value) = env::var("CINEPLAYER_POLL_INTERVAL_MS") {
            self.player.poll_interval_ms = value
                .parse::<u64>()
                .with_context(|| "invalid CINEPLAYER_POLL_INTERVAL_MS".to_string())?;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let player = &self.player;
        if player.hide_controls_ms == 0 {
            return Err(anyhow!("player.hide_controls_ms must be greater than 0"));
        }
        if !player.seek_step_secs.is_finite() || player.seek_step_secs <= 0.0 {
            return Err(anyhow!("player.seek_step_secs must be a positive number"));
        }
        if !(player.volume_step > 0.0 && player.volume_step <= 1.0) {
            return Err(anyhow!("player.volume_step must be in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&player.initial_volume) {
            return Err(anyhow!("player.initial_volume must be in [0, 1]"));
        }
        Ok(())
    }
}

fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    for (idx, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => return &line[..idx],
            _ => {}
        }
    }
    line
}

#[derive(Debug, Clone)]
enum TomlValue {
    String(String),
    Integer(u64),
    Float(f64),
}

impl TomlValue {
    fn as_str(&self) -> Result<&str> {
        match self {
            Self::String(value) => Ok(value.as_str()),
            _ => Err(anyhow!("expected string value")),
        }
    }

    fn into_string(self) -> Result<String> {
        match self {
            Self::String(value) => Ok(value),
            _ => Err(anyhow!("expected string value")),
        }
    }

    fn as_u64(&self) -> Result<u64> {
        match self {
            Self::Integer(value) => Ok(*value),
            _ => Err(anyhow!("expected integer value")),
        }
    }

    fn as_f64(&self) -> Result<f64> {
        match self {
            Self::Integer(value) => Ok(*value as f64),
            Self::Float(value) => Ok(*value),
            Self::String(_) => Err(anyhow!("expected numeric value")),
        }
    }
}

fn parse_value(value: &str) -> Result<TomlValue> {
    let trimmed = value.trim();
    if trimmed.starts_with('"') {
        if !trimmed.ends_with('"') || trimmed.len() < 2 {
            return Err(anyhow!("unterminated string"));
        }
        return Ok(TomlValue::String(trimmed[1..trimmed.len() - 1].to_string()));
    }

    if let Ok(number) = trimmed.parse::<u64>() {
        return Ok(TomlValue::Integer(number));
    }
    if let Ok(number) = trimmed.parse::<f64>() {
        return Ok(TomlValue::Float(number));
    }

    Ok(TomlValue::String(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_config_file_values() {
        let mut config = RuntimeConfig::default();
        config
            .merge_toml_text(
                r#"
                    [playback]
                    mode = "http"

                    [vlc]
                    program = "/usr/bin/cvlc"
                    http_base_url = "http://10.0.0.2:8080" # media box
                    http_password = "hunter2"

                    [player]
                    hide_controls_ms = 2500
                    seek_step_secs = 5
                    volume_step = 0.05
                    initial_volume = 0.8
                    poll_interval_ms = 250
                "#,
            )
            .expect("merge config text");

        assert_eq!(config.playback.mode, PlaybackMode::Http);
        assert_eq!(config.vlc.program, "/usr/bin/cvlc");
        assert_eq!(config.vlc.http_base_url, "http://10.0.0.2:8080");
        assert_eq!(config.vlc.http_password, "hunter2");
        assert_eq!(config.player.hide_controls_ms, 2500);
        assert_eq!(config.player.seek_step_secs, 5.0);
        assert_eq!(config.player.volume_step, 0.05);
        assert_eq!(config.player.initial_volume, 0.8);
        assert_eq!(config.player.poll_interval_ms, 250);
    }

    #[test]
    fn invalid_mode_in_file_is_rejected() {
        let mut config = RuntimeConfig::default();
        let err = config
            .merge_toml_text(
                r#"
                    [playback]
                    mode = "dbus"
                "#,
            )
            .expect_err("invalid mode should fail");
        assert!(format!("{err:#}").contains("invalid playback mode"));
    }

    #[test]
    fn string_for_numeric_key_is_rejected() {
        let mut config = RuntimeConfig::default();
        let err = config
            .merge_toml_text("[player]\nhide_controls_ms = \"soon\"\n")
            .expect_err("string delay should fail");
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn validate_rejects_out_of_range_volume() {
        let mut config = RuntimeConfig::default();
        config.player.initial_volume = 1.5;
        let err = config.validate().expect_err("volume above 1 should fail");
        assert!(err.to_string().contains("initial_volume"));
    }

    #[test]
    fn defaults_match_player_contract() {
        let config = RuntimeConfig::default();
        assert_eq!(config.player.hide_controls_ms, 1_500);
        assert_eq!(config.player.seek_step_secs, 10.0);
        assert_eq!(config.player.volume_step, 0.1);
        assert_eq!(config.player.initial_volume, 0.5);
    }
}
