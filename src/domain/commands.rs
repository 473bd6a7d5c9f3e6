use anyhow::{anyhow, Result};

use crate::domain::models::SeekTarget;

#[derive(Debug, Clone, PartialEq)]
pub enum SlashCommand {
    Load(String),
    Play,
    Pause,
    Seek(SeekTarget),
    Volume(u8),
    Mute,
    Rewind(Option<f64>),
    Forward(Option<f64>),
    Fullscreen,
    Quit,
    Help,
}

impl SlashCommand {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if !trimmed.starts_with('/') {
            return Err(anyhow!("slash commands must start with '/'"));
        }

        let mut parts = trimmed[1..].split_whitespace();
        let cmd = parts.next().ok_or_else(|| anyhow!("empty command"))?;

        match cmd {
            "load" | "open" => {
                let url = parts.collect::<Vec<_>>().join(" ");
                if url.is_empty() {
                    Err(anyhow!("usage: /load <url>"))
                } else {
                    Ok(Self::Load(url))
                }
            }
            "play" => Ok(Self::Play),
            "pause" => Ok(Self::Pause),
            "seek" => {
                let value = single_arg(&mut parts, "usage: /seek <seconds|percent%>")?;
                Ok(Self::Seek(parse_seek_target(value)?))
            }
            "volume" | "vol" => {
                let value = single_arg(&mut parts, "usage: /volume <0-100>")?;
                let percent = value
                    .parse::<u8>()
                    .map_err(|_| anyhow!("volume must be an integer between 0 and 100"))?;
                if percent > 100 {
                    return Err(anyhow!("volume must be an integer between 0 and 100"));
                }
                Ok(Self::Volume(percent))
            }
            "mute" | "unmute" => Ok(Self::Mute),
            "rewind" | "rw" => Ok(Self::Rewind(optional_seconds(&mut parts)?)),
            "forward" | "ff" => Ok(Self::Forward(optional_seconds(&mut parts)?)),
            "fullscreen" | "fs" => Ok(Self::Fullscreen),
            "quit" | "q" => Ok(Self::Quit),
            "help" => Ok(Self::Help),
            _ => Err(anyhow!("unknown command: {cmd}")),
        }
    }
}

fn single_arg<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    usage: &'static str,
) -> Result<&'a str> {
    let value = parts.next().ok_or_else(|| anyhow!(usage))?;
    if parts.next().is_some() {
        return Err(anyhow!(usage));
    }
    Ok(value)
}

fn optional_seconds<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<Option<f64>> {
    let Some(value) = parts.next() else {
        return Ok(None);
    };
    if parts.next().is_some() {
        return Err(anyhow!("expected at most one argument (seconds)"));
    }
    let seconds = parse_non_negative(value)?;
    Ok(Some(seconds))
}

fn parse_seek_target(value: &str) -> Result<SeekTarget> {
    if let Some(percent) = value.strip_suffix('%') {
        let percent = parse_non_negative(percent)?;
        if percent > 100.0 {
            return Err(anyhow!("seek percent must be between 0 and 100"));
        }
        return Ok(SeekTarget::Fraction(percent / 100.0));
    }
    Ok(SeekTarget::Seconds(parse_non_negative(value)?))
}

fn parse_non_negative(value: &str) -> Result<f64> {
    let number = value
        .parse::<f64>()
        .map_err(|_| anyhow!("expected a number, got '{value}'"))?;
    if !number.is_finite() || number < 0.0 {
        return Err(anyhow!("expected a non-negative number, got '{value}'"));
    }
    Ok(number)
}
