pub const DEFAULT_VOLUME: f64 = 0.5;

// Volume steps are snapped to this grid so repeated +/-0.1 lands on exact values.
const VOLUME_PRECISION: f64 = 1_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume(f64);

impl Volume {
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    pub fn stepped(self, delta: f64) -> Self {
        let raw = self.0 + delta;
        Self::new((raw * VOLUME_PRECISION).round() / VOLUME_PRECISION)
    }

    pub fn percent(self) -> u8 {
        // Clamped to [0,1] so the cast cannot overflow.
        (self.0 * 100.0).round() as u8
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self(DEFAULT_VOLUME)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekTarget {
    Fraction(f64),
    Seconds(f64),
}

/// Transport and visibility state of one playback session.
///
/// `duration_seconds == 0.0` means the decoder has not reported a duration yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub volume: Volume,
    pub is_muted: bool,
    pub played_fraction: f64,
    pub duration_seconds: f64,
    pub is_fullscreen: bool,
    pub controls_visible: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            volume: Volume::default(),
            is_muted: false,
            played_fraction: 0.0,
            duration_seconds: 0.0,
            is_fullscreen: false,
            controls_visible: true,
        }
    }
}

impl PlaybackState {
    pub fn with_volume(volume: Volume) -> Self {
        Self {
            volume,
            ..Self::default()
        }
    }

    pub fn duration_known(&self) -> bool {
        self.duration_seconds > 0.0
    }

    pub fn current_seconds(&self) -> f64 {
        self.played_fraction * self.duration_seconds
    }

    /// Volume as shown on the slider: zero while muted, stored value otherwise.
    pub fn effective_volume(&self) -> f64 {
        if self.is_muted {
            0.0
        } else {
            self.volume.value()
        }
    }
}

/// Formats seconds as `mm:ss`. Minutes wrap at 60, hours are not shown.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00".to_string();
    }
    let total = seconds.floor() as u64;
    let minutes = (total / 60) % 60;
    let secs = total % 60;
    format!("{minutes:02}:{secs:02}")
}
