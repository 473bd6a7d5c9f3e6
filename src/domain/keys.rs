use crate::domain::models::VolumeDirection;

pub const DEFAULT_SEEK_STEP_SECS: f64 = 10.0;
pub const DEFAULT_VOLUME_STEP: f64 = 0.1;

/// Physical keys the player reacts to, named after their DOM key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKey {
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    KeyF,
    Other,
}

impl PlayerKey {
    pub fn from_char(c: char) -> Self {
        match c {
            ' ' => Self::Space,
            'f' | 'F' => Self::KeyF,
            _ => Self::Other,
        }
    }
}

/// Where keyboard focus was when the key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputTarget {
    #[default]
    Player,
    TextField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: PlayerKey,
    pub target: InputTarget,
}

impl KeyInput {
    pub fn new(key: PlayerKey, target: InputTarget) -> Self {
        Self { key, target }
    }

    pub fn player(key: PlayerKey) -> Self {
        Self::new(key, InputTarget::Player)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerAction {
    TogglePlayPause,
    Rewind(f64),
    FastForward(f64),
    AdjustVolume(VolumeDirection, f64),
    ToggleFullscreen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyBinding {
    pub action: PlayerAction,
    pub prevent_default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    pub handled: bool,
    pub prevent_default: bool,
}

impl KeyOutcome {
    pub const IGNORED: Self = Self {
        handled: false,
        prevent_default: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyMap {
    pub seek_step_secs: f64,
    pub volume_step: f64,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            seek_step_secs: DEFAULT_SEEK_STEP_SECS,
            volume_step: DEFAULT_VOLUME_STEP,
        }
    }
}

impl KeyMap {
    pub fn binding(&self, key: PlayerKey) -> Option<KeyBinding> {
        let (action, prevent_default) = match key {
            PlayerKey::Space => (PlayerAction::TogglePlayPause, true),
            PlayerKey::ArrowLeft => (PlayerAction::Rewind(self.seek_step_secs), false),
            PlayerKey::ArrowRight => (PlayerAction::FastForward(self.seek_step_secs), false),
            PlayerKey::ArrowUp => (
                PlayerAction::AdjustVolume(VolumeDirection::Up, self.volume_step),
                true,
            ),
            PlayerKey::ArrowDown => (
                PlayerAction::AdjustVolume(VolumeDirection::Down, self.volume_step),
                true,
            ),
            PlayerKey::KeyF => (PlayerAction::ToggleFullscreen, false),
            PlayerKey::Other => return None,
        };
        Some(KeyBinding {
            action,
            prevent_default,
        })
    }
}
