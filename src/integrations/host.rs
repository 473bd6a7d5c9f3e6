use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;

/// Environment that owns the real fullscreen state.
pub trait HostEnvironment: Send {
    fn request_fullscreen(&mut self) -> Result<()>;
    fn exit_fullscreen(&mut self) -> Result<()>;
    fn is_fullscreen(&self) -> bool;
    /// Drains a fullscreen change the host made on its own, if any.
    fn take_fullscreen_change(&mut self) -> Option<bool>;
}

#[derive(Debug, Default)]
struct TerminalHostState {
    fullscreen: bool,
    pending_change: Option<bool>,
}

/// Terminal host: fullscreen is the theater layout that only draws the player.
///
/// Clones share state, so the event loop can keep a handle for keys the host
/// handles itself (Esc leaves theater mode without going through the controller).
#[derive(Debug, Clone, Default)]
pub struct TerminalHost {
    state: Arc<Mutex<TerminalHostState>>,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leave_fullscreen_from_system_key(&self) -> bool {
        let mut state = self.lock();
        if !state.fullscreen {
            return false;
        }
        state.fullscreen = false;
        state.pending_change = Some(false);
        true
    }

    fn lock(&self) -> MutexGuard<'_, TerminalHostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HostEnvironment for TerminalHost {
    fn request_fullscreen(&mut self) -> Result<()> {
        self.lock().fullscreen = true;
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<()> {
        self.lock().fullscreen = false;
        Ok(())
    }

    fn is_fullscreen(&self) -> bool {
        self.lock().fullscreen
    }

    fn take_fullscreen_change(&mut self) -> Option<bool> {
        self.lock().pending_change.take()
    }
}
