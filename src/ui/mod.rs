pub mod render;

use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::app::{App, Focus};
use crate::domain::keys::PlayerKey;
use crate::integrations::host::TerminalHost;

const FRAME_POLL: Duration = Duration::from_millis(100);

pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    host: TerminalHost,
    decoder_poll_interval: Duration,
}

impl Tui {
    pub fn new(host: TerminalHost, decoder_poll_interval: Duration) -> Result<Self> {
        enable_raw_mode()?;
        let terminal = match enter_terminal_screen() {
            Ok(terminal) => terminal,
            Err(err) => {
                let _ = leave_terminal_screen(&mut io::stdout());
                let _ = disable_raw_mode();
                return Err(err);
            }
        };
        Ok(Self {
            terminal,
            host,
            decoder_poll_interval,
        })
    }

    pub fn run(&mut self, app: &mut App) -> Result<()> {
        let mut last_decoder_poll = Instant::now();

        while app.running {
            self.terminal
                .draw(|frame| render::render(frame, app))
                .map_err(anyhow::Error::from)?;

            if event::poll(FRAME_POLL)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key_event(app, key);
                    }
                    Event::Mouse(mouse) => handle_mouse_event(app, mouse),
                    _ => {}
                }
            }

            app.tick();
            if last_decoder_poll.elapsed() >= self.decoder_poll_interval {
                app.poll_decoder();
                last_decoder_poll = Instant::now();
            }
        }

        Ok(())
    }

    fn handle_key_event(&mut self, app: &mut App, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => app.request_quit(),
            (_, KeyCode::Esc) => {
                if app.focus == Focus::Command {
                    app.close_command_line();
                } else if self.host.leave_fullscreen_from_system_key() {
                    app.status_message = "Left fullscreen".to_string();
                }
            }
            (_, KeyCode::Enter) if app.focus == Focus::Command => {
                if let Err(err) = app.submit_command() {
                    app.status_message = format!("Error: {err}");
                }
            }
            (_, KeyCode::Backspace) if app.focus == Focus::Command => app.backspace_input(),
            (_, KeyCode::Char(':')) | (_, KeyCode::Char('/')) if app.focus == Focus::Player => {
                app.open_command_line();
            }
            (_, KeyCode::Char('q')) if app.focus == Focus::Player => app.request_quit(),
            (_, KeyCode::Char('m')) if app.focus == Focus::Player => app.toggle_mute(),
            (_, code) => {
                let (player_key, typed) = map_key(code);
                app.press_key(player_key, typed);
            }
        }
    }
}

fn enter_terminal_screen() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn leave_terminal_screen(out: &mut impl Write) -> io::Result<()> {
    out.execute(DisableMouseCapture)?;
    out.execute(LeaveAlternateScreen)?;
    Ok(())
}

fn map_key(code: KeyCode) -> (PlayerKey, Option<char>) {
    match code {
        KeyCode::Left => (PlayerKey::ArrowLeft, None),
        KeyCode::Right => (PlayerKey::ArrowRight, None),
        KeyCode::Up => (PlayerKey::ArrowUp, None),
        KeyCode::Down => (PlayerKey::ArrowDown, None),
        KeyCode::Char(c) => (PlayerKey::from_char(c), Some(c)),
        _ => (PlayerKey::Other, None),
    }
}

fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => app.pointer_move(),
        MouseEventKind::Down(_) => app.pointer_down(),
        _ => {}
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = leave_terminal_screen(self.terminal.backend_mut());
    }
}
