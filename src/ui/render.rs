use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};

use crate::app::{App, Focus};
use crate::domain::models::{format_time, PlaybackState};

pub fn render(frame: &mut ratatui::Frame<'_>, app: &App) {
    let state = app.playback_state();
    if state.is_fullscreen {
        render_player(frame, frame.area(), state, app.media_url());
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let header = Paragraph::new(format!(
        "cineplayer | Focus: {} | Space play/pause | \u{2190}\u{2192} seek | \u{2191}\u{2193} volume | f fullscreen | : command",
        app.focus.label()
    ))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .block(Block::default().borders(Borders::ALL).title("Session"));
    frame.render_widget(header, chunks[0]);

    render_player(frame, chunks[1], state, app.media_url());

    let input_title = match app.focus {
        Focus::Command => "Command (Enter runs, Esc cancels)",
        Focus::Player => "Command (press : to type)",
    };
    let input = Paragraph::new(Text::from(app.command_input.clone()))
        .block(Block::default().borders(Borders::ALL).title(input_title));
    frame.render_widget(input, chunks[2]);

    let status = Paragraph::new(app.status_message.clone())
        .style(Style::default().fg(Color::Yellow))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[3]);
}

/// Draws the player pane. Depends only on the playback state and URL.
pub fn render_player(frame: &mut ratatui::Frame<'_>, area: Rect, state: &PlaybackState, url: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(url.to_string())
        .style(Style::default().bg(Color::Black).fg(Color::White));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if !state.controls_visible {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let overlay = Line::from(vec![
        Span::styled(
            " HD ",
            Style::default()
                .bg(Color::Red)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled("Playing now", Style::default().fg(Color::Gray)),
    ]);
    frame.render_widget(Paragraph::new(overlay), rows[0]);

    let progress = Gauge::default()
        .gauge_style(Style::default().fg(Color::Red).bg(Color::DarkGray))
        .ratio(state.played_fraction.clamp(0.0, 1.0))
        .label(time_label(state))
        .use_unicode(true);
    frame.render_widget(progress, rows[2]);

    let controls = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(14), Constraint::Length(4)])
        .split(rows[3]);
    frame.render_widget(Paragraph::new(transport_line(state)), controls[0]);

    let volume = Gauge::default()
        .gauge_style(Style::default().fg(Color::White).bg(Color::DarkGray))
        .ratio(state.effective_volume())
        .label(volume_label(state));
    frame.render_widget(volume, controls[1]);
    frame.render_widget(Paragraph::new(fullscreen_glyph(state)), controls[2]);
}

pub fn time_label(state: &PlaybackState) -> String {
    format!(
        "{} / {}",
        format_time(state.current_seconds()),
        format_time(state.duration_seconds)
    )
}

pub fn transport_line(state: &PlaybackState) -> String {
    let play = if state.is_playing {
        "\u{23f8} Pause"
    } else {
        "\u{25b6} Play"
    };
    let mute = if state.is_muted {
        "\u{1f507}"
    } else {
        "\u{1f50a}"
    };
    format!("{play}  \u{23ee} -10s  \u{23ed} +10s  {mute}")
}

pub fn volume_label(state: &PlaybackState) -> String {
    if state.is_muted {
        "muted".to_string()
    } else {
        format!("{}%", state.volume.percent())
    }
}

fn fullscreen_glyph(state: &PlaybackState) -> &'static str {
    if state.is_fullscreen {
        " \u{2923}"
    } else {
        " \u{2922}"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Volume;

    #[test]
    fn time_label_shows_position_and_duration() {
        let state = PlaybackState {
            played_fraction: 0.5,
            duration_seconds: 130.0,
            ..PlaybackState::default()
        };
        assert_eq!(time_label(&state), "01:05 / 02:10");
    }

    #[test]
    fn transport_line_reflects_play_and_mute() {
        let mut state = PlaybackState::default();
        assert!(transport_line(&state).contains("Play"));
        state.is_playing = true;
        state.is_muted = true;
        let line = transport_line(&state);
        assert!(line.contains("Pause"));
        assert!(line.contains('\u{1f507}'));
    }

    #[test]
    fn volume_label_hides_level_while_muted() {
        let mut state = PlaybackState::with_volume(Volume::new(0.7));
        assert_eq!(volume_label(&state), "70%");
        state.is_muted = true;
        assert_eq!(volume_label(&state), "muted");
    }
}
