//! Now playing bar: progress panel, scrub bar and audio error banner.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::player::coordinator::SessionPhase;
use crate::player::Coordinator;

/// Render the now playing bar. The progress panel (time labels and the
/// scrub bar) appears only once metadata is known; the error banner is
/// independent of the session and overrides the status line while it is
/// visible.
pub fn render_now_playing(frame: &mut Frame, area: Rect, coordinator: &Coordinator) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 3 {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Time labels
            Constraint::Length(1), // Scrub bar
        ])
        .split(inner);

    if coordinator.error_banner_visible() {
        let banner = Paragraph::new("Failed to load audio").style(
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(banner, chunks[0]);
        return;
    }

    match coordinator.session() {
        Some(session) => {
            let state_symbol = match session.phase {
                SessionPhase::Playing => "▶",
                SessionPhase::Paused => "⏸",
                SessionPhase::Loading => "…",
            };
            let status = Line::from(vec![
                Span::styled(
                    format!("{state_symbol} "),
                    Style::default().fg(Color::Green),
                ),
                Span::styled(
                    format!("ASOT {}", session.episode),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]);
            frame.render_widget(Paragraph::new(status), chunks[0]);
        }
        None => {
            let idle =
                Paragraph::new("No episode playing").style(Style::default().fg(Color::DarkGray));
            frame.render_widget(idle, chunks[0]);
        }
    }

    if coordinator.panel_visible() {
        let time = Paragraph::new(format!(
            "{} / {}",
            coordinator.elapsed_label(),
            coordinator.total_label()
        ))
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(time, chunks[1]);

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Magenta).bg(Color::DarkGray))
            .percent(coordinator.scrub_fill_percent() as u16)
            .label("");
        frame.render_widget(gauge, chunks[2]);
    }
}

/// Area the scrub bar occupies, for pointer interaction. Matches the
/// third content row rendered above.
pub fn scrub_bar_area(now_playing: Rect) -> Rect {
    Rect {
        x: now_playing.x + 1,
        y: now_playing.y + 3,
        width: now_playing.width.saturating_sub(2),
        height: 1,
    }
}
