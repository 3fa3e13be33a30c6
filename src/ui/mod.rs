//! Main UI layout and rendering.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

pub mod components;

pub use components::*;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Main layout: [search bar + count] [results] [now playing]
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Search bar and count line
            Constraint::Min(5),    // Results
            Constraint::Length(5), // Now playing
        ])
        .split(area);

    // Store layout areas for mouse handling
    app.layout.search_bar = main_chunks[0];
    app.layout.results = main_chunks[1];
    app.layout.scrub_bar = scrub_bar_area(main_chunks[2]);

    render_search_bar(frame, main_chunks[0], &app.search);

    let play_mode = app.play_mode();
    if let Some(message) = app.search.message.clone() {
        render_results_message(frame, main_chunks[1], &message);
    } else {
        render_results(
            frame,
            main_chunks[1],
            &mut app.results,
            &app.coordinator,
            play_mode,
        );
    }

    render_now_playing(frame, main_chunks[2], &app.coordinator);

    // Render error message if present
    if let Some(error) = &app.error_message {
        render_error(frame, area, error);
    }
}

/// Render an error message overlay.
fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let popup_area = centered_rect(60, 20, area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Error")
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(message)
        .style(Style::default().fg(Color::Red))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, popup_area);
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
