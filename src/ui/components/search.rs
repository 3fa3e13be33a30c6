//! Search bar component.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Search state.
#[derive(Debug, Default)]
pub struct SearchState {
    /// Current query text
    pub query: String,

    /// Typing goes to the search bar
    pub focused: bool,

    /// A search request is in flight
    pub searching: bool,

    /// Result count of the last completed search
    pub count: Option<usize>,

    /// Message rendered in place of results (no results / request failed)
    pub message: Option<String>,
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            focused: true,
            ..Default::default()
        }
    }

    /// Add a character to the query.
    pub fn input(&mut self, c: char) {
        self.query.push(c);
    }

    /// Remove the last character from the query.
    pub fn backspace(&mut self) {
        self.query.pop();
    }

    /// The query to submit, if any. Blank queries are ignored.
    pub fn submitted_query(&self) -> Option<String> {
        let query = self.query.trim();
        (!query.is_empty()).then(|| query.to_string())
    }

    /// Record a completed search.
    pub fn set_count(&mut self, count: usize) {
        self.searching = false;
        self.count = Some(count);
        self.message = None;
    }

    /// Record a failed search; the count line is cleared.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.searching = false;
        self.count = None;
        self.message = Some(message.into());
    }
}

/// Render the search bar and the result-count line.
pub fn render_search_bar(frame: &mut Frame, area: Rect, state: &SearchState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Query input
            Constraint::Length(1), // Count line
        ])
        .split(area);

    let border_color = if state.focused {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .title("Search")
        .border_style(Style::default().fg(border_color));

    let cursor_symbol = if state.searching {
        "..."
    } else if state.focused {
        "_"
    } else {
        ""
    };
    let input = Paragraph::new(format!("{}{}", state.query, cursor_symbol))
        .style(Style::default().fg(Color::White))
        .block(input_block);
    frame.render_widget(input, chunks[0]);

    let count_line = match state.count {
        Some(count) => format!("Found {} result(s)", count),
        None => String::new(),
    };
    let count = Paragraph::new(count_line).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(count, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_queries_are_not_submitted() {
        let mut state = SearchState::new();
        assert_eq!(state.submitted_query(), None);

        state.query = String::from("   ");
        assert_eq!(state.submitted_query(), None);

        state.query = String::from("  armin ");
        assert_eq!(state.submitted_query(), Some(String::from("armin")));
    }

    #[test]
    fn failure_message_clears_the_count_line() {
        let mut state = SearchState::new();
        state.set_count(12);
        assert_eq!(state.count, Some(12));

        state.set_message("No results found.");
        assert_eq!(state.count, None);
        assert_eq!(state.message.as_deref(), Some("No results found."));
    }
}
