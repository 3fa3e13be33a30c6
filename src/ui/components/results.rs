//! Search result cards with lazily loaded tracklists.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::client::models::EpisodeResult;
use crate::player::Coordinator;

/// A result row plus its lazily fetched tracklist.
#[derive(Debug)]
pub struct ResultCard {
    pub result: EpisodeResult,

    /// Episode number extracted from the title; rows without one get no
    /// play control.
    pub episode: Option<String>,

    /// Tracklist text, cached after the first fetch.
    pub tracklist: Option<String>,

    /// Tracklist block is open.
    pub expanded: bool,

    /// Tracklist fetch in flight.
    pub loading: bool,
}

impl ResultCard {
    fn new(result: EpisodeResult) -> Self {
        let episode = result.episode_number().map(str::to_string);
        Self {
            result,
            episode,
            tracklist: None,
            expanded: false,
            loading: false,
        }
    }

    /// Rendered height in rows.
    pub fn height(&self) -> usize {
        let mut height = 1;
        if self.loading {
            height += 1;
        }
        if self.expanded {
            if let Some(tracklist) = &self.tracklist {
                height += tracklist.lines().count().max(1);
            }
        }
        height
    }
}

/// Result list state.
#[derive(Debug, Default)]
pub struct ResultsState {
    pub cards: Vec<ResultCard>,

    /// Selection state for UI
    pub list_state: ListState,
}

impl ResultsState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the result set.
    pub fn set_results(&mut self, results: Vec<EpisodeResult>) {
        self.cards = results.into_iter().map(ResultCard::new).collect();
        if self.cards.is_empty() {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(0));
        }
        *self.list_state.offset_mut() = 0;
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.list_state.select(None);
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected().filter(|i| *i < self.cards.len())
    }

    /// Store a fetched tracklist and open the block.
    pub fn set_tracklist(&mut self, index: usize, text: String) {
        if let Some(card) = self.cards.get_mut(index) {
            card.tracklist = Some(text);
            card.loading = false;
            card.expanded = true;
        }
    }

    /// Move selection up.
    pub fn select_previous(&mut self) {
        let len = self.cards.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i > 0 => i - 1,
            Some(_) => len - 1,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Move selection down.
    pub fn select_next(&mut self) {
        let len = self.cards.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i < len - 1 => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn jump_to_top(&mut self) {
        if !self.cards.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn jump_to_bottom(&mut self) {
        if !self.cards.is_empty() {
            self.list_state.select(Some(self.cards.len() - 1));
        }
    }

    /// Map a row inside the list area to the card occupying it, taking
    /// scroll offset and expanded tracklists into account.
    pub fn card_at_row(&self, row: usize) -> Option<usize> {
        let mut consumed = 0;
        for (index, card) in self.cards.iter().enumerate().skip(self.list_state.offset()) {
            consumed += card.height();
            if row < consumed {
                return Some(index);
            }
        }
        None
    }
}

/// Glyph for the progress ring, driven by the stroke offset
/// (100 = empty, 0 = full).
fn ring_glyph(offset: f64) -> &'static str {
    match offset {
        o if o <= 12.5 => "●",
        o if o <= 37.5 => "◕",
        o if o <= 62.5 => "◑",
        o if o <= 87.5 => "◔",
        _ => "○",
    }
}

/// Render the result cards, or the message card when the last search
/// failed.
pub fn render_results(
    frame: &mut Frame,
    area: Rect,
    state: &mut ResultsState,
    coordinator: &Coordinator,
    play_mode: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Results")
        .border_style(Style::default().fg(Color::Blue));

    let items: Vec<ListItem> = state
        .cards
        .iter()
        .map(|card| result_item(card, coordinator, play_mode))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut state.list_state);
}

/// Render a message in place of the result list.
pub fn render_results_message(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Results")
        .border_style(Style::default().fg(Color::Blue));

    let paragraph = Paragraph::new(message)
        .style(Style::default().fg(Color::DarkGray))
        .block(block);
    frame.render_widget(paragraph, area);
}

fn result_item<'a>(card: &'a ResultCard, coordinator: &Coordinator, play_mode: bool) -> ListItem<'a> {
    let mut lines = Vec::with_capacity(card.height());

    let mut spans = Vec::new();
    if play_mode {
        if let Some(episode) = &card.episode {
            let (icon, ring) = if coordinator.is_playing(episode) {
                ("⏸", ring_glyph(coordinator.ring_offset()))
            } else if coordinator.session().is_some_and(|s| &s.episode == episode) {
                ("▶", ring_glyph(coordinator.ring_offset()))
            } else {
                ("▶", ring_glyph(100.0))
            };
            spans.push(Span::styled(
                format!("{icon} {ring} "),
                Style::default().fg(Color::Green),
            ));
        } else {
            spans.push(Span::raw("    "));
        }
    }
    spans.push(Span::styled(
        card.result.title.as_str(),
        Style::default().fg(Color::White),
    ));
    lines.push(Line::from(spans));

    if card.loading {
        lines.push(Line::from(Span::styled(
            "  Loading tracklist...",
            Style::default().fg(Color::DarkGray),
        )));
    }

    if card.expanded {
        if let Some(tracklist) = &card.tracklist {
            // An empty tracklist still occupies the row the height
            // accounting reserved for it.
            if tracklist.lines().next().is_none() {
                lines.push(Line::from(""));
            }
            for line in tracklist.lines() {
                lines.push(Line::from(Span::styled(
                    format!("  {}", line),
                    Style::default().fg(Color::Cyan),
                )));
            }
        }
    }

    ListItem::new(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str) -> EpisodeResult {
        EpisodeResult {
            title: title.to_string(),
            episode_hash: String::from("hash"),
        }
    }

    #[test]
    fn only_episode_titles_get_play_controls() {
        let mut state = ResultsState::new();
        state.set_results(vec![
            result("ASOT 950 - Tracklist"),
            result("A State of Trance yearmix"),
            result("asot 1005: special"),
        ]);

        let episodes: Vec<Option<&str>> = state
            .cards
            .iter()
            .map(|card| card.episode.as_deref())
            .collect();
        assert_eq!(episodes, vec![Some("950"), None, Some("1005")]);
        assert_eq!(state.selected(), Some(0));
    }

    #[test]
    fn expanded_tracklist_grows_the_card() {
        let mut state = ResultsState::new();
        state.set_results(vec![result("ASOT 950")]);
        assert_eq!(state.cards[0].height(), 1);

        state.set_tracklist(0, String::from("0:00\tIntro\n5:00\tSecond track"));
        assert_eq!(state.cards[0].height(), 3);
        assert!(state.cards[0].expanded);
    }

    #[test]
    fn maps_rows_to_cards_across_expanded_blocks() {
        let mut state = ResultsState::new();
        state.set_results(vec![result("ASOT 1"), result("ASOT 2"), result("ASOT 3")]);
        state.set_tracklist(0, String::from("a\nb"));

        // Card 0 spans rows 0-2, card 1 row 3, card 2 row 4.
        assert_eq!(state.card_at_row(0), Some(0));
        assert_eq!(state.card_at_row(2), Some(0));
        assert_eq!(state.card_at_row(3), Some(1));
        assert_eq!(state.card_at_row(4), Some(2));
        assert_eq!(state.card_at_row(5), None);
    }

    #[test]
    fn selection_wraps() {
        let mut state = ResultsState::new();
        state.set_results(vec![result("ASOT 1"), result("ASOT 2")]);

        state.select_previous();
        assert_eq!(state.selected(), Some(1));
        state.select_next();
        assert_eq!(state.selected(), Some(0));
    }
}
