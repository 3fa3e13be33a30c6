//! Main application state and logic.

use std::time::Instant;

use color_eyre::Result;
use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::action::Action;
use crate::client::api::ClientError;
use crate::client::ArchiveClient;
use crate::config::Config;
use crate::player::{Coordinator, Directive, Player, PlayerEvent};
use crate::ui::{ResultsState, SearchState};

/// Columns at the start of a result row occupied by the play control.
const PLAY_CONTROL_WIDTH: u16 = 5;

/// UI layout areas for mouse handling.
#[derive(Debug, Default, Clone)]
pub struct UiLayout {
    /// Search bar area (input plus count line)
    pub search_bar: Rect,
    /// Results panel area
    pub results: Rect,
    /// Scrub bar row within the now playing panel
    pub scrub_bar: Rect,
}

/// Main application state.
pub struct App {
    /// Whether the app should quit
    pub should_quit: bool,

    /// Configuration
    pub config: Config,

    /// API client
    pub client: Option<ArchiveClient>,

    /// Audio player backend
    pub player: Option<Player>,

    /// Playback session coordinator
    pub coordinator: Coordinator,

    /// Search bar state
    pub search: SearchState,

    /// Result cards state
    pub results: ResultsState,

    /// Error message to display
    pub error_message: Option<String>,

    /// Action sender for async operations
    pub action_tx: mpsc::UnboundedSender<Action>,

    /// UI layout areas for mouse handling
    pub layout: UiLayout,
}

impl App {
    /// Create a new application instance.
    pub fn new(config: Config, action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            should_quit: false,
            config,
            client: None,
            player: None,
            coordinator: Coordinator::new(),
            search: SearchState::new(),
            results: ResultsState::new(),
            error_message: None,
            action_tx,
            layout: UiLayout::default(),
        }
    }

    /// Whether result rows offer inline play controls.
    pub fn play_mode(&self) -> bool {
        self.config.ui.play_mode
    }

    /// Initialize the application.
    pub fn init(&mut self) -> Result<()> {
        if self.config.is_valid() {
            self.client = Some(ArchiveClient::new(&self.config.server.url));
            tracing::info!("Using archive server: {}", self.config.server.url);
        } else {
            self.error_message = Some(String::from(
                "Invalid configuration. Please configure the archive server URL.",
            ));
        }

        if self.play_mode() {
            match Player::new() {
                Ok(player) => {
                    let _ = player.set_volume(self.config.player.volume as f32 / 100.0);
                    self.player = Some(player);
                }
                Err(e) => {
                    tracing::error!("Failed to initialize audio player: {}", e);
                    self.error_message = Some(format!("Audio player error: {}", e));
                }
            }
        }

        Ok(())
    }

    /// Handle an action and update state.
    pub async fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.should_quit = true;
            }

            Action::Tick => {
                // Collect player events first to avoid borrow issues
                let events: Vec<_> = if let Some(player) = &mut self.player {
                    let mut events = Vec::new();
                    while let Some(event) = player.try_recv_event() {
                        events.push(event);
                    }
                    events
                } else {
                    Vec::new()
                };

                for event in events {
                    self.handle_player_event(event);
                }

                self.coordinator.tick(Instant::now());
            }

            Action::Resize(_, _) => {
                // Layout is recomputed on every render
            }

            // Navigation
            Action::NavigateUp => {
                self.results.select_previous();
            }

            Action::NavigateDown => {
                self.results.select_next();
            }

            Action::JumpToTop => {
                self.results.jump_to_top();
            }

            Action::JumpToBottom => {
                self.results.jump_to_bottom();
            }

            Action::Select => {
                if let Some(index) = self.results.selected() {
                    self.toggle_tracklist(index)?;
                }
            }

            Action::Back => {
                // Esc moves between the search bar and the results
                self.search.focused = !self.search.focused;
            }

            // Search
            Action::FocusSearch => {
                self.search.focused = true;
            }

            Action::SearchInput(c) => {
                self.search.input(c);
            }

            Action::SearchBackspace => {
                self.search.backspace();
            }

            Action::SearchSubmit => {
                if let Some(query) = self.search.submitted_query() {
                    self.search.searching = true;
                    self.search.focused = false;
                    self.perform_search(&query).await?;
                }
            }

            Action::SearchResults(results, count) => {
                self.search.set_count(count);
                self.results.set_results(results);
            }

            Action::SearchFailed(message) => {
                self.search.set_message(message);
                self.results.clear();
            }

            // Tracklists
            Action::LoadTracklist(index) => {
                self.load_tracklist(index).await?;
            }

            Action::TracklistLoaded(index, text) => {
                self.results.set_tracklist(index, text);
            }

            // Playback
            Action::TogglePlayback => {
                if let Some(index) = self.results.selected() {
                    self.toggle_playback(index)?;
                }
            }

            // Mouse
            Action::MouseClick(x, y) => {
                self.handle_mouse_click(x, y)?;
            }

            Action::MouseDrag(x, _y) => {
                let fraction = self.scrub_fraction(x);
                let directive = self.coordinator.drag_move(fraction);
                self.dispatch(directive)?;
            }

            Action::MouseUp => {
                self.coordinator.drag_end();
            }

            Action::MouseScroll(delta) => {
                let steps = delta.unsigned_abs() as usize;
                for _ in 0..steps {
                    if delta > 0 {
                        self.results.select_next();
                    } else {
                        self.results.select_previous();
                    }
                }
            }

            // Errors
            Action::ClearError => {
                self.error_message = None;
            }

            Action::None => {}
        }

        Ok(())
    }

    /// Fold a player event into the coordinator.
    fn handle_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Metadata(duration) => {
                self.coordinator.on_metadata(duration);
            }
            PlayerEvent::Progress { position, duration } => {
                self.coordinator.on_progress(position, duration);
            }
            PlayerEvent::Ended => {
                self.coordinator.on_ended();
            }
            PlayerEvent::Error(message) => {
                tracing::error!("Audio playback failed: {}", message);
                self.coordinator.on_error(Instant::now());
            }
        }
    }

    /// Forward coordinator directives to the audio backend.
    fn dispatch(&mut self, directives: impl IntoIterator<Item = Directive>) -> Result<()> {
        let Some(player) = &self.player else {
            return Ok(());
        };

        for directive in directives {
            match directive {
                Directive::Start { url } => player.start(url)?,
                Directive::Pause => player.pause()?,
                Directive::Resume => player.resume()?,
                Directive::Stop => player.stop()?,
                Directive::Seek(position) => player.seek(position)?,
            }
        }
        Ok(())
    }

    /// Toggle playback for the result card at `index`.
    fn toggle_playback(&mut self, index: usize) -> Result<()> {
        if !self.play_mode() {
            return Ok(());
        }

        let Some(client) = &self.client else {
            return Ok(());
        };
        let Some(episode) = self
            .results
            .cards
            .get(index)
            .and_then(|card| card.episode.clone())
        else {
            return Ok(());
        };

        let url = client.audio_url(&episode);
        let directives = self.coordinator.toggle(&episode, url);
        self.dispatch(directives)
    }

    /// Toggle the tracklist block for the result card at `index`,
    /// fetching it on first open.
    fn toggle_tracklist(&mut self, index: usize) -> Result<()> {
        let Some(card) = self.results.cards.get_mut(index) else {
            return Ok(());
        };

        if card.tracklist.is_some() {
            card.expanded = !card.expanded;
        } else if !card.loading {
            card.loading = true;
            self.action_tx.send(Action::LoadTracklist(index))?;
        }
        Ok(())
    }

    /// Handle a left click.
    fn handle_mouse_click(&mut self, x: u16, y: u16) -> Result<()> {
        if self.layout.scrub_bar.contains((x, y).into()) {
            let fraction = self.scrub_fraction(x);
            let directive = self.coordinator.drag_start(fraction);
            return self.dispatch(directive);
        }

        if self.layout.search_bar.contains((x, y).into()) {
            self.search.focused = true;
            return Ok(());
        }

        let results_area = self.layout.results;
        // Clicks on the panel borders map to no card
        if results_area.contains((x, y).into())
            && y > results_area.y
            && y + 1 < results_area.y + results_area.height
        {
            // Account for the panel border
            let row = (y - results_area.y - 1) as usize;
            if let Some(index) = self.results.card_at_row(row) {
                self.results.list_state.select(Some(index));
                self.search.focused = false;

                let on_play_control = x < results_area.x + 1 + PLAY_CONTROL_WIDTH;
                if on_play_control && self.play_mode() {
                    self.toggle_playback(index)?;
                } else {
                    self.toggle_tracklist(index)?;
                }
            }
        }
        Ok(())
    }

    /// Horizontal position within the scrub bar as a fraction. Values
    /// outside the bar clamp at the coordinator.
    fn scrub_fraction(&self, x: u16) -> f64 {
        let bar = self.layout.scrub_bar;
        (x as f64 - bar.x as f64) / bar.width.max(1) as f64
    }

    /// Perform a search.
    async fn perform_search(&mut self, query: &str) -> Result<()> {
        let Some(client) = &self.client else {
            self.action_tx.send(Action::SearchFailed(String::from(
                "An error occurred. Please try again.",
            )))?;
            return Ok(());
        };

        match client.search(query).await {
            Ok((results, count)) => {
                self.action_tx.send(Action::SearchResults(results, count))?;
            }
            Err(ClientError::InvalidResponse(e)) => {
                tracing::error!("Search returned an unusable body: {}", e);
                self.action_tx
                    .send(Action::SearchFailed(String::from("No results found.")))?;
            }
            Err(e) => {
                tracing::error!("Search failed: {}", e);
                self.action_tx.send(Action::SearchFailed(String::from(
                    "An error occurred. Please try again.",
                )))?;
            }
        }
        Ok(())
    }

    /// Fetch the tracklist for the card at `index`. A failed fetch
    /// substitutes placeholder text; there is no retry.
    async fn load_tracklist(&mut self, index: usize) -> Result<()> {
        let Some(hash) = self
            .results
            .cards
            .get(index)
            .map(|card| card.result.episode_hash.clone())
        else {
            return Ok(());
        };

        let Some(client) = &self.client else {
            self.action_tx.send(Action::TracklistLoaded(
                index,
                String::from("Tracklist not available"),
            ))?;
            return Ok(());
        };

        match client.tracklist(&hash).await {
            Ok(text) => {
                self.action_tx.send(Action::TracklistLoaded(index, text))?;
            }
            Err(e) => {
                tracing::warn!("Failed to load tracklist for {}: {}", hash, e);
                self.action_tx.send(Action::TracklistLoaded(
                    index,
                    String::from("Tracklist not available"),
                ))?;
            }
        }
        Ok(())
    }
}
