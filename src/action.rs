//! Application actions/events that drive state changes.

use crate::client::models::EpisodeResult;

/// Actions that can be dispatched to update application state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Application lifecycle
    Quit,
    Tick,
    Resize(u16, u16),

    // Navigation
    NavigateUp,
    NavigateDown,
    JumpToTop,
    JumpToBottom,
    Select,
    Back,

    // Mouse
    MouseClick(u16, u16),
    MouseDrag(u16, u16),
    MouseUp,
    MouseScroll(i16), // positive = down, negative = up

    // Search
    FocusSearch,
    SearchInput(char),
    SearchBackspace,
    SearchSubmit,
    SearchResults(Vec<EpisodeResult>, usize),
    /// Search failed; carries the message to render in place of results.
    SearchFailed(String),

    // Tracklists
    LoadTracklist(usize),
    TracklistLoaded(usize, String),

    // Playback
    TogglePlayback,

    // Errors
    ClearError,

    // No-op
    None,
}
