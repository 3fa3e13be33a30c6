//! Playback coordinator: single-flight audio session bookkeeping.
//!
//! The coordinator owns at most one live [`Session`] and mediates
//! play/pause/seek requests coming from any number of per-result play
//! controls. It performs no I/O: callers feed it toggles and backend
//! events, and it answers with [`Directive`]s for the audio backend plus
//! queryable visual state (icon, progress ring, scrub bar, error banner).
//!
//! Per session slot the phases run
//! `Idle -> Loading -> Playing <-> Paused -> Ended|Errored -> Idle`,
//! where `Loading` spans resource construction up to the first metadata
//! or progress event. The error banner outlives the session: the session
//! clears immediately on error while the banner hides on its own after a
//! fixed display window.

use std::time::{Duration, Instant};

/// How long the audio error banner stays visible.
const ERROR_BANNER_WINDOW: Duration = Duration::from_secs(3);

/// Stroke offset of an empty progress ring.
const RING_EMPTY: f64 = 100.0;

/// Playback phase of the live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Resource constructed, no metadata or progress seen yet.
    Loading,
    Playing,
    Paused,
}

/// Bookkeeping for the single live audio resource and its bound control.
#[derive(Debug, Clone)]
pub struct Session {
    /// Episode number the audio URL was built from.
    pub episode: String,

    pub phase: SessionPhase,

    /// Playback clock.
    pub position: Duration,

    /// Total time; unknown until the metadata event arrives.
    pub duration: Option<Duration>,

    /// A scrub drag is in progress.
    dragging: bool,
}

impl Session {
    fn new(episode: &str) -> Self {
        Self {
            episode: episode.to_string(),
            phase: SessionPhase::Loading,
            position: Duration::ZERO,
            duration: None,
            dragging: false,
        }
    }
}

/// Instructions for the audio backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Construct a fresh media resource and start playback.
    Start { url: String },
    Pause,
    Resume,
    /// Tear down the current resource.
    Stop,
    Seek(Duration),
}

/// Owner of the single "current session" slot.
#[derive(Debug, Default)]
pub struct Coordinator {
    session: Option<Session>,

    /// When the error banner was shown. Kept apart from `session` so a
    /// late expiry check on an already-hidden banner is a no-op.
    error_shown_at: Option<Instant>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a play-control click for `episode`.
    ///
    /// A different live episode is preempted without confirmation; the
    /// same episode flips play/pause in place without constructing a
    /// second resource. Clicking is also the retry path after an error,
    /// so a visible banner is dismissed right away.
    pub fn toggle(&mut self, episode: &str, url: String) -> Vec<Directive> {
        self.error_shown_at = None;

        match &mut self.session {
            Some(session) if session.episode == episode => match session.phase {
                SessionPhase::Playing | SessionPhase::Loading => {
                    session.phase = SessionPhase::Paused;
                    vec![Directive::Pause]
                }
                SessionPhase::Paused => {
                    session.phase = SessionPhase::Playing;
                    vec![Directive::Resume]
                }
            },
            Some(_) => {
                self.session = Some(Session::new(episode));
                vec![Directive::Stop, Directive::Start { url }]
            }
            None => {
                self.session = Some(Session::new(episode));
                vec![Directive::Start { url }]
            }
        }
    }

    /// Fold a progress report from the backend into the session.
    pub fn on_progress(&mut self, position: Duration, duration: Option<Duration>) {
        if let Some(session) = &mut self.session {
            if session.phase == SessionPhase::Loading {
                session.phase = SessionPhase::Playing;
            }
            // While dragging, the optimistic drag position wins over the
            // backend echo.
            if !session.dragging {
                session.position = position;
            }
            if session.duration.is_none() {
                session.duration = duration;
            }
        }
    }

    /// Metadata arrived: total time is known, the progress panel becomes
    /// visible and the scrub bar is armed for seeking.
    pub fn on_metadata(&mut self, duration: Duration) {
        if let Some(session) = &mut self.session {
            session.duration = Some(duration);
            if session.phase == SessionPhase::Loading {
                session.phase = SessionPhase::Playing;
            }
        }
    }

    /// Playback ran to completion; the next toggle starts fresh rather
    /// than resuming.
    pub fn on_ended(&mut self) {
        self.session = None;
    }

    /// The resource failed to load or play. The session clears at once;
    /// the banner hides on its own after the display window.
    pub fn on_error(&mut self, now: Instant) {
        self.session = None;
        self.error_shown_at = Some(now);
    }

    /// Expire the error banner. Called every tick.
    pub fn tick(&mut self, now: Instant) {
        if let Some(shown) = self.error_shown_at {
            if now.duration_since(shown) >= ERROR_BANNER_WINDOW {
                self.error_shown_at = None;
            }
        }
    }

    pub fn error_banner_visible(&self) -> bool {
        self.error_shown_at.is_some()
    }

    /// Pointer-down on the scrub bar: start dragging and seek.
    pub fn drag_start(&mut self, fraction: f64) -> Option<Directive> {
        if let Some(session) = &mut self.session {
            session.dragging = true;
        }
        self.seek_to_fraction(fraction)
    }

    /// Pointer-move while dragging.
    pub fn drag_move(&mut self, fraction: f64) -> Option<Directive> {
        if self.session.as_ref().is_some_and(|s| s.dragging) {
            self.seek_to_fraction(fraction)
        } else {
            None
        }
    }

    /// Pointer-up ends the drag.
    pub fn drag_end(&mut self) {
        if let Some(session) = &mut self.session {
            session.dragging = false;
        }
    }

    /// Seek to a position fraction, clamped to `[0, 1]`. The fill and
    /// handle move immediately rather than waiting for the next progress
    /// echo. Returns `None` until metadata has armed the scrub bar.
    pub fn seek_to_fraction(&mut self, fraction: f64) -> Option<Directive> {
        let session = self.session.as_mut()?;
        let duration = session.duration?;
        let target = duration.mul_f64(fraction.clamp(0.0, 1.0));
        session.position = target;
        Some(Directive::Seek(target))
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether the control bound to `episode` shows the "playing" icon.
    /// The icon flips as soon as playback is requested, so `Loading`
    /// counts as playing.
    pub fn is_playing(&self, episode: &str) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.episode == episode && s.phase != SessionPhase::Paused)
    }

    /// Fractional playback position, zero when idle or before metadata.
    pub fn progress(&self) -> f64 {
        let Some(session) = &self.session else {
            return 0.0;
        };
        match session.duration {
            Some(duration) if !duration.is_zero() => {
                (session.position.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// Stroke offset driving the progress ring: `100 - percent`, so an
    /// idle or freshly-reset ring sits at 100.
    pub fn ring_offset(&self) -> f64 {
        RING_EMPTY - self.progress() * 100.0
    }

    /// Fill width of the scrub bar, in percent. The handle sits at the
    /// same offset.
    pub fn scrub_fill_percent(&self) -> f64 {
        self.progress() * 100.0
    }

    /// The progress panel shows once metadata is known and hides when
    /// the session ends, errors, or is preempted.
    pub fn panel_visible(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.duration.is_some())
    }

    pub fn elapsed_label(&self) -> String {
        format_time(self.session.as_ref().map(|s| s.position))
    }

    pub fn total_label(&self) -> String {
        format_time(self.session.as_ref().and_then(|s| s.duration))
    }
}

/// Format a playback clock as `m:ss`; unknown values render as `0:00`.
pub fn format_time(value: Option<Duration>) -> String {
    let secs = value.map(|v| v.as_secs()).unwrap_or(0);
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(episode: &str) -> String {
        format!("/asot/audio?episode={episode}")
    }

    #[test]
    fn first_toggle_starts_a_fresh_resource() {
        let mut coordinator = Coordinator::new();
        let directives = coordinator.toggle("950", url("950"));

        assert_eq!(
            directives,
            vec![Directive::Start {
                url: String::from("/asot/audio?episode=950")
            }]
        );
        assert!(coordinator.is_playing("950"));
        assert_eq!(coordinator.session().unwrap().phase, SessionPhase::Loading);
    }

    #[test]
    fn same_episode_flips_in_place_without_second_resource() {
        let mut coordinator = Coordinator::new();
        coordinator.toggle("950", url("950"));
        coordinator.on_metadata(Duration::from_secs(200));

        let pause = coordinator.toggle("950", url("950"));
        assert_eq!(pause, vec![Directive::Pause]);
        assert!(!coordinator.is_playing("950"));

        let resume = coordinator.toggle("950", url("950"));
        assert_eq!(resume, vec![Directive::Resume]);
        assert!(coordinator.is_playing("950"));

        let starts = [&pause[..], &resume[..]]
            .concat()
            .iter()
            .filter(|d| matches!(d, Directive::Start { .. }))
            .count();
        assert_eq!(starts, 0);
    }

    #[test]
    fn different_episode_preempts_the_live_session() {
        let mut coordinator = Coordinator::new();
        coordinator.toggle("900", url("900"));
        coordinator.on_metadata(Duration::from_secs(100));
        coordinator.on_progress(Duration::from_secs(50), None);

        let directives = coordinator.toggle("950", url("950"));
        assert_eq!(
            directives,
            vec![
                Directive::Stop,
                Directive::Start {
                    url: String::from("/asot/audio?episode=950")
                }
            ]
        );

        // Exactly one control reports playing, and the old session's
        // visuals are reset along with it.
        assert!(!coordinator.is_playing("900"));
        assert!(coordinator.is_playing("950"));
        assert_eq!(coordinator.ring_offset(), 100.0);
        assert!(!coordinator.panel_visible());
    }

    #[test]
    fn progress_drives_ring_and_scrub_bar() {
        let mut coordinator = Coordinator::new();
        coordinator.toggle("950", url("950"));
        coordinator.on_metadata(Duration::from_secs(200));
        coordinator.on_progress(Duration::from_secs(50), None);

        assert_eq!(coordinator.session().unwrap().phase, SessionPhase::Playing);
        assert_eq!(coordinator.ring_offset(), 75.0);
        assert_eq!(coordinator.scrub_fill_percent(), 25.0);
        assert_eq!(coordinator.elapsed_label(), "0:50");
        assert_eq!(coordinator.total_label(), "3:20");
        assert!(coordinator.panel_visible());
    }

    #[test]
    fn ended_resets_ring_and_hides_panel() {
        let mut coordinator = Coordinator::new();
        coordinator.toggle("950", url("950"));
        coordinator.on_metadata(Duration::from_secs(200));
        coordinator.on_progress(Duration::from_secs(200), None);

        coordinator.on_ended();
        assert!(coordinator.session().is_none());
        assert_eq!(coordinator.ring_offset(), 100.0);
        assert!(!coordinator.panel_visible());

        // Next click starts fresh rather than resuming.
        let directives = coordinator.toggle("950", url("950"));
        assert!(matches!(directives[0], Directive::Start { .. }));
    }

    #[test]
    fn error_clears_session_and_banner_expires_on_its_own() {
        let mut coordinator = Coordinator::new();
        coordinator.toggle("950", url("950"));

        let shown = Instant::now();
        coordinator.on_error(shown);
        assert!(coordinator.session().is_none());
        assert!(coordinator.error_banner_visible());
        assert_eq!(coordinator.ring_offset(), 100.0);

        // Interaction inside the window does not extend it.
        coordinator.drag_move(0.5);
        coordinator.tick(shown + Duration::from_secs(1));
        assert!(coordinator.error_banner_visible());

        coordinator.tick(shown + Duration::from_secs(3));
        assert!(!coordinator.error_banner_visible());

        // Expiring an already-hidden banner is a no-op.
        coordinator.tick(shown + Duration::from_secs(10));
        assert!(!coordinator.error_banner_visible());
    }

    #[test]
    fn retry_click_dismisses_banner_and_builds_fresh_resource() {
        let mut coordinator = Coordinator::new();
        coordinator.toggle("950", url("950"));
        coordinator.on_error(Instant::now());

        let directives = coordinator.toggle("950", url("950"));
        assert!(!coordinator.error_banner_visible());
        assert_eq!(
            directives,
            vec![Directive::Start {
                url: String::from("/asot/audio?episode=950")
            }]
        );
    }

    #[test]
    fn drag_to_half_seeks_to_half_the_duration() {
        let mut coordinator = Coordinator::new();
        coordinator.toggle("950", url("950"));
        coordinator.on_metadata(Duration::from_secs(200));

        let directive = coordinator.drag_start(0.5);
        assert_eq!(directive, Some(Directive::Seek(Duration::from_secs(100))));
        assert_eq!(coordinator.scrub_fill_percent(), 50.0);

        // Moves while dragging keep seeking; the backend echo does not
        // overwrite the optimistic position.
        coordinator.on_progress(Duration::from_secs(10), None);
        assert_eq!(coordinator.scrub_fill_percent(), 50.0);

        let directive = coordinator.drag_move(0.25);
        assert_eq!(directive, Some(Directive::Seek(Duration::from_secs(50))));

        coordinator.drag_end();
        coordinator.on_progress(Duration::from_secs(60), None);
        assert_eq!(coordinator.scrub_fill_percent(), 30.0);
    }

    #[test]
    fn seek_fraction_is_clamped() {
        let mut coordinator = Coordinator::new();
        coordinator.toggle("950", url("950"));
        coordinator.on_metadata(Duration::from_secs(100));

        assert_eq!(
            coordinator.seek_to_fraction(1.5),
            Some(Directive::Seek(Duration::from_secs(100)))
        );
        assert_eq!(
            coordinator.seek_to_fraction(-0.2),
            Some(Directive::Seek(Duration::ZERO))
        );
    }

    #[test]
    fn scrub_bar_is_not_armed_before_metadata() {
        let mut coordinator = Coordinator::new();
        coordinator.toggle("950", url("950"));

        assert_eq!(coordinator.seek_to_fraction(0.5), None);
        assert_eq!(coordinator.drag_start(0.5), None);
    }

    #[test]
    fn formats_time_with_zero_fallback() {
        assert_eq!(format_time(None), "0:00");
        assert_eq!(format_time(Some(Duration::from_secs(61))), "1:01");
        assert_eq!(format_time(Some(Duration::from_secs(605))), "10:05");
    }
}
