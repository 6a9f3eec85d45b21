//! Search-input state machine: debounced propagation, open/closed suggestion
//! surface, and the commit protocol against [`RecentSearchStore`].
//!
//! The controller is side-effect free except for its two collaborators (the
//! store and the [`QuerySink`]); rendering lives elsewhere and consumes the
//! view accessors. Timers are plain deadlines held in the model and fired by
//! an explicit [`SearchEvent::Tick`], so tests drive time with `Instant`
//! arithmetic instead of sleeping, and dropping the controller cancels
//! everything; a stale timer can never outlive the instance.
//!
//! # Interaction contract
//!
//! | Event                  | Behavior                                           |
//! |------------------------|----------------------------------------------------|
//! | Focus                  | Empty value + persistence + enabled → refresh, open |
//! | Input                  | Re-arm debounce; non-empty value closes surface     |
//! | Tick (debounce due)    | Propagate last value once; non-empty keeps closed   |
//! | Enter                  | Persist (if configured), close                      |
//! | Blur                   | Persist (if configured), arm delayed close          |
//! | PointerDownOnSurface   | Cancel the pending delayed close                    |
//! | Select                 | Persist, set value, propagate immediately, close    |
//! | Clear                  | Blank value, propagate clear, refresh + reopen      |
//! | RemoveEntry / ClearAll | Mutate store, refresh rendered list, state unchanged|
//!
//! The blur-close delay exists for event-ordering, not aesthetics: a
//! pointer-down on the suggestion surface fires before the input's blur
//! completes its close, so the close is deferred long enough for the
//! pointer-down to cancel it and for the click's select/remove to land.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::recent::{DEFAULT_MAX_RECENT, RecentSearchStore};
use crate::storage::StorageBackend;
use crate::sync::QuerySink;

/// Quiescence window after the last keystroke before the value propagates.
pub const DEBOUNCE: Duration = Duration::from_millis(500);
/// Grace period between blur and the surface actually closing.
pub const BLUR_CLOSE_DELAY: Duration = Duration::from_millis(150);

const RECENT_HEADER: &str = "Recent";
const CLEAR_ALL_LABEL: &str = "Clear all";
const REMOVE_LABEL: &str = "Remove";

/// Static configuration for one controller instance.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Display text for the empty input.
    pub placeholder: String,
    /// Suppresses the suggestion surface and the clear affordance. Does not
    /// gate persistence; that is `persist_on_type`'s job.
    pub disabled: bool,
    /// Externally controlled initial value. When absent and the sink is a
    /// location, the location's current `q` seeds the input.
    pub value: Option<String>,
    /// Scope key for recent-search persistence; `None` disables it.
    pub storage_key: Option<String>,
    /// Retention cap for the recent list.
    pub max_recent: usize,
    /// Whether Enter/blur commits persist the current value.
    pub persist_on_type: bool,
    /// Hint shown in the surface when the recent list is empty.
    pub empty_recent_text: String,
    /// Keystroke quiescence window.
    pub debounce: Duration,
    /// Blur-to-close grace period.
    pub close_delay: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            placeholder: "Search".to_string(),
            disabled: false,
            value: None,
            storage_key: None,
            max_recent: DEFAULT_MAX_RECENT,
            persist_on_type: true,
            empty_recent_text: "No recent searches".to_string(),
            debounce: DEBOUNCE,
            close_delay: BLUR_CLOSE_DELAY,
        }
    }
}

/// Suggestion-surface visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Closed,
    Open,
}

/// Everything that can happen to the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// Input gained focus.
    Focus,
    /// Visible value changed to the contained text.
    Input(String),
    /// Commit via Enter.
    Enter,
    /// Input lost focus.
    Blur,
    /// Explicit clear affordance activated.
    Clear,
    /// A suggestion entry was picked.
    Select(String),
    /// A single suggestion entry's remove control was activated.
    RemoveEntry(String),
    /// The surface's clear-all control was activated.
    ClearAll,
    /// Pointer-down landed anywhere on the suggestion surface. Fires before
    /// blur's deferred close and suppresses it.
    PointerDownOnSurface,
    /// Clock tick; fires any expired deadline.
    Tick,
}

/// What a renderer should draw for the suggestion surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceView<'a> {
    /// Non-empty history: header row plus one row per entry, each with a
    /// remove control, and a clear-all control in the header.
    Recent {
        header: &'static str,
        entries: &'a [String],
        clear_all_label: &'static str,
        remove_label: &'static str,
    },
    /// Empty history: just the configured hint.
    Empty { hint: &'a str },
}

/// Debounced search input with recent-query suggestions.
///
/// Construct with a storage backend and a sink, feed it [`SearchEvent`]s
/// with the current time, and call [`handle`](Self::handle) with
/// [`SearchEvent::Tick`] on whatever cadence the host event loop has.
pub struct SearchController {
    config: SearchConfig,
    store: RecentSearchStore,
    sink: QuerySink,
    value: String,
    surface: Surface,
    /// Cached copy of the recent list for rendering; possibly stale until
    /// the next refresh point (focus, clear, or a store mutation).
    recent: Vec<String>,
    debounce_deadline: Option<Instant>,
    close_deadline: Option<Instant>,
}

impl SearchController {
    pub fn new(config: SearchConfig, storage: Arc<dyn StorageBackend>, sink: QuerySink) -> Self {
        let store = RecentSearchStore::new(storage, config.storage_key.clone())
            .with_max_recent(config.max_recent);
        let value = config
            .value
            .clone()
            .or_else(|| {
                sink.location_params()
                    .and_then(|p| p.get("q"))
                    .map(str::to_string)
            })
            .unwrap_or_default();
        Self {
            config,
            store,
            sink,
            value,
            surface: Surface::Closed,
            recent: Vec::new(),
            debounce_deadline: None,
            close_deadline: None,
        }
    }

    // -- View accessors ---------------------------------------------------

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn placeholder(&self) -> &str {
        &self.config.placeholder
    }

    pub fn is_open(&self) -> bool {
        self.surface == Surface::Open
    }

    /// Whether the clear affordance should render. Derived, never stored:
    /// non-empty visible value and not disabled.
    pub fn shows_clear(&self) -> bool {
        !self.value.is_empty() && !self.config.disabled
    }

    /// Cached recent list as last refreshed.
    pub fn recent(&self) -> &[String] {
        &self.recent
    }

    /// Surface contents, or `None` when closed or persistence is disabled.
    pub fn surface(&self) -> Option<SurfaceView<'_>> {
        if self.surface == Surface::Closed || !self.store.is_enabled() {
            return None;
        }
        Some(if self.recent.is_empty() {
            SurfaceView::Empty {
                hint: &self.config.empty_recent_text,
            }
        } else {
            SurfaceView::Recent {
                header: RECENT_HEADER,
                entries: &self.recent,
                clear_all_label: CLEAR_ALL_LABEL,
                remove_label: REMOVE_LABEL,
            }
        })
    }

    /// Next moment at which a [`SearchEvent::Tick`] has work to do. Hosts
    /// with timer wheels can schedule exactly one wakeup from this.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.debounce_deadline, self.close_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // -- Event handling ---------------------------------------------------

    /// Advance the state machine. `now` is the host's current monotonic
    /// time; all deadlines are computed and compared against it.
    pub fn handle(&mut self, event: SearchEvent, now: Instant) {
        trace!(?event, "search event");
        match event {
            SearchEvent::Focus => {
                if !self.config.disabled && self.value.is_empty() && self.store.is_enabled() {
                    self.recent = self.store.refresh();
                    self.surface = Surface::Open;
                } else {
                    self.surface = Surface::Closed;
                }
            }

            SearchEvent::Input(text) => {
                self.value = text;
                // Typing suppresses suggestions without waiting for the
                // debounce to fire.
                if !self.config.disabled && !self.value.is_empty() {
                    self.surface = Surface::Closed;
                }
                // Every keystroke re-arms the window; only the value alive
                // when it expires ever reaches the sink.
                self.debounce_deadline = Some(now + self.config.debounce);
            }

            SearchEvent::Enter => {
                if self.config.persist_on_type {
                    self.recent = self.store.save(&self.value);
                }
                self.surface = Surface::Closed;
            }

            SearchEvent::Blur => {
                if self.config.persist_on_type {
                    self.recent = self.store.save(&self.value);
                }
                // Deferred, not immediate: a pointer-down on the surface
                // must still be able to land before the close.
                self.close_deadline = Some(now + self.config.close_delay);
            }

            SearchEvent::PointerDownOnSurface => {
                self.close_deadline = None;
            }

            SearchEvent::Select(entry) => {
                self.recent = self.store.save(&entry);
                self.value = entry;
                // Selection commits immediately; a pending debounce from
                // earlier typing must not re-propagate stale text.
                self.debounce_deadline = None;
                self.close_deadline = None;
                self.sink.apply(&self.value);
                self.surface = Surface::Closed;
            }

            SearchEvent::Clear => {
                self.value.clear();
                self.debounce_deadline = None;
                self.sink.apply_clear();
                if !self.config.disabled && self.store.is_enabled() {
                    self.recent = self.store.refresh();
                    self.surface = Surface::Open;
                }
            }

            SearchEvent::RemoveEntry(entry) => {
                self.recent = self.store.remove(&entry);
            }

            SearchEvent::ClearAll => {
                self.recent = self.store.clear();
            }

            SearchEvent::Tick => {
                if let Some(deadline) = self.debounce_deadline
                    && now >= deadline
                {
                    self.debounce_deadline = None;
                    let value = self.value.clone();
                    self.sink.apply(&value);
                    if !self.value.is_empty() {
                        self.surface = Surface::Closed;
                    }
                }
                if let Some(deadline) = self.close_deadline
                    && now >= deadline
                {
                    self.close_deadline = None;
                    self.surface = Surface::Closed;
                }
            }
        }
    }

    /// Location parameters of the sink, when it targets the location.
    pub fn location_params(&self) -> Option<&crate::sync::LocationParams> {
        self.sink.location_params()
    }
}
