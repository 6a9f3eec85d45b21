//! querybar: recent-query cache plus a debounced search-input controller.
//!
//! Two leaf components for a host UI's search box:
//!
//! - [`RecentSearchStore`]: bounded, deduplicated, most-recently-used list
//!   of prior queries under a scope key, persisted as a JSON string array
//!   in an injected key/value [`StorageBackend`].
//! - [`SearchController`]: the interactive state machine: debounced
//!   propagation of typed text to an external query representation
//!   ([`QuerySink`]), an open/closed suggestion surface, and the commit
//!   protocol (typing pause, Enter, suggestion selection) versus clear.
//!
//! Timers are deadlines in the model, fired by an explicit tick, so hosts
//! integrate with any event loop and tests run without sleeping.
//!
//! Every failure mode degrades: storage corruption loads as an empty
//! history, write refusal keeps prior persisted state, empty queries are
//! never stored. Nothing here raises to the caller.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//! use querybar::{MemoryStorage, QuerySink, SearchConfig, SearchController, SearchEvent};
//!
//! let storage = Arc::new(MemoryStorage::new());
//! let mut search = SearchController::new(
//!     SearchConfig {
//!         storage_key: Some("cluster-a".into()),
//!         ..SearchConfig::default()
//!     },
//!     storage,
//!     QuerySink::callback(|q| println!("query is now {q:?}")),
//! );
//!
//! let t = Instant::now();
//! search.handle(SearchEvent::Input("kaf".into()), t);
//! // ... half a second of quiet later, the host's tick fires the debounce:
//! search.handle(SearchEvent::Tick, t + Duration::from_millis(500));
//! ```

pub mod controller;
pub mod recent;
pub mod storage;
pub mod sync;

pub use controller::{
    BLUR_CLOSE_DELAY, DEBOUNCE, SearchConfig, SearchController, SearchEvent, Surface, SurfaceView,
};
pub use recent::{DEFAULT_MAX_RECENT, RecentSearchStore};
pub use storage::{FileStorage, MemoryStorage, StorageBackend, StorageError};
pub use sync::{LocationParams, QuerySink};
