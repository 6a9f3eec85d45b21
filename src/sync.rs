//! External query representation: where the committed/debounced value goes.
//!
//! Exactly one sync target is active per controller. Callers that supply an
//! `on_change` callback get [`QuerySink::Callback`]; otherwise the
//! controller writes a `q` parameter into a [`LocationParams`] map, with the
//! side effect that a present `page` parameter resets to `"1"` whenever `q`
//! changes.

use url::form_urlencoded;

/// Ordered query-parameter map modeling the navigable location's search
/// string. First-insertion order is preserved across updates so serialized
/// output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationParams {
    pairs: Vec<(String, String)>,
}

impl LocationParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` string ("a=1&b=2").
    /// A leading `?` is tolerated.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    /// First value under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the first occurrence of `name` in place, or append it.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.pairs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.pairs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Serialize back to a form-urlencoded string (no leading `?`).
    pub fn to_query(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.pairs {
            ser.append_pair(k, v);
        }
        ser.finish()
    }

    /// Write the search query: set `q`, and reset a present `page`
    /// parameter to `"1"` (a changed query invalidates pagination).
    pub fn set_query(&mut self, value: &str) {
        self.set("q", value);
        if self.get("page").is_some() {
            self.set("page", "1");
        }
    }

    /// Blank the search query on explicit clear. Only touches `q`, and only
    /// when it is already present; clearing never invents parameters and
    /// never resets pagination.
    pub fn clear_query(&mut self) {
        if self.get("q").is_some() {
            self.set("q", "");
        }
    }
}

/// The controller's one-way outlet for query updates.
pub enum QuerySink {
    /// Caller-supplied change callback.
    Callback(Box<dyn FnMut(&str) + Send>),
    /// Query-parameter map standing in for the navigable location.
    Location(LocationParams),
}

impl QuerySink {
    pub fn callback(f: impl FnMut(&str) + Send + 'static) -> Self {
        Self::Callback(Box::new(f))
    }

    pub fn location(params: LocationParams) -> Self {
        Self::Location(params)
    }

    /// Propagate a (possibly empty) query value.
    pub(crate) fn apply(&mut self, value: &str) {
        match self {
            Self::Callback(f) => f(value),
            Self::Location(params) => params.set_query(value),
        }
    }

    /// Propagate an explicit clear. The location target only blanks an
    /// existing `q`; the callback target is invoked exactly once with `""`.
    pub(crate) fn apply_clear(&mut self) {
        match self {
            Self::Callback(f) => f(""),
            Self::Location(params) => params.clear_query(),
        }
    }

    /// Current location parameters, when this sink targets the location.
    pub fn location_params(&self) -> Option<&LocationParams> {
        match self {
            Self::Location(params) => Some(params),
            Self::Callback(_) => None,
        }
    }
}

impl std::fmt::Debug for QuerySink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("QuerySink::Callback"),
            Self::Location(params) => f.debug_tuple("QuerySink::Location").field(params).finish(),
        }
    }
}
