/* 📖 # Why are query keys plain segment vectors?

A query key names a cached read: `["students", "getAll"]`, or with arguments
`["students", "search", "{\"query\":\"carlsen\"}"]`. Two keys are the same key
exactly when their segments are equal, so they can be rebuilt anywhere without
sharing an instance. Invalidation works on prefixes: invalidating `["students"]`
reaches every read of the student module and nothing else.
*/

use serde::Serialize;

use crate::binding::Params;

/// Ordered, immutable identifier of a cached query result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// The empty key; used to mean "nothing to invalidate".
    pub fn empty() -> Self {
        Self(vec![])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// A new key with one more segment appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// The key a query result is cached under for the given arguments.
    ///
    /// Arguments are appended as one canonical JSON segment (object keys sorted),
    /// so identical arguments always produce identical keys.
    pub fn with_params(&self, params: &Params) -> Self {
        if params.is_empty() {
            return self.clone();
        }
        // serde_json's Map is ordered by key, so this rendering is canonical
        self.child(serde_json::Value::Object(params.clone()).to_string())
    }

    /// True if `self` is a segment prefix of `other` (every key covers itself).
    pub fn covers(&self, other: &QueryKey) -> bool {
        other.0.len() >= self.0.len() && other.0.iter().zip(&self.0).all(|(a, b)| a == b)
    }
}

impl From<&[&str]> for QueryKey {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments.iter().copied())
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (index, segment) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", segment)?;
        }
        write!(f, "]")
    }
}
