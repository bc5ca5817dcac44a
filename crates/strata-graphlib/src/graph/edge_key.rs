//! Edge identity.
//!
//! An edge is identified by its source `v`, target `w` and, in multigraphs, an optional `name`.

use std::fmt;

/// Borrowed form of [`EdgeKey`] so lookups by `&str` endpoints don't allocate.
///
/// Hashes exactly like `EdgeKey` (same field order, `Option<&str>` hashes like `Option<String>`).
#[derive(Clone, Copy, Hash)]
pub(in crate::graph) struct EdgeKeyRef<'a> {
    pub(in crate::graph) v: &'a str,
    pub(in crate::graph) w: &'a str,
    pub(in crate::graph) name: Option<&'a str>,
}

impl hashbrown::Equivalent<EdgeKey> for EdgeKeyRef<'_> {
    fn equivalent(&self, key: &EdgeKey) -> bool {
        key.v == self.v && key.w == self.w && key.name.as_deref() == self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub v: String,
    pub w: String,
    pub name: Option<String>,
}

impl EdgeKey {
    pub fn new(
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
    ) -> Self {
        Self {
            v: v.into(),
            w: w.into(),
            name: name.map(Into::into),
        }
    }

    /// Unnamed key `v -> w`.
    pub fn pair(v: impl Into<String>, w: impl Into<String>) -> Self {
        Self::new(v, w, None::<String>)
    }

    pub fn is_self_loop(&self) -> bool {
        self.v == self.w
    }

    /// The same edge identity with endpoints swapped.
    pub fn reversed(&self) -> Self {
        Self {
            v: self.w.clone(),
            w: self.v.clone(),
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} -> {} ({name})", self.v, self.w),
            None => write!(f, "{} -> {}", self.v, self.w),
        }
    }
}
