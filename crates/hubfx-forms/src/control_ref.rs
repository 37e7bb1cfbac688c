//! # Control paths
//!
//! A `ControlRef` locates a control from the tree root: group members are
//! addressed by name, array elements by index. The empty path is the root.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pattern segment matching any array index.
pub const WILDCARD: &str = "*";

/// One path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlKey {
    /// Array element index
    Index(usize),
    /// Group member name
    Name(String),
}

impl ControlKey {
    /// True for the `"*"` pattern segment.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, ControlKey::Name(name) if name == WILDCARD)
    }
}

impl From<usize> for ControlKey {
    fn from(index: usize) -> Self {
        ControlKey::Index(index)
    }
}

impl From<&str> for ControlKey {
    fn from(name: &str) -> Self {
        ControlKey::Name(name.to_string())
    }
}

impl From<String> for ControlKey {
    fn from(name: String) -> Self {
        ControlKey::Name(name)
    }
}

impl fmt::Display for ControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlKey::Index(index) => write!(f, "{index}"),
            ControlKey::Name(name) => f.write_str(name),
        }
    }
}

/// Absolute path of a control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlRef(Vec<ControlKey>);

/// Build a [`ControlRef`] from names and indices.
///
/// ```
/// use hubfx_forms::{control_ref, ControlKey};
///
/// let path = control_ref!["emergencyContacts", 1, "email"];
/// assert_eq!(path.segments()[1], ControlKey::Index(1));
/// ```
#[macro_export]
macro_rules! control_ref {
    () => {
        $crate::ControlRef::root()
    };
    ($($segment:expr),+ $(,)?) => {
        $crate::ControlRef::new(vec![$($crate::ControlKey::from($segment)),+])
    };
}

impl ControlRef {
    /// Path from explicit segments.
    pub fn new(segments: Vec<ControlKey>) -> Self {
        Self(segments)
    }

    /// The empty path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// True for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Path segments.
    pub fn segments(&self) -> &[ControlKey] {
        &self.0
    }

    /// Final segment, if any.
    pub fn last(&self) -> Option<&ControlKey> {
        self.0.last()
    }

    /// Path of the parent control; `None` at the root.
    pub fn parent(&self) -> Option<ControlRef> {
        self.0
            .split_last()
            .map(|(_, parent)| ControlRef(parent.to_vec()))
    }

    /// Path extended by one segment.
    pub fn child(&self, key: impl Into<ControlKey>) -> ControlRef {
        let mut segments = self.0.clone();
        segments.push(key.into());
        ControlRef(segments)
    }

    /// Scope key for this path: segments joined with `:`.
    pub fn key(&self) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(":")
    }

    /// Whether this path lies under `pattern`.
    ///
    /// Every pattern segment must equal the corresponding segment of this
    /// path; a `"*"` pattern segment matches any index.
    pub fn is_child_of(&self, pattern: &ControlRef) -> bool {
        pattern.0.len() <= self.0.len()
            && pattern.0.iter().zip(&self.0).all(|(expected, actual)| {
                if expected.is_wildcard() {
                    matches!(actual, ControlKey::Index(_))
                } else {
                    expected == actual
                }
            })
    }

    /// Rewrite the segment following `array_ref` to `index`, keeping the
    /// deeper segments.
    pub(crate) fn reindexed(&self, array_ref: &ControlRef, index: usize) -> ControlRef {
        let depth = array_ref.len();
        let mut segments = Vec::with_capacity(self.0.len().max(depth + 1));
        segments.extend_from_slice(array_ref.segments());
        segments.push(ControlKey::Index(index));
        segments.extend(self.0.iter().skip(depth + 1).cloned());
        ControlRef(segments)
    }

    /// Replace the first `from.len()` segments with `to`.
    pub(crate) fn rebased(&self, from: &ControlRef, to: &ControlRef) -> ControlRef {
        let mut segments = to.0.clone();
        segments.extend(self.0.iter().skip(from.len()).cloned());
        ControlRef(segments)
    }
}

impl From<Vec<ControlKey>> for ControlRef {
    fn from(segments: Vec<ControlKey>) -> Self {
        Self(segments)
    }
}

impl FromIterator<ControlKey> for ControlRef {
    fn from_iter<I: IntoIterator<Item = ControlKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ControlRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}
