//! Interned identifiers for blueprint nodes and lanes.
//!
//! Blueprint ids are compared and hashed constantly during layout (grid
//! lookups, edge keys, lane partitions), so they are interned once and passed
//! around as a `Copy` symbol.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner backing every [`Id`].
///
/// # Thread Safety
///
/// Access goes through a `Mutex`, so ids can be created from any thread.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock")
}

/// Identifier of a node or lane.
///
/// # Examples
///
/// ```
/// use laneflow_core::identifier::Id;
///
/// let start = Id::new("1");
/// let lane = Id::new("reviewers");
///
/// assert_eq!(start, "1");
/// assert_ne!(start, lane);
/// assert_eq!(Id::from_number(1), start);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from its textual form.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Creates an `Id` from a numeric blueprint id.
    ///
    /// Blueprints may spell ids as JSON integers; `7` and `"7"` name the same
    /// node.
    ///
    /// ```
    /// use laneflow_core::identifier::Id;
    ///
    /// assert_eq!(Id::from_number(7), Id::new("7"));
    /// ```
    pub fn from_number(value: i64) -> Self {
        Self::new(&value.to_string())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner();
        let str_value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        f.write_str(str_value)
    }
}

impl std::str::FromStr for Id {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        let interner = interner();
        interner.resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
