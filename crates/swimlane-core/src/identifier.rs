//! Identifiers for diagram elements.
//!
//! Every node, edge, lane and pool is addressed by an [`Id`]. Ids are
//! string-interned so they are `Copy`, cheap to hash and compare, and can be
//! used freely as map keys throughout the layout pipeline.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner backing every [`Id`].
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

/// Prefix reserved for identifiers synthesized by the engine.
const SYNTHETIC_PREFIX: &str = "__";

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut interner)
}

/// Interned identifier of a diagram element.
///
/// # Examples
///
/// ```
/// use swimlane_core::identifier::Id;
///
/// let pool = Id::new("customer");
/// let lane = pool.create_nested(Id::new("sales"));
/// assert_eq!(lane, "customer::sales");
///
/// let default_lane = Id::synthetic("lane");
/// assert!(default_lane.is_synthetic());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from its textual form.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Creates an identifier for an element the engine invented, such as
    /// the default lane of a laneless pool.
    pub fn synthetic(name: &str) -> Self {
        Self::new(&format!("{SYNTHETIC_PREFIX}{name}"))
    }

    /// Returns true if this identifier was produced by [`Id::synthetic`]
    /// (possibly as the last segment of a nested id).
    pub fn is_synthetic(&self) -> bool {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .map(|name| {
                    name.rsplit("::")
                        .next()
                        .is_some_and(|last| last.starts_with(SYNTHETIC_PREFIX))
                })
                .unwrap_or(false)
        })
    }

    /// Creates a nested id by joining this id and `child_id` with `::`.
    ///
    /// ```
    /// use swimlane_core::identifier::Id;
    ///
    /// let nested = Id::new("billing").create_nested(Id::synthetic("lane"));
    /// assert_eq!(nested, "billing::__lane");
    /// ```
    pub fn create_nested(&self, child_id: Id) -> Self {
        let symbol = with_interner(|interner| {
            let nested = format!(
                "{}::{}",
                interner.resolve(self.0).unwrap_or_default(),
                interner.resolve(child_id.0).unwrap_or_default()
            );
            interner.get_or_intern(nested)
        });
        Self(symbol)
    }

    /// Returns the textual form of the identifier.
    pub fn as_string(&self) -> String {
        with_interner(|interner| interner.resolve(self.0).unwrap_or_default().to_string())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl std::str::FromStr for Id {
    type Err = std::convert::Infallible;

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
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| interner.resolve(self.0) == Some(other))
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}
