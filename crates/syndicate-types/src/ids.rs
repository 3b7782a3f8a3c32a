//! Type-safe identifier wrappers around small integers.
//!
//! Gangs are numbered densely from zero so a [`GangId`] doubles as the
//! index into the shared arrest table. Member ids are unique within the
//! whole simulation and are reissued on replacement.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `u32` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Create an identifier from its raw value.
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Return the inner `u32` value.
            pub const fn into_inner(self) -> u32 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier of a gang. Dense, starting at zero.
    GangId
}

define_id! {
    /// Identifier of a gang member.
    MemberId
}

impl GangId {
    /// Position of this gang in a dense per-gang table.
    ///
    /// Returns `None` only on targets where `usize` is narrower than `u32`.
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gang_id_index_matches_raw_value() {
        assert_eq!(GangId::new(7).index(), Some(7));
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&MemberId::new(42)).ok();
        assert_eq!(json.as_deref(), Some("42"));
    }

    #[test]
    fn display_is_raw_value() {
        assert_eq!(GangId::new(3).to_string(), "3");
    }
}
