//! Strongly typed identifiers for catalogue entities.
//!
//! Every entity is keyed by a UUID v4 wrapped in a newtype so a `BookId` can
//! never be passed where a `ReviewId` is expected. Ownership checks compare
//! these values directly, which is plain 128-bit equality on both sides of
//! the store boundary.

use crate::error::CatalogueError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $resource:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse an identifier received from a client.
            ///
            /// # Errors
            ///
            /// Returns [`CatalogueError::InvalidIdentifier`] if `raw` is not a UUID.
            pub fn parse(raw: &str) -> Result<Self, CatalogueError> {
                Uuid::parse_str(raw.trim())
                    .map(Self)
                    .map_err(|_| CatalogueError::InvalidIdentifier { resource: $resource })
            }

            /// The underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = CatalogueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a book.
    BookId,
    "Book"
);

entity_id!(
    /// Unique identifier for a review.
    ReviewId,
    "Review"
);

entity_id!(
    /// Unique identifier for a user.
    UserId,
    "User"
);
