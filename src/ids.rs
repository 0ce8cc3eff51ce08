/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Identifier newtypes for every entity in the ticketing core.
//!
//! All cross-entity references are id-based: components never hold direct
//! references to each other's records. Buyer and event ids are opaque —
//! identity and permission checks live outside this crate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of an event (opaque reference to the event-management layer).
    EventId
);
define_id!(
    /// Identifier of a ticket tier within an event.
    TierId
);
define_id!(
    /// Identifier of a buyer (opaque reference to the identity layer).
    BuyerId
);
define_id!(
    /// Identifier of an inventory hold.
    HoldId
);
define_id!(
    /// Identifier of an order.
    OrderId
);
define_id!(
    /// Identifier of an issued ticket.
    TicketId
);
define_id!(
    /// Identifier of a waitlist entry.
    EntryId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(TierId::new(), TierId::new());
        assert_ne!(OrderId::new(), OrderId::new());
    }

    #[test]
    fn test_id_display_matches_uuid() {
        let id = HoldId::new();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
    }

    #[test]
    fn test_id_serde_is_transparent() {
        let id = EntryId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: EntryId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
