//! Identifiers and simple allocators for engine handles.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity key of a ranked entity (e.g. a team abbreviation).
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Handle for one requested frame callback.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FrameToken(pub u64);

/// Handle returned by `Engine::subscribe`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u32);

/// Monotonic allocator for FrameToken and SubscriptionId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_frame: u64,
    next_subscription: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue frame numbering after a previous allocator's last token.
    pub fn starting_at(next_frame: u64) -> Self {
        Self {
            next_frame,
            ..Self::default()
        }
    }

    /// Token the next `alloc_frame` will return.
    #[inline]
    pub fn peek_frame(&self) -> FrameToken {
        FrameToken(self.next_frame)
    }

    #[inline]
    pub fn alloc_frame(&mut self) -> FrameToken {
        let id = FrameToken(self.next_frame);
        self.next_frame = self.next_frame.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_subscription(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_frame(), FrameToken(0));
        assert_eq!(alloc.alloc_frame(), FrameToken(1));
        assert_eq!(alloc.alloc_subscription(), SubscriptionId(0));
        assert_eq!(alloc.alloc_subscription(), SubscriptionId(1));

        let mut next = IdAllocator::starting_at(alloc.peek_frame().0);
        assert_eq!(next.alloc_frame(), FrameToken(2));
    }

    #[test]
    fn entity_id_serializes_as_plain_string() {
        let id = EntityId::new("BOS");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"BOS\"");
        let back: EntityId = serde_json::from_str("\"NYY\"").unwrap();
        assert_eq!(back.as_str(), "NYY");
    }
}
