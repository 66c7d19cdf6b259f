// File: src/studio/core/ids.rs

//! Identifier types for conversations, messages and templates.
//!
//! Every identifier is a millisecond timestamp. Ids are issued by a shared
//! [`IdClock`] so that two ids created within the same millisecond are still
//! unique and strictly ordered by creation.

use core::fmt;
use core::num::ParseIntError;
use core::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Monotonic millisecond clock.
///
/// Issues `max(now_ms, last + 1)` so values never repeat and never go backwards,
/// even if the wall clock does.
#[derive(Debug, Default)]
pub struct IdClock {
    last: AtomicI64,
}

impl IdClock {
    /// Create a clock that has not issued anything yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    /// Issue the next raw identifier.
    pub fn next_raw(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last.load(Ordering::Acquire);
        loop {
            let next = now.max(last.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return next,
                Err(observed) => last = observed,
            }
        }
    }

    /// Make sure later ids sort after `raw` (used for ids revived from storage).
    pub fn observe(&self, raw: i64) {
        self.last.fetch_max(raw, Ordering::AcqRel);
    }
}

static ID_CLOCK: IdClock = IdClock::new();

/// Declare a timestamp-backed id newtype with a consistent API.
macro_rules! define_timestamp_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[repr(transparent)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl Default for $name {
            #[inline]
            fn default() -> Self {
                Self::new()
            }
        }

        impl $name {
            /// Issue a fresh identifier from the shared clock.
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(ID_CLOCK.next_raw())
            }

            /// Wrap an existing raw value.
            #[inline]
            #[must_use]
            pub const fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            /// The raw millisecond value.
            #[inline]
            #[must_use]
            pub const fn as_raw(self) -> i64 {
                self.0
            }

            /// Register an id that came from outside the clock.
            #[inline]
            pub fn observe(self) {
                ID_CLOCK.observe(self.0);
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            #[inline]
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            #[inline]
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            #[inline]
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

define_timestamp_id!(
    /// Identifier of a conversation (creation time in milliseconds).
    ConversationId
);

define_timestamp_id!(
    /// Identifier of a chat message.
    MessageId
);

define_timestamp_id!(
    /// Identifier of a generated template.
    ///
    /// Remote templates carry their own id; fallback templates get a fresh one.
    TemplateId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_strictly_increasing() {
        let clock = IdClock::new();
        let mut previous = clock.next_raw();
        for _ in 0..1_000 {
            let next = clock.next_raw();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_clock_observes_future_ids() {
        let clock = IdClock::new();
        let far_future = Utc::now().timestamp_millis() + 86_400_000;
        clock.observe(far_future);
        assert_eq!(clock.next_raw(), far_future + 1);
    }

    #[test]
    fn test_ids_created_back_to_back_are_unique() {
        let first = ConversationId::new();
        let second = ConversationId::new();
        assert_ne!(first, second);
        assert!(second > first);
    }

    #[test]
    fn test_id_parse_and_display() {
        let id: MessageId = " 1717171717171 ".parse().unwrap();
        assert_eq!(id.as_raw(), 1_717_171_717_171);
        assert_eq!(id.to_string(), "1717171717171");
        assert!("abc".parse::<MessageId>().is_err());
    }

    #[test]
    fn test_id_serializes_as_plain_integer() {
        let id = TemplateId::from_raw(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
    }
}
