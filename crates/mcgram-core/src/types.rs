use std::collections::BTreeMap;
use std::fmt;

// ─── Presence ─────────────────────────────────────────────────────

/// Where a player count came from.
///
/// Ordering is significant: it fixes the order in which readings are
/// rendered into the chat title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PresenceSource {
    /// The game server behind the local console port.
    Local,
    /// A peer server exposing its online list over HTTP.
    Remote,
}

impl PresenceSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl fmt::Display for PresenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single source's answer for one sampling tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresenceReading {
    Count(u32),
    /// The console answered but reported no usable count.
    Asleep,
    /// The console could not be reached at all.
    Unreachable,
}

impl PresenceReading {
    /// True for the two "no number available" sentinels.
    pub fn is_sentinel(self) -> bool {
        !matches!(self, Self::Count(_))
    }

    pub fn count(self) -> Option<u32> {
        match self {
            Self::Count(n) => Some(n),
            Self::Asleep | Self::Unreachable => None,
        }
    }
}

impl fmt::Display for PresenceReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Asleep => f.write_str("zzZ"),
            Self::Unreachable => f.write_str("--"),
        }
    }
}

/// Per-source readings taken in one sampling tick. Compared by value.
///
/// Sources that are not configured (or whose best-effort fetch failed)
/// are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceSample {
    readings: BTreeMap<PresenceSource, PresenceReading>,
}

impl PresenceSample {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, source: PresenceSource, reading: PresenceReading) -> Self {
        self.insert(source, reading);
        self
    }

    pub fn insert(&mut self, source: PresenceSource, reading: PresenceReading) {
        self.readings.insert(source, reading);
    }

    pub fn get(&self, source: PresenceSource) -> Option<PresenceReading> {
        self.readings.get(&source).copied()
    }

    /// Readings in source order.
    pub fn iter(&self) -> impl Iterator<Item = (PresenceSource, PresenceReading)> + '_ {
        self.readings.iter().map(|(s, r)| (*s, *r))
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// True when no source produced a number. Vacuously true for an empty sample.
    pub fn all_sentinel(&self) -> bool {
        self.readings.values().all(|r| r.is_sentinel())
    }

    /// Sum of all numeric readings; sentinels contribute nothing.
    pub fn total(&self) -> u32 {
        self.readings
            .values()
            .filter_map(|r| r.count())
            .fold(0u32, u32::saturating_add)
    }
}
