//! Per-kind alert cooldown tracking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::alerting::AlertKind;

/// Last firing instant per alert kind. Kinds that never fired never block.
#[derive(Debug, Clone, Default)]
pub struct CooldownTracker {
    last_fired: HashMap<AlertKind, Instant>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time left before `kind` may fire again, or `None` if it may fire now.
    pub fn remaining(&self, kind: AlertKind, cooldown: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_fired.get(&kind)?;
        let elapsed = now.saturating_duration_since(*last);
        if elapsed < cooldown {
            Some(cooldown - elapsed)
        } else {
            None
        }
    }

    /// Record a firing. Timestamps never move backwards.
    pub fn record(&mut self, kind: AlertKind, now: Instant) {
        let entry = self.last_fired.entry(kind).or_insert(now);
        if now > *entry {
            *entry = now;
        }
    }

    pub fn last_fired(&self, kind: AlertKind) -> Option<Instant> {
        self.last_fired.get(&kind).copied()
    }
}
