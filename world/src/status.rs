//! Timed status effects carried by an enemy.

use card_defence_core::SlowEffect;

/// Timed modifier attached to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StatusEffect {
    /// Movement slow with optional damage amplification.
    Slow(SlowEffect),
}

impl StatusEffect {
    fn remaining(&self) -> u32 {
        match self {
            Self::Slow(slow) => slow.duration_frames,
        }
    }

    fn decay(&mut self) {
        match self {
            Self::Slow(slow) => slow.duration_frames = slow.duration_frames.saturating_sub(1),
        }
    }
}

/// Set of active statuses holding at most one entry per kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusEffects {
    entries: Vec<StatusEffect>,
}

impl StatusEffects {
    /// Creates an empty status set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a status, refreshing an existing entry of the same kind.
    ///
    /// A refreshed slow takes the new duration and the larger damage
    /// amplification. Its power is left untouched, so repeated hits never
    /// stack amplification beyond the strongest single source.
    pub fn apply(&mut self, status: StatusEffect) {
        match status {
            StatusEffect::Slow(incoming) => {
                let existing = self
                    .entries
                    .iter_mut()
                    .find(|entry| matches!(entry, StatusEffect::Slow(_)));
                if let Some(StatusEffect::Slow(current)) = existing {
                    current.duration_frames = incoming.duration_frames;
                    current.amp_bonus = current.amp_bonus.max(incoming.amp_bonus);
                } else if incoming.duration_frames > 0 {
                    self.entries.push(status);
                }
            }
        }
    }

    /// Decrements every duration and drops expired entries.
    pub fn decay(&mut self) {
        for entry in &mut self.entries {
            entry.decay();
        }
        self.entries.retain(|entry| entry.remaining() > 0);
    }

    /// Active slow, if any.
    #[must_use]
    pub fn slow(&self) -> Option<&SlowEffect> {
        self.entries.iter().find_map(|entry| match entry {
            StatusEffect::Slow(slow) => Some(slow),
        })
    }

    /// Fraction of speed removed by the active slow.
    #[must_use]
    pub fn slow_power(&self) -> f32 {
        self.slow().map_or(0.0, |slow| slow.power)
    }

    /// Extra incoming damage fraction granted by the active slow.
    #[must_use]
    pub fn amp_bonus(&self) -> f32 {
        self.slow().map_or(0.0, |slow| slow.amp_bonus)
    }

    /// Iterates over the active statuses.
    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.entries.iter()
    }

    /// Number of active statuses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no status is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slow(power: f32, duration_frames: u32, amp_bonus: f32) -> StatusEffect {
        StatusEffect::Slow(SlowEffect {
            power,
            duration_frames,
            amp_bonus,
        })
    }

    #[test]
    fn reapplied_slow_refreshes_duration_and_keeps_max_amp() {
        let mut statuses = StatusEffects::new();
        statuses.apply(slow(0.4, 40, 0.1));
        statuses.apply(slow(0.6, 20, 0.3));

        assert_eq!(statuses.len(), 1);
        let active = statuses.slow().copied().expect("slow");
        assert_eq!(active.duration_frames, 20);
        assert_eq!(active.amp_bonus, 0.3);
        assert_eq!(active.power, 0.4);

        statuses.apply(slow(0.5, 90, 0.0));
        assert_eq!(statuses.amp_bonus(), 0.3);
        assert_eq!(statuses.slow().map(|s| s.duration_frames), Some(90));
    }

    #[test]
    fn decay_drops_expired_entries() {
        let mut statuses = StatusEffects::new();
        statuses.apply(slow(0.5, 2, 0.0));
        statuses.decay();
        assert_eq!(statuses.slow_power(), 0.5);
        statuses.decay();
        assert!(statuses.is_empty());
        assert_eq!(statuses.slow_power(), 0.0);
    }
}
