#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduler that releases configured enemy groups on a frame timer.
//!
//! The scheduler moves through `Idle -> Spawning -> Draining -> Idle`. It never
//! touches the world directly: spawns and rewards leave as [`Command`] values
//! and progress is announced through [`Event`] values.

use card_defence_core::{Command, Event, WaveDefinition, WaveTuning};
use tracing::{debug, info, warn};

/// Coarse state of the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WavePhase {
    /// No wave is running.
    Idle,
    /// Groups of the current wave are still being released.
    Spawning,
    /// Every group was released; waiting for the field to empty.
    Draining,
}

/// Result of asking for the next wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaveCall {
    /// A new wave started with the provided one-based number.
    Started(u32),
    /// Enemies remained on the field, so a bonus was granted instead.
    EarlyBonus(u32),
    /// The field was empty between groups, so the next spawn was pulled forward.
    Compressed,
    /// No waves are configured.
    Refused,
}

/// Frame-driven wave state machine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WaveScheduler {
    wave_number: u32,
    wave_index: usize,
    group_index: usize,
    group_count: usize,
    spawned_in_group: u32,
    next_spawn_frame: u64,
    active: bool,
}

impl WaveScheduler {
    /// Creates an idle scheduler before the first wave.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the scheduler to its initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// One-based number of the most recently started wave, zero before the first.
    #[must_use]
    pub const fn wave_number(&self) -> u32 {
        self.wave_number
    }

    /// Whether a wave is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Frame at which the next enemy is due.
    #[must_use]
    pub const fn next_spawn_frame(&self) -> u64 {
        self.next_spawn_frame
    }

    /// Index of the group currently being released.
    #[must_use]
    pub const fn group_index(&self) -> usize {
        self.group_index
    }

    /// Enemies released so far from the current group.
    #[must_use]
    pub const fn spawned_in_group(&self) -> u32 {
        self.spawned_in_group
    }

    /// Current phase of the state machine.
    #[must_use]
    pub const fn phase(&self) -> WavePhase {
        if !self.active {
            WavePhase::Idle
        } else if self.group_index < self.group_count {
            WavePhase::Spawning
        } else {
            WavePhase::Draining
        }
    }

    /// Calls the next wave.
    ///
    /// While a wave runs with enemies on the field this only pays the
    /// early-call bonus. While it runs on an empty field the pending spawn is
    /// pulled forward to `frame`. Otherwise the next wave in the table starts
    /// after the configured lead-in; the table repeats once exhausted.
    pub fn start_next_wave(
        &mut self,
        frame: u64,
        enemies_on_field: usize,
        tuning: &WaveTuning,
        out: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) -> WaveCall {
        if self.active {
            if enemies_on_field > 0 {
                let amount = tuning.early_call_bonus;
                out.push(Command::GrantMoney { amount });
                out_events.push(Event::EarlyCallBonus {
                    wave: self.wave_number,
                    amount,
                });
                debug!(wave = self.wave_number, amount, "early call bonus");
                return WaveCall::EarlyBonus(amount);
            }
            self.next_spawn_frame = frame;
            return WaveCall::Compressed;
        }

        let Some(definition) = wave_at(tuning, self.wave_number as usize) else {
            warn!("no waves configured, refusing to start");
            return WaveCall::Refused;
        };

        self.wave_index = self.wave_number as usize % tuning.waves.len();
        self.wave_number += 1;
        self.group_index = 0;
        self.group_count = definition.groups.len();
        self.spawned_in_group = 0;
        self.next_spawn_frame = frame + u64::from(tuning.lead_in_frames);
        self.active = true;

        debug!(
            wave = self.wave_number,
            enemies = definition.total_enemies(),
            "wave started"
        );
        out_events.push(Event::WaveStarted {
            wave: self.wave_number,
        });
        WaveCall::Started(self.wave_number)
    }

    /// Advances the scheduler to `frame`, releasing at most one enemy.
    ///
    /// Once every group was released and the field is empty the wave
    /// finishes: the clear reward and a random card are requested and
    /// `Event::WaveCleared` is emitted.
    pub fn handle(
        &mut self,
        frame: u64,
        enemies_on_field: usize,
        tuning: &WaveTuning,
        out: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) {
        if !self.active {
            return;
        }
        let Some(definition) = wave_at(tuning, self.wave_index) else {
            self.active = false;
            return;
        };

        let Some(group) = definition.groups.get(self.group_index).copied() else {
            if enemies_on_field == 0 {
                self.finish_wave(tuning, out, out_events);
            }
            return;
        };

        if frame < self.next_spawn_frame {
            return;
        }

        out.push(Command::SpawnEnemy {
            kind: group.kind,
            wave: self.wave_number,
            origin: None,
        });
        self.spawned_in_group += 1;

        if self.spawned_in_group >= group.count {
            self.group_index += 1;
            self.spawned_in_group = 0;
            if let Some(next) = definition.groups.get(self.group_index) {
                let pause = u64::from(next.interval) * u64::from(tuning.group_pause_factor);
                self.next_spawn_frame = frame + pause;
            }
        } else {
            self.next_spawn_frame = frame + u64::from(group.interval);
        }
    }

    fn finish_wave(
        &mut self,
        tuning: &WaveTuning,
        out: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) {
        self.active = false;
        out.push(Command::GrantMoney {
            amount: tuning.clear_reward,
        });
        out.push(Command::GrantRandomCard);
        info!(wave = self.wave_number, "wave cleared");
        out_events.push(Event::WaveCleared {
            wave: self.wave_number,
        });
    }
}

fn wave_at(tuning: &WaveTuning, index: usize) -> Option<&WaveDefinition> {
    if tuning.waves.is_empty() {
        return None;
    }
    tuning.waves.get(index % tuning.waves.len())
}
