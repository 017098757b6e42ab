#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that aims finished towers and queues their volleys.

use card_defence_core::{BalanceConfig, Command, Vec2};
use card_defence_world::{Enemy, Tower};
use tracing::trace;

/// Tower combat system that emits aiming and firing commands.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
    volley: Vec<f32>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::AimTower` for every finished tower with an enemy in
    /// range, followed by one `Command::FireProjectile` per shot of a
    /// symmetric fan when the tower's cooldown is spent.
    ///
    /// Towers under construction ignore targeting entirely.
    pub fn handle(
        &mut self,
        towers: &[Tower],
        enemies: &[Enemy],
        config: &BalanceConfig,
        out: &mut Vec<Command>,
    ) {
        self.scratch.clear();

        for tower in towers.iter().filter(|tower| !tower.is_building()) {
            let stats = tower.stats(config);
            let Some(target) = nearest_enemy(tower.position(), stats.range, enemies) else {
                continue;
            };
            self.scratch.push(Command::AimTower {
                tower: tower.id(),
                target: target.position,
            });
            if tower.cooldown() > 0 {
                continue;
            }

            self.volley.clear();
            let facing = tower.bearing_to(target.position);
            let count = stats.projectile_count.max(1);
            let start = facing - stats.spread * (count - 1) as f32 / 2.0;
            self.volley
                .extend((0..count).map(|shot| start + stats.spread * shot as f32));
            self.scratch
                .extend(self.volley.iter().map(|angle| Command::FireProjectile {
                    tower: tower.id(),
                    angle: *angle,
                }));
            trace!(
                tower = tower.id().get(),
                target = target.index,
                shots = count,
                "volley queued"
            );
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance: f32,
    index: usize,
    position: Vec2,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        self.distance < other.distance
    }
}

/// Nearest live enemy within `range`; the first one encountered wins ties.
fn nearest_enemy(origin: Vec2, range: f32, enemies: &[Enemy]) -> Option<BestCandidate> {
    let mut best: Option<BestCandidate> = None;
    for (index, enemy) in enemies.iter().enumerate() {
        if !enemy.is_alive() || enemy.is_finished() {
            continue;
        }
        let distance = origin.distance(enemy.position());
        if distance > range {
            continue;
        }
        let candidate = BestCandidate {
            distance,
            index,
            position: enemy.position(),
        };
        if best.map_or(true, |current| candidate.precedes(&current)) {
            best = Some(candidate);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_defence_core::{
        Card, CardKind, CardLevel, EnemyId, EnemyKind, EnemyTuning, TileCoord, TowerId,
    };

    fn enemy(id: u32, position: Vec2) -> Enemy {
        let tuning = EnemyTuning::default();
        let archetype = *tuning.archetype(EnemyKind::Grunt).expect("grunt");
        Enemy::new(
            EnemyId::new(id),
            EnemyKind::Grunt,
            1,
            &archetype,
            25.0,
            position,
            1,
            Vec2::ZERO,
        )
    }

    fn ready_tower(cards: &[Card]) -> Tower {
        let mut tower = Tower::new(TowerId::new(0), TileCoord::new(2, 2), 64.0, 0);
        for card in cards {
            tower.attach(*card, 3).expect("attach");
        }
        tower
    }

    fn shots(commands: &[Command]) -> Vec<f32> {
        commands
            .iter()
            .filter_map(|command| match command {
                Command::FireProjectile { angle, .. } => Some(*angle),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn nearest_enemy_in_range_is_targeted() {
        let config = BalanceConfig::default();
        let mut system = TowerCombat::new();
        let towers = vec![ready_tower(&[])];
        let enemies = vec![
            enemy(0, Vec2::new(160.0, 260.0)),
            enemy(1, Vec2::new(100.0, 160.0)),
            enemy(2, Vec2::new(160.0, 400.0)),
        ];
        let mut out = Vec::new();

        system.handle(&towers, &enemies, &config, &mut out);

        assert_eq!(
            out,
            vec![
                Command::AimTower {
                    tower: TowerId::new(0),
                    target: Vec2::new(100.0, 160.0),
                },
                Command::FireProjectile {
                    tower: TowerId::new(0),
                    angle: std::f32::consts::PI,
                },
            ],
        );
    }

    #[test]
    fn equidistant_enemies_resolve_to_the_first_encountered() {
        let config = BalanceConfig::default();
        let mut system = TowerCombat::new();
        let towers = vec![ready_tower(&[])];
        let enemies = vec![
            enemy(0, Vec2::new(160.0, 200.0)),
            enemy(1, Vec2::new(200.0, 160.0)),
        ];
        let mut out = Vec::new();

        system.handle(&towers, &enemies, &config, &mut out);

        let fired = shots(&out);
        assert_eq!(fired.len(), 1);
        assert!((fired[0] - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn towers_hold_fire_without_targets_in_range() {
        let config = BalanceConfig::default();
        let mut system = TowerCombat::new();
        let towers = vec![ready_tower(&[])];
        let enemies = vec![enemy(0, Vec2::new(600.0, 160.0))];
        let mut out = Vec::new();

        system.handle(&towers, &enemies, &config, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn multishot_fires_a_symmetric_fan() {
        let config = BalanceConfig::default();
        let mut system = TowerCombat::new();
        let multishot = Card::new(CardKind::Multishot, CardLevel::new(2).expect("level"));
        let towers = vec![ready_tower(&[multishot])];
        let enemies = vec![enemy(0, Vec2::new(260.0, 160.0))];
        let mut out = Vec::new();

        system.handle(&towers, &enemies, &config, &mut out);

        let angles = shots(&out);
        assert_eq!(angles.len(), 3);
        for (angle, expected) in angles.iter().zip([-0.2_f32, 0.0, 0.2]) {
            assert!((angle - expected).abs() < 1e-5, "{angle} vs {expected}");
        }
    }

    #[test]
    fn cooling_towers_aim_without_firing() {
        let config = BalanceConfig::default();
        let mut system = TowerCombat::new();
        let mut tower = ready_tower(&[]);
        tower.reset_cooldown(3);
        let towers = vec![tower];
        let enemies = vec![enemy(0, Vec2::new(200.0, 160.0))];
        let mut out = Vec::new();

        system.handle(&towers, &enemies, &config, &mut out);

        assert_eq!(
            out,
            vec![Command::AimTower {
                tower: TowerId::new(0),
                target: Vec2::new(200.0, 160.0),
            }],
        );
    }

    #[test]
    fn building_towers_ignore_targets() {
        let config = BalanceConfig::default();
        let mut system = TowerCombat::new();
        let towers = vec![Tower::new(TowerId::new(4), TileCoord::new(2, 2), 64.0, 2)];
        let enemies = vec![enemy(0, Vec2::new(200.0, 160.0))];
        let mut out = Vec::new();

        system.handle(&towers, &enemies, &config, &mut out);

        assert!(out.is_empty());
    }
}
