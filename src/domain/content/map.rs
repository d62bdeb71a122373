// Map layout: bounds, obstacles, lane waypoints, tower and camp placements.
//
// Coordinates run 0..3000 on both axes; Radiant's base sits at the southwest
// corner, Dire's at the northeast. Dire lane waypoints are the Radiant list
// reversed.

use crate::domain::entities::{CombatStats, CreepKind, Lane, MonsterKind, Team};
use crate::domain::math::{Obstacle, Rect, Vec2};

#[derive(Debug, Clone)]
pub struct LaneWaypoints {
    pub lane: Lane,
    /// Ordered Radiant-to-Dire. Dire creeps walk it back to front.
    pub points: Vec<Vec2>,
}

impl LaneWaypoints {
    /// Waypoint list in march order for `team`.
    pub fn for_team(&self, team: Team) -> Vec<Vec2> {
        match team {
            Team::Radiant => self.points.clone(),
            Team::Dire => self.points.iter().rev().copied().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TowerSpawn {
    pub team: Team,
    pub lane: Lane,
    pub tier: u8,
    pub pos: Vec2,
}

#[derive(Debug, Clone, Copy)]
pub struct MonsterSpawn {
    pub kind: MonsterKind,
    pub offset: Vec2,
}

#[derive(Debug, Clone)]
pub struct CampSpawn {
    pub tier: u8,
    pub affinity: Option<Team>,
    pub pos: Vec2,
    pub monsters: Vec<MonsterSpawn>,
}

#[derive(Debug, Clone, Copy)]
pub struct CreepStats {
    pub health: i32,
    pub attack_damage: i32,
    pub attack_speed: f32,
    pub attack_range: f32,
    pub armor: i32,
    pub move_speed: f32,
    pub gold_bounty: u32,
    pub xp_bounty: u32,
}

impl CreepStats {
    pub fn combat(&self) -> CombatStats {
        CombatStats {
            attack_damage: self.attack_damage,
            attack_speed: self.attack_speed,
            attack_range: self.attack_range,
            armor: self.armor,
            magic_resist: 0,
            move_speed: self.move_speed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MapConfig {
    pub bounds: Rect,
    pub obstacles: Vec<Obstacle>,
    pub lanes: Vec<LaneWaypoints>,
    pub towers: Vec<TowerSpawn>,
    pub camps: Vec<CampSpawn>,
    pub radiant_spawn: Vec2,
    pub dire_spawn: Vec2,
    pub tower_health: i32,
    pub tower_attack_damage: i32,
    pub tower_attack_speed: f32,
    pub tower_attack_range: f32,
    pub tower_armor: i32,
}

impl MapConfig {
    pub fn spawn_point(&self, team: Team) -> Vec2 {
        match team {
            Team::Radiant => self.radiant_spawn,
            Team::Dire => self.dire_spawn,
        }
    }

    pub fn lane(&self, lane: Lane) -> &LaneWaypoints {
        &self.lanes[lane.index()]
    }

    pub fn tower_combat_stats(&self) -> CombatStats {
        CombatStats {
            attack_damage: self.tower_attack_damage,
            attack_speed: self.tower_attack_speed,
            attack_range: self.tower_attack_range,
            armor: self.tower_armor,
            magic_resist: 0,
            move_speed: 0.0,
        }
    }

    pub fn creep_stats(&self, kind: CreepKind) -> CreepStats {
        match kind {
            CreepKind::Melee => CreepStats {
                health: 550,
                attack_damage: 20,
                attack_speed: 1.0,
                attack_range: 100.0,
                armor: 2,
                move_speed: 260.0,
                gold_bounty: 24,
                xp_bounty: 30,
            },
            CreepKind::Ranged => CreepStats {
                health: 300,
                attack_damage: 24,
                attack_speed: 1.0,
                attack_range: 400.0,
                armor: 0,
                move_speed: 260.0,
                gold_bounty: 30,
                xp_bounty: 35,
            },
            CreepKind::Siege => CreepStats {
                health: 900,
                attack_damage: 40,
                attack_speed: 0.6,
                attack_range: 500.0,
                armor: 10,
                move_speed: 240.0,
                gold_bounty: 60,
                xp_bounty: 60,
            },
        }
    }

    pub fn monster_stats(&self, kind: MonsterKind) -> CreepStats {
        match kind {
            MonsterKind::Wolf => CreepStats {
                health: 500,
                attack_damage: 28,
                attack_speed: 1.1,
                attack_range: 120.0,
                armor: 4,
                move_speed: 310.0,
                gold_bounty: 40,
                xp_bounty: 50,
            },
            MonsterKind::Golem => CreepStats {
                health: 1100,
                attack_damage: 45,
                attack_speed: 0.7,
                attack_range: 140.0,
                armor: 12,
                move_speed: 280.0,
                gold_bounty: 90,
                xp_bounty: 110,
            },
            MonsterKind::Ancient => CreepStats {
                health: 2200,
                attack_damage: 70,
                attack_speed: 0.6,
                attack_range: 160.0,
                armor: 18,
                move_speed: 270.0,
                gold_bounty: 200,
                xp_bounty: 250,
            },
        }
    }
}

pub fn builtin_map() -> MapConfig {
    let lanes = vec![
        LaneWaypoints {
            lane: Lane::Top,
            points: vec![
                Vec2::new(150.0, 800.0),
                Vec2::new(150.0, 2200.0),
                Vec2::new(250.0, 2750.0),
                Vec2::new(800.0, 2850.0),
                Vec2::new(2200.0, 2850.0),
                Vec2::new(2850.0, 2850.0),
            ],
        },
        LaneWaypoints {
            lane: Lane::Mid,
            points: vec![
                Vec2::new(600.0, 600.0),
                Vec2::new(1500.0, 1500.0),
                Vec2::new(2400.0, 2400.0),
                Vec2::new(2850.0, 2850.0),
            ],
        },
        LaneWaypoints {
            lane: Lane::Bot,
            points: vec![
                Vec2::new(800.0, 150.0),
                Vec2::new(2200.0, 150.0),
                Vec2::new(2750.0, 250.0),
                Vec2::new(2850.0, 800.0),
                Vec2::new(2850.0, 2200.0),
                Vec2::new(2850.0, 2850.0),
            ],
        },
    ];

    let mut towers = Vec::new();
    let lane_towers: [(Lane, [Vec2; 3], [Vec2; 3]); 3] = [
        (
            Lane::Top,
            [
                Vec2::new(150.0, 2100.0),
                Vec2::new(150.0, 1400.0),
                Vec2::new(150.0, 700.0),
            ],
            [
                Vec2::new(900.0, 2850.0),
                Vec2::new(1600.0, 2850.0),
                Vec2::new(2300.0, 2850.0),
            ],
        ),
        (
            Lane::Mid,
            [
                Vec2::new(1050.0, 1050.0),
                Vec2::new(800.0, 800.0),
                Vec2::new(550.0, 550.0),
            ],
            [
                Vec2::new(1950.0, 1950.0),
                Vec2::new(2200.0, 2200.0),
                Vec2::new(2450.0, 2450.0),
            ],
        ),
        (
            Lane::Bot,
            [
                Vec2::new(2100.0, 150.0),
                Vec2::new(1400.0, 150.0),
                Vec2::new(700.0, 150.0),
            ],
            [
                Vec2::new(2850.0, 900.0),
                Vec2::new(2850.0, 1600.0),
                Vec2::new(2850.0, 2300.0),
            ],
        ),
    ];
    for (lane, radiant, dire) in lane_towers {
        for (i, pos) in radiant.into_iter().enumerate() {
            towers.push(TowerSpawn {
                team: Team::Radiant,
                lane,
                tier: (i + 1) as u8,
                pos,
            });
        }
        for (i, pos) in dire.into_iter().enumerate() {
            towers.push(TowerSpawn {
                team: Team::Dire,
                lane,
                tier: (i + 1) as u8,
                pos,
            });
        }
    }
    // Four tier-4 base towers per team; losing all four loses the match.
    for pos in [
        Vec2::new(400.0, 200.0),
        Vec2::new(200.0, 400.0),
        Vec2::new(420.0, 420.0),
        Vec2::new(280.0, 280.0),
    ] {
        towers.push(TowerSpawn {
            team: Team::Radiant,
            lane: Lane::Mid,
            tier: 4,
            pos,
        });
    }
    for pos in [
        Vec2::new(2600.0, 2800.0),
        Vec2::new(2800.0, 2600.0),
        Vec2::new(2580.0, 2580.0),
        Vec2::new(2720.0, 2720.0),
    ] {
        towers.push(TowerSpawn {
            team: Team::Dire,
            lane: Lane::Mid,
            tier: 4,
            pos,
        });
    }

    let camps = vec![
        CampSpawn {
            tier: 1,
            affinity: Some(Team::Radiant),
            pos: Vec2::new(650.0, 1500.0),
            monsters: vec![
                MonsterSpawn {
                    kind: MonsterKind::Wolf,
                    offset: Vec2::new(-40.0, 0.0),
                },
                MonsterSpawn {
                    kind: MonsterKind::Wolf,
                    offset: Vec2::new(40.0, 0.0),
                },
            ],
        },
        CampSpawn {
            tier: 2,
            affinity: Some(Team::Radiant),
            pos: Vec2::new(1500.0, 650.0),
            monsters: vec![MonsterSpawn {
                kind: MonsterKind::Golem,
                offset: Vec2::ZERO,
            }],
        },
        CampSpawn {
            tier: 1,
            affinity: Some(Team::Dire),
            pos: Vec2::new(2350.0, 1500.0),
            monsters: vec![
                MonsterSpawn {
                    kind: MonsterKind::Wolf,
                    offset: Vec2::new(-40.0, 0.0),
                },
                MonsterSpawn {
                    kind: MonsterKind::Wolf,
                    offset: Vec2::new(40.0, 0.0),
                },
            ],
        },
        CampSpawn {
            tier: 2,
            affinity: Some(Team::Dire),
            pos: Vec2::new(1500.0, 2350.0),
            monsters: vec![MonsterSpawn {
                kind: MonsterKind::Golem,
                offset: Vec2::ZERO,
            }],
        },
        CampSpawn {
            tier: 2,
            affinity: None,
            pos: Vec2::new(2000.0, 800.0),
            monsters: vec![MonsterSpawn {
                kind: MonsterKind::Ancient,
                offset: Vec2::ZERO,
            }],
        },
    ];

    MapConfig {
        bounds: Rect::new(0.0, 0.0, 3000.0, 3000.0),
        obstacles: vec![
            Obstacle::Circle {
                center: Vec2::new(900.0, 1800.0),
                radius: 140.0,
            },
            Obstacle::Circle {
                center: Vec2::new(2100.0, 1200.0),
                radius: 140.0,
            },
            Obstacle::Box(Rect::new(1250.0, 600.0, 1450.0, 1000.0)),
            Obstacle::Box(Rect::new(1550.0, 2000.0, 1750.0, 2400.0)),
        ],
        lanes,
        towers,
        camps,
        radiant_spawn: Vec2::new(150.0, 150.0),
        dire_spawn: Vec2::new(2850.0, 2850.0),
        tower_health: 2600,
        tower_attack_damage: 110,
        tower_attack_speed: 0.8,
        tower_attack_range: 600.0,
        tower_armor: 20,
    }
}
