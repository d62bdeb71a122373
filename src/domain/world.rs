// The authoritative match world: one instance per room, mutated only by its
// match task. `apply` resolves commands between ticks, `tick` advances the
// simulation by one fixed step. Both return the events the transport layer
// should broadcast.

use std::sync::Arc;

use tracing::info;

use super::buffs::{self, DamageType, PeriodicEffect};
use super::content::{ContentDb, HeroId, ItemId};
use super::entities::{
    AbilitySlot, ChatMessage, Creep, CreepKind, JungleCamp, JungleMonster, Lane, MapPing, Player,
    PlayerId, ScoreLine, Team, Tower, UnitRef, Visibility,
};
use super::math::Vec2;
use super::pathfind;
use super::store::EntityStore;
use super::systems::abilities::{self, CastError};
use super::systems::combat::{self, TeamScores};
use super::systems::shop::{self, ShopError};
use super::systems::{ai, movement, vision};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Waiting,
    HeroSelect,
    Playing,
    Paused,
    Ended,
}

impl MatchPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchPhase::Waiting => "waiting",
            MatchPhase::HeroSelect => "hero_select",
            MatchPhase::Playing => "playing",
            MatchPhase::Paused => "paused",
            MatchPhase::Ended => "ended",
        }
    }
}

/// One roster slot handed to the world at creation.
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub id: PlayerId,
    pub name: String,
    pub team: Team,
    pub is_bot: bool,
}

/// Inbound commands, already bound to a verified player id by the session.
#[derive(Debug, Clone)]
pub enum Command {
    Connected { player: PlayerId },
    Disconnected { player: PlayerId },
    SelectHero { player: PlayerId, hero: HeroId },
    LockHero { player: PlayerId },
    Move { player: PlayerId, point: Vec2 },
    Attack { player: PlayerId, target: UnitRef },
    Stop { player: PlayerId },
    UseAbility {
        player: PlayerId,
        slot: usize,
        target_unit: Option<UnitRef>,
        target_point: Option<Vec2>,
    },
    BuyItem { player: PlayerId, item: ItemId },
    SellItem { player: PlayerId, slot: usize },
    Chat {
        player: PlayerId,
        content: String,
        team_only: bool,
    },
    Ping {
        player: PlayerId,
        kind: String,
        point: Vec2,
    },
}

/// Final stat line for one roster slot, attached to `GameEnd`.
#[derive(Debug, Clone)]
pub struct FinalStanding {
    pub player: PlayerId,
    pub name: String,
    pub team: Team,
    pub is_bot: bool,
    pub score: ScoreLine,
}

/// Outbound events. Snapshots are not events; the match task publishes them
/// separately every tick.
#[derive(Debug, Clone)]
pub enum Event {
    PhaseChanged(MatchPhase),
    HeroUnavailable { player: PlayerId, hero: HeroId },
    GameStart,
    GameEnd {
        winner: Team,
        kills_radiant: u32,
        kills_dire: u32,
        /// Playing time in seconds when the match settled.
        duration: f32,
        standings: Vec<FinalStanding>,
    },
    PlayerDisconnected { player: PlayerId, grace: f32 },
    PlayerAbandoned { player: PlayerId },
    AbilityError { player: PlayerId, reason: CastError },
    ShopError { player: PlayerId, reason: ShopError },
    ItemBought {
        player: PlayerId,
        item: ItemId,
        slot: usize,
    },
    ItemSold {
        player: PlayerId,
        item: ItemId,
        gold: u32,
    },
}

pub struct World {
    pub content: Arc<ContentDb>,
    pub store: EntityStore,
    pub phase: MatchPhase,
    pub tick: u64,
    /// Seconds of Playing time accumulated.
    pub clock: f32,
    pub scores: TeamScores,
    pub winner: Option<Team>,

    select_remaining: f32,
    wave_counter: u32,
    next_wave_in: f32,
    gold_accum: f32,
}

impl World {
    pub fn new(content: Arc<ContentDb>, roster: Vec<RosterEntry>) -> Self {
        let mut store = EntityStore::new();
        for entry in roster {
            store.add_player(Player::from_roster(
                entry.id, entry.name, entry.team, entry.is_bot,
            ));
        }
        let select_remaining = content.rules.hero_select_seconds;
        Self {
            content,
            store,
            phase: MatchPhase::Waiting,
            tick: 0,
            clock: 0.0,
            scores: TeamScores::default(),
            winner: None,
            select_remaining,
            wave_counter: 0,
            next_wave_in: 0.0,
            gold_accum: 0.0,
        }
    }

    /// Resolve one command. Wrong-phase and stale-reference commands are
    /// dropped without effect.
    pub fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        match command {
            Command::Connected { player } => {
                if let Some(p) = self.store.player_mut(player) {
                    p.connected = true;
                    p.disconnect_grace = None;
                }
                if self.phase == MatchPhase::Paused {
                    self.phase = MatchPhase::Playing;
                    info!("match resumed");
                    events.push(Event::PhaseChanged(MatchPhase::Playing));
                }
            }
            Command::Disconnected { player } => {
                let grace = self.content.rules.disconnect_grace;
                let in_game = matches!(self.phase, MatchPhase::Playing | MatchPhase::Paused);
                if let Some(p) = self.store.player_mut(player) {
                    p.connected = false;
                    if in_game && !p.is_bot {
                        p.disconnect_grace = Some(grace);
                        events.push(Event::PlayerDisconnected { player, grace });
                    }
                }
                if self.phase == MatchPhase::Playing && self.all_humans_disconnected() {
                    self.phase = MatchPhase::Paused;
                    info!("match paused, no humans connected");
                    events.push(Event::PhaseChanged(MatchPhase::Paused));
                }
            }
            Command::SelectHero { player, hero } => {
                if self.phase != MatchPhase::HeroSelect {
                    return events;
                }
                if self.content.hero(hero).is_none() {
                    return events;
                }
                if self.hero_locked_by_other(hero, player) {
                    events.push(Event::HeroUnavailable { player, hero });
                    return events;
                }
                if let Some(p) = self.store.player_mut(player) {
                    if !p.ready {
                        p.hero = Some(hero);
                    }
                }
            }
            Command::LockHero { player } => {
                if self.phase != MatchPhase::HeroSelect {
                    return events;
                }
                let Some(hero) = self.store.player(player).and_then(|p| p.hero) else {
                    return events;
                };
                if self.hero_locked_by_other(hero, player) {
                    events.push(Event::HeroUnavailable { player, hero });
                    return events;
                }
                if let Some(p) = self.store.player_mut(player) {
                    p.ready = true;
                }
                if self.store.players.iter().all(|p| p.ready) {
                    events.extend(self.start_match());
                }
            }
            Command::Move { player, point } => {
                if self.phase != MatchPhase::Playing {
                    return events;
                }
                let Some(pos) = self
                    .store
                    .player(player)
                    .filter(|p| p.alive)
                    .map(|p| p.pos)
                else {
                    return events;
                };
                let mut path = pathfind::find_path(
                    &self.content.map,
                    pos,
                    point,
                    self.content.rules.player_radius,
                );
                if let Some(p) = self.store.player_mut(player) {
                    p.move_target = Some(path.remove(0));
                    p.path = path;
                    p.target = None;
                }
            }
            Command::Attack { player, target } => {
                if self.phase != MatchPhase::Playing {
                    return events;
                }
                let Some(team) = self
                    .store
                    .player(player)
                    .filter(|p| p.alive)
                    .map(|p| p.team)
                else {
                    return events;
                };
                let valid = self
                    .store
                    .view(target)
                    .is_some_and(|v| v.alive && !v.untargetable && v.team != Some(team));
                if valid {
                    if let Some(p) = self.store.player_mut(player) {
                        p.target = Some(target);
                    }
                }
            }
            Command::Stop { player } => {
                if self.phase != MatchPhase::Playing {
                    return events;
                }
                if let Some(p) = self.store.player_mut(player) {
                    p.move_target = None;
                    p.path.clear();
                    p.target = None;
                }
            }
            Command::UseAbility {
                player,
                slot,
                target_unit,
                target_point,
            } => {
                if self.phase != MatchPhase::Playing {
                    return events;
                }
                let result = abilities::cast(
                    &mut self.store,
                    &self.content,
                    &mut self.scores,
                    self.tick,
                    player,
                    slot,
                    target_unit,
                    target_point,
                );
                match result {
                    Ok(()) => {}
                    // Stale references are dropped silently.
                    Err(CastError::Invalid) => {}
                    Err(reason) => events.push(Event::AbilityError { player, reason }),
                }
                events.extend(self.check_win());
            }
            Command::BuyItem { player, item } => {
                if self.phase != MatchPhase::Playing {
                    return events;
                }
                match shop::buy(&mut self.store, &self.content, player, item) {
                    Ok(slot) => events.push(Event::ItemBought { player, item, slot }),
                    Err(reason) => events.push(Event::ShopError { player, reason }),
                }
            }
            Command::SellItem { player, slot } => {
                if self.phase != MatchPhase::Playing {
                    return events;
                }
                match shop::sell(&mut self.store, &self.content, player, slot) {
                    Ok((item, gold)) => events.push(Event::ItemSold { player, item, gold }),
                    Err(reason) => events.push(Event::ShopError { player, reason }),
                }
            }
            Command::Chat {
                player,
                content,
                team_only,
            } => {
                let cap = self.content.rules.chat_ring;
                let Some(p) = self.store.player(player) else {
                    return events;
                };
                let msg = ChatMessage {
                    sender: player,
                    sender_name: p.name.clone(),
                    team: p.team,
                    team_only,
                    content,
                };
                self.store.push_message(msg, cap);
            }
            Command::Ping {
                player,
                kind,
                point,
            } => {
                if self.phase != MatchPhase::Playing {
                    return events;
                }
                let cap = self.content.rules.ping_ring;
                let ttl = self.content.rules.ping_ttl;
                let clock = self.clock;
                let Some(team) = self.store.player(player).map(|p| p.team) else {
                    return events;
                };
                self.store.push_ping(
                    MapPing {
                        sender: player,
                        team,
                        kind,
                        pos: self.content.map.bounds.clamp(point),
                        expires_at: clock + ttl,
                    },
                    cap,
                );
            }
        }
        events
    }

    /// Advance one fixed step.
    pub fn tick(&mut self, dt: f32) -> Vec<Event> {
        let mut events = Vec::new();
        match self.phase {
            MatchPhase::Waiting => {
                if !self.store.players.is_empty() && self.all_humans_connected() {
                    self.phase = MatchPhase::HeroSelect;
                    self.select_remaining = self.content.rules.hero_select_seconds;
                    info!("hero select started");
                    events.push(Event::PhaseChanged(MatchPhase::HeroSelect));
                }
            }
            MatchPhase::HeroSelect => {
                self.select_remaining -= dt;
                let elapsed = self.content.rules.hero_select_seconds - self.select_remaining;
                if elapsed >= self.content.rules.bot_pick_delay {
                    self.auto_pick_bots();
                }
                if self.store.players.iter().all(|p| p.ready) {
                    events.extend(self.start_match());
                } else if self.select_remaining <= 0.0 {
                    self.auto_assign_stragglers();
                    events.extend(self.start_match());
                }
            }
            MatchPhase::Playing => {
                self.clock += dt;
                self.passive_gold(dt);
                self.tick_respawns(dt);
                events.extend(self.tick_disconnect_grace(dt));
                self.tick_camp_respawns(dt);
                self.tick_waves(dt);
                self.tick_periodic_buffs(dt);
                abilities::tick_cooldowns(&mut self.store, dt);

                ai::run(&mut self.store, &self.content);
                movement::run(&mut self.store, &self.content, dt);
                combat::run(
                    &mut self.store,
                    &self.content,
                    &mut self.scores,
                    self.tick,
                    dt,
                );
                if self.tick % self.content.rules.vision_interval_ticks == 0 {
                    vision::run(&mut self.store, &self.content);
                }
                self.store.sweep(self.tick, self.clock);
                events.extend(self.check_win());
            }
            MatchPhase::Paused => {
                // Grace timers keep running so an abandoned match still ends.
                events.extend(self.tick_disconnect_grace(dt));
            }
            MatchPhase::Ended => {}
        }
        self.tick += 1;
        events
    }

    fn all_humans_connected(&self) -> bool {
        self.store
            .players
            .iter()
            .filter(|p| !p.is_bot)
            .all(|p| p.connected)
    }

    fn all_humans_disconnected(&self) -> bool {
        self.store
            .players
            .iter()
            .filter(|p| !p.is_bot)
            .all(|p| !p.connected)
    }

    fn hero_locked_by_other(&self, hero: HeroId, player: PlayerId) -> bool {
        self.store
            .players
            .iter()
            .any(|p| p.id != player && p.ready && p.hero == Some(hero))
    }

    fn free_hero(&self) -> Option<HeroId> {
        self.content
            .heroes
            .iter()
            .map(|h| h.id)
            .find(|&h| !self.store.players.iter().any(|p| p.ready && p.hero == Some(h)))
    }

    fn auto_pick_bots(&mut self) {
        for i in 0..self.store.players.len() {
            let p = &self.store.players[i];
            if !p.is_bot || p.ready {
                continue;
            }
            let hero = p.hero.or_else(|| self.free_hero());
            if let Some(hero) = hero {
                if !self.hero_locked_by_other(hero, self.store.players[i].id) {
                    let p = &mut self.store.players[i];
                    p.hero = Some(hero);
                    p.ready = true;
                }
            }
        }
    }

    /// Countdown expiry: every unlocked player gets their selection if it is
    /// still free, otherwise the first free hero (first hero overall when the
    /// pool runs dry).
    fn auto_assign_stragglers(&mut self) {
        for i in 0..self.store.players.len() {
            if self.store.players[i].ready {
                continue;
            }
            let id = self.store.players[i].id;
            let selected = self.store.players[i].hero;
            let hero = selected
                .filter(|&h| !self.hero_locked_by_other(h, id))
                .or_else(|| self.free_hero())
                .unwrap_or(self.content.heroes[0].id);
            let p = &mut self.store.players[i];
            p.hero = Some(hero);
            p.ready = true;
        }
    }

    fn start_match(&mut self) -> Vec<Event> {
        let rules_gold = self.content.rules.starting_gold;

        for i in 0..self.store.players.len() {
            let hero_id = self.store.players[i]
                .hero
                .unwrap_or(self.content.heroes[0].id);
            let Some(def) = self.content.hero(hero_id).cloned() else {
                continue;
            };
            let spawn = self.content.map.spawn_point(self.store.players[i].team);
            let p = &mut self.store.players[i];
            p.hero = Some(hero_id);
            p.level = 1;
            p.xp = 0;
            p.gold = rules_gold;
            p.score.gold_earned = rules_gold;
            p.stats = def.stats;
            p.max_health = def.health;
            p.health = def.health;
            p.max_mana = def.mana;
            p.mana = def.mana;
            p.spell_power = def.spell_power;
            p.vision_range = def.vision_range;
            p.pos = spawn;
            p.alive = true;
            p.abilities = def
                .abilities
                .iter()
                .map(|&a| AbilitySlot {
                    ability: a,
                    level: 0,
                    cooldown: 0.0,
                })
                .collect();
            combat::sync_ability_levels(p);
        }

        self.spawn_towers();
        self.spawn_camps();
        self.spawn_wave();
        self.next_wave_in = self.content.rules.wave_interval;

        self.phase = MatchPhase::Playing;
        self.clock = 0.0;
        info!(players = self.store.players.len(), "match started");
        vec![Event::PhaseChanged(MatchPhase::Playing), Event::GameStart]
    }

    fn spawn_towers(&mut self) {
        let spawns = self.content.map.towers.clone();
        let stats = self.content.map.tower_combat_stats();
        let health = self.content.map.tower_health;
        for spawn in spawns {
            self.store.add_tower(|id| Tower {
                id,
                team: spawn.team,
                lane: spawn.lane,
                tier: spawn.tier,
                pos: spawn.pos,
                health,
                max_health: health,
                stats,
                attack_cooldown: 0.0,
                target: None,
                under_attack: false,
                alive: true,
            });
        }
    }

    fn spawn_camps(&mut self) {
        let camps = self.content.map.camps.clone();
        for spawn in camps {
            let camp_id = self.store.add_camp(|id| JungleCamp {
                id,
                tier: spawn.tier,
                affinity: spawn.affinity,
                pos: spawn.pos,
                cleared: false,
                respawn_in: 0.0,
            });
            self.spawn_camp_monsters(camp_id, &spawn);
        }
    }

    fn spawn_camp_monsters(
        &mut self,
        camp_id: crate::domain::entities::CampId,
        spawn: &crate::domain::content::CampSpawn,
    ) {
        for ms in &spawn.monsters {
            let base = self.content.map.monster_stats(ms.kind);
            let pos = spawn.pos.add(ms.offset);
            let kind = ms.kind;
            self.store.add_monster(|id| JungleMonster {
                id,
                camp: camp_id,
                kind,
                pos,
                rot: 0.0,
                spawn_anchor: pos,
                health: base.health,
                max_health: base.health,
                stats: base.combat(),
                attack_cooldown: 0.0,
                gold_bounty: base.gold_bounty,
                xp_bounty: base.xp_bounty,
                aggro_target: None,
                resetting: false,
                buffs: Vec::new(),
                visible_to: Visibility::all(),
                alive: true,
                despawn_at: None,
            });
        }
    }

    fn tick_waves(&mut self, dt: f32) {
        self.next_wave_in -= dt;
        if self.next_wave_in <= 0.0 {
            self.spawn_wave();
            self.next_wave_in += self.content.rules.wave_interval;
        }
    }

    fn spawn_wave(&mut self) {
        self.wave_counter += 1;
        let siege = self.wave_counter % self.content.rules.siege_wave_every == 0;
        for team in [Team::Radiant, Team::Dire] {
            for lane in Lane::ALL {
                let points = self.content.map.lane(lane).for_team(team);
                let start = points[0];
                let first_target = points.get(1).copied().unwrap_or(start);

                let mut kinds = vec![
                    CreepKind::Melee,
                    CreepKind::Melee,
                    CreepKind::Melee,
                    CreepKind::Ranged,
                    CreepKind::Ranged,
                ];
                if siege {
                    kinds.push(CreepKind::Siege);
                }

                for (i, kind) in kinds.into_iter().enumerate() {
                    let base = self.content.map.creep_stats(kind);
                    let offset = Vec2::new((i as f32 - 2.5) * 28.0, 0.0);
                    let pos = self.content.map.bounds.clamp(start.add(offset));
                    self.store.add_creep(|id| Creep {
                        id,
                        team,
                        kind,
                        lane,
                        pos,
                        rot: 0.0,
                        move_target: Some(first_target),
                        waypoint_index: 1.min(points.len() - 1),
                        health: base.health,
                        max_health: base.health,
                        stats: base.combat(),
                        attack_cooldown: 0.0,
                        gold_bounty: base.gold_bounty,
                        xp_bounty: base.xp_bounty,
                        target: None,
                        buffs: Vec::new(),
                        visible_to: Visibility::all(),
                        alive: true,
                        despawn_at: None,
                    });
                }
            }
        }
        tracing::debug!(wave = self.wave_counter, siege, "creep wave spawned");
    }

    fn tick_camp_respawns(&mut self, dt: f32) {
        let mut due = Vec::new();
        for camp in self.store.camps.iter_mut().filter(|c| c.cleared) {
            camp.respawn_in -= dt;
            if camp.respawn_in <= 0.0 {
                camp.cleared = false;
                due.push(camp.id);
            }
        }
        // Camp ids index the content table in creation order.
        for camp_id in due {
            let spawn = self.content.map.camps[camp_id.0 as usize].clone();
            self.spawn_camp_monsters(camp_id, &spawn);
        }
    }

    fn tick_respawns(&mut self, dt: f32) {
        for i in 0..self.store.players.len() {
            let p = &self.store.players[i];
            if p.alive || p.hero.is_none() {
                continue;
            }
            let spawn = self.content.map.spawn_point(p.team);
            let p = &mut self.store.players[i];
            p.respawn_timer -= dt;
            if p.respawn_timer <= 0.0 {
                p.alive = true;
                p.health = p.max_health;
                p.mana = p.max_mana;
                p.pos = spawn;
                p.respawn_timer = 0.0;
            }
        }
    }

    fn tick_disconnect_grace(&mut self, dt: f32) -> Vec<Event> {
        let mut events = Vec::new();
        for p in self.store.players.iter_mut() {
            if let Some(grace) = &mut p.disconnect_grace {
                *grace -= dt;
                if *grace <= 0.0 {
                    p.disconnect_grace = None;
                    info!(player = p.id.0, "player abandoned");
                    events.push(Event::PlayerAbandoned { player: p.id });
                }
            }
        }
        // Every human gone for good: settle the match by current kills.
        let abandoned_out = self
            .store
            .players
            .iter()
            .filter(|p| !p.is_bot)
            .all(|p| !p.connected && p.disconnect_grace.is_none());
        if abandoned_out
            && !self.store.players.is_empty()
            && matches!(self.phase, MatchPhase::Playing | MatchPhase::Paused)
            && self.store.players.iter().any(|p| !p.is_bot)
            && !events.is_empty()
        {
            events.extend(self.finish(self.leader_by_kills()));
        }
        events
    }

    fn passive_gold(&mut self, dt: f32) {
        self.gold_accum += dt;
        while self.gold_accum >= 1.0 {
            self.gold_accum -= 1.0;
            let income = self.content.rules.passive_gold_per_sec;
            for p in self.store.players.iter_mut().filter(|p| p.hero.is_some()) {
                p.gold += income;
                p.score.gold_earned += income;
            }
        }
    }

    /// Tick every buff list, then route the produced DoT/HoT amounts through
    /// the standard damage/heal path so attribution and clamping hold.
    fn tick_periodic_buffs(&mut self, dt: f32) {
        let interval = self.content.rules.tick_interval;
        let mut pending: Vec<(UnitRef, PeriodicEffect)> = Vec::new();

        for p in self.store.players.iter_mut().filter(|p| p.alive) {
            for e in buffs::tick_buffs(&mut p.buffs, dt, interval) {
                pending.push((UnitRef::Player(p.id), e));
            }
        }
        for c in self.store.creeps.iter_mut().filter(|c| c.alive) {
            for e in buffs::tick_buffs(&mut c.buffs, dt, interval) {
                pending.push((UnitRef::Creep(c.id), e));
            }
        }
        for m in self.store.monsters.iter_mut().filter(|m| m.alive) {
            for e in buffs::tick_buffs(&mut m.buffs, dt, interval) {
                pending.push((UnitRef::Monster(m.id), e));
            }
        }

        for (unit, effect) in pending {
            let amount = effect.amount.round() as i32;
            if amount <= 0 {
                continue;
            }
            if effect.heal {
                self.heal(unit, amount);
            } else {
                combat::deal_damage(
                    &mut self.store,
                    &self.content,
                    &mut self.scores,
                    self.tick,
                    effect.source,
                    unit,
                    amount,
                    effect.damage_type.unwrap_or(DamageType::Physical),
                );
            }
        }
    }

    fn heal(&mut self, unit: UnitRef, amount: i32) {
        match unit {
            UnitRef::Player(id) => {
                if let Some(p) = self.store.player_mut(id) {
                    if p.alive {
                        p.health = (p.health + amount).min(p.max_health);
                    }
                }
            }
            UnitRef::Creep(id) => {
                if let Some(c) = self.store.creep_mut(id) {
                    if c.alive {
                        c.health = (c.health + amount).min(c.max_health);
                    }
                }
            }
            UnitRef::Monster(id) => {
                if let Some(m) = self.store.monster_mut(id) {
                    if m.alive {
                        m.health = (m.health + amount).min(m.max_health);
                    }
                }
            }
            UnitRef::Tower(_) => {}
        }
    }

    fn leader_by_kills(&self) -> Team {
        // Ties go to Radiant by long-standing convention.
        if self.scores.dire > self.scores.radiant {
            Team::Dire
        } else {
            Team::Radiant
        }
    }

    fn check_win(&mut self) -> Vec<Event> {
        if self.phase != MatchPhase::Playing {
            return Vec::new();
        }
        let rules = &self.content.rules;

        if self.scores.radiant >= rules.kill_threshold {
            return self.finish(Team::Radiant);
        }
        if self.scores.dire >= rules.kill_threshold {
            return self.finish(Team::Dire);
        }

        for team in [Team::Radiant, Team::Dire] {
            let base_towers: Vec<_> = self
                .store
                .towers
                .iter()
                .filter(|t| t.team == team && t.tier == 4)
                .collect();
            if !base_towers.is_empty() && base_towers.iter().all(|t| !t.alive) {
                return self.finish(team.enemy());
            }
        }

        if self.clock >= rules.time_limit {
            return self.finish(self.leader_by_kills());
        }

        Vec::new()
    }

    fn finish(&mut self, winner: Team) -> Vec<Event> {
        self.phase = MatchPhase::Ended;
        self.winner = Some(winner);
        let standings = self
            .store
            .players
            .iter()
            .map(|p| FinalStanding {
                player: p.id,
                name: p.name.clone(),
                team: p.team,
                is_bot: p.is_bot,
                score: p.score,
            })
            .collect();
        info!(
            winner = winner.as_str(),
            radiant = self.scores.radiant,
            dire = self.scores.dire,
            clock = self.clock,
            "match ended"
        );
        vec![
            Event::PhaseChanged(MatchPhase::Ended),
            Event::GameEnd {
                winner,
                kills_radiant: self.scores.radiant,
                kills_dire: self.scores.dire,
                duration: self.clock,
                standings,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(humans: u32, bots: u32) -> Vec<RosterEntry> {
        let mut out = Vec::new();
        let mut id = 0u64;
        for i in 0..humans + bots {
            let team = if i % 2 == 0 { Team::Radiant } else { Team::Dire };
            id += 1;
            out.push(RosterEntry {
                id: PlayerId(id),
                name: format!("player{id}"),
                team,
                is_bot: i >= humans,
            });
        }
        out
    }

    fn world(humans: u32, bots: u32) -> World {
        World::new(Arc::new(ContentDb::builtin()), roster(humans, bots))
    }

    fn dt(world: &World) -> f32 {
        world.content.rules.tick_interval
    }

    /// Connect all humans and drive through hero select into Playing.
    fn start(world: &mut World) {
        let ids: Vec<_> = world
            .store
            .players
            .iter()
            .filter(|p| !p.is_bot)
            .map(|p| p.id)
            .collect();
        for id in ids {
            world.apply(Command::Connected { player: id });
        }
        world.tick(dt(world));
        assert_eq!(world.phase, MatchPhase::HeroSelect);
        let heroes: Vec<_> = world.content.heroes.iter().map(|h| h.id).collect();
        let players: Vec<_> = world
            .store
            .players
            .iter()
            .filter(|p| !p.is_bot)
            .map(|p| p.id)
            .collect();
        for (i, id) in players.into_iter().enumerate() {
            world.apply(Command::SelectHero {
                player: id,
                hero: heroes[i % heroes.len()],
            });
            world.apply(Command::LockHero { player: id });
        }
        // Bots lock after their pick delay.
        let steps = (world.content.rules.hero_select_seconds / dt(world)) as u32 + 2;
        for _ in 0..steps {
            if world.phase == MatchPhase::Playing {
                break;
            }
            world.tick(dt(world));
        }
        assert_eq!(world.phase, MatchPhase::Playing);
    }

    #[test]
    fn waiting_advances_once_all_humans_connect() {
        let mut w = world(2, 0);
        w.tick(dt(&w));
        assert_eq!(w.phase, MatchPhase::Waiting);

        w.apply(Command::Connected { player: PlayerId(1) });
        w.tick(dt(&w));
        assert_eq!(w.phase, MatchPhase::Waiting);

        w.apply(Command::Connected { player: PlayerId(2) });
        let events = w.tick(dt(&w));
        assert_eq!(w.phase, MatchPhase::HeroSelect);
        assert!(matches!(
            events[0],
            Event::PhaseChanged(MatchPhase::HeroSelect)
        ));
    }

    #[test]
    fn locking_a_taken_hero_is_rejected() {
        let mut w = world(2, 0);
        w.apply(Command::Connected { player: PlayerId(1) });
        w.apply(Command::Connected { player: PlayerId(2) });
        w.tick(dt(&w));

        let hero = w.content.heroes[0].id;
        w.apply(Command::SelectHero { player: PlayerId(1), hero });
        w.apply(Command::LockHero { player: PlayerId(1) });

        let events = w.apply(Command::SelectHero { player: PlayerId(2), hero });
        assert!(matches!(events[0], Event::HeroUnavailable { .. }));
    }

    #[test]
    fn match_start_initializes_players_towers_and_first_wave() {
        let mut w = world(2, 0);
        start(&mut w);

        for p in &w.store.players {
            assert!(p.alive);
            assert_eq!(p.gold, w.content.rules.starting_gold);
            assert_eq!(p.level, 1);
            assert!(p.hero.is_some());
            assert_eq!(p.abilities.len(), 4);
            assert_eq!(p.abilities[0].level, 1);
            assert_eq!(p.abilities[3].level, 0);
        }
        assert_eq!(w.store.towers.len(), w.content.map.towers.len());
        // 2 teams x 3 lanes x 5 creeps, no siege in wave one.
        assert_eq!(w.store.creeps.len(), 30);
        assert!(!w.store.monsters.is_empty());
    }

    #[test]
    fn select_expiry_auto_assigns_and_starts() {
        let mut w = world(1, 1);
        w.apply(Command::Connected { player: PlayerId(1) });
        w.tick(dt(&w));
        assert_eq!(w.phase, MatchPhase::HeroSelect);

        // Nobody locks; run the countdown out.
        let steps = (w.content.rules.hero_select_seconds / dt(&w)) as u32 + 2;
        for _ in 0..steps {
            if w.phase == MatchPhase::Playing {
                break;
            }
            w.tick(dt(&w));
        }
        assert_eq!(w.phase, MatchPhase::Playing);
        assert!(w.store.players.iter().all(|p| p.hero.is_some()));
    }

    #[test]
    fn passive_gold_accrues_every_whole_second() {
        let mut w = world(1, 1);
        start(&mut w);
        let before = w.store.players[0].gold;

        // 20 ticks at 50ms = exactly one second.
        for _ in 0..20 {
            w.tick(dt(&w));
        }
        assert_eq!(
            w.store.players[0].gold,
            before + w.content.rules.passive_gold_per_sec
        );
    }

    #[test]
    fn kill_threshold_ends_the_match() {
        let mut w = world(2, 0);
        start(&mut w);
        w.scores.radiant = w.content.rules.kill_threshold;

        let events = w.tick(dt(&w));
        assert_eq!(w.phase, MatchPhase::Ended);
        let end = events
            .iter()
            .find(|e| matches!(e, Event::GameEnd { .. }))
            .expect("game end emitted");
        let Event::GameEnd {
            winner,
            kills_radiant,
            standings,
            ..
        } = end
        else {
            unreachable!();
        };
        assert_eq!(*winner, Team::Radiant);
        assert_eq!(*kills_radiant, w.content.rules.kill_threshold);
        assert_eq!(standings.len(), w.store.players.len());
        // Further ticks change nothing.
        let events = w.tick(dt(&w));
        assert!(events.is_empty());
    }

    #[test]
    fn ability_cooldowns_recover_while_playing_and_freeze_paused() {
        let mut w = world(1, 1);
        start(&mut w);
        let step = dt(&w);
        w.store.player_mut(PlayerId(1)).unwrap().abilities[0].cooldown = 40.0 * step;

        // Half the duration elapses, half remains.
        for _ in 0..20 {
            w.tick(step);
        }
        let remaining = w.store.player(PlayerId(1)).unwrap().abilities[0].cooldown;
        assert!((remaining - 20.0 * step).abs() < 1e-3);

        // Pausing freezes the timer.
        w.apply(Command::Disconnected { player: PlayerId(1) });
        assert_eq!(w.phase, MatchPhase::Paused);
        w.tick(step);
        assert_eq!(
            w.store.player(PlayerId(1)).unwrap().abilities[0].cooldown,
            remaining
        );

        // Resume and run the rest out.
        w.apply(Command::Connected { player: PlayerId(1) });
        for _ in 0..21 {
            w.tick(step);
        }
        assert_eq!(w.store.player(PlayerId(1)).unwrap().abilities[0].cooldown, 0.0);
    }

    #[test]
    fn losing_all_base_towers_loses_the_match() {
        let mut w = world(2, 0);
        start(&mut w);
        for t in w.store.towers.iter_mut() {
            if t.team == Team::Dire && t.tier == 4 {
                t.alive = false;
                t.health = 0;
            }
        }
        w.tick(dt(&w));
        assert_eq!(w.phase, MatchPhase::Ended);
        assert_eq!(w.winner, Some(Team::Radiant));
    }

    #[test]
    fn time_limit_settles_by_kills_with_radiant_tiebreak() {
        let mut w = world(2, 0);
        start(&mut w);
        w.clock = w.content.rules.time_limit;
        w.tick(dt(&w));
        assert_eq!(w.winner, Some(Team::Radiant));
    }

    #[test]
    fn all_humans_disconnecting_pauses_and_reconnect_resumes() {
        let mut w = world(1, 1);
        start(&mut w);

        let events = w.apply(Command::Disconnected { player: PlayerId(1) });
        assert_eq!(w.phase, MatchPhase::Paused);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::PlayerDisconnected { .. })));

        let events = w.apply(Command::Connected { player: PlayerId(1) });
        assert_eq!(w.phase, MatchPhase::Playing);
        assert!(matches!(
            events[0],
            Event::PhaseChanged(MatchPhase::Playing)
        ));
    }

    #[test]
    fn move_command_sets_a_path_toward_the_point() {
        let mut w = world(1, 1);
        start(&mut w);
        let target = Vec2::new(1200.0, 1200.0);
        w.apply(Command::Move { player: PlayerId(1), point: target });
        let p = w.store.player(PlayerId(1)).unwrap();
        assert!(p.move_target.is_some());
    }

    #[test]
    fn dead_player_respawns_at_base_after_the_timer() {
        let mut w = world(1, 1);
        start(&mut w);
        let step = dt(&w);
        {
            let p = w.store.player_mut(PlayerId(1)).unwrap();
            p.alive = false;
            p.health = 0;
            p.respawn_timer = 2.0 * step;
        }
        w.tick(step);
        assert!(!w.store.player(PlayerId(1)).unwrap().alive);
        w.tick(step);
        let p = w.store.player(PlayerId(1)).unwrap();
        assert!(p.alive);
        assert_eq!(p.health, p.max_health);
        assert_eq!(p.pos, w.content.map.spawn_point(p.team));
    }
}
