//! The world owns every live entity and drives one simulation tick at a time.
//!
//! A tick runs in fixed phases: update and bounds for every entity, collision
//! detection over the resulting snapshot, collision resolution, then the
//! population check. Entities never touch the entity list themselves; they
//! queue [`Command`]s that the world applies between phases.

use std::time::Instant;

use log::{debug, info};
use rand::Rng;
use rand::rngs::StdRng;
use ratatui::style::Color;

use crate::collision::detect_collisions;
use crate::config::Tuning;
use crate::entities::{Enemy, Entity, EntityContext, EntityId, EntityKind, Player};
use crate::geometry::Point;
use crate::input::ActionSource;
use crate::surface::{DrawSurface, TextAlign, TextBaseline};

/// Distance of the score text above the bottom edge.
const SCORE_MARGIN: f64 = 50.0;

/// World dimensions, fixed for the whole session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Things that happened during a tick that the shell may want to react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldEvent {
    PlayerDestroyed { position: Point },
    EnemyDestroyed { size: f64, split: bool },
    EnemySpawned { position: Point, size: f64 },
    MissileFired,
}

/// A deferred change to the world requested by an entity.
#[derive(Debug, Clone)]
pub enum Command {
    Spawn(Entity),
    Remove(EntityId),
    AddScore(u64),
    ResetScore,
}

/// Commands and events queued during a phase, applied by the world afterwards.
#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Vec<Command>,
    events: Vec<WorldEvent>,
}

impl CommandQueue {
    pub fn spawn(&mut self, entity: Entity) {
        self.commands.push(Command::Spawn(entity));
    }

    pub fn remove(&mut self, id: EntityId) {
        self.commands.push(Command::Remove(id));
    }

    pub fn add_score(&mut self, points: u64) {
        self.commands.push(Command::AddScore(points));
    }

    pub fn reset_score(&mut self) {
        self.commands.push(Command::ResetScore);
    }

    pub fn emit(&mut self, event: WorldEvent) {
        self.events.push(event);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn events(&self) -> &[WorldEvent] {
        &self.events
    }
}

pub struct World {
    viewport: Viewport,
    tuning: Tuning,
    rng: StdRng,
    /// Live entities in render order
    entities: Vec<(EntityId, Entity)>,
    next_id: u64,
    score: u64,
    enemy_mass_budget: f64,
    last_population_check: Instant,
    queue: CommandQueue,
    events: Vec<WorldEvent>,
}

impl World {
    /// Creates an empty world. Call [`World::populate`] for the opening
    /// layout.
    pub fn new(viewport: Viewport, tuning: Tuning, rng: StdRng, now: Instant) -> Self {
        let enemy_mass_budget = tuning.initial_mass_budget;
        Self {
            viewport,
            tuning,
            rng,
            entities: Vec::new(),
            next_id: 0,
            score: 0,
            enemy_mass_budget,
            last_population_check: now,
            queue: CommandQueue::default(),
            events: Vec::new(),
        }
    }

    /// Scatters the initial enemies across the viewport and places the ship
    /// at the centre.
    pub fn populate(&mut self) {
        for _ in 0..self.tuning.initial_enemies {
            let position = Point::new(
                self.viewport.width * self.rng.random::<f64>(),
                self.viewport.height * self.rng.random::<f64>(),
            );
            let enemy = Enemy::new(position, None, &self.tuning, &mut self.rng);
            self.spawn(Entity::Enemy(enemy));
        }
        let player = Player::new(self.viewport.center(), &self.tuning);
        self.spawn(Entity::Player(player));

        info!(
            "world populated: {} enemies, mass {:.1} of budget {:.1}",
            self.enemy_count(),
            self.enemy_mass(),
            self.enemy_mass_budget
        );
    }

    /// Adds an entity at the end of the render order.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push((id, entity));
        id
    }

    /// Removes an entity. Removing an id that is already gone is a no-op.
    pub fn remove(&mut self, id: EntityId) -> bool {
        match self.entities.iter().position(|(e, _)| *e == id) {
            Some(index) => {
                self.entities.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|(e, _)| *e == id)
            .map(|(_, entity)| entity)
    }

    pub fn entities(&self) -> &[(EntityId, Entity)] {
        &self.entities
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Combined size of every live enemy.
    pub fn enemy_mass(&self) -> f64 {
        self.enemies().map(|enemy| enemy.size).sum()
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies().count()
    }

    pub fn enemy_mass_budget(&self) -> f64 {
        self.enemy_mass_budget
    }

    pub fn player(&self) -> Option<&Player> {
        self.entities.iter().find_map(|(_, entity)| match entity {
            Entity::Player(player) => Some(player),
            _ => None,
        })
    }

    fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.entities.iter().filter_map(|(_, entity)| match entity {
            Entity::Enemy(enemy) => Some(enemy),
            _ => None,
        })
    }

    /// Advances the simulation by one step.
    pub fn tick(&mut self, input: &dyn ActionSource, now: Instant) {
        for (id, entity) in self.entities.iter_mut() {
            let mut ctx = EntityContext {
                id: *id,
                now,
                viewport: self.viewport,
                tuning: &self.tuning,
                input,
                rng: &mut self.rng,
                commands: &mut self.queue,
            };
            entity.update(&mut ctx);
            entity.check_bounds(&mut ctx);
        }
        self.apply_commands();

        // Every hit is resolved against the same snapshot; nothing is removed
        // until the whole list has been handled.
        for id in detect_collisions(&self.entities) {
            if let Some((_, entity)) = self.entities.iter().find(|(e, _)| *e == id) {
                let mut ctx = EntityContext {
                    id,
                    now,
                    viewport: self.viewport,
                    tuning: &self.tuning,
                    input,
                    rng: &mut self.rng,
                    commands: &mut self.queue,
                };
                entity.on_collision(&mut ctx);
            }
        }
        self.apply_commands();

        self.regulate_population(now);
    }

    fn apply_commands(&mut self) {
        for command in std::mem::take(&mut self.queue.commands) {
            match command {
                Command::Spawn(entity) => {
                    self.spawn(entity);
                }
                Command::Remove(id) => {
                    self.remove(id);
                }
                Command::AddScore(points) => self.score = self.score.saturating_add(points),
                Command::ResetScore => {
                    info!("ship destroyed, score {} lost", self.score);
                    self.score = 0;
                }
            }
        }
        self.events.append(&mut self.queue.events);
    }

    /// Tops up the enemy population when the live mass has fallen below the
    /// budget. Runs once more than `population_check_ms` has passed since the
    /// last check; missed checks are not caught up.
    pub fn regulate_population(&mut self, now: Instant) -> Option<EntityId> {
        if now.duration_since(self.last_population_check) <= self.tuning.population_check_interval()
        {
            return None;
        }
        self.last_population_check = now;

        let mass = self.enemy_mass();
        debug!(
            "population check: mass {:.1} of budget {:.1}",
            mass, self.enemy_mass_budget
        );
        if mass >= self.enemy_mass_budget {
            return None;
        }

        let position = self.edge_spawn_position();
        let enemy = Enemy::new(position, None, &self.tuning, &mut self.rng);
        let size = enemy.size;
        let id = self.spawn(Entity::Enemy(enemy));
        self.enemy_mass_budget += self.tuning.mass_budget_increment;
        self.events.push(WorldEvent::EnemySpawned { position, size });
        info!(
            "spawned enemy of size {:.1} at ({:.0}, {:.0}), budget now {:.1}",
            size, position.x, position.y, self.enemy_mass_budget
        );
        Some(id)
    }

    /// A point just beyond one of the four edges, chosen by two coin flips.
    fn edge_spawn_position(&mut self) -> Point {
        let offset = self.tuning.spawn_edge_offset;
        let Viewport { width, height } = self.viewport;
        if self.rng.random_bool(0.5) {
            let x = if self.rng.random_bool(0.5) {
                width + offset
            } else {
                -offset
            };
            Point::new(x, height * self.rng.random::<f64>())
        } else {
            let y = if self.rng.random_bool(0.5) {
                height + offset
            } else {
                -offset
            };
            Point::new(width * self.rng.random::<f64>(), y)
        }
    }

    /// Draws every entity in list order followed by the score.
    pub fn render(&self, surface: &mut dyn DrawSurface) {
        surface.clear();
        for (_, entity) in &self.entities {
            entity.render(surface);
        }

        let center = self.viewport.center();
        surface.begin_path();
        surface.set_line_width(0.8);
        surface.set_stroke_color(Color::White);
        surface.draw_text(
            &self.score.to_string(),
            Point::new(center.x, self.viewport.height - SCORE_MARGIN),
            TextAlign::Center,
            TextBaseline::Hanging,
        );
    }

    /// Events recorded since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of live entities of the given kind.
    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.entities
            .iter()
            .filter(|(_, entity)| entity.kind() == kind)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Missile;
    use crate::input::{Action, HeldActions};
    use crate::surface::DrawList;
    use rand::SeedableRng;
    use std::time::Duration;

    const VIEWPORT: Viewport = Viewport::new(800.0, 600.0);

    fn empty_world(now: Instant) -> World {
        World::new(
            VIEWPORT,
            Tuning::default(),
            StdRng::seed_from_u64(21),
            now,
        )
    }

    fn still_enemy(x: f64, y: f64, size: f64) -> Entity {
        Entity::Enemy(Enemy::with_motion(
            Point::new(x, y),
            size,
            0.0,
            0.0,
            Point::default(),
            Color::White,
        ))
    }

    #[test]
    fn test_score_saturates() {
        let mut world = empty_world(Instant::now());
        world.score = u64::MAX - 5;
        world.queue.add_score(100);
        world.apply_commands();
        assert_eq!(world.score(), u64::MAX);
    }

    #[test]
    fn test_viewport_center() {
        assert_eq!(VIEWPORT.center(), Point::new(400.0, 300.0));
    }

    #[test]
    fn test_populate() {
        let mut world = empty_world(Instant::now());
        world.populate();

        assert_eq!(world.enemy_count(), 8);
        assert_eq!(world.count_of(EntityKind::Player), 1);
        assert_eq!(world.player().map(|p| p.center), Some(VIEWPORT.center()));
        // The ship is added last so it is drawn on top.
        assert!(matches!(world.entities().last(), Some((_, Entity::Player(_)))));
        for (_, entity) in world.entities() {
            if let Entity::Enemy(enemy) = entity {
                assert!(enemy.center.x >= 0.0 && enemy.center.x <= 800.0);
                assert!(enemy.center.y >= 0.0 && enemy.center.y <= 600.0);
            }
        }
    }

    #[test]
    fn test_spawn_assigns_fresh_ids() {
        let mut world = empty_world(Instant::now());
        let a = world.spawn(still_enemy(10.0, 10.0, 60.0));
        let b = world.spawn(still_enemy(20.0, 10.0, 60.0));
        assert_ne!(a, b);
        assert!(world.remove(a));
        let c = world.spawn(still_enemy(30.0, 10.0, 60.0));
        assert_ne!(a, c);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut world = empty_world(Instant::now());
        let id = world.spawn(still_enemy(10.0, 10.0, 60.0));
        assert!(world.remove(id));
        assert!(!world.remove(id));
        assert!(world.get(id).is_none());
    }

    #[test]
    fn test_missile_hit_splits_enemy_and_scores() {
        let now = Instant::now();
        let mut world = empty_world(now);
        world.spawn(still_enemy(100.0, 100.0, 100.0));
        // Moves onto the enemy's first edge during this tick.
        world.spawn(Entity::Missile(Missile::new(
            Point::new(63.0, 110.0),
            0.0,
            Point::new(0.0, -10.0),
            &Tuning::default(),
        )));

        world.tick(&HeldActions::new(), now);

        assert_eq!(world.score(), 100);
        assert_eq!(world.count_of(EntityKind::Missile), 0);
        assert_eq!(world.enemy_count(), 2);
        assert_eq!(world.enemy_mass(), 100.0);
        assert!(world.drain_events().contains(&WorldEvent::EnemyDestroyed {
            size: 100.0,
            split: true
        }));
    }

    #[test]
    fn test_fire_spawns_missile_next_to_player() {
        let now = Instant::now();
        let mut world = empty_world(now);
        world.spawn(Entity::Player(Player::new(
            VIEWPORT.center(),
            &Tuning::default(),
        )));

        world.tick(&HeldActions::from([Action::Fire]), now);

        assert_eq!(world.count_of(EntityKind::Missile), 1);
        assert_eq!(world.drain_events(), vec![WorldEvent::MissileFired]);
        assert!(world.drain_events().is_empty());
    }

    #[test]
    fn test_missile_leaving_viewport_is_removed() {
        let now = Instant::now();
        let mut world = empty_world(now);
        world.spawn(Entity::Missile(Missile::new(
            Point::new(400.0, 5.0),
            0.0,
            Point::new(0.0, -10.0),
            &Tuning::default(),
        )));

        world.tick(&HeldActions::new(), now);
        assert_eq!(world.count_of(EntityKind::Missile), 0);
    }

    #[test]
    fn test_population_waits_for_interval() {
        let start = Instant::now();
        let mut world = empty_world(start);

        assert!(
            world
                .regulate_population(start + Duration::from_millis(5000))
                .is_none()
        );
        let id = world.regulate_population(start + Duration::from_millis(5001));
        assert!(id.is_some());
        assert_eq!(world.enemy_mass_budget(), 850.0);

        // The timer restarted at the last check.
        assert!(
            world
                .regulate_population(start + Duration::from_millis(9000))
                .is_none()
        );
    }

    #[test]
    fn test_population_spawns_outside_one_edge() {
        let start = Instant::now();
        for seed in 0..32 {
            let mut world = World::new(
                VIEWPORT,
                Tuning::default(),
                StdRng::seed_from_u64(seed),
                start,
            );
            let id = world.regulate_population(start + Duration::from_millis(5001));
            let center = id.and_then(|id| world.get(id)).map(Entity::center);
            let Some(center) = center else {
                panic!("no enemy spawned for seed {seed}");
            };
            let outside_x = center.x == -100.0 || center.x == 900.0;
            let outside_y = center.y == -100.0 || center.y == 700.0;
            assert!(outside_x != outside_y, "{center:?}");
        }
    }

    #[test]
    fn test_population_respects_budget() {
        let start = Instant::now();
        let mut world = empty_world(start);
        for i in 0..8 {
            world.spawn(still_enemy(50.0 + 80.0 * i as f64, 300.0, 100.0));
        }
        assert!(
            world
                .regulate_population(start + Duration::from_millis(5001))
                .is_none()
        );
        assert_eq!(world.enemy_mass_budget(), 800.0);
    }

    #[test]
    fn test_render_draws_score_last() {
        let mut world = empty_world(Instant::now());
        world.spawn(still_enemy(100.0, 100.0, 100.0));
        world.score = 1230;

        let mut list = DrawList::default();
        world.render(&mut list);

        assert_eq!(list.lines().len(), 12);
        let text = &list.texts()[0];
        assert_eq!(text.text, "1230");
        assert_eq!(text.at, Point::new(400.0, 550.0));
        assert_eq!(text.align, TextAlign::Center);
        assert_eq!(text.baseline, TextBaseline::Hanging);
    }

    // Property-based tests
    #[cfg(test)]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_score_changes_only_through_kills_and_deaths(
                seed in 0u64..1000,
                inputs in prop::collection::vec(0u8..16, 1..120)
            ) {
                let start = Instant::now();
                let mut world = World::new(
                    VIEWPORT,
                    Tuning::default(),
                    StdRng::seed_from_u64(seed),
                    start,
                );
                world.populate();

                for (frame, bits) in inputs.iter().enumerate() {
                    let mut held = HeldActions::new();
                    for (bit, action) in [
                        Action::TurnLeft,
                        Action::TurnRight,
                        Action::Thrust,
                        Action::Fire,
                    ]
                    .into_iter()
                    .enumerate()
                    {
                        if bits & (1 << bit) != 0 {
                            held.press(action);
                        }
                    }

                    let before = world.score();
                    world.tick(&held, start + Duration::from_millis(16 * frame as u64));
                    let events = world.drain_events();
                    let died = events
                        .iter()
                        .any(|e| matches!(e, WorldEvent::PlayerDestroyed { .. }));

                    if !died {
                        prop_assert!(world.score() >= before);
                    }
                    prop_assert_eq!(world.count_of(EntityKind::Player), 1);
                }
            }
        }
    }
}
