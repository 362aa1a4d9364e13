pub mod action;

use std::collections::VecDeque;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use tracing::{debug, warn};

use crate::config::GameConfig;
pub use action::{Action, Direction};

pub type Position = (i32, i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Wall,
    Body,
}

/// What one tick produced for the learner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub reward: f32,
    pub score: u32,
    pub terminal: bool,
}

#[derive(Clone)]
pub struct Game {
    config: GameConfig,
    head: Position,
    body: VecDeque<Position>, // front is the neck
    heading: Direction,
    food: Position,
    score: u32,
    ticks: usize,
    grow_pending: bool, // add a segment on the next move
    rng: StdRng,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut instance = Self {
            config,
            head: (0, 0),
            body: VecDeque::new(),
            heading: Direction::Right,
            food: (0, 0),
            score: 0,
            ticks: 0,
            grow_pending: false,
            rng,
        };
        instance.reset();

        instance
    }

    pub fn head(&self) -> Position {self.head}
    pub fn body(&self) -> &VecDeque<Position> {&self.body}
    pub fn food(&self) -> Position {self.food}
    pub fn heading(&self) -> Direction {self.heading}
    pub fn score(&self) -> u32 {self.score}
    pub fn ticks(&self) -> usize {self.ticks}
    pub fn length(&self) -> usize {self.body.len() + 1}
    pub fn grid_size(&self) -> (i32, i32) {(self.config.grid_width, self.config.grid_height)}

    /// Snake of the configured length in the middle of the grid, facing right.
    pub fn reset(&mut self) {
        let head = (self.config.grid_width / 2, self.config.grid_height / 2);
        self.head = head;
        self.body = (1..self.config.initial_length as i32)
            .map(|i| (head.0 - i, head.1))
            .collect();
        self.heading = Direction::Right;
        self.score = 0;
        self.ticks = 0;
        self.grow_pending = false;
        self.place_food();
    }

    /// Applies `action`, moves one cell and scores the result. A terminal
    /// outcome leaves the snake where it crashed until the next `reset`.
    pub fn next_tick(&mut self, action: Action) -> TickOutcome {
        self.ticks += 1;
        self.heading = self.heading.rotate(action);

        let new_head = self.neighbour(self.heading);
        // judged against the pre-move body, exactly like the lookahead
        let collision = self.collision_at(new_head);
        self.advance(new_head);

        let mut reward = 0.0;
        if self.head == self.food {
            reward = self.config.food_reward;
            self.score += 1;
            self.place_food();
            self.grow_pending = true;
        }

        let out_of_steps = self.ticks > self.config.steps_per_length * self.length();
        if collision.is_some() || out_of_steps {
            debug!(?collision, ticks = self.ticks, score = self.score, "game over");
            return TickOutcome {
                reward: self.config.death_penalty,
                score: self.score,
                terminal: true,
            };
        }

        TickOutcome {
            reward,
            score: self.score,
            terminal: false,
        }
    }

    /// Would the head hit something if it moved into `pos` on the next tick?
    /// The tail cell is free unless the snake is about to grow, since the
    /// tail moves away on the same tick.
    pub fn collision_at(&self, pos: Position) -> Option<Collision> {
        if !self.in_bounds(pos) {
            return Some(Collision::Wall);
        }

        let blocking = if self.grow_pending {
            self.body.len()
        } else {
            self.body.len().saturating_sub(1)
        };
        if self.body.iter().take(blocking).any(|&segment| segment == pos) {
            return Some(Collision::Body);
        }

        None
    }

    /// Lookahead for the state vector: does taking `action` now end the game?
    pub fn danger(&self, action: Action) -> bool {
        let pos = self.neighbour(self.heading.rotate(action));
        let collision = self.collision_at(pos);
        if let Some(kind) = collision {
            debug!(%action, ?kind, "danger ahead");
        }
        collision.is_some()
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.0 >= 0 && pos.0 < self.config.grid_width && pos.1 >= 0 && pos.1 < self.config.grid_height
    }

    fn occupied(&self, pos: Position) -> bool {
        self.head == pos || self.body.contains(&pos)
    }

    fn neighbour(&self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        (self.head.0 + dx, self.head.1 + dy)
    }

    fn advance(&mut self, new_head: Position) {
        self.body.push_front(self.head);
        self.head = new_head;
        if self.grow_pending {
            self.grow_pending = false;
        } else {
            self.body.pop_back();
        }
    }

    // uniform over the grid, redrawn until it misses the snake
    fn place_food(&mut self) {
        let cells = (self.config.grid_width.max(0) * self.config.grid_height.max(0)) as usize;
        if self.length() >= cells {
            warn!(length = self.length(), "no free cell left for food");
            return;
        }

        loop {
            let pos = (
                self.rng.random_range(0..self.config.grid_width),
                self.rng.random_range(0..self.config.grid_height),
            );
            if !self.occupied(pos) {
                self.food = pos;
                debug!(?pos, "placed food");
                return;
            }
        }
    }

    /// Rearranges the board for tests; `body` starts at the neck.
    #[cfg(test)]
    pub(crate) fn arrange(&mut self, head: Position, body: &[Position], heading: Direction, food: Position) {
        self.head = head;
        self.body = body.iter().copied().collect();
        self.heading = heading;
        self.food = food;
        self.grow_pending = false;
    }
}
