use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Grid and reward rules for the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Playable cells per row (walls sit outside)
    pub grid_width: i32,
    /// Playable cells per column
    pub grid_height: i32,
    pub initial_length: usize,
    pub food_reward: f32,
    pub death_penalty: f32,
    /// Ticks allowed per body cell before the episode is cut off
    pub steps_per_length: usize,
    /// Fixed seed for food placement, `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        // 640x480 window, 20px cells, one-cell wall border
        Self {
            grid_width: 30,
            grid_height: 22,
            initial_length: 3,
            food_reward: 10.0,
            death_penalty: -10.0,
            steps_per_length: 50,
            seed: None,
        }
    }
}

/// Hyperparameters of the agent, its network and its replay memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub max_memory: usize,
    pub batch_size: usize,
    pub max_games: usize,
    /// Share of `max_games` during which random actions are possible
    pub exploring_percentage: f64,
    /// Chance of a random action in the very first game, must be in (0, 1)
    pub initial_exploring_probability: f64,
    pub learning_rate: f32,
    /// Discount rate, usually around 0.8-0.9
    pub gamma: f32,
    pub hidden_size: usize,
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_memory: 100_000,
            batch_size: 1_000,
            max_games: 1_000,
            exploring_percentage: 0.07,
            initial_exploring_probability: 0.6,
            learning_rate: 0.001,
            gamma: 0.9,
            hidden_size: 256,
            seed: None,
        }
    }
}

impl AgentConfig {
    /// Last game (exclusive) in which a random action can still be picked.
    pub fn exploration_budget(&self) -> usize {
        (self.max_games as f64 * self.exploring_percentage).floor() as usize
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub game: GameConfig,
    pub agent: AgentConfig,
    pub model_dir: PathBuf,
    pub model_file: String,
    /// Per-episode score log, `None` disables it
    pub scores_file: Option<PathBuf>,
    /// Ticks per second while exploring (window only)
    pub speed_initial: f32,
    /// Ticks per second once exploration is over (window only)
    pub speed_final: f32,
    /// Start from an existing checkpoint instead of fresh weights
    pub resume_from: Option<PathBuf>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            agent: AgentConfig::default(),
            model_dir: PathBuf::from("./model"),
            model_file: "model.bin".to_owned(),
            scores_file: Some(PathBuf::from("scores.csv")),
            speed_initial: 200.0,
            speed_final: 100.0,
            resume_from: None,
        }
    }
}
