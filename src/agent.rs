pub mod model;
pub mod replaybuffer;
pub mod trainer;

use crate::config::AgentConfig;
use crate::error::Result;
use crate::game::Action;
use crate::state::StateVector;
use model::{NetworkShape, QNetwork};
use replaybuffer::{ReplayBuffer, Transition};
use trainer::QTrainer;

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Learner that plays the game: picks actions, remembers what happened and
/// trains its value network on it.
pub struct Agent {
    config: AgentConfig,
    n_games: usize,
    model: QNetwork,
    trainer: QTrainer,
    memory: ReplayBuffer,
    rng: StdRng,
}

impl Agent {
    pub fn new(config: AgentConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let model = QNetwork::new(NetworkShape::with_hidden(config.hidden_size), config.learning_rate, &mut rng);
        Self::assemble(config, model, rng)
    }

    /// Fresh agent whose network comes from a saved checkpoint.
    pub fn load(path: &Path, config: AgentConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let model = QNetwork::load(path, NetworkShape::with_hidden(config.hidden_size), config.learning_rate)?;
        Ok(Self::assemble(config, model, rng))
    }

    fn assemble(config: AgentConfig, model: QNetwork, rng: StdRng) -> Self {
        Self {
            trainer: QTrainer::new(config.gamma),
            memory: ReplayBuffer::new(config.max_memory),
            n_games: 0,
            config,
            model,
            rng,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn n_games(&self) -> usize {
        self.n_games
    }

    pub fn finish_game(&mut self) {
        self.n_games += 1;
    }

    pub fn memory(&self) -> &ReplayBuffer {
        &self.memory
    }

    pub fn model_mut(&mut self) -> &mut QNetwork {
        &mut self.model
    }

    pub fn exploration_budget(&self) -> usize {
        self.config.exploration_budget()
    }

    /// Exploration draws are uniform in `[0, budget / p0)` and explore when
    /// below the games remaining in the budget. Dividing by `p0` rather than
    /// `1 - p0` is what makes the first game explore with probability `p0`
    /// instead of `1 - p0`.
    pub fn range_upper_bound(&self) -> f64 {
        self.exploration_budget() as f64 / self.config.initial_exploring_probability
    }

    /// Chance of a random action during game `n_games`. Starts at the
    /// configured initial probability, falls linearly and is exactly 0 once
    /// the exploration budget is used up.
    pub fn exploration_probability(&self, n_games: usize) -> f64 {
        let budget = self.exploration_budget();
        let p0 = self.config.initial_exploring_probability;
        if n_games >= budget || p0 <= 0.0 {
            return 0.0;
        }
        let remaining = (budget - n_games) as f64;
        (p0 * (remaining / budget as f64)).min(1.0)
    }

    // the threshold p(n) * bound equals the games left in the budget
    fn should_explore(&mut self) -> bool {
        let probability = self.exploration_probability(self.n_games);
        if probability <= 0.0 {
            return false;
        }
        let bound = self.range_upper_bound();
        self.rng.random_range(0.0..bound) < probability * bound
    }

    pub fn get_action(&mut self, state: &StateVector) -> Action {
        if self.should_explore() {
            let action = Action::ALL[self.rng.random_range(0..Action::ALL.len())];
            debug!(%action, "picking random option");
            return action;
        }

        let values = self.model.predict_one(state);
        let action = greedy_action(&values);
        debug!(%action, ?values, "picking predicted option");
        action
    }

    pub fn remember(&mut self, transition: Transition) {
        self.memory.add(transition);
    }

    pub fn train_short_memory(&mut self, transition: &Transition) -> f32 {
        self.trainer.train_step(&mut self.model, std::slice::from_ref(transition))
    }

    /// Replays a random batch from memory, or the whole memory while it is
    /// smaller than the batch size.
    pub fn train_long_memory(&mut self) -> f32 {
        let batch = self.memory.sample(self.config.batch_size, &mut self.rng);
        let loss = self.trainer.train_step(&mut self.model, &batch);
        debug!(batch = batch.len(), memory = self.memory.len(), loss, "long memory trained");
        loss
    }

    pub fn save_model(&self, dir: &Path, file_name: &str) -> Result<PathBuf> {
        self.model.save(dir, file_name)
    }
}

/// First action holding the highest value, in Straight, Right, Left order.
pub fn greedy_action(values: &[f32]) -> Action {
    let mut best = 0;
    for i in 1..Action::ALL.len().min(values.len()) {
        if values[i] > values[best] {
            best = i;
        }
    }
    Action::ALL[best]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(seed: u64) -> Agent {
        Agent::new(AgentConfig {
            seed: Some(seed),
            hidden_size: 16,
            ..AgentConfig::default()
        })
    }

    #[test]
    fn test_exploration_schedule_bounds() {
        let agent = agent(1);
        assert_eq!(agent.exploration_budget(), 70);
        assert!((agent.range_upper_bound() - 70.0 / 0.6).abs() < 1e-9);
        assert_eq!(agent.exploration_probability(0), 0.6);
        assert!((agent.exploration_probability(35) - 0.3).abs() < 1e-12);
        assert_eq!(agent.exploration_probability(70), 0.0);
        assert_eq!(agent.exploration_probability(500), 0.0);
    }

    #[test]
    fn test_exploration_is_non_increasing() {
        let agent = agent(1);
        let probabilities: Vec<f64> = (0..100).map(|n| agent.exploration_probability(n)).collect();
        assert!(probabilities.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_realized_exploration_rate() {
        let mut agent = agent(2);
        let draws = 20_000;
        let explored = (0..draws).filter(|_| agent.should_explore()).count();
        let rate = explored as f64 / draws as f64;
        assert!((rate - 0.6).abs() < 0.02, "rate {}", rate);

        agent.n_games = 35;
        let explored = (0..draws).filter(|_| agent.should_explore()).count();
        let rate = explored as f64 / draws as f64;
        assert!((rate - 0.3).abs() < 0.02, "rate {}", rate);

        agent.n_games = 70;
        assert!((0..1000).all(|_| !agent.should_explore()));
    }

    #[test]
    fn test_exploitation_is_deterministic() {
        let mut agent = agent(3);
        agent.n_games = 70;
        let state = [0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0];

        let first = agent.get_action(&state);
        assert!((0..20).all(|_| agent.get_action(&state) == first));
    }

    #[test]
    fn test_greedy_tie_break() {
        assert_eq!(greedy_action(&[0.0, 0.0, 0.0]), Action::Straight);
        assert_eq!(greedy_action(&[0.1, 0.5, 0.5]), Action::Right);
        assert_eq!(greedy_action(&[0.1, 0.2, 0.5]), Action::Left);
    }

    #[test]
    fn test_long_memory_with_small_memory() {
        let mut agent = agent(4);
        assert_eq!(agent.train_long_memory(), 0.0);

        for i in 0..5 {
            agent.remember(Transition {
                state: [0.0; 11],
                action: Action::ALL[i % 3],
                reward: 1.0,
                next_state: [0.0; 11],
                terminal: false,
            });
        }
        assert_eq!(agent.memory().len(), 5);
        assert!(agent.train_long_memory() > 0.0);
    }

    #[test]
    fn test_load_restores_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let mut original = agent(5);
        let path = original.save_model(dir.path(), "model.bin").unwrap();
        let state = [1.0; 11];

        let mut restored = Agent::load(&path, original.config().clone()).unwrap();
        assert_eq!(restored.n_games(), 0);
        assert_eq!(original.model_mut().predict_one(&state), restored.model_mut().predict_one(&state));
    }
}
