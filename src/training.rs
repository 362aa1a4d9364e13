use crate::agent::Agent;
use crate::agent::replaybuffer::Transition;
use crate::config::TrainConfig;
use crate::error::Result;
use crate::game::Game;
use crate::scores::{CsvScoreLog, ScoreHistory, ScoreObserver};
use crate::state;

use tracing::info;

/// What a finished episode looked like.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub game: usize,
    pub score: u32,
    pub record: u32,
    pub mean_score: f64,
    pub new_record: bool,
}

/// Plays the game with the agent one tick at a time, training as it goes.
pub struct TrainingLoop {
    config: TrainConfig,
    game: Game,
    agent: Agent,
    history: ScoreHistory,
    observers: Vec<Box<dyn ScoreObserver>>,
}

impl TrainingLoop {
    /// Builds the agent (from `resume_from` when set) and opens the score
    /// log if one is configured.
    pub fn new(config: TrainConfig) -> Result<Self> {
        let agent = match &config.resume_from {
            Some(path) => Agent::load(path, config.agent.clone())?,
            None => Agent::new(config.agent.clone()),
        };
        let scores_file = config.scores_file.clone();

        let mut instance = Self::with_agent(config, agent);
        if let Some(path) = scores_file {
            instance.add_observer(Box::new(CsvScoreLog::create(&path)?));
        }

        Ok(instance)
    }

    pub fn with_agent(config: TrainConfig, agent: Agent) -> Self {
        Self {
            game: Game::new(config.game.clone()),
            agent,
            history: ScoreHistory::new(),
            observers: Vec::new(),
            config,
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn ScoreObserver>) {
        self.observers.push(observer);
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn history(&self) -> &ScoreHistory {
        &self.history
    }

    pub fn record(&self) -> u32 {
        self.history.record()
    }

    pub fn is_finished(&self) -> bool {
        self.agent.n_games() > self.config.agent.max_games
    }

    /// Ticks per second for the window: faster while still exploring.
    pub fn speed(&self) -> f32 {
        if self.agent.n_games() <= self.agent.exploration_budget() {
            self.config.speed_initial
        } else {
            self.config.speed_final
        }
    }

    /// Plays one tick. Returns a summary when the tick ended an episode.
    pub fn tick(&mut self) -> Result<Option<EpisodeSummary>> {
        let state_old = state::encode(&self.game);
        let action = self.agent.get_action(&state_old);
        let outcome = self.game.next_tick(action);
        let state_new = state::encode(&self.game);

        let transition = Transition {
            state: state_old,
            action,
            reward: outcome.reward,
            next_state: state_new,
            terminal: outcome.terminal,
        };
        self.agent.train_short_memory(&transition);
        self.agent.remember(transition);

        if !outcome.terminal {
            return Ok(None);
        }

        self.game.reset();
        self.agent.finish_game();
        self.agent.train_long_memory();

        let new_record = outcome.score > self.history.record();
        if new_record {
            self.agent.save_model(&self.config.model_dir, &self.config.model_file)?;
        }
        let mean_score = self.history.push(outcome.score);

        let summary = EpisodeSummary {
            game: self.agent.n_games(),
            score: outcome.score,
            record: self.history.record(),
            mean_score,
            new_record,
        };
        info!(
            game = summary.game,
            score = summary.score,
            record = summary.record,
            mean_score = summary.mean_score,
            "game over"
        );

        for observer in &mut self.observers {
            observer.on_episode(&self.history)?;
        }

        Ok(Some(summary))
    }

    /// Trains until `max_games` episodes have been played.
    pub fn run(&mut self) -> Result<()> {
        info!(max_games = self.config.agent.max_games, "training started");
        while !self.is_finished() {
            self.tick()?;
        }
        info!(games = self.history.games(), record = self.history.record(), "training finished");
        Ok(())
    }
}
