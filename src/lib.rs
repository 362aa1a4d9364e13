pub mod sequential;

pub use sequential::tensor::Tensor;
pub use sequential::layer::{
    Layer,
    Dense,
    ReLU,
};
pub use sequential::loss::{
    Loss,
    MeanSquaredError
};
pub use sequential::optimizer::{
    Optimizer,
    Adam,
};
pub use sequential::Sequential;

pub mod agent;

pub use agent::Agent;
pub use agent::model::{NetworkShape, QNetwork};
pub use agent::replaybuffer::{ReplayBuffer, Transition};
pub use agent::trainer::QTrainer;

pub mod game;
pub mod state;

pub use game::{Action, Direction, Game, TickOutcome};
pub use state::{STATE_SIZE, StateVector};

pub mod training;
pub mod scores;
pub mod render;

pub use training::{EpisodeSummary, TrainingLoop};
pub use scores::{CsvScoreLog, ScoreHistory, ScoreObserver};

pub mod config;
pub mod error;
pub mod logging;

pub use config::{AgentConfig, GameConfig, TrainConfig};
pub use error::{Result, SnakeError};
