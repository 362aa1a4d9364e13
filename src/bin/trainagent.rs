use anyhow::{Context, Result};
use snakeql::config::TrainConfig;
use snakeql::logging::{self, LogConfig};
use snakeql::training::TrainingLoop;

fn main() -> Result<()> {
    logging::init(&LogConfig::default()).context("failed to set up logging")?;

    let config = TrainConfig::default();
    println!("initializing Snake game and Q-learning agent...");
    println!("starting training for {} games...", config.agent.max_games);

    let mut training = TrainingLoop::new(config).context("failed to start training")?;
    while !training.is_finished() {
        if let Some(summary) = training.tick().context("training aborted")? {
            println!(
                "Game: {}, Score: {}, Record: {}, Mean score: {:.3}",
                summary.game, summary.score, summary.record, summary.mean_score
            );
        }
    }

    println!("\ntraining finished, best score {}", training.record());
    Ok(())
}
