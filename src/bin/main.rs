use macroquad::prelude::*;
use snakeql::config::TrainConfig;
use snakeql::logging::{self, LogConfig};
use snakeql::render;
use snakeql::training::TrainingLoop;
use tracing::{error, info};

// longest stretch of game time simulated in one frame
const MAX_FRAME_BACKLOG: f32 = 0.25; // seconds

fn window_conf() -> Conf {
    let game = TrainConfig::default().game;
    let (window_width, window_height) = render::window_size(game.grid_width, game.grid_height);
    Conf {
        window_title: "snakeql".to_owned(),
        window_width,
        window_height,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    if let Err(e) = logging::init(&LogConfig::default()) {
        eprintln!("logging disabled: {}", e);
    }

    let mut training = match TrainingLoop::new(TrainConfig::default()) {
        Ok(training) => training,
        Err(e) => {
            error!(error = %e, "could not start training");
            std::process::exit(1);
        }
    };

    let mut time_accumulator: f32 = 0.0; // seconds

    while !training.is_finished() {
        if is_key_pressed(KeyCode::Escape) {
            info!(games = training.history().games(), "escape pressed, stopping");
            break;
        }

        time_accumulator = (time_accumulator + get_frame_time()).min(MAX_FRAME_BACKLOG);
        let tick_time = 1.0 / training.speed();
        while time_accumulator >= tick_time && !training.is_finished() {
            time_accumulator -= tick_time;

            if let Err(e) = training.tick() {
                error!(error = %e, "training aborted");
                std::process::exit(1);
            }
        }

        render::draw(training.game(), training.history());
        next_frame().await
    }

    info!(record = training.record(), "training finished");
}
