use crate::game::Game;
use crate::scores::ScoreHistory;
use macroquad::prelude::*;

pub const CELL_SIZE: f32 = 20.0;
pub const SCORE_AREA_HEIGHT: f32 = 60.0;
pub const SCORE_TEXT_SIZE: f32 = 28.0;
pub const PLOT_WIDTH: f32 = 260.0;

/// Window size in pixels for a grid of `width` x `height` playable cells,
/// including the wall border, the score panel and the plot panel.
pub fn window_size(width: i32, height: i32) -> (i32, i32) {
    let board_w = (width + 2) as f32 * CELL_SIZE;
    let board_h = (height + 2) as f32 * CELL_SIZE;
    ((board_w + PLOT_WIDTH) as i32, (SCORE_AREA_HEIGHT + board_h) as i32)
}

/// Draws one frame: score panel, walled board with food and snake, and the
/// score plot.
pub fn draw(game: &Game, history: &ScoreHistory) {
    clear_background(Color::new(0.05, 0.05, 0.1, 1.0));

    let (width, height) = game.grid_size();
    let board = Rect::new(
        0.0,
        SCORE_AREA_HEIGHT,
        (width + 2) as f32 * CELL_SIZE,
        (height + 2) as f32 * CELL_SIZE,
    );

    draw_score_area(game, history, board.w);
    draw_board(game, board);
    draw_plot(history, Rect::new(board.w, SCORE_AREA_HEIGHT, PLOT_WIDTH, board.h));
}

fn draw_score_area(game: &Game, history: &ScoreHistory, width: f32) {
    let score_area = Rect::new(0.0, 0.0, screen_width(), SCORE_AREA_HEIGHT);

    draw_rectangle(
        score_area.x,
        score_area.y,
        score_area.w,
        score_area.h,
        Color::new(0.1, 0.1, 0.2, 1.0),
    );
    draw_line(score_area.x, score_area.h, score_area.w, score_area.h, 2.0, BLACK);

    let score_text = format!(
        "Score: {}   Record: {}   Game: {}",
        game.score(),
        history.record(),
        history.games() + 1
    );
    let text_dims = measure_text(&score_text, None, SCORE_TEXT_SIZE as u16, 1.0);
    draw_text(
        &score_text,
        width / 2.0 - text_dims.width / 2.0,
        score_area.y + score_area.h / 2.0 + text_dims.height / 2.0,
        SCORE_TEXT_SIZE,
        WHITE,
    );
}

fn draw_board(game: &Game, board: Rect) {
    // wall ring, the playable area sits one cell inside
    draw_rectangle(board.x, board.y, board.w, board.h, DARKBLUE);
    let game_area = Rect::new(
        board.x + CELL_SIZE,
        board.y + CELL_SIZE,
        board.w - 2.0 * CELL_SIZE,
        board.h - 2.0 * CELL_SIZE,
    );
    draw_rectangle(game_area.x, game_area.y, game_area.w, game_area.h, BLACK);

    let (width, height) = game.grid_size();
    let grid_line_color = Color::new(0.4, 0.4, 0.4, 0.3);

    for i in 1..width {
        let x = game_area.x + i as f32 * CELL_SIZE;
        draw_line(x, game_area.y, x, game_area.y + game_area.h, 1.0, grid_line_color);
    }
    for i in 1..height {
        let y = game_area.y + i as f32 * CELL_SIZE;
        draw_line(game_area.x, y, game_area.x + game_area.w, y, 1.0, grid_line_color);
    }

    draw_cell(game_area, game.food(), Color::new(0.5, 0.0, 0.0, 1.0), RED);

    for &segment in game.body() {
        draw_cell(game_area, segment, DARKGREEN, GREEN);
    }
    if game.in_bounds(game.head()) {
        draw_cell(game_area, game.head(), DARKGREEN, LIME);
    }
}

fn draw_cell(area: Rect, pos: (i32, i32), border: Color, fill: Color) {
    let cell_fill_border: f32 = 2.0;
    let x = area.x + pos.0 as f32 * CELL_SIZE;
    let y = area.y + pos.1 as f32 * CELL_SIZE;

    draw_rectangle(x, y, CELL_SIZE - 1.0, CELL_SIZE - 1.0, border);
    draw_rectangle(
        x + cell_fill_border,
        y + cell_fill_border,
        (CELL_SIZE - 1.0) - cell_fill_border * 2.0,
        (CELL_SIZE - 1.0) - cell_fill_border * 2.0,
        fill,
    );
}

// scores in white, running mean in orange
fn draw_plot(history: &ScoreHistory, area: Rect) {
    draw_rectangle(area.x, area.y, area.w, area.h, Color::new(0.1, 0.1, 0.2, 1.0));
    let title_size = 20.0;
    draw_text("Training...", area.x + 10.0, area.y + title_size, title_size, WHITE);

    let scores = history.scores();
    if scores.len() < 2 {
        return;
    }

    let margin = 10.0;
    let plot = Rect::new(
        area.x + margin,
        area.y + title_size + margin,
        area.w - 2.0 * margin,
        area.h - title_size - 2.0 * margin,
    );
    draw_line(plot.x, plot.y + plot.h, plot.x + plot.w, plot.y + plot.h, 1.0, GRAY);
    draw_line(plot.x, plot.y, plot.x, plot.y + plot.h, 1.0, GRAY);

    let max_score = history.record().max(1) as f32;
    let last = (scores.len() - 1) as f32;
    let point = |i: usize, value: f32| {
        vec2(
            plot.x + i as f32 / last * plot.w,
            plot.y + plot.h - value.max(0.0) / max_score * plot.h,
        )
    };

    let series = [
        (scores.iter().map(|&s| s as f32).collect::<Vec<f32>>(), WHITE),
        (history.mean_scores().iter().map(|&m| m as f32).collect::<Vec<f32>>(), ORANGE),
    ];
    for (values, color) in &series {
        for (i, pair) in values.windows(2).enumerate() {
            let (a, b) = (point(i, pair[0]), point(i + 1, pair[1]));
            draw_line(a.x, a.y, b.x, b.y, 1.5, *color);
        }
    }

    if let Some(mean) = history.last_mean() {
        let label = format!("{:.2}", mean);
        let tip = point(scores.len() - 1, mean as f32);
        draw_text(&label, (tip.x - 40.0).max(plot.x), tip.y - 4.0, 16.0, ORANGE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_size() {
        assert_eq!(window_size(30, 22), (640 + 260, 60 + 480));
    }
}
