//! Feature vector handed to the network.
//!
//! Layout: `[0..3]` danger for straight/right/left, `[3..7]` heading one-hot
//! (right, down, left, up), `[7..11]` food right/down/left/up of the head.

use crate::game::{Action, Direction, Game};
use tracing::debug;

pub const STATE_SIZE: usize = 11;

pub type StateVector = [f32; STATE_SIZE];

const DANGER: std::ops::Range<usize> = 0..3;
const HEADING: std::ops::Range<usize> = 3..7;
const FOOD: std::ops::Range<usize> = 7..11;

fn bit(flag: bool) -> f32 {
    if flag { 1.0 } else { 0.0 }
}

pub fn encode(game: &Game) -> StateVector {
    let mut state = [0.0; STATE_SIZE];

    for (slot, action) in state[DANGER].iter_mut().zip(Action::ALL) {
        *slot = bit(game.danger(action));
    }

    for (slot, direction) in state[HEADING].iter_mut().zip(Direction::ALL) {
        *slot = bit(game.heading() == direction);
    }

    let (head, food) = (game.head(), game.food());
    let food_flags = [food.0 > head.0, food.1 > head.1, food.0 < head.0, food.1 < head.1];
    for (slot, flag) in state[FOOD].iter_mut().zip(food_flags) {
        *slot = bit(flag);
    }

    debug!("current state: {}", describe(&state));
    state
}

/// Human readable summary, for the debug log only.
pub fn describe(state: &StateVector) -> String {
    let dangerous: Vec<String> = Action::ALL
        .iter()
        .zip(&state[DANGER])
        .filter(|(_, flag)| **flag > 0.0)
        .map(|(action, _)| action.to_string())
        .collect();
    let danger_message = if dangerous.is_empty() {
        "no danger ahead".to_owned()
    } else {
        format!("{} is dangerous", dangerous.join(" "))
    };

    let heading = Direction::ALL
        .iter()
        .zip(&state[HEADING])
        .find(|(_, flag)| **flag > 0.0)
        .map(|(direction, _)| format!("{:?}", direction))
        .unwrap_or_else(|| "nowhere".to_owned());

    let food: Vec<String> = Direction::ALL
        .iter()
        .zip(&state[FOOD])
        .filter(|(_, flag)| **flag > 0.0)
        .map(|(direction, _)| format!("{:?}", direction))
        .collect();

    format!("{}. snake is pointing {}. food is {}.", danger_message, heading, food.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn game() -> Game {
        Game::new(GameConfig {
            seed: Some(11),
            ..GameConfig::default()
        })
    }

    #[test]
    fn test_encode_open_field() {
        let mut game = game();
        game.arrange((5, 5), &[(5, 6), (5, 7)], Direction::Up, (5, 0));

        let expected = [
            0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        assert_eq!(encode(&game), expected);
    }

    #[test]
    fn test_encode_danger_and_diagonal_food() {
        let mut game = game();
        // top-left corner heading up: straight and left hit walls
        game.arrange((0, 0), &[(0, 1), (0, 2)], Direction::Up, (4, 6));

        let expected = [
            1.0, 0.0, 1.0,
            0.0, 0.0, 0.0, 1.0,
            1.0, 1.0, 0.0, 0.0,
        ];
        assert_eq!(encode(&game), expected);
    }

    #[test]
    fn test_exactly_one_heading_bit() {
        let mut game = game();
        for _ in 0..40 {
            let state = encode(&game);
            let heading_bits: f32 = state[HEADING].iter().sum();
            assert_eq!(heading_bits, 1.0);

            let action = Action::ALL[game.ticks() % 3];
            if game.next_tick(action).terminal {
                game.reset();
            }
        }
    }

    #[test]
    fn test_food_aligned_sets_no_axis_bit() {
        let mut game = game();
        game.arrange((5, 5), &[(4, 5), (3, 5)], Direction::Right, (9, 5));

        let state = encode(&game);
        assert_eq!(&state[FOOD], &[1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_describe_uses_every_slice() {
        let state = [
            1.0, 0.0, 1.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 1.0,
        ];
        assert_eq!(
            describe(&state),
            "STRAIGHT LEFT is dangerous. snake is pointing Down. food is Left Up."
        );
    }
}
