use crate::error::SnakeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Absolute heading on the grid. Declared clockwise with y growing downward,
/// which is also the order of the heading bits in the state vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Right, Direction::Down, Direction::Left, Direction::Up];

    pub fn index(self) -> usize {
        match self {
            Direction::Right => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Up => 3,
        }
    }

    /// Unit step (dx, dy) for one move in this direction
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
        }
    }

    /// Heading after applying a relative action: right turns go clockwise,
    /// left turns counter-clockwise.
    pub fn rotate(self, action: Action) -> Direction {
        let idx = self.index();
        let new_idx = match action {
            Action::Straight => idx,
            Action::Right => (idx + 1) % 4,
            Action::Left => (idx + 3) % 4,
        };
        let new_direction = Direction::ALL[new_idx];
        debug!(%action, from = ?self, to = ?new_direction, "parsed action");
        new_direction
    }
}

/// Move relative to the current heading. Declaration order is the tie-break
/// order when several actions share the best predicted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Straight,
    Right,
    Left,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Straight, Action::Right, Action::Left];

    pub fn index(self) -> usize {
        match self {
            Action::Straight => 0,
            Action::Right => 1,
            Action::Left => 2,
        }
    }

    pub fn one_hot(self) -> [f32; 3] {
        let mut value = [0.0; 3];
        value[self.index()] = 1.0;
        value
    }
}

impl TryFrom<usize> for Action {
    type Error = SnakeError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Action::ALL
            .get(index)
            .copied()
            .ok_or(SnakeError::InvalidAction(index))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Straight => "STRAIGHT",
            Action::Right => "RIGHT",
            Action::Left => "LEFT",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_keeps_heading() {
        for h in Direction::ALL {
            assert_eq!(h.rotate(Action::Straight), h);
        }
    }

    #[test]
    fn test_right_then_left_is_identity() {
        for h in Direction::ALL {
            assert_eq!(h.rotate(Action::Right).rotate(Action::Left), h);
            assert_eq!(h.rotate(Action::Left).rotate(Action::Right), h);
        }
    }

    #[test]
    fn test_four_right_turns_full_circle() {
        for h in Direction::ALL {
            let turned = (0..4).fold(h, |d, _| d.rotate(Action::Right));
            assert_eq!(turned, h);
        }
    }

    #[test]
    fn test_right_is_clockwise() {
        assert_eq!(Direction::Right.rotate(Action::Right), Direction::Down);
        assert_eq!(Direction::Up.rotate(Action::Right), Direction::Right);
        assert_eq!(Direction::Right.rotate(Action::Left), Direction::Up);
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::Up.delta(), (0, -1));
        assert_eq!(Direction::Down.delta(), (0, 1));
        assert_eq!(Direction::Left.delta(), (-1, 0));
        assert_eq!(Direction::Right.delta(), (1, 0));
    }

    #[test]
    fn test_one_hot() {
        assert_eq!(Action::Straight.one_hot(), [1.0, 0.0, 0.0]);
        assert_eq!(Action::Right.one_hot(), [0.0, 1.0, 0.0]);
        assert_eq!(Action::Left.one_hot(), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_action_from_index() {
        assert_eq!(Action::try_from(1).unwrap(), Action::Right);
        assert!(matches!(Action::try_from(3), Err(SnakeError::InvalidAction(3))));
    }
}
