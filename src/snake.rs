use std::collections::VecDeque;

use crate::Coords;
use Direction::*;

/// Heading of the snake. The discriminants matter: opposite directions
/// share parity, perpendicular ones don't.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Direction {
    pub fn parity(self) -> u8 {
        self as u8 % 2
    }

    /// A turn is only accepted onto the other axis, which rules out both
    /// reversals and same-axis repeats.
    pub fn can_turn_to(self, other: Direction) -> bool {
        self.parity() != other.parity()
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Up | Down)
    }

    pub fn offset(self) -> Coords {
        match self {
            Up => (0, -1),
            Right => (1, 0),
            Down => (0, 1),
            Left => (-1, 0),
        }
    }
}

/// Body segments, head at the front and tail at the back.
#[derive(Clone, Debug, PartialEq)]
pub struct Snake {
    body: VecDeque<Coords>,
}

impl Snake {
    /// Lays out `size` segments in a straight line with the head at `head`,
    /// trailing away from `direction`.
    pub fn new(head: Coords, size: usize, direction: Direction) -> Self {
        let diff = direction.offset();
        let body = (0..size.max(1) as i32)
            .map(|i| (head.0 - diff.0 * i, head.1 - diff.1 * i))
            .collect();
        Snake { body }
    }

    #[cfg(test)]
    pub fn from_segments<I: IntoIterator<Item = Coords>>(segments: I) -> Option<Self> {
        let body: VecDeque<Coords> = segments.into_iter().collect();
        if body.is_empty() {
            None
        } else {
            Some(Snake { body })
        }
    }

    pub fn head(&self) -> Coords {
        self.body[0]
    }

    pub fn tail(&self) -> Coords {
        self.body[self.body.len() - 1]
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Coords> {
        self.body.iter()
    }

    pub fn contains(&self, pos: Coords) -> bool {
        self.body.contains(&pos)
    }

    /// Where the head lands after one step in `direction`. Not wrapped.
    pub fn next_head(&self, direction: Direction) -> Coords {
        let (dx, dy) = direction.offset();
        let (x, y) = self.head();
        (x + dx, y + dy)
    }

    pub fn push_head(&mut self, pos: Coords) {
        self.body.push_front(pos);
    }

    pub fn replace_head(&mut self, pos: Coords) {
        self.body[0] = pos;
    }

    /// Drops the last segment, but never the head.
    pub fn retract_tail(&mut self) {
        if self.body.len() > 1 {
            self.body.pop_back();
        }
    }

    /// Appends `n` copies of the tail; the snake stretches out over the
    /// next frames as the tail stops retracting.
    pub fn grow(&mut self, n: usize) {
        let tail = self.tail();
        self.body.extend(std::iter::repeat(tail).take(n));
    }

    pub fn head_hits_body(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|&seg| seg == head)
    }
}
