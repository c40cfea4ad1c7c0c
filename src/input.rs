use std::collections::VecDeque;

use anyhow::Result;

use crate::snake::Direction;
use crate::term::Console;

/// Logical keys the game cares about.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Esc,
    Space,
}

/// Whether the caller should keep going or shut down.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

// Sampled in this order, which is also the order rising edges are queued in
const DIRECTION_KEYS: [(Key, Direction); 4] = [
    (Key::Up, Direction::Up),
    (Key::Right, Direction::Right),
    (Key::Down, Direction::Down),
    (Key::Left, Direction::Left),
];

/// Bounded FIFO of direction changes waiting for the next frame.
#[derive(Debug, Default)]
pub struct PendingInputs {
    queue: VecDeque<Direction>,
}

impl PendingInputs {
    pub const CAPACITY: usize = 2;

    pub fn new() -> Self {
        PendingInputs { queue: VecDeque::with_capacity(Self::CAPACITY) }
    }

    /// Returns false when the queue was already full and `dir` got dropped.
    pub fn push(&mut self, dir: Direction) -> bool {
        if self.queue.len() >= Self::CAPACITY {
            return false;
        }
        self.queue.push_back(dir);
        true
    }

    pub fn pop(&mut self) -> Option<Direction> {
        self.queue.pop_front()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Pops entries until one lies on the other axis from `current` and
    /// returns it. Everything popped before it is thrown away.
    pub fn resolve(&mut self, current: Direction) -> Direction {
        while let Some(next) = self.pop() {
            if current.can_turn_to(next) {
                return next;
            }
        }
        current
    }
}

/// Turns raw key state into direction changes by remembering what was held
/// on the previous sample.
#[derive(Debug, Default)]
pub struct InputSampler {
    previous: [bool; 4],
}

impl InputSampler {
    pub fn new() -> Self {
        InputSampler::default()
    }

    /// One sampling tick. Esc wins over everything and is reported as
    /// `Flow::Quit` without touching the queue.
    pub fn sample<C: Console>(
        &mut self,
        console: &mut C,
        pending: &mut PendingInputs,
    ) -> Result<Flow> {
        if console.poll_key(Key::Esc)? {
            return Ok(Flow::Quit);
        }

        for (i, (key, dir)) in DIRECTION_KEYS.iter().enumerate() {
            let pressed = console.poll_key(*key)?;
            if pressed && !self.previous[i] && !pending.push(*dir) {
                log::trace!("input queue full, dropped {:?}", dir);
            }
            self.previous[i] = pressed;
        }

        Ok(Flow::Continue)
    }

    /// The between-rounds check: Esc quits, Space asks for a new round.
    pub fn poll_replay<C: Console>(&mut self, console: &mut C) -> Result<Option<Flow>> {
        if console.poll_key(Key::Esc)? {
            Ok(Some(Flow::Quit))
        } else if console.poll_key(Key::Space)? {
            Ok(Some(Flow::Continue))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::tests::FakeConsole;
    use Direction::*;

    #[test]
    fn queue_drops_third_entry() {
        let mut pending = PendingInputs::new();
        assert!(pending.push(Up));
        assert!(pending.push(Right));
        assert!(!pending.push(Down));
        assert_eq!(pending.len(), 2);
        assert_eq!(pending.pop(), Some(Up));
        assert_eq!(pending.pop(), Some(Right));
        assert_eq!(pending.pop(), None);
    }

    #[test]
    fn resolve_skips_same_axis_entries() {
        let mut pending = PendingInputs::new();
        pending.push(Right);
        pending.push(Up);
        assert_eq!(pending.resolve(Left), Up);
        assert_eq!(pending.len(), 0);
    }

    #[test]
    fn resolve_stops_at_first_valid_turn() {
        let mut pending = PendingInputs::new();
        pending.push(Down);
        pending.push(Left);
        assert_eq!(pending.resolve(Left), Down);
        assert_eq!(pending.pop(), Some(Left));
    }

    #[test]
    fn resolve_without_valid_turn_keeps_direction() {
        let mut pending = PendingInputs::new();
        pending.push(Right);
        pending.push(Left);
        assert_eq!(pending.resolve(Left), Left);
        assert_eq!(pending.len(), 0);
    }

    #[test]
    fn held_key_queues_once() {
        let mut console = FakeConsole::new();
        let mut sampler = InputSampler::new();
        let mut pending = PendingInputs::new();

        console.press(Key::Up);
        for _ in 0..5 {
            assert_eq!(sampler.sample(&mut console, &mut pending).unwrap(), Flow::Continue);
        }
        assert_eq!(pending.len(), 1);

        console.release(Key::Up);
        sampler.sample(&mut console, &mut pending).unwrap();
        console.press(Key::Up);
        sampler.sample(&mut console, &mut pending).unwrap();
        assert_eq!(pending.len(), 2);
    }

    #[test]
    fn third_rapid_press_is_dropped() {
        let mut console = FakeConsole::new();
        let mut sampler = InputSampler::new();
        let mut pending = PendingInputs::new();

        for key in [Key::Up, Key::Left, Key::Down] {
            console.press(key);
            sampler.sample(&mut console, &mut pending).unwrap();
            console.release(key);
            sampler.sample(&mut console, &mut pending).unwrap();
        }

        assert_eq!(pending.len(), 2);
        assert_eq!(pending.pop(), Some(Up));
        assert_eq!(pending.pop(), Some(Left));
    }

    #[test]
    fn esc_quits_without_queueing() {
        let mut console = FakeConsole::new();
        let mut sampler = InputSampler::new();
        let mut pending = PendingInputs::new();

        console.press(Key::Esc);
        console.press(Key::Up);
        assert_eq!(sampler.sample(&mut console, &mut pending).unwrap(), Flow::Quit);
        assert_eq!(pending.len(), 0);
    }

    #[test]
    fn replay_poll() {
        let mut console = FakeConsole::new();
        let mut sampler = InputSampler::new();

        assert_eq!(sampler.poll_replay(&mut console).unwrap(), None);
        console.press(Key::Space);
        assert_eq!(sampler.poll_replay(&mut console).unwrap(), Some(Flow::Continue));
        console.press(Key::Esc);
        assert_eq!(sampler.poll_replay(&mut console).unwrap(), Some(Flow::Quit));
    }
}
