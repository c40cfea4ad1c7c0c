use std::{thread::sleep, time::{Duration, Instant}};

use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::{self, GameConfig, HUD_ROWS};
use crate::input::{Flow, InputSampler, PendingInputs};
use crate::render;
use crate::screen::Screen;
use crate::snake::{Direction, Snake};
use crate::term::Console;
use crate::Coords;

/// Per-round counters, thrown away when the round ends.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundState {
    pub score: u32,
    pub speed: i32,
    pub direction: Direction,
    pub dead: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Wall,
    SelfHit,
}

/// What happened during one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    pub ate_food: bool,
    pub collision: Option<Collision>,
}

/// How a round was left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    GameOver { score: u32 },
    Quit,
}

/// One life of the snake.
pub struct Round {
    state: RoundState,
    snake: Snake,
    food: Coords,
    pending: PendingInputs,
}

impl Round {
    pub fn new() -> Self {
        let direction = Direction::Left;
        let snake = Snake::new(config::INITIAL_SNAKE_HEAD, config::INITIAL_SNAKE_LENGTH, direction);
        Round::with_layout(snake, direction, config::INITIAL_FOOD)
    }

    pub fn with_layout(snake: Snake, direction: Direction, food: Coords) -> Self {
        Round {
            state: RoundState { score: 0, speed: config::INITIAL_SPEED, direction, dead: false },
            snake,
            food,
            pending: PendingInputs::new(),
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    #[cfg(test)]
    pub fn state_mut(&mut self) -> &mut RoundState {
        &mut self.state
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Coords {
        self.food
    }

    pub fn pending_mut(&mut self) -> &mut PendingInputs {
        &mut self.pending
    }

    /// Advances the round by one frame: turn, move, eat, handle the edges,
    /// check for self-collision and retract the tail.
    pub fn step<R: Rng>(&mut self, config: &GameConfig, rng: &mut R) -> StepInfo {
        let mut info = StepInfo { ate_food: false, collision: None };
        if self.state.dead {
            return info;
        }

        self.state.direction = self.pending.resolve(self.state.direction);
        let new_head = self.snake.next_head(self.state.direction);
        self.snake.push_head(new_head);

        if new_head == self.food {
            info.ate_food = true;
            self.state.score += config::FOOD_SCORE;
            self.state.speed += config::FOOD_SPEEDUP;
            self.snake.grow(config::FOOD_GROWTH);
            self.food = place_food(config, &self.snake, rng);
        }

        if config.mirroring {
            let wrapped = wrap(config, new_head);
            if wrapped != new_head {
                self.snake.replace_head(wrapped);
            }
        } else if !config.in_playfield(new_head) {
            info.collision = Some(Collision::Wall);
        }

        if info.collision.is_none() && self.snake.head_hits_body() {
            info.collision = Some(Collision::SelfHit);
        }

        if info.collision.is_some() {
            self.state.dead = true;
        } else {
            self.snake.retract_tail();
        }

        info
    }
}

/// Re-enters a head that left the playfield on the opposite edge.
fn wrap(config: &GameConfig, (mut x, mut y): Coords) -> Coords {
    if x < 0 {
        x = config.width - 1;
    } else if x >= config.width {
        x = 0;
    }

    if y < HUD_ROWS {
        y = config.height - 1;
    } else if y >= config.height {
        y = HUD_ROWS;
    }

    (x, y)
}

/// Random playfield cell not covered by the snake. Keeps trying until one
/// turns up.
fn place_food<R: Rng>(config: &GameConfig, snake: &Snake, rng: &mut R) -> Coords {
    let mut attempts = 0u32;
    loop {
        let pos = (rng.gen_range(0..config.width), rng.gen_range(HUD_ROWS..config.height));
        attempts += 1;
        if !snake.contains(pos) {
            log::trace!("food placed after {} attempts", attempts);
            return pos;
        }
    }
}

pub struct SnakeGame<C: Console> {
    config: GameConfig,
    console: C,
    screen: Screen,
    sampler: InputSampler,
    rng: StdRng,
}

impl<C: Console> SnakeGame<C> {
    pub fn new(config: GameConfig, console: C) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let screen = Screen::new(config.width, config.height);
        SnakeGame { config, console, screen, sampler: InputSampler::new(), rng }
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.console.set_viewport_size(self.config.width as u16, self.config.height as u16)?;
        self.console.hide_cursor()
    }

    /// Plays rounds back to back until Esc.
    pub fn run(&mut self) -> Result<()> {
        loop {
            match self.play(Round::new())? {
                RoundOutcome::Quit => break,
                RoundOutcome::GameOver { score } => {
                    log::info!("round over, score {}", score);
                    if self.await_replay()? == Flow::Quit {
                        break;
                    }
                }
            }
        }

        log::info!("quit requested");
        Ok(())
    }

    /// Runs `round` frame by frame until the snake dies or Esc is pressed.
    pub fn play(&mut self, mut round: Round) -> Result<RoundOutcome> {
        log::info!("round started");
        self.sampler = InputSampler::new();

        loop {
            let state = round.state();
            let delay = self.config.frame_delay(state.speed, state.direction.is_vertical());

            if self.wait_frame(delay, round.pending_mut())? == Flow::Quit {
                return Ok(RoundOutcome::Quit);
            }

            let info = round.step(&self.config, &mut self.rng);
            if info.ate_food {
                let state = round.state();
                log::debug!(
                    "food eaten, score {} speed {}, next food at {:?}",
                    state.score, state.speed, round.food()
                );
            }

            render::draw(&mut self.screen, &round);
            self.console.write_grid(&self.screen)?;

            if let Some(collision) = info.collision {
                log::debug!("collision: {:?}", collision);
                return Ok(RoundOutcome::GameOver { score: round.state().score });
            }
        }
    }

    /// Waits after a lost round: Space starts a new one, Esc quits.
    pub fn await_replay(&mut self) -> Result<Flow> {
        loop {
            if let Some(flow) = self.sampler.poll_replay(&mut self.console)? {
                return Ok(flow);
            }
            sleep(self.config.replay_poll);
        }
    }

    #[cfg(test)]
    pub fn console(&self) -> &C {
        &self.console
    }

    ///////////////////////////////////////////////////////////////////////////

    // Spins for the whole frame, sampling input on every pass.
    fn wait_frame(&mut self, delay: Duration, pending: &mut PendingInputs) -> Result<Flow> {
        let start = Instant::now();
        while start.elapsed() < delay {
            if self.sampler.sample(&mut self.console, pending)? == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }
}
