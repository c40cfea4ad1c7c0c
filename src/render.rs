use crate::game::Round;
use crate::screen::Screen;

const BORDER_CHAR: char = '-';
const SNAKE_BODY_CHAR: char = 'O';
const SNAKE_HEAD_CHAR: char = '@';
const DEAD_SNAKE_CHAR: char = '+';
const DEAD_HEAD_CHAR: char = 'X';
const FOOD_CHAR: char = '%';

const TITLE: &str = "SNAKE!";
const REPLAY_PROMPT: &str = "Press 'SPACE' to play again, 'ESC' to exit.";

/// Paints a full frame for `round` into `screen`. The previous contents are
/// discarded.
pub fn draw(screen: &mut Screen, round: &Round) {
    let (width, _) = screen.size();
    let state = round.state();
    screen.clear();

    for x in 0..width {
        screen.put_char((x, 0), BORDER_CHAR);
        screen.put_char((x, 2), BORDER_CHAR);
    }
    screen.put_text((1, 1), &format!("SCORE: {}", state.score));
    screen.put_text((width / 2 - 3, 1), TITLE);

    let (body, head) = if state.dead {
        (DEAD_SNAKE_CHAR, DEAD_HEAD_CHAR)
    } else {
        (SNAKE_BODY_CHAR, SNAKE_HEAD_CHAR)
    };
    for pos in round.snake().segments() {
        screen.put_char(*pos, body);
    }
    screen.put_char(round.snake().head(), head);

    screen.put_char(round.food(), FOOD_CHAR);

    if state.dead {
        screen.put_text((width / 2 - 20, 1), REPLAY_PROMPT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::snake::{Direction, Snake};

    fn small_round(dead: bool) -> Round {
        let snake = Snake::new((5, 5), 3, Direction::Right);
        let mut round = Round::with_layout(snake, Direction::Right, (8, 6));
        round.state_mut().score = 30;
        round.state_mut().dead = dead;
        round
    }

    #[test]
    fn draws_hud_snake_and_food() {
        let mut screen = Screen::new(40, 10);
        draw(&mut screen, &small_round(false));
        let rows: Vec<String> = screen.rows().collect();

        assert_eq!(rows[0], "-".repeat(40));
        assert_eq!(rows[2], "-".repeat(40));
        assert!(rows[1].starts_with(" SCORE: 30 "));
        assert_eq!(&rows[1][17..23], "SNAKE!");
        assert_eq!(&rows[5][3..6], "OO@");
        assert_eq!(screen.get((8, 6)), Some('%'));
    }

    #[test]
    fn dead_snake_uses_death_glyphs_and_prompt() {
        let mut screen = Screen::new(GameConfig::default().width, 10);
        draw(&mut screen, &small_round(true));
        let rows: Vec<String> = screen.rows().collect();

        assert_eq!(&rows[5][3..6], "++X");
        assert_eq!(&rows[1][40..40 + REPLAY_PROMPT.len()], REPLAY_PROMPT);
    }

    #[test]
    fn redraw_clears_previous_frame() {
        let mut screen = Screen::new(20, 10);
        screen.put_char((15, 8), '#');
        draw(&mut screen, &small_round(false));
        assert_eq!(screen.get((15, 8)), Some(' '));
    }
}
