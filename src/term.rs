use std::collections::{HashMap, HashSet};
use std::io::{self, stdout, Stdout, Write};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use crossterm::event::{
    poll, read, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{
    BeginSynchronizedUpdate, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
    EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::tty::IsTty;
use crossterm::{cursor, execute, queue, style, terminal};

use crate::input::Key;
use crate::screen::Screen;

/// How long a press counts as held when the terminal can't report releases.
/// Long enough to bridge the gap before autorepeat kicks in.
const PRESS_PULSE: Duration = Duration::from_millis(120);

/// What the game needs from the platform. Nothing else in the crate talks to
/// the terminal directly.
pub trait Console {
    fn set_viewport_size(&mut self, width: u16, height: u16) -> Result<()>;

    /// Instantaneous state of `key`, never blocks.
    fn poll_key(&mut self, key: Key) -> Result<bool>;

    /// Replaces the whole visible screen with `screen`, starting at the origin.
    fn write_grid(&mut self, screen: &Screen) -> Result<()>;

    fn hide_cursor(&mut self) -> Result<()>;
}

/// Which keys are down, as far as key events can tell.
#[derive(Debug, Default)]
struct KeyTable {
    /// `None` holds until a release arrives, `Some` until the pulse runs out.
    held: HashMap<Key, Option<Instant>>,
    /// Keys the terminal has sent a release for at least once.
    releasing: HashSet<Key>,
}

impl KeyTable {
    fn record(&mut self, ev: &KeyEvent, now: Instant) {
        let key = match map_key(ev) {
            Some(key) => key,
            None => return,
        };

        match ev.kind {
            KeyEventKind::Release => {
                self.releasing.insert(key);
                self.held.remove(&key);
            }
            KeyEventKind::Press | KeyEventKind::Repeat => {
                let until = if self.releasing.contains(&key) {
                    None
                } else {
                    Some(now + PRESS_PULSE)
                };
                self.held.insert(key, until);
            }
        }
    }

    fn is_held(&mut self, key: Key, now: Instant) -> bool {
        match self.held.get(&key) {
            Some(None) => true,
            Some(Some(until)) if now < *until => true,
            Some(Some(_)) => {
                self.held.remove(&key);
                false
            }
            None => false,
        }
    }
}

pub struct TermManager {
    stdout: Stdout,
    keys: KeyTable,
    enhanced: bool,
    active: bool,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let stdout = stdout();
        if !stdout.is_tty() {
            bail!("cannot get a console handle: stdout is not a terminal");
        }

        Ok(TermManager { stdout, keys: KeyTable::default(), enhanced: false, active: false })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen, DisableLineWrap)
            .context("Error entering alt screen")?;
        self.active = true;
        terminal::enable_raw_mode().context("Error setting raw mode")?;

        // Every key has to arrive as an escape code, or plain text keys like
        // Space never report their release
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            let flags = KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                | KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
            execute!(self.stdout, PushKeyboardEnhancementFlags(flags))
                .context("Error enabling key release events")?;
            self.enhanced = true;
        }
        log::debug!("terminal ready, keyboard enhancement: {}", self.enhanced);

        Ok(())
    }

    /// Undoes `setup`. Every step is attempted; the first failure is returned.
    pub fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let flags = if self.enhanced {
            execute!(self.stdout, PopKeyboardEnhancementFlags)
        } else {
            Ok(())
        };
        let raw = terminal::disable_raw_mode();
        let screen = execute!(self.stdout, cursor::Show, EnableLineWrap, LeaveAlternateScreen);

        first_error([flags, raw, screen]).context("Error restoring terminal")
    }

    ///////////////////////////////////////////////////////////////////////////

    fn drain_events(&mut self) -> Result<()> {
        while poll(Duration::ZERO)? {
            if let Event::Key(ev) = read()? {
                self.keys.record(&ev, Instant::now());
            }
        }
        Ok(())
    }
}

impl Console for TermManager {
    fn set_viewport_size(&mut self, width: u16, height: u16) -> Result<()> {
        // Plenty of terminals ignore resize requests, so this is best effort
        if let Err(e) = execute!(self.stdout, terminal::SetSize(width, height)) {
            log::debug!("resize request failed: {}", e);
        }

        let (cols, rows) = terminal::size().context("Error reading size")?;
        if cols < width || rows < height {
            log::warn!("terminal is {}x{}, smaller than the {}x{} grid", cols, rows, width, height);
        }
        Ok(())
    }

    fn poll_key(&mut self, key: Key) -> Result<bool> {
        self.drain_events()?;
        Ok(self.keys.is_held(key, Instant::now()))
    }

    fn write_grid(&mut self, screen: &Screen) -> Result<()> {
        queue!(self.stdout, BeginSynchronizedUpdate)?;
        for (y, row) in screen.rows().enumerate() {
            queue!(self.stdout, cursor::MoveTo(0, y as u16), style::Print(row))?;
        }
        queue!(self.stdout, EndSynchronizedUpdate)?;
        self.stdout.flush().context("Error flushing")?;
        Ok(())
    }

    fn hide_cursor(&mut self) -> Result<()> {
        execute!(self.stdout, cursor::Hide).context("Error setting cursor visibility")?;
        Ok(())
    }
}

impl Drop for TermManager {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            log::error!("failed to restore terminal: {:#}", e);
        }
    }
}

/// Steps that already ran, reduced to the first one that failed.
fn first_error<I: IntoIterator<Item = io::Result<()>>>(steps: I) -> io::Result<()> {
    steps.into_iter().find(Result::is_err).unwrap_or(Ok(()))
}

fn map_key(ev: &KeyEvent) -> Option<Key> {
    if ev.modifiers.contains(KeyModifiers::CONTROL) && matches!(ev.code, KeyCode::Char('c')) {
        return Some(Key::Esc);
    }

    match ev.code {
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Some(Key::Up),
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Some(Key::Left),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Some(Key::Down),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Some(Key::Right),
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Esc => Some(Key::Esc),
        _ => None,
    }
}
