// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::io::{self, Write};

use crossterm::{
    event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{debug, info, span, warn, Level};

use super::Event;

/// Puts the terminal in raw mode until dropped.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<RawMode> {
        enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!(err = %e, "Unable to restore terminal mode.");
        }
    }
}

/// Reads the next key press from the terminal, ignoring releases and non-key events.
fn next_key() -> io::Result<KeyEvent> {
    loop {
        if let TermEvent::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Release {
                return Ok(key);
            }
        }
    }
}

/// Raw mode swallows the interrupt signal, so Ctrl-C is handled as a key.
fn is_interrupt(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Returns true for the keys that stop the monitor.
pub fn is_shutdown_key(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc || is_interrupt(key)
}

/// Consumes keys until a shutdown key arrives.
fn watch_keys<K>(mut next_key: K) -> io::Result<()>
where
    K: FnMut() -> io::Result<KeyEvent>,
{
    loop {
        let key = next_key()?;
        if is_shutdown_key(&key) {
            info!(key = ?key.code, "Shutdown requested.");
            return Ok(());
        }
        debug!(key = ?key.code, "Ignoring key.");
    }
}

/// A driver that requests shutdown when Esc is pressed on the terminal.
pub struct Driver {}

impl Driver {
    pub fn new() -> Driver {
        Driver {}
    }
}

impl super::Driver for Driver {
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>> {
        tokio::task::spawn_blocking(move || {
            let span = span!(Level::INFO, "keyboard driver");
            let _enter = span.enter();

            println!("Press ESC to stop");
            {
                let _raw_mode = RawMode::enable()?;
                watch_keys(next_key)?;
            }

            events_tx
                .blocking_send(Event::Shutdown)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
        })
    }
}

/// Reads a password one key at a time, echoing an asterisk per character. Backspace removes the
/// last character and its asterisk. Enter finishes.
fn read_masked<K, W>(mut next_key: K, mut writer: W) -> io::Result<String>
where
    K: FnMut() -> io::Result<KeyEvent>,
    W: Write,
{
    let mut password = String::new();
    loop {
        let key = next_key()?;
        if is_interrupt(&key) {
            return Err(io::Error::new(
                io::ErrorKind::Interrupted,
                "password entry cancelled",
            ));
        }

        match key.code {
            KeyCode::Enter => return Ok(password),
            KeyCode::Backspace => {
                if password.pop().is_some() {
                    write!(writer, "\x08 \x08")?;
                }
            }
            KeyCode::Char(c) => {
                password.push(c);
                write!(writer, "*")?;
            }
            _ => {}
        }
        writer.flush()?;
    }
}

/// Prompts for a password on the terminal without echoing it.
pub fn prompt_password() -> io::Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "Enter your password: ")?;
    stdout.flush()?;

    let password = {
        let _raw_mode = RawMode::enable()?;
        read_masked(next_key, io::stdout())
    };
    writeln!(stdout)?;
    password
}

#[cfg(test)]
mod test {
    use std::collections::VecDeque;

    use super::*;

    /// Feeds the given keys, then fails once they run out.
    fn keys(codes: &[KeyEvent]) -> impl FnMut() -> io::Result<KeyEvent> {
        let mut queue: VecDeque<KeyEvent> = codes.iter().copied().collect();
        move || {
            queue
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "out of keys"))
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl_c() -> KeyEvent {
        KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_shutdown_keys() {
        assert!(is_shutdown_key(&key(KeyCode::Esc)));
        assert!(is_shutdown_key(&ctrl_c()));
        assert!(!is_shutdown_key(&key(KeyCode::Char('c'))));
        assert!(!is_shutdown_key(&key(KeyCode::Enter)));
    }

    #[test]
    fn test_watch_keys_stops_on_escape() -> io::Result<()> {
        watch_keys(keys(&[
            key(KeyCode::Char('q')),
            key(KeyCode::Enter),
            key(KeyCode::Esc),
        ]))
    }

    #[test]
    fn test_watch_keys_keeps_waiting() {
        let result = watch_keys(keys(&[key(KeyCode::Char('x'))]));
        assert_eq!(io::ErrorKind::UnexpectedEof, result.unwrap_err().kind());
    }

    #[test]
    fn test_read_masked() -> io::Result<()> {
        let mut echo: Vec<u8> = Vec::new();
        let password = read_masked(
            keys(&[
                key(KeyCode::Char('p')),
                key(KeyCode::Char('a')),
                key(KeyCode::Char('x')),
                key(KeyCode::Backspace),
                key(KeyCode::Char('s')),
                key(KeyCode::Left),
                key(KeyCode::Enter),
            ]),
            &mut echo,
        )?;

        assert_eq!("pas", password);
        assert_eq!("***\x08 \x08*", String::from_utf8_lossy(&echo));
        Ok(())
    }

    #[test]
    fn test_read_masked_backspace_on_empty() -> io::Result<()> {
        let mut echo: Vec<u8> = Vec::new();
        let password = read_masked(
            keys(&[key(KeyCode::Backspace), key(KeyCode::Enter)]),
            &mut echo,
        )?;

        assert_eq!("", password);
        assert!(echo.is_empty());
        Ok(())
    }

    #[test]
    fn test_read_masked_cancelled() {
        let mut echo: Vec<u8> = Vec::new();
        let result = read_masked(keys(&[key(KeyCode::Char('a')), ctrl_c()]), &mut echo);
        assert_eq!(io::ErrorKind::Interrupted, result.unwrap_err().kind());
    }
}
