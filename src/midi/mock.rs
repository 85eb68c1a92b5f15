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
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};

use midly::{live::LiveEvent, MidiMessage};
use tracing::{debug, info};

use super::MidiError;

/// A message recorded by the mock device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    NoteOn { key: u8, velocity: u8 },
    NoteOff { key: u8, velocity: u8 },
    Other,
}

impl From<LiveEvent<'static>> for Message {
    fn from(event: LiveEvent<'static>) -> Self {
        match event {
            LiveEvent::Midi {
                message: MidiMessage::NoteOn { key, vel },
                ..
            } => Message::NoteOn {
                key: key.as_int(),
                velocity: vel.as_int(),
            },
            LiveEvent::Midi {
                message: MidiMessage::NoteOff { key, vel },
                ..
            } => Message::NoteOff {
                key: key.as_int(),
                velocity: vel.as_int(),
            },
            _ => Message::Other,
        }
    }
}

/// A mock device. Doesn't play anything, but records every message it's sent. Clones share the
/// same recording, so a test can keep a handle while the player owns the device.
#[derive(Clone)]
pub struct Device {
    name: String,
    sent: Arc<Mutex<Vec<Message>>>,
    raw: Arc<Mutex<Vec<Vec<u8>>>>,
    remaining_sends: Arc<Mutex<Option<usize>>>,
    delay: Arc<Mutex<Duration>>,
    closed: Arc<AtomicBool>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Device {
    /// Gets the given mock device.
    pub fn get(name: &str) -> Device {
        Device {
            name: name.to_string(),
            sent: Arc::new(Mutex::new(Vec::new())),
            raw: Arc::new(Mutex::new(Vec::new())),
            remaining_sends: Arc::new(Mutex::new(None)),
            delay: Arc::new(Mutex::new(Duration::ZERO)),
            closed: Arc::new(AtomicBool::new(false)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[cfg(test)]
    /// Gets every message sent so far.
    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().expect("unable to get sent lock").clone()
    }

    #[cfg(test)]
    /// Gets the encoded bytes of every message sent so far.
    pub fn sent_raw(&self) -> Vec<Vec<u8>> {
        self.raw.lock().expect("unable to get raw lock").clone()
    }

    #[cfg(test)]
    /// Clears the recorded messages.
    pub fn clear(&self) {
        self.sent.lock().expect("unable to get sent lock").clear();
        self.raw.lock().expect("unable to get raw lock").clear();
    }

    #[cfg(test)]
    /// Lets the given number of sends succeed, then fails every send after that.
    pub fn fail_after(&self, sends: usize) {
        *self
            .remaining_sends
            .lock()
            .expect("unable to get remaining sends lock") = Some(sends);
    }

    #[cfg(test)]
    /// Makes every send take at least the given duration.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().expect("unable to get delay lock") = delay;
    }

    #[cfg(test)]
    /// Returns true if the device has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    /// The largest number of sends that were ever in progress at the same time.
    pub fn max_concurrent_sends(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn take_send_permit(&self) -> bool {
        let mut remaining = self
            .remaining_sends
            .lock()
            .expect("unable to get remaining sends lock");
        match remaining.as_mut() {
            Some(0) => false,
            Some(remaining) => {
                *remaining -= 1;
                true
            }
            None => true,
        }
    }
}

impl super::Device for Device {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn send(&mut self, event: LiveEvent<'static>) -> Result<(), MidiError> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(MidiError::Closed(self.name.clone()));
        }
        if !self.take_send_permit() {
            return Err(MidiError::Mock(format!("{} refused the message", self.name)));
        }

        let buf = super::encode(&event)?;

        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        let delay = *self.delay.lock().expect("unable to get delay lock");
        if !delay.is_zero() {
            thread::sleep(delay);
        }

        debug!(
            device = self.name,
            event = format!("{:?}", event),
            "Recording event."
        );
        self.sent
            .lock()
            .expect("unable to get sent lock")
            .push(Message::from(event));
        self.raw.lock().expect("unable to get raw lock").push(buf);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed.swap(true, Ordering::Relaxed) {
            info!(device = self.name, "Closed mock MIDI output.");
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}
