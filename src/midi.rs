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
use std::fmt;

use midly::{
    live::LiveEvent,
    num::{u4, u7},
    MidiMessage,
};

pub use self::error::MidiError;

mod error;
mod midir;
mod mock;

/// The channel every message is sent on.
pub const OUTPUT_CHANNEL: u8 = 0;

/// A MIDI output device. Exclusively owned; sending requires a mutable borrow.
pub trait Device: fmt::Display + Send {
    /// Returns the name of the device.
    fn name(&self) -> String;

    /// Sends a single event to the device.
    fn send(&mut self, event: LiveEvent<'static>) -> Result<(), MidiError>;

    /// Closes the connection to the device. Sending after close fails. Closing twice is a no-op.
    fn close(&mut self);

    /// Sends a note on message on the output channel.
    fn send_note_on(&mut self, key: u7, velocity: u7) -> Result<(), MidiError> {
        self.send(channel_event(MidiMessage::NoteOn { key, vel: velocity }))
    }

    /// Sends a note off message on the output channel.
    fn send_note_off(&mut self, key: u7, velocity: u7) -> Result<(), MidiError> {
        self.send(channel_event(MidiMessage::NoteOff { key, vel: velocity }))
    }
}

fn channel_event(message: MidiMessage) -> LiveEvent<'static> {
    LiveEvent::Midi {
        channel: u4::from(OUTPUT_CHANNEL),
        message,
    }
}

/// Encodes the event into its wire format.
fn encode(event: &LiveEvent<'static>) -> Result<Vec<u8>, MidiError> {
    // Channel messages are at most three bytes.
    let mut buf: Vec<u8> = Vec::with_capacity(3);
    event.write_std(&mut buf)?;
    Ok(buf)
}

/// Lists the names of the MIDI output devices known to midir.
pub fn list_devices() -> Result<Vec<String>, MidiError> {
    midir::list()
}

/// Opens a MIDI output device. With no name, the first enumerated output is used. Names starting
/// with "mock" open a mock device that records what it is sent.
pub fn get_device(name: Option<&str>) -> Result<Box<dyn Device>, MidiError> {
    if let Some(name) = name {
        if name.starts_with("mock") {
            return Ok(Box::new(mock::Device::get(name)));
        }
    }

    Ok(Box::new(midir::get(name)?))
}
