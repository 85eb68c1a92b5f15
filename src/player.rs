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

use midly::num::u7;
use tracing::{debug, info, warn};

use crate::{
    chord::{Chord, OctaveOffset},
    midi::{self, MidiError},
};

/// Velocity used to start notes.
const NOTE_ON_VELOCITY: u8 = 127;

/// Velocity used to stop notes.
const NOTE_OFF_VELOCITY: u8 = 0;

/// Errors raised while changing the sounding chord.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("{chord} shifted by {offset} octaves leaves the MIDI note range")]
    NoteOutOfRange { chord: Chord, offset: OctaveOffset },

    #[error("unable to stop {chord}: {source}")]
    NoteOff { chord: Chord, source: MidiError },

    #[error("unable to start {chord}: {source}")]
    NoteOn { chord: Chord, source: MidiError },
}

/// What the player currently has sounding on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing is sounding.
    #[default]
    Idle,
    /// The chord is sounding, shifted by the offset.
    Sounding { chord: Chord, offset: OctaveOffset },
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Sounding { chord, offset } => write!(f, "{} ({})", chord, offset),
        }
    }
}

/// Plays one chord at a time, silencing the previous chord before starting the next.
#[derive(Default)]
pub struct ChordPlayer {
    state: PlaybackState,
}

impl ChordPlayer {
    pub fn new() -> ChordPlayer {
        ChordPlayer::default()
    }

    /// The chord currently sounding, if any.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Silences the sounding chord, if any, then starts the given chord.
    ///
    /// The state only becomes Sounding once all three note ons were sent. If stopping the previous
    /// chord fails, the previous chord stays recorded as sounding so that the next transition
    /// tries to stop it again. If starting the new chord fails part way, the notes that did start
    /// are silenced and the player goes idle.
    pub fn transition(
        &mut self,
        device: &mut dyn midi::Device,
        chord: Chord,
        offset: OctaveOffset,
    ) -> Result<(), PlaybackError> {
        let keys = chord
            .keys(offset)
            .ok_or(PlaybackError::NoteOutOfRange { chord, offset })?;

        self.stop_all(device)?;

        for (sent, key) in keys.iter().enumerate() {
            if let Err(source) = device.send_note_on(*key, u7::from(NOTE_ON_VELOCITY)) {
                warn!(
                    chord = chord.name(),
                    sent, "Note on failed, silencing the notes already started."
                );
                silence(device, &keys[..sent]);
                return Err(PlaybackError::NoteOn { chord, source });
            }
        }

        debug!(chord = chord.name(), offset = offset.octaves(), "Chord started.");
        self.state = PlaybackState::Sounding { chord, offset };
        Ok(())
    }

    /// Silences the sounding chord, if any, and goes idle. Does nothing when already idle.
    pub fn stop_all(&mut self, device: &mut dyn midi::Device) -> Result<(), PlaybackError> {
        let (chord, offset) = match self.state {
            PlaybackState::Idle => return Ok(()),
            PlaybackState::Sounding { chord, offset } => (chord, offset),
        };

        // Sounding chords were validated when they were started.
        if let Some(keys) = chord.keys(offset) {
            for key in keys {
                device
                    .send_note_off(key, u7::from(NOTE_OFF_VELOCITY))
                    .map_err(|source| PlaybackError::NoteOff { chord, source })?;
            }
        }

        debug!(chord = chord.name(), offset = offset.octaves(), "Chord stopped.");
        self.state = PlaybackState::Idle;
        Ok(())
    }
}

/// Best effort note offs for the given keys.
fn silence(device: &mut dyn midi::Device, keys: &[u7]) {
    for key in keys {
        if let Err(e) = device.send_note_off(*key, u7::from(NOTE_OFF_VELOCITY)) {
            info!(key = key.as_int(), err = %e, "Unable to silence note.");
        }
    }
}
