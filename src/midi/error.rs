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

/// Errors raised while opening or talking to a MIDI output device.
#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("no MIDI output devices available")]
    NoOutputDevices,

    #[error("no device found with name {0}")]
    NotFound(String),

    #[error("found too many devices that match ({0}), use a less ambiguous device name")]
    Ambiguous(String),

    #[error("unable to initialize MIDI output: {0}")]
    Init(#[from] ::midir::InitError),

    #[error("unable to read MIDI port info: {0}")]
    PortInfo(#[from] ::midir::PortInfoError),

    #[error("unable to connect to MIDI device {device}: {reason}")]
    Connect { device: String, reason: String },

    #[error("unable to send MIDI message: {0}")]
    Send(#[from] ::midir::SendError),

    #[error("unable to encode MIDI message: {0}")]
    Encode(#[from] std::io::Error),

    #[error("MIDI device {0} is closed")]
    Closed(String),

    #[error("mock device failure: {0}")]
    Mock(String),
}
