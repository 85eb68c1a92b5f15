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
use std::io;

use tokio::task::JoinError;

use crate::{
    config::ConfigError, metric::MetricError, midi::MidiError, player::PlaybackError,
    session::SessionError,
};

/// Top level failures, grouped by when they can happen.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("unable to open MIDI output: {0}")]
    Midi(#[from] MidiError),

    #[error("unable to open metric source: {0}")]
    Metric(#[from] MetricError),

    #[error("unable to acquire session: {0}")]
    Credential(#[from] SessionError),

    #[error("unable to read password: {0}")]
    Password(io::Error),

    #[error("keyboard driver failed: {0}")]
    Keyboard(io::Error),

    #[error("task failed: {0}")]
    Join(#[from] JoinError),

    #[error("unable to silence the last chord: {0}")]
    Shutdown(#[from] PlaybackError),
}

/// The broad class of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Nothing was played; the monitor never started.
    Startup,
    /// Credentials could not be obtained or used.
    Credential,
    /// The monitor was running when the failure happened.
    Runtime,
}

impl Error {
    pub fn kind(&self) -> Kind {
        match self {
            Error::Config(_) | Error::Midi(_) | Error::Metric(_) => Kind::Startup,
            Error::Credential(_) | Error::Password(_) => Kind::Credential,
            Error::Keyboard(_) | Error::Join(_) | Error::Shutdown(_) => Kind::Runtime,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Kind::Startup, Error::from(MidiError::NoOutputDevices).kind());
        assert_eq!(
            Kind::Startup,
            Error::from(MetricError::RemoteUnsupported("host".to_string())).kind()
        );
        assert_eq!(
            Kind::Credential,
            Error::from(SessionError::MissingPassword("CORP\\alice".to_string())).kind()
        );
        assert_eq!(
            Kind::Credential,
            Error::Password(io::Error::new(io::ErrorKind::Interrupted, "cancelled")).kind()
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            "unable to open MIDI output: no MIDI output devices available",
            Error::from(MidiError::NoOutputDevices).to_string()
        );
    }
}
