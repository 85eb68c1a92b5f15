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
use tracing::{info, span, Level};

use crate::{midi, session::Session};

/// Owns the MIDI output device and the elevated session, and releases both on shutdown.
pub struct ResourceManager {
    device: Option<Box<dyn midi::Device>>,
    session: Option<Session>,
}

impl ResourceManager {
    pub fn new(device: Box<dyn midi::Device>, session: Option<Session>) -> ResourceManager {
        ResourceManager {
            device: Some(device),
            session,
        }
    }

    /// Lends the device out. Returns None once resources have been released.
    pub fn device(&mut self) -> Option<&mut dyn midi::Device> {
        match self.device.as_mut() {
            Some(device) => Some(device.as_mut()),
            None => None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Returns true once release has run.
    pub fn is_released(&self) -> bool {
        self.device.is_none() && self.session.is_none()
    }

    /// Closes the device, then releases the session. Safe to call more than once.
    pub fn release(&mut self) {
        if self.is_released() {
            return;
        }

        let span = span!(Level::INFO, "release resources");
        let _enter = span.enter();

        if let Some(mut device) = self.device.take() {
            device.close();
            info!(device = device.name(), "Released MIDI device.");
        }
        if let Some(mut session) = self.session.take() {
            session.release();
        }
    }
}

impl Drop for ResourceManager {
    fn drop(&mut self) {
        self.release();
    }
}
