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

use midir::{MidiOutput, MidiOutputConnection};
use midly::live::LiveEvent;
use tracing::{debug, info, span, Level};

use super::MidiError;

/// A MIDI output device backed by a midir connection.
pub struct Device {
    name: String,
    connection: Option<MidiOutputConnection>,
}

impl super::Device for Device {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn send(&mut self, event: LiveEvent<'static>) -> Result<(), MidiError> {
        let connection = match self.connection.as_mut() {
            Some(connection) => connection,
            None => return Err(MidiError::Closed(self.name.clone())),
        };

        debug!(
            device = self.name,
            event = format!("{:?}", event),
            "Sending event."
        );

        connection.send(&super::encode(&event)?)?;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            let span = span!(Level::INFO, "close (midir)");
            let _enter = span.enter();

            connection.close();
            info!(device = self.name, "Closed MIDI output.");
        }
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        super::Device::close(self);
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Output)", self.name)
    }
}

/// Lists the names of the midir output ports, in enumeration order.
pub fn list() -> Result<Vec<String>, MidiError> {
    let output = MidiOutput::new("cpuears output listing")?;
    output
        .ports()
        .iter()
        .map(|port| output.port_name(port).map_err(MidiError::from))
        .collect()
}

/// Opens the given midir output device. With no name, the first enumerated output port is used.
pub fn get(name: Option<&str>) -> Result<Device, MidiError> {
    let span = span!(Level::INFO, "open device (midir)");
    let _enter = span.enter();

    let output = MidiOutput::new("cpuears output")?;
    let mut ports = Vec::new();
    for port in output.ports() {
        let port_name = output.port_name(&port)?;
        ports.push((port_name, port));
    }

    if ports.is_empty() {
        return Err(MidiError::NoOutputDevices);
    }

    let (port_name, port) = match name {
        None => ports.swap_remove(0),
        Some(name) => {
            let mut matches = ports
                .into_iter()
                .filter(|(port_name, _)| port_name.contains(name))
                .collect::<Vec<_>>();

            if matches.is_empty() {
                return Err(MidiError::NotFound(name.to_string()));
            }
            if matches.len() > 1 {
                return Err(MidiError::Ambiguous(
                    matches
                        .iter()
                        .map(|(port_name, _)| port_name.clone())
                        .collect::<Vec<String>>()
                        .join(", "),
                ));
            }

            // There's exactly one match at this point.
            matches.swap_remove(0)
        }
    };

    let connection = output
        .connect(&port, "cpuears")
        .map_err(|e| MidiError::Connect {
            device: port_name.clone(),
            reason: e.to_string(),
        })?;

    info!(device = port_name, "Opened MIDI output.");

    Ok(Device {
        name: port_name,
        connection: Some(connection),
    })
}
