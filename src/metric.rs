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

use tracing::info;

use crate::session::Session;

pub use self::error::MetricError;

mod error;
mod mock;
mod procstat;
mod target;

pub use self::target::Target;

/// A source of the monitored utilization value.
pub trait Source: fmt::Display + Send {
    /// Samples the current value, nominally a percentage in [0, 100].
    fn sample(&mut self) -> Result<f32, MetricError>;
}

/// Opens the metric source for the given machine. No machine, a loopback name or the local
/// hostname select the local CPU counter. Names starting with "mock" replay a fixed list of
/// values, e.g. "mock:5,15,95".
///
/// The local counter is world readable, so a session only names the user the monitor runs for.
pub fn get_source(
    machine: Option<&str>,
    session: Option<&Session>,
) -> Result<Box<dyn Source>, MetricError> {
    match Target::resolve(machine) {
        Target::Mock(values) => Ok(Box::new(mock::Source::parse(&values)?)),
        Target::Remote(machine) => Err(MetricError::RemoteUnsupported(machine)),
        Target::Local => {
            let source = procstat::Source::new()?;
            info!(
                source = %source,
                user = ?session.map(Session::user),
                "Opened CPU counter."
            );
            Ok(Box::new(source))
        }
    }
}
