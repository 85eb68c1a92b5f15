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

/// Errors raised while opening or sampling a metric source.
#[derive(Debug, thiserror::Error)]
pub enum MetricError {
    #[error("unable to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed CPU counters: {0}")]
    Malformed(String),

    #[error("remote counters on {0} are not supported, only the local machine can be sampled")]
    RemoteUnsupported(String),

    #[error("malformed mock values '{0}'")]
    MockValues(String),
}
