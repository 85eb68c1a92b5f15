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

use super::MetricError;

/// A mock source that replays a fixed list of values. The last value repeats forever.
pub struct Source {
    values: Vec<f32>,
    position: usize,
}

impl Source {
    pub fn new(values: Vec<f32>) -> Source {
        Source {
            values,
            position: 0,
        }
    }

    /// Parses a target of the form "mock" or "mock:v1,v2,...". Plain "mock" always reads 0.
    pub fn parse(target: &str) -> Result<Source, MetricError> {
        let values = match target.split_once(':') {
            None => Vec::new(),
            Some((_, values)) => values
                .split(',')
                .map(|value| {
                    value
                        .trim()
                        .parse::<f32>()
                        .map_err(|_| MetricError::MockValues(target.to_string()))
                })
                .collect::<Result<Vec<f32>, MetricError>>()?,
        };
        Ok(Source::new(values))
    }
}

impl super::Source for Source {
    fn sample(&mut self) -> Result<f32, MetricError> {
        let value = match self.values.get(self.position) {
            Some(value) => {
                self.position += 1;
                *value
            }
            None => self.values.last().copied().unwrap_or(0.0),
        };
        Ok(value)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mock ({} values)", self.values.len())
    }
}
