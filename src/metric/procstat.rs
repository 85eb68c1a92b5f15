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
    fmt, fs,
    path::{Path, PathBuf},
};

use super::MetricError;

const PROC_STAT: &str = "/proc/stat";

/// Aggregate CPU time counters, in jiffies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct CpuTimes {
    idle: u64,
    total: u64,
}

impl CpuTimes {
    /// Parses the aggregate "cpu" line of /proc/stat.
    fn parse(contents: &str) -> Result<CpuTimes, MetricError> {
        let line = contents
            .lines()
            .find(|line| line.split_whitespace().next() == Some("cpu"))
            .ok_or_else(|| MetricError::Malformed("no aggregate cpu line".to_string()))?;

        let fields = line
            .split_whitespace()
            .skip(1)
            .map(|field| {
                field
                    .parse::<u64>()
                    .map_err(|e| MetricError::Malformed(format!("field '{}': {}", field, e)))
            })
            .collect::<Result<Vec<u64>, MetricError>>()?;

        if fields.len() < 4 {
            return Err(MetricError::Malformed(format!(
                "expected at least 4 cpu fields, found {}",
                fields.len()
            )));
        }

        // user nice system idle iowait irq softirq steal. Guest time is already counted in user.
        let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
        let total = fields.iter().take(8).sum();
        Ok(CpuTimes { idle, total })
    }

    /// Percentage of time spent busy between the earlier counters and these.
    fn busy_since(&self, earlier: &CpuTimes) -> f32 {
        let total = self.total.saturating_sub(earlier.total);
        if total == 0 {
            return 0.0;
        }
        let idle = self.idle.saturating_sub(earlier.idle).min(total);
        ((total - idle) as f64 / total as f64 * 100.0) as f32
    }
}

/// System-wide CPU utilization read from the kernel's /proc/stat counters.
///
/// The value is a rate over the time between two samples, so the very first sample has no
/// baseline and reads as 0.
pub struct Source {
    path: PathBuf,
    previous: Option<CpuTimes>,
}

impl Source {
    pub fn new() -> Result<Source, MetricError> {
        Source::with_path(PROC_STAT)
    }

    /// Opens a counter file at a custom path. The file is read once to verify it parses.
    pub fn with_path<P: AsRef<Path>>(path: P) -> Result<Source, MetricError> {
        let source = Source {
            path: path.as_ref().to_path_buf(),
            previous: None,
        };
        source.read()?;
        Ok(source)
    }

    fn read(&self) -> Result<CpuTimes, MetricError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| MetricError::Read {
            path: self.path.display().to_string(),
            source,
        })?;
        CpuTimes::parse(&contents)
    }
}

impl super::Source for Source {
    fn sample(&mut self) -> Result<f32, MetricError> {
        let current = self.read()?;
        let value = match self.previous {
            Some(previous) => current.busy_since(&previous),
            None => 0.0,
        };
        self.previous = Some(current);
        Ok(value)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cpu ({})", self.path.display())
    }
}
