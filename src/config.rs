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
use std::{path::Path, time::Duration};

use config::{Config, Environment, File};
use duration_string::DurationString;
use serde::{Deserialize, Serialize};

pub use self::error::ConfigError;

mod error;

const DEFAULT_INITIAL_DELAY: &str = "100ms";
const DEFAULT_PERIOD: &str = "500ms";

/// Longest accepted initial delay or period.
const MAX_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Prefix of environment variables that override settings, e.g. CPUEARS_PERIOD=250ms.
const ENV_PREFIX: &str = "CPUEARS";

/// Settings for the monitor.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Settings {
    /// How long to wait before the first cycle.
    initial_delay: String,

    /// How often a cycle runs.
    period: String,

    /// The MIDI output device. The first enumerated output is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    midi_device: Option<String>,

    /// Whether to draw the progress bar.
    progress: bool,
}

impl Settings {
    /// Loads settings from the built-in defaults, then the optional YAML file, then the
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder()
            .set_default("initial_delay", DEFAULT_INITIAL_DELAY)?
            .set_default("period", DEFAULT_PERIOD)?
            .set_default("progress", true)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.initial_delay()?;
        if self.period()?.is_zero() {
            return Err(ConfigError::ZeroPeriod);
        }
        Ok(())
    }

    /// How long to wait before the first cycle.
    pub fn initial_delay(&self) -> Result<Duration, ConfigError> {
        parse_duration("initial_delay", &self.initial_delay)
    }

    /// How often a cycle runs.
    pub fn period(&self) -> Result<Duration, ConfigError> {
        parse_duration("period", &self.period)
    }

    pub fn midi_device(&self) -> Option<&str> {
        self.midi_device.as_deref()
    }

    /// Overrides the configured MIDI device.
    pub fn set_midi_device(&mut self, midi_device: Option<String>) {
        if midi_device.is_some() {
            self.midi_device = midi_device;
        }
    }

    pub fn progress(&self) -> bool {
        self.progress
    }

    pub fn disable_progress(&mut self) {
        self.progress = false;
    }

    /// Renders the settings as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yml::to_string(self)?)
    }
}

fn parse_duration(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let duration = DurationString::from_string(value.to_string())
        .map(Duration::from)
        .map_err(|e| ConfigError::Duration {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        })?;

    if duration > MAX_DURATION {
        return Err(ConfigError::DurationTooLong {
            field,
            value: value.to_string(),
            max: MAX_DURATION,
        });
    }
    Ok(duration)
}
