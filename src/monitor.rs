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
use tracing::{debug, info, span, Level};

use crate::{
    chord::{Chord, OctaveOffset},
    mapper, metric,
    player::{ChordPlayer, PlaybackError, PlaybackState},
    progress::Indicator,
    resources::ResourceManager,
};

/// Errors raised by a single sample, map and play cycle.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("unable to sample metric: {0}")]
    Metric(#[from] metric::MetricError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error("resources have been released")]
    Released,
}

/// What a completed cycle played.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub value: f32,
    pub chord: Chord,
    pub offset: OctaveOffset,
}

/// Ties the metric source to the chord player and the resources it plays through.
pub struct Monitor {
    source: Box<dyn metric::Source>,
    player: ChordPlayer,
    resources: ResourceManager,
    progress: Box<dyn Indicator>,
}

impl Monitor {
    pub fn new(
        source: Box<dyn metric::Source>,
        resources: ResourceManager,
        progress: Box<dyn Indicator>,
    ) -> Monitor {
        Monitor {
            source,
            player: ChordPlayer::new(),
            resources,
            progress,
        }
    }

    /// Samples the metric, maps it to a chord and plays it in place of the previous chord.
    pub fn cycle(&mut self) -> Result<CycleReport, CycleError> {
        let device = self.resources.device().ok_or(CycleError::Released)?;

        let value = self.source.sample()?;
        self.progress.update(value);

        let (chord, offset) = mapper::map(value);
        debug!(
            value,
            band = mapper::band_index(value),
            chord = chord.name(),
            offset = offset.octaves(),
            "Mapped sample."
        );
        self.player.transition(device, chord, offset)?;

        Ok(CycleReport {
            value,
            chord,
            offset,
        })
    }

    /// What the player currently has sounding.
    pub fn state(&self) -> PlaybackState {
        self.player.state()
    }

    /// Silences the sounding chord and releases the device and session. Resources are released
    /// even if the chord could not be silenced.
    pub fn shutdown(&mut self) -> Result<(), PlaybackError> {
        let span = span!(Level::INFO, "shutdown");
        let _enter = span.enter();

        let result = match self.resources.device() {
            Some(device) => self.player.stop_all(device),
            None => Ok(()),
        };
        self.progress.finish();
        self.resources.release();
        info!("Monitor shut down.");
        result
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use crate::{
        chord::{C_MAJOR, D_MAJOR, E_MAJOR},
        metric,
        midi::test::{Device, Message},
        progress::test::Recorder,
    };

    use super::*;

    fn monitor(
        values: &str,
        recorder: &Device,
        progress: &Recorder,
    ) -> Result<Monitor, Box<dyn Error>> {
        Ok(Monitor::new(
            metric::get_source(Some(values), None)?,
            ResourceManager::new(Box::new(recorder.clone()), None),
            Box::new(progress.clone()),
        ))
    }

    #[test]
    fn test_cycles_follow_metric() -> Result<(), Box<dyn Error>> {
        let recorder = Device::get("mock");
        let progress = Recorder::default();
        let mut monitor = monitor("mock:5,15,95", &recorder, &progress)?;

        let reports = (0..3)
            .map(|_| monitor.cycle())
            .collect::<Result<Vec<CycleReport>, CycleError>>()?;

        assert_eq!(
            vec![(C_MAJOR, -2), (D_MAJOR, -1), (E_MAJOR, 2)],
            reports
                .iter()
                .map(|report| (report.chord, report.offset.octaves()))
                .collect::<Vec<_>>()
        );
        assert_eq!(vec![5.0, 15.0, 95.0], progress.values());
        assert_eq!(15, recorder.sent().len());
        Ok(())
    }

    #[test]
    fn test_shutdown_silences_and_releases() -> Result<(), Box<dyn Error>> {
        let recorder = Device::get("mock");
        let progress = Recorder::default();
        let mut monitor = monitor("mock:50", &recorder, &progress)?;

        monitor.cycle()?;
        recorder.clear();
        monitor.shutdown()?;

        assert_eq!(
            vec![
                Message::NoteOff { key: 69, velocity: 0 },
                Message::NoteOff { key: 73, velocity: 0 },
                Message::NoteOff { key: 76, velocity: 0 },
            ],
            recorder.sent()
        );
        assert_eq!(PlaybackState::Idle, monitor.state());
        assert!(recorder.is_closed());
        assert!(progress.is_finished());

        // Nothing can play after shutdown, and shutting down again is harmless.
        assert!(matches!(monitor.cycle(), Err(CycleError::Released)));
        monitor.shutdown()?;
        Ok(())
    }

    #[test]
    fn test_failed_cycle_keeps_running() -> Result<(), Box<dyn Error>> {
        let recorder = Device::get("mock");
        let progress = Recorder::default();
        let mut monitor = monitor("mock:5,15", &recorder, &progress)?;

        recorder.fail_after(0);
        assert!(matches!(monitor.cycle(), Err(CycleError::Playback(_))));
        assert_eq!(PlaybackState::Idle, monitor.state());

        recorder.fail_after(usize::MAX);
        let report = monitor.cycle()?;
        assert_eq!(D_MAJOR, report.chord);
        Ok(())
    }
}
