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
use std::{io, sync::Arc};

use tokio::{
    sync::{
        mpsc::{self, Sender},
        Mutex,
    },
    task::{JoinError, JoinHandle},
};
use tracing::{error, info, span, Instrument, Level};

use crate::{
    config::Settings,
    error::Error,
    metric, midi,
    monitor::Monitor,
    progress::{self, Indicator},
    resources::ResourceManager,
    scheduler::{Scheduler, Stats},
    session::{Credentials, Session},
};

pub mod keyboard;

/// Controller events that change what the monitor does.
#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    /// Silences the monitor, releases its resources and exits.
    Shutdown,
}

pub trait Driver: Send + Sync + 'static {
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>>;
}

/// Runs the monitor until a driver asks it to shut down.
pub struct Controller {
    handle: JoinHandle<Result<Stats, Error>>,
}

impl Controller {
    /// Creates a new controller for an already running scheduler.
    pub fn new(
        scheduler: Scheduler,
        monitor: Arc<Mutex<Monitor>>,
        driver: Arc<dyn Driver>,
    ) -> Controller {
        Controller {
            handle: tokio::spawn(
                Controller::trigger_events(scheduler, monitor, driver)
                    .instrument(span!(Level::INFO, "controller")),
            ),
        }
    }

    /// Join will block until the controller finishes, returning what the scheduler did.
    pub async fn join(&mut self) -> Result<Result<Stats, Error>, JoinError> {
        (&mut self.handle).await
    }

    /// Waits for a shutdown event, then stops the scheduler between cycles, silences the last chord
    /// and releases the device and session. A driver that exits without an event also shuts the
    /// monitor down.
    async fn trigger_events(
        mut scheduler: Scheduler,
        monitor: Arc<Mutex<Monitor>>,
        driver: Arc<dyn Driver>,
    ) -> Result<Stats, Error> {
        let (events_tx, mut events_rx) = mpsc::channel(1);
        let join_handle = driver.monitor_events(events_tx);

        info!("Controller started.");

        let driver_result = match events_rx.recv().await {
            Some(event) => {
                info!(event = format!("{:?}", event), "Received event.");
                Ok(())
            }
            None => {
                info!("Event monitor closed.");
                match join_handle.await {
                    Ok(result) => result.map_err(Error::Keyboard),
                    Err(e) => Err(Error::from(e)),
                }
            }
        };

        let stats = scheduler.stop().await?;
        let shutdown_result = monitor.lock().await.shutdown();

        if let Err(e) = &driver_result {
            error!(err = %e, "Event monitor failed.");
        }
        driver_result?;
        shutdown_result?;
        Ok(stats)
    }
}

/// Acquires the session, opens the metric source and MIDI device, and starts the scheduler and
/// controller. Must be called from within a tokio runtime.
pub fn init_monitor_and_controller(
    settings: &Settings,
    machine: Option<&str>,
    credentials: Option<Credentials>,
    driver: Arc<dyn Driver>,
) -> Result<Controller, Error> {
    let session = credentials.map(Session::acquire).transpose()?;
    let source = metric::get_source(machine, session.as_ref())?;
    let device = midi::get_device(settings.midi_device())?;
    info!(device = %device, source = %source, "Monitoring.");

    let indicator: Box<dyn Indicator> = if settings.progress() {
        Box::new(progress::Bar::new())
    } else {
        Box::new(progress::Silent)
    };

    let monitor = Arc::new(Mutex::new(Monitor::new(
        source,
        ResourceManager::new(device, session),
        indicator,
    )));
    let scheduler = Scheduler::start(
        monitor.clone(),
        settings.initial_delay()?,
        settings.period()?,
    );

    Ok(Controller::new(scheduler, monitor, driver))
}
