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
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{crate_version, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cpuears::config::Settings;
use cpuears::controller::{self, keyboard};
use cpuears::session::Credentials;
use cpuears::{mapper, midi};

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Plays CPU utilization as MIDI chords."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Starts sampling CPU utilization and playing it through the MIDI device.
    Start {
        /// The machine to sample. Defaults to this machine.
        #[arg(short, long)]
        machine: Option<String>,
        /// The login to sample as, e.g. CORP\username. Prompts for the password if none is given.
        #[arg(short, long)]
        domain_login: Option<String>,
        /// The password for the domain login.
        #[arg(short, long)]
        password: Option<String>,
        /// The path to a YAML settings file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// The MIDI output device to play through. Defaults to the first output device.
        #[arg(long)]
        midi_device: Option<String>,
        /// Don't draw the progress bar.
        #[arg(long)]
        no_progress: bool,
    },
    /// Lists the available MIDI output devices.
    MidiDevices {},
    /// Prints the chord a utilization value maps to.
    Map {
        /// The utilization value, nominally 0 to 100.
        #[arg(allow_negative_numbers = true)]
        value: f32,
    },
    /// Prints the effective settings.
    ShowConfig {
        /// The path to a YAML settings file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            machine,
            domain_login,
            password,
            config,
            midi_device,
            no_progress,
        } => {
            let mut settings = Settings::load(config.as_deref())?;
            settings.set_midi_device(midi_device);
            if no_progress {
                settings.disable_progress();
            }

            let credentials = match domain_login {
                Some(domain_login) => {
                    let password = match password {
                        Some(password) if !password.is_empty() => password,
                        _ => keyboard::prompt_password()
                            .map_err(cpuears::error::Error::Password)?,
                    };
                    Some(Credentials::new(&domain_login, &password))
                }
                None => None,
            };

            info!("Connecting to CPU counter...");
            let mut controller = controller::init_monitor_and_controller(
                &settings,
                machine.as_deref(),
                credentials,
                Arc::new(keyboard::Driver::new()),
            )?;

            match controller.join().await? {
                Ok(stats) => info!(
                    completed = stats.completed,
                    failed = stats.failed,
                    skipped = stats.skipped,
                    "Stopped."
                ),
                Err(e) => {
                    error!(err = %e, "Stopped with an error.");
                    return Err(e.into());
                }
            }
        }
        Commands::MidiDevices {} => {
            let devices = midi::list_devices()?;

            if devices.is_empty() {
                println!("No MIDI output devices available.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Map { value } => {
            let (chord, offset) = mapper::map(value);
            let keys = chord
                .keys(offset)
                .map(|keys| {
                    keys.iter()
                        .map(|key| key.as_int().to_string())
                        .collect::<Vec<String>>()
                        .join(", ")
                })
                .unwrap_or_default();
            println!("{} -> {}, octave {} (notes {})", value, chord, offset, keys);
        }
        Commands::ShowConfig { config } => {
            print!("{}", Settings::load(config.as_deref())?.to_yaml()?);
        }
    }

    Ok(())
}
