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
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Length of the bar; values are percentages.
const BAR_LENGTH: u64 = 100;

const TEMPLATE: &str = "CPU {bar:50.cyan/blue} {pos:>3}%";

/// Displays each sampled value. Purely observational.
pub trait Indicator: Send {
    /// Shows the latest sampled value.
    fn update(&self, value: f32);

    /// Stops displaying.
    fn finish(&self);
}

/// Converts a sample to a bar position, clamped to the bar. NaN shows as empty.
pub fn position(value: f32) -> u64 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, BAR_LENGTH as f32) as u64
}

/// A terminal progress bar.
pub struct Bar {
    bar: ProgressBar,
}

impl Bar {
    /// A bar drawn on stdout, leaving stderr to the logs.
    pub fn new() -> Bar {
        Bar::with_draw_target(ProgressDrawTarget::stdout())
    }

    pub fn with_draw_target(target: ProgressDrawTarget) -> Bar {
        let bar = ProgressBar::with_draw_target(Some(BAR_LENGTH), target);
        if let Ok(style) = ProgressStyle::default_bar().template(TEMPLATE) {
            bar.set_style(style);
        }
        Bar { bar }
    }
}

impl Default for Bar {
    fn default() -> Self {
        Bar::new()
    }
}

impl Indicator for Bar {
    fn update(&self, value: f32) {
        self.bar.set_position(position(value));
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// An indicator that shows nothing.
pub struct Silent;

impl Indicator for Silent {
    fn update(&self, _value: f32) {}

    fn finish(&self) {}
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position() {
        assert_eq!(0, position(0.0));
        assert_eq!(42, position(42.9));
        assert_eq!(100, position(100.0));
        assert_eq!(100, position(250.0));
        assert_eq!(0, position(-5.0));
        assert_eq!(0, position(f32::NAN));
    }

    #[test]
    fn test_bar_template_is_valid() {
        assert!(ProgressStyle::default_bar().template(TEMPLATE).is_ok());
    }

    #[test]
    fn test_bar_updates() {
        let bar = Bar::new();
        bar.update(55.5);
        assert_eq!(55, bar.bar.position());
        assert_eq!(Some(BAR_LENGTH), bar.bar.length());
        bar.finish();
    }

    #[test]
    fn test_hidden_bar_clamps() {
        let bar = Bar::with_draw_target(ProgressDrawTarget::hidden());
        assert!(bar.bar.is_hidden());
        bar.update(140.0);
        assert_eq!(BAR_LENGTH, bar.bar.position());
        bar.update(-3.0);
        assert_eq!(0, bar.bar.position());
        bar.finish();
    }
}
