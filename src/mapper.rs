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
use crate::chord::{
    Chord, OctaveOffset, A_MAJOR, B_MAJOR, C_MAJOR, D_MAJOR, E_MAJOR, F_MAJOR, G_MAJOR,
};

/// A half-open interval [low, high) of metric values mapped to a chord and octave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordBand {
    low: f32,
    high: f32,
    chord: Chord,
    offset: OctaveOffset,
}

impl ChordBand {
    const fn new(low: f32, high: f32, chord: Chord, octaves: i8) -> ChordBand {
        ChordBand {
            low,
            high,
            chord,
            offset: OctaveOffset::new(octaves),
        }
    }

    /// Returns true if the value falls within this band. NaN is never contained.
    pub fn contains(&self, value: f32) -> bool {
        value >= self.low && value < self.high
    }

    pub fn chord(&self) -> Chord {
        self.chord
    }

    pub fn offset(&self) -> OctaveOffset {
        self.offset
    }
}

/// The decile bands, ascending. Anything not captured here falls to CATCH_ALL.
static BANDS: [ChordBand; 9] = [
    ChordBand::new(0.0, 10.0, C_MAJOR, -2),
    ChordBand::new(10.0, 20.0, D_MAJOR, -1),
    ChordBand::new(20.0, 30.0, E_MAJOR, -1),
    ChordBand::new(30.0, 40.0, F_MAJOR, 0),
    ChordBand::new(40.0, 50.0, G_MAJOR, 0),
    ChordBand::new(50.0, 60.0, A_MAJOR, 0),
    ChordBand::new(60.0, 70.0, B_MAJOR, 0),
    ChordBand::new(70.0, 80.0, C_MAJOR, 1),
    ChordBand::new(80.0, 90.0, D_MAJOR, 2),
];

/// Values >= 90, below zero and NaN.
static CATCH_ALL: ChordBand = ChordBand::new(90.0, f32::INFINITY, E_MAJOR, 2);

/// Returns the index of the band the value falls into, 0 through 9. Index 9 is the catch-all.
pub fn band_index(value: f32) -> usize {
    BANDS
        .iter()
        .position(|band| band.contains(value))
        .unwrap_or(BANDS.len())
}

/// Returns the band the value falls into.
pub fn band(value: f32) -> &'static ChordBand {
    BANDS
        .iter()
        .find(|band| band.contains(value))
        .unwrap_or(&CATCH_ALL)
}

/// Maps a metric value to the chord and octave offset to play. Total over all floats.
pub fn map(value: f32) -> (Chord, OctaveOffset) {
    let band = band(value);
    (band.chord(), band.offset())
}

#[cfg(test)]
mod test {
    use super::*;

    fn octaves(value: f32) -> (Chord, i8) {
        let (chord, offset) = map(value);
        (chord, offset.octaves())
    }

    #[test]
    fn test_table() {
        assert_eq!((C_MAJOR, -2), octaves(0.0));
        assert_eq!((C_MAJOR, -2), octaves(9.99));
        assert_eq!((D_MAJOR, -1), octaves(10.0));
        assert_eq!((E_MAJOR, -1), octaves(25.0));
        assert_eq!((F_MAJOR, 0), octaves(30.0));
        assert_eq!((G_MAJOR, 0), octaves(45.5));
        assert_eq!((A_MAJOR, 0), octaves(59.999));
        assert_eq!((B_MAJOR, 0), octaves(60.0));
        assert_eq!((C_MAJOR, 1), octaves(79.0));
        assert_eq!((D_MAJOR, 2), octaves(89.9));
        assert_eq!((E_MAJOR, 2), octaves(90.0));
        assert_eq!((E_MAJOR, 2), octaves(100.0));
    }

    #[test]
    fn test_catch_all() {
        assert_eq!((E_MAJOR, 2), octaves(-5.0));
        assert_eq!((E_MAJOR, 2), octaves(95.0));
        assert_eq!((E_MAJOR, 2), octaves(f32::NAN));
        assert_eq!((E_MAJOR, 2), octaves(f32::INFINITY));
        assert_eq!((E_MAJOR, 2), octaves(f32::NEG_INFINITY));
        assert_eq!((E_MAJOR, 2), octaves(-0.0001));
        assert_eq!(9, band_index(-5.0));
        assert_eq!(9, band_index(f32::NAN));
    }

    #[test]
    fn test_negative_zero_is_first_band() {
        assert_eq!((C_MAJOR, -2), octaves(-0.0));
    }

    #[test]
    fn test_total_over_sampled_floats() {
        let mut value = -1000.0f32;
        while value < 1000.0 {
            let index = band_index(value);
            assert!(index <= 9);
            assert_eq!(band(value).chord(), map(value).0);
            value += 0.37;
        }
        for bits in [0u32, 1, 0x7f7f_ffff, 0xff7f_ffff, 0x8000_0001] {
            let value = f32::from_bits(bits);
            assert!(band_index(value) <= 9);
        }
    }

    #[test]
    fn test_monotonic_banding() {
        let mut previous = 0;
        let mut value = 0.0f32;
        while value < 90.0 {
            let index = band_index(value);
            assert!(index >= previous, "band index decreased at {}", value);
            assert_eq!((value / 10.0).floor() as usize, index);
            previous = index;
            value += 0.25;
        }
    }

    #[test]
    fn test_band_index_matches_table() {
        for (index, band) in BANDS.iter().enumerate() {
            assert_eq!(index, band_index(band.low));
            assert_eq!(map(band.low), (band.chord(), band.offset()));
        }
    }
}
