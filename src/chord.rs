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

use midly::num::u7;

/// Number of semitones in an octave.
const SEMITONES_PER_OCTAVE: i16 = 12;

/// A MIDI note number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pitch(u8);

impl Pitch {
    pub const C: Pitch = Pitch(60);
    pub const C_SHARP: Pitch = Pitch(61);
    pub const D: Pitch = Pitch(62);
    pub const D_SHARP: Pitch = Pitch(63);
    pub const E: Pitch = Pitch(64);
    pub const F: Pitch = Pitch(65);
    pub const F_SHARP: Pitch = Pitch(66);
    pub const G: Pitch = Pitch(67);
    pub const G_SHARP: Pitch = Pitch(68);
    pub const A: Pitch = Pitch(69);
    pub const A_SHARP: Pitch = Pitch(70);
    pub const B: Pitch = Pitch(71);

    /// Creates a pitch from a MIDI note number. Returns None if the number is above 127.
    pub fn new(number: u8) -> Option<Pitch> {
        u7::try_from(number).map(|_| Pitch(number))
    }

    /// The raw MIDI note number.
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Returns this pitch raised by the given number of semitones.
    const fn raised(self, semitones: u8) -> Pitch {
        Pitch(self.0 + semitones)
    }

    /// Shifts the pitch by whole octaves. Returns None if the result leaves the MIDI note range.
    pub fn shift(self, offset: OctaveOffset) -> Option<u7> {
        let shifted = i16::from(self.0) + offset.semitones();
        u8::try_from(shifted).ok().and_then(u7::try_from)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A signed number of octaves applied uniformly to a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct OctaveOffset(i8);

impl OctaveOffset {
    pub const fn new(octaves: i8) -> OctaveOffset {
        OctaveOffset(octaves)
    }

    /// The number of octaves.
    pub const fn octaves(self) -> i8 {
        self.0
    }

    /// The offset expressed in semitones.
    pub const fn semitones(self) -> i16 {
        self.0 as i16 * SEMITONES_PER_OCTAVE
    }
}

impl fmt::Display for OctaveOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.0)
    }
}

/// A major triad. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chord {
    name: &'static str,
    root: Pitch,
    third: Pitch,
    fifth: Pitch,
}

pub const C_MAJOR: Chord = Chord::major("C major", Pitch::C);
pub const D_MAJOR: Chord = Chord::major("D major", Pitch::D);
pub const E_MAJOR: Chord = Chord::major("E major", Pitch::E);
pub const F_MAJOR: Chord = Chord::major("F major", Pitch::F);
pub const G_MAJOR: Chord = Chord::major("G major", Pitch::G);
pub const A_MAJOR: Chord = Chord::major("A major", Pitch::A);
pub const B_MAJOR: Chord = Chord::major("B major", Pitch::B);

impl Chord {
    /// Builds the major triad (root, root+4, root+7) on the given root.
    pub const fn major(name: &'static str, root: Pitch) -> Chord {
        Chord {
            name,
            root,
            third: root.raised(4),
            fifth: root.raised(7),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The pitches of the chord in (root, third, fifth) order.
    pub fn pitches(&self) -> [Pitch; 3] {
        [self.root, self.third, self.fifth]
    }

    /// The MIDI keys of the chord after the octave offset has been applied. Returns None if
    /// any of the shifted pitches leaves the MIDI note range.
    pub fn keys(&self, offset: OctaveOffset) -> Option<[u7; 3]> {
        Some([
            self.root.shift(offset)?,
            self.third.shift(offset)?,
            self.fifth.shift(offset)?,
        ])
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
