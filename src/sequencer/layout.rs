// Grid layouts - the fixed, ordered rows of the piano roll and the drum grid

use crate::sequencer::note::note_name;
use crate::sequencer::timeline::Subdivision;

/// Drum voices of the step sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrumKind {
    Kick,
    Snare,
    HiHat,
    Clap,
}

impl DrumKind {
    pub const ALL: [DrumKind; 4] = [
        DrumKind::Kick,
        DrumKind::Snare,
        DrumKind::HiHat,
        DrumKind::Clap,
    ];

    /// General MIDI percussion note for this voice
    pub fn pitch(&self) -> u8 {
        match self {
            DrumKind::Kick => 36,
            DrumKind::Snare => 38,
            DrumKind::HiHat => 42,
            DrumKind::Clap => 39,
        }
    }

    pub fn from_pitch(pitch: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.pitch() == pitch)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DrumKind::Kick => "Kick",
            DrumKind::Snare => "Snare",
            DrumKind::HiHat => "HiHat",
            DrumKind::Clap => "Clap",
        }
    }

    pub fn color(&self) -> [u8; 3] {
        match self {
            DrumKind::Kick => [0xf4, 0x43, 0x36],
            DrumKind::Snare => [0x4c, 0xaf, 0x50],
            DrumKind::HiHat => [0x21, 0x96, 0xf3],
            DrumKind::Clap => [0xff, 0x98, 0x00],
        }
    }

    /// How long a hit rings before release
    pub fn trigger_length(&self) -> Subdivision {
        match self {
            DrumKind::Kick | DrumKind::Snare => Subdivision::Eighth,
            DrumKind::HiHat | DrumKind::Clap => Subdivision::Sixteenth,
        }
    }
}

/// Sound source a grid row drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instrument {
    /// Polyphonic synth voice playing the row pitch
    Tone,
    Drum(DrumKind),
}

impl Instrument {
    pub fn trigger_length(&self) -> Subdivision {
        match self {
            Instrument::Tone => Subdivision::Eighth,
            Instrument::Drum(kind) => kind.trigger_length(),
        }
    }
}

/// One row of a step grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSpec {
    pub label: String,
    /// MIDI note number used for export and import matching
    pub pitch: u8,
    pub instrument: Instrument,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    PianoRoll,
    DrumGrid,
}

/// Fixed ordered set of rows shared by every grid of one editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    kind: LayoutKind,
    rows: Vec<RowSpec>,
}

/// Accent colour of active piano roll cells
pub const PIANO_ACCENT: [u8; 3] = [0xd2, 0xd5, 0xdb];

/// Octaves shown by the piano roll
pub const PIANO_OCTAVES: [i32; 2] = [4, 5];

impl GridLayout {
    /// Piano roll rows: C4..B5, highest pitch on top
    pub fn piano_roll() -> Self {
        let mut rows: Vec<RowSpec> = PIANO_OCTAVES
            .iter()
            .flat_map(|octave| (0..12).map(move |i| ((octave + 1) * 12 + i) as u8))
            .map(|pitch| RowSpec {
                label: note_name(pitch),
                pitch,
                instrument: Instrument::Tone,
                color: PIANO_ACCENT,
            })
            .collect();
        rows.reverse();

        Self {
            kind: LayoutKind::PianoRoll,
            rows,
        }
    }

    /// Drum rows in display order: Kick, Snare, HiHat, Clap
    pub fn drum_grid() -> Self {
        let rows = DrumKind::ALL
            .iter()
            .map(|kind| RowSpec {
                label: kind.name().to_string(),
                pitch: kind.pitch(),
                instrument: Instrument::Drum(*kind),
                color: kind.color(),
            })
            .collect();

        Self {
            kind: LayoutKind::DrumGrid,
            rows,
        }
    }

    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    pub fn rows(&self) -> &[RowSpec] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&RowSpec> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row index for a MIDI pitch, if the layout has one
    pub fn row_for_pitch(&self, pitch: u8) -> Option<usize> {
        self.rows.iter().position(|r| r.pitch == pitch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piano_layout() {
        let layout = GridLayout::piano_roll();
        assert_eq!(layout.len(), 24);
        assert_eq!(layout.kind(), LayoutKind::PianoRoll);

        // Highest note on top
        assert_eq!(layout.rows()[0].label, "B5");
        assert_eq!(layout.rows()[0].pitch, 83);
        assert_eq!(layout.rows()[23].label, "C4");
        assert_eq!(layout.rows()[23].pitch, 60);

        assert_eq!(layout.row_for_pitch(60), Some(23));
        assert_eq!(layout.row_for_pitch(59), None);
        assert_eq!(layout.row_for_pitch(84), None);
    }

    #[test]
    fn test_drum_layout() {
        let layout = GridLayout::drum_grid();
        let labels: Vec<&str> = layout.rows().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["Kick", "Snare", "HiHat", "Clap"]);

        assert_eq!(layout.row_for_pitch(36), Some(0));
        assert_eq!(layout.row_for_pitch(39), Some(3));
        assert_eq!(layout.row_for_pitch(60), None);
        assert_eq!(
            layout.row(2).map(|r| r.instrument),
            Some(Instrument::Drum(DrumKind::HiHat))
        );
    }

    #[test]
    fn test_drum_pitch_mapping() {
        for kind in DrumKind::ALL {
            assert_eq!(DrumKind::from_pitch(kind.pitch()), Some(kind));
        }
        assert_eq!(DrumKind::from_pitch(40), None);
    }

    #[test]
    fn test_trigger_lengths() {
        assert_eq!(Instrument::Tone.trigger_length(), Subdivision::Eighth);
        assert_eq!(
            Instrument::Drum(DrumKind::Kick).trigger_length(),
            Subdivision::Eighth
        );
        assert_eq!(
            Instrument::Drum(DrumKind::Clap).trigger_length(),
            Subdivision::Sixteenth
        );
    }
}
