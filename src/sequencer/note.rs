// Note representation for the sequencer
// A note event is a pitch with a start and a duration in quarter notes

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A timed note, produced from a grid or a note list for playback and export
///
/// `start` and `duration` are measured in quarter notes from the start of the
/// pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    /// MIDI note number (0-127, where 60 = C4)
    pub pitch: u8,
    pub start: f64,
    pub duration: f64,
}

impl NoteEvent {
    pub fn new(pitch: u8, start: f64, duration: f64) -> Self {
        assert!(pitch <= 127, "MIDI pitch must be 0-127");
        Self {
            pitch,
            start,
            duration,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn name(&self) -> String {
        note_name(self.pitch)
    }
}

/// Get the note name (e.g., "C4", "A#5")
pub fn note_name(pitch: u8) -> String {
    let octave = (pitch / 12) as i32 - 1;
    let note_index = (pitch % 12) as usize;

    format!("{}{}", NOTE_NAMES[note_index], octave)
}

/// Parse a note name such as "C4", "F#5", "Bb3" or "C-1" into a MIDI pitch
pub fn parse_note_name(name: &str) -> Option<u8> {
    let name = name.trim();
    let mut chars = name.chars();
    let letter = chars.next()?.to_ascii_uppercase();

    let base: i32 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest = chars.as_str();
    let (accidental, octave_str) = match rest.chars().next() {
        Some('#') => (1, &rest[1..]),
        Some('b') => (-1, &rest[1..]),
        _ => (0, rest),
    };

    let octave: i32 = octave_str.parse().ok()?;
    let pitch = (octave + 1) * 12 + base + accidental;

    u8::try_from(pitch).ok().filter(|p| *p <= 127)
}

/// Convert MIDI note to frequency: 440 * 2^((note - 69) / 12)
pub fn pitch_to_frequency(pitch: u8) -> f32 {
    440.0 * 2_f32.powf((pitch as f32 - 69.0) / 12.0)
}

/// True for the black keys of a piano keyboard
pub fn is_black_key(pitch: u8) -> bool {
    matches!(pitch % 12, 1 | 3 | 6 | 8 | 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_name() {
        // Middle C (C4) = MIDI note 60
        assert_eq!(note_name(60), "C4");
        // A4 (440 Hz) = MIDI note 69
        assert_eq!(note_name(69), "A4");
        assert_eq!(note_name(73), "C#5");
        assert_eq!(note_name(0), "C-1");
    }

    #[test]
    fn test_parse_note_name() {
        assert_eq!(parse_note_name("C4"), Some(60));
        assert_eq!(parse_note_name("E4"), Some(64));
        assert_eq!(parse_note_name("C#4"), Some(61));
        assert_eq!(parse_note_name("Db4"), Some(61));
        assert_eq!(parse_note_name("B5"), Some(83));
        assert_eq!(parse_note_name("C1"), Some(24));
        assert_eq!(parse_note_name("C-1"), Some(0));
        assert_eq!(parse_note_name("G9"), Some(127));
        assert_eq!(parse_note_name("A9"), None);
        assert_eq!(parse_note_name("H4"), None);
        assert_eq!(parse_note_name(""), None);
        assert_eq!(parse_note_name("C"), None);
    }

    #[test]
    fn test_name_roundtrip_over_keyboard() {
        for pitch in 0..=127u8 {
            assert_eq!(parse_note_name(&note_name(pitch)), Some(pitch));
        }
    }

    #[test]
    fn test_frequency() {
        assert!((pitch_to_frequency(69) - 440.0).abs() < 0.001);
        assert!((pitch_to_frequency(81) - 880.0).abs() < 0.01);
    }

    #[test]
    fn test_black_keys() {
        assert!(!is_black_key(60));
        assert!(is_black_key(61));
        assert!(is_black_key(70));
        assert!(!is_black_key(71));
    }

    #[test]
    fn test_note_event_end() {
        let note = NoteEvent::new(60, 0.5, 0.2);
        assert!((note.end() - 0.7).abs() < 1e-9);
        assert_eq!(note.name(), "C4");
    }

    #[test]
    #[should_panic(expected = "MIDI pitch must be 0-127")]
    fn test_invalid_pitch() {
        NoteEvent::new(128, 0.0, 1.0);
    }
}
