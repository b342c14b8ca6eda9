// MIDI types events

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
}

impl MidiEvent {
    /// Parse un RAW MIDI message
    ///
    /// Only note messages are kept; everything else (controllers, clock,
    /// sysex) returns `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        if data.len() < 2 {
            return None;
        }

        let note = data[0] & 0x7F;
        let velocity = data[1] & 0x7F;

        match status & 0xF0 {
            // Velocity 0 = Note Off
            0x90 if velocity == 0 => Some(MidiEvent::NoteOff { note }),
            0x90 => Some(MidiEvent::NoteOn { note, velocity }),
            0x80 => Some(MidiEvent::NoteOff { note }),
            _ => None,
        }
    }

    pub fn note(&self) -> u8 {
        match self {
            MidiEvent::NoteOn { note, .. } | MidiEvent::NoteOff { note } => *note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_on() {
        assert_eq!(
            MidiEvent::from_bytes(&[0x90, 60, 100]),
            Some(MidiEvent::NoteOn {
                note: 60,
                velocity: 100
            })
        );
        // Any channel
        assert_eq!(
            MidiEvent::from_bytes(&[0x9F, 64, 1]),
            Some(MidiEvent::NoteOn {
                note: 64,
                velocity: 1
            })
        );
    }

    #[test]
    fn test_note_on_zero_velocity_is_off() {
        assert_eq!(
            MidiEvent::from_bytes(&[0x90, 60, 0]),
            Some(MidiEvent::NoteOff { note: 60 })
        );
    }

    #[test]
    fn test_note_off() {
        let event = MidiEvent::from_bytes(&[0x83, 72, 40]);
        assert_eq!(event, Some(MidiEvent::NoteOff { note: 72 }));
        assert_eq!(event.map(|e| e.note()), Some(72));
    }

    #[test]
    fn test_ignored_messages() {
        assert_eq!(MidiEvent::from_bytes(&[]), None);
        assert_eq!(MidiEvent::from_bytes(&[0x90, 60]), None);
        assert_eq!(MidiEvent::from_bytes(&[0xB0, 7, 100]), None);
        assert_eq!(MidiEvent::from_bytes(&[0xF8]), None);
    }
}
