// MIDI Input - Réception des événements MIDI matériels
//
// The midir callback runs on its own thread and pushes parsed note events
// into a lock-free ring buffer drained by the UI each frame.

use crate::midi::event::MidiEvent;
use log::{info, warn};
use midir::{MidiInput as MidirInput, MidiInputConnection};
use ringbuf::traits::{Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

pub type MidiEventProducer = HeapProd<MidiEvent>;
pub type MidiEventConsumer = HeapCons<MidiEvent>;

pub fn create_midi_channel(capacity: usize) -> (MidiEventProducer, MidiEventConsumer) {
    HeapRb::<MidiEvent>::new(capacity).split()
}

#[derive(Debug, thiserror::Error)]
pub enum MidiInputError {
    #[error("MIDI init error: {0}")]
    Init(#[from] midir::InitError),

    #[error("MIDI port not found: {0}")]
    PortNotFound(String),

    #[error("MIDI connection failed: {0}")]
    Connect(String),
}

/// Names of the available input ports
pub fn list_ports() -> Result<Vec<String>, MidiInputError> {
    let midi_in = MidirInput::new("gridstudio port scan")?;
    Ok(midi_in
        .ports()
        .iter()
        .filter_map(|port| midi_in.port_name(port).ok())
        .collect())
}

/// Keeps the hardware connection open while alive
pub struct MidiInput {
    port_name: Option<String>,
    _connection: Option<MidiInputConnection<()>>,
}

impl MidiInput {
    /// Connect to `port` (by name) or to the first available port.
    ///
    /// With no port at all the studio keeps running without hardware MIDI.
    pub fn connect(
        port: Option<&str>,
        mut events_tx: MidiEventProducer,
    ) -> Result<Self, MidiInputError> {
        let midi_in = MidirInput::new("gridstudio MIDI input")?;
        let ports = midi_in.ports();

        if ports.is_empty() {
            info!("No MIDI port detected, continuing without hardware input");
            return Ok(Self::disconnected());
        }

        let selected = match port {
            Some(wanted) => ports
                .iter()
                .find(|p| midi_in.port_name(p).is_ok_and(|name| name == wanted))
                .ok_or_else(|| MidiInputError::PortNotFound(wanted.to_string()))?,
            None => &ports[0],
        };
        let port_name = midi_in
            .port_name(selected)
            .unwrap_or_else(|_| "Unknown".to_string());

        let connection = midi_in
            .connect(
                selected,
                "gridstudio-input",
                move |_timestamp, message, _| {
                    if let Some(event) = MidiEvent::from_bytes(message)
                        && events_tx.try_push(event).is_err()
                    {
                        // Full buffer - ignore the event
                        warn!("MIDI buffer full, event ignored");
                    }
                },
                (),
            )
            .map_err(|e| MidiInputError::Connect(e.to_string()))?;

        info!("Connected to MIDI port: {}", port_name);

        Ok(Self {
            port_name: Some(port_name),
            _connection: Some(connection),
        })
    }

    pub fn disconnected() -> Self {
        Self {
            port_name: None,
            _connection: None,
        }
    }

    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.port_name.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringbuf::traits::Consumer;

    #[test]
    fn test_midi_channel_fifo() {
        let (mut tx, mut rx) = create_midi_channel(2);
        assert!(tx.try_push(MidiEvent::NoteOn { note: 60, velocity: 90 }).is_ok());
        assert!(tx.try_push(MidiEvent::NoteOff { note: 60 }).is_ok());
        // Full
        assert!(tx.try_push(MidiEvent::NoteOff { note: 61 }).is_err());

        assert_eq!(rx.try_pop(), Some(MidiEvent::NoteOn { note: 60, velocity: 90 }));
        assert_eq!(rx.try_pop(), Some(MidiEvent::NoteOff { note: 60 }));
        assert_eq!(rx.try_pop(), None);
    }

    #[test]
    fn test_disconnected_input() {
        let input = MidiInput::disconnected();
        assert!(!input.is_connected());
        assert_eq!(input.port_name(), None);
    }
}
