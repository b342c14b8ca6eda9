// Note sinks - where panels send the notes they play
//
// Panels and scheduler callbacks only see `NoteSink`; the audio engine sits
// behind `CommandSink`, tests use `CollectingSink`.

use crate::messaging::channels::CommandProducer;
use crate::messaging::command::{Command, Trigger};
use crate::midi::event::MidiEvent;
use log::warn;
use ringbuf::traits::Producer;
use std::sync::{Arc, Mutex, PoisonError};

pub trait NoteSink: Send + Sync {
    fn send(&self, command: Command);

    fn trigger(&self, trigger: Trigger) {
        self.send(Command::Trigger(trigger));
    }

    fn note_on(&self, note: u8, velocity: u8) {
        self.send(Command::Midi(MidiEvent::NoteOn { note, velocity }));
    }

    fn note_off(&self, note: u8) {
        self.send(Command::Midi(MidiEvent::NoteOff { note }));
    }

    fn all_notes_off(&self) {
        self.send(Command::AllNotesOff);
    }
}

/// Forwards commands to the audio thread's ring buffer
#[derive(Clone)]
pub struct CommandSink {
    tx: Arc<Mutex<CommandProducer>>,
}

impl CommandSink {
    pub fn new(tx: CommandProducer) -> Self {
        Self {
            tx: Arc::new(Mutex::new(tx)),
        }
    }
}

impl NoteSink for CommandSink {
    fn send(&self, command: Command) {
        let mut tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(command) = tx.try_push(command) {
            warn!("Command buffer full, {:?} ignored", command);
        }
    }
}

/// Keeps every command in memory
#[derive(Clone, Default)]
pub struct CollectingSink {
    commands: Arc<Mutex<Vec<Command>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn triggers(&self) -> Vec<Trigger> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                Command::Trigger(trigger) => Some(trigger),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl NoteSink for CollectingSink {
    fn send(&self, command: Command) {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::channels::create_command_channel;
    use crate::sequencer::layout::Instrument;
    use ringbuf::traits::Consumer;

    #[test]
    fn test_command_sink_forwards() {
        let (tx, mut rx) = create_command_channel(8);
        let sink = CommandSink::new(tx);

        sink.note_on(60, 100);
        sink.note_off(60);
        sink.all_notes_off();

        assert_eq!(
            rx.try_pop(),
            Some(Command::Midi(MidiEvent::NoteOn {
                note: 60,
                velocity: 100
            }))
        );
        assert_eq!(rx.try_pop(), Some(Command::Midi(MidiEvent::NoteOff { note: 60 })));
        assert_eq!(rx.try_pop(), Some(Command::AllNotesOff));
    }

    #[test]
    fn test_command_sink_full_buffer_drops() {
        let (tx, mut rx) = create_command_channel(1);
        let sink = CommandSink::new(tx);
        sink.all_notes_off();
        sink.all_notes_off();

        assert!(rx.try_pop().is_some());
        assert!(rx.try_pop().is_none());
    }

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingSink::new();
        sink.trigger(Trigger::new(Instrument::Tone, 60, 0.25));
        sink.note_off(60);

        assert_eq!(sink.commands().len(), 2);
        assert_eq!(sink.triggers().len(), 1);

        sink.clear();
        assert!(sink.commands().is_empty());
    }
}
