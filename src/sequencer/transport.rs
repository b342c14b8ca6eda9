// Transport - Global play/pause flag and tempo
// Changes are queued as events; the owner drains them and notifies listeners

use super::timeline::Tempo;
use log::info;

/// Transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl TransportState {
    pub fn is_playing(&self) -> bool {
        matches!(self, TransportState::Playing)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, TransportState::Stopped | TransportState::Paused)
    }
}

/// Notification emitted for every change of the play flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    Started,
    Paused,
}

impl TransportEvent {
    pub fn is_playing(&self) -> bool {
        matches!(self, TransportEvent::Started)
    }
}

/// Receives play flag changes
pub trait TransportListener {
    fn transport_changed(&mut self, playing: bool);
}

/// Transport controller
pub struct Transport {
    state: TransportState,
    tempo: Tempo,
    pending: Vec<TransportEvent>,
}

impl Transport {
    pub fn new(tempo: Tempo) -> Self {
        Self {
            state: TransportState::Stopped,
            tempo,
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Play. Returns false if already playing.
    pub fn play(&mut self) -> bool {
        if self.state.is_playing() {
            return false;
        }
        self.state = TransportState::Playing;
        self.pending.push(TransportEvent::Started);
        info!("Transport: play");
        true
    }

    /// Pause. Returns false if not playing.
    pub fn pause(&mut self) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        self.state = TransportState::Paused;
        self.pending.push(TransportEvent::Paused);
        info!("Transport: pause");
        true
    }

    /// Toggle play/pause
    pub fn toggle_play(&mut self) {
        if self.state.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Restart playback from the top: pause (if playing) then play
    pub fn replay(&mut self) {
        self.pause();
        self.play();
    }

    pub fn tempo(&self) -> &Tempo {
        &self.tempo
    }

    pub fn set_tempo(&mut self, tempo: Tempo) {
        self.tempo = tempo;
    }

    /// Take the queued notifications, oldest first
    pub fn drain_events(&mut self) -> Vec<TransportEvent> {
        std::mem::take(&mut self.pending)
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(Tempo::default())
    }
}
