// Timeline - Musical time representation
// Conversions between steps, quarter notes (beats), MIDI ticks and seconds

use std::fmt;

/// Number of equal steps in one bar of a step grid (sixteenth notes in 4/4)
pub const STEPS_PER_BAR: usize = 16;

/// Duration of one grid step in quarter notes (a sixteenth note)
pub const STEP_BEATS: f64 = 0.25;

/// Duration given to every note exported from a grid, in quarter notes
pub const GRID_NOTE_DURATION: f64 = 0.2;

/// Ticks per quarter note (PPQN) used when writing MIDI files
pub const TICKS_PER_QUARTER: u16 = 480;

/// Lowest and highest accepted tempo
pub const MIN_BPM: f64 = 20.0;
pub const MAX_BPM: f64 = 999.0;

/// Note subdivisions used as trigger lengths ("8n", "16n")
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subdivision {
    Quarter,
    Eighth,
    Sixteenth,
}

impl Subdivision {
    /// Length in quarter notes
    pub fn beats(&self) -> f64 {
        match self {
            Subdivision::Quarter => 1.0,
            Subdivision::Eighth => 0.5,
            Subdivision::Sixteenth => 0.25,
        }
    }
}

/// Tempo in BPM (quarter notes per minute)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    /// Creates a new tempo
    /// BPM must be in range [20.0, 999.0]
    pub fn new(bpm: f64) -> Self {
        assert!(
            (MIN_BPM..=MAX_BPM).contains(&bpm),
            "BPM must be between 20 and 999"
        );
        Self { bpm }
    }

    /// Non-panicking constructor for values coming from files or the user
    pub fn try_new(bpm: f64) -> Option<Self> {
        (MIN_BPM..=MAX_BPM).contains(&bpm).then_some(Self { bpm })
    }

    /// Get BPM value
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Duration of one quarter note in seconds
    pub fn beat_duration_seconds(&self) -> f64 {
        60.0 / self.bpm
    }

    pub fn beats_to_seconds(&self, beats: f64) -> f64 {
        beats * self.beat_duration_seconds()
    }

    pub fn seconds_to_beats(&self, seconds: f64) -> f64 {
        seconds / self.beat_duration_seconds()
    }

    /// Length of a subdivision in seconds at this tempo
    pub fn subdivision_seconds(&self, subdivision: Subdivision) -> f64 {
        self.beats_to_seconds(subdivision.beats())
    }

    /// MIDI tempo meta value (microseconds per quarter note)
    pub fn micros_per_quarter(&self) -> u32 {
        (60_000_000.0 / self.bpm).round() as u32
    }

    /// Tempo from a MIDI tempo meta value
    pub fn from_micros_per_quarter(micros: u32) -> Option<Self> {
        if micros == 0 {
            return None;
        }
        Self::try_new(60_000_000.0 / micros as f64)
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::new(120.0)
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} BPM", self.bpm)
    }
}

/// Start of a step in quarter notes
pub fn step_to_beats(step: usize) -> f64 {
    step as f64 * STEP_BEATS
}

/// Nearest step for a time in quarter notes. May be negative or past the grid.
pub fn beats_to_step(beats: f64, step_beats: f64) -> i64 {
    (beats / step_beats).round() as i64
}

/// Quarter notes to MIDI ticks at [`TICKS_PER_QUARTER`]
pub fn beats_to_ticks(beats: f64) -> u32 {
    (beats.max(0.0) * TICKS_PER_QUARTER as f64).round() as u32
}

/// MIDI ticks to quarter notes for a given file resolution
pub fn ticks_to_beats(ticks: u64, ticks_per_quarter: u16) -> f64 {
    if ticks_per_quarter == 0 {
        return 0.0;
    }
    ticks as f64 / ticks_per_quarter as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tempo() {
        let tempo = Tempo::new(120.0);
        assert_eq!(tempo.bpm(), 120.0);
        assert_eq!(tempo.beat_duration_seconds(), 0.5);
        assert_eq!(tempo.beats_to_seconds(4.0), 2.0);
        assert_eq!(tempo.seconds_to_beats(0.5), 1.0);
        assert_eq!(tempo.to_string(), "120.0 BPM");
    }

    #[test]
    fn test_tempo_bounds() {
        assert!(Tempo::try_new(19.9).is_none());
        assert!(Tempo::try_new(1000.0).is_none());
        assert!(Tempo::try_new(90.0).is_some());
    }

    #[test]
    #[should_panic(expected = "BPM must be between 20 and 999")]
    fn test_invalid_tempo() {
        Tempo::new(5.0);
    }

    #[test]
    fn test_micros_per_quarter() {
        let tempo = Tempo::new(120.0);
        assert_eq!(tempo.micros_per_quarter(), 500_000);
        assert_eq!(Tempo::from_micros_per_quarter(500_000), Some(tempo));
        assert_eq!(Tempo::from_micros_per_quarter(0), None);
    }

    #[test]
    fn test_subdivisions() {
        let tempo = Tempo::default();
        // At 120 BPM an eighth note lasts a quarter of a second
        assert_eq!(tempo.subdivision_seconds(Subdivision::Eighth), 0.25);
        assert_eq!(tempo.subdivision_seconds(Subdivision::Sixteenth), 0.125);
    }

    #[test]
    fn test_step_conversion() {
        assert_eq!(step_to_beats(0), 0.0);
        assert_eq!(step_to_beats(4), 1.0);
        assert_eq!(beats_to_step(1.0, STEP_BEATS), 4);
        // Rounds to the nearest step
        assert_eq!(beats_to_step(0.37, STEP_BEATS), 1);
        assert_eq!(beats_to_step(0.38, STEP_BEATS), 2);
        assert_eq!(beats_to_step(100.0, STEP_BEATS), 400);
        assert_eq!(beats_to_step(-0.25, STEP_BEATS), -1);
    }

    #[test]
    fn test_tick_conversion() {
        assert_eq!(beats_to_ticks(1.0), 480);
        assert_eq!(beats_to_ticks(0.25), 120);
        assert_eq!(beats_to_ticks(-1.0), 0);
        assert_eq!(ticks_to_beats(960, 480), 2.0);
        assert_eq!(ticks_to_beats(96, 96), 1.0);
        assert_eq!(ticks_to_beats(10, 0), 0.0);
    }
}
