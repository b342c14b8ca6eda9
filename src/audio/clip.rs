// Clip playback - plays a decoded recording through the output engine
//
// The UI thread builds an `AudioClip` (mono mixdown) and hands it to the
// audio thread behind an Arc. `ClipPlayer` reads it with linear
// interpolation at the device rate and clears the clip's playing flag when it
// runs out.

use crate::audio::decode::SampleBuffer;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct AudioClip {
    samples: Vec<f32>,
    sample_rate: u32,
    playing: AtomicBool,
}

impl AudioClip {
    /// Mono mixdown of every channel
    pub fn from_buffer(buffer: &SampleBuffer) -> Self {
        let channels = buffer.channel_count().max(1) as f32;
        let samples = (0..buffer.frames())
            .map(|i| buffer.channels.iter().map(|c| c[i]).sum::<f32>() / channels)
            .collect();
        Self {
            samples,
            sample_rate: buffer.sample_rate,
            playing: AtomicBool::new(false),
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// True from the play command until the last sample or a stop
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    pub fn mark_playing(&self) {
        self.playing.store(true, Ordering::Release);
    }

    pub fn mark_stopped(&self) {
        self.playing.store(false, Ordering::Release);
    }
}

impl fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioClip")
            .field("frames", &self.samples.len())
            .field("sample_rate", &self.sample_rate)
            .field("playing", &self.is_playing())
            .finish()
    }
}

impl PartialEq for AudioClip {
    fn eq(&self, other: &Self) -> bool {
        self.sample_rate == other.sample_rate && self.samples == other.samples
    }
}

/// Audio-thread side: at most one clip at a time
pub struct ClipPlayer {
    output_rate: f32,
    clip: Option<Arc<AudioClip>>,
    /// Fractional read position, in clip samples
    position: f64,
}

impl ClipPlayer {
    pub fn new(output_rate: f32) -> Self {
        Self {
            output_rate,
            clip: None,
            position: 0.0,
        }
    }

    /// Start `clip` from the beginning, replacing the current one
    pub fn play(&mut self, clip: Arc<AudioClip>) {
        self.stop();
        clip.mark_playing();
        self.clip = Some(clip);
        self.position = 0.0;
    }

    pub fn stop(&mut self) {
        if let Some(clip) = self.clip.take() {
            clip.mark_stopped();
        }
    }

    pub fn is_active(&self) -> bool {
        self.clip.is_some()
    }

    pub fn next_sample(&mut self) -> f32 {
        let Some(clip) = self.clip.as_ref() else {
            return 0.0;
        };

        let samples = clip.samples();
        let index = self.position as usize;
        if index >= samples.len() || self.output_rate <= 0.0 {
            self.stop();
            return 0.0;
        }

        let frac = (self.position - index as f64) as f32;
        let current = samples[index];
        let next = samples.get(index + 1).copied().unwrap_or(current);
        self.position += clip.sample_rate() as f64 / self.output_rate as f64;

        current + (next - current) * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(samples: Vec<f32>, sample_rate: u32) -> Arc<AudioClip> {
        Arc::new(AudioClip::from_buffer(&SampleBuffer {
            sample_rate,
            channels: vec![samples],
        }))
    }

    #[test]
    fn test_mixdown_averages_channels() {
        let buffer = SampleBuffer::from_interleaved(8000, 2, &[1.0, 0.0, 0.5, 0.5]);
        let clip = AudioClip::from_buffer(&buffer);
        assert_eq!(clip.samples(), &[0.5, 0.5]);
    }

    #[test]
    fn test_plays_then_clears_flag() {
        let clip = clip(vec![0.1, 0.2, 0.3], 100);
        let mut player = ClipPlayer::new(100.0);
        player.play(Arc::clone(&clip));
        assert!(clip.is_playing());

        let out: Vec<f32> = (0..3).map(|_| player.next_sample()).collect();
        assert_eq!(out, vec![0.1, 0.2, 0.3]);

        assert_eq!(player.next_sample(), 0.0);
        assert!(!player.is_active());
        assert!(!clip.is_playing());
    }

    #[test]
    fn test_upsamples_with_interpolation() {
        // Clip at half the device rate: every other sample is interpolated
        let clip = clip(vec![0.0, 1.0], 50);
        let mut player = ClipPlayer::new(100.0);
        player.play(clip);

        assert_eq!(player.next_sample(), 0.0);
        assert!((player.next_sample() - 0.5).abs() < 1e-6);
        assert_eq!(player.next_sample(), 1.0);
    }

    #[test]
    fn test_replacing_a_clip_stops_the_old_one() {
        let first = clip(vec![0.5; 10], 100);
        let second = clip(vec![0.25; 10], 100);
        let mut player = ClipPlayer::new(100.0);

        player.play(Arc::clone(&first));
        player.play(Arc::clone(&second));
        assert!(!first.is_playing());
        assert!(second.is_playing());
        assert_eq!(player.next_sample(), 0.25);

        player.stop();
        assert!(!second.is_playing());
    }
}
