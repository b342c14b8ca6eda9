// Moteur audio - Callback CPAL temps-réel
//
// The output callback drains the command ring buffer, renders the tone voice
// pool, the drum kit and the recording clip, applies the smoothed master volume and converts to
// the device sample format (F32, I16 or U16).
//
// Note: sur macOS (CoreAudio) le Stream n'est pas Send; the engine therefore
// lives on the UI thread for the lifetime of the app.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use log::info;
use ringbuf::traits::Consumer;
use std::sync::{Arc, Mutex};

use crate::audio::clip::ClipPlayer;
use crate::audio::dsp::{OnePoleSmoother, flush_denormals_to_zero, soft_clip};
use crate::audio::error::AudioError;
use crate::audio::parameters::AtomicF32;
use crate::messaging::channels::CommandConsumer;
use crate::messaging::command::{Command, Trigger};
use crate::messaging::notification::{NotificationCategory, Notifier};
use crate::midi::event::MidiEvent;
use crate::sequencer::layout::Instrument;
use crate::synth::drum::DrumKit;
use crate::synth::voice_manager::VoiceManager;

/// Everything the output callback renders, independent of any device
pub struct Renderer {
    voices: VoiceManager,
    drums: DrumKit,
    clip: ClipPlayer,
    volume: AtomicF32,
    smoother: OnePoleSmoother,
}

impl Renderer {
    pub fn new(sample_rate: f32, volume: AtomicF32) -> Self {
        let initial = volume.get();
        Self {
            voices: VoiceManager::new(sample_rate),
            drums: DrumKit::new(sample_rate),
            clip: ClipPlayer::new(sample_rate),
            volume,
            // 10ms de smoothing pour éviter les clics
            smoother: OnePoleSmoother::new(initial, 10.0, sample_rate),
        }
    }

    pub fn process_command(&mut self, command: Command) {
        match command {
            Command::Trigger(Trigger {
                instrument,
                note,
                velocity,
                duration,
            }) => match instrument {
                Instrument::Tone => self.voices.trigger(note, velocity, duration),
                Instrument::Drum(kind) => self.drums.trigger(kind, velocity, duration),
            },
            Command::Midi(MidiEvent::NoteOn { note, velocity }) => {
                self.voices.note_on(note, velocity)
            }
            Command::Midi(MidiEvent::NoteOff { note }) => self.voices.note_off(note),
            Command::SetVolume(volume) => self.volume.set(volume.clamp(0.0, 1.0)),
            Command::AllNotesOff => {
                self.voices.all_notes_off();
                self.drums.all_notes_off();
            }
            Command::PlayClip(clip) => self.clip.play(clip),
            Command::StopClip => self.clip.stop(),
        }
    }

    /// One mono sample, volume applied and soft-clipped
    pub fn next_sample(&mut self) -> f32 {
        let volume = self.smoother.process(self.volume.get());
        let mix = flush_denormals_to_zero(
            self.voices.next_sample() + self.drums.next_sample() + self.clip.next_sample(),
        );
        soft_clip(mix * volume)
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.active_voice_count()
            + self.drums.active_voice_count()
            + usize::from(self.clip.is_active())
    }
}

pub struct AudioEngine {
    _device: Device,
    _stream: Stream,
    sample_rate: f32,
    pub volume: AtomicF32,
}

impl AudioEngine {
    pub fn new(
        command_rx: CommandConsumer,
        notifier: Notifier,
        initial_volume: f32,
    ) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        info!(
            "Audio output device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        info!("Audio output config: {:?}", supported_config);

        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        let volume = AtomicF32::new(initial_volume.clamp(0.0, 1.0));
        let renderer = Arc::new(Mutex::new(Renderer::new(sample_rate, volume.clone())));
        let command_rx = Arc::new(Mutex::new(command_rx));

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &config,
                channels,
                command_rx,
                renderer,
                notifier.clone(),
            ),
            SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &config,
                channels,
                command_rx,
                renderer,
                notifier.clone(),
            ),
            SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &config,
                channels,
                command_rx,
                renderer,
                notifier.clone(),
            ),
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        }?;

        stream.play()?;

        notifier.info(
            NotificationCategory::Audio,
            format!("Audio connected: {} Hz, {} channels", sample_rate, channels),
        );

        Ok(Self {
            _device: device,
            _stream: stream,
            sample_rate,
            volume,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        command_rx: Arc<Mutex<CommandConsumer>>,
        renderer: Arc<Mutex<Renderer>>,
        notifier: Notifier,
    ) -> Result<Stream, AudioError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // No allocations, No I/O, No blocking locks
                let Ok(mut renderer) = renderer.try_lock() else {
                    for sample in data.iter_mut() {
                        *sample = Sample::from_sample::<f32>(0.0);
                    }
                    return;
                };

                if let Ok(mut rx) = command_rx.try_lock() {
                    while let Some(command) = rx.try_pop() {
                        renderer.process_command(command);
                    }
                }

                for frame in data.chunks_mut(channels) {
                    let sample = renderer.next_sample();
                    // mono → all channels
                    for out in frame.iter_mut() {
                        *out = T::from_sample(sample);
                    }
                }
            },
            move |err| {
                // Outside the real-time callback: I/O allowed
                notifier.error(
                    NotificationCategory::Audio,
                    format!("Audio stream error: {}", err),
                );
            },
            None,
        )?;

        Ok(stream)
    }
}
