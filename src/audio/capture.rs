// Audio capture - default input device into a lock-free ring buffer
//
// The cpal input callback converts every sample to f32 and pushes it into a
// ring buffer. The UI thread drains it into a `CaptureBuffer` while
// recording; stopping drops the stream and encodes the buffer to WAV.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use log::info;
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::audio::decode::{SampleBuffer, encode_wav};
use crate::audio::error::AudioError;
use crate::messaging::notification::{NotificationCategory, Notifier};

/// Seconds of audio the ring buffer holds between two drains
const RING_SECONDS: usize = 2;

/// Interleaved samples accumulated during one recording
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureBuffer {
    sample_rate: u32,
    channels: u16,
    samples: Vec<f32>,
}

impl CaptureBuffer {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels: channels.max(1),
            samples: Vec::new(),
        }
    }

    pub fn push_chunk(&mut self, chunk: &[f32]) {
        self.samples.extend_from_slice(chunk);
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn to_sample_buffer(&self) -> SampleBuffer {
        SampleBuffer::from_interleaved(self.sample_rate, self.channels as usize, &self.samples)
    }

    /// Encode the recording to a WAV blob
    pub fn finalize(self) -> Result<Vec<u8>, AudioError> {
        if self.is_empty() {
            return Err(AudioError::EmptyRecording);
        }
        encode_wav(&self.to_sample_buffer())
    }
}

/// Running capture stream; dropping it stops the device
pub struct CaptureStream {
    _device: Device,
    _stream: Stream,
    rx: HeapCons<f32>,
    sample_rate: u32,
    channels: u16,
    overflow: Arc<AtomicUsize>,
}

impl CaptureStream {
    /// Open the default input device and start capturing
    pub fn start(notifier: Notifier) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(AudioError::NoInputDevice)?;
        info!(
            "Audio input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device.default_input_config()?;
        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0;
        let channels = supported_config.channels();
        let config: StreamConfig = supported_config.into();

        let capacity = sample_rate as usize * channels as usize * RING_SECONDS;
        let (tx, rx) = HeapRb::<f32>::new(capacity.max(1024)).split();
        let overflow = Arc::new(AtomicUsize::new(0));

        let stream = match sample_format {
            SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config, tx, Arc::clone(&overflow), notifier)
            }
            SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config, tx, Arc::clone(&overflow), notifier)
            }
            SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config, tx, Arc::clone(&overflow), notifier)
            }
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        }?;
        stream.play()?;

        info!("Capture started: {} Hz, {} channel(s)", sample_rate, channels);

        Ok(Self {
            _device: device,
            _stream: stream,
            rx,
            sample_rate,
            channels,
            overflow,
        })
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        mut tx: HeapProd<f32>,
        overflow: Arc<AtomicUsize>,
        notifier: Notifier,
    ) -> Result<Stream, AudioError>
    where
        T: SizedSample + Send + 'static,
        f32: FromSample<T>,
    {
        let stream = device.build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                for &sample in data {
                    if tx.try_push(sample.to_sample::<f32>()).is_err() {
                        overflow.fetch_add(1, Ordering::Relaxed);
                    }
                }
            },
            move |err| {
                notifier.error(
                    NotificationCategory::Audio,
                    format!("Audio capture error: {}", err),
                );
            },
            None,
        )?;
        Ok(stream)
    }

    pub fn new_buffer(&self) -> CaptureBuffer {
        CaptureBuffer::new(self.sample_rate, self.channels)
    }

    /// Move every pending sample into `buffer`. Returns the number moved.
    pub fn drain_into(&mut self, buffer: &mut CaptureBuffer) -> usize {
        let mut moved = 0;
        let mut chunk = [0.0f32; 1024];
        loop {
            let n = self.rx.pop_slice(&mut chunk);
            if n == 0 {
                break;
            }
            buffer.push_chunk(&chunk[..n]);
            moved += n;
        }
        moved
    }

    /// Samples dropped because the UI did not drain in time
    pub fn overflowed(&self) -> usize {
        self.overflow.load(Ordering::Relaxed)
    }
}
