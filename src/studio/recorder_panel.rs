// Audio recorder panel - microphone capture, WAV blob, waveform view and
// playback of the current take

use crate::audio::capture::{CaptureBuffer, CaptureStream};
use crate::audio::clip::AudioClip;
use crate::audio::decode::{SampleBuffer, decode_blob};
use crate::audio::error::AudioError;
use crate::audio::waveform::{WaveformBar, waveform_bars};
use crate::files::ExportTarget;
use crate::messaging::command::Command;
use crate::messaging::notification::{NotificationCategory, Notifier};
use crate::messaging::sink::NoteSink;
use log::{debug, info, warn};
use std::sync::Arc;

struct ActiveCapture {
    stream: CaptureStream,
    buffer: CaptureBuffer,
}

pub struct RecorderPanel {
    notifier: Notifier,
    sink: Arc<dyn NoteSink>,
    capture: Option<ActiveCapture>,
    blob: Option<Vec<u8>>,
    audio: Option<SampleBuffer>,
    clip: Option<Arc<AudioClip>>,
    bars: Vec<WaveformBar>,
    waveform_width: usize,
    waveform_height: f32,
}

impl RecorderPanel {
    pub fn new(
        notifier: Notifier,
        sink: Arc<dyn NoteSink>,
        waveform_width: usize,
        waveform_height: f32,
    ) -> Self {
        Self {
            notifier,
            sink,
            capture: None,
            blob: None,
            audio: None,
            clip: None,
            bars: Vec::new(),
            waveform_width,
            waveform_height,
        }
    }

    pub fn target(&self) -> ExportTarget {
        ExportTarget::Recording
    }

    pub fn is_recording(&self) -> bool {
        self.capture.is_some()
    }

    pub fn has_recording(&self) -> bool {
        self.blob.is_some()
    }

    /// Open the default input device and start accumulating samples.
    /// The previous take is discarded.
    pub fn start_recording(&mut self) -> Result<(), AudioError> {
        if self.is_recording() {
            return Ok(());
        }
        self.clear_recording();
        let stream = CaptureStream::start(self.notifier.clone())?;
        let buffer = stream.new_buffer();
        self.capture = Some(ActiveCapture { stream, buffer });
        info!("Recording started");
        Ok(())
    }

    fn clear_recording(&mut self) {
        self.stop_playback();
        self.blob = None;
        self.audio = None;
        self.clip = None;
        self.bars.clear();
    }

    /// Drain captured samples; call once per UI frame while recording
    pub fn poll(&mut self) -> usize {
        match self.capture.as_mut() {
            Some(active) => active.stream.drain_into(&mut active.buffer),
            None => 0,
        }
    }

    /// Seconds captured so far, or the length of the current recording
    pub fn duration_seconds(&self) -> f64 {
        match (&self.capture, &self.audio) {
            (Some(active), _) => active.buffer.duration_seconds(),
            (None, Some(audio)) => audio.duration_seconds(),
            (None, None) => 0.0,
        }
    }

    /// Stop the device, encode the take and replace the current recording
    pub fn stop_recording(&mut self) -> Result<(), AudioError> {
        let Some(mut active) = self.capture.take() else {
            return Ok(());
        };
        active.stream.drain_into(&mut active.buffer);
        let dropped = active.stream.overflowed();
        if dropped > 0 {
            warn!("{} samples dropped during recording", dropped);
        }
        // Stream dropped here: the device is released before encoding
        drop(active.stream);

        let audio = active.buffer.to_sample_buffer();
        let blob = active.buffer.finalize()?;
        info!("Recording stopped: {:.2}s", audio.duration_seconds());
        self.set_recording(blob, audio);
        Ok(())
    }

    fn set_recording(&mut self, blob: Vec<u8>, audio: SampleBuffer) {
        self.stop_playback();
        self.clip = Some(Arc::new(AudioClip::from_buffer(&audio)));
        self.blob = Some(blob);
        self.audio = Some(audio);
        self.refresh_waveform();
    }

    /// Play the current recording through the output engine
    pub fn play_recording(&mut self) -> Result<(), AudioError> {
        let clip = self.clip.as_ref().ok_or(AudioError::EmptyRecording)?;
        // Marked before sending so the UI shows the stop button right away
        clip.mark_playing();
        self.sink.send(Command::PlayClip(Arc::clone(clip)));
        debug!("Playing recording: {:.2}s", self.duration_seconds());
        Ok(())
    }

    pub fn stop_playback(&mut self) {
        if let Some(clip) = self.clip.as_ref()
            && clip.is_playing()
        {
            self.sink.send(Command::StopClip);
            clip.mark_stopped();
        }
    }

    /// True while the engine is playing the current recording
    pub fn is_playing(&self) -> bool {
        self.clip.as_ref().is_some_and(|clip| clip.is_playing())
    }

    /// Replace the recording with an audio file
    pub fn import_audio(&mut self, bytes: Vec<u8>, extension: Option<&str>) -> Result<(), AudioError> {
        let audio = decode_blob(&bytes, extension)?;
        if audio.is_empty() {
            return Err(AudioError::EmptyRecording);
        }
        self.set_recording(bytes, audio);
        Ok(())
    }

    /// Encoded bytes of the current recording
    pub fn export_blob(&self) -> Option<&[u8]> {
        self.blob.as_deref()
    }

    pub fn audio(&self) -> Option<&SampleBuffer> {
        self.audio.as_ref()
    }

    pub fn waveform(&self) -> &[WaveformBar] {
        &self.bars
    }

    pub fn set_waveform_size(&mut self, width: usize, height: f32) {
        if width == self.waveform_width && height == self.waveform_height {
            return;
        }
        self.waveform_width = width;
        self.waveform_height = height;
        self.refresh_waveform();
    }

    fn refresh_waveform(&mut self) {
        self.bars = match &self.audio {
            Some(audio) => waveform_bars(
                audio.first_channel(),
                self.waveform_width,
                self.waveform_height,
            ),
            None => Vec::new(),
        };
    }

    pub fn report(&self, error: &AudioError) {
        self.notifier
            .error(NotificationCategory::Audio, error.to_string());
    }
}
