// Recording blobs - WAV encoding and decoding of arbitrary audio files
//
// Recordings are stored as 16-bit PCM WAV. Imported files go through hound
// when they are RIFF/WAVE and through symphonia otherwise (mp3, flac, ogg,
// m4a).

use crate::audio::error::AudioError;
use hound::{SampleFormat as WavSampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer as DecodedSamples;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decoded audio, one `Vec<f32>` per channel
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleBuffer {
    pub sample_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

impl SampleBuffer {
    pub fn from_interleaved(sample_rate: u32, channel_count: usize, samples: &[f32]) -> Self {
        let channel_count = channel_count.max(1);
        let mut channels = vec![Vec::with_capacity(samples.len() / channel_count); channel_count];
        for frame in samples.chunks(channel_count) {
            for (channel, sample) in channels.iter_mut().zip(frame) {
                channel.push(*sample);
            }
        }
        Self {
            sample_rate,
            channels,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
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

    /// Channel drawn by the waveform view
    pub fn first_channel(&self) -> &[f32] {
        self.channels.first().map(Vec::as_slice).unwrap_or(&[])
    }

    fn interleaved(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.frames()).flat_map(move |i| self.channels.iter().map(move |c| c[i]))
    }
}

/// Encode to a 16-bit PCM WAV blob
pub fn encode_wav(buffer: &SampleBuffer) -> Result<Vec<u8>, AudioError> {
    let spec = WavSpec {
        channels: buffer.channel_count().max(1) as u16,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: WavSampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for sample in buffer.interleaved() {
            writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

/// Decode a blob; `extension` is a hint for non-WAV containers
pub fn decode_blob(bytes: &[u8], extension: Option<&str>) -> Result<SampleBuffer, AudioError> {
    let buffer = if is_wav(bytes) {
        decode_wav(bytes)?
    } else {
        decode_with_symphonia(bytes, extension)?
    };
    debug!(
        "Decoded {} frames, {} channel(s) at {} Hz",
        buffer.frames(),
        buffer.channel_count(),
        buffer.sample_rate
    );
    Ok(buffer)
}

fn decode_wav(bytes: &[u8]) -> Result<SampleBuffer, AudioError> {
    let reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        WavSampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
        WavSampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok(SampleBuffer::from_interleaved(
        spec.sample_rate,
        spec.channels as usize,
        &samples,
    ))
}

fn decode_with_symphonia(bytes: &[u8], extension: Option<&str>) -> Result<SampleBuffer, AudioError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(AudioError::NoAudioTrack)?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channel_count = track.codec_params.channels.map_or(0, |c| c.count());

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            // End of stream
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(e.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Corrupt packet: skip it
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        channel_count = spec.channels.count();

        let mut buf = DecodedSamples::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buf.samples());
    }

    Ok(SampleBuffer::from_interleaved(
        sample_rate,
        channel_count,
        &samples,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frames: usize, sample_rate: u32) -> Vec<f32> {
        (0..frames)
            .map(|i| (i as f32 * 440.0 * 2.0 * std::f32::consts::PI / sample_rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_from_interleaved() {
        let buffer = SampleBuffer::from_interleaved(8000, 2, &[0.1, -0.1, 0.2, -0.2, 0.3, -0.3]);
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.frames(), 3);
        assert_eq!(buffer.first_channel(), &[0.1, 0.2, 0.3]);
        assert_eq!(buffer.channels[1], vec![-0.1, -0.2, -0.3]);
    }

    #[test]
    fn test_wav_roundtrip() {
        let original = SampleBuffer {
            sample_rate: 44100,
            channels: vec![sine(4410, 44100)],
        };
        let blob = encode_wav(&original).unwrap();
        assert!(is_wav(&blob));

        let decoded = decode_blob(&blob, Some("wav")).unwrap();
        assert_eq!(decoded.sample_rate, 44100);
        assert_eq!(decoded.frames(), 4410);
        assert!((decoded.duration_seconds() - 0.1).abs() < 1e-9);
        for (a, b) in original.first_channel().iter().zip(decoded.first_channel()) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn test_encode_clamps() {
        let buffer = SampleBuffer {
            sample_rate: 8000,
            channels: vec![vec![2.0, -2.0]],
        };
        let decoded = decode_blob(&encode_wav(&buffer).unwrap(), None).unwrap();
        assert!((decoded.first_channel()[0] - 1.0).abs() < 1e-3);
        assert!((decoded.first_channel()[1] + 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_float_wav_decodes() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 32,
            sample_format: WavSampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            writer.write_sample(0.25f32).unwrap();
            writer.write_sample(-0.75f32).unwrap();
            writer.finalize().unwrap();
        }
        let decoded = decode_blob(&cursor.into_inner(), None).unwrap();
        assert_eq!(decoded.first_channel(), &[0.25, -0.75]);
    }

    #[test]
    fn test_garbage_fails() {
        assert!(decode_blob(b"definitely not audio", Some("mp3")).is_err());
    }
}
