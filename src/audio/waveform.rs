// Waveform sampling - one (min, max) bar per pixel column

/// One pixel column of the waveform view, in pixels from the top
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformBar {
    pub x: usize,
    pub top: f32,
    pub height: f32,
}

/// Downsample `samples` into `width` bars for a view `height` pixels tall.
///
/// Each column covers `ceil(len / width)` samples. Columns past the end of the
/// buffer get a 1 px bar on the midline.
pub fn waveform_bars(samples: &[f32], width: usize, height: f32) -> Vec<WaveformBar> {
    if samples.is_empty() || width == 0 {
        return Vec::new();
    }

    let step = samples.len().div_ceil(width);
    let amp = height / 2.0;

    (0..width)
        .map(|x| {
            let start = (x * step).min(samples.len());
            let end = (start + step).min(samples.len());
            let window = &samples[start..end];

            if window.is_empty() {
                return WaveformBar {
                    x,
                    top: amp,
                    height: 1.0,
                };
            }

            let (min, max) = window.iter().fold((1.0f32, -1.0f32), |(min, max), s| {
                let s = s.clamp(-1.0, 1.0);
                (min.min(s), max.max(s))
            });

            WaveformBar {
                x,
                top: (1.0 + min) * amp,
                height: ((max - min) * amp).max(1.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs() {
        assert!(waveform_bars(&[], 100, 50.0).is_empty());
        assert!(waveform_bars(&[0.5], 0, 50.0).is_empty());
    }

    #[test]
    fn test_full_scale_bar() {
        let bars = waveform_bars(&[-1.0, 1.0], 1, 100.0);
        assert_eq!(
            bars,
            vec![WaveformBar {
                x: 0,
                top: 0.0,
                height: 100.0
            }]
        );
    }

    #[test]
    fn test_window_size_is_ceiling() {
        // 5 samples over 2 columns: windows of 3 then 2
        let samples = [0.0, 0.0, 1.0, -0.5, -0.5];
        let bars = waveform_bars(&samples, 2, 100.0);
        assert_eq!(bars.len(), 2);

        assert_eq!(bars[0].top, 50.0);
        assert_eq!(bars[0].height, 50.0);
        assert_eq!(bars[1].top, 25.0);
        // Flat window is clamped to 1 px
        assert_eq!(bars[1].height, 1.0);
    }

    #[test]
    fn test_columns_past_the_end() {
        // 3 samples over 5 columns: step 1, columns 3 and 4 are empty
        let bars = waveform_bars(&[0.2, 0.4, 0.6], 5, 10.0);
        assert_eq!(bars.len(), 5);
        assert_eq!(bars[3].top, 5.0);
        assert_eq!(bars[3].height, 1.0);
        assert_eq!(bars[4].x, 4);
    }

    #[test]
    fn test_out_of_range_samples_are_clamped() {
        let bars = waveform_bars(&[-3.0, 3.0], 1, 20.0);
        assert_eq!(bars[0].top, 0.0);
        assert_eq!(bars[0].height, 20.0);
    }

    #[test]
    fn test_pure() {
        let samples: Vec<f32> = (0..1000).map(|i| ((i as f32) * 0.37).sin()).collect();
        assert_eq!(
            waveform_bars(&samples, 64, 80.0),
            waveform_bars(&samples, 64, 80.0)
        );
    }
}
