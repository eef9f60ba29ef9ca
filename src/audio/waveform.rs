//! Live waveform geometry
//!
//! Turns one buffer of analyser time-domain samples (unsigned bytes centred on
//! 128) into the bars drawn on the recording canvas. Pure math so it can be
//! tested and benchmarked off the browser.

pub const BAR_WIDTH: f64 = 3.0;
pub const BAR_GAP: f64 = 1.0;
pub const MIN_BAR_HEIGHT: f64 = 4.0;

/// Normalised amplitude above which the frame counts as active audio
pub const ACTIVITY_THRESHOLD: f64 = 0.01;

/// Background painted behind every live frame
pub const FRAME_BACKGROUND: &str = "#ffffff";

/// Fill left on the canvas once recording stops
pub const IDLE_BACKGROUND: &str = "#f8fafc";

/// Vertical gradient for each bar, top to bottom
pub const GRADIENT_STOPS: [(f64, &str); 3] = [(0.0, "#3B82F6"), (0.5, "#1D4ED8"), (1.0, "#1E40AF")];

const SILENCE: u8 = 128;
const CURVE: f64 = 0.7;
const GAIN: f64 = 2.5;
const HEADROOM: f64 = 0.8;

/// One rectangle on the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Everything needed to paint one animation frame
#[derive(Debug, Clone, PartialEq)]
pub struct WaveFrame {
    pub bars: Vec<Bar>,
    pub has_audio: bool,
}

/// How many bars fit across the canvas
pub fn bar_count(canvas_width: f64) -> usize {
    if canvas_width <= 0.0 {
        return 0;
    }
    (canvas_width / (BAR_WIDTH + BAR_GAP)).floor() as usize
}

/// Height of a bar for one sample, before smoothing
pub fn bar_height(sample: u8, canvas_height: f64) -> f64 {
    let level = normalise(sample);
    let amplified = level.powf(CURVE) * GAIN;
    (amplified * canvas_height * HEADROOM).max(MIN_BAR_HEIGHT)
}

fn normalise(sample: u8) -> f64 {
    (f64::from(sample) - f64::from(SILENCE)).abs() / f64::from(SILENCE)
}

/// 3-tap moving average; edge bars average with their one neighbour
pub fn smooth(heights: &[f64]) -> Vec<f64> {
    let last = heights.len().saturating_sub(1);
    heights
        .iter()
        .enumerate()
        .map(|(i, &h)| {
            let mut sum = h;
            let mut count = 1.0;
            if i > 0 {
                sum += heights[i - 1];
                count += 1.0;
            }
            if i < last {
                sum += heights[i + 1];
                count += 1.0;
            }
            sum / count
        })
        .collect()
}

/// Compute the bars for one frame of samples
pub fn compute_frame(samples: &[u8], canvas_width: f64, canvas_height: f64) -> WaveFrame {
    let total_bars = bar_count(canvas_width);
    if total_bars == 0 || samples.is_empty() {
        return WaveFrame {
            bars: Vec::new(),
            has_audio: false,
        };
    }

    let step = samples.len() / total_bars;
    let mut has_audio = false;
    let raw: Vec<f64> = (0..total_bars)
        .map(|i| {
            let sample = samples.get(i * step).copied().unwrap_or(SILENCE);
            if normalise(sample) > ACTIVITY_THRESHOLD {
                has_audio = true;
            }
            bar_height(sample, canvas_height)
        })
        .collect();

    let bars = smooth(&raw)
        .into_iter()
        .enumerate()
        .map(|(i, height)| Bar {
            x: i as f64 * (BAR_WIDTH + BAR_GAP),
            y: (canvas_height - height) / 2.0,
            width: BAR_WIDTH,
            height,
        })
        .collect();

    WaveFrame { bars, has_audio }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_count() {
        assert_eq!(bar_count(400.0), 100);
        assert_eq!(bar_count(403.0), 100);
        assert_eq!(bar_count(3.0), 0);
        assert_eq!(bar_count(0.0), 0);
    }

    #[test]
    fn test_silence_draws_minimum_bars() {
        let samples = vec![128u8; 1024];
        let frame = compute_frame(&samples, 400.0, 80.0);

        assert_eq!(frame.bars.len(), 100);
        assert!(!frame.has_audio);
        for bar in &frame.bars {
            assert_eq!(bar.height, MIN_BAR_HEIGHT);
            assert_eq!(bar.y, 38.0);
            assert_eq!(bar.width, BAR_WIDTH);
        }
        assert_eq!(frame.bars[1].x, 4.0);
        assert_eq!(frame.bars[99].x, 396.0);
    }

    #[test]
    fn test_full_scale_sample_height() {
        // |0 - 128| / 128 = 1.0 -> 1.0 * 2.5 * 100 * 0.8
        assert!((bar_height(0, 100.0) - 200.0).abs() < 1e-9);
        // Quiet input on a short canvas is clamped
        assert_eq!(bar_height(129, 10.0), MIN_BAR_HEIGHT);
    }

    #[test]
    fn test_activity_detection() {
        let mut samples = vec![128u8; 8];
        samples[4] = 140;
        let frame = compute_frame(&samples, 8.0, 50.0);
        // Two bars, step 4: samples[0] and samples[4]
        assert_eq!(frame.bars.len(), 2);
        assert!(frame.has_audio);
    }

    #[test]
    fn test_smoothing_averages_available_neighbours() {
        let smoothed = smooth(&[4.0, 10.0, 16.0, 4.0]);
        assert_eq!(smoothed, vec![7.0, 10.0, 10.0, 10.0]);

        assert_eq!(smooth(&[9.0]), vec![9.0]);
        assert!(smooth(&[]).is_empty());
    }

    #[test]
    fn test_bars_are_centred() {
        let samples = vec![0u8; 16];
        let frame = compute_frame(&samples, 16.0, 10.0);
        for bar in frame.bars {
            assert!((bar.y + bar.height / 2.0 - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_canvas_or_buffer() {
        assert!(compute_frame(&[128; 64], 2.0, 50.0).bars.is_empty());
        assert!(compute_frame(&[], 400.0, 50.0).bars.is_empty());
    }
}
