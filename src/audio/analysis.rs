//! Spectral analysis: windowed FFT producing byte magnitude snapshots.
//!
//! The analyser mirrors the byte-spectrum convention of browser audio
//! analysers: magnitudes are smoothed exponentially across windows, mapped
//! through a dB range and quantized into 0..=255 per frequency bin.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::params::AnalyserConfig;

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}

/// Map a normalized magnitude to a byte via the configured dB range.
///
/// Magnitudes at or below `min_db` clamp to 0, at or above `max_db` to 255.
pub fn magnitude_to_byte(magnitude: f32, min_db: f32, max_db: f32) -> u8 {
    if magnitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = 255.0 * (db - min_db) / (max_db - min_db);
    scaled.round().clamp(0.0, 255.0) as u8
}

/// Stateful spectrum analyser for one analysis window size.
///
/// Holds the FFT plan, scratch buffers and the smoothed magnitude state
/// carried between windows.
pub struct SpectrumAnalyser {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl SpectrumAnalyser {
    pub fn new(config: AnalyserConfig) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let bins = config.bins();
        let scratch = Vec::with_capacity(config.fft_size);
        Self {
            config,
            fft,
            scratch,
            smoothed: vec![0.0; bins],
        }
    }

    /// Analyse one window of samples, writing byte magnitudes into `out`.
    ///
    /// `window` must hold exactly `fft_size` samples and `out` exactly
    /// `fft_size / 2` bins.
    pub fn process(&mut self, window: &[f32], out: &mut [u8]) {
        debug_assert_eq!(window.len(), self.config.fft_size);
        debug_assert_eq!(out.len(), self.config.bins());

        let size = self.config.fft_size;
        self.scratch.clear();
        self.scratch.extend(
            window
                .iter()
                .enumerate()
                .map(|(i, &s)| Complex::new(s * hann_window(i, size), 0.0)),
        );

        self.fft.process(&mut self.scratch);

        let tau = self.config.smoothing;
        for (i, byte) in out.iter_mut().enumerate() {
            let magnitude = self.scratch[i].norm() / size as f32;
            self.smoothed[i] = tau * self.smoothed[i] + (1.0 - tau) * magnitude;
            *byte = magnitude_to_byte(self.smoothed[i], self.config.min_db, self.config.max_db);
        }
    }
}

/// Spawn the spectral analysis thread.
///
/// Drains the tap buffer with 50% overlap, publishing each analysed window
/// into the shared snapshot. Sets `primed` after the first window and exits
/// when `running` is lowered.
pub fn spawn_analysis_thread(
    config: AnalyserConfig,
    tap_buffer: Arc<Mutex<Vec<f32>>>,
    spectrum: Arc<Mutex<Vec<u8>>>,
    primed: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let fft_size = config.fft_size;
        let interval = Duration::from_millis(config.update_interval_ms);
        let mut analyser = SpectrumAnalyser::new(config);
        let mut window = vec![0.0f32; fft_size];
        let mut snapshot = vec![0u8; fft_size / 2];

        while running.load(Ordering::Relaxed) {
            thread::sleep(interval);

            {
                let mut tap = tap_buffer.lock().unwrap();
                if tap.len() < fft_size {
                    continue;
                }

                // Analyse the freshest window, keep half of it for overlap
                // and drop everything older so the tap stays bounded
                let start = tap.len() - fft_size;
                window.copy_from_slice(&tap[start..]);
                tap.drain(..start + fft_size / 2);
            }

            analyser.process(&window, &mut snapshot);
            spectrum.lock().unwrap().copy_from_slice(&snapshot);
            primed.store(true, Ordering::Release);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_window() {
        let size = 512;

        // Hann window should be 0 at edges, 1 at center
        assert!((hann_window(0, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size - 1, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size / 2, size) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_magnitude_to_byte_bounds() {
        let (min_db, max_db) = (-90.0, -30.0);

        assert_eq!(magnitude_to_byte(0.0, min_db, max_db), 0);
        // At or below the floor
        assert_eq!(magnitude_to_byte(10f32.powf(min_db / 20.0), min_db, max_db), 0);
        // At or above the ceiling
        assert_eq!(magnitude_to_byte(10f32.powf(max_db / 20.0), min_db, max_db), 255);
        assert_eq!(magnitude_to_byte(1.0, min_db, max_db), 255);

        // Monotonic in between
        let mid_low = magnitude_to_byte(0.001, min_db, max_db);
        let mid_high = magnitude_to_byte(0.01, min_db, max_db);
        assert!(mid_low > 0 && mid_high > mid_low && mid_high < 255);
    }

    #[test]
    fn test_analyser_silence_yields_zero_spectrum() {
        let config = AnalyserConfig::default();
        let bins = config.bins();
        let mut analyser = SpectrumAnalyser::new(config.clone());

        let window = vec![0.0f32; config.fft_size];
        let mut out = vec![0u8; bins];
        analyser.process(&window, &mut out);

        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_analyser_sine_peaks_at_its_bin() {
        let config = AnalyserConfig {
            smoothing: 0.0, // no temporal smoothing: single window must register
            ..AnalyserConfig::default()
        };
        let fft_size = config.fft_size;
        let mut analyser = SpectrumAnalyser::new(config.clone());

        // Sine exactly on bin 32 (32 cycles per window)
        let target_bin = 32;
        let window: Vec<f32> = (0..fft_size)
            .map(|i| {
                (2.0 * PI * target_bin as f32 * i as f32 / fft_size as f32).sin() * 0.8
            })
            .collect();

        let mut out = vec![0u8; config.bins()];
        analyser.process(&window, &mut out);

        let peak_bin = out
            .iter()
            .enumerate()
            .max_by_key(|&(_, &b)| b)
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak_bin, target_bin);
        assert!(out[target_bin] > 200, "peak byte {} too low", out[target_bin]);

        // Energy stays local: far bins are quiet
        assert!(out[target_bin + 50] < 40);
    }

    #[test]
    fn test_smoothing_rises_gradually() {
        let config = AnalyserConfig::default(); // smoothing 0.8
        let fft_size = config.fft_size;
        let mut analyser = SpectrumAnalyser::new(config.clone());

        let window: Vec<f32> = (0..fft_size)
            .map(|i| (2.0 * PI * 16.0 * i as f32 / fft_size as f32).sin())
            .collect();

        let mut first = vec![0u8; config.bins()];
        let mut second = vec![0u8; config.bins()];
        analyser.process(&window, &mut first);
        analyser.process(&window, &mut second);

        // Same input, but the smoothed magnitude keeps charging up
        assert!(second[16] >= first[16]);
        assert!(first[16] > 0);
    }
}
