//! Audio system tying looped preset playback to a spectral analysis tap.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use super::analysis::spawn_analysis_thread;
use super::playback::{asset_path, load_track, Preset};
use crate::params::AnalyserConfig;

/// Readiness of the spectral tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapState {
    /// At least one window has been analysed; the snapshot is live
    Ready,
    /// The analysis thread has not produced a window yet
    NotRunning,
}

/// Audio system managing looped playback and spectral analysis
///
/// One system exists per selected preset; selecting a new preset drops the
/// old system, which stops the stream and joins the analysis thread before
/// the replacement attaches its own tap.
pub struct AudioSystem {
    preset: Preset,

    /// Shared byte spectrum, refreshed by the analysis thread
    spectrum: Arc<Mutex<Vec<u8>>>,

    /// Raised once the first analysis window lands
    primed: Arc<AtomicBool>,

    /// Lowered on drop to stop the analysis thread
    running: Arc<AtomicBool>,

    /// Audio output stream (kept alive)
    _stream: cpal::Stream,

    /// Analysis thread handle, joined on drop
    analysis_thread: Option<thread::JoinHandle<()>>,
}

impl AudioSystem {
    /// Load the preset's track and start playback plus analysis.
    pub fn play(
        preset: Preset,
        config: AnalyserConfig,
        assets_dir: &Path,
    ) -> Result<Self, String> {
        config
            .validate()
            .map_err(|e| format!("invalid analyser config: {}", e))?;

        let track = load_track(&asset_path(assets_dir, preset))?;
        if track.len_frames() == 0 {
            return Err(format!("{}: track is empty", preset.asset_file()));
        }

        // Shared state between playback callback and analysis thread
        let tap_buffer = Arc::new(Mutex::new(Vec::<f32>::new()));
        let tap_buffer_stream = Arc::clone(&tap_buffer);

        let spectrum = Arc::new(Mutex::new(vec![0u8; config.bins()]));
        let primed = Arc::new(AtomicBool::new(false));
        let running = Arc::new(AtomicBool::new(true));

        // Setup audio output device
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or("No audio output device found")?;

        let device_config = device
            .default_output_config()
            .map_err(|e| format!("Failed to get audio config: {}", e))?;

        let device_rate = device_config.sample_rate().0;
        println!(
            "Audio: {} @ {}Hz, playing \"{}\" ({:.1}s loop)",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            device_rate,
            preset,
            track.duration_secs()
        );

        // Linear-interpolation rate conversion from track rate to device rate
        let step = track.sample_rate_hz as f64 / device_rate as f64;
        let frames = track.frames;
        let mut playhead = 0.0f64;

        let stream = device
            .build_output_stream(
                &device_config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut tap = tap_buffer_stream.lock().unwrap();
                    let len = frames.len();

                    for out in data.chunks_exact_mut(2) {
                        let idx = playhead as usize;
                        let frac = (playhead - idx as f64) as f32;
                        let a = frames[idx % len];
                        let b = frames[(idx + 1) % len];

                        let left = a[0] + (b[0] - a[0]) * frac;
                        let right = a[1] + (b[1] - a[1]) * frac;
                        out[0] = left;
                        out[1] = right;

                        // Mono mixdown feeds the analysis tap
                        tap.push((left + right) * 0.5);

                        playhead += step;
                        if playhead >= len as f64 {
                            playhead -= len as f64; // loop the track
                        }
                    }
                },
                |err| eprintln!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| format!("Failed to build audio stream: {}", e))?;

        stream
            .play()
            .map_err(|e| format!("Failed to start audio stream: {}", e))?;

        // Start spectral analysis thread
        let analysis_thread = spawn_analysis_thread(
            config,
            tap_buffer,
            Arc::clone(&spectrum),
            Arc::clone(&primed),
            Arc::clone(&running),
        );

        Ok(Self {
            preset,
            spectrum,
            primed,
            running,
            _stream: stream,
            analysis_thread: Some(analysis_thread),
        })
    }

    /// Currently bound preset
    pub fn preset(&self) -> Preset {
        self.preset
    }

    /// Copy the latest spectral snapshot into `out` (one byte per bin).
    ///
    /// Non-blocking beyond the snapshot lock; the copy is a stable
    /// point-in-time read, stale by at most one analysis interval. Returns
    /// `NotRunning` (leaving `out` untouched) until the first window has
    /// been analysed.
    pub fn sample_spectrum(&self, out: &mut [u8]) -> TapState {
        if !self.primed.load(Ordering::Acquire) {
            return TapState::NotRunning;
        }
        out.copy_from_slice(&self.spectrum.lock().unwrap());
        TapState::Ready
    }
}

impl Drop for AudioSystem {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.analysis_thread.take() {
            let _ = handle.join();
        }
    }
}
