//! Preset-to-asset binding and WAV track loading.

use std::fmt;
use std::path::{Path, PathBuf};

/// User-selectable audio/visual mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Relax,
    Meditate,
    Sleep,
}

impl Preset {
    /// All presets, in on-screen order (left to right)
    pub const ALL: [Preset; 3] = [Preset::Relax, Preset::Meditate, Preset::Sleep];

    /// Asset file name for this preset, resolved against the assets dir
    pub fn asset_file(&self) -> &'static str {
        match self {
            Preset::Relax => "relax.wav",
            Preset::Meditate => "meditate.wav",
            Preset::Sleep => "sleep.wav",
        }
    }

    /// Parse a preset name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "relax" => Some(Preset::Relax),
            "meditate" => Some(Preset::Meditate),
            "sleep" => Some(Preset::Sleep),
            _ => None,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Relax => write!(f, "Relax"),
            Preset::Meditate => write!(f, "Meditate"),
            Preset::Sleep => write!(f, "Sleep"),
        }
    }
}

/// Decoded audio track, stereo frames in [-1, 1]
#[derive(Debug)]
pub struct TrackBuffer {
    pub frames: Vec<[f32; 2]>,
    pub sample_rate_hz: u32,
}

impl TrackBuffer {
    pub fn len_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn duration_secs(&self) -> f32 {
        self.frames.len() as f32 / self.sample_rate_hz as f32
    }
}

/// Resolve the asset path for a preset.
pub fn asset_path(assets_dir: &Path, preset: Preset) -> PathBuf {
    assets_dir.join(preset.asset_file())
}

/// Load a WAV file into a stereo track buffer.
///
/// Mono files are duplicated to both channels. Integer formats are
/// normalized to [-1, 1].
pub fn load_track(path: &Path) -> Result<TrackBuffer, String> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| format!("failed to open {}: {}", path.display(), e))?;
    let spec = reader.spec();

    if spec.channels == 0 || spec.channels > 2 {
        return Err(format!(
            "{}: unsupported channel count {}",
            path.display(),
            spec.channels
        ));
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| format!("failed to decode {}: {}", path.display(), e))?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .map_err(|e| format!("failed to decode {}: {}", path.display(), e))?
        }
    };

    let frames = if spec.channels == 1 {
        samples.iter().map(|&s| [s, s]).collect()
    } else {
        samples.chunks_exact(2).map(|c| [c[0], c[1]]).collect()
    };

    Ok(TrackBuffer {
        frames,
        sample_rate_hz: spec.sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_asset_mapping_is_exhaustive() {
        // Exactly one asset per preset, all distinct
        let files: Vec<&str> = Preset::ALL.iter().map(|p| p.asset_file()).collect();
        assert_eq!(files, vec!["relax.wav", "meditate.wav", "sleep.wav"]);
    }

    #[test]
    fn test_preset_from_name() {
        assert_eq!(Preset::from_name("Relax"), Some(Preset::Relax));
        assert_eq!(Preset::from_name("MEDITATE"), Some(Preset::Meditate));
        assert_eq!(Preset::from_name("sleep"), Some(Preset::Sleep));
        assert_eq!(Preset::from_name("focus"), None);
    }

    #[test]
    fn test_load_track_int16_mono() {
        let path = std::env::temp_dir().join("moodscape_test_mono.wav");

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..441 {
            let s = ((i as f32 / 441.0) * std::f32::consts::TAU * 10.0).sin();
            writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();

        let track = load_track(&path).unwrap();
        assert_eq!(track.len_frames(), 441);
        assert_eq!(track.sample_rate_hz, 44100);
        assert!((track.duration_secs() - 0.01).abs() < 1e-4);
        for frame in &track.frames {
            // Mono duplicated into both channels, normalized
            assert_eq!(frame[0], frame[1]);
            assert!(frame[0].abs() <= 1.0);
        }

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_track_missing_file() {
        let err = load_track(Path::new("/nonexistent/relax.wav")).unwrap_err();
        assert!(err.contains("failed to open"));
    }
}
