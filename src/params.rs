//! Parameter definitions with documented units and semantics.
//!
//! All magic numbers are extracted here with:
//! - Units (milliseconds, radians, dB, etc.)
//! - Documented ranges and meanings
//! - Type safety where possible

/// Spectral analyser configuration (window size, byte conversion, cadence)
#[derive(Debug, Clone)]
pub struct AnalyserConfig {
    /// Analysis window size in samples (must be power of 2)
    /// Frequency resolution: bins = fft_size / 2
    pub fft_size: usize,

    /// Analysis thread update interval (milliseconds)
    /// 50ms = 20 Hz refresh
    pub update_interval_ms: u64,

    /// Exponential smoothing time constant for magnitudes, in [0, 1)
    /// 0 = no smoothing, values near 1 = heavy smoothing
    pub smoothing: f32,

    /// Magnitude (dB) mapped to byte 0
    pub min_db: f32,

    /// Magnitude (dB) mapped to byte 255
    pub max_db: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 512,
            update_interval_ms: 50,
            smoothing: 0.8,
            min_db: -90.0,
            max_db: -30.0,
        }
    }
}

impl AnalyserConfig {
    /// Number of frequency bins in a spectral snapshot
    pub fn bins(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (window size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if !self.fft_size.is_power_of_two() {
            return Err(format!(
                "analysis window size must be power of 2, got {}",
                self.fft_size
            ));
        }
        if self.min_db >= self.max_db {
            return Err(format!(
                "min_db ({}) must be below max_db ({})",
                self.min_db, self.max_db
            ));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(format!(
                "smoothing must be in [0, 1), got {}",
                self.smoothing
            ));
        }
        Ok(())
    }
}

/// Mapping from spectral statistics to mesh displacement
#[derive(Debug, Clone)]
pub struct DeformParams {
    /// Exponent applied to the normalized bass maximum before remapping
    pub bass_exponent: f32,

    /// Output range for the bass control scalar (resting value, peak value)
    pub bass_range: (f32, f32),

    /// Output range for the treble control scalar
    pub treble_range: (f32, f32),

    /// Time scale for the orb's noise coordinates (per millisecond)
    pub orb_time_scale: f64,

    /// Per-axis rate multipliers for the orb's noise coordinates
    pub orb_axis_rates: [f64; 3],

    /// Time scales for the backdrop's noise coordinates (per millisecond)
    pub plane_time_scale_x: f64,
    pub plane_time_scale_y: f64,

    /// Amplitude factor for backdrop displacement
    pub plane_amplitude: f32,

    /// Idle fallback spin applied to the orb (radians per frame)
    pub idle_spin_rad: f32,

    /// Seed for the 3-coordinate noise field (orb)
    pub orb_noise_seed: u32,

    /// Seed for the 2-coordinate noise field (backdrop)
    pub plane_noise_seed: u32,
}

impl Default for DeformParams {
    fn default() -> Self {
        Self {
            bass_exponent: 0.8,
            bass_range: (0.5, 8.0),
            treble_range: (0.5, 4.0),
            orb_time_scale: 1e-5,
            orb_axis_rates: [7.0, 8.0, 9.0],
            plane_time_scale_x: 3e-4,
            plane_time_scale_y: 1e-4,
            plane_amplitude: 0.8,
            idle_spin_rad: 0.005,
            orb_noise_seed: 3,
            plane_noise_seed: 2,
        }
    }
}

/// RGBA color (linear)
pub type Color = [f32; 4];

/// Placement, sizing and colors for the scene
#[derive(Debug, Clone)]
pub struct StageLayout {
    /// Orb center position
    pub orb_position: [f32; 3],

    /// Orb resting radius (the `r` constant of the radial displacement)
    pub orb_radius: f32,

    /// Icosphere subdivision level (5 = 10,242 vertices)
    pub orb_detail: u32,

    /// Orb wireframe color (gold)
    pub orb_color: Color,

    /// Backdrop plane center position
    pub backdrop_position: [f32; 3],

    /// Backdrop plane extent (width, height) in world units
    pub backdrop_size: (f32, f32),

    /// Backdrop grid segments per side
    pub backdrop_segments: usize,

    /// Backdrop wireframe color (translucent purple)
    pub backdrop_color: Color,

    /// Preset box edge length
    pub box_size: f32,

    /// Preset box centers, left to right: Relax, Meditate, Sleep
    pub box_positions: [[f32; 3]; 3],

    /// Preset box resting color (translucent white)
    pub box_color: Color,

    /// Preset box hover color (sage green)
    pub box_hover_color: Color,
}

impl Default for StageLayout {
    fn default() -> Self {
        Self {
            orb_position: [0.0, -1.1, 0.0],
            orb_radius: 2.0,
            orb_detail: 5,
            orb_color: [0.941, 0.769, 0.125, 1.0],
            backdrop_position: [0.0, -1.0, -3.0],
            backdrop_size: (30.0, 30.0),
            backdrop_segments: 100,
            backdrop_color: [0.412, 0.016, 0.808, 0.3],
            box_size: 1.0,
            box_positions: [[-1.5, 2.5, 0.0], [0.0, 2.5, 0.0], [1.5, 2.5, 0.0]],
            box_color: [1.0, 1.0, 1.0, 0.6],
            box_hover_color: [0.573, 0.718, 0.502, 0.6],
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane
    pub near_plane: f32,

    /// Far clipping plane
    pub far_plane: f32,

    /// Initial camera distance from the look-at target
    pub camera_distance: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fov_degrees: 75.0,
            near_plane: 0.1,
            far_plane: 1000.0,
            camera_distance: 6.8,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height as f32
    }
}
