//! Per-frame mesh deformation driven by spectral snapshots.
//!
//! Control scalars are derived from the snapshot once per frame, then pure
//! displacement passes rewrite vertex positions in place. Both passes are
//! deterministic for a fixed (snapshot, positions, timestamp) triple, so
//! they are testable without a live renderer or audio device.

use std::fmt;

use glam::Vec3;

use crate::maths::{avg, max_value, modulate};
use crate::mesh::Vertex;
use crate::noise_field::NoiseField;
use crate::params::DeformParams;

/// Snapshot shapes the engine refuses to derive controls from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectrumError {
    /// Zero-length snapshot
    Empty,
    /// Too few bins to form two non-empty halves (needs at least 4)
    TooShort { len: usize },
}

impl fmt::Display for SpectrumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpectrumError::Empty => write!(f, "spectral snapshot is empty"),
            SpectrumError::TooShort { len } => {
                write!(f, "spectral snapshot too short ({} bins, need 4)", len)
            }
        }
    }
}

/// Split a snapshot into bass-dominant and treble-dominant halves.
///
/// The split point is len/2 with a deliberate off-by-one carried over from
/// the reference behavior: the boundary bin len/2 - 1 belongs to the upper
/// half and the final bin is excluded entirely. Kept as-is; downstream
/// statistics were tuned against exactly these ranges.
pub fn split_spectrum(snapshot: &[u8]) -> Result<(&[u8], &[u8]), SpectrumError> {
    let len = snapshot.len();
    if len == 0 {
        return Err(SpectrumError::Empty);
    }
    if len < 4 {
        return Err(SpectrumError::TooShort { len });
    }

    let boundary = len / 2 - 1;
    Ok((&snapshot[..boundary], &snapshot[boundary..len - 1]))
}

/// Control scalars for the radial (orb) displacement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeControls {
    /// Uniform outward push from the loudest bass bin
    pub bass_fr: f32,
    /// Noise amplitude from the average treble energy
    pub treble_fr: f32,
}

impl ShapeControls {
    /// Derive controls from a spectral snapshot.
    pub fn from_snapshot(snapshot: &[u8], params: &DeformParams) -> Result<Self, SpectrumError> {
        let (lower, upper) = split_spectrum(snapshot)?;

        let bass_raw = max_value(lower) as f32 / lower.len() as f32;
        let treble_raw = avg(upper) / upper.len() as f32;

        let (bass_min, bass_max) = params.bass_range;
        let (tre_min, tre_max) = params.treble_range;

        Ok(Self {
            bass_fr: modulate(
                bass_raw.powf(params.bass_exponent),
                0.0,
                1.0,
                bass_min,
                bass_max,
            ),
            treble_fr: modulate(treble_raw, 0.0, 1.0, tre_min, tre_max),
        })
    }
}

/// Control scalar for the backdrop (plane) displacement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneControls {
    /// Ripple amplitude from the average treble energy
    pub distort_fr: f32,
}

impl PlaneControls {
    /// Derive controls from a spectral snapshot (upper half only).
    pub fn from_snapshot(snapshot: &[u8], params: &DeformParams) -> Result<Self, SpectrumError> {
        let (_, upper) = split_spectrum(snapshot)?;
        let treble_raw = avg(upper) / upper.len() as f32;
        let (tre_min, tre_max) = params.treble_range;

        Ok(Self {
            distort_fr: modulate(treble_raw, 0.0, 1.0, tre_min, tre_max),
        })
    }
}

/// Radial displacement pass for the orb.
///
/// Each vertex is pushed along its own direction from the mesh origin to
/// distance `radius + bass_fr + noise * treble_fr`. The noise coordinate is
/// the unit direction drifted by time, so the pattern crawls over the
/// surface as the track plays. Scales only, never rotates.
pub fn displace_radial(
    vertices: &mut [Vertex],
    controls: &ShapeControls,
    time_ms: f64,
    radius: f32,
    noise: &NoiseField,
    params: &DeformParams,
) {
    let [rate_x, rate_y, rate_z] = params.orb_axis_rates;
    let drift = time_ms * params.orb_time_scale;

    for vertex in vertices.iter_mut() {
        let v = Vec3::from_array(vertex.position);
        let dir = v / v.length();

        let sample = noise.sample_3d(
            dir.x as f64 + drift * rate_x,
            dir.y as f64 + drift * rate_y,
            dir.z as f64 + drift * rate_z,
        );

        let distance = radius + controls.bass_fr + sample * controls.treble_fr;
        vertex.position = (dir * distance).to_array();
    }
}

/// Ripple displacement pass for the backdrop plane.
///
/// Only z is rewritten; x and y stay on the original grid, so repeated
/// passes at the same timestamp are idempotent.
pub fn displace_plane(
    vertices: &mut [Vertex],
    controls: &PlaneControls,
    time_ms: f64,
    noise: &NoiseField,
    params: &DeformParams,
) {
    let drift_x = time_ms * params.plane_time_scale_x;
    let drift_y = time_ms * params.plane_time_scale_y;

    for vertex in vertices.iter_mut() {
        let [x, y, _] = vertex.position;
        let sample = noise.sample_2d(x as f64 + drift_x, y as f64 + drift_y);
        vertex.position[2] = sample * controls.distort_fr * params.plane_amplitude;
    }
}
