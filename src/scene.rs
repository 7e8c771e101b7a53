//! Stage composition: the deformable meshes, the clickable preset boxes and
//! the per-frame update dispatch between reactive and idle modes.

use glam::{Mat4, Vec3};

use crate::audio::Preset;
use crate::deform::{
    displace_plane, displace_radial, PlaneControls, ShapeControls, SpectrumError,
};
use crate::mesh::Mesh;
use crate::noise_field::NoiseField;
use crate::params::{DeformParams, StageLayout};

/// Which per-frame visual update ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    /// Spectral snapshot available: both meshes deform
    Reactive,
    /// No live tap: the orb spins, the backdrop rests
    Idle,
}

/// Clickable preset selector box
pub struct PresetBox {
    pub preset: Preset,
    pub center: Vec3,
    pub half_extent: Vec3,
}

impl PresetBox {
    /// Ray hit distance, if the ray crosses this box
    pub fn hit(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        ray_aabb(
            origin,
            dir,
            self.center - self.half_extent,
            self.center + self.half_extent,
        )
    }
}

/// The full stage: deformable meshes plus interaction geometry
pub struct Stage {
    pub orb: Mesh,
    pub backdrop: Mesh,
    pub boxes: [PresetBox; 3],

    /// Accumulated idle rotation of the orb (radians)
    pub orb_spin: f32,

    pub layout: StageLayout,
    params: DeformParams,
    orb_noise: NoiseField,
    plane_noise: NoiseField,
}

impl Stage {
    /// Build the stage geometry from layout parameters
    pub fn new(layout: StageLayout, params: DeformParams) -> Self {
        let orb = Mesh::icosphere(layout.orb_radius, layout.orb_detail);
        let backdrop = Mesh::plane(
            layout.backdrop_size.0,
            layout.backdrop_size.1,
            layout.backdrop_segments,
        );

        let half = Vec3::splat(layout.box_size / 2.0);
        let boxes = [0, 1, 2].map(|i| PresetBox {
            preset: Preset::ALL[i],
            center: Vec3::from_array(layout.box_positions[i]),
            half_extent: half,
        });

        let orb_noise = NoiseField::new(params.orb_noise_seed);
        let plane_noise = NoiseField::new(params.plane_noise_seed);

        Self {
            orb,
            backdrop,
            boxes,
            orb_spin: 0.0,
            layout,
            params,
            orb_noise,
            plane_noise,
        }
    }

    /// Run one frame of visual updates.
    ///
    /// With a snapshot, both meshes deform from its control scalars; without
    /// one, the idle fallback spins the orb instead. Topology never changes,
    /// only positions.
    pub fn update(
        &mut self,
        time_ms: f64,
        snapshot: Option<&[u8]>,
    ) -> Result<FrameMode, SpectrumError> {
        match snapshot {
            Some(snapshot) => {
                let shape = ShapeControls::from_snapshot(snapshot, &self.params)?;
                let plane = PlaneControls::from_snapshot(snapshot, &self.params)?;

                displace_radial(
                    &mut self.orb.vertices,
                    &shape,
                    time_ms,
                    self.layout.orb_radius,
                    &self.orb_noise,
                    &self.params,
                );
                displace_plane(
                    &mut self.backdrop.vertices,
                    &plane,
                    time_ms,
                    &self.plane_noise,
                    &self.params,
                );
                Ok(FrameMode::Reactive)
            }
            None => {
                self.orb_spin += self.params.idle_spin_rad;
                Ok(FrameMode::Idle)
            }
        }
    }

    /// Nearest preset box crossed by the ray, if any
    pub fn pick(&self, origin: Vec3, dir: Vec3) -> Option<Preset> {
        self.boxes
            .iter()
            .filter_map(|b| b.hit(origin, dir).map(|t| (b.preset, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(preset, _)| preset)
    }

    /// Model matrix for the orb (translation + accumulated idle spin)
    pub fn orb_model(&self) -> Mat4 {
        Mat4::from_translation(Vec3::from_array(self.layout.orb_position))
            * Mat4::from_rotation_y(self.orb_spin)
    }

    /// Model matrix for the backdrop plane
    pub fn backdrop_model(&self) -> Mat4 {
        Mat4::from_translation(Vec3::from_array(self.layout.backdrop_position))
    }

    /// Model matrix for a preset box
    pub fn box_model(&self, index: usize) -> Mat4 {
        Mat4::from_translation(self.boxes[index].center)
    }
}

/// Slab-method ray / axis-aligned-box intersection.
///
/// Returns the entry distance along the ray, or None on a miss.
pub fn ray_aabb(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = dir.recip();
    let t1 = (min - origin) * inv;
    let t2 = (max - origin) * inv;

    let t_min = t1.min(t2);
    let t_max = t1.max(t2);

    let near = t_min.max_element();
    let far = t_max.min_element();

    if near <= far && far >= 0.0 {
        Some(near.max(0.0))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{DeformParams, StageLayout};

    fn small_stage() -> Stage {
        let layout = StageLayout {
            orb_detail: 1,
            backdrop_segments: 8,
            ..StageLayout::default()
        };
        Stage::new(layout, DeformParams::default())
    }

    #[test]
    fn test_ray_aabb_hit_and_miss() {
        let min = Vec3::splat(-0.5);
        let max = Vec3::splat(0.5);

        // Straight-on hit from +Z
        let t = ray_aabb(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, min, max).unwrap();
        assert!((t - 4.5).abs() < 1e-5);

        // Parallel miss
        assert!(ray_aabb(Vec3::new(2.0, 0.0, 5.0), Vec3::NEG_Z, min, max).is_none());

        // Box behind the origin
        assert!(ray_aabb(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, min, max).is_none());
    }

    #[test]
    fn test_pick_selects_each_box() {
        let stage = small_stage();

        for (i, preset) in Preset::ALL.iter().enumerate() {
            let center = Vec3::from_array(stage.layout.box_positions[i]);
            let origin = center + Vec3::new(0.0, 0.0, 6.8);
            let picked = stage.pick(origin, Vec3::NEG_Z);
            assert_eq!(picked, Some(*preset));
        }
    }

    #[test]
    fn test_pick_misses_empty_space() {
        let stage = small_stage();
        let picked = stage.pick(Vec3::new(10.0, 10.0, 6.8), Vec3::NEG_Z);
        assert_eq!(picked, None);
    }

    #[test]
    fn test_idle_mode_spins_orb_and_rests_backdrop() {
        let mut stage = small_stage();
        let flat: Vec<[f32; 3]> = stage.backdrop.vertices.iter().map(|v| v.position).collect();

        let mode = stage.update(16.0, None).unwrap();
        assert_eq!(mode, FrameMode::Idle);
        assert!((stage.orb_spin - 0.005).abs() < 1e-6);

        let mode = stage.update(32.0, None).unwrap();
        assert_eq!(mode, FrameMode::Idle);
        assert!((stage.orb_spin - 0.010).abs() < 1e-6);

        // Backdrop untouched while idle
        for (v, p) in stage.backdrop.vertices.iter().zip(&flat) {
            assert_eq!(v.position, *p);
        }
    }

    #[test]
    fn test_reactive_mode_deforms_both_meshes() {
        let mut stage = small_stage();
        let orb_count = stage.orb.vertices.len();
        let backdrop_count = stage.backdrop.vertices.len();

        let mut snapshot = vec![0u8; 256];
        snapshot[200] = 180; // some treble energy

        let mode = stage.update(500.0, Some(&snapshot)).unwrap();
        assert_eq!(mode, FrameMode::Reactive);

        // Spin untouched, topology preserved
        assert_eq!(stage.orb_spin, 0.0);
        assert_eq!(stage.orb.vertices.len(), orb_count);
        assert_eq!(stage.backdrop.vertices.len(), backdrop_count);

        // Treble ripples the backdrop
        assert!(stage.backdrop.vertices.iter().any(|v| v.position[2] != 0.0));
    }

    #[test]
    fn test_reactive_mode_rejects_short_snapshot() {
        let mut stage = small_stage();
        let err = stage.update(0.0, Some(&[1, 2])).unwrap_err();
        assert_eq!(err, SpectrumError::TooShort { len: 2 });
    }
}
