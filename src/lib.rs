//! Moodscape library - audio-reactive 3D visualizer

pub mod audio;
pub mod camera;
pub mod cli;
pub mod deform;
pub mod maths;
pub mod mesh;
pub mod noise_field;
pub mod params;
pub mod rendering;
pub mod scene;
