//! Command-line argument parsing.

use clap::Parser;

use crate::audio::Preset;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Moodscape")]
#[command(about = "Audio-reactive 3D meditation visualizer", long_about = None)]
pub struct Args {
    /// Preset to start playing immediately: relax, meditate, sleep
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Directory holding the preset audio assets
    #[arg(long, value_name = "DIR", default_value = "assets")]
    pub assets: String,
}

impl Args {
    /// Parse the preset requested on the command line, if any
    pub fn parse_preset(&self) -> Option<Preset> {
        let name = self.preset.as_deref()?;
        match Preset::from_name(name) {
            Some(preset) => {
                println!("Preset: {}", preset);
                Some(preset)
            }
            None => {
                eprintln!("Warning: Unknown preset '{}', starting idle", name);
                None
            }
        }
    }
}
