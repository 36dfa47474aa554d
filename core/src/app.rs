//! Application related stuff

use crate::detector::Binning;
use crate::error::{Error, Result};
use crate::pbrt::Float;
use clap::Parser;
use std::path::PathBuf;

lazy_static! {
    /// The global application options.
    pub static ref OPTIONS: Options = Options::parse();
}

/// Returns the global application options. Parses the command line on first
/// use. Only the binary calls this; library code takes explicit settings.
pub fn options() -> &'static Options {
    &OPTIONS
}

/// System wide options.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about = "Monte-Carlo random walk simulator for triangulated scenes", long_about = None)]
pub struct Options {
    /// Wavefront OBJ model; materials are read from the MTL files it references.
    #[arg(long, value_name = "FILE")]
    pub model: PathBuf,

    /// Output records. `.txt` selects the text format, anything else the binary format.
    #[arg(long, short = 'o', value_name = "FILE", default_value = "paths.bin")]
    pub output: PathBuf,

    /// Image width in pixels.
    #[arg(long, value_name = "NUM", default_value_t = 256)]
    pub width: usize,

    /// Image height in pixels.
    #[arg(long, value_name = "NUM", default_value_t = 256)]
    pub height: usize,

    /// Vertical field of view in degrees.
    #[arg(long, value_name = "DEGREES", default_value_t = 40.0)]
    pub fov: Float,

    /// Samples (paths) per pixel.
    #[arg(long, value_name = "NUM", default_value_t = 64)]
    pub spp: usize,

    /// Base seed for the per-lane random number generators.
    #[arg(long, value_name = "NUM", default_value_t = 123)]
    pub seed: u64,

    /// Number of threads to use.
    #[arg(long = "nthreads", short = 't', value_name = "NUM", default_value_t = 1)]
    n_threads: usize,

    /// Size in pixels of square tiles handed to worker threads.
    #[arg(long = "tilesize", value_name = "NUM", default_value_t = 16)]
    pub tile_size: usize,

    /// Maximum number of bounces per path.
    #[arg(long, value_name = "NUM", default_value_t = 10)]
    pub max_depth: usize,

    /// Paths are absorbed when a uniform sample exceeds this threshold.
    #[arg(long, value_name = "FLOAT", default_value_t = 0.9)]
    pub absorption: Float,

    /// Use unbiased Russian roulette termination instead of fixed absorption.
    #[arg(long)]
    pub russian_roulette: bool,

    /// Expected fraction of paths reaching an emitter; sizes the result collector.
    #[arg(long, value_name = "FLOAT", default_value_t = 0.05)]
    pub hit_rate: Float,

    /// Camera position.
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], default_values_t = [0.0, 274.0, 1280.0], allow_negative_numbers = true)]
    pub camera_position: Vec<Float>,

    /// Point the camera looks at.
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], default_values_t = [0.0, 274.0, 0.0], allow_negative_numbers = true)]
    pub look_at: Vec<Float>,

    /// Camera up vector.
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], default_values_t = [0.0, 1.0, 0.0], allow_negative_numbers = true)]
    pub up: Vec<Float>,

    /// Distance of the detector quad in front of the camera.
    #[arg(long, value_name = "FLOAT", default_value_t = 1.0)]
    pub detector_distance: Float,

    /// Edge length of the detector quad; 0 disables it.
    #[arg(long, value_name = "FLOAT", default_value_t = 20.0)]
    pub detector_size: Float,

    /// Write a 16-bit grayscale image of mean path length per detector pixel.
    #[arg(long, value_name = "FILE")]
    pub depth_image: Option<PathBuf>,

    /// How records are assigned to depth image pixels.
    #[arg(long, value_enum, default_value_t = Binning::Flash)]
    pub binning: Binning,

    /// Sort each batch of records by pixel and sample.
    #[arg(long)]
    pub sort: bool,

    /// Remove records with zero bounces before writing.
    #[arg(long)]
    pub compact: bool,

    /// Suppress all text output other than error messages.
    #[arg(long)]
    pub quiet: bool,

    /// Print statistics at the end.
    #[arg(long)]
    pub stats: bool,
}

impl Options {
    /// Returns the number of threads to use.
    pub fn threads(&self) -> usize {
        let max_threads = num_cpus::get();
        match self.n_threads {
            0 => {
                warn!("Invalid nthreads");
                1
            }
            n if n > max_threads => {
                warn!("Num threads > max logical CPUs {}", max_threads);
                max_threads
            }
            n => n,
        }
    }

    /// Checks option ranges.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::InvalidConfig(msg));

        if self.width == 0 || self.height == 0 {
            return invalid(format!("image size {}x{} must be positive", self.width, self.height));
        }
        if self.spp == 0 {
            return invalid("spp must be positive".to_string());
        }
        if self.tile_size == 0 {
            return invalid("tilesize must be positive".to_string());
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return invalid(format!("fov {} not in (0, 180)", self.fov));
        }
        if !(self.absorption > 0.0 && self.absorption <= 1.0) {
            return invalid(format!("absorption {} not in (0, 1]", self.absorption));
        }
        if !(self.hit_rate > 0.0 && self.hit_rate <= 1.0) {
            return invalid(format!("hit-rate {} not in (0, 1]", self.hit_rate));
        }
        if self.detector_size < 0.0 || self.detector_distance <= 0.0 {
            return invalid("detector size must be >= 0 and distance > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Options {
        let mut argv = vec!["photon-walk", "--model", "scene.obj"];
        argv.extend_from_slice(args);
        Options::parse_from(argv)
    }

    #[test]
    fn defaults_are_valid() {
        let o = parse(&[]);
        assert!(o.validate().is_ok());
        assert_eq!(o.max_depth, 10);
        assert_eq!(o.camera_position, vec![0.0, 274.0, 1280.0]);
        assert_eq!(o.binning, Binning::Flash);
    }

    #[test]
    fn binning_mode_parses() {
        assert_eq!(parse(&["--binning", "scan"]).binning, Binning::Scan);
    }

    #[test]
    fn negative_vector_components_parse() {
        let o = parse(&["--look-at", "-1", "0", "-5"]);
        assert_eq!(o.look_at, vec![-1.0, 0.0, -5.0]);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(parse(&["--fov", "180"]).validate(), Err(Error::InvalidConfig(_))));
        assert!(matches!(parse(&["--spp", "0"]).validate(), Err(Error::InvalidConfig(_))));
        assert!(matches!(parse(&["--absorption", "0"]).validate(), Err(Error::InvalidConfig(_))));
        assert!(matches!(parse(&["--hit-rate", "1.5"]).validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn zero_threads_falls_back_to_one() {
        assert_eq!(parse(&["-t", "0"]).threads(), 1);
    }
}
