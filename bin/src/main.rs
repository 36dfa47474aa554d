#[macro_use]
extern crate log;

use api::*;
use cameras::{CameraSettings, PinholeCamera};
use integrators::*;
use simcore::app::*;
use simcore::detector::Detector;
use simcore::error::{Error, Result};
use simcore::geometry::Vector3f;
use simcore::pbrt::Float;
use simcore::record::create_sink;
use simcore::{clear_stats, print_stats, report_stats};
use std::process::ExitCode;

#[cfg(all(feature = "dhat-rs", feature = "jemalloc"))]
compile_error!("feature 'dhat-rs' and feature 'jemalloc' cannot be enabled at the same time");

#[cfg(feature = "dhat-rs")]
use dhat::{Dhat, DhatAlloc};

#[cfg(feature = "dhat-rs")]
#[global_allocator]
static ALLOCATOR: DhatAlloc = DhatAlloc;

#[cfg(feature = "jemalloc")]
#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static ALLOCATOR: Jemalloc = Jemalloc;

fn main() -> ExitCode {
    #[cfg(feature = "dhat-rs")]
    let _dhat = Dhat::start_heap_profiling();

    // Initialize `env_logger`.
    env_logger::init();

    match simulate(options()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn vec3(name: &str, v: &[Float]) -> Result<Vector3f> {
    <[Float; 3]>::try_from(v)
        .map(Vector3f::from)
        .map_err(|_| Error::InvalidConfig(format!("{name} needs 3 components")))
}

fn simulate(opts: &Options) -> Result<()> {
    opts.validate()?;

    let camera = PinholeCamera::new(CameraSettings {
        width: opts.width,
        height: opts.height,
        fov: opts.fov,
        position: vec3("camera-position", &opts.camera_position)?,
        look_at: vec3("look-at", &opts.look_at)?,
        up: vec3("up", &opts.up)?,
        detector_distance: opts.detector_distance,
        detector_size: opts.detector_size,
    });

    // Load the model and add the detector.
    let mut desc = load_obj(&opts.model)?;
    desc.add_detector(&camera);
    let scene = desc.into_scene()?;
    info!("Scene bounds {}", scene.world_bound());

    let termination = if opts.russian_roulette {
        Termination::RussianRoulette {
            min_bounces: DEFAULT_RR_MIN_BOUNCES,
            max_survival: opts.absorption,
        }
    } else {
        Termination::Absorption {
            threshold: opts.absorption,
        }
    };
    let integrator = RandomWalkIntegrator::new(opts.max_depth, termination);

    let settings = RenderSettings {
        width: opts.width,
        height: opts.height,
        spp: u32::try_from(opts.spp).map_err(|_| Error::InvalidConfig(format!("spp {} too large", opts.spp)))?,
        seed: opts.seed,
        tile_size: opts.tile_size,
        threads: opts.threads(),
        hit_rate: opts.hit_rate,
        sort: opts.sort,
        compact: opts.compact,
        quiet: opts.quiet,
    };

    let mut sink = create_sink(&opts.output)?;
    let mut detector = opts
        .depth_image
        .as_ref()
        .map(|_| Detector::new(opts.width, opts.height).with_binning(opts.binning));

    let summary = integrator.render(&scene, &camera, &settings, sink.as_mut(), detector.as_mut())?;
    sink.close()?;
    info!(
        "Wrote {} records to {} ({} dropped)",
        summary.records,
        opts.output.display(),
        summary.dropped
    );

    if let (Some(path), Some(detector)) = (&opts.depth_image, &detector) {
        detector.write_depth_image(path)?;
        info!("Wrote depth image {}", path.display());
    }

    if opts.stats {
        report_stats!();
        print_stats!();
        clear_stats!();
    }

    Ok(())
}
