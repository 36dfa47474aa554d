//! Parallel path dispatch

use crate::random_walk::RECORDS_DROPPED;
use crate::{create_progress_reporter, RandomWalkIntegrator, Scene};
use cameras::PinholeCamera;
use itertools::iproduct;
use simcore::detector::Detector;
use simcore::error::{Error, Result};
use simcore::geometry::*;
use simcore::parallel::{compact_by, AtomicCollector};
use simcore::pbrt::*;
use simcore::record::{sort_records, PathRecord, RecordSink};
use simcore::rng::RNG;
use simcore::{report_stats, stat_inc};

/// Upper bound on the number of records buffered in memory per pass.
pub const MAX_COLLECTOR_CAPACITY: usize = 1 << 22;

/// Parameters of a render.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// Image width in pixels.
    pub width: usize,

    /// Image height in pixels.
    pub height: usize,

    /// Samples per pixel.
    pub spp: u32,

    /// Base seed of every lane's random number stream.
    pub seed: u64,

    /// Tile edge length in pixels.
    pub tile_size: usize,

    /// Number of worker threads.
    pub threads: usize,

    /// Expected fraction of lanes that reach an emitter.
    pub hit_rate: Float,

    /// Sort each batch of records by launch pixel and sample.
    pub sort: bool,

    /// Remove zero bounce records from each batch.
    pub compact: bool,

    /// Hide the progress bar.
    pub quiet: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            spp: 64,
            seed: 123,
            tile_size: 16,
            threads: 1,
            hit_rate: 0.05,
            sort: false,
            compact: false,
            quiet: true,
        }
    }
}

impl RenderSettings {
    /// Returns the total number of lanes, one per pixel and sample.
    pub fn lane_count(&self) -> u64 {
        (self.width * self.height) as u64 * self.spp as u64
    }

    /// Returns the number of tiles in x and y.
    pub fn tile_counts(&self) -> Point2<usize> {
        let ts = self.tile_size.max(1);
        Point2 {
            x: (self.width + ts - 1) / ts,
            y: (self.height + ts - 1) / ts,
        }
    }

    /// Returns the capacity of the result collector: the expected number of
    /// successful lanes, bounded by `MAX_COLLECTOR_CAPACITY`.
    pub fn collector_capacity(&self) -> usize {
        let expected = (self.lane_count() as f64 * self.hit_rate as f64).ceil() as usize;
        expected.clamp(1, MAX_COLLECTOR_CAPACITY)
    }

    /// Returns the number of tiles per pass so the expected number of
    /// successful lanes of a pass fits the collector.
    pub fn tiles_per_pass(&self) -> usize {
        let ts = self.tile_size.max(1);
        let expected_per_tile = (ts * ts) as f64 * self.spp as f64 * self.hit_rate as f64;
        let n_tiles = self.tile_counts();
        let fit = (self.collector_capacity() as f64 / expected_per_tile).floor() as usize;
        fit.clamp(1, (n_tiles.x * n_tiles.y).max(1))
    }

    fn validate(&self) -> Result<()> {
        if self.lane_count() == 0 {
            return Err(Error::InvalidConfig(format!(
                "nothing to render for {}x{} pixels at {} samples",
                self.width, self.height, self.spp
            )));
        }
        if !(self.hit_rate > 0.0 && self.hit_rate <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "hit rate {} is not in (0, 1]",
                self.hit_rate
            )));
        }
        Ok(())
    }
}

/// Totals of a finished render.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// Number of lanes run.
    pub paths: u64,

    /// Number of records written to the sink.
    pub records: u64,

    /// Number of records lost to collector overflow.
    pub dropped: u64,

    /// Number of passes.
    pub passes: usize,
}

impl RandomWalkIntegrator {
    /// Runs one random walk per pixel and sample and appends every walk that
    /// reaches an emitter to `sink`.
    ///
    /// Tiles are dispatched to worker threads in passes. Workers share the
    /// scene read-only and append records to a bounded collector. Between
    /// passes the collector is drained, the batch is optionally compacted and
    /// sorted, binned into `detector` and appended to the sink.
    ///
    /// * `scene`    - The scene.
    /// * `camera`   - Source of the initial rays.
    /// * `settings` - Render parameters.
    /// * `sink`     - Destination for the records.
    /// * `detector` - Optional depth image accumulator.
    pub fn render(
        &self,
        scene: &Scene,
        camera: &PinholeCamera,
        settings: &RenderSettings,
        sink: &mut dyn RecordSink,
        mut detector: Option<&mut Detector>,
    ) -> Result<RenderSummary> {
        settings.validate()?;

        let n_tiles = settings.tile_counts();
        let tile_count = n_tiles.x * n_tiles.y;
        let tiles_per_pass = settings.tiles_per_pass();
        let n_passes = (tile_count + tiles_per_pass - 1) / tiles_per_pass;
        let threads = settings.threads.max(1);

        let mut collector = AtomicCollector::with_capacity(settings.collector_capacity());

        info!(
            "Simulating {} paths in {}x{} tiles, {} passes, {} threads, collector capacity {}",
            settings.lane_count(),
            n_tiles.x,
            n_tiles.y,
            n_passes,
            threads,
            collector.capacity()
        );

        let progress = create_progress_reporter(tile_count as u64, settings.quiet);
        let mut summary = RenderSummary {
            paths: settings.lane_count(),
            ..Default::default()
        };

        for (pass, first_tile) in (0..tile_count).step_by(tiles_per_pass).enumerate() {
            progress.set_message(format!("Pass {}/{}", pass + 1, n_passes));
            let last_tile = min(first_tile + tiles_per_pass, tile_count);

            crossbeam::scope(|scope| {
                let (tx, rx) = crossbeam_channel::bounded(threads);

                // Spawn worker threads.
                for _ in 0..threads {
                    let rxc = rx.clone();
                    let progress = &progress;
                    let collector = &collector;
                    scope.spawn(move |_| {
                        for tile_idx in rxc.iter() {
                            self.render_tile(tile_idx, n_tiles, scene, camera, settings, collector);
                            progress.inc(1);
                        }
                        report_stats!();
                    });
                }
                drop(rx); // Each worker holds its own clone.

                // Send work.
                for tile_idx in first_tile..last_tile {
                    if tx.send(tile_idx).is_err() {
                        break;
                    }
                }
            })
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));

            // All workers have joined; the batch is complete.
            let dropped = collector.dropped();
            let mut records = collector.drain();
            if dropped > 0 {
                warn!(
                    "Pass {}: {} records dropped, collector capacity {} is too small; raise --hit-rate",
                    pass + 1,
                    dropped,
                    collector.capacity()
                );
            }

            if settings.compact {
                records = compact_by(records, |r| r.bounces > 0);
            }
            if settings.sort {
                sort_records(&mut records);
            }
            if let Some(detector) = detector.as_deref_mut() {
                detector.add_all(&records);
            }
            sink.append(&records)?;

            debug!("Pass {} wrote {} records", pass + 1, records.len());
            summary.records += records.len() as u64;
            summary.dropped += dropped as u64;
            summary.passes += 1;
        }

        progress.finish_with_message("Simulation complete");
        info!(
            "{} of {} paths reached an emitter ({} dropped)",
            summary.records, summary.paths, summary.dropped
        );

        Ok(summary)
    }

    /// Runs the lanes of one tile.
    ///
    /// * `tile_idx`  - Unique tile index.
    /// * `n_tiles`   - Number of tiles in (x, y) direction.
    /// * `scene`     - Scene.
    /// * `camera`    - Camera.
    /// * `settings`  - Render parameters.
    /// * `collector` - Destination for successful paths.
    fn render_tile(
        &self,
        tile_idx: usize,
        n_tiles: Point2<usize>,
        scene: &Scene,
        camera: &PinholeCamera,
        settings: &RenderSettings,
        collector: &AtomicCollector<PathRecord>,
    ) {
        let tile_x = tile_idx % n_tiles.x;
        let tile_y = tile_idx / n_tiles.x;

        let ts = settings.tile_size.max(1);
        let x0 = tile_x * ts;
        let x1 = min(x0 + ts, settings.width);
        let y0 = tile_y * ts;
        let y1 = min(y0 + ts, settings.height);

        debug!("Starting tile ({tile_x}, {tile_y}) -> [{x0}, {y0}] - [{x1}, {y1}]");

        for (y, x, sample) in iproduct!(y0..y1, x0..x1, 0..settings.spp) {
            let pixel = Point2i::new(x as Int, y as Int);
            let lane = (y * settings.width + x) as u64 * settings.spp as u64 + sample as u64;
            let mut rng = RNG::for_lane(settings.seed, lane);

            let ray = camera.generate_ray(pixel, &rng.uniform_point2());
            let result = self.walk(scene, &ray, &mut rng);
            if !result.hit {
                continue;
            }

            let record = PathRecord {
                bounces: result.bounces,
                distance: result.distance,
                position: result.position,
                direction: result.direction,
                weight: result.weight,
                pixel,
                sample,
                detector: camera.pixel_for_direction(&result.direction),
            };
            if collector.push(record).is_err() {
                stat_inc!(RECORDS_DROPPED, 1);
            }
        }

        debug!("Finished tile ({tile_x}, {tile_y})");
    }
}
