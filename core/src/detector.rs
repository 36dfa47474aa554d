//! Detector pixelation
//!
//! Bins path records into detector pixels and reduces them to a per-pixel
//! mean path length (a depth image).

use crate::error::{Error, Result};
use crate::geometry::*;
use crate::pbrt::*;
use crate::record::PathRecord;
use image::{ImageBuffer, ImageFormat, Luma};
use std::path::Path;

/// How a record is assigned to a detector pixel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Binning {
    /// Whole-field illumination; the pixel is where the reversed arrival
    /// direction projects onto the image.
    #[default]
    Flash,

    /// Scanned beam; the pixel is the one the path was launched from.
    Scan,
}

/// Per-pixel path length statistics over the detector image.
#[derive(Clone, Debug)]
pub struct Detector {
    /// Image width in pixels.
    pub width: usize,

    /// Image height in pixels.
    pub height: usize,

    /// Pixel assignment.
    binning: Binning,

    /// Number of records per pixel.
    count: Vec<u32>,

    /// Sum of path lengths per pixel.
    distance_sum: Vec<f64>,

    /// Shortest path length seen.
    min_distance: f64,

    /// Longest path length seen.
    max_distance: f64,
}

impl Detector {
    /// Returns an empty detector.
    ///
    /// * `width`  - Image width in pixels.
    /// * `height` - Image height in pixels.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            binning: Binning::default(),
            count: vec![0; width * height],
            distance_sum: vec![0.0; width * height],
            min_distance: f64::INFINITY,
            max_distance: 0.0,
        }
    }

    /// Sets the pixel assignment.
    ///
    /// * `binning` - Flash or scan binning.
    pub fn with_binning(mut self, binning: Binning) -> Self {
        self.binning = binning;
        self
    }

    /// Returns the pixel assignment.
    pub fn binning(&self) -> Binning {
        self.binning
    }

    fn offset(&self, p: Point2i) -> Option<usize> {
        let x = usize::try_from(p.x).ok().filter(|&x| x < self.width)?;
        let y = usize::try_from(p.y).ok().filter(|&y| y < self.height)?;
        Some(y * self.width + x)
    }

    /// Adds a record. Records with zero bounces, without a pixel under the
    /// binning mode or outside the image are ignored. Returns true if the
    /// record was binned.
    ///
    /// * `record` - The record.
    pub fn add(&mut self, record: &PathRecord) -> bool {
        if record.bounces == 0 {
            return false;
        }
        let pixel = match self.binning {
            Binning::Flash => record.detector,
            Binning::Scan => Some(record.pixel),
        };
        let Some(i) = pixel.and_then(|p| self.offset(p)) else {
            return false;
        };

        let d = record.distance as f64;
        self.count[i] += 1;
        self.distance_sum[i] += d;
        self.min_distance = self.min_distance.min(d);
        self.max_distance = self.max_distance.max(d);
        true
    }

    /// Adds every record in a batch.
    ///
    /// * `records` - The records.
    pub fn add_all(&mut self, records: &[PathRecord]) {
        records.iter().for_each(|r| {
            self.add(r);
        });
    }

    /// Returns the number of records binned into a pixel.
    ///
    /// * `p` - The pixel.
    pub fn count(&self, p: Point2i) -> u32 {
        self.offset(p).map_or(0, |i| self.count[i])
    }

    /// Returns the range of path lengths seen, or `None` if nothing was binned.
    pub fn distance_range(&self) -> Option<(f64, f64)> {
        (self.min_distance <= self.max_distance).then_some((self.min_distance, self.max_distance))
    }

    /// Returns the mean path length per pixel in row-major order; 0 where no
    /// record landed.
    pub fn depth_image(&self) -> Vec<f64> {
        self.count
            .iter()
            .zip(self.distance_sum.iter())
            .map(|(&n, &sum)| if n == 0 { 0.0 } else { sum / n as f64 })
            .collect()
    }

    /// Writes the depth image as a 16-bit grayscale PNG. Nearer pixels are
    /// brighter and empty pixels are black.
    ///
    /// * `path` - Output file path.
    pub fn write_depth_image(&self, path: &Path) -> Result<()> {
        info!(
            "Writing depth image {} with resolution {}x{}",
            path.display(),
            self.width,
            self.height
        );

        let depth = self.depth_image();
        let (lo, hi) = self.distance_range().unwrap_or((0.0, 0.0));
        let range = hi - lo;

        let imgbuf = ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            let i = y as usize * self.width + x as usize;
            if self.count[i] == 0 {
                Luma([0_u16])
            } else {
                let t = if range > 0.0 { (depth[i] - lo) / range } else { 0.0 };
                let v = clamp(1.0 - t, 0.0, 1.0) * u16::MAX as f64;
                Luma([v.round() as u16])
            }
        });

        imgbuf
            .save_with_format(path, ImageFormat::Png)
            .map_err(|err| Error::Image(format!("Error saving depth image {}: {err}", path.display())))
    }
}
