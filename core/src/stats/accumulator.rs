//! Statistics Accumulator

use crate::pbrt;
use num_traits::{Num, Zero};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::ops::AddAssign;
use std::sync::{Mutex, OnceLock};

/// Return the global statistics accumulator.
pub fn stats_accumulator() -> &'static Mutex<StatsAccumulator> {
    static DATA: OnceLock<Mutex<StatsAccumulator>> = OnceLock::new();
    DATA.get_or_init(|| Mutex::new(StatsAccumulator::default()))
}

/// Distribution statistic.
#[derive(Default, Clone, Debug)]
pub struct StatsDistribution<T>
where
    T: Num + Default + Copy + Clone,
{
    /// Sum of all values.
    sum: T,

    /// Count of all values.
    count: u64,

    /// Minimum value.
    min: Option<T>,

    /// Maximum value.
    max: Option<T>,
}

impl<T> StatsDistribution<T>
where
    T: Num + Zero + PartialOrd + AddAssign + Default + Copy + Clone,
{
    /// Merge another distribution into this one.
    ///
    /// * `other` - The distribution to merge.
    pub fn accumulate(&mut self, other: Self) {
        self.sum += other.sum;
        self.count += other.count;
        self.min = merge(self.min, other.min, pbrt::min);
        self.max = merge(self.max, other.max, pbrt::max);
    }

    /// Report a sample value.
    ///
    /// * `val`  - Sample value.
    pub fn report(&mut self, val: T) {
        self.sum += val;
        self.count += 1;
        self.min = merge(self.min, Some(val), pbrt::min);
        self.max = merge(self.max, Some(val), pbrt::max);
    }

    /// Returns the number of samples.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Clear stats.
    pub fn clear(&mut self) {
        self.sum = T::zero();
        self.count = 0;
        self.min = None;
        self.max = None;
    }
}

fn merge<T: Copy>(a: Option<T>, b: Option<T>, f: fn(T, T) -> T) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(f(a, b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Aggregate different types of statistics. Names use `/` to separate a
/// category from the title, e.g. "BVH/Interior nodes".
#[derive(Default, Debug)]
pub struct StatsAccumulator {
    /// Counters.
    counters: BTreeMap<String, i64>,

    /// Memory counters.
    memory_counters: BTreeMap<String, u64>,

    /// Integer distribution.
    int_distribution: BTreeMap<String, StatsDistribution<i64>>,

    /// Float distribution.
    float_distribution: BTreeMap<String, StatsDistribution<f64>>,

    /// Percentages.
    percentages: BTreeMap<String, (i64, i64)>,

    /// Ratios.
    ratios: BTreeMap<String, (i64, i64)>,
}

impl StatsAccumulator {
    /// Accumulates a counter value.
    ///
    /// * `name` - Statistic name.
    /// * `val`  - Counter value.
    pub fn report_counter(&mut self, name: &str, val: i64) {
        *self.counters.entry(name.to_string()).or_insert(0) += val;
    }

    /// Accumulates a memory counter value.
    ///
    /// * `name` - Statistic name.
    /// * `val`  - Memory counter value.
    pub fn report_memory_counter(&mut self, name: &str, val: u64) {
        *self.memory_counters.entry(name.to_string()).or_insert(0) += val;
    }

    /// Accumulates integer distribution samples.
    ///
    /// * `name`    - Statistic name.
    /// * `distrib` - Distribution.
    pub fn report_int_distribution(&mut self, name: &str, distrib: StatsDistribution<i64>) {
        self.int_distribution
            .entry(name.to_string())
            .or_default()
            .accumulate(distrib);
    }

    /// Accumulates floating point distribution samples.
    ///
    /// * `name`    - Statistic name.
    /// * `distrib` - Distribution.
    pub fn report_float_distribution(&mut self, name: &str, distrib: StatsDistribution<f64>) {
        self.float_distribution
            .entry(name.to_string())
            .or_default()
            .accumulate(distrib);
    }

    /// Accumulates a percentage value.
    ///
    /// * `name`  - Statistic name.
    /// * `num`   - Numerator (actual count).
    /// * `denom` - Denominator (total count).
    pub fn report_percentage(&mut self, name: &str, num: i64, denom: i64) {
        let v = self.percentages.entry(name.to_string()).or_insert((0, 0));
        v.0 += num;
        v.1 += denom;
    }

    /// Accumulates a ratio value.
    ///
    /// * `name`  - Statistic name.
    /// * `num`   - Numerator.
    /// * `denom` - Denominator.
    pub fn report_ratio(&mut self, name: &str, num: i64, denom: i64) {
        let v = self.ratios.entry(name.to_string()).or_insert((0, 0));
        v.0 += num;
        v.1 += denom;
    }

    /// Returns the accumulated counter value.
    ///
    /// * `name` - Statistic name.
    pub fn counter(&self, name: &str) -> Option<i64> {
        self.counters.get(name).copied()
    }

    /// Returns the formatted report grouped by category.
    pub fn report(&self) -> String {
        let mut to_print: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut add = |name: &str, line: String| {
            let (category, title) = category_and_title(name);
            to_print
                .entry(category.to_string())
                .or_default()
                .push(format!("{title:<42}{line}"));
        };

        for (k, &v) in self.counters.iter().filter(|(_, &v)| v != 0) {
            add(k, format!("{v:>27}"));
        }

        for (k, &v) in self.memory_counters.iter().filter(|(_, &v)| v != 0) {
            let kb = v as f64 / 1024.0;
            let line = if kb < 1024.0 {
                format!("{kb:>24.2} kB")
            } else if kb < 1024.0 * 1024.0 {
                format!("{:>23.2} MiB", kb / 1024.0)
            } else {
                format!("{:>23.2} GiB", kb / (1024.0 * 1024.0))
            };
            add(k, line);
        }

        for (k, v) in self.int_distribution.iter().filter(|(_, v)| v.count > 0) {
            let avg = v.sum as f64 / v.count as f64;
            let mn = v.min.unwrap_or(i64::MAX);
            let mx = v.max.unwrap_or(i64::MIN);
            add(k, format!("{avg:>20.3} avg [range {mn} - {mx}]"));
        }

        for (k, v) in self.float_distribution.iter().filter(|(_, v)| v.count > 0) {
            let avg = v.sum / v.count as f64;
            let mn = v.min.unwrap_or(f64::MAX);
            let mx = v.max.unwrap_or(f64::MIN);
            add(k, format!("{avg:>20.3} avg [range {mn:.3} - {mx:.3}]"));
        }

        for (k, &(num, denom)) in self.percentages.iter().filter(|(_, v)| v.1 != 0) {
            let pct = 100.0 * num as f64 / denom as f64;
            add(k, format!("{num:>12} / {denom:>12} ({pct:.2}%)"));
        }

        for (k, &(num, denom)) in self.ratios.iter().filter(|(_, v)| v.1 != 0) {
            let ratio = num as f64 / denom as f64;
            add(k, format!("{num:>12} / {denom:>12} ({ratio:.2}x)"));
        }

        let mut s = String::from("Statistics:\n");
        for (category, items) in to_print {
            let _ = writeln!(s, "  {category}");
            for item in items {
                let _ = writeln!(s, "    {item}");
            }
        }
        s
    }

    /// Prints the report to stdout.
    pub fn print(&self) {
        print!("{}", self.report());
    }

    /// Clear the accumulated statistics.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Splits a statistic name at the first `/` and returns category and title.
/// If there is no `/`, then category is the empty string.
///
/// * `s` - The statistic name to split.
fn category_and_title(s: &str) -> (&str, &str) {
    s.split_once('/').unwrap_or(("", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let mut accum = StatsAccumulator::default();
        accum.report_counter("Walk/Paths", 3);
        accum.report_counter("Walk/Paths", 4);
        assert_eq!(accum.counter("Walk/Paths"), Some(7));
    }

    #[test]
    fn distribution_tracks_range() {
        let mut a = StatsDistribution::<i64>::default();
        a.report(3);
        a.report(1);
        let mut b = StatsDistribution::<i64>::default();
        b.report(9);
        a.accumulate(b);
        assert_eq!(a.count(), 3);
        assert_eq!(a.min, Some(1));
        assert_eq!(a.max, Some(9));
    }

    #[test]
    fn report_groups_by_category() {
        let mut accum = StatsAccumulator::default();
        accum.report_counter("BVH/Leaf nodes", 5);
        accum.report_percentage("Walk/Emitter hits", 1, 4);
        let s = accum.report();
        assert!(s.contains("  BVH\n"));
        assert!(s.contains("Leaf nodes"));
        assert!(s.contains("(25.00%)"));
    }

    #[test]
    fn zero_counters_are_skipped() {
        let mut accum = StatsAccumulator::default();
        accum.report_counter("BVH/Leaf nodes", 0);
        assert!(!accum.report().contains("Leaf nodes"));
    }
}
