//! Random Walk Integrator

use crate::Scene;
use simcore::geometry::*;
use simcore::pbrt::*;
use simcore::rng::RNG;
use simcore::{
    stat_counter, stat_dist, stat_float_distribution, stat_inc, stat_int_distribution, stat_percent, stat_register_fns,
};

stat_percent!(
    "Integrator/Paths reaching an emitter",
    EMITTER_HITS,
    PATHS_TRACED,
    random_walk_stats_emitter_hits,
);
stat_counter!("Integrator/Absorbed paths", ABSORBED_PATHS, random_walk_stats_absorbed_paths);
stat_int_distribution!("Integrator/Bounces per successful path", BOUNCES, random_walk_stats_bounces);
stat_float_distribution!("Integrator/Length of successful paths", PATH_LENGTH, random_walk_stats_path_length);
stat_counter!("Integrator/Records dropped", RECORDS_DROPPED, random_walk_stats_records_dropped);

stat_register_fns!(
    random_walk_stats_emitter_hits,
    random_walk_stats_absorbed_paths,
    random_walk_stats_bounces,
    random_walk_stats_path_length,
    random_walk_stats_records_dropped,
);

/// Default maximum number of bounces.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Default survival threshold of `Termination::Absorption`.
pub const DEFAULT_ABSORPTION: Float = 0.9;

/// Bounces exempt from Russian roulette.
pub const DEFAULT_RR_MIN_BOUNCES: usize = 3;

/// How a path is stochastically cut short at each surface it strikes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Termination {
    /// The path is lost when a uniform sample exceeds `threshold`. The weight
    /// of surviving paths is not adjusted.
    Absorption { threshold: Float },

    /// After `min_bounces` the path survives with probability `max_survival`
    /// and its weight is divided by it.
    RussianRoulette { min_bounces: usize, max_survival: Float },
}

impl Default for Termination {
    fn default() -> Self {
        Self::Absorption {
            threshold: DEFAULT_ABSORPTION,
        }
    }
}

impl Termination {
    /// Returns the factor to scale the path weight by if the path survives
    /// the current surface, or `None` if it is terminated.
    ///
    /// * `bounces` - Surfaces struck before this one.
    /// * `rng`     - Random number stream of the lane.
    fn survive(&self, bounces: usize, rng: &mut RNG) -> Option<Float> {
        match *self {
            Self::Absorption { threshold } => (rng.uniform_float() <= threshold).then_some(1.0),
            Self::RussianRoulette {
                min_bounces,
                max_survival,
            } => {
                if bounces < min_bounces {
                    Some(1.0)
                } else if rng.uniform_float() < max_survival {
                    Some(1.0 / max_survival)
                } else {
                    None
                }
            }
        }
    }
}

/// Outcome of one random walk.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathResult {
    /// True if the path ended on an emitter.
    pub hit: bool,

    /// Surfaces struck, including the emitter.
    pub bounces: Int,

    /// Total distance travelled.
    pub distance: Float,

    /// Position of the last surface struck.
    pub position: Point3f,

    /// Direction of the ray that struck the last surface.
    pub direction: Vector3f,

    /// Monte-Carlo weight.
    pub weight: Float,
}

impl Default for PathResult {
    fn default() -> Self {
        Self {
            hit: false,
            bounces: 0,
            distance: 0.0,
            position: Point3f::ZERO,
            direction: Vector3f::ZERO,
            weight: 1.0,
        }
    }
}

/// Simulates paths that bounce between diffuse surfaces until they reach an
/// emitter, escape the scene, are terminated or run out of bounces.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomWalkIntegrator {
    /// Maximum number of surfaces a path may strike.
    max_depth: usize,

    /// Stochastic termination policy.
    termination: Termination,
}

impl Default for RandomWalkIntegrator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH, Termination::default())
    }
}

impl RandomWalkIntegrator {
    /// Create a new `RandomWalkIntegrator`.
    ///
    /// * `max_depth`   - Maximum number of bounces.
    /// * `termination` - Stochastic termination policy.
    pub fn new(max_depth: usize, termination: Termination) -> Self {
        register_stats();
        Self { max_depth, termination }
    }

    /// Returns the maximum number of bounces.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the termination policy.
    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Follows one path from an initial ray. Only `rng` is mutated.
    ///
    /// * `scene` - The scene.
    /// * `ray`   - Initial ray with a unit direction.
    /// * `rng`   - Random number stream of the lane.
    pub fn walk(&self, scene: &Scene, ray: &Ray, rng: &mut RNG) -> PathResult {
        stat_inc!(PATHS_TRACED, 1);

        let mut ray = *ray;
        let mut result = PathResult::default();

        for depth in 0..self.max_depth {
            let Some(isect) = scene.intersect(&ray) else {
                break;
            };

            let Some(factor) = self.termination.survive(depth, rng) else {
                stat_inc!(ABSORBED_PATHS, 1);
                break;
            };
            result.weight *= factor;

            result.distance += isect.p.distance(&ray.o);
            result.bounces += 1;
            result.position = isect.p;
            result.direction = ray.d;

            let Some(material) = usize::try_from(isect.object).ok().and_then(|o| scene.material(o)) else {
                debug!("Intersection with object {} has no material", isect.object);
                break;
            };

            if material.is_emissive() {
                result.hit = true;
                stat_inc!(EMITTER_HITS, 1);
                stat_dist!(BOUNCES, result.bounces as i64);
                stat_dist!(PATH_LENGTH, result.distance as f64);
                return result;
            }

            let wo = material.sample(&isect.n, &rng.uniform_point2());
            ray = Ray::new(isect.p, wo);
        }

        result
    }
}
