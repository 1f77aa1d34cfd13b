use crate::state::SimulationState;
use anyhow::Result;
use estimator_common::Sample;
use rand::distr::Uniform;
use rand::prelude::*;

/// One tick's worth of classified samples, partitioned for rendering.
/// The lists are transient: they live for a single tick and are dropped
/// once the renderer has consumed them.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub inside: Vec<Sample>,
    pub outside: Vec<Sample>,
}

impl BatchResult {
    pub fn drawn_count(&self) -> u64 {
        (self.inside.len() + self.outside.len()) as u64
    }

    pub fn inside_count(&self) -> u64 {
        self.inside.len() as u64
    }
}

/// Draws uniform samples over the bounding square and classifies them
/// against the unit disk.
pub struct Sampler {
    /// Host-side RNG; seeded from the config for reproducible runs.
    rng: StdRng,
    coord_dist: Uniform<f64>,
}

impl Sampler {
    /// Creates a sampler. A configured seed gives a reproducible sample
    /// sequence; without one the RNG is seeded from OS entropy.
    pub fn new(seed: Option<u64>) -> Result<Self> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let coord_dist = Uniform::new_inclusive(-1.0f64, 1.0f64)?;
        Ok(Self { rng, coord_dist })
    }

    /// Draws `count` independent samples (x then y per point), classifies
    /// each, and folds the counts into `state`.
    pub fn draw_batch(&mut self, count: u32, state: &mut SimulationState) -> BatchResult {
        let samples: Vec<Sample> = (0..count)
            .map(|_| {
                let x = self.rng.sample(self.coord_dist);
                let y = self.rng.sample(self.coord_dist);
                Sample::new(x, y)
            })
            .collect();
        Self::classify_batch(&samples, state)
    }

    /// Classifies a prepared sample list and folds the counts into `state`.
    /// This is the second half of `draw_batch`, split out so a known
    /// coordinate sequence can be pushed through the estimator directly.
    pub fn classify_batch(samples: &[Sample], state: &mut SimulationState) -> BatchResult {
        let mut batch = BatchResult {
            inside: Vec::with_capacity(samples.len()),
            outside: Vec::new(),
        };
        for &sample in samples {
            if sample.is_inside_unit_disk() {
                batch.inside.push(sample);
            } else {
                batch.outside.push(sample);
            }
        }
        state.record_batch(samples.len() as u64, batch.inside.len() as u64);
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sequence_classifies_exactly() {
        let samples = [
            Sample::new(0.5, 0.5),
            Sample::new(0.9, 0.9),
            Sample::new(-0.1, 0.1),
            Sample::new(0.95, -0.8),
        ];
        let mut state = SimulationState::new();
        let batch = Sampler::classify_batch(&samples, &mut state);

        assert_eq!(batch.inside, vec![Sample::new(0.5, 0.5), Sample::new(-0.1, 0.1)]);
        assert_eq!(batch.outside, vec![Sample::new(0.9, 0.9), Sample::new(0.95, -0.8)]);
        assert_eq!(state.total_points, 4);
        assert_eq!(state.points_inside, 2);
        assert_eq!(state.estimate, 2.0);
    }

    #[test]
    fn boundary_sample_lands_inside() {
        let mut state = SimulationState::new();
        let batch = Sampler::classify_batch(&[Sample::new(1.0, 0.0)], &mut state);
        assert_eq!(batch.inside_count(), 1);
        assert_eq!(state.points_inside, 1);
    }

    #[test]
    fn draws_stay_inside_the_square() {
        let mut sampler = Sampler::new(Some(1)).unwrap();
        let mut state = SimulationState::new();
        let batch = sampler.draw_batch(2000, &mut state);
        for sample in batch.inside.iter().chain(batch.outside.iter()) {
            assert!((-1.0..=1.0).contains(&sample.x));
            assert!((-1.0..=1.0).contains(&sample.y));
        }
        assert_eq!(batch.drawn_count(), 2000);
        assert_eq!(state.total_points, 2000);
    }

    #[test]
    fn one_batch_equals_many_single_sample_batches() {
        let mut batched = Sampler::new(Some(42)).unwrap();
        let mut batched_state = SimulationState::new();
        batched.draw_batch(64, &mut batched_state);

        let mut incremental = Sampler::new(Some(42)).unwrap();
        let mut incremental_state = SimulationState::new();
        for _ in 0..64 {
            incremental.draw_batch(1, &mut incremental_state);
        }

        assert_eq!(batched_state, incremental_state);
    }

    #[test]
    fn seeded_samplers_reproduce_the_same_run() {
        let mut first = Sampler::new(Some(9)).unwrap();
        let mut first_state = SimulationState::new();
        let first_batch = first.draw_batch(500, &mut first_state);

        let mut second = Sampler::new(Some(9)).unwrap();
        let mut second_state = SimulationState::new();
        let second_batch = second.draw_batch(500, &mut second_state);

        assert_eq!(first_batch.inside, second_batch.inside);
        assert_eq!(first_batch.outside, second_batch.outside);
        assert_eq!(first_state, second_state);
    }
}
