//! Geometric skip sampling for sparse noise events.

use rand::Rng;

/// Batched geometric sampler.
///
/// Instead of drawing one Bernoulli variable per shot, draws the gap to the
/// next shot in which a channel with probability `p` fires.
pub struct GeometricSampler {
    log_one_minus_p: f64,
    skip_buffer: [usize; Self::BATCH_SIZE],
    buffer_index: usize,
}

impl GeometricSampler {
    const BATCH_SIZE: usize = 256;

    /// Create a sampler for events occurring with probability `p` in `(0, 1]`.
    pub fn new(p: f64) -> Self {
        debug_assert!(p > 0.0 && p <= 1.0, "p must be in (0, 1], got {p}");
        // ln(0) = -inf for p = 1 gives a skip of 0 for every draw.
        Self {
            log_one_minus_p: (1.0 - p).ln(),
            skip_buffer: [0; Self::BATCH_SIZE],
            buffer_index: Self::BATCH_SIZE,
        }
    }

    /// Number of shots to skip before the next event.
    pub fn next_skip<R: Rng>(&mut self, rng: &mut R) -> usize {
        if self.buffer_index >= Self::BATCH_SIZE {
            self.refill(rng);
        }
        let skip = self.skip_buffer[self.buffer_index];
        self.buffer_index += 1;
        skip
    }

    /// Call `hit` for every shot in `0..shots` in which the event fires.
    pub fn for_each_hit<R: Rng>(
        &mut self,
        shots: usize,
        rng: &mut R,
        mut hit: impl FnMut(usize, &mut R),
    ) {
        let mut shot = self.next_skip(rng);
        while shot < shots {
            hit(shot, &mut *rng);
            shot = shot.saturating_add(1).saturating_add(self.next_skip(rng));
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn refill<R: Rng>(&mut self, rng: &mut R) {
        for skip in &mut self.skip_buffer {
            let uniform: f64 = rng.gen_range(0.0..1.0);
            // Saturating float-to-int cast: ln(0) / ln(1 - p) is +inf.
            *skip = (uniform.ln() / self.log_one_minus_p).floor() as usize;
        }
        self.buffer_index = 0;
    }
}
