// ============================================================
// Layer 4 — Train/Test Splitter
// ============================================================
// Shuffles records and cuts them into two contiguous sets:
//   - Training set: the first `round(n * fraction)` records
//   - Test set:     everything after
//
// The random generator is passed in. Exports seed it from the
// document content, so exporting the same document twice gives
// byte-identical files; tests seed it with a constant.
//
// The split is not stratified by label or answer group: every
// record goes into one pool, so a small class can end up
// entirely on one side.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom
//
// Reference: rand crate documentation

use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle `samples` with `rng` and split into (train, test).
///
/// `train_fraction` is clamped to `[0, 1]`.
///
/// # Example
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use squad2_editor::data::splitter::split_train_test;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let (train, test) = split_train_test((0..10).collect::<Vec<_>>(), 0.8, &mut rng);
/// assert_eq!((train.len(), test.len()), (8, 2));
/// ```
pub fn split_train_test<T, R>(mut samples: Vec<T>, train_fraction: f64, rng: &mut R) -> (Vec<T>, Vec<T>)
where
    R: Rng + ?Sized,
{
    samples.shuffle(rng);

    let fraction = if train_fraction.is_nan() { 0.0 } else { train_fraction.clamp(0.0, 1.0) };
    let total    = samples.len();
    let split_at = ((total as f64) * fraction).round() as usize;
    let split_at = split_at.min(total);

    let test = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} test ({}% / {}%)",
        samples.len(),
        test.len(),
        (samples.len() * 100) / total.max(1),
        (test.len()    * 100) / total.max(1),
    );

    (samples, test)
}
