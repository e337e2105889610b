//! The single divide-by-zero guard used for every distribution in the
//! pipeline.

/// Outcome of [`safe_renormalize`].
#[derive(Debug, Clone, PartialEq)]
pub enum SafeNormalized {
    /// Weights rescaled to sum to 1.
    Normalized(Vec<f64>),
    /// Total mass was zero, negative or not finite; nothing to rescale.
    Degenerate,
}

impl SafeNormalized {
    /// Resolve to a weight vector of length `len`, using all zeros for the
    /// degenerate case.
    #[must_use]
    pub fn into_weights_or_zero(self, len: usize) -> Vec<f64> {
        match self {
            SafeNormalized::Normalized(weights) => weights,
            SafeNormalized::Degenerate => vec![0.0; len],
        }
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        matches!(self, SafeNormalized::Degenerate)
    }
}

/// Rescale `weights` so they sum to 1.
///
/// Returns [`SafeNormalized::Degenerate`] when the sum is not a positive
/// finite number (including the empty slice).
#[must_use]
pub fn safe_renormalize(weights: &[f64]) -> SafeNormalized {
    let total: f64 = weights.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return SafeNormalized::Degenerate;
    }
    SafeNormalized::Normalized(weights.iter().map(|w| w / total).collect())
}

/// Element-wise mean of equally sized vectors. Returns `None` for an empty
/// input.
#[must_use]
pub fn mean_vector<'a, I>(vectors: I, len: usize) -> Option<Vec<f64>>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut sum = vec![0.0; len];
    let mut count = 0_usize;
    for v in vectors {
        for (acc, x) in sum.iter_mut().zip(v) {
            *acc += x;
        }
        count += 1;
    }
    if count == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let denom = count as f64;
    Some(sum.into_iter().map(|s| s / denom).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_unit_sum() {
        let SafeNormalized::Normalized(w) = safe_renormalize(&[1.0, 3.0]) else {
            panic!("expected normalized weights");
        };
        assert!((w[0] - 0.25).abs() < 1e-12);
        assert!((w[1] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn zero_mass_is_degenerate() {
        let result = safe_renormalize(&[0.0, 0.0, 0.0]);
        assert!(result.is_degenerate());
        assert_eq!(result.into_weights_or_zero(3), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn non_finite_mass_is_degenerate() {
        assert!(safe_renormalize(&[f64::NAN, 1.0]).is_degenerate());
        assert!(safe_renormalize(&[f64::INFINITY, 1.0]).is_degenerate());
    }

    #[test]
    fn negative_mass_is_degenerate() {
        assert!(safe_renormalize(&[0.5, -1.0]).is_degenerate());
    }

    #[test]
    fn empty_slice_is_degenerate() {
        assert!(safe_renormalize(&[]).is_degenerate());
    }

    #[test]
    fn mean_vector_averages_elementwise() {
        let a = [0.2, 0.8];
        let b = [0.6, 0.4];
        let mean = mean_vector([&a[..], &b[..]], 2).unwrap();
        assert!((mean[0] - 0.4).abs() < 1e-12);
        assert!((mean[1] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn mean_vector_of_nothing_is_none() {
        assert!(mean_vector(std::iter::empty::<&[f64]>(), 4).is_none());
    }
}
