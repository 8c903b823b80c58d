//! Zero-safe spectral index operators and threshold predicates
//!
//! All operators work elementwise over equally shaped arrays of any
//! dimensionality and keep the floating-point type of their inputs.
//! Mismatched shapes are a programming error and panic, as with ndarray's
//! own elementwise arithmetic.

use ndarray::{Array, ArrayBase, Data, Dimension, Zip};
use num_traits::Float;

/// `a / b`, defined as 0 wherever `b == 0`
pub fn generalized_ratio<A, S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> Array<A, D>
where
    A: Float,
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
    D: Dimension,
{
    Zip::from(a).and(b).map_collect(|&x, &y| {
        if y == A::zero() {
            A::zero()
        } else {
            x / y
        }
    })
}

/// `(a - b) / (a + b)`, with machine epsilon substituted for a zero denominator
pub fn normalized_difference<A, S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> Array<A, D>
where
    A: Float,
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
    D: Dimension,
{
    Zip::from(a).and(b).map_collect(|&x, &y| {
        let sum = x + y;
        let denominator = if sum == A::zero() { A::epsilon() } else { sum };
        (x - y) / denominator
    })
}

/// `v > threshold`
pub fn above<A, S, D>(a: &ArrayBase<S, D>, threshold: A) -> Array<bool, D>
where
    A: Float,
    S: Data<Elem = A>,
    D: Dimension,
{
    a.map(|&v| v > threshold)
}

/// `v >= threshold`
pub fn at_least<A, S, D>(a: &ArrayBase<S, D>, threshold: A) -> Array<bool, D>
where
    A: Float,
    S: Data<Elem = A>,
    D: Dimension,
{
    a.map(|&v| v >= threshold)
}

/// `v < threshold`
pub fn below<A, S, D>(a: &ArrayBase<S, D>, threshold: A) -> Array<bool, D>
where
    A: Float,
    S: Data<Elem = A>,
    D: Dimension,
{
    a.map(|&v| v < threshold)
}

/// `v <= threshold`
pub fn at_most<A, S, D>(a: &ArrayBase<S, D>, threshold: A) -> Array<bool, D>
where
    A: Float,
    S: Data<Elem = A>,
    D: Dimension,
{
    a.map(|&v| v <= threshold)
}

/// `lower <= v <= upper`
pub fn within<A, S, D>(a: &ArrayBase<S, D>, lower: A, upper: A) -> Array<bool, D>
where
    A: Float,
    S: Data<Elem = A>,
    D: Dimension,
{
    a.map(|&v| v >= lower && v <= upper)
}

/// Raw digital numbers equal to the saturation sentinel
pub fn saturated<A, S, D>(raw: &ArrayBase<S, D>, sentinel: A) -> Array<bool, D>
where
    A: Float,
    S: Data<Elem = A>,
    D: Dimension,
{
    raw.map(|&v| v == sentinel)
}

/// Population mean and standard deviation; (0, 0) for an empty array
pub fn mean_std<A, S, D>(a: &ArrayBase<S, D>) -> (f64, f64)
where
    A: Float,
    S: Data<Elem = A>,
    D: Dimension,
{
    let n = a.len();
    if n == 0 {
        return (0.0, 0.0);
    }

    let values = a.iter().map(|v| v.to_f64().unwrap_or(f64::NAN));
    let mean = values.clone().sum::<f64>() / n as f64;
    let variance = values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;

    (mean, variance.sqrt())
}

/// Whether any pixel of a mask is set
pub fn any<S, D>(mask: &ArrayBase<S, D>) -> bool
where
    S: Data<Elem = bool>,
    D: Dimension,
{
    mask.iter().any(|&v| v)
}

/// Number of set pixels in a mask
pub fn count<S, D>(mask: &ArrayBase<S, D>) -> usize
where
    S: Data<Elem = bool>,
    D: Dimension,
{
    mask.iter().filter(|&&v| v).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array3};

    #[test]
    fn test_generalized_ratio_zero_safe() {
        let a = array![[1.0f32, 2.0, 3.0], [4.0, 0.0, -6.0]];
        let b = array![[2.0f32, 0.0, 1.5], [0.0, 0.0, 3.0]];
        let ratio = generalized_ratio(&a, &b);

        assert!(ratio.iter().all(|v| v.is_finite()));
        assert_eq!(ratio, array![[0.5, 0.0, 2.0], [0.0, 0.0, -2.0]]);
    }

    #[test]
    fn test_normalized_difference_finite_on_zero_sum() {
        let a = array![[0.0f64, 1.0, 0.3], [-0.2, 0.5, 0.0]];
        let b = array![[0.0f64, 1.0, 0.1], [0.2, 0.0, 0.0]];
        let ndi = normalized_difference(&a, &b);

        assert!(ndi.iter().all(|v| v.is_finite()));
        assert_relative_eq!(ndi[[0, 0]], 0.0);
        assert_relative_eq!(ndi[[0, 1]], 0.0);
        assert_relative_eq!(ndi[[0, 2]], 0.5, epsilon = 1e-12);
        assert_relative_eq!(ndi[[1, 1]], 1.0);
        // a + b == 0 with a != b saturates to a large finite magnitude
        assert!(ndi[[1, 0]] < -1e10);
    }

    #[test]
    fn test_primitives_broadcast_over_any_dimension() {
        let a = Array3::<f32>::from_elem((2, 3, 4), 3.0);
        let b = Array3::<f32>::from_elem((2, 3, 4), 1.0);
        assert_eq!(generalized_ratio(&a, &b).dim(), (2, 3, 4));
        assert!(normalized_difference(&a, &b).iter().all(|&v| (v - 0.5).abs() < 1e-6));

        let v = ndarray::arr1(&[1.0f64, 0.0]);
        let w = ndarray::arr1(&[0.0f64, 0.0]);
        assert_eq!(generalized_ratio(&v, &w), ndarray::arr1(&[0.0, 0.0]));
    }

    #[test]
    fn test_threshold_predicates() {
        let a = array![[0.8f32, 1.0, 1.2]];
        assert_eq!(above(&a, 1.0), array![[false, false, true]]);
        assert_eq!(at_least(&a, 1.0), array![[false, true, true]]);
        assert_eq!(below(&a, 1.0), array![[true, false, false]]);
        assert_eq!(at_most(&a, 1.0), array![[true, true, false]]);
        assert_eq!(within(&a, 0.8, 1.0), array![[true, true, false]]);
    }

    #[test]
    fn test_saturation_sentinel() {
        let raw = array![[65535.0f32, 100.0], [0.0, 65535.0]];
        assert_eq!(saturated(&raw, 65535.0), array![[true, false], [false, true]]);
    }

    #[test]
    fn test_mean_std() {
        let a = array![[2.0f32, 4.0], [4.0, 4.0], [5.0, 5.0], [7.0, 9.0]];
        let (mean, std) = mean_std(&a);
        assert_relative_eq!(mean, 5.0);
        assert_relative_eq!(std, 2.0);

        let empty = Array3::<f32>::zeros((0, 2, 2));
        assert_eq!(mean_std(&empty), (0.0, 0.0));
    }

    #[test]
    fn test_mask_counts() {
        let mask = array![[true, false], [false, true]];
        assert!(any(&mask));
        assert_eq!(count(&mask), 2);
        assert!(!any(&array![[false, false]]));
    }
}
