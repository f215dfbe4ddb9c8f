//! Normalization of non-negative vectors onto the L1 ball.
//!
//! The main entry point is [`project_l1`], which computes the exact Euclidean projection of a
//! non-negative vector onto the L1 ball of a given radius by soft-thresholding, following
//! Duchi et al., "Efficient projections onto the l1-ball for learning in high dimensions" (2008).
//! The projection runs in O(n log n), dominated by a sort.
//!
//! # Contract
//!
//! **All entries of the input must be non-negative.** This is not checked: a negative entry
//! silently produces a vector which is not the projection.
//!
//! # Example
//!
//! ```rust
//! use rusty_sorn::projection::project_l1;
//!
//! let mut x = vec![3.0, 1.0, 0.0, 2.0];
//! project_l1(&mut x, 2.0).unwrap();
//! assert_eq!(x, vec![1.5, 0.0, 0.0, 0.5]);
//! ```
use itertools::Itertools;

use crate::error::SORNError;

/// Returns the sum of the entries, i.e., the L1 norm of a non-negative vector.
pub fn l1_norm(x: &[f64]) -> f64 {
    x.iter().sum()
}

fn check_radius(radius: f64) -> Result<(), SORNError> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(SORNError::InvalidParameter(format!(
            "the radius of the L1 ball must be non-negative and finite (got {})",
            radius
        )));
    }
    Ok(())
}

/// Project (in place) a non-negative vector onto the L1 ball of the given radius.
///
/// Vectors already inside the ball are left unchanged. Otherwise, every entry is replaced by
/// `max(0, x_i - theta)` where the threshold `theta` is the unique value making the result sum to
/// the radius. The function returns an error if the radius is negative or not finite.
pub fn project_l1(x: &mut [f64], radius: f64) -> Result<(), SORNError> {
    check_radius(radius)?;

    if l1_norm(x) <= radius {
        return Ok(());
    }

    if radius == 0.0 {
        x.iter_mut().for_each(|xi| *xi = 0.0);
        return Ok(());
    }

    // Largest rho such that the rho-th largest entry survives the threshold.
    // The largest entry always survives, even when the radius is lost to rounding against it.
    let sorted = x.iter().copied().sorted_by(|a, b| b.total_cmp(a)).collect::<Vec<f64>>();
    let mut cum_sum = sorted[0];
    let mut rho = 1;
    for (j, &u) in sorted.iter().enumerate().skip(1) {
        if u > (cum_sum + u - radius) / (j + 1) as f64 {
            cum_sum += u;
            rho = j + 1;
        } else {
            break;
        }
    }

    let theta = ((cum_sum - radius) / rho as f64).max(0.0);
    x.iter_mut().for_each(|xi| *xi = (*xi - theta).max(0.0));
    Ok(())
}

/// Rescale (in place) a non-negative vector linearly so that its entries sum to the target norm.
///
/// Unlike [`project_l1`], vectors inside the ball are scaled up as well. A vector summing to zero
/// is left unchanged since it has no direction to rescale. The function returns an error if the
/// target norm is negative or not finite.
pub fn normalize_l1_linear(x: &mut [f64], target_norm: f64) -> Result<(), SORNError> {
    check_radius(target_norm)?;

    let sum = l1_norm(x);
    if sum == 0.0 {
        return Ok(());
    }
    x.iter_mut().for_each(|xi| *xi = target_norm * *xi / sum);
    Ok(())
}
