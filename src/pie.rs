//! Pie chart geometry for the terminal canvas.
//!
//! Slices start at twelve o'clock and run clockwise in breakdown order.

use std::f64::consts::{FRAC_PI_2, TAU};

/// Cumulative end fraction of each slice; non-positive values get no area.
pub fn slice_bounds(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let mut acc = 0.0;
    values
        .iter()
        .map(|v| {
            acc += v.max(0.0) / total;
            acc
        })
        .collect()
}

/// Clockwise fraction of a full turn from twelve o'clock, in `[0, 1)`.
fn turn_fraction(x: f64, y: f64) -> f64 {
    let angle = FRAC_PI_2 - y.atan2(x);
    angle.rem_euclid(TAU) / TAU
}

/// Index of the slice covering the point `(x, y)` of a unit pie.
pub fn slice_at(bounds: &[f64], x: f64, y: f64) -> Option<usize> {
    if bounds.is_empty() || x * x + y * y > 1.0 {
        return None;
    }
    let t = turn_fraction(x, y);
    bounds
        .iter()
        .position(|end| t < *end)
        .or(Some(bounds.len() - 1))
}

/// Samples a unit pie on a `resolution` × `resolution` grid and groups the
/// sample points by slice.
pub fn sample_points(values: &[f64], resolution: usize) -> Vec<Vec<(f64, f64)>> {
    let bounds = slice_bounds(values);
    let mut slices = vec![Vec::new(); values.len()];
    if bounds.is_empty() || resolution < 2 {
        return slices;
    }

    let step = 2.0 / (resolution - 1) as f64;
    for row in 0..resolution {
        let y = -1.0 + row as f64 * step;
        for col in 0..resolution {
            let x = -1.0 + col as f64 * step;
            if let Some(i) = slice_at(&bounds, x, y) {
                slices[i].push((x, y));
            }
        }
    }
    slices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_bounds() {
        assert_eq!(slice_bounds(&[1.0, 1.0, 2.0]), vec![0.25, 0.5, 1.0]);
        assert_eq!(slice_bounds(&[0.0, 3.0]), vec![0.0, 1.0]);
        assert!(slice_bounds(&[]).is_empty());
        assert!(slice_bounds(&[0.0, -1.0]).is_empty());
    }

    #[test]
    fn test_slice_at_runs_clockwise_from_top() {
        let bounds = slice_bounds(&[1.0, 1.0, 1.0, 1.0]);
        // Just right of twelve o'clock, then the right, bottom and left quadrants.
        assert_eq!(slice_at(&bounds, 0.1, 0.9), Some(0));
        assert_eq!(slice_at(&bounds, 0.5, -0.1), Some(1));
        assert_eq!(slice_at(&bounds, -0.1, -0.5), Some(2));
        assert_eq!(slice_at(&bounds, -0.5, 0.1), Some(3));
        assert_eq!(slice_at(&bounds, 0.9, 0.9), None);
    }

    #[test]
    fn test_sample_points_proportional() {
        let slices = sample_points(&[3.0, 1.0], 41);
        assert_eq!(slices.len(), 2);
        let (big, small) = (slices[0].len() as f64, slices[1].len() as f64);
        let share = big / (big + small);
        assert!((share - 0.75).abs() < 0.05, "share was {share}");
    }

    #[test]
    fn test_single_slice_fills_disc() {
        let slices = sample_points(&[1500.005], 21);
        assert!(!slices[0].is_empty());
        assert!(slices[0].iter().all(|(x, y)| x * x + y * y <= 1.0));
    }

    #[test]
    fn test_nothing_to_draw() {
        let slices = sample_points(&[0.0, 0.0], 21);
        assert!(slices.iter().all(Vec::is_empty));
    }
}
