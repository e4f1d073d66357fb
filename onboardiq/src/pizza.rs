//! Pizza geometry for the progress canvas.
//!
//! The unit disc is sampled on a square grid and each sample is assigned to a
//! slice. Slices start at 12 o'clock and run clockwise, in catalog order.

use std::f64::consts::TAU;

/// Sample spacing in canvas units; small enough to look solid in braille.
const DEFAULT_STEP: f64 = 0.035;

/// Pre-computed sample points for each slice.
#[derive(Debug, Clone)]
pub struct PizzaGeometry {
    slices: Vec<Vec<(f64, f64)>>,
}

impl PizzaGeometry {
    pub fn new(slice_count: usize) -> Self {
        Self::with_step(slice_count, DEFAULT_STEP)
    }

    pub fn with_step(slice_count: usize, step: f64) -> Self {
        let mut slices = vec![Vec::new(); slice_count];
        if slice_count == 0 || step <= 0.0 {
            return Self { slices };
        }

        let steps = (2.0 / step).ceil() as i64;
        for i in 0..=steps {
            for j in 0..=steps {
                let x = -1.0 + i as f64 * step;
                let y = -1.0 + j as f64 * step;
                if let Some(idx) = slice_index(x, y, slice_count) {
                    slices[idx].push((x, y));
                }
            }
        }

        Self { slices }
    }

    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }

    /// Sample points of slice `idx`, empty if out of range.
    pub fn slice(&self, idx: usize) -> &[(f64, f64)] {
        self.slices.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Which slice the point `(x, y)` of the unit disc falls in, or `None` if it
/// is outside the disc.
pub fn slice_index(x: f64, y: f64, slice_count: usize) -> Option<usize> {
    if slice_count == 0 || x * x + y * y > 1.0 {
        return None;
    }
    // Clockwise angle from the positive y axis
    let angle = x.atan2(y).rem_euclid(TAU);
    let idx = (angle / (TAU / slice_count as f64)).floor() as usize;
    Some(idx.min(slice_count - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_index_clockwise_from_top() {
        assert_eq!(slice_index(0.3, 0.8, 6), Some(0));
        assert_eq!(slice_index(0.8, 0.0, 6), Some(1));
        assert_eq!(slice_index(0.3, -0.8, 6), Some(2));
        assert_eq!(slice_index(-0.3, -0.8, 6), Some(3));
        assert_eq!(slice_index(-0.8, 0.0, 6), Some(4));
        assert_eq!(slice_index(-0.1, 0.9, 6), Some(5));
    }

    #[test]
    fn test_outside_disc() {
        assert_eq!(slice_index(0.9, 0.9, 6), None);
        assert_eq!(slice_index(0.0, 0.0, 0), None);
    }

    #[test]
    fn test_geometry_covers_every_slice_evenly() {
        let geometry = PizzaGeometry::with_step(6, 0.05);
        assert_eq!(geometry.slice_count(), 6);

        let sizes: Vec<usize> = (0..6).map(|i| geometry.slice(i).len()).collect();
        let min = *sizes.iter().min().unwrap();
        let max = *sizes.iter().max().unwrap();
        assert!(min > 0);
        // Grid sampling is uneven at the edges but slices stay comparable
        assert!(max - min < max / 4, "uneven slices: {:?}", sizes);
        assert!(geometry.slice(6).is_empty());
    }

    #[test]
    fn test_points_stay_in_disc() {
        let geometry = PizzaGeometry::with_step(3, 0.1);
        for i in 0..3 {
            for (x, y) in geometry.slice(i) {
                assert!(x * x + y * y <= 1.0);
            }
        }
    }
}
