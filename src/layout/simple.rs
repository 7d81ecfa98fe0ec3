//! Trivial deterministic layouts: circular and grid.
//!
//! Always available, for any node count, and used as the fallback when the
//! graph is too small for the simulation-based layouts.

use super::Layout;

/// Evenly spaced points on a unit circle; a single node sits at the origin.
pub fn circular(n: usize) -> Layout {
    if n == 1 {
        return Layout::from_points(vec![(0.0, 0.0)]);
    }
    let points = (0..n)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            (angle.cos(), angle.sin())
        })
        .collect();
    Layout::from_points(points)
}

/// Row-major grid with `ceil(sqrt(n))` columns and unit spacing.
pub fn grid(n: usize) -> Layout {
    let columns = (n as f64).sqrt().ceil().max(1.0) as usize;
    let points = (0..n)
        .map(|i| ((i % columns) as f64, (i / columns) as f64))
        .collect();
    Layout::from_points(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_points_are_distinct() {
        let layout = circular(3);
        assert_eq!(layout.len(), 3);
        for i in 0..3 {
            for j in (i + 1)..3 {
                let (ix, iy) = layout.point(i);
                let (jx, jy) = layout.point(j);
                assert!(
                    (ix - jx).abs() > 1e-9 || (iy - jy).abs() > 1e-9,
                    "points {i} and {j} coincide"
                );
            }
        }
    }

    #[test]
    fn circular_single_node_at_origin() {
        let layout = circular(1);
        assert_eq!(layout.point(0), (0.0, 0.0));
    }

    #[test]
    fn circular_points_lie_on_unit_circle() {
        let layout = circular(8);
        for i in 0..8 {
            let (x, y) = layout.point(i);
            assert!(((x * x + y * y).sqrt() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn grid_is_row_major() {
        let layout = grid(5); // 3 columns
        assert_eq!(layout.point(0), (0.0, 0.0));
        assert_eq!(layout.point(2), (2.0, 0.0));
        assert_eq!(layout.point(3), (0.0, 1.0));
    }

    #[test]
    fn grid_handles_zero_nodes() {
        assert!(grid(0).is_empty());
    }
}
