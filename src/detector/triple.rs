//! Select three finder candidates forming a right isosceles triangle and
//! complete the fourth corner.
//!
//! The search is first-match-wins over candidates ordered by size, so the
//! most prominent plausible triple is used even if a better-shaped one
//! exists further down.

use crate::config::ScannerConfig;
use crate::detector::finder::FinderPatternCandidate;
use crate::models::{CornerSet, Point};
use log::{debug, trace};
use std::cmp::Ordering;

/// Do sorted side lengths `s1 <= s2 <= s3` describe a right isosceles triangle
///
/// Right angle: `|s1^2 + s2^2 - s3^2| < right_angle_tolerance * s3^2`.
/// Isosceles: `|s1 - s2| < isosceles_tolerance * s1`.
pub fn is_right_isosceles(sides: [f32; 3], config: &ScannerConfig) -> bool {
    let [s1, s2, s3] = sides;
    let hyp_sq = s3 * s3;
    let right_angle = (s1 * s1 + s2 * s2 - hyp_sq).abs() < config.right_angle_tolerance * hyp_sq;
    let isosceles = (s1 - s2).abs() < config.isosceles_tolerance * s1;
    right_angle && isosceles
}

/// Label a right isosceles triple as (top-left, top-right, bottom-left)
///
/// The vertex opposite the longest side is top-left; of the other two the
/// strictly nearer one is top-right, ties go to the later point.
fn label_triple(points: [Point; 3]) -> (Point, Point, Point) {
    let opposite = |i: usize| points[(i + 1) % 3].distance(&points[(i + 2) % 3]);
    let mut corner = 0;
    for i in 1..3 {
        if opposite(i) > opposite(corner) {
            corner = i;
        }
    }

    let tl = points[corner];
    let (p, q) = match corner {
        0 => (points[1], points[2]),
        1 => (points[0], points[2]),
        _ => (points[0], points[1]),
    };
    if tl.distance(&p) < tl.distance(&q) {
        (tl, p, q)
    } else {
        (tl, q, p)
    }
}

/// Complete a labelled triple to four corners in canonical order
pub fn corners_from_triple(points: [Point; 3]) -> CornerSet {
    let (tl, tr, bl) = label_triple(points);
    let br = tr + bl - tl;
    CornerSet::from_unordered([tl, tr, br, bl])
}

/// Find the first right isosceles triple, largest candidates first
///
/// Returns `None` for fewer than three candidates or when no triple passes
/// both tolerance tests.
pub fn match_triple(
    candidates: &[FinderPatternCandidate],
    config: &ScannerConfig,
) -> Option<CornerSet> {
    if candidates.len() < 3 {
        debug!("triple matcher: only {} candidate(s)", candidates.len());
        return None;
    }

    let mut ordered = candidates.to_vec();
    ordered.sort_by(|a, b| b.size.partial_cmp(&a.size).unwrap_or(Ordering::Equal));

    let n = ordered.len();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let points = [ordered[i].center, ordered[j].center, ordered[k].center];
                let mut sides = [
                    points[0].distance(&points[1]),
                    points[1].distance(&points[2]),
                    points[2].distance(&points[0]),
                ];
                sides.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

                if !is_right_isosceles(sides, config) {
                    continue;
                }

                trace!(
                    "triple matcher: accepted contours {}, {}, {}",
                    ordered[i].source_contour, ordered[j].source_contour, ordered[k].source_contour
                );
                return Some(corners_from_triple(points));
            }
        }
    }

    debug!("triple matcher: no right isosceles triple among {n} candidates");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(x: f32, y: f32, size: f32, idx: usize) -> FinderPatternCandidate {
        FinderPatternCandidate::new(Point::new(x, y), size, idx)
    }

    #[test]
    fn test_axis_aligned_triple() {
        let config = ScannerConfig::default();
        let candidates = [
            cand(0.0, 0.0, 21.0, 0),
            cand(100.0, 0.0, 21.0, 1),
            cand(0.0, 100.0, 21.0, 2),
        ];
        let corners = match_triple(&candidates, &config).unwrap();
        assert_eq!(corners.top_left, Point::new(0.0, 0.0));
        assert_eq!(corners.top_right, Point::new(100.0, 0.0));
        assert_eq!(corners.bottom_right, Point::new(100.0, 100.0));
        assert_eq!(corners.bottom_left, Point::new(0.0, 100.0));
    }

    #[test]
    fn test_labelling_is_permutation_invariant() {
        let config = ScannerConfig::default();
        let a = cand(100.0, 100.0, 20.0, 0);
        let b = cand(200.0, 130.0, 20.0, 1);
        let c = cand(70.0, 200.0, 20.0, 2);
        let expected = match_triple(&[a, b, c], &config).unwrap();
        assert_eq!(expected.top_left, a.center);
        assert_eq!(expected.top_right, b.center);
        assert_eq!(expected.bottom_right, Point::new(170.0, 230.0));
        assert_eq!(expected.bottom_left, c.center);
        for perm in [[a, c, b], [b, a, c], [b, c, a], [c, a, b], [c, b, a]] {
            assert_eq!(match_triple(&perm, &config).unwrap(), expected);
        }
    }

    #[test]
    fn test_too_few_candidates() {
        let config = ScannerConfig::default();
        assert!(match_triple(&[], &config).is_none());
        assert!(match_triple(&[cand(0.0, 0.0, 1.0, 0), cand(5.0, 0.0, 1.0, 1)], &config).is_none());
    }

    #[test]
    fn test_tolerance_boundaries() {
        let config = ScannerConfig::default();
        assert!(!is_right_isosceles([10.0, 14.1, 14.1], &config));
        assert!(!is_right_isosceles([10.0, 10.0, 20.0], &config));
        assert!(is_right_isosceles([10.0, 10.0, 14.142], &config));
        // Legs 10% apart still count as isosceles
        assert!(is_right_isosceles([10.0, 11.0, 14.87], &config));
    }

    #[test]
    fn test_largest_triple_wins() {
        let config = ScannerConfig::default();
        // A small valid triple listed first, a large valid triple with bigger sizes
        let candidates = [
            cand(10.0, 10.0, 5.0, 0),
            cand(20.0, 10.0, 5.0, 1),
            cand(10.0, 20.0, 5.0, 2),
            cand(100.0, 100.0, 30.0, 3),
            cand(300.0, 100.0, 30.0, 4),
            cand(100.0, 300.0, 30.0, 5),
        ];
        let corners = match_triple(&candidates, &config).unwrap();
        assert_eq!(corners.top_left, Point::new(100.0, 100.0));
        assert_eq!(corners.bottom_right, Point::new(300.0, 300.0));
    }

    #[test]
    fn test_rejects_colinear_points() {
        let config = ScannerConfig::default();
        let candidates = [
            cand(0.0, 0.0, 10.0, 0),
            cand(50.0, 0.0, 10.0, 1),
            cand(100.0, 0.0, 10.0, 2),
        ];
        assert!(match_triple(&candidates, &config).is_none());
    }

    #[test]
    fn test_rotated_triple_completes_square() {
        // Square rotated by 30 degrees around (200, 200)
        let (s, c) = (30f32.to_radians().sin(), 30f32.to_radians().cos());
        let rot = |x: f32, y: f32| Point::new(200.0 + x * c - y * s, 200.0 + x * s + y * c);
        let pts = [rot(-50.0, -50.0), rot(50.0, -50.0), rot(-50.0, 50.0)];
        let corners = corners_from_triple(pts);
        let expected_fourth = rot(50.0, 50.0);
        assert!(corners
            .as_array()
            .iter()
            .any(|p| p.distance(&expected_fourth) < 1e-3));
        assert!(corners.top_left.x + corners.top_left.y <= corners.bottom_right.x + corners.bottom_right.y);
    }

    #[test]
    fn test_tied_sums_at_45_degrees_stay_diagonal() {
        let config = ScannerConfig::default();
        let candidates = [
            cand(87.5, 56.0, 21.0, 0),
            cand(57.5, 86.0, 21.0, 1),
            cand(117.5, 86.0, 21.0, 2),
        ];
        let corners = match_triple(&candidates, &config).unwrap();
        assert_eq!(corners.top_left, Point::new(87.5, 56.0));
        assert_eq!(corners.bottom_right, Point::new(87.5, 116.0));
        assert_eq!(
            corners.top_left + corners.bottom_right,
            corners.top_right + corners.bottom_left
        );
    }
}
