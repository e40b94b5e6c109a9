/// Finder pattern classification over the contour forest: square shape,
/// sane aspect ratio and two levels of nesting
use crate::config::ScannerConfig;
use crate::detector::contour::ContourNode;
use crate::models::Point;
use crate::utils::geometry::BoundingRect;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point as PixelPoint;
use log::{debug, trace};

/// A contour that looks like one of the three finder squares
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderPatternCandidate {
    /// Centre of the bounding rectangle
    pub center: Point,
    /// Longer side of the bounding rectangle
    pub size: f32,
    /// Index of the originating node in the forest
    pub source_contour: usize,
}

impl FinderPatternCandidate {
    /// Create a candidate
    pub fn new(center: Point, size: f32, source_contour: usize) -> Self {
        Self {
            center,
            size,
            source_contour,
        }
    }
}

/// Filter the forest down to finder pattern candidates, in forest order
pub fn classify_finder_patterns(
    forest: &[ContourNode],
    config: &ScannerConfig,
) -> Vec<FinderPatternCandidate> {
    let candidates: Vec<FinderPatternCandidate> = forest
        .iter()
        .enumerate()
        .filter_map(|(idx, node)| classify_node(forest, idx, node, config))
        .collect();

    debug!(
        "finder classification: {} of {} contours accepted",
        candidates.len(),
        forest.len()
    );
    candidates
}

fn classify_node(
    forest: &[ContourNode],
    idx: usize,
    node: &ContourNode,
    config: &ScannerConfig,
) -> Option<FinderPatternCandidate> {
    // Cheap shape filters first
    if polygon_vertices(&node.points, config.polygon_epsilon_ratio) != Some(4) {
        return None;
    }

    let rect = BoundingRect::of(&node.points)?;
    let aspect = rect.aspect_ratio();
    if !(config.min_aspect..=config.max_aspect).contains(&aspect) {
        trace!("contour {idx}: aspect {aspect:.2} out of range");
        return None;
    }

    if !node.has_grandchild(forest) {
        trace!("contour {idx}: quad without two nesting levels");
        return None;
    }

    let candidate =
        FinderPatternCandidate::new(rect.centroid(), rect.width.max(rect.height), idx);
    trace!(
        "contour {idx}: finder candidate at ({:.1}, {:.1}) size {:.1}",
        candidate.center.x, candidate.center.y, candidate.size
    );
    Some(candidate)
}

/// Vertex count of the closed Douglas-Peucker approximation of a border,
/// with tolerance `ratio` times its perimeter
///
/// `None` for borders too short to approximate (single pixels, spurs).
fn polygon_vertices(points: &[Point], ratio: f32) -> Option<usize> {
    if points.len() < 3 {
        return None;
    }
    let curve: Vec<PixelPoint<f32>> = points.iter().map(|p| PixelPoint::new(p.x, p.y)).collect();
    let epsilon = ratio as f64 * arc_length(&curve, true);
    if epsilon.is_nan() || epsilon <= 0.0 {
        return None;
    }
    Some(approximate_polygon_dp(&curve, epsilon, true).len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::contour::extract_contours;
    use crate::models::BinaryMask;

    /// Draw a finder-like ring + core with the top-left corner at (x, y)
    fn draw_finder(mask: &mut BinaryMask, x: usize, y: usize, module: usize) {
        mask.fill_rect(x, y, x + 7 * module, y + 7 * module, true);
        mask.fill_rect(x + module, y + module, x + 6 * module, y + 6 * module, false);
        mask.fill_rect(
            x + 2 * module,
            y + 2 * module,
            x + 5 * module,
            y + 5 * module,
            true,
        );
    }

    #[test]
    fn test_single_finder_is_classified() {
        let mut mask = BinaryMask::new(60, 60);
        draw_finder(&mut mask, 10, 10, 4);

        let forest = extract_contours(&mask);
        let found = classify_finder_patterns(&forest, &ScannerConfig::default());
        assert_eq!(found.len(), 1);

        let c = found[0];
        assert_eq!(forest[c.source_contour].parent, None);
        assert_eq!(c.size, 28.0);
        assert!((c.center.x - 24.0).abs() < 1e-3);
        assert!((c.center.y - 24.0).abs() < 1e-3);
    }

    #[test]
    fn test_plain_square_is_rejected() {
        let mut mask = BinaryMask::new(40, 40);
        mask.fill_rect(5, 5, 30, 30, true);
        let forest = extract_contours(&mask);
        assert!(classify_finder_patterns(&forest, &ScannerConfig::default()).is_empty());
    }

    #[test]
    fn test_single_ring_is_rejected() {
        // Outer border + hole, but nothing inside the hole
        let mut mask = BinaryMask::new(40, 40);
        mask.fill_rect(5, 5, 30, 30, true);
        mask.fill_rect(9, 9, 26, 26, false);
        let forest = extract_contours(&mask);
        assert!(classify_finder_patterns(&forest, &ScannerConfig::default()).is_empty());
    }

    #[test]
    fn test_elongated_nest_is_rejected() {
        // Nested rectangles with aspect ratio 3
        let mut mask = BinaryMask::new(100, 40);
        mask.fill_rect(5, 5, 95, 35, true);
        mask.fill_rect(10, 10, 90, 30, false);
        mask.fill_rect(15, 15, 85, 25, true);
        let forest = extract_contours(&mask);
        assert!(classify_finder_patterns(&forest, &ScannerConfig::default()).is_empty());
    }

    fn square_outline(x0: i32, y0: i32, size: i32) -> Vec<Point> {
        // Clockwise pixel walk around the square border, no repeated start
        let mut pts = Vec::new();
        let x1 = x0 + size - 1;
        let y1 = y0 + size - 1;
        for x in x0..x1 {
            pts.push(Point::new(x as f32, y0 as f32));
        }
        for y in y0..y1 {
            pts.push(Point::new(x1 as f32, y as f32));
        }
        for x in (x0 + 1..=x1).rev() {
            pts.push(Point::new(x as f32, y1 as f32));
        }
        for y in (y0 + 1..=y1).rev() {
            pts.push(Point::new(x0 as f32, y as f32));
        }
        pts
    }

    #[test]
    fn test_square_border_has_four_vertices() {
        assert_eq!(polygon_vertices(&square_outline(5, 5, 30), 0.04), Some(4));
    }

    #[test]
    fn test_triangle_border_has_three_vertices() {
        let pts: Vec<Point> = (0..20)
            .map(|i| Point::new(i as f32, 0.0))
            .chain((0..20).map(|i| Point::new(20.0 - i as f32, i as f32)))
            .chain((1..20).map(|i| Point::new(0.0, 20.0 - i as f32)))
            .collect();
        assert_eq!(polygon_vertices(&pts, 0.04), Some(3));
    }

    #[test]
    fn test_tiny_borders_are_skipped() {
        assert_eq!(polygon_vertices(&[], 0.04), None);
        assert_eq!(polygon_vertices(&[Point::new(3.0, 3.0)], 0.04), None);
        // Zero perimeter
        assert_eq!(polygon_vertices(&[Point::new(3.0, 3.0); 4], 0.04), None);
    }

    #[test]
    fn test_empty_forest() {
        assert!(classify_finder_patterns(&[], &ScannerConfig::default()).is_empty());
    }
}
