use super::Point;
use std::cmp::Ordering;

/// Four corners of a located code in canonical order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerSet {
    /// Top-left corner
    pub top_left: Point,
    /// Top-right corner
    pub top_right: Point,
    /// Bottom-right corner
    pub bottom_right: Point,
    /// Bottom-left corner
    pub bottom_left: Point,
}

impl CornerSet {
    /// Build from corners already known to be in (tl, tr, br, bl) order
    pub fn new(top_left: Point, top_right: Point, bottom_right: Point, bottom_left: Point) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Order four arbitrary points into (tl, tr, br, bl)
    ///
    /// Top-left has the smallest `x + y`, ties going to the larger `x - y`.
    /// Bottom-right is its diagonal partner: the point whose line through
    /// top-left separates the other two. Of those, top-right lies on the
    /// clockwise side (y axis pointing down). Every input point is used
    /// exactly once, so a 45 degree rotation with tied sums still yields a
    /// simple quadrilateral.
    pub fn from_unordered(points: [Point; 4]) -> Self {
        let sum = |p: &Point| p.x + p.y;
        let diff = |p: &Point| p.x - p.y;

        let mut rest: Vec<Point> = points.to_vec();
        let tl = take_extreme(&mut rest, |a, b| {
            sum(a) < sum(b) || (sum(a) == sum(b) && diff(a) > diff(b))
        });

        let br_idx = (0..3)
            .find(|&i| {
                let axis = rest[i] - tl;
                let u = axis.cross(&(rest[(i + 1) % 3] - tl));
                let v = axis.cross(&(rest[(i + 2) % 3] - tl));
                u * v < 0.0
            })
            .unwrap_or_else(|| {
                // Not a convex quad; fall back to the largest sum
                (0..3).fold(0, |best, i| if sum(&rest[i]) > sum(&rest[best]) { i } else { best })
            });
        let br = rest.remove(br_idx);

        let axis = br - tl;
        let side = |p: &Point| axis.cross(&(*p - tl));
        let (tr, bl) = match side(&rest[0]).partial_cmp(&side(&rest[1])) {
            Some(Ordering::Less) => (rest[0], rest[1]),
            Some(Ordering::Greater) => (rest[1], rest[0]),
            _ if diff(&rest[0]) >= diff(&rest[1]) => (rest[0], rest[1]),
            _ => (rest[1], rest[0]),
        };

        Self::new(tl, tr, br, bl)
    }

    /// Corners as an array in (tl, tr, br, bl) order
    pub fn as_array(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }
}

/// Remove and return the first point that no other point beats under `better`
fn take_extreme(points: &mut Vec<Point>, better: impl Fn(&Point, &Point) -> bool) -> Point {
    let mut best = 0;
    for i in 1..points.len() {
        if better(&points[i], &points[best]) {
            best = i;
        }
    }
    points.remove(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> [Point; 4] {
        [
            Point::new(10.0, 10.0),
            Point::new(50.0, 12.0),
            Point::new(48.0, 52.0),
            Point::new(8.0, 50.0),
        ]
    }

    #[test]
    fn test_from_unordered_any_order() {
        let [a, b, c, d] = square();
        let expected = CornerSet::new(a, b, c, d);
        for perm in [[a, b, c, d], [d, c, b, a], [c, a, d, b], [b, d, a, c]] {
            assert_eq!(CornerSet::from_unordered(perm), expected);
        }
    }

    #[test]
    fn test_from_unordered_diamond_uses_every_point() {
        // 45 degree rotation: sums and differences tie pairwise
        let pts = [
            Point::new(50.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(50.0, 100.0),
            Point::new(0.0, 50.0),
        ];
        let corners = CornerSet::from_unordered(pts);
        let mut out = corners.as_array().to_vec();
        out.sort_by(|p, q| (p.x, p.y).partial_cmp(&(q.x, q.y)).unwrap());
        let mut expected = pts.to_vec();
        expected.sort_by(|p, q| (p.x, p.y).partial_cmp(&(q.x, q.y)).unwrap());
        assert_eq!(out, expected);
    }

    #[test]
    fn test_tied_sums_keep_diagonals() {
        // Pixel-quantised finder centres of a code rotated by 45 degrees
        let tl = Point::new(87.5, 56.0);
        let tr = Point::new(117.5, 86.0);
        let br = Point::new(87.5, 116.0);
        let bl = Point::new(57.5, 86.0);
        let expected = CornerSet::new(tl, tr, br, bl);
        for perm in [[tl, tr, br, bl], [bl, tl, tr, br], [br, bl, tl, tr], [tl, bl, br, tr]] {
            let corners = CornerSet::from_unordered(perm);
            assert_eq!(corners, expected);
            assert_eq!(corners.top_left + corners.bottom_right, corners.top_right + corners.bottom_left);
        }
    }
}
