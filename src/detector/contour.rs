use crate::models::{BinaryMask, Point};
use imageproc::contours::{BorderType, find_contours};

/// Which side of a foreground region a border runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderKind {
    /// Boundary between a foreground region and the background around it
    Outer,
    /// Boundary of a background hole inside a foreground region
    Hole,
}

/// A traced border plus its place in the nesting forest
#[derive(Debug, Clone)]
pub struct ContourNode {
    /// Border pixels in tracing order, implicitly closed
    pub points: Vec<Point>,
    /// Outer or hole border
    pub kind: BorderKind,
    /// Enclosing border, `None` for top-level contours
    pub parent: Option<usize>,
    /// First directly nested border
    pub first_child: Option<usize>,
    /// Next border with the same parent
    pub next_sibling: Option<usize>,
}

impl ContourNode {
    /// Does this node have a child that itself has a child
    pub fn has_grandchild(&self, forest: &[ContourNode]) -> bool {
        self.first_child
            .and_then(|child| forest.get(child))
            .is_some_and(|child| child.first_child.is_some())
    }
}

/// Trace every border in the mask and link them into a forest
///
/// Tracing is delegated to `imageproc` (Suzuki-Abe border following).
/// Children are linked in tracing order, so `first_child` is the first
/// nested border the tracer met.
pub fn extract_contours(mask: &BinaryMask) -> Vec<ContourNode> {
    if mask.width() == 0 || mask.height() == 0 {
        return Vec::new();
    }

    let image = mask.to_luma_image();
    let traced = find_contours::<i32>(&image);

    let mut nodes: Vec<ContourNode> = traced
        .into_iter()
        .map(|contour| ContourNode {
            points: contour
                .points
                .iter()
                .map(|p| Point::new(p.x as f32, p.y as f32))
                .collect(),
            kind: match contour.border_type {
                BorderType::Outer => BorderKind::Outer,
                BorderType::Hole => BorderKind::Hole,
            },
            parent: contour.parent,
            first_child: None,
            next_sibling: None,
        })
        .collect();

    link_forest(&mut nodes);
    nodes
}

/// Derive first-child and next-sibling links from parent indices
fn link_forest(nodes: &mut [ContourNode]) {
    let mut last_child: Vec<Option<usize>> = vec![None; nodes.len()];
    let mut last_root: Option<usize> = None;

    for idx in 0..nodes.len() {
        let previous = match nodes[idx].parent {
            Some(parent) if parent < nodes.len() => {
                if nodes[parent].first_child.is_none() {
                    nodes[parent].first_child = Some(idx);
                }
                last_child[parent].replace(idx)
            }
            _ => last_root.replace(idx),
        };
        if let Some(prev) = previous {
            nodes[prev].next_sibling = Some(idx);
        }
    }
}
