use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::Node;

/// Target aspect ratio of squarified rows (the golden ratio).
pub const PHI: f64 = 1.618_033_988_749_895;

/// Axis-aligned rectangle given by its two corners.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Shrink the far edges by `by`, never past the near edges.
    pub fn inset(&self, by: f64) -> Self {
        Self {
            x0: self.x0,
            y0: self.y0,
            x1: (self.x1 - by).max(self.x0),
            y1: (self.y1 - by).max(self.y0),
        }
    }

    /// Half-open containment, so shared edges belong to one rectangle only.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// Area of the intersection with `other` (zero when they only touch).
    pub fn overlap(&self, other: &Rect) -> f64 {
        let w = self.x1.min(other.x1) - self.x0.max(other.x0);
        let h = self.y1.min(other.y1) - self.y0.max(other.y0);
        if w > 0.0 && h > 0.0 {
            w * h
        } else {
            0.0
        }
    }
}

/// A laid-out leaf: the node and its proportional cell.
#[derive(Clone, Copy, Debug)]
pub struct LeafCell<'a> {
    pub node: &'a Node,
    pub cell: Rect,
}

impl LeafCell<'_> {
    /// The rectangle a renderer draws: the cell minus the gutter.
    pub fn tile_rect(&self, inset: f64) -> Rect {
        self.cell.inset(inset)
    }
}

/// Lay out every positive-weight leaf of `root` inside a `width` x `height`
/// rectangle with the squarified algorithm.
///
/// Leaves are returned in pre-order, matching [`Node::leaves`] minus the
/// zero-weight ones.
pub fn layout(root: &Node, width: f64, height: f64) -> Result<Vec<LeafCell<'_>>> {
    if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
        return Err(Error::InvalidViewport { width, height });
    }

    let mut cells = Vec::new();
    place(root, Rect::from_size(width, height), &mut cells);

    tracing::info!(
        "Laid out {} leaves of '{}' in {:.0}x{:.0} area",
        cells.len(),
        root.name,
        width,
        height
    );
    Ok(cells)
}

fn place<'a>(node: &'a Node, cell: Rect, out: &mut Vec<LeafCell<'a>>) {
    if node.weight <= 0.0 {
        return;
    }
    if node.is_leaf() {
        out.push(LeafCell { node, cell });
        return;
    }

    // Zero weights sort last and would only get degenerate slivers.
    let children: Vec<&Node> = node.children.iter().filter(|c| c.weight > 0.0).collect();
    let weights: Vec<f64> = children.iter().map(|c| c.weight).collect();
    let rects = squarify(&weights, node.weight, cell);

    for (child, rect) in children.into_iter().zip(rects) {
        place(child, rect, out);
    }
}

/// Split `area` into one rectangle per weight, in order.
///
/// `weights` must be positive and sorted descending; `total` is their sum.
/// Rows are grown while the worst aspect ratio (measured against [`PHI`])
/// keeps improving, and each row spans the shorter side of what is left.
pub fn squarify(weights: &[f64], total: f64, area: Rect) -> Vec<Rect> {
    let n = weights.len();
    let mut out = Vec::with_capacity(n);
    let Rect { mut x0, mut y0, x1, y1 } = area;
    let mut remaining = total;
    let mut i0 = 0;

    while i0 < n {
        let dx = x1 - x0;
        let dy = y1 - y0;

        let mut i1 = i0 + 1;
        let mut row_sum = weights[i0];
        let mut min_w = row_sum;
        let mut max_w = row_sum;
        let alpha = (dy / dx).max(dx / dy) / (remaining * PHI);
        let beta = row_sum * row_sum * alpha;
        let mut best = (max_w / beta).max(beta / min_w);

        while i1 < n {
            let w = weights[i1];
            let sum = row_sum + w;
            let lo = min_w.min(w);
            let hi = max_w.max(w);
            let beta = sum * sum * alpha;
            let ratio = (hi / beta).max(beta / lo);
            if ratio > best {
                break;
            }
            row_sum = sum;
            min_w = lo;
            max_w = hi;
            best = ratio;
            i1 += 1;
        }

        let row = &weights[i0..i1];
        let last = i1 == n;
        if dx < dy {
            // Row along the top, full width.
            let y2 = if last { y1 } else { y0 + dy * row_sum / remaining };
            dice(row, row_sum, Rect::new(x0, y0, x1, y2), &mut out);
            y0 = y2;
        } else {
            // Column along the left, full height.
            let x2 = if last { x1 } else { x0 + dx * row_sum / remaining };
            slice(row, row_sum, Rect::new(x0, y0, x2, y1), &mut out);
            x0 = x2;
        }

        remaining -= row_sum;
        i0 = i1;
    }

    out
}

/// Partition `band` left to right.
fn dice(row: &[f64], row_sum: f64, band: Rect, out: &mut Vec<Rect>) {
    let k = band.width() / row_sum;
    let mut x = band.x0;
    for (i, w) in row.iter().enumerate() {
        let next = if i + 1 == row.len() { band.x1 } else { x + w * k };
        out.push(Rect::new(x, band.y0, next, band.y1));
        x = next;
    }
}

/// Partition `band` top to bottom.
fn slice(row: &[f64], row_sum: f64, band: Rect, out: &mut Vec<Rect>) {
    let k = band.height() / row_sum;
    let mut y = band.y0;
    for (i, w) in row.iter().enumerate() {
        let next = if i + 1 == row.len() { band.y1 } else { y + w * k };
        out.push(Rect::new(band.x0, y, band.x1, next));
        y = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::build;
    use crate::model::RawRecord;

    fn two_groups() -> Node {
        build(&RawRecord::group(
            "root",
            vec![
                RawRecord::group("A", vec![RawRecord::leaf("a1", 10.0), RawRecord::leaf("a2", 20.0)]),
                RawRecord::group("B", vec![RawRecord::leaf("b1", 5.0), RawRecord::leaf("b2", 15.0)]),
            ],
        ))
        .unwrap()
    }

    #[test]
    fn areas_follow_descending_weights() {
        let root = two_groups();
        let cells = layout(&root, 100.0, 100.0).unwrap();
        let names: Vec<_> = cells.iter().map(|c| c.node.name.as_str()).collect();
        assert_eq!(names, ["a2", "a1", "b2", "b1"]);
        for (cell, expected) in cells.iter().zip([4000.0, 2000.0, 3000.0, 1000.0]) {
            assert!((cell.cell.area() - expected).abs() < 1e-6, "{:?}", cell.cell);
            assert!(cell.tile_rect(1.0).area() < expected);
        }
    }

    #[test]
    fn scenario_geometry() {
        let root = two_groups();
        let cells = layout(&root, 100.0, 100.0).unwrap();
        // A takes the top 60%, split into a 2:1 pair of columns.
        assert_eq!(cells[0].cell, Rect::new(0.0, 0.0, 100.0 * 20.0 / 30.0, 60.0));
        assert_eq!(cells[1].cell.x1, 100.0);
        assert_eq!(cells[1].cell.y1, 60.0);
        assert_eq!(cells[3].cell.y1, 100.0);
    }

    #[test]
    fn single_leaf_fills_viewport() {
        let root = build(&RawRecord::leaf("only", 3.0)).unwrap();
        let cells = layout(&root, 1920.0, 1080.0).unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].cell, Rect::from_size(1920.0, 1080.0));
        assert_eq!(cells[0].tile_rect(1.0), Rect::new(0.0, 0.0, 1919.0, 1079.0));
    }

    #[test]
    fn zero_weight_nodes_are_dropped() {
        let root = build(&RawRecord::group(
            "root",
            vec![
                RawRecord::group("A", vec![RawRecord::leaf("a", 4.0), RawRecord::leaf("z", 0.0)]),
                RawRecord::group("Empty", vec![RawRecord::leaf("e", 0.0)]),
            ],
        ))
        .unwrap();
        let cells = layout(&root, 50.0, 20.0).unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].node.name, "a");
        assert_eq!(cells[0].cell, Rect::from_size(50.0, 20.0));
    }

    #[test]
    fn invalid_viewport() {
        let root = two_groups();
        assert!(matches!(layout(&root, 0.0, 100.0), Err(Error::InvalidViewport { .. })));
        assert!(matches!(layout(&root, 100.0, -1.0), Err(Error::InvalidViewport { .. })));
        assert!(matches!(layout(&root, f64::NAN, 10.0), Err(Error::InvalidViewport { .. })));
    }

    #[test]
    fn squarify_preserves_area() {
        let weights = [400.0, 300.0, 200.0, 100.0];
        let rects = squarify(&weights, 1000.0, Rect::from_size(50.0, 20.0));
        assert_eq!(rects.len(), 4);
        let total: f64 = rects.iter().map(Rect::area).sum();
        assert!((total - 1000.0).abs() < 1e-9);
        for (r, w) in rects.iter().zip(weights) {
            assert!((r.area() - w).abs() < 1e-9);
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let root = two_groups();
        let a: Vec<Rect> = layout(&root, 333.0, 77.0).unwrap().iter().map(|c| c.cell).collect();
        let b: Vec<Rect> = layout(&root, 333.0, 77.0).unwrap().iter().map(|c| c.cell).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn rect_helpers() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 20.0, 10.0);
        assert_eq!(a.overlap(&b), 0.0);
        assert_eq!(a.overlap(&Rect::new(5.0, 5.0, 15.0, 15.0)), 25.0);
        assert!(a.contains(0.0, 0.0));
        assert!(!a.contains(10.0, 5.0));
        assert_eq!(Rect::new(0.0, 0.0, 0.5, 3.0).inset(1.0), Rect::new(0.0, 0.0, 0.0, 2.0));
    }
}
