use std::collections::HashMap;

use atelier_engine::coords::{Rect, Viewport};
use atelier_gallery::viewport::{BoundsSource, MediaElement};

/// Arrangement of the image tiles on the page.
#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum LayoutKind {
    /// A staggered grid wider and taller than the window, dragged in both axes.
    Grid,
    /// A single horizontal strip, vertically centered.
    Row,
}

/// Page layout standing in for the document: it owns the layout box of every
/// element and answers bounds queries from the gallery.
#[derive(Debug)]
pub struct PageLayout {
    kind: LayoutKind,
    ids: Vec<String>,
    boxes: HashMap<String, Rect>,
}

impl PageLayout {
    pub fn new<I>(kind: LayoutKind, ids: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            kind,
            ids: ids.into_iter().collect(),
            boxes: HashMap::new(),
        }
    }

    /// Recomputes every box for `viewport` (logical px).
    pub fn relayout(&mut self, viewport: Viewport) {
        self.boxes.clear();
        if !viewport.is_valid() {
            return;
        }

        let rects: Vec<Rect> = match self.kind {
            LayoutKind::Grid => grid(self.ids.len(), viewport),
            LayoutKind::Row => row(self.ids.len(), viewport),
        };
        self.boxes.extend(self.ids.iter().cloned().zip(rects));
    }
}

impl BoundsSource for PageLayout {
    fn bounds(&self, element: &MediaElement) -> Option<Rect> {
        self.boxes.get(&element.id).copied()
    }
}

// Tile sizes are fractions of the window so a resize rescales the page.
const GRID_TILE_W: f32 = 0.22;
const GRID_TILE_ASPECT: f32 = 1.3;
const GRID_GUTTER: f32 = 0.04;

fn grid(n: usize, viewport: Viewport) -> Vec<Rect> {
    if n == 0 {
        return Vec::new();
    }

    let columns = (n as f32).sqrt().ceil().max(1.0) as usize;
    let rows = n.div_ceil(columns);

    let w = viewport.width * GRID_TILE_W;
    let h = w * GRID_TILE_ASPECT;
    let gutter = viewport.width * GRID_GUTTER;

    let content_w = columns as f32 * w + (columns - 1) as f32 * gutter;
    // Odd columns drop by half a tile.
    let content_h = rows as f32 * h + (rows - 1) as f32 * gutter + if columns > 1 { h / 2.0 } else { 0.0 };

    let left = (viewport.width - content_w) / 2.0;
    let top = (viewport.height - content_h) / 2.0;

    (0..n)
        .map(|i| {
            let (col, row) = (i % columns, i / columns);
            let stagger = if col % 2 == 1 { h / 2.0 } else { 0.0 };
            Rect::new(
                left + col as f32 * (w + gutter),
                top + row as f32 * (h + gutter) + stagger,
                w,
                h,
            )
        })
        .collect()
}

const ROW_TILE_H: f32 = 0.5;
const ROW_TILE_ASPECT: f32 = 0.75;
const ROW_GUTTER: f32 = 0.03;

fn row(n: usize, viewport: Viewport) -> Vec<Rect> {
    let h = viewport.height * ROW_TILE_H;
    let w = h * ROW_TILE_ASPECT;
    let gutter = viewport.width * ROW_GUTTER;
    let top = (viewport.height - h) / 2.0;

    (0..n)
        .map(|i| Rect::new(gutter + i as f32 * (w + gutter), top, w, h))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("img-{i}")).collect()
    }

    fn element(id: &str) -> MediaElement {
        MediaElement::new(id, format!("{id}.png"))
    }

    fn content_bounds(page: &PageLayout) -> Option<Rect> {
        page.boxes.values().copied().reduce(Rect::union)
    }

    #[test]
    fn grid_is_centered_on_the_window() {
        let mut page = PageLayout::new(LayoutKind::Grid, ids(9));
        page.relayout(Viewport::new(1000.0, 800.0));

        let content = content_bounds(&page).unwrap();
        let cx = content.left() + content.size.x / 2.0;
        let cy = content.top() + content.size.y / 2.0;
        assert!((cx - 500.0).abs() < 1e-3, "{content:?}");
        assert!((cy - 400.0).abs() < 1e-3, "{content:?}");
    }

    #[test]
    fn grid_staggers_odd_columns() {
        let mut page = PageLayout::new(LayoutKind::Grid, ids(4));
        page.relayout(Viewport::new(1000.0, 800.0));
        let a = page.bounds(&element("img-0")).unwrap();
        let b = page.bounds(&element("img-1")).unwrap();
        assert!((b.top() - a.top() - a.size.y / 2.0).abs() < 1e-3);
    }

    #[test]
    fn row_tiles_share_a_baseline() {
        let mut page = PageLayout::new(LayoutKind::Row, ids(5));
        page.relayout(Viewport::new(1200.0, 600.0));

        let boxes: Vec<Rect> = ids(5).iter().map(|id| page.bounds(&element(id)).unwrap()).collect();
        assert!(boxes.iter().all(|b| b.top() == boxes[0].top()));
        for pair in boxes.windows(2) {
            assert!(pair[1].left() > pair[0].right());
        }
        assert_eq!(boxes[0].size.y, 300.0);
    }

    #[test]
    fn boxes_scale_with_the_window() {
        let mut page = PageLayout::new(LayoutKind::Row, ids(2));
        page.relayout(Viewport::new(1000.0, 500.0));
        let small = page.bounds(&element("img-1")).unwrap();
        page.relayout(Viewport::new(2000.0, 1000.0));
        let large = page.bounds(&element("img-1")).unwrap();
        assert!((large.size.x - 2.0 * small.size.x).abs() < 1e-3);
        assert!((large.left() - 2.0 * small.left()).abs() < 1e-3);
    }

    #[test]
    fn unknown_or_unlaid_elements_have_no_bounds() {
        let mut page = PageLayout::new(LayoutKind::Grid, ids(2));
        assert_eq!(page.bounds(&element("img-0")), None);
        page.relayout(Viewport::new(800.0, 600.0));
        assert_eq!(page.bounds(&element("other")), None);
        page.relayout(Viewport::new(0.0, 0.0));
        assert_eq!(page.bounds(&element("img-0")), None);
    }
}
