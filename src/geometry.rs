// src/geometry.rs
//
// Rectangle math used to plan capture/processing windows.
// Pure value types and free functions - no state, no failure modes.

use std::fmt;

/// An axis-aligned rectangle. `(left, top)` is the top-left corner and y grows
/// downward. Right and bottom edges are exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    /// The zero rectangle, also returned by [`intersect`] when nothing overlaps.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    pub const fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        self.left as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        self.top as i64 + self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.left, self.top)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Overlap of two rectangles.
///
/// When the overlap has no area the result is [`Rectangle::ZERO`], which cannot
/// be told apart from a zero-sized overlap located at the origin. Callers that
/// care should check `is_empty()` on the result rather than comparing corners.
pub fn intersect(a: Rectangle, b: Rectangle) -> Rectangle {
    let top = a.top.max(b.top);
    let left = a.left.max(b.left);
    let bottom = a.bottom().min(b.bottom());
    let right = a.right().min(b.right());

    let height = bottom - top as i64;
    let width = right - left as i64;
    if height > 0 && width > 0 {
        // Both extents are bounded by an input's u32 width/height.
        Rectangle::new(left, top, width as u32, height as u32)
    } else {
        Rectangle::ZERO
    }
}

/// Half-open containment: left/top edges are inside, right/bottom edges are not.
pub fn contains(rect: Rectangle, point: Point) -> bool {
    let (x, y) = (point.x as i64, point.y as i64);
    rect.left as i64 <= x && x < rect.right() && rect.top as i64 <= y && y < rect.bottom()
}

/// Split `region` into row-major tiles no larger than `max_sub_region`.
///
/// The tiles cover `region` exactly once. The last row and column hold the
/// remainders. An empty region or a zero dimension in `max_sub_region` yields
/// no tiles.
pub fn tile(region: Rectangle, max_sub_region: Size) -> Vec<Rectangle> {
    tile_iter(region, max_sub_region).collect()
}

/// Lazy form of [`tile`].
pub fn tile_iter(region: Rectangle, max_sub_region: Size) -> Tiles {
    Tiles::new(region, max_sub_region)
}

/// Row-major iterator over the tiles of a region. See [`tile`].
#[derive(Clone, Debug)]
pub struct Tiles {
    step: Size,
    left: i64,
    right: i64,
    bottom: i64,
    cursor_left: i64,
    cursor_top: i64,
    remaining: usize,
}

impl Tiles {
    fn new(region: Rectangle, step: Size) -> Self {
        let left = region.left as i64;
        let top = region.top as i64;

        let remaining = if region.is_empty() || step.is_empty() {
            0
        } else {
            let columns = span_count(left, region.width, step.width);
            let rows = span_count(top, region.height, step.height);
            usize::try_from(columns.saturating_mul(rows)).unwrap_or(usize::MAX)
        };

        Self {
            step,
            left,
            right: region.right(),
            bottom: region.bottom(),
            cursor_left: left,
            cursor_top: top,
            remaining,
        }
    }
}

// Number of steps along one axis. A tile may extend past i32::MAX but must
// start at or before it.
fn span_count(start: i64, extent: u32, step: u32) -> u64 {
    let full = (extent as u64).div_ceil(step as u64);
    let representable = (i32::MAX as i64 - start) as u64 / step as u64 + 1;
    full.min(representable)
}

impl Iterator for Tiles {
    type Item = Rectangle;

    fn next(&mut self) -> Option<Rectangle> {
        if self.remaining == 0 {
            return None;
        }

        let tile_right = (self.cursor_left + self.step.width as i64).min(self.right);
        let tile_bottom = (self.cursor_top + self.step.height as i64).min(self.bottom);
        let tile = Rectangle::new(
            self.cursor_left as i32,
            self.cursor_top as i32,
            (tile_right - self.cursor_left) as u32,
            (tile_bottom - self.cursor_top) as u32,
        );

        self.remaining -= 1;
        self.cursor_left = tile_right;
        if self.cursor_left >= self.right || self.cursor_left > i32::MAX as i64 {
            self.cursor_left = self.left;
            self.cursor_top = tile_bottom;
        }

        Some(tile)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Tiles {}

impl std::iter::FusedIterator for Tiles {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_partial_overlap() {
        let a = Rectangle::new(0, 0, 10, 10);
        let b = Rectangle::new(5, 5, 10, 10);
        assert_eq!(intersect(a, b), Rectangle::new(5, 5, 5, 5));
        assert_eq!(intersect(b, a), Rectangle::new(5, 5, 5, 5));
    }

    #[test]
    fn test_intersect_disjoint_is_zero() {
        let a = Rectangle::new(0, 0, 10, 10);
        let b = Rectangle::new(20, 20, 5, 5);
        assert_eq!(intersect(a, b), Rectangle::ZERO);
    }

    #[test]
    fn test_intersect_touching_edges_is_zero() {
        let a = Rectangle::new(0, 0, 10, 10);
        let b = Rectangle::new(10, 0, 10, 10);
        assert_eq!(intersect(a, b), Rectangle::ZERO);
    }

    #[test]
    fn test_intersect_zero_sentinel_is_ambiguous() {
        // A real empty overlap at the origin and "no overlap at all" come back
        // as the same value.
        let at_origin = intersect(Rectangle::new(0, 0, 0, 5), Rectangle::new(0, 0, 5, 5));
        let far_apart = intersect(Rectangle::new(100, 100, 5, 5), Rectangle::new(0, 0, 5, 5));
        assert_eq!(at_origin, far_apart);
        assert!(at_origin.is_empty());
    }

    #[test]
    fn test_intersect_negative_coordinates() {
        let a = Rectangle::new(-10, -10, 15, 15);
        let b = Rectangle::new(0, 0, 10, 10);
        assert_eq!(intersect(a, b), Rectangle::new(0, 0, 5, 5));
    }

    #[test]
    fn test_intersect_extreme_coordinates_do_not_overflow() {
        let a = Rectangle::new(i32::MAX - 1, 0, u32::MAX, 1);
        let b = Rectangle::new(i32::MAX - 1, 0, 1, 1);
        assert_eq!(intersect(a, b), Rectangle::new(i32::MAX - 1, 0, 1, 1));
    }

    #[test]
    fn test_contains_edges() {
        let rect = Rectangle::new(0, 0, 10, 10);
        assert!(contains(rect, Point::new(0, 0)));
        assert!(contains(rect, Point::new(9, 9)));
        assert!(contains(rect, Point::new(5, 0)));
        assert!(!contains(rect, Point::new(10, 5)));
        assert!(!contains(rect, Point::new(5, 10)));
        assert!(!contains(rect, Point::new(-1, 5)));
    }

    #[test]
    fn test_contains_empty_rect() {
        assert!(!contains(Rectangle::new(3, 3, 0, 4), Point::new(3, 3)));
    }

    #[test]
    fn test_tile_row_with_remainder() {
        let tiles = tile(Rectangle::new(0, 0, 25, 10), Size::new(10, 10));
        assert_eq!(
            tiles,
            vec![
                Rectangle::new(0, 0, 10, 10),
                Rectangle::new(10, 0, 10, 10),
                Rectangle::new(20, 0, 5, 10),
            ]
        );
    }

    #[test]
    fn test_tile_is_row_major() {
        let tiles = tile(Rectangle::new(3, 4, 4, 5), Size::new(2, 3));
        assert_eq!(
            tiles,
            vec![
                Rectangle::new(3, 4, 2, 3),
                Rectangle::new(5, 4, 2, 3),
                Rectangle::new(3, 7, 2, 2),
                Rectangle::new(5, 7, 2, 2),
            ]
        );
    }

    #[test]
    fn test_tile_larger_bound_yields_region() {
        let region = Rectangle::new(-5, 7, 30, 12);
        assert_eq!(tile(region, Size::new(100, 100)), vec![region]);
    }

    #[test]
    fn test_tile_degenerate_inputs_are_empty() {
        assert!(tile(Rectangle::new(0, 0, 0, 10), Size::new(5, 5)).is_empty());
        assert!(tile(Rectangle::new(0, 0, 10, 0), Size::new(5, 5)).is_empty());
        assert!(tile(Rectangle::new(0, 0, 10, 10), Size::new(0, 5)).is_empty());
        assert!(tile(Rectangle::new(0, 0, 10, 10), Size::new(5, 0)).is_empty());
    }

    #[test]
    fn test_tile_iter_reports_exact_len() {
        let tiles = tile_iter(Rectangle::new(0, 0, 101, 49), Size::new(10, 10));
        assert_eq!(tiles.len(), 11 * 5);
        assert_eq!(tiles.count(), 55);
    }

    #[test]
    fn test_tile_reaching_i32_max_is_exact() {
        let region = Rectangle::new(i32::MAX - 1, 0, 2, 1);
        assert_eq!(tile(region, Size::new(2, 1)), vec![region]);

        let region = Rectangle::new(0, i32::MAX - 2, 1, 3);
        assert_eq!(
            tile(region, Size::new(1, 2)),
            vec![
                Rectangle::new(0, i32::MAX - 2, 1, 2),
                Rectangle::new(0, i32::MAX, 1, 1),
            ]
        );
    }

    #[test]
    fn test_tile_stops_at_last_representable_start() {
        let region = Rectangle::new(i32::MAX - 3, 0, 10, 1);
        let tiles = tile_iter(region, Size::new(2, 1));
        assert_eq!(tiles.len(), 2);
        assert_eq!(
            tiles.collect::<Vec<_>>(),
            vec![
                Rectangle::new(i32::MAX - 3, 0, 2, 1),
                Rectangle::new(i32::MAX - 1, 0, 2, 1),
            ]
        );
    }

    #[test]
    fn test_rectangle_display() {
        assert_eq!(Rectangle::new(-1, 2, 3, 4).to_string(), "3x4+-1+2");
    }
}
