// Drawing helpers - Coordinate generators for write sequences
//
// Shapes are produced as coordinates only. Nothing here knows the
// framebuffer size: points may fall outside it, and the write pipeline's
// clipping decides what lands.

use crate::pipeline::WriteRequest;
use crate::pixel::{ColourIndex, Coord};

/// Points on a straight line, both end points included (Bresenham)
#[derive(Debug, Clone)]
pub struct Line {
    x: Coord,
    y: Coord,
    x1: Coord,
    y1: Coord,
    dx: Coord,
    dy: Coord,
    sx: Coord,
    sy: Coord,
    err: Coord,
    done: bool,
}

impl Line {
    /// Line from `(x0, y0)` to `(x1, y1)`
    pub fn new(x0: Coord, y0: Coord, x1: Coord, y1: Coord) -> Self {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        Line {
            x: x0,
            y: y0,
            x1,
            y1,
            dx,
            dy,
            sx: if x0 < x1 { 1 } else { -1 },
            sy: if y0 < y1 { 1 } else { -1 },
            err: dx + dy,
            done: false,
        }
    }
}

impl Iterator for Line {
    type Item = (Coord, Coord);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let point = (self.x, self.y);
        if self.x == self.x1 && self.y == self.y1 {
            self.done = true;
            return Some(point);
        }

        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.x += self.sx;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.y += self.sy;
        }

        Some(point)
    }
}

/// Outline of a `w` x `h` rectangle with its top-left corner at `(x, y)`
///
/// Corners appear once. Empty when either side is zero.
pub fn rect(x: Coord, y: Coord, w: Coord, h: Coord) -> Vec<(Coord, Coord)> {
    if w <= 0 || h <= 0 {
        return Vec::new();
    }
    let (x1, y1) = (x + w - 1, y + h - 1);

    let mut points: Vec<(Coord, Coord)> = (x..=x1).map(|px| (px, y)).collect();
    if h > 1 {
        points.extend((x..=x1).map(|px| (px, y1)));
    }
    points.extend((y + 1..y1).map(|py| (x, py)));
    if w > 1 {
        points.extend((y + 1..y1).map(|py| (x1, py)));
    }
    points
}

/// Every point of a `w` x `h` rectangle, row by row
pub fn fill_rect(x: Coord, y: Coord, w: Coord, h: Coord) -> impl Iterator<Item = (Coord, Coord)> {
    let (w, h) = (w.max(0), h.max(0));
    (y..y + h).flat_map(move |py| (x..x + w).map(move |px| (px, py)))
}

/// Turn points into enabled write requests of one colour index
pub fn writes<I>(points: I, index: ColourIndex) -> impl Iterator<Item = WriteRequest>
where
    I: IntoIterator<Item = (Coord, Coord)>,
{
    points
        .into_iter()
        .map(move |(x, y)| WriteRequest::new(x, y, index))
}
