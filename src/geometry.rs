// src/geometry.rs

//! Axis-aligned boxes and surface descriptors shared by the resolvers.

use serde::{Deserialize, Serialize};

/// An axis-aligned box, `x2`/`y2` exclusive, in the X server's `BoxRec`
/// convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BoxRec {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoxRec {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// The box covering `width x height` pixels at `(x, y)`.
    pub const fn from_origin_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub const fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub const fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// True if the box has no area.
    pub const fn is_empty(&self) -> bool {
        self.x1 >= self.x2 || self.y1 >= self.y2
    }
}

/// Intersects `a` and `b` into `dest`.
///
/// Returns `false` and leaves `dest` as the all-zero box when the boxes do not
/// overlap with positive area on both axes; touching edges do not count.
pub fn intersect(dest: &mut BoxRec, a: &BoxRec, b: &BoxRec) -> bool {
    dest.x1 = a.x1.max(b.x1);
    dest.x2 = a.x2.min(b.x2);
    if dest.x1 >= dest.x2 {
        *dest = BoxRec::default();
        return false;
    }

    dest.y1 = a.y1.max(b.y1);
    dest.y2 = a.y2.min(b.y2);
    if dest.y1 >= dest.y2 {
        *dest = BoxRec::default();
        return false;
    }

    true
}

/// Signed area. An inverted box yields a negative or meaningless value.
pub fn area(b: &BoxRec) -> i32 {
    (b.x2 - b.x1) * (b.y2 - b.y1)
}

/// A window into a pixel buffer owned by the caller.
///
/// `stride` is in elements of `cpp` bytes. Nothing here is validated in
/// release builds; the descriptor only carries the numbers a resolver reads.
#[derive(Debug, Clone, Copy)]
pub struct Surface<P> {
    pub base: P,
    pub stride: usize,
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub cpp: usize,
}

impl<P: Copy> Surface<P> {
    /// The window as a `BoxRec` in surface coordinates.
    pub fn bounds(&self) -> BoxRec {
        BoxRec::from_origin_size(
            self.x as i32,
            self.y as i32,
            self.width as i32,
            self.height as i32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_intersect_overlapping_boxes() {
        let mut dest = BoxRec::default();
        let ok = intersect(
            &mut dest,
            &BoxRec::new(0, 0, 10, 10),
            &BoxRec::new(5, 5, 15, 15),
        );
        assert!(ok);
        assert_eq!(dest, BoxRec::new(5, 5, 10, 10));
    }

    #[test]
    fn it_should_return_the_empty_box_for_corner_contact() {
        let mut dest = BoxRec::new(1, 2, 3, 4);
        let ok = intersect(&mut dest, &BoxRec::new(0, 0, 5, 5), &BoxRec::new(5, 5, 10, 10));
        assert!(!ok);
        assert_eq!(dest, BoxRec::new(0, 0, 0, 0));
    }

    #[test]
    fn it_should_return_the_empty_box_when_only_y_is_disjoint() {
        let mut dest = BoxRec::default();
        let ok = intersect(&mut dest, &BoxRec::new(0, 0, 10, 4), &BoxRec::new(2, 6, 8, 9));
        assert!(!ok);
        assert_eq!(dest, BoxRec::default());
    }

    #[test]
    fn it_should_compute_area() {
        assert_eq!(area(&BoxRec::new(2, 2, 7, 9)), 35);
        assert_eq!(area(&BoxRec::default()), 0);
    }

    #[test]
    fn it_should_report_emptiness_and_extent() {
        let b = BoxRec::from_origin_size(3, 4, 5, 6);
        assert_eq!((b.width(), b.height()), (5, 6));
        assert!(!b.is_empty());
        assert!(BoxRec::new(3, 3, 3, 9).is_empty());
    }

    #[test]
    fn it_should_describe_a_surface_window() {
        let buf = [0u32; 16];
        let s = Surface {
            base: buf.as_ptr(),
            stride: 4,
            x: 1,
            y: 2,
            width: 3,
            height: 2,
            cpp: 4,
        };
        assert_eq!(s.bounds(), BoxRec::new(1, 2, 4, 4));
    }
}
