// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Alexandre Severino
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use std::cmp::Ordering;

use crate::geometry::Point2;
use crate::numeric::{incircle_exact, orient2d_exact};

// Stage-A error bounds from Shewchuk, "Adaptive Precision Floating-Point
// Arithmetic and Fast Robust Geometric Predicates".
const EPSILON: f64 = f64::EPSILON * 0.5;
const CCW_ERR_BOUND: f64 = (3.0 + 16.0 * EPSILON) * EPSILON;
const ICC_ERR_BOUND: f64 = (10.0 + 96.0 * EPSILON) * EPSILON;

/// Twice the signed area of `(a, b, c)` in plain floating point.
#[inline]
pub fn orient2d_value(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Orientation of `c` relative to the directed line `a -> b`.
///
/// `Greater` means counter-clockwise (left turn), `Equal` collinear.
/// The floating-point value is trusted only outside its error bound;
/// otherwise the determinant is evaluated exactly.
pub fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Ordering {
    let left = (b.x - a.x) * (c.y - a.y);
    let right = (b.y - a.y) * (c.x - a.x);
    let det = left - right;
    let bound = CCW_ERR_BOUND * (left.abs() + right.abs());
    if det > bound {
        Ordering::Greater
    } else if -det > bound {
        Ordering::Less
    } else {
        orient2d_exact(a, b, c)
    }
}

/// `Greater` iff `d` lies strictly inside the circumcircle of the
/// counter-clockwise triangle `(a, b, c)`, `Equal` if cocircular.
pub fn incircle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> Ordering {
    let adx = a.x - d.x;
    let ady = a.y - d.y;
    let bdx = b.x - d.x;
    let bdy = b.y - d.y;
    let cdx = c.x - d.x;
    let cdy = c.y - d.y;

    let bdxcdy = bdx * cdy;
    let cdxbdy = cdx * bdy;
    let alift = adx * adx + ady * ady;

    let cdxady = cdx * ady;
    let adxcdy = adx * cdy;
    let blift = bdx * bdx + bdy * bdy;

    let adxbdy = adx * bdy;
    let bdxady = bdx * ady;
    let clift = cdx * cdx + cdy * cdy;

    let det = alift * (bdxcdy - cdxbdy) + blift * (cdxady - adxcdy) + clift * (adxbdy - bdxady);
    let permanent = (bdxcdy.abs() + cdxbdy.abs()) * alift
        + (cdxady.abs() + adxcdy.abs()) * blift
        + (adxbdy.abs() + bdxady.abs()) * clift;
    let bound = ICC_ERR_BOUND * permanent;

    if det > bound {
        Ordering::Greater
    } else if -det > bound {
        Ordering::Less
    } else {
        incircle_exact(a, b, c, d)
    }
}

/// Whether segments `p1-p2` and `q1-q2` cross at a single interior point of both.
pub fn segments_properly_intersect(
    p1: &Point2<f64>,
    p2: &Point2<f64>,
    q1: &Point2<f64>,
    q2: &Point2<f64>,
) -> bool {
    let o1 = orient2d(p1, p2, q1);
    let o2 = orient2d(p1, p2, q2);
    let o3 = orient2d(q1, q2, p1);
    let o4 = orient2d(q1, q2, p2);
    o1 != Ordering::Equal
        && o2 != Ordering::Equal
        && o3 != Ordering::Equal
        && o4 != Ordering::Equal
        && o1 != o2
        && o3 != o4
}

/// Whether `p` lies strictly between `a` and `b` on the segment `a-b`.
pub fn point_in_open_segment(a: &Point2<f64>, b: &Point2<f64>, p: &Point2<f64>) -> bool {
    if orient2d(a, b, p) != Ordering::Equal {
        return false;
    }
    let ab = *b - *a;
    let ap = *p - *a;
    let t = ab.dot(&ap);
    t > 0.0 && t < ab.norm_sqr()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_signs() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert_eq!(orient2d(&a, &b, &Point2::new(0.5, 1.0)), Ordering::Greater);
        assert_eq!(orient2d(&a, &b, &Point2::new(0.5, -1.0)), Ordering::Less);
        assert_eq!(orient2d(&a, &b, &Point2::new(7.0, 0.0)), Ordering::Equal);
    }

    #[test]
    fn filter_defers_to_exact_near_zero() {
        // classic failure case for naive evaluation
        let a = Point2::new(0.1, 0.1);
        let b = Point2::new(0.2, 0.2);
        let c = Point2::new(0.3, 0.3);
        assert_eq!(
            orient2d(&a, &b, &c),
            crate::numeric::orient2d_exact(&a, &b, &c)
        );
    }

    #[test]
    fn incircle_inside_outside() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(0.0, 1.0);
        assert_eq!(incircle(&a, &b, &c, &Point2::new(0.4, 0.4)), Ordering::Greater);
        assert_eq!(incircle(&a, &b, &c, &Point2::new(2.0, 2.0)), Ordering::Less);
        assert_eq!(incircle(&a, &b, &c, &Point2::new(1.0, 1.0)), Ordering::Equal);
    }

    #[test]
    fn proper_intersection_excludes_touching() {
        let p1 = Point2::new(0.0, 0.0);
        let p2 = Point2::new(1.0, 1.0);
        assert!(segments_properly_intersect(
            &p1,
            &p2,
            &Point2::new(0.0, 1.0),
            &Point2::new(1.0, 0.0)
        ));
        assert!(!segments_properly_intersect(
            &p1,
            &p2,
            &Point2::new(1.0, 1.0),
            &Point2::new(2.0, 0.0)
        ));
    }

    #[test]
    fn open_segment_membership() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 0.0);
        assert!(point_in_open_segment(&a, &b, &Point2::new(1.0, 0.0)));
        assert!(!point_in_open_segment(&a, &b, &Point2::new(2.0, 0.0)));
        assert!(!point_in_open_segment(&a, &b, &Point2::new(3.0, 0.0)));
    }
}
