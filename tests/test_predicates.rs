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

use ruppert::geometry::{Point2, barycentric, circumcenter};
use ruppert::kernel::{
    incircle, orient2d, orient2d_value, point_in_open_segment, segments_properly_intersect,
};
use ruppert::numeric::{incircle_exact, orient2d_exact};

#[test]
fn test_orient2d_matches_exact_on_near_collinear_points() {
    let a = Point2::new(0.5, 0.5);
    let b = Point2::new(12.0, 12.0);
    let mut y = 0.5;
    for _ in 0..64 {
        let c = Point2::new(24.0, 24.0 + (y - 0.5));
        assert_eq!(orient2d(&a, &b, &c), orient2d_exact(&a, &b, &c));
        y = f64::from_bits(y.to_bits() + 1);
    }
    assert_eq!(
        orient2d(&a, &b, &Point2::new(24.0, 24.0)),
        Ordering::Equal
    );
}

#[test]
fn test_orient2d_value_is_twice_the_area() {
    let a = Point2::new(0.0, 0.0);
    let b = Point2::new(2.0, 0.0);
    let c = Point2::new(0.0, 3.0);
    assert_eq!(orient2d_value(&a, &b, &c), 6.0);
    assert_eq!(orient2d(&a, &b, &c), Ordering::Greater);
    assert_eq!(orient2d(&a, &c, &b), Ordering::Less);
}

#[test]
fn test_incircle_cocircular_is_equal() {
    let a = Point2::new(0.0, 0.0);
    let b = Point2::new(1.0, 0.0);
    let c = Point2::new(1.0, 1.0);
    assert_eq!(incircle(&a, &b, &c, &Point2::new(0.0, 1.0)), Ordering::Equal);
    assert_eq!(incircle(&a, &b, &c, &Point2::new(0.5, 0.5)), Ordering::Greater);
    assert_eq!(incircle(&a, &b, &c, &Point2::new(3.0, 3.0)), Ordering::Less);
    assert_eq!(
        incircle(&a, &b, &c, &Point2::new(0.0, 1.0)),
        incircle_exact(&a, &b, &c, &Point2::new(0.0, 1.0))
    );
}

#[test]
fn test_segment_tests_exclude_endpoints() {
    let a = Point2::new(0.0, 0.0);
    let b = Point2::new(2.0, 0.0);
    assert!(point_in_open_segment(&a, &b, &Point2::new(1.0, 0.0)));
    assert!(!point_in_open_segment(&a, &b, &a));
    assert!(!point_in_open_segment(&a, &b, &Point2::new(3.0, 0.0)));

    let c = Point2::new(1.0, -1.0);
    let d = Point2::new(1.0, 1.0);
    assert!(segments_properly_intersect(&a, &b, &c, &d));
    // touching at an endpoint is not a proper crossing
    assert!(!segments_properly_intersect(&a, &b, &Point2::new(1.0, 0.0), &d));
}

#[test]
fn test_circumcenter_and_barycentric() {
    let a = Point2::new(0.0, 0.0);
    let b = Point2::new(4.0, 0.0);
    let c = Point2::new(0.0, 2.0);
    let o = circumcenter(&a, &b, &c).unwrap();
    assert_eq!(o, Point2::new(2.0, 1.0));
    assert!(circumcenter(&a, &b, &Point2::new(8.0, 0.0)).is_none());

    let (l0, l1, l2) = barycentric(&Point2::new(1.0, 0.5), &a, &b, &c).unwrap();
    approx::assert_relative_eq!(l0 + l1 + l2, 1.0, epsilon = 1e-12);
    approx::assert_relative_eq!(l1, 0.25, epsilon = 1e-12);
    approx::assert_relative_eq!(l2, 0.25, epsilon = 1e-12);
}
