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

use std::f64::consts::PI;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ruppert::geometry::{Point2, det};
use ruppert::{Location, MeshError, NoHook, Triangulation};

fn square(lo: f64, hi: f64) -> Vec<f64> {
    vec![lo, lo, hi, lo, hi, hi, lo, hi]
}

fn circle(cx: f64, cy: f64, r: f64, n: usize) -> Vec<f64> {
    (0..n)
        .flat_map(|i| {
            let t = 2.0 * PI * i as f64 / n as f64;
            [cx + r * t.cos(), cy + r * t.sin()]
        })
        .collect()
}

fn total_area(tri: &Triangulation) -> f64 {
    (0..tri.face_count())
        .map(|f| {
            let [a, b, c] = tri.store().face_points(f);
            det(&a, &b, &c) / 2.0
        })
        .sum()
}

fn assert_boundary_is_segments(tri: &Triangulation) {
    let store = tri.store();
    for f in 0..store.face_count() {
        for e in 0..3 {
            if store.neighbor(f, e).is_none() {
                assert!(store.is_segment(f, e), "boundary edge {e} of {f} not a segment");
            }
        }
    }
}

#[test]
fn test_square_with_hole_tiles_region() {
    let tri = Triangulation::from_loops(&[square(0.0, 4.0), circle(2.0, 2.0, 1.0, 20)]).unwrap();
    tri.validate().unwrap();
    assert!(tri.delaunay_violations().is_empty());
    assert_boundary_is_segments(&tri);
    assert_eq!(tri.point_count(), 24);

    let hole = 0.5 * 20.0 * (2.0 * PI / 20.0).sin();
    assert_relative_eq!(total_area(&tri), 16.0 - hole, epsilon = 1e-9);

    for f in 0..tri.face_count() {
        let c = tri.store().centroid(f);
        assert!(c.distance_sqr(&Point2::new(2.0, 2.0)) > 0.9);
        assert!((0.0..=4.0).contains(&c.x) && (0.0..=4.0).contains(&c.y));
    }
}

#[test]
fn test_island_inside_hole_is_kept() {
    let loops = [
        square(0.0, 10.0),
        square(2.0, 8.0),
        vec![4.0, 4.0, 6.0, 4.0, 5.0, 6.0],
    ];
    let tri = Triangulation::from_loops(&loops).unwrap();
    tri.validate().unwrap();
    assert_boundary_is_segments(&tri);
    assert_relative_eq!(total_area(&tri), 100.0 - 36.0 + 2.0, epsilon = 1e-9);
}

#[test]
fn test_clockwise_outer_loop() {
    let tri = Triangulation::from_loops(&[vec![0.0, 0.0, 0.0, 1.0, 2.0, 1.0, 2.0, 0.0]]).unwrap();
    tri.validate().unwrap();
    assert_eq!(tri.face_count(), 2);
    assert_relative_eq!(total_area(&tri), 2.0, epsilon = 1e-12);
}

#[test]
fn test_concave_boundary_recovers_segments() {
    // comb shape whose teeth force segment recovery by flips
    let comb = vec![
        0.0, 0.0, 10.0, 0.0, 10.0, 3.0, 9.0, 3.0, 9.0, 0.5, 7.0, 0.5, 7.0, 3.0, 5.0, 3.0, 5.0,
        0.5, 3.0, 0.5, 3.0, 3.0, 0.0, 3.0,
    ];
    let tri = Triangulation::from_loops(&[comb]).unwrap();
    tri.validate().unwrap();
    assert!(tri.delaunay_violations().is_empty());
    assert_boundary_is_segments(&tri);
    let area = 30.0 - 2.0 * 2.5 - 2.0 * 2.5 - 0.0;
    assert_relative_eq!(total_area(&tri), area, epsilon = 1e-9);
    assert_eq!(tri.face_count(), 12 - 2);
}

#[test]
fn test_random_insertions_keep_delaunay() {
    let mut tri = Triangulation::from_loops(&[square(0.0, 1.0)]).unwrap();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut inserted = 0;
    for round in 0..200 {
        let p = Point2::new(rng.random_range(0.01..0.99), rng.random_range(0.01..0.99));
        match tri.find_triangle(p) {
            Location::Inside { face } => {
                tri.insert_in_face(face, p, None, &mut NoHook).unwrap();
            }
            Location::OnEdge { face, edge } => {
                tri.insert_on_edge(face, edge, p, None, &mut NoHook).unwrap();
            }
            Location::OnVertex { .. } => continue,
            Location::Outside { .. } => panic!("{p:?} located outside the unit square"),
        }
        inserted += 1;
        if round % 25 == 0 {
            tri.validate().unwrap();
            assert!(tri.delaunay_violations().is_empty());
        }
    }
    tri.validate().unwrap();
    assert!(tri.delaunay_violations().is_empty());
    assert_eq!(tri.face_count(), 2 + 2 * inserted);
    assert_relative_eq!(total_area(&tri), 1.0, epsilon = 1e-12);
}

#[test]
fn test_locate_from_reports_boundary_exit() {
    let tri = Triangulation::from_loops(&[square(0.0, 1.0)]).unwrap();
    match tri.locate_from(0, Point2::new(0.5, -3.0)).unwrap() {
        Location::Outside { face, edge } => assert!(tri.store().is_segment(face, edge)),
        other => panic!("unexpected location {other:?}"),
    }
}

#[test]
fn test_invalid_boundaries() {
    assert!(matches!(
        Triangulation::from_loops(&[square(0.0, 2.0), vec![0.0, 0.0, 1.0, 0.5, 0.5, 1.0]]),
        Err(MeshError::DuplicatePoint {
            original: 0,
            duplicate: 4
        })
    ));
    assert!(matches!(
        Triangulation::from_loops(&[square(0.0, 2.0), vec![1.0, 0.0, 1.5, 1.0, 0.5, 1.0]]),
        Err(MeshError::SegmentThroughVertex {
            a: 0,
            b: 1,
            vertex: 4
        })
    ));
    assert!(matches!(
        Triangulation::from_loops(&[square(0.0, 2.0), vec![1.0, 1.0, 3.0, 1.2, 1.0, 1.5]]),
        Err(MeshError::UnrecoverableSegment { .. })
    ));
}
