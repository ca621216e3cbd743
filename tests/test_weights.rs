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

use approx::assert_relative_eq;
use ruppert::geometry::Point2;
use ruppert::{MeshError, Ruppert};

fn strip() -> Vec<f64> {
    vec![0.0, 0.0, 4.0, 0.0, 4.0, 1.0, 0.0, 1.0]
}

#[test]
fn test_weight_validation() {
    let mut mesh = Ruppert::new(&[strip()]).unwrap();
    assert_eq!(mesh.weight(), None);
    assert_eq!(
        mesh.set_weight(Some(&[1.0, 2.0][..])),
        Err(MeshError::WeightCountMismatch {
            expected: 4,
            found: 2
        })
    );
    assert!(matches!(
        mesh.set_weight(Some(&[1.0, -2.0, 1.0, 1.0][..])),
        Err(MeshError::InvalidParameter { .. })
    ));
    assert_eq!(mesh.weight(), None);

    mesh.set_weight(Some(&[1.0, 2.0, 3.0, 4.0][..])).unwrap();
    assert_eq!(mesh.weight(), Some(vec![1.0, 2.0, 3.0, 4.0]));
    mesh.set_weight(None).unwrap();
    assert_eq!(mesh.weight(), None);
}

#[test]
fn test_interpolated_weight_is_linear() {
    let mut mesh = Ruppert::new(&[strip()]).unwrap();
    assert_eq!(mesh.interpolated_weight(Point2::new(1.0, 0.5), 0).unwrap(), None);

    mesh.set_weight(Some(&[1.0, 3.0, 3.0, 1.0][..])).unwrap();
    for f in 0..mesh.face_count() {
        let c = mesh.triangulation().store().centroid(f);
        let w = mesh.interpolated_weight(c, f).unwrap().unwrap();
        assert_relative_eq!(w, 1.0 + 0.5 * c.x, epsilon = 1e-12);
    }
    assert!(matches!(
        mesh.interpolated_weight(Point2::new(1.0, 0.5), 42),
        Err(MeshError::FaceOutOfRange { face: 42, .. })
    ));
}

#[test]
fn test_weighted_area_changes_bad_triangles() {
    let mut mesh = Ruppert::new(&[strip()]).unwrap();
    mesh.set_area_constraint(2.5).unwrap();
    assert!((0..mesh.face_count()).all(|f| !mesh.bad(f).unwrap()));

    mesh.set_weight(Some(&[1.0, 2.0, 2.0, 1.0][..])).unwrap();
    assert!((0..mesh.face_count()).any(|f| mesh.bad(f).unwrap()));
}

#[test]
fn test_weights_grade_triangle_size() {
    let mut mesh = Ruppert::new(&[strip()]).unwrap();
    mesh.set_weight(Some(&[1.0, 4.0, 4.0, 1.0][..])).unwrap();
    mesh.set_angle_constraint(20.0).unwrap();
    mesh.set_area_constraint(0.2).unwrap();
    mesh.refine().unwrap();

    let weights = mesh.weight().unwrap();
    assert_eq!(weights.len(), mesh.point_count());
    assert!(weights.iter().all(|w| (1.0..=4.0 + 1e-9).contains(w)));

    let store = mesh.triangulation().store();
    let (mut left, mut right) = (0, 0);
    for f in 0..store.face_count() {
        if store.centroid(f).x < 2.0 {
            left += 1;
        } else {
            right += 1;
        }
    }
    assert!(right > 2 * left, "left {left}, right {right}");
    mesh.triangulation().validate().unwrap();
}
