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

use crate::error::{MeshError, Result};
use crate::geometry::Point2;

/// Index-stable storage for points and triangles.
///
/// Points and faces are only ever appended, so an index handed out once stays
/// valid for the lifetime of the store. Per-face data is kept in parallel
/// vectors that grow together.
///
/// Face `f` has vertices `[v0, v1, v2]` in counter-clockwise order. Edge `e`
/// of a face is the edge opposite vertex `e`, running from `v[(e + 1) % 3]`
/// to `v[(e + 2) % 3]`; `neighbors[f][e]` is the face across it.
#[derive(Debug, Clone, Default)]
pub struct MeshStore {
    points: Vec<Point2<f64>>,
    weights: Option<Vec<f64>>,
    faces: Vec<[usize; 3]>,
    neighbors: Vec<[Option<usize>; 3]>,
    segments: Vec<[bool; 3]>,
}

impl MeshStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(points: usize, faces: usize) -> Self {
        Self {
            points: Vec::with_capacity(points),
            weights: None,
            faces: Vec::with_capacity(faces),
            neighbors: Vec::with_capacity(faces),
            segments: Vec::with_capacity(faces),
        }
    }

    /// Appends a point and returns its index.
    ///
    /// While weights are active every point carries one; a missing weight
    /// defaults to `1.0`.
    pub fn add_point(&mut self, p: Point2<f64>, weight: Option<f64>) -> usize {
        let idx = self.points.len();
        self.points.push(p);
        if let Some(weights) = self.weights.as_mut() {
            weights.push(weight.unwrap_or(1.0));
        }
        idx
    }

    /// Appends a face without neighbors or segment flags and returns its index.
    pub fn add_face(&mut self, v0: usize, v1: usize, v2: usize) -> usize {
        let idx = self.faces.len();
        self.faces.push([v0, v1, v2]);
        self.neighbors.push([None; 3]);
        self.segments.push([false; 3]);
        idx
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn point(&self, i: usize) -> Point2<f64> {
        self.points[i]
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    #[inline]
    pub fn face(&self, f: usize) -> [usize; 3] {
        self.faces[f]
    }

    #[inline]
    pub fn face_neighbors(&self, f: usize) -> [Option<usize>; 3] {
        self.neighbors[f]
    }

    #[inline]
    pub fn face_segments(&self, f: usize) -> [bool; 3] {
        self.segments[f]
    }

    #[inline]
    pub fn neighbor(&self, f: usize, e: usize) -> Option<usize> {
        self.neighbors[f][e]
    }

    #[inline]
    pub fn is_segment(&self, f: usize, e: usize) -> bool {
        self.segments[f][e]
    }

    pub fn face_points(&self, f: usize) -> [Point2<f64>; 3] {
        let [a, b, c] = self.faces[f];
        [self.points[a], self.points[b], self.points[c]]
    }

    /// Endpoints of edge `e` of face `f`, in the face's orientation.
    #[inline]
    pub fn edge_vertices(&self, f: usize, e: usize) -> (usize, usize) {
        let v = self.faces[f];
        (v[(e + 1) % 3], v[(e + 2) % 3])
    }

    /// Which edge of face `n` is shared with face `f`.
    pub fn neighbor_edge(&self, n: usize, f: usize) -> Option<usize> {
        self.neighbors[n].iter().position(|&x| x == Some(f))
    }

    pub fn vertex_slot(&self, f: usize, v: usize) -> Option<usize> {
        self.faces[f].iter().position(|&x| x == v)
    }

    pub fn centroid(&self, f: usize) -> Point2<f64> {
        let [a, b, c] = self.face_points(f);
        Point2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
    }

    pub(crate) fn set_face(&mut self, f: usize, v: [usize; 3]) {
        self.faces[f] = v;
    }

    pub(crate) fn set_neighbors(&mut self, f: usize, n: [Option<usize>; 3]) {
        self.neighbors[f] = n;
    }

    pub(crate) fn set_segments(&mut self, f: usize, s: [bool; 3]) {
        self.segments[f] = s;
    }

    pub(crate) fn set_segment(&mut self, f: usize, e: usize, value: bool) {
        self.segments[f][e] = value;
    }

    /// Points the link of `n` that referred to `old` at `new` instead.
    pub(crate) fn replace_neighbor(&mut self, n: Option<usize>, old: usize, new: usize) {
        if let Some(n) = n {
            if let Some(slot) = self.neighbors[n].iter_mut().find(|x| **x == Some(old)) {
                *slot = Some(new);
            }
        }
    }

    /* ========= Weights ========= */

    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    #[inline]
    pub fn weight(&self, i: usize) -> Option<f64> {
        self.weights.as_ref().map(|w| w[i])
    }

    pub fn has_weights(&self) -> bool {
        self.weights.is_some()
    }

    /// Replaces the per-point weights. `None` disables weighting.
    pub fn set_weights(&mut self, weights: Option<&[f64]>) -> Result<()> {
        let Some(w) = weights else {
            self.weights = None;
            return Ok(());
        };
        if w.len() != self.points.len() {
            return Err(MeshError::WeightCountMismatch {
                expected: self.points.len(),
                found: w.len(),
            });
        }
        if let Some(bad) = w.iter().find(|x| !x.is_finite() || **x <= 0.0) {
            return Err(MeshError::invalid_param(
                "weight",
                bad,
                "weights must be finite and positive",
            ));
        }
        let mut stored = Vec::with_capacity(self.points.capacity());
        stored.extend_from_slice(w);
        self.weights = Some(stored);
        Ok(())
    }

    /* ========= Index validation ========= */

    pub fn check_face(&self, f: usize) -> Result<()> {
        if f < self.faces.len() {
            Ok(())
        } else {
            Err(MeshError::FaceOutOfRange {
                face: f,
                count: self.faces.len(),
            })
        }
    }

    pub fn check_point(&self, i: usize) -> Result<()> {
        if i < self.points.len() {
            Ok(())
        } else {
            Err(MeshError::PointOutOfRange {
                point: i,
                count: self.points.len(),
            })
        }
    }

    pub fn check_edge(e: usize) -> Result<()> {
        if e < 3 {
            Ok(())
        } else {
            Err(MeshError::EdgeOutOfRange(e))
        }
    }

    /* ========= Flat exports ========= */

    /// Vertex indices, three per face.
    pub fn indices(&self) -> Vec<usize> {
        self.faces.iter().flatten().copied().collect()
    }

    /// Coordinates, `x, y` per point.
    pub fn coordinates(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| [p.x, p.y]).collect()
    }

    /// Neighbor faces, three per face; `None` on the mesh boundary.
    pub fn neighbor_list(&self) -> Vec<Option<usize>> {
        self.neighbors.iter().flatten().copied().collect()
    }

    /// Segment flags, three per face.
    pub fn segment_list(&self) -> Vec<bool> {
        self.segments.iter().flatten().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_keeps_indices() {
        let mut store = MeshStore::new();
        for i in 0..100 {
            assert_eq!(store.add_point(Point2::new(i as f64, 0.0), None), i);
        }
        for i in 0..50 {
            assert_eq!(store.add_face(i, i + 1, i + 2), i);
        }
        assert_eq!(store.point(42), Point2::new(42.0, 0.0));
        assert_eq!(store.face(7), [7, 8, 9]);
        assert_eq!(store.face_neighbors(7), [None; 3]);
        assert_eq!(store.indices().len(), 150);
        assert_eq!(store.coordinates().len(), 200);
    }

    #[test]
    fn weights_follow_points() {
        let mut store = MeshStore::new();
        store.add_point(Point2::new(0.0, 0.0), None);
        store.add_point(Point2::new(1.0, 0.0), None);
        assert!(matches!(
            store.set_weights(Some(&[1.0][..])),
            Err(MeshError::WeightCountMismatch {
                expected: 2,
                found: 1
            })
        ));
        store.set_weights(Some(&[1.0, 2.0][..])).unwrap();
        store.add_point(Point2::new(2.0, 0.0), Some(0.5));
        store.add_point(Point2::new(3.0, 0.0), None);
        assert_eq!(store.weights(), Some(&[1.0, 2.0, 0.5, 1.0][..]));
        store.set_weights(None).unwrap();
        assert!(!store.has_weights());
    }

    #[test]
    fn index_checks() {
        let mut store = MeshStore::new();
        store.add_point(Point2::new(0.0, 0.0), None);
        store.add_face(0, 0, 0);
        assert!(store.check_face(0).is_ok());
        assert!(store.check_face(1).is_err());
        assert!(store.check_point(1).is_err());
        assert!(MeshStore::check_edge(3).is_err());
    }
}
