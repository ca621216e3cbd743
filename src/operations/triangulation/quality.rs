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

//! Per-face angle and area cache with size grading by point weights.

use tracing::trace;

use crate::geometry::{Point2, barycentric, det};
use crate::mesh::{MeshHook, MeshStore};

/// Cached angle cosines and (weighted) areas of every face, together with
/// the thresholds that make a face "bad".
///
/// The cache is kept current through [`MeshHook`]; every recomputed face
/// that turns out bad is queued and can be drained with
/// [`QualityCache::take_pending`].
#[derive(Debug, Clone)]
pub struct QualityCache {
    cos_angles: Vec<[f64; 3]>,
    areas: Vec<f64>,
    cos_least_angle: f64,
    largest_area: f64,
    pending: Vec<usize>,
}

impl Default for QualityCache {
    fn default() -> Self {
        Self {
            cos_angles: Vec::new(),
            areas: Vec::new(),
            cos_least_angle: 1.0,
            largest_area: f64::INFINITY,
            pending: Vec::new(),
        }
    }
}

impl QualityCache {
    pub fn new(store: &MeshStore) -> Self {
        let mut cache = Self::default();
        cache.recompute_all(store);
        cache
    }

    /// Recomputes the cosines of the interior angles and the weighted area
    /// of face `f`, queueing it when it is bad.
    ///
    /// The cosine at vertex `i` is stored at slot `i`.
    pub fn compute_angle_and_area(&mut self, store: &MeshStore, f: usize) {
        if f >= self.areas.len() {
            self.cos_angles.resize(f + 1, [0.0; 3]);
            self.areas.resize(f + 1, 0.0);
        }

        let [p0, p1, p2] = store.face_points(f);
        let e0 = p1 - p0;
        let e1 = p2 - p1;
        let e2 = p0 - p2;
        let (l0, l1, l2) = (e0.norm(), e1.norm(), e2.norm());
        self.cos_angles[f] = [
            -e0.dot(&e2) / (l0 * l2),
            -e0.dot(&e1) / (l0 * l1),
            -e1.dot(&e2) / (l1 * l2),
        ];
        self.areas[f] = weighted_area(store, f);

        if self.bad(f) {
            self.pending.push(f);
        }
    }

    pub fn recompute_all(&mut self, store: &MeshStore) {
        self.cos_angles.truncate(store.face_count());
        self.areas.truncate(store.face_count());
        for f in 0..store.face_count() {
            self.compute_angle_and_area(store, f);
        }
    }

    /// A face is bad when one of its angles is below the angle threshold or
    /// its weighted area exceeds the area threshold.
    pub fn bad(&self, f: usize) -> bool {
        self.bad_with(f, self.cos_least_angle, self.largest_area)
    }

    pub fn bad_with(&self, f: usize, cos_least_angle: f64, largest_area: f64) -> bool {
        self.cos_angles[f].iter().any(|&c| c > cos_least_angle) || self.areas[f] > largest_area
    }

    /// All currently bad faces in index order.
    pub fn bad_faces(&self) -> Vec<usize> {
        (0..self.areas.len()).filter(|&f| self.bad(f)).collect()
    }

    /// Drains the faces queued since the last call.
    pub fn take_pending(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.pending)
    }

    pub fn cos_angles(&self, f: usize) -> [f64; 3] {
        self.cos_angles[f]
    }

    pub fn area(&self, f: usize) -> f64 {
        self.areas[f]
    }

    pub fn cos_least_angle(&self) -> f64 {
        self.cos_least_angle
    }

    pub fn set_cos_least_angle(&mut self, cos: f64) {
        self.cos_least_angle = cos;
    }

    pub fn largest_area_constraint(&self) -> f64 {
        self.largest_area
    }

    pub fn set_largest_area(&mut self, area: f64) {
        self.largest_area = area;
    }

    /// Thresholds that accept the current mesh as is: the worst observed
    /// cosine and slightly more than the largest observed area.
    pub fn adopt_current_as_thresholds(&mut self) {
        self.cos_least_angle = self.max_cos();
        self.largest_area = 1.01 * self.max_area();
        trace!(
            cos = self.cos_least_angle,
            area = self.largest_area,
            "default quality thresholds"
        );
    }

    /// Largest angle cosine over all faces, i.e. the cosine of the smallest
    /// angle.
    pub fn max_cos(&self) -> f64 {
        self.cos_angles
            .iter()
            .flatten()
            .fold(0.0_f64, |acc, &c| acc.max(c))
    }

    pub fn max_area(&self) -> f64 {
        self.areas.iter().fold(0.0_f64, |acc, &a| acc.max(a))
    }

    /// Smallest interior angle of the mesh in degrees.
    pub fn least_angle(&self) -> f64 {
        self.max_cos().clamp(-1.0, 1.0).acos().to_degrees()
    }
}

impl MeshHook for QualityCache {
    fn faces_changed(&mut self, store: &MeshStore, faces: &[usize]) {
        for &f in faces {
            self.compute_angle_and_area(store, f);
        }
    }
}

/// Area of `f`, scaled by the mean squared weight of its vertices when
/// weights are active.
pub fn weighted_area(store: &MeshStore, f: usize) -> f64 {
    let [a, b, c] = store.face_points(f);
    let area = det(&a, &b, &c) / 2.0;
    match store.weights() {
        Some(w) => {
            let [i, j, k] = store.face(f);
            area * (w[i] * w[i] + w[j] * w[j] + w[k] * w[k]) / 3.0
        }
        None => area,
    }
}

/// Weight at `p` interpolated linearly over face `f`, or `None` when
/// weights are inactive.
pub fn interpolated_weight(store: &MeshStore, f: usize, p: &Point2<f64>) -> Option<f64> {
    let w = store.weights()?;
    let [i, j, k] = store.face(f);
    let [a, b, c] = store.face_points(f);
    Some(match barycentric(p, &a, &b, &c) {
        Some((l0, l1, l2)) => l0 * w[i] + l1 * w[j] + l2 * w[k],
        None => (w[i] + w[j] + w[k]) / 3.0,
    })
}

/// Squared distance between stored points `i` and `j`, scaled by the mean of
/// their weights.
pub fn weighted_distance_sqr(store: &MeshStore, i: usize, j: usize) -> f64 {
    let d = store.point(i).distance_sqr(&store.point(j));
    match store.weights() {
        Some(w) => d * 0.5 * (w[i] + w[j]),
        None => d,
    }
}

/// Squared distance from a candidate `p` inside face `f` to vertex slot `k`
/// of that face. The candidate's weight is interpolated over `f`.
pub fn candidate_distance_sqr(store: &MeshStore, f: usize, k: usize, p: &Point2<f64>) -> f64 {
    let v = store.face(f)[k];
    let d = store.point(v).distance_sqr(p);
    match (store.weight(v), interpolated_weight(store, f, p)) {
        (Some(wv), Some(wp)) => d * 0.5 * (wv + wp),
        _ => d,
    }
}

/// Shortest (weighted) squared edge length, each edge counted once.
pub fn least_edge_sqr(store: &MeshStore) -> f64 {
    let mut least = f64::INFINITY;
    for f in 0..store.face_count() {
        for e in 0..3 {
            if store.neighbor(f, e).is_some_and(|n| n < f) {
                continue;
            }
            let (i, j) = store.edge_vertices(f, e);
            least = least.min(weighted_distance_sqr(store, i, j));
        }
    }
    least
}
