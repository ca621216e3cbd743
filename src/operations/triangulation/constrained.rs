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

//! Constrained Delaunay triangulation of polygonal boundary loops.

use std::collections::VecDeque;
use std::ops::Range;

use ahash::AHashMap;
use tracing::debug;

use crate::error::{MeshError, Result};
use crate::geometry::Point2;
use crate::kernel::{orient2d_value, point_in_open_segment, segments_properly_intersect};
use crate::mesh::{Location, MeshStore, NoHook};
use crate::operations::triangulation::delaunay::Triangulation;

/// Scale of the enclosing triangle relative to the input bounding box.
const SUPER_SCALE: f64 = 20.0;

/// Boundary loops reduced to points and per-loop index ranges.
struct Boundary {
    points: Vec<Point2<f64>>,
    loops: Vec<Range<usize>>,
}

impl Boundary {
    fn parse(loops: &[Vec<f64>]) -> Result<Self> {
        if loops.is_empty() {
            return Err(MeshError::NoBoundary);
        }

        let mut points = Vec::new();
        let mut ranges = Vec::with_capacity(loops.len());
        for (index, coords) in loops.iter().enumerate() {
            if coords.len() % 2 != 0 {
                return Err(MeshError::InvalidLoop {
                    index,
                    reason: "odd number of coordinates",
                });
            }
            let mut ring: Vec<Point2<f64>> = Vec::with_capacity(coords.len() / 2);
            for xy in coords.chunks_exact(2) {
                let p = Point2::new(xy[0], xy[1]);
                if !p.is_finite() {
                    return Err(MeshError::InvalidLoop {
                        index,
                        reason: "non-finite coordinate",
                    });
                }
                if ring.last() != Some(&p) {
                    ring.push(p);
                }
            }
            if ring.len() > 1 && ring.first() == ring.last() {
                ring.pop();
            }
            if ring.len() < 3 {
                return Err(MeshError::InvalidLoop {
                    index,
                    reason: "fewer than 3 distinct points",
                });
            }
            if ring_area2(&ring) == 0.0 {
                return Err(MeshError::InvalidLoop {
                    index,
                    reason: "zero enclosed area",
                });
            }

            let start = points.len();
            points.extend(ring);
            ranges.push(start..points.len());
        }

        let mut seen: AHashMap<(u64, u64), usize> = AHashMap::with_capacity(points.len());
        for (i, p) in points.iter().enumerate() {
            if let Some(&original) = seen.get(&p.bits()) {
                return Err(MeshError::DuplicatePoint {
                    original,
                    duplicate: i,
                });
            }
            seen.insert(p.bits(), i);
        }

        Ok(Self {
            points,
            loops: ranges,
        })
    }

    fn segments(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.loops.iter().flat_map(|r| {
            let (start, end) = (r.start, r.end);
            (start..end).map(move |i| (i, if i + 1 == end { start } else { i + 1 }))
        })
    }

    fn super_triangle(&self) -> [Point2<f64>; 3] {
        let (mut lo, mut hi) = (self.points[0], self.points[0]);
        for p in &self.points {
            lo = Point2::new(lo.x.min(p.x), lo.y.min(p.y));
            hi = Point2::new(hi.x.max(p.x), hi.y.max(p.y));
        }
        let c = lo.midpoint(&hi);
        let d = (hi.x - lo.x).max(hi.y - lo.y);
        [
            Point2::new(c.x - SUPER_SCALE * d, c.y - 0.5 * SUPER_SCALE * d),
            Point2::new(c.x + SUPER_SCALE * d, c.y - 0.5 * SUPER_SCALE * d),
            Point2::new(c.x, c.y + SUPER_SCALE * d),
        ]
    }
}

impl Triangulation {
    /// Builds the constrained Delaunay triangulation of the region bounded
    /// by `loops`.
    ///
    /// Each loop is a flat `x, y` list and is implicitly closed. Loop 0 is
    /// the outer boundary, further loops cut holes or add islands by the
    /// even-odd rule. Points keep their input order as indices, after
    /// dropping repeated consecutive points and a closing copy of the first.
    pub fn from_loops(loops: &[Vec<f64>]) -> Result<Self> {
        let boundary = Boundary::parse(loops)?;
        let n = boundary.points.len();

        let mut store = MeshStore::with_capacity(n + 3, 2 * n + 8);
        for p in &boundary.points {
            store.add_point(*p, None);
        }
        let [s0, s1, s2] = boundary.super_triangle().map(|p| store.add_point(p, None));
        store.add_face(s0, s1, s2);
        let mut tri = Triangulation::from_store(store);

        for v in 0..n {
            match tri.find_triangle(boundary.points[v]) {
                Location::Inside { face } => {
                    tri.split_triangle(face, v, &mut NoHook)?;
                }
                Location::OnEdge { face, edge } => {
                    tri.split_edge(face, edge, v, &mut NoHook)?;
                }
                Location::OnVertex { face, vertex } => {
                    return Err(MeshError::DuplicatePoint {
                        original: tri.store.face(face)[vertex],
                        duplicate: v,
                    });
                }
                Location::Outside { .. } => {
                    return Err(MeshError::InvalidState(format!(
                        "point {v} escaped the enclosing triangle"
                    )));
                }
            }
        }

        for (a, b) in boundary.segments() {
            tri.recover_segment(a, b, n)?;
        }
        let flips = tri.make_delaunay(&mut NoHook);

        let keep = tri.interior_faces();
        let tri = tri.compact(n, &keep);
        debug!(
            points = n,
            loops = boundary.loops.len(),
            faces = tri.face_count(),
            flips,
            "seeded constrained triangulation"
        );
        Ok(tri)
    }

    /// Forces the edge `a`-`b` into the triangulation and marks it as a
    /// segment on both sides. Crossing edges are flipped away in queue order.
    fn recover_segment(&mut self, a: usize, b: usize, inputs: usize) -> Result<()> {
        let pa = self.store.point(a);
        let pb = self.store.point(b);

        if self.find_edge(a, b).is_none() {
            if let Some(vertex) = (0..inputs)
                .filter(|&v| v != a && v != b)
                .find(|&v| point_in_open_segment(&pa, &pb, &self.store.point(v)))
            {
                return Err(MeshError::SegmentThroughVertex { a, b, vertex });
            }

            let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
            for f in 0..self.store.face_count() {
                for e in 0..3 {
                    if !self.store.neighbor(f, e).is_some_and(|g| g > f) {
                        continue;
                    }
                    let (u, w) = self.store.edge_vertices(f, e);
                    if self.crosses(a, b, u, w) {
                        queue.push_back((u, w));
                    }
                }
            }

            let mut budget = 64 * (queue.len() + 1) * (queue.len() + 1) + self.store.face_count();
            while let Some((u, w)) = queue.pop_front() {
                budget = budget.saturating_sub(1);
                if budget == 0 {
                    return Err(MeshError::UnrecoverableSegment { a, b });
                }
                let (f, e) = self.find_edge(u, w).ok_or_else(|| {
                    MeshError::InvalidState(format!("crossing edge ({u}, {w}) vanished"))
                })?;
                if self.store.is_segment(f, e) {
                    return Err(MeshError::UnrecoverableSegment { a, b });
                }
                if !self.flippable(f, e) {
                    queue.push_back((u, w));
                    continue;
                }
                self.flip_edge(f, e, &mut NoHook)?;
                // the new diagonal is edge 1 of `f`
                let (p, q) = self.store.edge_vertices(f, 1);
                if self.crosses(a, b, p, q) {
                    queue.push_back((p, q));
                }
            }
        }

        let (f, e) = self
            .find_edge(a, b)
            .ok_or(MeshError::UnrecoverableSegment { a, b })?;
        self.store.set_segment(f, e, true);
        if let Some(g) = self.store.neighbor(f, e) {
            if let Some(ge) = self.store.neighbor_edge(g, f) {
                self.store.set_segment(g, ge, true);
            }
        }
        Ok(())
    }

    fn crosses(&self, a: usize, b: usize, u: usize, w: usize) -> bool {
        if u == a || u == b || w == a || w == b {
            return false;
        }
        let s = &self.store;
        segments_properly_intersect(&s.point(a), &s.point(b), &s.point(u), &s.point(w))
    }

    /// Even-odd classification: the number of segments crossed on the way
    /// from the enclosing triangle decides whether a face is inside.
    fn interior_faces(&self) -> Vec<bool> {
        let count = self.store.face_count();
        let first_super = self.store.point_count() - 3;
        let mut depth = vec![usize::MAX; count];
        let mut queue = VecDeque::new();
        for f in 0..count {
            if self.store.face(f).iter().any(|&v| v >= first_super) {
                depth[f] = 0;
                queue.push_back(f);
            }
        }

        while let Some(f) = queue.pop_front() {
            for e in 0..3 {
                let Some(g) = self.store.neighbor(f, e) else {
                    continue;
                };
                let step = usize::from(self.store.is_segment(f, e));
                let d = depth[f] + step;
                if d < depth[g] {
                    depth[g] = d;
                    if step == 0 {
                        queue.push_front(g);
                    } else {
                        queue.push_back(g);
                    }
                }
            }
        }

        depth.into_iter().map(|d| d != usize::MAX && d % 2 == 1).collect()
    }

    /// Copies the kept faces and the first `inputs` points into a fresh store.
    fn compact(&self, inputs: usize, keep: &[bool]) -> Triangulation {
        let old = &self.store;
        let kept = keep.iter().filter(|k| **k).count();
        let mut remap: Vec<Option<usize>> = vec![None; old.face_count()];
        let mut store = MeshStore::with_capacity(inputs, kept);
        for p in &old.points()[..inputs] {
            store.add_point(*p, None);
        }

        for f in (0..old.face_count()).filter(|&f| keep[f]) {
            let [v0, v1, v2] = old.face(f);
            remap[f] = Some(store.add_face(v0, v1, v2));
        }
        for f in (0..old.face_count()).filter(|&f| keep[f]) {
            let Some(nf) = remap[f] else { continue };
            let neighbors = old.face_neighbors(f).map(|g| g.and_then(|g| remap[g]));
            store.set_neighbors(nf, neighbors);
            store.set_segments(nf, old.face_segments(f));
        }
        Triangulation::from_store(store)
    }
}

/// Twice the signed area enclosed by a ring of points.
fn ring_area2(ring: &[Point2<f64>]) -> f64 {
    match ring.first() {
        Some(origin) => ring
            .windows(2)
            .map(|w| orient2d_value(origin, &w[0], &w[1]))
            .sum(),
        None => 0.0,
    }
}
