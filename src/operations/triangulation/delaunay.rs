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

use smallvec::{SmallVec, smallvec};
use tracing::trace;

use crate::error::{MeshError, Result};
use crate::geometry::{Point2, circumcenter};
use crate::kernel::{incircle, orient2d};
use crate::mesh::{Insertion, Location, MeshHook, MeshStore};

/// Incremental constrained Delaunay triangulation over a [`MeshStore`].
///
/// All mutations report the faces they touch to a [`MeshHook`] so dependent
/// caches can stay in sync. Segment edges are never flipped.
#[derive(Debug, Clone, Default)]
pub struct Triangulation {
    pub(crate) store: MeshStore,
}

impl Triangulation {
    pub fn from_store(store: MeshStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &MeshStore {
        &self.store
    }

    pub fn face_count(&self) -> usize {
        self.store.face_count()
    }

    pub fn point_count(&self) -> usize {
        self.store.point_count()
    }

    /// Circumcenter of face `f`; `None` for a degenerate face.
    pub fn circumcenter(&self, f: usize) -> Result<Option<Point2<f64>>> {
        self.store.check_face(f)?;
        Ok(self.face_circumcenter(f))
    }

    pub(crate) fn face_circumcenter(&self, f: usize) -> Option<Point2<f64>> {
        let [a, b, c] = self.store.face_points(f);
        circumcenter(&a, &b, &c)
    }

    /* ========= Point location ========= */

    /// Locates `p`, walking from the most recently created face.
    pub fn find_triangle(&self, p: Point2<f64>) -> Location {
        match self.store.face_count() {
            0 => Location::Outside { face: 0, edge: 0 },
            n => self.walk(n - 1, p),
        }
    }

    /// Locates `p` by walking along the straight line from the centroid of
    /// `start` towards `p`.
    ///
    /// When the line leaves the mesh the boundary edge it crosses is
    /// reported as [`Location::Outside`]. Zero orientations are exact, so a
    /// point reported on an edge lies exactly on it.
    pub fn locate_from(&self, start: usize, p: Point2<f64>) -> Result<Location> {
        self.store.check_face(start)?;
        Ok(self.walk(start, p))
    }

    pub(crate) fn walk(&self, start: usize, p: Point2<f64>) -> Location {
        let store = &self.store;
        let s = store.centroid(start);
        let mut f = start;
        let mut prev: Option<usize> = None;

        for _ in 0..=store.face_count() {
            let sides = self.edge_sides(f, &p);
            if sides.iter().all(|o| *o != Ordering::Less) {
                return classify(f, &sides);
            }

            let v = store.face(f);
            let mut exit: Option<usize> = None;
            for e in 0..3 {
                if sides[e] != Ordering::Less {
                    continue;
                }
                let next = store.neighbor(f, e);
                if next.is_some() && next == prev {
                    continue;
                }
                let a = store.point(v[(e + 1) % 3]);
                let b = store.point(v[(e + 2) % 3]);
                let oa = orient2d(&s, &p, &a);
                let ob = orient2d(&s, &p, &b);
                if oa == Ordering::Equal || ob == Ordering::Equal || oa != ob {
                    exit = Some(e);
                    break;
                }
                exit.get_or_insert(e);
            }

            let Some(e) = exit else { break };
            match store.neighbor(f, e) {
                Some(n) => {
                    prev = Some(f);
                    f = n;
                }
                None => return Location::Outside { face: f, edge: e },
            }
        }

        trace!(start, "walk did not settle; scanning all faces");
        self.scan_locate(start, p)
    }

    fn edge_sides(&self, f: usize, p: &Point2<f64>) -> [Ordering; 3] {
        let v = self.store.face(f);
        let mut sides = [Ordering::Equal; 3];
        for (e, side) in sides.iter_mut().enumerate() {
            let a = self.store.point(v[(e + 1) % 3]);
            let b = self.store.point(v[(e + 2) % 3]);
            *side = orient2d(&a, &b, p);
        }
        sides
    }

    fn scan_locate(&self, start: usize, p: Point2<f64>) -> Location {
        for f in 0..self.store.face_count() {
            let sides = self.edge_sides(f, &p);
            if sides.iter().all(|o| *o != Ordering::Less) {
                return classify(f, &sides);
            }
        }
        // outside: report a boundary edge of the start face if it has one
        let edge = (0..3)
            .find(|&e| self.store.neighbor(start, e).is_none())
            .unwrap_or(0);
        Location::Outside { face: start, edge }
    }

    /// Face and edge index of the edge joining `u` and `v`, if present.
    pub fn find_edge(&self, u: usize, v: usize) -> Option<(usize, usize)> {
        (0..self.store.face_count()).find_map(|f| {
            (0..3).find_map(|e| {
                let (a, b) = self.store.edge_vertices(f, e);
                ((a == u && b == v) || (a == v && b == u)).then_some((f, e))
            })
        })
    }

    /* ========= Insertion ========= */

    /// Adds `p` inside `face` and legalizes the new edges.
    pub fn insert_in_face(
        &mut self,
        face: usize,
        p: Point2<f64>,
        weight: Option<f64>,
        hook: &mut dyn MeshHook,
    ) -> Result<Insertion> {
        self.store.check_face(face)?;
        let v = self.store.add_point(p, weight);
        self.split_triangle(face, v, hook)
    }

    /// Adds `p` on edge `edge` of `face`, splitting both adjacent faces, and
    /// legalizes the new edges. A split segment stays a segment on both
    /// halves.
    pub fn insert_on_edge(
        &mut self,
        face: usize,
        edge: usize,
        p: Point2<f64>,
        weight: Option<f64>,
        hook: &mut dyn MeshHook,
    ) -> Result<Insertion> {
        self.store.check_face(face)?;
        MeshStore::check_edge(edge)?;
        let v = self.store.add_point(p, weight);
        self.split_edge(face, edge, v, hook)
    }

    /// Splits `f` into three faces around the stored vertex `v`.
    pub fn split_triangle(
        &mut self,
        f: usize,
        v: usize,
        hook: &mut dyn MeshHook,
    ) -> Result<Insertion> {
        self.store.check_face(f)?;
        self.store.check_point(v)?;
        let store = &mut self.store;
        let [v0, v1, v2] = store.face(f);
        let n = store.face_neighbors(f);
        let s = store.face_segments(f);

        let c0 = store.add_face(v1, v2, v);
        let c1 = store.add_face(v2, v0, v);
        store.set_face(f, [v0, v1, v]);

        store.set_neighbors(f, [Some(c0), Some(c1), n[2]]);
        store.set_segments(f, [false, false, s[2]]);
        store.set_neighbors(c0, [Some(c1), Some(f), n[0]]);
        store.set_segments(c0, [false, false, s[0]]);
        store.set_neighbors(c1, [Some(f), Some(c0), n[1]]);
        store.set_segments(c1, [false, false, s[1]]);

        store.replace_neighbor(n[0], f, c0);
        store.replace_neighbor(n[1], f, c1);

        trace!(face = f, vertex = v, "split triangle");
        hook.faces_changed(&self.store, &[f, c0, c1]);

        let mut insertion = Insertion {
            vertex: v,
            faces: smallvec![f, c0, c1],
        };
        self.legalize(v, &[f, c0, c1], &mut insertion, hook);
        Ok(insertion)
    }

    /// Splits edge `e` of `f` at the stored vertex `v`.
    pub fn split_edge(
        &mut self,
        f: usize,
        e: usize,
        v: usize,
        hook: &mut dyn MeshHook,
    ) -> Result<Insertion> {
        self.store.check_face(f)?;
        MeshStore::check_edge(e)?;
        self.store.check_point(v)?;
        let store = &mut self.store;
        let fv = store.face(f);
        let (o, a, b) = (fv[e], fv[(e + 1) % 3], fv[(e + 2) % 3]);
        let nf = store.face_neighbors(f);
        let sf = store.face_segments(f);
        let seg = sf[e];
        let (e1, e2) = ((e + 1) % 3, (e + 2) % 3);

        let mut faces: SmallVec<[usize; 4]> = SmallVec::new();
        match nf[e] {
            Some(n) => {
                let ne = store.neighbor_edge(n, f).ok_or_else(|| {
                    MeshError::InvalidState(format!("face {n} does not link back to {f}"))
                })?;
                let q = store.face(n)[ne];
                let nn = store.face_neighbors(n);
                let sn = store.face_segments(n);
                let (ne1, ne2) = ((ne + 1) % 3, (ne + 2) % 3);

                let c = store.add_face(o, v, b);
                let c2 = store.add_face(q, v, a);
                store.set_face(f, [o, a, v]);
                store.set_face(n, [q, b, v]);

                store.set_neighbors(f, [Some(c2), Some(c), nf[e2]]);
                store.set_segments(f, [seg, false, sf[e2]]);
                store.set_neighbors(c, [Some(n), nf[e1], Some(f)]);
                store.set_segments(c, [seg, sf[e1], false]);
                store.set_neighbors(n, [Some(c), Some(c2), nn[ne2]]);
                store.set_segments(n, [seg, false, sn[ne2]]);
                store.set_neighbors(c2, [Some(f), nn[ne1], Some(n)]);
                store.set_segments(c2, [seg, sn[ne1], false]);

                store.replace_neighbor(nf[e1], f, c);
                store.replace_neighbor(nn[ne1], n, c2);
                faces.extend([f, c, n, c2]);
            }
            None => {
                let c = store.add_face(o, v, b);
                store.set_face(f, [o, a, v]);

                store.set_neighbors(f, [None, Some(c), nf[e2]]);
                store.set_segments(f, [seg, false, sf[e2]]);
                store.set_neighbors(c, [None, nf[e1], Some(f)]);
                store.set_segments(c, [seg, sf[e1], false]);

                store.replace_neighbor(nf[e1], f, c);
                faces.extend([f, c]);
            }
        }

        trace!(face = f, edge = e, vertex = v, segment = seg, "split edge");
        hook.faces_changed(&self.store, &faces);

        let mut insertion = Insertion {
            vertex: v,
            faces: faces.iter().copied().collect(),
        };
        self.legalize(v, &faces, &mut insertion, hook);
        Ok(insertion)
    }

    /* ========= Flips ========= */

    /// Replaces the diagonal shared by `f` and its neighbor across `e` with
    /// the other diagonal of their quadrilateral.
    ///
    /// Afterwards `f` keeps the vertex opposite `e` at slot 0 and the
    /// neighbor's opposite vertex sits at slot 2; the neighbor has them at
    /// slots 2 and 0.
    pub fn flip_edge(&mut self, f: usize, e: usize, hook: &mut dyn MeshHook) -> Result<usize> {
        self.store.check_face(f)?;
        MeshStore::check_edge(e)?;
        let store = &mut self.store;
        if store.is_segment(f, e) {
            return Err(MeshError::ProtectedSegment { face: f, edge: e });
        }
        let n = store
            .neighbor(f, e)
            .ok_or(MeshError::NoNeighbor { face: f, edge: e })?;
        let ne = store
            .neighbor_edge(n, f)
            .ok_or_else(|| MeshError::InvalidState(format!("face {n} does not link back to {f}")))?;

        let fv = store.face(f);
        let (o, a, b) = (fv[e], fv[(e + 1) % 3], fv[(e + 2) % 3]);
        let q = store.face(n)[ne];
        let nf = store.face_neighbors(f);
        let sf = store.face_segments(f);
        let nn = store.face_neighbors(n);
        let sn = store.face_segments(n);
        let (e1, e2) = ((e + 1) % 3, (e + 2) % 3);
        let (ne1, ne2) = ((ne + 1) % 3, (ne + 2) % 3);

        store.set_face(f, [o, a, q]);
        store.set_face(n, [q, b, o]);
        store.set_neighbors(f, [nn[ne1], Some(n), nf[e2]]);
        store.set_segments(f, [sn[ne1], false, sf[e2]]);
        store.set_neighbors(n, [nf[e1], Some(f), nn[ne2]]);
        store.set_segments(n, [sf[e1], false, sn[ne2]]);

        store.replace_neighbor(nn[ne1], n, f);
        store.replace_neighbor(nf[e1], f, n);

        trace!(face = f, neighbor = n, "flip edge");
        hook.faces_changed(&self.store, &[f, n]);
        Ok(n)
    }

    /// Whether the quadrilateral around edge `e` of `f` is strictly convex,
    /// i.e. whether the edge can be flipped geometrically.
    pub(crate) fn flippable(&self, f: usize, e: usize) -> bool {
        let store = &self.store;
        let Some(n) = store.neighbor(f, e) else {
            return false;
        };
        let Some(ne) = store.neighbor_edge(n, f) else {
            return false;
        };
        let fv = store.face(f);
        let o = store.point(fv[e]);
        let a = store.point(fv[(e + 1) % 3]);
        let b = store.point(fv[(e + 2) % 3]);
        let q = store.point(store.face(n)[ne]);
        orient2d(&o, &a, &q) == Ordering::Greater && orient2d(&q, &b, &o) == Ordering::Greater
    }

    /// True iff the edge is unconstrained and the opposite vertex of the
    /// neighboring face lies strictly inside the circumcircle of `f`.
    pub fn edge_illegal(&self, f: usize, e: usize) -> Result<bool> {
        self.store.check_face(f)?;
        MeshStore::check_edge(e)?;
        Ok(self.illegal(f, e))
    }

    pub(crate) fn illegal(&self, f: usize, e: usize) -> bool {
        let store = &self.store;
        if store.is_segment(f, e) {
            return false;
        }
        let Some(n) = store.neighbor(f, e) else {
            return false;
        };
        let Some(ne) = store.neighbor_edge(n, f) else {
            return false;
        };
        let [a, b, c] = store.face_points(f);
        let q = store.point(store.face(n)[ne]);
        incircle(&a, &b, &c, &q) == Ordering::Greater
    }

    /// Lawson flips around the freshly inserted vertex `v` until every edge
    /// opposite `v` is legal.
    fn legalize(
        &mut self,
        v: usize,
        faces: &[usize],
        insertion: &mut Insertion,
        hook: &mut dyn MeshHook,
    ) {
        let mut stack: Vec<usize> = faces.to_vec();
        while let Some(g) = stack.pop() {
            let Some(slot) = self.store.vertex_slot(g, v) else {
                continue;
            };
            if !self.illegal(g, slot) || !self.flippable(g, slot) {
                continue;
            }
            // slot checks above rule out every error case
            if let Ok(n) = self.flip_edge(g, slot, hook) {
                insertion.touch(g);
                insertion.touch(n);
                stack.push(g);
                stack.push(n);
            }
        }
    }

    /// Flips every illegal, unconstrained edge until the whole triangulation
    /// is constrained Delaunay. Returns the number of flips.
    pub fn make_delaunay(&mut self, hook: &mut dyn MeshHook) -> usize {
        let mut stack: Vec<(usize, usize)> = (0..self.store.face_count())
            .flat_map(|f| (0..3).map(move |e| (f, e)))
            .collect();
        let mut flips = 0;
        while let Some((f, e)) = stack.pop() {
            if !self.illegal(f, e) || !self.flippable(f, e) {
                continue;
            }
            if let Ok(n) = self.flip_edge(f, e, hook) {
                flips += 1;
                for g in [f, n] {
                    stack.extend((0..3).map(|k| (g, k)));
                }
            }
        }
        flips
    }

    /* ========= Diagnostics ========= */

    /// Checks orientation, neighbor symmetry and segment symmetry of every face.
    pub fn validate(&self) -> Result<()> {
        let store = &self.store;
        let count = store.face_count();
        for f in 0..count {
            let v = store.face(f);
            if v.iter().any(|&i| i >= store.point_count()) {
                return Err(MeshError::InvalidState(format!(
                    "face {f} references a missing point"
                )));
            }
            let [a, b, c] = store.face_points(f);
            if orient2d(&a, &b, &c) != Ordering::Greater {
                return Err(MeshError::InvalidState(format!(
                    "face {f} is not counter-clockwise"
                )));
            }
            for e in 0..3 {
                let Some(n) = store.neighbor(f, e) else {
                    continue;
                };
                if n >= count {
                    return Err(MeshError::InvalidState(format!(
                        "face {f} links to missing face {n}"
                    )));
                }
                let Some(ne) = store.neighbor_edge(n, f) else {
                    return Err(MeshError::InvalidState(format!(
                        "face {n} does not link back to {f}"
                    )));
                };
                let (p, q) = store.edge_vertices(f, e);
                if store.edge_vertices(n, ne) != (q, p) {
                    return Err(MeshError::InvalidState(format!(
                        "faces {f} and {n} disagree on their shared edge"
                    )));
                }
                if store.is_segment(f, e) != store.is_segment(n, ne) {
                    return Err(MeshError::InvalidState(format!(
                        "segment flag differs across faces {f} and {n}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Unconstrained edges violating the empty-circumcircle property.
    pub fn delaunay_violations(&self) -> Vec<(usize, usize)> {
        (0..self.store.face_count())
            .flat_map(|f| (0..3).map(move |e| (f, e)))
            .filter(|&(f, e)| self.illegal(f, e))
            .collect()
    }
}

fn classify(f: usize, sides: &[Ordering; 3]) -> Location {
    let zeros: SmallVec<[usize; 3]> = (0..3).filter(|&e| sides[e] == Ordering::Equal).collect();
    match zeros.as_slice() {
        [] => Location::Inside { face: f },
        [e] => Location::OnEdge { face: f, edge: *e },
        [e1, e2] => Location::OnVertex {
            face: f,
            vertex: 3 - e1 - e2,
        },
        // degenerate face; treat as containing the point
        _ => Location::Inside { face: f },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::NoHook;

    fn two_triangles() -> Triangulation {
        let mut store = MeshStore::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            store.add_point(Point2::new(x, y), None);
        }
        let f0 = store.add_face(0, 1, 2);
        let f1 = store.add_face(0, 2, 3);
        // edge opposite vertex 1 of f0 is (2, 0); edge opposite vertex 2 of f1 is (0, 2)
        store.set_neighbors(f0, [None, Some(f1), None]);
        store.set_neighbors(f1, [None, None, Some(f0)]);
        Triangulation::from_store(store)
    }

    #[test]
    fn locate_inside_edge_vertex() {
        let tri = two_triangles();
        assert_eq!(
            tri.find_triangle(Point2::new(0.9, 0.1)),
            Location::Inside { face: 0 }
        );
        assert!(matches!(
            tri.find_triangle(Point2::new(0.5, 0.5)),
            Location::OnEdge { .. }
        ));
        assert!(matches!(
            tri.find_triangle(Point2::new(1.0, 1.0)),
            Location::OnVertex { .. }
        ));
        assert!(matches!(
            tri.locate_from(0, Point2::new(2.0, 0.5)),
            Ok(Location::Outside { face: 0, .. })
        ));
    }

    #[test]
    fn out_of_range_indices_are_errors() {
        let mut tri = two_triangles();
        let p = Point2::new(0.5, 0.5);
        assert_eq!(
            tri.locate_from(9, p),
            Err(MeshError::FaceOutOfRange { face: 9, count: 2 })
        );
        assert_eq!(
            tri.circumcenter(2),
            Err(MeshError::FaceOutOfRange { face: 2, count: 2 })
        );
        assert_eq!(tri.edge_illegal(0, 3), Err(MeshError::EdgeOutOfRange(3)));
        assert_eq!(
            tri.split_triangle(0, 7, &mut NoHook).unwrap_err(),
            MeshError::PointOutOfRange { point: 7, count: 4 }
        );
        assert_eq!(
            tri.split_edge(0, 5, 1, &mut NoHook).unwrap_err(),
            MeshError::EdgeOutOfRange(5)
        );
        assert_eq!(
            tri.insert_on_edge(4, 0, p, None, &mut NoHook).unwrap_err(),
            MeshError::FaceOutOfRange { face: 4, count: 2 }
        );
        assert_eq!(tri.point_count(), 4);
        assert_eq!(tri.face_count(), 2);
        let c = tri.circumcenter(0).unwrap().unwrap();
        assert_eq!(c, Point2::new(0.5, 0.5));
    }

    #[test]
    fn flip_and_split_keep_adjacency() {
        let mut tri = two_triangles();
        tri.validate().unwrap();
        tri.flip_edge(0, 1, &mut NoHook).unwrap();
        tri.validate().unwrap();

        let ins = tri
            .insert_in_face(0, Point2::new(0.7, 0.6), None, &mut NoHook)
            .unwrap();
        assert_eq!(ins.vertex, 4);
        assert_eq!(tri.face_count(), 4);
        tri.validate().unwrap();
        assert!(tri.delaunay_violations().is_empty());
    }

    #[test]
    fn segments_refuse_to_flip() {
        let mut tri = two_triangles();
        tri.store.set_segment(0, 1, true);
        tri.store.set_segment(1, 2, true);
        assert_eq!(
            tri.flip_edge(0, 1, &mut NoHook),
            Err(MeshError::ProtectedSegment { face: 0, edge: 1 })
        );
        assert_eq!(tri.edge_illegal(0, 1), Ok(false));
        assert_eq!(
            tri.flip_edge(0, 0, &mut NoHook),
            Err(MeshError::NoNeighbor { face: 0, edge: 0 })
        );
    }

    #[test]
    fn splitting_a_boundary_segment_keeps_both_halves() {
        let mut tri = two_triangles();
        tri.store.set_segment(0, 2, true);
        let ins = tri
            .insert_on_edge(0, 2, Point2::new(0.5, 0.0), None, &mut NoHook)
            .unwrap();
        tri.validate().unwrap();
        let halves: Vec<(usize, usize)> = ins
            .faces
            .iter()
            .flat_map(|&f| (0..3).map(move |e| (f, e)))
            .filter(|&(f, e)| tri.store().is_segment(f, e))
            .map(|(f, e)| tri.store().edge_vertices(f, e))
            .collect();
        assert_eq!(halves.len(), 2);
        assert!(halves.iter().all(|&(a, b)| a == 4 || b == 4));
    }
}
