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

//! Ruppert-style quality refinement of a constrained Delaunay mesh.

use tracing::{debug, trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MeshError, Result};
use crate::geometry::Point2;
use crate::mesh::{Insertion, Location, MeshStore};
use crate::operations::triangulation::delaunay::Triangulation;
use crate::operations::triangulation::quality::{
    QualityCache, candidate_distance_sqr, interpolated_weight, least_edge_sqr,
};

/// Absolute slack subtracted from the diametral circle in the
/// encroachment test. Scale dependent: segments shorter than `0.02` can no
/// longer be encroached.
pub const ENCROACHMENT_TOLERANCE: f64 = 1e-4;

pub const DEFAULT_MAX_TRIANGLES: usize = 100_000;

/// Quality targets for [`Ruppert::refine`].
///
/// `None` keeps the threshold derived from the seed mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QualityConstraints {
    /// Smallest acceptable interior angle in degrees.
    pub min_angle_degrees: Option<f64>,
    /// Largest acceptable (weighted) triangle area.
    pub max_area: Option<f64>,
    /// Refinement stops once the mesh has more triangles than this.
    pub max_triangles: usize,
}

impl Default for QualityConstraints {
    fn default() -> Self {
        Self {
            min_angle_degrees: None,
            max_area: None,
            max_triangles: DEFAULT_MAX_TRIANGLES,
        }
    }
}

impl QualityConstraints {
    pub fn new(min_angle_degrees: f64, max_area: f64) -> Self {
        Self {
            min_angle_degrees: Some(min_angle_degrees),
            max_area: Some(max_area),
            ..Self::default()
        }
    }

    pub fn with_max_triangles(mut self, max_triangles: usize) -> Self {
        self.max_triangles = max_triangles;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(a) = self.min_angle_degrees {
            check_angle(a)?;
        }
        if let Some(a) = self.max_area {
            check_area(a)?;
        }
        Ok(())
    }
}

fn check_angle(degrees: f64) -> Result<()> {
    if !(0.0..=60.0).contains(&degrees) {
        return Err(MeshError::invalid_param(
            "min_angle_degrees",
            degrees,
            "must lie in [0, 60]",
        ));
    }
    Ok(())
}

fn check_area(area: f64) -> Result<()> {
    if area.is_nan() || area <= 0.0 {
        return Err(MeshError::invalid_param("max_area", area, "must be positive"));
    }
    Ok(())
}

/// Counters reported by one refinement run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefineStats {
    /// Circumcenters inserted.
    pub inserted_points: usize,
    /// Segment bisections, including those triggered by encroachment checks.
    pub split_segments: usize,
    /// Bad triangles that could not be improved when visited.
    pub rejections: usize,
    pub sweeps: usize,
    /// Triangle count when refinement stopped.
    pub faces: usize,
    /// Whether the triangle budget stopped refinement.
    pub budget_exhausted: bool,
}

/// Quality mesh generator for polygonal regions.
///
/// Construction triangulates the boundary loops and splits every boundary
/// segment encroached by its own triangle. The default thresholds accept
/// that mesh, so [`Ruppert::refine`] changes nothing until angle or area
/// constraints are set.
///
/// ```
/// use ruppert::Ruppert;
///
/// let square = vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
/// let mut mesh = Ruppert::new(&[square]).unwrap();
/// mesh.set_angle_constraint(20.0).unwrap();
/// mesh.set_area_constraint(0.05).unwrap();
/// let stats = mesh.refine().unwrap();
/// assert!(stats.inserted_points > 0);
/// assert_eq!(mesh.indices().len(), 3 * mesh.face_count());
/// ```
#[derive(Debug, Clone)]
pub struct Ruppert {
    tri: Triangulation,
    quality: QualityCache,
    max_triangles: usize,
    sqr_least_distance: f64,
}

impl Ruppert {
    /// Triangulates `loops` (flat `x, y` lists, loop 0 is the outer
    /// boundary) and resolves segments encroached by the seed triangles.
    pub fn new(loops: &[Vec<f64>]) -> Result<Self> {
        let tri = Triangulation::from_loops(loops)?;
        let quality = QualityCache::new(tri.store());
        let mut mesh = Self {
            tri,
            quality,
            max_triangles: DEFAULT_MAX_TRIANGLES,
            sqr_least_distance: 0.0,
        };

        let mut stats = RefineStats::default();
        mesh.check_all_segments(&mut stats)?;
        mesh.quality.adopt_current_as_thresholds();
        mesh.quality.take_pending();
        debug!(
            faces = mesh.face_count(),
            points = mesh.point_count(),
            split_segments = stats.split_segments,
            "initial mesh ready"
        );
        Ok(mesh)
    }

    /// Builds the mesh and applies `constraints` in one step.
    pub fn with_constraints(loops: &[Vec<f64>], constraints: QualityConstraints) -> Result<Self> {
        constraints.validate()?;
        let mut mesh = Self::new(loops)?;
        mesh.set_constraints(constraints)?;
        Ok(mesh)
    }

    /* ========= Configuration ========= */

    /// Smallest acceptable angle in degrees. Takes effect on the next
    /// [`Ruppert::refine`].
    pub fn set_angle_constraint(&mut self, degrees: f64) -> Result<()> {
        check_angle(degrees)?;
        self.quality.set_cos_least_angle(degrees.to_radians().cos());
        Ok(())
    }

    pub fn angle_constraint(&self) -> f64 {
        self.quality.cos_least_angle().clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Largest acceptable (weighted) triangle area.
    pub fn set_area_constraint(&mut self, area: f64) -> Result<()> {
        check_area(area)?;
        self.quality.set_largest_area(area);
        Ok(())
    }

    pub fn area_constraint(&self) -> f64 {
        self.quality.largest_area_constraint()
    }

    pub fn set_maximal_number_of_triangles(&mut self, n: usize) {
        self.max_triangles = n;
    }

    pub fn maximal_number_of_triangles(&self) -> usize {
        self.max_triangles
    }

    pub fn set_constraints(&mut self, constraints: QualityConstraints) -> Result<()> {
        constraints.validate()?;
        if let Some(a) = constraints.min_angle_degrees {
            self.set_angle_constraint(a)?;
        }
        if let Some(a) = constraints.max_area {
            self.set_area_constraint(a)?;
        }
        self.max_triangles = constraints.max_triangles;
        Ok(())
    }

    pub fn constraints(&self) -> QualityConstraints {
        QualityConstraints {
            min_angle_degrees: Some(self.angle_constraint()),
            max_area: Some(self.area_constraint()),
            max_triangles: self.max_triangles,
        }
    }

    /// Installs per-point weights grading the target triangle size, or
    /// removes them with `None`.
    ///
    /// Weighted areas and distances are recomputed immediately.
    pub fn set_weight(&mut self, weights: Option<&[f64]>) -> Result<()> {
        self.tri.store.set_weights(weights)?;
        self.quality.recompute_all(self.tri.store());
        self.quality.take_pending();
        Ok(())
    }

    pub fn weight(&self) -> Option<Vec<f64>> {
        self.tri.store().weights().map(<[f64]>::to_vec)
    }

    /// Weight at `p` interpolated over face `face`; `None` without weights.
    pub fn interpolated_weight(&self, p: Point2<f64>, face: usize) -> Result<Option<f64>> {
        self.tri.store().check_face(face)?;
        Ok(interpolated_weight(self.tri.store(), face, &p))
    }

    /* ========= Refinement ========= */

    /// Refines until no bad triangle can be improved or the triangle budget
    /// is exceeded.
    pub fn refine(&mut self) -> Result<RefineStats> {
        self.update_least_distance();
        self.quality.take_pending();
        let worklist = self.quality.bad_faces();
        debug!(bad = worklist.len(), floor = self.sqr_least_distance, "start refining");
        self.run(worklist)
    }

    /// Runs the refinement loop seeded with the given triangles only.
    /// Triangles made bad along the way are still handled.
    pub fn refine_faces(&mut self, faces: &[usize]) -> Result<RefineStats> {
        for &f in faces {
            self.tri.store().check_face(f)?;
        }
        self.update_least_distance();
        self.quality.take_pending();
        self.run(faces.to_vec())
    }

    fn update_least_distance(&mut self) {
        let edge = least_edge_sqr(self.tri.store());
        self.sqr_least_distance = 0.25 * edge.min(self.quality.largest_area_constraint());
    }

    fn run(&mut self, mut worklist: Vec<usize>) -> Result<RefineStats> {
        let mut stats = RefineStats::default();
        loop {
            stats.sweeps += 1;
            let previous = worklist.len();
            let mut rejected: Vec<usize> = Vec::new();

            let mut i = 0;
            while i < worklist.len() {
                if self.face_count() > self.max_triangles {
                    stats.budget_exhausted = true;
                    break;
                }
                let f = worklist[i];
                i += 1;
                if self.quality.bad(f) {
                    self.resolve(f, &mut rejected, &mut stats)?;
                }
                worklist.extend(self.quality.take_pending());
            }
            stats.rejections += rejected.len();

            rejected.sort_unstable();
            rejected.dedup();
            rejected.retain(|&f| self.quality.bad(f));
            debug!(
                sweep = stats.sweeps,
                visited = i,
                still_bad = rejected.len(),
                faces = self.face_count(),
                "refinement sweep"
            );

            if stats.budget_exhausted || rejected.is_empty() || rejected.len() >= previous {
                break;
            }
            worklist = rejected;
        }

        if stats.budget_exhausted {
            warn!(
                max_triangles = self.max_triangles,
                faces = self.face_count(),
                "triangle budget reached, refinement stopped"
            );
        }
        stats.faces = self.face_count();
        debug!(
            least_angle = self.least_angle(),
            largest_area = self.largest_area(),
            faces = stats.faces,
            "refinement finished"
        );
        Ok(stats)
    }

    /// Tries to improve bad face `f` by inserting its circumcenter, or by
    /// splitting the boundary segment the circumcenter encroaches upon.
    fn resolve(&mut self, f: usize, rejected: &mut Vec<usize>, stats: &mut RefineStats) -> Result<()> {
        let Some(c) = self.tri.face_circumcenter(f) else {
            rejected.push(f);
            return Ok(());
        };

        let done = match self.tri.walk(f, c) {
            Location::Inside { face } => match self.first_encroached(face, &c) {
                Some(edge) => self.split_segment(face, edge, stats)?,
                None if !self.too_close(&c, face) => {
                    let w = interpolated_weight(self.tri.store(), face, &c);
                    let ins = self.tri.insert_in_face(face, c, w, &mut self.quality)?;
                    self.after_insertion(ins, stats)?;
                    true
                }
                None => false,
            },
            Location::OnEdge { face, edge } => {
                if self.tri.store().is_segment(face, edge) {
                    self.split_segment(face, edge, stats)?
                } else {
                    self.insert_on_interior_edge(face, edge, c, stats)?
                }
            }
            Location::OnVertex { .. } => false,
            Location::Outside { face, edge } => {
                self.tri.store().is_segment(face, edge) && self.split_segment(face, edge, stats)?
            }
        };

        if !done {
            trace!(face = f, "bad triangle rejected");
            rejected.push(f);
        }
        Ok(())
    }

    /// Circumcenter `c` lies on the unconstrained edge `edge` of `face`;
    /// both triangles sharing the edge must agree before inserting.
    fn insert_on_interior_edge(
        &mut self,
        face: usize,
        edge: usize,
        c: Point2<f64>,
        stats: &mut RefineStats,
    ) -> Result<bool> {
        if let Some(j) = self.first_encroached(face, &c) {
            return self.split_segment(face, j, stats);
        }
        let other = self.tri.store().neighbor(face, edge);
        if let Some(n) = other {
            if let Some(k) = self.first_encroached(n, &c) {
                return self.split_segment(n, k, stats);
            }
        }
        if self.too_close(&c, face) || other.is_some_and(|n| self.too_close(&c, n)) {
            return Ok(false);
        }
        let w = interpolated_weight(self.tri.store(), face, &c);
        let ins = self.tri.insert_on_edge(face, edge, c, w, &mut self.quality)?;
        self.after_insertion(ins, stats)?;
        Ok(true)
    }

    fn after_insertion(&mut self, ins: Insertion, stats: &mut RefineStats) -> Result<()> {
        stats.inserted_points += 1;
        trace!(vertex = ins.vertex, faces = ins.faces.len(), "circumcenter inserted");
        self.settle(ins.faces.to_vec(), stats)
    }

    /// Bisects segment `edge` of `face` unless its midpoint is too close to
    /// a vertex of `face`. Returns whether the split happened.
    fn split_segment(&mut self, face: usize, edge: usize, stats: &mut RefineStats) -> Result<bool> {
        let (a, b) = self.tri.store().edge_vertices(face, edge);
        let m = self.tri.store().point(a).midpoint(&self.tri.store().point(b));
        if self.too_close(&m, face) {
            return Ok(false);
        }
        let w = interpolated_weight(self.tri.store(), face, &m);
        let ins = self.tri.insert_on_edge(face, edge, m, w, &mut self.quality)?;
        stats.split_segments += 1;
        trace!(a, b, vertex = ins.vertex, "segment split");
        self.settle(ins.faces.to_vec(), stats)?;
        Ok(true)
    }

    /// Splits every segment encroached by the opposite vertex of its own
    /// triangle, starting from `faces` and following the triangles each
    /// split creates.
    fn settle(&mut self, mut faces: Vec<usize>, stats: &mut RefineStats) -> Result<()> {
        while let Some(f) = faces.pop() {
            for e in 0..3 {
                if let Some(ins) = self.split_if_encroached(f, e, stats)? {
                    // `f` is among the changed faces and gets revisited
                    faces.extend(ins.faces.iter().copied());
                    break;
                }
            }
        }
        Ok(())
    }

    fn split_if_encroached(
        &mut self,
        face: usize,
        edge: usize,
        stats: &mut RefineStats,
    ) -> Result<Option<Insertion>> {
        if !self.encroached_by_apex(face, edge) {
            return Ok(None);
        }
        let (a, b) = self.tri.store().edge_vertices(face, edge);
        let m = self.tri.store().point(a).midpoint(&self.tri.store().point(b));
        if self.sqr_least_distance > 0.0 && self.too_close(&m, face) {
            return Ok(None);
        }
        let w = interpolated_weight(self.tri.store(), face, &m);
        let ins = self.tri.insert_on_edge(face, edge, m, w, &mut self.quality)?;
        stats.split_segments += 1;
        trace!(a, b, vertex = ins.vertex, "encroached segment split");
        Ok(Some(ins))
    }

    /* ========= Encroachment ========= */

    /// Whether `p` lies inside the diametral circle of edge `edge` of `face`,
    /// less [`ENCROACHMENT_TOLERANCE`].
    pub fn encroached(&self, face: usize, edge: usize, p: &Point2<f64>) -> Result<bool> {
        self.tri.store().check_face(face)?;
        MeshStore::check_edge(edge)?;
        Ok(self.inside_diametral_circle(face, edge, p))
    }

    fn inside_diametral_circle(&self, face: usize, edge: usize, p: &Point2<f64>) -> bool {
        let (a, b) = self.tri.store().edge_vertices(face, edge);
        let (a, b) = (self.tri.store().point(a), self.tri.store().point(b));
        let m = a.midpoint(&b);
        let r = (b - a) * 0.5;
        p.distance_sqr(&m) + ENCROACHMENT_TOLERANCE < r.norm_sqr()
    }

    /// First segment edge of `face` encroached by `p`.
    pub fn encroached_segment(&self, face: usize, p: &Point2<f64>) -> Result<Option<usize>> {
        self.tri.store().check_face(face)?;
        Ok(self.first_encroached(face, p))
    }

    fn first_encroached(&self, face: usize, p: &Point2<f64>) -> Option<usize> {
        (0..3).find(|&e| {
            self.tri.store().is_segment(face, e) && self.inside_diametral_circle(face, e, p)
        })
    }

    fn encroached_by_apex(&self, face: usize, edge: usize) -> bool {
        let store = self.tri.store();
        store.is_segment(face, edge)
            && self.inside_diametral_circle(face, edge, &store.point(store.face(face)[edge]))
    }

    /// Bisects segment `edge` of `face` if the opposite vertex of `face`
    /// encroaches upon it, then keeps checking the triangles that result.
    /// Returns whether a split happened.
    pub fn check_segment(&mut self, face: usize, edge: usize) -> Result<bool> {
        self.tri.store().check_face(face)?;
        MeshStore::check_edge(edge)?;
        let mut stats = RefineStats::default();
        match self.split_if_encroached(face, edge, &mut stats)? {
            Some(ins) => {
                self.settle(ins.faces.to_vec(), &mut stats)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// [`Ruppert::check_segment`] for all three edges of `face`.
    pub fn check_segments(&mut self, face: usize) -> Result<bool> {
        self.tri.store().check_face(face)?;
        let before = self.point_count();
        let mut stats = RefineStats::default();
        self.settle(vec![face], &mut stats)?;
        Ok(self.point_count() > before)
    }

    fn check_all_segments(&mut self, stats: &mut RefineStats) -> Result<()> {
        let faces: Vec<usize> = (0..self.face_count()).rev().collect();
        self.settle(faces, stats)
    }

    fn too_close(&self, p: &Point2<f64>, face: usize) -> bool {
        (0..3).any(|k| candidate_distance_sqr(self.tri.store(), face, k, p) < self.sqr_least_distance)
    }

    /* ========= Queries ========= */

    pub fn bad(&self, face: usize) -> Result<bool> {
        self.tri.store().check_face(face)?;
        Ok(self.quality.bad(face))
    }

    /// Tests `face` against the given thresholds instead of the configured
    /// ones.
    pub fn bad_with(&self, face: usize, min_angle_degrees: f64, max_area: f64) -> Result<bool> {
        self.tri.store().check_face(face)?;
        check_angle(min_angle_degrees)?;
        check_area(max_area)?;
        Ok(self
            .quality
            .bad_with(face, min_angle_degrees.to_radians().cos(), max_area))
    }

    /// Smallest interior angle of the mesh in degrees.
    pub fn least_angle(&self) -> f64 {
        self.quality.least_angle()
    }

    /// Largest (weighted) triangle area of the mesh.
    pub fn largest_area(&self) -> f64 {
        self.quality.max_area()
    }

    pub fn face_count(&self) -> usize {
        self.tri.face_count()
    }

    pub fn point_count(&self) -> usize {
        self.tri.point_count()
    }

    /// Vertex indices, three per triangle.
    pub fn indices(&self) -> Vec<usize> {
        self.tri.store().indices()
    }

    /// Coordinates, two per point.
    pub fn points(&self) -> Vec<f64> {
        self.tri.store().coordinates()
    }

    /// Neighbor triangles, three per triangle; `None` on the boundary.
    pub fn neighbors(&self) -> Vec<Option<usize>> {
        self.tri.store().neighbor_list()
    }

    /// Segment flags, three per triangle.
    pub fn segments(&self) -> Vec<bool> {
        self.tri.store().segment_list()
    }

    pub fn triangulation(&self) -> &Triangulation {
        &self.tri
    }

    pub fn quality(&self) -> &QualityCache {
        &self.quality
    }
}
