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

use smallvec::SmallVec;

use crate::mesh::store::MeshStore;

/// Result of point location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Strictly inside `face`.
    Inside { face: usize },
    /// On edge `edge` of `face` (not on one of its endpoints).
    OnEdge { face: usize, edge: usize },
    /// Coincides with vertex `vertex` of `face`.
    OnVertex { face: usize, vertex: usize },
    /// Outside the mesh; the walk left through boundary edge `edge` of `face`.
    Outside { face: usize, edge: usize },
}

impl Location {
    pub fn face(&self) -> usize {
        match *self {
            Location::Inside { face }
            | Location::OnEdge { face, .. }
            | Location::OnVertex { face, .. }
            | Location::Outside { face, .. } => face,
        }
    }
}

/// Faces touched by one insertion, including faces changed by legalization.
#[derive(Debug, Clone, Default)]
pub struct Insertion {
    pub vertex: usize,
    pub faces: SmallVec<[usize; 8]>,
}

impl Insertion {
    pub(crate) fn touch(&mut self, f: usize) {
        if !self.faces.contains(&f) {
            self.faces.push(f);
        }
    }
}

/// Observer notified after every structural change of the triangulation.
///
/// Caches that depend on face geometry register through this trait instead
/// of wrapping the mutation operations.
pub trait MeshHook {
    /// `faces` were created or had their vertices replaced.
    fn faces_changed(&mut self, store: &MeshStore, faces: &[usize]);
}

/// Hook that ignores all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHook;

impl MeshHook for NoHook {
    fn faces_changed(&mut self, _store: &MeshStore, _faces: &[usize]) {}
}
