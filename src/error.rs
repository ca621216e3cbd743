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

//! Error types for mesh construction and refinement.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors reported to the caller. Infeasible quality constraints are not an
/// error: refinement simply stops at the distance floor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// No boundary loop was given.
    #[error("at least one boundary loop is required")]
    NoBoundary,

    /// A boundary loop is malformed.
    #[error("boundary loop {index} is invalid: {reason}")]
    InvalidLoop {
        /// Position of the loop in the input.
        index: usize,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The same coordinates appear twice in the boundary input.
    #[error("point {duplicate} coincides with point {original}")]
    DuplicatePoint {
        /// Index of the first occurrence.
        original: usize,
        /// Index of the repeated point.
        duplicate: usize,
    },

    /// A boundary vertex lies in the interior of a boundary segment.
    #[error("vertex {vertex} lies on segment ({a}, {b})")]
    SegmentThroughVertex {
        /// First segment endpoint.
        a: usize,
        /// Second segment endpoint.
        b: usize,
        /// The offending vertex.
        vertex: usize,
    },

    /// Boundary segments cross each other and cannot be recovered.
    #[error("segment ({a}, {b}) cannot be recovered")]
    UnrecoverableSegment {
        /// First segment endpoint.
        a: usize,
        /// Second segment endpoint.
        b: usize,
    },

    /// Triangle index out of range.
    #[error("triangle index {face} out of range (triangle count {count})")]
    FaceOutOfRange {
        /// The requested index.
        face: usize,
        /// Current number of triangles.
        count: usize,
    },

    /// Point index out of range.
    #[error("point index {point} out of range (point count {count})")]
    PointOutOfRange {
        /// The requested index.
        point: usize,
        /// Current number of points.
        count: usize,
    },

    /// Edge index outside `0..3`.
    #[error("edge index {0} out of range (expected 0, 1 or 2)")]
    EdgeOutOfRange(usize),

    /// Weight array does not match the number of points.
    #[error("number of weights ({found}) != number of points ({expected})")]
    WeightCountMismatch {
        /// Current number of points.
        expected: usize,
        /// Length of the supplied array.
        found: usize,
    },

    /// The edge is a protected boundary segment.
    #[error("edge {edge} of triangle {face} is a segment and cannot be flipped")]
    ProtectedSegment {
        /// Triangle index.
        face: usize,
        /// Edge index.
        edge: usize,
    },

    /// The edge lies on the mesh boundary.
    #[error("edge {edge} of triangle {face} has no neighboring triangle")]
    NoNeighbor {
        /// Triangle index.
        face: usize,
        /// Edge index.
        edge: usize,
    },

    /// Mesh connectivity is inconsistent.
    #[error("invalid mesh state: {0}")]
    InvalidState(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
