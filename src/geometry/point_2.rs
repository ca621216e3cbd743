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

use std::ops::{Add, Mul, Sub};

use num_traits::Float;

/// A point (or free vector) in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2<T> {
    pub x: T,
    pub y: T,
}

impl<T: Float> Point2<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> T {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3D cross product.
    #[inline]
    pub fn cross(&self, other: &Self) -> T {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn norm_sqr(&self) -> T {
        self.dot(self)
    }

    #[inline]
    pub fn norm(&self) -> T {
        self.norm_sqr().sqrt()
    }

    #[inline]
    pub fn distance_sqr(&self, other: &Self) -> T {
        (*self - *other).norm_sqr()
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        let two = T::one() + T::one();
        Self {
            x: (self.x + other.x) / two,
            y: (self.y + other.y) / two,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Point2<f64> {
    /// Bit pattern usable as a hash key. `-0.0` and `0.0` map to the same key.
    pub fn bits(&self) -> (u64, u64) {
        ((self.x + 0.0).to_bits(), (self.y + 0.0).to_bits())
    }
}

impl<T: Float> Add for Point2<T> {
    type Output = Point2<T>;
    fn add(self, rhs: Point2<T>) -> Point2<T> {
        Point2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl<T: Float> Sub for Point2<T> {
    type Output = Point2<T>;
    fn sub(self, rhs: Point2<T>) -> Point2<T> {
        Point2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl<T: Float> Mul<T> for Point2<T> {
    type Output = Point2<T>;
    fn mul(self, rhs: T) -> Point2<T> {
        Point2 {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// Twice the signed area of `(a, b, c)`; positive for counter-clockwise.
#[inline]
pub fn det<T: Float>(a: &Point2<T>, b: &Point2<T>, c: &Point2<T>) -> T {
    (*b - *a).cross(&(*c - *a))
}

/// Center of the circle through `a`, `b`, `c`.
///
/// Returns `None` for collinear input.
pub fn circumcenter<T: Float>(a: &Point2<T>, b: &Point2<T>, c: &Point2<T>) -> Option<Point2<T>> {
    let ab = *b - *a;
    let ac = *c - *a;
    let d = ab.cross(&ac);
    if d == T::zero() {
        return None;
    }
    let two = T::one() + T::one();
    let ab2 = ab.norm_sqr();
    let ac2 = ac.norm_sqr();
    let ox = (ac.y * ab2 - ab.y * ac2) / (two * d);
    let oy = (ab.x * ac2 - ac.x * ab2) / (two * d);
    let center = Point2::new(a.x + ox, a.y + oy);
    center.is_finite().then_some(center)
}

/// Barycentric coordinates of `p` with respect to `(a, b, c)`.
pub fn barycentric<T: Float>(
    p: &Point2<T>,
    a: &Point2<T>,
    b: &Point2<T>,
    c: &Point2<T>,
) -> Option<(T, T, T)> {
    let d = det(a, b, c);
    if d == T::zero() {
        return None;
    }
    Some((det(p, b, c) / d, det(a, p, c) / d, det(a, b, p) / d))
}
