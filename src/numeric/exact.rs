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
use std::ops::{Add, Mul, Sub};

use rug::Rational;

use crate::geometry::Point2;

/// Arbitrary precision rational used when a floating-point sign is uncertain.
///
/// Every finite `f64` is a dyadic rational, so converting coordinates is
/// exact and the products below never round.
#[derive(Clone, Debug, Default)]
pub struct ExactRational(pub Rational);

impl ExactRational {
    pub fn from_f64(v: f64) -> Self {
        // non-finite input never reaches the predicates; map it to zero
        ExactRational(Rational::from_f64(v).unwrap_or_default())
    }

    pub fn sign(&self) -> Ordering {
        self.0.cmp0()
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64()
    }
}

impl<'a, 'b> Add<&'b ExactRational> for &'a ExactRational {
    type Output = ExactRational;

    fn add(self, rhs: &'b ExactRational) -> ExactRational {
        let mut result = self.0.clone();
        result += &rhs.0;
        ExactRational(result)
    }
}

impl<'a, 'b> Sub<&'b ExactRational> for &'a ExactRational {
    type Output = ExactRational;

    fn sub(self, rhs: &'b ExactRational) -> ExactRational {
        let mut result = self.0.clone();
        result -= &rhs.0;
        ExactRational(result)
    }
}

impl<'a, 'b> Mul<&'b ExactRational> for &'a ExactRational {
    type Output = ExactRational;

    fn mul(self, rhs: &'b ExactRational) -> ExactRational {
        let mut result = self.0.clone();
        result *= &rhs.0;
        ExactRational(result)
    }
}

fn exact_point(p: &Point2<f64>) -> (ExactRational, ExactRational) {
    (ExactRational::from_f64(p.x), ExactRational::from_f64(p.y))
}

/// Exact sign of `(b - a) x (c - a)`.
pub fn orient2d_exact(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Ordering {
    let (ax, ay) = exact_point(a);
    let (bx, by) = exact_point(b);
    let (cx, cy) = exact_point(c);

    let left = &(&bx - &ax) * &(&cy - &ay);
    let right = &(&by - &ay) * &(&cx - &ax);
    (&left - &right).sign()
}

/// Exact sign of the in-circle determinant of `d` against `(a, b, c)`.
pub fn incircle_exact(
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
    d: &Point2<f64>,
) -> Ordering {
    let (dx, dy) = exact_point(d);
    let lift = |p: &Point2<f64>| {
        let (px, py) = exact_point(p);
        let x = &px - &dx;
        let y = &py - &dy;
        let w = &(&x * &x) + &(&y * &y);
        (x, y, w)
    };
    let (adx, ady, alift) = lift(a);
    let (bdx, bdy, blift) = lift(b);
    let (cdx, cdy, clift) = lift(c);

    let bc = &(&bdx * &cdy) - &(&cdx * &bdy);
    let ca = &(&cdx * &ady) - &(&adx * &cdy);
    let ab = &(&adx * &bdy) - &(&bdx * &ady);

    let sum = &(&(&alift * &bc) + &(&blift * &ca)) + &(&clift * &ab);
    sum.sign()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_orientation_of_nearly_collinear_points() {
        let a = Point2::new(0.5, 0.5);
        let b = Point2::new(12.0, 12.0);
        let c = Point2::new(24.0, 24.0);
        assert_eq!(orient2d_exact(&a, &b, &c), Ordering::Equal);

        let c = Point2::new(24.0, 24.000000000000004);
        assert_eq!(orient2d_exact(&a, &b, &c), Ordering::Greater);
    }

    #[test]
    fn exact_incircle_of_cocircular_points_is_zero() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(1.0, 1.0);
        let d = Point2::new(0.0, 1.0);
        assert_eq!(incircle_exact(&a, &b, &c, &d), Ordering::Equal);
        assert_eq!(
            incircle_exact(&a, &b, &c, &Point2::new(0.5, 0.5)),
            Ordering::Greater
        );
    }
}
