//! Double-precision 3-vector used for positions and displacements.
//!
//! `Vec3` uses `f64` throughout: the walk engine's epsilon policies (early
//! reflection bias, boundary tie-breaking) assume ~1e-12 relative precision,
//! which single precision cannot provide over realistic world extents.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A 3-component double-precision vector.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Squared Euclidean length.  Prefer this over `length()` when only
    /// comparing distances — no square root.
    #[inline]
    pub fn length2(self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.length2().sqrt()
    }

    /// Squared distance to `other`.
    #[inline]
    pub fn distance2(self, other: Vec3) -> f64 {
        (self - other).length2()
    }

    /// Unit vector in the same direction.  Returns `ZERO` for a zero vector.
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len == 0.0 { Vec3::ZERO } else { self * (1.0 / len) }
    }

    /// Component-wise scale.
    #[inline]
    pub fn scaled(self, s: f64) -> Vec3 {
        self * s
    }

    /// Mirror `self` about the plane with unit normal `n`:
    /// `v' = v − 2 (v·n) n`.  Preserves length; flips the normal component.
    #[inline]
    pub fn reflect(self, n: Vec3) -> Vec3 {
        self - n * (2.0 * self.dot(n))
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.6})", self.x, self.y, self.z)
    }
}
