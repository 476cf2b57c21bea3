//! Triangular wall elements.
//!
//! Walls are built by the external mesh builder and are read-only inside the
//! kernel.  Each wall precomputes an orthonormal in-plane basis `(unit_u,
//! unit_v)` with vertex 0 at the local origin and vertex 1 on the +u axis, so
//! the walk engine's ray/triangle test is a plane intersection followed by a
//! 2-D point-in-triangle check — no per-test cross products.

use rd_core::{Vec3, WallId};

/// How a wall responds to an incoming volume molecule.
///
/// A full surface-chemistry treatment would consult per-species surface
/// reactions here; this kernel carries the three outcomes the walk engine
/// distinguishes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SurfaceClass {
    /// Specular reflection (the default for all membranes).
    #[default]
    Reflect,
    /// The molecule passes through unaffected.
    Transparent,
    /// The molecule is destroyed on contact.
    Absorb,
}

/// One triangular surface element.
#[derive(Clone, Debug)]
pub struct Wall {
    pub id: WallId,

    /// Vertices in counter-clockwise order as seen from the `normal` side.
    pub vert: [Vec3; 3],

    /// Unit normal, `(v1-v0) × (v2-v0)` normalized.
    pub normal: Vec3,

    /// Plane offset: points `x` on the wall satisfy `normal · x = d`.
    pub d: f64,

    /// In-plane unit vector from vertex 0 toward vertex 1.
    pub unit_u: Vec3,

    /// In-plane unit vector completing the right-handed basis
    /// (`normal × unit_u`).
    pub unit_v: Vec3,

    /// u-coordinate of vertex 1 (its v-coordinate is 0 by construction).
    pub uv_vert1_u: f64,

    /// (u, v) coordinates of vertex 2; `v > 0` by construction.
    pub uv_vert2: (f64, f64),

    pub area: f64,

    /// Walls sharing each edge (edge i runs from vertex i to vertex i+1);
    /// `WallId::INVALID` where the mesh ends.
    pub neighbors: [WallId; 3],

    /// Index of the parent mesh object (owned by the external mesh builder).
    pub object: u32,

    pub class: SurfaceClass,
}

impl Wall {
    /// Build a wall from three vertices, precomputing the projection basis.
    ///
    /// Returns `None` for a degenerate (zero-area) triangle.
    pub fn new(id: WallId, v0: Vec3, v1: Vec3, v2: Vec3, class: SurfaceClass) -> Option<Self> {
        let e0 = v1 - v0;
        let e1 = v2 - v0;
        let n = e0.cross(e1);
        let n_len = n.length();
        if n_len == 0.0 {
            return None;
        }
        let normal = n * (1.0 / n_len);
        let unit_u = e0.normalized();
        let unit_v = normal.cross(unit_u);
        Some(Self {
            id,
            vert: [v0, v1, v2],
            normal,
            d: normal.dot(v0),
            unit_u,
            unit_v,
            uv_vert1_u: e0.length(),
            uv_vert2: (e1.dot(unit_u), e1.dot(unit_v)),
            area: 0.5 * n_len,
            neighbors: [WallId::INVALID; 3],
            object: 0,
            class,
        })
    }

    /// Project a world-space point (assumed on or near the wall plane) into
    /// the wall's (u, v) coordinates.
    #[inline]
    pub fn project(&self, p: Vec3) -> (f64, f64) {
        let rel = p - self.vert[0];
        (rel.dot(self.unit_u), rel.dot(self.unit_v))
    }

    /// Axis-aligned bounding box, used to assign walls to subvolumes.
    pub fn aabb(&self) -> (Vec3, Vec3) {
        let lo = Vec3::new(
            self.vert.iter().map(|v| v.x).fold(f64::INFINITY, f64::min),
            self.vert.iter().map(|v| v.y).fold(f64::INFINITY, f64::min),
            self.vert.iter().map(|v| v.z).fold(f64::INFINITY, f64::min),
        );
        let hi = Vec3::new(
            self.vert.iter().map(|v| v.x).fold(f64::NEG_INFINITY, f64::max),
            self.vert.iter().map(|v| v.y).fold(f64::NEG_INFINITY, f64::max),
            self.vert.iter().map(|v| v.z).fold(f64::NEG_INFINITY, f64::max),
        );
        (lo, hi)
    }
}
