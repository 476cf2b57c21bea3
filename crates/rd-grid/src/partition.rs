//! The spatial partition: a non-uniform rectilinear lattice.
//!
//! # Data layout
//!
//! Each axis carries a sorted array of `n + 1` boundary coordinates defining
//! `n` cells; cells need not be equally sized (the external mesh builder
//! refines the lattice near dense geometry).  A subvolume's flat index is
//!
//! ```text
//! id = (ix * ny + iy) * nz + iz
//! ```
//!
//! so `iz` varies fastest and neighbor traversal along any axis is constant
//! index arithmetic — no lookup tables.

use rd_core::{SubvolumeId, Vec3};

/// One face of an axis-aligned subvolume, used to name boundary crossings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Face {
    XLo,
    XHi,
    YLo,
    YHi,
    ZLo,
    ZHi,
}

/// Non-uniform rectilinear partition of the world's bounding box.
///
/// Immutable after construction; built once by [`WorldBuilder`][crate::WorldBuilder].
#[derive(Clone, Debug)]
pub struct Partition {
    /// Sorted x-axis cell boundaries, length `nx + 1`.
    pub x_parts: Vec<f64>,
    /// Sorted y-axis cell boundaries, length `ny + 1`.
    pub y_parts: Vec<f64>,
    /// Sorted z-axis cell boundaries, length `nz + 1`.
    pub z_parts: Vec<f64>,
}

impl Partition {
    #[inline]
    pub fn nx(&self) -> usize {
        self.x_parts.len() - 1
    }

    #[inline]
    pub fn ny(&self) -> usize {
        self.y_parts.len() - 1
    }

    #[inline]
    pub fn nz(&self) -> usize {
        self.z_parts.len() - 1
    }

    /// Total subvolume count.
    pub fn subvolume_count(&self) -> usize {
        self.nx() * self.ny() * self.nz()
    }

    /// Flat ID from lattice coordinates.
    #[inline]
    pub fn id_of(&self, ix: usize, iy: usize, iz: usize) -> SubvolumeId {
        SubvolumeId(((ix * self.ny() + iy) * self.nz() + iz) as u32)
    }

    /// Lattice coordinates from a flat ID.
    #[inline]
    pub fn coords_of(&self, sv: SubvolumeId) -> (usize, usize, usize) {
        let i = sv.index();
        let iz = i % self.nz();
        let iy = (i / self.nz()) % self.ny();
        let ix = i / (self.nz() * self.ny());
        (ix, iy, iz)
    }

    /// Bisect one axis's boundary array.  Returns the cell index containing
    /// `p`, or `None` outside the world.  A point exactly on an interior
    /// boundary belongs to the cell above it; the upper world boundary is
    /// exclusive.
    fn bisect(parts: &[f64], p: f64) -> Option<usize> {
        if p < parts[0] || p >= parts[parts.len() - 1] {
            return None;
        }
        // partition_point returns the first boundary > p; cell = that - 1.
        Some(parts.partition_point(|&c| c <= p) - 1)
    }

    /// Locate the subvolume containing `pos`.  O(log n) per axis.
    pub fn locate(&self, pos: Vec3) -> Option<SubvolumeId> {
        let ix = Self::bisect(&self.x_parts, pos.x)?;
        let iy = Self::bisect(&self.y_parts, pos.y)?;
        let iz = Self::bisect(&self.z_parts, pos.z)?;
        Some(self.id_of(ix, iy, iz))
    }

    /// The subvolume across `face` from `sv`, or `None` at the world edge.
    /// O(1) index arithmetic.
    pub fn neighbor(&self, sv: SubvolumeId, face: Face) -> Option<SubvolumeId> {
        let (ix, iy, iz) = self.coords_of(sv);
        let (ix, iy, iz) = match face {
            Face::XLo => (ix.checked_sub(1)?, iy, iz),
            Face::XHi => (ix + 1, iy, iz),
            Face::YLo => (ix, iy.checked_sub(1)?, iz),
            Face::YHi => (ix, iy + 1, iz),
            Face::ZLo => (ix, iy, iz.checked_sub(1)?),
            Face::ZHi => (ix, iy, iz + 1),
        };
        if ix >= self.nx() || iy >= self.ny() || iz >= self.nz() {
            return None;
        }
        Some(self.id_of(ix, iy, iz))
    }

    /// Axis-aligned bounds of `sv` as `(low corner, high corner)`.
    pub fn bounds(&self, sv: SubvolumeId) -> (Vec3, Vec3) {
        let (ix, iy, iz) = self.coords_of(sv);
        (
            Vec3::new(self.x_parts[ix], self.y_parts[iy], self.z_parts[iz]),
            Vec3::new(
                self.x_parts[ix + 1],
                self.y_parts[iy + 1],
                self.z_parts[iz + 1],
            ),
        )
    }

    /// World bounding box.
    pub fn world_bounds(&self) -> (Vec3, Vec3) {
        (
            Vec3::new(self.x_parts[0], self.y_parts[0], self.z_parts[0]),
            Vec3::new(
                *self.x_parts.last().unwrap(),
                *self.y_parts.last().unwrap(),
                *self.z_parts.last().unwrap(),
            ),
        )
    }
}
