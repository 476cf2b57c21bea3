//! Geometric collision tests for one ray-traced displacement.
//!
//! All times are fractions of the displacement vector: a hit at `t = 0.25`
//! lies a quarter of the way along the step.  Only `t` in `[0, 1]` counts.

use rd_core::{MoleculeId, Vec3, EPS, TIE_EPS};
use rd_grid::{Face, Wall};

/// Outcome of one ray/wall test.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum WallHit {
    /// The ray crosses the wall's interior at fraction `t`.
    Hit { t: f64, pt: Vec3 },
    /// No intersection within the step.
    Miss,
    /// The crossing point lies within epsilon of a triangle edge, where
    /// neighboring walls' answers could disagree.  The caller must discard
    /// the whole candidate set and retrace — the ambiguity is never guessed
    /// away.
    Redo,
}

/// What a collision candidate would hit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Target {
    Wall(rd_core::WallId),
    /// Crossing into the neighbor across this face of the current subvolume.
    Boundary(Face),
    /// A potential bimolecular partner.
    Molecule(MoleculeId),
}

/// One collision candidate, valid for the duration of a single walk call.
#[derive(Copy, Clone, Debug)]
pub struct Collision {
    /// Fraction of the displacement at which the hit occurs, in `[0, 1]`.
    pub t: f64,
    pub target: Target,
    /// World-space hit point.
    pub pt: Vec3,
}

/// Test the segment `start → start + disp` against one wall.
///
/// Plane intersection followed by a 2-D point-in-triangle check in the wall's
/// precomputed (u, v) basis.  Rays parallel to the plane miss.
pub fn collide_wall(start: Vec3, disp: Vec3, wall: &Wall) -> WallHit {
    let denom = wall.normal.dot(disp);
    if denom.abs() < EPS {
        return WallHit::Miss;
    }
    let t = (wall.d - wall.normal.dot(start)) / denom;
    if !(0.0..=1.0).contains(&t) {
        return WallHit::Miss;
    }

    let pt = start + disp * t;
    let (u, v) = wall.project(pt);

    // Barycentric coordinates against vertices 1 and 2 in (u, v) space:
    // pt = a·(uv_vert1_u, 0) + b·uv_vert2.
    let (u2, v2) = wall.uv_vert2;
    let b = v / v2;
    let a = (u - b * u2) / wall.uv_vert1_u;

    // Tolerance scales with the local coordinate magnitude.
    let tol = EPS * (1.0 + u.abs() + v.abs());
    let c = 1.0 - a - b;
    if a < -tol || b < -tol || c < -tol {
        return WallHit::Miss;
    }
    if a < tol || b < tol || c < tol {
        return WallHit::Redo;
    }
    WallHit::Hit { t, pt }
}

/// Closest-approach test of the segment against a stationary molecule at
/// `target`.  Returns the fraction of the step and the closest-approach
/// point if the segment passes within `rx_radius`.
pub fn collide_mol(start: Vec3, disp: Vec3, target: Vec3, rx_radius: f64) -> Option<(f64, Vec3)> {
    let move_len2 = disp.length2();
    if move_len2 <= 0.0 {
        return None;
    }
    let to_target = target - start;
    let along = to_target.dot(disp);
    // Closest approach must fall strictly inside the segment.
    if along <= 0.0 || along >= move_len2 {
        return None;
    }
    let t = along / move_len2;
    let closest = start + disp * t;
    if closest.distance2(target) > rx_radius * rx_radius {
        return None;
    }
    Some((t, closest))
}

/// Where (and when) the segment leaves the axis-aligned box `(lo, hi)`.
///
/// Exactly one exit face exists for any nonzero displacement from a point
/// inside the box; `None` means the whole step stays inside.
pub fn exit_subvolume(start: Vec3, disp: Vec3, lo: Vec3, hi: Vec3) -> Option<(f64, Face)> {
    let mut best_t = f64::INFINITY;
    let mut best_face = Face::XHi;

    let mut axis = |d: f64, s: f64, lo: f64, hi: f64, face_lo: Face, face_hi: Face| {
        if d > 0.0 {
            let t = (hi - s) / d;
            if t < best_t {
                best_t = t;
                best_face = face_hi;
            }
        } else if d < 0.0 {
            let t = (lo - s) / d;
            if t < best_t {
                best_t = t;
                best_face = face_lo;
            }
        }
    };

    axis(disp.x, start.x, lo.x, hi.x, Face::XLo, Face::XHi);
    axis(disp.y, start.y, lo.y, hi.y, Face::YLo, Face::YHi);
    axis(disp.z, start.z, lo.z, hi.z, Face::ZLo, Face::ZHi);

    if best_t > 1.0 {
        return None;
    }
    Some((best_t.max(0.0), best_face))
}

/// Order candidates by ascending hit time; hits within `10 × EPS` of each
/// other resolve with the subvolume-boundary event first, so a molecule
/// grazing a wall that lies exactly on a cell boundary migrates before the
/// wall logic runs.
pub fn sort_candidates(candidates: &mut [Collision]) {
    candidates.sort_by(|a, b| a.t.partial_cmp(&b.t).expect("NaN collision time"));
    // Bubble boundary events ahead of non-boundary events they tie with.
    for i in 1..candidates.len() {
        if !matches!(candidates[i].target, Target::Boundary(_)) {
            continue;
        }
        let mut j = i;
        while j > 0
            && !matches!(candidates[j - 1].target, Target::Boundary(_))
            && candidates[j].t - candidates[j - 1].t <= TIE_EPS
        {
            candidates.swap(j, j - 1);
            j -= 1;
        }
    }
}
