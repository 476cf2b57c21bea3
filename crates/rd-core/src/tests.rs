//! Unit tests for rd-core.

use crate::{Species, SpeciesId, SpeciesKind, SimRng, Vec3};

// ── Vec3 ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod vec3 {
    use super::*;

    #[test]
    fn dot_and_cross() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(x.dot(y), 0.0);
        assert_eq!(x.cross(y), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn length_and_normalized() {
        let v = Vec3::new(3.0, 4.0, 0.0);
        assert_eq!(v.length(), 5.0);
        assert_eq!(v.length2(), 25.0);
        let n = v.normalized();
        assert!((n.length() - 1.0).abs() < 1e-15);
        assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
    }

    #[test]
    fn reflect_flips_normal_component() {
        let n = Vec3::new(0.0, 0.0, 1.0);
        let d = Vec3::new(1.0, 2.0, -3.0);
        let r = d.reflect(n);
        // Tangential components preserved, normal component negated.
        assert_eq!(r, Vec3::new(1.0, 2.0, 3.0));
        // d'·n = -d·n and |d'| = |d|.
        assert!((r.dot(n) + d.dot(n)).abs() < 1e-15);
        assert!((r.length() - d.length()).abs() < 1e-15);
    }

    #[test]
    fn reflect_oblique_normal() {
        let n = Vec3::new(1.0, 1.0, 1.0).normalized();
        let d = Vec3::new(0.3, -0.7, 0.2);
        let r = d.reflect(n);
        assert!((r.dot(n) + d.dot(n)).abs() < 1e-12);
        assert!((r.length() - d.length()).abs() < 1e-12);
    }
}

// ── Species ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod species {
    use super::*;

    #[test]
    fn space_step_derivation() {
        let s = Species::new(SpeciesId(0), "A", SpeciesKind::Volume, 0.25);
        // sqrt(4 * 0.25 * 1.0) = 1.0
        assert!((s.space_step - 1.0).abs() < 1e-15);
        assert!(s.diffuses());
    }

    #[test]
    fn custom_time_step_scales_space_step() {
        let s = Species::with_time_step(SpeciesId(1), "B", SpeciesKind::Volume, 0.25, 4.0);
        assert!((s.space_step - 2.0).abs() < 1e-15);
    }

    #[test]
    fn surface_species_does_not_diffuse() {
        let s = Species::new(SpeciesId(2), "S", SpeciesKind::Surface, 1.0);
        assert!(!s.diffuses());
    }

    #[test]
    fn zero_d_does_not_diffuse() {
        let s = Species::new(SpeciesId(3), "fixed", SpeciesKind::Volume, 0.0);
        assert!(!s.diffuses());
        assert_eq!(s.space_step, 0.0);
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod rng {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SimRng::new(42);
        let mut b = SimRng::new(42);
        for _ in 0..64 {
            assert_eq!(a.uniform(), b.uniform());
        }
    }

    #[test]
    fn child_streams_diverge() {
        let mut root1 = SimRng::new(7);
        let mut root2 = SimRng::new(7);
        let mut c1 = root1.child(1);
        let mut c2 = root2.child(2);
        let same = (0..32).filter(|_| c1.uniform() == c2.uniform()).count();
        assert!(same < 4, "child streams should not track each other");
    }

    #[test]
    fn uniform_pos_never_zero() {
        let mut rng = SimRng::new(99);
        for _ in 0..10_000 {
            let u = rng.uniform_pos();
            assert!(u > 0.0 && u <= 1.0);
        }
    }

    #[test]
    fn exponential_mean_close_to_inverse_rate() {
        let mut rng = SimRng::new(2024);
        let k = 0.5;
        let n = 50_000;
        let mean: f64 = (0..n).map(|_| rng.exponential(k)).sum::<f64>() / n as f64;
        // mean should be ~1/k = 2.0; 3 sigma for n=50k is ~2.7%.
        assert!((mean - 2.0).abs() < 0.06, "mean = {mean}");
    }
}
