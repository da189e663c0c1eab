//! Random sampling for indirect lighting and anti-aliasing.
//!
//! All functions take an explicit generator. Rendering gives every row its
//! own [`StdRng`] so results do not depend on how rows are scheduled.

use std::f32::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tessel_math::{Vec3, EPS};

/// Uniform f32 in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Generator for one framebuffer row of a pass seeded with `seed`.
pub fn row_rng(seed: u64, row: u32) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ u64::from(row))
}

/// Random direction about `normal` for Monte Carlo indirect lighting.
///
/// The cosine is drawn uniformly over [-1, 1], so directions cover the whole
/// sphere around the normal and not only the hemisphere above it.
pub fn random_monte_carlo_direction(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let cos_theta = gen_f32(rng) * 2.0 - 1.0;
    let phi = 2.0 * PI * gen_f32(rng);

    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let x = sin_theta * phi.cos();
    let y = sin_theta * phi.sin();
    let z = cos_theta;

    let n = normal.normalize_or_zero();
    // (n.z, 0, -n.x) vanishes when n is the Y axis
    let tangent = Vec3::new(n.z, 0.0, -n.x);
    let tangent = if tangent.length() < EPS {
        Vec3::X
    } else {
        tangent.normalize()
    };
    let bitangent = tangent.cross(n);

    x * tangent + y * bitangent + z * n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_f32_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let v = gen_f32(&mut rng);
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_row_rng_deterministic() {
        let a: Vec<f32> = (0..4).map(|_| gen_f32(&mut row_rng(7, 3))).collect();
        let b: Vec<f32> = (0..4).map(|_| gen_f32(&mut row_rng(7, 3))).collect();
        assert_eq!(a, b);

        let mut r3 = row_rng(7, 3);
        let mut r4 = row_rng(7, 4);
        assert_ne!(gen_f32(&mut r3), gen_f32(&mut r4));
    }

    #[test]
    fn test_direction_is_unit() {
        let mut rng = StdRng::seed_from_u64(42);
        let normals = [Vec3::Z, Vec3::Y, Vec3::NEG_Y, Vec3::new(1.0, 2.0, 3.0)];

        for normal in normals {
            for _ in 0..200 {
                let dir = random_monte_carlo_direction(normal, &mut rng);
                assert!((dir.length() - 1.0).abs() < 1e-4, "{dir:?} for {normal:?}");
            }
        }
    }

    #[test]
    fn test_direction_covers_full_sphere() {
        let mut rng = StdRng::seed_from_u64(42);
        let normal = Vec3::new(0.3, 0.4, 0.5).normalize();

        let samples = 2000;
        let below = (0..samples)
            .filter(|_| random_monte_carlo_direction(normal, &mut rng).dot(normal) < 0.0)
            .count();

        let fraction = below as f32 / samples as f32;
        assert!(fraction > 0.4 && fraction < 0.6, "fraction below = {fraction}");
    }

    #[test]
    fn test_y_axis_normal_uses_fallback_tangent() {
        let mut rng = StdRng::seed_from_u64(1);
        let dir = random_monte_carlo_direction(Vec3::Y, &mut rng);
        assert!(dir.is_finite());
    }
}
