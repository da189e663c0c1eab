//! Triangle primitive for ray tracing.
//!
//! Intersects against the triangle's plane, then tests containment in a 2-D
//! plane coordinate system (PCS) spanned by an orthonormal basis of that
//! plane. The basis and the projected vertices are computed whenever the
//! vertex positions are set, never per query.

use tessel_core::MaterialId;
use tessel_math::{is_greater_equal, Ray, Vec2, Vec3, EPS};

use crate::scene::NO_INTERSECT;

/// Orthonormal basis `[u w n]` of the triangle's plane.
///
/// `u` and `w` lie in the plane; `n` is its unit normal. All three are zero
/// for triangles whose vertices are collinear or coincident.
#[derive(Debug, Clone, Copy)]
struct PlanarBasis {
    u: Vec3,
    w: Vec3,
    n: Vec3,
}

/// A camera-space triangle with per-vertex normals and texture coordinates.
#[derive(Debug, Clone)]
pub struct Triangle {
    vertices: [Vec3; 3],
    normals: [Vec3; 3],
    uvs: [Vec2; 3],
    material: MaterialId,
    basis: PlanarBasis,
    /// Vertices projected onto the plane's `(u, w)` coordinates
    pcs: [Vec2; 3],
}

impl Triangle {
    /// Create a triangle and compute its planar basis.
    pub fn new(vertices: [Vec3; 3], normals: [Vec3; 3], uvs: [Vec2; 3], material: MaterialId) -> Self {
        let mut triangle = Self {
            vertices,
            normals,
            uvs,
            material,
            basis: PlanarBasis {
                u: Vec3::ZERO,
                w: Vec3::ZERO,
                n: Vec3::ZERO,
            },
            pcs: [Vec2::ZERO; 3],
        };
        triangle.compute_planar_values();
        triangle
    }

    /// Create a flat-shaded triangle whose vertex normals all equal the face normal.
    pub fn flat(vertices: [Vec3; 3], material: MaterialId) -> Self {
        let mut triangle = Self::new(vertices, [Vec3::ZERO; 3], [Vec2::ZERO; 3], material);
        triangle.normals = [triangle.basis.n; 3];
        triangle
    }

    /// Replace the vertex positions and recompute the planar basis.
    pub fn set_vertices(&mut self, vertices: [Vec3; 3]) {
        self.vertices = vertices;
        self.compute_planar_values();
    }

    fn compute_planar_values(&mut self) {
        let [a, b, c] = self.vertices;

        // Only u needs normalising before the cross products
        let u = (b - a).normalize_or_zero();
        let n = u.cross(c - a).normalize_or_zero();
        let w = n.cross(u).normalize_or_zero();

        self.basis = PlanarBasis { u, w, n };
        self.pcs = [self.project(a), self.project(b), self.project(c)];
    }

    /// Project a point in the triangle's plane onto its PCS.
    #[inline]
    fn project(&self, point: Vec3) -> Vec2 {
        Vec2::new(point.dot(self.basis.u), point.dot(self.basis.w))
    }

    pub fn vertices(&self) -> &[Vec3; 3] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec3; 3] {
        &self.normals
    }

    pub fn uvs(&self) -> &[Vec2; 3] {
        &self.uvs
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Unit normal of the triangle's plane (zero when degenerate).
    pub fn plane_normal(&self) -> Vec3 {
        self.basis.n
    }

    /// Collinear or coincident vertices leave the plane undefined; such
    /// triangles never intersect anything.
    pub fn is_degenerate(&self) -> bool {
        self.basis.n == Vec3::ZERO
    }

    /// Parameter `t` with `ray.at(t)` on the triangle, or [`NO_INTERSECT`].
    ///
    /// Returns a strictly positive `t` on a hit. Rays parallel to the plane
    /// and planes at or behind the ray origin are misses.
    pub fn intersect(&self, ray: &Ray) -> f32 {
        if self.is_degenerate() {
            return NO_INTERSECT;
        }

        let p = self.vertices[0];
        let n = self.basis.n;
        let s = ray.origin;
        let l = ray.direction;

        let ln = l.dot(n);

        // Parallel: either no intersection or the whole line lies in the plane
        if ln.abs() < EPS {
            return NO_INTERSECT;
        }

        let t = (p - s).dot(n) / ln;

        // Plane is behind or exactly at the origin of the ray
        if is_greater_equal(0.0, t) {
            return NO_INTERSECT;
        }

        if self.contains(ray.at(t)) {
            t
        } else {
            NO_INTERSECT
        }
    }

    /// Whether a point on the triangle's plane lies inside the triangle.
    ///
    /// Left-orthogonal edge normals point inwards for counter-clockwise
    /// PCS vertices; the point must be on the inner side of all three edges.
    fn contains(&self, point: Vec3) -> bool {
        let [a, b, c] = self.pcs;
        let o = self.project(point);

        let dot1 = (b - a).perp().dot(o - a);
        let dot2 = (c - b).perp().dot(o - b);
        let dot3 = (a - c).perp().dot(o - c);

        is_greater_equal(dot1, 0.0) && is_greater_equal(dot2, 0.0) && is_greater_equal(dot3, 0.0)
    }

    /// The `(alpha, beta, gamma)` barycentric coordinates of a point on the
    /// triangle's plane.
    ///
    /// Each weight is the signed distance from the point to an edge divided
    /// by the distance from the opposite vertex to the same edge.
    pub fn barycentric_coordinates(&self, point: Vec3) -> Vec3 {
        if self.is_degenerate() {
            return Vec3::ZERO;
        }

        let [a, b, c] = self.pcs;
        let o = self.project(point);

        let alpha = edge_distance(o, b, c) / edge_distance(a, b, c);
        let beta = edge_distance(o, a, c) / edge_distance(b, a, c);
        let gamma = edge_distance(o, b, a) / edge_distance(c, b, a);

        Vec3::new(alpha, beta, gamma)
    }

    /// Barycentric blend of the vertex normals.
    pub fn weighted_normal(&self, weights: Vec3) -> Vec3 {
        weights.x * self.normals[0] + weights.y * self.normals[1] + weights.z * self.normals[2]
    }

    /// Barycentric blend of the vertex texture coordinates.
    pub fn weighted_uv(&self, weights: Vec3) -> Vec2 {
        weights.x * self.uvs[0] + weights.y * self.uvs[1] + weights.z * self.uvs[2]
    }
}

/// Signed distance from `o` to the line through `a` and `b` (all in PCS).
#[inline]
fn edge_distance(o: Vec2, a: Vec2, b: Vec2) -> f32 {
    let n = (b - a).perp().normalize();
    n.dot(o) - n.dot(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tessel_core::MaterialStore;

    /// Triangle in the z = -2 plane, facing +Z, centroid on the Z axis.
    fn facing_triangle() -> Triangle {
        Triangle::flat(
            [
                Vec3::new(-1.0, -1.0, -2.0),
                Vec3::new(1.0, -1.0, -2.0),
                Vec3::new(0.0, 2.0, -2.0),
            ],
            MaterialStore::DEFAULT,
        )
    }

    /// Reference Möller-Trumbore test returning (t, u, v) when the line hits.
    fn moller_trumbore(tri: &Triangle, ray: &Ray) -> Option<(f32, f32, f32)> {
        let [v0, v1, v2] = *tri.vertices();
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);
        if a.abs() < 1e-8 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - v0;
        let u = f * s.dot(h);
        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        let t = f * edge2.dot(q);

        Some((t, u, v))
    }

    #[test]
    fn test_triangle_hit() {
        let tri = facing_triangle();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let t = tri.intersect(&ray);
        assert!((t - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_triangle_miss_outside() {
        let tri = facing_triangle();
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));

        assert_eq!(tri.intersect(&ray), NO_INTERSECT);
    }

    #[test]
    fn test_triangle_behind_ray_misses() {
        let tri = facing_triangle();

        // Ray pointing away
        let away = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(tri.intersect(&away), NO_INTERSECT);

        // Origin exactly on the plane
        let on_plane = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(tri.intersect(&on_plane), NO_INTERSECT);
    }

    #[test]
    fn test_parallel_ray_misses() {
        let tri = facing_triangle();
        let ray = Ray::new(Vec3::new(-5.0, 0.0, -2.0), Vec3::X);

        assert_eq!(tri.intersect(&ray), NO_INTERSECT);
    }

    #[test]
    fn test_edge_is_inclusive() {
        let tri = facing_triangle();

        // Hits (0, -1, -2), the midpoint of edge AB
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, -2.0));
        let t = tri.intersect(&ray);
        assert!((t - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_back_face_hit() {
        let tri = facing_triangle();

        // Approach from behind the plane
        let ray = Ray::new(Vec3::new(0.0, 0.0, -4.0), Vec3::new(0.0, 0.0, 1.0));
        let t = tri.intersect(&ray);
        assert!((t - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_intersect_matches_reference() {
        let tri = Triangle::flat(
            [
                Vec3::new(-0.7, -0.4, -3.0),
                Vec3::new(0.9, -0.6, -2.5),
                Vec3::new(0.1, 0.8, -3.5),
            ],
            MaterialStore::DEFAULT,
        );
        let mut rng = StdRng::seed_from_u64(42);
        let mut hits = 0;

        for _ in 0..2000 {
            let origin = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
            let target = Vec3::new(rng.gen_range(-1.5..1.5), rng.gen_range(-1.5..1.5), -3.0);
            let ray = Ray::new(origin, (target - origin).normalize());

            let Some((t_ref, u, v)) = moller_trumbore(&tri, &ray) else {
                continue;
            };

            // Skip rays grazing an edge or the origin, where either answer is fine
            let margin = 1e-3;
            let near_edge = u.abs() < margin || v.abs() < margin || (u + v - 1.0).abs() < margin;
            if near_edge || t_ref.abs() < margin {
                continue;
            }

            let inside = u > 0.0 && v > 0.0 && u + v < 1.0 && t_ref > 0.0;
            let t = tri.intersect(&ray);

            assert_eq!(t > 0.0, inside, "ray {:?}", ray);
            if inside {
                hits += 1;
                assert!((t - t_ref).abs() < 1e-3);
            }
        }

        assert!(hits > 0);
    }

    #[test]
    fn test_barycentric_at_vertices() {
        let tri = facing_triangle();
        let expected = [Vec3::X, Vec3::Y, Vec3::Z];

        for (vertex, unit) in tri.vertices().iter().zip(expected) {
            let weights = tri.barycentric_coordinates(*vertex);
            assert!((weights - unit).length() < 1e-5, "{:?} != {:?}", weights, unit);
        }
    }

    #[test]
    fn test_barycentric_sums_to_one() {
        let tri = facing_triangle();
        let weights = tri.barycentric_coordinates(Vec3::new(0.25, 0.1, -2.0));

        assert!((weights.x + weights.y + weights.z - 1.0).abs() < 1e-5);
        assert!(weights.min_element() > 0.0);
    }

    #[test]
    fn test_weighted_normal_and_uv() {
        let tri = Triangle::new(
            [Vec3::ZERO, Vec3::X, Vec3::Y],
            [Vec3::X, Vec3::Y, Vec3::Z],
            [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
            MaterialStore::DEFAULT,
        );

        let weights = Vec3::new(0.5, 0.25, 0.25);
        assert!((tri.weighted_normal(weights) - Vec3::new(0.5, 0.25, 0.25)).length() < 1e-6);
        assert!((tri.weighted_uv(weights) - Vec2::new(0.25, 0.25)).length() < 1e-6);
    }

    #[test]
    fn test_degenerate_triangle_never_intersects() {
        let collinear = Triangle::flat(
            [Vec3::new(0.0, 0.0, -1.0), Vec3::new(1.0, 0.0, -1.0), Vec3::new(2.0, 0.0, -1.0)],
            MaterialStore::DEFAULT,
        );
        let coincident = Triangle::flat([Vec3::new(0.0, 0.0, -1.0); 3], MaterialStore::DEFAULT);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.5, 0.0, -1.0));
        for tri in [collinear, coincident] {
            assert!(tri.is_degenerate());
            assert_eq!(tri.intersect(&ray), NO_INTERSECT);
            assert!(!tri.barycentric_coordinates(Vec3::ZERO).is_nan());
        }
    }

    #[test]
    fn test_set_vertices_recomputes_plane() {
        let mut tri = facing_triangle();
        tri.set_vertices([
            Vec3::new(-1.0, -1.0, -5.0),
            Vec3::new(1.0, -1.0, -5.0),
            Vec3::new(0.0, 2.0, -5.0),
        ]);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!((tri.intersect(&ray) - 5.0).abs() < 0.001);
    }
}
