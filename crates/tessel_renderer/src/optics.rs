//! Secondary rays spawned at dielectric and mirror surfaces.

use tessel_math::Ray;

use crate::surfel::SurfaceElement;

/// Offset applied along the normal to spawned ray origins.
pub const COLLISION_BIAS: f32 = 0.001;

/// Mirror `ray` about the surface normal.
///
/// The origin is pushed off the surface along `+normal`.
pub fn reflect(ray: &Ray, surfel: &SurfaceElement<'_>) -> Ray {
    let origin = surfel.point + COLLISION_BIAS * surfel.normal;
    let direction = ray.direction - 2.0 * ray.direction.dot(surfel.normal) * surfel.normal;

    Ray::new(origin, direction)
}

/// Bend `ray` into the surface per Snell's law.
///
/// A ray leaving the surface (`-d.n < 0`) has already been refracted and
/// passes straight through. Total internal reflection falls back to
/// [`reflect`].
pub fn refract(ray: &Ray, medium_ior: f32, surfel: &SurfaceElement<'_>) -> Ray {
    let n1 = medium_ior;
    let n2 = surfel.index_of_refraction();

    let cos_theta1 = -ray.direction.dot(surfel.normal);

    if cos_theta1 < 0.0 {
        return Ray::new(surfel.point + COLLISION_BIAS * surfel.normal, ray.direction);
    }

    let origin = surfel.point - COLLISION_BIAS * surfel.normal;

    let n = n1 / n2;
    let sin_theta2_squared = n * n * (1.0 - cos_theta1 * cos_theta1);
    if sin_theta2_squared > 1.0 {
        return reflect(ray, surfel);
    }

    let cos_theta2 = (1.0 - sin_theta2_squared).sqrt();
    let direction = n * ray.direction + (n * cos_theta1 - cos_theta2) * surfel.normal;

    Ray::new(origin, direction)
}
