use glam::DVec3;

/// Sphere in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: DVec3,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: DVec3, radius: f64) -> Self {
        Sphere { center, radius }
    }
}

/// Roots of |origin + dir * t - center|^2 = r^2 for a unit `dir`, ordered t1 <= t2.
fn unit_ray_roots(origin: DVec3, dir: DVec3, sphere: &Sphere) -> Option<(f64, f64)> {
    let oc = origin - sphere.center;
    // a = dir . dir = 1
    let b = 2.0 * oc.dot(dir);
    let c = oc.dot(oc) - sphere.radius * sphere.radius;

    let discriminant = b * b - 4.0 * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_discriminant = discriminant.sqrt();
    let t1 = (-b - sqrt_discriminant) / 2.0;
    let t2 = (-b + sqrt_discriminant) / 2.0;
    Some((t1.min(t2), t1.max(t2)))
}

/// Finds where the segment `start -> end` first meets the surface of `sphere`.
///
/// The nearer root is preferred. When the segment starts inside the sphere the
/// nearer root lies behind `start`, so the farther (exit) root is used instead.
/// A zero-length segment never intersects.
pub fn segment_sphere_intersection(start: DVec3, end: DVec3, sphere: &Sphere) -> Option<DVec3> {
    let segment = end - start;
    let length = segment.length();
    if length <= 0.0 {
        return None;
    }

    let dir = segment / length;
    let (near, far) = unit_ray_roots(start, dir, sphere)?;

    let t = if near < 0.0 { far } else { near };
    if t < 0.0 || t > length {
        return None;
    }

    Some(start + dir * t)
}

/// Distance along a unit ray to the first point on `sphere`, if any.
pub fn ray_sphere_distance(origin: DVec3, dir: DVec3, sphere: &Sphere) -> Option<f64> {
    let (near, far) = unit_ray_roots(origin, dir, sphere)?;
    let t = if near < 0.0 { far } else { near };
    (t >= 0.0).then_some(t)
}

/// Smallest distance between an unbounded ray and `point`, with the ray parameter
/// clamped so points behind the origin measure from the origin itself.
pub fn ray_point_distance(origin: DVec3, dir: DVec3, point: DVec3) -> f64 {
    let t = (point - origin).dot(dir).max(0.0);
    (origin + dir * t - point).length()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_sphere() -> Sphere {
        Sphere::new(DVec3::ZERO, 1.0)
    }

    #[test]
    fn segment_outside_sphere_misses() {
        let hit = segment_sphere_intersection(
            DVec3::new(-5.0, 3.0, 0.0),
            DVec3::new(5.0, 3.0, 0.0),
            &unit_sphere(),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn segment_stopping_short_misses() {
        let hit = segment_sphere_intersection(
            DVec3::new(-5.0, 0.0, 0.0),
            DVec3::new(-2.0, 0.0, 0.0),
            &unit_sphere(),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn segment_pointing_away_misses() {
        let hit = segment_sphere_intersection(
            DVec3::new(3.0, 0.0, 0.0),
            DVec3::new(8.0, 0.0, 0.0),
            &unit_sphere(),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn crossing_segment_returns_first_crossing() {
        let hit = segment_sphere_intersection(
            DVec3::new(-5.0, 0.0, 0.0),
            DVec3::new(5.0, 0.0, 0.0),
            &unit_sphere(),
        )
        .expect("segment passes through the sphere");
        assert_relative_eq!(hit.x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(hit.y, 0.0);

        // Same segment, reversed travel direction
        let hit = segment_sphere_intersection(
            DVec3::new(5.0, 0.0, 0.0),
            DVec3::new(-5.0, 0.0, 0.0),
            &unit_sphere(),
        )
        .expect("segment passes through the sphere");
        assert_relative_eq!(hit.x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn segment_starting_inside_returns_exit_point() {
        let hit = segment_sphere_intersection(
            DVec3::new(0.5, 0.0, 0.0),
            DVec3::new(4.0, 0.0, 0.0),
            &unit_sphere(),
        )
        .expect("segment leaves the sphere");
        assert_relative_eq!(hit.x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_length_segment_misses() {
        let p = DVec3::new(0.5, 0.0, 0.0);
        assert!(segment_sphere_intersection(p, p, &unit_sphere()).is_none());
    }

    #[test]
    fn tangent_segment_touches_once() {
        let hit = segment_sphere_intersection(
            DVec3::new(-5.0, 1.0, 0.0),
            DVec3::new(5.0, 1.0, 0.0),
            &unit_sphere(),
        )
        .expect("tangent segment touches the sphere");
        assert_relative_eq!(hit.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(hit.y, 1.0);
    }

    #[test]
    fn offset_sphere_center() {
        let sphere = Sphere::new(DVec3::new(10.0, 0.0, 0.0), 2.0);
        let hit = segment_sphere_intersection(DVec3::ZERO, DVec3::new(20.0, 0.0, 0.0), &sphere)
            .expect("segment passes through the sphere");
        assert_relative_eq!(hit.x, 8.0, epsilon = 1e-12);
    }

    #[test]
    fn ray_distance_to_sphere() {
        let origin = DVec3::new(0.0, 0.0, -10.0);
        let t = ray_sphere_distance(origin, DVec3::Z, &unit_sphere()).expect("ray hits");
        assert_relative_eq!(t, 9.0, epsilon = 1e-12);
        assert!(ray_sphere_distance(origin, -DVec3::Z, &unit_sphere()).is_none());
    }

    #[test]
    fn ray_point_distance_behind_origin() {
        let d = ray_point_distance(DVec3::new(0.0, 0.0, 3.0), DVec3::Z, DVec3::ZERO);
        assert_relative_eq!(d, 3.0);
        let d = ray_point_distance(DVec3::new(0.0, 2.0, -3.0), DVec3::Z, DVec3::ZERO);
        assert_relative_eq!(d, 2.0);
    }
}
