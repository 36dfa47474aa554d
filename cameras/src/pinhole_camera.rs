//! Pinhole Camera
//!
//! Generates the initial ray of every path and optionally the square detector
//! that paths returning to the sensor terminate on.

use materials::MaterialInfo;
use shapes::Triangle;
use simcore::geometry::*;
use simcore::pbrt::*;

/// Radiance of the built-in detector. A detector must be emissive so the
/// random walk ends on it.
pub const DETECTOR_EMISSION: Vector3f = Vector3f::new(47.7688, 38.5664, 31.0928);

/// Camera and detector placement.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraSettings {
    /// Image width in pixels.
    pub width: usize,

    /// Image height in pixels.
    pub height: usize,

    /// Vertical field of view in degrees.
    pub fov: Float,

    /// Camera position.
    pub position: Point3f,

    /// Point the camera looks at.
    pub look_at: Point3f,

    /// Approximate up vector; orthogonalised against the view direction.
    pub up: Vector3f,

    /// Distance of the detector quad along the view direction.
    pub detector_distance: Float,

    /// Edge length of the detector quad; 0 for no detector.
    pub detector_size: Float,
}

/// Pinhole camera with an orthonormal basis derived from position, target and
/// up vector.
#[derive(Copy, Clone, Debug)]
pub struct PinholeCamera {
    /// Placement.
    settings: CameraSettings,

    /// Unit view direction.
    forward: Vector3f,

    /// Unit right vector.
    right: Vector3f,

    /// Unit up vector orthogonal to `forward` and `right`.
    up: Vector3f,

    /// `tan(fov / 2)`.
    half_fov_tan: Float,

    /// Width / height.
    aspect_ratio: Float,
}

impl PinholeCamera {
    /// Create a new camera.
    ///
    /// * `settings` - Camera and detector placement.
    pub fn new(settings: CameraSettings) -> Self {
        let forward = (settings.look_at - settings.position).normalize();
        let right = forward.cross(&settings.up).normalize();
        let up = right.cross(&forward).normalize();

        if forward.has_nans() || right.has_nans() {
            warn!("Degenerate camera basis: position, look-at and up must not be collinear");
        }

        Self {
            settings,
            forward,
            right,
            up,
            half_fov_tan: (radians(settings.fov) * 0.5).tan(),
            aspect_ratio: settings.width as Float / settings.height as Float,
        }
    }

    /// Returns the camera settings.
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Returns the unit view direction.
    pub fn forward(&self) -> Vector3f {
        self.forward
    }

    /// Returns the ray through a jittered position inside a pixel.
    ///
    /// * `pixel` - Pixel; (0, 0) is the top left corner.
    /// * `u`     - Offset inside the pixel in [0, 1)^2.
    pub fn generate_ray(&self, pixel: Point2i, u: &Point2f) -> Ray {
        let w = self.settings.width as Float;
        let h = self.settings.height as Float;

        let view_x = (2.0 * (pixel.x as Float + u.x) / w - 1.0) * self.aspect_ratio * self.half_fov_tan;
        let view_y = (1.0 - 2.0 * (pixel.y as Float + u.y) / h) * self.half_fov_tan;

        let d = (view_x * self.right + view_y * self.up + self.forward).normalize();
        Ray::new(self.settings.position, d)
    }

    /// Returns the pixel whose viewing direction equals the reverse of a
    /// direction arriving at the sensor, or `None` if it arrives from behind
    /// or falls outside the image.
    ///
    /// * `arrival` - Direction of travel of the arriving ray.
    pub fn pixel_for_direction(&self, arrival: &Vector3f) -> Option<Point2i> {
        let v = -*arrival;
        let z = v.dot(&self.forward);
        if z <= 0.0 {
            return None;
        }

        let view_x = v.dot(&self.right) / z;
        let view_y = v.dot(&self.up) / z;

        let w = self.settings.width as Float;
        let h = self.settings.height as Float;
        let x = (view_x / (self.aspect_ratio * self.half_fov_tan) + 1.0) * 0.5 * w;
        let y = (1.0 - view_y / self.half_fov_tan) * 0.5 * h;

        if (0.0..w).contains(&x) && (0.0..h).contains(&y) {
            Some(Point2i::new(x.floor() as Int, y.floor() as Int))
        } else {
            None
        }
    }

    /// Returns the two triangles of the square detector centred on the view
    /// axis, facing along `forward` so rays travelling back towards the camera
    /// hit their front side. `None` if the detector is disabled.
    pub fn detector(&self) -> Option<[Triangle; 2]> {
        if self.settings.detector_size <= 0.0 {
            return None;
        }

        let c = self.settings.position + self.settings.detector_distance * self.forward;
        let r = 0.5 * self.settings.detector_size * self.right;
        let u = 0.5 * self.settings.detector_size * self.up;

        Some([
            Triangle::new(c - r - u, c - r + u, c + r - u),
            Triangle::new(c + r + u, c + r - u, c - r + u),
        ])
    }

    /// Returns the material of the detector.
    pub fn detector_material() -> MaterialInfo {
        MaterialInfo::new(DETECTOR_EMISSION, DETECTOR_EMISSION, DETECTOR_EMISSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn settings() -> CameraSettings {
        CameraSettings {
            width: 64,
            height: 48,
            fov: 40.0,
            position: Point3f::new(0.0, 274.0, 1280.0),
            look_at: Point3f::new(0.0, 274.0, 0.0),
            up: Vector3f::new(0.0, 1.0, 0.0),
            detector_distance: 1.0,
            detector_size: 20.0,
        }
    }

    #[test]
    fn basis_is_orthonormal() {
        let c = PinholeCamera::new(settings());
        assert_eq!(c.forward(), Vector3f::new(0.0, 0.0, -1.0));
        assert!(approx_eq!(Float, c.right.dot(&c.up), 0.0, epsilon = 1e-6));
        assert!(approx_eq!(Float, c.right.x, 1.0, epsilon = 1e-6));
        assert!(approx_eq!(Float, c.up.y, 1.0, epsilon = 1e-6));
    }

    #[test]
    fn centre_ray_looks_forward() {
        let s = CameraSettings {
            width: 2,
            height: 2,
            ..settings()
        };
        let c = PinholeCamera::new(s);
        let ray = c.generate_ray(Point2i::new(1, 1), &Point2f::new(0.0, 0.0));
        assert_eq!(ray.o, s.position);
        assert!(approx_eq!(Float, ray.d.dot(&c.forward()), 1.0, epsilon = 1e-6));
    }

    #[test]
    fn top_left_pixel_points_up_and_left() {
        let c = PinholeCamera::new(settings());
        let ray = c.generate_ray(Point2i::new(0, 0), &Point2f::new(0.5, 0.5));
        assert!(ray.d.x < 0.0);
        assert!(ray.d.y > 0.0);
    }

    #[test]
    fn arrival_from_behind_has_no_pixel() {
        let c = PinholeCamera::new(settings());
        assert_eq!(c.pixel_for_direction(&c.forward()), None);
        assert_eq!(c.pixel_for_direction(&-c.forward()), Some(Point2i::new(32, 24)));
    }

    #[test]
    fn detector_faces_forward_and_culls_camera_rays() {
        let c = PinholeCamera::new(settings());
        let [t0, t1] = c.detector().unwrap();
        assert!(approx_eq!(Float, t0.normal().dot(&c.forward()), 1.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, t1.normal().dot(&c.forward()), 1.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, t0.area() + t1.area(), 400.0, epsilon = 1e-2));

        // Outgoing camera rays pass through, returning rays stop on it.
        let out = c.generate_ray(Point2i::new(32, 24), &Point2f::new(0.5, 0.5));
        assert!(t0.intersect(&out).is_none() && t1.intersect(&out).is_none());

        let back = Ray::new(out.at(100.0), -out.d);
        let hit = t0.intersect(&back).or_else(|| t1.intersect(&back)).unwrap();
        assert!(approx_eq!(Float, hit.distance, 99.0, epsilon = 0.1));
    }

    #[test]
    fn detector_disabled_with_zero_size() {
        let c = PinholeCamera::new(CameraSettings {
            detector_size: 0.0,
            ..settings()
        });
        assert!(c.detector().is_none());
        assert!(PinholeCamera::detector_material().emission.length() > 0.0);
    }

    proptest! {
        #[test]
        fn pixel_for_direction_inverts_generate_ray(
            x in 0..64i32,
            y in 0..48i32,
            ux in 0.1..0.9f32,
            uy in 0.1..0.9f32,
        ) {
            let c = PinholeCamera::new(settings());
            let ray = c.generate_ray(Point2i::new(x, y), &Point2f::new(ux, uy));
            prop_assert_eq!(c.pixel_for_direction(&-ray.d), Some(Point2i::new(x, y)));
        }
    }
}
