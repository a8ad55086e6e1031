//! Scene camera
//!
//! The scene only needs a handful of things from its camera: matrices for the
//! uniform state, a world position for the occluder, and the two
//! mode-dependent queries (pick a point on the ground, fit a region). Those
//! are the [`SceneCamera`] trait; [`Camera`] is the stock implementation.
//!
//! Mode-dependent queries take a [`ViewSpace`], which carries exactly the
//! geometry the query needs in that mode: the ellipsoid for the globe, the
//! map projection for the flat modes.

use geoscene_math::{mat4, Cartesian2, Cartesian3, Cartographic, Ellipsoid, Extent, MapProjection, Mat4};

/// Geometry a mode-dependent camera query works against
#[derive(Clone, Copy)]
pub enum ViewSpace<'a> {
    /// 3D: positions on the ellipsoid surface
    Globe(&'a Ellipsoid),
    /// 2D: top-down flat map
    Map2D(&'a dyn MapProjection),
    /// Columbus view: flat map in perspective
    Columbus(&'a dyn MapProjection),
}

/// What the scene requires of a camera
pub trait SceneCamera {
    /// Adapt to the current drawing-buffer size
    fn update(&mut self, drawing_buffer_size: (u32, u32));

    fn view_matrix(&self) -> Mat4;
    fn projection_matrix(&self) -> Mat4;

    /// Projection with the far plane at infinity, when the frustum has one
    fn infinite_projection_matrix(&self) -> Option<Mat4>;

    /// Eye position in world coordinates
    fn position_wc(&self) -> Cartesian3;

    /// World position under a window position, `None` if nothing is hit
    fn pick(&self, window_position: Cartesian2, space: ViewSpace<'_>) -> Option<Cartesian3>;

    /// Move the camera so the extent fills the view
    fn view_extent(&mut self, extent: &Extent, space: ViewSpace<'_>);
}

/// Where the camera is and how it looks
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraPose {
    /// Perspective eye; world space on the globe, map space in Columbus view
    Perspective {
        position: Cartesian3,
        direction: Cartesian3,
        up: Cartesian3,
    },
    /// Orthographic view straight down onto the map
    TopDown {
        /// Map coordinates of the view center
        center: Cartesian2,
        /// Half the visible map height in meters
        half_height: f64,
    },
}

/// Perspective camera over a globe or map
#[derive(Clone, Debug)]
pub struct Camera {
    pub pose: CameraPose,
    /// Vertical field of view in radians
    pub fov_y: f64,
    pub near: f64,
    pub far: f64,
    size: (u32, u32),
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl Camera {
    /// Create a camera looking at the globe from 2.5 earth radii out along +X
    pub fn new(width: u32, height: u32) -> Self {
        let distance = 2.5 * Ellipsoid::WGS84.maximum_radius();
        Self {
            pose: CameraPose::Perspective {
                position: Cartesian3::new(distance, 0.0, 0.0),
                direction: -Cartesian3::UNIT_X,
                up: Cartesian3::UNIT_Z,
            },
            fov_y: 60f64.to_radians(),
            near: 1.0,
            far: 5.0e8,
            size: (width, height),
        }
    }

    /// Drawing-buffer size the camera last adapted to
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn aspect_ratio(&self) -> f64 {
        let (width, height) = self.size;
        if height == 0 {
            1.0
        } else {
            width as f64 / height as f64
        }
    }

    /// Move toward (positive) or away from what the camera looks at
    ///
    /// `amount` is the fraction of the current viewing distance to travel.
    pub fn zoom(&mut self, amount: f64) {
        let amount = amount.clamp(-0.9, 0.9);
        match &mut self.pose {
            CameraPose::Perspective { position, direction, .. } => {
                let distance = position.magnitude().max(self.near);
                *position += *direction * (distance * amount * 0.5);
            }
            CameraPose::TopDown { half_height, .. } => {
                *half_height *= 1.0 - amount;
            }
        }
    }

    /// Normalized device coordinates of a window position (+y up)
    fn ndc(&self, window_position: Cartesian2) -> (f64, f64) {
        let (width, height) = self.size;
        let x = 2.0 * window_position.x / width.max(1) as f64 - 1.0;
        let y = 1.0 - 2.0 * window_position.y / height.max(1) as f64;
        (x, y)
    }

    fn half_extents(&self) -> (f64, f64) {
        let tan_y = (self.fov_y * 0.5).tan();
        (tan_y * self.aspect_ratio(), tan_y)
    }

    /// Eye-space ray through a window position, for perspective poses
    fn pick_ray(&self, window_position: Cartesian2) -> Option<(Cartesian3, Cartesian3)> {
        let CameraPose::Perspective { position, direction, up } = self.pose else {
            return None;
        };
        let (x, y) = self.ndc(window_position);
        let (tan_x, tan_y) = self.half_extents();
        let right = direction.cross(up).normalized();
        let true_up = right.cross(direction).normalized();
        let ray = direction.normalized() + right * (x * tan_x) + true_up * (y * tan_y);
        Some((position, ray.normalized()))
    }

    /// Map coordinates under a window position, on the z = 0 plane
    fn pick_map(&self, window_position: Cartesian2) -> Option<Cartesian3> {
        match self.pose {
            CameraPose::TopDown { center, half_height } => {
                let (x, y) = self.ndc(window_position);
                let half_width = half_height * self.aspect_ratio();
                Some(Cartesian3::new(center.x + x * half_width, center.y + y * half_height, 0.0))
            }
            CameraPose::Perspective { .. } => {
                let (origin, ray) = self.pick_ray(window_position)?;
                if ray.z.abs() < 1e-12 {
                    return None;
                }
                let t = -origin.z / ray.z;
                (t >= 0.0).then(|| origin + ray * t)
            }
        }
    }

    /// Distance at which a `width` x `height` meter region fills the frustum
    fn fitting_distance(&self, width: f64, height: f64) -> f64 {
        let (tan_x, tan_y) = self.half_extents();
        (width * 0.5 / tan_x).max(height * 0.5 / tan_y).max(self.near * 2.0)
    }
}

fn unproject_to_surface(projection: &dyn MapProjection, projected: Cartesian3) -> Option<Cartesian3> {
    let carto = projection.unproject(projected);
    let in_range = carto.longitude.abs() <= std::f64::consts::PI
        && carto.latitude.abs() <= std::f64::consts::FRAC_PI_2;
    in_range.then(|| {
        let surface = Cartographic::new(carto.longitude, carto.latitude, 0.0);
        projection.ellipsoid().cartographic_to_cartesian(&surface)
    })
}

impl SceneCamera for Camera {
    fn update(&mut self, drawing_buffer_size: (u32, u32)) {
        self.size = drawing_buffer_size;
    }

    fn view_matrix(&self) -> Mat4 {
        match self.pose {
            CameraPose::Perspective { position, direction, up } => mat4::look_at(position, direction, up),
            CameraPose::TopDown { center, half_height } => mat4::look_at(
                Cartesian3::new(center.x, center.y, half_height),
                -Cartesian3::UNIT_Z,
                Cartesian3::UNIT_Y,
            ),
        }
    }

    fn projection_matrix(&self) -> Mat4 {
        let aspect = self.aspect_ratio();
        match self.pose {
            CameraPose::Perspective { .. } => {
                mat4::perspective(self.fov_y as f32, aspect as f32, self.near as f32, self.far as f32)
            }
            CameraPose::TopDown { half_height, .. } => {
                let half_width = half_height * aspect;
                mat4::orthographic(
                    -half_width as f32,
                    half_width as f32,
                    -half_height as f32,
                    half_height as f32,
                    0.0,
                    self.far as f32,
                )
            }
        }
    }

    fn infinite_projection_matrix(&self) -> Option<Mat4> {
        match self.pose {
            CameraPose::Perspective { .. } => Some(mat4::infinite_perspective(
                self.fov_y as f32,
                self.aspect_ratio() as f32,
                self.near as f32,
            )),
            CameraPose::TopDown { .. } => None,
        }
    }

    fn position_wc(&self) -> Cartesian3 {
        match self.pose {
            CameraPose::Perspective { position, .. } => position,
            CameraPose::TopDown { center, half_height } => Cartesian3::new(center.x, center.y, half_height),
        }
    }

    fn pick(&self, window_position: Cartesian2, space: ViewSpace<'_>) -> Option<Cartesian3> {
        match space {
            ViewSpace::Globe(ellipsoid) => {
                let (origin, ray) = self.pick_ray(window_position)?;
                let t = ellipsoid.intersect_ray(origin, ray)?;
                Some(origin + ray * t)
            }
            ViewSpace::Map2D(projection) | ViewSpace::Columbus(projection) => {
                let projected = self.pick_map(window_position)?;
                unproject_to_surface(projection, projected)
            }
        }
    }

    fn view_extent(&mut self, extent: &Extent, space: ViewSpace<'_>) {
        let center = extent.center();
        match space {
            ViewSpace::Globe(ellipsoid) => {
                let radius = ellipsoid.maximum_radius();
                let width = radius * extent.width() * center.latitude.cos();
                let height = radius * extent.height();
                let distance = self.fitting_distance(width, height);

                let surface = ellipsoid.cartographic_to_cartesian(&center);
                let normal = ellipsoid.geodetic_surface_normal_cartographic(&center);
                let north = Cartesian3::UNIT_Z - normal * normal.z;
                let up = if north.magnitude_squared() < 1e-12 {
                    Cartesian3::UNIT_Y
                } else {
                    north.normalized()
                };
                self.pose = CameraPose::Perspective {
                    position: surface + normal * distance,
                    direction: -normal,
                    up,
                };
            }
            ViewSpace::Map2D(projection) => {
                let a = projection.ellipsoid().maximum_radius();
                let projected = projection.project(&center);
                let half_height = (extent.height() * a * 0.5)
                    .max(extent.width() * a * 0.5 / self.aspect_ratio());
                self.pose = CameraPose::TopDown {
                    center: Cartesian2::new(projected.x, projected.y),
                    half_height,
                };
            }
            ViewSpace::Columbus(projection) => {
                let a = projection.ellipsoid().maximum_radius();
                let projected = projection.project(&center);
                let distance = self.fitting_distance(extent.width() * a, extent.height() * a);
                self.pose = CameraPose::Perspective {
                    position: Cartesian3::new(projected.x, projected.y, distance),
                    direction: -Cartesian3::UNIT_Z,
                    up: Cartesian3::UNIT_Y,
                };
            }
        }
        log::debug!("Camera fitted to extent, now at {:?}", self.position_wc());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoscene_math::EquidistantCylindricalProjection;

    fn center_of(camera: &Camera) -> Cartesian2 {
        let (w, h) = camera.size();
        Cartesian2::new(w as f64 / 2.0, h as f64 / 2.0)
    }

    #[test]
    fn test_default_camera_looks_at_globe() {
        let camera = Camera::new(800, 600);
        let hit = camera
            .pick(center_of(&camera), ViewSpace::Globe(&Ellipsoid::WGS84))
            .unwrap();
        assert!(hit.approx_eq(Cartesian3::new(6_378_137.0, 0.0, 0.0), 1e-3));
    }

    #[test]
    fn test_pick_off_globe_misses() {
        let camera = Camera::new(800, 600);
        let corner = Cartesian2::new(0.0, 0.0);
        assert!(camera.pick(corner, ViewSpace::Globe(&Ellipsoid::WGS84)).is_none());
    }

    #[test]
    fn test_update_changes_aspect() {
        let mut camera = Camera::new(800, 600);
        camera.update((1000, 500));
        assert_eq!(camera.size(), (1000, 500));
        assert!((camera.aspect_ratio() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_view_extent_globe_centers_on_region() {
        let mut camera = Camera::new(800, 600);
        let extent = Extent::from_degrees(10.0, 40.0, 20.0, 50.0);
        camera.view_extent(&extent, ViewSpace::Globe(&Ellipsoid::WGS84));

        let hit = camera
            .pick(center_of(&camera), ViewSpace::Globe(&Ellipsoid::WGS84))
            .unwrap();
        let carto = Ellipsoid::WGS84.cartesian_to_cartographic(hit).unwrap();
        assert!((carto.longitude - 15f64.to_radians()).abs() < 1e-3);
        assert!((carto.latitude - 45f64.to_radians()).abs() < 1e-2);
    }

    #[test]
    fn test_view_extent_2d_is_top_down() {
        let projection = EquidistantCylindricalProjection::default();
        let mut camera = Camera::new(800, 600);
        let extent = Extent::from_degrees(-20.0, -10.0, 20.0, 10.0);
        camera.view_extent(&extent, ViewSpace::Map2D(&projection));

        assert!(matches!(camera.pose, CameraPose::TopDown { .. }));
        assert!(camera.infinite_projection_matrix().is_none());

        let hit = camera
            .pick(center_of(&camera), ViewSpace::Map2D(&projection))
            .unwrap();
        assert!(hit.approx_eq(Cartesian3::new(6_378_137.0, 0.0, 0.0), 1e-3));
    }

    #[test]
    fn test_view_extent_columbus_picks_center() {
        let projection = EquidistantCylindricalProjection::default();
        let mut camera = Camera::new(800, 600);
        let extent = Extent::from_degrees(80.0, -10.0, 100.0, 10.0);
        camera.view_extent(&extent, ViewSpace::Columbus(&projection));

        let hit = camera
            .pick(center_of(&camera), ViewSpace::Columbus(&projection))
            .unwrap();
        assert!(hit.approx_eq(Cartesian3::new(0.0, 6_378_137.0, 0.0), 1e-3));
    }

    #[test]
    fn test_zoom_moves_closer() {
        let mut camera = Camera::new(800, 600);
        let before = camera.position_wc().magnitude();
        camera.zoom(0.5);
        assert!(camera.position_wc().magnitude() < before);
    }
}
