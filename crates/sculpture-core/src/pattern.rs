//! Moving volumetric patterns that light up the sculpture.
//!
//! Templates describe a shape only. Spawning a template produces a
//! `SpatialPattern` with its own id, position, velocity and intensity step.

use glam::Vec3;
use rand::Rng;
use smallvec::SmallVec;

use crate::constants::{
    BOX_MAX_SIZE, BOX_MIN_SIZE, PATTERN_MIN_EXTENT, SPHERE_MAX_RADIUS, SPHERE_MIN_RADIUS,
};

pub type PatternId = u64;

/// Shape of a pattern.
///
/// Boxes are axis aligned and only ever translated. Their containment test
/// ignores height; spheres test all three axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PatternShape {
    Box { width: f32, height: f32, depth: f32 },
    Sphere { radius: f32 },
}

impl PatternShape {
    /// Corners of the box around the local origin; spheres have none.
    fn local_corners(&self) -> SmallVec<[Vec3; 8]> {
        match *self {
            PatternShape::Box {
                width,
                height,
                depth,
            } => {
                let half = Vec3::new(width, height, depth) * 0.5;
                let mut corners = SmallVec::new();
                for sx in [-1.0, 1.0] {
                    for sy in [-1.0, 1.0] {
                        for sz in [-1.0, 1.0] {
                            corners.push(half * Vec3::new(sx, sy, sz));
                        }
                    }
                }
                corners
            }
            PatternShape::Sphere { .. } => SmallVec::new(),
        }
    }
}

/// Ranges for randomly sized box templates (x = width, y = height, z = depth).
#[derive(Clone, Debug)]
pub struct BoxRange {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BoxRange {
    fn default() -> Self {
        Self {
            min: Vec3::from(BOX_MIN_SIZE),
            max: Vec3::from(BOX_MAX_SIZE),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SphereRange {
    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for SphereRange {
    fn default() -> Self {
        Self {
            min_radius: SPHERE_MIN_RADIUS,
            max_radius: SPHERE_MAX_RADIUS,
        }
    }
}

/// Read-only shape prototype that spawned patterns are built from.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternTemplate {
    shape: PatternShape,
}

impl PatternTemplate {
    /// Sizes are taken by magnitude; a size below `PATTERN_MIN_EXTENT` or
    /// not finite is replaced by it.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Self {
            shape: PatternShape::Box {
                width: extent(width),
                height: extent(height),
                depth: extent(depth),
            },
        }
    }

    pub fn sphere(radius: f32) -> Self {
        Self {
            shape: PatternShape::Sphere {
                radius: extent(radius),
            },
        }
    }

    pub fn shape(&self) -> PatternShape {
        self.shape
    }

    /// Each dimension is `max(min, uniform(0,1) * max)`.
    pub fn random_box<R: Rng + ?Sized>(range: &BoxRange, rng: &mut R) -> Self {
        let width = range.min.x.max(rng.gen::<f32>() * range.max.x);
        let height = range.min.y.max(rng.gen::<f32>() * range.max.y);
        let depth = range.min.z.max(rng.gen::<f32>() * range.max.z);
        Self::cuboid(width, height, depth)
    }

    pub fn random_sphere<R: Rng + ?Sized>(range: &SphereRange, rng: &mut R) -> Self {
        Self::sphere(range.min_radius.max(rng.gen::<f32>() * range.max_radius))
    }
}

fn extent(size: f32) -> f32 {
    let size = size.abs();
    if size.is_finite() && size >= PATTERN_MIN_EXTENT {
        size
    } else {
        PATTERN_MIN_EXTENT
    }
}

/// One random box and one random sphere.
pub fn default_templates<R: Rng + ?Sized>(rng: &mut R) -> Vec<PatternTemplate> {
    vec![
        PatternTemplate::random_box(&BoxRange::default(), rng),
        PatternTemplate::random_sphere(&SphereRange::default(), rng),
    ]
}

/// Random per-pattern intensity step in `(0, max]`.
pub fn random_increment<R: Rng + ?Sized>(max: f32, rng: &mut R) -> f32 {
    (1.0 - rng.gen::<f32>()) * max
}

/// A spawned pattern owned by the accumulator.
#[derive(Clone, Debug)]
pub struct SpatialPattern {
    pub id: PatternId,
    pub shape: PatternShape,
    pub position: Vec3,
    /// World units per second.
    pub velocity: Vec3,
    pub intensity_increment: f32,
    pub frame_count: u32,
    radius_squared: f32,
    world_vertices: SmallVec<[Vec3; 8]>,
}

impl SpatialPattern {
    /// Builds a fresh instance. The world geometry cache stays empty until the
    /// first `advance`.
    pub fn from_template(
        id: PatternId,
        template: &PatternTemplate,
        position: Vec3,
        velocity: Vec3,
        intensity_increment: f32,
    ) -> Self {
        let radius_squared = match template.shape {
            PatternShape::Sphere { radius } => radius * radius,
            PatternShape::Box { .. } => 0.0,
        };
        Self {
            id,
            shape: template.shape,
            position,
            velocity,
            intensity_increment,
            frame_count: 0,
            radius_squared,
            world_vertices: SmallVec::new(),
        }
    }

    pub fn radius_squared(&self) -> f32 {
        self.radius_squared
    }

    pub fn world_vertices(&self) -> &[Vec3] {
        &self.world_vertices
    }

    /// Ages the pattern one frame, moves it and refreshes the box corners.
    pub fn advance(&mut self, dt_sec: f32) {
        self.frame_count = self.frame_count.saturating_add(1);
        self.position += self.velocity * dt_sec;
        self.refresh_world_vertices();
    }

    fn refresh_world_vertices(&mut self) {
        let position = self.position;
        self.world_vertices = self
            .shape
            .local_corners()
            .into_iter()
            .map(|corner| corner + position)
            .collect();
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        match self.shape {
            PatternShape::Box { .. } => {
                if self.world_vertices.is_empty() {
                    return false;
                }
                let (min, max) = self.world_vertices.iter().fold(
                    (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
                    |(min, max), v| (min.min(*v), max.max(*v)),
                );
                // height is not part of a box's footprint
                point.x > min.x && point.x < max.x && point.z > min.z && point.z < max.z
            }
            PatternShape::Sphere { .. } => {
                self.position.distance_squared(point) <= self.radius_squared
            }
        }
    }
}
