// Ground-plane vector math and collision primitives for the simulation.
//
// All gameplay happens on a 2D plane; `Vec2` carries world x/z and rotation is
// the yaw angle of the travel direction.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub z: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, z: 0.0 };

    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    pub fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.z + other.z)
    }

    pub fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.z - other.z)
    }

    pub fn scale(self, k: f32) -> Vec2 {
        Vec2::new(self.x * k, self.z * k)
    }

    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.z * self.z
    }

    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        self.sub(other).length()
    }

    pub fn distance_sq(self, other: Vec2) -> f32 {
        self.sub(other).length_sq()
    }

    /// Unit vector toward `other`; zero vector when the points coincide.
    pub fn direction_to(self, other: Vec2) -> Vec2 {
        let d = other.sub(self);
        let len = d.length();
        if len <= f32::EPSILON {
            Vec2::ZERO
        } else {
            d.scale(1.0 / len)
        }
    }

    /// Yaw angle facing `other` (atan2 over x/z, matching client convention).
    pub fn yaw_to(self, other: Vec2) -> f32 {
        let d = other.sub(self);
        d.x.atan2(d.z)
    }
}

/// Axis-aligned world rectangle, used for map bounds and box obstacles.
#[derive(Debug, Clone, Copy)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min_x: f32, min_z: f32, max_x: f32, max_z: f32) -> Self {
        Self {
            min: Vec2::new(min_x, min_z),
            max: Vec2::new(max_x, max_z),
        }
    }

    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.min.x, self.max.x),
            p.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Closest point of the rectangle to `p` (equals `p` when inside).
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        self.clamp(p)
    }
}

/// Static map obstacle; only circles and axis-aligned boxes occur in content.
#[derive(Debug, Clone, Copy)]
pub enum Obstacle {
    Circle { center: Vec2, radius: f32 },
    Box(Rect),
}

impl Obstacle {
    /// True when a unit circle at `pos` with `radius` penetrates the obstacle.
    pub fn blocks(&self, pos: Vec2, radius: f32) -> bool {
        match self {
            Obstacle::Circle { center, radius: r } => {
                let reach = r + radius;
                pos.distance_sq(*center) < reach * reach
            }
            Obstacle::Box(rect) => {
                let closest = rect.closest_point(pos);
                pos.distance_sq(closest) < radius * radius
            }
        }
    }
}

/// True when any obstacle blocks a unit circle at `pos`.
pub fn blocked_by_obstacles(obstacles: &[Obstacle], pos: Vec2, radius: f32) -> bool {
    obstacles.iter().any(|o| o.blocks(pos, radius))
}

/// Circle-vs-circle penetration test between two units.
pub fn units_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_sq(b) < reach * reach
}

/// Push `pos` out of the circle at `other` along the penetration normal.
///
/// Returns `pos` unchanged when the circles do not overlap or are coincident
/// (no usable normal).
pub fn push_out(pos: Vec2, radius: f32, other: Vec2, other_radius: f32) -> Vec2 {
    let reach = radius + other_radius;
    let delta = pos.sub(other);
    let dist = delta.length();
    if dist >= reach || dist <= f32::EPSILON {
        return pos;
    }
    other.add(delta.scale(reach / dist))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obstacle_circle_blocks_within_combined_radius() {
        let o = Obstacle::Circle {
            center: Vec2::new(100.0, 100.0),
            radius: 30.0,
        };
        assert!(o.blocks(Vec2::new(130.0, 100.0), 16.0));
        assert!(!o.blocks(Vec2::new(150.0, 100.0), 16.0));
    }

    #[test]
    fn obstacle_box_uses_closest_point() {
        let o = Obstacle::Box(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(o.blocks(Vec2::new(110.0, 50.0), 16.0));
        assert!(!o.blocks(Vec2::new(130.0, 50.0), 16.0));
    }

    #[test]
    fn push_out_separates_overlapping_circles() {
        let moved = push_out(Vec2::new(10.0, 0.0), 16.0, Vec2::ZERO, 16.0);
        assert!(!units_overlap(moved, 16.0, Vec2::ZERO, 16.0));
    }

    #[test]
    fn push_out_leaves_non_overlapping_position_alone() {
        let p = Vec2::new(100.0, 0.0);
        let out = push_out(p, 16.0, Vec2::ZERO, 16.0);
        assert_eq!(out, p);
    }
}
