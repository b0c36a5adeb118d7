//! First-person walker.

use glam::Vec3;
use hamlet_scene::Camera;

use crate::town::Collider;

/// One frame of movement intent. Each axis is in `[-1, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerInput {
    /// Positive turns right.
    pub turn: f32,
    /// Positive walks forward.
    pub forward: f32,
    /// Positive strafes right.
    pub strafe: f32,
    /// Held to spin the windmill.
    pub spin_windmill: bool,
}

#[derive(Clone, Debug)]
pub struct Player {
    /// Heading in degrees around Y; 0 faces +X, 270 faces -Z.
    pub angle: f32,
    /// Degrees per second.
    pub turn_speed: f32,
    /// Units per second.
    pub walk_speed: f32,
    position: Vec3,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            angle: 270.0,
            turn_speed: 50.0,
            walk_speed: 3.0,
            position: Vec3::new(0.0, 1.0, 4.0),
        }
    }
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Point one unit ahead at eye height.
    pub fn look_target(&self) -> Vec3 {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        Vec3::new(self.position.x + cos, self.position.y, self.position.z + sin)
    }

    /// Applies one frame of input.
    ///
    /// Movement is dropped entirely if the target point lies inside any
    /// collider. Turning always applies. Returns whether the player moved.
    pub fn update(&mut self, input: &PlayerInput, delta: f32, colliders: &[Collider]) -> bool {
        self.angle += input.turn * self.turn_speed * delta;

        let forward = input.forward * self.walk_speed * delta;
        let strafe = input.strafe * self.walk_speed * delta;
        let (sin_a, cos_a) = self.angle.to_radians().sin_cos();
        let (sin_b, cos_b) = (self.angle + 90.0).to_radians().sin_cos();

        let target_x = self.position.x + forward * cos_a + strafe * cos_b;
        let target_z = self.position.z + forward * sin_a + strafe * sin_b;
        if colliders.iter().any(|c| c.blocks(target_x, target_z)) {
            return false;
        }

        let moved = target_x != self.position.x || target_z != self.position.z;
        self.position.x = target_x;
        self.position.z = target_z;
        moved
    }

    /// Points `camera` along the player's heading.
    pub fn apply_to(&self, camera: &mut Camera) {
        camera.set_look_at(self.position, self.look_target(), Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_default_faces_town_center() {
        let player = Player::new();
        let target = player.look_target();
        assert!(target.abs_diff_eq(Vec3::new(0.0, 1.0, 3.0), EPSILON));
    }

    #[test]
    fn test_walk_forward() {
        let mut player = Player::new();
        let input = PlayerInput {
            forward: 1.0,
            ..Default::default()
        };
        assert!(player.update(&input, 0.5, &[]));
        assert!(player.position().abs_diff_eq(Vec3::new(0.0, 1.0, 2.5), EPSILON));
    }

    #[test]
    fn test_strafe_right() {
        let mut player = Player::new();
        let input = PlayerInput {
            strafe: 1.0,
            ..Default::default()
        };
        player.update(&input, 1.0, &[]);
        // Facing -Z, right is +X.
        assert!(player.position().abs_diff_eq(Vec3::new(3.0, 1.0, 4.0), EPSILON));
    }

    #[test]
    fn test_turn() {
        let mut player = Player::new();
        let input = PlayerInput {
            turn: -1.0,
            ..Default::default()
        };
        assert!(!player.update(&input, 2.0, &[]));
        assert!((player.angle - 170.0).abs() < EPSILON);
    }

    #[test]
    fn test_collider_blocks_movement() {
        let mut player = Player::new();
        let windmill = [Collider::new(Vec3::ZERO, 1.5)];

        // Walk until the windmill stops us.
        let mut steps = 0;
        let input = PlayerInput {
            forward: 1.0,
            ..Default::default()
        };
        while player.update(&input, 0.1, &windmill) {
            steps += 1;
            assert!(steps < 100, "player walked through the windmill");
        }
        let p = player.position();
        assert!(p.x * p.x + p.z * p.z >= 1.5 * 1.5);
        assert!(p.z < 4.0);

        // Backing away is allowed.
        let back = PlayerInput {
            forward: -1.0,
            ..Default::default()
        };
        assert!(player.update(&back, 0.1, &windmill));
    }

    #[test]
    fn test_camera_follows() {
        let player = Player::new();
        let mut camera = Camera::new();
        player.apply_to(&mut camera);
        let eye = camera.view_matrix().transform_point3(player.position());
        assert!(eye.abs_diff_eq(Vec3::ZERO, EPSILON));
    }
}
