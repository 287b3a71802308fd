use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Camera orientation as yaw/pitch/roll angles in radians.
///
/// Angles are applied intrinsically in yaw (Y), pitch (X), roll (Z) order.
/// A zero rotation looks down -Z with +Y up; positive pitch looks up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraRotation {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl CameraRotation {
    pub const ZERO: CameraRotation = CameraRotation {
        yaw: 0.0,
        pitch: 0.0,
        roll: 0.0,
    };

    pub const fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    /// Orientation for a camera at `position` facing `target`.
    ///
    /// Yaw and pitch are derived directly from the offset and roll is pinned
    /// to zero, so the camera never flips when the target sits straight above
    /// or below it. A target with no horizontal offset keeps yaw at zero.
    pub fn facing(position: Vec3, target: Vec3) -> Self {
        let delta = target - position;
        let horizontal = (delta.x * delta.x + delta.z * delta.z).sqrt();
        let yaw = if horizontal > f32::EPSILON {
            (-delta.x).atan2(-delta.z)
        } else {
            0.0
        };
        let pitch = delta.y.atan2(horizontal);
        Self::new(yaw, pitch, 0.0)
    }

    /// Add a yaw/pitch offset, leaving roll untouched.
    pub fn offset(self, yaw: f32, pitch: f32) -> Self {
        Self::new(self.yaw + yaw, self.pitch + pitch, self.roll)
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, self.roll)
    }

    /// The direction the camera looks along.
    pub fn forward(self) -> Vec3 {
        self.to_quat() * Vec3::NEG_Z
    }

    pub fn up(self) -> Vec3 {
        self.to_quat() * Vec3::Y
    }
}

/// Position and orientation pushed to the camera handle on a scene switch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: CameraRotation,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 3.0),
            rotation: CameraRotation::ZERO,
        }
    }
}

impl CameraPose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn looking_at(mut self, target: Vec3) -> Self {
        self.rotation = CameraRotation::facing(self.position, target);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_rotation_looks_down_negative_z() {
        let forward = CameraRotation::ZERO.forward();
        assert_relative_eq!(forward.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(forward.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(forward.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn facing_points_forward_at_target() {
        let position = Vec3::new(1.0, 2.0, 3.0);
        let target = Vec3::new(-4.0, 0.5, -2.0);
        let rotation = CameraRotation::facing(position, target);
        let expected = (target - position).normalize();
        let forward = rotation.forward();

        assert_relative_eq!(forward.x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(forward.y, expected.y, epsilon = 1e-5);
        assert_relative_eq!(forward.z, expected.z, epsilon = 1e-5);
        assert_eq!(rotation.roll, 0.0);
    }

    #[test]
    fn facing_positive_x_turns_right() {
        let rotation = CameraRotation::facing(Vec3::ZERO, Vec3::X);
        assert_relative_eq!(rotation.yaw, -std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
        assert_relative_eq!(rotation.pitch, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn facing_straight_up_keeps_camera_upright() {
        let rotation = CameraRotation::facing(Vec3::ZERO, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(rotation.yaw, 0.0);
        assert_relative_eq!(rotation.pitch, std::f32::consts::FRAC_PI_2, epsilon = 1e-6);

        // Up vector tilts backwards rather than rolling sideways.
        let up = rotation.up();
        assert_relative_eq!(up.x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn pose_builder() {
        let pose = CameraPose::new().at(Vec3::new(0.0, 1.0, 0.0)).looking_at(Vec3::new(0.0, 1.0, -10.0));
        assert_eq!(pose.position, Vec3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(pose.rotation.yaw, 0.0, epsilon = 1e-6);
        assert_relative_eq!(pose.rotation.pitch, 0.0, epsilon = 1e-6);
    }
}
