//=========================================================================
// Spawn Geometry
//=========================================================================
//
// Pure helpers computing where an enemy appears and how it is thrown.
//
// Coordinate system:
// - Y+ is up; spawn points lie on a horizontal circle at fixed altitude
// - Angles are measured in degrees from +X toward +Z
// - Entity forward is local +Z
//
//=========================================================================

//=== External Dependencies ===============================================

use fastrand::Rng;
use glam::{Mat3, Quat, Vec3};

//=== Constants ===========================================================

/// Direction used when the spawn point coincides with the facing target.
pub const FALLBACK_DIRECTION: Vec3 = Vec3::Z;

//=== SpawnPlan ===========================================================

/// Everything needed to materialize one enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPlan {
    /// Sampled angle on the spawn circle, in degrees `[0, 360)`.
    pub angle_degrees: f32,
    pub position: Vec3,
    /// Unit vector from `position` toward the facing target.
    pub direction: Vec3,
    /// Rotation turning local +Z onto `direction`.
    pub orientation: Quat,
    pub speed: f32,
    /// `direction * speed`.
    pub velocity: Vec3,
}

//=== Sampling ============================================================

/// Uniform angle in `[0, 360)` degrees.
#[inline]
pub fn sample_angle_degrees(rng: &mut Rng) -> f32 {
    rng.f32() * 360.0
}

/// Uniform value in `[min, max]`.
///
/// If the range is smaller than EPSILON, returns `min` directly.
#[inline]
pub fn sample_range(rng: &mut Rng, min: f32, max: f32) -> f32 {
    let range = max - min;
    if range < f32::EPSILON {
        return min;
    }
    (min + rng.f32() * range).clamp(min, max)
}

//=== Placement ===========================================================

/// Point on the horizontal spawn circle at `angle_degrees`.
pub fn circle_point(radius: f32, altitude: f32, angle_degrees: f32) -> Vec3 {
    let theta = angle_degrees.to_radians();
    Vec3::new(radius * theta.cos(), altitude, radius * theta.sin())
}

/// Unit direction from `from` toward `target`.
///
/// Falls back to [`FALLBACK_DIRECTION`] when the points coincide or the
/// result is not finite.
pub fn facing_direction(from: Vec3, target: Vec3) -> Vec3 {
    (target - from).try_normalize().unwrap_or(FALLBACK_DIRECTION)
}

/// Rotation whose local +Z axis points along `forward`, keeping `up` as
/// close to local +Y as possible.
///
/// When `forward` is parallel to `up` there is no unique roll, so the
/// shortest-arc rotation from +Z is used instead.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let forward = forward.try_normalize().unwrap_or(FALLBACK_DIRECTION);

    match up.cross(forward).try_normalize() {
        Some(right) => {
            let true_up = forward.cross(right);
            Quat::from_mat3(&Mat3::from_cols(right, true_up, forward)).normalize()
        }
        None => Quat::from_rotation_arc(Vec3::Z, forward),
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
