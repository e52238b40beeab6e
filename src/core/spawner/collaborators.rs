//=========================================================================
// Spawner Collaborators
//=========================================================================
//
// Narrow interfaces the spawner drives but never implements.
//
//   EnemySpawner ──spawn(tag, pos, rot)──► EntityPool ──► Handle
//        │
//        └──set_velocity / set_look_at(handle)──► EntityConfigurator
//
// Rendering, physics and pooling backends live behind these traits.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::{Quat, Vec3};

//=== CameraHandle ========================================================

/// Opaque camera reference handed to spawned entities for billboarding.
///
/// The spawner only passes it through; what the number means is up to
/// the rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CameraHandle(pub u64);

//=== PoolError ===========================================================

/// Reasons a pool may refuse to hand out an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Every pooled instance for `tag` is in use and the pool cannot grow.
    Exhausted { tag: String },

    /// No pool exists for `tag`.
    UnknownTag { tag: String },
}

impl std::fmt::Display for PoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhausted { tag } => write!(f, "Pool for {:?} is exhausted", tag),
            Self::UnknownTag { tag } => write!(f, "No pool registered for tag {:?}", tag),
        }
    }
}

impl std::error::Error for PoolError {}

//=== EntityPool ==========================================================

/// Source of spawnable entities.
pub trait EntityPool: Send {
    /// Handle identifying a materialized entity.
    type Handle;

    /// Activates an entity tagged `tag` at `position` with `orientation`.
    fn spawn(&mut self, tag: &str, position: Vec3, orientation: Quat)
        -> Result<Self::Handle, PoolError>;
}

//=== EntityConfigurator ==================================================

/// Applies initial kinematics and facing to a freshly spawned entity.
pub trait EntityConfigurator<H>: Send {
    /// Sets the rigid-body initial velocity.
    fn set_velocity(&mut self, entity: &H, velocity: Vec3);

    /// Points the entity's billboard at `camera`.
    fn set_look_at(&mut self, entity: &H, camera: CameraHandle);
}

//=========================================================================
// Unit Tests
//=========================================================================
