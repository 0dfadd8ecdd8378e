//! Putt Physics - Rapier 3D integration for the mini-golf level
//!
//! This crate wraps Rapier 3D behind handle-based operations the level code
//! uses to build and drive its actors.
//!
//! # Features
//!
//! - Rigid actors (static, dynamic, kinematic) built from shape descriptors
//! - Sphere, box and capsule shapes with per-shape local pose and material
//! - Revolute joints with angular limits and a velocity drive
//! - Cloth actors cooked from a procedural particle grid
//! - Touch events polled after each step
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  PhysicsWorld                     │
//! │  ┌─────────────┐  ┌─────────────┐  ┌───────────┐ │
//! │  │ RigidBodySet│  │ ColliderSet │  │ JointSet  │ │
//! │  └─────────────┘  └─────────────┘  └───────────┘ │
//! │  ┌──────────────────────────┐  ┌───────────────┐ │
//! │  │     PhysicsPipeline      │  │ Cloth arena   │ │
//! │  │ (collision, solver)      │  │ (PBD solver)  │ │
//! │  └──────────────────────────┘  └───────────────┘ │
//! └──────────────────────────────────────────────────┘
//!                         │
//!          ┌──────────────┼──────────────┐
//!          ▼              ▼              ▼
//!     ┌─────────┐   ┌──────────┐   ┌──────────┐
//!     │  Actor  │   │  Joint   │   │  Cloth   │
//!     │ handles │   │ handles  │   │ handles  │
//!     └─────────┘   └──────────┘   └──────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use putt_physics::prelude::*;
//!
//! let mut physics = PhysicsWorld::new(PhysicsConfig::default())?;
//!
//! // A ball resting on a slab
//! let ground = physics.create_actor(ActorKind::Static, Pose::IDENTITY);
//! physics.add_shape(ground, ShapeDesc::new(Geometry::cuboid(5.0, 0.1, 5.0)))?;
//!
//! let ball = physics.create_actor(ActorKind::Dynamic, Pose::from_position(0.0, 1.0, 0.0));
//! physics.add_shape(ball, ShapeDesc::new(Geometry::sphere(0.35)))?;
//!
//! physics.step(1.0 / 60.0);
//! ```

pub mod body;
pub mod cloth;
pub mod collider;
pub mod config;
pub mod error;
pub mod events;
pub mod joint;
pub mod material;
pub mod pose;
pub mod world;

pub mod prelude {
    //! Common imports for physics functionality
    pub use crate::body::{ActorKind, RigidBodyDesc, RigidBodyHandle};
    pub use crate::cloth::{Cloth, ClothDesc, ClothFabric, ClothHandle, ClothMesh, ClothParticle, PhaseKind};
    pub use crate::collider::{ColliderHandle, Geometry, ShapeDesc};
    pub use crate::config::{ClothSettings, PhysicsConfig};
    pub use crate::error::{PhysicsError, Result};
    pub use crate::events::{TouchEvent, TouchKind};
    pub use crate::joint::{JointHandle, JointState, RevoluteJointDesc};
    pub use crate::material::{CombineRule, PhysicsMaterial};
    pub use crate::pose::Pose;
    pub use crate::world::PhysicsWorld;
}

pub use prelude::*;
