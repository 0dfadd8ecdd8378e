//! Putt Level - the mini-golf course built on `putt_physics`
//!
//! The level is data ([`LevelLayout`]): named actors made of shape lists,
//! revolute joints between them, a cloth flag, a goal box and the set of
//! actors that reset returns to their starting pose. [`Scene::compose`]
//! turns the layout into world actors once; the [`Controller`] then checks
//! the goal, swings the club and resets. [`MiniGolf`] wraps all of it behind
//! the session API the host loop drives.
//!
//! # Example
//!
//! ```ignore
//! use putt_level::MiniGolf;
//!
//! let mut game = MiniGolf::standard()?;
//! game.initialize()?;
//!
//! game.swing(400.0)?;
//! for _ in 0..600 {
//!     game.step(1.0 / 60.0)?;
//! }
//! println!("won: {}", game.is_won());
//! ```

pub mod controller;
pub mod error;
pub mod game;
pub mod layout;
pub mod scene;

pub use controller::{Controller, WinState, IDLE_COUNTER_SWING};
pub use error::{LevelError, LevelResult};
pub use game::MiniGolf;
pub use layout::{
    names, ActorLayout, ClothLayout, Color, GoalBox, JointLayout, LevelLayout, MaterialLayout,
    ShapeLayout,
};
pub use scene::{ActorHandle, InitialPoseRecord, RecordedPose, Scene, SceneActor};
