//! Physics materials defining surface properties

use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Physics material defining friction and restitution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    /// Friction coefficient resisting the onset of sliding
    pub static_friction: f32,
    /// Friction coefficient while sliding
    pub dynamic_friction: f32,
    /// Restitution/bounciness (0 = no bounce, 1 = perfect bounce)
    pub restitution: f32,
    /// How friction is combined between two colliders
    #[serde(default)]
    pub friction_combine: CombineRule,
    /// How restitution is combined between two colliders
    #[serde(default)]
    pub restitution_combine: CombineRule,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self::new(0.5, 0.5, 0.0)
    }
}

impl PhysicsMaterial {
    /// Create a new physics material
    pub fn new(static_friction: f32, dynamic_friction: f32, restitution: f32) -> Self {
        Self {
            static_friction,
            dynamic_friction,
            restitution,
            friction_combine: CombineRule::Average,
            restitution_combine: CombineRule::Average,
        }
    }

    /// Set the restitution combine rule
    pub fn with_restitution_combine(mut self, rule: CombineRule) -> Self {
        self.restitution_combine = rule;
        self
    }

    /// Single friction coefficient handed to the solver.
    ///
    /// Rapier has one Coulomb coefficient per collider; rolling and sliding
    /// contacts dominate on a putting surface, so the dynamic value is used.
    pub fn solver_friction(&self) -> f32 {
        self.dynamic_friction
    }

    /// Combine two materials to get effective friction
    pub fn combine_friction(&self, other: &PhysicsMaterial) -> f32 {
        let rule = self.friction_combine.max_priority(other.friction_combine);
        rule.combine(self.solver_friction(), other.solver_friction())
    }

    /// Combine two materials to get effective restitution
    pub fn combine_restitution(&self, other: &PhysicsMaterial) -> f32 {
        let rule = self.restitution_combine.max_priority(other.restitution_combine);
        rule.combine(self.restitution, other.restitution)
    }
}

/// Rule for combining material properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CombineRule {
    /// Use the average of both values
    #[default]
    Average,
    /// Use the minimum value
    Min,
    /// Use the maximum value
    Max,
    /// Multiply the values
    Multiply,
}

impl CombineRule {
    /// Get the higher priority rule
    pub fn max_priority(self, other: Self) -> Self {
        use CombineRule::*;
        match (self, other) {
            (Average, _) => other,
            (_, Average) => self,
            (Min, _) => Min,
            (_, Min) => Min,
            (Multiply, _) => Multiply,
            (_, Multiply) => Multiply,
            (Max, Max) => Max,
        }
    }

    /// Combine two values using this rule
    pub fn combine(self, a: f32, b: f32) -> f32 {
        match self {
            Self::Average => (a + b) * 0.5,
            Self::Min => a.min(b),
            Self::Max => a.max(b),
            Self::Multiply => a * b,
        }
    }
}

impl From<CombineRule> for rapier::CoefficientCombineRule {
    fn from(rule: CombineRule) -> Self {
        match rule {
            CombineRule::Average => rapier::CoefficientCombineRule::Average,
            CombineRule::Min => rapier::CoefficientCombineRule::Min,
            CombineRule::Max => rapier::CoefficientCombineRule::Max,
            CombineRule::Multiply => rapier::CoefficientCombineRule::Multiply,
        }
    }
}
