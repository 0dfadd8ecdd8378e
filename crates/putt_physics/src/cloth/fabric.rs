//! Cooked cloth fabric: distance constraints grouped into phases

use super::mesh::ClothMesh;
use crate::config::ClothSettings;
use crate::error::{PhysicsError, Result};
use serde::{Deserialize, Serialize};

/// Kind of constraints in a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseKind {
    /// Structural edges running along the gravity axis
    Vertical,
    /// Structural edges across the gravity axis
    Horizontal,
    /// Quad diagonals
    Shearing,
    /// Edges skipping one particle
    Bending,
}

impl PhaseKind {
    /// Stiffness the solver uses for this phase
    pub fn stiffness(self, settings: &ClothSettings) -> f32 {
        match self {
            Self::Vertical => settings.vertical_stiffness,
            Self::Horizontal => settings.horizontal_stiffness,
            Self::Shearing => settings.shearing_stiffness,
            Self::Bending => settings.bending_stiffness,
        }
    }
}

/// Distance constraint between two particles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceConstraint {
    pub a: u32,
    pub b: u32,
    pub rest_length: f32,
}

/// Constraints of one kind, solved together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabricPhase {
    pub kind: PhaseKind,
    pub constraints: Vec<DistanceConstraint>,
}

/// Cloth fabric cooked from a mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothFabric {
    particle_count: usize,
    phases: Vec<FabricPhase>,
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

impl ClothFabric {
    /// Cook a mesh into distance constraints.
    ///
    /// Of the two grid directions, the one closer to `gravity_axis` (given
    /// in the mesh's local frame) becomes the vertical phase; on a tie the
    /// row direction, along which a pinned top row hangs, is vertical.
    pub fn cook(mesh: &ClothMesh, gravity_axis: [f32; 3]) -> Result<Self> {
        if mesh.is_degenerate() {
            return Err(PhysicsError::DegenerateMesh {
                cols: mesh.cols(),
                rows: mesh.rows(),
            });
        }
        if !gravity_axis.iter().all(|v| v.is_finite()) || dot(gravity_axis, gravity_axis) == 0.0 {
            return Err(PhysicsError::InvalidGeometry(
                "cloth gravity axis must be a non-zero vector".into(),
            ));
        }

        let particles = mesh.particles();
        let cols = mesh.cols();
        let rows = mesh.rows();
        let index = |i: u32, j: u32| mesh.particle_index(i, j);

        let constraint = |a: u32, b: u32| {
            let d = sub(particles[b as usize].position, particles[a as usize].position);
            DistanceConstraint {
                a,
                b,
                rest_length: dot(d, d).sqrt(),
            }
        };

        // Grid directions measured on the first quad
        let along_cols = sub(particles[index(1, 0) as usize].position, particles[0].position);
        let along_rows = sub(particles[index(0, 1) as usize].position, particles[0].position);
        let alignment = |d: [f32; 3]| dot(d, gravity_axis).abs() / dot(d, d).sqrt().max(f32::EPSILON);
        let rows_vertical = alignment(along_rows) >= alignment(along_cols);

        let mut col_edges = Vec::new();
        let mut row_edges = Vec::new();
        let mut shearing = Vec::new();
        let mut bending = Vec::new();

        for j in 0..=rows {
            for i in 0..=cols {
                let here = index(i, j);
                if i < cols {
                    col_edges.push(constraint(here, index(i + 1, j)));
                }
                if j < rows {
                    row_edges.push(constraint(here, index(i, j + 1)));
                }
                if i < cols && j < rows {
                    shearing.push(constraint(here, index(i + 1, j + 1)));
                    shearing.push(constraint(index(i + 1, j), index(i, j + 1)));
                }
                if i + 2 <= cols {
                    bending.push(constraint(here, index(i + 2, j)));
                }
                if j + 2 <= rows {
                    bending.push(constraint(here, index(i, j + 2)));
                }
            }
        }

        let (vertical, horizontal) = if rows_vertical {
            (row_edges, col_edges)
        } else {
            (col_edges, row_edges)
        };

        let phases = [
            (PhaseKind::Vertical, vertical),
            (PhaseKind::Horizontal, horizontal),
            (PhaseKind::Shearing, shearing),
            (PhaseKind::Bending, bending),
        ]
        .into_iter()
        .filter(|(_, constraints)| !constraints.is_empty())
        .map(|(kind, constraints)| FabricPhase { kind, constraints })
        .collect();

        Ok(Self {
            particle_count: mesh.particle_count(),
            phases,
        })
    }

    /// Number of particles the fabric was cooked for
    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    /// Constraint phases in solve order
    pub fn phases(&self) -> &[FabricPhase] {
        &self.phases
    }

    /// Phase of the given kind
    pub fn phase(&self, kind: PhaseKind) -> Option<&FabricPhase> {
        self.phases.iter().find(|p| p.kind == kind)
    }

    /// Total number of constraints
    pub fn constraint_count(&self) -> usize {
        self.phases.iter().map(|p| p.constraints.len()).sum()
    }
}
