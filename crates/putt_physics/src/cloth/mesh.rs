//! Procedural cloth grid

use serde::{Deserialize, Serialize};

/// A cloth particle: position plus inverse mass (0 = pinned)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClothParticle {
    pub position: [f32; 3],
    pub inv_mass: f32,
}

impl ClothParticle {
    /// Whether the particle is pinned in place
    pub fn is_pinned(&self) -> bool {
        self.inv_mass == 0.0
    }
}

/// Regular particle grid with quad topology, in the cloth's local frame.
///
/// The grid lies in the local XZ plane. Particle `(i, j)` sits at index
/// `i + j * (cols + 1)`; quad `(i, j)` sits at index `i + j * cols` and
/// references `(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)` in that order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClothMesh {
    cols: u32,
    rows: u32,
    particles: Vec<ClothParticle>,
    quads: Vec<[u32; 4]>,
}

impl ClothMesh {
    /// Build a `size[0]` by `size[1]` grid split into `resolution[0]` columns
    /// and `resolution[1]` rows. With `pin_top_row` the row-0 particles get
    /// inverse mass 0.
    ///
    /// A zero column or row count gives a degenerate mesh with no quads.
    pub fn grid(size: [f32; 2], resolution: [u32; 2], pin_top_row: bool) -> Self {
        let [cols, rows] = resolution;
        let w_step = if cols == 0 { 0.0 } else { size[0] / cols as f32 };
        let h_step = if rows == 0 { 0.0 } else { size[1] / rows as f32 };

        let mut particles = Vec::with_capacity(((cols + 1) * (rows + 1)) as usize);
        for j in 0..=rows {
            for i in 0..=cols {
                let inv_mass = if pin_top_row && j == 0 { 0.0 } else { 1.0 };
                particles.push(ClothParticle {
                    position: [w_step * i as f32, 0.0, h_step * j as f32],
                    inv_mass,
                });
            }
        }

        let stride = cols + 1;
        let mut quads = Vec::with_capacity((cols * rows) as usize);
        for j in 0..rows {
            for i in 0..cols {
                quads.push([
                    i + j * stride,
                    (i + 1) + j * stride,
                    (i + 1) + (j + 1) * stride,
                    i + (j + 1) * stride,
                ]);
            }
        }

        Self {
            cols,
            rows,
            particles,
            quads,
        }
    }

    /// Number of columns
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Number of rows
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Index of particle `(i, j)`
    pub fn particle_index(&self, i: u32, j: u32) -> u32 {
        i + j * (self.cols + 1)
    }

    /// All particles
    pub fn particles(&self) -> &[ClothParticle] {
        &self.particles
    }

    /// All quads
    pub fn quads(&self) -> &[[u32; 4]] {
        &self.quads
    }

    /// Number of particles
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Number of quads
    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }

    /// Number of pinned particles
    pub fn pinned_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_pinned()).count()
    }

    /// A mesh without quads cannot be cooked
    pub fn is_degenerate(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }

    pub(crate) fn into_parts(self) -> (Vec<ClothParticle>, Vec<[u32; 4]>) {
        (self.particles, self.quads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flag_grid_counts() {
        let mesh = ClothMesh::grid([2.0, 2.0], [20, 20], true);
        assert_eq!(mesh.particle_count(), 441);
        assert_eq!(mesh.quad_count(), 400);
        assert_eq!(mesh.pinned_count(), 21);
    }

    #[test]
    fn test_single_quad_winding() {
        let mesh = ClothMesh::grid([1.0, 1.0], [1, 1], false);
        assert_eq!(mesh.quads(), &[[0, 1, 3, 2]]);
        assert_eq!(mesh.pinned_count(), 0);
    }

    #[test]
    fn test_particle_positions() {
        let mesh = ClothMesh::grid([2.0, 1.0], [4, 2], true);
        let p = mesh.particles()[mesh.particle_index(3, 1) as usize];
        assert_relative_eq!(p.position[0], 1.5);
        assert_relative_eq!(p.position[1], 0.0);
        assert_relative_eq!(p.position[2], 0.5);
        assert_eq!(p.inv_mass, 1.0);

        let corner = mesh.particles()[mesh.particle_index(4, 2) as usize];
        assert_relative_eq!(corner.position[0], 2.0);
        assert_relative_eq!(corner.position[2], 1.0);
    }

    #[test]
    fn test_only_top_row_pinned() {
        let mesh = ClothMesh::grid([1.0, 1.0], [3, 3], true);
        for (index, particle) in mesh.particles().iter().enumerate() {
            assert_eq!(particle.is_pinned(), index < 4, "particle {index}");
        }
    }

    #[test]
    fn test_quad_indices_in_range() {
        let mesh = ClothMesh::grid([3.0, 1.0], [5, 2], false);
        let count = mesh.particle_count() as u32;
        assert!(mesh.quads().iter().flatten().all(|&i| i < count));

        // Quad (i, j) lives at i + j * cols
        assert_eq!(mesh.quads()[2 + 5], [8, 9, 15, 14]);
    }

    #[test]
    fn test_grid_layout_across_resolutions() {
        let size = [2.0, 3.0];
        for cols in 1..=5u32 {
            for rows in 1..=5u32 {
                for pin in [false, true] {
                    let mesh = ClothMesh::grid(size, [cols, rows], pin);
                    let ctx = format!("{cols}x{rows} pin={pin}");

                    assert_eq!(mesh.particle_count(), ((cols + 1) * (rows + 1)) as usize, "{ctx}");
                    assert_eq!(mesh.quad_count(), (cols * rows) as usize, "{ctx}");
                    assert_eq!(mesh.pinned_count(), if pin { cols as usize + 1 } else { 0 }, "{ctx}");

                    let stride = cols + 1;
                    let count = mesh.particle_count() as u32;
                    for j in 0..rows {
                        for i in 0..cols {
                            let quad = mesh.quads()[(i + j * cols) as usize];
                            let expected = [
                                i + j * stride,
                                (i + 1) + j * stride,
                                (i + 1) + (j + 1) * stride,
                                i + (j + 1) * stride,
                            ];
                            assert_eq!(quad, expected, "{ctx} quad ({i}, {j})");
                            assert!(quad.iter().all(|&v| v < count), "{ctx} quad ({i}, {j})");
                        }
                    }

                    for j in 0..=rows {
                        for i in 0..=cols {
                            let p = mesh.particles()[mesh.particle_index(i, j) as usize];
                            assert_relative_eq!(p.position[0], size[0] / cols as f32 * i as f32, epsilon = 1e-6);
                            assert_relative_eq!(p.position[1], 0.0);
                            assert_relative_eq!(p.position[2], size[1] / rows as f32 * j as f32, epsilon = 1e-6);
                            let expected = if pin && j == 0 { 0.0 } else { 1.0 };
                            assert_eq!(p.inv_mass, expected, "{ctx} particle ({i}, {j})");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_degenerate_grid() {
        let mesh = ClothMesh::grid([1.0, 1.0], [0, 3], true);
        assert!(mesh.is_degenerate());
        assert_eq!(mesh.quad_count(), 0);
        assert_eq!(mesh.particle_count(), 4);
        assert!(mesh.particles().iter().all(|p| p.position[0] == 0.0));
    }
}
