//! P1 finite element assembly on triangle meshes.
//!
//! Produces the fixture matrices and vectors used to exercise the backends:
//! stiffness `∫ ∇u·∇v dx`, mass `∫ u v dx` and load `∫ v dx`. Degrees of
//! freedom coincide with mesh vertices.
//!
//! Element matrices are computed in parallel; insertion into the global
//! matrix is sequential.

use crate::backend::{BackendFactory, GenericMatrix, Matrix};
use crate::error::Result;
use crate::mesh::UnitSquareMesh;
use crate::sparsity::SparsityPattern;
use crate::vector::Vector;
use nalgebra::{DMatrix, Matrix3};
use rayon::prelude::*;

/// Element kernel: maps cell vertex coordinates to a 3x3 element matrix.
pub type ElementKernel = fn(&[[f64; 2]; 3]) -> Matrix3<f64>;

fn signed_area(p: &[[f64; 2]; 3]) -> f64 {
    0.5 * ((p[1][0] - p[0][0]) * (p[2][1] - p[0][1]) - (p[2][0] - p[0][0]) * (p[1][1] - p[0][1]))
}

/// Element stiffness matrix of the Laplacian
pub fn p1_stiffness(p: &[[f64; 2]; 3]) -> Matrix3<f64> {
    let area = signed_area(p).abs();
    // Gradients of the barycentric coordinates, scaled by 2*area
    let mut grads = [[0.0; 2]; 3];
    for i in 0..3 {
        let j = (i + 1) % 3;
        let k = (i + 2) % 3;
        grads[i] = [p[j][1] - p[k][1], p[k][0] - p[j][0]];
    }
    let scale = 1.0 / (4.0 * area);
    Matrix3::from_fn(|i, j| scale * (grads[i][0] * grads[j][0] + grads[i][1] * grads[j][1]))
}

/// Element mass matrix
pub fn p1_mass(p: &[[f64; 2]; 3]) -> Matrix3<f64> {
    let area = signed_area(p).abs();
    Matrix3::from_fn(|i, j| if i == j { area / 6.0 } else { area / 12.0 })
}

/// Sparsity pattern of P1 matrices: vertices sharing a cell are coupled.
pub fn sparsity_pattern(mesh: &UnitSquareMesh) -> Result<SparsityPattern> {
    let n = mesh.num_vertices();
    let mut pattern = SparsityPattern::new(n, n);
    for cell in &mesh.cells {
        pattern.insert_block(cell, cell)?;
    }
    Ok(pattern)
}

/// Assemble the global matrix of `kernel` using `factory` storage.
pub fn assemble_matrix(
    mesh: &UnitSquareMesh,
    factory: &dyn BackendFactory,
    kernel: ElementKernel,
) -> Result<Matrix> {
    let pattern = sparsity_pattern(mesh)?;
    let mut matrix = factory.create_matrix(&pattern);

    let element_matrices: Vec<Matrix3<f64>> = (0..mesh.num_cells())
        .into_par_iter()
        .map(|cell| kernel(&mesh.cell_coordinates(cell)))
        .collect();

    for (cell, local) in mesh.cells.iter().zip(&element_matrices) {
        let block = DMatrix::from_iterator(3, 3, local.iter().copied());
        matrix.add_block(cell, cell, &block)?;
    }
    matrix.apply();

    tracing::debug!(
        backend = factory.name(),
        rows = matrix.nrows(),
        nnz = matrix.nnz(),
        cells = mesh.num_cells(),
        "assembled matrix"
    );
    Ok(matrix)
}

pub fn assemble_stiffness(mesh: &UnitSquareMesh, factory: &dyn BackendFactory) -> Result<Matrix> {
    assemble_matrix(mesh, factory, p1_stiffness)
}

pub fn assemble_mass(mesh: &UnitSquareMesh, factory: &dyn BackendFactory) -> Result<Matrix> {
    assemble_matrix(mesh, factory, p1_mass)
}

/// Assemble the load vector `∫ v dx`.
pub fn assemble_load(mesh: &UnitSquareMesh, factory: &dyn BackendFactory) -> Vector {
    let mut load = factory.create_vector(mesh.num_vertices());
    let data = load.data_mut();
    for (c, cell) in mesh.cells.iter().enumerate() {
        let share = mesh.cell_area(c).abs() / 3.0;
        for &v in cell {
            data[v] += share;
        }
    }
    load
}
