//! Linear algebra layer for DOLFIN.
//!
//! Vectors with (possibly distributed) ownership ranges, global matrices
//! behind pluggable native backends, and P1 assembly on unit-square meshes
//! for producing realistic test operators.

pub mod assembly;
pub mod backend;
pub mod error;
pub mod index;
pub mod layout;
pub mod mesh;
pub mod parameters;
pub mod sparsity;
pub mod vector;

pub use assembly::{assemble_load, assemble_mass, assemble_stiffness};
pub use backend::{
    BackendFactory, BackendKind, DenseFactory, DenseMatrix, GenericMatrix, Matrix, MatrixNorm,
    SparseFactory, SparseMatrix, available_backends, default_factory, factory,
    has_linear_algebra_backend,
};
pub use error::{LaError, Result};
pub use index::Indices;
pub use layout::{Layout, OwnershipRange, local_range};
pub use mesh::UnitSquareMesh;
pub use parameters::Parameters;
pub use sparsity::SparsityPattern;
pub use vector::{Vector, VectorNorm};

/// Machine precision used for comparisons with dense reference results.
pub const DOLFIN_EPS: f64 = 3.0e-16;
