//! Catalog of unit test groups.
//!
//! Each group lives in its own directory of the test tree and holds a C++
//! flavour (`<group>/cpp/test_<subtest>`) and/or a Python flavour
//! (`<group>/python/<subtest>.py`) of every sub-test.

use crate::error::{Result, RunnerError};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestGroup {
    pub name: &'static str,
    pub subtests: &'static [&'static str],
}

pub const UNIT_TESTS: &[TestGroup] = &[
    TestGroup {
        name: "adaptivity",
        subtests: &["errorcontrol", "TimeSeries"],
    },
    TestGroup {
        name: "ale",
        subtests: &["HarmonicSmoothing"],
    },
    TestGroup {
        name: "book",
        subtests: &["chapter_1", "chapter_10"],
    },
    TestGroup {
        name: "fem",
        subtests: &[
            "solving",
            "Assembler",
            "DirichletBC",
            "DofMap",
            "FiniteElement",
            "Form",
            "SystemAssembler",
            "LocalSolver",
            "manifolds",
        ],
    },
    TestGroup {
        name: "function",
        subtests: &[
            "Constant",
            "ConstrainedFunctionSpace",
            "Expression",
            "Function",
            "FunctionAssigner",
            "FunctionSpace",
            "SpecialFunctions",
            "nonmatching_interpolation",
        ],
    },
    TestGroup {
        name: "geometry",
        subtests: &["BoundingBoxTree", "Intersection", "Issues"],
    },
    TestGroup {
        name: "graph",
        subtests: &["GraphBuild"],
    },
    TestGroup {
        name: "io",
        subtests: &[
            "vtk",
            "XMLMeshFunction",
            "XMLMesh",
            "XMLMeshValueCollection",
            "XMLVector",
            "XMLMeshData",
            "XMLLocalMeshData",
            "XDMF",
            "HDF5",
            "Exodus",
            "X3D",
        ],
    },
    TestGroup {
        name: "jit",
        subtests: &["test"],
    },
    TestGroup {
        name: "la",
        subtests: &[
            "test",
            "solve",
            "Matrix",
            "Scalar",
            "Vector",
            "KrylovSolver",
            "LinearOperator",
        ],
    },
    TestGroup {
        name: "math",
        subtests: &["test"],
    },
    TestGroup {
        name: "mesh",
        subtests: &[
            "Cell",
            "Edge",
            "Face",
            "MeshColoring",
            "MeshData",
            "MeshEditor",
            "MeshFunction",
            "MeshIterator",
            "MeshMarkers",
            "MeshQuality",
            "MeshValueCollection",
            "BoundaryMesh",
            "Mesh",
            "SubMesh",
            "MeshTransformation",
            "SubDomain",
            "PeriodicBoundaryComputation",
        ],
    },
    TestGroup {
        name: "meshconvert",
        subtests: &["test"],
    },
    TestGroup {
        name: "multistage",
        subtests: &["RKSolver", "PointIntegralSolver"],
    },
    TestGroup {
        name: "nls",
        subtests: &["PETScSNESSolver", "TAOLinearBoundSolver"],
    },
    TestGroup {
        name: "parameter",
        subtests: &["Parameters"],
    },
    TestGroup {
        name: "python-extras",
        subtests: &["test"],
    },
    TestGroup {
        name: "refinement",
        subtests: &["refine"],
    },
];

/// Which flavour of a sub-test was run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Interface {
    #[serde(rename = "C++")]
    Cpp,
    Python,
}

impl Interface {
    pub fn label(&self) -> &'static str {
        match self {
            Interface::Cpp => "C++",
            Interface::Python => "Python",
        }
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn find_group(name: &str) -> Option<&'static TestGroup> {
    UNIT_TESTS.iter().find(|group| group.name == name)
}

/// Restrict the catalog to `names`, keeping catalog order.
///
/// An empty selection means every group.
pub fn select_groups(names: &[String]) -> Result<Vec<&'static TestGroup>> {
    if names.is_empty() {
        return Ok(UNIT_TESTS.iter().collect());
    }
    for name in names {
        if find_group(name).is_none() {
            return Err(RunnerError::UnknownGroup(name.clone()));
        }
    }
    Ok(UNIT_TESTS
        .iter()
        .filter(|group| names.iter().any(|n| n == group.name))
        .collect())
}

pub fn total_subtests(groups: &[&TestGroup]) -> usize {
    groups.iter().map(|g| g.subtests.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_all_groups() {
        assert_eq!(UNIT_TESTS.len(), 18);
        assert_eq!(find_group("la").unwrap().subtests.len(), 7);
        assert!(find_group("plot").is_none());
    }

    #[test]
    fn group_names_are_unique() {
        let mut names: Vec<_> = UNIT_TESTS.iter().map(|g| g.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), UNIT_TESTS.len());
    }

    #[test]
    fn selection_keeps_catalog_order() {
        let selected = select_groups(&["mesh".into(), "ale".into()]).unwrap();
        let names: Vec<_> = selected.iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["ale", "mesh"]);
        assert_eq!(total_subtests(&selected), 18);
    }

    #[test]
    fn unknown_group_is_rejected() {
        let err = select_groups(&["nope".into()]).unwrap_err();
        assert!(matches!(err, RunnerError::UnknownGroup(name) if name == "nope"));
    }

    #[test]
    fn interface_labels() {
        assert_eq!(Interface::Cpp.to_string(), "C++");
        assert_eq!(Interface::Python.to_string(), "Python");
    }
}
