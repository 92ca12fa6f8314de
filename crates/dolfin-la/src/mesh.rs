//! Triangular meshes of the unit square.
//!
//! Used to assemble fixture matrices and vectors for exercising the
//! backends. Vertex `(ix, iy)` has index `iy * (nx + 1) + ix`; each square
//! is split along its "right" diagonal into two counter-clockwise triangles.

/// A cell given by three vertex indices
pub type Cell = [usize; 3];

#[derive(Debug, Clone, PartialEq)]
pub struct UnitSquareMesh {
    pub nx: usize,
    pub ny: usize,
    /// Vertex coordinates
    pub vertices: Vec<[f64; 2]>,
    /// Triangle connectivity
    pub cells: Vec<Cell>,
}

impl UnitSquareMesh {
    pub fn new(nx: usize, ny: usize) -> Self {
        let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
        for iy in 0..=ny {
            for ix in 0..=nx {
                vertices.push([ix as f64 / nx as f64, iy as f64 / ny as f64]);
            }
        }

        let mut cells = Vec::with_capacity(2 * nx * ny);
        for iy in 0..ny {
            for ix in 0..nx {
                let v0 = iy * (nx + 1) + ix;
                let v1 = v0 + 1;
                let v2 = v0 + (nx + 1);
                let v3 = v1 + (nx + 1);
                cells.push([v0, v1, v3]);
                cells.push([v0, v3, v2]);
            }
        }

        Self {
            nx,
            ny,
            vertices,
            cells,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn cell_coordinates(&self, cell: usize) -> [[f64; 2]; 3] {
        let [a, b, c] = self.cells[cell];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Signed area (positive for counter-clockwise cells)
    pub fn cell_area(&self, cell: usize) -> f64 {
        let [p0, p1, p2] = self.cell_coordinates(cell);
        0.5 * ((p1[0] - p0[0]) * (p2[1] - p0[1]) - (p2[0] - p0[0]) * (p1[1] - p0[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_match_grid() {
        let mesh = UnitSquareMesh::new(3, 3);
        assert_eq!(mesh.num_vertices(), 16);
        assert_eq!(mesh.num_cells(), 18);
    }

    #[test]
    fn cells_are_counter_clockwise_and_cover_square() {
        let mesh = UnitSquareMesh::new(4, 2);
        let total: f64 = (0..mesh.num_cells()).map(|c| mesh.cell_area(c)).sum();
        assert!((total - 1.0).abs() < 1e-14);
        assert!((0..mesh.num_cells()).all(|c| mesh.cell_area(c) > 0.0));
    }
}
