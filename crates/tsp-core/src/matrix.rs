//! Dense edge-data containers indexed by node pair.
//!
//! [`Matrix`] is a full row-major `n x n` layout; [`MatrixSym`] is a lower-triangular layout for
//! data that is known to be symmetric (instance lengths, LP x-values). Both are used throughout
//! the solver wherever something needs to be looked up by `(Node, Node)`.

use crate::node::Node;

/// Row major full matrix to store arbitrary (possibly asymmetric) edge data.
#[derive(Debug, Clone)]
pub struct Matrix<Data> {
    data: Vec<Data>,
    dimension: usize,
}

impl<Data> Matrix<Data> {
    /// Panics if `data.len() != dimension * dimension`.
    pub fn new(data: Vec<Data>, dimension: usize) -> Self {
        assert_eq!(data.len(), dimension * dimension);
        Self { data, dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn data(&self) -> &[Data] {
        &self.data
    }

    #[inline(always)]
    fn index(&self, from: Node, to: Node) -> usize {
        from.0 * self.dimension + to.0
    }
}

impl<Data: Clone> Matrix<Data> {
    pub fn new_from_dimension_with_value(dimension: usize, value: Data) -> Self {
        Self {
            data: vec![value; dimension * dimension],
            dimension,
        }
    }
}

impl<Data: Copy> Matrix<Data> {
    #[inline(always)]
    pub fn get_data(&self, from: Node, to: Node) -> Data {
        self.data[self.index(from, to)]
    }

    #[inline(always)]
    pub fn get_adjacency_list(&self, from: Node) -> &[Data] {
        let start = self.index(from, Node(0));
        &self.data[start..start + self.dimension]
    }

    #[inline(always)]
    pub fn set_data(&mut self, from: Node, to: Node, data: Data) {
        let index = self.index(from, to);
        self.data[index] = data;
    }

    #[inline(always)]
    pub fn set_data_symmetric(&mut self, from: Node, to: Node, data: Data) {
        self.set_data(from, to, data);
        self.set_data(to, from, data);
    }
}

impl<Data: Default + Clone + Copy> Matrix<Data> {
    pub fn slow_new_from_fn(
        dimension: usize,
        mut distance_function: impl FnMut(Node, Node) -> Data,
    ) -> Self {
        let mut res = Matrix::new_from_dimension_with_value(dimension, Data::default());
        for row in 0..dimension {
            for column in 0..dimension {
                res.set_data(Node(row), Node(column), distance_function(Node(row), Node(column)));
            }
        }
        res
    }
}

/// A row-major lower-triangular matrix for symmetric edge data.
///
/// The underlying data has length `dimension * (dimension + 1) / 2`.
#[derive(Debug, Clone)]
pub struct MatrixSym<Data> {
    data: Vec<Data>,
    dimension: usize,
}

impl<Data> MatrixSym<Data> {
    pub fn new(data: Vec<Data>, dimension: usize) -> Self {
        assert_eq!(data.len(), dimension * (dimension + 1) / 2);
        Self { data, dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn data(&self) -> &[Data] {
        &self.data
    }
}

impl<Data: Clone> MatrixSym<Data> {
    pub fn new_from_dimension_with_value(dimension: usize, value: Data) -> Self {
        let size = dimension * (dimension + 1) / 2;
        Self::new(vec![value; size], dimension)
    }
}

impl<Data: Copy> MatrixSym<Data> {
    #[inline(always)]
    pub fn get_data(&self, from: Node, to: Node) -> Data {
        self.data[get_lower_triangle_entry(from.0, to.0)]
    }

    #[inline(always)]
    pub fn set_data(&mut self, from: Node, to: Node, data: Data) {
        let index = get_lower_triangle_entry(from.0, to.0);
        self.data[index] = data;
    }

    pub fn to_matrix(&self) -> Matrix<Data> {
        let dimension = self.dimension;
        let mut data = vec![self.data[0]; dimension * dimension];
        for row in 0..dimension {
            for column in 0..dimension {
                data[row * dimension + column] = self.get_data(Node(row), Node(column));
            }
        }
        Matrix::new(data, dimension)
    }
}

impl<Data: Default + Clone + Copy> MatrixSym<Data> {
    pub fn slow_new_from_fn(
        dimension: usize,
        mut distance_function: impl FnMut(Node, Node) -> Data,
    ) -> Self {
        let mut res = MatrixSym::new_from_dimension_with_value(dimension, Data::default());
        for row in 0..dimension {
            for column in 0..=row {
                res.set_data(Node(row), Node(column), distance_function(Node(row), Node(column)));
            }
        }
        res
    }
}

#[inline(always)]
/// Index of entry `(row, column)` in a vec-flattened lower-triangular matrix.
pub fn get_lower_triangle_entry(row: usize, column: usize) -> usize {
    if row >= column {
        (row * (row + 1)) / 2 + column
    } else {
        (column * (column + 1)) / 2 + row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_roundtrip() {
        let mut m = Matrix::new_from_dimension_with_value(4, 0u32);
        m.set_data(Node(1), Node(2), 7);
        assert_eq!(m.get_data(Node(1), Node(2)), 7);
        assert_eq!(m.get_data(Node(2), Node(1)), 0);
    }

    #[test]
    fn matrix_sym_is_symmetric_by_construction() {
        let mut m = MatrixSym::new_from_dimension_with_value(4, 0u32);
        m.set_data(Node(3), Node(1), 9);
        assert_eq!(m.get_data(Node(3), Node(1)), 9);
        assert_eq!(m.get_data(Node(1), Node(3)), 9);
    }
}
