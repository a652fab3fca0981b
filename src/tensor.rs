/// Two-dimensional row-major matrix holding one example per row
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    /// Flattened storage of tensor elements
    pub data: Vec<f32>,
    /// Shape as (rows, columns)
    pub shape: (usize, usize),
}

impl Tensor {
    /// Creates a new tensor with default shape (1, n)
    pub fn new(data: Vec<f32>) -> Self {
        let n = data.len();
        Tensor {
            data,
            shape: (1, n),
        }
    }

    /// Creates a new tensor with specified shape
    pub fn new_with_shape(data: Vec<f32>, shape: (usize, usize)) -> Self {
        debug_assert_eq!(data.len(), shape.0 * shape.1);
        Tensor { data, shape }
    }

    /// Creates a tensor filled with zeros
    pub fn zeros(shape: (usize, usize)) -> Self {
        Tensor {
            data: vec![0.0; shape.0 * shape.1],
            shape,
        }
    }

    /// Creates a 0x0 tensor, used for absent labels and probabilities
    pub fn empty() -> Self {
        Tensor {
            data: Vec::new(),
            shape: (0, 0),
        }
    }

    pub fn rows(&self) -> usize {
        self.shape.0
    }

    pub fn cols(&self) -> usize {
        self.shape.1
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.shape.0 == 0
    }

    /// Reads element (row, col)
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.shape.1 + col]
    }

    /// Writes element (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        let cols = self.shape.1;
        self.data[row * cols + col] = value;
    }

    /// Borrows a single row
    pub fn row(&self, row: usize) -> &[f32] {
        let cols = self.shape.1;
        &self.data[row * cols..(row + 1) * cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f32] {
        let cols = self.shape.1;
        &mut self.data[row * cols..(row + 1) * cols]
    }

    /// Copies `n` rows starting at `offset` into a new tensor.
    /// Caller guarantees `offset + n <= rows`.
    pub fn slice_rows(&self, offset: usize, n: usize) -> Tensor {
        let cols = self.shape.1;
        let data = self.data[offset * cols..(offset + n) * cols].to_vec();
        Tensor::new_with_shape(data, (n, cols))
    }

    /// Per-column (min, max) reduction, empty for a tensor without rows
    pub fn column_min_max(&self) -> Vec<(f32, f32)> {
        let rows = self.shape.0;
        if rows == 0 {
            return Vec::new();
        }

        let mut ranges: Vec<(f32, f32)> = self.row(0).iter().map(|&v| (v, v)).collect();
        for row in 1..rows {
            for (col, &value) in self.row(row).iter().enumerate() {
                let (min, max) = &mut ranges[col];
                *min = min.min(value);
                *max = max.max(value);
            }
        }
        ranges
    }

    /// Builds a tensor whose row `i` is row `order[i]` of self
    pub fn permute_rows(&self, order: &[usize]) -> Tensor {
        let cols = self.shape.1;
        let mut data = Vec::with_capacity(order.len() * cols);
        for &src in order {
            data.extend_from_slice(self.row(src));
        }
        Tensor::new_with_shape(data, (order.len(), cols))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_tensors_eq;

    #[test]
    fn test_tensor_creation() {
        let t = Tensor::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(t.data.len(), 3);
        assert_eq!(t.shape, (1, 3));

        let t2 = Tensor::new_with_shape(vec![1.0, 2.0, 3.0, 4.0], (2, 2));
        assert_eq!(t2.rows(), 2);
        assert_eq!(t2.cols(), 2);

        assert!(Tensor::empty().is_empty());
        assert!(!Tensor::zeros((2, 0)).is_empty());
    }

    #[test]
    fn test_get_set() {
        let mut t = Tensor::zeros((2, 3));
        t.set(1, 2, 5.0);
        assert_eq!(t.get(1, 2), 5.0);
        assert_eq!(t.row(1), &[0.0, 0.0, 5.0]);

        t.row_mut(0)[1] = 2.0;
        assert_eq!(t.data, vec![0.0, 2.0, 0.0, 0.0, 0.0, 5.0]);
    }

    #[test]
    fn test_slice_rows() {
        let t = Tensor::new_with_shape(
            vec![
                1.0, 2.0, //
                3.0, 4.0, //
                5.0, 6.0, //
            ],
            (3, 2),
        );
        let s = t.slice_rows(1, 2);
        assert_tensors_eq(&s, &Tensor::new_with_shape(vec![3.0, 4.0, 5.0, 6.0], (2, 2)));

        let none = t.slice_rows(3, 0);
        assert_eq!(none.shape, (0, 2));
    }

    #[test]
    fn test_column_min_max() {
        let t = Tensor::new_with_shape(
            vec![
                1.0, -2.0, 7.0, //
                3.0, 4.0, 7.0, //
                -5.0, 0.0, 7.0, //
            ],
            (3, 3),
        );
        assert_eq!(
            t.column_min_max(),
            vec![(-5.0, 3.0), (-2.0, 4.0), (7.0, 7.0)]
        );
        assert!(Tensor::zeros((0, 3)).column_min_max().is_empty());
    }

    #[test]
    fn test_permute_rows() {
        let t = Tensor::new_with_shape(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], (3, 2));
        let p = t.permute_rows(&[2, 0, 1]);
        assert_eq!(p.data, vec![5.0, 6.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(p.shape, (3, 2));
    }
}
