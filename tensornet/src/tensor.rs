//! Dense real tensors whose axes are addressed by leg name.
//!
//! Data is stored row-major: the last leg varies fastest. Every operation
//! returns a new tensor and leaves its input untouched.

use crate::error::{Result, TensorError};
use itertools::Itertools;
use nalgebra::DMatrix;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledTensor {
    legs: Vec<String>,
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl LabeledTensor {
    /// Create a tensor from leg names, axis lengths and row-major data.
    pub fn new<I, S>(legs: I, shape: Vec<usize>, data: Vec<f64>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let legs: Vec<String> = legs.into_iter().map(Into::into).collect();
        if legs.len() != shape.len() {
            return Err(TensorError::LegCountMismatch {
                legs: legs.len(),
                rank: shape.len(),
            });
        }
        ensure_unique(&legs)?;

        let expected = shape.iter().product::<usize>();
        if data.len() != expected {
            return Err(TensorError::DataLengthMismatch {
                expected,
                found: data.len(),
            });
        }

        Ok(Self { legs, shape, data })
    }

    /// Create a tensor by evaluating `f` at every multi-index.
    pub fn from_fn<I, S, F>(legs: I, shape: Vec<usize>, mut f: F) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnMut(&[usize]) -> f64,
    {
        let mut data = Vec::with_capacity(shape.iter().product());
        for_each_index(&shape, |idx| data.push(f(idx)));
        Self::new(legs, shape, data)
    }

    pub fn zeros<I, S>(legs: I, shape: Vec<usize>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let len = shape.iter().product();
        Self::new(legs, shape, vec![0.0; len])
    }

    /// A rank-0 tensor holding a single value.
    pub fn scalar(value: f64) -> Self {
        Self {
            legs: Vec::new(),
            shape: Vec::new(),
            data: vec![value],
        }
    }

    pub fn legs(&self) -> &[String] {
        &self.legs
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major element storage.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn has_leg(&self, leg: &str) -> bool {
        self.legs.iter().any(|l| l == leg)
    }

    pub fn axis_of(&self, leg: &str) -> Result<usize> {
        self.legs
            .iter()
            .position(|l| l == leg)
            .ok_or_else(|| TensorError::MissingLeg(leg.to_string()))
    }

    pub fn dim_of(&self, leg: &str) -> Result<usize> {
        Ok(self.shape[self.axis_of(leg)?])
    }

    /// Element at a multi-index given in leg order, or `None` when out of range.
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.rank() || index.iter().zip(&self.shape).any(|(i, d)| i >= d) {
            return None;
        }
        let offset = index
            .iter()
            .zip(row_major_strides(&self.shape))
            .map(|(i, s)| i * s)
            .sum::<usize>();
        self.data.get(offset).copied()
    }

    /// Frobenius norm.
    pub fn norm(&self) -> f64 {
        self.data.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    /// The value of a rank-0 tensor.
    pub fn item(&self) -> Result<f64> {
        if self.rank() != 0 {
            return Err(TensorError::NotAScalar(self.rank()));
        }
        Ok(self.data[0])
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self {
            legs: self.legs.clone(),
            shape: self.shape.clone(),
            data: self.data.iter().map(|x| x * factor).collect(),
        }
    }

    /// Replace all leg names, keeping axis order.
    pub fn relabel<S: AsRef<str>>(&self, legs: &[S]) -> Result<Self> {
        Self::new(
            legs.iter().map(|l| l.as_ref().to_string()),
            self.shape.clone(),
            self.data.clone(),
        )
    }

    pub fn rename_leg(&self, old: &str, new: &str) -> Result<Self> {
        let axis = self.axis_of(old)?;
        let mut legs = self.legs.clone();
        legs[axis] = new.to_string();
        self.relabel(&legs)
    }

    /// Reorder axes so that the legs appear in `order`.
    pub fn permute<S: AsRef<str>>(&self, order: &[S]) -> Result<Self> {
        if order.len() != self.rank() {
            return Err(TensorError::LegCountMismatch {
                legs: order.len(),
                rank: self.rank(),
            });
        }
        let perm = order
            .iter()
            .map(|leg| self.axis_of(leg.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        ensure_unique(&perm.iter().map(|&a| self.legs[a].clone()).collect_vec())?;

        let (shape, data) = permute_data(&self.shape, &self.data, &perm);
        Ok(Self {
            legs: perm.iter().map(|&a| self.legs[a].clone()).collect(),
            shape,
            data,
        })
    }

    /// Sum over the diagonal of two legs of equal length, removing both.
    pub fn trace(&self, first: &str, second: &str) -> Result<Self> {
        let a = self.axis_of(first)?;
        let b = self.axis_of(second)?;
        if a == b {
            return Err(TensorError::DuplicateLeg(first.to_string()));
        }
        if self.shape[a] != self.shape[b] {
            return Err(TensorError::DimensionMismatch {
                left: first.to_string(),
                right: second.to_string(),
                left_dim: self.shape[a],
                right_dim: self.shape[b],
            });
        }

        let rest = (0..self.rank()).filter(|&i| i != a && i != b).collect_vec();
        let (shape, data) = trace_axes(&self.shape, &self.data, a, b);
        Ok(Self {
            legs: rest.iter().map(|&i| self.legs[i].clone()).collect(),
            shape,
            data,
        })
    }

    /// View the tensor as a matrix with `rows` legs grouped into the row index
    /// and `cols` legs into the column index.
    pub fn to_matrix<S: AsRef<str>>(&self, rows: &[S], cols: &[S]) -> Result<DMatrix<f64>> {
        let order = rows.iter().chain(cols).map(|l| l.as_ref()).collect_vec();
        let permuted = self.permute(order.as_slice())?;
        let nrows = permuted.shape[..rows.len()].iter().product();
        let ncols = permuted.shape[rows.len()..].iter().product();
        Ok(DMatrix::from_row_slice(nrows, ncols, &permuted.data))
    }

    /// Inverse of [`to_matrix`](Self::to_matrix): reshape a matrix into a
    /// tensor with the given legs and axis lengths.
    pub fn from_matrix<I, S>(legs: I, shape: Vec<usize>, matrix: &DMatrix<f64>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(legs, shape, row_major(matrix))
    }
}

impl fmt::Display for LabeledTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}]",
            self.legs
                .iter()
                .zip(&self.shape)
                .map(|(l, d)| format!("{l}:{d}"))
                .join(", ")
        )
    }
}

fn ensure_unique(legs: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(legs.len());
    for leg in legs {
        if !seen.insert(leg.as_str()) {
            return Err(TensorError::DuplicateLeg(leg.clone()));
        }
    }
    Ok(())
}

pub(crate) fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}

/// Call `f` with every multi-index of `shape` in row-major order.
pub(crate) fn for_each_index<F: FnMut(&[usize])>(shape: &[usize], mut f: F) {
    if shape.contains(&0) {
        return;
    }
    let mut index = vec![0; shape.len()];
    loop {
        f(&index);
        let mut axis = shape.len();
        loop {
            if axis == 0 {
                return;
            }
            axis -= 1;
            index[axis] += 1;
            if index[axis] < shape[axis] {
                break;
            }
            index[axis] = 0;
        }
    }
}

/// Reorder row-major `data` so that new axis `k` is old axis `perm[k]`.
pub(crate) fn permute_data(shape: &[usize], data: &[f64], perm: &[usize]) -> (Vec<usize>, Vec<f64>) {
    let new_shape = perm.iter().map(|&a| shape[a]).collect_vec();
    if perm.iter().enumerate().all(|(k, &a)| k == a) {
        return (new_shape, data.to_vec());
    }

    let old_strides = row_major_strides(shape);
    let strides = perm.iter().map(|&a| old_strides[a]).collect_vec();
    let mut out = Vec::with_capacity(data.len());
    for_each_index(&new_shape, |idx| {
        let offset = idx.iter().zip(&strides).map(|(i, s)| i * s).sum::<usize>();
        out.push(data[offset]);
    });
    (new_shape, out)
}

/// Trace row-major `data` over axes `a` and `b`, which must have equal length.
pub(crate) fn trace_axes(shape: &[usize], data: &[f64], a: usize, b: usize) -> (Vec<usize>, Vec<f64>) {
    let rest = (0..shape.len()).filter(|&i| i != a && i != b).collect_vec();
    let perm = rest.iter().copied().chain([a, b]).collect_vec();
    let (permuted_shape, permuted) = permute_data(shape, data, &perm);

    let n = shape[a];
    let block = n * n;
    let rest_shape = permuted_shape[..rest.len()].to_vec();
    let rest_len = rest_shape.iter().product::<usize>();
    let out = (0..rest_len)
        .map(|r| (0..n).map(|i| permuted[r * block + i * n + i]).sum())
        .collect();
    (rest_shape, out)
}

/// Row-major copy of a column-major nalgebra matrix.
pub(crate) fn row_major(matrix: &DMatrix<f64>) -> Vec<f64> {
    matrix.transpose().as_slice().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn counting(legs: [&str; 3], shape: [usize; 3]) -> LabeledTensor {
        let len = shape.iter().product::<usize>();
        LabeledTensor::new(legs, shape.to_vec(), (0..len).map(|x| x as f64).collect()).unwrap()
    }

    #[test]
    fn test_rejects_inconsistent_construction() {
        assert_eq!(
            LabeledTensor::new(["a", "b"], vec![2], vec![0.0; 2]),
            Err(TensorError::LegCountMismatch { legs: 2, rank: 1 })
        );
        assert_eq!(
            LabeledTensor::new(["a", "a"], vec![2, 2], vec![0.0; 4]),
            Err(TensorError::DuplicateLeg("a".to_string()))
        );
        assert_eq!(
            LabeledTensor::new(["a", "b"], vec![2, 3], vec![0.0; 5]),
            Err(TensorError::DataLengthMismatch {
                expected: 6,
                found: 5
            })
        );
    }

    #[test]
    fn test_row_major_layout() {
        let t = counting(["a", "b", "c"], [2, 3, 4]);
        assert_eq!(t.get(&[0, 0, 1]), Some(1.0));
        assert_eq!(t.get(&[0, 1, 0]), Some(4.0));
        assert_eq!(t.get(&[1, 0, 0]), Some(12.0));
        assert_eq!(t.get(&[1, 2, 3]), Some(23.0));
        assert_eq!(t.get(&[2, 0, 0]), None);
        assert_eq!(t.dim_of("b"), Ok(3));
    }

    #[test]
    fn test_permute_moves_elements_with_their_legs() {
        let t = counting(["a", "b", "c"], [2, 3, 4]);
        let p = t.permute(&["c", "a", "b"]).unwrap();
        assert_eq!(p.legs(), &["c", "a", "b"]);
        assert_eq!(p.shape(), &[4, 2, 3]);
        for a in 0..2 {
            for b in 0..3 {
                for c in 0..4 {
                    assert_eq!(p.get(&[c, a, b]), t.get(&[a, b, c]));
                }
            }
        }
        assert!(t.permute(&["a", "b"]).is_err());
        assert!(t.permute(&["a", "b", "x"]).is_err());
        assert!(t.permute(&["a", "a", "b"]).is_err());
    }

    #[test]
    fn test_trace_sums_the_diagonal() {
        let t = LabeledTensor::from_fn(["i", "x", "j"], vec![3, 2, 3], |idx| {
            (idx[0] * 10 + idx[1] * 100 + idx[2]) as f64
        })
        .unwrap();
        let tr = t.trace("i", "j").unwrap();
        assert_eq!(tr.legs(), &["x"]);
        // sum_i (11 i + 100 x) = 33 + 300 x
        assert_relative_eq!(tr.get(&[0]).unwrap(), 33.0);
        assert_relative_eq!(tr.get(&[1]).unwrap(), 333.0);

        let full = tr.trace("x", "x");
        assert!(full.is_err());
        let bad = t.trace("i", "x");
        assert!(matches!(bad, Err(TensorError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_full_trace_is_independent_of_pairing_order() {
        let t = LabeledTensor::from_fn(["u", "r", "d", "l"], vec![3, 2, 3, 2], |idx| {
            ((idx[0] + 1) * (idx[1] + 2)) as f64 / (1.0 + (idx[2] * idx[3]) as f64)
        })
        .unwrap();
        let ud_first = t.trace("u", "d").unwrap().trace("r", "l").unwrap().item().unwrap();
        let rl_first = t.trace("r", "l").unwrap().trace("u", "d").unwrap().item().unwrap();
        assert_relative_eq!(ud_first, rl_first, max_relative = 1e-12);
    }

    #[test]
    fn test_matrix_view_round_trip() {
        let t = counting(["a", "b", "c"], [2, 3, 4]);
        let m = t.to_matrix(&["b"], &["a", "c"]).unwrap();
        assert_eq!(m.shape(), (3, 8));
        assert_eq!(m[(2, 5)], t.get(&[1, 2, 1]).unwrap());

        let back = LabeledTensor::from_matrix(["b", "a", "c"], vec![3, 2, 4], &m).unwrap();
        assert_eq!(back.permute(&["a", "b", "c"]).unwrap(), t);
    }

    #[test]
    fn test_scalar_and_item() {
        assert_eq!(LabeledTensor::scalar(2.5).item(), Ok(2.5));
        assert_eq!(
            counting(["a", "b", "c"], [1, 1, 1]).item(),
            Err(TensorError::NotAScalar(3))
        );
    }

    #[test]
    fn test_relabel_and_display() {
        let t = counting(["a", "b", "c"], [2, 3, 4]);
        let r = t.rename_leg("b", "z").unwrap();
        assert_eq!(r.legs(), &["a", "z", "c"]);
        assert_eq!(r.data(), t.data());
        assert!(t.rename_leg("b", "a").is_err());
        assert_eq!(format!("{r}"), "[a:2, z:3, c:4]");
    }
}
