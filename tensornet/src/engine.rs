//! Evaluation of a [`ContractionPlan`] against concrete tensors.
//!
//! Operands are merged pairwise until one is left. Each step picks the
//! connected pair whose result has the fewest elements, groups the shared
//! labels into a matrix dimension and multiplies with nalgebra, so the cost is
//! dominated by dense GEMM rather than index loops.

use crate::error::{Result, TensorError};
use crate::network::{ContractionPlan, LegRole};
use crate::tensor::{permute_data, row_major, trace_axes, LabeledTensor};
use itertools::Itertools;
use nalgebra::DMatrix;
use tracing::trace;

/// Stateless executor for contraction plans.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractionEngine;

impl ContractionEngine {
    /// Contract `inputs` according to `plan`.
    ///
    /// Each input is looked up by tensor name and must carry exactly the leg
    /// names declared for it, in any order. The result has one axis per
    /// external leg, named and ordered as in [`ContractionPlan::external`].
    pub fn execute(&self, plan: &ContractionPlan, inputs: &[(&str, &LabeledTensor)]) -> Result<LabeledTensor> {
        if let Some((name, _)) = inputs.iter().find(|(name, _)| plan.node(name).is_none()) {
            return Err(TensorError::UnknownTensor(name.to_string()));
        }
        if let Some(name) = inputs.iter().map(|(name, _)| *name).duplicates().next() {
            return Err(TensorError::DuplicateInput(name.to_string()));
        }

        let nbonds = plan.bonds().len();
        let mut operands = Vec::with_capacity(plan.nodes().len());
        for node in plan.nodes() {
            let tensor = inputs
                .iter()
                .find(|(name, _)| *name == node.name)
                .map(|(_, t)| *t)
                .ok_or_else(|| TensorError::MissingTensor(node.name.clone()))?;

            if tensor.rank() != node.legs.len() || node.legs.iter().any(|l| !tensor.has_leg(l)) {
                return Err(TensorError::LegSetMismatch {
                    tensor: node.name.clone(),
                    expected: node.legs.clone(),
                    found: tensor.legs().to_vec(),
                });
            }
            let aligned = tensor.permute(node.legs.as_slice())?;

            let labels = node
                .roles
                .iter()
                .map(|role| match *role {
                    LegRole::Internal(bond) => bond,
                    LegRole::External(ext) => nbonds + ext,
                })
                .collect();
            operands.push(Operand {
                labels,
                shape: aligned.shape().to_vec(),
                data: aligned.data().to_vec(),
            });
        }

        for bond in plan.bonds() {
            let [a, b] = bond.ends;
            let left_dim = operands[a.node].shape[a.axis];
            let right_dim = operands[b.node].shape[b.axis];
            if left_dim != right_dim {
                let nodes = plan.nodes();
                return Err(TensorError::DimensionMismatch {
                    left: format!("{}_{}", nodes[a.node].name, nodes[a.node].legs[a.axis]),
                    right: format!("{}_{}", nodes[b.node].name, nodes[b.node].legs[b.axis]),
                    left_dim,
                    right_dim,
                });
            }
        }

        let pending = operands.into_iter().map(Operand::trace_loops).collect_vec();
        let (acc, largest) = fold_operands(pending).ok_or(TensorError::EmptyNetwork)?;
        trace!(largest, "contraction finished");

        let order = (0..plan.external().len())
            .map(|ext| {
                acc.labels
                    .iter()
                    .position(|&l| l == nbonds + ext)
                    .ok_or_else(|| TensorError::MissingLeg(plan.external()[ext].label.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        let (shape, data) = permute_data(&acc.shape, &acc.data, &order);
        LabeledTensor::new(plan.external_labels(), shape, data)
    }
}

/// Merge operands pairwise into one, returning it together with the element
/// count of the largest operand produced on the way.
///
/// Connected pairs go first; among them the pair with the smallest result
/// wins, ties broken by position.
fn fold_operands(mut pending: Vec<Operand>) -> Option<(Operand, usize)> {
    let mut largest = pending.iter().map(|op| op.data.len()).max()?;
    while pending.len() > 1 {
        let (i, j) = (0..pending.len())
            .tuple_combinations()
            .min_by_key(|&(i, j)| {
                let (a, b) = (&pending[i], &pending[j]);
                (a.shared_with(b) == 0, a.contracted_len(b))
            })?;
        let right = pending.remove(j);
        let left = pending.remove(i);
        trace!(
            shared = left.shared_with(&right),
            left = ?left.shape,
            right = ?right.shape,
            "pairwise contraction"
        );
        let merged = left.contract(right);
        largest = largest.max(merged.data.len());
        pending.insert(i, merged);
    }
    pending.pop().map(|op| (op, largest))
}

/// Intermediate tensor whose legs are plan label ids.
#[derive(Debug)]
struct Operand {
    labels: Vec<usize>,
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl Operand {
    fn shared_with(&self, other: &Operand) -> usize {
        self.labels.iter().filter(|l| other.labels.contains(l)).count()
    }

    /// Number of elements of `self` contracted with `other`.
    fn contracted_len(&self, other: &Operand) -> usize {
        let free = |op: &Operand, partner: &Operand| {
            op.labels
                .iter()
                .zip(&op.shape)
                .filter(|(l, _)| !partner.labels.contains(l))
                .fold(1usize, |acc, (_, &d)| acc.saturating_mul(d))
        };
        free(self, other).saturating_mul(free(other, self))
    }

    /// Axis positions of the first label that occurs twice.
    fn first_loop(&self) -> Option<(usize, usize)> {
        self.labels
            .iter()
            .enumerate()
            .tuple_combinations()
            .find(|((_, x), (_, y))| x == y)
            .map(|((a, _), (b, _))| (a, b))
    }

    /// Trace out bonds that connect two legs of the same tensor.
    fn trace_loops(mut self) -> Operand {
        while let Some((a, b)) = self.first_loop() {
            let (shape, data) = trace_axes(&self.shape, &self.data, a, b);
            self.labels = self
                .labels
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != a && i != b)
                .map(|(_, &l)| l)
                .collect();
            self.shape = shape;
            self.data = data;
        }
        self
    }

    fn contract(self, other: Operand) -> Operand {
        let shared = self
            .labels
            .iter()
            .copied()
            .filter(|l| other.labels.contains(l))
            .collect_vec();
        let axis_in = |op: &Operand, label: usize| op.labels.iter().position(|&l| l == label);

        let left_free = (0..self.labels.len())
            .filter(|&i| !shared.contains(&self.labels[i]))
            .collect_vec();
        let right_free = (0..other.labels.len())
            .filter(|&i| !shared.contains(&other.labels[i]))
            .collect_vec();
        let left_perm = left_free
            .iter()
            .copied()
            .chain(shared.iter().filter_map(|&l| axis_in(&self, l)))
            .collect_vec();
        let right_perm = shared
            .iter()
            .filter_map(|&l| axis_in(&other, l))
            .chain(right_free.iter().copied())
            .collect_vec();

        let (_, left_data) = permute_data(&self.shape, &self.data, &left_perm);
        let (_, right_data) = permute_data(&other.shape, &other.data, &right_perm);

        let m = left_free.iter().map(|&i| self.shape[i]).product::<usize>();
        let n = right_free.iter().map(|&i| other.shape[i]).product::<usize>();
        let k = shared
            .iter()
            .filter_map(|&l| axis_in(&self, l))
            .map(|i| self.shape[i])
            .product::<usize>();

        let left = DMatrix::from_row_slice(m, k, &left_data);
        let right = DMatrix::from_row_slice(k, n, &right_data);
        let product = left * right;

        Operand {
            labels: left_free
                .iter()
                .map(|&i| self.labels[i])
                .chain(right_free.iter().map(|&i| other.labels[i]))
                .collect(),
            shape: left_free
                .iter()
                .map(|&i| self.shape[i])
                .chain(right_free.iter().map(|&i| other.shape[i]))
                .collect(),
            data: row_major(&product),
        }
    }
}
