//! Symbolic description of a tensor network.
//!
//! A [`NetworkBuilder`] collects named tensors (each with its own leg names)
//! and pairs of legs to contract. [`NetworkBuilder::build`] resolves every
//! name once into a [`ContractionPlan`] of dense axis positions, so executing
//! the plan never looks a leg up by string.
//!
//! Legs are qualified by their owning tensor (`C0_r`) so different tensors may
//! reuse leg names. A contracted pair shares one synthetic label
//! (`C0_r-C1_l`). Legs that take part in no pair are external and keep their
//! qualified name in the result.

use crate::error::{Result, TensorError};
use itertools::Itertools;
use std::collections::HashSet;
use std::fmt;

/// Where a declared leg ends up after planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegRole {
    /// Summed out through the bond with this index.
    Internal(usize),
    /// Survives as the result axis with this index.
    External(usize),
}

/// One endpoint of a bond: tensor position and axis position within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegRef {
    pub node: usize,
    pub axis: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub label: String,
    pub ends: [LegRef; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalLeg {
    pub label: String,
    pub end: LegRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanNode {
    pub name: String,
    pub legs: Vec<String>,
    pub roles: Vec<LegRole>,
}

/// Result of [`NetworkBuilder::build`]. Holds no tensor data.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractionPlan {
    nodes: Vec<PlanNode>,
    bonds: Vec<Bond>,
    external: Vec<ExternalLeg>,
}

impl ContractionPlan {
    pub fn nodes(&self) -> &[PlanNode] {
        &self.nodes
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn external(&self) -> &[ExternalLeg] {
        &self.external
    }

    pub fn node(&self, name: &str) -> Option<&PlanNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Labels of the surviving legs, in result axis order.
    pub fn external_labels(&self) -> Vec<&str> {
        self.external.iter().map(|e| e.label.as_str()).collect()
    }

    /// The planned label of every leg of tensor `name`, in declaration order.
    pub fn labels_of(&self, name: &str) -> Option<Vec<&str>> {
        self.node(name).map(|node| {
            node.roles
                .iter()
                .map(|role| match *role {
                    LegRole::Internal(b) => self.bonds[b].label.as_str(),
                    LegRole::External(e) => self.external[e].label.as_str(),
                })
                .collect()
        })
    }
}

impl fmt::Display for ContractionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            let labels = self.labels_of(&node.name).unwrap_or_default();
            writeln!(f, "{}: {}", node.name, labels.join(", "))?;
        }
        write!(f, "TOUT: {}", self.external_labels().join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PairSpec {
    first: (String, String),
    second: (String, String),
}

/// Collects tensor declarations and contraction pairs.
#[derive(Debug, Clone, Default)]
pub struct NetworkBuilder {
    tensors: Vec<(String, Vec<String>)>,
    pairs: Vec<PairSpec>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a tensor and the names of its legs, in axis order.
    pub fn tensor<I, S>(mut self, name: &str, legs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tensors
            .push((name.to_string(), legs.into_iter().map(Into::into).collect()));
        self
    }

    /// Contract leg `leg_a` of tensor `a` with leg `leg_b` of tensor `b`.
    pub fn contract(mut self, a: &str, leg_a: &str, b: &str, leg_b: &str) -> Self {
        self.pairs.push(PairSpec {
            first: (a.to_string(), leg_a.to_string()),
            second: (b.to_string(), leg_b.to_string()),
        });
        self
    }

    pub fn build(&self) -> Result<ContractionPlan> {
        if self.tensors.is_empty() {
            return Err(TensorError::EmptyNetwork);
        }

        let mut names = HashSet::new();
        for (name, legs) in &self.tensors {
            if !names.insert(name.as_str()) {
                return Err(TensorError::DuplicateTensor(name.clone()));
            }
            if let Some(leg) = legs.iter().duplicates().next() {
                return Err(TensorError::DuplicateLeg(format!("{name}_{leg}")));
            }
        }

        let mut bond_of: Vec<Vec<Option<usize>>> = self
            .tensors
            .iter()
            .map(|(_, legs)| vec![None; legs.len()])
            .collect();
        let mut bonds = Vec::with_capacity(self.pairs.len());

        for pair in &self.pairs {
            let first = self.resolve(&pair.first)?;
            let second = self.resolve(&pair.second)?;
            for (end, (tensor, leg)) in [(first, &pair.first), (second, &pair.second)] {
                if bond_of[end.node][end.axis].is_some() {
                    return Err(TensorError::LegContractedTwice {
                        tensor: tensor.clone(),
                        leg: leg.clone(),
                    });
                }
                bond_of[end.node][end.axis] = Some(bonds.len());
            }
            bonds.push(Bond {
                label: format!(
                    "{}_{}-{}_{}",
                    pair.first.0, pair.first.1, pair.second.0, pair.second.1
                ),
                ends: [first, second],
            });
        }

        let mut external = Vec::new();
        let mut nodes = Vec::with_capacity(self.tensors.len());
        for (node, (name, legs)) in self.tensors.iter().enumerate() {
            let roles = legs
                .iter()
                .enumerate()
                .map(|(axis, leg)| match bond_of[node][axis] {
                    Some(bond) => LegRole::Internal(bond),
                    None => {
                        external.push(ExternalLeg {
                            label: format!("{name}_{leg}"),
                            end: LegRef { node, axis },
                        });
                        LegRole::External(external.len() - 1)
                    }
                })
                .collect();
            nodes.push(PlanNode {
                name: name.clone(),
                legs: legs.clone(),
                roles,
            });
        }

        Ok(ContractionPlan {
            nodes,
            bonds,
            external,
        })
    }

    fn resolve(&self, (tensor, leg): &(String, String)) -> Result<LegRef> {
        let node = self
            .tensors
            .iter()
            .position(|(name, _)| name == tensor)
            .ok_or_else(|| TensorError::UnknownTensor(tensor.clone()))?;
        let axis = self.tensors[node]
            .1
            .iter()
            .position(|l| l == leg)
            .ok_or_else(|| TensorError::UnknownLeg {
                tensor: tensor.clone(),
                leg: leg.clone(),
            })?;
        Ok(LegRef { node, axis })
    }
}
