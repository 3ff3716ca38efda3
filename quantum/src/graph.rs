//! Quantum graph: a labelled graph whose vertices and edges can carry
//! quantum state, plus a composite-state manager that lets several
//! elements share one joint state (or, once entangled with something
//! outside the request, a reduced density matrix of their subsystem).
//!
//! Backed by `petgraph::stable_graph::StableDiGraph` (string element ids
//! mapped to `NodeIndex` via a side table), the way `genesis::metatron_cube`
//! builds a permutation graph over named elements in the teacher repo —
//! undirected edges are modelled as a pair of directed arcs so both
//! directed and undirected semantics share one backing structure.

use std::collections::{HashMap, HashSet};

use nalgebra::DMatrix;
use num_complex::Complex64;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use racah_core::{RacahError, Result, DEFAULT_TOLERANCE};
use rand::Rng;

use crate::density::DensityMatrix;
use crate::state::StateVector;

/// An element identifier: a graph vertex id or an edge id, as assigned by
/// the caller when it is created.
pub type ElementId = String;

#[derive(Debug, Clone)]
struct VertexData {
    id: ElementId,
    dimension: usize,
}

#[derive(Debug, Clone)]
struct EdgeData {
    id: ElementId,
    dimension: usize,
    directed: bool,
}

/// A graph whose vertices and edges are addressable quantum elements.
pub struct QuantumGraph {
    graph: StableDiGraph<VertexData, EdgeData>,
    node_index: HashMap<ElementId, NodeIndex>,
    edge_element_index: HashMap<ElementId, (NodeIndex, NodeIndex)>,
    composites: CompositeManager,
}

impl QuantumGraph {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            node_index: HashMap::new(),
            edge_element_index: HashMap::new(),
            composites: CompositeManager::new(),
        }
    }

    pub fn add_node(&mut self, id: impl Into<ElementId>, dimension: usize) -> Result<()> {
        let id = id.into();
        if self.node_index.contains_key(&id) {
            return Err(RacahError::domain(format!("node '{id}' already exists")));
        }
        if dimension == 0 {
            return Err(RacahError::dimension("node dimension must be >= 1"));
        }
        let idx = self.graph.add_node(VertexData { id: id.clone(), dimension });
        self.node_index.insert(id, idx);
        Ok(())
    }

    pub fn remove_node(&mut self, id: &str) -> Result<()> {
        let idx = self.require_node(id)?;
        self.composites.remove_element(id);
        self.graph.remove_node(idx);
        self.node_index.remove(id);
        self.edge_element_index.retain(|_, &mut (a, b)| a != idx && b != idx);
        Ok(())
    }

    pub fn add_edge(
        &mut self,
        id: impl Into<ElementId>,
        from: &str,
        to: &str,
        dimension: usize,
        directed: bool,
    ) -> Result<()> {
        let id = id.into();
        if self.edge_element_index.contains_key(&id) {
            return Err(RacahError::domain(format!("edge '{id}' already exists")));
        }
        if dimension == 0 {
            return Err(RacahError::dimension("edge dimension must be >= 1"));
        }
        let a = self.require_node(from)?;
        let b = self.require_node(to)?;
        self.graph.add_edge(
            a,
            b,
            EdgeData { id: id.clone(), dimension, directed },
        );
        if !directed {
            self.graph.add_edge(b, a, EdgeData { id: id.clone(), dimension, directed });
        }
        self.edge_element_index.insert(id, (a, b));
        Ok(())
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<()> {
        let (a, b) = *self
            .edge_element_index
            .get(id)
            .ok_or_else(|| RacahError::domain(format!("edge '{id}' does not exist")))?;
        self.composites.remove_element(id);
        if let Some(e) = self.graph.find_edge(a, b) {
            self.graph.remove_edge(e);
        }
        if let Some(e) = self.graph.find_edge(b, a) {
            self.graph.remove_edge(e);
        }
        self.edge_element_index.remove(id);
        Ok(())
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn has_edge(&self, id: &str) -> bool {
        self.edge_element_index.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.node_index.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_element_index.len()
    }

    pub fn neighbors(&self, id: &str) -> Result<Vec<ElementId>> {
        let idx = self.require_node(id)?;
        Ok(self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| self.graph[n].id.clone())
            .collect())
    }

    pub fn degree(&self, id: &str) -> Result<usize> {
        Ok(self.neighbors(id)?.len())
    }

    /// The dense adjacency matrix over nodes, in insertion order.
    pub fn adjacency_matrix(&self) -> DMatrix<f64> {
        let ids: Vec<&ElementId> = self.node_index.keys().collect();
        let n = ids.len();
        let mut m = DMatrix::zeros(n, n);
        for (i, id_a) in ids.iter().enumerate() {
            let a = self.node_index[*id_a];
            for (j, id_b) in ids.iter().enumerate() {
                let b = self.node_index[*id_b];
                if self.graph.find_edge(a, b).is_some() {
                    m[(i, j)] = 1.0;
                }
            }
        }
        m
    }

    /// The graph Laplacian `D - A` over nodes, in the same order as
    /// [`Self::adjacency_matrix`].
    pub fn laplacian_matrix(&self) -> DMatrix<f64> {
        let a = self.adjacency_matrix();
        let n = a.nrows();
        let mut l = DMatrix::zeros(n, n);
        for i in 0..n {
            let degree: f64 = a.row(i).sum();
            l[(i, i)] = degree;
            for j in 0..n {
                if i != j {
                    l[(i, j)] = -a[(i, j)];
                }
            }
        }
        l
    }

    fn element_dimension(&self, id: &str) -> Result<usize> {
        if let Some(&idx) = self.node_index.get(id) {
            return Ok(self.graph[idx].dimension);
        }
        if let Some(&(a, b)) = self.edge_element_index.get(id) {
            if let Some(e) = self.graph.find_edge(a, b) {
                return Ok(self.graph[e].dimension);
            }
        }
        Err(RacahError::domain(format!("unknown graph element '{id}'")))
    }

    /// Applies `operator` (whose dimension must equal the product of
    /// `elements`' dimensions) to the targeted elements, following the
    /// composite algorithm: elements entangled with others outside the
    /// request are reduced to their subsystem via partial trace, the
    /// reduced pieces are combined in caller order, the operator is
    /// applied, and the touched composites are dissolved, with any
    /// left-behind members restored to their own reduced states.
    pub fn apply_operation(&mut self, elements: &[&str], operator: &DMatrix<Complex64>) -> Result<()> {
        let dims: Vec<usize> = elements.iter().map(|e| self.element_dimension(e)).collect::<Result<_>>()?;
        let expected_dim: usize = dims.iter().product();
        if operator.nrows() != expected_dim || operator.ncols() != expected_dim {
            return Err(RacahError::dimension(format!(
                "operator dimension {} does not match combined element dimension {expected_dim}",
                operator.nrows()
            )));
        }
        tracing::debug!(elements = ?elements, "applying operation to composite");
        self.composites.merge_and_apply(elements, &dims, operator)
    }

    /// Applies `operator` to the single vertex `id` (a convenience wrapper
    /// over [`Self::apply_operation`]).
    pub fn apply_vertex_operation(&mut self, id: &str, operator: &DMatrix<Complex64>) -> Result<()> {
        self.apply_operation(&[id], operator)
    }

    /// Applies `operator` to the single edge `id`.
    pub fn apply_edge_operation(&mut self, id: &str, operator: &DMatrix<Complex64>) -> Result<()> {
        self.apply_operation(&[id], operator)
    }

    /// Measures the subsystem spanned by `ids` (reduced via partial trace
    /// out of whatever composites its members currently belong to), using
    /// the Born rule `p = tr(P rho)` against `projector` if given, or a
    /// computational-basis measurement of the subsystem otherwise. Either
    /// way the subsystem collapses to `P rho P / p` and is written back.
    pub fn measure_subsystem(
        &mut self,
        ids: &[&str],
        projector: Option<&DMatrix<Complex64>>,
        rng: &mut impl Rng,
    ) -> Result<SubsystemMeasurementOutcome> {
        self.composites.measure_subsystem(ids, projector, rng)
    }

    fn require_node(&self, id: &str) -> Result<NodeIndex> {
        self.node_index
            .get(id)
            .copied()
            .ok_or_else(|| RacahError::domain(format!("node '{id}' does not exist")))
    }
}

impl Default for QuantumGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// A composite's tracked state: pure while only unitaries have touched it,
/// promoted to a density matrix the moment a partial trace or projective
/// measurement enters the picture. Mirrors the `{State | DensityMatrix}`
/// duality the graph's elements can carry.
#[derive(Debug, Clone)]
pub enum QuantumObject {
    Pure(StateVector),
    Mixed(DensityMatrix),
}

impl QuantumObject {
    pub fn dimension(&self) -> usize {
        match self {
            QuantumObject::Pure(s) => s.dimension(),
            QuantumObject::Mixed(d) => d.dimension(),
        }
    }

    pub fn to_density(&self) -> Result<DensityMatrix> {
        match self {
            QuantumObject::Pure(s) => DensityMatrix::from_pure_state(s),
            QuantumObject::Mixed(d) => Ok(d.clone()),
        }
    }

    /// Tensor product, staying `Pure` only when both operands are.
    pub fn tensor(&self, other: &Self) -> Result<Self> {
        match (self, other) {
            (QuantumObject::Pure(a), QuantumObject::Pure(b)) => Ok(QuantumObject::Pure(a.tensor_product(b))),
            _ => Ok(QuantumObject::Mixed(self.to_density()?.tensor_product(&other.to_density()?)?)),
        }
    }

    /// Applies `operator`: `U|psi>` for a pure state, `U rho U^dagger` for
    /// a mixed one.
    pub fn apply_operator(&self, operator: &DMatrix<Complex64>) -> Result<Self> {
        if operator.nrows() != self.dimension() || operator.ncols() != self.dimension() {
            return Err(RacahError::dimension("operator dimension does not match object dimension"));
        }
        match self {
            QuantumObject::Pure(s) => {
                let amplitudes = operator * s.amplitudes();
                Ok(QuantumObject::Pure(StateVector::new(amplitudes.iter().copied().collect())?))
            }
            QuantumObject::Mixed(d) => {
                let matrix = operator * d.matrix() * operator.adjoint();
                Ok(QuantumObject::Mixed(DensityMatrix::from_matrix(matrix)?))
            }
        }
    }
}

/// The outcome of a subsystem measurement: the Born-rule probability of
/// the sampled (or projected) outcome, and the collapsed, renormalized
/// state of the measured subsystem.
#[derive(Debug, Clone)]
pub struct SubsystemMeasurementOutcome {
    pub probability: f64,
    pub state: DensityMatrix,
}

/// Tracks which graph elements participate in a shared joint (composite)
/// state, and which composite owns each element.
pub struct CompositeManager {
    element_to_composite: HashMap<ElementId, usize>,
    composite_to_elements: HashMap<usize, Vec<ElementId>>,
    composite_states: HashMap<usize, QuantumObject>,
    element_dims: HashMap<ElementId, usize>,
    next_id: usize,
}

impl CompositeManager {
    pub fn new() -> Self {
        Self {
            element_to_composite: HashMap::new(),
            composite_to_elements: HashMap::new(),
            composite_states: HashMap::new(),
            element_dims: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn composite_of(&self, id: &str) -> Option<usize> {
        self.element_to_composite.get(id).copied()
    }

    pub fn elements_of(&self, composite: usize) -> Option<&[ElementId]> {
        self.composite_to_elements.get(&composite).map(|v| v.as_slice())
    }

    /// Initializes a fresh standalone element with the given dimension in
    /// the `|0>` computational basis state, as its own single-element
    /// composite.
    pub fn install_element(&mut self, id: &str, dimension: usize) -> Result<()> {
        if self.element_to_composite.contains_key(id) {
            return Err(RacahError::composite_conflict(format!(
                "element '{id}' is already installed in a composite"
            )));
        }
        let composite_id = self.next_id;
        self.next_id += 1;
        self.element_to_composite.insert(id.to_string(), composite_id);
        self.composite_to_elements.insert(composite_id, vec![id.to_string()]);
        self.composite_states
            .insert(composite_id, QuantumObject::Pure(StateVector::basis_state(dimension, 0)?));
        self.element_dims.insert(id.to_string(), dimension);
        Ok(())
    }

    pub fn remove_element(&mut self, id: &str) {
        self.element_dims.remove(id);
        if let Some(composite_id) = self.element_to_composite.remove(id) {
            if let Some(members) = self.composite_to_elements.get_mut(&composite_id) {
                members.retain(|m| m != id);
                if members.is_empty() {
                    self.composite_to_elements.remove(&composite_id);
                    self.composite_states.remove(&composite_id);
                }
            }
        }
    }

    /// Locates the composites backing `elements`, reduces each one to just
    /// the requested members via partial trace over the rest, and combines
    /// the pieces into one joint object ordered exactly as `elements`.
    /// Returns that object plus the set of composite ids it drew from.
    fn reduced_joint_object(&self, elements: &[&str]) -> Result<(QuantumObject, HashSet<usize>)> {
        if elements.is_empty() {
            return Err(RacahError::domain("at least one element is required"));
        }
        let elements_set: HashSet<&str> = elements.iter().copied().collect();

        let mut touched = HashSet::new();
        let mut group_order: Vec<usize> = Vec::new();
        for &e in elements {
            let cid = *self
                .element_to_composite
                .get(e)
                .ok_or_else(|| RacahError::domain(format!("element '{e}' is not installed in any composite")))?;
            if touched.insert(cid) {
                group_order.push(cid);
            }
        }

        let mut assembled_order: Vec<ElementId> = Vec::new();
        let mut combined: Option<QuantumObject> = None;
        for cid in &group_order {
            let members = self.composite_to_elements[cid].clone();
            let kept: Vec<ElementId> = members.iter().filter(|m| elements_set.contains(m.as_str())).cloned().collect();
            let piece = if kept.len() == members.len() {
                self.composite_states[cid].clone()
            } else {
                let dims: Vec<usize> = members.iter().map(|m| self.element_dims[m]).collect();
                let trace_out: Vec<usize> = members
                    .iter()
                    .enumerate()
                    .filter(|(_, m)| !elements_set.contains(m.as_str()))
                    .map(|(i, _)| i)
                    .collect();
                let rho = self.composite_states[cid].to_density()?;
                QuantumObject::Mixed(rho.partial_trace(&dims, &trace_out)?)
            };
            combined = Some(match combined {
                None => piece,
                Some(acc) => acc.tensor(&piece)?,
            });
            assembled_order.extend(kept);
        }
        let mut combined = combined.expect("elements is non-empty, so at least one group was processed");

        let target_order: Vec<ElementId> = elements.iter().map(|e| e.to_string()).collect();
        if assembled_order != target_order {
            let perm = permutation_matrix(&assembled_order, &target_order, &self.element_dims);
            combined = combined.apply_operator(&perm)?;
        }
        Ok((combined, touched))
    }

    /// Installs the post-operation object under `elements`, dissolving
    /// every touched composite. If exactly one composite was touched and
    /// its membership is precisely `elements`, it is simply replaced in
    /// place; otherwise every touched composite is dissolved, its
    /// left-behind members are restored to their own partial-traced
    /// states, and a fresh composite spanning `elements` is installed.
    fn write_back(&mut self, elements: &[&str], touched: &HashSet<usize>, new_object: QuantumObject) -> Result<()> {
        let elements_set: HashSet<&str> = elements.iter().copied().collect();
        let elements_owned: Vec<ElementId> = elements.iter().map(|e| e.to_string()).collect();

        if touched.len() == 1 {
            let only = *touched.iter().next().expect("touched.len() == 1");
            let members_set: HashSet<&str> =
                self.composite_to_elements[&only].iter().map(|s| s.as_str()).collect();
            if members_set == elements_set {
                self.composite_to_elements.insert(only, elements_owned);
                self.composite_states.insert(only, new_object);
                return Ok(());
            }
        }

        for &composite_id in touched {
            let members = self.composite_to_elements[&composite_id].clone();
            let leftover: Vec<ElementId> =
                members.iter().filter(|m| !elements_set.contains(m.as_str())).cloned().collect();
            if !leftover.is_empty() {
                let rho = self.composite_states[&composite_id].to_density()?;
                let dims: Vec<usize> = members.iter().map(|m| self.element_dims[m]).collect();
                for m in &leftover {
                    let m_pos = members.iter().position(|x| x == m).expect("m came from members");
                    let trace_out: Vec<usize> = (0..members.len()).filter(|&i| i != m_pos).collect();
                    let reduced = rho.partial_trace(&dims, &trace_out)?;
                    let new_id = self.next_id;
                    self.next_id += 1;
                    self.element_to_composite.insert(m.clone(), new_id);
                    self.composite_to_elements.insert(new_id, vec![m.clone()]);
                    self.composite_states.insert(new_id, QuantumObject::Mixed(reduced));
                }
            }
            self.composite_states.remove(&composite_id);
            self.composite_to_elements.remove(&composite_id);
        }

        let new_id = self.next_id;
        self.next_id += 1;
        for e in elements {
            self.element_to_composite.insert(e.to_string(), new_id);
        }
        self.composite_to_elements.insert(new_id, elements_owned);
        self.composite_states.insert(new_id, new_object);
        Ok(())
    }

    /// Merges the composites owning `elements` (installing any that are
    /// not yet tracked, using `dims`) into one joint object ordered as
    /// `elements`, applies `operator`, and writes the result back.
    fn merge_and_apply(&mut self, elements: &[&str], dims: &[usize], operator: &DMatrix<Complex64>) -> Result<()> {
        for (element, &dim) in elements.iter().zip(dims) {
            if !self.element_to_composite.contains_key(*element) {
                self.install_element(element, dim)?;
            }
        }
        let (joint, touched) = self.reduced_joint_object(elements)?;
        if operator.nrows() != joint.dimension() || operator.ncols() != joint.dimension() {
            return Err(RacahError::dimension(format!(
                "operator dimension {} does not match the targeted elements' combined dimension {}",
                operator.nrows(),
                joint.dimension()
            )));
        }
        let new_object = joint.apply_operator(operator)?;
        self.write_back(elements, &touched, new_object)
    }

    /// Measures the subsystem spanned by `ids`, reduced out of whatever
    /// composites its members currently belong to. With `projector`,
    /// computes `p = tr(P rho)` and collapses to `P rho P / p`; without
    /// one, samples a computational-basis outcome of the subsystem.
    fn measure_subsystem(
        &mut self,
        ids: &[&str],
        projector: Option<&DMatrix<Complex64>>,
        rng: &mut impl Rng,
    ) -> Result<SubsystemMeasurementOutcome> {
        let (joint, touched) = self.reduced_joint_object(ids)?;
        let rho = joint.to_density()?;

        let (probability, post) = match projector {
            Some(p) => {
                if p.nrows() != rho.dimension() || p.ncols() != rho.dimension() {
                    return Err(RacahError::dimension("projector dimension does not match subsystem dimension"));
                }
                let probability = (p * rho.matrix()).trace().re;
                if probability <= DEFAULT_TOLERANCE {
                    return Err(RacahError::normalization("projector has no support on this subsystem"));
                }
                let numerator = p * rho.matrix() * p.adjoint();
                let post = DensityMatrix::from_matrix(numerator * Complex64::new(1.0 / probability, 0.0))?;
                (probability, post)
            }
            None => {
                let probabilities: Vec<f64> = (0..rho.dimension()).map(|i| rho.matrix()[(i, i)].re).collect();
                let total: f64 = probabilities.iter().sum();
                if total <= 1e-12 {
                    return Err(RacahError::normalization("cannot measure the zero state"));
                }
                let target = rng.gen::<f64>() * total;
                let mut cumulative = 0.0;
                let mut chosen = probabilities.len() - 1;
                for (i, &p) in probabilities.iter().enumerate() {
                    cumulative += p;
                    if target <= cumulative {
                        chosen = i;
                        break;
                    }
                }
                let probability = probabilities[chosen] / total;
                let post = DensityMatrix::from_pure_state(&StateVector::basis_state(rho.dimension(), chosen)?)?;
                (probability, post)
            }
        };

        self.write_back(ids, &touched, QuantumObject::Mixed(post.clone()))?;
        Ok(SubsystemMeasurementOutcome { probability, state: post })
    }
}

impl Default for CompositeManager {
    fn default() -> Self {
        Self::new()
    }
}

/// The permutation matrix reordering a tensor space from `from_order`'s
/// factor order to `to_order`'s (both orderings of the same element set).
fn permutation_matrix(
    from_order: &[ElementId],
    to_order: &[ElementId],
    element_dims: &HashMap<ElementId, usize>,
) -> DMatrix<Complex64> {
    let from_dims: Vec<usize> = from_order.iter().map(|e| element_dims[e]).collect();
    let to_dims: Vec<usize> = to_order.iter().map(|e| element_dims[e]).collect();
    let dim: usize = from_dims.iter().product();
    let mut perm = DMatrix::<Complex64>::zeros(dim, dim);
    for flat in 0..dim {
        let idx = decompose(flat, &from_dims);
        let per_elem: HashMap<&str, usize> =
            from_order.iter().map(|e| e.as_str()).zip(idx.iter().copied()).collect();
        let to_idx: Vec<usize> = to_order.iter().map(|e| per_elem[e.as_str()]).collect();
        let new_flat = flatten(&to_idx, &to_dims);
        perm[(new_flat, flat)] = Complex64::new(1.0, 0.0);
    }
    perm
}

fn flatten(indices: &[usize], dims: &[usize]) -> usize {
    indices.iter().zip(dims).fold(0, |acc, (&i, &d)| acc * d + i)
}

fn decompose(mut flat: usize, dims: &[usize]) -> Vec<usize> {
    let mut out = vec![0usize; dims.len()];
    for (slot, &d) in out.iter_mut().zip(dims.iter()).rev() {
        *slot = flat % d;
        flat /= d;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn bell_pair_via_hadamard_then_cnot() {
        let mut graph = QuantumGraph::new();
        graph.add_node("q0", 2).unwrap();
        graph.add_node("q1", 2).unwrap();
        graph.apply_vertex_operation("q0", &gates::hadamard()).unwrap();
        graph.apply_operation(&["q0", "q1"], &gates::cnot()).unwrap();

        let composite_id = graph.composites.composite_of("q0").unwrap();
        assert_eq!(graph.composites.composite_of("q1"), Some(composite_id));
        let state = match &graph.composites.composite_states[&composite_id] {
            QuantumObject::Pure(s) => s,
            QuantumObject::Mixed(_) => panic!("expected a pure state after unitary-only evolution"),
        };
        let h = 1.0 / std::f64::consts::SQRT_2;
        assert!((state.get(0).unwrap().re - h).abs() < 1e-9);
        assert!((state.get(3).unwrap().re - h).abs() < 1e-9);
        assert!(state.get(1).unwrap().norm() < 1e-9);
        assert!(state.get(2).unwrap().norm() < 1e-9);
    }

    #[test]
    fn measuring_an_unentangled_qubit_collapses_it() {
        let mut graph = QuantumGraph::new();
        graph.add_node("q0", 2).unwrap();
        graph.apply_vertex_operation("q0", &gates::hadamard()).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let outcome = graph.measure_subsystem(&["q0"], None, &mut rng).unwrap();
        let m = outcome.state.matrix();
        let collapsed_to_zero = (m[(0, 0)].re - 1.0).abs() < 1e-9;
        let collapsed_to_one = (m[(1, 1)].re - 1.0).abs() < 1e-9;
        assert!(collapsed_to_zero || collapsed_to_one);
    }

    #[test]
    fn adjacency_matrix_reflects_added_edge() {
        let mut graph = QuantumGraph::new();
        graph.add_node("a", 2).unwrap();
        graph.add_node("b", 2).unwrap();
        graph.add_edge("e0", "a", "b", 4, false).unwrap();
        assert_eq!(graph.degree("a").unwrap(), 1);
        assert_eq!(graph.degree("b").unwrap(), 1);
    }

    #[test]
    fn overlapping_composite_merge_reduces_via_partial_trace() {
        // Line graph q0-q1-q2: H(q0), CNOT(q0,q1) entangles {q0,q1}; then
        // CNOT(q1,q2) touches q1 while it is already entangled with q0,
        // forcing a partial-trace reduction of {q0,q1} down to q1 before
        // the new composite {q1,q2} can be formed.
        let mut graph = QuantumGraph::new();
        graph.add_node("q0", 2).unwrap();
        graph.add_node("q1", 2).unwrap();
        graph.add_node("q2", 2).unwrap();
        graph.apply_vertex_operation("q0", &gates::hadamard()).unwrap();
        graph.apply_operation(&["q0", "q1"], &gates::cnot()).unwrap();
        graph.apply_operation(&["q1", "q2"], &gates::cnot()).unwrap();

        // q0 should have been dissolved out into its own singleton composite.
        assert_ne!(graph.composites.composite_of("q0"), graph.composites.composite_of("q1"));
        assert_eq!(graph.composites.composite_of("q1"), graph.composites.composite_of("q2"));

        let q1q2 = graph.composites.composite_of("q1").unwrap();
        let rho = graph.composites.composite_states[&q1q2].to_density().unwrap();
        let m = rho.matrix();
        let h = 0.5;
        assert!((m[(0, 0)].re - h).abs() < 1e-9);
        assert!((m[(3, 3)].re - h).abs() < 1e-9);
        assert!(m[(1, 1)].norm() < 1e-9);
        assert!(m[(2, 2)].norm() < 1e-9);
        assert!((rho.matrix().trace().re - 1.0).abs() < 1e-9);

        let q0 = graph.composites.composite_of("q0").unwrap();
        let q0_rho = graph.composites.composite_states[&q0].to_density().unwrap();
        assert!((q0_rho.matrix()[(0, 0)].re - 0.5).abs() < 1e-9);
        assert!((q0_rho.matrix()[(1, 1)].re - 0.5).abs() < 1e-9);
    }

    #[test]
    fn projector_based_subsystem_measurement_matches_born_rule() {
        let mut graph = QuantumGraph::new();
        graph.add_node("q0", 2).unwrap();
        graph.apply_vertex_operation("q0", &gates::hadamard()).unwrap();
        let p0 = crate::measurement::projector_from_state(&StateVector::basis_state(2, 0).unwrap());
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = graph.measure_subsystem(&["q0"], Some(&p0), &mut rng).unwrap();
        assert!((outcome.probability - 0.5).abs() < 1e-9);
        assert!((outcome.state.matrix()[(0, 0)].re - 1.0).abs() < 1e-9);
    }
}
