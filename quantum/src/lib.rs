//! # Racah Quantum
//!
//! Finite-dimensional quantum state and operator algebra: state vectors and
//! Hilbert spaces, a typed operator kernel, density matrices and quantum
//! channels, gates and measurement, operator algebra and information
//! measures, angular-momentum recoupling (Clebsch-Gordan, Wigner symbols,
//! intertwiners), and a quantum-labelled graph with a composite-state
//! manager, plus a discrete coined quantum walk built on top of it.
//!
//! Every public operation returns [`racah_core::Result`]; there is no
//! panicking entry point in this crate outside of documented invariants
//! (indexing into already-validated positions).

pub mod angular_momentum;
pub mod algebra;
pub mod channels;
pub mod density;
pub mod gates;
pub mod graph;
pub mod hilbert;
pub mod information;
pub mod intertwiner;
pub mod matrix_util;
pub mod measurement;
pub mod operator;
pub mod quantum_walk;
pub mod state;

pub use racah_core::{RacahError, Result, DEFAULT_TOLERANCE};

pub use state::StateVector;
pub use hilbert::HilbertSpace;
pub use operator::{DenseOperator, DiagonalOperator, IdentityOperator, Operator, OperatorType, SparseOperator};
pub use density::DensityMatrix;
pub use channels::KrausChannel;
pub use graph::{CompositeManager, QuantumGraph, QuantumObject, SubsystemMeasurementOutcome};
pub use quantum_walk::QuantumWalk;
