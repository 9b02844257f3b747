//! `qecost-sim`: stabilizer sampling for qecost circuits.
//!
//! Two views of the same noisy circuit:
//!
//! - **Sampling**: [`DetectorSampler`] propagates Pauli frames for a batch of
//!   shots at once and reports detection events and observable flips
//! - **Error models**: [`DetectorErrorModel`] lists the independent error
//!   mechanisms of the circuit, decomposed into graphlike parts for matching
//!
//! # Quick start
//!
//! ```rust
//! use qecost_ir::Circuit;
//! use qecost_sim::{DetectorErrorModel, DetectorSampler};
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//!
//! let circuit: Circuit = "X_ERROR(0.1) 0\nM 0\nDETECTOR rec[-1]\n".parse().unwrap();
//!
//! let sampler = DetectorSampler::new(&circuit).unwrap();
//! let batch = sampler.sample(1000, &mut SmallRng::seed_from_u64(0)).unwrap();
//! assert_eq!(batch.detection_events.dim(), (1000, 1));
//!
//! let dem = DetectorErrorModel::from_circuit(&circuit).unwrap();
//! assert_eq!(dem.mechanisms().len(), 1);
//! ```

pub mod bits;
pub mod dem;
pub mod error;
pub mod frame;
pub mod geometric;
pub mod record;
pub mod sampler;

pub use bits::BitMatrix;
pub use dem::{DetectorErrorModel, ErrorMechanism, Symptom};
pub use error::{SimError, SimResult};
pub use frame::FrameSimulator;
pub use record::RecordLayout;
pub use sampler::{DetectorSampler, SampleBatch};
