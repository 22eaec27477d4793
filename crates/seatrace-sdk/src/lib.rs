//! Client-side workflows for Seatrace.
//!
//! Three clients cover the three roles in the system, all speaking to the
//! same [`LedgerWriter`]/[`LedgerReader`] boundary:
//!
//! - [`ManagementClient`] — registers ships and commits observer approvals
//! - [`ShipClient`] — opens batches, records ciphertext provenance, and
//!   seals master keys for pending observers
//! - [`ObserverClient`] — requests access, recovers the master key after
//!   approval, and verifies ciphertexts against recorded fingerprints
//!
//! [`LedgerWriter`]: seatrace_ledger::LedgerWriter
//! [`LedgerReader`]: seatrace_ledger::LedgerReader

pub mod error;
pub mod management;
pub mod observer;
pub mod ship;

pub use error::SdkError;
pub use management::ManagementClient;
pub use observer::ObserverClient;
pub use ship::{CiphertextRecord, ShipClient};
