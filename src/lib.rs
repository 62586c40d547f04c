//! Query blockchain state through public block explorer services, and
//! cross-check several independent ones before trusting any single answer.
//!
//! The two core operations (unspent output lookup and transaction
//! broadcast) go through [`Pool`], which requires every configured
//! explorer to agree before returning a result. Service-specific extras
//! (fee estimates, address summaries, block listings) live on the
//! concrete adapters.

pub use bitcoin;

pub mod blockcypher;
pub mod error;
pub mod explorer;
pub mod insight;
pub mod models;
pub mod pool;
pub mod transport;

pub use blockcypher::BlockCypher;
pub use error::{BackendFailure, ExplorerError, Operation, Result};
pub use explorer::Explorer;
pub use insight::{median_time, Insight};
pub use models::{AddressSummary, BlockHeader, FeeEstimation, UnspentOutput};
pub use pool::Pool;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

/// Network assumed when a backend is constructed without an explicit
/// selection.
pub const DEFAULT_NETWORK: bitcoin::Network = bitcoin::Network::Bitcoin;
