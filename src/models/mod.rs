pub mod address;
pub mod fee;
pub mod header;
pub(crate) mod numeric;
pub mod unspent;

pub use address::AddressSummary;
pub use fee::FeeEstimation;
pub use header::BlockHeader;
pub use unspent::UnspentOutput;
