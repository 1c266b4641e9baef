//! Typed, mockable contracts for the three external collaborators named in
//! §6.1: `MarketData`, `SwapExecutor`, `PositionAdapter` (one per DEX
//! family, dispatched through a registry).

pub mod error;
pub mod market_data;
pub mod position_adapter;
pub mod registry;
pub mod swap_executor;

pub use error::{AdapterError, Result};
pub use market_data::MarketData;
pub use position_adapter::{BurnResult, MintResult, PositionAdapter};
pub use registry::PositionAdapterRegistry;
pub use swap_executor::{Quote, QuoteRequest, SwapExecutor};

#[cfg(test)]
pub use market_data::MockMarketData;
#[cfg(test)]
pub use position_adapter::MockPositionAdapter;
#[cfg(test)]
pub use swap_executor::MockSwapExecutor;
