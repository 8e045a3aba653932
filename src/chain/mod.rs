pub mod rpc;
pub mod traits;
pub mod types;

#[cfg(test)]
pub mod mock;

pub use rpc::RpcChainClient;
pub use traits::ChainClient;
pub use types::{parse_hex_u64, to_hex, ContractCall, RawVoteInfo, RawVoteStatus};
