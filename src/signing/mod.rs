pub mod transaction;
pub mod wallet;

pub use transaction::{serialize_params, sign_call};
pub use wallet::Wallet;
