pub mod amount;
pub mod pair;
pub mod proposal;
pub mod token;
pub mod transaction;

pub use amount::*;
pub use pair::*;
pub use proposal::*;
pub use token::*;
pub use transaction::*;
