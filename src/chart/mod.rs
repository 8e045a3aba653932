pub mod symbols;

pub use symbols::{filtered_supported_pair_names, symbol_info, SymbolInfo, SymbolSearchResult};
