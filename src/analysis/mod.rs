pub mod client;
pub mod conversion;
pub mod model;
pub mod schema;
pub mod wire;

pub use client::*;
pub use conversion::*;
pub use model::*;
pub use wire::{decode_analysis, reparse_value, strip_code_fence};
