pub mod model;
pub mod path;
pub mod patcher;

pub use model::*;
pub use path::*;
pub use patcher::*;
