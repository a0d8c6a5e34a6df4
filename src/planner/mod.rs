pub mod cycles;
pub mod error;
pub mod graph;
pub mod order;

pub use cycles::*;
pub use error::*;
pub use graph::*;
pub use order::*;
