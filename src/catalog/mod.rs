pub mod error;
pub mod registry;
pub mod spec;

pub use error::*;
pub use registry::*;
pub use spec::*;
