pub mod binder;
pub mod document;
pub mod error;

pub use binder::*;
pub use document::*;
pub use error::*;
