pub mod classifier;
pub mod engine;
pub mod error;
pub mod event;
pub mod orchestrator;
pub mod playbook;
pub mod roles;

pub use classifier::*;
pub use engine::*;
pub use error::*;
pub use event::*;
pub use orchestrator::*;
pub use playbook::*;
pub use roles::*;
