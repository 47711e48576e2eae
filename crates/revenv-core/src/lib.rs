#![deny(clippy::all, warnings)]

mod core;

pub use crate::core::outcome::{CommandStatus, ExecutionOutcome};
pub use crate::core::reinit::{reinitialize, ReinitRequest};
pub use crate::core::relocate::{relocate, RelocateRequest};
