//! Hook system: hook points, typed hook tables, and the dispatcher.

pub mod definitions;
pub mod dispatcher;
pub mod set;

pub use definitions::{ClientHookPoint, HookPoint};
pub use dispatcher::{DispatchPolicy, DispatchReport, HookDispatcher};
pub use set::{ClientHookSet, HookOutcome, ServerHookSet};
