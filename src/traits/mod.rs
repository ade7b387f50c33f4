pub mod handler;
pub mod hooks;
pub mod source;

pub use handler::{Handler, ProgressReporter};
pub use hooks::{NoopHooks, ProcessorHooks};
pub use source::{ItemSource, Pull};
