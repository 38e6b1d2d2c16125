// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod config;
pub mod history;
pub mod pacing;
pub mod runtime;
pub mod script;
pub mod scoring;
pub mod session;
pub mod util;
