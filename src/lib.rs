// Library surface for headless/integration tests and reuse.
// Terminal setup and argument parsing live in main.rs.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod logging;
pub mod quiz;
pub mod runtime;
pub mod sink;
pub mod ui;
pub mod util;
