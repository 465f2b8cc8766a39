mod runner;
mod errors;
mod shared;
mod worker;
mod app_config;
mod context;
mod logging;

pub use runner::*;
pub use errors::*;
pub use shared::*;
pub use worker::*;
pub use app_config::*;
pub use context::*;
pub use logging::*;
