pub mod browser;
pub mod engine;
pub mod extract;
#[cfg(test)]
pub mod fake;
pub mod session;
pub mod stagnation;
pub mod traits;
pub mod types;
pub mod url_builder;

pub use browser::ChromePage;
pub use engine::{EngineHandle, ScraperEngine};
