// Core chat session loop without terminal dependencies

pub mod app;
pub mod error;
pub mod model_registry;
pub mod preferences;
pub mod session;
pub mod surface;
pub mod test_utils;
pub mod utils;
