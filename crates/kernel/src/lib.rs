//! Kernel of the SHELF backend: layered settings, the `Module` contract,
//! the module registry and the state shared with request handlers.

pub mod module;
pub mod registry;
pub mod settings;
pub mod state;

pub use module::{InitCtx, Migration, Module};
pub use registry::ModuleRegistry;
pub use settings::Settings;
pub use state::AppState;
