mod loader;
mod types;

pub use loader::{ConfigLoader, PROJECT_CONFIG_DIR_ENV};
pub use types::{ProviderDefaults, QuillConfig};
