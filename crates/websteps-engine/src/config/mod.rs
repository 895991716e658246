pub mod loader;
pub mod schema;

pub use loader::{CONFIG_ENV_VAR, ConfigError, ConfigLoader};
pub use schema::WebStepsConfig;
