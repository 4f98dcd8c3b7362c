mod app;
mod env;

pub use app::*;

pub use env::{get_env_mandatory_value, get_env_value_or_default};
