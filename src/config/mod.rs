//! Settings loading and derivation
//!
//! The merged configuration is assembled in layers:
//! 1. Settings file (`.github/settings.yml`)
//! 2. Settings derived from the git ref and the settings file
//! 3. Run context paths (`build.clone_dir`, `build.artifacts_dir`)

mod configuration;
mod derived;
mod loader;
mod registry;

pub use configuration::{configuration, Configuration};
pub use derived::{derive_settings, runner_json, split_repository, BuildProfile};
pub use loader::{parse_context, parse_settings, SettingsFile, SettingsFormat};
pub use registry::{extract_registries, login_flags, registry_from_image, Registry};
