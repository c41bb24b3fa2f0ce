//! Re-export of environment variables as outputs
//!
//! Jobs can read outputs in places where the `env` context is not
//! available (`jobs.<job_id>.with.<with_id>`).

use crate::Outputs;

/// Outputs carrying the current value of each named environment variable.
/// Unset variables are exported with an empty value.
pub fn export_env<I, S>(names: I) -> Outputs
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    export_env_with(names, |name| std::env::var(name).ok())
}

/// Like [`export_env`], resolving values through `lookup`
pub fn export_env_with<I, S, F>(names: I, lookup: F) -> Outputs
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: Fn(&str) -> Option<String>,
{
    let mut outputs = Outputs::new();
    for name in names {
        let name = name.as_ref();
        outputs.insert(name, lookup(name).unwrap_or_default());
    }
    outputs
}
