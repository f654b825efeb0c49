//! Configuration errors.

/// Errors raised while assembling run configuration, before any work begins.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// A required environment variable is absent.
  #[error("required environment variable '{name}' is not set")]
  MissingEnv { name: String },

  /// The current host is not a cluster node the batch workflow may run on.
  #[error("host '{hostname}' is not a cluster node (expected name containing '{expected}')")]
  WrongHost { hostname: String, expected: String },
}
