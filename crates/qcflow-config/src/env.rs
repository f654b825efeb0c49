//! Process-environment capture.
//!
//! The orchestrator needs three externally supplied values: the QC
//! singularity image, the SSH key for the remote store, and the invoking
//! user. They are captured exactly once, up front, so a missing value fails
//! the run before any transport or scheduler call is attempted.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const IMAGE_VAR: &str = "SING_MRIQC";
const KEY_VAR: &str = "RSA_LS2";
const USER_VAR: &str = "USER";
const HOSTNAME_VAR: &str = "HOSTNAME";

/// Values captured from the process environment at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Env {
  /// Path to the QC singularity image.
  pub sing_image: PathBuf,
  /// Path to the SSH key authorized on the remote store.
  pub rsa_key: PathBuf,
  /// Invoking user, used for scratch paths and the remote address.
  pub user: String,
  /// Hostname, when the environment exposes one.
  pub hostname: Option<String>,
}

impl Env {
  /// Capture configuration from the real process environment.
  pub fn capture() -> Result<Self, ConfigError> {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  /// Build from an arbitrary variable lookup. Lets tests supply
  /// configuration without mutating the process environment.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let require = |name: &str| {
      lookup(name).ok_or_else(|| ConfigError::MissingEnv {
        name: name.to_string(),
      })
    };

    Ok(Self {
      sing_image: PathBuf::from(require(IMAGE_VAR)?),
      rsa_key: PathBuf::from(require(KEY_VAR)?),
      user: require(USER_VAR)?,
      hostname: lookup(HOSTNAME_VAR),
    })
  }

  /// Refuse to run when the host is known and is not a cluster node.
  ///
  /// An unknown hostname passes: the scheduler's execution context does not
  /// always export one.
  pub fn require_cluster_host(&self, expected: &str) -> Result<(), ConfigError> {
    match &self.hostname {
      Some(hostname) if !hostname.contains(expected) => Err(ConfigError::WrongHost {
        hostname: hostname.clone(),
        expected: expected.to_string(),
      }),
      _ => Ok(()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lookup_all(name: &str) -> Option<String> {
    match name {
      "SING_MRIQC" => Some("/opt/images/mriqc.simg".to_string()),
      "RSA_LS2" => Some("/home/user/.ssh/id_rsa_ls2".to_string()),
      "USER" => Some("user".to_string()),
      "HOSTNAME" => Some("dcc-core-01".to_string()),
      _ => None,
    }
  }

  #[test]
  fn test_from_lookup_captures_all() {
    let env = Env::from_lookup(lookup_all).expect("capture failed");
    assert_eq!(env.sing_image, PathBuf::from("/opt/images/mriqc.simg"));
    assert_eq!(env.user, "user");
    assert_eq!(env.hostname.as_deref(), Some("dcc-core-01"));
  }

  #[test]
  fn test_missing_key_is_fatal() {
    let result = Env::from_lookup(|name| match name {
      "RSA_LS2" => None,
      other => lookup_all(other),
    });
    match result {
      Err(ConfigError::MissingEnv { name }) => assert_eq!(name, "RSA_LS2"),
      other => panic!("expected MissingEnv, got {other:?}"),
    }
  }

  #[test]
  fn test_wrong_host_is_rejected() {
    let env = Env::from_lookup(|name| match name {
      "HOSTNAME" => Some("laptop".to_string()),
      other => lookup_all(other),
    })
    .expect("capture failed");
    assert!(env.require_cluster_host("dcc").is_err());
  }

  #[test]
  fn test_unknown_host_passes() {
    let env = Env::from_lookup(|name| match name {
      "HOSTNAME" => None,
      other => lookup_all(other),
    })
    .expect("capture failed");
    assert!(env.require_cluster_host("dcc").is_ok());
  }
}
