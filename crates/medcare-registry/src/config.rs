use std::time::Duration;

/// Tunables shared by every service.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
  /// Reject CPFs whose check digits do not match. Turning this off is meant
  /// for loading legacy data only.
  pub validate_cpf_checksum: bool,
  /// Upper bound on a single store read or uniqueness probe. Writes run to
  /// completion.
  pub store_timeout:         Duration,
  /// Upper bound on handing a user-creation event to the publisher.
  pub publish_timeout:       Duration,
}

impl Default for RegistryConfig {
  fn default() -> Self {
    Self {
      validate_cpf_checksum: true,
      store_timeout:         Duration::from_secs(5),
      publish_timeout:       Duration::from_secs(2),
    }
  }
}
