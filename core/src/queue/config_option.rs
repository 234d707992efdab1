use crate::queue::Config;

#[derive(Debug, Clone)]
pub enum ConfigOption {
  SetCapacity(usize),
  SetLogPrefix(String),
}

impl ConfigOption {
  pub fn apply(&self, config: &mut Config) {
    match self {
      ConfigOption::SetCapacity(capacity) => {
        config.capacity = *capacity;
      }
      ConfigOption::SetLogPrefix(prefix) => {
        config.log_prefix = prefix.clone();
      }
    }
  }

  pub fn with_capacity(capacity: usize) -> ConfigOption {
    ConfigOption::SetCapacity(capacity)
  }

  pub fn with_log_prefix(prefix: String) -> ConfigOption {
    ConfigOption::SetLogPrefix(prefix)
  }
}
