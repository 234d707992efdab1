use crate::queue::ConfigOption;

pub const DEFAULT_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub capacity: usize,
  pub log_prefix: String,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      capacity: DEFAULT_CAPACITY,
      log_prefix: "".to_string(),
    }
  }
}

impl Config {
  pub fn from(options: impl IntoIterator<Item = ConfigOption>) -> Config {
    let mut config = Config::default();
    for option in options {
      option.apply(&mut config);
    }
    config
  }
}
