use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Largest accepted score scale
pub const MAX_SCALE: usize = 200;

/// Construction parameters for a [`Manager`](crate::Manager)
///
/// # Example
/// ```rust
/// use level_forest::Config;
///
/// let config = Config::new(4, 10);
/// assert!(config.validate().is_ok());
///
/// assert!(Config::new(0, 10).validate().is_err());
/// assert!(Config::new(4, 0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Number of groups, ids are `1..=groups`
    pub groups: usize,
    /// Score domain size, scores are `0..scale`
    pub scale: usize,
}

impl Config {
    pub fn new(groups: usize, scale: usize) -> Self {
        Self { groups, scale }
    }

    pub fn validate(&self) -> Result<()> {
        if self.groups == 0 {
            return Err(Error::InvalidInput("group count must be positive"));
        }
        if self.scale == 0 || self.scale > MAX_SCALE {
            return Err(Error::InvalidInput("score scale out of range"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize() {
        let config: Config = serde_json::from_str(r#"{"groups": 3, "scale": 50}"#).unwrap();
        assert_eq!(config, Config::new(3, 50));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_scale_bounds() {
        assert!(Config::new(1, MAX_SCALE).validate().is_ok());
        assert_eq!(
            Config::new(1, MAX_SCALE + 1).validate(),
            Err(Error::InvalidInput("score scale out of range"))
        );
    }
}
