//! REST API version definitions.
//!
//! This module provides the [`ApiVersion`] enum sent in the `x-ms-version`
//! header of every request.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// DocumentDB REST API version.
///
/// Known versions get their own variant; any other well-formed `YYYY-MM-DD`
/// string is accepted as [`ApiVersion::Custom`].
///
/// # Example
///
/// ```rust
/// use documentdb::ApiVersion;
///
/// let version: ApiVersion = "2017-02-22".parse().unwrap();
/// assert_eq!(version, ApiVersion::V2017_02_22);
/// assert_eq!(version.to_string(), "2017-02-22");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    /// API version 2015-08-04, the first DocumentDB GA version with SQL parameters.
    V2015_08_04,
    /// API version 2016-07-11.
    V2016_07_11,
    /// API version 2017-02-22.
    V2017_02_22,
    /// API version 2018-12-31.
    V2018_12_31,
    /// Custom version string for versions this crate does not know about.
    Custom(String),
}

impl ApiVersion {
    /// Returns the latest known API version.
    #[must_use]
    pub const fn latest() -> Self {
        Self::V2018_12_31
    }

    fn is_valid_version_format(s: &str) -> bool {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 3 {
            return false;
        }
        let widths = [4, 2, 2];
        parts
            .iter()
            .zip(widths)
            .all(|(part, width)| part.len() == width && part.chars().all(|c| c.is_ascii_digit()))
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version_str = match self {
            Self::V2015_08_04 => "2015-08-04",
            Self::V2016_07_11 => "2016-07-11",
            Self::V2017_02_22 => "2017-02-22",
            Self::V2018_12_31 => "2018-12-31",
            Self::Custom(s) => s,
        };
        f.write_str(version_str)
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        match s {
            "2015-08-04" => Ok(Self::V2015_08_04),
            "2016-07-11" => Ok(Self::V2016_07_11),
            "2017-02-22" => Ok(Self::V2017_02_22),
            "2018-12-31" => Ok(Self::V2018_12_31),
            _ if Self::is_valid_version_format(s) => Ok(Self::Custom(s.to_string())),
            _ => Err(ConfigError::InvalidApiVersion {
                version: s.to_string(),
            }),
        }
    }
}
