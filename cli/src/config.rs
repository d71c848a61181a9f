use crate::{ErrorKind, Result};
use error_chain::bail;
use log::info;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// The per-city feature-service logins, read from a YAML file of the shape
///
/// ```yaml
/// cities:
///   springfield:
///     url: https://maps.example.gov/arcgis/rest/services/Water
///     username: gisviewer
///     password: "..."
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CityLogins {
    cities: HashMap<String, CityConfig>,
}

/// The feature-service endpoint and credentials of one city.
#[derive(Debug, Clone, Deserialize)]
pub struct CityConfig {
    /// The feature-service base URL.
    pub url: String,
    /// The service account name.
    pub username: String,
    /// The service account password.
    #[allow(dead_code)]
    pub password: String,
}

impl CityLogins {
    /// Reads the logins file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let logins: Self = serde_yaml::from_str(&contents)?;
        info!(
            "Read logins for {} cities from {}",
            logins.cities.len(),
            path.as_ref().display()
        );
        Ok(logins)
    }

    /// Resolves the configuration of the given city.
    pub fn resolve(&self, city: &str) -> Result<&CityConfig> {
        match self.cities.get(city) {
            Some(config) => Ok(config),
            None => bail!(ErrorKind::UnknownCity(city.to_owned())),
        }
    }
}

/// Logs the provenance of the input layers when a logins file and city are
/// given. The layers themselves are local exports; this records which
/// service they came from.
pub fn log_layer_provenance(
    city_logins: &Option<String>,
    city: &Option<String>,
) -> Result<()> {
    if let (Some(path), Some(city)) = (city_logins, city) {
        let logins = CityLogins::from_yaml_file(path)?;
        let config = logins.resolve(city)?;
        info!(
            "Input layers exported from {} as user {}",
            config.url, config.username
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::CityLogins;

    #[test]
    fn test_logins_parse_and_resolve() {
        let yaml = "cities:\n  springfield:\n    url: https://maps.example.gov/water\n    username: gisviewer\n    password: hunter2\n";
        let logins: CityLogins = serde_yaml::from_str(yaml).unwrap();
        let config = logins.resolve("springfield").unwrap();
        assert_eq!(config.url, "https://maps.example.gov/water");
        assert!(logins.resolve("shelbyville").is_err());
    }
}
