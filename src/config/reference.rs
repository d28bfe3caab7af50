//! Reference data loading from config.toml
//!
//! The lookup tables (locations, vots, file references, procurement types and vendors)
//! are seeded from a TOML file on startup. Seeding is idempotent: rows are matched on
//! their unique code and updated in place.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Status flag for rows that may be selected on new requests
pub const STATUS_ACTIVE: i32 = 1;
/// Status flag for rows kept only for historical references
pub const STATUS_INACTIVE: i32 = 2;

const fn default_status() -> i32 {
    STATUS_ACTIVE
}

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Location tree
    #[serde(default)]
    pub locations: Vec<LocationSeed>,
    /// Expenditure classifications
    #[serde(default)]
    pub vots: Vec<VotSeed>,
    /// Filing codes
    #[serde(default)]
    pub file_references: Vec<FileReferenceSeed>,
    /// Procurement methods
    #[serde(default)]
    pub type_procurements: Vec<TypeProcurementSeed>,
    /// Suppliers
    #[serde(default)]
    pub vendors: Vec<VendorSeed>,
}

/// A location row
#[derive(Debug, Deserialize, Clone)]
pub struct LocationSeed {
    pub location_iso_code: String,
    pub location_name: String,
    pub parent_iso_code: String,
    #[serde(default = "default_status")]
    pub status: i32,
}

/// A vot row
#[derive(Debug, Deserialize, Clone)]
pub struct VotSeed {
    pub vot_code: String,
    pub vot_description: String,
    #[serde(default = "default_status")]
    pub status: i32,
}

/// A file reference row
#[derive(Debug, Deserialize, Clone)]
pub struct FileReferenceSeed {
    pub file_code: String,
    pub file_description: String,
    /// Parent code; top-level entries use `ROOT`
    pub parent_file_code: String,
    #[serde(default = "default_status")]
    pub status: i32,
}

/// A procurement type row
#[derive(Debug, Deserialize, Clone)]
pub struct TypeProcurementSeed {
    pub procurement_code: String,
    pub procurement_description: String,
    #[serde(default = "default_status")]
    pub status: i32,
}

/// A vendor row
#[derive(Debug, Deserialize, Clone)]
pub struct VendorSeed {
    pub vendor_code: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_status")]
    pub status: i32,
}

/// Loads reference data configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads reference data from the default location (./config.toml)
pub fn load_default_config() -> Result<Config> {
    load_config("config.toml")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_reference_config() {
        let toml_str = r#"
            [[locations]]
            location_iso_code = "MY-SGR"
            location_name = "SELANGOR"
            parent_iso_code = "MY"

            [[vots]]
            vot_code = "20000"
            vot_description = "Services and Supplies"

            [[vots]]
            vot_code = "50000"
            vot_description = "Other Expenditures"
            status = 2

            [[file_references]]
            file_code = "FIN"
            file_description = "Finance"
            parent_file_code = "ROOT"

            [[vendors]]
            vendor_code = "ALPHA"
            name = "Alpha Supplies Sdn Bhd"
            email = "sales@alpha-supplies.my"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.locations.len(), 1);
        assert_eq!(config.locations[0].status, STATUS_ACTIVE);
        assert_eq!(config.vots.len(), 2);
        assert_eq!(config.vots[1].status, STATUS_INACTIVE);
        assert_eq!(config.file_references[0].parent_file_code, "ROOT");
        assert!(config.type_procurements.is_empty());
        assert_eq!(config.vendors[0].phone, None);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = load_config("does/not/exist.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_bundled_config_parses() {
        let config = load_config(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml")).unwrap();
        assert!(config.locations.iter().any(|l| l.location_iso_code == "MY-SGR"));
        assert!(!config.vots.is_empty());
        assert!(!config.vendors.is_empty());
    }
}
