use anyhow::{ensure, Context, Result};
use barcode::{WhitelistParams, MAX_BARCODE_LENGTH, MAX_NUM_BARCODES};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable parameters of a remapping run.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RemapParams {
    /// Length of every barcode, trusted or observed.
    pub barcode_length: usize,
    /// Exact number of barcodes in the list of barcodes to use.
    pub num_barcodes: usize,
}

pub const DEFAULT_PARAMETERS: RemapParams = RemapParams {
    barcode_length: barcode::DEFAULT_BARCODE_LENGTH,
    num_barcodes: barcode::DEFAULT_NUM_BARCODES,
};

impl Default for RemapParams {
    fn default() -> Self {
        DEFAULT_PARAMETERS
    }
}

macro_rules! non_default_values {
    ($params:expr, $($a:ident),+) => {{
        let mut values = Vec::new();
        $(
            if DEFAULT_PARAMETERS.$a != $params.$a {
                values.push(format!("{} = {:?}", stringify!($a), $params.$a));
            }
        )+
        values
    }};
}

impl RemapParams {
    /// Load parameters from a TOML file. Keys that are absent keep their default,
    /// and every value that differs from its default is logged.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| path.display().to_string())?;
        let params: RemapParams =
            toml::from_str(&s).with_context(|| path.display().to_string())?;
        for value in params.non_default_values() {
            warn!("using non-default {value} from {}", path.display());
        }
        Ok(params)
    }

    /// `name = value` for every parameter that differs from `DEFAULT_PARAMETERS`.
    pub fn non_default_values(&self) -> Vec<String> {
        non_default_values!(self, barcode_length, num_barcodes)
    }

    /// Reject parameter combinations that cannot describe a run.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (1..=MAX_BARCODE_LENGTH).contains(&self.barcode_length),
            "barcode_length must be between 1 and {MAX_BARCODE_LENGTH}, got {}",
            self.barcode_length
        );
        ensure!(
            (1..=MAX_NUM_BARCODES).contains(&self.num_barcodes),
            "num_barcodes must be between 1 and {MAX_NUM_BARCODES}, got {}",
            self.num_barcodes
        );
        Ok(())
    }

    pub fn whitelist_params(&self) -> WhitelistParams {
        WhitelistParams {
            barcode_length: self.barcode_length,
            num_barcodes: self.num_barcodes,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = RemapParams::default();
        assert_eq!(params.barcode_length, 12);
        assert_eq!(params.num_barcodes, 1000);
        assert!(params.validate().is_ok());
        assert_eq!(params.whitelist_params(), WhitelistParams::default());
        assert!(params.non_default_values().is_empty());
    }

    #[test]
    fn test_from_toml() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("parameters.toml");

        std::fs::write(&path, "num_barcodes = 2\n")?;
        let params = RemapParams::from_toml_file(&path)?;
        assert_eq!(
            params,
            RemapParams {
                barcode_length: 12,
                num_barcodes: 2
            }
        );
        assert_eq!(params.non_default_values(), vec!["num_barcodes = 2".to_string()]);

        // values restating a default are not reported
        std::fs::write(&path, "barcode_length = 12\n")?;
        assert!(RemapParams::from_toml_file(&path)?.non_default_values().is_empty());

        std::fs::write(&path, "barcode_length = 8\nnum_barcodes = 5\n")?;
        assert_eq!(RemapParams::from_toml_file(&path)?.barcode_length, 8);

        std::fs::write(&path, "max_errors = 2\n")?;
        assert!(RemapParams::from_toml_file(&path).is_err());

        std::fs::write(&path, "num_barcodes = \"many\"\n")?;
        assert!(RemapParams::from_toml_file(&path).is_err());

        assert!(RemapParams::from_toml_file(&dir.path().join("missing.toml")).is_err());
        Ok(())
    }

    #[test]
    fn test_validate() {
        let mut params = RemapParams {
            barcode_length: 0,
            num_barcodes: 1,
        };
        assert!(params.validate().is_err());
        params.barcode_length = MAX_BARCODE_LENGTH + 1;
        assert!(params.validate().is_err());
        params.barcode_length = MAX_BARCODE_LENGTH;
        assert!(params.validate().is_ok());
        params.num_barcodes = 0;
        assert!(params.validate().is_err());
        params.num_barcodes = MAX_NUM_BARCODES;
        assert!(params.validate().is_ok());
        if let Some(too_many) = MAX_NUM_BARCODES.checked_add(1) {
            params.num_barcodes = too_many;
            assert!(params.validate().is_err());
        }
    }
}
