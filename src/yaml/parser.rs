//! Typed YAML loading for input snapshots and configuration

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::yaml::diagnostics::{YamlError, YamlSyntaxError};

/// Parse YAML content, pointing errors at `filename`
pub fn parse_yaml<T: DeserializeOwned + 'static>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content)
        .map_err(|e| YamlSyntaxError::from_serde_error(&e, content, filename).into())
}

/// Read and parse a YAML file
pub fn parse_yaml_file<T: DeserializeOwned + 'static>(path: &Path) -> Result<T, YamlError> {
    let content = std::fs::read_to_string(path).map_err(|source| YamlError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "read input file");
    parse_yaml(&content, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ValidationInputs;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_inputs() {
        let yaml = r#"
method:
  name: ASSAY-01
  target_concentration: 0.5
stock:
  theoretical_stock: 0.5
  actual_weight_mg: 25.1
  final_volume_ml: 50
precision:
  repeatability: [1000, 1001, ~, 999, 1000, 1002]
"#;
        let inputs: ValidationInputs = parse_yaml(yaml, "inputs.yaml").unwrap();
        assert_eq!(inputs.method.target_concentration, dec!(0.5));
        assert_eq!(inputs.stock.actual_weight_mg, Some(dec!(25.1)));
        assert_eq!(inputs.precision.repeatability[2], None);
        assert!(inputs.precision.intermediate.is_empty());
    }

    #[test]
    fn test_type_error_carries_source() {
        let yaml = "method:\n  name: A\n  target_concentration: lots\n";
        let err = parse_yaml::<ValidationInputs>(yaml, "inputs.yaml").unwrap_err();
        match err {
            YamlError::Syntax(e) => {
                assert!(e.message.contains("target_concentration") || e.span.is_some());
            }
            YamlError::Io { .. } => panic!("expected a syntax error"),
        }
    }

    #[test]
    fn test_parse_invalid_yaml_returns_error() {
        let yaml = "method:\n  name: test\n   invalid: [indentation";
        let result: Result<ValidationInputs, _> = parse_yaml(yaml, "test.yaml");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file() {
        let result: Result<ValidationInputs, _> =
            parse_yaml_file(std::path::Path::new("/nonexistent/inputs.yaml"));
        assert!(matches!(result, Err(YamlError::Io { .. })));
    }
}
