//! Algorithm parameter schema and validation

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Caller-supplied parameters by name
pub type Params = BTreeMap<String, ParamValue>;

/// Custom check run on a parameter value; the error string is the reason
pub type Validator = fn(&ParamValue) -> std::result::Result<(), String>;

/// Declared type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Boolean,
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        };
        write!(f, "{}", s)
    }
}

/// A parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl ParamValue {
    pub fn param_type(&self) -> ParameterType {
        match self {
            Self::Boolean(_) => ParameterType::Boolean,
            Self::Number(_) => ParameterType::Number,
            Self::String(_) => ParameterType::String,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

/// `true`/`false` parse as booleans, numerals as numbers, anything else as a string
impl FromStr for ParamValue {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed {
            "true" => Self::Boolean(true),
            "false" => Self::Boolean(false),
            _ => match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => Self::Number(n),
                _ => Self::String(s.to_string()),
            },
        })
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// One entry of an algorithm's parameter schema
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    pub description: String,
    pub default_value: ParamValue,
    #[serde(skip)]
    pub validator: Option<Validator>,
}

impl AlgorithmParameter {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        default_value: impl Into<ParamValue>,
    ) -> Self {
        let default_value = default_value.into();
        Self {
            name: name.into(),
            param_type: default_value.param_type(),
            description: description.into(),
            default_value,
            validator: None,
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Type check, then the custom validator if one is declared
    pub fn validate(&self, value: &ParamValue) -> std::result::Result<(), String> {
        if value.param_type() != self.param_type {
            return Err(format!(
                "expected {}, got {} '{}'",
                self.param_type,
                value.param_type(),
                value
            ));
        }
        match self.validator {
            Some(validator) => validator(value),
            None => Ok(()),
        }
    }
}

pub fn non_negative(value: &ParamValue) -> std::result::Result<(), String> {
    match value.as_f64() {
        Some(n) if n >= 0.0 && n.is_finite() => Ok(()),
        _ => Err("must be a finite number >= 0".to_string()),
    }
}

pub fn positive(value: &ParamValue) -> std::result::Result<(), String> {
    match value.as_f64() {
        Some(n) if n > 0.0 && n.is_finite() => Ok(()),
        _ => Err("must be a finite number > 0".to_string()),
    }
}

pub fn unit_fraction(value: &ParamValue) -> std::result::Result<(), String> {
    match value.as_f64() {
        Some(n) if (0.0..1.0).contains(&n) => Ok(()),
        _ => Err("must be a number in [0, 1)".to_string()),
    }
}

pub fn positive_integer(value: &ParamValue) -> std::result::Result<(), String> {
    match value.as_f64() {
        Some(n) if n >= 1.0 && n.fract() == 0.0 && n <= u32::MAX as f64 => Ok(()),
        _ => Err("must be a positive integer".to_string()),
    }
}

/// Parameters after defaults are applied and every value validated
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParams {
    algorithm: String,
    values: Params,
}

impl ResolvedParams {
    /// Reject unknown names, validate supplied values and fill in defaults
    pub fn resolve(algorithm: &str, schema: &[AlgorithmParameter], params: &Params) -> Result<Self> {
        if let Some(unknown) = params
            .keys()
            .find(|name| !schema.iter().any(|p| &p.name == *name))
        {
            return Err(AnalysisError::UnknownParameter {
                algorithm: algorithm.to_string(),
                parameter: unknown.clone(),
            });
        }

        let mut values = Params::new();
        for parameter in schema {
            let value = params
                .get(&parameter.name)
                .unwrap_or(&parameter.default_value);
            parameter
                .validate(value)
                .map_err(|reason| AnalysisError::InvalidParameter {
                    algorithm: algorithm.to_string(),
                    parameter: parameter.name.clone(),
                    reason,
                })?;
            values.insert(parameter.name.clone(), value.clone());
        }

        Ok(Self {
            algorithm: algorithm.to_string(),
            values,
        })
    }

    pub fn values(&self) -> &Params {
        &self.values
    }

    pub fn into_values(self) -> Params {
        self.values
    }

    fn get(&self, name: &str) -> Result<&ParamValue> {
        self.values
            .get(name)
            .ok_or_else(|| AnalysisError::UnknownParameter {
                algorithm: self.algorithm.clone(),
                parameter: name.to_string(),
            })
    }

    fn mismatch(&self, name: &str, expected: ParameterType) -> AnalysisError {
        AnalysisError::InvalidParameter {
            algorithm: self.algorithm.clone(),
            parameter: name.to_string(),
            reason: format!("expected {}", expected),
        }
    }

    pub fn bool(&self, name: &str) -> Result<bool> {
        self.get(name)?
            .as_bool()
            .ok_or_else(|| self.mismatch(name, ParameterType::Boolean))
    }

    pub fn number(&self, name: &str) -> Result<f64> {
        self.get(name)?
            .as_f64()
            .ok_or_else(|| self.mismatch(name, ParameterType::Number))
    }

    pub fn string(&self, name: &str) -> Result<&str> {
        self.get(name)?
            .as_str()
            .ok_or_else(|| self.mismatch(name, ParameterType::String))
    }

    /// A number parameter validated as a positive integer
    pub fn count(&self, name: &str) -> Result<usize> {
        Ok(self.number(name)? as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<AlgorithmParameter> {
        vec![
            AlgorithmParameter::new("normalize", "Scale scores", true),
            AlgorithmParameter::new("maxResults", "Row cap", 50.0).with_validator(positive_integer),
            AlgorithmParameter::new("label", "Free text", "none"),
        ]
    }

    #[test]
    fn test_defaults_fill_missing() {
        let resolved = ResolvedParams::resolve("algo", &schema(), &Params::new()).unwrap();

        assert!(resolved.bool("normalize").unwrap());
        assert_eq!(resolved.count("maxResults").unwrap(), 50);
        assert_eq!(resolved.string("label").unwrap(), "none");
    }

    #[test]
    fn test_type_check_without_validator() {
        let params = Params::from([("normalize".to_string(), ParamValue::from("yes"))]);
        let err = ResolvedParams::resolve("algo", &schema(), &params).unwrap_err();

        assert!(matches!(
            err,
            AnalysisError::InvalidParameter { ref parameter, .. } if parameter == "normalize"
        ));
    }

    #[test]
    fn test_custom_validator_runs() {
        for bad in [0.0, -3.0, 2.5] {
            let params = Params::from([("maxResults".to_string(), ParamValue::from(bad))]);
            assert!(ResolvedParams::resolve("algo", &schema(), &params).is_err());
        }
        let params = Params::from([("maxResults".to_string(), ParamValue::from(7.0))]);
        let resolved = ResolvedParams::resolve("algo", &schema(), &params).unwrap();
        assert_eq!(resolved.count("maxResults").unwrap(), 7);
    }

    #[test]
    fn test_unit_fraction() {
        assert!(unit_fraction(&ParamValue::from(0.0)).is_ok());
        assert!(unit_fraction(&ParamValue::from(0.85)).is_ok());
        assert!(unit_fraction(&ParamValue::from(1.0)).is_err());
        assert!(unit_fraction(&ParamValue::from(-0.1)).is_err());
        assert!(unit_fraction(&ParamValue::from(true)).is_err());
    }

    #[test]
    fn test_unknown_parameter_rejected() {
        let params = Params::from([("bogus".to_string(), ParamValue::from(true))]);
        let err = ResolvedParams::resolve("algo", &schema(), &params).unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownParameter { .. }));
    }

    #[test]
    fn test_parse_from_cli_text() {
        assert_eq!("true".parse::<ParamValue>().unwrap(), ParamValue::Boolean(true));
        assert_eq!("2.5".parse::<ParamValue>().unwrap(), ParamValue::Number(2.5));
        assert_eq!("abc".parse::<ParamValue>().unwrap(), ParamValue::from("abc"));
        assert_eq!("NaN".parse::<ParamValue>().unwrap(), ParamValue::from("NaN"));
    }

    #[test]
    fn test_schema_serializes_without_validator() {
        let json = serde_json::to_value(&schema()[1]).unwrap();
        assert_eq!(json["type"], "number");
        assert_eq!(json["defaultValue"], 50.0);
        assert!(json.get("validator").is_none());
    }
}
