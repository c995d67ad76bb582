//! Service Contracts
//!
//! A contract is the ordered list of remote methods a client is bound to.
//! Contracts come from `rpc_service!` declarations or from a TOML file:
//!
//! ```toml
//! [[method]]
//! name = "test"
//! params = 1
//! param_type = "TestInput"
//! returns = "TestOutput"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A single remote method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodDescriptor {
    /// Wire method name
    pub name: String,

    /// Declared parameter count. Only 0 and 1 can be called.
    #[serde(default)]
    pub params: usize,

    /// Label of the parameter type, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,

    /// Label of the return type
    #[serde(default = "default_returns")]
    pub returns: String,
}

fn default_returns() -> String {
    "any".to_string()
}

impl MethodDescriptor {
    /// Describe a method taking zero (`param_type == None`) or one parameter
    pub fn new(name: impl Into<String>, param_type: Option<&str>, returns: &str) -> Self {
        Self {
            name: name.into(),
            params: usize::from(param_type.is_some()),
            param_type: param_type.map(String::from),
            returns: returns.to_string(),
        }
    }

    /// Whether this method can be dispatched at all
    pub fn is_callable(&self) -> bool {
        self.params <= 1
    }

    fn validate(&self) -> Result<(), ContractError> {
        if self.name.trim().is_empty() {
            return Err(ContractError::InvalidMethod {
                name: self.name.clone(),
                reason: "name must not be empty".to_string(),
            });
        }
        if self.params == 0 && self.param_type.is_some() {
            return Err(ContractError::InvalidMethod {
                name: self.name.clone(),
                reason: "param_type given for a method without parameters".to_string(),
            });
        }
        Ok(())
    }
}

/// Errors that can occur when loading a contract or checking a call against it
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("Failed to read contract file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Contract file not found: {0}")]
    NotFound(PathBuf),

    #[error("Duplicate method name: '{0}'")]
    DuplicateMethod(String),

    #[error("Method '{name}': {reason}")]
    InvalidMethod { name: String, reason: String },

    #[error("Unknown method: '{0}'")]
    UnknownMethod(String),

    #[error("Method '{method}' takes {count} parameters; at most one is supported")]
    TooManyParameters { method: String, count: usize },

    #[error("Method '{method}' expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        method: String,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct ContractFile {
    #[serde(default, rename = "method")]
    methods: Vec<MethodDescriptor>,
}

/// Immutable, ordered set of method descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceContract {
    methods: Vec<MethodDescriptor>,
}

impl ServiceContract {
    /// Build a contract, rejecting duplicate and malformed methods
    pub fn new(methods: Vec<MethodDescriptor>) -> Result<Self, ContractError> {
        let mut seen = HashSet::new();
        for method in &methods {
            method.validate()?;
            if !seen.insert(method.name.as_str()) {
                return Err(ContractError::DuplicateMethod(method.name.clone()));
            }
        }
        Ok(Self { methods })
    }

    /// Load a contract from a TOML file
    pub fn load(path: &Path) -> Result<Self, ContractError> {
        if !path.exists() {
            return Err(ContractError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a contract from a TOML string
    pub fn parse(content: &str) -> Result<Self, ContractError> {
        let file: ContractFile = toml::from_str(content)?;
        Self::new(file.methods)
    }

    /// Serialize back to the TOML file format
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(&ContractFile {
            methods: self.methods.clone(),
        })
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Methods in declaration order
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Check that `method` exists and can be called with `argc` arguments
    pub fn check_call(&self, method: &str, argc: usize) -> Result<&MethodDescriptor, ContractError> {
        let descriptor = self
            .method(method)
            .ok_or_else(|| ContractError::UnknownMethod(method.to_string()))?;

        if !descriptor.is_callable() || argc > 1 {
            return Err(ContractError::TooManyParameters {
                method: method.to_string(),
                count: descriptor.params.max(argc),
            });
        }

        if argc != descriptor.params {
            return Err(ContractError::ArityMismatch {
                method: method.to_string(),
                expected: descriptor.params,
                actual: argc,
            });
        }

        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: &str = r#"
        [[method]]
        name = "test"
        params = 1
        param_type = "TestInput"
        returns = "TestOutput"

        [[method]]
        name = "ping"

        [[method]]
        name = "legacyAdd"
        params = 2
        returns = "i64"
    "#;

    #[test]
    fn test_parse_contract() {
        let contract = ServiceContract::parse(CONTRACT).unwrap();
        assert_eq!(contract.len(), 3);

        let names: Vec<&str> = contract.methods().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["test", "ping", "legacyAdd"]);

        let ping = contract.method("ping").unwrap();
        assert_eq!(ping.params, 0);
        assert_eq!(ping.returns, "any");
        assert!(ping.param_type.is_none());
    }

    #[test]
    fn test_duplicate_method_names() {
        let content = r#"
            [[method]]
            name = "dup"

            [[method]]
            name = "dup"
            params = 1
        "#;

        let result = ServiceContract::parse(content);
        assert!(matches!(result, Err(ContractError::DuplicateMethod(ref n)) if n == "dup"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let content = r#"
            [[method]]
            name = "x"
            parameters = 1
        "#;

        assert!(matches!(ServiceContract::parse(content), Err(ContractError::Parse(_))));
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = ServiceContract::new(vec![MethodDescriptor::new(" ", None, "any")]);
        assert!(matches!(result, Err(ContractError::InvalidMethod { .. })));
    }

    #[test]
    fn test_check_call() {
        let contract = ServiceContract::parse(CONTRACT).unwrap();

        assert!(contract.check_call("test", 1).is_ok());
        assert!(contract.check_call("ping", 0).is_ok());

        assert!(matches!(
            contract.check_call("nope", 0),
            Err(ContractError::UnknownMethod(_))
        ));
        assert!(matches!(
            contract.check_call("legacyAdd", 2),
            Err(ContractError::TooManyParameters { count: 2, .. })
        ));
        assert!(matches!(
            contract.check_call("legacyAdd", 0),
            Err(ContractError::TooManyParameters { .. })
        ));
        assert!(matches!(
            contract.check_call("test", 2),
            Err(ContractError::TooManyParameters { .. })
        ));
        assert!(matches!(
            contract.check_call("test", 0),
            Err(ContractError::ArityMismatch { expected: 1, actual: 0, .. })
        ));
    }

    #[test]
    fn test_toml_round_trip_keeps_order() {
        let contract = ServiceContract::parse(CONTRACT).unwrap();
        let reparsed = ServiceContract::parse(&contract.to_toml().unwrap()).unwrap();
        assert_eq!(contract, reparsed);
    }

    #[test]
    fn test_load_missing_file() {
        let result = ServiceContract::load(Path::new("/nonexistent/contract.toml"));
        assert!(matches!(result, Err(ContractError::NotFound(_))));
    }
}
