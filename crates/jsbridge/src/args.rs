//! Argument extraction for host functions
//!
//! Arguments arrive as an ordered name → value mapping. Each function
//! declares its arguments once; the same table drives extraction and the
//! function's self-description.

use indexmap::IndexMap;

use jsbridge_types::Value;

use crate::error::ArgError;

/// Arguments passed to a host function
pub type CallArgs = IndexMap<String, Value>;

/// Declared argument of a host function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgInfo {
    pub name: &'static str,
    pub doc: &'static str,
    pub required: bool,
}

impl ArgInfo {
    pub const fn required(name: &'static str, doc: &'static str) -> Self {
        Self {
            name,
            doc,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, doc: &'static str) -> Self {
        Self {
            name,
            doc,
            required: false,
        }
    }
}

/// Validated view over a call's arguments
pub struct ArgReader<'a> {
    args: &'a CallArgs,
}

impl<'a> ArgReader<'a> {
    /// Reject arguments that are not declared in `spec`
    pub fn new(args: &'a CallArgs, spec: &[ArgInfo]) -> Result<Self, ArgError> {
        if let Some(unknown) = args.keys().find(|k| !spec.iter().any(|a| a.name == k.as_str())) {
            return Err(ArgError::Unexpected(unknown.clone()));
        }
        Ok(Self { args })
    }

    /// A required string; null counts as missing
    pub fn string(&self, field: &'static str) -> Result<&'a str, ArgError> {
        self.optional_string(field)?.ok_or(ArgError::Missing(field))
    }

    /// An optional string; absent or null yields `None`
    pub fn optional_string(&self, field: &'static str) -> Result<Option<&'a str>, ArgError> {
        match self.args.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(ArgError::WrongType {
                field,
                expected: "string",
                actual: other.type_name(),
            }),
        }
    }

    /// A required value of any shape, null included
    pub fn value(&self, field: &'static str) -> Result<&'a Value, ArgError> {
        self.args.get(field).ok_or(ArgError::Missing(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &[ArgInfo] = &[
        ArgInfo::required("var", "Variable name"),
        ArgInfo::required("value", "Value"),
        ArgInfo::optional("key", "Cache key"),
    ];

    fn args(pairs: &[(&str, Value)]) -> CallArgs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_reads_declared_arguments() {
        let call = args(&[("var", "x".into()), ("value", Value::Int(5))]);
        let reader = ArgReader::new(&call, SPEC).unwrap();

        assert_eq!(reader.string("var").unwrap(), "x");
        assert_eq!(reader.value("value").unwrap(), &Value::Int(5));
        assert_eq!(reader.optional_string("key").unwrap(), None);
    }

    #[test]
    fn test_missing_required() {
        let call = args(&[("value", Value::Null)]);
        let reader = ArgReader::new(&call, SPEC).unwrap();

        assert_eq!(reader.string("var"), Err(ArgError::Missing("var")));
        assert_eq!(reader.value("value").unwrap(), &Value::Null);
    }

    #[test]
    fn test_null_string_is_missing() {
        let call = args(&[("var", Value::Null)]);
        let reader = ArgReader::new(&call, SPEC).unwrap();

        assert_eq!(reader.string("var"), Err(ArgError::Missing("var")));
    }

    #[test]
    fn test_wrong_type() {
        let call = args(&[("var", Value::Int(1)), ("key", Value::Bool(true))]);
        let reader = ArgReader::new(&call, SPEC).unwrap();

        assert_eq!(
            reader.string("var"),
            Err(ArgError::WrongType {
                field: "var",
                expected: "string",
                actual: "int",
            })
        );
        assert!(reader.optional_string("key").is_err());
    }

    #[test]
    fn test_unexpected_argument() {
        let call = args(&[("var", "x".into()), ("bogus", Value::Null)]);

        assert!(matches!(
            ArgReader::new(&call, SPEC),
            Err(ArgError::Unexpected(name)) if name == "bogus"
        ));
    }
}
