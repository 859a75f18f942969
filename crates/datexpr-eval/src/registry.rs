//! Expression registry for the date evaluation engine
//!
//! Maps expression names to their implementations and validates call
//! arguments against the declared parameter shapes before dispatch.

use crate::error::{ExprError, ExprResult};
use datexpr_types::{ExprType, ExprValue};
use std::collections::HashMap;
use std::sync::Arc;

/// Type alias for expression implementations
pub type ExprFn = Arc<dyn Fn(&[ExprValue]) -> ExprResult<ExprValue> + Send + Sync>;

/// Expression signature for argument validation
///
/// Each parameter position declares the set of shapes it accepts. Every
/// parameter is trailing-optional: a position the caller leaves out is
/// validated (and later invoked) as `undefined`, so optional positions
/// list [`ExprType::Undefined`] among their shapes.
#[derive(Debug, Clone)]
pub struct ExpressionSignature {
    /// Expression name
    pub name: String,
    /// Accepted shapes per parameter position
    pub params: Vec<Vec<ExprType>>,
}

impl ExpressionSignature {
    /// Create a new expression signature
    pub fn new(name: impl Into<String>, params: Vec<Vec<ExprType>>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Check the arguments against the declared shapes
    pub fn validate(&self, args: &[ExprValue]) -> ExprResult<()> {
        if args.len() > self.params.len() {
            return Err(ExprError::TooManyArguments {
                name: self.name.clone(),
                expected: self.params.len(),
                got: args.len(),
            });
        }
        for (position, accepted) in self.params.iter().enumerate() {
            let arg = args.get(position).unwrap_or(&ExprValue::Null);
            if !accepted.iter().any(|shape| shape.matches(arg)) {
                let expected = accepted
                    .iter()
                    .map(ExprType::as_str)
                    .collect::<Vec<_>>()
                    .join(" | ");
                return Err(ExprError::type_mismatch(expected, arg.type_name()));
            }
        }
        Ok(())
    }
}

/// Registry for date expressions
#[derive(Default)]
pub struct ExpressionRegistry {
    expressions: HashMap<String, (ExpressionSignature, ExprFn)>,
}

impl ExpressionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an expression
    pub fn register(
        &mut self,
        name: impl Into<String>,
        params: Vec<Vec<ExprType>>,
        implementation: ExprFn,
    ) {
        let name = name.into();
        let signature = ExpressionSignature::new(&name, params);
        self.expressions.insert(name, (signature, implementation));
    }

    /// Get an expression implementation
    pub fn get(&self, name: &str) -> Option<&ExprFn> {
        self.expressions.get(name).map(|(_, f)| f)
    }

    /// Get the signature declared for an expression
    pub fn signature(&self, name: &str) -> Option<&ExpressionSignature> {
        self.expressions.get(name).map(|(sig, _)| sig)
    }

    /// Whether an expression is registered
    pub fn contains(&self, name: &str) -> bool {
        self.expressions.contains_key(name)
    }

    /// Registered expression names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.expressions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Validate arguments and invoke an expression. Arguments beyond
    /// those supplied are passed as `undefined`.
    pub fn call(&self, name: &str, args: &[ExprValue]) -> ExprResult<ExprValue> {
        let (signature, implementation) = self
            .expressions
            .get(name)
            .ok_or_else(|| ExprError::unknown_expression(name))?;
        signature.validate(args)?;
        if args.len() < signature.params.len() {
            let mut padded = args.to_vec();
            padded.resize(signature.params.len(), ExprValue::Null);
            implementation(&padded)
        } else {
            implementation(args)
        }
    }
}
