use super::definition::{StepSpec, TypeRef};
use crate::naming;
use std::fmt;

/// The capability a step requires from its service, compared structurally.
///
/// Two steps with equal signatures are served by one generated interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature {
    pub method: String,
    pub input: Option<TypeRef>,
    pub output: Option<TypeRef>,
    pub fallible: bool,
}

impl Signature {
    pub fn of(step: &StepSpec) -> Self {
        Self {
            method: naming::exported(&step.name),
            input: step.input.clone(),
            output: step.output.clone(),
            fallible: step.fallible,
        }
    }

    /// The bare function type a step with this signature has, e.g. `func(a) (b, error)`.
    pub fn func_type(&self) -> String {
        naming::func_type(self.input.as_ref(), self.output.as_ref(), self.fallible)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}){}",
            self.method,
            self.input.as_ref().map(|t| t.expr.as_str()).unwrap_or(""),
            naming::results(self.output.as_ref(), self.fallible)
        )
    }
}
