use std::{collections::HashMap, fmt::Display};

use serde::{Deserialize, Serialize};

use crate::types::DataType;

/// Type variable name -> concrete type, produced by [`FunctionSignature::bind`].
pub type Bindings = HashMap<String, DataType>;

/// One slot in a signature: either a concrete type or a type variable such as `T`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeSignature {
    Concrete(DataType),
    Variable(String),
}

impl TypeSignature {
    pub fn variable(name: &str) -> Self {
        TypeSignature::Variable(name.to_string())
    }

    /// Substitute bindings. `None` when a variable is left unbound.
    pub fn resolve(&self, bindings: &Bindings) -> Option<DataType> {
        match self {
            TypeSignature::Concrete(t) => Some(t.clone()),
            TypeSignature::Variable(v) => bindings.get(v).cloned(),
        }
    }

    fn accept(&self, actual: &DataType, bindings: &mut Bindings) -> bool {
        match self {
            TypeSignature::Concrete(expected) => {
                *actual == DataType::Unknown || expected == actual
            }
            TypeSignature::Variable(v) => {
                if *actual == DataType::Unknown {
                    return true;
                }
                match bindings.get(v) {
                    Some(bound) => bound == actual,
                    None => {
                        bindings.insert(v.clone(), actual.clone());
                        true
                    }
                }
            }
        }
    }
}

impl From<DataType> for TypeSignature {
    fn from(t: DataType) -> Self {
        TypeSignature::Concrete(t)
    }
}

impl Display for TypeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeSignature::Concrete(t) => write!(f, "{t}"),
            TypeSignature::Variable(v) => f.write_str(v),
        }
    }
}

/// One accepted overload of an aggregate function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub type_variables: Vec<String>,
    pub argument_types: Vec<TypeSignature>,
    pub intermediate_type: TypeSignature,
    pub return_type: TypeSignature,
    /// The last argument may repeat.
    pub variable_arity: bool,
}

impl FunctionSignature {
    pub fn builder() -> FunctionSignatureBuilder {
        FunctionSignatureBuilder::default()
    }

    /// Match concrete argument types against this signature.
    ///
    /// A type variable binds on first use and every later use must agree.
    /// `DataType::Unknown` matches any slot. A signature using a variable it
    /// never declared matches nothing.
    pub fn bind(&self, arg_types: &[DataType]) -> Option<Bindings> {
        if !self.variables_declared() {
            return None;
        }
        let declared = self.argument_types.len();
        let arity_ok = if self.variable_arity {
            declared > 0 && arg_types.len() >= declared
        } else {
            arg_types.len() == declared
        };
        if !arity_ok {
            return None;
        }

        let mut bindings = Bindings::new();
        for (i, actual) in arg_types.iter().enumerate() {
            let slot = &self.argument_types[i.min(declared - 1)];
            if !slot.accept(actual, &mut bindings) {
                return None;
            }
        }
        Some(bindings)
    }

    fn variables_declared(&self) -> bool {
        self.argument_types
            .iter()
            .chain([&self.intermediate_type, &self.return_type])
            .all(|slot| match slot {
                TypeSignature::Variable(v) => self.type_variables.contains(v),
                TypeSignature::Concrete(_) => true,
            })
    }

    pub fn resolve_return_type(&self, bindings: &Bindings) -> Option<DataType> {
        self.return_type.resolve(bindings)
    }

    pub fn resolve_intermediate_type(&self, bindings: &Bindings) -> Option<DataType> {
        self.intermediate_type.resolve(bindings)
    }
}

impl Display for FunctionSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let args = self.argument_types.iter().map(|a| a.to_string()).collect::<Vec<_>>();
        let dots = if self.variable_arity { "..." } else { "" };
        write!(f, "({}{dots}) -> {}", args.join(", "), self.return_type)
    }
}

#[derive(Debug, Clone)]
pub struct FunctionSignatureBuilder {
    type_variables: Vec<String>,
    argument_types: Vec<TypeSignature>,
    intermediate_type: Option<TypeSignature>,
    return_type: TypeSignature,
    variable_arity: bool,
}

impl Default for FunctionSignatureBuilder {
    fn default() -> Self {
        Self {
            type_variables: Vec::new(),
            argument_types: Vec::new(),
            intermediate_type: None,
            return_type: TypeSignature::Concrete(DataType::Unknown),
            variable_arity: false,
        }
    }
}

impl FunctionSignatureBuilder {
    pub fn type_variable(mut self, name: &str) -> Self {
        self.type_variables.push(name.to_string());
        self
    }

    pub fn argument(mut self, ty: impl Into<TypeSignature>) -> Self {
        self.argument_types.push(ty.into());
        self
    }

    pub fn intermediate_type(mut self, ty: impl Into<TypeSignature>) -> Self {
        self.intermediate_type = Some(ty.into());
        self
    }

    pub fn return_type(mut self, ty: impl Into<TypeSignature>) -> Self {
        self.return_type = ty.into();
        self
    }

    pub fn variable_arity(mut self) -> Self {
        self.variable_arity = true;
        self
    }

    /// Intermediate type defaults to the return type when not set.
    pub fn build(self) -> FunctionSignature {
        FunctionSignature {
            type_variables: self.type_variables,
            argument_types: self.argument_types,
            intermediate_type: self.intermediate_type.unwrap_or_else(|| self.return_type.clone()),
            return_type: self.return_type,
            variable_arity: self.variable_arity,
        }
    }
}
