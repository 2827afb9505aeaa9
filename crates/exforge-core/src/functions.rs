//! Built-in function catalogue
//!
//! Functions are namespaced by module (`text.lower`). A document must list a
//! module in its `imports` before calling its functions.

/// Signature information for a built-in function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub min_args: usize,
    /// `None` means variadic
    pub max_args: Option<usize>,
    pub summary: &'static str,
}

pub const BUILTIN_FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        name: "text.lower",
        min_args: 1,
        max_args: Some(1),
        summary: "lowercase a string",
    },
    FunctionSpec {
        name: "text.upper",
        min_args: 1,
        max_args: Some(1),
        summary: "uppercase a string",
    },
    FunctionSpec {
        name: "text.trim",
        min_args: 1,
        max_args: Some(1),
        summary: "strip surrounding whitespace",
    },
    FunctionSpec {
        name: "text.concat",
        min_args: 1,
        max_args: None,
        summary: "concatenate strings without a separator",
    },
    FunctionSpec {
        name: "text.join",
        min_args: 2,
        max_args: None,
        summary: "join strings; the first argument is the separator",
    },
    FunctionSpec {
        name: "coerce.to_integer",
        min_args: 1,
        max_args: Some(1),
        summary: "convert to an integer",
    },
    FunctionSpec {
        name: "coerce.to_float",
        min_args: 1,
        max_args: Some(1),
        summary: "convert to a float",
    },
    FunctionSpec {
        name: "coerce.to_string",
        min_args: 1,
        max_args: Some(1),
        summary: "convert a scalar to a string",
    },
    FunctionSpec {
        name: "coerce.to_boolean",
        min_args: 1,
        max_args: Some(1),
        summary: "convert to a boolean",
    },
    FunctionSpec {
        name: "value.default",
        min_args: 2,
        max_args: Some(2),
        summary: "first argument unless null, otherwise the second",
    },
];

/// Look up a built-in function by fully qualified name
pub fn lookup(name: &str) -> Option<&'static FunctionSpec> {
    BUILTIN_FUNCTIONS.iter().find(|f| f.name == name)
}

/// Module part of a qualified function name (`text` for `text.lower`)
pub fn module_of(name: &str) -> Option<&str> {
    name.split_once('.').map(|(module, _)| module)
}

/// Modules that provide built-in functions, in catalogue order
pub fn builtin_modules() -> Vec<&'static str> {
    let mut modules: Vec<&'static str> = Vec::new();
    for f in BUILTIN_FUNCTIONS {
        if let Some(m) = module_of(f.name) {
            if !modules.contains(&m) {
                modules.push(m);
            }
        }
    }
    modules
}

impl FunctionSpec {
    pub fn accepts_arity(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert!(lookup("text.lower").is_some());
        assert!(lookup("text.nope").is_none());
        assert_eq!(module_of("coerce.to_integer"), Some("coerce"));
        assert_eq!(module_of("eval"), None);
    }

    #[test]
    fn test_builtin_modules() {
        assert_eq!(builtin_modules(), vec!["text", "coerce", "value"]);
    }

    #[test]
    fn test_arity() {
        let join = lookup("text.join").unwrap();
        assert!(!join.accepts_arity(1));
        assert!(join.accepts_arity(5));
        let lower = lookup("text.lower").unwrap();
        assert!(!lower.accepts_arity(2));
    }
}
