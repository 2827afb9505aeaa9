//! Extractor parser
//!
//! Parses YAML extractor documents into `ExtractorDocument` AST nodes.
//!
//! ```yaml
//! extractor:
//!   name: person
//!   version: 1.0.0
//!   description: Builds a person record
//!   imports: [text]
//! operations:
//!   - name: extract
//!     visibility: public
//!     description: Entry point
//!     params:
//!       - name: input
//!         type: record
//!     returns: record
//!     steps:
//!       - set: fullName
//!         call: text.join
//!         args: [" ", input.first, input.last]
//! ```
//!
//! String arguments whose first segment names a bound variable (an operation
//! parameter or a `for_each` binding) are paths; any other string is a literal.

use crate::error::{ParseError, Result};
use crate::path::FieldPath;
use crate::yaml_parser::YamlParser;
use exforge_core::ast::{
    Condition, ExtractorDocument, ExtractorMetadata, Operation, Param, Step, ValueExpr,
    Visibility,
};
use serde_yaml::Value as YamlValue;

const STEP_KEYWORDS: [&str; 4] = ["set", "if", "for_each", "invoke"];
const CONDITION_KEYWORDS: [&str; 6] = ["exists", "missing", "equals", "not_equals", "all", "any"];

/// Extractor document parser
pub struct ExtractorParser;

/// Names bound at the current point of an operation body
struct Scope {
    frames: Vec<Vec<String>>,
}

impl Scope {
    fn new(params: &[Param]) -> Self {
        Scope {
            frames: vec![params.iter().map(|p| p.name.clone()).collect()],
        }
    }

    fn is_bound(&self, name: &str) -> bool {
        self.frames.iter().any(|f| f.iter().any(|n| n == name))
    }

    fn push(&mut self, name: String) {
        self.frames.push(vec![name]);
    }

    fn pop(&mut self) {
        self.frames.pop();
    }
}

impl ExtractorParser {
    /// Parse an extractor document from a YAML string
    pub fn parse(yaml_str: &str) -> Result<ExtractorDocument> {
        let yaml = YamlParser::parse(yaml_str)?;
        Self::parse_from_yaml(&yaml)
    }

    /// Parse an extractor document from a YAML value
    pub fn parse_from_yaml(yaml: &YamlValue) -> Result<ExtractorDocument> {
        if !yaml.is_mapping() {
            return Err(ParseError::InvalidValue {
                field: "<root>".to_string(),
                message: "document must be a mapping".to_string(),
            });
        }

        let header = yaml.get("extractor").ok_or_else(|| ParseError::MissingField {
            field: "extractor".to_string(),
        })?;
        let metadata = Self::parse_metadata(header)?;

        let ops_yaml = YamlParser::get_array(yaml, "operations", "")?;
        let operations = ops_yaml
            .iter()
            .enumerate()
            .map(|(idx, op)| Self::parse_operation(op, &format!("operations[{}]", idx)))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "parsed extractor '{}' with {} operations",
            metadata.name,
            operations.len()
        );

        Ok(ExtractorDocument {
            metadata,
            operations,
        })
    }

    fn parse_metadata(header: &YamlValue) -> Result<ExtractorMetadata> {
        let name = YamlParser::get_string(header, "name", "extractor")?;
        // versions written as bare numbers (1.0) arrive as YAML floats
        let version = match header.get("version") {
            None | Some(YamlValue::Null) => None,
            Some(YamlValue::String(s)) => Some(s.clone()),
            Some(YamlValue::Number(n)) => Some(n.to_string()),
            Some(_) => {
                return Err(ParseError::InvalidValue {
                    field: "extractor.version".to_string(),
                    message: "expected a version string".to_string(),
                })
            }
        };
        Ok(ExtractorMetadata {
            name,
            version,
            description: YamlParser::get_optional_string(header, "description"),
            imports: YamlParser::get_string_list(header, "imports", "extractor")?,
        })
    }

    fn parse_operation(op: &YamlValue, ctx: &str) -> Result<Operation> {
        let name = YamlParser::get_string(op, "name", ctx)?;

        let visibility = match YamlParser::get_optional_string(op, "visibility").as_deref() {
            None | Some("private") => Visibility::Private,
            Some("public") => Visibility::Public,
            Some(other) => {
                return Err(ParseError::InvalidValue {
                    field: format!("{}.visibility", ctx),
                    message: format!("expected 'public' or 'private', got '{}'", other),
                })
            }
        };

        let mut params = Vec::new();
        if let Some(items) = YamlParser::get_optional_array(op, "params", ctx)? {
            for (idx, item) in items.iter().enumerate() {
                let pctx = format!("{}.params[{}]", ctx, idx);
                let param = match item {
                    YamlValue::String(s) => Param {
                        name: s.clone(),
                        param_type: None,
                    },
                    _ => Param {
                        name: YamlParser::get_string(item, "name", &pctx)?,
                        param_type: YamlParser::get_optional_string(item, "type"),
                    },
                };
                if params.iter().any(|p: &Param| p.name == param.name) {
                    return Err(ParseError::InvalidValue {
                        field: pctx,
                        message: format!("duplicate parameter '{}'", param.name),
                    });
                }
                params.push(param);
            }
        }

        let mut scope = Scope::new(&params);
        let steps_yaml = YamlParser::get_array(op, "steps", ctx)?;
        let steps = Self::parse_steps(steps_yaml, &format!("{}.steps", ctx), &mut scope)?;

        Ok(Operation {
            name,
            visibility,
            description: YamlParser::get_optional_string(op, "description"),
            params,
            returns: YamlParser::get_optional_string(op, "returns"),
            steps,
        })
    }

    fn parse_steps(items: &[YamlValue], ctx: &str, scope: &mut Scope) -> Result<Vec<Step>> {
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| Self::parse_step(item, &format!("{}[{}]", ctx, idx), scope))
            .collect()
    }

    fn parse_step(item: &YamlValue, ctx: &str, scope: &mut Scope) -> Result<Step> {
        let keys = YamlParser::get_keys(item);
        let found: Vec<&str> = STEP_KEYWORDS
            .iter()
            .copied()
            .filter(|k| keys.iter().any(|key| key == k))
            .collect();

        match found.as_slice() {
            ["set"] => Self::parse_set(item, ctx, scope),
            ["if"] => Self::parse_if(item, ctx, scope),
            ["for_each"] => Self::parse_for_each(item, ctx, scope),
            ["invoke"] => Self::parse_invoke(item, ctx, scope),
            [] => Err(ParseError::UnknownKeyword {
                field: ctx.to_string(),
                keyword: keys.first().cloned().unwrap_or_else(|| "<empty>".to_string()),
            }),
            many => Err(ParseError::InvalidValue {
                field: ctx.to_string(),
                message: format!("step combines keywords {:?}", many),
            }),
        }
    }

    fn parse_set(item: &YamlValue, ctx: &str, scope: &Scope) -> Result<Step> {
        let target = YamlParser::get_string(item, "set", ctx)?;
        FieldPath::parse(&target)?;

        let sources: Vec<&str> = ["from", "value", "call"]
            .into_iter()
            .filter(|k| YamlParser::has_field(item, k))
            .collect();

        let value = match sources.as_slice() {
            ["from"] => {
                let path = YamlParser::get_string(item, "from", ctx)?;
                ValueExpr::Path(Self::bound_path(&path, &format!("{}.from", ctx), scope)?)
            }
            ["value"] => {
                let raw = item.get("value").unwrap_or(&YamlValue::Null);
                ValueExpr::Literal(YamlParser::to_json(raw, &format!("{}.value", ctx))?)
            }
            ["call"] => Self::parse_call(item, ctx, scope)?,
            [] => {
                return Err(ParseError::MissingField {
                    field: format!("{}.from|value|call", ctx),
                })
            }
            _ => {
                return Err(ParseError::InvalidValue {
                    field: ctx.to_string(),
                    message: "set takes exactly one of from, value or call".to_string(),
                })
            }
        };

        Ok(Step::Set { target, value })
    }

    fn parse_if(item: &YamlValue, ctx: &str, scope: &mut Scope) -> Result<Step> {
        let cond_yaml = item.get("if").unwrap_or(&YamlValue::Null);
        let condition = Self::parse_condition(cond_yaml, &format!("{}.if", ctx), scope)?;

        let then_yaml = YamlParser::get_array(item, "then", ctx)?;
        let then = Self::parse_steps(then_yaml, &format!("{}.then", ctx), scope)?;

        let otherwise = match YamlParser::get_optional_array(item, "else", ctx)? {
            Some(items) => Self::parse_steps(items, &format!("{}.else", ctx), scope)?,
            None => Vec::new(),
        };

        Ok(Step::If {
            condition,
            then,
            otherwise,
        })
    }

    fn parse_for_each(item: &YamlValue, ctx: &str, scope: &mut Scope) -> Result<Step> {
        let source = YamlParser::get_string(item, "for_each", ctx)?;
        let source = Self::bound_path(&source, &format!("{}.for_each", ctx), scope)?;

        let binding = YamlParser::get_string(item, "as", ctx)?;
        let binding_path = FieldPath::parse(&binding)?;
        if binding_path.depth() != 1 {
            return Err(ParseError::InvalidValue {
                field: format!("{}.as", ctx),
                message: "loop binding must be a plain name".to_string(),
            });
        }

        let into = YamlParser::get_string(item, "into", ctx)?;
        FieldPath::parse(&into)?;

        let steps_yaml = YamlParser::get_array(item, "steps", ctx)?;
        scope.push(binding.clone());
        let steps = Self::parse_steps(steps_yaml, &format!("{}.steps", ctx), scope);
        scope.pop();

        Ok(Step::ForEach {
            source,
            binding,
            into,
            steps: steps?,
        })
    }

    fn parse_invoke(item: &YamlValue, ctx: &str, scope: &Scope) -> Result<Step> {
        let operation = YamlParser::get_string(item, "invoke", ctx)?;
        let args = Self::parse_args(item, ctx, scope)?;
        let into = YamlParser::get_optional_string(item, "into");
        if let Some(into) = &into {
            FieldPath::parse(into)?;
        }
        Ok(Step::Invoke {
            operation,
            args,
            into,
        })
    }

    fn parse_call(item: &YamlValue, ctx: &str, scope: &Scope) -> Result<ValueExpr> {
        let function = YamlParser::get_string(item, "call", ctx)?;
        let args = Self::parse_args(item, ctx, scope)?;
        Ok(ValueExpr::Call { function, args })
    }

    fn parse_args(item: &YamlValue, ctx: &str, scope: &Scope) -> Result<Vec<ValueExpr>> {
        match YamlParser::get_optional_array(item, "args", ctx)? {
            Some(items) => items
                .iter()
                .enumerate()
                .map(|(idx, arg)| {
                    Self::parse_value(arg, &format!("{}.args[{}]", ctx, idx), scope)
                })
                .collect(),
            None => Ok(Vec::new()),
        }
    }

    /// Parse an argument or comparison operand
    fn parse_value(value: &YamlValue, ctx: &str, scope: &Scope) -> Result<ValueExpr> {
        match value {
            YamlValue::String(s) if Self::is_bound_path(s, scope) => Ok(ValueExpr::Path(s.clone())),
            YamlValue::Mapping(_) if YamlParser::has_field(value, "call") => {
                Self::parse_call(value, ctx, scope)
            }
            other => Ok(ValueExpr::Literal(YamlParser::to_json(other, ctx)?)),
        }
    }

    fn parse_condition(cond: &YamlValue, ctx: &str, scope: &Scope) -> Result<Condition> {
        let keys = YamlParser::get_keys(cond);
        let keyword = match keys.as_slice() {
            [single] => single.as_str(),
            [] => {
                return Err(ParseError::MissingField {
                    field: ctx.to_string(),
                })
            }
            _ => {
                return Err(ParseError::InvalidValue {
                    field: ctx.to_string(),
                    message: "condition must have exactly one keyword".to_string(),
                })
            }
        };

        if !CONDITION_KEYWORDS.contains(&keyword) {
            return Err(ParseError::UnknownKeyword {
                field: ctx.to_string(),
                keyword: keyword.to_string(),
            });
        }

        let body = cond.get(keyword).unwrap_or(&YamlValue::Null);
        let body_ctx = format!("{}.{}", ctx, keyword);

        match keyword {
            "exists" | "missing" => {
                let path = body.as_str().ok_or_else(|| ParseError::InvalidValue {
                    field: body_ctx.clone(),
                    message: "expected a path".to_string(),
                })?;
                let path = Self::bound_path(path, &body_ctx, scope)?;
                Ok(if keyword == "exists" {
                    Condition::Exists(path)
                } else {
                    Condition::Missing(path)
                })
            }
            "equals" | "not_equals" => {
                let pair = body
                    .as_sequence()
                    .filter(|s| s.len() == 2)
                    .ok_or_else(|| ParseError::InvalidValue {
                        field: body_ctx.clone(),
                        message: "expected a list of two operands".to_string(),
                    })?;
                let left = Self::parse_value(&pair[0], &format!("{}[0]", body_ctx), scope)?;
                let right = Self::parse_value(&pair[1], &format!("{}[1]", body_ctx), scope)?;
                Ok(if keyword == "equals" {
                    Condition::Equals(left, right)
                } else {
                    Condition::NotEquals(left, right)
                })
            }
            _ => {
                let items = body.as_sequence().ok_or_else(|| ParseError::InvalidValue {
                    field: body_ctx.clone(),
                    message: "expected a list of conditions".to_string(),
                })?;
                let conditions = items
                    .iter()
                    .enumerate()
                    .map(|(idx, c)| Self::parse_condition(c, &format!("{}[{}]", body_ctx, idx), scope))
                    .collect::<Result<Vec<_>>>()?;
                Ok(if keyword == "all" {
                    Condition::All(conditions)
                } else {
                    Condition::Any(conditions)
                })
            }
        }
    }

    fn is_bound_path(text: &str, scope: &Scope) -> bool {
        FieldPath::parse(text)
            .map(|p| scope.is_bound(p.root()))
            .unwrap_or(false)
    }

    /// Parse a path that must start at a bound name
    fn bound_path(text: &str, ctx: &str, scope: &Scope) -> Result<String> {
        let path = FieldPath::parse(text)?;
        if !scope.is_bound(path.root()) {
            return Err(ParseError::InvalidValue {
                field: ctx.to_string(),
                message: format!("'{}' is not a parameter or loop variable", path.root()),
            });
        }
        Ok(path.to_string())
    }
}
