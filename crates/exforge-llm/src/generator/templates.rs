//! Prompt templates for extractor synthesis

/// System message shared by all synthesis calls
pub const SYSTEM_MESSAGE: &str = "You are an expert data engineer who writes small, well documented data extractors in the exforge extractor language. You answer with YAML only.";

/// Reference for the extractor language, embedded in every specification
pub const DSL_REFERENCE: &str = r#"Extractor language:
```yaml
extractor:
  name: <snake_case_name>
  version: 1.0.0
  description: <what the extractor produces>
  imports: [text, coerce, value]   # modules whose functions are called
operations:
  - name: extract
    visibility: public
    description: <entry point description>
    params:
      - name: input
        type: record
    returns: record
    steps:
      - set: <output.path>           # copy a field
        from: input.<path>
      - set: <output.path>           # literal value
        value: <literal>
      - set: <output.path>           # built-in function
        call: <module.function>
        args: [input.<path>, "<literal>"]
      - if:                          # exists | missing | equals | not_equals | all | any
          exists: input.<path>
        then: [<steps>]
        else: [<steps>]
      - for_each: input.<list>       # map a list
        as: item
        into: <output.path>
        steps: [<steps using item.<path>>]
      - invoke: <helper_operation>   # private helper, result stored at `into`
        args: [input]
        into: <output.path>
```
Arguments that start with a parameter or loop variable name are paths; other strings are literals."#;

/// Prompt for the planning call
pub const PLAN_PROMPT: &str = r#"{specification}

Task:
Plan how each target field will be produced before any code is written.

Requirements:
1. Answer with ONLY YAML, no explanations
2. The YAML must start with "plan:" at the beginning
3. List every target schema field exactly once under `fields`
4. For each field give the source path(s) and the approach (copy, transform, constant, derived)

Format:
```yaml
plan:
  fields:
    - target: <target path>
      sources: [<input path>]
      approach: <copy|transform|constant|derived>
      function: <module.function or omit>
  notes: <edge cases worth handling>
```

Generate the plan now:
"#;

/// Prompt for an implementation attempt
pub const IMPLEMENT_PROMPT: &str = r#"{specification}

Approved plan:
```yaml
{plan}
```
{feedback}
Task:
Implement the extractor described by the plan.

Requirements:
1. Answer with ONLY YAML, no explanations
2. The YAML must start with "extractor:" at the beginning
3. Follow the entry contract and constraints exactly
4. Declare every function module you call in `imports`

Generate the extractor now:
"#;

/// Inserted into the implementation prompt when retrying
pub const RETRY_FEEDBACK: &str = r#"
The previous attempt (#{attempt}) was rejected by validation:
{violations}
Fix every error listed above.
"#;
