//! JSON Schema to GBNF conversion
//!
//! Follows the rule layout of llama.cpp's converter: shared primitive rules
//! (`string`, `number`, `value`, ...), one rule per composite sub-schema named
//! after its location (`root-address-city`), and an ordered chain of optional
//! rules for non-required object properties. Keys are emitted in declaration
//! order; optional keys may be skipped but never reordered.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::{GrammarError, ROOT_RULE};

const SPACE_RULE: &str = r#"| " " | "\n" [ \t]{0,20}"#;

/// Keywords whose constraint cannot be expressed, so ignoring them would loosen the grammar
const UNSUPPORTED_KEYWORDS: &[&str] = &["allOf", "not", "pattern", "patternProperties"];

/// Built-in rules: name, body, rules the body references
const PRIMITIVES: &[(&str, &str, &[&str])] = &[
    ("boolean", r#"("true" | "false") space"#, &[]),
    ("decimal-part", "[0-9]{1,16}", &[]),
    ("integral-part", "[0] | [1-9] [0-9]{0,15}", &[]),
    (
        "number",
        r#"("-"? integral-part) ("." decimal-part)? ([eE] [-+]? integral-part)? space"#,
        &["integral-part", "decimal-part"],
    ),
    ("integer", r#"("-"? integral-part) space"#, &["integral-part"]),
    (
        "value",
        "object | array | string | number | boolean | null",
        &["object", "array", "string", "number", "boolean", "null"],
    ),
    (
        "object",
        r#""{" space ( string ":" space value ("," space string ":" space value)* )? "}" space"#,
        &["string", "value"],
    ),
    (
        "array",
        r#""[" space ( value ("," space value)* )? "]" space"#,
        &["value"],
    ),
    (
        "char",
        r#"[^"\\\x7F\x00-\x1F] | [\\] (["\\bfnrt] | "u" [0-9a-fA-F]{4})"#,
        &[],
    ),
    ("string", r#""\"" char* "\"" space"#, &["char"]),
    ("null", r#""null" space"#, &[]),
];

/// Convert a schema document to GBNF text with `root` as the first rule.
pub(super) fn to_gbnf(schema: &Value) -> Result<String, GrammarError> {
    let mut converter = Converter::new(schema);
    let root = converter.visit(schema, ROOT_RULE)?;
    if root != ROOT_RULE {
        converter.rules.insert(ROOT_RULE.to_string(), root);
    }
    Ok(converter.render())
}

struct Converter<'a> {
    document: &'a Value,
    rules: BTreeMap<String, String>,
    /// `$ref` pointer to the rule defined for it
    refs: HashMap<String, String>,
}

impl<'a> Converter<'a> {
    fn new(document: &'a Value) -> Self {
        let mut rules = BTreeMap::new();
        rules.insert("space".to_string(), SPACE_RULE.to_string());
        Self {
            document,
            rules,
            refs: HashMap::new(),
        }
    }

    fn render(&self) -> String {
        let mut out = String::new();
        if let Some(body) = self.rules.get(ROOT_RULE) {
            out.push_str(&format!("{ROOT_RULE} ::= {body}\n"));
        }
        for (name, body) in self.rules.iter().filter(|(name, _)| *name != ROOT_RULE) {
            out.push_str(&format!("{name} ::= {body}\n"));
        }
        out
    }

    /// Define `name`, or reuse it when an identical rule already exists.
    /// A clashing name gets a numeric suffix.
    fn add_rule(&mut self, name: &str, body: String) -> String {
        let base = sanitize(name);
        let mut candidate = base.clone();
        let mut suffix = 0;
        loop {
            match self.rules.get(&candidate) {
                None => {
                    self.rules.insert(candidate.clone(), body);
                    return candidate;
                }
                Some(existing) if *existing == body => return candidate,
                Some(_) => {
                    suffix += 1;
                    candidate = format!("{base}-{suffix}");
                }
            }
        }
    }

    /// Claim an unused name to be defined later
    fn reserve(&mut self, name: &str) -> String {
        let base = sanitize(name);
        let mut candidate = base.clone();
        let mut suffix = 0;
        while self.rules.contains_key(&candidate) {
            suffix += 1;
            candidate = format!("{base}-{suffix}");
        }
        self.rules.insert(candidate.clone(), String::new());
        candidate
    }

    fn primitive(&mut self, name: &str) -> String {
        if let Some((_, body, deps)) = PRIMITIVES.iter().find(|(n, _, _)| *n == name) {
            if !self.rules.contains_key(name) {
                self.rules.insert(name.to_string(), body.to_string());
                for dep in *deps {
                    self.primitive(dep);
                }
            }
        }
        name.to_string()
    }

    /// Returns the rule that matches `schema`, defining `name` when a new rule is needed.
    fn visit(&mut self, schema: &Value, name: &str) -> Result<String, GrammarError> {
        let map = match schema {
            Value::Bool(true) => return Ok(self.primitive("value")),
            Value::Bool(false) => return Err(invalid(name, "schema `false` matches nothing")),
            Value::Object(map) => map,
            _ => return Err(invalid(name, "expected an object or boolean schema")),
        };

        if let Some(keyword) = UNSUPPORTED_KEYWORDS.iter().find(|k| map.contains_key(**k)) {
            return Err(GrammarError::Unsupported {
                at: name.to_string(),
                feature: keyword.to_string(),
            });
        }

        if let Some(reference) = map.get("$ref") {
            return self.visit_ref(reference, name);
        }
        if let Some(value) = map.get("const") {
            return Ok(self.add_rule(name, format!("{} space", json_literal(value))));
        }
        if let Some(values) = map.get("enum") {
            return self.visit_enum(values, name);
        }
        if let Some(variants) = map.get("anyOf").or_else(|| map.get("oneOf")) {
            let Value::Array(variants) = variants else {
                return Err(invalid(name, "`anyOf`/`oneOf` must be a list"));
            };
            return self.visit_union(variants, name);
        }

        match map.get("type") {
            Some(Value::String(kind)) => self.visit_typed(kind, map, name),
            Some(Value::Array(kinds)) => {
                let variants: Vec<Value> = kinds
                    .iter()
                    .map(|kind| {
                        let mut variant = map.clone();
                        variant.insert("type".to_string(), kind.clone());
                        Value::Object(variant)
                    })
                    .collect();
                self.visit_union(&variants, name)
            }
            Some(_) => Err(invalid(name, "`type` must be a string or a list of strings")),
            None if map.contains_key("properties") || map.contains_key("additionalProperties") => {
                self.visit_object(map, name)
            }
            None if map.contains_key("items") || map.contains_key("prefixItems") => {
                self.visit_array(map, name)
            }
            None => Ok(self.primitive("value")),
        }
    }

    fn visit_typed(
        &mut self,
        kind: &str,
        map: &Map<String, Value>,
        name: &str,
    ) -> Result<String, GrammarError> {
        match kind {
            "object" => self.visit_object(map, name),
            "array" => self.visit_array(map, name),
            "string" => self.visit_string(map, name),
            "number" | "integer" | "boolean" | "null" => Ok(self.primitive(kind)),
            other => Err(invalid(name, format!("unknown type `{other}`"))),
        }
    }

    fn visit_ref(&mut self, reference: &Value, name: &str) -> Result<String, GrammarError> {
        let pointer = reference
            .as_str()
            .ok_or_else(|| invalid(name, "`$ref` must be a string"))?;
        let Some(fragment) = pointer.strip_prefix('#') else {
            return Err(GrammarError::Unsupported {
                at: name.to_string(),
                feature: format!("$ref {pointer}"),
            });
        };
        if let Some(rule) = self.refs.get(pointer) {
            return Ok(rule.clone());
        }

        let document = self.document;
        let target = document
            .pointer(fragment)
            .ok_or_else(|| invalid(name, format!("unresolved $ref {pointer}")))?;
        let label = fragment
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or("ref");

        // Reserved before visiting so recursive references resolve to it.
        let rule = self.reserve(&format!("def-{label}"));
        self.refs.insert(pointer.to_string(), rule.clone());
        let body = self.visit(target, &rule)?;
        self.rules.insert(rule.clone(), body);
        Ok(rule)
    }

    fn visit_enum(&mut self, values: &Value, name: &str) -> Result<String, GrammarError> {
        let values = match values {
            Value::Array(values) if !values.is_empty() => values,
            _ => return Err(invalid(name, "`enum` must be a non-empty list")),
        };
        let alternatives: Vec<String> = values.iter().map(json_literal).collect();
        Ok(self.add_rule(name, format!("({}) space", alternatives.join(" | "))))
    }

    fn visit_union(&mut self, variants: &[Value], name: &str) -> Result<String, GrammarError> {
        if variants.is_empty() {
            return Err(invalid(name, "no alternatives given"));
        }
        let mut alternatives = Vec::with_capacity(variants.len());
        for (i, variant) in variants.iter().enumerate() {
            alternatives.push(self.visit(variant, &format!("{name}-{i}"))?);
        }
        Ok(self.add_rule(name, alternatives.join(" | ")))
    }

    fn visit_string(&mut self, map: &Map<String, Value>, name: &str) -> Result<String, GrammarError> {
        let min = count_keyword(map, "minLength", name)?.unwrap_or(0);
        let max = count_keyword(map, "maxLength", name)?;
        if min == 0 && max.is_none() {
            return Ok(self.primitive("string"));
        }
        check_bounds(min, max, name)?;

        let ch = self.primitive("char");
        let body = sequence(&[r#""\"""#, repeat(&ch, min, max).as_str(), r#""\"" space"#]);
        Ok(self.add_rule(name, body))
    }

    fn visit_array(&mut self, map: &Map<String, Value>, name: &str) -> Result<String, GrammarError> {
        let tuple = map
            .get("prefixItems")
            .or_else(|| map.get("items").filter(|items| items.is_array()));
        if let Some(tuple) = tuple {
            let Value::Array(items) = tuple else {
                return Err(invalid(name, "`prefixItems` must be a list"));
            };
            let mut elements = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                elements.push(self.visit(item, &format!("{name}-tuple-{i}"))?);
            }
            let body = sequence(&[
                r#""[" space"#,
                elements.join(r#" "," space "#).as_str(),
                r#""]" space"#,
            ]);
            return Ok(self.add_rule(name, body));
        }

        let item = match map.get("items") {
            Some(items) => self.visit(items, &format!("{name}-item"))?,
            None => self.primitive("value"),
        };
        let min = count_keyword(map, "minItems", name)?.unwrap_or(0);
        let max = count_keyword(map, "maxItems", name)?;
        check_bounds(min, max, name)?;

        let rest = format!(r#"( "," space {item} )"#);
        let list = match (min, max) {
            (_, Some(0)) => String::new(),
            (0, _) => format!(
                "( {} )?",
                sequence(&[item.as_str(), repeat(&rest, 0, max.map(|m| m - 1)).as_str()])
            ),
            (min, _) => sequence(&[item.as_str(), repeat(&rest, min - 1, max.map(|m| m - 1)).as_str()]),
        };
        let body = sequence(&[r#""[" space"#, list.as_str(), r#""]" space"#]);
        Ok(self.add_rule(name, body))
    }

    fn visit_object(&mut self, map: &Map<String, Value>, name: &str) -> Result<String, GrammarError> {
        let required_names: Vec<&str> = match map.get("required") {
            None => Vec::new(),
            Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
            Some(_) => return Err(invalid(name, "`required` must be a list")),
        };
        let required: HashSet<&str> = required_names.iter().copied().collect();

        let mut required_kvs = Vec::new();
        let mut optional_kvs = Vec::new();

        match map.get("properties") {
            None => {}
            Some(Value::Object(properties)) => {
                for (property, schema) in properties {
                    let property_rule = format!("{name}-{property}");
                    let value = self.visit(schema, &property_rule)?;
                    let key = json_literal(&Value::String(property.clone()));
                    let kv = self.add_rule(
                        &format!("{property_rule}-kv"),
                        format!(r#"{key} space ":" space {value}"#),
                    );
                    if required.contains(property.as_str()) {
                        required_kvs.push(kv);
                    } else {
                        optional_kvs.push(kv);
                    }
                }
            }
            Some(_) => return Err(invalid(name, "`properties` must be an object")),
        }

        // Required keys without a `properties` entry take the additional-properties schema.
        let declared = map.get("properties").and_then(Value::as_object);
        for property in required_names {
            if declared.is_some_and(|properties| properties.contains_key(property)) {
                continue;
            }
            let property_rule = format!("{name}-{property}");
            let value = match map.get("additionalProperties") {
                Some(Value::Bool(false)) => {
                    return Err(invalid(
                        name,
                        format!("required key `{property}` is excluded by `additionalProperties: false`"),
                    ))
                }
                None | Some(Value::Bool(true)) => self.primitive("value"),
                Some(schema) => self.visit(schema, &property_rule)?,
            };
            let key = json_literal(&Value::String(property.to_string()));
            required_kvs.push(self.add_rule(
                &format!("{property_rule}-kv"),
                format!(r#"{key} space ":" space {value}"#),
            ));
        }

        match map.get("additionalProperties") {
            None | Some(Value::Bool(false)) => {}
            Some(extra) => {
                let value = match extra {
                    Value::Bool(true) => self.primitive("value"),
                    schema => self.visit(schema, &format!("{name}-additional-value"))?,
                };
                let key = self.primitive("string");
                let kv = self.add_rule(
                    &format!("{name}-additional-kv"),
                    format!(r#"{key} ":" space {value}"#),
                );
                let kvs = self.add_rule(
                    &format!("{name}-additional-kvs"),
                    format!(r#"{kv} ( "," space {kv} )*"#),
                );
                optional_kvs.push(kvs);
            }
        }

        let mut parts = vec![r#""{" space"#.to_string()];
        if !required_kvs.is_empty() {
            parts.push(required_kvs.join(r#" "," space "#));
        }
        if !optional_kvs.is_empty() {
            let chain = self.optional_chain(name, &optional_kvs);
            parts.push(if required_kvs.is_empty() {
                format!("( {chain} )?")
            } else {
                format!(r#"( "," space ( {chain} ) )?"#)
            });
        }
        parts.push(r#""}" space"#.to_string());

        Ok(self.add_rule(name, parts.join(" ")))
    }

    /// Any non-empty ordered subset of `kvs`, comma separated.
    ///
    /// Alternative `i` starts with `kvs[i]`; the tail rule `{name}-opt-{j}`
    /// matches an ordered subset of `kvs[j..]`, each entry preceded by a comma.
    fn optional_chain(&mut self, name: &str, kvs: &[String]) -> String {
        let mut alternatives = Vec::with_capacity(kvs.len());
        let mut tail: Option<String> = None;

        for (j, kv) in kvs.iter().enumerate().rev() {
            let head = match &tail {
                Some(tail) => format!("{kv} {tail}"),
                None => kv.clone(),
            };
            alternatives.push(head);

            if j > 0 {
                let body = match &tail {
                    Some(tail) => format!(r#"( "," space {kv} )? {tail}"#),
                    None => format!(r#"( "," space {kv} )?"#),
                };
                tail = Some(self.add_rule(&format!("{name}-opt-{j}"), body));
            }
        }

        alternatives.reverse();
        alternatives.join(" | ")
    }
}

fn invalid(at: &str, message: impl Into<String>) -> GrammarError {
    GrammarError::InvalidSchema {
        at: at.to_string(),
        message: message.into(),
    }
}

fn count_keyword(
    map: &Map<String, Value>,
    keyword: &str,
    at: &str,
) -> Result<Option<usize>, GrammarError> {
    match map.get(keyword) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| invalid(at, format!("`{keyword}` must be a non-negative integer"))),
    }
}

fn check_bounds(min: usize, max: Option<usize>, at: &str) -> Result<(), GrammarError> {
    match max {
        Some(max) if max < min => Err(invalid(at, format!("minimum {min} exceeds maximum {max}"))),
        _ => Ok(()),
    }
}

/// `item` repeated between `min` and `max` times, empty when `max` is zero
fn repeat(item: &str, min: usize, max: Option<usize>) -> String {
    match (min, max) {
        (_, Some(0)) => String::new(),
        (0, Some(1)) => format!("{item}?"),
        (0, None) => format!("{item}*"),
        (1, None) => format!("{item}+"),
        (min, None) => format!("{item}{{{min},}}"),
        (min, Some(max)) if min == max => format!("{item}{{{min}}}"),
        (min, Some(max)) => format!("{item}{{{min},{max}}}"),
    }
}

fn sequence(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// GBNF string literal matching the compact JSON encoding of `value`
fn json_literal(value: &Value) -> String {
    let json = value.to_string();
    let mut out = String::with_capacity(json.len() + 2);
    out.push('"');
    for c in json.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Rule names may only hold ASCII letters, digits and dashes
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules(schema: Value) -> Vec<String> {
        to_gbnf(&schema).unwrap().lines().map(str::to_string).collect()
    }

    fn has_rule(rules: &[String], rule: &str) -> bool {
        rules.iter().any(|line| line == rule)
    }

    #[test]
    fn required_string_property() {
        let rules = rules(json!({
            "type": "object",
            "properties": { "answer": { "type": "string" } },
            "required": ["answer"]
        }));

        assert_eq!(rules[0], r#"root ::= "{" space root-answer-kv "}" space"#);
        assert!(has_rule(
            &rules,
            r#"root-answer-kv ::= "\"answer\"" space ":" space string"#
        ));
        assert!(has_rule(&rules, r#"string ::= "\"" char* "\"" space"#));
        assert!(rules.iter().any(|line| line.starts_with("char ::= ")));
        assert!(rules.iter().any(|line| line.starts_with("space ::= ")));
    }

    #[test]
    fn required_keys_without_properties_still_appear() {
        let rules = rules(json!({
            "type": "object",
            "required": ["answer"]
        }));

        assert_eq!(rules[0], r#"root ::= "{" space root-answer-kv "}" space"#);
        assert!(has_rule(
            &rules,
            r#"root-answer-kv ::= "\"answer\"" space ":" space value"#
        ));
    }

    #[test]
    fn undeclared_required_keys_use_the_additional_schema() {
        let rules = rules(json!({
            "type": "object",
            "properties": { "id": { "type": "integer" } },
            "required": ["id", "note"],
            "additionalProperties": { "type": "string" }
        }));

        assert!(rules[0].starts_with(r#"root ::= "{" space root-id-kv "," space root-note-kv "#));
        assert!(has_rule(
            &rules,
            r#"root-note-kv ::= "\"note\"" space ":" space string"#
        ));
    }

    #[test]
    fn required_key_excluded_by_additional_properties_is_rejected() {
        let err = to_gbnf(&json!({
            "type": "object",
            "properties": { "id": { "type": "integer" } },
            "required": ["id", "note"],
            "additionalProperties": false
        }))
        .unwrap_err();
        assert!(matches!(err, GrammarError::InvalidSchema { .. }));
    }

    #[test]
    fn optional_properties_form_an_ordered_chain() {
        let rules = rules(json!({
            "type": "object",
            "properties": {
                "id": { "type": "integer" },
                "a": { "type": "boolean" },
                "b": { "type": "null" }
            },
            "required": ["id"]
        }));

        assert_eq!(
            rules[0],
            r#"root ::= "{" space root-id-kv ( "," space ( root-a-kv root-opt-1 | root-b-kv ) )? "}" space"#
        );
        assert!(has_rule(&rules, r#"root-opt-1 ::= ( "," space root-b-kv )?"#));
    }

    #[test]
    fn only_optional_properties() {
        let rules = rules(json!({
            "properties": { "a": { "type": "string" } }
        }));
        assert_eq!(rules[0], r#"root ::= "{" space ( root-a-kv )? "}" space"#);
    }

    #[test]
    fn additional_properties_are_allowed_when_requested() {
        let rules = rules(json!({
            "type": "object",
            "additionalProperties": { "type": "integer" }
        }));
        assert!(has_rule(
            &rules,
            r#"root-additional-kv ::= string ":" space integer"#
        ));
        assert!(has_rule(
            &rules,
            r#"root-additional-kvs ::= root-additional-kv ( "," space root-additional-kv )*"#
        ));
    }

    #[test]
    fn enum_and_const_become_literals() {
        let rules = rules(json!({
            "type": "object",
            "properties": {
                "mood": { "enum": ["happy", "sad", null] },
                "version": { "const": 2 }
            },
            "required": ["mood", "version"]
        }));
        assert!(has_rule(
            &rules,
            r#"root-mood ::= ("\"happy\"" | "\"sad\"" | "null") space"#
        ));
        assert!(has_rule(&rules, r#"root-version ::= "2" space"#));
    }

    #[test]
    fn bounded_arrays() {
        let rules = rules(json!({
            "type": "array",
            "items": { "type": "number" },
            "minItems": 1,
            "maxItems": 3
        }));
        assert_eq!(
            rules[0],
            r#"root ::= "[" space number ( "," space number ){0,2} "]" space"#
        );
    }

    #[test]
    fn unbounded_optional_array() {
        let rules = rules(json!({ "type": "array", "items": { "type": "string" } }));
        assert_eq!(
            rules[0],
            r#"root ::= "[" space ( string ( "," space string )* )? "]" space"#
        );
    }

    #[test]
    fn tuples_use_prefix_items() {
        let rules = rules(json!({
            "type": "array",
            "prefixItems": [{ "type": "string" }, { "type": "integer" }]
        }));
        assert_eq!(
            rules[0],
            r#"root ::= "[" space string "," space integer "]" space"#
        );
    }

    #[test]
    fn string_length_bounds() {
        let rules = rules(json!({ "type": "string", "minLength": 2, "maxLength": 5 }));
        assert_eq!(rules[0], r#"root ::= "\"" char{2,5} "\"" space"#);
    }

    #[test]
    fn type_lists_become_alternatives() {
        let rules = rules(json!({ "type": ["string", "null"] }));
        assert_eq!(rules[0], "root ::= string | null");
    }

    #[test]
    fn primitive_root_is_aliased() {
        let rules = rules(json!({ "type": "integer", "minimum": 0 }));
        assert_eq!(rules[0], "root ::= integer");
    }

    #[test]
    fn recursive_local_refs() {
        let rules = rules(json!({
            "$defs": {
                "node": {
                    "type": "object",
                    "properties": {
                        "value": { "type": "integer" },
                        "next": { "anyOf": [{ "$ref": "#/$defs/node" }, { "type": "null" }] }
                    },
                    "required": ["value"]
                }
            },
            "$ref": "#/$defs/node"
        }));
        assert_eq!(rules[0], "root ::= def-node");
        assert!(has_rule(&rules, "def-node-next ::= def-node | null"));
        assert!(has_rule(&rules, "def-node ::= def-node-1"));
    }

    #[test]
    fn true_schema_matches_any_value() {
        let rules = rules(json!(true));
        assert_eq!(rules[0], "root ::= value");
        assert!(rules.iter().any(|line| line.starts_with("object ::= ")));
    }

    #[test]
    fn loosening_keywords_are_rejected() {
        for schema in [
            json!({ "type": "string", "pattern": "^a+$" }),
            json!({ "allOf": [{ "type": "string" }] }),
            json!({ "$ref": "https://example.com/schema.json" }),
        ] {
            let err = to_gbnf(&schema).unwrap_err();
            assert!(matches!(err, GrammarError::Unsupported { .. }), "{schema}");
        }
    }

    #[test]
    fn invalid_schemas_are_reported() {
        for schema in [
            json!(false),
            json!(42),
            json!({ "type": "strange" }),
            json!({ "enum": [] }),
            json!({ "type": "array", "minItems": 3, "maxItems": 1 }),
            json!({ "$ref": "#/$defs/missing" }),
        ] {
            let err = to_gbnf(&schema).unwrap_err();
            assert!(matches!(err, GrammarError::InvalidSchema { .. }), "{schema}");
        }
    }

    #[test]
    fn property_names_are_sanitized() {
        let rules = rules(json!({
            "properties": { "first name": { "type": "string" } },
            "required": ["first name"]
        }));
        assert!(has_rule(
            &rules,
            r#"root-first-name-kv ::= "\"first name\"" space ":" space string"#
        ));
    }
}
