//! GBNF grammars for constrained generation
//!
//! A [`Grammar`] is GBNF source text, the dialect llama.cpp accepts, with a
//! mandatory `root` rule. It is built either from grammar text found on disk or
//! by converting a JSON Schema document:
//!
//! ```rust
//! use ggrama_core::grammar::Grammar;
//! use serde_json::json;
//!
//! let grammar = Grammar::from_json_schema(&json!({
//!     "type": "object",
//!     "properties": { "answer": { "type": "string" } },
//!     "required": ["answer"]
//! }))?;
//! assert!(grammar.as_str().starts_with("root ::= "));
//! # Ok::<(), ggrama_core::grammar::GrammarError>(())
//! ```

mod json_schema;

use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::resources::ResolvedSchema;

/// Name of the rule generation starts from
pub const ROOT_RULE: &str = "root";

/// The schema could not be turned into a grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("grammar is empty")]
    Empty,

    #[error("line {line}: expected `name ::= ...`, found `{text}`")]
    MalformedRule { line: usize, text: String },

    #[error("rule '{0}' is defined more than once")]
    DuplicateRule(String),

    #[error("grammar has no 'root' rule")]
    MissingRoot,

    #[error("unsupported JSON Schema feature `{feature}` at {at}")]
    Unsupported { at: String, feature: String },

    #[error("invalid JSON Schema at {at}: {message}")]
    InvalidSchema { at: String, message: String },
}

/// Compiled GBNF constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    source: String,
    rules: Vec<String>,
}

impl Grammar {
    /// Validate GBNF text.
    ///
    /// Checks rule heads and rule names only; rule bodies are left to the runtime.
    pub fn from_gbnf(text: impl Into<String>) -> Result<Self, GrammarError> {
        let source = text.into();
        let rules = rule_names(&source)?;

        if rules.is_empty() {
            return Err(GrammarError::Empty);
        }
        if !rules.iter().any(|rule| rule == ROOT_RULE) {
            return Err(GrammarError::MissingRoot);
        }

        Ok(Self { source, rules })
    }

    /// Convert a JSON Schema document into a grammar producing matching JSON.
    pub fn from_json_schema(schema: &Value) -> Result<Self, GrammarError> {
        let source = json_schema::to_gbnf(schema)?;
        debug!("Converted JSON Schema to grammar:\n{}", source);
        Self::from_gbnf(source)
    }

    /// Compile whichever form the schema was found in.
    pub fn compile(schema: &ResolvedSchema) -> Result<Self, GrammarError> {
        match schema {
            ResolvedSchema::JsonSchema { schema, .. } => Self::from_json_schema(schema),
            ResolvedSchema::Gbnf { text, .. } => Self::from_gbnf(text.as_str()),
        }
    }

    /// GBNF source text
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Rule names in definition order
    pub fn rule_names(&self) -> &[String] {
        &self.rules
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn rule_names(source: &str) -> Result<Vec<String>, GrammarError> {
    let mut names = Vec::new();
    let mut seen = HashSet::new();

    for (index, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match rule_head(trimmed) {
            Some(name) => {
                if !seen.insert(name.to_string()) {
                    return Err(GrammarError::DuplicateRule(name.to_string()));
                }
                names.push(name.to_string());
            }
            // Continuation of the previous rule's body
            None if !names.is_empty() && !looks_like_head(trimmed) => {}
            None => {
                return Err(GrammarError::MalformedRule {
                    line: index + 1,
                    text: trimmed.to_string(),
                })
            }
        }
    }

    Ok(names)
}

/// `name ::= body` yields `name`
fn rule_head(line: &str) -> Option<&str> {
    let (head, _) = line.split_once("::=")?;
    let name = head.trim();
    (!name.is_empty() && name.chars().all(is_rule_char)).then_some(name)
}

/// A `::=` outside any literal marks an attempted rule head
fn looks_like_head(line: &str) -> bool {
    line.split_once("::=")
        .is_some_and(|(head, _)| !head.contains(['"', '[', '(']))
}

fn is_rule_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
