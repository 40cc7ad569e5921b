//! Prompt templates
//!
//! A template is plain text with two named placeholders, `{prompt}` and
//! `{input_data}`. Substitution is literal. `{{` and `}}` produce single braces;
//! any other braced text is left as written.

/// Placeholder for the user prompt
pub const PROMPT_PLACEHOLDER: &str = "prompt";
/// Placeholder for the auxiliary input text
pub const INPUT_DATA_PLACEHOLDER: &str = "input_data";

/// Raw prompt template text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Substitute the prompt and input data in a single pass.
    ///
    /// Substituted values are never rescanned, so braces inside them are kept verbatim.
    pub fn render(&self, prompt: &str, input_data: &str) -> String {
        let mut out = String::with_capacity(self.text.len() + prompt.len() + input_data.len());
        let mut rest = self.text.as_str();

        while let Some(pos) = rest.find(['{', '}']) {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if tail.starts_with("{{") || tail.starts_with("}}") {
                out.push_str(&tail[..1]);
                rest = &tail[2..];
                continue;
            }

            if let Some((placeholder, after)) = placeholder_at(tail) {
                match placeholder {
                    PROMPT_PLACEHOLDER => out.push_str(prompt),
                    INPUT_DATA_PLACEHOLDER => out.push_str(input_data),
                    _ => out.push_str(&tail[..tail.len() - after.len()]),
                }
                rest = after;
                continue;
            }

            out.push_str(&tail[..1]);
            rest = &tail[1..];
        }

        out.push_str(rest);
        out
    }
}

impl From<String> for PromptTemplate {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Split `{name}rest` into `name` and `rest`.
fn placeholder_at(tail: &str) -> Option<(&str, &str)> {
    let inner = tail.strip_prefix('{')?;
    let end = inner.find(['{', '}'])?;
    if !inner[end..].starts_with('}') {
        return None;
    }
    Some((&inner[..end], &inner[end + 1..]))
}
