use std::collections::HashMap;

pub const SEQUENCE: &str = "SEQUENCE";
pub const SUMMARY_DOCUMENT: &str = "SUMMARY_DOCUMENT";
pub const TIME_START: &str = "TIME_START";
pub const TIME_END: &str = "TIME_END";
pub const EXAMPLE_JSON: &str = "EXAMPLE_JSON";

static DEFAULT_SEGMENT_PROMPT: &str = r#"
  You are a script supervisor. You are given a video and a document describing it.

  CONTEXT:
  {{ SUMMARY_DOCUMENT }}

  TASK:
  Write the script for the part of the video between {{ TIME_START }} and {{ TIME_END }}.
  This is segment number {{ SEQUENCE }}.
  1. Transcribe the dialog, prefixing each line with the speaking character
  2. Describe on-screen action that carries no dialog in brackets
  3. Use the cast list to name characters

  OUTPUT: Return ONLY one JSON object shaped like this example:
  {{ EXAMPLE_JSON }}

  RULES:
  - start and end are HH:MM:SS offsets from the beginning of the video
  - start and end must lie between {{ TIME_START }} and {{ TIME_END }}
  - If nothing happens in this window return {}
"#;

pub type Vocabulary = HashMap<&'static str, String>;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Template {template} references unknown variable {variable}")]
    UnknownVariable { template: String, variable: String },

    #[error("Template {template} has an unterminated placeholder at byte {offset}")]
    Unterminated { template: String, offset: usize },
}

/// Turns a named template plus variables into prompt text.
pub trait PromptRenderer: Send + Sync {
    fn render(&self, template_key: &str, vocabulary: &Vocabulary) -> Result<String, RenderError>;
}

/// Segment prompts keyed by media content type, with a fallback for types
/// that have none of their own.
pub struct TemplateService {
    default_template: String,
    templates: HashMap<String, String>,
}

impl Default for TemplateService {
    fn default() -> Self {
        Self::new(DEFAULT_SEGMENT_PROMPT)
    }
}

impl TemplateService {
    pub fn new(default_template: impl Into<String>) -> Self {
        Self {
            default_template: default_template.into(),
            templates: HashMap::new(),
        }
    }

    pub fn with_template(mut self, content_type: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(content_type.into(), template.into());
        self
    }

    pub fn get_template_by(&self, content_type: &str) -> &str {
        self.templates
            .get(content_type)
            .map(String::as_str)
            .unwrap_or(&self.default_template)
    }
}

impl PromptRenderer for TemplateService {
    fn render(&self, template_key: &str, vocabulary: &Vocabulary) -> Result<String, RenderError> {
        substitute(template_key, self.get_template_by(template_key), vocabulary)
    }
}

/// Replace every `{{ KEY }}` (or `{{ .KEY }}`) with its vocabulary value.
fn substitute(name: &str, template: &str, vocabulary: &Vocabulary) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut consumed_total = 0;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);

        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            return Err(RenderError::Unterminated {
                template: name.to_string(),
                offset: consumed_total + open,
            });
        };

        let key = after[..close].trim();
        let key = key.strip_prefix('.').unwrap_or(key);
        let value = vocabulary
            .get(key)
            .ok_or_else(|| RenderError::UnknownVariable {
                template: name.to_string(),
                variable: key.to_string(),
            })?;
        out.push_str(value);

        let consumed = open + 2 + close + 2;
        consumed_total += consumed;
        rest = &rest[consumed..];
    }

    out.push_str(rest);
    Ok(out)
}
