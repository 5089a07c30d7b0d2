//! Completion sanitization, markup stripping and JSON extraction.
//!
//! Completions are untrusted text. They are cleaned of control characters and
//! prompt-injection markers, then the first JSON value is located (fenced code
//! block first, then a balanced-bracket scan that respects string literals).

use serde_json::Value;
use thiserror::Error;

/// Maximum allowed completion length (100KB).
pub const MAX_RESPONSE_LENGTH: usize = 100_000;

/// Maximum length for individual string fields in extracted data (10KB).
pub const MAX_FIELD_LENGTH: usize = 10_000;

/// Errors that can occur during sanitization.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SanitizationError {
    #[error("Response too long: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },

    #[error("Invalid UTF-8 encoding at character position {position}")]
    InvalidUtf8 { position: usize },
}

/// Errors that can occur while extracting JSON from a completion.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Sanitization failed: {0}")]
    Sanitization(#[from] SanitizationError),

    #[error("No JSON found in completion")]
    NoJson,

    #[error("JSON parse error: {0}")]
    ParseError(String),
}

/// Sanitizes completions before any parsing.
#[derive(Debug, Clone, Default)]
pub struct ResponseSanitizer {
    /// Additional prompt injection patterns to strip.
    additional_patterns: Vec<String>,
}

impl ResponseSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds additional patterns to strip from responses.
    pub fn with_additional_patterns(mut self, patterns: Vec<String>) -> Self {
        self.additional_patterns = patterns;
        self
    }

    /// Sanitizes a completion.
    ///
    /// # Steps
    /// 1. Validate length
    /// 2. Remove control characters (except newlines/tabs)
    /// 3. Strip potential prompt injection markers
    /// 4. Reject replacement characters left by lossy decoding
    pub fn sanitize(&self, response: &str) -> Result<String, SanitizationError> {
        self.validate_length(response)?;
        let cleaned = self.remove_control_chars(response);
        let stripped = self.strip_injection_markers(&cleaned);
        self.validate_utf8(&stripped)?;
        Ok(stripped)
    }

    fn validate_length(&self, s: &str) -> Result<(), SanitizationError> {
        if s.len() > MAX_RESPONSE_LENGTH {
            return Err(SanitizationError::TooLong {
                max: MAX_RESPONSE_LENGTH,
                actual: s.len(),
            });
        }
        Ok(())
    }

    fn remove_control_chars(&self, s: &str) -> String {
        s.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
            .collect()
    }

    fn strip_injection_markers(&self, s: &str) -> String {
        let patterns = [
            "```system",
            "```assistant",
            "[INST]",
            "[/INST]",
            "<|system|>",
            "<|assistant|>",
            "<|user|>",
            "<|im_start|>",
            "<|im_end|>",
            "<<SYS>>",
            "<</SYS>>",
        ];

        let mut result = s.to_string();
        for pattern in patterns {
            result = result.replace(pattern, "");
        }
        for pattern in &self.additional_patterns {
            result = result.replace(pattern.as_str(), "");
        }
        result
    }

    fn validate_utf8(&self, s: &str) -> Result<(), SanitizationError> {
        for (i, c) in s.chars().enumerate() {
            if c == '\u{FFFD}' {
                return Err(SanitizationError::InvalidUtf8 { position: i });
            }
        }
        Ok(())
    }
}

/// Removes residual markdown markup from a completion.
///
/// Heading markers at line start and bold/italic emphasis markers are
/// removed. Single underscores are kept so snake_case keys survive.
pub fn strip_markup(text: &str) -> String {
    let without_headings: Vec<&str> = text
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let hashes = trimmed.chars().take_while(|c| *c == '#').count();
            if (1..=6).contains(&hashes) && trimmed[hashes..].starts_with(' ') {
                trimmed[hashes..].trim_start()
            } else {
                line
            }
        })
        .collect();
    let joined = without_headings.join("\n");

    let no_strong = joined.replace("**", "").replace("__", "");
    strip_single_emphasis(&no_strong)
}

/// Drops `*` used as emphasis; a `*` with whitespace on both sides stays.
fn strip_single_emphasis(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, c) in chars.iter().enumerate() {
        if *c == '*' {
            let before_ws = i == 0 || chars[i - 1].is_whitespace();
            let after_ws = i + 1 >= chars.len() || chars[i + 1].is_whitespace();
            if !(before_ws && after_ws) {
                continue;
            }
        }
        out.push(*c);
    }
    out
}

/// Extracts the first JSON value from a completion.
#[derive(Debug, Clone, Default)]
pub struct ResponseExtractor {
    sanitizer: ResponseSanitizer,
}

impl ResponseExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor with a custom sanitizer.
    pub fn with_sanitizer(sanitizer: ResponseSanitizer) -> Self {
        Self { sanitizer }
    }

    /// Sanitizes the completion and parses the first JSON value in it.
    ///
    /// String values inside the parsed JSON are cleaned of HTML tags and
    /// truncated to [`MAX_FIELD_LENGTH`].
    pub fn extract(&self, completion: &str) -> Result<Value, ExtractionError> {
        let sanitized = self.sanitizer.sanitize(completion)?;
        let json_str = self.locate_json(&sanitized)?;
        let value: Value =
            serde_json::from_str(&json_str).map_err(|e| ExtractionError::ParseError(e.to_string()))?;
        Ok(self.sanitize_json_strings(value))
    }

    fn locate_json(&self, response: &str) -> Result<String, ExtractionError> {
        let trimmed = response.trim();

        if let Some(json) = self.extract_from_code_block(trimmed) {
            return Ok(json);
        }

        let obj_start = trimmed.find('{');
        let arr_start = trimmed.find('[');
        let (start, open, close) = match (obj_start, arr_start) {
            (Some(o), Some(a)) if a < o => (a, '[', ']'),
            (Some(o), _) => (o, '{', '}'),
            (None, Some(a)) => (a, '[', ']'),
            (None, None) => return Err(ExtractionError::NoJson),
        };

        Ok(self
            .extract_balanced_json(trimmed, start, open, close)
            .unwrap_or_else(|| trimmed[start..].to_string()))
    }

    fn extract_from_code_block(&self, s: &str) -> Option<String> {
        let patterns = ["```json\n", "```json\r\n", "```JSON\n", "```\n", "```\r\n"];

        for pattern in patterns {
            if let Some(start) = s.find(pattern) {
                let json_start = start + pattern.len();
                if let Some(end) = s[json_start..].find("```") {
                    return Some(s[json_start..json_start + end].trim().to_string());
                }
            }
        }
        None
    }

    fn extract_balanced_json(&self, s: &str, start: usize, open: char, close: char) -> Option<String> {
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escape_next = false;

        for (offset, c) in s[start..].char_indices() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match c {
                '\\' if in_string => escape_next = true,
                '"' => in_string = !in_string,
                _ if in_string => {}
                c if c == open => depth += 1,
                c if c == close => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        let end = start + offset + c.len_utf8();
                        return Some(s[start..end].to_string());
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn sanitize_json_strings(&self, value: Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.sanitize_string_field(&s)),
            Value::Array(arr) => Value::Array(
                arr.into_iter()
                    .map(|v| self.sanitize_json_strings(v))
                    .collect(),
            ),
            Value::Object(obj) => Value::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, self.sanitize_json_strings(v)))
                    .collect(),
            ),
            other => other,
        }
    }

    fn sanitize_string_field(&self, s: &str) -> String {
        let no_html = strip_html_tags(s);
        if no_html.len() > MAX_FIELD_LENGTH {
            let mut cut = MAX_FIELD_LENGTH;
            while !no_html.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}...[truncated]", &no_html[..cut])
        } else {
            no_html
        }
    }
}

fn strip_html_tags(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}
