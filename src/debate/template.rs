// Prompt templating
//
// A template is compiled once into literal and placeholder segments, then
// rendered in a single pass. Substituted values are never re-scanned, so a
// debate transcript that itself contains "[TOPIC]" comes out verbatim.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Placeholder names understood by the default prompts.
pub mod placeholder {
    pub const TOPIC: &str = "TOPIC";
    pub const NAME: &str = "NAME";
    pub const DESC: &str = "DESC";
    pub const HISTORY: &str = "HISTORY";
    pub const LIMITER: &str = "LIMITER";
    pub const NUM_PERSONAS: &str = "NUM_PERSONAS";
    pub const CURRENT_PERSONAS: &str = "CURRENT_PERSONAS";
    pub const RESPONSE_LENGTH: &str = "RESPONSE_LENGTH";
}

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([A-Z0-9_]+)\]").expect("placeholder pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A compiled prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn compile(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in PLACEHOLDER_RE.captures_iter(source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(source[last..whole.start()].to_string()));
            }
            segments.push(Segment::Placeholder(name.as_str().to_string()));
            last = whole.end();
        }

        if last < source.len() {
            segments.push(Segment::Literal(source[last..].to_string()));
        }

        Self { segments }
    }

    /// Render with `subs`. Placeholders without a value stay as `[NAME]`;
    /// values for names the template lacks are ignored.
    pub fn render(&self, subs: &Substitutions) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => match subs.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('[');
                        out.push_str(name);
                        out.push(']');
                    }
                },
            }
        }
        out
    }

    /// Placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn has_placeholder(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Placeholder(n) if n == name))
    }
}

/// Named values for a render pass.
#[derive(Debug, Clone, Default)]
pub struct Substitutions {
    values: HashMap<String, String>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_all_occurrences() {
        let t = PromptTemplate::compile("[NAME] says hi. Bye, [NAME].");
        let out = t.render(&Substitutions::new().with(placeholder::NAME, "Ada"));
        assert_eq!(out, "Ada says hi. Bye, Ada.");
    }

    #[test]
    fn test_missing_value_leaves_placeholder() {
        let t = PromptTemplate::compile("Topic: [TOPIC]. History: [HISTORY]");
        let out = t.render(&Substitutions::new().with(placeholder::TOPIC, "coal"));
        assert_eq!(out, "Topic: coal. History: [HISTORY]");
    }

    #[test]
    fn test_unused_values_are_ignored() {
        let t = PromptTemplate::compile("plain text");
        let out = t.render(&Substitutions::new().with(placeholder::TOPIC, "coal"));
        assert_eq!(out, "plain text");
    }

    #[test]
    fn test_empty_value_removes_clause() {
        let t = PromptTemplate::compile("Argue. [LIMITER]");
        let out = t.render(&Substitutions::new().with(placeholder::LIMITER, ""));
        assert_eq!(out, "Argue. ");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let t = PromptTemplate::compile("[HISTORY] on [TOPIC]");
        let subs = Substitutions::new()
            .with(placeholder::HISTORY, "someone wrote [TOPIC]")
            .with(placeholder::TOPIC, "energy");
        assert_eq!(t.render(&subs), "someone wrote [TOPIC] on energy");
    }

    #[test]
    fn test_json_braces_and_lowercase_brackets_are_literal() {
        let src = r#"Output [{"title": "x"}] and [not a placeholder] for [TOPIC]"#;
        let t = PromptTemplate::compile(src);
        assert_eq!(t.placeholders(), vec!["TOPIC"]);
        let out = t.render(&Substitutions::new().with(placeholder::TOPIC, "t"));
        assert_eq!(out, r#"Output [{"title": "x"}] and [not a placeholder] for t"#);
    }

    #[test]
    fn test_placeholders_listed_once_in_order() {
        let t = PromptTemplate::compile("[TOPIC] [NAME] [TOPIC] [DESC]");
        assert_eq!(t.placeholders(), vec!["TOPIC", "NAME", "DESC"]);
        assert!(t.has_placeholder("DESC"));
        assert!(!t.has_placeholder("HISTORY"));
    }

    #[test]
    fn test_empty_template() {
        let t = PromptTemplate::compile("");
        assert_eq!(t.render(&Substitutions::new()), "");
    }
}
