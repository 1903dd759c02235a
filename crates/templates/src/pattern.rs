//! Regex-backed path templates.
//!
//! A template definition is a path with `{field}` placeholders:
//!
//! ```
//! use publish_resolver_templates::{PatternTemplate, Template, TemplateField};
//!
//! let template = PatternTemplate::new(
//!     "shot_scene",
//!     "/seq/shot_{frame}.ma",
//!     vec![TemplateField::new("frame")
//!         .with_pattern(r"\d+")
//!         .with_default("default")
//!         .abstract_field()],
//! )
//! .unwrap();
//!
//! let fields = template.extract_fields("/seq/shot_0010.ma").unwrap();
//! assert_eq!(fields["frame"], "0010");
//! ```
//!
//! Placeholders without a declared field match one path component.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use crate::error::TemplateError;
use crate::template::{Template, TemplateMatcher};

/// Value pattern used for placeholders without an explicit pattern.
const DEFAULT_FIELD_PATTERN: &str = "[^/]+";

/// Declaration of one template field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateField {
    /// Field name as used in `{name}` placeholders.
    pub name: String,
    /// Regular expression a value must match.
    pub pattern: String,
    /// Value used at render time when none is supplied.
    pub default: Option<String>,
    /// Whether the value varies per rendered instance.
    pub is_abstract: bool,
}

impl TemplateField {
    /// Create a field matching one path component, without default.
    ///
    /// # Arguments
    /// * `name` - Field name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: DEFAULT_FIELD_PATTERN.to_string(),
            default: None,
            is_abstract: false,
        }
    }

    /// Set the value pattern.
    ///
    /// # Arguments
    /// * `pattern` - Regular expression (unanchored)
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Set the default value.
    ///
    /// # Arguments
    /// * `default` - Value used when rendering without this field
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Mark the field as abstract.
    pub fn abstract_field(mut self) -> Self {
        self.is_abstract = true;
        self
    }
}

/// Parsed piece of a template definition.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A template compiled from a `{field}` definition string.
#[derive(Debug, Clone)]
pub struct PatternTemplate {
    /// Template name.
    name: String,
    /// Original definition string.
    definition: String,
    /// Declared fields, keyed by name.
    fields: HashMap<String, TemplateField>,
    /// Definition split into literals and placeholders.
    segments: Vec<Segment>,
    /// Anchored regex with one named group per field.
    regex: Regex,
}

impl PatternTemplate {
    /// Compile a template.
    ///
    /// # Arguments
    /// * `name` - Template name
    /// * `definition` - Path with `{field}` placeholders
    /// * `fields` - Field declarations; undeclared placeholders get defaults
    ///
    /// # Errors
    /// Returns error if the definition is malformed, a placeholder repeats,
    /// or a field pattern is not a valid regex.
    pub fn new(
        name: impl Into<String>,
        definition: impl Into<String>,
        fields: Vec<TemplateField>,
    ) -> Result<Self, TemplateError> {
        let name: String = name.into();
        let definition: String = definition.into();
        let segments: Vec<Segment> = parse_definition(&name, &definition)?;

        let mut declared: HashMap<String, TemplateField> = fields
            .into_iter()
            .map(|field| (field.name.clone(), field))
            .collect();

        let mut expression: String = String::from("^");
        for segment in &segments {
            match segment {
                Segment::Literal(text) => expression.push_str(&regex::escape(text)),
                Segment::Field(field_name) => {
                    let field: &TemplateField = declared
                        .entry(field_name.clone())
                        .or_insert_with(|| TemplateField::new(field_name.clone()));
                    Regex::new(&field.pattern).map_err(|e| TemplateError::InvalidPattern {
                        template: name.clone(),
                        field: field_name.clone(),
                        reason: e.to_string(),
                    })?;
                    expression.push_str(&format!("(?P<{}>{})", field_name, field.pattern));
                }
            }
        }
        expression.push('$');

        let regex: Regex = Regex::new(&expression).map_err(|e| TemplateError::InvalidDefinition {
            template: name.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            name,
            definition,
            fields: declared,
            segments,
            regex,
        })
    }

    /// Check whether a path matches this template.
    ///
    /// # Arguments
    /// * `path` - Slash-normalized path
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Placeholder names in definition order.
    fn field_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }
}

impl Template for PatternTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn abstract_fields(&self) -> Vec<String> {
        self.field_names()
            .filter(|name| self.fields.get(*name).is_some_and(|f| f.is_abstract))
            .map(String::from)
            .collect()
    }

    fn extract_fields(&self, path: &str) -> Option<HashMap<String, String>> {
        let captures: regex::Captures = self.regex.captures(path)?;
        Some(
            self.field_names()
                .filter_map(|name| {
                    captures
                        .name(name)
                        .map(|m| (name.to_string(), m.as_str().to_string()))
                })
                .collect(),
        )
    }

    fn render(&self, fields: &HashMap<String, String>) -> Result<String, TemplateError> {
        let mut rendered: String = String::with_capacity(self.definition.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Field(name) => {
                    let value: &str = fields
                        .get(name)
                        .map(String::as_str)
                        .or_else(|| self.fields.get(name).and_then(|f| f.default.as_deref()))
                        .ok_or_else(|| TemplateError::MissingField {
                            template: self.name.clone(),
                            field: name.clone(),
                        })?;
                    rendered.push_str(value);
                }
            }
        }
        Ok(rendered)
    }
}

/// Ordered collection of templates.
///
/// The first template matching a path wins.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: Vec<Arc<PatternTemplate>>,
}

impl TemplateSet {
    /// Create an empty set (no path matches).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set from templates, in match priority order.
    ///
    /// # Arguments
    /// * `templates` - Templates to include
    pub fn with_templates(templates: Vec<PatternTemplate>) -> Self {
        Self {
            templates: templates.into_iter().map(Arc::new).collect(),
        }
    }

    /// Check if the set has no templates.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateMatcher for TemplateSet {
    fn template_from_path(&self, path: &str) -> Option<Arc<dyn Template>> {
        self.templates
            .iter()
            .find(|template| template.matches(path))
            .map(|template| Arc::clone(template) as Arc<dyn Template>)
    }
}

/// Split a definition into literal text and `{field}` placeholders.
fn parse_definition(template: &str, definition: &str) -> Result<Vec<Segment>, TemplateError> {
    let invalid = |reason: String| TemplateError::InvalidDefinition {
        template: template.to_string(),
        reason,
    };

    let mut segments: Vec<Segment> = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    let mut rest: &str = definition;

    while let Some(open) = rest.find(['{', '}']) {
        if rest[open..].starts_with('}') {
            return Err(invalid(format!("unmatched '}}' in {}", definition)));
        }
        if open > 0 {
            segments.push(Segment::Literal(rest[..open].to_string()));
        }

        let after_open: &str = &rest[open + 1..];
        let close: usize = after_open
            .find('}')
            .ok_or_else(|| invalid(format!("unterminated '{{' in {}", definition)))?;
        let field: &str = &after_open[..close];

        if !is_valid_field_name(field) {
            return Err(invalid(format!("invalid field name '{}'", field)));
        }
        if seen.iter().any(|name| name == field) {
            return Err(invalid(format!("field '{}' appears more than once", field)));
        }
        seen.push(field.to_string());
        segments.push(Segment::Field(field.to_string()));

        rest = &after_open[close + 1..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }
    Ok(segments)
}

/// Field names double as regex group names.
fn is_valid_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_field() -> TemplateField {
        TemplateField::new("frame")
            .with_pattern(r"\d+")
            .with_default("default")
            .abstract_field()
    }

    fn shot_template() -> PatternTemplate {
        PatternTemplate::new("shot_scene", "/seq/shot_{frame}.ma", vec![frame_field()]).unwrap()
    }

    #[test]
    fn test_extract_fields() {
        let template: PatternTemplate = shot_template();
        let fields: HashMap<String, String> = template.extract_fields("/seq/shot_0010.ma").unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["frame"], "0010");
    }

    #[test]
    fn test_extract_fields_no_match() {
        let template: PatternTemplate = shot_template();
        assert!(template.extract_fields("/seq/shot_abcd.ma").is_none());
        assert!(template.extract_fields("/seq/shot_0010.ma.bak").is_none());
        assert!(template.extract_fields("/other/seq/shot_0010.ma").is_none());
    }

    #[test]
    fn test_literal_text_is_escaped() {
        let template: PatternTemplate =
            PatternTemplate::new("dotted", "/a.b/{name}.ma", vec![]).unwrap();
        assert!(template.matches("/a.b/scene.ma"));
        assert!(!template.matches("/aXb/scene.ma"));
    }

    #[test]
    fn test_undeclared_field_matches_one_component() {
        let template: PatternTemplate =
            PatternTemplate::new("work", "/proj/{shot}/work/{name}.ma", vec![]).unwrap();
        let fields: HashMap<String, String> =
            template.extract_fields("/proj/sh010/work/anim.ma").unwrap();
        assert_eq!(fields["shot"], "sh010");
        assert_eq!(fields["name"], "anim");
        assert!(!template.matches("/proj/sh010/extra/work/anim.ma"));
    }

    #[test]
    fn test_abstract_fields_in_definition_order() {
        let template: PatternTemplate = PatternTemplate::new(
            "stereo",
            "/renders/{eye}/img.{frame}.exr",
            vec![
                frame_field(),
                TemplateField::new("eye").with_default("%V").abstract_field(),
            ],
        )
        .unwrap();
        assert_eq!(template.abstract_fields(), vec!["eye".to_string(), "frame".to_string()]);
    }

    #[test]
    fn test_render_uses_defaults_for_missing_fields() {
        let template: PatternTemplate = shot_template();
        let rendered: String = template.render(&HashMap::new()).unwrap();
        assert_eq!(rendered, "/seq/shot_default.ma");
    }

    #[test]
    fn test_render_with_values() {
        let template: PatternTemplate = shot_template();
        let mut fields: HashMap<String, String> = HashMap::new();
        fields.insert("frame".into(), "0042".into());
        assert_eq!(template.render(&fields).unwrap(), "/seq/shot_0042.ma");
    }

    #[test]
    fn test_render_missing_field_without_default() {
        let template: PatternTemplate =
            PatternTemplate::new("work", "/proj/{shot}/a.ma", vec![]).unwrap();
        let result: Result<String, TemplateError> = template.render(&HashMap::new());
        assert_eq!(
            result,
            Err(TemplateError::MissingField {
                template: "work".into(),
                field: "shot".into(),
            })
        );
    }

    #[test]
    fn test_invalid_definitions() {
        assert!(matches!(
            PatternTemplate::new("t", "/a/{name", vec![]),
            Err(TemplateError::InvalidDefinition { .. })
        ));
        assert!(matches!(
            PatternTemplate::new("t", "/a/name}", vec![]),
            Err(TemplateError::InvalidDefinition { .. })
        ));
        assert!(matches!(
            PatternTemplate::new("t", "/a/{1st}", vec![]),
            Err(TemplateError::InvalidDefinition { .. })
        ));
        assert!(matches!(
            PatternTemplate::new("t", "/{name}/{name}", vec![]),
            Err(TemplateError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn test_invalid_field_pattern() {
        let result: Result<PatternTemplate, TemplateError> = PatternTemplate::new(
            "t",
            "/a/{frame}",
            vec![TemplateField::new("frame").with_pattern("[0-9")],
        );
        assert!(matches!(result, Err(TemplateError::InvalidPattern { .. })));
    }

    #[test]
    fn test_template_set_first_match_wins() {
        let specific: PatternTemplate = shot_template();
        let generic: PatternTemplate =
            PatternTemplate::new("generic", "/seq/{name}.ma", vec![]).unwrap();
        let set: TemplateSet = TemplateSet::with_templates(vec![specific, generic]);

        let found: Arc<dyn Template> = set.template_from_path("/seq/shot_0010.ma").unwrap();
        assert_eq!(found.name(), "shot_scene");

        let found: Arc<dyn Template> = set.template_from_path("/seq/layout.ma").unwrap();
        assert_eq!(found.name(), "generic");

        assert!(set.template_from_path("/elsewhere/layout.ma").is_none());
    }

    #[test]
    fn test_empty_template_set() {
        let set: TemplateSet = TemplateSet::new();
        assert!(set.is_empty());
        assert!(set.template_from_path("/seq/shot_0010.ma").is_none());
    }
}
