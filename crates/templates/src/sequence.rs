//! Sequence path abstraction.

use std::sync::Arc;

use publish_resolver_common::normalize_separators;

use crate::pattern::TemplateSet;
use crate::template::TemplateMatcher;

/// Collapses per-frame paths to their canonical sequence path.
#[derive(Clone)]
pub struct SequenceAbstractor {
    matcher: Arc<dyn TemplateMatcher>,
}

impl SequenceAbstractor {
    /// Create an abstractor backed by a template engine.
    ///
    /// # Arguments
    /// * `matcher` - Template engine used to recognise sequence paths
    pub fn new(matcher: Arc<dyn TemplateMatcher>) -> Self {
        Self { matcher }
    }

    /// Create an abstractor that never changes a path.
    pub fn passthrough() -> Self {
        Self::new(Arc::new(TemplateSet::new()))
    }

    /// Replace the abstract fields of a path with their default values.
    ///
    /// If no template matches, the template has no abstract fields, or the
    /// path cannot be rebuilt, the input is returned unchanged.
    ///
    /// # Arguments
    /// * `path` - Path in either separator style
    ///
    /// # Returns
    /// The canonical sequence path, or `path` itself.
    pub fn abstract_path(&self, path: &str) -> String {
        let normalized: String = normalize_separators(path);

        let Some(template) = self.matcher.template_from_path(&normalized) else {
            return path.to_string();
        };

        let abstract_fields: Vec<String> = template.abstract_fields();
        if abstract_fields.is_empty() {
            return path.to_string();
        }

        let Some(mut fields) = template.extract_fields(&normalized) else {
            return path.to_string();
        };
        for field in &abstract_fields {
            fields.remove(field);
        }

        match template.render(&fields) {
            Ok(abstracted) => abstracted,
            Err(e) => {
                log::warn!("Cannot abstract sequence path {}: {}", path, e);
                path.to_string()
            }
        }
    }
}

impl std::fmt::Debug for SequenceAbstractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceAbstractor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{PatternTemplate, TemplateField};

    fn sequence_abstractor() -> SequenceAbstractor {
        let frame: TemplateField = TemplateField::new("frame")
            .with_pattern(r"\d+")
            .with_default("default")
            .abstract_field();
        let shot: PatternTemplate =
            PatternTemplate::new("shot_scene", "/seq/shot_{frame}.ma", vec![frame]).unwrap();
        let layout: PatternTemplate =
            PatternTemplate::new("layout", "/layout/{name}.ma", vec![]).unwrap();
        let broken: PatternTemplate = PatternTemplate::new(
            "broken",
            "/broken/{shot}/img.{frame}.exr",
            vec![TemplateField::new("frame").with_pattern(r"\d+").abstract_field()],
        )
        .unwrap();
        SequenceAbstractor::new(Arc::new(TemplateSet::with_templates(vec![
            shot, layout, broken,
        ])))
    }

    #[test]
    fn test_frames_collapse_to_one_path() {
        let abstractor: SequenceAbstractor = sequence_abstractor();
        assert_eq!(abstractor.abstract_path("/seq/shot_0010.ma"), "/seq/shot_default.ma");
        assert_eq!(abstractor.abstract_path("/seq/shot_0020.ma"), "/seq/shot_default.ma");
    }

    #[test]
    fn test_backslash_paths_are_matched() {
        let abstractor: SequenceAbstractor = sequence_abstractor();
        assert_eq!(abstractor.abstract_path(r"\seq\shot_0010.ma"), "/seq/shot_default.ma");
    }

    #[test]
    fn test_no_template_leaves_path_unchanged() {
        let abstractor: SequenceAbstractor = sequence_abstractor();
        assert_eq!(abstractor.abstract_path("/other/file.ma"), "/other/file.ma");
        assert_eq!(abstractor.abstract_path(r"c:\other\file.ma"), r"c:\other\file.ma");
    }

    #[test]
    fn test_template_without_abstract_fields_leaves_path_unchanged() {
        let abstractor: SequenceAbstractor = sequence_abstractor();
        assert_eq!(abstractor.abstract_path("/layout/anim.ma"), "/layout/anim.ma");
    }

    #[test]
    fn test_render_failure_leaves_path_unchanged() {
        // frame is abstract but has no default
        let abstractor: SequenceAbstractor = sequence_abstractor();
        assert_eq!(
            abstractor.abstract_path("/broken/sh010/img.0001.exr"),
            "/broken/sh010/img.0001.exr"
        );
    }

    #[test]
    fn test_passthrough() {
        let abstractor: SequenceAbstractor = SequenceAbstractor::passthrough();
        assert_eq!(abstractor.abstract_path("/seq/shot_0010.ma"), "/seq/shot_0010.ma");
    }
}
