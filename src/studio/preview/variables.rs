//! Transient variable values for the template preview.
//!
//! Values belong to the template currently displayed. Whenever a different
//! template is displayed they are thrown away and every declared key starts
//! out empty again. Nothing here is persisted.

use std::collections::HashMap;

use serde::Serialize;

use crate::studio::core::template::Template;
use crate::studio::preview::placeholder::PlaceholderRenderer;

/// User-entered values keyed by variable key.
#[derive(Clone, Debug, Default)]
pub struct VariableValues {
    template: Option<Template>,
    values: HashMap<String, String>,
}

impl VariableValues {
    /// Empty values with no template displayed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow the displayed template, resetting all values if it changed.
    ///
    /// Returns `true` when a reset happened.
    pub fn sync(&mut self, displayed: Option<&Template>) -> bool {
        if self.template.as_ref() == displayed {
            return false;
        }
        self.template = displayed.cloned();
        self.values = displayed
            .map(|template| {
                template
                    .variable_keys()
                    .map(|key| (key.to_string(), String::new()))
                    .collect()
            })
            .unwrap_or_default();
        true
    }

    /// Set one value. Keys the displayed template does not declare are ignored.
    ///
    /// Returns `false` if the key was ignored.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.values.get_mut(key) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Current value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Snapshot of the preview pane for the displayed template.
    #[must_use]
    pub fn preview(&self, renderer: &PlaceholderRenderer) -> Preview {
        let Some(template) = self.template.as_ref() else {
            return Preview::default();
        };
        let values = template
            .variables
            .iter()
            .map(|variable| VariableEntry {
                key: variable.key.clone(),
                placeholder: variable.placeholder.clone(),
                value: self.get(&variable.key).unwrap_or_default().to_string(),
            })
            .collect();

        Preview {
            rendered: Some(renderer.render(&template.content, &self.values)),
            template: Some(template.clone()),
            values,
        }
    }
}

/// One variable input as shown next to the preview.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VariableEntry {
    /// Variable key.
    pub key: String,
    /// Input hint.
    pub placeholder: String,
    /// Current value (empty if unset).
    pub value: String,
}

/// Preview pane state.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Preview {
    /// Displayed template.
    pub template: Option<Template>,
    /// Variable inputs in declaration order.
    pub values: Vec<VariableEntry>,
    /// Body with filled values substituted.
    pub rendered: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::studio::generation::fallback::fallback_template;

    #[test]
    fn test_sync_initializes_all_keys_empty() {
        let template = fallback_template("카페", 1);
        let mut values = VariableValues::new();

        assert!(values.sync(Some(&template)));
        for key in template.variable_keys() {
            assert_eq!(values.get(key), Some(""));
        }
        assert!(!values.sync(Some(&template)));
    }

    #[test]
    fn test_new_template_discards_values() {
        let first = fallback_template("카페", 1);
        let second = fallback_template("배송", 1);
        let mut values = VariableValues::new();
        values.sync(Some(&first));
        assert!(values.set("고객명", "민수"));

        assert!(values.sync(Some(&second)));
        assert_eq!(values.get("고객명"), Some(""));

        assert!(values.sync(None));
        assert_eq!(values.get("고객명"), None);
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let mut values = VariableValues::new();
        values.sync(Some(&fallback_template("x", 1)));
        assert!(!values.set("없는키", "v"));
        assert_eq!(values.get("없는키"), None);
    }

    #[test]
    fn test_preview_renders_filled_values() {
        let renderer = PlaceholderRenderer::new().unwrap();
        let mut values = VariableValues::new();
        assert!(values.preview(&renderer).template.is_none());

        values.sync(Some(&fallback_template("카페", 1)));
        values.set("고객명", "민수");
        let preview = values.preview(&renderer);

        let rendered = preview.rendered.unwrap();
        assert!(rendered.starts_with("안녕하세요, 민수님."));
        assert!(rendered.contains("#{픽업시간}"));
        assert_eq!(preview.values.len(), 5);
        assert_eq!(preview.values[0].key, "픽업시간");
    }
}
