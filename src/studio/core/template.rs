//! Notification template model as returned by the template service.
//!
//! Field names follow the service's camelCase wire format. Everything other
//! than the title and body defaults when absent or `null` so that slightly
//! different server versions still decode.

use serde::{Deserialize, Deserializer, Serialize};

use crate::studio::core::ids::TemplateId;

/// A generated notification template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Template identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: TemplateId,
    /// Owner account on the service side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    /// Service-side category code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// Display title.
    pub title: String,
    /// Body text, possibly containing `#{key}` placeholder tokens.
    pub content: String,
    /// Optional header image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Message kind (e.g. `MESSAGE`).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    /// Action buttons, in display order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub buttons: Vec<TemplateButton>,
    /// Placeholder variables, in display order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub variables: Vec<TemplateVariable>,
    /// Industry classification.
    #[serde(default, deserialize_with = "null_as_default")]
    pub industry: Vec<Classification>,
    /// Purpose classification.
    #[serde(default, deserialize_with = "null_as_default")]
    pub purpose: Vec<Classification>,
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Template {
    /// Keys of all declared variables, in declaration order.
    pub fn variable_keys(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|variable| variable.key.as_str())
    }

    /// Short description used in logs.
    #[must_use]
    pub fn log_summary(&self) -> String {
        format!(
            "id={} title={:?} variables={} buttons={}",
            self.id,
            self.title,
            self.variables.len(),
            self.buttons.len()
        )
    }
}

/// An action button attached to a template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateButton {
    /// Button identifier.
    pub id: i64,
    /// Button label.
    #[serde(rename = "name")]
    pub label: String,
    /// Display position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<u32>,
    /// Link opened on desktop.
    #[serde(default, rename = "linkPc")]
    pub url: Option<String>,
    /// Link opened on Android.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_and: Option<String>,
    /// Link opened on iOS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_ios: Option<String>,
}

/// A placeholder variable declared by a template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVariable {
    /// Variable identifier.
    pub id: i64,
    /// Key used inside `#{...}` tokens.
    #[serde(rename = "variableKey")]
    pub key: String,
    /// Hint text shown in the input field.
    #[serde(default, deserialize_with = "null_as_default")]
    pub placeholder: String,
    /// Input widget kind (e.g. `TEXT`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
}

impl TemplateVariable {
    /// The literal token this variable occupies in the body.
    #[must_use]
    pub fn token(&self) -> String {
        format!("#{{{}}}", self.key)
    }
}

/// Industry or purpose tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Tag identifier.
    pub id: i64,
    /// Tag name.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_service_payload() {
        let payload = json!({
            "id": 7,
            "userId": 123,
            "categoryId": "999999",
            "title": "주문 완료 알림",
            "content": "안녕하세요, #{고객명}님.",
            "imageUrl": null,
            "type": "MESSAGE",
            "buttons": [{
                "id": 1, "name": "자세히 보기", "ordering": 1,
                "linkPc": "https://example.com", "linkAnd": null, "linkIos": null
            }],
            "variables": [{
                "id": 4, "variableKey": "고객명", "placeholder": "#{고객명}", "inputType": "TEXT"
            }],
            "industry": [{ "id": 1, "name": "기타" }],
            "purpose": [{ "id": 1, "name": "공지/안내" }]
        });

        let template: Template = serde_json::from_value(payload).unwrap();
        assert_eq!(template.id, TemplateId::from_raw(7));
        assert_eq!(template.buttons[0].label, "자세히 보기");
        assert_eq!(template.buttons[0].url.as_deref(), Some("https://example.com"));
        assert_eq!(template.variables[0].key, "고객명");
        assert_eq!(template.variables[0].token(), "#{고객명}");
        assert_eq!(template.message_type.as_deref(), Some("MESSAGE"));
        assert_eq!(template.variable_keys().collect::<Vec<_>>(), vec!["고객명"]);
    }

    #[test]
    fn test_minimal_payload_uses_defaults() {
        let template: Template =
            serde_json::from_value(json!({ "id": 1, "title": "t", "content": "c" })).unwrap();
        assert!(template.buttons.is_empty());
        assert!(template.variables.is_empty());
        assert!(template.industry.is_empty());
        assert!(template.category_id.is_none());
    }

    #[test]
    fn test_null_collections_decode_as_empty() {
        let payload = json!({
            "id": 1,
            "title": "t",
            "content": "c",
            "buttons": null,
            "industry": null
        });
        let template: Template = serde_json::from_value(payload).unwrap();
        assert!(template.buttons.is_empty());
        assert!(template.industry.is_empty());
        assert!(template.variables.is_empty());

        let variable: TemplateVariable = serde_json::from_value(
            json!({ "id": 2, "variableKey": "고객명", "placeholder": null }),
        )
        .unwrap();
        assert_eq!(variable.placeholder, "");
    }

    #[test]
    fn test_missing_body_is_rejected() {
        let result = serde_json::from_value::<Template>(json!({ "id": 1, "title": "t" }));
        assert!(result.is_err());
    }
}
