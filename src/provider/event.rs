use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Lifecycle phase requested by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestType {
    Create,
    Update,
    Delete,
    /// Anything else; always rejected by the adapters.
    Other(String),
}

impl From<String> for RequestType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Create" => Self::Create,
            "Update" => Self::Update,
            "Delete" => Self::Delete,
            _ => Self::Other(value),
        }
    }
}

impl From<RequestType> for String {
    fn from(value: RequestType) -> Self {
        value.as_str().to_string()
    }
}

impl RequestType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Other(other) => other,
        }
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One custom-resource lifecycle event.
#[derive(ToSchema, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Event {
    #[schema(value_type = String, example = "Create")]
    pub request_type: RequestType,
    #[schema(example = "Custom::Auth0Role")]
    pub resource_type: String,
    pub logical_resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_id: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub resource_properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub old_resource_properties: Option<Map<String, Value>>,
}

/// Result of a handled event: the physical id plus output attributes.
#[derive(ToSchema, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Response {
    pub physical_resource_id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    #[schema(value_type = Object)]
    pub data: BTreeMap<String, Value>,
}

impl Response {
    #[must_use]
    pub fn new(physical_resource_id: impl Into<String>) -> Self {
        Self {
            physical_resource_id: physical_resource_id.into(),
            data: BTreeMap::new(),
        }
    }

    /// Add one output attribute.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_decodes_orchestrator_payload() {
        let event: Event = serde_json::from_value(json!({
            "RequestType": "Update",
            "ServiceToken": "arn:aws:lambda:eu-west-1:123:function:provider",
            "ResponseURL": "https://example.invalid",
            "StackId": "stack",
            "RequestId": "req-1",
            "LogicalResourceId": "AdminRole",
            "PhysicalResourceId": "rol_1",
            "ResourceType": "Custom::Auth0Role",
            "ResourceProperties": { "secretName": "auth0/api", "name": "admin" },
            "OldResourceProperties": { "secretName": "auth0/api", "name": "admins" }
        }))
        .unwrap();

        assert_eq!(event.request_type, RequestType::Update);
        assert_eq!(event.physical_resource_id.as_deref(), Some("rol_1"));
        assert_eq!(event.resource_properties["name"], "admin");
        assert_eq!(
            event.old_resource_properties.unwrap()["name"],
            json!("admins")
        );
    }

    #[test]
    fn unknown_request_type_is_kept() {
        let event: Event = serde_json::from_value(json!({
            "RequestType": "Rollback",
            "ResourceType": "Custom::Auth0Role",
            "LogicalResourceId": "AdminRole"
        }))
        .unwrap();

        assert_eq!(event.request_type, RequestType::Other("Rollback".into()));
        assert!(event.resource_properties.is_empty());
        assert_eq!(event.request_type.to_string(), "Rollback");
    }

    #[test]
    fn response_omits_empty_data() {
        let response = Response::new("tenantSettings");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "PhysicalResourceId": "tenantSettings" })
        );

        let response = Response::new("rol_1").with("roleId", "rol_1");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "PhysicalResourceId": "rol_1", "Data": { "roleId": "rol_1" } })
        );
    }
}
