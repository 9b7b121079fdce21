//! DevOps Guru resource shapes (PascalCase on the wire)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const AWS_CLOUD_FORMATION: &str = "AWS_CLOUD_FORMATION";
pub const AWS_SERVICE: &str = "AWS_SERVICE";
pub const AWS_TAGS: &str = "AWS_TAGS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CloudFormationCollection {
    #[serde(default)]
    pub stack_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TagCollection {
    #[serde(alias = "app_boundary_key")]
    pub app_boundary_key: String,
    #[serde(default, alias = "tag_values")]
    pub tag_values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceCollection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_formation: Option<CloudFormationCollection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<TagCollection>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceCollection {
    pub fn stacks(stack_names: Vec<String>) -> Self {
        Self {
            cloud_formation: Some(CloudFormationCollection { stack_names }),
            ..Default::default()
        }
    }

    pub fn tags(tags: Vec<TagCollection>) -> Self {
        Self {
            tags: Some(tags),
            ..Default::default()
        }
    }

    pub fn stack_names(&self) -> &[String] {
        self.cloud_formation
            .as_ref()
            .map(|c| c.stack_names.as_slice())
            .unwrap_or_default()
    }

    pub fn tag_list(&self) -> &[TagCollection] {
        self.tags.as_deref().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.stack_names().is_empty() && self.tag_list().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CollectionAction {
    Add,
    Remove,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NotificationChannel {
    pub id: String,
    #[serde(default)]
    pub config: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_collection_wire_shape() {
        let collection: ResourceCollection = serde_json::from_value(json!({
            "CloudFormation": {"StackNames": ["StackA"]},
            "Tags": [{"AppBoundaryKey": "devops-guru-app", "TagValues": ["prod"]}]
        }))
        .unwrap();
        assert_eq!(collection.stack_names(), ["StackA".to_string()]);
        assert_eq!(collection.tag_list()[0].app_boundary_key, "devops-guru-app");
        assert!(!collection.is_empty());

        assert_eq!(
            serde_json::to_value(ResourceCollection::stacks(vec!["S".into()])).unwrap(),
            json!({"CloudFormation": {"StackNames": ["S"]}})
        );
        assert_eq!(serde_json::to_value(CollectionAction::Remove).unwrap(), json!("REMOVE"));
    }

    #[test]
    fn test_tag_collection_accepts_module_keys() {
        let tag: TagCollection =
            serde_json::from_value(json!({"app_boundary_key": "devops-guru-app", "tag_values": ["a"]})).unwrap();
        assert_eq!(tag.tag_values, vec!["a"]);
    }
}
