use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot of a Jira issue as returned by the REST API. Only the fields
/// the bot displays are typed; everything else (custom fields included)
/// lands in `IssueFields::extra` for dotted-path lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<NamedField>,
    #[serde(default)]
    pub priority: Option<NamedField>,
    #[serde(default)]
    pub reporter: Option<UserRef>,
    #[serde(default)]
    pub assignee: Option<UserRef>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedField {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtask {
    pub key: String,
    pub fields: SubtaskFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubtaskFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<NamedField>,
    #[serde(default)]
    pub priority: Option<NamedField>,
}

impl IssueFields {
    /// The whole field set as a JSON tree, for dotted-path lookups.
    pub fn as_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Walk a dotted path through a JSON tree: objects by key, arrays by
/// numeric index. Returns `None` when any segment is missing, so a bad
/// path can never abort reply construction.
pub fn resolve_field_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        if segment.is_empty() {
            return None;
        }
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_issue_with_custom_fields() {
        let raw = json!({
            "key": "ABC-1",
            "fields": {
                "summary": "Fix the frobnicator",
                "status": { "name": "To Do" },
                "customfield_10016": [",name=Sprint 7,state=ACTIVE,"],
                "customfield_10001": { "value": "Platform" }
            }
        });
        let issue: Issue = serde_json::from_value(raw).unwrap();
        assert_eq!(issue.key, "ABC-1");
        assert_eq!(issue.fields.status.as_ref().unwrap().name, "To Do");
        assert!(issue.fields.extra.contains_key("customfield_10016"));
    }

    #[test]
    fn resolves_nested_paths() {
        let tree = json!({
            "customfield_10001": { "value": "Platform" },
            "labels": ["alpha", "beta"]
        });
        assert_eq!(
            resolve_field_path(&tree, "customfield_10001.value"),
            Some(&json!("Platform"))
        );
        assert_eq!(resolve_field_path(&tree, "labels.1"), Some(&json!("beta")));
        assert_eq!(resolve_field_path(&tree, "customfield_10001.missing"), None);
        assert_eq!(resolve_field_path(&tree, "labels.x"), None);
    }

    #[test]
    fn typed_fields_visible_through_path_lookup() {
        let fields = IssueFields {
            status: Some(NamedField {
                name: "In Review".to_string(),
            }),
            ..Default::default()
        };
        let tree = fields.as_value();
        assert_eq!(
            resolve_field_path(&tree, "status.name"),
            Some(&serde_json::json!("In Review"))
        );
    }
}
