use std::collections::BTreeMap;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::error::{StoreFault, StoreResult};

/// Keys that never pass through as extra attributes on create
const IDENTITY_KEYS: [&str; 2] = ["_id", "id"];

/// Keys an update may not touch: identity plus ownership
const IMMUTABLE_KEYS: [&str; 3] = ["_id", "id", "userId"];

/// Task entity as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Store-assigned identifier (24 hex characters)
    pub id: String,
    /// Owning user; fixed at creation
    pub user_id: String,
    pub name: String,
    pub finished: bool,
    /// Any other attributes supplied by the client, stored as given
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Attributes for a new task.
///
/// Nothing is validated: missing known fields take their defaults and
/// unknown keys are stored as extra attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub finished: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Partial update; absent fields keep their stored value.
///
/// `userId` and identity keys in the payload are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    pub name: Option<String>,
    pub finished: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Raw search query parameters.
///
/// Both arrive as text; see [`TaskFilter::from`] for how they are read.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskSearch {
    /// Case-insensitive substring of the task name
    pub name: Option<String>,
    /// `true` or `false`; other values are ignored
    pub finished: Option<String>,
}

impl TaskSearch {
    /// Build from raw query pairs.
    ///
    /// A parameter given more than once is dropped, as are unknown keys.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut seen: BTreeMap<String, Option<String>> = BTreeMap::new();
        for (key, value) in pairs {
            seen.entry(key)
                .and_modify(|slot| *slot = None)
                .or_insert(Some(value));
        }

        Self {
            name: seen.remove("name").flatten(),
            finished: seen.remove("finished").flatten(),
        }
    }
}

/// Store query: every present field must match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub user_id: Option<String>,
    /// Literal, case-insensitive substring
    pub name: Option<String>,
    pub finished: Option<bool>,
}

impl TaskFilter {
    /// Matches every task
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.name.is_none() && self.finished.is_none()
    }
}

impl From<TaskSearch> for TaskFilter {
    /// An empty name and an unparsable `finished` add no constraint.
    fn from(search: TaskSearch) -> Self {
        Self {
            user_id: None,
            name: search.name.filter(|name| !name.is_empty()),
            finished: search.finished.and_then(|raw| raw.parse::<bool>().ok()),
        }
    }
}

impl CreateTask {
    /// Extra attributes with identity keys removed
    pub fn extra_attributes(&self) -> BTreeMap<String, Value> {
        without_keys(&self.extra, &IDENTITY_KEYS)
    }

    /// The task as it exists once stored under `id`
    pub fn into_task(self, id: ObjectId) -> Task {
        let extra = self.extra_attributes();
        Task {
            id: id.to_hex(),
            user_id: self.user_id,
            name: self.name,
            finished: self.finished,
            extra,
        }
    }
}

impl UpdateTask {
    /// Extra attributes with identity and ownership keys removed
    pub fn extra_attributes(&self) -> BTreeMap<String, Value> {
        without_keys(&self.extra, &IMMUTABLE_KEYS)
    }

    /// True when applying this update would change nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.finished.is_none() && self.extra_attributes().is_empty()
    }
}

fn without_keys(extra: &BTreeMap<String, Value>, keys: &[&str]) -> BTreeMap<String, Value> {
    extra
        .iter()
        .filter(|(key, _)| !keys.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Parse a client-supplied task id
pub fn parse_task_id(raw: &str) -> StoreResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| StoreFault::InvalidId(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_task_keeps_unknown_fields() {
        let input: CreateTask = serde_json::from_value(json!({
            "userId": "u1",
            "name": "Buy milk",
            "finished": false,
            "priority": 3,
            "tags": ["home"]
        }))
        .unwrap();

        assert_eq!(input.user_id, "u1");
        assert_eq!(input.name, "Buy milk");
        assert!(!input.finished);
        assert_eq!(input.extra["priority"], json!(3));
        assert_eq!(input.extra["tags"], json!(["home"]));
    }

    #[test]
    fn test_create_task_defaults_missing_fields() {
        let input: CreateTask = serde_json::from_value(json!({})).unwrap();
        assert_eq!(input, CreateTask::default());
    }

    #[test]
    fn test_into_task_drops_client_supplied_ids() {
        let input: CreateTask = serde_json::from_value(json!({
            "userId": "u1",
            "name": "Buy milk",
            "_id": "forged",
            "id": "forged",
            "note": "2 litres"
        }))
        .unwrap();
        let id = ObjectId::new();

        let task = input.into_task(id);

        assert_eq!(task.id, id.to_hex());
        assert_eq!(task.extra.len(), 1);
        assert_eq!(task.extra["note"], json!("2 litres"));
    }

    #[test]
    fn test_task_serializes_flat_camel_case() {
        let task = Task {
            id: "65f0c0ffee0000000000abcd".to_string(),
            user_id: "u1".to_string(),
            name: "Buy milk".to_string(),
            finished: true,
            extra: BTreeMap::from([("note".to_string(), json!("2 litres"))]),
        };

        assert_eq!(
            serde_json::to_value(&task).unwrap(),
            json!({
                "id": "65f0c0ffee0000000000abcd",
                "userId": "u1",
                "name": "Buy milk",
                "finished": true,
                "note": "2 litres"
            })
        );
    }

    #[test]
    fn test_update_task_ignores_ownership_and_identity() {
        let update: UpdateTask = serde_json::from_value(json!({
            "userId": "someone-else",
            "_id": "x",
            "id": "y"
        }))
        .unwrap();

        assert!(update.extra_attributes().is_empty());
        assert!(update.is_empty());
    }

    #[test]
    fn test_update_task_partial() {
        let update: UpdateTask = serde_json::from_value(json!({ "finished": true })).unwrap();
        assert_eq!(update.finished, Some(true));
        assert_eq!(update.name, None);
        assert!(!update.is_empty());
    }

    #[test]
    fn test_search_from_pairs_drops_repeated_keys() {
        let pairs = [
            ("name", "milk"),
            ("finished", "true"),
            ("finished", "false"),
            ("sort", "asc"),
        ]
        .map(|(k, v)| (k.to_string(), v.to_string()));

        let search = TaskSearch::from_pairs(pairs);
        assert_eq!(search.name.as_deref(), Some("milk"));
        assert_eq!(search.finished, None);

        let search = TaskSearch::from_pairs(Vec::new());
        assert!(TaskFilter::from(search).is_empty());
    }

    #[test]
    fn test_filter_from_search_parses_finished() {
        let filter = TaskFilter::from(TaskSearch {
            name: Some("milk".to_string()),
            finished: Some("true".to_string()),
        });
        assert_eq!(filter.name.as_deref(), Some("milk"));
        assert_eq!(filter.finished, Some(true));

        let filter = TaskFilter::from(TaskSearch {
            name: None,
            finished: Some("false".to_string()),
        });
        assert_eq!(filter.finished, Some(false));
    }

    #[test]
    fn test_filter_from_search_ignores_invalid_values() {
        let filter = TaskFilter::from(TaskSearch {
            name: Some(String::new()),
            finished: Some("yes".to_string()),
        });
        assert!(filter.is_empty());
        assert_eq!(filter, TaskFilter::all());
    }

    #[test]
    fn test_for_user() {
        let filter = TaskFilter::for_user("u1");
        assert_eq!(filter.user_id.as_deref(), Some("u1"));
        assert!(filter.name.is_none() && filter.finished.is_none());
    }

    #[test]
    fn test_parse_task_id() {
        let id = ObjectId::new();
        assert_eq!(parse_task_id(&id.to_hex()).unwrap(), id);
        assert!(matches!(
            parse_task_id("not-an-id"),
            Err(StoreFault::InvalidId(raw)) if raw == "not-an-id"
        ));
    }
}
