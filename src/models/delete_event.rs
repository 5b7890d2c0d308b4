//! Message published after a successful delete.

use crate::models::metadata::DeleteType;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEvent {
    pub bucket: String,
    pub key: String,
    pub delete_type: DeleteType,
    /// Fields that survived a partial delete; absent for hard deletes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_fields: Option<Vec<String>>,
}

impl DeleteEvent {
    pub fn hard(bucket: &str, key: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            delete_type: DeleteType::Hard,
            fixed_fields: None,
        }
    }

    pub fn partial(bucket: &str, key: &str, fixed_fields: Vec<String>) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            delete_type: DeleteType::Partial,
            fixed_fields: Some(fixed_fields),
        }
    }
}
