use serde_json::Value;

use super::{require_id, unwrap_data};
use crate::client::ApiClient;
use crate::types::{CreateTag, Tag, TagPage, TagQuery, UpdateTag};

pub const TAG_PREFIX: &str = "/tag";

impl ApiClient {
    /// One page of tags. Only payloads carrying both `tags` and `total` are
    /// accepted.
    pub async fn get_all_tags(&self, query: &TagQuery) -> Option<TagPage> {
        let envelope = self.get_with_params(TAG_PREFIX, query).await;
        unwrap_data("get_all_tags", envelope)
    }

    pub async fn add_tag(&self, input: &CreateTag) -> Option<Tag> {
        let envelope = self.post(TAG_PREFIX, input).await;
        unwrap_data("add_tag", envelope)
    }

    pub async fn update_tag(&self, id: &str, input: &UpdateTag) -> Option<Tag> {
        if !require_id("update_tag", id) {
            return None;
        }
        let envelope = self.put(&format!("{TAG_PREFIX}/{id}"), input).await;
        unwrap_data("update_tag", envelope)
    }

    pub async fn delete_tag(&self, id: &str) -> bool {
        if !require_id("delete_tag", id) {
            return false;
        }
        self.delete::<Value>(&format!("{TAG_PREFIX}/{id}"))
            .await
            .is_success()
    }
}
