use serde_json::Value;

use super::{require_id, unwrap_data};
use crate::client::ApiClient;
use crate::types::{Category, CategoryOption, CategoryPage, CategoryQuery, CreateCategory, UpdateCategory};

pub const CATEGORY_PREFIX: &str = "/category";

const SELECT_OPTIONS: &str = "select-options";

impl ApiClient {
    pub async fn add_category(&self, input: &CreateCategory) -> Option<Category> {
        let envelope = self.post(CATEGORY_PREFIX, input).await;
        unwrap_data("add_category", envelope)
    }

    /// One page of categories, filtered by `query`.
    pub async fn get_all_categories(&self, query: &CategoryQuery) -> Option<CategoryPage> {
        let envelope = self.get_with_params(CATEGORY_PREFIX, query).await;
        unwrap_data("get_all_categories", envelope)
    }

    /// Every category as `{id, name, icon}`; empty on failure.
    pub async fn get_all_categories_for_select(&self) -> Vec<CategoryOption> {
        let envelope = self
            .get(&format!("{CATEGORY_PREFIX}/{SELECT_OPTIONS}"))
            .await;
        unwrap_data("get_all_categories_for_select", envelope).unwrap_or_default()
    }

    pub async fn get_category_by_id(&self, id: &str) -> Option<Category> {
        if !require_id("get_category_by_id", id) {
            return None;
        }
        let envelope = self.get(&format!("{CATEGORY_PREFIX}/{id}")).await;
        unwrap_data("get_category_by_id", envelope)
    }

    pub async fn update_category(&self, id: &str, input: &UpdateCategory) -> Option<Category> {
        if !require_id("update_category", id) {
            return None;
        }
        let envelope = self.put(&format!("{CATEGORY_PREFIX}/{id}"), input).await;
        unwrap_data("update_category", envelope)
    }

    /// `true` when the backend accepted the deletion (usually a 204).
    pub async fn delete_category(&self, id: &str) -> bool {
        if !require_id("delete_category", id) {
            return false;
        }
        self.delete::<Value>(&format!("{CATEGORY_PREFIX}/{id}"))
            .await
            .is_success()
    }
}
