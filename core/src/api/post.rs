use super::{require_id, unwrap_data};
use crate::client::ApiClient;
use crate::types::{CreatePost, Post, PostPage, PostQuery, UpdatePost};

pub const POST_PREFIX: &str = "/post";

const ALL: &str = "all";

impl ApiClient {
    pub async fn add_post(&self, input: &CreatePost) -> Option<Post> {
        let envelope = self.post(POST_PREFIX, input).await;
        unwrap_data("add_post", envelope)
    }

    /// Every post, public or not.
    pub async fn get_all_posts(&self) -> Option<PostPage> {
        let envelope = self.get(&format!("{POST_PREFIX}/{ALL}")).await;
        unwrap_data("get_all_posts", envelope)
    }

    pub async fn get_posts(&self, query: &PostQuery) -> Option<PostPage> {
        let envelope = self.get_with_params(POST_PREFIX, query).await;
        unwrap_data("get_posts", envelope)
    }

    pub async fn update_post(&self, id: &str, input: &UpdatePost) -> Option<Post> {
        if !require_id("update_post", id) {
            return None;
        }
        let envelope = self.put(&format!("{POST_PREFIX}/{id}"), input).await;
        unwrap_data("update_post", envelope)
    }
}
