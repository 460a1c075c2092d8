use super::unwrap_data;
use crate::auth;
use crate::client::ApiClient;
use crate::types::{LoginForm, Token};

pub const LOGIN_PATH: &str = "/user/login";

impl ApiClient {
    /// Authenticate and persist the returned token. Subsequent requests carry
    /// it as a bearer credential.
    pub async fn login(&self, form: &LoginForm) -> bool {
        let envelope = self.post(LOGIN_PATH, form).await;
        let Some(Token { token }) = unwrap_data::<Token>("login", envelope) else {
            return false;
        };
        tracing::info!(username = %form.username, "logged in");
        auth::set_token(self.store(), &token)
    }

    pub fn logout(&self) {
        auth::clear_token(self.store());
    }

    pub fn is_logged_in(&self) -> bool {
        auth::is_logged_in(self.store())
    }
}

#[cfg(test)]
mod tests {
    use crate::auth;
    use crate::client::tests::{client_with, FakeTransport};
    use crate::http::HttpResponse;
    use crate::types::LoginForm;

    fn form() -> LoginForm {
        LoginForm {
            username: "admin".to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn login_stores_token_for_later_requests() {
        let transport = FakeTransport::replying(vec![
            Ok(HttpResponse::new(
                200,
                r#"{"success":true,"data":{"token":"tok-1"}}"#,
            )),
            Ok(HttpResponse::new(204, "")),
        ]);
        let (client, store) = client_with(transport.clone());

        assert!(client.login(&form()).await);
        assert_eq!(auth::get_token(store.as_ref()).as_deref(), Some("tok-1"));
        assert!(client.is_logged_in());

        assert!(client.delete_category("1").await);
        let requests = transport.requests();
        assert!(requests[0].header("Authorization").is_none());
        assert_eq!(requests[1].header("Authorization"), Some("Bearer tok-1"));
    }

    #[tokio::test]
    async fn failed_login_leaves_store_untouched() {
        let transport = FakeTransport::replying(vec![Ok(HttpResponse::new(
            401,
            r#"{"message":"bad credentials"}"#,
        ))]);
        let (client, _) = client_with(transport);
        assert!(!client.login(&form()).await);
        assert!(!client.is_logged_in());
    }

    #[tokio::test]
    async fn logout_clears_token() {
        let transport = FakeTransport::replying(Vec::new());
        let (client, store) = client_with(transport);
        auth::set_token(store.as_ref(), "tok");
        client.logout();
        assert!(!client.is_logged_in());
    }
}
