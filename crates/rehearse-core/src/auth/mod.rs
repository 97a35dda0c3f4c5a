//! Bearer-token plumbing
//!
//! The grading, resume and interview endpoints require an
//! `Authorization: Bearer <token>` header. The provider trait is the seam;
//! today tokens come straight from configuration.

use async_trait::async_trait;

/// Source of bearer tokens for authenticated requests
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn bearer_token(&self) -> anyhow::Result<String>;
}

/// Fixed token from configuration or the environment
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn bearer_token(&self) -> anyhow::Result<String> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token_round_trips() {
        let provider = StaticToken::new("tok-123");
        assert_eq!(provider.bearer_token().await.unwrap(), "tok-123");
    }
}
