use async_trait::async_trait;
use reqwest::{Request, Response};

/// Minimal HTTP execution seam. Decorators (e.g. [`super::auth::Bearer`])
/// wrap an inner client to adjust the request before it goes out.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
