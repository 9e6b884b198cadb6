use super::client::HttpClient;
use async_trait::async_trait;

/// Plain reqwest client identifying itself with a fixed user agent.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new(user_agent: &str) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self(client))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
