//! Canned HTTP responses for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Request, Response, ResponseBuilderExt, Url};

use super::client::HttpClient;

struct Route {
    status: u16,
    final_url: Option<String>,
    body: String,
}

/// Serves registered URLs; anything else is a 404.
#[derive(Default)]
pub(crate) struct FakeClient {
    routes: HashMap<String, Route>,
}

impl FakeClient {
    fn route(mut self, url: &str, status: u16, final_url: Option<&str>, body: &str) -> Self {
        self.routes.insert(
            url.to_string(),
            Route {
                status,
                final_url: final_url.map(str::to_string),
                body: body.to_string(),
            },
        );
        self
    }

    pub(crate) fn page(self, url: &str, body: &str) -> Self {
        self.route(url, 200, None, body)
    }

    pub(crate) fn status(self, url: &str, status: u16) -> Self {
        self.route(url, status, None, "")
    }

    /// `url` ends up served from `final_url`, as after a followed redirect.
    pub(crate) fn redirect(self, url: &str, final_url: &str, body: &str) -> Self {
        self.route(url, 200, Some(final_url), body)
    }
}

#[async_trait]
impl HttpClient for FakeClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        let requested = req.url().clone();
        let (status, final_url, body) = match self.routes.get(requested.as_str()) {
            Some(route) => {
                let final_url = match &route.final_url {
                    Some(u) => Url::parse(u).expect("valid redirect target"),
                    None => requested,
                };
                (route.status, final_url, route.body.clone())
            }
            None => (404, requested, String::new()),
        };

        let resp = http::Response::builder()
            .status(status)
            .url(final_url)
            .body(body)
            .expect("valid canned response");
        Ok(Response::from(resp))
    }
}
