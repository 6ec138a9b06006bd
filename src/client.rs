//! Thin authenticated handle over the GitHub REST and GraphQL endpoints.

use itertools::Itertools;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Client,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Map, Value};

use crate::{
    config::Config,
    error::{ContribError, Result},
};

#[derive(Deserialize)]
struct User {
    login: String,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
struct Release {
    tag_name: String,
}

pub struct GitHubClient {
    http: Client,
    host: String,
    api_url: String,
    graphql_url: String,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ContribError::Config(format!("token is not a valid header: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        } else {
            log::debug!("no token configured, requests are unauthenticated");
        }
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| ContribError::Config(e.to_string()))?;
        Ok(GitHubClient {
            http,
            host: config.host.clone(),
            api_url: config.api_url.clone(),
            graphql_url: config.graphql_url.clone(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// REST `GET` relative to the api base.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> reqwest::Result<T> {
        let url = format!("{}{}", self.api_url, path.trim_start_matches('/'));
        log::debug!("GET {url}");
        self.http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Login of the user the token belongs to.
    pub async fn current_login(&self) -> Result<String> {
        let user: User = self
            .get("user")
            .await
            .map_err(|e| ContribError::Auth(e.to_string()))?;
        if user.login.is_empty() {
            return Err(ContribError::Auth("api returned an empty login".to_string()));
        }
        Ok(user.login)
    }

    pub async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: &Map<String, Value>,
    ) -> Result<T> {
        let fetch_err = |e: reqwest::Error| ContribError::Fetch(e.to_string());
        log::debug!("POST {} with variables {}", self.graphql_url, Value::Object(variables.clone()));
        let resp: GraphqlResponse<T> = self
            .http
            .post(&self.graphql_url)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(fetch_err)?
            .error_for_status()
            .map_err(fetch_err)?
            .json()
            .await
            .map_err(fetch_err)?;

        if let Some(errors) = resp.errors.filter(|errors| !errors.is_empty()) {
            return Err(ContribError::Fetch(
                errors.iter().map(|e| e.message.as_str()).join("; "),
            ));
        }
        resp.data
            .ok_or_else(|| ContribError::Fetch("response contained no data".to_string()))
    }

    /// Tag of the latest published release of `owner/repo`.
    pub async fn latest_release(&self, owner: &str, repo: &str) -> reqwest::Result<String> {
        let release: Release = self
            .get(&format!("repos/{owner}/{repo}/releases/latest"))
            .await?;
        Ok(release.tag_name)
    }
}
