//! Environment driven settings: which host to talk to and how to authenticate.

use std::{env, process::Command};

use reqwest::Url;

use crate::error::{ContribError, Result};

pub const DEFAULT_HOST: &str = "github.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub token: Option<String>,
    /// REST base, always ending in `/`.
    pub api_url: String,
    pub graphql_url: String,
}

impl Config {
    /// Reads the process environment, falling back to the token of the
    /// current `gh` session when no token variable is set.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::from_lookup(|key| env::var(key).ok())?;
        if config.token.is_none() {
            config.token = gh_auth_token(&config.host);
        }
        Ok(config)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let host = lookup("GH_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let enterprise = host != DEFAULT_HOST;

        // enterprise hosts prefer their own tokens, the public ones are a fallback
        let public_token = || lookup("GH_TOKEN").or_else(|| lookup("GITHUB_TOKEN"));
        let token = if enterprise {
            lookup("GH_ENTERPRISE_TOKEN")
                .or_else(|| lookup("GITHUB_ENTERPRISE_TOKEN"))
                .or_else(public_token)
        } else {
            public_token()
        };

        match lookup("GH_CONTRIB_API_URL") {
            Some(api_url) => {
                let mut config = Self::with_api_url(&api_url, token)?;
                config.host = host;
                Ok(config)
            }
            None => Self::for_host(&host, token),
        }
    }

    /// Default endpoints of `host`: api.github.com for github.com, the
    /// `/api/v3/` and `/api/graphql` paths of an Enterprise server otherwise.
    pub fn for_host(host: &str, token: Option<String>) -> Result<Self> {
        let mut config = if host == DEFAULT_HOST {
            Self::with_urls(
                "https://api.github.com/".to_string(),
                "https://api.github.com/graphql".to_string(),
                token,
            )?
        } else {
            Self::with_urls(
                format!("https://{host}/api/v3/"),
                format!("https://{host}/api/graphql"),
                token,
            )?
        };
        config.host = host.to_string();
        Ok(config)
    }

    /// Points both REST and GraphQL at one base url, GraphQL living at `<base>/graphql`.
    pub fn with_api_url(api_url: &str, token: Option<String>) -> Result<Self> {
        let mut api_url = api_url.to_string();
        if !api_url.ends_with('/') {
            api_url.push('/');
        }
        let graphql_url = format!("{api_url}graphql");
        Self::with_urls(api_url, graphql_url, token)
    }

    fn with_urls(api_url: String, graphql_url: String, token: Option<String>) -> Result<Self> {
        for url in [&api_url, &graphql_url] {
            Url::parse(url).map_err(|e| ContribError::Config(format!("invalid api url {url:?}: {e}")))?;
        }
        Ok(Config {
            host: DEFAULT_HOST.to_string(),
            token,
            api_url,
            graphql_url,
        })
    }
}

fn gh_auth_token(host: &str) -> Option<String> {
    let output = Command::new("gh")
        .args(["auth", "token", "--hostname", host])
        .output()
        .ok()?;
    if !output.status.success() {
        log::debug!("`gh auth token` exited with {}", output.status);
        return None;
    }
    let token = String::from_utf8(output.stdout).ok()?.trim().to_string();
    if token.is_empty() {
        return None;
    }
    log::info!("Using token from the gh session for {host}");
    Some(token)
}
