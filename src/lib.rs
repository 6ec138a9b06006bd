pub mod client;
pub mod config;
pub mod contrib;
pub mod error;
pub mod range;
pub mod render;
pub mod version;

use chrono::NaiveDate;
use colored::Colorize;

use crate::{
    client::GitHubClient,
    contrib::{fetch_contributions, Order},
    range::DateRange,
    render::{print_table, render_table},
    version::{check_version, LocalRegistry},
};

type Result<T> = anyhow::Result<T>;

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub from: Option<String>,
    pub to: Option<String>,
    pub colorize: bool,
    /// Extension registry to check for a newer release, `None` skips the check.
    pub registry: Option<LocalRegistry>,
}

/// Prints the calendar of the authenticated user, newest day first.
pub async fn report(client: &GitHubClient, options: &ReportOptions, today: NaiveDate) -> Result<()> {
    // bad flags fail before any request is made
    let range = DateRange::resolve(options.from.as_deref(), options.to.as_deref(), today)?;
    let login = client.current_login().await?;
    log::info!("reporting contributions of {login} from {range}");

    let calendar =
        fetch_contributions(client, &login, Some(range.from()), Some(range.to())).await?;
    let days = calendar.flatten(Order::MostRecentFirst);
    log::debug!("{} days in {} weeks", days.len(), calendar.weeks.len());

    let table = render_table(&days, calendar.total_contributions);
    print_table(&table, options.colorize);

    if let Some(registry) = &options.registry
        && let Some(advisory) = check_version(registry, client).await
    {
        if options.colorize {
            println!("{}", advisory.to_string().white());
        } else {
            println!("{advisory}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::{config::Config, error::ContribError};

    fn client_for(server: &MockServer) -> GitHubClient {
        GitHubClient::new(&Config::with_api_url(&server.base_url(), Some("t".to_string())).unwrap())
            .unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    #[tokio::test]
    async fn report_makes_identity_then_contribution_call() {
        let server = MockServer::start_async().await;
        let user = server
            .mock_async(|when, then| {
                when.method(GET).path("/user");
                then.status(200).json_body(json!({ "login": "octocat" }));
            })
            .await;
        let graphql = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/graphql")
                    .body_contains(r#""from":"2023-12-28T00:00:00Z""#)
                    .body_contains(r#""to":"2024-01-02T00:00:00Z""#)
                    .body_contains(r#""userName":"octocat""#);
                then.status(200).json_body(json!({
                    "data": { "user": { "contributionsCollection": { "contributionCalendar": {
                        "totalContributions": 0,
                        "weeks": []
                    }}}}
                }));
            })
            .await;

        report(&client_for(&server), &ReportOptions::default(), today())
            .await
            .unwrap();

        user.assert_hits_async(1).await;
        graphql.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn invalid_flags_abort_before_any_request() {
        let server = MockServer::start_async().await;
        let user = server
            .mock_async(|when, then| {
                when.method(GET).path("/user");
                then.status(200).json_body(json!({ "login": "octocat" }));
            })
            .await;
        let options = ReportOptions {
            from: Some("2024-01-05".to_string()),
            to: Some("2024-01-01".to_string()),
            ..ReportOptions::default()
        };

        let err = report(&client_for(&server), &options, today()).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ContribError>(),
            Some(ContribError::InvalidRange { .. })
        ));
        user.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn auth_failure_skips_contribution_query() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/user");
                then.status(401);
            })
            .await;
        let graphql = server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(200);
            })
            .await;

        let err = report(&client_for(&server), &ReportOptions::default(), today())
            .await
            .unwrap_err();

        assert!(matches!(err.downcast_ref::<ContribError>(), Some(ContribError::Auth(_))));
        graphql.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn report_checks_the_given_registry_after_the_table() {
        let temp = tempfile::TempDir::new().unwrap();
        let ext_dir = temp.path().join("extensions").join("gh-contrib");
        std::fs::create_dir_all(&ext_dir).unwrap();
        std::fs::write(
            ext_dir.join("manifest.yml"),
            "owner: someone\nname: gh-contrib\nhost: github.com\ntag: v1.0.0\n",
        )
        .unwrap();

        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/user");
                then.status(200).json_body(json!({ "login": "octocat" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(200).json_body(json!({
                    "data": { "user": { "contributionsCollection": { "contributionCalendar": {
                        "totalContributions": 2,
                        "weeks": []
                    }}}}
                }));
            })
            .await;
        let release = server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/someone/gh-contrib/releases/latest");
                then.status(200).json_body(json!({ "tag_name": "v1.1.0" }));
            })
            .await;
        let options = ReportOptions {
            registry: Some(LocalRegistry::new(temp.path())),
            ..ReportOptions::default()
        };

        report(&client_for(&server), &options, today()).await.unwrap();

        release.assert_hits_async(1).await;
    }
}
