//! Contribution calendar types, the GraphQL query that fills them, and flattening.

use std::fmt::Display;

use chrono::{NaiveDate, NaiveTime, SecondsFormat};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    client::GitHubClient,
    error::{ContribError, Result},
};

const CONTRIBUTIONS_QUERY: &str = r#"
query($userName: String!, $from: DateTime, $to: DateTime) {
  user(login: $userName) {
    contributionsCollection(from: $from, to: $to) {
      contributionCalendar {
        totalContributions
        weeks {
          contributionDays {
            contributionCount
            contributionLevel
            date
          }
        }
      }
    }
  }
}"#;

/// Activity bucket GitHub assigns to a day. `None` is sent for days
/// without contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContributionLevel {
    None,
    FirstQuartile,
    SecondQuartile,
    ThirdQuartile,
    FourthQuartile,
}

impl ContributionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionLevel::None => "NONE",
            ContributionLevel::FirstQuartile => "FIRST_QUARTILE",
            ContributionLevel::SecondQuartile => "SECOND_QUARTILE",
            ContributionLevel::ThirdQuartile => "THIRD_QUARTILE",
            ContributionLevel::FourthQuartile => "FOURTH_QUARTILE",
        }
    }
}

impl Display for ContributionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ContributionDay {
    #[serde(rename = "contributionCount")]
    pub count: u32,
    #[serde(rename = "contributionLevel")]
    pub level: ContributionLevel,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    pub contribution_days: Vec<ContributionDay>,
}

/// Calendar as GitHub returns it: chronological weeks of chronological days.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCalendar {
    pub total_contributions: u32,
    pub weeks: Vec<Week>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Chronological,
    MostRecentFirst,
}

impl ContributionCalendar {
    /// Every day of every week, once. The total is not derived from these.
    pub fn flatten(&self, order: Order) -> Vec<ContributionDay> {
        let days = self
            .weeks
            .iter()
            .flat_map(|week| week.contribution_days.iter().copied());
        match order {
            Order::Chronological => days.collect(),
            Order::MostRecentFirst => days.rev().collect(),
        }
    }
}

#[derive(Deserialize)]
struct ContributionsData {
    user: Option<UserContributions>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserContributions {
    contributions_collection: ContributionsCollection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsCollection {
    contribution_calendar: ContributionCalendar,
}

fn rfc3339(date: NaiveDate) -> String {
    date.and_time(NaiveTime::MIN)
        .and_utc()
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Variables for the contributions query. Bounds that are `None` are left
/// out entirely so GitHub applies its own default window.
pub fn query_variables(
    login: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Map<String, Value> {
    let mut variables = Map::new();
    variables.insert("userName".to_string(), Value::from(login));
    if let Some(from) = from {
        variables.insert("from".to_string(), Value::from(rfc3339(from)));
    }
    if let Some(to) = to {
        variables.insert("to".to_string(), Value::from(rfc3339(to)));
    }
    variables
}

pub async fn fetch_contributions(
    client: &GitHubClient,
    login: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<ContributionCalendar> {
    if login.is_empty() {
        return Err(ContribError::Fetch("user login must not be empty".to_string()));
    }
    let variables = query_variables(login, from, to);
    let data: ContributionsData = client.graphql(CONTRIBUTIONS_QUERY, &variables).await?;
    let user = data
        .user
        .ok_or_else(|| ContribError::Fetch(format!("no such user: {login}")))?;
    Ok(user.contributions_collection.contribution_calendar)
}
