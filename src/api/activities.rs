//! Athlete activity list (`/athlete/activities`)

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde_json::Value;

use super::client::StravaClient;

/// Largest page Strava serves; only the first page is fetched.
pub const PER_PAGE: u32 = 200;

/// `(after, before)` epoch bounds for one calendar year (UTC), capped at `now`.
pub fn year_window(year: i32, now: DateTime<Utc>) -> Result<(i64, i64)> {
    if year > now.year() {
        bail!("Year {} is in the future", year);
    }

    let start = Utc
        .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .with_context(|| format!("Invalid year {}", year))?;
    let next = Utc
        .with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0)
        .single()
        .with_context(|| format!("Invalid year {}", year))?;

    Ok((start.timestamp(), now.min(next).timestamp()))
}

/// Fetch the first page of the athlete's activities for `year`.
pub async fn fetch_activities(
    client: &StravaClient,
    year: i32,
    now: DateTime<Utc>,
) -> Result<Vec<Value>> {
    let (after, before) = year_window(year, now)?;
    tracing::info!("Fetching activities for {}...", year);

    let query = [
        ("before", before.to_string()),
        ("after", after.to_string()),
        ("page", "1".to_string()),
        ("per_page", PER_PAGE.to_string()),
    ];
    let activities: Vec<Value> = client.get_json("/athlete/activities", &query).await?;

    if activities.len() as u32 >= PER_PAGE {
        tracing::warn!(
            "Received a full page of {} activities; later ones are not fetched",
            PER_PAGE
        );
    }
    Ok(activities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_year_window_current_year_capped_at_now() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let (after, before) = year_window(2025, now).unwrap();
        assert_eq!(after, 1_735_689_600); // 2025-01-01T00:00:00Z
        assert_eq!(before, now.timestamp());
    }

    #[test]
    fn test_year_window_past_year_ends_at_new_year() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let (after, before) = year_window(2024, now).unwrap();
        assert_eq!(after, 1_704_067_200); // 2024-01-01T00:00:00Z
        assert_eq!(before, 1_735_689_600);
    }

    #[test]
    fn test_year_window_future_year() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert!(year_window(2026, now).is_err());
    }

    #[tokio::test]
    async fn test_fetch_activities_query() {
        let server = MockServer::start().await;
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        Mock::given(method("GET"))
            .and(path("/athlete/activities"))
            .and(query_param("after", "1735689600"))
            .and(query_param("before", now.timestamp().to_string()))
            .and(query_param("page", "1"))
            .and(query_param("per_page", "200"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "type": "Run"},
                {"id": 2, "type": "Ride"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = StravaClient::new(&server.uri(), "tok").unwrap();
        let activities = fetch_activities(&client, 2025, now).await.unwrap();
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[1]["type"], "Ride");
    }
}
