// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use dayplan_app::{Activity, ActivityId, ActivitySource, SelectionSink};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const ACTIVITIES_PATH: &str = "/activities";
pub const ESSENTIAL_ACTIVITIES_PATH: &str = "/essential-activities";

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    token: Option<String>,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let parsed =
            Url::parse(&base_url).with_context(|| format!("api.base_url {base_url:?} is not a URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "api.base_url must use http or https, got {:?}",
                parsed.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            token: None,
            http,
        })
    }

    pub fn with_token(mut self, token: Option<&str>) -> Self {
        self.token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_owned);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get_activities(&self) -> Result<Vec<Activity>> {
        let response = self
            .authorize(self.http.get(format!("{}{ACTIVITIES_PATH}", self.base_url)))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let parsed: ActivitiesResponse = response.json().context("decode activity catalog")?;
        let activities = parsed.into_activities();
        debug!(count = activities.len(), "fetched activity catalog");
        Ok(activities)
    }

    pub fn submit_essential_activities(&self, ids: &[ActivityId]) -> Result<()> {
        let request = SubmitRequest { activity_ids: ids };
        let response = self
            .authorize(
                self.http
                    .post(format!("{}{ESSENTIAL_ACTIVITIES_PATH}", self.base_url))
                    .json(&request),
            )
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        debug!(count = ids.len(), "submitted essential activities");
        Ok(())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl ActivitySource for Client {
    fn fetch_activities(&self) -> Result<Vec<Activity>> {
        self.get_activities()
    }
}

impl SelectionSink for Client {
    fn submit_essential_activities(&self, ids: &[ActivityId]) -> Result<()> {
        Client::submit_essential_activities(self, ids)
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check [api].base_url or DAYPLAN_API_URL ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.error.or(parsed.message)
        && !message.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), body);
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    activity_ids: &'a [ActivityId],
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ActivitiesResponse {
    Bare(Vec<Activity>),
    Wrapped { activities: Vec<Activity> },
}

impl ActivitiesResponse {
    fn into_activities(self) -> Vec<Activity> {
        match self {
            Self::Bare(activities) | Self::Wrapped { activities } => activities,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{ActivitiesResponse, Client, SubmitRequest, clean_error_response};
    use anyhow::Result;
    use dayplan_app::ActivityId;
    use reqwest::StatusCode;
    use std::time::Duration;

    #[test]
    fn new_rejects_bad_base_urls() {
        for bad in ["", "///", "not a url", "ftp://example.com"] {
            assert!(
                Client::new(bad, Duration::from_secs(1)).is_err(),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn new_trims_trailing_slashes() -> Result<()> {
        let client = Client::new("http://localhost:8080/api//", Duration::from_secs(1))?;
        assert_eq!(client.base_url(), "http://localhost:8080/api");
        Ok(())
    }

    #[test]
    fn blank_token_is_dropped() -> Result<()> {
        let client =
            Client::new("http://localhost:8080", Duration::from_secs(1))?.with_token(Some("  "));
        assert!(client.token.is_none());
        Ok(())
    }

    #[test]
    fn catalog_accepts_bare_and_wrapped_arrays() -> Result<()> {
        let bare: ActivitiesResponse =
            serde_json::from_str(r#"[{"id":1,"title":"Hiking"},{"id":2,"title":"Museum Tour"}]"#)?;
        assert_eq!(bare.into_activities().len(), 2);

        let wrapped: ActivitiesResponse =
            serde_json::from_str(r#"{"activities":[{"id":3,"title":"Beach Day"}]}"#)?;
        let activities = wrapped.into_activities();
        assert_eq!(activities[0].title, "Beach Day");
        Ok(())
    }

    #[test]
    fn submit_request_serializes_plain_ids() -> Result<()> {
        let ids = [ActivityId::new(3), ActivityId::new(1), ActivityId::new(4)];
        let encoded = serde_json::to_string(&SubmitRequest { activity_ids: &ids })?;
        assert_eq!(encoded, r#"{"activity_ids":[3,1,4]}"#);
        Ok(())
    }

    #[test]
    fn error_response_prefers_server_message() {
        let error = clean_error_response(
            StatusCode::BAD_REQUEST,
            r#"{"error":"unknown activity 99"}"#,
        );
        assert_eq!(error.to_string(), "server error (400): unknown activity 99");

        let error = clean_error_response(StatusCode::UNAUTHORIZED, r#"{"message":"bad token"}"#);
        assert_eq!(error.to_string(), "server error (401): bad token");

        let error = clean_error_response(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(error.to_string(), "server error (502): upstream down");

        let error = clean_error_response(StatusCode::INTERNAL_SERVER_ERROR, "{\"weird\":true}");
        assert_eq!(error.to_string(), "server returned 500");
    }
}
