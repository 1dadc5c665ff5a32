//! Zoom REST client.
//!
//! Each request carries a short-lived HS256 bearer token signed with the
//! account's API secret. Every call is bounded by the configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;
use crate::domain::meeting::{MeetingDetails, MeetingRef, MeetingRequest, MeetingUpdate};
use crate::ports::{MeetingProvider, MeetingProviderError};

/// Lifetime of a minted bearer token, in seconds.
const TOKEN_TTL_SECS: i64 = 60;

/// Zoom meeting type for a one-off scheduled meeting.
const SCHEDULED_MEETING: u8 = 2;

#[derive(Debug, Clone)]
pub struct ZoomConfig {
    pub api_key: String,
    pub api_secret: SecretString,
    /// Host account (`me` for the key owner)
    pub user_id: String,
    pub base_url: String,
    pub timeout: Duration,
}

pub struct ZoomMeetingProvider {
    config: ZoomConfig,
    client: Client,
}

#[derive(Debug, Serialize, Deserialize)]
struct BearerClaims {
    iss: String,
    exp: i64,
}

#[derive(Debug, Serialize)]
struct CreateMeetingBody<'a> {
    topic: &'a str,
    #[serde(rename = "type")]
    meeting_type: u8,
    start_time: String,
    duration: i64,
    timezone: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    agenda: Option<&'a str>,
    settings: MeetingSettings,
}

#[derive(Debug, Serialize)]
struct MeetingSettings {
    join_before_host: bool,
    waiting_room: bool,
}

#[derive(Debug, Default, Serialize)]
struct UpdateMeetingBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    agenda: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct MeetingResponse {
    id: u64,
    join_url: String,
    #[serde(default)]
    topic: String,
    start_time: Option<chrono::DateTime<chrono::Utc>>,
    duration: Option<i64>,
}

impl MeetingResponse {
    fn into_details(self) -> Result<MeetingDetails, MeetingProviderError> {
        let id = MeetingRef::new(self.id.to_string()).ok_or_else(|| MeetingProviderError::Api {
            status: 200,
            message: format!("unusable meeting id {}", self.id),
        })?;
        Ok(MeetingDetails {
            id,
            join_url: self.join_url,
            topic: self.topic,
            start_time: self.start_time.map(Timestamp::from_datetime),
            duration_minutes: self.duration,
        })
    }
}

fn zoom_time(ts: &Timestamp) -> String {
    ts.as_datetime().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

impl ZoomMeetingProvider {
    pub fn new(config: ZoomConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn bearer(&self) -> Result<String, MeetingProviderError> {
        let claims = BearerClaims {
            iss: self.config.api_key.clone(),
            exp: chrono::Utc::now().timestamp() + TOKEN_TTL_SECS,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.api_secret.expose_secret().as_bytes()),
        )
        .map_err(|_| MeetingProviderError::Unauthorized)
    }

    fn meeting_url(&self, meeting: &MeetingRef) -> String {
        format!("{}/meetings/{}", self.config.base_url.trim_end_matches('/'), meeting)
    }

    fn create_url(&self) -> String {
        format!(
            "{}/users/{}/meetings",
            self.config.base_url.trim_end_matches('/'),
            self.config.user_id
        )
    }

    async fn check(
        response: Response,
        meeting: Option<&MeetingRef>,
    ) -> Result<Response, MeetingProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_status(status, meeting, body))
    }
}

fn map_status(status: StatusCode, meeting: Option<&MeetingRef>, body: String) -> MeetingProviderError {
    match (status, meeting) {
        (StatusCode::UNAUTHORIZED, _) => MeetingProviderError::Unauthorized,
        (StatusCode::NOT_FOUND, Some(id)) => MeetingProviderError::NotFound(id.to_string()),
        _ => MeetingProviderError::Api {
            status: status.as_u16(),
            message: body,
        },
    }
}

fn transport(e: reqwest::Error) -> MeetingProviderError {
    if e.is_timeout() {
        MeetingProviderError::Transport("request timed out".to_string())
    } else {
        MeetingProviderError::Transport(e.to_string())
    }
}

#[async_trait]
impl MeetingProvider for ZoomMeetingProvider {
    async fn create(&self, request: &MeetingRequest) -> Result<MeetingDetails, MeetingProviderError> {
        let body = CreateMeetingBody {
            topic: &request.topic,
            meeting_type: SCHEDULED_MEETING,
            start_time: zoom_time(&request.start_time),
            duration: request.duration_minutes,
            timezone: "UTC",
            agenda: request.agenda.as_deref(),
            settings: MeetingSettings {
                join_before_host: false,
                waiting_room: true,
            },
        };

        let response = self
            .client
            .post(self.create_url())
            .bearer_auth(self.bearer()?)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let response = Self::check(response, None).await?;

        let meeting: MeetingResponse = response
            .json()
            .await
            .map_err(|e| MeetingProviderError::Transport(format!("invalid response body: {}", e)))?;
        let details = meeting.into_details()?;
        tracing::debug!(meeting_id = %details.id, "Zoom meeting created");
        Ok(details)
    }

    async fn get(&self, meeting: &MeetingRef) -> Result<MeetingDetails, MeetingProviderError> {
        let response = self
            .client
            .get(self.meeting_url(meeting))
            .bearer_auth(self.bearer()?)
            .send()
            .await
            .map_err(transport)?;
        let response = Self::check(response, Some(meeting)).await?;

        response
            .json::<MeetingResponse>()
            .await
            .map_err(|e| MeetingProviderError::Transport(format!("invalid response body: {}", e)))?
            .into_details()
    }

    async fn update(
        &self,
        meeting: &MeetingRef,
        update: &MeetingUpdate,
    ) -> Result<(), MeetingProviderError> {
        if update.is_empty() {
            return Ok(());
        }
        let body = UpdateMeetingBody {
            topic: update.topic.as_deref(),
            start_time: update.start_time.as_ref().map(zoom_time),
            duration: update.duration_minutes,
            agenda: update.agenda.as_deref(),
        };

        let response = self
            .client
            .patch(self.meeting_url(meeting))
            .bearer_auth(self.bearer()?)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        Self::check(response, Some(meeting)).await?;
        Ok(())
    }

    async fn delete(&self, meeting: &MeetingRef) -> Result<(), MeetingProviderError> {
        let response = self
            .client
            .delete(self.meeting_url(meeting))
            .bearer_auth(self.bearer()?)
            .send()
            .await
            .map_err(transport)?;
        Self::check(response, Some(meeting)).await?;
        Ok(())
    }
}
