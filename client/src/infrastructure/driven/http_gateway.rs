use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    join_numbers, Acknowledgement, ContestConfigResponse, ErrorResponse, GuessProgressPayload,
    GuessRequest, GuessResponse, ParticipantPayload, ParticipationCheckResponse,
    RegisterOutcomeRequest,
};
use tracing::debug;
use url::Url;

use crate::application::ports::{
    ContestConfig, ContestDirectory, GatewayError, GuessEvaluator, OutcomeReporter,
    ParticipationRegistry,
};
use crate::config::BackendSettings;
use crate::domain::aggregates::SessionSummary;
use crate::domain::value_objects::{
    ContestId, Email, Evaluation, ParticipationStatus, Verdict,
};

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::Decode(e.to_string())
        } else {
            GatewayError::Transport(e.to_string())
        }
    }
}

/// reqwest adapter for every backend port of the guessing game
pub struct HttpContestGateway {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpContestGateway {
    pub fn new(settings: &BackendSettings) -> Result<Self, GatewayError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", settings.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(settings.base_url.clone()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_token: settings.api_token.clone().filter(|t| !t.is_empty()),
        })
    }

    /// `{base}/contests/{id}/{tail...}` with every segment percent-encoded
    fn endpoint(&self, contest_id: &ContestId, tail: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| GatewayError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().push("contests").push(contest_id.as_str());
            segments.extend(tail);
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn ensure_success(response: Response) -> Result<Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        Err(GatewayError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ContestDirectory for HttpContestGateway {
    async fn fetch_contest(&self, contest_id: &ContestId) -> Result<ContestConfig, GatewayError> {
        let url = self.endpoint(contest_id, &[])?;
        debug!("GET {}", url);
        let response = self.authorize(self.client.get(url)).send().await?;
        let body: ContestConfigResponse = Self::read_json(response).await?;

        Ok(ContestConfig {
            contest_id: ContestId::new(body.id).unwrap_or_else(|_| contest_id.clone()),
            title: body.title,
            min_value: body.min_value,
            max_value: body.max_value,
            max_attempts: body.max_attempts,
            status: body.status,
        })
    }
}

#[async_trait]
impl ParticipationRegistry for HttpContestGateway {
    async fn check_participation(
        &self,
        contest_id: &ContestId,
        email: &Email,
    ) -> Result<ParticipationStatus, GatewayError> {
        let mut url = self.endpoint(contest_id, &["participation"])?;
        url.query_pairs_mut().append_pair("email", email.as_str());
        debug!("GET {}", url);
        let response = self.authorize(self.client.get(url)).send().await?;
        let body: ParticipationCheckResponse = Self::read_json(response).await?;

        Ok(ParticipationStatus {
            already_participated: body.already_participated,
            message: body.message,
        })
    }
}

#[async_trait]
impl GuessEvaluator for HttpContestGateway {
    async fn evaluate(
        &self,
        contest_id: &ContestId,
        value: i64,
    ) -> Result<Evaluation, GatewayError> {
        let url = self.endpoint(contest_id, &["guesses"])?;
        debug!("POST {} value={}", url, value);
        let response = self
            .authorize(self.client.post(url))
            .json(&GuessRequest { guessed_value: value })
            .send()
            .await?;
        let body: GuessResponse = Self::read_json(response).await?;

        Ok(Evaluation {
            verdict: Verdict::from_status(&body.status),
            message: body.message,
        })
    }
}

#[async_trait]
impl OutcomeReporter for HttpContestGateway {
    async fn report(&self, summary: &SessionSummary) -> Result<String, GatewayError> {
        let url = self.endpoint(&summary.contest_id, &["participants"])?;
        let participant = &summary.participant;
        let request = RegisterOutcomeRequest {
            user: ParticipantPayload {
                name: participant.name.to_string(),
                surname: participant.surname.clone(),
                email: participant.email.to_string(),
                phone: participant.phone.clone(),
            },
            guess_progress: GuessProgressPayload {
                attempt_count: summary.attempt_count,
                numbers_tried: join_numbers(&summary.entered_numbers),
                has_won: summary.has_won(),
                last_attempt_time: summary.completed_at.to_rfc3339(),
                duration_seconds: summary.elapsed_seconds,
            },
        };
        debug!("POST {} for session {}", url, summary.session_id);
        let response = self
            .authorize(self.client.post(url))
            .json(&request)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        let ack: Acknowledgement = serde_json::from_str(&body).unwrap_or_default();
        Ok(ack.message.unwrap_or_default())
    }
}
