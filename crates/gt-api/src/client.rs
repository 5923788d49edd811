// client.rs - GoalsApi trait and its reqwest implementation.
//
// Every endpoint is a single JSON request/response. No retries, no
// timeouts: a failed call surfaces as an ApiError and the caller decides
// how to report it.

use async_trait::async_trait;
use gt_goal::{Goal, Step};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::wire::{GenerateStepsRequest, GenerateStepsResponse, StepPatch};

/// The calls the goals page makes against the backend.
#[async_trait]
pub trait GoalsApi: Send + Sync {
    /// `GET /api/goals`
    async fn list_goals(&self) -> Result<Vec<Goal>, ApiError>;

    /// `GET /api/goals/:id`
    async fn get_goal(&self, goal_id: &str) -> Result<Goal, ApiError>;

    /// `POST /api/goals`, steps included.
    async fn create_goal(&self, goal: &Goal) -> Result<Goal, ApiError>;

    /// `PUT /api/goals/:id`, id taken from `goal.id`.
    async fn update_goal(&self, goal: &Goal) -> Result<Goal, ApiError>;

    /// `DELETE /api/goals/:id`
    async fn delete_goal(&self, goal_id: &str) -> Result<(), ApiError>;

    /// `PUT /api/goals/steps/:id` with a partial step.
    async fn update_step(&self, step_id: &str, patch: &StepPatch) -> Result<Step, ApiError>;

    /// `POST /api/ai/generate-steps`
    async fn generate_steps(&self, request: &GenerateStepsRequest) -> Result<Vec<Step>, ApiError>;
}

/// [`GoalsApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGoalsApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGoalsApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("gt/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self::with_client(client, config))
    }

    /// Use an existing client (shared connection pool).
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.normalized_base_url().to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Response, ApiError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.url(path);
        tracing::debug!(%method, %url, "goals api request");

        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| ApiError::Transport {
            method: method.to_string(),
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                method: method.to_string(),
                url,
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.send(method, path, body).await?;
        let url = response.url().to_string();
        response
            .json::<T>()
            .await
            .map_err(|source| ApiError::Decode { url, source })
    }
}

fn goal_path(goal_id: &str) -> String {
    format!("/api/goals/{}", urlencoding::encode(goal_id))
}

fn step_path(step_id: &str) -> String {
    format!("/api/goals/steps/{}", urlencoding::encode(step_id))
}

#[async_trait]
impl GoalsApi for HttpGoalsApi {
    async fn list_goals(&self) -> Result<Vec<Goal>, ApiError> {
        self.send_json(Method::GET, "/api/goals", None::<&()>).await
    }

    async fn get_goal(&self, goal_id: &str) -> Result<Goal, ApiError> {
        self.send_json(Method::GET, &goal_path(goal_id), None::<&()>)
            .await
    }

    async fn create_goal(&self, goal: &Goal) -> Result<Goal, ApiError> {
        self.send_json(Method::POST, "/api/goals", Some(goal)).await
    }

    async fn update_goal(&self, goal: &Goal) -> Result<Goal, ApiError> {
        if goal.id.is_empty() {
            return Err(ApiError::MissingId);
        }
        self.send_json(Method::PUT, &goal_path(&goal.id), Some(goal))
            .await
    }

    async fn delete_goal(&self, goal_id: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, &goal_path(goal_id), None::<&()>)
            .await?;
        Ok(())
    }

    async fn update_step(&self, step_id: &str, patch: &StepPatch) -> Result<Step, ApiError> {
        self.send_json(Method::PUT, &step_path(step_id), Some(patch))
            .await
    }

    async fn generate_steps(&self, request: &GenerateStepsRequest) -> Result<Vec<Step>, ApiError> {
        let response: GenerateStepsResponse = self
            .send_json(Method::POST, "/api/ai/generate-steps", Some(request))
            .await?;
        Ok(response.steps)
    }
}
