use std::time::Duration;

use async_trait::async_trait;
use liftsync_core::config::RemoteConfig;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{RemoteError, RemoteResult};
use crate::rows::{
    ExerciseDetailRow, ExerciseRow, RemoteTemplate, RemoteWorkout, SetRow, TemplateExerciseRow,
    TemplateRow, WorkoutRow,
};
use crate::traits::RemoteDatabase;

const WORKOUT_SELECT: &str = "*,workout_exercise_details(*,workout_sets(*),exercises(*))";
const TEMPLATE_SELECT: &str = "*,template_exercises(*,exercises(*))";

/// PostgREST-style HTTP implementation of [`RemoteDatabase`].
///
/// Tables are addressed as `{base_url}/rest/v1/{table}`; filters use the
/// `column=eq.value` query convention.
pub struct RestRemote {
    base_url: String,
    api_key: String,
    access_token: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct InsertedId {
    id: String,
}

impl RestRemote {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> RemoteResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(RemoteError::Config("remote base_url is empty".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Config(e.to_string()))?;
        Ok(Self {
            base_url,
            api_key,
            access_token: None,
            client,
        })
    }

    /// Authorize requests as a signed-in user instead of the anonymous key.
    ///
    /// The API key is still sent as `apikey`; blank tokens are ignored.
    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self
    }

    /// Build from config, reading the API key from the configured env var.
    pub fn from_config(config: &RemoteConfig) -> RemoteResult<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            RemoteError::Config(format!("API key env var {} is not set", config.api_key_env))
        })?;
        Self::new(
            &config.base_url,
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        req.header("apikey", &self.api_key).bearer_auth(bearer)
    }

    async fn check(resp: Response) -> RemoteResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(status_error(status, body))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> RemoteResult<Vec<T>> {
        let req = self.authed(self.client.get(self.table_url(table))).query(query);
        let resp = Self::check(req.send().await?).await?;
        resp.json::<Vec<T>>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn upsert<T: Serialize + ?Sized>(&self, table: &str, body: &T) -> RemoteResult<()> {
        let req = self
            .authed(self.client.post(self.table_url(table)))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(body);
        Self::check(req.send().await?).await?;
        Ok(())
    }

    async fn insert<T: Serialize + ?Sized>(&self, table: &str, body: &T) -> RemoteResult<()> {
        let req = self
            .authed(self.client.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(body);
        Self::check(req.send().await?).await?;
        Ok(())
    }

    async fn delete_where(&self, table: &str, column: &str, value: &str) -> RemoteResult<()> {
        let req = self
            .authed(self.client.delete(self.table_url(table)))
            .query(&[(column, format!("eq.{value}"))]);
        Self::check(req.send().await?).await?;
        Ok(())
    }
}

fn status_error(status: StatusCode, body: String) -> RemoteError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthenticated,
        _ => RemoteError::Http {
            status: status.as_u16(),
            body,
        },
    }
}

#[async_trait]
impl RemoteDatabase for RestRemote {
    async fn upsert_workout(&self, row: &WorkoutRow) -> RemoteResult<()> {
        self.upsert("workouts", row).await
    }

    async fn delete_exercise_details(&self, workout_id: &str) -> RemoteResult<()> {
        self.delete_where("workout_exercise_details", "workout_id", workout_id)
            .await
    }

    async fn insert_exercise_details(&self, rows: &[ExerciseDetailRow]) -> RemoteResult<Vec<String>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let req = self
            .authed(self.client.post(self.table_url("workout_exercise_details")))
            .query(&[("select", "id")])
            .header("Prefer", "return=representation")
            .json(rows);
        let resp = Self::check(req.send().await?).await?;
        let inserted: Vec<InsertedId> = resp
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        if inserted.len() != rows.len() {
            return Err(RemoteError::Decode(format!(
                "expected {} inserted exercise details, got {}",
                rows.len(),
                inserted.len()
            )));
        }
        Ok(inserted.into_iter().map(|r| r.id).collect())
    }

    async fn insert_sets(&self, rows: &[SetRow]) -> RemoteResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.insert("workout_sets", rows).await
    }

    async fn fetch_workouts(&self, user_id: &str) -> RemoteResult<Vec<RemoteWorkout>> {
        self.select(
            "workouts",
            &[
                ("select", WORKOUT_SELECT.to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("status", "eq.completed".to_string()),
                ("order", "completed_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn upsert_template(&self, row: &TemplateRow) -> RemoteResult<()> {
        self.upsert("workout_templates", row).await
    }

    async fn delete_template_exercises(&self, template_id: &str) -> RemoteResult<()> {
        self.delete_where("template_exercises", "template_id", template_id)
            .await
    }

    async fn insert_template_exercises(&self, rows: &[TemplateExerciseRow]) -> RemoteResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.insert("template_exercises", rows).await
    }

    async fn fetch_templates(&self, user_id: &str) -> RemoteResult<Vec<RemoteTemplate>> {
        self.select(
            "workout_templates",
            &[
                ("select", TEMPLATE_SELECT.to_string()),
                ("user_id", format!("eq.{user_id}")),
            ],
        )
        .await
    }

    async fn fetch_template(&self, id: &str) -> RemoteResult<Option<RemoteTemplate>> {
        let mut found: Vec<RemoteTemplate> = self
            .select(
                "workout_templates",
                &[
                    ("select", TEMPLATE_SELECT.to_string()),
                    ("id", format!("eq.{id}")),
                ],
            )
            .await?;
        Ok(found.pop())
    }

    async fn delete_template(&self, id: &str) -> RemoteResult<()> {
        self.delete_where("workout_templates", "id", id).await
    }

    async fn fetch_exercise(&self, id: &str) -> RemoteResult<Option<ExerciseRow>> {
        let mut found: Vec<ExerciseRow> = self
            .select(
                "exercises",
                &[("select", "*".to_string()), ("id", format!("eq.{id}"))],
            )
            .await?;
        Ok(found.pop())
    }

    async fn fetch_exercises(&self) -> RemoteResult<Vec<ExerciseRow>> {
        self.select(
            "exercises",
            &[("select", "*".to_string()), ("order", "name.asc".to_string())],
        )
        .await
    }
}
