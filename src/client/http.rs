use super::ThingApi;
use crate::core::{ClientError, ClientResult};
use crate::model::Thing;
use crate::web::{ErrorResponse, VALIDATION_FAILED};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// [`ThingApi`] over HTTP, against the routes served by [`crate::web::build_router`].
#[derive(Debug, Clone)]
pub struct HttpThingClient {
    http: reqwest::Client,
    api: String,
}

impl HttpThingClient {
    /// `server` is the backend root, e.g. `http://localhost:8080/`.
    pub fn new(server: &str) -> ClientResult<Self> {
        Self::with_timeout(server, Duration::from_secs(10))
    }

    pub fn with_timeout(server: &str, timeout: Duration) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self::from_client(http, server))
    }

    pub fn from_client(http: reqwest::Client, server: &str) -> Self {
        let api = format!("{}/thing/", server.trim_end_matches('/'));
        Self { http, api }
    }

    fn url(&self, action: &str) -> String {
        format!("{}{}", self.api, action)
    }

    async fn read<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ClientError::Decode(e.to_string()));
        }

        // error bodies from our handlers are ErrorResponse; extractor
        // rejections and proxies answer with plain text
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<ErrorResponse>(&text).ok();
        debug!(status = status.as_u16(), body = %text, "thing api request failed");

        Err(match body {
            Some(body) if status == StatusCode::UNPROCESSABLE_ENTITY
                && body.code == VALIDATION_FAILED =>
            {
                ClientError::Rejected(body.error)
            }
            body => {
                let message = match body {
                    Some(body) => body.error,
                    None if !text.trim().is_empty() => text,
                    None => status.canonical_reason().unwrap_or("unknown").to_string(),
                };
                if status == StatusCode::NOT_FOUND {
                    ClientError::NotFound(message)
                } else {
                    ClientError::Server {
                        status: status.as_u16(),
                        message,
                    }
                }
            }
        })
    }
}

fn transport(err: reqwest::Error) -> ClientError {
    ClientError::Transport(err.to_string())
}

#[async_trait]
impl ThingApi for HttpThingClient {
    async fn get_things(&self) -> ClientResult<Vec<Thing>> {
        let response = self
            .http
            .get(self.url("getThings"))
            .send()
            .await
            .map_err(transport)?;
        Self::read(response).await
    }

    async fn get_thing(&self, id: i32) -> ClientResult<Option<Thing>> {
        let response = self
            .http
            .get(self.url(&format!("getThing/{id}")))
            .send()
            .await
            .map_err(transport)?;
        match Self::read(response).await {
            Ok(thing) => Ok(Some(thing)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn check_name_unique(&self, thing: &Thing) -> ClientResult<bool> {
        let response = self
            .http
            .post(self.url("validateName"))
            .json(thing)
            .send()
            .await
            .map_err(transport)?;
        Self::read(response).await
    }

    async fn check_valid(&self, thing: &Thing) -> ClientResult<bool> {
        let response = self
            .http
            .post(self.url("validate"))
            .json(thing)
            .send()
            .await
            .map_err(transport)?;
        Self::read(response).await
    }

    async fn persist(&self, thing: &Thing) -> ClientResult<Option<Thing>> {
        let response = self
            .http
            .post(self.url("save"))
            .json(thing)
            .send()
            .await
            .map_err(transport)?;
        Self::read(response).await
    }

    async fn remove(&self, id: i32) -> ClientResult<u64> {
        let response = self
            .http
            .delete(self.url(&format!("remove/{id}")))
            .send()
            .await
            .map_err(transport)?;
        Self::read(response).await
    }
}
