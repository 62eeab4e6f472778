use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Opaque failure from the remote collaborator. Transport, auth and
/// timeouts all live on the other side of this seam; only a message
/// crosses it.
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct ApiError(pub String);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Opaque pass/fail verdict from the remote validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// The remote design-tool API, request/response only.
///
/// `get_files` returns an archive envelope: an opaque JSON object carrying
/// a base64 zip of YAML documents (see `pagelens_archive::decode_archive`).
/// With `file_key = None` it returns the whole project bundle; with a key,
/// a bundle holding at least that file.
#[async_trait]
pub trait ProjectApi: Send + Sync {
    async fn list_files(&self, project_id: &str) -> ApiResult<Vec<String>>;

    async fn get_files(
        &self,
        project_id: &str,
        file_key: Option<&str>,
    ) -> ApiResult<serde_json::Value>;

    async fn validate(
        &self,
        project_id: &str,
        file_key: &str,
        content: &str,
    ) -> ApiResult<Validation>;

    async fn update(
        &self,
        project_id: &str,
        files: HashMap<String, String>,
    ) -> ApiResult<serde_json::Value>;
}
