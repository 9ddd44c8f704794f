use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use chainscript_ledger::{validate_content, DerivationRef, Entry, Ledger};
use chainscript_registry::StorySummary;
use chainscript_types::StoryId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::Credentials;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateStoryRequest {
    pub story_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub parent_story_id: Option<String>,
    #[serde(default)]
    pub parent_entry_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PassageRequest {
    pub passage: String,
    pub author: String,
    #[serde(default)]
    pub story_id: Option<String>,
    #[serde(default)]
    pub branch_source_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MineRequest {
    pub block_index: usize,
    #[serde(default)]
    pub story_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResubmitRequest {
    pub block_index: usize,
    pub author: String,
    #[serde(default)]
    pub story_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    pub story_id: Option<String>,
}

/// Full view of one story.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoryResponse {
    pub story_id: StoryId,
    pub title: String,
    pub derivation: Option<DerivationRef>,
    pub chain: Vec<Entry>,
    pub pending: Vec<Entry>,
    pub story_text: String,
}

impl StoryResponse {
    fn build(story_id: StoryId, ledger: &Ledger) -> ServerResult<Self> {
        Ok(Self {
            story_id,
            title: ledger.title().to_string(),
            derivation: ledger.derivation().cloned(),
            chain: ledger.committed()?,
            pending: ledger.pending()?,
            story_text: ledger.full_text()?,
        })
    }
}

pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "ChainScript API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

/// Run registry work on the blocking pool. Registry calls take std locks
/// and may hit the filesystem, so they stay off the async workers.
async fn blocking<T, F>(work: F) -> ServerResult<T>
where
    F: FnOnce() -> ServerResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
}

pub async fn list_stories(State(state): State<AppState>) -> ServerResult<Json<Vec<StorySummary>>> {
    let rows = blocking(move || Ok(state.registry.summaries()?)).await?;
    Ok(Json(rows))
}

pub async fn create_story(
    State(state): State<AppState>,
    Json(request): Json<CreateStoryRequest>,
) -> ServerResult<(StatusCode, Json<StoryResponse>)> {
    let story_id =
        StoryId::new(request.story_id.as_str()).map_err(|e| ServerError::BadRequest(e.to_string()))?;

    let derivation = match (request.parent_story_id, request.parent_entry_hash) {
        (Some(story), Some(hash)) => Some(DerivationRef::parse(&story, &hash)?),
        (None, None) => None,
        _ => {
            return Err(ServerError::BadRequest(
                "parent_story_id and parent_entry_hash must be given together".into(),
            ))
        }
    };
    let title = request
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| story_id.to_string());

    let story = blocking(move || {
        let ledger = state
            .registry
            .create_story(story_id.clone(), title, derivation)?;
        StoryResponse::build(story_id, &ledger)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(story)))
}

pub async fn get_story(
    State(state): State<AppState>,
    Path(story_id): Path<String>,
) -> ServerResult<Json<StoryResponse>> {
    let id = StoryId::new(story_id.as_str()).map_err(|_| ServerError::StoryNotFound(story_id))?;
    let story = blocking(move || {
        let ledger = state.registry.ledger(&id)?;
        StoryResponse::build(id, &ledger)
    })
    .await?;
    Ok(Json(story))
}

pub async fn submit_passage(
    State(state): State<AppState>,
    Json(request): Json<PassageRequest>,
) -> ServerResult<Json<Value>> {
    let story_id = state.story_or_default(request.story_id.as_deref())?;
    validate_content(&request.passage)?;

    let target = story_id.clone();
    let entry = blocking(move || {
        state.registry.get_or_create(&target)?;
        Ok(state.registry.submit(
            &target,
            &request.passage,
            &request.author,
            request.branch_source_hash,
        )?)
    })
    .await?;

    Ok(Json(json!({
        "message": "Passage created and added to pending blocks",
        "story_id": story_id,
        "entry": entry,
        "status": "pending_verification",
    })))
}

pub async fn mine(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<MineRequest>,
) -> ServerResult<Json<Value>> {
    let story_id = state.story_or_default(request.story_id.as_deref())?;
    let identity = state
        .auth
        .authenticate(&Credentials::from_headers(&headers))
        .await?;

    let verifier = identity.name.clone();
    let (outcome, chain_length) = blocking(move || {
        let outcome = state
            .registry
            .verify(&story_id, request.block_index, &verifier)?;
        let chain_length = state.registry.ledger(&story_id)?.len()?;
        Ok((outcome, chain_length))
    })
    .await?;

    Ok(Json(json!({
        "message": outcome.message(),
        "committed": outcome.is_committed(),
        "entry": outcome.entry(),
        "verifier": identity.name,
        "chain_length": chain_length,
    })))
}

pub async fn resubmit(
    State(state): State<AppState>,
    Json(request): Json<ResubmitRequest>,
) -> ServerResult<Json<Value>> {
    let story_id = state.story_or_default(request.story_id.as_deref())?;
    let entry = blocking(move || {
        Ok(state
            .registry
            .resubmit(&story_id, request.block_index, &request.author)?)
    })
    .await?;

    Ok(Json(json!({
        "message": "Passage re-linked to the current tip",
        "entry": entry,
        "status": "pending_verification",
    })))
}

pub async fn pending(
    State(state): State<AppState>,
    Query(query): Query<PendingQuery>,
) -> ServerResult<Json<Value>> {
    let story_id = state.story_or_default(query.story_id.as_deref())?;
    let target = story_id.clone();
    let pending = blocking(move || Ok(state.registry.ledger(&target)?.pending()?)).await?;

    Ok(Json(json!({
        "story_id": story_id,
        "pending": pending,
    })))
}
