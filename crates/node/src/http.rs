use std::convert::Infallible;

use nimbus_ledger::ModelingLevel;
use nimbus_registry::Provider;
use nimbus_scheduler::{Task, TaskStatus, TaskType};
use nimbus_tier::CCTier;
use nimbus_types::{CoreError, Hash32, ProviderId, TaskId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::state::AppState;

const DEFAULT_CHAT_MODEL: &str = "llama-3.1-70b";
const DEFAULT_BASE_RATE_WEI_PER_MS: u128 = 1;

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn now_unix() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// Builds the full route tree described by the external-interface table:
/// OpenAI-compatible chat/model/embedding endpoints plus the control-plane
/// `/api/*` and `/health` surface.
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let cors_enabled = state.config.cors_enabled;

    let chat = warp::path!("v1" / "chat" / "completions")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handle_chat_completions);

    let models = warp::path!("v1" / "models")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handle_list_models);

    let embeddings = warp::path!("v1" / "embeddings")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handle_embeddings);

    let miners_list = warp::path!("api" / "miners")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handle_list_miners);

    let miners_register = warp::path!("api" / "miners" / "register")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handle_register_miner);

    let tasks_list = warp::path!("api" / "tasks")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handle_list_tasks);

    let tasks_pending = warp::path!("api" / "tasks" / "pending")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handle_pending_tasks);

    let tasks_submit = warp::path!("api" / "tasks" / "submit")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handle_submit_result);

    let stats = warp::path!("api" / "stats")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handle_stats);

    let health = warp::path!("health")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handle_health);

    let preflight = warp::options().map(|| warp::reply::with_status(warp::reply(), StatusCode::OK));

    let api = chat
        .or(models)
        .or(embeddings)
        .or(miners_list)
        .or(miners_register)
        .or(tasks_list)
        .or(tasks_pending)
        .or(tasks_submit)
        .or(stats)
        .or(health)
        .or(preflight)
        .map(|reply| -> Box<dyn Reply> { Box::new(reply) })
        .boxed();

    let api = if cors_enabled {
        let cors = warp::cors().allow_any_origin().allow_methods(vec!["GET", "POST", "OPTIONS"]).allow_headers(vec!["content-type"]);
        api.with(cors).map(|reply| -> Box<dyn Reply> { Box::new(reply) }).boxed()
    } else {
        api
    };

    api.recover(handle_rejection)
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some() {
        (StatusCode::BAD_REQUEST, "malformed request body".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
    } else {
        error!(?err, "unhandled rejection");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
    };
    Ok(warp::reply::with_status(warp::reply::json(&json!({"error": message})), code))
}

fn error_reply(err: CoreError) -> warp::reply::WithStatus<warp::reply::Json> {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    warp::reply::with_status(warp::reply::json(&json!({"error": err.to_string()})), status)
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[allow(dead_code)]
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionRequest {
    model: Option<String>,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionResponse {
    id: String,
    object: &'static str,
    model: String,
    status: String,
}

async fn handle_chat_completions(req: ChatCompletionRequest, state: AppState) -> Result<impl Reply, Rejection> {
    let catalog = state.scheduler.model_catalog().await;
    let model = req
        .model
        .filter(|m| catalog.is_empty() || catalog.contains(m))
        .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());

    let input = req
        .messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
        .into_bytes();

    let task = Task::new_pending(uuid_like("chat"), TaskType::Chat, model.clone(), input, 0, now_unix());
    let task_id = task.id.clone();
    match state.scheduler.submit_task(task).await {
        Ok(_) => Ok(warp::reply::with_status(
            warp::reply::json(&ChatCompletionResponse {
                id: task_id,
                object: "chat.completion",
                model,
                status: "pending".to_string(),
            }),
            StatusCode::OK,
        )),
        Err(e) => Ok(error_reply(e)),
    }
}

async fn handle_list_models(state: AppState) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&json!({ "data": state.scheduler.model_catalog().await })))
}

#[derive(Debug, Deserialize)]
struct EmbeddingRequest {
    model: Option<String>,
    input: String,
}

async fn handle_embeddings(req: EmbeddingRequest, state: AppState) -> Result<impl Reply, Rejection> {
    let catalog = state.scheduler.model_catalog().await;
    let model = req
        .model
        .filter(|m| catalog.is_empty() || catalog.contains(m))
        .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());

    // Opaque deterministic vector derived from the input digest; no real
    // embedding model runs in the control plane.
    let digest = Hash32::digest(req.input.as_bytes());
    let vector: Vec<f64> = digest.as_bytes().iter().map(|b| *b as f64 / 255.0).collect();

    Ok(warp::reply::json(&json!({
        "object": "list",
        "model": model,
        "data": [{ "embedding": vector, "index": 0 }],
    })))
}

#[derive(Debug, Serialize)]
struct ProviderView {
    id: String,
    endpoint: String,
    tier: String,
    reputation: f64,
    online: bool,
    stake_lux: String,
}

fn provider_view(p: &Provider) -> ProviderView {
    ProviderView {
        id: p.id.to_string(),
        endpoint: p.endpoint.clone(),
        tier: format!("{:?}", p.tier),
        reputation: p.reputation,
        online: p.status.online,
        stake_lux: p.stake_lux.to_string(),
    }
}

async fn handle_list_miners(state: AppState) -> Result<impl Reply, Rejection> {
    let providers: Vec<ProviderView> = state.scheduler.providers().await.iter().map(provider_view).collect();
    Ok(warp::reply::json(&providers))
}

#[derive(Debug, Deserialize)]
struct MinerInfo {
    id: String,
    wallet_address: String,
    endpoint: String,
    gpus: Vec<String>,
    tier: String,
    stake_lux: u128,
}

fn parse_tier(s: &str) -> CCTier {
    match s {
        "Tier1" | "1" => CCTier::Tier1,
        "Tier2" | "2" => CCTier::Tier2,
        "Tier3" | "3" => CCTier::Tier3,
        "Tier4" | "4" => CCTier::Tier4,
        _ => CCTier::Unknown,
    }
}

async fn handle_register_miner(info: MinerInfo, state: AppState) -> Result<impl Reply, Rejection> {
    let provider = Provider::new(
        ProviderId::new(info.id),
        info.wallet_address,
        info.endpoint,
        info.gpus,
        parse_tier(&info.tier),
        info.stake_lux,
        now_unix(),
    );
    match state.scheduler.register_provider(provider).await {
        Ok(_) => Ok(warp::reply::with_status(warp::reply::json(&json!({"status": "registered"})), StatusCode::OK)),
        Err(e) => Ok(error_reply(e)),
    }
}

#[derive(Debug, Serialize)]
struct TaskView {
    id: String,
    task_type: TaskType,
    model: String,
    status: TaskStatus,
    assigned_to: Option<String>,
}

fn task_view(t: &Task) -> TaskView {
    TaskView {
        id: t.id.clone(),
        task_type: t.task_type,
        model: t.model.clone(),
        status: t.status,
        assigned_to: t.assigned_to.as_ref().map(|p| p.to_string()),
    }
}

async fn handle_list_tasks(state: AppState) -> Result<impl Reply, Rejection> {
    let tasks: Vec<TaskView> = state.scheduler.all_tasks().await.iter().map(task_view).collect();
    Ok(warp::reply::json(&tasks))
}

async fn handle_pending_tasks(state: AppState) -> Result<impl Reply, Rejection> {
    let tasks: Vec<TaskView> = state.scheduler.pending_tasks().await.iter().map(task_view).collect();
    Ok(warp::reply::json(&tasks))
}

#[derive(Debug, Deserialize)]
struct TaskResultBody {
    task_id: String,
    provider_id: String,
    #[serde(default)]
    output: Vec<u8>,
    #[serde(default)]
    compute_time_ms: u64,
    #[serde(default)]
    proof: Vec<u8>,
    /// Present when the provider failed the task instead of completing it;
    /// drives the task to `Failed` rather than `Completed`.
    #[serde(default)]
    error: Option<String>,
}

async fn handle_submit_result(body: TaskResultBody, state: AppState) -> Result<impl Reply, Rejection> {
    let task_id = TaskId::new(body.task_id);

    if let Some(reason) = body.error {
        return match state.scheduler.mark_failed(&task_id, reason, now_unix()).await {
            Ok(_) => {
                info!(task_id = %task_id, "task marked failed");
                Ok(warp::reply::with_status(warp::reply::json(&json!({"status": "failed"})), StatusCode::OK))
            }
            Err(e) => Ok(error_reply(e)),
        };
    }

    if let Err(e) = state.scheduler.mark_processing(&task_id).await {
        // Already processing is fine; any other failure is surfaced.
        if !matches!(e, CoreError::InvalidTask(_)) {
            return Ok(error_reply(e));
        }
    }

    let provider_id = ProviderId::new(body.provider_id);
    let tier = state
        .scheduler
        .providers()
        .await
        .into_iter()
        .find(|p| p.id == provider_id)
        .map(|p| p.tier)
        .unwrap_or(CCTier::Unknown);

    let result = state
        .scheduler
        .submit_result(
            &task_id,
            body.output,
            body.compute_time_ms,
            body.proof,
            DEFAULT_BASE_RATE_WEI_PER_MS,
            tier,
            ModelingLevel::Standard,
            now_unix(),
        )
        .await;

    match result {
        Ok(_) => {
            info!(task_id = %task_id, "task result accepted");
            Ok(warp::reply::with_status(warp::reply::json(&json!({"status": "accepted"})), StatusCode::OK))
        }
        Err(e) => Ok(error_reply(e)),
    }
}

async fn handle_stats(state: AppState) -> Result<impl Reply, Rejection> {
    let provider_count = state.scheduler.provider_count().await;
    let task_counts = state.scheduler.task_type_counts().await;
    let merkle_root = state.ledger.compute_merkle_root();
    Ok(warp::reply::json(&json!({
        "providers": provider_count,
        "tasks_by_type": task_counts.iter().map(|(k, v)| (format!("{:?}", k), *v)).collect::<std::collections::HashMap<_, _>>(),
        "merkle_root": merkle_root.to_string(),
    })))
}

async fn handle_health(state: AppState) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&json!({
        "status": "ok",
        "node_name": state.config.node_name,
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

fn uuid_like(prefix: &str) -> String {
    format!("{}-{}", prefix, now_unix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_reports_ok_status() {
        let state = AppState::new(crate::config::ResolvedConfig::default(), vec![]);
        let reply = handle_health(state).await.unwrap();
        let response = reply.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn chat_completion_falls_back_to_default_model() {
        let state = AppState::new(crate::config::ResolvedConfig::default(), vec!["llama-70b".into()]);
        let req = ChatCompletionRequest {
            model: Some("unknown-model".into()),
            messages: vec![ChatMessage { role: "user".into(), content: "hi".into() }],
        };
        let reply = handle_chat_completions(req, state).await.unwrap();
        let response = reply.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn list_models_reflects_catalog() {
        let state = AppState::new(crate::config::ResolvedConfig::default(), vec!["llama-70b".into()]);
        let reply = handle_list_models(state).await.unwrap();
        let response = reply.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn submit_result_with_error_field_marks_task_failed() {
        let state = AppState::new(crate::config::ResolvedConfig::default(), vec!["llama-70b".into()]);
        let task = Task::new_pending("t1".into(), TaskType::Inference, "llama-70b".into(), vec![1], 0, 0);
        state.scheduler.submit_task(task).await.unwrap();

        let body = TaskResultBody {
            task_id: "t1".into(),
            provider_id: "p1".into(),
            output: vec![],
            compute_time_ms: 0,
            proof: vec![],
            error: Some("provider crashed".into()),
        };
        let reply = handle_submit_result(body, state.clone()).await.unwrap();
        let response = reply.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let task = state.scheduler.task(&TaskId::new("t1")).await.unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.error.as_deref(), Some("provider crashed"));
    }
}
