use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use phrase_smt::{
    Cost, DecodeResult, DecoderError, TranslatedPhrase, Translation, Translator, TranslatorConfig,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[derive(Clone)]
struct AppState {
    translator: Arc<Translator>,
    // Bounds concurrent decodes on the blocking pool
    permits: Arc<Semaphore>,
}

#[derive(Deserialize)]
struct TranslateRequest {
    text: String,
}

#[derive(Serialize, Deserialize)]
struct TranslateResponse {
    translation: String,
    cost: Cost,
    phrases: Vec<TranslatedPhrase>,
}

impl From<Translation> for TranslateResponse {
    fn from(translation: Translation) -> Self {
        TranslateResponse {
            translation: translation.text,
            cost: translation.cost,
            phrases: translation.phrases,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .init();

    let config_path = PathBuf::from(
        std::env::var("PHRASE_SMT_CONFIG").unwrap_or_else(|_| "config.json".to_string()),
    );
    let addr = std::env::var("PHRASE_SMT_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let max_threads = std::env::var("PHRASE_SMT_MAX_THREADS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(5);

    info!("Loading translator from {}", config_path.display());
    let config = TranslatorConfig::from_file(&config_path).inspect_err(|e| {
        error!("Failed to read {}: {}", config_path.display(), e);
    })?;
    let translator = tokio::task::spawn_blocking(move || Translator::from_config(&config))
        .await?
        .inspect_err(|e| error!("Failed to load translator: {}", e))?;

    let app = app(AppState {
        translator: Arc::new(translator),
        permits: Arc::new(Semaphore::new(max_threads.max(1))),
    });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/translate", post(translate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn translate(
    State(state): State<AppState>,
    Json(payload): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let _permit = state
        .permits
        .acquire()
        .await
        .map_err(|e| api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;

    let translator = Arc::clone(&state.translator);
    let text = payload.text.clone();
    let result = tokio::task::spawn_blocking(move || translator.translate(&text))
        .await
        .map_err(|e| {
            error!("Translation task failed: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Translation task failed")
        })?;

    let translation = or_pass_through(result, &payload.text)?;
    Ok(Json(translation.into()))
}

/// Replace a failed search by the untranslated input; other errors are reported
fn or_pass_through(
    result: DecodeResult<Translation>,
    text: &str,
) -> Result<Translation, ApiError> {
    match result {
        Ok(translation) => Ok(translation),
        Err(e @ DecoderError::NoTranslationFound(_)) => {
            warn!("{}; returning the input unchanged", e);
            Ok(Translation::pass_through(text))
        }
        Err(e) => {
            error!("Translation failed: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use phrase_smt::feature::{DistortionModel, PhraseTable};
    use phrase_smt::rule_table::parse_plain_rule_table;
    use phrase_smt::{DecoderConfig, FeatureSet, RuleTable, Vocabulary};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let mut vocab = Vocabulary::new();
        let tree = parse_plain_rule_table(
            "1.0 # X # das # the\n1.0 # X # haus # house\n0.5 # X # das haus # the house\n",
            &mut vocab,
        )
        .unwrap();
        let table = RuleTable::with_unknown_word_fallback(tree, vec![0.0]).unwrap();
        let features = FeatureSet::new()
            .with(Box::new(PhraseTable::new(vec![1.0])))
            .with(Box::new(DistortionModel::new(1.0)));
        let translator =
            Translator::new(vocab, table, features, DecoderConfig::default()).unwrap();
        app(AppState {
            translator: Arc::new(translator),
            permits: Arc::new(Semaphore::new(2)),
        })
    }

    fn translate_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/translate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], "ok");
    }

    #[tokio::test]
    async fn test_translate() {
        let response = test_app()
            .oneshot(translate_request(r#"{"text": "das haus"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let result: TranslateResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(result.translation, "the house");
        assert_eq!(result.cost, 0.5);
        assert_eq!(result.phrases.len(), 1);
        assert_eq!(result.phrases[0].source, "das haus");
    }

    #[tokio::test]
    async fn test_translate_unknown_word() {
        let response = test_app()
            .oneshot(translate_request(r#"{"text": "das Auto"}"#))
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let result: TranslateResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(result.translation, "the Auto");
    }

    #[test]
    fn test_no_translation_falls_back_to_input() {
        let result = Err(DecoderError::NoTranslationFound("das  Auto".to_string()));
        let translation = or_pass_through(result, "das  Auto").unwrap();
        assert_eq!(translation.text, "das Auto");
        assert_eq!(translation.cost, 0.0);

        let value = serde_json::to_value(TranslateResponse::from(translation)).unwrap();
        assert_eq!(value["translation"], "das Auto");
        assert_eq!(value["phrases"], serde_json::json!([]));
    }

    #[test]
    fn test_other_errors_are_reported() {
        let result = Err(DecoderError::Config("bad beam".to_string()));
        let (status, Json(body)) = or_pass_through(result, "das").unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Configuration error: bad beam");
    }

    #[tokio::test]
    async fn test_malformed_request() {
        let response = test_app()
            .oneshot(translate_request(r#"{"txt": "das"}"#))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = test_app()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
