use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use lottostat_core::error::Error as CoreError;
use lottostat_core::frequency::{NumberFrequency, PositionFrequency};
use lottostat_core::generator::{make_rng, GeneratedCombination, GenerationMode};
use lottostat_core::index::MatchDetail;
use lottostat_core::models::{DrawRecord, LotteryType, MAIN_COUNT};
use lottostat_core::snapshot::SnapshotHandle;
use lottostat_db::db::{load_draws, open_db};

/// Shared application state: one swappable snapshot handle per variant.
#[derive(Clone)]
pub struct AppState {
    db_path: Arc<PathBuf>,
    powerball: Arc<SnapshotHandle>,
    mega_millions: Arc<SnapshotHandle>,
}

impl AppState {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path: Arc::new(db_path),
            powerball: Arc::new(SnapshotHandle::empty()),
            mega_millions: Arc::new(SnapshotHandle::empty()),
        }
    }

    pub fn handle(&self, lottery_type: LotteryType) -> &SnapshotHandle {
        match lottery_type {
            LotteryType::Powerball => &self.powerball,
            LotteryType::MegaMillions => &self.mega_millions,
        }
    }

    /// Reloads one variant from the database and swaps the published
    /// snapshot. An empty table leaves the current snapshot untouched and
    /// reports 0.
    pub fn load_variant(&self, lottery_type: LotteryType) -> anyhow::Result<usize> {
        let conn = open_db(&self.db_path)?;
        let draws = load_draws(&conn, lottery_type)?;
        if draws.is_empty() {
            return Ok(0);
        }
        let published = self.handle(lottery_type).rebuild(lottery_type, draws)?;
        Ok(published)
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/:lottery_type/number-frequencies",
            get(number_frequencies),
        )
        .route(
            "/:lottery_type/position-frequencies",
            get(position_frequencies),
        )
        .route("/:lottery_type/check-combination", post(check_combination))
        .route(
            "/:lottery_type/generate-combination",
            get(generate_combination),
        )
        .route(
            "/:lottery_type/latest-combinations",
            get(latest_combinations),
        )
        .route("/:lottery_type/reload", post(reload))
        .with_state(state)
}

// ===== Route Handlers =====

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Frequencies for all numbers of a category, ascending by number.
async fn number_frequencies(
    State(state): State<AppState>,
    Path(lottery_type): Path<LotteryType>,
    Query(params): Query<FrequencyQuery>,
) -> Result<Json<Vec<NumberFrequency>>, ApiError> {
    let snapshot = state.handle(lottery_type).load()?;
    let rows = match params.category {
        Category::Main => snapshot.frequencies().overall().to_vec(),
        Category::Special => snapshot.frequencies().special().to_vec(),
    };
    Ok(Json(rows))
}

/// Per-position frequencies; `position` (1-5) narrows to one position.
async fn position_frequencies(
    State(state): State<AppState>,
    Path(lottery_type): Path<LotteryType>,
    Query(params): Query<PositionQuery>,
) -> Result<Json<Vec<PositionFrequency>>, ApiError> {
    if let Some(position) = params.position {
        if !(1..=MAIN_COUNT as u8).contains(&position) {
            return Err(ApiError::BadRequest(
                "position must be between 1 and 5".to_string(),
            ));
        }
    }
    let snapshot = state.handle(lottery_type).load()?;
    Ok(Json(snapshot.frequencies().position_rows(params.position)))
}

async fn check_combination(
    State(state): State<AppState>,
    Path(lottery_type): Path<LotteryType>,
    Json(request): Json<CombinationRequest>,
) -> Result<Json<CombinationResponse>, ApiError> {
    if request.numbers.len() != MAIN_COUNT {
        return Err(ApiError::BadRequest(format!(
            "must provide exactly {} main numbers",
            MAIN_COUNT
        )));
    }
    let mut main_numbers = [0u8; MAIN_COUNT];
    main_numbers.copy_from_slice(&request.numbers);

    let snapshot = state.handle(lottery_type).load()?;
    let result = snapshot.check_combination(&main_numbers, request.special_ball)?;

    main_numbers.sort_unstable();
    Ok(Json(CombinationResponse {
        exists: result.exists,
        frequency: result.frequency,
        dates: result.matches.iter().map(|m| m.date.clone()).collect(),
        main_numbers,
        special_ball: request.special_ball,
        matches: result.matches,
    }))
}

async fn generate_combination(
    State(state): State<AppState>,
    Path(lottery_type): Path<LotteryType>,
    Query(params): Query<GenerateQuery>,
) -> Result<Json<GeneratedCombination>, ApiError> {
    let snapshot = state.handle(lottery_type).load()?;
    let mode = params.mode.unwrap_or(GenerationMode::Random);
    let combination = snapshot.generate(mode, &mut make_rng(None))?;
    Ok(Json(combination))
}

/// Latest draws, newest first, paginated.
async fn latest_combinations(
    State(state): State<AppState>,
    Path(lottery_type): Path<LotteryType>,
    Query(params): Query<LatestQuery>,
) -> Result<Json<LatestResponse>, ApiError> {
    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(20);
    if page < 1 {
        return Err(ApiError::BadRequest("page must be >= 1".to_string()));
    }
    if !(1..=50).contains(&page_size) {
        return Err(ApiError::BadRequest(
            "page_size must be between 1 and 50".to_string(),
        ));
    }

    let snapshot = state.handle(lottery_type).load()?;
    let offset = (page as usize - 1) * page_size as usize;
    let combinations: Vec<LatestDraw> = snapshot
        .latest(offset, page_size as usize)
        .iter()
        .map(LatestDraw::from)
        .collect();
    let total_count = snapshot.len();

    Ok(Json(LatestResponse {
        combinations,
        total_count,
        has_more: offset + (page_size as usize) < total_count,
    }))
}

/// Re-reads the variant from the database and swaps the snapshot in;
/// in-flight readers keep the old one.
async fn reload(
    State(state): State<AppState>,
    Path(lottery_type): Path<LotteryType>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let published = state.load_variant(lottery_type)?;
    tracing::info!(%lottery_type, draws = published, "snapshot reloaded");
    Ok(Json(json!({
        "lottery_type": lottery_type,
        "draws": published,
    })))
}

// ===== Request/Response Types =====

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Category {
    Main,
    Special,
}

#[derive(Deserialize)]
struct FrequencyQuery {
    /// "main" for main numbers, "special" for the Powerball / Mega Ball
    category: Category,
}

#[derive(Deserialize)]
struct PositionQuery {
    position: Option<u8>,
}

#[derive(Deserialize)]
struct GenerateQuery {
    mode: Option<GenerationMode>,
}

#[derive(Deserialize)]
struct LatestQuery {
    page: Option<u32>,
    page_size: Option<u32>,
}

#[derive(Deserialize)]
struct CombinationRequest {
    numbers: Vec<u8>,
    special_ball: Option<u8>,
}

#[derive(Serialize)]
struct CombinationResponse {
    exists: bool,
    frequency: u32,
    dates: Vec<String>,
    main_numbers: [u8; MAIN_COUNT],
    #[serde(skip_serializing_if = "Option::is_none")]
    special_ball: Option<u8>,
    matches: Vec<MatchDetail>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
struct LatestDraw {
    draw_date: String,
    main_numbers: [u8; MAIN_COUNT],
    special_ball: u8,
    multiplier: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    prize: Option<String>,
}

impl From<&DrawRecord> for LatestDraw {
    fn from(draw: &DrawRecord) -> Self {
        Self {
            draw_date: draw.draw_date.clone(),
            main_numbers: draw.sorted_key(),
            special_ball: draw.special_ball,
            multiplier: draw.effective_multiplier(),
            prize: draw.prize.clone(),
        }
    }
}

#[derive(Serialize)]
struct LatestResponse {
    combinations: Vec<LatestDraw>,
    total_count: usize,
    has_more: bool,
}

// ===== Error Handling =====

#[derive(Debug)]
enum ApiError {
    Core(CoreError),
    BadRequest(String),
    Internal(anyhow::Error),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Core(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(CoreError::InvalidRange { .. })
            | ApiError::Core(CoreError::DuplicateNumber(_)) => StatusCode::BAD_REQUEST,
            ApiError::Core(CoreError::EmptyDataset) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Core(CoreError::GenerationExhausted { .. })
            | ApiError::Core(CoreError::Sampling(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Core(err) => err.to_string(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Internal(err) => {
                tracing::error!("internal error: {:#}", err);
                "internal server error".to_string()
            }
        };
        if status.is_server_error() {
            tracing::error!(%status, "request failed: {}", message);
        }

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
