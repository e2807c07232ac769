// Arrest Data Comparison - Web Server
// JSON API over the memoized pipeline

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use arrest_compare::{
    available_year_range, demographic_summary, filter_year_range, geo_view, temporal_summary,
    AlignedRecord, Category, City, ComparisonData, DemographicSummary, PipelineCache, PipelineConfig,
    TemporalSummary, COMMON_COLUMNS,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    cache: Arc<PipelineCache>,
    config: Arc<PipelineConfig>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message.into()),
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::err(message))).into_response()
}

/// Inclusive year-range selection, as the dashboard slider
#[derive(Debug, Deserialize)]
struct YearRangeQuery {
    from: Option<i32>,
    to: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct GeoQuery {
    sample_frac: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PreviewQuery {
    rows: Option<usize>,
}

#[derive(Serialize)]
struct SummaryResponse {
    nypd_records: usize,
    lapd_records: usize,
    year_range: Option<(i32, i32)>,
    common_columns: Vec<&'static str>,
}

#[derive(Serialize)]
struct GeoResponse {
    city: City,
    title: &'static str,
    center: (f64, f64),
    plotted: usize,
    latitude: Vec<Option<f64>>,
    longitude: Vec<Option<f64>>,
    offense: Vec<Option<String>>,
    density: Option<Vec<f64>>,
}

#[derive(Serialize)]
struct PreviewResponse {
    nypd: Vec<AlignedRecord>,
    lapd: Vec<AlignedRecord>,
}

impl AppState {
    /// Memoized pipeline result. A cache miss runs the pipeline on the blocking pool.
    async fn data(&self) -> Result<Arc<ComparisonData>, Response> {
        let (cache, config) = (Arc::clone(&self.cache), Arc::clone(&self.config));
        let loaded = tokio::task::spawn_blocking(move || cache.get_or_load(&config))
            .await
            .unwrap_or_else(|e| {
                log::error!("Pipeline task failed: {}", e);
                None
            });
        loaded.ok_or_else(|| {
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "Failed to load data. Please check the data files.",
            )
        })
    }
}

/// Both sets narrowed to the requested years; unbounded sides use the available range
fn select_years(data: &ComparisonData, query: &YearRangeQuery) -> (Vec<AlignedRecord>, Vec<AlignedRecord>) {
    match (available_year_range(&data.nypd, &data.lapd), query.from, query.to) {
        (_, None, None) | (None, _, _) => (data.nypd.clone(), data.lapd.clone()),
        (Some((lo, hi)), from, to) => {
            let (from, to) = (from.unwrap_or(lo), to.unwrap_or(hi));
            (
                filter_year_range(&data.nypd, from, to),
                filter_year_range(&data.lapd, from, to),
            )
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/summary - Record counts and year coverage
async fn get_summary(State(state): State<AppState>) -> Response {
    let data = match state.data().await {
        Ok(data) => data,
        Err(response) => return response,
    };

    let summary = SummaryResponse {
        nypd_records: data.nypd.len(),
        lapd_records: data.lapd.len(),
        year_range: available_year_range(&data.nypd, &data.lapd),
        common_columns: COMMON_COLUMNS.to_vec(),
    };
    (StatusCode::OK, Json(ApiResponse::ok(summary))).into_response()
}

/// GET /api/temporal?from=&to= - Year, month, weekday and day-of-month counts
async fn get_temporal(State(state): State<AppState>, Query(query): Query<YearRangeQuery>) -> Response {
    let data = match state.data().await {
        Ok(data) => data,
        Err(response) => return response,
    };

    let (nypd, lapd) = select_years(&data, &query);
    let temporal: TemporalSummary = temporal_summary(&nypd, &lapd);
    (StatusCode::OK, Json(ApiResponse::ok(temporal))).into_response()
}

/// GET /api/demographics?from=&to= - Percentage distributions per department
async fn get_demographics(
    State(state): State<AppState>,
    Query(query): Query<YearRangeQuery>,
) -> Response {
    let data = match state.data().await {
        Ok(data) => data,
        Err(response) => return response,
    };

    let (nypd, lapd) = select_years(&data, &query);
    let demographics: DemographicSummary = demographic_summary(&nypd, &lapd);
    (StatusCode::OK, Json(ApiResponse::ok(demographics))).into_response()
}

/// GET /api/geo/:city?sample_frac= - Sampled points with normalized density
async fn get_geo(
    State(state): State<AppState>,
    Path(city): Path<String>,
    Query(query): Query<GeoQuery>,
) -> Response {
    let city: City = match city.parse() {
        Ok(city) => city,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let data = match state.data().await {
        Ok(data) => data,
        Err(response) => return response,
    };

    let options = state.config.sampling(query.sample_frac);
    let view = match geo_view(&data, city, &options, state.config.min_density_points) {
        Ok(view) => view,
        Err(e) => {
            log::warn!("Geo view for {} failed: {}", city, e);
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    let response = GeoResponse {
        city,
        title: city.title(),
        center: city.bounds().center(),
        plotted: view.plotted,
        latitude: view.points.iter().map(|p| p.latitude).collect(),
        longitude: view.points.iter().map(|p| p.longitude).collect(),
        offense: view
            .points
            .iter()
            .map(|p| p.offense_std.map(|o| o.label().to_string()))
            .collect(),
        density: view.density.as_ref().map(|d| d.normalized.clone()),
    };
    (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
}

/// GET /api/preview?rows= - First rows of both aligned sets
async fn get_preview(State(state): State<AppState>, Query(query): Query<PreviewQuery>) -> Response {
    let data = match state.data().await {
        Ok(data) => data,
        Err(response) => return response,
    };

    let rows = query.rows.unwrap_or(5);
    let preview = PreviewResponse {
        nypd: data.nypd.iter().take(rows).cloned().collect(),
        lapd: data.lapd.iter().take(rows).cloned().collect(),
    };
    (StatusCode::OK, Json(ApiResponse::ok(preview))).into_response()
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("🌐 Arrest Data Comparison - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let args: Vec<String> = env::args().collect();
    let config = match args.iter().position(|a| a == "--config") {
        Some(i) => match args.get(i + 1) {
            Some(path) => PipelineConfig::from_file(std::path::Path::new(path))?,
            None => anyhow::bail!("--config requires a file path"),
        },
        None => PipelineConfig::default(),
    };

    let state = AppState {
        cache: Arc::new(PipelineCache::new()),
        config: Arc::new(config),
    };

    // Warm the cache so the first request does not pay for the pipeline
    match state.data().await {
        Ok(data) => println!("✓ Data loaded: NYPD {} / LAPD {}", data.nypd.len(), data.lapd.len()),
        Err(_) => eprintln!("❌ Failed to load data from {}", state.config.data_dir.display()),
    }

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/summary", get(get_summary))
        .route("/temporal", get(get_temporal))
        .route("/demographics", get(get_demographics))
        .route("/geo/:city", get(get_geo))
        .route("/preview", get(get_preview))
        .with_state(state.clone());

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    let addr = state.config.server_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/summary", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await?;
    Ok(())
}
