//! HTTP request handlers
//!
//! Implements the REST API around the risk assessment pipeline.

use actix_web::{web, HttpRequest, HttpResponse};
use tracing::info;
use uuid::Uuid;

use crate::assessment::{self, AssessmentContext};
use crate::error::AppError;
use crate::models::{AdvisoryRequest, AssessRequest, HealthCheck, ThresholdQuery};
use crate::state::AppState;
use crate::thresholds::adjust;
use crate::validation::{validate_advisory_request, validate_assess_request};

/// Configure all application routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Health check
            .route("/health", web::get().to(health_check))
            // Effective thresholds for a crop/stage
            .route("/thresholds", web::get().to(get_thresholds))
            // Assessment endpoints
            .route("/assess", web::post().to(assess_forecast))
            .route("/advisory", web::post().to(get_advisory)),
    );
}

/// Health check endpoint
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let health = HealthCheck {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        uptime_seconds: state.uptime_seconds(),
        weather_api_configured: state.weather_configured(),
    };

    Ok(HttpResponse::Ok().json(health))
}

/// Effective thresholds
///
/// GET /api/thresholds?crop_type=Rice&growth_stage=Flowering
pub async fn get_thresholds(
    state: web::Data<AppState>,
    query: web::Query<ThresholdQuery>,
) -> Result<HttpResponse, AppError> {
    let thresholds = adjust(state.base_thresholds(), &query.crop_type, &query.growth_stage);
    Ok(HttpResponse::Ok().json(thresholds))
}

/// Assess a supplied forecast document
///
/// POST /api/assess
///
/// Runs the pipeline without any outbound calls.
pub async fn assess_forecast(
    state: web::Data<AppState>,
    body: web::Json<AssessRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let correlation_id = extract_correlation_id(&req);
    validate_assess_request(&body)?;

    info!(
        correlation_id = %correlation_id,
        crop = %body.crop_type,
        stage = %body.growth_stage,
        "Received forecast assessment request"
    );

    let ctx = AssessmentContext {
        base_thresholds: state.base_thresholds(),
        crop: &body.crop_type,
        stage: &body.growth_stage,
        default_offset: state.default_offset(),
        today: body.today,
    };
    let result = assessment::run(&body.forecast, &ctx, None);

    Ok(HttpResponse::Ok().json(result))
}

/// Address-driven advisory
///
/// POST /api/advisory
///
/// Geocodes the address, fetches the forecast and runs the pipeline.
pub async fn get_advisory(
    state: web::Data<AppState>,
    body: web::Json<AdvisoryRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let correlation_id = extract_correlation_id(&req);
    let weather = state.weather()?;
    validate_advisory_request(&body)?;

    info!(
        correlation_id = %correlation_id,
        address = %body.address,
        crop = %body.crop_type,
        stage = %body.growth_stage,
        "Received advisory request"
    );

    let location = weather.geocode(body.address.trim()).await?;
    let forecast = weather.fetch_forecast(location.lat, location.lon).await?;

    let ctx = AssessmentContext {
        base_thresholds: state.base_thresholds(),
        crop: &body.crop_type,
        stage: &body.growth_stage,
        default_offset: state.default_offset(),
        today: None,
    };
    let result = assessment::run(&forecast, &ctx, Some(location));

    info!(
        correlation_id = %correlation_id,
        alerts = result.risks.overall_alerts.len(),
        "Advisory generated"
    );

    Ok(HttpResponse::Ok().json(result))
}

/// Extract or generate correlation ID from request headers
fn extract_correlation_id(req: &HttpRequest) -> String {
    req.headers()
        .get("X-Correlation-ID")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    // 2024-06-10T00:00:00Z
    const DAY0: i64 = 1_717_977_600;

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::default()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "healthy");
        assert_eq!(body["weather_api_configured"], false);
    }

    #[actix_web::test]
    async fn test_thresholds_for_crop_and_stage() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::default()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/thresholds?crop_type=Rice&growth_stage=Flowering")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["drought_risk_days"], 8);
        assert_eq!(body["heatwave_temp_c"], 35.0);
    }

    #[actix_web::test]
    async fn test_assess_forecast() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::default()))
                .configure(configure_routes),
        )
        .await;

        let list: Vec<Value> = (0..8)
            .map(|i| json!({ "dt": DAY0 + i * 3 * 3600, "main": { "temp_max": 12.0, "temp_min": 1.5, "humidity": 60 },
                             "wind": { "speed": 3.0 }, "rain": { "3h": 2.0 } }))
            .collect();

        let req = test::TestRequest::post()
            .uri("/api/assess")
            .set_json(json!({
                "forecast": { "list": list, "city": { "timezone": 0 } },
                "crop_type": "Vegetables",
                "growth_stage": "Germination/Seedling",
                "today": "2024-06-10"
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["today"], "2024-06-10");
        assert_eq!(body["thresholds"]["frost_risk_temp_c"], 3.0);
        assert_eq!(body["risks"]["frost"]["warning"], true);
        assert_eq!(body["risks"]["drought"]["warning"], false);
        assert_eq!(
            body["risks"]["overall_alerts"][0],
            "Frost Risk on 2024-06-10: Min temp forecast 1.5°C (Threshold: <= 3°C)."
        );
        assert_eq!(body["advisories"][0], "--- Climate Risk Advisories & Recommendations ---");
    }

    #[actix_web::test]
    async fn test_assess_malformed_forecast_is_all_clear() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::default()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/assess")
            .set_json(json!({ "forecast": "not a forecast" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["crop_type"], "Other");
        assert_eq!(body["risks"]["overall_alerts"], json!([]));
        assert_eq!(body["advisories"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_assess_invalid_request() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::default()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/assess")
            .set_json(json!({ "forecast": {}, "crop_type": "" }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_advisory_without_api_key() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::default()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/advisory")
            .set_json(json!({ "address": "Bhopal, IN", "crop_type": "Rice", "growth_stage": "Flowering" }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 503);
    }
}
