use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{error, web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::getpass::models::GetPassRequest;
use crate::getpass::{GetpassError, GetpassService};
use crate::logging::RequestLog;
use crate::ErrorResponse;

pub const ROOT_MESSAGE: &str =
    "GetPass API is running. Use /generate-getpass/ endpoint to generate getpass documents.";

pub struct AppState {
    pub service: GetpassService,
}

impl AppState {
    pub fn new(service: GetpassService) -> Self {
        Self { service }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[utoipa::path(
    post,
    path = "/generate-getpass/",
    tag = "GetPass",
    request_body = GetPassRequest,
    responses(
        (status = 200, description = "Merged PDF, single Word document, or ZIP of Word documents"),
        (status = 400, description = "Invalid date or request body", body = ErrorResponse),
        (status = 500, description = "Generation failed", body = ErrorResponse)
    )
)]
pub async fn generate_getpass(
    state: web::Data<AppState>,
    body: web::Json<GetPassRequest>,
) -> impl Responder {
    let log = RequestLog::new();
    let request = body.into_inner();
    log.info(format!(
        "getpass requested: {} people, {} dates",
        request.people.len(),
        request.dates.len()
    ));

    let artifact = match state.service.generate(&request, &log).await {
        Ok(artifact) => artifact,
        Err(err) => return error_response(&err, &log),
    };

    // The response owns the bytes; the file is not kept once served.
    let read = tokio::fs::read(&artifact.path).await;
    if let Err(err) = tokio::fs::remove_file(&artifact.path).await {
        log.warn(format!(
            "failed to remove artifact {}: {err}",
            artifact.path.display()
        ));
    }

    match read {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(artifact.mime_type())
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(
                    artifact.download_name().to_string(),
                )],
            })
            .body(bytes),
        Err(err) => {
            log.error(format!(
                "failed to read artifact {}: {err}",
                artifact.path.display()
            ));
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to read generated file"))
        }
    }
}

fn error_response(err: &GetpassError, log: &RequestLog) -> HttpResponse {
    match err {
        GetpassError::InvalidDateFormat(_) => {
            log.warn(err);
            HttpResponse::BadRequest().json(ErrorResponse::new("InvalidDateFormat", &err.to_string()))
        }
        GetpassError::InvalidRequest(_) => {
            log.warn(err);
            HttpResponse::BadRequest().json(ErrorResponse::new("InvalidRequest", &err.to_string()))
        }
        GetpassError::FatalGenerationFailure => {
            log.error(err);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&err.to_string()))
        }
        _ => {
            log.error(format!("getpass generation failed: {err}"));
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to generate documents"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    tag = "GetPass",
    responses(
        (status = 200, description = "Service banner", body = MessageResponse)
    )
)]
pub async fn root() -> impl Responder {
    HttpResponse::Ok().json(MessageResponse {
        message: ROOT_MESSAGE.to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "GetPass",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn not_found(req: HttpRequest) -> impl Responder {
    HttpResponse::NotFound().json(ErrorResponse::not_found(&format!(
        "No route for {} {}",
        req.method(),
        req.path()
    )))
}

/// Malformed JSON bodies get the same error shape as validation failures.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("rejected request body: {}", err);
        let response = HttpResponse::BadRequest()
            .json(ErrorResponse::new("InvalidRequest", &err.to_string()));
        error::InternalError::from_response(err, response).into()
    })
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(web::resource("/").route(web::get().to(root)))
        .service(web::resource("/health").route(web::get().to(health)))
        .service(
            web::resource(["/generate-getpass/", "/generate-getpass"])
                .route(web::post().to(generate_getpass)),
        );
}
