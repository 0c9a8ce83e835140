use std::time::Instant;

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};

use crate::error::{AppError, ValidationError};
use crate::state::AppState;

use super::dispatcher::LogoPayload;
use super::resolver::resolve;
use super::schema::LogoQuery;
use super::types::OutputFormat;

#[utoipa::path(
    get,
    path = "/logo-generator",
    summary = "生成作品风格 Logo",
    description = "按 series 默认配置生成两行文字的 Logo，查询参数逐项覆盖默认值。默认输出 PNG，`format=svg` 时返回 SVG 源文本。",
    params(LogoQuery),
    responses(
        (status = 200, description = "Logo 图像（image/png 或 image/svg+xml）"),
        (status = 422, description = "参数校验失败", body = crate::error::ProblemDetails, content_type = "application/problem+json"),
        (status = 500, description = "渲染或编码失败", body = crate::error::ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Logo"
)]
pub async fn generate_logo(
    State(state): State<AppState>,
    query: Result<Query<LogoQuery>, QueryRejection>,
) -> Result<LogoPayload, AppError> {
    logo_pipeline(&state, query, None).await
}

#[utoipa::path(
    get,
    path = "/logo-generator.svg",
    summary = "生成 SVG Logo",
    description = "与 `/logo-generator` 参数相同，但输出格式固定为 SVG（忽略 `format` 的取值，取值仍需合法）。",
    params(LogoQuery),
    responses(
        (status = 200, description = "Logo SVG 源文本", body = String, content_type = "image/svg+xml"),
        (status = 422, description = "参数校验失败", body = crate::error::ProblemDetails, content_type = "application/problem+json"),
        (status = 500, description = "渲染失败", body = crate::error::ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Logo"
)]
pub async fn generate_logo_svg(
    State(state): State<AppState>,
    query: Result<Query<LogoQuery>, QueryRejection>,
) -> Result<LogoPayload, AppError> {
    logo_pipeline(&state, query, Some(OutputFormat::Svg)).await
}

/// 校验 → 合并默认值 → 渲染/编码。
///
/// `pinned` 用于固定输出格式的路由；校验失败时不会触达合并与渲染。
async fn logo_pipeline(
    state: &AppState,
    query: Result<Query<LogoQuery>, QueryRejection>,
    pinned: Option<OutputFormat>,
) -> Result<LogoPayload, AppError> {
    let t0 = Instant::now();

    let Query(query) =
        query.map_err(|e| ValidationError::single("query", e.body_text()))?;

    let request = query.validate().map_err(|e| {
        tracing::debug!(fields = ?e.fields(), "logo 参数校验失败");
        e
    })?;
    let request = match pinned {
        Some(format) => request.with_format(format),
        None => request,
    };
    let series = request.series;

    let job = resolve(&request, state.registry);
    let payload = state.dispatcher.dispatch(job).await.map_err(|e| {
        tracing::error!(series = series.as_str(), error = %e, "logo 渲染失败");
        e
    })?;

    tracing::info!(
        series = series.as_str(),
        format = payload.format().as_str(),
        bytes = payload.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "logo 生成完成"
    );
    Ok(payload)
}

pub fn create_logo_router() -> Router<AppState> {
    Router::new()
        .route("/logo-generator", get(generate_logo))
        .route("/logo-generator.svg", get(generate_logo_svg))
}
