use axum::{Router, routing::get};
use tower_http::compression::CompressionLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::features::health::health_check;
use crate::features::logo::{create_logo_router, restore_any_origin};
use crate::openapi::ApiDoc;
use crate::state::AppState;

fn compression_predicate() -> impl tower_http::compression::predicate::Predicate {
    use tower_http::compression::predicate::{NotForContentType, Predicate, SizeAbove};

    // PNG 已经是压缩格式，只压缩 SVG/JSON 等文本响应
    SizeAbove::default()
        .and(NotForContentType::GRPC)
        .and(NotForContentType::IMAGES)
        .and(NotForContentType::SSE)
        .and(NotForContentType::const_new("application/octet-stream"))
}

/// 组装完整路由：
///
/// - `/health`（不带前缀）
/// - `{api.prefix}/logo-generator`、`{api.prefix}/logo-generator.svg`
/// - `/docs` 与 `/api-docs/openapi.json`
///
/// 中间件从内到外：压缩、CORS（可选）、logo 响应的任意来源头、request-id。
pub fn build_app(state: AppState, config: &AppConfig) -> Router {
    let api_router = Router::<AppState>::new().merge(create_logo_router());

    let router = Router::<AppState>::new().route("/health", get(health_check));
    let router = match config.api.normalized_prefix() {
        Some(prefix) => router.nest(&prefix, api_router),
        None => router.merge(api_router),
    };

    let mut app = router
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(CompressionLayer::new().compress_when(compression_predicate()));

    if let Some(cors) = crate::cors::build_cors_layer(&config.cors) {
        app = app.layer(cors);
    }

    app.layer(axum::middleware::map_response(restore_any_origin))
        .layer(axum::middleware::from_fn(
            crate::request_id::request_id_middleware,
        ))
}

#[cfg(test)]
mod tests {
    use super::compression_predicate;
    use axum::body::Body;
    use axum::http::{Response as HttpResponse, header};
    use tower_http::compression::predicate::Predicate;

    fn should_compress_for(ct: &str) -> bool {
        // 超过 SizeAbove 默认阈值（32B）
        let resp = HttpResponse::builder()
            .header(header::CONTENT_TYPE, ct)
            .body(Body::from(vec![b'x'; 2048]))
            .unwrap();
        compression_predicate().should_compress(&resp)
    }

    #[test]
    fn png_is_not_compressed_but_svg_is() {
        assert!(!should_compress_for("image/png"));
        assert!(should_compress_for("image/svg+xml"));
        assert!(should_compress_for("application/problem+json"));
    }
}
