use utoipa::openapi::server::{ServerBuilder, ServerVariableBuilder};
use utoipa::{Modify, OpenApi};

/// Swagger UI 的 Servers 配置。
///
/// logo 接口挂载在 `config.api.prefix`（默认 `/api`）下，`/health` 不带前缀，
/// 因此额外提供 `/` 作为备用 server。
struct ApiServers;

impl Modify for ApiServers {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let api = ServerBuilder::new()
            .url("{api_prefix}")
            .description(Some("Logo 接口（默认 /api）"))
            .parameter(
                "api_prefix",
                ServerVariableBuilder::new()
                    .default_value("/api")
                    .description(Some(
                        "接口前缀：对应 config.api.prefix（可通过 APP_API__PREFIX 覆盖）",
                    )),
            )
            .build();

        let root = ServerBuilder::new()
            .url("/")
            .description(Some("根路径（/health）"))
            .build();

        openapi.servers = Some(vec![api, root]);
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::health_check,
        crate::features::logo::handler::generate_logo,
        crate::features::logo::handler::generate_logo_svg,
    ),
    components(schemas(
        crate::error::ProblemDetails,
        crate::error::FieldError,
        crate::features::health::HealthResponse,
        crate::features::logo::SeriesId,
        crate::features::logo::OutputFormat,
    )),
    modifiers(&ApiServers),
    tags(
        (
            name = "Logo",
            description = "Logo 生成：按 series 默认配置与查询参数覆盖生成 PNG/SVG 图像。"
        ),
        (name = "Health", description = "健康检查：服务探活。"),
    ),
    info(
        title = "Logo Generator API",
        version = env!("CARGO_PKG_VERSION"),
        description = "作品风格 Logo 生成服务（Axum + utoipa）。除 /health 外，接口实际挂载在 `config.api.prefix`（默认 /api）下，OpenAPI 的 paths 不包含该前缀。"
    )
)]
pub struct ApiDoc;
