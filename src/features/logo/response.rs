use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use super::dispatcher::LogoPayload;

/// 同样的参数总是得到同样的图像，因此允许长期缓存。
pub const CACHE_CONTROL_VALUE: &str = "public, max-age=31536000, immutable";

/// 标记成功的 logo 响应，外层中间件据此恢复任意来源的 CORS 头。
#[derive(Debug, Clone, Copy)]
struct AnyOrigin;

/// 放在 CORS 中间件之外：全局 CORS 按配置改写了来源时，把 logo 响应改回 `*`。
pub async fn restore_any_origin(mut res: Response) -> Response {
    if res.extensions().get::<AnyOrigin>().is_some() {
        let headers = res.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        // 浏览器不接受 `*` 与 credentials 同时出现
        headers.remove(header::ACCESS_CONTROL_ALLOW_CREDENTIALS);
    }
    res
}

impl IntoResponse for LogoPayload {
    fn into_response(self) -> Response {
        let content_type = self.format().content_type();
        let body = match self {
            LogoPayload::Svg(svg) => Body::from(svg),
            LogoPayload::Png(bytes) => Body::from(bytes),
        };

        let mut res = Response::new(body);
        *res.status_mut() = StatusCode::OK;
        let headers = res.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_VALUE),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        res.extensions_mut().insert(AnyOrigin);
        res
    }
}
