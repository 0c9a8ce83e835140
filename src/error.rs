use std::fmt;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用统一错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 查询参数校验失败（字段级错误列表）
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 渲染能力拒绝了已解析的渲染任务
    #[error(transparent)]
    Render(#[from] RenderError),

    /// 栅格编码失败
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// 内部服务器错误
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 单个字段的校验错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// 字段名（与查询参数同名，camelCase）。
    #[schema(example = "outlineColor")]
    pub field: String,
    /// 字段错误信息。
    #[schema(example = "must be a hex color like #fff or #ffffff")]
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// 参数校验错误：列出所有不合法的字段，而不是只报第一个。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// 出错字段名列表（按检查顺序）
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "参数校验错误: ")?;
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// 渲染能力返回的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("图像渲染错误: {0}")]
pub struct RenderError(pub String);

/// 栅格编码器返回的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("图像编码错误: {0}")]
pub struct EncodeError(pub String);

/// RFC7807 风格的错误响应（Problem Details）。
///
/// - 所有错误统一返回结构化 JSON（content-type = application/problem+json）
/// - 校验失败时通过 `errors` 返回字段级错误
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// 问题类型（URI）。若无更细分的类型，可使用 about:blank。
    #[serde(rename = "type")]
    #[schema(example = "about:blank")]
    pub type_url: String,

    /// 简短标题，用于概括错误。
    #[schema(example = "Validation Failed")]
    pub title: String,

    /// HTTP 状态码（与响应 status 一致）。
    #[schema(example = 422)]
    pub status: u16,

    /// 人类可读的详细信息（尽量稳定，不建议依赖解析）。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// 稳定的错误码，用于程序化处理。
    #[schema(example = "VALIDATION_FAILED")]
    pub code: String,

    /// 可选：请求追踪 ID（由 request-id 中间件回填）。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// 可选：字段级校验错误。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Render(_) | AppError::Encode(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn stable_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_FAILED",
            AppError::Render(_) => "RENDER_FAILED",
            AppError::Encode(_) => "ENCODE_FAILED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn title(&self) -> &'static str {
        match self.status_code() {
            StatusCode::UNPROCESSABLE_ENTITY => "Validation Failed",
            StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
            _ => "Error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let title = self.title().to_string();
        let code = self.stable_code().to_string();
        let detail = Some(self.to_string());

        let errors = match self {
            AppError::Validation(v) => Some(v.errors),
            _ => None,
        };

        let problem = ProblemDetails {
            type_url: "about:blank".to_string(),
            title,
            status: status.as_u16(),
            detail,
            code,
            request_id: crate::request_id::current_request_id(),
            errors,
        };

        let mut res = Json(problem).into_response();
        *res.status_mut() = status;
        res.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display_lists_every_field() {
        let mut err = ValidationError::single("text1", "too long");
        err.push("offsetMainAxis", "out of range");
        assert_eq!(err.fields(), vec!["text1", "offsetMainAxis"]);
        assert_eq!(
            err.to_string(),
            "参数校验错误: text1: too long; offsetMainAxis: out of range"
        );
    }

    #[test]
    fn status_codes_separate_client_and_server_failures() {
        let v: AppError = ValidationError::single("series", "unknown").into();
        assert_eq!(v.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(v.stable_code(), "VALIDATION_FAILED");

        let r: AppError = RenderError("bad config".into()).into();
        assert_eq!(r.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(r.stable_code(), "RENDER_FAILED");

        let e: AppError = EncodeError("no pixmap".into()).into();
        assert_eq!(e.stable_code(), "ENCODE_FAILED");
    }
}
