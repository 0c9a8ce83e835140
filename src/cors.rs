use axum::http::{HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsConfig;

/// 根据配置构建 CORS 中间件（未启用或配置无效时返回 None）。
///
/// logo 接口的成功响应总是 `Access-Control-Allow-Origin: *`（由外层
/// `restore_any_origin` 保证），该中间件主要负责 OPTIONS 预检以及 health/docs 等其它路由。
pub fn build_cors_layer(cors: &CorsConfig) -> Option<CorsLayer> {
    if !cors.enabled {
        return None;
    }

    let origins = parse_list("allowed_origins", &cors.allowed_origins, |v| {
        HeaderValue::from_str(v).ok()
    });
    if !origins.any && origins.items.is_empty() {
        tracing::warn!("CORS 已启用但 allowed_origins 为空，已跳过启用");
        return None;
    }

    let methods = parse_list("allowed_methods", &cors.allowed_methods, |v| {
        Method::from_bytes(v.to_ascii_uppercase().as_bytes()).ok()
    });
    let headers = parse_list("allowed_headers", &cors.allowed_headers, parse_header_name);
    let expose = parse_list("expose_headers", &cors.expose_headers, parse_header_name);

    if cors.allow_credentials && (origins.any || methods.any || headers.any || expose.any) {
        tracing::error!("CORS 配置无效：allow_credentials=true 不能与 \"*\" 同时使用，已跳过启用");
        return None;
    }

    let mut layer = CorsLayer::new();
    layer = if origins.any {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins.items)
    };
    if methods.any {
        layer = layer.allow_methods(Any);
    } else if !methods.items.is_empty() {
        layer = layer.allow_methods(methods.items);
    }
    if headers.any {
        layer = layer.allow_headers(Any);
    } else if !headers.items.is_empty() {
        layer = layer.allow_headers(headers.items);
    }
    if expose.any {
        layer = layer.expose_headers(Any);
    } else if !expose.items.is_empty() {
        layer = layer.expose_headers(expose.items);
    }
    if cors.allow_credentials {
        layer = layer.allow_credentials(true);
    }
    if let Some(secs) = cors.max_age_secs.filter(|s| *s > 0) {
        layer = layer.max_age(Duration::from_secs(secs));
    }

    Some(layer)
}

/// 解析后的配置列表："*" 单独记为 any，其余项逐个解析，无效项告警后跳过。
struct ParsedList<T> {
    any: bool,
    items: Vec<T>,
}

fn parse_list<T>(
    label: &str,
    values: &[String],
    parse: impl Fn(&str) -> Option<T>,
) -> ParsedList<T> {
    let mut out = ParsedList {
        any: false,
        items: Vec::new(),
    };
    for raw in values {
        let value = raw.trim();
        if value.is_empty() {
            continue;
        }
        if value == "*" {
            out.any = true;
            continue;
        }
        match parse(value) {
            Some(v) => out.items.push(v),
            None => tracing::warn!("CORS {} 含无效值: {}", label, value),
        }
    }
    out
}

fn parse_header_name(value: &str) -> Option<HeaderName> {
    HeaderName::from_bytes(value.to_ascii_lowercase().as_bytes()).ok()
}

#[cfg(test)]
mod tests {
    use super::{build_cors_layer, parse_list};
    use crate::config::CorsConfig;
    use axum::http::Method;

    #[test]
    fn disabled_config_builds_nothing() {
        assert!(build_cors_layer(&CorsConfig::default()).is_none());
    }

    #[test]
    fn enabled_without_origins_is_skipped() {
        let cors = CorsConfig {
            enabled: true,
            ..CorsConfig::default()
        };
        assert!(build_cors_layer(&cors).is_none());
    }

    #[test]
    fn credentials_with_wildcard_is_rejected() {
        let cors = CorsConfig {
            enabled: true,
            allow_credentials: true,
            allowed_origins: vec!["*".to_string()],
            ..CorsConfig::default()
        };
        assert!(build_cors_layer(&cors).is_none());
    }

    #[test]
    fn method_list_is_trimmed_and_uppercased() {
        let input = vec!["get".to_string(), " OPTIONS ".to_string(), String::new()];
        let parsed = parse_list("allowed_methods", &input, |v| {
            Method::from_bytes(v.to_ascii_uppercase().as_bytes()).ok()
        });
        assert!(!parsed.any);
        assert_eq!(parsed.items, vec![Method::GET, Method::OPTIONS]);
    }
}
