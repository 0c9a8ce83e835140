use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 全局配置单例
static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        2362
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// 默认的多字段文本格式
    #[default]
    Full,
    /// 紧凑文本格式
    Compact,
    /// 每行一条 JSON（便于日志采集）
    Json,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别（EnvFilter 语法；RUST_LOG 优先）
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    /// 日志格式
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    fn default_level() -> String {
        "logo_backend=info,tower_http=info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: LogFormat::default(),
        }
    }
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API 路由前缀
    #[serde(default = "ApiConfig::default_prefix")]
    pub prefix: String,
}

impl ApiConfig {
    fn default_prefix() -> String {
        "/api".to_string()
    }

    /// 规范化后的前缀：补齐开头的 `/`，去掉结尾的 `/`；挂在根路径时返回 `None`。
    pub fn normalized_prefix(&self) -> Option<String> {
        let trimmed = self.prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            None
        } else {
            Some(format!("/{trimmed}"))
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: Self::default_prefix(),
        }
    }
}

/// CORS 配置
///
/// 注意：logo 接口的成功响应总会带 `Access-Control-Allow-Origin: *`，
/// 这里的中间件只用于预检请求与其他接口。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorsConfig {
    /// 是否启用 CORS 中间件
    #[serde(default)]
    pub enabled: bool,
    /// 允许的 Origin 列表（支持 "*" 表示任意）
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// 允许的方法列表（支持 "*" 表示任意）
    #[serde(default)]
    pub allowed_methods: Vec<String>,
    /// 允许的请求头列表（支持 "*" 表示任意）
    #[serde(default)]
    pub allowed_headers: Vec<String>,
    /// 暴露的响应头列表（支持 "*" 表示任意）
    #[serde(default)]
    pub expose_headers: Vec<String>,
    /// 是否允许携带凭证（Cookie/Authorization）
    #[serde(default)]
    pub allow_credentials: bool,
    /// 预检缓存时间（秒）
    #[serde(default)]
    pub max_age_secs: Option<u64>,
}

/// 渲染配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// 自定义字体目录（.ttf/.otf/.ttc/.otc），与系统字体一起加载
    #[serde(default = "RenderConfig::default_fonts_dir")]
    pub fonts_dir: String,
    /// SVG 中使用的首选字体族
    #[serde(default = "RenderConfig::default_font_family")]
    pub font_family: String,
    /// 是否优先速度渲染（OptimizeSpeed），提升栅格化性能，可能略降画质
    #[serde(default)]
    pub optimize_speed: bool,
    /// 并发渲染许可数（0=自动，取 CPU 核心数）
    #[serde(default)]
    pub max_parallel: u32,
}

impl RenderConfig {
    fn default_fonts_dir() -> String {
        "resources/fonts".to_string()
    }

    fn default_font_family() -> String {
        "Noto Sans JP".to_string()
    }

    /// 实际生效的并发渲染许可数
    pub fn effective_parallelism(&self) -> usize {
        match self.max_parallel {
            0 => num_cpus::get().max(1),
            n => n as usize,
        }
    }

    pub fn fonts_path(&self) -> PathBuf {
        PathBuf::from(&self.fonts_dir)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fonts_dir: Self::default_fonts_dir(),
            font_family: Self::default_font_family(),
            optimize_speed: false,
            max_parallel: 0,
        }
    }
}

/// 优雅退出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// 优雅退出超时时间（秒）
    #[serde(default = "ShutdownConfig::default_timeout")]
    pub timeout_secs: u64,
}

impl ShutdownConfig {
    fn default_timeout() -> u64 {
        30
    }

    pub fn timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    /// CORS 配置
    #[serde(default)]
    pub cors: CorsConfig,
    /// 渲染配置
    #[serde(default)]
    pub render: RenderConfig,
    /// 优雅退出配置
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

impl AppConfig {
    /// 从配置文件加载配置，支持环境变量覆盖
    ///
    /// 配置文件缺失时使用内置默认值。
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path();
        tracing::info!("正在从 {:?} 加载配置文件", config_path);

        let builder = ConfigBuilder::builder()
            .add_source(File::from(config_path).required(false))
            // 环境变量覆盖，例如：APP_SERVER__PORT=8080、APP_API__PREFIX=/v1
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        builder.try_deserialize()
    }

    /// 获取全局配置单例
    ///
    /// 未初始化时返回默认配置的静态实例（测试与工具二进制无需显式初始化）。
    pub fn global() -> &'static AppConfig {
        static FALLBACK: OnceCell<AppConfig> = OnceCell::new();
        CONFIG
            .get()
            .unwrap_or_else(|| FALLBACK.get_or_init(AppConfig::default))
    }

    /// 初始化全局配置
    pub fn init_global() -> Result<&'static AppConfig, ConfigError> {
        let config = Self::load()?;
        CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("配置已经被初始化".to_string()))?;
        Ok(Self::global())
    }

    /// 获取配置文件路径（可通过 APP_CONFIG 指定）
    fn get_config_path() -> PathBuf {
        std::env::var_os("APP_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_prefix_is_normalized() {
        let prefix = |p: &str| {
            ApiConfig {
                prefix: p.to_string(),
            }
            .normalized_prefix()
        };
        assert_eq!(prefix("/api"), Some("/api".to_string()));
        assert_eq!(prefix("v1/"), Some("/v1".to_string()));
        assert_eq!(prefix("/"), None);
        assert_eq!(prefix(""), None);
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server_addr(), "0.0.0.0:2362");
        assert_eq!(cfg.api.prefix, "/api");
        assert!(!cfg.cors.enabled);
        assert_eq!(cfg.render.fonts_dir, "resources/fonts");
        assert_eq!(cfg.logging.format, LogFormat::Full);
    }

    #[test]
    fn partial_toml_falls_back_to_section_defaults() {
        let cfg: AppConfig = ConfigBuilder::builder()
            .add_source(File::from_str(
                "[server]\nport = 8080\n[render]\nmax_parallel = 3\n",
                config::FileFormat::Toml,
            ))
            .build()
            .expect("build config")
            .try_deserialize()
            .expect("deserialize config");

        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.render.effective_parallelism(), 3);
        assert_eq!(cfg.shutdown.timeout_secs, 30);
    }

    #[test]
    fn zero_parallelism_uses_cpu_count() {
        let render = RenderConfig::default();
        assert!(render.effective_parallelism() >= 1);
    }
}
