use std::sync::Arc;

use logo_backend::config::{AppConfig, LogFormat, LoggingConfig};
use logo_backend::features::logo::{ResvgPngEncoder, SvgLogoRenderer};
use logo_backend::startup::run_startup_checks;
use logo_backend::{AppState, ShutdownManager, build_app};
use tracing_subscriber::EnvFilter;

/// 初始化日志：RUST_LOG 优先，其次使用配置中的级别。
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match logging.format {
        LogFormat::Full => builder.init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().with_current_span(true).init(),
    }
}

#[tokio::main]
async fn main() {
    // 配置先于日志加载（日志级别/格式来自配置）
    let config = match AppConfig::init_global() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config init failed: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(&config.logging);

    let shutdown_manager = ShutdownManager::new();
    if let Err(e) = shutdown_manager.start_signal_handler() {
        tracing::error!("信号处理器启动失败: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run_startup_checks(config) {
        tracing::error!("Startup checks failed: {}", e);
        std::process::exit(1);
    }

    // 字体扫描是阻塞 IO，移出 tokio worker
    let render_config = config.render.clone();
    let t_fonts = std::time::Instant::now();
    let encoder = match tokio::task::spawn_blocking(move || ResvgPngEncoder::new(&render_config))
        .await
    {
        Ok(encoder) => encoder,
        Err(e) => {
            tracing::error!("字体库加载任务失败: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        "字体库加载完成: {} 个字体面, 耗时 {}ms",
        encoder.font_count(),
        t_fonts.elapsed().as_millis()
    );

    let renderer = match SvgLogoRenderer::new(config.render.font_family.clone()) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("SVG 模板初始化失败: {}", e);
            std::process::exit(1);
        }
    };

    let parallelism = config.render.effective_parallelism();
    let state = AppState::new(Arc::new(renderer), Arc::new(encoder), parallelism);
    let app = build_app(state, config);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    let prefix = config.api.normalized_prefix().unwrap_or_default();
    tracing::info!("Server: http://{}", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!("Logo API: http://{}{}/logo-generator", addr, prefix);
    tracing::info!("渲染并发许可: {}", parallelism);

    let shutdown_timeout = config.shutdown.timeout_duration();
    let manager_for_signal = shutdown_manager.clone();
    let graceful = axum::serve(listener, app).with_graceful_shutdown(async move {
        let reason = manager_for_signal.wait_for_shutdown().await;
        tracing::info!("接收到退出信号: {:?}，开始优雅关闭HTTP服务器...", reason);
    });

    // 收到退出信号后，最多再等 timeout_secs 让在途请求完成
    let serve = async {
        if let Err(e) = graceful.await {
            tracing::error!("服务器运行错误: {}", e);
            std::process::exit(1);
        }
    };
    let deadline = async {
        shutdown_manager.wait_for_shutdown().await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        _ = serve => tracing::info!("服务器已优雅关闭"),
        _ = deadline => tracing::warn!(
            "优雅退出超时（{}秒），强制退出",
            config.shutdown.timeout_secs
        ),
    }
}
