use std::fs;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::features::logo::encoder::count_font_files;

/// 执行启动检查
///
/// 1. 确保字体目录存在（缺失时创建）
/// 2. 字体目录为空时告警：仍会使用系统字体，但日文字形可能缺失
pub fn run_startup_checks(config: &AppConfig) -> Result<(), AppError> {
    tracing::info!("开始执行启动检查...");

    let fonts_path = config.render.fonts_path();
    if !fonts_path.exists() {
        tracing::warn!("未找到字体目录，正在创建: {:?}", fonts_path);
        fs::create_dir_all(&fonts_path)
            .map_err(|e| AppError::Internal(format!("创建字体目录失败: {e}")))?;
    }

    match count_font_files(&fonts_path) {
        0 => tracing::warn!(
            "字体目录 {:?} 中没有 .ttf/.otf/.ttc/.otc 文件，PNG 渲染将仅依赖系统字体（首选字体族: {}）",
            fonts_path,
            config.render.font_family
        ),
        n => tracing::info!("字体目录 {:?} 中发现 {} 个字体文件", fonts_path, n),
    }

    tracing::info!("启动检查完成");
    Ok(())
}
