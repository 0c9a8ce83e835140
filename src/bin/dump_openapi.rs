//! 导出 OpenAPI 文档（供 SDK 生成或离线审阅）。
//!
//! 用法：`cargo run --bin dump_openapi [输出路径]`，默认写入 `sdk/openapi.json`。

use std::fs;
use std::path::PathBuf;

use logo_backend::openapi::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sdk/openapi.json"));

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = ApiDoc::openapi().to_pretty_json()?;
    fs::write(&out, json)?;
    println!("OpenAPI 已写入 {}", out.display());
    Ok(())
}
