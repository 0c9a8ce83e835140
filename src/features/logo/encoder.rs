use std::fs;
use std::path::Path;
use std::sync::Arc;

use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, Options as UsvgOptions, fontdb};

use crate::config::RenderConfig;
use crate::error::EncodeError;

/// 栅格编码能力：SVG 文本 → 压缩位图字节。
pub trait RasterEncoder: Send + Sync {
    fn encode(&self, svg: &str) -> Result<Vec<u8>, EncodeError>;
}

/// 基于 resvg 的 PNG 编码器。
///
/// 字体库（系统字体 + `fonts_dir` 下的自定义字体）在构造时加载一次，之后只读共享。
pub struct ResvgPngEncoder {
    fontdb: Arc<fontdb::Database>,
    font_family: String,
    optimize_speed: bool,
}

impl ResvgPngEncoder {
    pub fn new(render: &RenderConfig) -> Self {
        Self {
            fontdb: Arc::new(load_font_db(&render.fonts_path())),
            font_family: render.font_family.clone(),
            optimize_speed: render.optimize_speed,
        }
    }

    /// 已加载的字体面数量（用于启动日志）
    pub fn font_count(&self) -> usize {
        self.fontdb.len()
    }
}

impl RasterEncoder for ResvgPngEncoder {
    fn encode(&self, svg: &str) -> Result<Vec<u8>, EncodeError> {
        let t0 = std::time::Instant::now();

        let speed = self.optimize_speed;
        let opts = UsvgOptions {
            fontdb: self.fontdb.clone(),
            font_family: self.font_family.clone(),
            languages: vec!["ja".to_string(), "zh-CN".to_string(), "en".to_string()],
            shape_rendering: if speed {
                usvg::ShapeRendering::OptimizeSpeed
            } else {
                usvg::ShapeRendering::GeometricPrecision
            },
            text_rendering: if speed {
                usvg::TextRendering::OptimizeSpeed
            } else {
                usvg::TextRendering::OptimizeLegibility
            },
            ..Default::default()
        };

        let tree = usvg::Tree::from_data(svg.as_bytes(), &opts)
            .map_err(|e| EncodeError(format!("解析 SVG 失败: {e}")))?;
        let t_parse = t0.elapsed();

        let size = tree.size().to_int_size();
        let mut pixmap = Pixmap::new(size.width(), size.height())
            .ok_or_else(|| EncodeError(format!("无法创建 {}x{} 画布", size.width(), size.height())))?;
        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());
        let t_raster = t0.elapsed();

        let out = encode_png(&pixmap, self.optimize_speed)?;
        tracing::debug!(
            "PNG渲染内部分段: 解析={:?}, 栅格化={:?}, 编码={:?}",
            t_parse,
            t_raster - t_parse,
            t0.elapsed() - t_raster
        );
        Ok(out)
    }
}

/// tiny-skia 内部是预乘 alpha，写 PNG 前需要还原为直通 alpha。
fn encode_png(pixmap: &Pixmap, fast: bool) -> Result<Vec<u8>, EncodeError> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        if fast {
            encoder.set_compression(png::Compression::Fast);
            encoder.set_filter(png::FilterType::NoFilter);
        } else {
            encoder.set_compression(png::Compression::Default);
            encoder.set_filter(png::FilterType::Paeth);
        }
        let mut writer = encoder
            .write_header()
            .map_err(|e| EncodeError(format!("PNG write_header error: {e}")))?;
        writer
            .write_image_data(&rgba)
            .map_err(|e| EncodeError(format!("PNG write_image_data error: {e}")))?;
        writer
            .finish()
            .map_err(|e| EncodeError(format!("PNG finish error: {e}")))?;
    }
    Ok(out)
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc" | "otc"))
}

/// 目录下可加载的字体文件数量（目录不存在时为 0）
pub fn count_font_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .filter(|e| e.path().is_file() && is_font_file(&e.path()))
                .count()
        })
        .unwrap_or(0)
}

/// 初始化字体数据库：系统字体 + 自定义字体目录
fn load_font_db(dir: &Path) -> fontdb::Database {
    let mut font_db = fontdb::Database::new();
    font_db.load_system_fonts();

    if let Ok(entries) = fs::read_dir(dir) {
        for path in entries.flatten().map(|e| e.path()) {
            if path.is_file() && is_font_file(&path) {
                if let Err(e) = font_db.load_font_file(&path) {
                    tracing::error!("加载字体文件失败 '{}': {}", path.display(), e);
                }
            }
        }
    }

    font_db
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn encoder() -> ResvgPngEncoder {
        ResvgPngEncoder::new(&RenderConfig {
            fonts_dir: "does-not-exist".to_string(),
            ..RenderConfig::default()
        })
    }

    #[test]
    fn encodes_simple_svg_to_png() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20"><rect width="40" height="20" fill="#67362e"/></svg>"##;
        let bytes = encoder().encode(svg).expect("encode");
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn malformed_markup_is_an_encode_error() {
        let err = encoder().encode("<svg").unwrap_err();
        assert!(err.0.contains("SVG"));
    }

    #[test]
    fn font_file_detection_is_case_insensitive() {
        assert!(is_font_file(Path::new("a/NotoSansJP.OTF")));
        assert!(is_font_file(Path::new("b.ttc")));
        assert!(!is_font_file(Path::new("readme.md")));
        assert_eq!(count_font_files(Path::new("does-not-exist")), 0);
    }
}
