use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use unicode_width::UnicodeWidthChar;

use crate::error::RenderError;

use super::types::{HighlightRange, Orientation, VisualConfig};

/// 渲染能力：把已解析的配置排版为 SVG 文本。
///
/// 实现可能是 CPU 密集型的同步调用，调度方会放到阻塞线程池执行。
pub trait LogoRenderer: Send + Sync {
    fn render(
        &self,
        visual: &VisualConfig,
        orientation: Orientation,
        text1: &str,
        text2: &str,
        highlights: &[HighlightRange],
        centered: bool,
    ) -> Result<String, RenderError>;
}

const TEMPLATE_NAME: &str = "logo.svg";
const TEMPLATE_SOURCE: &str = include_str!("templates/logo.svg.jinja");

const FONT_SIZE: f64 = 100.0;
/// 基线相对字框顶部的位置（按字号比例）
const BASELINE_RATIO: f64 = 0.88;
const BOX_PADDING: f64 = 18.0;
const LINE_GAP: f64 = 14.0;
/// 不居中时第二行相对第一行的错位
const STAGGER: f64 = 50.0;
/// 背景框相对前景框的基础位移
const BACK_BOX_SHIFT: f64 = 10.0;
/// offset = ±1 时额外位移的最大值
const MAX_OFFSET_SHIFT: f64 = 16.0;
const OUTLINE_WIDTH: f64 = 6.0;
const CANVAS_MARGIN: f64 = 12.0;

/// 内置的 SVG 排版实现（外部模板 + Rust 计算坐标）。
///
/// 文字按 `unicode-width` 估算字宽：全角字符占 1em，半角占 0.5em；
/// 竖排时每个字符占满 1em 的格子。
pub struct SvgLogoRenderer {
    env: Environment<'static>,
    font_family: String,
}

impl SvgLogoRenderer {
    pub fn new(font_family: impl Into<String>) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        // SVG 是 XML，统一按 HTML 规则转义用户文本
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_template(TEMPLATE_NAME, TEMPLATE_SOURCE)
            .map_err(|e| RenderError(format!("加载 SVG 模板失败: {e}")))?;
        Ok(Self {
            env,
            font_family: font_family.into(),
        })
    }
}

impl LogoRenderer for SvgLogoRenderer {
    fn render(
        &self,
        visual: &VisualConfig,
        orientation: Orientation,
        text1: &str,
        text2: &str,
        highlights: &[HighlightRange],
        centered: bool,
    ) -> Result<String, RenderError> {
        for (name, v) in [
            ("offsetMainAxis", visual.offset_main_axis),
            ("offsetCrossAxis", visual.offset_cross_axis),
        ] {
            if !v.is_finite() || !(-1.0..=1.0).contains(&v) {
                return Err(RenderError(format!("{name} 超出 [-1, 1]: {v}")));
            }
        }

        let layout = layout(visual, orientation, [text1, text2], highlights, centered);
        let ctx = TemplateContext {
            width: round2(layout.width),
            height: round2(layout.height),
            font_family: &self.font_family,
            font_size: FONT_SIZE,
            outline_width: OUTLINE_WIDTH,
            anchor: match orientation {
                Orientation::Horizontal => "start",
                Orientation::Vertical => "middle",
            },
            colors: visual,
            back_boxes: layout.back_boxes,
            front_boxes: layout.front_boxes,
            highlight_cells: layout.highlight_cells,
            glyphs: layout.glyphs,
        };

        let tpl = self
            .env
            .get_template(TEMPLATE_NAME)
            .map_err(|e| RenderError(format!("加载 SVG 模板失败: {e}")))?;
        tpl.render(&ctx)
            .map_err(|e| RenderError(format!("渲染 SVG 模板失败: {e}")))
    }
}

#[derive(Serialize)]
struct TemplateContext<'a> {
    width: f64,
    height: f64,
    font_family: &'a str,
    font_size: f64,
    outline_width: f64,
    anchor: &'static str,
    colors: &'a VisualConfig,
    back_boxes: Vec<Rect>,
    front_boxes: Vec<Rect>,
    highlight_cells: Vec<Rect>,
    glyphs: Vec<Glyph>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct Rect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl Rect {
    fn translate(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    fn rounded(self) -> Self {
        Self {
            x: round2(self.x),
            y: round2(self.y),
            w: round2(self.w),
            h: round2(self.h),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Glyph {
    x: f64,
    y: f64,
    ch: String,
    highlighted: bool,
}

#[derive(Debug)]
struct Layout {
    width: f64,
    height: f64,
    back_boxes: Vec<Rect>,
    front_boxes: Vec<Rect>,
    highlight_cells: Vec<Rect>,
    glyphs: Vec<Glyph>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn advance(ch: char, orientation: Orientation) -> f64 {
    match orientation {
        Orientation::Vertical => FONT_SIZE,
        Orientation::Horizontal => ch.width().unwrap_or(0) as f64 * FONT_SIZE / 2.0,
    }
}

fn layout(
    visual: &VisualConfig,
    orientation: Orientation,
    lines: [&str; 2],
    highlights: &[HighlightRange],
    centered: bool,
) -> Layout {
    let cross = FONT_SIZE + 2.0 * BOX_PADDING;
    let mains: Vec<f64> = lines
        .iter()
        .map(|l| l.chars().map(|c| advance(c, orientation)).sum::<f64>() + 2.0 * BOX_PADDING)
        .collect();
    let longest = mains.iter().copied().fold(0.0, f64::max);

    let mut front_boxes = Vec::with_capacity(2);
    let mut highlight_cells = Vec::new();
    let mut glyphs = Vec::new();

    for (i, text) in lines.iter().enumerate() {
        let indent = if centered {
            (longest - mains[i]) / 2.0
        } else {
            i as f64 * STAGGER
        };
        // 横排：行从上往下；竖排：列从右往左
        let rect = match orientation {
            Orientation::Horizontal => Rect {
                x: indent,
                y: i as f64 * (cross + LINE_GAP),
                w: mains[i],
                h: cross,
            },
            Orientation::Vertical => Rect {
                x: (1 - i) as f64 * (cross + LINE_GAP),
                y: indent,
                w: cross,
                h: mains[i],
            },
        };
        front_boxes.push(rect);

        let mut cursor = BOX_PADDING;
        for (idx, ch) in text.chars().enumerate() {
            let adv = advance(ch, orientation);
            let highlighted = highlights.iter().any(|r| r.covers(i as u8, idx));
            let (cell, glyph_x) = match orientation {
                Orientation::Horizontal => (
                    Rect {
                        x: rect.x + cursor,
                        y: rect.y + BOX_PADDING,
                        w: adv,
                        h: FONT_SIZE,
                    },
                    rect.x + cursor,
                ),
                Orientation::Vertical => (
                    Rect {
                        x: rect.x + BOX_PADDING,
                        y: rect.y + cursor,
                        w: FONT_SIZE,
                        h: adv,
                    },
                    rect.x + BOX_PADDING + FONT_SIZE / 2.0,
                ),
            };
            if highlighted {
                highlight_cells.push(cell);
            }
            glyphs.push(Glyph {
                x: glyph_x,
                y: cell.y + FONT_SIZE * BASELINE_RATIO,
                ch: ch.to_string(),
                highlighted,
            });
            cursor += adv;
        }
    }

    // 背景框 = 前景框沿主轴/交叉轴位移；offset 在基础位移上再偏移
    let main_shift = BACK_BOX_SHIFT + visual.offset_main_axis * MAX_OFFSET_SHIFT;
    let cross_shift = BACK_BOX_SHIFT + visual.offset_cross_axis * MAX_OFFSET_SHIFT;
    let (dx, dy) = match orientation {
        Orientation::Horizontal => (main_shift, cross_shift),
        Orientation::Vertical => (cross_shift, main_shift),
    };
    let back_boxes: Vec<Rect> = front_boxes.iter().map(|r| r.translate(dx, dy)).collect();

    // 归一化到画布坐标：所有框的包围盒 + 描边 + 边距
    let pad = OUTLINE_WIDTH + CANVAS_MARGIN;
    let all = front_boxes.iter().chain(back_boxes.iter());
    let min_x = all.clone().map(|r| r.x).fold(f64::INFINITY, f64::min);
    let min_y = all.clone().map(|r| r.y).fold(f64::INFINITY, f64::min);
    let max_x = all.clone().map(|r| r.x + r.w).fold(f64::NEG_INFINITY, f64::max);
    let max_y = all.map(|r| r.y + r.h).fold(f64::NEG_INFINITY, f64::max);
    let (tx, ty) = (pad - min_x, pad - min_y);

    let shift = |rects: Vec<Rect>| -> Vec<Rect> {
        rects
            .into_iter()
            .map(|r| r.translate(tx, ty).rounded())
            .collect()
    };

    Layout {
        width: max_x - min_x + 2.0 * pad,
        height: max_y - min_y + 2.0 * pad,
        back_boxes: shift(back_boxes),
        front_boxes: shift(front_boxes),
        highlight_cells: shift(highlight_cells),
        glyphs: glyphs
            .into_iter()
            .map(|g| Glyph {
                x: round2(g.x + tx),
                y: round2(g.y + ty),
                ..g
            })
            .collect(),
    }
}
