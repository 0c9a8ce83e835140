use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::series::SeriesId;

/// 十六进制颜色：`#` + 3 位或 6 位十六进制数字（大小写均可）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct HexColor(Cow<'static, str>);

impl HexColor {
    /// 校验并构造；不符合格式时返回 None。
    pub fn parse(raw: &str) -> Option<Self> {
        is_hex_color(raw).then(|| Self(Cow::Owned(raw.to_string())))
    }

    /// 用于静态目录中的内置颜色，合法性由 series 的单元测试保证。
    pub(crate) const fn from_static(raw: &'static str) -> Self {
        Self(Cow::Borrowed(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_hex_color(raw: &str) -> bool {
    raw.strip_prefix('#').is_some_and(|digits| {
        matches!(digits.len(), 3 | 6) && digits.bytes().all(|b| b.is_ascii_hexdigit())
    })
}

/// 视觉参数：五种颜色 + 主轴/交叉轴偏移（[-1, 1]）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualConfig {
    pub outline_color: HexColor,
    pub background_box_color: HexColor,
    pub foreground_box_color: HexColor,
    pub text_color: HexColor,
    pub text_highlight_color: HexColor,
    pub offset_main_axis: f64,
    pub offset_cross_axis: f64,
}

/// 文字排列方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// 竖排：每行为一列，从右向左排列
    Vertical,
    /// 横排：每行从左到右，上下堆叠
    #[default]
    Horizontal,
}

impl Orientation {
    pub fn from_vertical_flag(vertical: bool) -> Self {
        if vertical {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }
}

/// 输出图片格式
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PNG（默认）
    #[default]
    Png,
    /// SVG 源文本
    Svg,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Png, OutputFormat::Svg];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Svg => "image/svg+xml",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ();

    /// 只接受精确的小写取值，与 series 一致。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or(())
    }
}

/// 高亮区间：第 `line` 行（0 或 1）的第 `start..=end` 个字符。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HighlightRange {
    line: u8,
    start: u32,
    end: u32,
}

impl HighlightRange {
    /// 仅在 `line ∈ {0,1}` 且 `start <= end` 时构造成功。
    pub fn new(line: u8, start: u32, end: u32) -> Option<Self> {
        (line <= 1 && start <= end).then_some(Self { line, start, end })
    }

    /// 未提供 highlight 时使用：高亮第二行的前两个字符。
    pub fn default_range() -> Self {
        Self {
            line: 1,
            start: 0,
            end: 1,
        }
    }

    pub fn line(&self) -> u8 {
        self.line
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// 第 `line` 行的第 `index` 个字符是否被该区间覆盖
    pub fn covers(&self, line: u8, index: usize) -> bool {
        self.line == line && (self.start as usize..=self.end as usize).contains(&index)
    }
}

/// 颜色覆盖项（未提供即为 None，回退到 series 默认值）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorOverrides {
    pub outline_color: Option<HexColor>,
    pub background_box_color: Option<HexColor>,
    pub foreground_box_color: Option<HexColor>,
    pub text_color: Option<HexColor>,
    pub text_highlight_color: Option<HexColor>,
}

/// 通过校验的请求：每个可覆盖字段都是 “未提供 | 显式值” 两态。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidatedRequest {
    pub series: SeriesId,
    pub text1: Option<String>,
    pub text2: Option<String>,
    pub vertical: Option<bool>,
    pub centered: Option<bool>,
    pub colors: ColorOverrides,
    pub offset_main_axis: Option<f64>,
    pub offset_cross_axis: Option<f64>,
    pub highlight: Option<String>,
    pub format: OutputFormat,
}

impl ValidatedRequest {
    /// 固定输出格式（用于 `.svg` 路由），其余字段不变。
    pub fn with_format(self, format: OutputFormat) -> Self {
        Self { format, ..self }
    }
}
