use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ValidationError;

use super::series::SeriesId;
use super::types::{ColorOverrides, HexColor, OutputFormat, ValidatedRequest};

/// 单行文字的最大字符数（按 Unicode 标量计数）
pub const MAX_TEXT_CHARS: usize = 100;

/// 原始查询参数：全部按字符串接收，由 [`LogoQuery::validate`] 统一校验与转换。
///
/// 这里的字段定义同时用于生成 OpenAPI 参数文档。
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LogoQuery {
    /// Series of logo to be generated (default yuyuyu)
    #[param(value_type = Option<SeriesId>, example = "yuyuyu")]
    pub series: Option<String>,
    /// First line of text to be displayed on the logo (max 100 characters)
    #[param(example = "結城友奈は")]
    pub text1: Option<String>,
    /// Second line of text to be displayed on the logo (max 100 characters)
    #[param(example = "勇者である")]
    pub text2: Option<String>,
    /// Whether to display the logo vertically ("true"/"false"; other values are ignored)
    #[param(value_type = Option<bool>, example = false)]
    pub vertical: Option<String>,
    /// Whether to center the text ("true"/"false"; other values are ignored)
    #[param(value_type = Option<bool>, example = false)]
    pub centered: Option<String>,
    /// Color of the outline in hex format
    #[param(example = "#ffffff")]
    pub outline_color: Option<String>,
    /// Color of the background box in hex format
    #[param(example = "#67362e")]
    pub background_box_color: Option<String>,
    /// Color of the foreground box in hex format
    #[param(example = "#eed0d2")]
    pub foreground_box_color: Option<String>,
    /// Color of the text in hex format
    #[param(example = "#67362e")]
    pub text_color: Option<String>,
    /// Color of the highlighted text in hex format
    #[param(example = "#ffffff")]
    pub text_highlight_color: Option<String>,
    /// Offset along the main axis (-1 to 1, where -1 is left/top and 1 is right/bottom)
    #[param(value_type = Option<f64>, minimum = -1.0, maximum = 1.0, example = 0)]
    pub offset_main_axis: Option<String>,
    /// Offset along the cross axis (-1 to 1, where -1 is left/top and 1 is right/bottom)
    #[param(value_type = Option<f64>, minimum = -1.0, maximum = 1.0, example = 0)]
    pub offset_cross_axis: Option<String>,
    /// Comma-separated highlight ranges `line:start-end` or `line:pos` (e.g. 0:0-2,1:1-3)
    #[param(example = "1:0-1")]
    pub highlight: Option<String>,
    /// Format of the generated image (default png)
    #[param(value_type = Option<OutputFormat>, example = "png")]
    pub format: Option<String>,
}

impl LogoQuery {
    /// 校验全部字段；任一字段不合法即整体失败，错误列出所有出错字段。
    pub fn validate(&self) -> Result<ValidatedRequest, ValidationError> {
        let mut errors = ValidationError::default();

        let series = match self.series.as_deref() {
            None => SeriesId::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                errors.push(
                    "series",
                    format!("unknown series `{raw}`, expected one of {}", series_names()),
                );
                SeriesId::default()
            }),
        };

        let text1 = check_text(&mut errors, "text1", self.text1.as_deref());
        let text2 = check_text(&mut errors, "text2", self.text2.as_deref());

        let colors = ColorOverrides {
            outline_color: check_color(&mut errors, "outlineColor", &self.outline_color),
            background_box_color: check_color(
                &mut errors,
                "backgroundBoxColor",
                &self.background_box_color,
            ),
            foreground_box_color: check_color(
                &mut errors,
                "foregroundBoxColor",
                &self.foreground_box_color,
            ),
            text_color: check_color(&mut errors, "textColor", &self.text_color),
            text_highlight_color: check_color(
                &mut errors,
                "textHighlightColor",
                &self.text_highlight_color,
            ),
        };

        let offset_main_axis =
            check_offset(&mut errors, "offsetMainAxis", self.offset_main_axis.as_deref());
        let offset_cross_axis = check_offset(
            &mut errors,
            "offsetCrossAxis",
            self.offset_cross_axis.as_deref(),
        );

        let highlight = match self.highlight.as_deref() {
            Some(raw) if !is_highlight_shape(raw) => {
                errors.push(
                    "highlight",
                    "must be comma-separated `line:start-end` or `line:pos` tokens",
                );
                None
            }
            other => other.map(str::to_string),
        };

        let format = match self.format.as_deref() {
            None => OutputFormat::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                errors.push("format", format!("unsupported format `{raw}`, expected png or svg"));
                OutputFormat::default()
            }),
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidatedRequest {
            series,
            text1,
            text2,
            vertical: parse_flag(self.vertical.as_deref()),
            centered: parse_flag(self.centered.as_deref()),
            colors,
            offset_main_axis,
            offset_cross_axis,
            highlight,
            format,
        })
    }
}

fn series_names() -> String {
    SeriesId::ALL
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// 只认字面量 "true"/"false"；其它取值视为未提供，不覆盖 series 默认值。
fn parse_flag(raw: Option<&str>) -> Option<bool> {
    match raw {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

fn check_text(errors: &mut ValidationError, field: &str, raw: Option<&str>) -> Option<String> {
    let text = raw?;
    if text.chars().count() > MAX_TEXT_CHARS {
        errors.push(field, format!("must be at most {MAX_TEXT_CHARS} characters"));
        return None;
    }
    if let Some(bad) = text.chars().find(|c| !is_xml_char(*c)) {
        errors.push(
            field,
            format!("contains unsupported character U+{:04X}", bad as u32),
        );
        return None;
    }
    Some(text.to_string())
}

/// XML 1.0 允许的字符；其余字符会让生成的 SVG 无法解析。
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}')
        || c >= '\u{10000}'
}

fn check_color(
    errors: &mut ValidationError,
    field: &str,
    raw: &Option<String>,
) -> Option<HexColor> {
    let raw = raw.as_deref()?;
    let parsed = HexColor::parse(raw);
    if parsed.is_none() {
        errors.push(field, "must be a hex color like #fff or #ffffff");
    }
    parsed
}

/// 空白字符串视为未提供；非有限数与超出 [-1, 1] 的值直接拒绝（不做截断）。
fn check_offset(errors: &mut ValidationError, field: &str, raw: Option<&str>) -> Option<f64> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && (-1.0..=1.0).contains(&v) => Some(v),
        Ok(v) if v.is_finite() => {
            errors.push(field, format!("must be between -1 and 1, got {v}"));
            None
        }
        _ => {
            errors.push(field, "must be a number between -1 and 1");
            None
        }
    }
}

/// 整体形状：`\d+:\d+(-\d+)?(,\d+:\d+(-\d+)?)*`
///
/// 只检查形状；行号范围、起止顺序等语义问题交给 highlight 解析器逐项丢弃。
pub fn is_highlight_shape(raw: &str) -> bool {
    fn digits(s: &str) -> bool {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
    }

    raw.split(',').all(|token| {
        let Some((line, pos)) = token.split_once(':') else {
            return false;
        };
        let pos_ok = match pos.split_once('-') {
            Some((start, end)) => digits(start) && digits(end),
            None => digits(pos),
        };
        digits(line) && pos_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> LogoQuery {
        LogoQuery::default()
    }

    #[test]
    fn empty_query_uses_documented_defaults() {
        let req = query().validate().expect("valid");
        assert_eq!(req.series, SeriesId::Yuyuyu);
        assert_eq!(req.format, OutputFormat::Png);
        assert_eq!(req.text1, None);
        assert_eq!(req.vertical, None);
        assert_eq!(req.offset_main_axis, None);
        assert_eq!(req.highlight, None);
        assert_eq!(req.colors, ColorOverrides::default());
    }

    #[test]
    fn unknown_series_is_rejected() {
        let q = LogoQuery {
            series: Some("madoka".into()),
            ..query()
        };
        let err = q.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["series"]);
    }

    #[test]
    fn text_longer_than_limit_is_rejected_not_truncated() {
        let ok = LogoQuery {
            text1: Some("あ".repeat(MAX_TEXT_CHARS)),
            ..query()
        };
        assert_eq!(
            ok.validate().unwrap().text1.map(|t| t.chars().count()),
            Some(MAX_TEXT_CHARS)
        );

        let too_long = LogoQuery {
            text2: Some("x".repeat(MAX_TEXT_CHARS + 1)),
            ..query()
        };
        assert_eq!(too_long.validate().unwrap_err().fields(), vec!["text2"]);
    }

    #[test]
    fn text_with_non_xml_characters_is_rejected() {
        let q = LogoQuery {
            text1: Some("a\u{1}b".into()),
            text2: Some("x\u{FFFE}".into()),
            ..query()
        };
        assert_eq!(q.validate().unwrap_err().fields(), vec!["text1", "text2"]);

        let ok = LogoQuery {
            text1: Some("tab\there".into()),
            text2: Some("𝕏 ok".into()),
            ..query()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn boolean_flags_only_accept_literals() {
        let q = LogoQuery {
            vertical: Some("true".into()),
            centered: Some("false".into()),
            ..query()
        };
        let req = q.validate().unwrap();
        assert_eq!(req.vertical, Some(true));
        assert_eq!(req.centered, Some(false));

        for ambiguous in ["1", "yes", "TRUE", ""] {
            let q = LogoQuery {
                vertical: Some(ambiguous.into()),
                centered: Some(ambiguous.into()),
                ..query()
            };
            let req = q.validate().expect("ambiguous flags are not errors");
            assert_eq!(req.vertical, None, "{ambiguous:?}");
            assert_eq!(req.centered, None, "{ambiguous:?}");
        }
    }

    #[test]
    fn colors_accept_short_and_long_hex() {
        let q = LogoQuery {
            outline_color: Some("#fff".into()),
            text_color: Some("#ffffff".into()),
            ..query()
        };
        let req = q.validate().unwrap();
        assert_eq!(req.colors.outline_color.unwrap().as_str(), "#fff");
        assert_eq!(req.colors.text_color.unwrap().as_str(), "#ffffff");
    }

    #[test]
    fn malformed_colors_are_all_reported() {
        let q = LogoQuery {
            background_box_color: Some("#ff".into()),
            text_highlight_color: Some("#gggggg".into()),
            ..query()
        };
        let err = q.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["backgroundBoxColor", "textHighlightColor"]);
    }

    #[test]
    fn offsets_accept_closed_interval_bounds() {
        for raw in ["-1", "0", "1", "0.25", "-0.5"] {
            let q = LogoQuery {
                offset_main_axis: Some(raw.into()),
                offset_cross_axis: Some(raw.into()),
                ..query()
            };
            let req = q.validate().unwrap_or_else(|e| panic!("{raw}: {e}"));
            let expected: f64 = raw.parse().unwrap();
            assert_eq!(req.offset_main_axis, Some(expected));
            assert_eq!(req.offset_cross_axis, Some(expected));
        }
    }

    #[test]
    fn offsets_outside_interval_or_non_numeric_are_rejected() {
        for raw in ["1.01", "-1.5", "abc", "NaN", "inf"] {
            let q = LogoQuery {
                offset_cross_axis: Some(raw.into()),
                ..query()
            };
            assert_eq!(
                q.validate().unwrap_err().fields(),
                vec!["offsetCrossAxis"],
                "{raw}"
            );
        }
    }

    #[test]
    fn blank_offset_counts_as_absent() {
        let q = LogoQuery {
            offset_main_axis: Some("  ".into()),
            ..query()
        };
        assert_eq!(q.validate().unwrap().offset_main_axis, None);
    }

    #[test]
    fn highlight_shape_is_checked_at_schema_level() {
        assert!(is_highlight_shape("0:0-2,1:1-3"));
        assert!(is_highlight_shape("1:4"));
        assert!(is_highlight_shape("2:0-1"));
        assert!(is_highlight_shape("0:5-2"));
        for bad in ["", "0", "0:", "a:1-2", "0:1-", "0:-1", "0:1-2,", "0:1-2;1:0", "-1:0-1"] {
            assert!(!is_highlight_shape(bad), "{bad:?}");
        }

        let q = LogoQuery {
            highlight: Some("0:1-x".into()),
            ..query()
        };
        assert_eq!(q.validate().unwrap_err().fields(), vec!["highlight"]);
    }

    #[test]
    fn format_must_be_supported() {
        let q = LogoQuery {
            format: Some("svg".into()),
            ..query()
        };
        assert_eq!(q.validate().unwrap().format, OutputFormat::Svg);

        let q = LogoQuery {
            format: Some("webp".into()),
            ..query()
        };
        assert_eq!(q.validate().unwrap_err().fields(), vec!["format"]);
    }

    #[test]
    fn every_invalid_field_is_listed_in_order() {
        let q = LogoQuery {
            series: Some("nope".into()),
            text1: Some("x".repeat(101)),
            outline_color: Some("red".into()),
            offset_main_axis: Some("2".into()),
            format: Some("gif".into()),
            ..query()
        };
        assert_eq!(
            q.validate().unwrap_err().fields(),
            vec!["series", "text1", "outlineColor", "offsetMainAxis", "format"]
        );
    }
}
