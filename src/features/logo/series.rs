//! Series 目录：固定的一组视觉身份及其默认配色、文字与排版。
//!
//! 目录在进程内只构造一次且只读，可在任意请求间无锁并发读取。

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::Serialize;

use super::types::{HexColor, VisualConfig};

/// Series 标识（查询参数 `series` 的取值）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SeriesId {
    /// 結城友奈は勇者である（默认）
    #[default]
    Yuyuyu,
    /// 鷲尾須美は勇者である
    Wasuyu,
    /// 乃木若葉は勇者である
    Nowayu,
    /// 楠芽吹は勇者である
    Kumeyu,
    /// 上里ひなたは巫女である
    Uhimi,
}

impl SeriesId {
    pub const ALL: [SeriesId; 5] = [
        SeriesId::Yuyuyu,
        SeriesId::Wasuyu,
        SeriesId::Nowayu,
        SeriesId::Kumeyu,
        SeriesId::Uhimi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SeriesId::Yuyuyu => "yuyuyu",
            SeriesId::Wasuyu => "wasuyu",
            SeriesId::Nowayu => "nowayu",
            SeriesId::Kumeyu => "kumeyu",
            SeriesId::Uhimi => "uhimi",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeriesId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SeriesId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or(())
    }
}

/// 默认文字与排版
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDefaults {
    pub first_line: &'static str,
    pub second_line: &'static str,
    pub vertical: bool,
    pub centered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesEntry {
    pub id: SeriesId,
    pub visual_defaults: VisualConfig,
    pub text_defaults: TextDefaults,
}

/// 只读的 series 目录，按 `SeriesId` 定长索引，查找不会失败。
#[derive(Debug)]
pub struct SeriesRegistry {
    entries: [SeriesEntry; 5],
}

static REGISTRY: Lazy<SeriesRegistry> = Lazy::new(SeriesRegistry::builtin);

impl SeriesRegistry {
    /// 进程级单例
    pub fn global() -> &'static SeriesRegistry {
        &REGISTRY
    }

    pub fn get(&self, id: SeriesId) -> &SeriesEntry {
        &self.entries[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesEntry> {
        self.entries.iter()
    }

    fn builtin() -> Self {
        // 数组顺序必须与 SeriesId 的声明顺序一致
        Self {
            entries: [
                entry(
                    SeriesId::Yuyuyu,
                    ["#ffffff", "#67362e", "#eed0d2", "#67362e", "#ffffff"],
                    ("結城友奈は", "勇者である"),
                    false,
                ),
                entry(
                    SeriesId::Wasuyu,
                    ["#ffffff", "#2e4667", "#d2def0", "#2e4667", "#ffffff"],
                    ("鷲尾須美は", "勇者である"),
                    false,
                ),
                entry(
                    SeriesId::Nowayu,
                    ["#ffffff", "#2f5130", "#d5ead2", "#2f5130", "#ffffff"],
                    ("乃木若葉は", "勇者である"),
                    false,
                ),
                entry(
                    SeriesId::Kumeyu,
                    ["#ffffff", "#4a3366", "#e2d6ef", "#4a3366", "#ffffff"],
                    ("楠 芽吹は", "勇者である"),
                    false,
                ),
                entry(
                    SeriesId::Uhimi,
                    ["#ffffff", "#7a5a1e", "#f3e6c8", "#7a5a1e", "#ffffff"],
                    ("上里ひなたは", "巫女である"),
                    true,
                ),
            ],
        }
    }
}

/// colors 顺序：outline, backgroundBox, foregroundBox, text, textHighlight
fn entry(
    id: SeriesId,
    colors: [&'static str; 5],
    lines: (&'static str, &'static str),
    centered: bool,
) -> SeriesEntry {
    let [outline, background, foreground, text, highlight] = colors;
    SeriesEntry {
        id,
        visual_defaults: VisualConfig {
            outline_color: HexColor::from_static(outline),
            background_box_color: HexColor::from_static(background),
            foreground_box_color: HexColor::from_static(foreground),
            text_color: HexColor::from_static(text),
            text_highlight_color: HexColor::from_static(highlight),
            offset_main_axis: 0.0,
            offset_cross_axis: 0.0,
        },
        text_defaults: TextDefaults {
            first_line: lines.0,
            second_line: lines.1,
            vertical: false,
            centered,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::logo::types::is_hex_color;

    #[test]
    fn registry_is_indexed_by_id() {
        let registry = SeriesRegistry::global();
        for id in SeriesId::ALL {
            assert_eq!(registry.get(id).id, id);
        }
        assert_eq!(registry.iter().count(), SeriesId::ALL.len());
    }

    #[test]
    fn builtin_defaults_satisfy_visual_invariants() {
        for e in SeriesRegistry::global().iter() {
            let v = &e.visual_defaults;
            for c in [
                &v.outline_color,
                &v.background_box_color,
                &v.foreground_box_color,
                &v.text_color,
                &v.text_highlight_color,
            ] {
                assert!(is_hex_color(c.as_str()), "{}: {}", e.id, c);
            }
            assert!((-1.0..=1.0).contains(&v.offset_main_axis));
            assert!((-1.0..=1.0).contains(&v.offset_cross_axis));
        }
    }

    #[test]
    fn series_ids_round_trip_through_strings() {
        for id in SeriesId::ALL {
            assert_eq!(id.as_str().parse::<SeriesId>(), Ok(id));
        }
        assert!("Yuyuyu".parse::<SeriesId>().is_err());
        assert_eq!(SeriesId::default(), SeriesId::Yuyuyu);
    }

    #[test]
    fn uhimi_is_centered_and_uses_miko_line() {
        let e = SeriesRegistry::global().get(SeriesId::Uhimi);
        assert!(e.text_defaults.centered);
        assert_eq!(e.text_defaults.second_line, "巫女である");
    }
}
