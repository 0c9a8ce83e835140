use super::highlight::parse_highlights;
use super::series::{SeriesEntry, SeriesRegistry};
use super::types::{HighlightRange, Orientation, OutputFormat, ValidatedRequest, VisualConfig};

/// 最终的渲染任务：构造后不可变，完整决定一次渲染调用。
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRenderJob {
    visual: VisualConfig,
    orientation: Orientation,
    text1: String,
    text2: String,
    highlights: Vec<HighlightRange>,
    centered: bool,
    output_format: OutputFormat,
}

impl ResolvedRenderJob {
    pub fn visual(&self) -> &VisualConfig {
        &self.visual
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn text1(&self) -> &str {
        &self.text1
    }

    pub fn text2(&self) -> &str {
        &self.text2
    }

    pub fn highlights(&self) -> &[HighlightRange] {
        &self.highlights
    }

    pub fn centered(&self) -> bool {
        self.centered
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }
}

/// 将请求覆盖项与 series 默认值合并为渲染任务。
///
/// 每个字段独立回退：请求里提供了就用请求的，否则用 series 默认值；不做结构化深合并。
pub fn resolve(request: &ValidatedRequest, registry: &SeriesRegistry) -> ResolvedRenderJob {
    let entry = registry.get(request.series);

    ResolvedRenderJob {
        visual: resolve_visual(request, entry),
        orientation: Orientation::from_vertical_flag(
            request.vertical.unwrap_or(entry.text_defaults.vertical),
        ),
        text1: request
            .text1
            .clone()
            .unwrap_or_else(|| entry.text_defaults.first_line.to_string()),
        text2: request
            .text2
            .clone()
            .unwrap_or_else(|| entry.text_defaults.second_line.to_string()),
        highlights: parse_highlights(request.highlight.as_deref()),
        centered: request.centered.unwrap_or(entry.text_defaults.centered),
        output_format: request.format,
    }
}

fn resolve_visual(request: &ValidatedRequest, entry: &SeriesEntry) -> VisualConfig {
    let defaults = &entry.visual_defaults;
    let colors = &request.colors;
    VisualConfig {
        outline_color: colors
            .outline_color
            .clone()
            .unwrap_or_else(|| defaults.outline_color.clone()),
        background_box_color: colors
            .background_box_color
            .clone()
            .unwrap_or_else(|| defaults.background_box_color.clone()),
        foreground_box_color: colors
            .foreground_box_color
            .clone()
            .unwrap_or_else(|| defaults.foreground_box_color.clone()),
        text_color: colors
            .text_color
            .clone()
            .unwrap_or_else(|| defaults.text_color.clone()),
        text_highlight_color: colors
            .text_highlight_color
            .clone()
            .unwrap_or_else(|| defaults.text_highlight_color.clone()),
        offset_main_axis: request.offset_main_axis.unwrap_or(defaults.offset_main_axis),
        offset_cross_axis: request
            .offset_cross_axis
            .unwrap_or(defaults.offset_cross_axis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::logo::schema::LogoQuery;
    use crate::features::logo::series::SeriesId;
    use crate::features::logo::types::HexColor;

    fn request_for(series: SeriesId) -> ValidatedRequest {
        ValidatedRequest {
            series,
            ..ValidatedRequest::default()
        }
    }

    #[test]
    fn no_overrides_reproduce_series_defaults() {
        let registry = SeriesRegistry::global();
        for id in SeriesId::ALL {
            let entry = registry.get(id);
            let job = resolve(&request_for(id), registry);

            assert_eq!(job.visual(), &entry.visual_defaults, "{id}");
            assert_eq!(job.text1(), entry.text_defaults.first_line);
            assert_eq!(job.text2(), entry.text_defaults.second_line);
            assert_eq!(
                job.orientation(),
                Orientation::from_vertical_flag(entry.text_defaults.vertical)
            );
            assert_eq!(job.centered(), entry.text_defaults.centered);
            assert_eq!(job.highlights(), &[HighlightRange::default_range()]);
            assert_eq!(job.output_format(), OutputFormat::Png);
        }
    }

    #[test]
    fn single_color_override_leaves_siblings_untouched() {
        let registry = SeriesRegistry::global();
        let defaults = &registry.get(SeriesId::Wasuyu).visual_defaults;
        let mut req = request_for(SeriesId::Wasuyu);
        req.colors.foreground_box_color = HexColor::parse("#123");

        let job = resolve(&req, registry);
        let v = job.visual();
        assert_eq!(v.foreground_box_color.as_str(), "#123");
        assert_eq!(v.outline_color, defaults.outline_color);
        assert_eq!(v.background_box_color, defaults.background_box_color);
        assert_eq!(v.text_color, defaults.text_color);
        assert_eq!(v.text_highlight_color, defaults.text_highlight_color);
        assert_eq!(v.offset_main_axis, defaults.offset_main_axis);
        assert_eq!(v.offset_cross_axis, defaults.offset_cross_axis);
    }

    #[test]
    fn offsets_override_independently() {
        let registry = SeriesRegistry::global();
        let mut req = request_for(SeriesId::Nowayu);
        req.offset_cross_axis = Some(-0.75);

        let job = resolve(&req, registry);
        assert_eq!(job.visual().offset_cross_axis, -0.75);
        assert_eq!(job.visual().offset_main_axis, 0.0);
    }

    #[test]
    fn explicit_false_overrides_centered_series_default() {
        let registry = SeriesRegistry::global();
        assert!(registry.get(SeriesId::Uhimi).text_defaults.centered);

        let mut req = request_for(SeriesId::Uhimi);
        req.centered = Some(false);
        assert!(!resolve(&req, registry).centered());

        // 未提供时保持 series 默认
        assert!(resolve(&request_for(SeriesId::Uhimi), registry).centered());
    }

    #[test]
    fn vertical_flag_selects_orientation() {
        let registry = SeriesRegistry::global();
        let mut req = request_for(SeriesId::Kumeyu);
        req.vertical = Some(true);
        assert_eq!(resolve(&req, registry).orientation(), Orientation::Vertical);
    }

    #[test]
    fn text_override_replaces_only_that_line() {
        let registry = SeriesRegistry::global();
        let req = LogoQuery {
            text2: Some("魔法少女である".into()),
            highlight: Some("0:0-1,2:0-0".into()),
            format: Some("svg".into()),
            ..LogoQuery::default()
        }
        .validate()
        .unwrap();

        let job = resolve(&req, registry);
        assert_eq!(job.text1(), "結城友奈は");
        assert_eq!(job.text2(), "魔法少女である");
        assert_eq!(job.highlights(), &[HighlightRange::new(0, 0, 1).unwrap()]);
        assert_eq!(job.output_format(), OutputFormat::Svg);
    }

    #[test]
    fn pinned_format_wins_over_query_format() {
        let registry = SeriesRegistry::global();
        let req = LogoQuery {
            format: Some("png".into()),
            ..LogoQuery::default()
        }
        .validate()
        .unwrap()
        .with_format(OutputFormat::Svg);
        assert_eq!(resolve(&req, registry).output_format(), OutputFormat::Svg);
    }
}
