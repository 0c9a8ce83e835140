use super::types::HighlightRange;

/// 解析 highlight 参数为有序的高亮区间列表。
///
/// - 未提供：返回默认区间 `{line:1, start:0, end:1}`
/// - 提供：按 `,` 拆分，逐个解析 `line:start-end` / `line:pos`
///
/// 单个 token 不合法（行号不是 0/1、数字无法解析、start > end）时只丢弃该 token，
/// 不会让整个请求失败；因此结果可能是空列表，表示“不高亮”。
/// 重复或重叠的区间原样保留。
pub fn parse_highlights(raw: Option<&str>) -> Vec<HighlightRange> {
    let Some(raw) = raw else {
        return vec![HighlightRange::default_range()];
    };

    let ranges: Vec<HighlightRange> = raw.split(',').filter_map(parse_token).collect();
    let dropped = raw.split(',').count() - ranges.len();
    if dropped > 0 {
        tracing::debug!(raw, dropped, "部分 highlight 区间不合法，已忽略");
    }
    ranges
}

fn parse_token(token: &str) -> Option<HighlightRange> {
    let (line, pos) = token.split_once(':')?;
    let line = u8::try_from(parse_non_negative(line)?).ok()?;

    let (start, end) = match pos.split_once('-') {
        Some((start, end)) => (parse_non_negative(start)?, parse_non_negative(end)?),
        None => {
            let p = parse_non_negative(pos)?;
            (p, p)
        }
    };

    HighlightRange::new(line, u32::try_from(start).ok()?, u32::try_from(end).ok()?)
}

fn parse_non_negative(raw: &str) -> Option<u64> {
    let v: i64 = raw.trim().parse().ok()?;
    u64::try_from(v).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(line: u8, start: u32, end: u32) -> HighlightRange {
        HighlightRange::new(line, start, end).expect("valid range")
    }

    #[test]
    fn absent_parameter_yields_default_range() {
        assert_eq!(parse_highlights(None), vec![range(1, 0, 1)]);
    }

    #[test]
    fn parses_multiple_ranges_in_order() {
        assert_eq!(
            parse_highlights(Some("0:0-2,1:1-3")),
            vec![range(0, 0, 2), range(1, 1, 3)]
        );
    }

    #[test]
    fn single_position_sets_start_and_end() {
        assert_eq!(parse_highlights(Some("1:4")), vec![range(1, 4, 4)]);
    }

    #[test]
    fn invalid_line_is_dropped_without_error() {
        assert_eq!(parse_highlights(Some("2:0-1")), Vec::<HighlightRange>::new());
    }

    #[test]
    fn reversed_range_is_dropped() {
        assert_eq!(parse_highlights(Some("0:5-2")), Vec::<HighlightRange>::new());
    }

    #[test]
    fn only_bad_tokens_are_dropped() {
        assert_eq!(
            parse_highlights(Some("0:5-2,1:0-0,3:1,0:x,0:2")),
            vec![range(1, 0, 0), range(0, 2, 2)]
        );
    }

    #[test]
    fn duplicates_and_overlaps_pass_through() {
        assert_eq!(
            parse_highlights(Some("0:0-3,0:0-3,0:2-5")),
            vec![range(0, 0, 3), range(0, 0, 3), range(0, 2, 5)]
        );
    }

    #[test]
    fn negative_and_overflowing_numbers_are_dropped() {
        assert_eq!(parse_highlights(Some("0:-1-2")), Vec::<HighlightRange>::new());
        assert_eq!(parse_highlights(Some("0:0-99999999999")), Vec::<HighlightRange>::new());
        assert_eq!(parse_highlights(Some("256:0-1")), Vec::<HighlightRange>::new());
    }

    #[test]
    fn token_without_colon_is_dropped() {
        assert_eq!(parse_highlights(Some("0-1,1:1")), vec![range(1, 1, 1)]);
    }
}
