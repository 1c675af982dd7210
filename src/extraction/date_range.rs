//! Date range extraction
//!
//! Patterns are tried from most to least specific; the first that yields a
//! valid calendar range wins. A pattern that matches textually but names an
//! impossible date (2월 30일) is skipped and the next pattern is tried.
//!
//! Comparison windows follow two rules that are kept deliberately separate:
//! calendar presets compare against the prior calendar unit, everything
//! else compares against the immediately preceding window of equal length.

use std::sync::LazyLock;

use assistant_types::{ClientDateRange, DateRange};
use chrono::{Datelike, Duration, NaiveDate};
use regex::{Captures, Regex};

use super::{compact, is_hangul_syllable};

const MAX_CUSTOM_DAYS: i64 = 3650;

// ============================================================================
// PRESETS
// ============================================================================

/// Named date windows the dashboard's date picker knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePreset {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    Last7Days,
    Last30Days,
    Last90Days,
    Last365Days,
}

/// (compacted keyword, preset), checked in order
static PRESET_KEYWORDS: &[(&str, DatePreset)] = &[
    ("오늘", DatePreset::Today),
    ("금일", DatePreset::Today),
    ("어제", DatePreset::Yesterday),
    ("전일", DatePreset::Yesterday),
    ("이번주", DatePreset::ThisWeek),
    ("금주", DatePreset::ThisWeek),
    ("지난주", DatePreset::LastWeek),
    ("저번주", DatePreset::LastWeek),
    ("전주", DatePreset::LastWeek),
    ("이번달", DatePreset::ThisMonth),
    ("이번월", DatePreset::ThisMonth),
    ("금월", DatePreset::ThisMonth),
    ("지난달", DatePreset::LastMonth),
    ("저번달", DatePreset::LastMonth),
    ("전월", DatePreset::LastMonth),
    ("최근7일", DatePreset::Last7Days),
    ("최근일주일", DatePreset::Last7Days),
    ("일주일간", DatePreset::Last7Days),
    ("최근30일", DatePreset::Last30Days),
    ("최근한달", DatePreset::Last30Days),
    ("한달간", DatePreset::Last30Days),
    ("최근90일", DatePreset::Last90Days),
    ("최근3개월", DatePreset::Last90Days),
    ("3개월간", DatePreset::Last90Days),
    ("최근365일", DatePreset::Last365Days),
    ("최근1년", DatePreset::Last365Days),
    ("1년간", DatePreset::Last365Days),
];

/// Two-syllable Sino-Korean keywords that are also word fragments
/// ("전주시", "전일제", "금주령"); matched only as standalone words
const STANDALONE_KEYWORDS: &[&str] = &["금일", "전일", "금주", "전주", "금월", "전월"];

/// Syllables that may directly follow a standalone keyword ("전주 대비", "전월의")
const KEYWORD_SUFFIX_STARTS: &[char] = &[
    '의', '에', '는', '은', '대', '기', '보', '까', '부', '랑', '와', '과', '도', '만', '로',
];

impl DatePreset {
    pub const ALL: [DatePreset; 10] = [
        DatePreset::Today,
        DatePreset::Yesterday,
        DatePreset::ThisWeek,
        DatePreset::LastWeek,
        DatePreset::ThisMonth,
        DatePreset::LastMonth,
        DatePreset::Last7Days,
        DatePreset::Last30Days,
        DatePreset::Last90Days,
        DatePreset::Last365Days,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::ThisWeek => "thisWeek",
            Self::LastWeek => "lastWeek",
            Self::ThisMonth => "thisMonth",
            Self::LastMonth => "lastMonth",
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
            Self::Last365Days => "365d",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Today => "오늘",
            Self::Yesterday => "어제",
            Self::ThisWeek => "이번 주",
            Self::LastWeek => "지난 주",
            Self::ThisMonth => "이번 달",
            Self::LastMonth => "지난 달",
            Self::Last7Days => "최근 7일",
            Self::Last30Days => "최근 30일",
            Self::Last90Days => "최근 90일",
            Self::Last365Days => "최근 1년",
        }
    }

    fn rolling_days(&self) -> Option<i64> {
        match self {
            Self::Last7Days => Some(7),
            Self::Last30Days => Some(30),
            Self::Last90Days => Some(90),
            Self::Last365Days => Some(365),
            _ => None,
        }
    }

    /// Inclusive window this preset covers on `today`
    pub fn resolve(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Self::Today => (today, today),
            Self::Yesterday => {
                let day = today - Duration::days(1);
                (day, day)
            }
            Self::ThisWeek => (week_start(today), today),
            Self::LastWeek => {
                let start = week_start(today) - Duration::days(7);
                (start, start + Duration::days(6))
            }
            Self::ThisMonth => (first_of_month(today), today),
            Self::LastMonth => previous_month(today),
            Self::Last7Days | Self::Last30Days | Self::Last90Days | Self::Last365Days => {
                let days = self.rolling_days().unwrap_or(1);
                (today - Duration::days(days - 1), today)
            }
        }
    }

    /// Comparison window for a range resolved from this preset
    pub fn comparison(&self, start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Self::Today | Self::Yesterday => {
                let day = start - Duration::days(1);
                (day, day)
            }
            Self::ThisWeek | Self::LastWeek => {
                let prev = week_start(start) - Duration::days(7);
                (prev, prev + Duration::days(6))
            }
            Self::ThisMonth | Self::LastMonth => previous_month(start),
            _ => preceding_window(start, end),
        }
    }
}

impl std::fmt::Display for DatePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// EXTRACTED DATE
// ============================================================================

/// A date window found in a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedDate {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Set when the window came from a named preset
    pub preset: Option<DatePreset>,
}

impl ExtractedDate {
    fn explicit(start: NaiveDate, end: NaiveDate) -> Self {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        Self {
            start,
            end,
            preset: None,
        }
    }

    fn from_preset(preset: DatePreset, today: NaiveDate) -> Self {
        let (start, end) = preset.resolve(today);
        Self {
            start,
            end,
            preset: Some(preset),
        }
    }

    /// Full range with its comparison window
    pub fn to_range(&self) -> DateRange {
        with_comparison(self.start, self.end, self.preset)
    }
}

/// Attach the comparison window appropriate for how the range was chosen
pub fn with_comparison(start: NaiveDate, end: NaiveDate, preset: Option<DatePreset>) -> DateRange {
    let range = DateRange::new(start, end);
    let (cmp_start, cmp_end) = match preset {
        Some(preset) => preset.comparison(range.start_date, range.end_date),
        None => preceding_window(range.start_date, range.end_date),
    };
    range.with_comparison(cmp_start, cmp_end)
}

/// Range the dashboard currently shows, with its comparison window
pub fn resolve_client_range(client: &ClientDateRange) -> DateRange {
    let preset = client.preset.as_deref().and_then(DatePreset::parse);
    with_comparison(client.start_date, client.end_date, preset)
}

// ============================================================================
// PATTERNS
// ============================================================================

const YEAR: &str = r"(?:(\d{4}|\d{2})\s*년\s*)?";

static YEAR_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}|\d{2})\s*년").unwrap());

static CUSTOM_DAYS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"최근\s*(\d{1,5})\s*일|(\d{1,5})\s*일\s*(?:간|동안)").unwrap()
});

/// "M월 D일부터 [M월] D일까지", either side optionally with a year
static KO_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{YEAR}(\d{{1,2}})\s*월\s*(\d{{1,2}})\s*일\s*부터\s*(?:{YEAR}(\d{{1,2}})\s*월\s*)?(\d{{1,2}})\s*일\s*까지"
    ))
    .unwrap()
});

/// "M월 D-D일", "M월 D~D일", "M월 D일~M월 D일"
static KO_DASH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{YEAR}(\d{{1,2}})\s*월\s*(\d{{1,2}})\s*일?\s*[-~]\s*(?:(\d{{1,2}})\s*월\s*)?(\d{{1,2}})\s*일"
    ))
    .unwrap()
});

/// "MM/DD~MM/DD" or "MM/DD~DD"
static SLASH_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})\s*[~\-]\s*(?:(\d{1,2})/)?(\d{1,2})").unwrap()
});

static RELATIVE_PARTITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(이번|지난|저번)\s*달\s*(초|중순|말|첫째\s*주|둘째\s*주|셋째\s*주|넷째\s*주|마지막\s*주)")
        .unwrap()
});

static MONTH_PARTITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{YEAR}(\d{{1,2}})\s*월\s*(초|중순|말|첫째\s*주|둘째\s*주|셋째\s*주|넷째\s*주|마지막\s*주)"
    ))
    .unwrap()
});

static SINGLE_KO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{YEAR}(\d{{1,2}})\s*월\s*(\d{{1,2}})\s*일")).unwrap()
});

static SINGLE_SLASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})").unwrap());

// ============================================================================
// EXTRACTION
// ============================================================================

/// Pull a date window out of free text. `None` means the caller defaults.
pub fn extract_date_range(text: &str, today: NaiveDate) -> Option<ExtractedDate> {
    let default_year = year_token(text).unwrap_or(today.year());

    relative_month_partition(text, today)
        .or_else(|| preset(text, today))
        .or_else(|| custom_days(text, today))
        .or_else(|| korean_range(text, default_year))
        .or_else(|| dash_range(text, default_year))
        .or_else(|| slash_range(text, default_year))
        .or_else(|| month_partition(text, default_year))
        .or_else(|| year_edge(text, default_year))
        .or_else(|| day_before_yesterday(text, today))
        .or_else(|| single_date(text, default_year))
}

fn preset(text: &str, today: NaiveDate) -> Option<ExtractedDate> {
    let compacted = compact(text);
    let lowered = text.to_lowercase();
    PRESET_KEYWORDS
        .iter()
        .find(|(kw, _)| {
            if STANDALONE_KEYWORDS.contains(kw) {
                stands_alone(&lowered, kw)
            } else {
                compacted.contains(kw)
            }
        })
        .map(|(_, preset)| ExtractedDate::from_preset(*preset, today))
}

/// `keyword` occurs in `text` as its own word, optionally followed by a particle
fn stands_alone(text: &str, keyword: &str) -> bool {
    text.match_indices(keyword).any(|(i, _)| {
        let before = text[..i].chars().next_back();
        let after = text[i + keyword.len()..].chars().next();
        let open_start = !before.is_some_and(is_hangul_syllable);
        let open_end = match after {
            Some(c) if is_hangul_syllable(c) => KEYWORD_SUFFIX_STARTS.contains(&c),
            _ => true,
        };
        open_start && open_end
    })
}

fn custom_days(text: &str, today: NaiveDate) -> Option<ExtractedDate> {
    let caps = CUSTOM_DAYS_RE.captures(text)?;
    let n: i64 = caps
        .get(1)
        .or_else(|| caps.get(2))?
        .as_str()
        .parse()
        .ok()?;
    let n = n.clamp(1, MAX_CUSTOM_DAYS);
    Some(ExtractedDate::explicit(today - Duration::days(n), today))
}

fn korean_range(text: &str, default_year: i32) -> Option<ExtractedDate> {
    KO_RANGE_RE.captures_iter(text).find_map(|caps| {
        let start_year = opt_year(&caps, 1).unwrap_or(default_year);
        let start_month = num(&caps, 2)?;
        let start_day = num(&caps, 3)?;
        let end_month = num(&caps, 5).unwrap_or(start_month);
        let end_day = num(&caps, 6)?;
        let end_year = opt_year(&caps, 4)
            .unwrap_or_else(|| rollover_year(start_year, start_month, end_month));
        span(start_year, start_month, start_day, end_year, end_month, end_day)
    })
}

fn dash_range(text: &str, default_year: i32) -> Option<ExtractedDate> {
    KO_DASH_RE.captures_iter(text).find_map(|caps| {
        let year = opt_year(&caps, 1).unwrap_or(default_year);
        let start_month = num(&caps, 2)?;
        let start_day = num(&caps, 3)?;
        let end_month = num(&caps, 4).unwrap_or(start_month);
        let end_day = num(&caps, 5)?;
        let end_year = rollover_year(year, start_month, end_month);
        span(year, start_month, start_day, end_year, end_month, end_day)
    })
}

fn slash_range(text: &str, year: i32) -> Option<ExtractedDate> {
    SLASH_RANGE_RE.captures_iter(text).find_map(|caps| {
        let start_month = num(&caps, 1)?;
        let start_day = num(&caps, 2)?;
        let end_month = num(&caps, 3).unwrap_or(start_month);
        let end_day = num(&caps, 4)?;
        let end_year = rollover_year(year, start_month, end_month);
        span(year, start_month, start_day, end_year, end_month, end_day)
    })
}

fn relative_month_partition(text: &str, today: NaiveDate) -> Option<ExtractedDate> {
    let caps = RELATIVE_PARTITION_RE.captures(text)?;
    let anchor = if &caps[1] == "이번" {
        first_of_month(today)
    } else {
        previous_month(today).0
    };
    partition(anchor.year(), anchor.month(), &compact(&caps[2]))
}

fn month_partition(text: &str, default_year: i32) -> Option<ExtractedDate> {
    MONTH_PARTITION_RE.captures_iter(text).find_map(|caps| {
        let year = opt_year(&caps, 1).unwrap_or(default_year);
        let month = num(&caps, 2)?;
        partition(year, month, &compact(&caps[3]))
    })
}

/// Resolve "초/중순/말" or "N째 주" within a month
fn partition(year: i32, month: u32, part: &str) -> Option<ExtractedDate> {
    let last = last_day_of_month(year, month)?;
    let (from, to) = match part {
        "초" => (1, 10),
        "중순" => (11, 20),
        "말" => (21, last),
        "첫째주" => (1, 7),
        "둘째주" => (8, 14),
        "셋째주" => (15, 21),
        "넷째주" => (22, 28),
        "마지막주" => (last - 6, last),
        _ => return None,
    };
    span(year, month, from, year, month, to)
}

fn year_edge(text: &str, year: i32) -> Option<ExtractedDate> {
    let month = if text.contains("연말") {
        12
    } else if text.contains("연초") {
        1
    } else {
        return None;
    };
    let last = last_day_of_month(year, month)?;
    span(year, month, 1, year, month, last)
}

fn day_before_yesterday(text: &str, today: NaiveDate) -> Option<ExtractedDate> {
    if text.contains("그저께") || text.contains("그제") {
        let day = today - Duration::days(2);
        return Some(ExtractedDate::explicit(day, day));
    }
    None
}

fn single_date(text: &str, default_year: i32) -> Option<ExtractedDate> {
    let korean = SINGLE_KO_RE.captures_iter(text).find_map(|caps| {
        let year = opt_year(&caps, 1).unwrap_or(default_year);
        let day = NaiveDate::from_ymd_opt(year, num(&caps, 2)?, num(&caps, 3)?)?;
        Some(ExtractedDate::explicit(day, day))
    });
    korean.or_else(|| {
        SINGLE_SLASH_RE.captures_iter(text).find_map(|caps| {
            let day = NaiveDate::from_ymd_opt(default_year, num(&caps, 1)?, num(&caps, 2)?)?;
            Some(ExtractedDate::explicit(day, day))
        })
    })
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Render a range the way a person would type it.
///
/// Single days read "2024년 12월 1일"; ranges read
/// "2024년 12월 1일부터 12월 10일까지", with the end year repeated only
/// when it differs. `extract_date_range` recovers the same range.
pub fn format_date_range_ko(range: &DateRange) -> String {
    let start = range.start_date;
    let end = range.end_date;
    let head = format!("{}년 {}월 {}일", start.year(), start.month(), start.day());
    if start == end {
        return head;
    }
    if start.year() == end.year() {
        format!("{head}부터 {}월 {}일까지", end.month(), end.day())
    } else {
        format!(
            "{head}부터 {}년 {}월 {}일까지",
            end.year(),
            end.month(),
            end.day()
        )
    }
}

/// Short label for messages: the preset name when there is one
pub fn describe_range(range: &DateRange, preset: Option<DatePreset>) -> String {
    match preset {
        Some(preset) => preset.label().to_string(),
        None => format_date_range_ko(range),
    }
}

// ============================================================================
// CALENDAR HELPERS
// ============================================================================

fn year_token(text: &str) -> Option<i32> {
    YEAR_TOKEN_RE
        .captures(text)
        .and_then(|caps| parse_year(caps.get(1)?.as_str()))
}

fn parse_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    Some(if raw.len() == 2 { 2000 + year } else { year })
}

fn opt_year(caps: &Captures<'_>, group: usize) -> Option<i32> {
    caps.get(group).and_then(|m| parse_year(m.as_str()))
}

fn num(caps: &Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

/// A range written "12월 28일부터 1월 3일까지" ends in the following year
fn rollover_year(start_year: i32, start_month: u32, end_month: u32) -> i32 {
    if end_month < start_month {
        start_year + 1
    } else {
        start_year
    }
}

fn span(
    start_year: i32,
    start_month: u32,
    start_day: u32,
    end_year: i32,
    end_month: u32,
    end_day: u32,
) -> Option<ExtractedDate> {
    let start = NaiveDate::from_ymd_opt(start_year, start_month, start_day)?;
    let end = NaiveDate::from_ymd_opt(end_year, end_month, end_day)?;
    Some(ExtractedDate::explicit(start, end))
}

fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

/// Full calendar month before the one containing `day`
fn previous_month(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let end = first_of_month(day) - Duration::days(1);
    (first_of_month(end), end)
}

/// Window of equal length ending the day before `start`
fn preceding_window(start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    let days = (end - start).num_days() + 1;
    let prev_end = start - Duration::days(1);
    (prev_end - Duration::days(days - 1), prev_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // Wednesday
    fn today() -> NaiveDate {
        d(2024, 12, 18)
    }

    fn range_of(text: &str) -> Option<(NaiveDate, NaiveDate)> {
        extract_date_range(text, today()).map(|e| (e.start, e.end))
    }

    #[test]
    fn test_korean_range_same_month() {
        assert_eq!(
            range_of("12월 1일부터 10일까지 매출 알려줘"),
            Some((d(2024, 12, 1), d(2024, 12, 10)))
        );
    }

    #[test]
    fn test_korean_range_across_year() {
        assert_eq!(
            range_of("12월 28일부터 1월 3일까지"),
            Some((d(2024, 12, 28), d(2025, 1, 3)))
        );
        assert_eq!(
            range_of("2023년 11월 1일부터 2024년 2월 1일까지"),
            Some((d(2023, 11, 1), d(2024, 2, 1)))
        );
    }

    #[test]
    fn test_dash_and_tilde_ranges() {
        assert_eq!(range_of("3월 5-9일 방문객"), Some((d(2024, 3, 5), d(2024, 3, 9))));
        assert_eq!(range_of("3월 5~9일"), Some((d(2024, 3, 5), d(2024, 3, 9))));
        assert_eq!(
            range_of("3월 5일~4월 2일"),
            Some((d(2024, 3, 5), d(2024, 4, 2)))
        );
    }

    #[test]
    fn test_slash_ranges() {
        assert_eq!(range_of("11/03~11/09 매출"), Some((d(2024, 11, 3), d(2024, 11, 9))));
        assert_eq!(range_of("11/03~09"), Some((d(2024, 11, 3), d(2024, 11, 9))));
    }

    #[test]
    fn test_presets() {
        let e = extract_date_range("오늘 매출", today()).unwrap();
        assert_eq!(e.preset, Some(DatePreset::Today));
        assert_eq!((e.start, e.end), (today(), today()));

        let e = extract_date_range("이번 주 방문객", today()).unwrap();
        assert_eq!((e.start, e.end), (d(2024, 12, 16), today()));

        let e = extract_date_range("지난주", today()).unwrap();
        assert_eq!((e.start, e.end), (d(2024, 12, 9), d(2024, 12, 15)));

        let e = extract_date_range("지난달 전환율", today()).unwrap();
        assert_eq!((e.start, e.end), (d(2024, 11, 1), d(2024, 11, 30)));

        let e = extract_date_range("최근 7일", today()).unwrap();
        assert_eq!(e.preset, Some(DatePreset::Last7Days));
        assert_eq!((e.start, e.end), (d(2024, 12, 12), today()));
    }

    #[test]
    fn test_short_presets_not_matched_inside_words() {
        assert!(extract_date_range("전주시 매장 매출", today()).is_none());
        assert!(extract_date_range("전주점 방문객", today()).is_none());
        assert!(extract_date_range("전일제 직원 현황", today()).is_none());
        assert!(extract_date_range("금주령 이벤트", today()).is_none());

        let e = extract_date_range("전주 매출", today()).unwrap();
        assert_eq!(e.preset, Some(DatePreset::LastWeek));
        let e = extract_date_range("전주 대비 방문객", today()).unwrap();
        assert_eq!(e.preset, Some(DatePreset::LastWeek));
        let e = extract_date_range("전일의 매출", today()).unwrap();
        assert_eq!(e.preset, Some(DatePreset::Yesterday));
        let e = extract_date_range("전주시 매장 지난주 매출", today()).unwrap();
        assert_eq!(e.preset, Some(DatePreset::LastWeek));
    }

    #[test]
    fn test_custom_day_count_is_clamped() {
        assert_eq!(range_of("최근 10일"), Some((d(2024, 12, 8), today())));
        assert_eq!(range_of("5일간 매출"), Some((d(2024, 12, 13), today())));
        let (start, _) = range_of("최근 99999일").unwrap();
        assert_eq!(start, today() - Duration::days(3650));
        assert_eq!(range_of("최근 0일"), Some((d(2024, 12, 17), today())));
    }

    #[test]
    fn test_qualified_month_beats_preset() {
        assert_eq!(range_of("이번달 초"), Some((d(2024, 12, 1), d(2024, 12, 10))));
        assert_eq!(range_of("이번 달 중순"), Some((d(2024, 12, 11), d(2024, 12, 20))));
        assert_eq!(range_of("지난달 말"), Some((d(2024, 11, 21), d(2024, 11, 30))));
    }

    #[test]
    fn test_month_weeks() {
        assert_eq!(range_of("2월 마지막 주"), Some((d(2024, 2, 23), d(2024, 2, 29))));
        assert_eq!(range_of("3월 둘째 주"), Some((d(2024, 3, 8), d(2024, 3, 14))));
        assert_eq!(range_of("5월 말"), Some((d(2024, 5, 21), d(2024, 5, 31))));
    }

    #[test]
    fn test_year_edges_and_day_before_yesterday() {
        assert_eq!(range_of("연말 매출"), Some((d(2024, 12, 1), d(2024, 12, 31))));
        assert_eq!(range_of("연초"), Some((d(2024, 1, 1), d(2024, 1, 31))));
        assert_eq!(range_of("그저께"), Some((d(2024, 12, 16), d(2024, 12, 16))));
        assert_eq!(range_of("그제 방문객"), Some((d(2024, 12, 16), d(2024, 12, 16))));
    }

    #[test]
    fn test_single_dates_and_years() {
        assert_eq!(range_of("3월 1일"), Some((d(2024, 3, 1), d(2024, 3, 1))));
        assert_eq!(range_of("23년 3월 1일"), Some((d(2023, 3, 1), d(2023, 3, 1))));
        assert_eq!(range_of("7/4 매출"), Some((d(2024, 7, 4), d(2024, 7, 4))));
    }

    #[test]
    fn test_impossible_dates_skip_pattern() {
        assert_eq!(range_of("2월 30일"), None);
        assert_eq!(range_of("13/45"), None);
    }

    #[test]
    fn test_no_date() {
        assert_eq!(range_of("방문객 몇 명이야"), None);
    }

    #[test]
    fn test_comparison_for_calendar_presets() {
        let e = extract_date_range("이번 달", today()).unwrap();
        let r = e.to_range();
        assert_eq!(r.comparison(), Some((d(2024, 11, 1), d(2024, 11, 30))));

        let e = extract_date_range("이번 주", today()).unwrap();
        assert_eq!(
            e.to_range().comparison(),
            Some((d(2024, 12, 9), d(2024, 12, 15)))
        );

        let e = extract_date_range("오늘", today()).unwrap();
        assert_eq!(
            e.to_range().comparison(),
            Some((d(2024, 12, 17), d(2024, 12, 17)))
        );
    }

    #[test]
    fn test_comparison_for_explicit_ranges() {
        let e = extract_date_range("12월 1일부터 10일까지", today()).unwrap();
        assert_eq!(
            e.to_range().comparison(),
            Some((d(2024, 11, 21), d(2024, 11, 30)))
        );

        let e = extract_date_range("최근 30일", today()).unwrap();
        let r = e.to_range();
        let (cs, ce) = r.comparison().unwrap();
        assert_eq!(ce, r.start_date - Duration::days(1));
        assert_eq!((ce - cs).num_days() + 1, r.days());
    }

    #[test]
    fn test_format_round_trip() {
        for (start, end) in [
            (d(2024, 12, 1), d(2024, 12, 10)),
            (d(2024, 12, 28), d(2025, 1, 3)),
            (d(2023, 5, 7), d(2023, 5, 7)),
            (d(2024, 2, 1), d(2024, 3, 31)),
        ] {
            let text = format_date_range_ko(&DateRange::new(start, end));
            assert_eq!(range_of(&text), Some((start, end)), "{text}");
        }
    }

    #[test]
    fn test_format_shapes() {
        assert_eq!(
            format_date_range_ko(&DateRange::new(d(2024, 12, 1), d(2024, 12, 10))),
            "2024년 12월 1일부터 12월 10일까지"
        );
        assert_eq!(
            format_date_range_ko(&DateRange::single_day(d(2024, 12, 1))),
            "2024년 12월 1일"
        );
    }

    #[test]
    fn test_resolve_client_range_uses_preset_rule() {
        let client = ClientDateRange {
            preset: Some("thisMonth".into()),
            start_date: d(2024, 12, 1),
            end_date: d(2024, 12, 18),
        };
        let r = resolve_client_range(&client);
        assert_eq!(r.comparison(), Some((d(2024, 11, 1), d(2024, 11, 30))));

        let client = ClientDateRange {
            preset: None,
            ..client
        };
        let r = resolve_client_range(&client);
        assert_eq!(r.comparison(), Some((d(2024, 11, 13), d(2024, 11, 30))));
    }
}
