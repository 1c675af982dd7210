//! Hour-of-day extraction

use std::sync::LazyLock;

use regex::Regex;

use super::is_hangul_syllable;

/// "오후 3시", "새벽 2시"; group 3 is the character after 시
static MERIDIEM_HOUR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(오전|오후|저녁|새벽)\s*(\d{1,2})\s*시(.)?").unwrap());

/// Date tokens removed before looking for a bare hour
static DATE_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,2}\s*월\s*\d{1,2}\s*일|\d{1,2}\s*/\s*\d{1,2}").unwrap()
});

/// Bare "15시"; group 2 is the character after 시
static BARE_HOUR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\D)(\d{1,2})\s*시(.)?").unwrap());

/// Syllables that may follow an hour's 시 ("3시에", "3시쯤", "3시반").
/// Any other syllable makes 시 part of a word: 시간, 시즌, 시작, 시리즈.
const HOUR_SUFFIX_STARTS: &[char] = &[
    '에', '엔', '부', '까', '쯤', '경', '반', '는', '은', '의', '이', '전', '후', '정', '랑',
    '와', '과', '도', '만', '께', '대', '요', '가', '를', '로', '였', '지',
];

fn closes_hour(next: Option<regex::Match<'_>>) -> bool {
    match next.and_then(|m| m.as_str().chars().next()) {
        Some(c) if is_hangul_syllable(c) => HOUR_SUFFIX_STARTS.contains(&c),
        _ => true,
    }
}

/// Hour of day (0-23) named in the text, if any
pub fn extract_hour(text: &str) -> Option<u8> {
    if let Some(caps) = MERIDIEM_HOUR_RE
        .captures_iter(text)
        .find(|caps| closes_hour(caps.get(3)))
    {
        let n: u8 = caps[2].parse().ok()?;
        let hour = to_24h(&caps[1], n);
        return (hour <= 23).then_some(hour);
    }

    let stripped = DATE_TOKEN_RE.replace_all(text, " ");
    BARE_HOUR_RE
        .captures_iter(&stripped)
        .filter(|caps| closes_hour(caps.get(2)))
        .find_map(|caps| caps[1].parse::<u8>().ok().filter(|h| *h <= 23))
}

fn to_24h(marker: &str, n: u8) -> u8 {
    match marker {
        "오후" | "저녁" if n < 12 => n + 12,
        "오전" if n == 12 => 0,
        _ => n,
    }
}
