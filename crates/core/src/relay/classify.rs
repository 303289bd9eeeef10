//! Post-processing applied to upstream text for `POST /analyze`.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

const CHART_MARKER: &str = "trading chart";

static TIMEFRAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(minutes|hours|days|weeks|months)").unwrap());

/// First of `minutes|hours|days|weeks|months` in `text`, any case, lowercased.
/// Empty when none occurs. Singular forms are not recognised.
pub fn extract_timeframe(text: &str) -> String {
    TIMEFRAME_RE
        .find(text)
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_default()
}

/// How the upstream text is turned into the `isChart` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChartPolicy {
    /// `true` iff the text contains `"trading chart"` (case-sensitive).
    /// Negated statements such as "this is not a trading chart" still count as `true`.
    #[default]
    Substring,
    /// Like [`ChartPolicy::Substring`], but an occurrence only counts when its clause
    /// (text since the last `. ! ? ; , :` or newline) has no negation word before it.
    RejectNegated,
}

impl ChartPolicy {
    pub fn is_chart(self, text: &str) -> bool {
        match self {
            Self::Substring => text.contains(CHART_MARKER),
            Self::RejectNegated => text
                .match_indices(CHART_MARKER)
                .any(|(idx, _)| !clause_is_negated(&text[..idx])),
        }
    }
}

fn clause_is_negated(prefix: &str) -> bool {
    let clause = prefix
        .rfind(['.', '!', '?', ';', ',', ':', '\n'])
        .map_or(prefix, |i| &prefix[i + 1..]);

    clause.split_whitespace().any(|word| {
        let word = word
            .trim_matches(|c: char| !c.is_alphanumeric() && c != '\'' && c != '\u{2019}')
            .replace('\u{2019}', "'")
            .to_lowercase();
        matches!(word.as_str(), "not" | "no" | "never" | "cannot") || word.ends_with("n't")
    })
}

#[derive(Debug, Error)]
#[error("unknown chart policy `{0}` (expected `substring` or `reject-negated`)")]
pub struct UnknownChartPolicy(String);

impl FromStr for ChartPolicy {
    type Err = UnknownChartPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "reject-negated" | "reject_negated" => Ok(Self::RejectNegated),
            other => Err(UnknownChartPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for ChartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Substring => f.write_str("substring"),
            Self::RejectNegated => f.write_str("reject-negated"),
        }
    }
}
