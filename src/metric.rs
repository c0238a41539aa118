use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Signature shared by every metric parser. `None` means "not numeric".
pub type MetricParser = fn(&str) -> Option<f64>;

/// How a metric field encodes its number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum MetricFormat {
    /// A bare number such as a review count (`"2490"`).
    #[default]
    Plain,
    /// An install bucket such as `"1,000,000+"`.
    InstallBucket,
}

impl MetricFormat {
    pub fn parser(self) -> MetricParser {
        match self {
            MetricFormat::Plain => parse_plain,
            MetricFormat::InstallBucket => parse_install_bucket,
        }
    }
}

pub fn parse_plain(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Reads an open-ended install bucket as its lower bound.
pub fn parse_install_bucket(raw: &str) -> Option<f64> {
    let stripped = raw.replace([',', '+'], "");
    parse_plain(&stripped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_parses_counts_and_decimals() {
        assert_eq!(parse_plain("2490"), Some(2490.0));
        assert_eq!(parse_plain(" 4.5 "), Some(4.5));
    }

    #[test]
    fn plain_rejects_text_and_non_finite_values() {
        assert_eq!(parse_plain("3.0M"), None);
        assert_eq!(parse_plain(""), None);
        assert_eq!(parse_plain("NaN"), None);
        assert_eq!(parse_plain("inf"), None);
    }

    #[test]
    fn install_bucket_strips_separators_and_plus() {
        assert_eq!(parse_install_bucket("1,000,000+"), Some(1_000_000.0));
        assert_eq!(parse_install_bucket("100+"), Some(100.0));
        assert_eq!(parse_install_bucket("0"), Some(0.0));
        assert_eq!(parse_install_bucket("Free"), None);
    }

    #[test]
    fn format_dispatches_to_matching_parser() {
        assert_eq!(MetricFormat::Plain.parser()("1,000+"), None);
        assert_eq!(MetricFormat::InstallBucket.parser()("1,000+"), Some(1000.0));
    }
}
