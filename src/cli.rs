use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{config::Preset, metric::MetricFormat};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Clean app-store listing datasets and rank categories by popularity",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the header and first rows of a dataset with its row and column counts
    Preview(PreviewArgs),
    /// Count repeated app names before duplicate resolution
    Duplicates(DuplicatesArgs),
    /// Run the cleaning pipeline and write the retained records as CSV
    Clean(CleanArgs),
    /// Produce frequency tables over cleaned records
    Frequency(FrequencyArgs),
    /// Average a numeric metric per category over cleaned records
    Average(AverageArgs),
    /// Run every dataset and query listed in a profile file
    Profile(ProfileArgs),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct DatasetArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Built-in field layout for a known export
    #[arg(
        long,
        value_enum,
        conflicts_with = "dataset",
        required_unless_present = "dataset"
    )]
    pub preset: Option<Preset>,
    /// YAML file describing the dataset's field layout
    #[arg(short = 'd', long = "dataset")]
    pub dataset: Option<PathBuf>,
    /// Maximum non-ASCII characters tolerated in an English name
    #[arg(long = "locale-threshold")]
    pub locale_threshold: Option<usize>,
    /// Exact price token meaning "free" (replaces the configured tokens; repeatable)
    #[arg(long = "free-value", action = clap::ArgAction::Append)]
    pub free_values: Vec<String>,
    /// 0-based data row to drop as corrupt (added to the configured list; repeatable)
    #[arg(long = "exclude-row", action = clap::ArgAction::Append)]
    pub exclude_rows: Vec<usize>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Number of rows to display
    #[arg(long, default_value_t = 3)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct DuplicatesArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    /// Number of duplicated names to list
    #[arg(long, default_value_t = 5)]
    pub examples: usize,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Delimiter to use for output (defaults to input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct FrequencyArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    /// Fields to tabulate: semantic names, extra labels, header names or positions
    #[arg(
        short = 'C',
        long = "columns",
        value_delimiter = ',',
        default_value = "category"
    )]
    pub columns: Vec<String>,
    /// Maximum distinct values to display per field (0 = all)
    #[arg(long, default_value_t = 0)]
    pub top: usize,
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct AverageArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    /// Field to group by
    #[arg(long, default_value = "category")]
    pub group: String,
    /// Field holding the metric to average
    #[arg(long, default_value = "metric")]
    pub metric: String,
    /// How the metric field encodes its number (defaults to the dataset's
    /// own format for its metric field, plain otherwise)
    #[arg(long = "metric-format", value_enum)]
    pub metric_format: Option<MetricFormat>,
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// YAML profile listing datasets and their queries
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,
    /// Maximum distinct values to display per frequency table (0 = all)
    #[arg(long, default_value_t = 0)]
    pub top: usize,
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn dataset_requires_preset_or_file() {
        let err = Cli::try_parse_from(["app-market-profiler", "clean", "-i", "apps.csv"])
            .expect_err("missing dataset source");
        assert!(err.to_string().contains("--preset"));
    }

    #[test]
    fn frequency_columns_split_on_commas() {
        let cli = Cli::try_parse_from([
            "app-market-profiler",
            "frequency",
            "-i",
            "apps.csv",
            "--preset",
            "google-play",
            "-C",
            "category,genres",
        ])
        .expect("parse");
        let Commands::Frequency(args) = cli.command else {
            panic!("expected frequency command");
        };
        assert_eq!(args.columns, vec!["category", "genres"]);
        assert_eq!(args.dataset.preset, Some(Preset::GooglePlay));
    }

    #[test]
    fn parse_delimiter_accepts_named_values() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert!(parse_delimiter("ab").is_err());
    }
}
