use std::path::PathBuf;

use arena_harness::UsageStats;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Strategy names used when the judge's output carries no usable metadata.
pub const DEFAULT_STRATEGIES: [&str; 5] = ["CLARITY", "STRUCTURE", "EXAMPLES", "CONSTRAINTS", "CONCISE"];

pub const BASELINE_STRATEGY: &str = "BASELINE";
pub const BASELINE_SUMMARY: &str = "Original system prompt without modifications";

static JSON_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```json[^\S\n]*\r?\n(.*?)```").expect("fenced json pattern is valid")
});

/// Metadata of one variation. Number 0 is always the baseline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationInfo {
    #[serde(alias = "id")]
    pub number: u32,
    #[serde(default)]
    pub strategy: String,
    #[serde(default, alias = "description")]
    pub summary: String,
}

impl VariationInfo {
    /// The unmodified original prompt.
    pub fn baseline() -> Self {
        Self {
            number: 0,
            strategy: BASELINE_STRATEGY.to_string(),
            summary: BASELINE_SUMMARY.to_string(),
        }
    }

    pub fn is_baseline(&self) -> bool {
        self.number == 0
    }
}

/// Outcome of one started variation. Exactly one exists per started run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationResult {
    pub variation_number: u32,
    /// Transcript text, or an `ERROR:` message when the run never produced one.
    pub output: String,
    pub exit_code: i32,
    pub usage: Option<UsageStats>,
    pub workspace: PathBuf,
}

impl VariationResult {
    /// Synthetic failing result for a run that could not be launched or
    /// drained.
    pub fn failed(variation_number: u32, workspace: impl Into<PathBuf>, reason: impl AsRef<str>) -> Self {
        Self {
            variation_number,
            output: format!("ERROR: {}", reason.as_ref()),
            exit_code: 1,
            usage: None,
            workspace: workspace.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Deserialize)]
struct VariationManifest {
    variations: Vec<VariationInfo>,
}

/// Extracts variation metadata from the judge's design output.
///
/// The first fenced `json` block must hold `{"variations": [...]}`; its
/// entries are returned as written. Anything else yields
/// [`fallback_variation_info`]`(count)`.
pub fn parse_variation_info(output: &str, count: u32) -> Vec<VariationInfo> {
    JSON_FENCE
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|body| serde_json::from_str::<VariationManifest>(body.as_str()).ok())
        .map(|manifest| manifest.variations)
        .unwrap_or_else(|| fallback_variation_info(count))
}

/// Deterministic metadata for `count` variations numbered from 1.
pub fn fallback_variation_info(count: u32) -> Vec<VariationInfo> {
    (1..=count)
        .map(|number| {
            let strategy = DEFAULT_STRATEGIES
                .get(number as usize - 1)
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("VARIATION_{number}"));
            VariationInfo {
                number,
                summary: format!("{strategy} variation"),
                strategy,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_json_fence() {
        let output = r#"I wrote the files.

```json
{"variations": [
  {"number": 1, "strategy": "CLARITY", "summary": "Sharper wording"},
  {"id": 2, "strategy": "EXAMPLES", "description": "Adds worked examples"}
]}
```

```json
{"variations": []}
```
"#;
        let info = parse_variation_info(output, 5);
        assert_eq!(
            info,
            vec![
                VariationInfo {
                    number: 1,
                    strategy: "CLARITY".into(),
                    summary: "Sharper wording".into(),
                },
                VariationInfo {
                    number: 2,
                    strategy: "EXAMPLES".into(),
                    summary: "Adds worked examples".into(),
                },
            ]
        );
    }

    #[test]
    fn trusts_judge_numbering() {
        let output = "```json\n{\"variations\":[{\"number\":7,\"strategy\":\"X\",\"summary\":\"y\"}]}\n```";
        let info = parse_variation_info(output, 3);
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].number, 7);
    }

    #[test]
    fn malformed_or_missing_block_falls_back() {
        let expected = fallback_variation_info(3);
        for output in [
            "no fence at all",
            "```json\nnot json\n```",
            "```json\n{\"variations\": {\"number\": 1}}\n```",
            "```json\n{\"other\": []}\n```",
            "```json\n[1, 2]\n```",
            "```\n{\"variations\": []}\n```",
        ] {
            assert_eq!(parse_variation_info(output, 3), expected, "{output}");
        }
    }

    #[test]
    fn fallback_is_total_and_deterministic() {
        assert!(fallback_variation_info(0).is_empty());
        let info = fallback_variation_info(7);
        let strategies: Vec<_> = info.iter().map(|v| v.strategy.as_str()).collect();
        assert_eq!(
            strategies,
            vec![
                "CLARITY",
                "STRUCTURE",
                "EXAMPLES",
                "CONSTRAINTS",
                "CONCISE",
                "VARIATION_6",
                "VARIATION_7",
            ]
        );
        let numbers: Vec<_> = info.iter().map(|v| v.number).collect();
        assert_eq!(numbers, (1..=7).collect::<Vec<_>>());
        assert_eq!(fallback_variation_info(7), info);
    }

    #[test]
    fn baseline_is_number_zero() {
        let baseline = VariationInfo::baseline();
        assert!(baseline.is_baseline());
        assert_eq!(baseline.strategy, "BASELINE");
        assert_eq!(baseline.summary, "Original system prompt without modifications");
    }

    #[test]
    fn failed_result_is_error_prefixed() {
        let result = VariationResult::failed(2, "/tmp/ws", "spawn failed");
        assert_eq!(result.exit_code, 1);
        assert_eq!(result.output, "ERROR: spawn failed");
        assert!(!result.is_success());
    }
}
