//! Strategy structuring post-processing
//!
//! The strategy handler is the only expert whose reply is converted from free
//! text into a structured plan artifact. Malformed generator output becomes
//! an explicit error artifact in the message content, never a fault.

use crate::generator::strip_code_fences;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub(crate) const STRATEGY_INSTRUCTIONS: &str = "You are a trading strategy structuring assistant. \
Translate the user's natural language trading idea into a structured plan.\n\
Respond with ONLY a JSON object, no explanation text, in this format:\n\
{\n\
  \"name\": \"short strategy name\",\n\
  \"entry_condition\": \"when to enter\",\n\
  \"exit_condition\": \"when to exit\",\n\
  \"instruments\": [\"tickers or asset classes\"],\n\
  \"risk_controls\": [\"stop loss, sizing, or other controls\"]\n\
}";

/// Structured artifact extracted from the strategy expert's reply
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyPlan {
    pub name: String,
    pub entry_condition: String,
    pub exit_condition: String,
    #[serde(default)]
    pub instruments: Vec<String>,
    #[serde(default)]
    pub risk_controls: Vec<String>,
}

/// Convert a raw generator reply into the handler's message content.
///
/// Valid plans are re-rendered as a fenced JSON artifact. Parse failures
/// produce an error artifact carrying the raw reply so the user still sees
/// what the generator said.
pub(crate) fn structure_strategy_reply(raw: &str) -> String {
    match parse_strategy_plan(raw) {
        Ok(plan) => {
            let pretty = serde_json::to_string_pretty(&plan)
                .unwrap_or_else(|_| raw.to_string());
            format!("```json\n{}\n```", pretty)
        }
        Err(error) => {
            warn!(%error, "Strategy reply did not parse as a structured plan");
            format!(
                "Could not convert the strategy into a structured plan ({}).\n\nRaw response:\n{}",
                error, raw
            )
        }
    }
}

fn parse_strategy_plan(raw: &str) -> serde_json::Result<StrategyPlan> {
    serde_json::from_str(strip_code_fences(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_PLAN: &str = r#"{
        "name": "Dip buyer",
        "entry_condition": "price decreases 2% from open",
        "exit_condition": "price recovers to open",
        "instruments": ["SPY"],
        "risk_controls": ["stop loss at -4%"]
    }"#;

    #[test]
    fn test_valid_plan_renders_json_artifact() {
        let content = structure_strategy_reply(VALID_PLAN);
        assert!(content.starts_with("```json"));
        assert!(content.contains("Dip buyer"));
    }

    #[test]
    fn test_fenced_plan_parses() {
        let fenced = format!("```json\n{}\n```", VALID_PLAN);
        let plan = parse_strategy_plan(&fenced).unwrap();
        assert_eq!(plan.name, "Dip buyer");
        assert_eq!(plan.instruments, vec!["SPY"]);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let plan = parse_strategy_plan(
            r#"{"name":"n","entry_condition":"e","exit_condition":"x"}"#,
        )
        .unwrap();
        assert!(plan.instruments.is_empty());
        assert!(plan.risk_controls.is_empty());
    }

    #[test]
    fn test_malformed_reply_becomes_error_artifact() {
        let content = structure_strategy_reply("I would just buy low and sell high!");
        assert!(content.contains("Could not convert the strategy"));
        assert!(content.contains("buy low and sell high"));
    }
}
