//! Cleanup for raw generator output.

use log::warn;
use regex::Regex;

const THINK_BLOCK: &str = r"(?is)<think>.*?</think>";
const ESTIMATED_CALORIES: &str = r"(?i)Estimated calories:\s*([\d.]+)";

/// Remove the first `<think>...</think>` block and trim.
///
/// Falls back to the raw completion when nothing is left.
pub fn clean_completion(raw: &str) -> String {
    let Ok(regex) = Regex::new(THINK_BLOCK) else {
        warn!("think-block pattern failed to compile; returning raw completion");
        return raw.to_string();
    };
    let cleaned = regex.replace(raw, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        raw.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Read the first `Estimated calories: <n>` line of a meal analysis.
///
/// `None` when the line is missing, the number does not parse, or it is not
/// a positive kcal value.
pub fn parse_estimated_calories(analysis: &str) -> Option<f64> {
    let Ok(regex) = Regex::new(ESTIMATED_CALORIES) else {
        warn!("calorie pattern failed to compile");
        return None;
    };
    let digits = regex.captures(analysis)?.get(1)?.as_str();
    let calories: f64 = digits.parse().ok()?;
    (calories.is_finite() && calories > 0.0).then_some(calories)
}
