//! Advisory collaborator calls: runway projection, peer benchmarks, goal
//! strategy, buddy feedback, savings tips.
//!
//! All of this is advisory data. A failed or malformed response degrades to
//! a fixed fallback at the call site and never reaches ledger state.

use anyhow::Result;
use serde_json::Value;

use owlet_core::analytics::{BuddyStats, CategorySpend, GoalStrategyRequest, RunwayRequest};

use crate::gemini::{self, GeminiConfig, Part};

/// Shown when the buddy-feedback call fails outright.
pub const BUDDY_FALLBACK: &str = "I'm keeping an eye on your expenses.";
/// Shown when the savings-tip call fails outright.
pub const TIP_FALLBACK: &str = "Consider tracking every penny.";

const RUNWAY_SYSTEM: &str = "Analyze runway based on history and balance. Return JSON: zeroDate \
     (ISO string), daysRemaining (number), burnRatePerDay (number), warningLevel (1-10), advice \
     (string).";

const PEER_SYSTEM: &str = "Generate realistic 'average student' monthly spending benchmarks for \
     these categories. Provide a comparison JSON array with: category, userAmount, peerAmount, \
     and insight.";

const STRATEGY_SYSTEM: &str = "Suggest one specific item to skip from the user's history to reach \
     the goal. Return JSON: itemToSkip, avgCostPerItem, skipsRequired, encouragement.";

const BUDDY_SYSTEM: &str = "You are Balthazar, a witty AI owl financial counselor. Give 1-2 punchy \
     feedback sentences based on the user's spending stats.";

const TIP_SYSTEM: &str = "Witty student financial advisor. 1 short tip.";

/// Burn-rate projection as the advisor reported it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunwayAnalysis {
    pub zero_date: String,
    pub days_remaining: i64,
    pub burn_rate_per_day: f64,
    pub warning_level: i64,
    pub advice: String,
}

impl RunwayAnalysis {
    pub fn fallback() -> Self {
        Self {
            zero_date: String::new(),
            days_remaining: 0,
            burn_rate_per_day: 0.0,
            warning_level: 0,
            advice: "Calculation failed".to_string(),
        }
    }

    fn from_value(v: &Value) -> Self {
        Self {
            zero_date: gemini::loose_str(v, "zeroDate").unwrap_or_default().to_string(),
            days_remaining: gemini::loose_f64(v, "daysRemaining").unwrap_or(0.0) as i64,
            burn_rate_per_day: gemini::loose_f64(v, "burnRatePerDay").unwrap_or(0.0),
            warning_level: gemini::loose_f64(v, "warningLevel").unwrap_or(0.0) as i64,
            advice: gemini::loose_str(v, "advice").unwrap_or_default().to_string(),
        }
    }
}

pub async fn runway(cfg: &GeminiConfig, req: &RunwayRequest) -> Result<RunwayAnalysis> {
    let prompt = format!(
        "Transactions: {}. Balance: ${:.2}.",
        serde_json::to_string(&req.history)?,
        req.balance
    );
    let raw = gemini::generate(cfg, &cfg.pro_model, RUNWAY_SYSTEM, vec![Part::Text(prompt)], true).await?;
    Ok(RunwayAnalysis::from_value(&gemini::extract_json(&raw)?))
}

/// One category row of the peer benchmark.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub category: String,
    pub user_amount: f64,
    pub peer_amount: f64,
    pub insight: String,
}

fn comparison_rows(value: &Value) -> Vec<ComparisonRow> {
    let Some(rows) = value.as_array() else {
        return Vec::new();
    };
    rows.iter()
        .map(|v| ComparisonRow {
            category: gemini::loose_str(v, "category").unwrap_or("Other").to_string(),
            user_amount: gemini::loose_f64(v, "userAmount").unwrap_or(0.0),
            peer_amount: gemini::loose_f64(v, "peerAmount").unwrap_or(0.0),
            insight: gemini::loose_str(v, "insight").unwrap_or_default().to_string(),
        })
        .collect()
}

/// Peer benchmarking. A malformed response is an empty table, not an error.
pub async fn peer_comparison(cfg: &GeminiConfig, spend: &[CategorySpend]) -> Result<Vec<ComparisonRow>> {
    let prompt = format!(
        "User Spending: {}. Provide average peer benchmarks.",
        serde_json::to_string(spend)?
    );
    let raw = gemini::generate(cfg, &cfg.pro_model, PEER_SYSTEM, vec![Part::Text(prompt)], true).await?;
    Ok(comparison_rows(&gemini::extract_json(&raw)?))
}

/// "Skip this to get there" suggestion for the active goal.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalStrategy {
    pub item_to_skip: String,
    pub avg_cost_per_item: f64,
    pub skips_required: i64,
    pub encouragement: String,
}

impl GoalStrategy {
    pub fn fallback() -> Self {
        Self {
            item_to_skip: "discretionary items".to_string(),
            avg_cost_per_item: 0.0,
            skips_required: 0,
            encouragement: "Every little bit counts!".to_string(),
        }
    }

    fn from_value(v: &Value) -> Self {
        Self {
            item_to_skip: gemini::loose_str(v, "itemToSkip").unwrap_or_default().to_string(),
            avg_cost_per_item: gemini::loose_f64(v, "avgCostPerItem").unwrap_or(0.0),
            skips_required: gemini::loose_f64(v, "skipsRequired").unwrap_or(0.0) as i64,
            encouragement: gemini::loose_str(v, "encouragement").unwrap_or_default().to_string(),
        }
    }
}

pub async fn goal_strategy(cfg: &GeminiConfig, req: &GoalStrategyRequest) -> Result<GoalStrategy> {
    let prompt = format!(
        "Goal: {:.2} for {}. History: {}",
        req.remaining,
        req.title,
        serde_json::to_string(&req.recent_debits)?
    );
    let raw = gemini::generate(cfg, &cfg.pro_model, STRATEGY_SYSTEM, vec![Part::Text(prompt)], true).await?;
    Ok(GoalStrategy::from_value(&gemini::extract_json(&raw)?))
}

/// Short conscience-keeping feedback from the buddy persona.
pub async fn buddy_feedback(cfg: &GeminiConfig, stats: &BuddyStats) -> Result<String> {
    let prompt = format!(
        "Stats: Fun ${:.2}, Total ${:.2}, Streak {} days.",
        stats.fun_spent, stats.total_spent, stats.streak_days
    );
    let text = gemini::generate(cfg, &cfg.fast_model, BUDDY_SYSTEM, vec![Part::Text(prompt)], false).await?;
    Ok(if text.is_empty() {
        "Watch your wallet.".to_string()
    } else {
        text
    })
}

/// One actionable saving tip from recent spending.
pub async fn savings_tip(cfg: &GeminiConfig, recent: &str) -> Result<String> {
    let prompt = format!("Expenses: {recent}. Give one actionable saving tip.");
    let text = gemini::generate(cfg, &cfg.fast_model, TIP_SYSTEM, vec![Part::Text(prompt)], false).await?;
    Ok(if text.is_empty() {
        "Save more.".to_string()
    } else {
        text
    })
}
