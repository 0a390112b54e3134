//! Bank-alert and receipt classification at the collaborator boundary.
//!
//! The collaborator's output is untrusted and possibly partial; every field
//! is defaulted rather than rejected, and the result is accepted as-is,
//! never validated against ground truth.

use anyhow::Result;
use base64::Engine;
use serde_json::Value;

use owlet_core::{Category, GeoPoint, TxKind};

use crate::gemini::{self, GeminiConfig, Part};

const MESSAGE_SYSTEM: &str = "Extract: Amount (number), Merchant (name), Category (Food, Travel, \
     Fun, Academic, Other), and Type (credit/debit). Return strictly as a JSON object with \
     fields: amount, merchant, category, type.";

const RECEIPT_SYSTEM: &str = "Extract Amount (number), Merchant (string), Category \
     (Food/Travel/Fun/Academic/Other), and Type (debit/credit). Return strictly as a JSON object.";

/// Structured transaction fields extracted by the collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub amount: f64,
    pub merchant: String,
    pub category: Category,
    pub kind: TxKind,
    pub location: Option<GeoPoint>,
}

impl Classification {
    /// Defaulting rules for an untrusted payload: amount -> 0 (absolute
    /// value), merchant -> "Unknown", category -> Other, type -> debit
    /// unless it says "credit".
    pub fn from_value(v: &Value) -> Self {
        let amount = gemini::loose_f64(v, "amount").unwrap_or(0.0).abs();
        let merchant = gemini::loose_str(v, "merchant").unwrap_or("Unknown").to_string();
        let category = gemini::loose_str(v, "category")
            .and_then(Category::parse_loose)
            .unwrap_or(Category::Other);
        let kind = match gemini::loose_str(v, "type") {
            Some(s) if s.eq_ignore_ascii_case("credit") => TxKind::Credit,
            _ => TxKind::Debit,
        };

        Self {
            amount,
            merchant,
            category,
            kind,
            location: None,
        }
    }
}

/// Classify a free-text bank alert. A caller-supplied location is attached
/// opportunistically; classification never depends on it.
pub async fn classify_message(
    cfg: &GeminiConfig,
    text: &str,
    location: Option<GeoPoint>,
) -> Result<Classification> {
    let prompt = format!("Classify this bank message and extract transaction details: \"{text}\"");
    let raw = gemini::generate(cfg, &cfg.fast_model, MESSAGE_SYSTEM, vec![Part::Text(prompt)], true).await?;
    let value = gemini::extract_json(&raw)?;
    Ok(Classification {
        location,
        ..Classification::from_value(&value)
    })
}

/// Classify a receipt image (raw bytes plus media type).
pub async fn classify_receipt(
    cfg: &GeminiConfig,
    image: &[u8],
    mime_type: &str,
) -> Result<Classification> {
    let data = base64::engine::general_purpose::STANDARD.encode(image);
    let parts = vec![
        Part::InlineData {
            mime_type: mime_type.to_string(),
            data,
        },
        Part::Text("Extract receipt data: Merchant, Amount, Category, Type. Return as JSON.".to_string()),
    ];
    let raw = gemini::generate(cfg, &cfg.fast_model, RECEIPT_SYSTEM, parts, true).await?;
    let value = gemini::extract_json(&raw)?;
    Ok(Classification::from_value(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_well_formed_payload() {
        let v = json!({
            "amount": 249.0,
            "merchant": "IRCTC",
            "category": "Travel",
            "type": "debit"
        });
        let c = Classification::from_value(&v);
        assert_eq!(c.amount, 249.0);
        assert_eq!(c.merchant, "IRCTC");
        assert_eq!(c.category, Category::Travel);
        assert_eq!(c.kind, TxKind::Debit);
    }

    #[test]
    fn test_empty_payload_gets_full_defaults() {
        let c = Classification::from_value(&json!({}));
        assert_eq!(c.amount, 0.0);
        assert_eq!(c.merchant, "Unknown");
        assert_eq!(c.category, Category::Other);
        assert_eq!(c.kind, TxKind::Debit);
        assert!(c.location.is_none());
    }

    #[test]
    fn test_amount_string_and_sign_folding() {
        let c = Classification::from_value(&json!({"amount": "-120.50"}));
        assert_eq!(c.amount, 120.50);
    }

    #[test]
    fn test_category_case_insensitive_else_other() {
        let c = Classification::from_value(&json!({"category": "fOoD"}));
        assert_eq!(c.category, Category::Food);
        let c = Classification::from_value(&json!({"category": "groceries"}));
        assert_eq!(c.category, Category::Other);
    }

    #[test]
    fn test_type_defaults_to_debit() {
        let c = Classification::from_value(&json!({"type": "CREDIT"}));
        assert_eq!(c.kind, TxKind::Credit);
        let c = Classification::from_value(&json!({"type": "refund"}));
        assert_eq!(c.kind, TxKind::Debit);
        let c = Classification::from_value(&json!({"type": 3}));
        assert_eq!(c.kind, TxKind::Debit);
    }

    #[test]
    fn test_blank_merchant_becomes_unknown() {
        let c = Classification::from_value(&json!({"merchant": "   "}));
        assert_eq!(c.merchant, "Unknown");
    }
}
