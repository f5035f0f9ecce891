//! The remittance transaction record and the rules for reading its fields.
//!
//! Records arrive as loosely-typed JSON, so every accessor here is total:
//! malformed amounts coerce to zero and malformed dates come back as `None`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::well_known::Rfc3339,
    macros::format_description,
};

/// The status values that mark a remittance as paid out.
pub const COMPLETED_STATUSES: [&str; 2] = ["completed", "지급완료"];

/// A single remittance record as uploaded by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Completion state, e.g. "completed" or "지급완료".
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    /// When the remittance finished, the basis for year/month grouping.
    #[serde(default, deserialize_with = "lenient_string")]
    pub finished: String,
    /// The amount in the source currency.
    #[serde(default)]
    pub source_amt: Value,
    /// The amount in local currency. Takes precedence over `source_amt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_source_amt: Option<Value>,
    /// The recipient's full name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub reci_full_name: String,
    /// Origin country code.
    #[serde(default, deserialize_with = "lenient_string")]
    pub send: String,
    /// Fields the dashboard does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    /// Whether the remittance has been paid out.
    pub fn is_completed(&self) -> bool {
        let status = self.status.trim();
        COMPLETED_STATUSES.contains(&status)
    }

    /// The effective amount: `local_source_amt` when present, otherwise
    /// `source_amt`, coerced to a number with a fallback of zero.
    pub fn amount(&self) -> f64 {
        match &self.local_source_amt {
            Some(value) if !value.is_null() => coerce_amount(value),
            _ => coerce_amount(&self.source_amt),
        }
    }

    /// The trimmed recipient name, or `None` if it is blank.
    pub fn recipient(&self) -> Option<&str> {
        let name = self.reci_full_name.trim();
        (!name.is_empty()).then_some(name)
    }

    /// The local date of `finished`, or `None` if it cannot be parsed.
    pub fn finished_date(&self, offset: UtcOffset) -> Option<Date> {
        parse_local_date(&self.finished, offset)
    }
}

/// Read a text field that may be null, a number or a bool.
///
/// Null and nested values become an empty string, scalars their JSON text.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Null | Value::Array(_) | Value::Object(_)) | None => String::new(),
    };

    Ok(text)
}

fn coerce_amount(value: &Value) -> f64 {
    let amount = match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                0.0
            } else {
                text.parse().unwrap_or(0.0)
            }
        }
        _ => 0.0,
    };

    if amount.is_finite() { amount } else { 0.0 }
}

/// Parse a timestamp into a date in the local offset.
///
/// Timestamps with an explicit offset are shifted into `offset`, timestamps
/// without one are read as local wall-clock time.
pub fn parse_local_date(text: &str, offset: UtcOffset) -> Option<Date> {
    let text = text.trim();

    if let Ok(datetime) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(datetime.to_offset(offset).date());
    }

    let naive_formats = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    ];

    for format in naive_formats {
        if let Ok(datetime) = PrimitiveDateTime::parse(text, format) {
            return Some(datetime.date());
        }
    }

    Date::parse(text, format_description!("[year]-[month]-[day]")).ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::{UtcOffset, macros::date};

    use super::{Transaction, parse_local_date};

    fn parse(value: serde_json::Value) -> Transaction {
        serde_json::from_value(value).expect("Could not deserialize transaction")
    }

    #[test]
    fn deserializes_camel_case_fields() {
        let transaction = parse(json!({
            "status": "completed",
            "finished": "2023-03-15T00:00:00Z",
            "sourceAmt": 1000,
            "reciFullName": " Kim Minsu ",
            "send": "KR",
            "id": "tx-1"
        }));

        assert_eq!(transaction.status, "completed");
        assert_eq!(transaction.amount(), 1000.0);
        assert_eq!(transaction.recipient(), Some("Kim Minsu"));
        assert_eq!(transaction.send, "KR");
        assert_eq!(transaction.extra["id"], json!("tx-1"));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let transaction = parse(json!({}));

        assert!(!transaction.is_completed());
        assert_eq!(transaction.amount(), 0.0);
        assert_eq!(transaction.recipient(), None);
    }

    #[test]
    fn null_text_fields_read_as_empty() {
        let transaction = parse(json!({
            "status": null,
            "finished": null,
            "sourceAmt": 1000,
            "reciFullName": null,
            "send": null
        }));

        assert_eq!(transaction.status, "");
        assert!(!transaction.is_completed());
        assert_eq!(transaction.finished_date(UtcOffset::UTC), None);
        assert_eq!(transaction.recipient(), None);
        assert_eq!(transaction.send, "");
    }

    #[test]
    fn scalar_text_fields_are_kept_as_text() {
        let transaction = parse(json!({
            "status": "completed",
            "finished": "2023-03-15T00:00:00Z",
            "reciFullName": 12345,
            "send": true,
            "extra": {"nested": 1}
        }));

        assert_eq!(transaction.recipient(), Some("12345"));
        assert_eq!(transaction.send, "true");

        let transaction = parse(json!({"reciFullName": ["Kim"], "status": {"code": 1}}));
        assert_eq!(transaction.recipient(), None);
        assert_eq!(transaction.status, "");
    }

    #[test]
    fn recognises_both_completion_labels() {
        assert!(parse(json!({"status": "completed"})).is_completed());
        assert!(parse(json!({"status": "지급완료"})).is_completed());
        assert!(!parse(json!({"status": "pending"})).is_completed());
        assert!(!parse(json!({"status": "Completed"})).is_completed());
    }

    #[test]
    fn local_amount_takes_precedence() {
        let transaction = parse(json!({"sourceAmt": 10, "localSourceAmt": 13000}));
        assert_eq!(transaction.amount(), 13000.0);

        let transaction = parse(json!({"sourceAmt": 10, "localSourceAmt": null}));
        assert_eq!(transaction.amount(), 10.0);
    }

    #[test]
    fn present_but_invalid_local_amount_is_zero() {
        let transaction = parse(json!({"sourceAmt": 10, "localSourceAmt": "n/a"}));
        assert_eq!(transaction.amount(), 0.0);
    }

    #[test]
    fn coerces_numeric_strings() {
        assert_eq!(parse(json!({"sourceAmt": " 1500.5 "})).amount(), 1500.5);
        assert_eq!(parse(json!({"sourceAmt": ""})).amount(), 0.0);
        assert_eq!(parse(json!({"sourceAmt": "1,000"})).amount(), 0.0);
        assert_eq!(parse(json!({"sourceAmt": "NaN"})).amount(), 0.0);
        assert_eq!(parse(json!({"sourceAmt": true})).amount(), 0.0);
        assert_eq!(parse(json!({"sourceAmt": -250})).amount(), -250.0);
    }

    #[test]
    fn parses_timestamp_with_offset_into_local_date() {
        let kst = UtcOffset::from_hms(9, 0, 0).unwrap();

        assert_eq!(
            parse_local_date("2023-03-31T20:00:00Z", UtcOffset::UTC),
            Some(date!(2023 - 03 - 31))
        );
        assert_eq!(
            parse_local_date("2023-03-31T20:00:00Z", kst),
            Some(date!(2023 - 04 - 01))
        );
    }

    #[test]
    fn parses_naive_timestamps_as_local_time() {
        let kst = UtcOffset::from_hms(9, 0, 0).unwrap();

        assert_eq!(
            parse_local_date("2023-12-31 23:30:00", kst),
            Some(date!(2023 - 12 - 31))
        );
        assert_eq!(
            parse_local_date("2023-12-31T23:30:00.123", kst),
            Some(date!(2023 - 12 - 31))
        );
        assert_eq!(
            parse_local_date("2024-02-29", kst),
            Some(date!(2024 - 02 - 29))
        );
    }

    #[test]
    fn rejects_unparseable_dates() {
        assert_eq!(parse_local_date("", UtcOffset::UTC), None);
        assert_eq!(parse_local_date("yesterday", UtcOffset::UTC), None);
        assert_eq!(parse_local_date("2023-13-01", UtcOffset::UTC), None);
    }
}
