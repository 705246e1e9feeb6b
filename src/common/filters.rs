// src/common/filters.rs
//
// Filtros de listagem: cada entidade expõe uma lista fechada de chaves de
// busca. Chave desconhecida vira 404 ("inexistent fields") em vez de ser
// ignorada em silêncio.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::common::error::{AppError, FieldErrors};
use crate::common::validators::check_is_float;

pub const CLIENT_FILTER_KEYS: &[&str] = &["last_name", "email", "company_name"];
pub const CONTRACT_FILTER_KEYS: &[&str] = &[
    "last_name",
    "email",
    "payment_due",
    "payment_due_after",
    "payment_due_before",
    "amount",
    "amount_gt",
    "amount_lt",
];
pub const EVENT_FILTER_KEYS: &[&str] = &[
    "last_name",
    "email",
    "event_date",
    "event_date_after",
    "event_date_before",
];
pub const USER_FILTER_KEYS: &[&str] = &["username", "last_name"];

/// Rejeita a query inteira se qualquer chave estiver fora da lista.
pub fn ensure_known_keys(
    params: &HashMap<String, String>,
    allowed: &[&str],
) -> Result<(), AppError> {
    for key in params.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(AppError::UnknownFilter);
        }
    }
    Ok(())
}

/// Valor de filtro numérico ("amount", "amount_gt", ...).
pub fn parse_float_param(
    params: &HashMap<String, String>,
    key: &str,
    errors: &mut FieldErrors,
) -> Option<f64> {
    let raw = params.get(key)?;
    match check_is_float(raw, key) {
        Ok(value) => Some(value),
        Err(message) => {
            errors.entry(key.to_string()).or_default().push(message);
            None
        }
    }
}

/// Valor de filtro de data, só a parte de data (YYYY-MM-DD).
pub fn parse_date_param(
    params: &HashMap<String, String>,
    key: &str,
    errors: &mut FieldErrors,
) -> Option<NaiveDate> {
    let raw = params.get(key)?;
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(value) => Some(value),
        Err(_) => {
            errors
                .entry(key.to_string())
                .or_default()
                .push(format!("<{key}>: This field must be a date (YYYY-MM-DD)"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn unknown_key_is_rejected() {
        let query = params(&[("xzk", "2")]);
        assert!(matches!(
            ensure_known_keys(&query, CONTRACT_FILTER_KEYS),
            Err(AppError::UnknownFilter)
        ));
    }

    #[test]
    fn known_keys_pass() {
        let query = params(&[("amount_gt", "1000"), ("last_name", "Vador")]);
        assert!(ensure_known_keys(&query, CONTRACT_FILTER_KEYS).is_ok());
    }

    #[test]
    fn float_param_reports_bad_values() {
        let query = params(&[("amount", "dix")]);
        let mut errors = FieldErrors::new();
        assert!(parse_float_param(&query, "amount", &mut errors).is_none());
        assert_eq!(
            errors["amount"][0],
            "<amount>: This field must be a float number !"
        );
    }

    #[test]
    fn date_param_parses_date_only() {
        let query = params(&[("payment_due_after", "2023-01-18")]);
        let mut errors = FieldErrors::new();
        let date = parse_date_param(&query, "payment_due_after", &mut errors).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 1, 18).unwrap());
        assert!(errors.is_empty());
    }
}
