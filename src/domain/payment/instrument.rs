//! Payment methods and instrument validation.
//!
//! Raw instrument data (card number, CVV, mobile-money PIN) is only held in
//! `Secret` wrappers and never stored; capture keeps the last four digits
//! and the cardholder name in `PaymentDetails`.

use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::foundation::ValidationError;

use super::PaymentError;

static CARD_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{16}$").expect("valid regex"));
static CARD_EXPIRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0[1-9]|1[0-2])/[0-9]{2}$").expect("valid regex"));
static CARD_CVV: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{3}$").expect("valid regex"));
static BKASH_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^01[0-9]{9}$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    /// bKash mobile money.
    Bkash,
    /// Bank transfer confirmed by a reference from the bank.
    Bank,
    Paypal,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Bkash => "bkash",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Paypal => "paypal",
        }
    }

    /// Prefix of generated transaction references. Bank transfers reuse the
    /// bank's own reference and have none.
    fn reference_prefix(&self) -> Option<&'static str> {
        match self {
            PaymentMethod::Card => Some("CARD_"),
            PaymentMethod::Bkash => Some("BKASH_"),
            PaymentMethod::Paypal => Some("PAYPAL_"),
            PaymentMethod::Bank => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(PaymentMethod::Card),
            "bkash" => Ok(PaymentMethod::Bkash),
            "bank" => Ok(PaymentMethod::Bank),
            "paypal" => Ok(PaymentMethod::Paypal),
            other => Err(ValidationError::invalid_format(
                "payment_method",
                format!("unknown method '{}'", other),
            )),
        }
    }
}

/// Instrument data submitted with a capture request.
#[derive(Debug, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentInstrument {
    Card {
        card_number: Secret<String>,
        expiry: String,
        cvv: Secret<String>,
        cardholder_name: String,
    },
    Bkash {
        bkash_number: String,
        pin: Secret<String>,
    },
    Bank {
        transaction_reference: String,
    },
    Paypal,
}

/// Marker written into the details when a refund is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundMarker {
    FullRefunded,
    PartialRefunded,
}

/// Non-sensitive method details kept with the payment row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardholder_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bkash_last4: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_transaction_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_status: Option<RefundMarker>,
}

/// Outcome of validating an instrument: what capture persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInstrument {
    pub method: PaymentMethod,
    pub transaction_reference: String,
    pub details: PaymentDetails,
}

impl PaymentInstrument {
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentInstrument::Card { .. } => PaymentMethod::Card,
            PaymentInstrument::Bkash { .. } => PaymentMethod::Bkash,
            PaymentInstrument::Bank { .. } => PaymentMethod::Bank,
            PaymentInstrument::Paypal => PaymentMethod::Paypal,
        }
    }

    /// Checks the method-specific rules and derives the stored details.
    pub fn validate(&self) -> Result<ValidatedInstrument, PaymentError> {
        let method = self.method();
        let details = match self {
            PaymentInstrument::Card {
                card_number,
                expiry,
                cvv,
                cardholder_name,
            } => {
                let digits: String = card_number
                    .expose_secret()
                    .chars()
                    .filter(|c| *c != ' ')
                    .collect();
                if !CARD_NUMBER.is_match(&digits) {
                    return Err(PaymentError::invalid_details(
                        "card_number",
                        "card number must be 16 digits",
                    ));
                }
                if !CARD_EXPIRY.is_match(expiry.trim()) {
                    return Err(PaymentError::invalid_details(
                        "expiry",
                        "expiry must be in MM/YY format",
                    ));
                }
                if !CARD_CVV.is_match(cvv.expose_secret()) {
                    return Err(PaymentError::invalid_details("cvv", "CVV must be 3 digits"));
                }
                let name = cardholder_name.trim();
                if name.is_empty() {
                    return Err(PaymentError::invalid_details(
                        "cardholder_name",
                        "cardholder name is required",
                    ));
                }
                PaymentDetails {
                    card_last4: Some(last4(&digits)),
                    cardholder_name: Some(name.to_string()),
                    ..PaymentDetails::default()
                }
            }
            PaymentInstrument::Bkash { bkash_number, pin } => {
                let number = bkash_number.trim();
                if !BKASH_NUMBER.is_match(number) {
                    return Err(PaymentError::invalid_details(
                        "bkash_number",
                        "bKash number must be 11 digits starting with 01",
                    ));
                }
                if pin.expose_secret().trim().is_empty() {
                    return Err(PaymentError::invalid_details("pin", "PIN is required"));
                }
                PaymentDetails {
                    bkash_last4: Some(last4(number)),
                    ..PaymentDetails::default()
                }
            }
            PaymentInstrument::Bank {
                transaction_reference,
            } => {
                let reference = transaction_reference.trim();
                if reference.is_empty() {
                    return Err(PaymentError::invalid_details(
                        "transaction_reference",
                        "bank transaction reference is required",
                    ));
                }
                return Ok(ValidatedInstrument {
                    method,
                    transaction_reference: reference.to_string(),
                    details: PaymentDetails {
                        bank_transaction_id: Some(reference.to_string()),
                        ..PaymentDetails::default()
                    },
                });
            }
            PaymentInstrument::Paypal => PaymentDetails::default(),
        };

        Ok(ValidatedInstrument {
            method,
            transaction_reference: generate_reference(method),
            details,
        })
    }
}

fn last4(digits: &str) -> String {
    let start = digits.len().saturating_sub(4);
    digits[start..].to_string()
}

/// Method prefix followed by 16 lowercase hex characters.
fn generate_reference(method: PaymentMethod) -> String {
    let random = Uuid::new_v4();
    format!(
        "{}{}",
        method.reference_prefix().unwrap_or_default(),
        hex::encode(&random.as_bytes()[..8])
    )
}
