use regex::Regex;

use crate::core::error::GuardError;
use crate::core::record::PaymentSignal;
use crate::intake::IntakeData;

const PAYMENT_KEYWORDS: &[&str] = &[
    "fee",
    "payment",
    "deposit",
    "registration",
    "charges",
    "training fee",
    "joining fee",
    "processing fee",
];

const UPFRONT_KEYWORDS: &[&str] = &[
    "before joining",
    "pay first",
    "upfront",
    "immediate payment",
    "pay now",
];

/// Payment-language detection over the cleaned text: generic payment
/// mentions, upfront requests, concrete amounts, and pressure wording
/// around payment.
pub fn run_payment_agent(intake: &IntakeData) -> Result<PaymentSignal, GuardError> {
    let text = intake.clean_text.to_lowercase();
    let mut observations = Vec::new();

    let payment_mentioned = PAYMENT_KEYWORDS.iter().any(|k| text.contains(k));
    if payment_mentioned {
        observations.push("Payment mentioned in the communication".to_string());
    }

    if UPFRONT_KEYWORDS.iter().any(|k| text.contains(k)) {
        observations
            .push("Payment appears to be requested before the internship starts".to_string());
    }

    let amount_re = Regex::new(r"(?i)(₹|rs\.?|inr|\$|usd|eur)\s?\d+")?;
    if amount_re.is_match(&text) {
        observations.push("Specific payment amount mentioned".to_string());
    }

    if payment_mentioned && intake.urgency_mentions {
        observations.push("High-pressure language used around payment".to_string());
    }

    if observations.is_empty() {
        observations.push("No unusual payment patterns detected".to_string());
    }

    Ok(PaymentSignal { observations })
}
