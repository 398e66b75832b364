//! Wire types for Stripe webhook payloads.
//!
//! Mirrors the slice of Stripe's JSON that one-time payment checkouts
//! produce: the event envelope, checkout sessions, and failed payment
//! intents. The metadata correlation keys (`productSlug`, `customerEmail`)
//! are read here and nowhere else.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ════════════════════════════════════════════════════════════════════════════════
// Signature Parsing
// ════════════════════════════════════════════════════════════════════════════════

/// Why a Stripe-Signature header could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureParseError {
    /// The header value is empty.
    MissingHeader,
    /// No `t=` part found.
    MissingTimestamp,
    /// No `v1=` part found.
    MissingV1Signature,
    /// The `t=` value is not a unix timestamp.
    InvalidTimestamp,
    /// The `v1=` value is not hex.
    InvalidSignatureFormat,
}

impl std::fmt::Display for SignatureParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::MissingHeader => "signature header is empty",
            Self::MissingTimestamp => "signature header has no t= part",
            Self::MissingV1Signature => "signature header has no v1= part",
            Self::InvalidTimestamp => "signature timestamp is not a number",
            Self::InvalidSignatureFormat => "signature is not valid hex",
        };
        f.write_str(reason)
    }
}

impl std::error::Error for SignatureParseError {}

/// The `t` and `v1` parts of a Stripe-Signature header.
///
/// Stripe sends `t=<unix seconds>,v1=<hex hmac>` and may append further
/// parts (`v0=` on migrated endpoints, new schemes later). Everything
/// except `t` and `v1` is ignored.
#[derive(Debug, Clone)]
pub struct SignatureHeader {
    /// When Stripe signed the payload, unix seconds.
    pub timestamp: i64,

    /// Decoded HMAC-SHA256 digest from the `v1` part.
    pub v1_signature: Vec<u8>,
}

impl SignatureHeader {
    /// Picks `t` and `v1` out of a comma-separated header value.
    ///
    /// Parts without an `=` and parts with unrecognized keys are skipped,
    /// so new schemes Stripe introduces do not break verification.
    pub fn parse(header: &str) -> Result<Self, SignatureParseError> {
        if header.is_empty() {
            return Err(SignatureParseError::MissingHeader);
        }

        let mut timestamp = None;
        let mut v1_signature = None;

        for part in header.split(',') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            let value = value.trim();

            match key.trim() {
                "t" => {
                    let seconds: i64 = value
                        .parse()
                        .map_err(|_| SignatureParseError::InvalidTimestamp)?;
                    timestamp = Some(seconds);
                }
                "v1" => {
                    let digest =
                        hex_decode(value).ok_or(SignatureParseError::InvalidSignatureFormat)?;
                    v1_signature = Some(digest);
                }
                // v0 and anything newer than v1
                _ => {}
            }
        }

        match (timestamp, v1_signature) {
            (Some(timestamp), Some(v1_signature)) => Ok(Self {
                timestamp,
                v1_signature,
            }),
            (None, _) => Err(SignatureParseError::MissingTimestamp),
            (_, None) => Err(SignatureParseError::MissingV1Signature),
        }
    }
}

fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

/// Lowercase hex rendering of a byte slice.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// ════════════════════════════════════════════════════════════════════════════════
// Event Envelope
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe event envelope, the top-level JSON of every webhook delivery.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeWebhookEvent {
    /// Event id, `evt_...`.
    pub id: String,

    /// Dotted event name such as `checkout.session.completed`.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix seconds at which Stripe created the event.
    pub created: i64,

    /// Carries the affected object.
    pub data: StripeEventData,

    /// False for test-mode events.
    pub livemode: bool,

    /// API version the payload was rendered with.
    pub api_version: Option<String>,

    /// Deliveries Stripe still owes for this event.
    #[serde(default)]
    pub pending_webhooks: i32,
}

/// The `data` field of the envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The session, intent, or other object the event is about. Kept as
    /// raw JSON; the adapter decodes it per event type.
    pub object: serde_json::Value,

    /// On `*.updated` events, the fields that changed.
    pub previous_attributes: Option<serde_json::Value>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Stripe Object Types
// ════════════════════════════════════════════════════════════════════════════════

/// A Checkout Session in payment mode.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCheckoutSession {
    /// Session id, `cs_...`.
    pub id: String,

    /// Always `checkout.session`.
    pub object: String,

    /// `payment` for one-time purchases.
    pub mode: String,

    /// `paid`, `unpaid`, or `no_payment_required`.
    pub payment_status: String,

    /// `open`, `complete`, or `expired`.
    pub status: Option<String>,

    /// Stripe customer id, when one was created or attached.
    pub customer: Option<String>,

    /// Email we pre-filled when creating the session.
    pub customer_email: Option<String>,

    /// What the payer actually entered on the hosted page.
    pub customer_details: Option<StripeCustomerDetails>,

    /// Payment intent id of the captured charge, `pi_...`.
    pub payment_intent: Option<String>,

    /// Amount charged, minor units.
    pub amount_total: Option<i64>,

    /// Lowercase currency code.
    pub currency: Option<String>,

    /// Our correlation metadata, set at session creation.
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Hosted checkout URL. Set on creation, null after completion.
    pub url: Option<String>,

    /// Redirect target after successful payment.
    pub success_url: Option<String>,

    /// Redirect target when the payer backs out.
    pub cancel_url: Option<String>,
}

impl StripeCheckoutSession {
    /// Product slug from session metadata, if the session carries one.
    pub fn metadata_product_slug(&self) -> Option<String> {
        self.metadata.get("productSlug").cloned()
    }

    /// Customer email from session metadata, if the session carries one.
    pub fn metadata_customer_email(&self) -> Option<String> {
        self.metadata.get("customerEmail").cloned()
    }

    /// Email the gateway collected at checkout, preferring collected
    /// details over the pre-fill field.
    pub fn collected_email(&self) -> Option<String> {
        self.customer_details
            .as_ref()
            .and_then(|d| d.email.clone())
            .or_else(|| self.customer_email.clone())
    }
}

/// Payer details Stripe collected during checkout.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCustomerDetails {
    /// Email the payer entered on the checkout page.
    pub email: Option<String>,

    /// Name the payer entered, if collected.
    pub name: Option<String>,
}

/// A PaymentIntent, as delivered on `payment_intent.payment_failed`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripePaymentIntent {
    /// Intent id, `pi_...`.
    pub id: String,

    /// Always `payment_intent`.
    pub object: String,

    /// `requires_payment_method` after a decline.
    pub status: String,

    /// Amount in minor units.
    #[serde(default)]
    pub amount: i64,

    /// Lowercase currency code.
    pub currency: Option<String>,

    /// Most recent error, present on failure events.
    pub last_payment_error: Option<StripePaymentError>,

    /// Intent metadata, unused by us but kept for logging.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Decline details from a failed payment intent.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripePaymentError {
    /// Human-readable failure description.
    pub message: Option<String>,

    /// Stripe error code, e.g. `card_declined`.
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ════════════════════════════════════════════════════════════════════════════
    // Signature Header
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn header_with_t_and_v1_parses() {
        let parsed =
            SignatureHeader::parse("t=1704067200,v1=5d41402abc4b2a76b9719d911017c592").unwrap();

        assert_eq!(parsed.timestamp, 1704067200);
        assert_eq!(
            hex_encode(&parsed.v1_signature),
            "5d41402abc4b2a76b9719d911017c592"
        );
    }

    #[test]
    fn v0_part_is_ignored() {
        let parsed =
            SignatureHeader::parse("t=1704067200,v1=5d41402abc4b2a76b9719d911017c592,v0=aabbccdd")
                .unwrap();

        assert_eq!(hex_encode(&parsed.v1_signature).len(), 32);
    }

    #[test]
    fn header_without_t_is_missing_timestamp() {
        let result = SignatureHeader::parse("v1=5d41402abc4b2a76b9719d911017c592");
        assert_eq!(result.unwrap_err(), SignatureParseError::MissingTimestamp);
    }

    #[test]
    fn header_without_v1_is_missing_signature() {
        let result = SignatureHeader::parse("t=1704067200,v0=aabbccdd");
        assert_eq!(result.unwrap_err(), SignatureParseError::MissingV1Signature);
    }

    #[test]
    fn empty_header_is_rejected() {
        let result = SignatureHeader::parse("");
        assert_eq!(result.unwrap_err(), SignatureParseError::MissingHeader);
    }

    #[test]
    fn parts_without_equals_are_skipped() {
        let parsed = SignatureHeader::parse("garbage,t=1704067200,v1=aabbccdd").unwrap();
        assert_eq!(parsed.timestamp, 1704067200);
    }

    #[test]
    fn non_numeric_timestamp_is_rejected() {
        let result = SignatureHeader::parse("t=not_a_number,v1=5d41402abc4b2a76b9719d911017c592");
        assert_eq!(result.unwrap_err(), SignatureParseError::InvalidTimestamp);
    }

    #[test]
    fn non_hex_signature_is_rejected() {
        let result = SignatureHeader::parse("t=1704067200,v1=not_valid_hex_xyz");
        assert_eq!(
            result.unwrap_err(),
            SignatureParseError::InvalidSignatureFormat
        );
    }

    #[test]
    fn odd_length_hex_is_rejected() {
        let result = SignatureHeader::parse("t=1704067200,v1=abc");
        assert_eq!(
            result.unwrap_err(),
            SignatureParseError::InvalidSignatureFormat
        );
    }

    #[test]
    fn hex_codec_roundtrips() {
        assert_eq!(hex_encode(&[]), "");
        assert_eq!(hex_encode(&[0x00, 0xff, 0x10]), "00ff10");
        assert_eq!(hex_decode("00ff10"), Some(vec![0x00, 0xff, 0x10]));
        assert_eq!(hex_decode("zz"), None);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Envelope and Objects
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn completed_session_envelope_decodes() {
        let json = r#"{
            "id": "evt_outer",
            "type": "checkout.session.completed",
            "created": 1704067200,
            "data": {
                "object": {
                    "id": "cs_inner",
                    "object": "checkout.session",
                    "mode": "payment",
                    "payment_status": "paid",
                    "status": "complete",
                    "customer": "cus_inner",
                    "payment_intent": "pi_inner",
                    "amount_total": 900,
                    "currency": "eur",
                    "metadata": {
                        "productSlug": "premium-pdf",
                        "customerEmail": "a@x.com"
                    }
                }
            },
            "livemode": false,
            "pending_webhooks": 0
        }"#;

        let event: StripeWebhookEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.id, "evt_outer");
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(event.created, 1704067200);
        assert!(!event.livemode);

        let session: StripeCheckoutSession = serde_json::from_value(event.data.object).unwrap();
        assert_eq!(session.id, "cs_inner");
        assert_eq!(
            session.metadata_product_slug(),
            Some("premium-pdf".to_string())
        );
        assert_eq!(
            session.metadata_customer_email(),
            Some("a@x.com".to_string())
        );
        assert_eq!(session.payment_intent, Some("pi_inner".to_string()));
        assert_eq!(session.amount_total, Some(900));
    }

    #[test]
    fn session_metadata_email_is_separate_from_prefill() {
        let json = r#"{
            "id": "cs_meta",
            "object": "checkout.session",
            "mode": "payment",
            "payment_status": "paid",
            "status": "complete",
            "customer": "cus_123",
            "customer_email": "prefill@example.com",
            "customer_details": {
                "email": "collected@example.com",
                "name": "Test Payer"
            },
            "payment_intent": "pi_456",
            "amount_total": 1500,
            "currency": "eur",
            "metadata": {
                "productSlug": "somatic-protocol"
            },
            "success_url": "https://example.com/success",
            "cancel_url": "https://example.com/cancel"
        }"#;

        let session: StripeCheckoutSession = serde_json::from_str(json).unwrap();

        assert_eq!(
            session.metadata_product_slug(),
            Some("somatic-protocol".to_string())
        );
        assert_eq!(session.metadata_customer_email(), None);
        assert_eq!(session.customer, Some("cus_123".to_string()));
    }

    #[test]
    fn collected_email_prefers_customer_details() {
        let json = r#"{
            "id": "cs_1",
            "object": "checkout.session",
            "mode": "payment",
            "payment_status": "paid",
            "customer_email": "prefill@example.com",
            "customer_details": {"email": "collected@example.com"}
        }"#;

        let session: StripeCheckoutSession = serde_json::from_str(json).unwrap();
        assert_eq!(
            session.collected_email(),
            Some("collected@example.com".to_string())
        );
    }

    #[test]
    fn collected_email_falls_back_to_prefill() {
        let json = r#"{
            "id": "cs_2",
            "object": "checkout.session",
            "mode": "payment",
            "payment_status": "paid",
            "customer_email": "prefill@example.com"
        }"#;

        let session: StripeCheckoutSession = serde_json::from_str(json).unwrap();
        assert_eq!(
            session.collected_email(),
            Some("prefill@example.com".to_string())
        );
    }

    #[test]
    fn failed_intent_decodes_with_error_details() {
        let json = r#"{
            "id": "pi_test_789",
            "object": "payment_intent",
            "status": "requires_payment_method",
            "amount": 900,
            "currency": "eur",
            "last_payment_error": {
                "message": "Your card was declined.",
                "code": "card_declined"
            },
            "metadata": {}
        }"#;

        let intent: StripePaymentIntent = serde_json::from_str(json).unwrap();

        assert_eq!(intent.id, "pi_test_789");
        assert_eq!(intent.status, "requires_payment_method");
        let err = intent.last_payment_error.unwrap();
        assert_eq!(err.message, Some("Your card was declined.".to_string()));
        assert_eq!(err.code, Some("card_declined".to_string()));
    }

    #[test]
    fn session_with_minimal_fields_decodes() {
        let json = r#"{
            "id": "cs_minimal",
            "object": "checkout.session",
            "mode": "payment",
            "payment_status": "unpaid"
        }"#;

        let session: StripeCheckoutSession = serde_json::from_str(json).unwrap();
        assert!(session.metadata.is_empty());
        assert!(session.payment_intent.is_none());
        assert!(session.collected_email().is_none());
    }
}
