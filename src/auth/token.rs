//! # Bearer Token Codec
//!
//! Encodes and decodes the colon-delimited bearer token format:
//!
//! ```text
//! <issued-at-unix-millis>:<validity-class>:<subject-uuid>:<issuer-secret>
//! ```
//!
//! The validity class is a short code (`15m`, `2h`, `7d`) whose trailing
//! letter selects the time unit. Decoding is deliberately forgiving: any
//! structural problem yields `None` and callers treat the token as invalid,
//! and an unrecognized validity code decodes to a zero-length lifetime so
//! the token is already expired.

use crate::domain::AuthId;
use chrono::Utc;

/// How long an issued token stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityClass {
    /// Short-lived access token issued at sign-in (`15m`)
    Minutes15,
    /// Access token issued on refresh (`2h`)
    Hours2,
    /// Refresh token (`7d`)
    Days7,
}

impl ValidityClass {
    /// Wire code embedded in the token
    pub fn code(&self) -> &'static str {
        match self {
            ValidityClass::Minutes15 => "15m",
            ValidityClass::Hours2 => "2h",
            ValidityClass::Days7 => "7d",
        }
    }
}

/// Decoded bearer token fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken {
    /// Issuance timestamp in unix milliseconds
    pub issued_at_ms: i64,
    /// Validity class code as it appeared on the wire
    pub validity: String,
    /// Account the token was issued to
    pub subject: AuthId,
}

impl BearerToken {
    /// Lifetime in milliseconds derived from the validity code.
    ///
    /// The numeric prefix is scaled by the trailing unit letter; a code
    /// that does not parse yields zero, which makes the token expired the
    /// instant it is checked.
    fn lifetime_ms(&self) -> i64 {
        let code = self.validity.as_str();
        if code.len() < 2 {
            return 0;
        }
        let (amount, unit) = code.split_at(code.len() - 1);
        let Ok(amount) = amount.parse::<i64>() else {
            return 0;
        };
        let unit_ms = match unit {
            "m" => 60 * 1000,
            "h" => 60 * 60 * 1000,
            "d" => 24 * 60 * 60 * 1000,
            _ => 0,
        };
        // Decoded fields are attacker-supplied; saturate rather than overflow.
        amount.saturating_mul(unit_ms)
    }

    /// Whether the token has expired as of `now_ms` (unix milliseconds).
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms > self.issued_at_ms.saturating_add(self.lifetime_ms())
    }

    /// Whether the token has expired as of the current wall clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp_millis())
    }
}

/// Issues and verifies bearer tokens carrying the configured issuer secret.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    secret: String,
}

impl TokenCodec {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    /// Issue a token for `subject` stamped with the current time.
    pub fn issue(&self, subject: &AuthId, validity: ValidityClass) -> String {
        self.issue_at(subject, validity, Utc::now().timestamp_millis())
    }

    /// Issue a token with an explicit issuance timestamp.
    pub fn issue_at(&self, subject: &AuthId, validity: ValidityClass, issued_at_ms: i64) -> String {
        format!("{}:{}:{}:{}", issued_at_ms, validity.code(), subject.as_str(), self.secret)
    }

    /// Decode a token string, returning `None` on any structural problem:
    /// wrong field count, non-numeric timestamp, malformed subject UUID, or
    /// an issuer secret that does not match ours.
    pub fn decode(&self, token: &str) -> Option<BearerToken> {
        let parts: Vec<&str> = token.split(':').collect();
        if parts.len() != 4 {
            return None;
        }

        let issued_at_ms = parts[0].parse::<i64>().ok()?;
        let validity = parts[1].to_string();

        // Only the canonical hyphenated UUID form is accepted as a subject.
        if parts[2].len() != 36 {
            return None;
        }
        let subject = parts[2].parse::<AuthId>().ok()?;

        if parts[3] != self.secret {
            return None;
        }

        Some(BearerToken { issued_at_ms, validity, subject })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBJECT: &str = "11111111-1111-1111-1111-111111111111";

    fn codec() -> TokenCodec {
        TokenCodec::new("s3cr3t")
    }

    fn subject() -> AuthId {
        SUBJECT.parse().unwrap()
    }

    #[test]
    fn issues_expected_wire_format() {
        let token = codec().issue_at(&subject(), ValidityClass::Minutes15, 1000);
        assert_eq!(token, format!("1000:15m:{SUBJECT}:s3cr3t"));
    }

    #[test]
    fn round_trips_all_validity_classes() {
        let codec = codec();
        for class in [ValidityClass::Minutes15, ValidityClass::Hours2, ValidityClass::Days7] {
            let token = codec.issue_at(&subject(), class, 42);
            let decoded = codec.decode(&token).unwrap();
            assert_eq!(decoded.issued_at_ms, 42);
            assert_eq!(decoded.validity, class.code());
            assert_eq!(decoded.subject, subject());
        }
    }

    #[test]
    fn fifteen_minute_token_expires_after_900_seconds() {
        let token = codec().issue_at(&subject(), ValidityClass::Minutes15, 1000);
        let decoded = codec().decode(&token).unwrap();
        // 15 minutes = 900_000 ms after issuance at 1000
        assert!(!decoded.is_expired_at(841_000));
        assert!(!decoded.is_expired_at(901_000));
        assert!(decoded.is_expired_at(961_000));
    }

    #[test]
    fn rejects_wrong_field_count() {
        let codec = codec();
        assert!(codec.decode("1000:15m:s3cr3t").is_none());
        assert!(codec.decode(&format!("1000:15m:{SUBJECT}:s3cr3t:extra")).is_none());
        assert!(codec.decode("").is_none());
    }

    #[test]
    fn rejects_non_numeric_timestamp() {
        assert!(codec().decode(&format!("abc:15m:{SUBJECT}:s3cr3t")).is_none());
    }

    #[test]
    fn rejects_malformed_subject() {
        assert!(codec().decode("1000:15m:bad-uuid:s3cr3t").is_none());
        // Unhyphenated UUIDs are not valid subjects either.
        let compact = SUBJECT.replace('-', "");
        assert!(codec().decode(&format!("1000:15m:{compact}:s3cr3t")).is_none());
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = codec().issue_at(&subject(), ValidityClass::Days7, 1000);
        assert!(TokenCodec::new("other").decode(&token).is_none());
    }

    #[test]
    fn unknown_validity_code_is_immediately_expired() {
        let codec = codec();
        let token = format!("1000:99x:{SUBJECT}:s3cr3t");
        let decoded = codec.decode(&token).unwrap();
        assert!(decoded.is_expired_at(1001));
    }

    #[test]
    fn garbage_validity_code_is_immediately_expired() {
        let decoded = codec().decode(&format!("1000:xx:{SUBJECT}:s3cr3t")).unwrap();
        assert!(decoded.is_expired_at(1001));
    }

    #[test]
    fn oversized_decoded_fields_saturate_instead_of_overflowing() {
        let codec = codec();

        // Lifetime computation saturates on a huge (but parseable) amount.
        let huge_validity = format!("1000:{}m:{SUBJECT}:s3cr3t", i64::MAX);
        let decoded = codec.decode(&huge_validity).unwrap();
        assert!(!decoded.is_expired_at(i64::MAX));

        // Expiry comparison saturates on a timestamp near the i64 ceiling.
        let huge_timestamp = format!("{}:15m:{SUBJECT}:s3cr3t", i64::MAX);
        let decoded = codec.decode(&huge_timestamp).unwrap();
        assert!(!decoded.is_expired_at(i64::MAX));

        // An amount too large for i64 still fails parse and reads as expired.
        let unparseable = format!("1000:99999999999999999999m:{SUBJECT}:s3cr3t");
        let decoded = codec.decode(&unparseable).unwrap();
        assert!(decoded.is_expired_at(1001));
    }
}
