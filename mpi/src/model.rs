//! Version-independent request and result types.
//!
//! Callers build requests and read results in these canonical shapes; the
//! active [`Dialect`](crate::dialect::Dialect) maps them to and from the wire.

use std::fmt;

use mpi_proto::{OpaqueId, PaymentUpdate, SettlementRecord, UpdateTransactionPayload};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction identifier. Opaque, compared as a string.
pub type TransactionId = OpaqueId;

/// Card data for a lookup.
///
/// The `Debug` output masks the account number.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Primary account number.
    pub number: String,
    /// Expiration month, `1..=12`.
    pub expiration_month: u8,
    /// Expiration year. Two-digit years are read as `20YY`.
    pub expiration_year: u16,
}

impl Card {
    /// Creates card data.
    #[must_use]
    pub fn new(number: impl Into<String>, expiration_month: u8, expiration_year: u16) -> Self {
        Self {
            number: number.into(),
            expiration_month,
            expiration_year,
        }
    }

    /// Four-digit expiration year.
    #[must_use]
    pub const fn full_year(&self) -> u16 {
        if self.expiration_year < 100 {
            2000 + self.expiration_year
        } else {
            self.expiration_year
        }
    }

    /// Two-digit expiration month (`"07"`).
    #[must_use]
    pub fn month_mm(&self) -> String {
        format!("{:02}", self.expiration_month)
    }

    /// Expiry in EMV `YYMM` form (`"3007"` for July 2030).
    #[must_use]
    pub fn expiry_yymm(&self) -> String {
        format!("{:02}{:02}", self.full_year() % 100, self.expiration_month)
    }

    /// Account number with all but the first six and last four digits masked.
    #[must_use]
    pub fn masked_number(&self) -> String {
        let len = self.number.chars().count();
        if len <= 10 {
            return "*".repeat(len);
        }
        self.number
            .chars()
            .enumerate()
            .map(|(i, c)| if i < 6 || i >= len - 4 { c } else { '*' })
            .collect()
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Card")
            .field("number", &self.masked_number())
            .field("expiration_month", &self.expiration_month)
            .field("expiration_year", &self.expiration_year)
            .finish()
    }
}

/// Kind of transaction being authenticated.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// One-off payment.
    #[default]
    Payment,
    /// Recurring payment.
    Recurring,
    /// Installment payment.
    Installment,
}

impl TransactionType {
    /// Two-digit transaction code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Payment => "01",
            Self::Recurring => "02",
            Self::Installment => "03",
        }
    }

    /// Whether a 3DS requestor authentication indicator must accompany the
    /// lookup.
    #[must_use]
    pub const fn requires_authentication_indicator(&self) -> bool {
        matches!(self, Self::Recurring | Self::Installment)
    }
}

/// Browser metadata collected from the cardholder's session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserInfo {
    /// `Accept` header sent by the browser.
    pub accept_header: Option<String>,
    /// Browser IP address.
    pub ip: Option<String>,
    /// Browser language.
    pub language: Option<String>,
    /// Screen colour depth in bits.
    pub color_depth: Option<u8>,
    /// Screen height in pixels.
    pub screen_height: Option<u32>,
    /// Screen width in pixels.
    pub screen_width: Option<u32>,
    /// UTC offset in minutes.
    pub time_zone: Option<i32>,
    /// Whether Java is enabled.
    pub java_enabled: Option<bool>,
}

/// Canonical lookup request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    /// Card being authenticated.
    pub card: Card,
    /// Purchase amount.
    pub amount: Decimal,
    /// ISO 4217 alphabetic currency code.
    pub currency: String,
    /// Where the cardholder returns after the challenge.
    pub redirect_uri: String,
    /// Merchant reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Number of installments.
    #[serde(default)]
    pub installments: Option<u32>,
    /// Kind of transaction.
    #[serde(default)]
    pub transaction_type: TransactionType,
    /// Browser metadata.
    #[serde(default)]
    pub browser: Option<BrowserInfo>,
    /// Cardholder user agent. Also sent as the `User-Agent` header.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl LookupRequest {
    /// Creates a payment lookup with no optional metadata.
    #[must_use]
    pub fn new(
        card: Card,
        amount: Decimal,
        currency: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            card,
            amount,
            currency: currency.into(),
            redirect_uri: redirect_uri.into(),
            reference: None,
            installments: None,
            transaction_type: TransactionType::Payment,
            browser: None,
            user_agent: None,
        }
    }

    /// Sets the merchant reference.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Sets the number of installments and marks the lookup as an
    /// installment transaction.
    #[must_use]
    pub const fn with_installments(mut self, installments: u32) -> Self {
        self.installments = Some(installments);
        self.transaction_type = TransactionType::Installment;
        self
    }

    /// Sets the transaction type.
    #[must_use]
    pub const fn with_transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    /// Attaches browser metadata.
    #[must_use]
    pub fn with_browser(mut self, browser: BrowserInfo) -> Self {
        self.browser = Some(browser);
        self
    }

    /// Sets the cardholder user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Extra per-call options for a status query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Cardholder user agent, sent as the `User-Agent` header.
    pub user_agent: Option<String>,
}

impl QueryOptions {
    /// Options carrying a user agent.
    #[must_use]
    pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: Some(user_agent.into()),
        }
    }
}

/// Settlement metadata to attach to a transaction.
///
/// Unset and empty fields are left out of the wire body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateTransactionRequest {
    /// Processor that handled the payment.
    pub processor: Option<String>,
    /// Authorization code.
    pub authorization: Option<String>,
    /// Payment provider.
    pub provider: Option<String>,
    /// Base24 reference.
    pub base24: Option<String>,
    /// ISO reference.
    pub iso: Option<String>,
}

impl UpdateTransactionRequest {
    /// Sets the processor.
    #[must_use]
    pub fn with_processor(mut self, value: impl Into<String>) -> Self {
        self.processor = Some(value.into());
        self
    }

    /// Sets the authorization code.
    #[must_use]
    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    /// Sets the provider.
    #[must_use]
    pub fn with_provider(mut self, value: impl Into<String>) -> Self {
        self.provider = Some(value.into());
        self
    }

    /// Sets the Base24 reference.
    #[must_use]
    pub fn with_base24(mut self, value: impl Into<String>) -> Self {
        self.base24 = Some(value.into());
        self
    }

    /// Sets the ISO reference.
    #[must_use]
    pub fn with_iso(mut self, value: impl Into<String>) -> Self {
        self.iso = Some(value.into());
        self
    }

    /// Builds the wire body, keeping only present, non-empty fields.
    #[must_use]
    pub fn payload(&self) -> UpdateTransactionPayload {
        fn present(value: Option<&String>) -> Option<String> {
            value.filter(|v| !v.is_empty()).cloned()
        }

        UpdateTransactionPayload {
            payment: PaymentUpdate {
                processor: present(self.processor.as_ref()),
                authorization: present(self.authorization.as_ref()),
                provider: present(self.provider.as_ref()),
                base24: present(self.base24.as_ref()),
                iso: present(self.iso.as_ref()),
            },
        }
    }
}

/// A started authentication session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupSession {
    /// Session token.
    pub session_token: OpaqueId,
    /// URL the cardholder must be redirected to.
    pub redirect_url: String,
    /// Transaction identifier for later queries.
    pub transaction_id: TransactionId,
}

/// A `transStatus` code, carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransStatus(String);

impl TransStatus {
    /// Wraps a status code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The code as received.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Y`: the cardholder was authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.0 == "Y"
    }

    /// Everything except `U` and `I`, which may change on a later poll.
    #[must_use]
    pub fn is_final(&self) -> bool {
        !matches!(self.0.as_str(), "U" | "I")
    }
}

impl fmt::Display for TransStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for TransStatus {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Uniform authentication status returned by a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationStatus {
    /// The queried transaction.
    pub transaction_id: TransactionId,
    /// Outcome code.
    pub trans_status: TransStatus,
    /// Reason accompanying a non-`Y` outcome.
    pub trans_status_reason: Option<String>,
    /// Electronic Commerce Indicator.
    pub eci: String,
    /// ACS transaction identifier (V2).
    pub acs_trans_id: Option<String>,
    /// Directory server transaction identifier (V2).
    pub ds_trans_id: Option<String>,
    /// 3DS server transaction identifier (V2).
    pub three_ds_server_trans_id: Option<String>,
    /// Authentication value (CAVV/AAV), opaque.
    pub authentication_value: Option<String>,
    /// 3-D Secure 1 transaction identifier (V1).
    pub xid: Option<String>,
    /// Whether the service validated the authentication signature (V1).
    pub validated_signature: Option<bool>,
}

/// Settlement record returned for an updated transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatedTransaction {
    /// The updated transaction, as requested.
    pub id: TransactionId,
    /// Settlement context, passed through.
    pub record: SettlementRecord,
}
