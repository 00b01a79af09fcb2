use chrono::{DateTime, Utc};
use rand::RngExt;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of webhook delivery attempts per sale. Once exhausted the
/// sale is left un-notified and excluded from future sweeps.
pub const MAX_WEBHOOK_ATTEMPTS: i32 = 5;

/// Hard timeout for a single outbound webhook POST.
pub const WEBHOOK_TIMEOUT_MS: u64 = 5000;

/// Pending sales picked up per reconciliation pass (oldest first).
pub const PENDING_SWEEP_LIMIT: u64 = 20;

/// Approved, un-notified sales picked up per webhook pass (oldest approval
/// first).
pub const WEBHOOK_SWEEP_LIMIT: u64 = 50;

/// Pause between consecutive deliveries in one sweep, so a large batch does
/// not burst the remote endpoint.
pub const DELIVERY_PACING_MS: u64 = 1000;

/// User-Agent sent with every outbound webhook POST.
pub const WEBHOOK_USER_AGENT: &str = "revenda-sales-webhook/1.0";

/// A vehicle purchase order, tracked through the payment lifecycle.
#[derive(Debug, Clone)]
pub struct Sale {
    pub id: Uuid,
    pub vehicle_id: String,
    /// Buyer CPF, 11 digits.
    pub buyer_cpf: String,
    pub amount_paid: Decimal,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    /// Server-issued idempotency key correlating this sale with
    /// payment-provider callbacks.
    pub payment_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set exactly when `status` becomes `Approved`.
    pub approved_at: Option<DateTime<Utc>>,
    pub webhook_notified: bool,
    pub webhook_attempts: i32,
}

/// Payment lifecycle state.
///
/// `pending → {processing, approved, rejected}`; `processing → {approved,
/// rejected}`. Approved, rejected and canceled are terminal for payment
/// resolution (webhook delivery still acts on approved sales).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Pending,
    Processing,
    Approved,
    Rejected,
    Canceled,
}

impl SaleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Canceled => "canceled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "canceled" => Some(Self::Canceled),
            _ => None,
        }
    }

    /// True once payment resolution can no longer change this sale.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Canceled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Pix,
    CreditCard,
    DebitCard,
    Boleto,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pix => "pix",
            Self::CreditCard => "credit_card",
            Self::DebitCard => "debit_card",
            Self::Boleto => "boleto",
            Self::BankTransfer => "bank_transfer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pix" => Some(Self::Pix),
            "credit_card" => Some(Self::CreditCard),
            "debit_card" => Some(Self::DebitCard),
            "boleto" => Some(Self::Boleto),
            "bank_transfer" => Some(Self::BankTransfer),
            _ => None,
        }
    }
}

/// Outcome reported by the payment provider for a payment code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Approved,
    Rejected,
}

/// How the reconciliation sweep treats sales stuck in `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalPolicy {
    /// Pending sales wait for a payment-provider callback. Default.
    RequireConfirmation,
    /// Every pending sale is promoted to approved on each sweep, with no
    /// payment-confirmation signal. Demo shortcut — not production-safe.
    AutoApprove,
}

/// Vehicle data returned by the catalog service.
///
/// `price` is kept as the raw text the catalog sent (it arrives as a JSON
/// number or string depending on the catalog version) and is parsed into a
/// `Decimal` at validation time.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: String,
    pub price: String,
    pub status: VehicleStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    ForSale,
    Sold,
    Reserved,
    #[serde(other)]
    Unknown,
}

impl VehicleStatus {
    pub fn is_for_sale(self) -> bool {
        matches!(self, Self::ForSale)
    }
}

/// One outbound webhook delivery attempt (append-only log row).
#[derive(Debug, Clone)]
pub struct WebhookAttempt {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub url: String,
    pub payload: serde_json::Value,
    /// Remote HTTP status; 0 when no response was received.
    pub status_code: i32,
    pub response: Option<String>,
    pub attempted_at: DateTime<Utc>,
    pub success: bool,
}

/// Validate a buyer CPF: strip non-digits, require 11 digits, reject
/// all-equal sequences, and check both weighted mod-11 check digits.
pub fn validate_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 {
        return false;
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    // Check digit over the first `n` digits, weights n+1 down to 2,
    // remainders 10 and 11 mapping to 0.
    let check_digit = |n: usize| -> u32 {
        let sum: u32 = digits[..n]
            .iter()
            .enumerate()
            .map(|(i, &d)| d * (n as u32 + 1 - i as u32))
            .sum();
        match 11 - (sum % 11) {
            10 | 11 => 0,
            r => r,
        }
    };

    check_digit(9) == digits[9] && check_digit(10) == digits[10]
}

/// Charset for the random part of payment codes (uppercase alphanumeric).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random suffix length. Eight base-36 symbols keep the collision
/// probability negligible even across tens of thousands of codes issued in
/// the same millisecond.
const PAYMENT_CODE_RANDOM_LEN: usize = 8;

/// Generate a unique payment code: `PAG-<unix-millis>-<8 random chars>`.
pub fn generate_payment_code() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..PAYMENT_CODE_RANDOM_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect();
    format!("PAG-{}-{}", Utc::now().timestamp_millis(), suffix)
}
