use std::time::Duration;

use anyhow::Context as _;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use revenda_core::serde::rfc3339_ms;

use crate::domain::repository::WebhookLogRepository;
use crate::domain::types::{Sale, WEBHOOK_TIMEOUT_MS, WEBHOOK_USER_AGENT, WebhookAttempt};
use crate::error::SalesServiceError;

/// Fixed payload shape of the outbound notification. The Portuguese field
/// names are the external contract of the downstream system and must not
/// change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedSaleNotification {
    pub codigo_pagamento: String,
    /// Always `"aprovado"` — only approved sales are notified.
    pub status: String,
    pub veiculo_id: String,
    pub cpf_comprador: String,
    pub valor_pago: Decimal,
    pub metodo_pagamento: String,
    pub data_transacao: String,
}

impl ApprovedSaleNotification {
    pub fn from_sale(sale: &Sale) -> Self {
        // A sale reaching this point always has an approval timestamp; fall
        // back to now for records approved before the column existed.
        let transacted_at = sale.approved_at.unwrap_or_else(Utc::now);
        Self {
            codigo_pagamento: sale.payment_code.clone(),
            status: "aprovado".to_owned(),
            veiculo_id: sale.vehicle_id.clone(),
            cpf_comprador: sale.buyer_cpf.clone(),
            valor_pago: sale.amount_paid,
            metodo_pagamento: sale.payment_method.as_str().to_owned(),
            data_transacao: rfc3339_ms(&transacted_at),
        }
    }
}

/// Delivers approved-sale notifications to the configured webhook endpoint
/// and records every attempt, successful or not, in the attempt log.
///
/// Performs no retry and mutates no sale state — retry budgeting and the
/// notified flag belong to the sweep that drives this engine.
pub struct WebhookNotifier<L: WebhookLogRepository> {
    client: reqwest::Client,
    url: String,
    logs: L,
}

impl<L: WebhookLogRepository> WebhookNotifier<L> {
    pub fn new(client: reqwest::Client, url: impl Into<String>, logs: L) -> Self {
        Self {
            client,
            url: url.into(),
            logs,
        }
    }

    /// POST the notification for one approved sale. Returns `Ok(true)` on a
    /// 2xx response, `Ok(false)` on any other response, timeout or transport
    /// failure. Exactly one attempt-log row is written before returning;
    /// only a failure to write that row surfaces as an error.
    pub async fn notify_approved_sale(&self, sale: &Sale) -> Result<bool, SalesServiceError> {
        let payload = ApprovedSaleNotification::from_sale(sale);
        let payload_json =
            serde_json::to_value(&payload).context("serialize webhook payload")?;

        let result = self
            .client
            .post(&self.url)
            .timeout(Duration::from_millis(WEBHOOK_TIMEOUT_MS))
            .header(reqwest::header::USER_AGENT, WEBHOOK_USER_AGENT)
            .json(&payload)
            .send()
            .await;

        let (status_code, response, success) = match result {
            Ok(resp) => {
                let status = resp.status().as_u16();
                let body = resp.text().await.unwrap_or_default();
                (i32::from(status), body, (200..300).contains(&status))
            }
            // No response at all: status 0, message distinguishes timeout
            // from other transport failures.
            Err(e) if e.is_timeout() => (0, format!("timeout after {WEBHOOK_TIMEOUT_MS}ms"), false),
            Err(e) => (0, format!("network failure: {e}"), false),
        };

        if success {
            tracing::info!(sale_id = %sale.id, status_code, "webhook delivered");
        } else {
            tracing::warn!(sale_id = %sale.id, status_code, "webhook delivery failed");
        }

        self.logs
            .insert(&WebhookAttempt {
                id: Uuid::new_v4(),
                sale_id: sale.id,
                url: self.url.clone(),
                payload: payload_json,
                status_code,
                response: Some(response),
                attempted_at: Utc::now(),
                success,
            })
            .await?;

        Ok(success)
    }
}
