use std::time::Duration;

use axum::http::StatusCode;

use revenda_sales::domain::types::{
    ApprovalPolicy, PaymentMethod, PaymentOutcome, SaleStatus,
};
use revenda_sales::error::SalesServiceError;
use revenda_sales::usecase::payment::ResolvePaymentUseCase;
use revenda_sales::usecase::sale::{CreateSaleInput, CreateSaleUseCase};
use revenda_sales::usecase::sweep::{ReconciliationSweep, WebhookSweep};
use revenda_sales::usecase::webhook::WebhookNotifier;

use crate::helpers::{
    MemSaleStore, MemWebhookLog, MockCatalog, VALID_CPF, webhook_receiver,
};

fn create_input(vehicle_id: &str, amount: &str) -> CreateSaleInput {
    CreateSaleInput {
        vehicle_id: vehicle_id.to_owned(),
        buyer_cpf: VALID_CPF.to_owned(),
        amount_paid: amount.parse().unwrap(),
        payment_method: PaymentMethod::Pix,
    }
}

#[tokio::test]
async fn should_track_a_sale_from_creation_to_webhook_delivery() {
    let store = MemSaleStore::new();
    let logs = MemWebhookLog::new();
    let log_handle = logs.handle();
    let (url, received) = webhook_receiver(StatusCode::OK).await;

    // 1. Create: vehicle priced 85000.00, paid exactly.
    let create = CreateSaleUseCase {
        sales: store.clone(),
        vehicles: MockCatalog::single_for_sale("veh-1", "85000.00"),
    };
    let sale = create.execute(create_input("veh-1", "85000.00")).await.unwrap();
    assert_eq!(sale.status, SaleStatus::Pending);
    assert!(!sale.payment_code.is_empty());

    // 2. Payment provider approves via the payment code.
    let resolve = ResolvePaymentUseCase {
        sales: store.clone(),
    };
    let approved = resolve
        .execute(&sale.payment_code, PaymentOutcome::Approved)
        .await
        .unwrap();
    assert_eq!(approved.status, SaleStatus::Approved);
    assert!(approved.approved_at.is_some());

    // 3. The next sweep delivers the webhook and marks the sale.
    let mut sweep = ReconciliationSweep::new(
        store.clone(),
        ApprovalPolicy::RequireConfirmation,
        WebhookNotifier::new(reqwest::Client::new(), url, logs),
    );
    sweep.webhooks.pacing = Duration::ZERO;
    let report = sweep.run_once().await.unwrap();
    assert_eq!(report.approved, 0);
    assert_eq!(report.delivered, 1);

    let refreshed = store.get(sale.id);
    assert!(refreshed.webhook_notified);
    assert_eq!(refreshed.webhook_attempts, 1);

    // The receiver saw the contract payload.
    let payloads = received.lock().unwrap();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0]["codigoPagamento"], sale.payment_code.as_str());
    assert_eq!(payloads[0]["status"], "aprovado");
    assert_eq!(payloads[0]["veiculoId"], "veh-1");
    assert_eq!(payloads[0]["cpfComprador"], VALID_CPF);
    assert_eq!(payloads[0]["metodoPagamento"], "pix");

    // One successful attempt row.
    let attempts = log_handle.lock().unwrap();
    assert_eq!(attempts.len(), 1);
    assert!(attempts[0].success);
    assert_eq!(attempts[0].status_code, 200);
}

#[tokio::test]
async fn should_reject_payment_and_never_deliver_a_webhook() {
    let store = MemSaleStore::new();
    let (url, received) = webhook_receiver(StatusCode::OK).await;

    let create = CreateSaleUseCase {
        sales: store.clone(),
        vehicles: MockCatalog::single_for_sale("veh-1", "85000.00"),
    };
    let sale = create.execute(create_input("veh-1", "85000.00")).await.unwrap();

    let resolve = ResolvePaymentUseCase {
        sales: store.clone(),
    };
    let rejected = resolve
        .execute(&sale.payment_code, PaymentOutcome::Rejected)
        .await
        .unwrap();
    assert_eq!(rejected.status, SaleStatus::Rejected);
    assert!(rejected.approved_at.is_none());

    let sweep = WebhookSweep {
        sales: store.clone(),
        notifier: WebhookNotifier::new(reqwest::Client::new(), url, MemWebhookLog::new()),
        pacing: Duration::ZERO,
    };
    assert_eq!(sweep.execute().await.unwrap(), 0);
    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_callback_is_rejected_after_resolution() {
    let store = MemSaleStore::new();
    let create = CreateSaleUseCase {
        sales: store.clone(),
        vehicles: MockCatalog::single_for_sale("veh-1", "85000.00"),
    };
    let sale = create.execute(create_input("veh-1", "85000.00")).await.unwrap();

    let resolve = ResolvePaymentUseCase {
        sales: store.clone(),
    };
    resolve
        .execute(&sale.payment_code, PaymentOutcome::Approved)
        .await
        .unwrap();

    let second = resolve
        .execute(&sale.payment_code, PaymentOutcome::Approved)
        .await;
    assert!(matches!(second, Err(SalesServiceError::AlreadyProcessed)));
}

#[tokio::test]
async fn approved_vehicle_cannot_be_sold_twice() {
    let store = MemSaleStore::new();
    let create = CreateSaleUseCase {
        sales: store.clone(),
        vehicles: MockCatalog::single_for_sale("veh-1", "85000.00"),
    };

    let first = create.execute(create_input("veh-1", "85000.00")).await.unwrap();
    let resolve = ResolvePaymentUseCase {
        sales: store.clone(),
    };
    resolve
        .execute(&first.payment_code, PaymentOutcome::Approved)
        .await
        .unwrap();

    let second = create.execute(create_input("veh-1", "85000.00")).await;
    assert!(matches!(second, Err(SalesServiceError::VehicleAlreadySold)));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn auto_approval_sweep_feeds_the_webhook_sweep() {
    let store = MemSaleStore::new();
    let (url, received) = webhook_receiver(StatusCode::OK).await;

    let create = CreateSaleUseCase {
        sales: store.clone(),
        vehicles: MockCatalog::single_for_sale("veh-1", "85000.00"),
    };
    let sale = create.execute(create_input("veh-1", "85000.00")).await.unwrap();

    // With the demo policy a single pass approves and notifies.
    let mut sweep = ReconciliationSweep::new(
        store.clone(),
        ApprovalPolicy::AutoApprove,
        WebhookNotifier::new(reqwest::Client::new(), url, MemWebhookLog::new()),
    );
    sweep.webhooks.pacing = Duration::ZERO;
    let report = sweep.run_once().await.unwrap();
    assert_eq!(report.approved, 1);
    assert_eq!(report.delivered, 1);

    let refreshed = store.get(sale.id);
    assert_eq!(refreshed.status, SaleStatus::Approved);
    assert!(refreshed.webhook_notified);
    assert_eq!(received.lock().unwrap().len(), 1);
}
