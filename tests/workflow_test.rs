//! End-to-end tests for the request reconciliation workflow

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use salon_ops::cache::ReadCache;
use salon_ops::error::{Result as StoreResult, SalonOpsError};
use salon_ops::matching::ScheduleSource;
use salon_ops::models::{NewClient, NewRequest, NewService, RequestStatus};
use salon_ops::repository::{
    AppointmentRepo, ClientRepo, RequestRepo, ServiceRepo, SheetDb,
};
use salon_ops::store::{CellRange, Row, TableHandle, TabularStore};
use salon_ops::workflow::{RequestWorkflow, ServiceResolution};
use salon_ops::MemoryStore;
use tempfile::TempDir;

fn build_db(store: Arc<dyn TabularStore>) -> (Arc<SheetDb>, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache =
        ReadCache::open(&dir.path().join("cache"), Duration::from_secs(60)).expect("open cache");
    (Arc::new(SheetDb::new(store, cache)), dir)
}

fn test_db() -> (Arc<SheetDb>, TempDir) {
    build_db(Arc::new(MemoryStore::new()))
}

fn request(name: &str, phone: &str, service: &str, preference: &str) -> NewRequest {
    NewRequest {
        name: name.to_string(),
        phone: Some(phone.to_string()),
        email: None,
        requested_service: service.to_string(),
        time_preference: preference.to_string(),
        message: String::new(),
    }
}

async fn seed_manicure(db: &Arc<SheetDb>) -> i64 {
    ServiceRepo::new(db.clone())
        .insert(&NewService {
            name: "Manicura".to_string(),
            category_id: 3,
            price: 25.0,
            duration_minutes: 45,
            supply_cost: 3.0,
            description: String::new(),
        })
        .await
        .expect("seed service")
}

#[tokio::test]
async fn test_confirm_creates_client_appointment_and_flips_status() {
    let (db, _dir) = test_db();
    let service_id = seed_manicure(&db).await;
    let requests = RequestRepo::new(db.clone());

    let request_id = requests
        .submit(&request("Ana Ruiz", "600111222", "Manicura", "2025-04-01 a las 11:00"))
        .await
        .expect("submit");

    let confirmation = RequestWorkflow::new(db.clone())
        .confirm(request_id, "confirmada por WhatsApp")
        .await
        .expect("confirm");

    // exactly one client, created from the request
    let clients = ClientRepo::new(db.clone()).list().await.expect("clients");
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].name, "Ana Ruiz");
    assert_eq!(clients[0].phone.as_deref(), Some("600111222"));
    assert_eq!(clients[0].channel, "Web");
    assert!(clients[0].notes.contains(&format!("#{request_id}")));

    // exactly one appointment linking client and service at the parsed slot
    let appointments = AppointmentRepo::new(db.clone()).list(None).await.expect("appointments");
    assert_eq!(appointments.len(), 1);
    let appointment = &appointments[0];
    assert_eq!(appointment.date.to_string(), "2025-04-01");
    assert_eq!(appointment.time, "11:00");
    assert_eq!(appointment.client_id, clients[0].id);
    assert_eq!(appointment.service_id, service_id);
    assert_eq!(appointment.price_charged, 25.0);
    assert_eq!(appointment.tip, 0.0);
    assert_eq!(appointment.channel, "Web");
    assert_eq!(appointment.payment_method, "Pendiente");
    assert!(appointment.notes.contains(&format!("#{request_id}")));

    // request is terminal with a response timestamp and the admin note
    let stored = requests.get(request_id).await.expect("get").expect("present");
    assert_eq!(stored.status, RequestStatus::Confirmed);
    assert!(stored.responded_at.is_some());
    assert!(!stored.requested_at.is_empty());
    assert_eq!(stored.admin_notes, "confirmada por WhatsApp");

    // payload describes what happened
    assert_eq!(confirmation.client_id, clients[0].id);
    assert_eq!(confirmation.service_name, "Manicura");
    assert!(confirmation.client_was_new);
    assert_eq!(confirmation.service_resolution, ServiceResolution::Exact);
    assert_eq!(confirmation.schedule_source, ScheduleSource::Parsed);
}

#[tokio::test]
async fn test_confirm_reuses_existing_client_by_phone_digits() {
    let (db, _dir) = test_db();
    seed_manicure(&db).await;
    let clients = ClientRepo::new(db.clone());
    let existing = clients
        .insert(&NewClient {
            name: "Ana R.".to_string(),
            phone: Some("612345678".to_string()),
            email: None,
            channel: "Booksy".to_string(),
            notes: String::new(),
        })
        .await
        .expect("insert client");

    let request_id = RequestRepo::new(db.clone())
        .submit(&request("Ana Ruiz", "+34 612-345-678", "Manicura", ""))
        .await
        .expect("submit");

    let confirmation = RequestWorkflow::new(db.clone())
        .confirm(request_id, "")
        .await
        .expect("confirm");

    assert_eq!(confirmation.client_id, existing);
    assert!(!confirmation.client_was_new);
    // no duplicate client row was created
    assert_eq!(clients.list().await.expect("clients").len(), 1);
}

#[tokio::test]
async fn test_confirm_without_schedule_defaults_to_today_at_ten() {
    let (db, _dir) = test_db();
    seed_manicure(&db).await;
    let request_id = RequestRepo::new(db.clone())
        .submit(&request("Bea", "600999888", "Manicura", "cuando podáis"))
        .await
        .expect("submit");

    let confirmation = RequestWorkflow::new(db.clone())
        .confirm(request_id, "")
        .await
        .expect("confirm");

    assert_eq!(confirmation.schedule_source, ScheduleSource::Fallback);
    assert_eq!(confirmation.date, chrono::Local::now().date_naive());
    assert_eq!(confirmation.time, "10:00");
}

#[tokio::test]
async fn test_confirm_with_no_services_creates_placeholder() {
    let (db, _dir) = test_db();
    let request_id = RequestRepo::new(db.clone())
        .submit(&request("Carla", "611222333", "Peinado de fiesta", ""))
        .await
        .expect("submit");

    let confirmation = RequestWorkflow::new(db.clone())
        .confirm(request_id, "")
        .await
        .expect("confirm");

    assert_eq!(confirmation.service_resolution, ServiceResolution::AutoCreated);
    assert_eq!(confirmation.service_name, "Peinado de fiesta");

    let services = ServiceRepo::new(db.clone()).list_active().await.expect("services");
    assert_eq!(services.len(), 1);
    let placeholder = &services[0];
    assert_eq!(placeholder.name, "Peinado de fiesta");
    assert_eq!(placeholder.price, 50.0);
    assert_eq!(placeholder.duration_minutes, 60);
    assert_eq!(placeholder.supply_cost, 5.0);
    // lands in the seeded "Otros" category
    assert_eq!(placeholder.category_name.as_deref(), Some("Otros"));

    let appointments = AppointmentRepo::new(db.clone()).list(None).await.expect("appointments");
    assert_eq!(appointments[0].price_charged, 50.0);
}

#[tokio::test]
async fn test_reject_has_no_side_effects() {
    let (db, _dir) = test_db();
    seed_manicure(&db).await;
    let requests = RequestRepo::new(db.clone());
    let request_id = requests
        .submit(&request("Ana", "600111222", "Manicura", ""))
        .await
        .expect("submit");

    RequestWorkflow::new(db.clone())
        .reject(request_id, "sin hueco esta semana")
        .await
        .expect("reject");

    let stored = requests.get(request_id).await.expect("get").expect("present");
    assert_eq!(stored.status, RequestStatus::Rejected);
    assert!(stored.responded_at.is_some());
    assert_eq!(stored.admin_notes, "sin hueco esta semana");

    assert!(ClientRepo::new(db.clone()).list().await.expect("clients").is_empty());
    assert!(AppointmentRepo::new(db.clone()).list(None).await.expect("appointments").is_empty());
}

#[tokio::test]
async fn test_terminal_requests_cannot_transition_again() {
    let (db, _dir) = test_db();
    seed_manicure(&db).await;
    let requests = RequestRepo::new(db.clone());
    let workflow = RequestWorkflow::new(db.clone());

    let request_id = requests
        .submit(&request("Ana", "600111222", "Manicura", ""))
        .await
        .expect("submit");
    workflow.confirm(request_id, "").await.expect("confirm");

    assert!(workflow.confirm(request_id, "").await.is_err());
    assert!(workflow.reject(request_id, "").await.is_err());

    // still exactly one appointment from the first confirm
    let appointments = AppointmentRepo::new(db.clone()).list(None).await.expect("appointments");
    assert_eq!(appointments.len(), 1);
}

/// Store wrapper that fails every append to one table, to exercise the
/// partial-failure ordering of the confirm workflow.
struct FailingStore {
    inner: MemoryStore,
    fail_appends_to: &'static str,
}

#[async_trait]
impl TabularStore for FailingStore {
    async fn get_or_create_table(&self, name: &str, header: &[&str]) -> StoreResult<TableHandle> {
        self.inner.get_or_create_table(name, header).await
    }

    async fn read_all(&self, table: &TableHandle) -> StoreResult<Vec<Row>> {
        self.inner.read_all(table).await
    }

    async fn append(&self, table: &TableHandle, values: &[String]) -> StoreResult<()> {
        if table.name == self.fail_appends_to {
            return Err(SalonOpsError::Store("injected append failure".to_string()));
        }
        self.inner.append(table, values).await
    }

    async fn update_range(
        &self,
        table: &TableHandle,
        range: &CellRange,
        values: &[String],
    ) -> StoreResult<()> {
        self.inner.update_range(table, range, values).await
    }

    async fn delete_row(&self, table: &TableHandle, row_index: usize) -> StoreResult<()> {
        self.inner.delete_row(table, row_index).await
    }
}

#[tokio::test]
async fn test_failed_appointment_insert_leaves_request_pending() {
    let store = Arc::new(FailingStore {
        inner: MemoryStore::new(),
        fail_appends_to: "citas",
    });
    let (db, _dir) = build_db(store);
    seed_manicure(&db).await;
    let requests = RequestRepo::new(db.clone());
    let request_id = requests
        .submit(&request("Ana", "600111222", "Manicura", "2025-04-01 a las 11:00"))
        .await
        .expect("submit");

    let result = RequestWorkflow::new(db.clone()).confirm(request_id, "").await;
    assert!(result.is_err());

    // the request was never marked confirmed; the already-committed client
    // row stays behind as an inspectable orphan
    let stored = requests.get(request_id).await.expect("get").expect("present");
    assert_eq!(stored.status, RequestStatus::Pending);
    assert!(stored.responded_at.is_none());
    assert_eq!(ClientRepo::new(db.clone()).list().await.expect("clients").len(), 1);
}
