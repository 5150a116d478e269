//! Entity repositories over the tabular store
//!
//! Each repository wraps one table behind [`SheetDb`], a small facade that
//! funnels every read through the TTL cache and invalidates it on every
//! write. Reads filter to active rows where the entity has an `activo`
//! flag, left-join referenced names in memory, and tolerate dangling
//! references by leaving the joined field absent. Writes compute the next
//! id as `max(existing) + 1`, append a fully-populated row, and never reuse
//! ids.
//!
//! Multi-step operations here are not atomic; the store offers no
//! transactions, and partially-applied writes are an accepted state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::cache::ReadCache;
use crate::metrics::OpsMetrics;
use crate::models::{
    Appointment, BookingRequest, Category, Client, DateRange, FixedExpense, Frequency,
    NewAppointment, NewClient, NewFixedExpense, NewRequest, NewService, NewVariableExpense,
    RequestStatus, Service, VariableExpense,
};
use crate::schema::{
    categorias, citas, clientes, gastos_fijos, gastos_variables, servicios, solicitudes,
};
use crate::store::{CellRange, Row, TableHandle, TabularStore};
use crate::utils::{now_iso, today_iso};

/// Categories seeded when the table is empty on first access.
const DEFAULT_CATEGORIES: [(i64, &str, &str); 4] = [
    (1, "Pestañas", "Extensiones y tratamientos de pestañas"),
    (2, "Cejas", "Diseño, laminado y micropigmentación"),
    (3, "Uñas", "Manicura y pedicura"),
    (4, "Otros", "Otros servicios"),
];

/// Shared data-access facade: one store, one read cache, one metrics
/// registry. All repositories clone an `Arc<SheetDb>`.
pub struct SheetDb {
    store: Arc<dyn TabularStore>,
    cache: ReadCache,
    metrics: OpsMetrics,
}

impl SheetDb {
    /// Wire a store backend to its read cache.
    #[must_use]
    pub fn new(store: Arc<dyn TabularStore>, cache: ReadCache) -> Self {
        Self { store, cache, metrics: OpsMetrics::default() }
    }

    async fn table(&self, name: &str, header: &[&str]) -> Result<TableHandle> {
        Ok(self.store.get_or_create_table(name, header).await?)
    }

    /// All data rows of a table, served from cache when fresh.
    async fn rows(&self, name: &str, header: &[&str]) -> Result<Vec<Row>> {
        if let Some(rows) = self.cache.get(name)? {
            self.metrics.record_cache_hit(name);
            return Ok(rows);
        }
        let handle = self.table(name, header).await?;
        let started = Instant::now();
        let rows = self.store.read_all(&handle).await.inspect_err(|_| {
            self.metrics.record_error("store");
        })?;
        self.metrics.record_store_read(name, started.elapsed());
        self.cache.put(name, &rows)?;
        Ok(rows)
    }

    async fn append(&self, name: &str, header: &[&str], values: Vec<String>) -> Result<()> {
        let handle = self.table(name, header).await?;
        self.store.append(&handle, &values).await.inspect_err(|_| {
            self.metrics.record_error("store");
        })?;
        self.metrics.record_store_write("append", name);
        self.cache.invalidate_all()?;
        Ok(())
    }

    /// Overwrite the span `first_col..=last_col` of one physical row.
    async fn update_cols(
        &self,
        name: &str,
        header: &[&str],
        row: usize,
        first_col: &str,
        last_col: &str,
        values: Vec<String>,
    ) -> Result<()> {
        let handle = self.table(name, header).await?;
        let start = handle
            .col(first_col)
            .with_context(|| format!("table {name} has no column {first_col}"))?;
        let end = handle
            .col(last_col)
            .with_context(|| format!("table {name} has no column {last_col}"))?;
        let range = CellRange::span(row, start, end);
        self.store.update_range(&handle, &range, &values).await.inspect_err(|_| {
            self.metrics.record_error("store");
        })?;
        self.metrics.record_store_write("update", name);
        self.cache.invalidate_all()?;
        Ok(())
    }

    async fn delete_row(&self, name: &str, header: &[&str], row: usize) -> Result<()> {
        let handle = self.table(name, header).await?;
        self.store.delete_row(&handle, row).await.inspect_err(|_| {
            self.metrics.record_error("store");
        })?;
        self.metrics.record_store_write("delete", name);
        self.cache.invalidate_all()?;
        Ok(())
    }

    /// Next id for a table: `max(existing ids) + 1`, 1 when empty. Ids are
    /// never reused after a delete because the maximum only grows.
    async fn next_id(&self, name: &str, header: &[&str]) -> Result<i64> {
        let rows = self.rows(name, header).await?;
        Ok(rows.iter().filter_map(|r| r.int("id")).max().unwrap_or(0) + 1)
    }

    /// Physical row index (header = row 1) of the data row with this id.
    async fn find_row_by_id(&self, name: &str, header: &[&str], id: i64) -> Result<Option<usize>> {
        let rows = self.rows(name, header).await?;
        Ok(rows
            .iter()
            .position(|r| r.int("id") == Some(id))
            .map(|pos| pos + 2))
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Repository for the seeded service categories (read-only reference data).
#[derive(Clone)]
pub struct CategoryRepo {
    db: Arc<SheetDb>,
}

fn category_from_row(row: &Row) -> Category {
    Category {
        id: row.int(categorias::ID).unwrap_or(0),
        name: row.text(categorias::NOMBRE),
        description: row.text(categorias::DESCRIPCION),
    }
}

impl CategoryRepo {
    /// Create the repository.
    #[must_use]
    pub fn new(db: Arc<SheetDb>) -> Self {
        Self { db }
    }

    /// All categories, seeding the four defaults when the table is empty.
    pub async fn list(&self) -> Result<Vec<Category>> {
        let mut rows = self.db.rows(categorias::TABLE, &categorias::HEADERS).await?;
        if rows.is_empty() {
            debug!("seeding default categories");
            for (id, name, description) in DEFAULT_CATEGORIES {
                self.db
                    .append(
                        categorias::TABLE,
                        &categorias::HEADERS,
                        vec![id.to_string(), name.to_string(), description.to_string(), now_iso()],
                    )
                    .await?;
            }
            rows = self.db.rows(categorias::TABLE, &categorias::HEADERS).await?;
        }
        Ok(rows.iter().map(category_from_row).collect())
    }

    /// One category by id.
    pub async fn get(&self, id: i64) -> Result<Option<Category>> {
        Ok(self.list().await?.into_iter().find(|c| c.id == id))
    }
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// Repository for the services on offer.
#[derive(Clone)]
pub struct ServiceRepo {
    db: Arc<SheetDb>,
    categories: CategoryRepo,
}

fn service_from_row(row: &Row, category_names: &HashMap<i64, String>) -> Service {
    let category_id = row.int(servicios::CATEGORIA_ID).unwrap_or(0);
    Service {
        id: row.int(servicios::ID).unwrap_or(0),
        name: row.text(servicios::NOMBRE),
        category_id,
        price: row.float(servicios::PRECIO).unwrap_or(0.0),
        duration_minutes: row.int(servicios::DURACION_MINUTOS).unwrap_or(0),
        supply_cost: row.float(servicios::COSTO_INSUMOS).unwrap_or(0.0),
        active: row.int(servicios::ACTIVO) == Some(1),
        description: row.text(servicios::DESCRIPCION),
        category_name: category_names.get(&category_id).cloned(),
    }
}

fn service_write_values(new: &NewService) -> Vec<String> {
    vec![
        new.name.clone(),
        new.category_id.to_string(),
        new.price.to_string(),
        new.duration_minutes.to_string(),
        new.supply_cost.to_string(),
        // updates re-assert the active flag, exactly like inserts
        "1".to_string(),
        new.description.clone(),
    ]
}

impl ServiceRepo {
    /// Create the repository.
    #[must_use]
    pub fn new(db: Arc<SheetDb>) -> Self {
        let categories = CategoryRepo::new(db.clone());
        Self { db, categories }
    }

    /// Active services with their category names joined in. A dangling
    /// `categoria_id` leaves `category_name` absent.
    pub async fn list_active(&self) -> Result<Vec<Service>> {
        let rows = self.db.rows(servicios::TABLE, &servicios::HEADERS).await?;
        let category_names: HashMap<i64, String> = self
            .categories
            .list()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        Ok(rows
            .iter()
            .filter(|r| r.int(servicios::ACTIVO) == Some(1))
            .map(|r| service_from_row(r, &category_names))
            .collect())
    }

    /// One service by id, active or not.
    pub async fn get(&self, id: i64) -> Result<Option<Service>> {
        let rows = self.db.rows(servicios::TABLE, &servicios::HEADERS).await?;
        let category_names: HashMap<i64, String> = self
            .categories
            .list()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        Ok(rows
            .iter()
            .find(|r| r.int(servicios::ID) == Some(id))
            .map(|r| service_from_row(r, &category_names)))
    }

    /// Insert an active service and return its id.
    pub async fn insert(&self, new: &NewService) -> Result<i64> {
        let id = self.db.next_id(servicios::TABLE, &servicios::HEADERS).await?;
        let mut values = vec![id.to_string()];
        values.extend(service_write_values(new));
        values.push(now_iso());
        self.db.append(servicios::TABLE, &servicios::HEADERS, values).await?;
        debug!(service_id = id, name = %new.name, "inserted service");
        Ok(id)
    }

    /// Overwrite the editable columns of a service (name through
    /// description), leaving id and created_at untouched.
    pub async fn update(&self, id: i64, new: &NewService) -> Result<()> {
        let row = self
            .db
            .find_row_by_id(servicios::TABLE, &servicios::HEADERS, id)
            .await?
            .with_context(|| format!("service {id} not found"))?;
        self.db
            .update_cols(
                servicios::TABLE,
                &servicios::HEADERS,
                row,
                servicios::NOMBRE,
                servicios::DESCRIPCION,
                service_write_values(new),
            )
            .await
    }

    /// Flip the active flag to 0. Idempotent; a missing id is a no-op, and
    /// the row is never physically removed.
    pub async fn soft_delete(&self, id: i64) -> Result<()> {
        match self
            .db
            .find_row_by_id(servicios::TABLE, &servicios::HEADERS, id)
            .await?
        {
            Some(row) => {
                self.db
                    .update_cols(
                        servicios::TABLE,
                        &servicios::HEADERS,
                        row,
                        servicios::ACTIVO,
                        servicios::ACTIVO,
                        vec!["0".to_string()],
                    )
                    .await
            }
            None => {
                warn!(service_id = id, "soft delete of unknown service ignored");
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

/// Outcome of a client delete attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientDelete {
    /// Row removed
    Deleted,
    /// Refused: appointments still reference the client
    Blocked {
        /// Number of referencing appointments
        appointments: usize,
    },
}

/// Repository for clients.
#[derive(Clone)]
pub struct ClientRepo {
    db: Arc<SheetDb>,
}

fn client_from_row(row: &Row) -> Client {
    Client {
        id: row.int(clientes::ID).unwrap_or(0),
        name: row.text(clientes::NOMBRE),
        phone: row.opt_text(clientes::TELEFONO),
        email: row.opt_text(clientes::EMAIL),
        first_visit: row.text(clientes::FECHA_PRIMERA_VISITA),
        channel: row.text(clientes::CANAL_ADQUISICION),
        notes: row.text(clientes::NOTAS),
    }
}

impl ClientRepo {
    /// Create the repository.
    #[must_use]
    pub fn new(db: Arc<SheetDb>) -> Self {
        Self { db }
    }

    /// All clients in store order.
    pub async fn list(&self) -> Result<Vec<Client>> {
        let rows = self.db.rows(clientes::TABLE, &clientes::HEADERS).await?;
        Ok(rows.iter().map(client_from_row).collect())
    }

    /// One client by id.
    pub async fn get(&self, id: i64) -> Result<Option<Client>> {
        Ok(self.list().await?.into_iter().find(|c| c.id == id))
    }

    /// Insert a client, stamping today as the first visit, and return the id.
    pub async fn insert(&self, new: &NewClient) -> Result<i64> {
        let id = self.db.next_id(clientes::TABLE, &clientes::HEADERS).await?;
        self.db
            .append(
                clientes::TABLE,
                &clientes::HEADERS,
                vec![
                    id.to_string(),
                    new.name.clone(),
                    new.phone.clone().unwrap_or_default(),
                    new.email.clone().unwrap_or_default(),
                    today_iso(),
                    new.channel.clone(),
                    new.notes.clone(),
                    now_iso(),
                ],
            )
            .await?;
        debug!(client_id = id, name = %new.name, "inserted client");
        Ok(id)
    }

    /// Overwrite the editable columns of a client, preserving the recorded
    /// first-visit date.
    pub async fn update(&self, id: i64, new: &NewClient) -> Result<()> {
        let existing = self
            .get(id)
            .await?
            .with_context(|| format!("client {id} not found"))?;
        let row = self
            .db
            .find_row_by_id(clientes::TABLE, &clientes::HEADERS, id)
            .await?
            .with_context(|| format!("client {id} not found"))?;
        self.db
            .update_cols(
                clientes::TABLE,
                &clientes::HEADERS,
                row,
                clientes::NOMBRE,
                clientes::NOTAS,
                vec![
                    new.name.clone(),
                    new.phone.clone().unwrap_or_default(),
                    new.email.clone().unwrap_or_default(),
                    existing.first_visit,
                    new.channel.clone(),
                    new.notes.clone(),
                ],
            )
            .await
    }

    /// Delete a client unless any appointment references it. The refusal
    /// carries the number of blocking appointments; nothing is partially
    /// deleted.
    pub async fn delete(&self, id: i64) -> Result<ClientDelete> {
        let appointments = self.db.rows(citas::TABLE, &citas::HEADERS).await?;
        let blocking = appointments
            .iter()
            .filter(|r| r.int(citas::CLIENTE_ID) == Some(id))
            .count();
        if blocking > 0 {
            debug!(client_id = id, blocking, "client delete refused");
            return Ok(ClientDelete::Blocked { appointments: blocking });
        }
        if let Some(row) = self
            .db
            .find_row_by_id(clientes::TABLE, &clientes::HEADERS, id)
            .await?
        {
            self.db.delete_row(clientes::TABLE, &clientes::HEADERS, row).await?;
        }
        Ok(ClientDelete::Deleted)
    }

    /// Dedup lookup: phone digits first (tolerating a leading country
    /// code on either side), then lowercased email. Blank values never
    /// match, and the first matching client in store order wins.
    pub async fn find_existing(
        &self,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<i64>> {
        use crate::validation::{normalize_email, phones_match};

        let clients = self.list().await?;

        if let Some(phone) = phone {
            if let Some(client) = clients.iter().find(|c| {
                c.phone
                    .as_deref()
                    .is_some_and(|stored| phones_match(stored, phone))
            }) {
                return Ok(Some(client.id));
            }
        }

        if let Some(email) = email {
            let wanted = normalize_email(email);
            if !wanted.is_empty() {
                if let Some(client) = clients.iter().find(|c| {
                    c.email
                        .as_deref()
                        .map(normalize_email)
                        .is_some_and(|normalized| normalized == wanted)
                }) {
                    return Ok(Some(client.id));
                }
            }
        }

        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Appointments
// ---------------------------------------------------------------------------

/// Repository for appointments, the busiest join in the system.
#[derive(Clone)]
pub struct AppointmentRepo {
    db: Arc<SheetDb>,
    clients: ClientRepo,
    services: ServiceRepo,
}

impl AppointmentRepo {
    /// Create the repository.
    #[must_use]
    pub fn new(db: Arc<SheetDb>) -> Self {
        let clients = ClientRepo::new(db.clone());
        let services = ServiceRepo::new(db.clone());
        Self { db, clients, services }
    }

    /// Appointments, optionally filtered to an inclusive date range, with
    /// client/service/category names joined in and sorted newest-first.
    ///
    /// Joins run against the *active* service list, so an appointment for a
    /// soft-deleted service keeps its ids but loses its display names.
    /// Rows with unparseable dates are logged and skipped.
    pub async fn list(&self, range: Option<&DateRange>) -> Result<Vec<Appointment>> {
        let rows = self.db.rows(citas::TABLE, &citas::HEADERS).await?;
        let client_names: HashMap<i64, String> = self
            .clients
            .list()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        let services: HashMap<i64, Service> = self
            .services
            .list_active()
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let mut appointments = Vec::with_capacity(rows.len());
        for row in &rows {
            let raw_date = row.text(citas::FECHA);
            let Ok(date) = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d") else {
                warn!(
                    appointment_id = row.int(citas::ID).unwrap_or(0),
                    date = %raw_date,
                    "skipping appointment with unparseable date"
                );
                continue;
            };
            if let Some(range) = range {
                if !range.contains(date) {
                    continue;
                }
            }
            let client_id = row.int(citas::CLIENTE_ID).unwrap_or(0);
            let service_id = row.int(citas::SERVICIO_ID).unwrap_or(0);
            let service = services.get(&service_id);
            appointments.push(Appointment {
                id: row.int(citas::ID).unwrap_or(0),
                date,
                time: row.text(citas::HORA),
                client_id,
                service_id,
                price_charged: row.float(citas::PRECIO_COBRADO).unwrap_or(0.0),
                tip: row.float(citas::PROPINA).unwrap_or(0.0),
                channel: row.text(citas::CANAL_ORIGEN),
                payment_method: row.text(citas::METODO_PAGO),
                notes: row.text(citas::NOTAS),
                client_name: client_names.get(&client_id).cloned(),
                service_name: service.map(|s| s.name.clone()),
                category_name: service.and_then(|s| s.category_name.clone()),
                supply_cost: service.map(|s| s.supply_cost),
            });
        }

        appointments.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(appointments)
    }

    /// One appointment by id, with joins.
    pub async fn get(&self, id: i64) -> Result<Option<Appointment>> {
        Ok(self.list(None).await?.into_iter().find(|a| a.id == id))
    }

    /// Insert an appointment and return its id.
    pub async fn insert(&self, new: &NewAppointment) -> Result<i64> {
        let id = self.db.next_id(citas::TABLE, &citas::HEADERS).await?;
        self.db
            .append(
                citas::TABLE,
                &citas::HEADERS,
                vec![
                    id.to_string(),
                    new.date.format("%Y-%m-%d").to_string(),
                    new.time.clone(),
                    new.client_id.to_string(),
                    new.service_id.to_string(),
                    new.price_charged.to_string(),
                    new.tip.to_string(),
                    new.channel.clone(),
                    new.payment_method.clone(),
                    new.notes.clone(),
                    now_iso(),
                ],
            )
            .await?;
        debug!(appointment_id = id, client_id = new.client_id, "inserted appointment");
        Ok(id)
    }

    /// Hard-delete an appointment; a missing id is a no-op.
    pub async fn delete(&self, id: i64) -> Result<()> {
        match self.db.find_row_by_id(citas::TABLE, &citas::HEADERS, id).await? {
            Some(row) => self.db.delete_row(citas::TABLE, &citas::HEADERS, row).await,
            None => {
                warn!(appointment_id = id, "delete of unknown appointment ignored");
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Fixed expenses
// ---------------------------------------------------------------------------

/// Repository for recurring expenses.
#[derive(Clone)]
pub struct FixedExpenseRepo {
    db: Arc<SheetDb>,
}

fn fixed_expense_from_row(row: &Row) -> FixedExpense {
    FixedExpense {
        id: row.int(gastos_fijos::ID).unwrap_or(0),
        concept: row.text(gastos_fijos::CONCEPTO),
        amount: row.float(gastos_fijos::MONTO).unwrap_or(0.0),
        frequency: Frequency::from_wire(&row.text(gastos_fijos::FRECUENCIA)),
        active: row.int(gastos_fijos::ACTIVO) == Some(1),
        notes: row.text(gastos_fijos::NOTAS),
    }
}

impl FixedExpenseRepo {
    /// Create the repository.
    #[must_use]
    pub fn new(db: Arc<SheetDb>) -> Self {
        Self { db }
    }

    /// Active fixed expenses in store order.
    pub async fn list_active(&self) -> Result<Vec<FixedExpense>> {
        let rows = self.db.rows(gastos_fijos::TABLE, &gastos_fijos::HEADERS).await?;
        Ok(rows
            .iter()
            .filter(|r| r.int(gastos_fijos::ACTIVO) == Some(1))
            .map(fixed_expense_from_row)
            .collect())
    }

    /// One fixed expense by id, active or not.
    pub async fn get(&self, id: i64) -> Result<Option<FixedExpense>> {
        let rows = self.db.rows(gastos_fijos::TABLE, &gastos_fijos::HEADERS).await?;
        Ok(rows
            .iter()
            .find(|r| r.int(gastos_fijos::ID) == Some(id))
            .map(fixed_expense_from_row))
    }

    /// Insert an active fixed expense and return its id.
    pub async fn insert(&self, new: &NewFixedExpense) -> Result<i64> {
        let id = self.db.next_id(gastos_fijos::TABLE, &gastos_fijos::HEADERS).await?;
        self.db
            .append(
                gastos_fijos::TABLE,
                &gastos_fijos::HEADERS,
                vec![
                    id.to_string(),
                    new.concept.clone(),
                    new.amount.to_string(),
                    new.frequency.as_str().to_string(),
                    "1".to_string(),
                    new.notes.clone(),
                    now_iso(),
                ],
            )
            .await?;
        Ok(id)
    }

    /// Overwrite the editable columns, re-asserting the active flag.
    pub async fn update(&self, id: i64, new: &NewFixedExpense) -> Result<()> {
        let row = self
            .db
            .find_row_by_id(gastos_fijos::TABLE, &gastos_fijos::HEADERS, id)
            .await?
            .with_context(|| format!("fixed expense {id} not found"))?;
        self.db
            .update_cols(
                gastos_fijos::TABLE,
                &gastos_fijos::HEADERS,
                row,
                gastos_fijos::CONCEPTO,
                gastos_fijos::NOTAS,
                vec![
                    new.concept.clone(),
                    new.amount.to_string(),
                    new.frequency.as_str().to_string(),
                    "1".to_string(),
                    new.notes.clone(),
                ],
            )
            .await
    }

    /// Flip the active flag to 0. Idempotent; missing ids are ignored.
    pub async fn soft_delete(&self, id: i64) -> Result<()> {
        match self
            .db
            .find_row_by_id(gastos_fijos::TABLE, &gastos_fijos::HEADERS, id)
            .await?
        {
            Some(row) => {
                self.db
                    .update_cols(
                        gastos_fijos::TABLE,
                        &gastos_fijos::HEADERS,
                        row,
                        gastos_fijos::ACTIVO,
                        gastos_fijos::ACTIVO,
                        vec!["0".to_string()],
                    )
                    .await
            }
            None => {
                warn!(expense_id = id, "soft delete of unknown fixed expense ignored");
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Variable expenses
// ---------------------------------------------------------------------------

/// Repository for one-off expenses.
#[derive(Clone)]
pub struct VariableExpenseRepo {
    db: Arc<SheetDb>,
}

impl VariableExpenseRepo {
    /// Create the repository.
    #[must_use]
    pub fn new(db: Arc<SheetDb>) -> Self {
        Self { db }
    }

    /// Variable expenses, optionally filtered to an inclusive date range.
    /// Rows with unparseable dates are logged and skipped.
    pub async fn list(&self, range: Option<&DateRange>) -> Result<Vec<VariableExpense>> {
        let rows = self
            .db
            .rows(gastos_variables::TABLE, &gastos_variables::HEADERS)
            .await?;
        let mut expenses = Vec::with_capacity(rows.len());
        for row in &rows {
            let raw_date = row.text(gastos_variables::FECHA);
            let Ok(date) = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d") else {
                warn!(
                    expense_id = row.int(gastos_variables::ID).unwrap_or(0),
                    date = %raw_date,
                    "skipping variable expense with unparseable date"
                );
                continue;
            };
            if let Some(range) = range {
                if !range.contains(date) {
                    continue;
                }
            }
            expenses.push(VariableExpense {
                id: row.int(gastos_variables::ID).unwrap_or(0),
                date,
                concept: row.text(gastos_variables::CONCEPTO),
                amount: row.float(gastos_variables::MONTO).unwrap_or(0.0),
                category: row.text(gastos_variables::CATEGORIA),
                notes: row.text(gastos_variables::NOTAS),
            });
        }
        Ok(expenses)
    }

    /// One variable expense by id.
    pub async fn get(&self, id: i64) -> Result<Option<VariableExpense>> {
        Ok(self.list(None).await?.into_iter().find(|e| e.id == id))
    }

    /// Insert a variable expense and return its id.
    pub async fn insert(&self, new: &NewVariableExpense) -> Result<i64> {
        let id = self
            .db
            .next_id(gastos_variables::TABLE, &gastos_variables::HEADERS)
            .await?;
        self.db
            .append(
                gastos_variables::TABLE,
                &gastos_variables::HEADERS,
                vec![
                    id.to_string(),
                    new.date.format("%Y-%m-%d").to_string(),
                    new.concept.clone(),
                    new.amount.to_string(),
                    new.category.clone(),
                    new.notes.clone(),
                    now_iso(),
                ],
            )
            .await?;
        Ok(id)
    }

    /// Overwrite the editable columns of a variable expense.
    pub async fn update(&self, id: i64, new: &NewVariableExpense) -> Result<()> {
        let row = self
            .db
            .find_row_by_id(gastos_variables::TABLE, &gastos_variables::HEADERS, id)
            .await?
            .with_context(|| format!("variable expense {id} not found"))?;
        self.db
            .update_cols(
                gastos_variables::TABLE,
                &gastos_variables::HEADERS,
                row,
                gastos_variables::FECHA,
                gastos_variables::NOTAS,
                vec![
                    new.date.format("%Y-%m-%d").to_string(),
                    new.concept.clone(),
                    new.amount.to_string(),
                    new.category.clone(),
                    new.notes.clone(),
                ],
            )
            .await
    }

    /// Hard-delete a variable expense; a missing id is a no-op.
    pub async fn delete(&self, id: i64) -> Result<()> {
        match self
            .db
            .find_row_by_id(gastos_variables::TABLE, &gastos_variables::HEADERS, id)
            .await?
        {
            Some(row) => {
                self.db
                    .delete_row(gastos_variables::TABLE, &gastos_variables::HEADERS, row)
                    .await
            }
            None => {
                warn!(expense_id = id, "delete of unknown variable expense ignored");
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Booking requests
// ---------------------------------------------------------------------------

/// Repository for incoming booking requests.
#[derive(Clone)]
pub struct RequestRepo {
    db: Arc<SheetDb>,
}

fn request_from_row(row: &Row) -> BookingRequest {
    BookingRequest {
        id: row.int(solicitudes::ID).unwrap_or(0),
        name: row.text(solicitudes::NOMBRE),
        phone: row.opt_text(solicitudes::TELEFONO),
        email: row.opt_text(solicitudes::EMAIL),
        requested_service: row.text(solicitudes::SERVICIO_SOLICITADO),
        time_preference: row.text(solicitudes::PREFERENCIA_HORARIO),
        message: row.text(solicitudes::MENSAJE),
        status: RequestStatus::from_wire(&row.text(solicitudes::ESTADO)),
        requested_at: row.text(solicitudes::FECHA_SOLICITUD),
        responded_at: row.opt_text(solicitudes::FECHA_RESPUESTA),
        admin_notes: row.text(solicitudes::NOTAS_ADMIN),
    }
}

impl RequestRepo {
    /// Create the repository.
    #[must_use]
    pub fn new(db: Arc<SheetDb>) -> Self {
        Self { db }
    }

    /// All requests, newest submission first. ISO timestamps sort
    /// lexicographically, so the string sort is the chronological one.
    pub async fn list(&self) -> Result<Vec<BookingRequest>> {
        let rows = self.db.rows(solicitudes::TABLE, &solicitudes::HEADERS).await?;
        let mut requests: Vec<BookingRequest> = rows.iter().map(request_from_row).collect();
        requests.sort_by(|a, b| b.requested_at.cmp(&a.requested_at).then(b.id.cmp(&a.id)));
        Ok(requests)
    }

    /// Pending requests only, newest first.
    pub async fn list_pending(&self) -> Result<Vec<BookingRequest>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .collect())
    }

    /// One request by id.
    pub async fn get(&self, id: i64) -> Result<Option<BookingRequest>> {
        Ok(self.list().await?.into_iter().find(|r| r.id == id))
    }

    /// Submit a new pending request (the public booking form path) and
    /// return its id.
    pub async fn submit(&self, new: &NewRequest) -> Result<i64> {
        let id = self.db.next_id(solicitudes::TABLE, &solicitudes::HEADERS).await?;
        self.db
            .append(
                solicitudes::TABLE,
                &solicitudes::HEADERS,
                vec![
                    id.to_string(),
                    new.name.clone(),
                    new.phone.clone().unwrap_or_default(),
                    new.email.clone().unwrap_or_default(),
                    new.requested_service.clone(),
                    new.time_preference.clone(),
                    new.message.clone(),
                    RequestStatus::Pending.as_str().to_string(),
                    now_iso(),
                    String::new(),
                    String::new(),
                ],
            )
            .await?;
        debug!(request_id = id, name = %new.name, "booking request submitted");
        Ok(id)
    }

    /// Set the terminal status of a request along with the response
    /// timestamp and admin notes. Two targeted range updates; the
    /// submission timestamp column between them is left untouched.
    pub async fn set_status(
        &self,
        id: i64,
        status: RequestStatus,
        admin_notes: &str,
    ) -> Result<()> {
        let row = self
            .db
            .find_row_by_id(solicitudes::TABLE, &solicitudes::HEADERS, id)
            .await?
            .with_context(|| format!("request {id} not found"))?;
        self.db
            .update_cols(
                solicitudes::TABLE,
                &solicitudes::HEADERS,
                row,
                solicitudes::ESTADO,
                solicitudes::ESTADO,
                vec![status.as_str().to_string()],
            )
            .await?;
        self.db
            .update_cols(
                solicitudes::TABLE,
                &solicitudes::HEADERS,
                row,
                solicitudes::FECHA_RESPUESTA,
                solicitudes::NOTAS_ADMIN,
                vec![now_iso(), admin_notes.to_string()],
            )
            .await
    }
}
