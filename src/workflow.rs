//! Booking-request reconciliation
//!
//! Turning a pending request into real records is the one multi-step write
//! in the system: resolve or create the client, parse the schedule
//! preference, resolve or create the service, insert the appointment, and
//! only then mark the request confirmed.
//!
//! The store cannot make this atomic. The step order is deliberate: if a
//! step fails, everything before it stays committed and the request stays
//! pending, so a partial failure leaves an orphan client or appointment to
//! inspect rather than a confirmed request with no appointment behind it.
//! There is no compensating rollback.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::matching::{fold, match_service, parse_time_preference, ScheduleSource, ServiceMatch};
use crate::metrics::OpsMetrics;
use crate::models::{NewAppointment, NewClient, NewService, RequestStatus};
use crate::repository::{
    AppointmentRepo, CategoryRepo, ClientRepo, RequestRepo, ServiceRepo, SheetDb,
};
use crate::utils::today;

/// Channel stamped on clients and appointments created from web requests.
const WEB_CHANNEL: &str = "Web";

/// Payment method sentinel meaning "not collected yet".
const PAYMENT_PENDING: &str = "Pendiente";

/// Price given to an auto-created placeholder service.
const PLACEHOLDER_PRICE: f64 = 50.0;

/// Duration in minutes given to an auto-created placeholder service.
const PLACEHOLDER_DURATION: i64 = 60;

/// Supply cost given to an auto-created placeholder service.
const PLACEHOLDER_SUPPLY_COST: f64 = 5.0;

/// Which rung of the service-resolution ladder produced the appointment's
/// service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServiceResolution {
    /// Folded-name equality with an active service
    Exact,
    /// Substring match on a request token
    Token,
    /// No match; first active service by id
    Fallback,
    /// No active services existed; a placeholder was created
    AutoCreated,
}

/// Structured payload describing a confirmed request, handed to the
/// notification/UI layer. Composing an outbound message from it is out of
/// scope here.
#[derive(Debug, Clone, Serialize)]
pub struct Confirmation {
    /// Originating request id
    pub request_id: i64,
    /// Resolved (or newly created) client id
    pub client_id: i64,
    /// Client display name
    pub client_name: String,
    /// Client phone, when the request carried one
    pub phone: Option<String>,
    /// Resolved service id
    pub service_id: i64,
    /// Resolved service name
    pub service_name: String,
    /// Appointment date
    pub date: NaiveDate,
    /// Appointment time (HH:MM)
    pub time: String,
    /// Admin note recorded on the request
    pub note: String,
    /// Whether the client already existed or was created here
    pub client_was_new: bool,
    /// Which resolution rung picked the service
    pub service_resolution: ServiceResolution,
    /// Whether the schedule was parsed or defaulted
    pub schedule_source: ScheduleSource,
}

/// The reconciliation workflow over the involved repositories.
pub struct RequestWorkflow {
    requests: RequestRepo,
    clients: ClientRepo,
    services: ServiceRepo,
    categories: CategoryRepo,
    appointments: AppointmentRepo,
    metrics: OpsMetrics,
}

impl RequestWorkflow {
    /// Build the workflow on top of a shared [`SheetDb`].
    #[must_use]
    pub fn new(db: Arc<SheetDb>) -> Self {
        Self {
            requests: RequestRepo::new(db.clone()),
            clients: ClientRepo::new(db.clone()),
            services: ServiceRepo::new(db.clone()),
            categories: CategoryRepo::new(db.clone()),
            appointments: AppointmentRepo::new(db),
            metrics: OpsMetrics::default(),
        }
    }

    /// Confirm a pending request: client, schedule, service, appointment,
    /// then the status flip. Returns the confirmation payload.
    pub async fn confirm(&self, request_id: i64, note: &str) -> Result<Confirmation> {
        let request = self
            .requests
            .get(request_id)
            .await?
            .with_context(|| format!("request {request_id} not found"))?;
        if request.status != RequestStatus::Pending {
            bail!(
                "request {request_id} is {}; only pending requests can be confirmed",
                request.status.as_str()
            );
        }

        // 1. Client: reuse by phone/email, otherwise create.
        let existing = self
            .clients
            .find_existing(request.phone.as_deref(), request.email.as_deref())
            .await?;
        let client_was_new = existing.is_none();
        let client_id = match existing {
            Some(id) => {
                debug!(request_id, client_id = id, "matched existing client");
                id
            }
            None => {
                self.clients
                    .insert(&NewClient {
                        name: request.name.clone(),
                        phone: request.phone.clone(),
                        email: request.email.clone(),
                        channel: WEB_CHANNEL.to_string(),
                        notes: format!("Alta desde solicitud web #{request_id}"),
                    })
                    .await?
            }
        };

        // 2. Schedule: best-effort parse of the free-text preference.
        let schedule = parse_time_preference(&request.time_preference, today());

        // 3. Service: resolution ladder over the active list, placeholder
        //    creation when the list is empty.
        let active = self.services.list_active().await?;
        let (service_id, service_name, price, resolution) =
            match match_service(&active, &request.requested_service) {
                Some(ServiceMatch::Exact(service)) => {
                    (service.id, service.name.clone(), service.price, ServiceResolution::Exact)
                }
                Some(ServiceMatch::Token { service, token }) => {
                    debug!(request_id, token = %token, service = %service.name, "token match");
                    (service.id, service.name.clone(), service.price, ServiceResolution::Token)
                }
                Some(ServiceMatch::FirstActive(service)) => {
                    debug!(request_id, service = %service.name, "no match, first active service");
                    (
                        service.id,
                        service.name.clone(),
                        service.price,
                        ServiceResolution::Fallback,
                    )
                }
                None => {
                    let id = self.create_placeholder(&request.requested_service, request_id).await?;
                    (
                        id,
                        request.requested_service.clone(),
                        PLACEHOLDER_PRICE,
                        ServiceResolution::AutoCreated,
                    )
                }
            };

        // 4. Appointment. Must exist before the request flips state.
        let mut notes = format!("Solicitud web #{request_id}");
        let note = note.trim();
        if !note.is_empty() {
            notes.push_str(". ");
            notes.push_str(note);
        }
        self.appointments
            .insert(&NewAppointment {
                date: schedule.date,
                time: schedule.time.clone(),
                client_id,
                service_id,
                price_charged: price,
                tip: 0.0,
                channel: WEB_CHANNEL.to_string(),
                payment_method: PAYMENT_PENDING.to_string(),
                notes,
            })
            .await?;

        // 5. Status flip, last.
        self.requests
            .set_status(request_id, RequestStatus::Confirmed, note)
            .await?;
        self.metrics.record_request_resolution("confirmed");
        info!(
            request_id,
            client_id,
            service_id,
            date = %schedule.date,
            time = %schedule.time,
            "request confirmed"
        );

        Ok(Confirmation {
            request_id,
            client_id,
            client_name: request.name,
            phone: request.phone,
            service_id,
            service_name,
            date: schedule.date,
            time: schedule.time,
            note: note.to_string(),
            client_was_new,
            service_resolution: resolution,
            schedule_source: schedule.source,
        })
    }

    /// Reject a pending request. No client or appointment side effects.
    pub async fn reject(&self, request_id: i64, note: &str) -> Result<()> {
        let request = self
            .requests
            .get(request_id)
            .await?
            .with_context(|| format!("request {request_id} not found"))?;
        if request.status != RequestStatus::Pending {
            bail!(
                "request {request_id} is {}; only pending requests can be rejected",
                request.status.as_str()
            );
        }
        self.requests
            .set_status(request_id, RequestStatus::Rejected, note.trim())
            .await?;
        self.metrics.record_request_resolution("rejected");
        info!(request_id, "request rejected");
        Ok(())
    }

    /// Create the placeholder service used when no active service exists
    /// at all. It lands in the `Otros` category when present, else the
    /// first category row.
    async fn create_placeholder(&self, requested: &str, request_id: i64) -> Result<i64> {
        let categories = self.categories.list().await?;
        let category_id = categories
            .iter()
            .find(|c| fold(&c.name) == "otros")
            .or_else(|| categories.first())
            .map(|c| c.id)
            .context("no categories available for placeholder service")?;
        let id = self
            .services
            .insert(&NewService {
                name: requested.to_string(),
                category_id,
                price: PLACEHOLDER_PRICE,
                duration_minutes: PLACEHOLDER_DURATION,
                supply_cost: PLACEHOLDER_SUPPLY_COST,
                description: format!("Creado desde solicitud web #{request_id}"),
            })
            .await?;
        info!(request_id, service_id = id, "created placeholder service");
        Ok(id)
    }
}
