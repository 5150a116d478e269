//! Table schema definitions
//!
//! This module provides constants for the table names, header rows and column
//! names used against the tabular store. Header order matters: append and
//! update calls are positional against these headers.

/// Service categories table schema
pub mod categorias {
    /// Table name
    pub const TABLE: &str = "categorias";
    /// Header row, in store column order
    pub const HEADERS: [&str; 4] = ["id", "nombre", "descripcion", "created_at"];
    /// Primary key column
    pub const ID: &str = "id";
    /// Category name column
    pub const NOMBRE: &str = "nombre";
    /// Description column
    pub const DESCRIPCION: &str = "descripcion";
}

/// Services table schema
pub mod servicios {
    /// Table name
    pub const TABLE: &str = "servicios";
    /// Header row, in store column order
    pub const HEADERS: [&str; 9] = [
        "id",
        "nombre",
        "categoria_id",
        "precio",
        "duracion_minutos",
        "costo_insumos",
        "activo",
        "descripcion",
        "created_at",
    ];
    /// Primary key column
    pub const ID: &str = "id";
    /// Service name column
    pub const NOMBRE: &str = "nombre";
    /// Foreign key to the categories table
    pub const CATEGORIA_ID: &str = "categoria_id";
    /// List price column
    pub const PRECIO: &str = "precio";
    /// Duration in minutes column
    pub const DURACION_MINUTOS: &str = "duracion_minutos";
    /// Supply cost column
    pub const COSTO_INSUMOS: &str = "costo_insumos";
    /// Active flag column (1 = offered, 0 = soft-deleted)
    pub const ACTIVO: &str = "activo";
    /// Description column
    pub const DESCRIPCION: &str = "descripcion";
}

/// Clients table schema
pub mod clientes {
    /// Table name
    pub const TABLE: &str = "clientes";
    /// Header row, in store column order
    pub const HEADERS: [&str; 8] = [
        "id",
        "nombre",
        "telefono",
        "email",
        "fecha_primera_visita",
        "canal_adquisicion",
        "notas",
        "created_at",
    ];
    /// Primary key column
    pub const ID: &str = "id";
    /// Client name column
    pub const NOMBRE: &str = "nombre";
    /// Phone number column
    pub const TELEFONO: &str = "telefono";
    /// Email address column
    pub const EMAIL: &str = "email";
    /// First visit date column
    pub const FECHA_PRIMERA_VISITA: &str = "fecha_primera_visita";
    /// Acquisition channel column
    pub const CANAL_ADQUISICION: &str = "canal_adquisicion";
    /// Free-form notes column
    pub const NOTAS: &str = "notas";
}

/// Appointments table schema
pub mod citas {
    /// Table name
    pub const TABLE: &str = "citas";
    /// Header row, in store column order
    pub const HEADERS: [&str; 11] = [
        "id",
        "fecha",
        "hora",
        "cliente_id",
        "servicio_id",
        "precio_cobrado",
        "propina",
        "canal_origen",
        "metodo_pago",
        "notas",
        "created_at",
    ];
    /// Primary key column
    pub const ID: &str = "id";
    /// Appointment date column (YYYY-MM-DD)
    pub const FECHA: &str = "fecha";
    /// Appointment time column (HH:MM)
    pub const HORA: &str = "hora";
    /// Foreign key to the clients table
    pub const CLIENTE_ID: &str = "cliente_id";
    /// Foreign key to the services table
    pub const SERVICIO_ID: &str = "servicio_id";
    /// Price actually charged column
    pub const PRECIO_COBRADO: &str = "precio_cobrado";
    /// Tip column
    pub const PROPINA: &str = "propina";
    /// Origin channel column (Booksy, WhatsApp, Web, ...)
    pub const CANAL_ORIGEN: &str = "canal_origen";
    /// Payment method column
    pub const METODO_PAGO: &str = "metodo_pago";
    /// Free-form notes column
    pub const NOTAS: &str = "notas";
}

/// Fixed (recurring) expenses table schema
pub mod gastos_fijos {
    /// Table name
    pub const TABLE: &str = "gastos_fijos";
    /// Header row, in store column order
    pub const HEADERS: [&str; 7] = [
        "id",
        "concepto",
        "monto",
        "frecuencia",
        "activo",
        "notas",
        "created_at",
    ];
    /// Primary key column
    pub const ID: &str = "id";
    /// Concept column
    pub const CONCEPTO: &str = "concepto";
    /// Amount column
    pub const MONTO: &str = "monto";
    /// Billing frequency column (mensual, trimestral, anual)
    pub const FRECUENCIA: &str = "frecuencia";
    /// Active flag column (1 = current, 0 = soft-deleted)
    pub const ACTIVO: &str = "activo";
    /// Free-form notes column
    pub const NOTAS: &str = "notas";
}

/// Variable (one-off) expenses table schema
pub mod gastos_variables {
    /// Table name
    pub const TABLE: &str = "gastos_variables";
    /// Header row, in store column order
    pub const HEADERS: [&str; 7] = [
        "id",
        "fecha",
        "concepto",
        "monto",
        "categoria",
        "notas",
        "created_at",
    ];
    /// Primary key column
    pub const ID: &str = "id";
    /// Expense date column (YYYY-MM-DD)
    pub const FECHA: &str = "fecha";
    /// Concept column
    pub const CONCEPTO: &str = "concepto";
    /// Amount column
    pub const MONTO: &str = "monto";
    /// Expense category column (Insumos, Marketing, ...)
    pub const CATEGORIA: &str = "categoria";
    /// Free-form notes column
    pub const NOTAS: &str = "notas";
}

/// Booking requests table schema
pub mod solicitudes {
    /// Table name
    pub const TABLE: &str = "solicitudes";
    /// Header row, in store column order
    pub const HEADERS: [&str; 11] = [
        "id",
        "nombre",
        "telefono",
        "email",
        "servicio_solicitado",
        "preferencia_horario",
        "mensaje",
        "estado",
        "fecha_solicitud",
        "fecha_respuesta",
        "notas_admin",
    ];
    /// Primary key column
    pub const ID: &str = "id";
    /// Requester name column
    pub const NOMBRE: &str = "nombre";
    /// Requester phone column
    pub const TELEFONO: &str = "telefono";
    /// Requester email column
    pub const EMAIL: &str = "email";
    /// Requested service free-text column
    pub const SERVICIO_SOLICITADO: &str = "servicio_solicitado";
    /// Schedule preference free-text column
    pub const PREFERENCIA_HORARIO: &str = "preferencia_horario";
    /// Additional message column
    pub const MENSAJE: &str = "mensaje";
    /// Status column (pendiente, confirmada, rechazada)
    pub const ESTADO: &str = "estado";
    /// Submission timestamp column
    pub const FECHA_SOLICITUD: &str = "fecha_solicitud";
    /// Response timestamp column
    pub const FECHA_RESPUESTA: &str = "fecha_respuesta";
    /// Admin notes column
    pub const NOTAS_ADMIN: &str = "notas_admin";
}
