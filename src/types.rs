//! Core domain types shared across the pipeline

use crate::classify::ProductCategory;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Spanish month labels as used by the reporting view
pub const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Month label for a date (1-indexed month onto `MONTH_NAMES`)
pub fn month_name(date: NaiveDate) -> &'static str {
    MONTH_NAMES[date.month0() as usize]
}

/// Product master row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique code, e.g. `P0001`
    pub codigo: String,
    pub nombre: String,
    pub categoria: ProductCategory,
    /// Unit price in pesos
    pub precio: f64,
}

/// Client master row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Unique code, e.g. `C00001`
    pub codigo: String,
    pub razon_social: String,
    pub email: String,
    pub telefono: String,
}

/// Sales agent master row. Agents are always synthesized; the scan phase
/// has no extraction path for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Unique code, e.g. `A001`
    pub codigo: String,
    pub nombre: String,
    pub zona: String,
}

/// Operation type tag on a sale record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    /// Standard sale
    Venta,
    /// Contract processing (tolling)
    Maquila,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Venta => "Venta",
            OperationType::Maquila => "Maquila",
        }
    }
}

/// Where a record's seed values came from.
///
/// `Seeded` means the date or the base amount was drawn from a pool of
/// values salvaged from the backup file. Even seeded records are fabricated
/// around that value, not recovered rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordProvenance {
    Seeded,
    Synthetic,
}

/// A generated sale record, ready for bulk loading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Human-readable transaction id, e.g. `F00000001`
    pub folio: String,
    pub fecha: NaiveDate,
    /// 1-based ids into the master tables
    pub id_cliente: i64,
    pub id_agente: i64,
    pub id_producto: i64,
    pub tipo_operacion: OperationType,
    /// Quantity in tonnes
    pub cantidad: f64,
    pub kilos: f64,
    pub toneladas: f64,
    pub precio_unitario: f64,
    /// Always `cantidad * precio_unitario`
    pub total: f64,
    /// Denormalized from `fecha`
    pub anio: i32,
    /// Spanish month label, denormalized from `fecha`
    pub mes: &'static str,
    pub provenance: RecordProvenance,
}
