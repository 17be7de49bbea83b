//! Reporting schema DDL
//!
//! Drop-and-recreate semantics: every run regenerates the dataset
//! wholesale, so there is no migration path, only the current shape.
//! `VentasENEJUL` is the fixed-name compatibility view consumed by the
//! downstream reporting dashboards.

use rusqlite::Connection;

/// Compatibility view name expected by downstream consumers
pub const COMPAT_VIEW: &str = "VentasENEJUL";

const SCHEMA_SQL: &str = r#"
DROP VIEW IF EXISTS VentasENEJUL;
DROP TABLE IF EXISTS ventas;
DROP TABLE IF EXISTS productos;
DROP TABLE IF EXISTS clientes;
DROP TABLE IF EXISTS agentes;

CREATE TABLE productos (
    id_producto INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo_producto TEXT NOT NULL UNIQUE,
    nombre_producto TEXT NOT NULL,
    categoria TEXT NOT NULL,
    precio_unitario REAL NOT NULL DEFAULT 0
);

CREATE TABLE clientes (
    id_cliente INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo_cliente TEXT NOT NULL UNIQUE,
    razon_social TEXT NOT NULL,
    email TEXT,
    telefono TEXT
);

CREATE TABLE agentes (
    id_agente INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo_agente TEXT NOT NULL UNIQUE,
    nombre_agente TEXT NOT NULL,
    zona_asignada TEXT
);

CREATE TABLE ventas (
    id_venta INTEGER PRIMARY KEY AUTOINCREMENT,
    folio TEXT NOT NULL,
    fecha_venta TEXT NOT NULL,
    id_cliente INTEGER NOT NULL REFERENCES clientes(id_cliente),
    id_agente INTEGER NOT NULL REFERENCES agentes(id_agente),
    id_producto INTEGER NOT NULL REFERENCES productos(id_producto),
    tipo_operacion TEXT NOT NULL DEFAULT 'Venta'
        CHECK (tipo_operacion IN ('Venta', 'Maquila')),
    cantidad REAL NOT NULL,
    kilos REAL NOT NULL,
    toneladas REAL NOT NULL,
    precio_unitario REAL NOT NULL,
    total REAL NOT NULL,
    "año" INTEGER NOT NULL,
    mes TEXT NOT NULL
);

CREATE INDEX idx_ventas_fecha ON ventas(fecha_venta);
CREATE INDEX idx_ventas_anio_mes ON ventas("año", mes);
CREATE INDEX idx_ventas_tipo ON ventas(tipo_operacion);
CREATE INDEX idx_ventas_total ON ventas(total);

CREATE VIEW VentasENEJUL AS
SELECT
    v."año" AS "Año",
    v.mes AS Mes,
    strftime('%d-%m-%y', v.fecha_venta) AS Fecha,
    v.folio AS Folio,
    a.nombre_agente AS Agente,
    c.razon_social AS "Razon social",
    p.nombre_producto AS Producto,
    v.cantidad AS Cantidad,
    v.kilos AS Kilos,
    v.toneladas AS Toneladas,
    v.precio_unitario AS Precio,
    v.total AS Total,
    v.tipo_operacion AS "Venta/Maquila"
FROM ventas v
LEFT JOIN clientes c ON v.id_cliente = c.id_cliente
LEFT JOIN agentes a ON v.id_agente = a.id_agente
LEFT JOIN productos p ON v.id_producto = p.id_producto;
"#;

/// Drop and recreate all tables, indexes, and the compatibility view.
pub fn create_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
