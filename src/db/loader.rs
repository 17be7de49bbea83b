//! Batched bulk loader

use super::schema;
use super::LoadError;
use crate::config::DatabaseConfig;
use crate::synth::MasterSet;
use crate::types::SaleRecord;
use rusqlite::{params, Connection};
use serde::Serialize;
use tracing::{info, warn};

/// Writes masters and sale records into the reporting schema
pub struct BulkLoader {
    conn: Connection,
    batch_size: usize,
}

impl BulkLoader {
    /// Open (or create) the target database. Server connection fields in
    /// the config are not supported by the embedded engine and are ignored
    /// with a warning.
    pub fn open(config: &DatabaseConfig, batch_size: usize) -> Result<Self, LoadError> {
        if config.host.is_some() || config.user.is_some() {
            warn!(
                "Server connection parameters (host/port/user/password) are ignored; \
                 writing to embedded database '{}'",
                config.database.display()
            );
        }

        let conn = Connection::open(&config.database).map_err(|source| LoadError::Open {
            path: config.database.clone(),
            source,
        })?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Ok(Self { conn, batch_size })
    }

    /// Drop and recreate the full schema. Destructive by design: every run
    /// regenerates the dataset wholesale.
    pub fn create_schema(&self) -> Result<(), LoadError> {
        schema::create_schema(&self.conn).map_err(LoadError::Schema)?;
        info!("Schema recreated (previous contents dropped)");
        Ok(())
    }

    /// Insert the master tables in one transaction, before any sale
    /// references them.
    pub fn load_masters(&mut self, masters: &MasterSet) -> Result<(), LoadError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO productos (codigo_producto, nombre_producto, categoria, precio_unitario)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .map_err(LoadError::Master)?;
            for p in &masters.products {
                stmt.execute(params![p.codigo, p.nombre, p.categoria.label(), p.precio])
                    .map_err(LoadError::Master)?;
            }

            let mut stmt = tx
                .prepare(
                    "INSERT INTO clientes (codigo_cliente, razon_social, email, telefono)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .map_err(LoadError::Master)?;
            for c in &masters.clients {
                stmt.execute(params![c.codigo, c.razon_social, c.email, c.telefono])
                    .map_err(LoadError::Master)?;
            }

            let mut stmt = tx
                .prepare(
                    "INSERT INTO agentes (codigo_agente, nombre_agente, zona_asignada)
                     VALUES (?1, ?2, ?3)",
                )
                .map_err(LoadError::Master)?;
            for a in &masters.agents {
                stmt.execute(params![a.codigo, a.nombre, a.zona])
                    .map_err(LoadError::Master)?;
            }
        }
        tx.commit()?;

        info!(
            "Masters loaded: {} productos, {} clientes, {} agentes",
            masters.products.len(),
            masters.clients.len(),
            masters.agents.len()
        );
        Ok(())
    }

    /// Insert sale records in fixed-size batches, one transaction each.
    /// `on_batch(batch_index, committed_total)` fires after every commit.
    /// A failed batch aborts the run; prior batches remain committed.
    pub fn load_sales(
        &mut self,
        records: &[SaleRecord],
        mut on_batch: impl FnMut(usize, usize),
    ) -> Result<usize, LoadError> {
        let mut committed = 0usize;

        for (index, batch) in records.chunks(self.batch_size).enumerate() {
            self.insert_batch(batch)
                .map_err(|source| LoadError::Batch {
                    index,
                    committed,
                    source,
                })?;
            committed += batch.len();
            on_batch(index, committed);
        }

        Ok(committed)
    }

    fn insert_batch(&mut self, batch: &[SaleRecord]) -> Result<(), rusqlite::Error> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO ventas (folio, fecha_venta, id_cliente, id_agente, id_producto,
                 tipo_operacion, cantidad, kilos, toneladas, precio_unitario, total, \"año\", mes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            )?;
            for r in batch {
                stmt.execute(params![
                    r.folio,
                    r.fecha.to_string(),
                    r.id_cliente,
                    r.id_agente,
                    r.id_producto,
                    r.tipo_operacion.as_str(),
                    r.cantidad,
                    r.kilos,
                    r.toneladas,
                    r.precio_unitario,
                    r.total,
                    r.anio,
                    r.mes,
                ])?;
            }
        }
        tx.commit()
    }

    /// Aggregate totals for the final summary and the `stats` command.
    pub fn summary(&self) -> Result<LoadSummary, LoadError> {
        let count = |table: &str| -> Result<u64, rusqlite::Error> {
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        };

        let productos = count("productos")?;
        let clientes = count("clientes")?;
        let agentes = count("agentes")?;
        let ventas = count("ventas")?;

        let total_sum: f64 = self.conn.query_row(
            "SELECT COALESCE(SUM(Total), 0.0) FROM VentasENEJUL",
            [],
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT mes, SUM(total) FROM ventas GROUP BY \"año\", mes ORDER BY \"año\", MIN(fecha_venta)",
        )?;
        let monthly = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LoadSummary {
            productos,
            clientes,
            agentes,
            ventas,
            total_sum,
            monthly,
        })
    }
}

/// Aggregate counts for spot-checking a load against expectations
#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub productos: u64,
    pub clientes: u64,
    pub agentes: u64,
    pub ventas: u64,
    /// SUM(total) over the compatibility view
    pub total_sum: f64,
    /// (month label, SUM(total)) per year-month
    pub monthly: Vec<(String, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::scan::CandidateSet;
    use crate::synth::{seed_masters, RecordGenerator, ValuePools};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tempfile::TempDir;

    fn temp_loader(dir: &TempDir, batch_size: usize) -> BulkLoader {
        let config = DatabaseConfig {
            database: dir.path().join("test.db"),
            ..DatabaseConfig::default()
        };
        BulkLoader::open(&config, batch_size).unwrap()
    }

    fn small_dataset(n: usize) -> (MasterSet, Vec<SaleRecord>) {
        let config = GeneratorConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let masters = seed_masters(&CandidateSet::default(), &config, &mut rng);
        let pools = ValuePools::default();
        let (records, _) = RecordGenerator::new(&config, &pools).generate(&masters, n, &mut rng);
        (masters, records)
    }

    #[test]
    fn test_load_commits_in_batches() {
        let dir = TempDir::new().unwrap();
        let mut loader = temp_loader(&dir, 100);
        let (masters, records) = small_dataset(250);

        loader.create_schema().unwrap();
        loader.load_masters(&masters).unwrap();

        let mut batches = Vec::new();
        let written = loader
            .load_sales(&records, |index, committed| batches.push((index, committed)))
            .unwrap();

        assert_eq!(written, 250);
        assert_eq!(batches, vec![(0, 100), (1, 200), (2, 250)]);

        let summary = loader.summary().unwrap();
        assert_eq!(summary.ventas, 250);
        assert!(summary.total_sum > 0.0);
    }

    #[test]
    fn test_sales_without_masters_abort_with_batch_index() {
        let dir = TempDir::new().unwrap();
        let mut loader = temp_loader(&dir, 50);
        let (_, records) = small_dataset(120);

        loader.create_schema().unwrap();
        // Masters deliberately not loaded: every insert violates a FK
        let err = loader.load_sales(&records, |_, _| {}).unwrap_err();
        match err {
            LoadError::Batch { index, committed, .. } => {
                assert_eq!(index, 0);
                assert_eq!(committed, 0);
            }
            other => panic!("expected Batch error, got {other:?}"),
        }
    }

    #[test]
    fn test_rerun_replaces_previous_dataset() {
        let dir = TempDir::new().unwrap();
        let mut loader = temp_loader(&dir, 100);
        let (masters, records) = small_dataset(80);

        for _ in 0..2 {
            loader.create_schema().unwrap();
            loader.load_masters(&masters).unwrap();
            loader.load_sales(&records, |_, _| {}).unwrap();
        }

        let summary = loader.summary().unwrap();
        assert_eq!(summary.ventas, 80);
    }
}
