//! Synthetic sale record generation
//!
//! Fabricates exactly the requested number of records, drawing dates and
//! base amounts from the extracted pools when available and synthesizing
//! them otherwise. Quantity and unit price are derived so that
//! `total == cantidad * precio_unitario` holds exactly for every record.

use super::masters::MasterSet;
use super::pools::ValuePools;
use crate::config::GeneratorConfig;
use crate::types::{month_name, OperationType, RecordProvenance, SaleRecord};
use chrono::{Datelike, Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Provenance accounting for one generation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorReport {
    /// Records whose date or base amount came from an extracted pool
    pub seeded_records: usize,
    /// Records fabricated entirely from random fallbacks
    pub synthetic_records: usize,
}

impl GeneratorReport {
    pub fn total(&self) -> usize {
        self.seeded_records + self.synthetic_records
    }
}

/// Fabricates sale records around the value pools
pub struct RecordGenerator<'a> {
    config: &'a GeneratorConfig,
    pools: &'a ValuePools,
}

impl<'a> RecordGenerator<'a> {
    pub fn new(config: &'a GeneratorConfig, pools: &'a ValuePools) -> Self {
        Self { config, pools }
    }

    /// Generate exactly `target` records referencing the given masters.
    /// Never errors: empty pools mean every record is synthetic.
    pub fn generate(
        &self,
        masters: &MasterSet,
        target: usize,
        rng: &mut ChaCha8Rng,
    ) -> (Vec<SaleRecord>, GeneratorReport) {
        assert!(
            !masters.products.is_empty() && !masters.clients.is_empty() && !masters.agents.is_empty(),
            "master tables must be seeded before generation"
        );

        let mut records = Vec::with_capacity(target);
        let mut report = GeneratorReport::default();

        for i in 0..target {
            let (fecha, date_seeded) = self.pick_date(rng);
            let (base_amount, amount_seeded) = self.pick_amount(rng);

            // Random variance multiplier, with an occasional large scale-up
            // to reproduce the million-peso tail seen in real reports
            let mut amount = base_amount * rng.gen_range(0.5..1.5);
            if rng.gen_bool(0.3) {
                amount *= rng.gen_range(10.0..100.0);
            }

            let cantidad = rng.gen_range(10.0..1000.0);
            let precio_unitario = amount / cantidad;
            // Recompute from the stored fields so the invariant holds exactly
            let total = cantidad * precio_unitario;

            let tipo_operacion = if rng.gen_bool(self.config.venta_probability) {
                OperationType::Venta
            } else {
                OperationType::Maquila
            };

            let provenance = if date_seeded || amount_seeded {
                RecordProvenance::Seeded
            } else {
                RecordProvenance::Synthetic
            };
            match provenance {
                RecordProvenance::Seeded => report.seeded_records += 1,
                RecordProvenance::Synthetic => report.synthetic_records += 1,
            }

            records.push(SaleRecord {
                folio: format!("F{:08}", i + 1),
                fecha,
                id_cliente: rng.gen_range(1..=masters.clients.len()) as i64,
                id_agente: rng.gen_range(1..=masters.agents.len()) as i64,
                id_producto: rng.gen_range(1..=masters.products.len()) as i64,
                tipo_operacion,
                cantidad,
                kilos: cantidad * 1000.0,
                toneladas: cantidad,
                precio_unitario,
                total,
                anio: fecha.year(),
                mes: month_name(fecha),
                provenance,
            });
        }

        info!(
            "Generated {} records ({} seeded by extracted values, {} fully synthetic)",
            records.len(),
            report.seeded_records,
            report.synthetic_records
        );

        (records, report)
    }

    fn pick_date(&self, rng: &mut ChaCha8Rng) -> (NaiveDate, bool) {
        if let Some(date) = self.pools.dates.choose(rng) {
            return (*date, true);
        }
        // Empty pool: synthesize within the default year
        let start = NaiveDate::from_ymd_opt(self.config.default_year, 1, 1)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let end = NaiveDate::from_ymd_opt(self.config.default_year, 12, 31)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        let span = (end - start).num_days();
        (start + Duration::days(rng.gen_range(0..=span)), false)
    }

    fn pick_amount(&self, rng: &mut ChaCha8Rng) -> (f64, bool) {
        if let Some(amount) = self.pools.amounts.choose(rng) {
            return (*amount, true);
        }
        (rng.gen_range(50_000.0..5_000_000.0), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::CandidateSet;
    use crate::synth::masters::seed_masters;
    use rand::SeedableRng;

    fn setup() -> (GeneratorConfig, MasterSet, ChaCha8Rng) {
        let config = GeneratorConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let masters = seed_masters(&CandidateSet::default(), &config, &mut rng);
        (config, masters, rng)
    }

    #[test]
    fn test_empty_pools_produce_exact_count_all_synthetic() {
        let (config, masters, mut rng) = setup();
        let pools = ValuePools::default();

        let (records, report) = RecordGenerator::new(&config, &pools).generate(&masters, 500, &mut rng);

        assert_eq!(records.len(), 500);
        assert_eq!(report.synthetic_records, 500);
        assert_eq!(report.seeded_records, 0);
        assert!(records
            .iter()
            .all(|r| r.provenance == RecordProvenance::Synthetic));
    }

    #[test]
    fn test_total_invariant_holds() {
        let (config, masters, mut rng) = setup();
        let pools = ValuePools {
            dates: vec![NaiveDate::from_ymd_opt(2023, 7, 4).unwrap()],
            amounts: vec![125_000.0],
            raw_dates: 1,
            raw_amounts: 1,
        };

        let (records, _) = RecordGenerator::new(&config, &pools).generate(&masters, 1000, &mut rng);
        for r in &records {
            let expected = r.cantidad * r.precio_unitario;
            let rel = ((r.total - expected) / expected).abs();
            assert!(rel < 1e-6, "total invariant violated: {} vs {}", r.total, expected);
            assert!((r.kilos - r.cantidad * 1000.0).abs() < 1e-9);
            assert!((r.toneladas - r.cantidad).abs() < 1e-9);
        }
    }

    #[test]
    fn test_denormalized_date_fields_agree() {
        let (config, masters, mut rng) = setup();
        let pools = ValuePools {
            dates: vec![
                NaiveDate::from_ymd_opt(2021, 1, 15).unwrap(),
                NaiveDate::from_ymd_opt(2025, 12, 3).unwrap(),
            ],
            amounts: vec![],
            raw_dates: 2,
            raw_amounts: 0,
        };

        let (records, _) = RecordGenerator::new(&config, &pools).generate(&masters, 200, &mut rng);
        for r in &records {
            assert_eq!(r.anio, r.fecha.year());
            assert_eq!(r.mes, month_name(r.fecha));
        }
    }

    #[test]
    fn test_seeded_pools_flag_provenance() {
        let (config, masters, mut rng) = setup();
        let pools = ValuePools {
            dates: vec![NaiveDate::from_ymd_opt(2024, 5, 5).unwrap()],
            amounts: vec![9_999.0],
            raw_dates: 1,
            raw_amounts: 1,
        };

        let (records, report) = RecordGenerator::new(&config, &pools).generate(&masters, 100, &mut rng);
        assert_eq!(report.seeded_records, 100);
        assert!(records
            .iter()
            .all(|r| r.provenance == RecordProvenance::Seeded));
    }

    #[test]
    fn test_foreign_keys_stay_in_master_range() {
        let (config, masters, mut rng) = setup();
        let pools = ValuePools::default();

        let (records, _) = RecordGenerator::new(&config, &pools).generate(&masters, 1000, &mut rng);
        for r in &records {
            assert!(r.id_cliente >= 1 && r.id_cliente <= masters.clients.len() as i64);
            assert!(r.id_agente >= 1 && r.id_agente <= masters.agents.len() as i64);
            assert!(r.id_producto >= 1 && r.id_producto <= masters.products.len() as i64);
        }
    }

    #[test]
    fn test_operation_type_split_is_roughly_configured() {
        let (config, masters, mut rng) = setup();
        let pools = ValuePools::default();

        let (records, _) = RecordGenerator::new(&config, &pools).generate(&masters, 10_000, &mut rng);
        let ventas = records
            .iter()
            .filter(|r| r.tipo_operacion == OperationType::Venta)
            .count();
        let fraction = ventas as f64 / records.len() as f64;
        assert!((0.70..0.80).contains(&fraction), "venta fraction {}", fraction);
    }

    #[test]
    fn test_folios_are_unique() {
        let (config, masters, mut rng) = setup();
        let pools = ValuePools::default();

        let (records, _) = RecordGenerator::new(&config, &pools).generate(&masters, 1000, &mut rng);
        let mut folios: Vec<&str> = records.iter().map(|r| r.folio.as_str()).collect();
        folios.sort_unstable();
        folios.dedup();
        assert_eq!(folios.len(), records.len());
    }
}
