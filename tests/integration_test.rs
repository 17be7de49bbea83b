//! End-to-end pipeline tests: raw bytes in, queryable dataset out

use bakforge::config::{Config, DatabaseConfig};
use bakforge::db::BulkLoader;
use bakforge::scan::Scanner;
use bakforge::synth::{seed_masters, RecordGenerator, ValuePools};
use chrono::{Datelike, NaiveDate};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rusqlite::Connection;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn test_config(dir: &TempDir, target: usize) -> Config {
    let mut config = Config::default();
    config.database = DatabaseConfig {
        database: dir.path().join("ventas.db"),
        ..DatabaseConfig::default()
    };
    config.scan.chunk_size_bytes = 1024;
    config.scan.overlap_bytes = 64;
    config.scan.workers = 2;
    config.generator.target_record_count = target;
    config.generator.seed = Some(42);
    config.loader.batch_size = 100;
    config
}

/// Run the whole pipeline against `bak` and return the open connection
/// plus the seeded/synthetic split.
fn run_pipeline(config: &Config, bak: &Path) -> (Connection, usize, usize) {
    let scanner = Scanner::new(config.scan.clone());
    let outcome = scanner.scan(bak, |_| {}).unwrap();

    let pools = ValuePools::from_candidates(&outcome.candidates, &config.generator);
    let mut rng = ChaCha8Rng::seed_from_u64(config.generator.seed.unwrap());
    let masters = seed_masters(&outcome.candidates, &config.generator, &mut rng);
    let (records, report) = RecordGenerator::new(&config.generator, &pools).generate(
        &masters,
        config.generator.target_record_count,
        &mut rng,
    );

    let mut loader = BulkLoader::open(&config.database, config.loader.batch_size).unwrap();
    loader.create_schema().unwrap();
    loader.load_masters(&masters).unwrap();
    loader.load_sales(&records, |_, _| {}).unwrap();
    drop(loader);

    let conn = Connection::open(&config.database.database).unwrap();
    (conn, report.seeded_records, report.synthetic_records)
}

/// Bytes with the high bit set decode to non-ASCII in both encodings, so
/// no pattern can match anywhere in the file.
fn write_patternless_bak(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("garbage.bak");
    let data: Vec<u8> = (0..4096u32).map(|i| 0x80 | (i % 64) as u8).collect();
    std::fs::write(&path, data).unwrap();
    path
}

fn write_seeded_bak(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("seeded.bak");
    let mut f = std::fs::File::create(&path).unwrap();
    let mut data = vec![0x8Eu8; 3000];
    let text = b" MAIZ AMARILLO  2024-03-15  15/06/2024  $1,250,000.00  $45,000.50 \
                  COMERCIALIZADORA DEL BAJIO SA  ventas@elbajio.com  461-555-1234 ";
    data[500..500 + text.len()].copy_from_slice(text);
    f.write_all(&data).unwrap();
    f.flush().unwrap();
    path
}

#[test]
fn patternless_backup_still_yields_full_dataset() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, 300);
    let bak = write_patternless_bak(&dir);

    let (conn, seeded, synthetic) = run_pipeline(&config, &bak);

    // Nothing extractable: everything is synthetic, count still exact
    assert_eq!(seeded, 0);
    assert_eq!(synthetic, 300);

    let ventas: u64 = conn
        .query_row("SELECT COUNT(*) FROM ventas", [], |r| r.get(0))
        .unwrap();
    assert_eq!(ventas, 300);

    // Default masters filled the gap
    let productos: u64 = conn
        .query_row("SELECT COUNT(*) FROM productos", [], |r| r.get(0))
        .unwrap();
    assert!(productos > 0);

    // Every sale resolves through the view's joins
    let resolved: u64 = conn
        .query_row(
            "SELECT COUNT(*) FROM VentasENEJUL
             WHERE Producto IS NOT NULL AND Agente IS NOT NULL AND \"Razon social\" IS NOT NULL",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(resolved, 300);
}

#[test]
fn seeded_backup_flows_extracted_values_through() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, 200);
    let bak = write_seeded_bak(&dir);

    let (conn, seeded, _) = run_pipeline(&config, &bak);
    assert!(seeded > 0, "extracted dates and amounts should seed records");

    // The extracted product landed in the catalog, classified as a grain
    let categoria: String = conn
        .query_row(
            "SELECT categoria FROM productos WHERE nombre_producto LIKE 'MAIZ%'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(categoria, "GRANOS");

    // Both date layouts in the file parse into the pool; at least one of
    // them shows up in a stored record
    let matching: u64 = conn
        .query_row(
            "SELECT COUNT(*) FROM ventas WHERE fecha_venta IN ('2024-03-15', '2024-06-15')",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert!(matching > 0);
}

#[test]
fn stored_records_honor_arithmetic_and_date_invariants() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, 400);
    let bak = write_seeded_bak(&dir);

    let (conn, _, _) = run_pipeline(&config, &bak);

    let mut stmt = conn
        .prepare(
            "SELECT fecha_venta, cantidad, kilos, precio_unitario, total, \"año\", mes FROM ventas",
        )
        .unwrap();
    let rows: Vec<(String, f64, f64, f64, f64, i32, String)> = stmt
        .query_map([], |r| {
            Ok((
                r.get(0)?,
                r.get(1)?,
                r.get(2)?,
                r.get(3)?,
                r.get(4)?,
                r.get(5)?,
                r.get(6)?,
            ))
        })
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows.len(), 400);

    for (fecha, cantidad, kilos, precio, total, anio, mes) in rows {
        let expected = cantidad * precio;
        assert!(
            (total - expected).abs() <= expected.abs() * 1e-6,
            "total {} != cantidad {} * precio {}",
            total,
            cantidad,
            precio
        );
        assert!((kilos - cantidad * 1000.0).abs() < 1e-6);

        let date = NaiveDate::parse_from_str(&fecha, "%Y-%m-%d").unwrap();
        assert_eq!(anio, date.year());
        assert_eq!(mes, bakforge::types::month_name(date));
    }
}

#[test]
fn fixed_seed_reproduces_the_dataset() {
    let dir = TempDir::new().unwrap();
    let bak = write_seeded_bak(&dir);

    let mut totals = Vec::new();
    for _ in 0..2 {
        let subdir = TempDir::new().unwrap();
        let mut config = test_config(&subdir, 150);
        config.scan.workers = 1; // sequential keeps candidate order stable
        let (conn, _, _) = run_pipeline(&config, &bak);
        let sum: f64 = conn
            .query_row("SELECT SUM(total) FROM ventas", [], |r| r.get(0))
            .unwrap();
        totals.push(sum);
    }
    assert_eq!(totals[0], totals[1]);
}
