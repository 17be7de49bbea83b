//! Master table seeding
//!
//! Products and clients are seeded from extracted candidates when any
//! survive filtering, topped up from default catalogs otherwise. Agents
//! have no extraction path and are always synthetic. Every table is
//! guaranteed non-empty so the generator always has ids to reference.

use crate::classify::classify_product;
use crate::config::GeneratorConfig;
use crate::scan::CandidateSet;
use crate::types::{Agent, Client, Product};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Fallback product catalog used when extraction found nothing usable
const DEFAULT_PRODUCTS: &[&str] = &[
    "MAIZ AMARILLO NACIONAL",
    "MAIZ BLANCO",
    "SORGO ESCOBERO",
    "PASTA DE SOYA",
    "TRIGO DURO",
    "AVENA FORRAJERA",
    "CEBADA GRANO",
    "ALIMENTO BALANCEADO LECHERO",
    "ALIMENTO BALANCEADO ENGORDA",
    "MELAZA DE CANA",
    "SALVADO DE TRIGO",
    "HARINA DE PESCADO",
];

/// Fallback client list
const DEFAULT_CLIENTS: &[&str] = &[
    "MOLINOS DEL BAJIO SA DE CV",
    "FORRAJES Y GRANOS DEL CENTRO",
    "GANADERA SANTA ELENA SPR",
    "COOPERATIVA AGRICOLA EL ROSARIO",
    "DISTRIBUIDORA PECUARIA DEL NORTE SA",
    "AGROINDUSTRIAS DEL VALLE SA DE CV",
    "UNION GANADERA REGIONAL",
    "COMERCIALIZADORA DE GRANOS LA LOMA",
    "ALIMENTOS PECUARIOS DEL SUR",
    "PRODUCTORA AVICOLA SAN MARCOS",
];

/// Agent zone labels
const ZONES: &[&str] = &[
    "NORTE",
    "SUR",
    "CENTRO",
    "ORIENTE",
    "PONIENTE",
    "NORESTE",
    "NOROESTE",
    "SURESTE",
    "SUROESTE",
];

/// Substrings that mark a name candidate as extraction noise
const NOISE_MARKERS: &[&str] = &["ERROR", "NULL", "DEFAULT"];

/// The seeded master tables. Row ids are positional: the record generator
/// references row N+1 for index N, matching AUTOINCREMENT order at load.
#[derive(Debug, Clone)]
pub struct MasterSet {
    pub products: Vec<Product>,
    pub clients: Vec<Client>,
    pub agents: Vec<Agent>,
}

/// Build the master tables from scan candidates plus synthetic fill.
pub fn seed_masters(
    candidates: &CandidateSet,
    config: &GeneratorConfig,
    rng: &mut ChaCha8Rng,
) -> MasterSet {
    let products = seed_products(candidates, config, rng);
    let clients = seed_clients(candidates, config, rng);
    let agents = seed_agents(config.agent_count);

    info!(
        "Master tables: {} products, {} clients, {} agents",
        products.len(),
        clients.len(),
        agents.len()
    );

    MasterSet {
        products,
        clients,
        agents,
    }
}

fn seed_products(
    candidates: &CandidateSet,
    config: &GeneratorConfig,
    rng: &mut ChaCha8Rng,
) -> Vec<Product> {
    let mut names: Vec<String> = candidates
        .products
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| p.len() > 5)
        .take(config.max_products)
        .collect();

    if names.is_empty() {
        names = DEFAULT_PRODUCTS.iter().map(|s| s.to_string()).collect();
    }

    names
        .into_iter()
        .enumerate()
        .map(|(i, nombre)| Product {
            codigo: format!("P{:04}", i + 1),
            categoria: classify_product(&nombre),
            precio: rng.gen_range(3000.0..25000.0),
            nombre,
        })
        .collect()
}

fn seed_clients(
    candidates: &CandidateSet,
    config: &GeneratorConfig,
    rng: &mut ChaCha8Rng,
) -> Vec<Client> {
    let mut names: Vec<String> = candidates
        .names
        .iter()
        .map(|n| n.trim().to_string())
        .filter(|n| n.len() > 10 && !is_noise(n))
        .take(config.max_clients)
        .collect();

    if names.is_empty() {
        names = DEFAULT_CLIENTS.iter().map(|s| s.to_string()).collect();
    }

    names
        .into_iter()
        .enumerate()
        .map(|(i, razon_social)| {
            // Contact fields are cycled from extracted pools when present,
            // synthesized otherwise
            let email = candidates
                .emails
                .get(i % candidates.emails.len().max(1))
                .cloned()
                .unwrap_or_else(|| format!("cliente{}@empresa.com", i + 1));
            let telefono = candidates
                .phones
                .get(i % candidates.phones.len().max(1))
                .cloned()
                .unwrap_or_else(|| {
                    format!("464-{}-{}", rng.gen_range(100..1000), rng.gen_range(1000..10000))
                });
            Client {
                codigo: format!("C{:05}", i + 1),
                razon_social,
                email,
                telefono,
            }
        })
        .collect()
}

fn seed_agents(count: usize) -> Vec<Agent> {
    (0..count)
        .map(|i| Agent {
            codigo: format!("A{:03}", i + 1),
            nombre: format!("AGENTE {:02}", i + 1),
            zona: ZONES[i % ZONES.len()].to_string(),
        })
        .collect()
}

fn is_noise(name: &str) -> bool {
    let upper = name.to_uppercase();
    NOISE_MARKERS.iter().any(|m| upper.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ProductCategory;
    use rand::SeedableRng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_empty_candidates_fall_back_to_defaults() {
        let masters = seed_masters(&CandidateSet::default(), &GeneratorConfig::default(), &mut rng());

        assert_eq!(masters.products.len(), DEFAULT_PRODUCTS.len());
        assert_eq!(masters.clients.len(), DEFAULT_CLIENTS.len());
        assert_eq!(masters.agents.len(), 20);
        assert!(masters.products.iter().all(|p| p.precio >= 3000.0));
    }

    #[test]
    fn test_codes_are_unique() {
        let masters = seed_masters(&CandidateSet::default(), &GeneratorConfig::default(), &mut rng());

        let mut codes: Vec<&str> = masters.products.iter().map(|p| p.codigo.as_str()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), masters.products.len());
        assert_eq!(masters.agents[0].codigo, "A001");
        assert_eq!(masters.clients[0].codigo, "C00001");
    }

    #[test]
    fn test_extracted_products_are_classified() {
        let mut candidates = CandidateSet::default();
        candidates.products = vec!["MAIZ AMARILLO IMPORTADO".to_string()];

        let masters = seed_masters(&candidates, &GeneratorConfig::default(), &mut rng());
        assert_eq!(masters.products.len(), 1);
        assert_eq!(masters.products[0].categoria, ProductCategory::Granos);
    }

    #[test]
    fn test_noise_names_rejected() {
        let mut candidates = CandidateSet::default();
        candidates.names = vec![
            "NULL NULL NULL NULL".to_string(),
            "ERROR READING PAGE".to_string(),
            "GANADERA LOS ALAMOS SPR".to_string(),
        ];

        let masters = seed_masters(&candidates, &GeneratorConfig::default(), &mut rng());
        assert_eq!(masters.clients.len(), 1);
        assert_eq!(masters.clients[0].razon_social, "GANADERA LOS ALAMOS SPR");
    }

    #[test]
    fn test_contact_fields_cycle_extracted_pools() {
        let mut candidates = CandidateSet::default();
        candidates.names = vec![
            "GANADERA LOS ALAMOS SPR".to_string(),
            "MOLINOS EL FENIX SA DE CV".to_string(),
        ];
        candidates.emails = vec!["contacto@alamos.mx".to_string()];

        let masters = seed_masters(&candidates, &GeneratorConfig::default(), &mut rng());
        assert_eq!(masters.clients[0].email, "contacto@alamos.mx");
        assert_eq!(masters.clients[1].email, "contacto@alamos.mx");
        assert!(masters.clients[0].telefono.starts_with("464-"));
    }
}
