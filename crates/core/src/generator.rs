//! Synthetic dataset generator
//!
//! Populates a [`GraphStore`] with managers, designers, programmers, artists and
//! products, then wires them together:
//!
//! - each manager MANAGEs a random number of designers, programmers and
//!   artists (one draw per type, fan-out range inclusive);
//! - each product receives DESIGN, CODE and DRAW edges from a random number of
//!   contributors of the matching type.
//!
//! Contributors are sampled uniformly *with replacement*, so the same pair can
//! be linked more than once. Those duplicate edges are kept.
//!
//! Everything happens inside one write transaction. A transient commit failure
//! restarts the whole transaction; any other failure leaves the store empty.

use tracing::{debug, info, instrument, warn};

use crate::config::GeneratorConfig;
use crate::error::{GenerationError, StoreError};
use crate::facts::FactProvider;
use crate::graph::{Label, NodeRef, Properties, PropertyValue, RelType};
use crate::store::{GraphStore, WriteTx};

/// References to everything created by [`generate`]
///
/// Queries do not depend on this; they rediscover nodes through the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphHandle {
    pub managers: Vec<NodeRef>,
    pub designers: Vec<NodeRef>,
    pub programmers: Vec<NodeRef>,
    pub artists: Vec<NodeRef>,
    pub products: Vec<NodeRef>,
    pub edges_created: usize,
}

impl GraphHandle {
    pub fn node_count(&self) -> usize {
        self.managers.len()
            + self.designers.len()
            + self.programmers.len()
            + self.artists.len()
            + self.products.len()
    }

    fn pool(&self, label: Label) -> &[NodeRef] {
        match label {
            Label::Manager => &self.managers,
            Label::Designer => &self.designers,
            Label::Programmer => &self.programmers,
            Label::Artist => &self.artists,
            Label::Product => &self.products,
        }
    }
}

/// Contributor types, in the order their edges are drawn
const SUBORDINATES: [Label; 3] = [Label::Designer, Label::Programmer, Label::Artist];

/// Generate the dataset into `store` as one atomic transaction
#[instrument(skip_all, fields(products = config.products, managers = config.managers))]
pub fn generate<F>(
    store: &GraphStore,
    config: &GeneratorConfig,
    facts: &mut F,
) -> Result<GraphHandle, GenerationError>
where
    F: FactProvider + ?Sized,
{
    config.validate()?;

    let mut attempt = 1;
    loop {
        match try_generate(store, config, facts) {
            Ok(handle) => {
                info!(
                    nodes = handle.node_count(),
                    edges = handle.edges_created,
                    attempt,
                    "generated dataset"
                );
                return Ok(handle);
            }
            Err(err) if err.is_transient() && attempt < config.commit_attempts => {
                warn!(error = %err, attempt, "transient failure, retrying generation");
                attempt += 1;
            }
            Err(source) => {
                return Err(GenerationError::Transaction {
                    attempts: attempt,
                    source,
                });
            }
        }
    }
}

fn try_generate<F>(
    store: &GraphStore,
    config: &GeneratorConfig,
    facts: &mut F,
) -> Result<GraphHandle, StoreError>
where
    F: FactProvider + ?Sized,
{
    let mut tx = store.begin_write()?;
    let mut handle = GraphHandle::default();

    create_people(&mut tx, &mut handle, config, facts);
    create_products(&mut tx, &mut handle, config, facts);

    for manager in handle.managers.clone() {
        for label in SUBORDINATES {
            for subordinate in sample(handle.pool(label), config, facts) {
                tx.create_relationship(manager, subordinate, RelType::Manage)?;
                handle.edges_created += 1;
            }
        }
    }

    for product in handle.products.clone() {
        for label in SUBORDINATES {
            let Some(rel_type) = RelType::contribution_for(label) else {
                continue;
            };
            for contributor in sample(handle.pool(label), config, facts) {
                tx.create_relationship(contributor, product, rel_type)?;
                handle.edges_created += 1;
            }
        }
    }

    tx.commit()?;
    Ok(handle)
}

fn create_people<F>(
    tx: &mut WriteTx<'_>,
    handle: &mut GraphHandle,
    config: &GeneratorConfig,
    facts: &mut F,
) where
    F: FactProvider + ?Sized,
{
    let groups = [
        (Label::Manager, config.managers, (30, 60)),
        (Label::Designer, config.designers, (22, 50)),
        (Label::Programmer, config.programmers, (22, 50)),
        (Label::Artist, config.artists, (22, 50)),
    ];

    for (label, count, (min_age, max_age)) in groups {
        for _ in 0..count {
            let properties = Properties::from([
                ("name".to_string(), PropertyValue::Text(facts.full_name())),
                (
                    "age".to_string(),
                    PropertyValue::Int(facts.number_between(min_age, max_age)),
                ),
            ]);
            let node = tx.create_node(label, properties);
            match label {
                Label::Manager => handle.managers.push(node),
                Label::Designer => handle.designers.push(node),
                Label::Programmer => handle.programmers.push(node),
                Label::Artist => handle.artists.push(node),
                Label::Product => handle.products.push(node),
            }
        }
        debug!(%label, count, "created nodes");
    }
}

fn create_products<F>(
    tx: &mut WriteTx<'_>,
    handle: &mut GraphHandle,
    config: &GeneratorConfig,
    facts: &mut F,
) where
    F: FactProvider + ?Sized,
{
    for index in 0..config.products {
        let properties = Properties::from([
            ("name".to_string(), PropertyValue::Text(facts.product_name())),
            ("price".to_string(), PropertyValue::Text(facts.price())),
            (
                "daily_sales".to_string(),
                PropertyValue::Int(facts.number_between(0, 99_999)),
            ),
            ("index".to_string(), PropertyValue::Int(index as i64)),
        ]);
        handle.products.push(tx.create_node(Label::Product, properties));
    }
    debug!(count = config.products, "created products");
}

/// Draw a fan-out count, then that many members of `pool` with replacement
fn sample<F>(pool: &[NodeRef], config: &GeneratorConfig, facts: &mut F) -> Vec<NodeRef>
where
    F: FactProvider + ?Sized,
{
    if pool.is_empty() {
        return Vec::new();
    }
    let count = facts.number_between(i64::from(config.fan_out.min), i64::from(config.fan_out.max));
    let last = pool.len() as i64 - 1;
    (0..count)
        .filter_map(|_| {
            let pick = facts.number_between(0, last);
            pool.get(pick as usize).copied()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FanOut;
    use crate::facts::RandomFacts;
    use crate::store::MemorySink;

    /// Deterministic provider: every number is the minimum of its range
    struct LowFacts;

    impl FactProvider for LowFacts {
        fn full_name(&mut self) -> String {
            "Ana Kim".to_string()
        }

        fn number_between(&mut self, min: i64, _max: i64) -> i64 {
            min
        }

        fn product_name(&mut self) -> String {
            "Rustic Steel Chair".to_string()
        }

        fn price(&mut self) -> String {
            "9.99".to_string()
        }
    }

    fn small_config() -> GeneratorConfig {
        GeneratorConfig {
            managers: 2,
            designers: 3,
            programmers: 3,
            artists: 3,
            products: 4,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_generate_creates_every_entity() {
        let store = GraphStore::with_sink(MemorySink::new());
        let handle = generate(&store, &GeneratorConfig::default(), &mut RandomFacts::seeded(1)).unwrap();

        assert_eq!(handle.managers.len(), 5);
        assert_eq!(handle.designers.len(), 10);
        assert_eq!(handle.programmers.len(), 15);
        assert_eq!(handle.artists.len(), 12);
        assert_eq!(handle.products.len(), 50);

        let read = store.begin_read().unwrap();
        assert_eq!(read.graph().node_count(), 92);
        assert_eq!(read.graph().edge_count(), handle.edges_created);
    }

    #[test]
    fn test_minimum_fan_out_gives_exact_edge_counts() {
        let store = GraphStore::with_sink(MemorySink::new());
        let handle = generate(&store, &small_config(), &mut LowFacts).unwrap();

        // 2 managers * 3 subordinate types + 4 products * 3 contributor types
        assert_eq!(handle.edges_created, 2 * 3 + 4 * 3);
    }

    #[test]
    fn test_product_attributes() {
        let store = GraphStore::with_sink(MemorySink::new());
        let handle = generate(&store, &small_config(), &mut LowFacts).unwrap();
        let read = store.begin_read().unwrap();

        for (expected_index, product) in handle.products.iter().enumerate() {
            let node = read.node(*product).unwrap();
            assert_eq!(node.label, Label::Product);
            assert_eq!(
                node.property("index"),
                Some(&PropertyValue::Int(expected_index as i64))
            );
            assert_eq!(node.property("daily_sales"), Some(&PropertyValue::Int(0)));
            assert_eq!(node.property("price").and_then(|p| p.as_text()), Some("9.99"));
        }
    }

    #[test]
    fn test_ages_follow_role_ranges() {
        let store = GraphStore::with_sink(MemorySink::new());
        let handle = generate(&store, &GeneratorConfig::default(), &mut RandomFacts::seeded(5)).unwrap();
        let read = store.begin_read().unwrap();

        let age = |node: NodeRef| read.node(node).and_then(|n| n.property("age")).and_then(|v| v.as_int());
        assert!(handle.managers.iter().all(|m| (30..=60).contains(&age(*m).unwrap())));
        assert!(handle.designers.iter().all(|d| (22..=50).contains(&age(*d).unwrap())));
    }

    #[test]
    fn test_invalid_config_creates_nothing() {
        let store = GraphStore::with_sink(MemorySink::new());
        let config = GeneratorConfig {
            fan_out: FanOut { min: 0, max: 2 },
            ..small_config()
        };

        let err = generate(&store, &config, &mut LowFacts).unwrap_err();

        assert!(matches!(err, GenerationError::InvalidConfig { .. }));
        assert_eq!(store.begin_read().unwrap().graph().node_count(), 0);
    }

    #[test]
    fn test_closed_store_is_a_generation_failure() {
        let store = GraphStore::with_sink(MemorySink::new());
        store.shutdown().unwrap();

        let err = generate(&store, &small_config(), &mut LowFacts).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Transaction {
                attempts: 1,
                source: StoreError::Closed
            }
        ));
    }

    #[test]
    fn test_sample_stays_in_pool() {
        let store = GraphStore::with_sink(MemorySink::new());
        let handle = generate(&store, &small_config(), &mut RandomFacts::seeded(3)).unwrap();
        let config = small_config();
        let mut facts = RandomFacts::seeded(4);

        for _ in 0..50 {
            let picks = sample(&handle.designers, &config, &mut facts);
            assert!((1..=3).contains(&picks.len()));
            assert!(picks.iter().all(|p| handle.designers.contains(p)));
        }
        assert!(sample(&[], &config, &mut facts).is_empty());
    }
}
