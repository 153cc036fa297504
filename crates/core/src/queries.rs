//! Analytical queries over the generated organisation
//!
//! Each query opens its own read transaction, maps matched nodes onto typed
//! rows and returns `Ok(None)` when there is nothing to report. Results that
//! later queries need are passed in explicitly.
//!
//! Ranking rules:
//! - highest seller: `daily_sales` descending, then `index` ascending
//! - lowest seller: `daily_sales` ascending, then `index` ascending
//! - leaders of Q4/Q5: every node reaching the maximum, in creation order

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::QueryError;
use crate::graph::{Label, Node, NodeRef, RelType};
use crate::store::{
    Direction, GraphStore, NodeMatch, Order, ReadTx, Traversal, TraversalPath, Uniqueness,
};

/// Depth bound of the contributor traversals. The longest chain in the model is
/// manager → subordinate → product; anything deeper is reported as truncated.
pub const CONTRIBUTOR_DEPTH: usize = 5;

/// How many best sellers Q4 looks at
pub const TOP_PRODUCTS: usize = 10;

/// `Ok(None)` is the explicit "no data" result
pub type QueryResult<T> = Result<Option<T>, QueryError>;

/// Typed view of a PRODUCT node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub node: NodeRef,
    pub name: String,
    pub price: String,
    pub daily_sales: i64,
    pub index: i64,
}

impl ProductRow {
    fn read(tx: &ReadTx<'_>, node: NodeRef) -> Result<Self, QueryError> {
        let weight = lookup(tx, node)?;
        Ok(Self {
            node,
            name: text(node, weight, "name")?,
            price: text(node, weight, "price")?,
            daily_sales: int(node, weight, "daily_sales")?,
            index: int(node, weight, "index")?,
        })
    }
}

/// Typed view of a MANAGER, DESIGNER, PROGRAMMER or ARTIST node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRow {
    pub node: NodeRef,
    pub label: Label,
    pub name: String,
    pub age: i64,
}

impl PersonRow {
    fn read(tx: &ReadTx<'_>, node: NodeRef) -> Result<Self, QueryError> {
        let weight = lookup(tx, node)?;
        Ok(Self {
            node,
            label: weight.label,
            name: text(node, weight, "name")?,
            age: int(node, weight, "age")?,
        })
    }
}

/// One hop of a contribution chain, read from the product outwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub rel_type: RelType,
    pub person: PersonRow,
}

/// Q2: everyone involved in a product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributors {
    pub product: ProductRow,
    /// Every chain walked back from the product, in depth-first order
    pub paths: Vec<Vec<PathStep>>,
    /// Distinct people on those chains, in first-visit order
    pub people: Vec<PersonRow>,
    pub truncated: bool,
}

/// Q3: designers of a product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDesigners {
    pub product: ProductRow,
    pub designers: Vec<PersonRow>,
    pub truncated: bool,
}

/// Q4: programmers ranked by how many best sellers they coded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgrammerFrequency {
    /// Best sellers considered, best first
    pub top_products: Vec<ProductRow>,
    /// Every programmer with at least one of those products, most first
    pub contributions: Vec<(PersonRow, usize)>,
    pub max_count: usize,
    pub leaders: Vec<PersonRow>,
}

/// Sales reachable from one manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerSales {
    pub manager: PersonRow,
    /// Distinct products touched by the manager's subordinates, by `index`
    pub products: Vec<ProductRow>,
    pub total_sales: i64,
}

/// Q5: managers ranked by aggregate product sales
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerRanking {
    /// Every manager, highest total first
    pub standings: Vec<ManagerSales>,
    pub max_sales: i64,
    pub leaders: Vec<ManagerSales>,
}

/// Runs the analytical queries against a store
pub struct QueryEngine<'a> {
    store: &'a GraphStore,
}

impl<'a> QueryEngine<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// Q1: the product with the highest `daily_sales`
    pub fn highest_seller(&self) -> QueryResult<ProductRow> {
        self.single_product(Order::Desc)
    }

    /// Q3, first half: the product with the lowest `daily_sales`
    pub fn lowest_seller(&self) -> QueryResult<ProductRow> {
        self.single_product(Order::Asc)
    }

    /// Q2: every manager, designer, programmer and artist whose edges lead
    /// back to `product`
    pub fn contributors(&self, product: &ProductRow) -> Result<Contributors, QueryError> {
        let tx = self.store.begin_read()?;
        let product = ProductRow::read(&tx, product.node)?;

        let traversal = Traversal::new()
            .relationships(RelType::Manage, Direction::Incoming)
            .relationships(RelType::Design, Direction::Incoming)
            .relationships(RelType::Draw, Direction::Incoming)
            .relationships(RelType::Code, Direction::Incoming)
            .uniqueness(Uniqueness::RelationshipGlobal)
            .max_depth(CONTRIBUTOR_DEPTH);
        let walked = tx.traverse(product.node, &traversal);
        if walked.truncated {
            warn!(product = %product.node, depth = CONTRIBUTOR_DEPTH, "contributor traversal truncated");
        }

        let paths = walked
            .paths
            .iter()
            .map(|path| path_steps(&tx, path))
            .collect::<Result<Vec<_>, _>>()?;
        let people = walked
            .nodes()
            .into_iter()
            .map(|node| PersonRow::read(&tx, node))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(paths = paths.len(), people = people.len(), "collected contributors");
        Ok(Contributors {
            product,
            paths,
            people,
            truncated: walked.truncated,
        })
    }

    /// Q3, second half: the designers connected to `product` by DESIGN edges
    pub fn designers_of(&self, product: &ProductRow) -> Result<ProductDesigners, QueryError> {
        let tx = self.store.begin_read()?;
        let product = ProductRow::read(&tx, product.node)?;

        let traversal = Traversal::new()
            .relationships(RelType::Design, Direction::Incoming)
            .uniqueness(Uniqueness::RelationshipGlobal)
            .max_depth(CONTRIBUTOR_DEPTH);
        let walked = tx.traverse(product.node, &traversal);
        if walked.truncated {
            warn!(product = %product.node, depth = CONTRIBUTOR_DEPTH, "designer traversal truncated");
        }

        let designers = walked
            .nodes()
            .into_iter()
            .map(|node| PersonRow::read(&tx, node))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProductDesigners {
            product,
            designers,
            truncated: walked.truncated,
        })
    }

    /// Q3: designers of the lowest seller
    pub fn lowest_seller_designers(&self) -> QueryResult<ProductDesigners> {
        match self.lowest_seller()? {
            Some(product) => self.designers_of(&product).map(Some),
            None => Ok(None),
        }
    }

    /// Q4: the programmer(s) who coded the most of the top ten best sellers
    ///
    /// A programmer with several CODE edges to the same product counts once for
    /// it. Ties are all returned.
    pub fn top_programmers(&self) -> QueryResult<ProgrammerFrequency> {
        let tx = self.store.begin_read()?;
        let top = tx.find(
            &NodeMatch::label(Label::Product)
                .order_by("daily_sales", Order::Desc)
                .order_by("index", Order::Asc)
                .limit(TOP_PRODUCTS),
        );
        if top.is_empty() {
            return Ok(None);
        }

        let coders = Traversal::new()
            .relationships(RelType::Code, Direction::Incoming)
            .uniqueness(Uniqueness::NodeGlobal)
            .max_depth(1);

        let mut counts: BTreeMap<NodeRef, usize> = BTreeMap::new();
        let mut top_products = Vec::with_capacity(top.len());
        for product in top {
            top_products.push(ProductRow::read(&tx, product)?);
            for programmer in tx.traverse(product, &coders).nodes() {
                *counts.entry(programmer).or_default() += 1;
            }
        }

        let Some(max_count) = counts.values().copied().max() else {
            return Ok(None);
        };

        let mut contributions = counts
            .iter()
            .map(|(node, count)| PersonRow::read(&tx, *node).map(|row| (row, *count)))
            .collect::<Result<Vec<_>, _>>()?;
        // counts is keyed by node, so the stable sort keeps creation order within a count
        contributions.sort_by(|a, b| b.1.cmp(&a.1));

        let leaders = contributions
            .iter()
            .filter(|(_, count)| *count == max_count)
            .map(|(row, _)| row.clone())
            .collect();

        Ok(Some(ProgrammerFrequency {
            top_products,
            contributions,
            max_count,
            leaders,
        }))
    }

    /// Q5: the manager(s) whose subordinates' products sell the most
    ///
    /// A product reached through several subordinates of one manager is
    /// counted once for that manager.
    pub fn top_managers(&self) -> QueryResult<ManagerRanking> {
        let tx = self.store.begin_read()?;
        let managers = tx.find(&NodeMatch::label(Label::Manager));
        if managers.is_empty() {
            return Ok(None);
        }

        let reach = Traversal::new()
            .relationships(RelType::Manage, Direction::Outgoing)
            .relationships(RelType::Design, Direction::Outgoing)
            .relationships(RelType::Code, Direction::Outgoing)
            .relationships(RelType::Draw, Direction::Outgoing)
            .uniqueness(Uniqueness::NodeGlobal)
            .max_depth(2);

        let mut standings = Vec::with_capacity(managers.len());
        for manager in managers {
            let mut products = Vec::new();
            for node in tx.traverse(manager, &reach).nodes() {
                if lookup(&tx, node)?.label == Label::Product {
                    products.push(ProductRow::read(&tx, node)?);
                }
            }
            products.sort_by_key(|p| p.index);
            let total_sales = products.iter().map(|p| p.daily_sales).sum();
            standings.push(ManagerSales {
                manager: PersonRow::read(&tx, manager)?,
                products,
                total_sales,
            });
        }

        let max_sales = standings.iter().map(|s| s.total_sales).max().unwrap_or_default();
        let leaders = standings
            .iter()
            .filter(|s| s.total_sales == max_sales)
            .cloned()
            .collect();
        standings.sort_by(|a, b| b.total_sales.cmp(&a.total_sales));

        Ok(Some(ManagerRanking {
            standings,
            max_sales,
            leaders,
        }))
    }

    fn single_product(&self, order: Order) -> QueryResult<ProductRow> {
        let tx = self.store.begin_read()?;
        let rows = tx.find(
            &NodeMatch::label(Label::Product)
                .order_by("daily_sales", order)
                .order_by("index", Order::Asc)
                .limit(1),
        );
        rows.first()
            .map(|node| ProductRow::read(&tx, *node))
            .transpose()
    }
}

fn path_steps(tx: &ReadTx<'_>, path: &TraversalPath) -> Result<Vec<PathStep>, QueryError> {
    path.steps
        .iter()
        .map(|step| {
            Ok(PathStep {
                rel_type: step.rel_type,
                person: PersonRow::read(tx, step.node)?,
            })
        })
        .collect()
}

fn lookup<'t>(tx: &'t ReadTx<'_>, node: NodeRef) -> Result<&'t Node, QueryError> {
    tx.node(node).ok_or(QueryError::UnknownNode { node })
}

fn int(node: NodeRef, weight: &Node, key: &'static str) -> Result<i64, QueryError> {
    let value = weight.property(key).ok_or(QueryError::MissingProperty {
        node,
        label: weight.label,
        key,
    })?;
    value.as_int().ok_or(QueryError::WrongType {
        node,
        label: weight.label,
        key,
        expected: "integer",
    })
}

fn text(node: NodeRef, weight: &Node, key: &'static str) -> Result<String, QueryError> {
    let value = weight.property(key).ok_or(QueryError::MissingProperty {
        node,
        label: weight.label,
        key,
    })?;
    value
        .as_text()
        .map(str::to_string)
        .ok_or(QueryError::WrongType {
            node,
            label: weight.label,
            key,
            expected: "text",
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Properties, PropertyValue};
    use crate::store::{MemorySink, WriteTx};

    fn product(tx: &mut WriteTx<'_>, name: &str, sales: i64, index: i64) -> NodeRef {
        tx.create_node(
            Label::Product,
            Properties::from([
                ("name".to_string(), PropertyValue::from(name)),
                ("price".to_string(), PropertyValue::from("1.00")),
                ("daily_sales".to_string(), PropertyValue::Int(sales)),
                ("index".to_string(), PropertyValue::Int(index)),
            ]),
        )
    }

    fn person(tx: &mut WriteTx<'_>, label: Label, name: &str) -> NodeRef {
        tx.create_node(
            label,
            Properties::from([
                ("name".to_string(), PropertyValue::from(name)),
                ("age".to_string(), PropertyValue::Int(33)),
            ]),
        )
    }

    #[test]
    fn test_empty_store_yields_no_data() {
        let store = GraphStore::with_sink(MemorySink::new());
        let engine = QueryEngine::new(&store);

        assert_eq!(engine.highest_seller().unwrap(), None);
        assert_eq!(engine.lowest_seller().unwrap(), None);
        assert_eq!(engine.lowest_seller_designers().unwrap(), None);
        assert_eq!(engine.top_programmers().unwrap(), None);
        assert_eq!(engine.top_managers().unwrap(), None);
    }

    #[test]
    fn test_missing_attribute_is_a_query_error() {
        let store = GraphStore::with_sink(MemorySink::new());
        let mut tx = store.begin_write().unwrap();
        tx.create_node(
            Label::Product,
            Properties::from([("name".to_string(), PropertyValue::from("Bare"))]),
        );
        tx.commit().unwrap();

        let err = QueryEngine::new(&store).highest_seller().unwrap_err();
        assert!(matches!(
            err,
            QueryError::MissingProperty { key: "price", .. }
        ));
    }

    #[test]
    fn test_wrong_attribute_type_is_reported() {
        let store = GraphStore::with_sink(MemorySink::new());
        let mut tx = store.begin_write().unwrap();
        tx.create_node(
            Label::Product,
            Properties::from([
                ("name".to_string(), PropertyValue::from("Odd")),
                ("price".to_string(), PropertyValue::from("1.00")),
                ("daily_sales".to_string(), PropertyValue::from("lots")),
                ("index".to_string(), PropertyValue::Int(0)),
            ]),
        );
        tx.commit().unwrap();

        let err = QueryEngine::new(&store).lowest_seller().unwrap_err();
        assert!(matches!(
            err,
            QueryError::WrongType { key: "daily_sales", expected: "integer", .. }
        ));
    }

    #[test]
    fn test_closed_store_is_a_query_error() {
        let store = GraphStore::with_sink(MemorySink::new());
        store.shutdown().unwrap();
        assert!(matches!(
            QueryEngine::new(&store).highest_seller(),
            Err(QueryError::Store(_))
        ));
    }

    #[test]
    fn test_contributors_follow_chains_back_from_product() {
        let store = GraphStore::with_sink(MemorySink::new());
        let mut tx = store.begin_write().unwrap();
        let boss = person(&mut tx, Label::Manager, "Boss");
        let ana = person(&mut tx, Label::Designer, "Ana");
        let zoey = person(&mut tx, Label::Programmer, "Zoey");
        let sven = person(&mut tx, Label::Artist, "Sven");
        let cola = product(&mut tx, "Cola", 10, 0);
        tx.create_relationship(boss, ana, RelType::Manage).unwrap();
        tx.create_relationship(ana, cola, RelType::Design).unwrap();
        tx.create_relationship(zoey, cola, RelType::Code).unwrap();
        tx.create_relationship(sven, cola, RelType::Draw).unwrap();
        tx.commit().unwrap();

        let engine = QueryEngine::new(&store);
        let top = engine.highest_seller().unwrap().unwrap();
        let found = engine.contributors(&top).unwrap();

        assert!(!found.truncated);
        assert_eq!(found.paths.len(), 4);
        let names: Vec<_> = found.people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Boss", "Sven", "Zoey"]);
        let chain: Vec<_> = found.paths[1].iter().map(|s| s.rel_type).collect();
        assert_eq!(chain, vec![RelType::Design, RelType::Manage]);
    }

    #[test]
    fn test_designers_of_ignores_other_contributors() {
        let store = GraphStore::with_sink(MemorySink::new());
        let mut tx = store.begin_write().unwrap();
        let boss = person(&mut tx, Label::Manager, "Boss");
        let ana = person(&mut tx, Label::Designer, "Ana");
        let zoey = person(&mut tx, Label::Programmer, "Zoey");
        let cola = product(&mut tx, "Cola", 10, 0);
        tx.create_relationship(boss, ana, RelType::Manage).unwrap();
        tx.create_relationship(ana, cola, RelType::Design).unwrap();
        tx.create_relationship(ana, cola, RelType::Design).unwrap();
        tx.create_relationship(zoey, cola, RelType::Code).unwrap();
        tx.commit().unwrap();

        let found = QueryEngine::new(&store).lowest_seller_designers().unwrap().unwrap();

        assert_eq!(found.product.name, "Cola");
        assert_eq!(found.designers.len(), 1);
        assert_eq!(found.designers[0].node, ana);
    }

    #[test]
    fn test_top_programmers_only_counts_top_ten() {
        let store = GraphStore::with_sink(MemorySink::new());
        let mut tx = store.begin_write().unwrap();
        let busy = person(&mut tx, Label::Programmer, "Busy");
        let niche = person(&mut tx, Label::Programmer, "Niche");
        // 12 products; index 11 has the lowest sales and falls outside the top ten
        let products: Vec<_> = (0..12)
            .map(|i| product(&mut tx, &format!("P{i}"), 1_000 - i, i))
            .collect();
        tx.create_relationship(busy, products[0], RelType::Code).unwrap();
        tx.create_relationship(busy, products[0], RelType::Code).unwrap();
        tx.create_relationship(niche, products[10], RelType::Code).unwrap();
        tx.create_relationship(niche, products[11], RelType::Code).unwrap();
        tx.commit().unwrap();

        let freq = QueryEngine::new(&store).top_programmers().unwrap().unwrap();

        assert_eq!(freq.top_products.len(), TOP_PRODUCTS);
        assert_eq!(freq.max_count, 1);
        // duplicate CODE edges to one product still count once; product 10 is outside the top ten
        assert_eq!(freq.leaders.len(), 1);
        assert_eq!(freq.leaders[0].node, busy);
        assert_eq!(freq.contributions.len(), 1);
    }

    #[test]
    fn test_top_programmers_without_code_edges() {
        let store = GraphStore::with_sink(MemorySink::new());
        let mut tx = store.begin_write().unwrap();
        product(&mut tx, "Lonely", 1, 0);
        tx.commit().unwrap();

        assert_eq!(QueryEngine::new(&store).top_programmers().unwrap(), None);
    }

    #[test]
    fn test_top_managers_counts_shared_products_once() {
        let store = GraphStore::with_sink(MemorySink::new());
        let mut tx = store.begin_write().unwrap();
        let alice = person(&mut tx, Label::Manager, "Alice");
        let bob = person(&mut tx, Label::Manager, "Bob");
        let ana = person(&mut tx, Label::Designer, "Ana");
        let zoey = person(&mut tx, Label::Programmer, "Zoey");
        let sven = person(&mut tx, Label::Artist, "Sven");
        let cola = product(&mut tx, "Cola", 500, 0);
        let chair = product(&mut tx, "Chair", 300, 1);
        tx.create_relationship(alice, ana, RelType::Manage).unwrap();
        tx.create_relationship(alice, zoey, RelType::Manage).unwrap();
        tx.create_relationship(bob, sven, RelType::Manage).unwrap();
        tx.create_relationship(ana, cola, RelType::Design).unwrap();
        tx.create_relationship(zoey, cola, RelType::Code).unwrap();
        tx.create_relationship(sven, chair, RelType::Draw).unwrap();
        tx.create_relationship(sven, cola, RelType::Draw).unwrap();
        tx.commit().unwrap();

        let ranking = QueryEngine::new(&store).top_managers().unwrap().unwrap();

        // Alice reaches Cola twice (via Ana and Zoey) but it counts once: 500
        // Bob reaches Chair and Cola through Sven: 800
        assert_eq!(ranking.max_sales, 800);
        assert_eq!(ranking.leaders.len(), 1);
        assert_eq!(ranking.leaders[0].manager.node, bob);
        assert_eq!(ranking.standings[1].manager.node, alice);
        assert_eq!(ranking.standings[1].total_sales, 500);
        assert_eq!(ranking.standings[1].products.len(), 1);
        let bob_products: Vec<_> = ranking.standings[0].products.iter().map(|p| p.index).collect();
        assert_eq!(bob_products, vec![0, 1]);
    }

    #[test]
    fn test_top_managers_returns_every_tied_leader() {
        let store = GraphStore::with_sink(MemorySink::new());
        let mut tx = store.begin_write().unwrap();
        let alice = person(&mut tx, Label::Manager, "Alice");
        let bob = person(&mut tx, Label::Manager, "Bob");
        let ana = person(&mut tx, Label::Designer, "Ana");
        let cola = product(&mut tx, "Cola", 500, 0);
        tx.create_relationship(alice, ana, RelType::Manage).unwrap();
        tx.create_relationship(bob, ana, RelType::Manage).unwrap();
        tx.create_relationship(ana, cola, RelType::Design).unwrap();
        tx.commit().unwrap();

        let ranking = QueryEngine::new(&store).top_managers().unwrap().unwrap();

        let leaders: Vec<_> = ranking.leaders.iter().map(|s| s.manager.node).collect();
        assert_eq!(leaders, vec![alice, bob]);
    }

    #[test]
    fn test_manager_without_subordinates_has_zero_sales() {
        let store = GraphStore::with_sink(MemorySink::new());
        let mut tx = store.begin_write().unwrap();
        person(&mut tx, Label::Manager, "Idle");
        tx.commit().unwrap();

        let ranking = QueryEngine::new(&store).top_managers().unwrap().unwrap();
        assert_eq!(ranking.max_sales, 0);
        assert_eq!(ranking.leaders.len(), 1);
        assert!(ranking.leaders[0].products.is_empty());
    }
}
