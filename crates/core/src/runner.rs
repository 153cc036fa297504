//! Fixed-order query run
//!
//! Runs the five queries one after another. A failing query is recorded in its
//! own slot and the rest still run; a query that needs an upstream result it
//! cannot get reports [`QueryError::UpstreamFailed`].

use tracing::{info, warn};

use crate::error::QueryError;
use crate::queries::{
    Contributors, ManagerRanking, ProductDesigners, ProductRow, ProgrammerFrequency,
    QueryEngine, QueryResult,
};
use crate::store::GraphStore;

/// Outcome of every query, in run order
#[derive(Debug)]
pub struct Report {
    pub highest_seller: QueryResult<ProductRow>,
    pub highest_seller_contributors: QueryResult<Contributors>,
    pub lowest_seller_designers: QueryResult<ProductDesigners>,
    pub top_programmers: QueryResult<ProgrammerFrequency>,
    pub top_managers: QueryResult<ManagerRanking>,
}

impl Report {
    /// Number of queries that failed
    pub fn failures(&self) -> usize {
        [
            self.highest_seller.is_err(),
            self.highest_seller_contributors.is_err(),
            self.lowest_seller_designers.is_err(),
            self.top_programmers.is_err(),
            self.top_managers.is_err(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}

/// Run every query against `store`
pub fn run(store: &GraphStore) -> Report {
    let engine = QueryEngine::new(store);

    let highest_seller = logged("highest seller", engine.highest_seller());
    let highest_seller_contributors = logged(
        "highest seller contributors",
        match &highest_seller {
            Ok(Some(product)) => engine.contributors(product).map(Some),
            Ok(None) => Ok(None),
            Err(_) => Err(QueryError::UpstreamFailed {
                upstream: "highest seller",
            }),
        },
    );
    let lowest_seller_designers =
        logged("lowest seller designers", engine.lowest_seller_designers());
    let top_programmers = logged("top programmers", engine.top_programmers());
    let top_managers = logged("top managers", engine.top_managers());

    Report {
        highest_seller,
        highest_seller_contributors,
        lowest_seller_designers,
        top_programmers,
        top_managers,
    }
}

fn logged<T>(query: &'static str, result: QueryResult<T>) -> QueryResult<T> {
    match &result {
        Ok(Some(_)) => info!(query, "query finished"),
        Ok(None) => info!(query, "query found no data"),
        Err(err) => warn!(query, error = %err, "query failed"),
    }
    result
}
