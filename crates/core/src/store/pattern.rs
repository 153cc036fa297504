//! Declarative node pattern queries
//!
//! The equivalent of `MATCH (n:LABEL) RETURN n ORDER BY n.a DESC, n.b LIMIT k`.
//! Rows come back as [`NodeRef`]s; callers map them onto typed rows.

use std::cmp::Ordering;

use crate::graph::{Graph, Label, Node, NodeRef};

/// Sort direction of an order key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// A label match with ordering and an optional row limit
#[derive(Debug, Clone)]
pub struct NodeMatch {
    label: Label,
    order: Vec<(String, Order)>,
    limit: Option<usize>,
}

impl NodeMatch {
    /// Match every node carrying `label`
    pub fn label(label: Label) -> Self {
        Self {
            label,
            order: Vec::new(),
            limit: None,
        }
    }

    /// Append an order key; earlier keys take precedence
    pub fn order_by(mut self, key: &str, order: Order) -> Self {
        self.order.push((key.to_string(), order));
        self
    }

    /// Keep at most `n` rows
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Run the match against `graph`
    ///
    /// Nodes missing an order key sort after the ones that have it, whatever
    /// the direction. Rows equal on every key keep creation order.
    pub(crate) fn execute(&self, graph: &Graph) -> Vec<NodeRef> {
        let mut rows: Vec<(NodeRef, &Node)> = graph.nodes_with_label(self.label).collect();
        rows.sort_by(|a, b| self.compare(a, b));

        let limit = self.limit.unwrap_or(rows.len());
        rows.into_iter().take(limit).map(|(node, _)| node).collect()
    }

    fn compare(&self, (a_ref, a): &(NodeRef, &Node), (b_ref, b): &(NodeRef, &Node)) -> Ordering {
        for (key, order) in &self.order {
            let ordering = match (a.property(key), b.property(key)) {
                (Some(x), Some(y)) => match order {
                    Order::Asc => x.cmp(y),
                    Order::Desc => y.cmp(x),
                },
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        a_ref.cmp(b_ref)
    }
}
