//! Relationship validation functionality
//!
//! Validates relationships for self references and circular dependencies, and
//! orders tables so every referenced table precedes the tables pointing at it.

use crate::models::{DBRelationship, DBTable, Diagram};
use crate::models::Cardinality;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::NodeIndex;
use petgraph::{Directed, Graph};
use std::collections::HashMap;

/// Circular dependency detected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularDependency {
    /// Table ids taking part in the cycle
    pub table_ids: Vec<String>,
}

/// Self-reference detected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfReference {
    pub relationship_id: String,
    pub table_id: String,
}

/// Table id of the side holding the foreign-key column, and the referenced side
///
/// Follows export placement: one→many puts the key on the target, many→one
/// and one:one on the source. Many:many carries no key.
pub fn foreign_key_sides(relationship: &DBRelationship) -> Option<(&str, &str)> {
    match (
        relationship.source_cardinality,
        relationship.target_cardinality,
    ) {
        (Cardinality::One, Cardinality::Many) => Some((
            relationship.target_table_id.as_str(),
            relationship.source_table_id.as_str(),
        )),
        (Cardinality::Many, Cardinality::One) | (Cardinality::One, Cardinality::One) => Some((
            relationship.source_table_id.as_str(),
            relationship.target_table_id.as_str(),
        )),
        (Cardinality::Many, Cardinality::Many) => None,
    }
}

/// Relationship validator
#[derive(Debug, Default)]
pub struct RelationshipValidator;

impl RelationshipValidator {
    /// Create a new relationship validator
    pub fn new() -> Self {
        Self
    }

    /// Dependency graph: an edge from each referenced table to each table holding a key to it
    fn dependency_graph<'a>(
        &self,
        diagram: &'a Diagram,
    ) -> (Graph<&'a str, (), Directed>, HashMap<&'a str, NodeIndex>) {
        let mut graph = Graph::<&str, (), Directed>::new();
        let mut node_map = HashMap::new();
        for table in &diagram.tables {
            node_map.insert(table.id.as_str(), graph.add_node(table.id.as_str()));
        }
        for relationship in &diagram.relationships {
            let Some((holder, referenced)) = foreign_key_sides(relationship) else {
                continue;
            };
            if holder == referenced {
                continue;
            }
            if let (Some(&from), Some(&to)) = (node_map.get(referenced), node_map.get(holder)) {
                graph.update_edge(from, to, ());
            }
        }
        (graph, node_map)
    }

    /// Tables ordered so referenced tables come first
    ///
    /// Falls back to declaration order when the relationships form a cycle.
    pub fn dependency_order<'a>(&self, diagram: &'a Diagram) -> Vec<&'a DBTable> {
        let (graph, _) = self.dependency_graph(diagram);
        match toposort(&graph, None) {
            Ok(order) => order
                .into_iter()
                .filter_map(|node| diagram.table_by_id(graph[node]))
                .collect(),
            Err(_) => diagram.tables.iter().collect(),
        }
    }

    /// Strongly connected groups of more than one table
    pub fn find_cycles(&self, diagram: &Diagram) -> Vec<CircularDependency> {
        let (graph, _) = self.dependency_graph(diagram);
        tarjan_scc(&graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|component| CircularDependency {
                table_ids: component.iter().map(|n| graph[*n].to_string()).collect(),
            })
            .collect()
    }

    /// Would a key from `holder_table_id` to `referenced_table_id` close a cycle
    pub fn check_circular_dependency(
        &self,
        diagram: &Diagram,
        holder_table_id: &str,
        referenced_table_id: &str,
    ) -> bool {
        let (graph, node_map) = self.dependency_graph(diagram);
        let (Some(&from), Some(&to)) = (
            node_map.get(holder_table_id),
            node_map.get(referenced_table_id),
        ) else {
            return false;
        };
        petgraph::algo::has_path_connecting(&graph, from, to, None)
    }

    /// Relationships whose two ends are the same table
    pub fn self_references(&self, diagram: &Diagram) -> Vec<SelfReference> {
        diagram
            .relationships
            .iter()
            .filter(|r| r.source_table_id == r.target_table_id)
            .map(|r| SelfReference {
                relationship_id: r.id.clone(),
                table_id: r.source_table_id.clone(),
            })
            .collect()
    }
}
