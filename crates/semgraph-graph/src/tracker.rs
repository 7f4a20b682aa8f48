//! Co-occurrence and positional context tracking.
//!
//! Both collections are keyed by normalized entity labels rather than node
//! IDs: callers report what they saw on a page before (or without) deciding
//! which node it maps to. Records only ever grow: counts increase, contexts
//! are added, proximity tightens.

use crate::graph::KnowledgeGraph;
use semgraph_core::{normalize_label, CoOccurrence, EntityContext, EntityPosition, Proximity};
use std::collections::HashSet;

/// Score returned for pairs never observed together.
pub const NEUTRAL_CO_OCCURRENCE: f64 = 0.5;

/// Weight returned for entities with no recorded context.
pub const NEUTRAL_CONTEXT_WEIGHT: f64 = 0.5;

/// Bonus per distinct position an entity appears in.
const VARIETY_BONUS_STEP: f64 = 0.1;

/// Cap on the position variety bonus.
const VARIETY_BONUS_CAP: f64 = 0.3;

impl KnowledgeGraph {
    /// Records that two entities were seen together in `context`.
    pub fn add_co_occurrence(&mut self, a: &str, b: &str, context: &str, proximity: Proximity) {
        self.co_occurrences
            .entry(CoOccurrence::key(a, b))
            .or_insert_with(|| CoOccurrence::new(a, b))
            .observe(context, proximity);
    }

    /// Folds a previously exported record into the tracker.
    ///
    /// The labels are re-normalized, so records written by older exports
    /// with mixed-case labels land on the same key as fresh observations.
    pub fn merge_co_occurrence(&mut self, record: &CoOccurrence) {
        self.co_occurrences
            .entry(CoOccurrence::key(&record.entity_a, &record.entity_b))
            .or_insert_with(|| CoOccurrence::new(&record.entity_a, &record.entity_b))
            .merge(record);
    }

    /// Gets the raw record for a pair, in either order.
    pub fn get_co_occurrence(&self, a: &str, b: &str) -> Option<&CoOccurrence> {
        self.co_occurrences.get(&CoOccurrence::key(a, b))
    }

    /// Iterates over all co-occurrence records, ordered by key.
    pub fn co_occurrences(&self) -> impl Iterator<Item = &CoOccurrence> {
        self.co_occurrences.values()
    }

    /// Strength of the co-occurrence signal, in `[0.5, 1.0]`.
    ///
    /// Grows with the log of the observation count and is damped by how
    /// loose the tightest observation was. Unseen pairs score a neutral 0.5.
    pub fn get_co_occurrence_score(&self, a: &str, b: &str) -> f64 {
        let Some(record) = self.get_co_occurrence(a, b) else {
            return NEUTRAL_CO_OCCURRENCE;
        };
        let frequency = (((record.count + 1) as f64).log10() / 2.0).min(1.0);
        let score = NEUTRAL_CO_OCCURRENCE + frequency * record.proximity.multiplier() * 0.5;
        score.clamp(NEUTRAL_CO_OCCURRENCE, 1.0)
    }

    /// Records where on a page an entity was mentioned.
    ///
    /// Returns false if the same entity, page and position was already known.
    pub fn add_entity_context(
        &mut self,
        entity: &str,
        position: EntityPosition,
        page_url: &str,
    ) -> bool {
        let key = normalize_label(entity);
        let context = EntityContext::new(key.clone(), position, page_url);
        let contexts = self.contexts.entry(key).or_default();
        if contexts.iter().any(|c| c.same_placement(&context)) {
            return false;
        }
        contexts.push(context);
        true
    }

    /// Gets the recorded contexts for an entity label.
    pub fn get_entity_contexts(&self, entity: &str) -> &[EntityContext] {
        self.contexts
            .get(&normalize_label(entity))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterates over `(label, contexts)` pairs, ordered by label.
    pub fn entity_contexts(&self) -> impl Iterator<Item = (&String, &Vec<EntityContext>)> {
        self.contexts.iter()
    }

    /// Prominence of an entity across its placements, in `[0, 1]`.
    ///
    /// Average position weight plus a bonus for appearing in several kinds
    /// of position.
    pub fn calculate_context_weight(&self, entity: &str) -> f64 {
        let contexts = self.get_entity_contexts(entity);
        if contexts.is_empty() {
            return NEUTRAL_CONTEXT_WEIGHT;
        }

        let average = contexts.iter().map(|c| c.weight).sum::<f64>() / contexts.len() as f64;
        let distinct: HashSet<EntityPosition> = contexts.iter().map(|c| c.position).collect();
        let variety = (VARIETY_BONUS_STEP * distinct.len() as f64).min(VARIETY_BONUS_CAP);

        (average + variety).min(1.0)
    }

    /// Geometric mean of the two entities' context weights.
    pub fn get_combined_context_weight(&self, a: &str, b: &str) -> f64 {
        (self.calculate_context_weight(a) * self.calculate_context_weight(b)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_unknown_pair_is_neutral() {
        let graph = KnowledgeGraph::new();
        assert_eq!(graph.get_co_occurrence_score("a", "b"), 0.5);
    }

    #[test]
    fn test_single_page_observation() {
        let mut graph = KnowledgeGraph::new();
        graph.add_co_occurrence("SEO", "Backlinks", "p1", Proximity::SamePage);

        // 0.5 + (log10(2) / 2) * 0.4 * 0.5
        let expected = 0.5 + (2f64.log10() / 2.0) * 0.4 * 0.5;
        assert!(approx(graph.get_co_occurrence_score("backlinks", "seo"), expected));
    }

    #[test]
    fn test_count_and_contexts() {
        let mut graph = KnowledgeGraph::new();
        graph.add_co_occurrence("a", "b", "p1", Proximity::SamePage);
        graph.add_co_occurrence("B", "A", "p1", Proximity::SameSection);
        graph.add_co_occurrence("a", "b", "p2", Proximity::SamePage);

        let record = graph.get_co_occurrence("a", "b").unwrap();
        assert_eq!(record.count, 3);
        assert_eq!(record.contexts, vec!["p1", "p2"]);
        assert_eq!(record.proximity, Proximity::SameSection);
    }

    #[test]
    fn test_score_saturates() {
        let mut graph = KnowledgeGraph::new();
        for i in 0..200 {
            graph.add_co_occurrence("a", "b", &format!("p{i}"), Proximity::SameSentence);
        }
        assert!(approx(graph.get_co_occurrence_score("a", "b"), 1.0));
    }

    #[test]
    fn test_context_dedup() {
        let mut graph = KnowledgeGraph::new();
        assert!(graph.add_entity_context("SEO", EntityPosition::H1, "/a"));
        assert!(!graph.add_entity_context("seo", EntityPosition::H1, "/a"));
        assert!(graph.add_entity_context("seo", EntityPosition::Body, "/a"));
        assert_eq!(graph.get_entity_contexts("SEO").len(), 2);
    }

    #[test]
    fn test_context_weight() {
        let mut graph = KnowledgeGraph::new();
        assert_eq!(graph.calculate_context_weight("seo"), 0.5);

        graph.add_entity_context("seo", EntityPosition::H2, "/a");
        graph.add_entity_context("seo", EntityPosition::Body, "/b");
        // avg(0.8, 0.4) + 0.2
        assert!(approx(graph.calculate_context_weight("seo"), 0.8));

        graph.add_entity_context("seo", EntityPosition::H1, "/c");
        graph.add_entity_context("seo", EntityPosition::H1, "/d");
        // avg(0.8, 0.4, 1.0, 1.0) + 0.3, capped
        assert!(approx(graph.calculate_context_weight("seo"), 1.0));
    }

    #[test]
    fn test_combined_context_weight() {
        let mut graph = KnowledgeGraph::new();
        graph.add_entity_context("a", EntityPosition::Meta, "/a");
        // a = 0.3 + 0.1 = 0.4, b = neutral 0.5
        assert!(approx(graph.get_combined_context_weight("a", "b"), (0.4f64 * 0.5).sqrt()));
    }
}
