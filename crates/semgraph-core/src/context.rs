//! Contextual signals: where entities appear and which appear together.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Normalizes an entity label for use as a co-occurrence or context key.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// How close together two entities were observed.
///
/// `SameSentence` is the tightest, `SamePage` the loosest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proximity {
    SameSentence,
    SameSection,
    #[default]
    SamePage,
}

impl Proximity {
    /// Higher rank means closer.
    fn rank(&self) -> u8 {
        match self {
            Proximity::SameSentence => 3,
            Proximity::SameSection => 2,
            Proximity::SamePage => 1,
        }
    }

    /// Returns true if `self` is strictly closer than `other`.
    pub fn is_closer_than(&self, other: Proximity) -> bool {
        self.rank() > other.rank()
    }

    /// Returns the closer of the two observations.
    pub fn tightest(self, other: Proximity) -> Proximity {
        if other.is_closer_than(self) {
            other
        } else {
            self
        }
    }

    /// Scoring multiplier applied to co-occurrence strength.
    pub fn multiplier(&self) -> f64 {
        match self {
            Proximity::SameSentence => 1.0,
            Proximity::SameSection => 0.7,
            Proximity::SamePage => 0.4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Proximity::SameSentence => "same_sentence",
            Proximity::SameSection => "same_section",
            Proximity::SamePage => "same_page",
        }
    }
}

impl std::fmt::Display for Proximity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Proximity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "same_sentence" => Ok(Proximity::SameSentence),
            "same_section" => Ok(Proximity::SameSection),
            "same_page" => Ok(Proximity::SamePage),
            _ => Err(ParseError::Proximity(s.to_string())),
        }
    }
}

/// Where on a page an entity was mentioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityPosition {
    H1,
    H2,
    H3,
    Body,
    AltText,
    Meta,
}

impl EntityPosition {
    /// Fixed prominence weight of the position.
    pub fn weight(&self) -> f64 {
        match self {
            EntityPosition::H1 => 1.0,
            EntityPosition::H2 => 0.8,
            EntityPosition::H3 => 0.6,
            EntityPosition::Body => 0.4,
            EntityPosition::AltText => 0.5,
            EntityPosition::Meta => 0.3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPosition::H1 => "h1",
            EntityPosition::H2 => "h2",
            EntityPosition::H3 => "h3",
            EntityPosition::Body => "body",
            EntityPosition::AltText => "alt_text",
            EntityPosition::Meta => "meta",
        }
    }
}

impl std::fmt::Display for EntityPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityPosition {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h1" => Ok(EntityPosition::H1),
            "h2" => Ok(EntityPosition::H2),
            "h3" => Ok(EntityPosition::H3),
            "body" => Ok(EntityPosition::Body),
            "alt_text" => Ok(EntityPosition::AltText),
            "meta" => Ok(EntityPosition::Meta),
            _ => Err(ParseError::Position(s.to_string())),
        }
    }
}

/// Accumulated observations of two entities appearing together.
///
/// `entity_a` and `entity_b` are normalized labels with `entity_a <= entity_b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoOccurrence {
    pub entity_a: String,
    pub entity_b: String,
    #[serde(default)]
    pub count: u64,
    /// Distinct context identifiers (page URLs, section anchors), in first-seen order.
    #[serde(default)]
    pub contexts: Vec<String>,
    #[serde(default)]
    pub proximity: Proximity,
}

impl CoOccurrence {
    /// Creates an empty record for the pair, ordering the labels.
    pub fn new(a: &str, b: &str) -> Self {
        let (entity_a, entity_b) = Self::key(a, b);
        Self {
            entity_a,
            entity_b,
            count: 0,
            contexts: Vec::new(),
            proximity: Proximity::SamePage,
        }
    }

    /// Order-independent key for a pair of labels.
    pub fn key(a: &str, b: &str) -> (String, String) {
        let a = normalize_label(a);
        let b = normalize_label(b);
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Records one more observation.
    pub fn observe(&mut self, context: &str, proximity: Proximity) {
        self.count += 1;
        self.add_context(context);
        self.proximity = self.proximity.tightest(proximity);
    }

    /// Folds another record for the same pair into this one without
    /// ever lowering the count or loosening the proximity.
    pub fn merge(&mut self, other: &CoOccurrence) {
        self.count = self.count.max(other.count);
        for context in &other.contexts {
            self.add_context(context);
        }
        self.proximity = self.proximity.tightest(other.proximity);
    }

    fn add_context(&mut self, context: &str) {
        if !context.is_empty() && !self.contexts.iter().any(|c| c == context) {
            self.contexts.push(context.to_string());
        }
    }
}

/// One placement of an entity on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityContext {
    pub entity_id: String,
    pub position: EntityPosition,
    pub page_url: String,
    #[serde(default)]
    pub weight: f64,
}

impl EntityContext {
    pub fn new(
        entity_id: impl Into<String>,
        position: EntityPosition,
        page_url: impl Into<String>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            position,
            page_url: page_url.into(),
            weight: position.weight(),
        }
    }

    /// Returns true if both describe the same entity, page and position.
    pub fn same_placement(&self, other: &EntityContext) -> bool {
        self.entity_id == other.entity_id
            && self.page_url == other.page_url
            && self.position == other.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_order_independent() {
        assert_eq!(CoOccurrence::key("Beta", "alpha"), CoOccurrence::key("ALPHA", " beta "));
    }

    #[test]
    fn test_proximity_only_tightens() {
        let mut record = CoOccurrence::new("a", "b");
        record.observe("p1", Proximity::SameSection);
        assert_eq!(record.proximity, Proximity::SameSection);

        record.observe("p2", Proximity::SamePage);
        assert_eq!(record.proximity, Proximity::SameSection);

        record.observe("p2", Proximity::SameSentence);
        assert_eq!(record.proximity, Proximity::SameSentence);
        assert_eq!(record.count, 3);
        assert_eq!(record.contexts, vec!["p1", "p2"]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut incoming = CoOccurrence::new("a", "b");
        incoming.observe("p1", Proximity::SameSentence);
        incoming.observe("p2", Proximity::SamePage);

        let mut record = CoOccurrence::new("b", "a");
        record.merge(&incoming);
        record.merge(&incoming);

        assert_eq!(record.count, 2);
        assert_eq!(record.contexts.len(), 2);
        assert_eq!(record.proximity, Proximity::SameSentence);
    }

    #[test]
    fn test_position_weights() {
        assert_eq!(EntityPosition::H1.weight(), 1.0);
        assert_eq!(EntityPosition::AltText.weight(), 0.5);
        assert_eq!(EntityPosition::Meta.weight(), 0.3);
        assert_eq!("alt_text".parse::<EntityPosition>(), Ok(EntityPosition::AltText));
    }

    #[test]
    fn test_wire_names() {
        let ctx = EntityContext::new("seo", EntityPosition::AltText, "https://example.com");
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["position"], "alt_text");
        assert_eq!(json["pageUrl"], "https://example.com");

        let record = CoOccurrence::new("x", "y");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["proximity"], "same_page");
        assert_eq!(json["entityA"], "x");
    }

    #[test]
    fn test_context_without_weight_deserializes() {
        let ctx: EntityContext = serde_json::from_str(
            r#"{"entityId": "seo", "position": "h2", "pageUrl": "/guide"}"#,
        )
        .unwrap();
        assert_eq!(ctx.position, EntityPosition::H2);
        assert_eq!(ctx.weight, 0.0);
    }
}
