use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Topic label that marks uncategorized messages; never aggregated.
pub const EXCLUDED_TOPIC: &str = "Otros";

/// Opaque message identifier, only ever compared for distinct counts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// One categorized social-media message.
///
/// Every cell except `percentage` may be null in the published export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRow {
    /// `Some(true)` when the monitored account itself wrote the message.
    pub sender: Option<bool>,
    /// Rows without an id never add to a distinct count.
    pub msg_id: Option<MessageId>,
    pub region: Option<String>,
    pub comuna: Option<String>,
    /// Topic.
    pub cat2: Option<String>,
    /// Sub-topic, nested under `cat2`.
    pub cat3: Option<String>,
    /// Source-supplied share of the row's sub-topic; not normalized.
    pub percentage: f64,
}

impl MessageRow {
    /// `true` only for a row known to come from the public; a null
    /// `sender` is not.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.sender == Some(false)
    }

    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.msg_id.as_ref().map(MessageId::as_str)
    }

    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    #[must_use]
    pub fn comuna(&self) -> Option<&str> {
        self.comuna.as_deref()
    }

    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.cat2.as_deref()
    }

    #[must_use]
    pub fn subtopic(&self) -> Option<&str> {
        self.cat3.as_deref()
    }
}

/// Immutable table of message rows.
///
/// Every filtering stage produces a new `Dataset`; rows are never edited in
/// place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    rows: Vec<MessageRow>,
}

impl Dataset {
    #[must_use]
    pub fn new(rows: Vec<MessageRow>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[MessageRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MessageRow> {
        self.rows.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<MessageRow> for Dataset {
    fn from_iter<I: IntoIterator<Item = MessageRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a MessageRow;
    type IntoIter = std::slice::Iter<'a, MessageRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Multi-valued selections for region, comuna and topic.
///
/// An empty set at any level means "no constraint at this level", not
/// "match nothing".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub regions: BTreeSet<String>,
    #[serde(default)]
    pub comunas: BTreeSet<String>,
    #[serde(default)]
    pub topics: BTreeSet<String>,
}

impl FilterSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_comunas<I, S>(mut self, comunas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comunas = comunas.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    /// `true` when a region or a comuna is selected; sub-topic detail is
    /// only shown for a chosen location.
    #[must_use]
    pub fn has_location(&self) -> bool {
        !self.regions.is_empty() || !self.comunas.is_empty()
    }

    /// Same location selection with the topic level left unconstrained.
    #[must_use]
    pub fn without_topics(&self) -> Self {
        Self {
            regions: self.regions.clone(),
            comunas: self.comunas.clone(),
            topics: BTreeSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(msg_id: &str, cat2: Option<&str>) -> MessageRow {
        MessageRow {
            sender: Some(false),
            msg_id: Some(MessageId::from(msg_id)),
            region: Some("A".to_string()),
            comuna: Some("X".to_string()),
            cat2: cat2.map(str::to_string),
            cat3: None,
            percentage: 0.0,
        }
    }

    #[test]
    fn default_selection_has_no_location() {
        assert!(!FilterSelection::new().has_location());
    }

    #[test]
    fn comuna_alone_counts_as_location() {
        let selection = FilterSelection::new().with_comunas(["Providencia"]);
        assert!(selection.has_location());
    }

    #[test]
    fn without_topics_keeps_location() {
        let selection = FilterSelection::new()
            .with_regions(["Metropolitana"])
            .with_topics(["Vivienda"]);
        let stripped = selection.without_topics();
        assert!(stripped.topics.is_empty());
        assert_eq!(stripped.regions, selection.regions);
    }

    #[test]
    fn selection_deserializes_with_missing_levels() {
        let selection: FilterSelection =
            serde_json::from_str(r#"{"regions":["A"]}"#).expect("deserialize");
        assert_eq!(selection.regions.len(), 1);
        assert!(selection.comunas.is_empty());
        assert!(selection.topics.is_empty());
    }

    #[test]
    fn dataset_collects_rows_in_order() {
        let dataset: Dataset = vec![row("1", Some("T1")), row("2", None)]
            .into_iter()
            .collect();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows()[0].topic(), Some("T1"));
        assert_eq!(dataset.rows()[1].topic(), None);
    }

    #[test]
    fn null_sender_is_not_public() {
        let mut unknown = row("1", Some("T1"));
        unknown.sender = None;
        assert!(!unknown.is_public());
        assert!(row("2", Some("T1")).is_public());
    }

    #[test]
    fn message_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&MessageId::from("42")).expect("serialize");
        assert_eq!(json, "\"42\"");
    }
}
