//! Edge file codec.
//!
//! One edge file records that one item occupies one placement. The file name
//! is the item id; the body carries the rank used for sibling ordering.

use crate::model::item_id::ItemId;
use crate::model::placement::{Placement, PlacementHead};
use crate::model::rank::ItemRank;
use serde::{Deserialize, Serialize};

/// Schema tag written into every edge file.
pub const EDGE_SCHEMA: &str = "shelf.edge.v1";
/// Extension of edge files; anything else in an index directory is ignored.
pub const EDGE_FILE_EXTENSION: &str = "json";

/// On-disk edge record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub schema: String,
    pub rank: ItemRank,
    /// Item that owns the edge. Written for item-headed placements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ItemId>,
    /// Parent item named by the placement head.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ItemId>,
}

impl Edge {
    /// Builds the edge for `item_id` sitting at `placement`.
    pub fn for_item(item_id: ItemId, placement: &Placement, rank: ItemRank) -> Self {
        let target = match placement.head() {
            PlacementHead::Date(_) => None,
            PlacementHead::Item(parent) => Some(*parent),
            PlacementHead::Permanent => Some(ItemId::PERMANENT_ROOT),
        };
        Self {
            schema: EDGE_SCHEMA.to_string(),
            rank,
            source: target.map(|_| item_id),
            target,
        }
    }

    pub(crate) fn decode(bytes: &[u8]) -> Result<Self, String> {
        let edge: Edge = serde_json::from_slice(bytes).map_err(|err| err.to_string())?;
        if edge.schema != EDGE_SCHEMA {
            return Err(format!(
                "unsupported edge schema `{}`; expected `{EDGE_SCHEMA}`",
                edge.schema
            ));
        }
        Ok(edge)
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }
}

/// Index hit: which item sits at which placement, and with what rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeReference {
    pub item_id: ItemId,
    pub rank: ItemRank,
    pub placement: Placement,
}

#[cfg(test)]
mod tests {
    use super::{Edge, EDGE_SCHEMA};
    use crate::model::day::CalendarDay;
    use crate::model::item_id::ItemId;
    use crate::model::placement::Placement;
    use crate::model::rank::ItemRank;

    #[test]
    fn date_edges_omit_source_and_target() {
        let day = CalendarDay::parse("2025-02-10").unwrap();
        let edge = Edge::for_item(
            ItemId::generate(),
            &Placement::date(day, Vec::new()),
            ItemRank::initial(),
        );
        let json: serde_json::Value = serde_json::from_slice(&edge.encode().unwrap()).unwrap();
        assert_eq!(json["schema"], EDGE_SCHEMA);
        assert!(json.get("source").is_none());
        assert!(json.get("target").is_none());
    }

    #[test]
    fn permanent_edges_target_the_root_identity() {
        let item_id = ItemId::generate();
        let edge = Edge::for_item(item_id, &Placement::permanent(vec![1]), ItemRank::initial());
        assert_eq!(edge.source, Some(item_id));
        assert_eq!(edge.target, Some(ItemId::PERMANENT_ROOT));
    }

    #[test]
    fn decode_rejects_missing_rank_and_unknown_schema() {
        assert!(Edge::decode(br#"{"schema":"shelf.edge.v1"}"#).is_err());
        assert!(Edge::decode(br#"{"schema":"other","rank":"a"}"#).is_err());
        assert!(Edge::decode(b"not json").is_err());
        assert!(Edge::decode(br#"{"schema":"shelf.edge.v1","rank":"a"}"#).is_ok());
    }
}
