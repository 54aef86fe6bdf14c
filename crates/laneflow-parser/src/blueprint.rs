//! Serde schema of blueprint documents and lowering into the semantic model.
//!
//! Two document shapes are accepted: the bare form
//! (`{"nodes": [...], "lanes": [...]}`) and the workflow envelope
//! (`{"name": ..., "blueprint_spec": {...}}`). Fields the converter has no use
//! for (`parameters`, `requirements`, lane `rule`, ...) are ignored.

use std::fmt;

use log::debug;
use serde::{
    Deserialize, Deserializer,
    de::{self, Unexpected, Visitor},
};
use serde_json::Value;

use laneflow_core::{
    identifier::Id,
    semantic::{Blueprint, Branch, Lane, Node, NodeKind, Successors},
};

#[derive(Debug, Deserialize)]
pub(crate) struct RawDocument {
    name: Option<String>,
    blueprint_spec: Option<RawSpec>,
    nodes: Option<Vec<RawNode>>,
    lanes: Option<Vec<RawLane>>,
}

#[derive(Debug, Deserialize)]
struct RawSpec {
    nodes: Option<Vec<RawNode>>,
    lanes: Option<Vec<RawLane>>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    id: RawId,
    #[serde(rename = "type")]
    kind: String,
    name: Option<String>,
    lane_id: RawId,
    #[serde(default)]
    next: Value,
}

#[derive(Debug, Deserialize)]
struct RawLane {
    id: RawId,
    name: Option<String>,
}

/// A node or lane id written either as a string or as an integer.
#[derive(Debug)]
struct RawId(Id);

impl<'de> Deserialize<'de> for RawId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl<'de> Visitor<'de> for IdVisitor {
            type Value = RawId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer id")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<RawId, E> {
                Ok(RawId(Id::new(value)))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<RawId, E> {
                Ok(RawId(Id::from_number(value)))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<RawId, E> {
                i64::try_from(value)
                    .map(|value| RawId(Id::from_number(value)))
                    .map_err(|_| E::invalid_value(Unexpected::Unsigned(value), &self))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

impl RawDocument {
    /// Lowers the document into a [`Blueprint`].
    ///
    /// When a `blueprint_spec` is present its collections win over any
    /// top-level `nodes`/`lanes`.
    pub(crate) fn into_blueprint(self) -> Blueprint {
        let (nodes, lanes) = match self.blueprint_spec {
            Some(spec) => (spec.nodes, spec.lanes),
            None => (self.nodes, self.lanes),
        };

        let nodes = nodes.map(|nodes| nodes.into_iter().map(RawNode::into_node).collect());
        let lanes = lanes.map(|lanes| lanes.into_iter().map(RawLane::into_lane).collect());

        let blueprint = Blueprint::new(nodes, lanes);
        match self.name {
            Some(name) => blueprint.with_name(name),
            None => blueprint,
        }
    }
}

impl RawNode {
    fn into_node(self) -> Node {
        let next = classify_next(&self.next);
        if let Successors::Unsupported(shape) = &next {
            debug!(node:% = self.id.0, shape = shape.as_str(); "Node has a `next` of unsupported shape");
        }
        Node::new(
            self.id.0,
            NodeKind::from_tag(&self.kind),
            self.name.unwrap_or_default(),
            self.lane_id.0,
            next,
        )
    }
}

impl RawLane {
    fn into_lane(self) -> Lane {
        Lane::new(self.id.0, self.name.unwrap_or_default())
    }
}

/// Decides the [`Successors`] variant of a raw `next` value.
fn classify_next(next: &Value) -> Successors {
    match next {
        Value::Null => Successors::None,
        Value::Object(branches) => {
            let mut lowered = Vec::with_capacity(branches.len());
            for (label, target) in branches {
                match value_as_id(target) {
                    Some(target) => lowered.push(Branch::new(label.as_str(), target)),
                    None => {
                        return Successors::Unsupported(format!(
                            "object with {} branch target",
                            value_kind(target)
                        ));
                    }
                }
            }
            Successors::Branches(lowered)
        }
        other => match value_as_id(other) {
            Some(target) => Successors::Single(target),
            None => Successors::Unsupported(value_kind(other).to_string()),
        },
    }
}

fn value_as_id(value: &Value) -> Option<Id> {
    match value {
        Value::String(text) => Some(Id::new(text)),
        Value::Number(number) => number.as_i64().map(Id::from_number),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
