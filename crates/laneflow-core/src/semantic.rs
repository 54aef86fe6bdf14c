//! Semantic model of a process blueprint.
//!
//! A [`Blueprint`] is what the parser produces and what the layout pipeline
//! consumes. It is immutable once built; the `next` field of every node has
//! already been classified into a [`Successors`] variant.

use std::{fmt, str::FromStr};

use crate::identifier::Id;

/// Behavioral category of a blueprint node.
///
/// The set is closed: any type tag the converter does not recognize is a
/// [`NodeKind::Task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Start,
    Finish,
    /// Branching decision point.
    Flow,
    SystemTask,
    UserTask,
    ScriptTask,
    /// Any other activity type.
    Task,
}

impl NodeKind {
    /// Returns the rendered shape for this kind.
    pub fn shape(self) -> ShapeKind {
        match self {
            NodeKind::Start => ShapeKind::StartEvent,
            NodeKind::Finish => ShapeKind::EndEvent,
            NodeKind::Flow => ShapeKind::ExclusiveGateway,
            NodeKind::SystemTask => ShapeKind::ServiceTask,
            NodeKind::UserTask => ShapeKind::UserTask,
            NodeKind::ScriptTask => ShapeKind::ScriptTask,
            NodeKind::Task => ShapeKind::Task,
        }
    }

    /// Returns how the node's box is placed inside its grid cell.
    pub fn bounds_strategy(self) -> BoundsStrategy {
        match self {
            NodeKind::Start => BoundsStrategy::StartEvent,
            NodeKind::Finish => BoundsStrategy::EndEvent,
            NodeKind::Flow => BoundsStrategy::Gateway,
            NodeKind::SystemTask | NodeKind::UserTask | NodeKind::ScriptTask | NodeKind::Task => {
                BoundsStrategy::Activity
            }
        }
    }

    /// Whether the node may have sequence flows leaving it.
    pub fn has_outgoing(self) -> bool {
        self != NodeKind::Finish
    }

    /// Whether the node may have sequence flows arriving at it.
    pub fn has_incoming(self) -> bool {
        self != NodeKind::Start
    }

    /// Maps a blueprint type tag to its kind.
    ///
    /// Tags must match exactly; any other tag, including a differently
    /// cased known one, maps to [`NodeKind::Task`].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Start" => NodeKind::Start,
            "Finish" => NodeKind::Finish,
            "Flow" => NodeKind::Flow,
            "SystemTask" => NodeKind::SystemTask,
            "UserTask" => NodeKind::UserTask,
            "ScriptTask" => NodeKind::ScriptTask,
            _ => NodeKind::Task,
        }
    }
}

impl FromStr for NodeKind {
    type Err = std::convert::Infallible;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_tag(tag))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            NodeKind::Start => "Start",
            NodeKind::Finish => "Finish",
            NodeKind::Flow => "Flow",
            NodeKind::SystemTask => "SystemTask",
            NodeKind::UserTask => "UserTask",
            NodeKind::ScriptTask => "ScriptTask",
            NodeKind::Task => "Task",
        };
        f.write_str(tag)
    }
}

/// BPMN shape a node is rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    StartEvent,
    EndEvent,
    ExclusiveGateway,
    ServiceTask,
    UserTask,
    ScriptTask,
    Task,
}

impl ShapeKind {
    /// The BPMN 2.0 element name, without namespace prefix.
    pub fn element_name(self) -> &'static str {
        match self {
            ShapeKind::StartEvent => "startEvent",
            ShapeKind::EndEvent => "endEvent",
            ShapeKind::ExclusiveGateway => "exclusiveGateway",
            ShapeKind::ServiceTask => "serviceTask",
            ShapeKind::UserTask => "userTask",
            ShapeKind::ScriptTask => "scriptTask",
            ShapeKind::Task => "task",
        }
    }
}

/// Placement rule for a node's box within its grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundsStrategy {
    /// Small circle flush with the right edge of the cell.
    StartEvent,
    /// Small circle flush with the left edge of the cell.
    EndEvent,
    /// Diamond centered in the cell.
    Gateway,
    /// Full-size activity box.
    Activity,
}

/// One labelled outcome of a [`NodeKind::Flow`] node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    label: String,
    target: Id,
}

impl Branch {
    pub fn new(label: impl Into<String>, target: Id) -> Self {
        Self {
            label: label.into(),
            target,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn target(&self) -> Id {
        self.target
    }
}

/// The `next` field of a node, classified once when the blueprint is read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Successors {
    /// No successor, such as a finish node.
    #[default]
    None,
    /// A single successor.
    Single(Id),
    /// Labelled branches in declaration order.
    Branches(Vec<Branch>),
    /// A `next` value of a shape the converter does not understand. Holds
    /// the name of the shape that was found.
    Unsupported(String),
}

impl Successors {
    /// Returns the distinct successor ids in declaration order.
    ///
    /// Several branch labels may lead to the same target; only the first
    /// occurrence is kept.
    ///
    /// ```
    /// use laneflow_core::identifier::Id;
    /// use laneflow_core::semantic::{Branch, Successors};
    ///
    /// let next = Successors::Branches(vec![
    ///     Branch::new("yes", Id::new("approve")),
    ///     Branch::new("maybe", Id::new("approve")),
    ///     Branch::new("no", Id::new("reject")),
    /// ]);
    /// assert_eq!(next.distinct_targets(), vec![Id::new("approve"), Id::new("reject")]);
    /// ```
    pub fn distinct_targets(&self) -> Vec<Id> {
        match self {
            Successors::None | Successors::Unsupported(_) => Vec::new(),
            Successors::Single(target) => vec![*target],
            Successors::Branches(branches) => {
                let mut targets: Vec<Id> = Vec::with_capacity(branches.len());
                for branch in branches {
                    if !targets.contains(&branch.target) {
                        targets.push(branch.target);
                    }
                }
                targets
            }
        }
    }

    /// Iterates over every referenced target, duplicates included.
    pub fn referenced_targets(&self) -> impl Iterator<Item = Id> + '_ {
        let (single, branches): (Option<Id>, &[Branch]) = match self {
            Successors::Single(target) => (Some(*target), &[]),
            Successors::Branches(branches) => (None, branches.as_slice()),
            Successors::None | Successors::Unsupported(_) => (None, &[]),
        };
        single
            .into_iter()
            .chain(branches.iter().map(Branch::target))
    }
}

/// A single step of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: Id,
    kind: NodeKind,
    name: String,
    lane_id: Id,
    next: Successors,
}

impl Node {
    pub fn new(id: Id, kind: NodeKind, name: impl Into<String>, lane_id: Id, next: Successors) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            lane_id,
            next,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lane_id(&self) -> Id {
        self.lane_id
    }

    pub fn next(&self) -> &Successors {
        &self.next
    }
}

/// A horizontal band grouping nodes, usually one per actor or role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lane {
    id: Id,
    name: String,
}

impl Lane {
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A complete process blueprint.
///
/// `nodes` and `lanes` are optional so that a document missing either one
/// can still be represented and rejected during validation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Blueprint {
    name: Option<String>,
    nodes: Option<Vec<Node>>,
    lanes: Option<Vec<Lane>>,
}

impl Blueprint {
    pub fn new(nodes: Option<Vec<Node>>, lanes: Option<Vec<Lane>>) -> Self {
        Self {
            name: None,
            nodes,
            lanes,
        }
    }

    /// Sets the workflow name used for the participant.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn nodes(&self) -> Option<&[Node]> {
        self.nodes.as_deref()
    }

    pub fn lanes(&self) -> Option<&[Lane]> {
        self.lanes.as_deref()
    }
}
