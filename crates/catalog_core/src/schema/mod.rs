//! Entity composition schema: which nested categories hang under which kind.
//!
//! # Responsibility
//! - Statically declare, per root kind, every reachable nested kind and how
//!   to read its instances from a loaded graph.
//! - Validate the declaration once, when it is built.
//!
//! # Invariants
//! - No kind repeats along any root-to-leaf path, so traversal terminates.
//!   Back-edges (child to parent) are simply never declared.
//! - Category names are canonical kind names.
//! - Children of one parent kind are unique and keep declaration order.

use crate::model::graph::EntityGraph;
use crate::model::kind::EntityKind;
use crate::model::record::{RecordId, VersionedRecord};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod catalog;

pub use catalog::catalog_schema;

/// Schema declaration and lookup errors. All of them are wiring defects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// No schema entry exists for the requested root kind.
    UnknownRoot(EntityKind),
    /// A declared root is not an addressable root kind.
    NotARootKind(EntityKind),
    DuplicateRoot(EntityKind),
    DuplicateEdge {
        parent: EntityKind,
        child: EntityKind,
    },
    /// `path` walks from a root and ends with the repeated kind.
    CyclicPath {
        root: EntityKind,
        path: Vec<EntityKind>,
    },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRoot(kind) => write!(f, "no composition schema declared for {kind}"),
            Self::NotARootKind(kind) => write!(f, "{kind} cannot be declared as a schema root"),
            Self::DuplicateRoot(kind) => write!(f, "schema root {kind} declared twice"),
            Self::DuplicateEdge { parent, child } => {
                write!(f, "category {child} declared twice under {parent}")
            }
            Self::CyclicPath { root, path } => {
                let rendered = path
                    .iter()
                    .map(|kind| kind.as_str())
                    .collect::<Vec<_>>()
                    .join(" -> ");
                write!(f, "schema for {root} repeats a kind along path {rendered}")
            }
        }
    }
}

impl Error for SchemaError {}

/// One declared category: a child kind reachable from a parent kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryEdge {
    pub child: EntityKind,
}

impl CategoryEdge {
    /// Category name reported on change.
    pub fn name(&self) -> &'static str {
        self.child.as_str()
    }

    /// Reads the category's instances attached under `parent`.
    pub fn instances<'g>(&self, graph: &'g EntityGraph, parent: RecordId) -> &'g [VersionedRecord] {
        graph.instances(parent, self.child)
    }
}

/// Validated composition schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionSchema {
    roots: Vec<EntityKind>,
    edges: BTreeMap<EntityKind, Vec<CategoryEdge>>,
}

impl CompositionSchema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Declared roots in declaration order.
    pub fn roots(&self) -> &[EntityKind] {
        &self.roots
    }

    /// Fails with `UnknownRoot` when `kind` has no schema entry.
    pub fn ensure_root(&self, kind: EntityKind) -> Result<(), SchemaError> {
        if self.roots.contains(&kind) {
            Ok(())
        } else {
            Err(SchemaError::UnknownRoot(kind))
        }
    }

    /// Direct categories under `kind`. Leaves have none.
    pub fn categories(&self, kind: EntityKind) -> &[CategoryEdge] {
        self.edges.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every category a root can report, root first, depth-first, unique.
    pub fn declared_categories(&self, root: EntityKind) -> Result<Vec<&'static str>, SchemaError> {
        self.ensure_root(root)?;
        let mut names = vec![root.as_str()];
        self.collect_names(root, &mut names);
        Ok(names)
    }

    fn collect_names(&self, kind: EntityKind, names: &mut Vec<&'static str>) {
        for edge in self.categories(kind) {
            if !names.contains(&edge.name()) {
                names.push(edge.name());
            }
            self.collect_names(edge.child, names);
        }
    }
}

/// Incremental schema declaration; `build` validates the result.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    roots: Vec<EntityKind>,
    edges: Vec<(EntityKind, EntityKind)>,
}

impl SchemaBuilder {
    pub fn root(mut self, kind: EntityKind) -> Self {
        self.roots.push(kind);
        self
    }

    /// Declares `child` as a category of `parent`.
    pub fn category(mut self, parent: EntityKind, child: EntityKind) -> Self {
        self.edges.push((parent, child));
        self
    }

    /// Declares several categories of `parent` in order.
    pub fn categories(mut self, parent: EntityKind, children: &[EntityKind]) -> Self {
        self.edges
            .extend(children.iter().map(|child| (parent, *child)));
        self
    }

    pub fn build(self) -> Result<CompositionSchema, SchemaError> {
        let mut roots = Vec::with_capacity(self.roots.len());
        for root in self.roots {
            if !root.is_root() {
                return Err(SchemaError::NotARootKind(root));
            }
            if roots.contains(&root) {
                return Err(SchemaError::DuplicateRoot(root));
            }
            roots.push(root);
        }

        let mut edges: BTreeMap<EntityKind, Vec<CategoryEdge>> = BTreeMap::new();
        for (parent, child) in self.edges {
            let siblings = edges.entry(parent).or_default();
            if siblings.iter().any(|edge| edge.child == child) {
                return Err(SchemaError::DuplicateEdge { parent, child });
            }
            siblings.push(CategoryEdge { child });
        }

        let schema = CompositionSchema { roots, edges };
        for root in &schema.roots {
            let mut path = vec![*root];
            check_paths(&schema, *root, &mut path)?;
        }
        Ok(schema)
    }
}

fn check_paths(
    schema: &CompositionSchema,
    root: EntityKind,
    path: &mut Vec<EntityKind>,
) -> Result<(), SchemaError> {
    let Some(current) = path.last().copied() else {
        return Ok(());
    };
    for edge in schema.categories(current) {
        if path.contains(&edge.child) {
            let mut cycle = path.clone();
            cycle.push(edge.child);
            return Err(SchemaError::CyclicPath { root, path: cycle });
        }
        path.push(edge.child);
        check_paths(schema, root, path)?;
        path.pop();
    }
    Ok(())
}
