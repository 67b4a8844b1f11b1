//! Live, partially constructed JSON values.
//!
//! A [`PartialNode`] is the unit of observable state during a parse: a
//! snapshot of the best-known value so far, paired with a one-shot
//! completion signal that fires once the node will never change again.
//! Builders mutate the snapshot through a [`NodeWriter`] while any number of
//! observers read it concurrently; the writer never holds the snapshot lock
//! across a suspension, so observers never see a half-written mutation.
//!
//! Ownership is strictly tree-shaped: a container's snapshot owns handles to
//! its children, and external observers hold non-owning cloned handles.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::watch;

use crate::{
    error::ParseError,
    value::{Map, Value},
};

/// The snapshot of a value that is still being parsed.
///
/// Scalars hold their best-known value directly; containers hold live
/// handles to their children, so a child attached to an observed container
/// is immediately visible even while the child itself is still parsing.
#[derive(Debug, Clone, Default)]
pub enum PartialValue {
    /// `null`, and the placeholder before a value's type is known.
    #[default]
    Null,
    /// A boolean literal.
    Boolean(bool),
    /// The best numeric interpretation of the digits consumed so far.
    Number(f64),
    /// The string content decoded so far, closing quote not yet required.
    String(String),
    /// Array elements, each attached as soon as it is dispatched.
    Array(Vec<PartialNode>),
    /// Object members in insertion order, each attached as soon as its key
    /// is known.
    Object(IndexMap<String, PartialNode>),
}

impl PartialValue {
    /// Returns `true` if the snapshot is [`Null`](PartialValue::Null).
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The boolean value, if this is a boolean snapshot.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The numeric value, if this is a number snapshot.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The string content, if this is a string snapshot.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The child at `index`, if this is an array snapshot.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&PartialNode> {
        match self {
            Self::Array(items) => items.get(index),
            _ => None,
        }
    }

    /// The child under `key`, if this is an object snapshot.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PartialNode> {
        match self {
            Self::Object(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Number of children attached so far, if this is a container snapshot.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Array(items) => Some(items.len()),
            Self::Object(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Whether this is a container snapshot with no children yet.
    #[must_use]
    pub fn is_empty(&self) -> Option<bool> {
        self.len().map(|n| n == 0)
    }
}

#[derive(Debug, Clone)]
enum Completion {
    Pending,
    Done,
    Failed(ParseError),
}

struct NodeInner {
    snapshot: RwLock<PartialValue>,
    completion: watch::Sender<Completion>,
}

/// A live handle to one JSON value being parsed.
///
/// Handles are cheap to clone and may be read from any task at any time
/// while the parse is still running. [`completion`](Self::completion) is the
/// only way to distinguish "still in progress" from "failed": a snapshot
/// observed before a failure simply remains whatever it was.
#[derive(Clone)]
pub struct PartialNode {
    inner: Arc<NodeInner>,
}

impl PartialNode {
    /// Creates an unsettled node and the writer that will drive it. This is
    /// the sole constructor; exactly one writer exists per node.
    pub(crate) fn pending(initial: PartialValue) -> (Self, NodeWriter) {
        let (completion, _) = watch::channel(Completion::Pending);
        let node = Self {
            inner: Arc::new(NodeInner {
                snapshot: RwLock::new(initial),
                completion,
            }),
        };
        let writer = NodeWriter { node: node.clone() };
        (node, writer)
    }

    fn read_snapshot(&self) -> RwLockReadGuard<'_, PartialValue> {
        self.inner
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// An owned copy of the current best-known value. Children of container
    /// snapshots are shared handles, not deep copies.
    #[must_use]
    pub fn snapshot(&self) -> PartialValue {
        self.read_snapshot().clone()
    }

    /// Reads the current snapshot without cloning it.
    pub fn with_snapshot<R>(&self, f: impl FnOnce(&PartialValue) -> R) -> R {
        f(&self.read_snapshot())
    }

    /// Whether the completion signal has fired, successfully or not.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(&*self.inner.completion.borrow(), Completion::Pending)
    }

    /// Waits until no further mutation will occur and returns the final
    /// snapshot.
    ///
    /// Resolves exactly once per node; any number of tasks may await it
    /// concurrently, before or after the node settles.
    ///
    /// # Errors
    ///
    /// The parse error that failed this node (or a descendant, re-raised by
    /// the enclosing builders).
    pub async fn completion(&self) -> Result<PartialValue, ParseError> {
        let mut rx = self.inner.completion.subscribe();
        loop {
            {
                let state = rx.borrow_and_update();
                match &*state {
                    Completion::Done => return Ok(self.snapshot()),
                    Completion::Failed(err) => return Err(err.clone()),
                    Completion::Pending => {}
                }
            }
            if rx.changed().await.is_err() {
                // The sender lives in `inner`, which this handle keeps
                // alive, so the channel closing means the node leaked its
                // writer without settling.
                return Err(ParseError::invalid_update(
                    "completion channel closed before the node settled",
                ));
            }
        }
    }

    /// Awaits completion of this node and every descendant, producing the
    /// fully materialized plain [`Value`].
    ///
    /// # Errors
    ///
    /// The first parse error encountered anywhere in the subtree.
    pub fn resolve(&self) -> BoxFuture<'_, Result<Value, ParseError>> {
        Box::pin(async move {
            match self.completion().await? {
                PartialValue::Null => Ok(Value::Null),
                PartialValue::Boolean(b) => Ok(Value::Boolean(b)),
                PartialValue::Number(n) => Ok(Value::Number(n)),
                PartialValue::String(s) => Ok(Value::String(s)),
                PartialValue::Array(items) => {
                    let mut out = Vec::with_capacity(items.len());
                    for item in items {
                        out.push(item.resolve().await?);
                    }
                    Ok(Value::Array(out))
                }
                PartialValue::Object(entries) => {
                    let mut out = Map::with_capacity(entries.len());
                    for (key, child) in entries {
                        out.insert(key, child.resolve().await?);
                    }
                    Ok(Value::Object(out))
                }
            }
        })
    }
}

impl core::fmt::Debug for PartialNode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PartialNode")
            .field("snapshot", &*self.read_snapshot())
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// The controlled update handle passed to a builder.
///
/// The two mutation modes are separate methods rather than a flag:
/// [`replace`](Self::replace)/[`replace_with`](Self::replace_with) swap the
/// whole snapshot, while [`mutate`](Self::mutate) edits a container snapshot
/// in place so that handles already observed by readers stay attached.
#[derive(Debug, Clone)]
pub(crate) struct NodeWriter {
    node: PartialNode,
}

impl NodeWriter {
    /// The node this writer drives.
    pub(crate) fn node(&self) -> &PartialNode {
        &self.node
    }

    fn write_snapshot(&self) -> RwLockWriteGuard<'_, PartialValue> {
        self.node
            .inner
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_pending(&self) -> Result<(), ParseError> {
        if self.node.is_settled() {
            return Err(ParseError::invalid_update(
                "snapshot update after completion",
            ));
        }
        Ok(())
    }

    /// Replace mode: the snapshot becomes `value`.
    pub(crate) fn replace(&self, value: PartialValue) -> Result<(), ParseError> {
        self.ensure_pending()?;
        *self.write_snapshot() = value;
        Ok(())
    }

    /// Replace mode with an old-to-new function. The old snapshot is handed
    /// over by value, so builders can extend it without cloning.
    pub(crate) fn replace_with(
        &self,
        f: impl FnOnce(PartialValue) -> PartialValue,
    ) -> Result<(), ParseError> {
        self.ensure_pending()?;
        let mut guard = self.write_snapshot();
        let old = core::mem::take(&mut *guard);
        *guard = f(old);
        Ok(())
    }

    /// Deep mode: edits the existing container snapshot in place. The
    /// closure fails with [`ParseError::InvalidUpdate`] if the snapshot does
    /// not have the shape it requires.
    pub(crate) fn mutate(
        &self,
        f: impl FnOnce(&mut PartialValue) -> Result<(), ParseError>,
    ) -> Result<(), ParseError> {
        self.ensure_pending()?;
        f(&mut self.write_snapshot())
    }

    /// Settles the node successfully; the snapshot is frozen from here on.
    pub(crate) fn complete(&self) -> Result<(), ParseError> {
        self.ensure_pending()?;
        self.node.inner.completion.send_replace(Completion::Done);
        Ok(())
    }

    /// Settles the node with a failure. A node already settled is left
    /// untouched, so error unwinding through nested builders stays simple.
    pub(crate) fn fail(&self, err: ParseError) {
        if !self.node.is_settled() {
            self.node
                .inner
                .completion
                .send_replace(Completion::Failed(err));
        }
    }
}
