//! Command queue and scheduler.
//!
//! Commands are stored in the order they were requested. Before running,
//! the queue is stably partitioned so every trim runs after every other
//! command: a trim must see the fully assembled timeline, and anything
//! queued behind it (an audio insert at an offset, say) still expects the
//! untrimmed one. Relative order inside both groups is kept.

use framecut_common::{EditError, EditResult, FailurePolicy};
use framecut_project_model::composition::Composition;

use crate::command::{Command, CommandKind, EditContext};
use crate::engine::MediaEngine;

/// A command that failed while draining under [`FailurePolicy::BestEffort`].
#[derive(Debug)]
pub struct CommandFailure {
    /// Position in execution order.
    pub position: usize,
    pub kind: CommandKind,
    pub error: EditError,
}

/// What a drain did.
#[derive(Debug, Default)]
pub struct DrainReport {
    /// Kinds of the commands that applied, in execution order.
    pub applied: Vec<CommandKind>,
    pub failures: Vec<CommandFailure>,
}

impl DrainReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total(&self) -> usize {
        self.applied.len() + self.failures.len()
    }

    /// Failures raised by the media engine rather than by the edits.
    pub fn engine_failures(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| f.error.is_engine_failure())
            .count()
    }
}

/// Pending commands in request order.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    pending: Vec<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, command: Command) {
        tracing::trace!(kind = %command.kind(), position = self.pending.len(), "Enqueued command");
        self.pending.push(command);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending commands in request order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.pending.iter()
    }

    /// Pending commands in the order a drain would run them.
    pub fn execution_order(&self) -> Vec<&Command> {
        stable_partition(self.pending.iter(), |c| c.kind().runs_last())
    }

    /// Run every pending command against `composition`, one at a time.
    ///
    /// The queue is empty afterwards whatever the outcome; draining an
    /// empty queue is a no-op. Under [`FailurePolicy::AbortOnFirstFailure`]
    /// the first error discards the remaining commands, restores the
    /// composition to its state before the drain, and is returned. Under
    /// [`FailurePolicy::BestEffort`] failures are logged and reported and
    /// the remaining commands still run.
    pub async fn drain(
        &mut self,
        composition: &mut Composition,
        engine: &dyn MediaEngine,
        policy: FailurePolicy,
    ) -> EditResult<DrainReport> {
        let ordered = stable_partition(std::mem::take(&mut self.pending), |c| {
            c.kind().runs_last()
        });
        let mut report = DrainReport::default();
        if ordered.is_empty() {
            return Ok(report);
        }

        tracing::info!(commands = ordered.len(), ?policy, "Applying queued commands");
        let mut snapshot = match policy {
            FailurePolicy::AbortOnFirstFailure => Some(composition.clone()),
            FailurePolicy::BestEffort => None,
        };

        let total = ordered.len();
        for (position, command) in ordered.into_iter().enumerate() {
            let kind = command.kind();
            let mut ctx = EditContext {
                composition: &mut *composition,
                engine,
            };
            match command.apply(&mut ctx).await {
                Ok(()) => {
                    tracing::debug!(%kind, position, "Applied command");
                    report.applied.push(kind);
                }
                Err(error) => {
                    if let Some(snapshot) = snapshot.take() {
                        tracing::error!(
                            %kind,
                            position,
                            error = %error,
                            engine = error.is_engine_failure(),
                            discarded = total - position - 1,
                            "Command failed, aborting drain"
                        );
                        *composition = snapshot;
                        return Err(error);
                    }
                    tracing::warn!(
                        %kind,
                        position,
                        error = %error,
                        engine = error.is_engine_failure(),
                        "Command failed, continuing"
                    );
                    report.failures.push(CommandFailure {
                        position,
                        kind,
                        error,
                    });
                }
            }
        }

        tracing::info!(
            applied = report.applied.len(),
            failed = report.failures.len(),
            "Command queue drained"
        );
        Ok(report)
    }
}

/// Items not matching `last` in their original order, followed by the
/// items matching it, also in original order.
pub fn stable_partition<T>(
    items: impl IntoIterator<Item = T>,
    last: impl Fn(&T) -> bool,
) -> Vec<T> {
    let (mut first, tail): (Vec<T>, Vec<T>) = items.into_iter().partition(|item| !last(item));
    first.extend(tail);
    first
}
