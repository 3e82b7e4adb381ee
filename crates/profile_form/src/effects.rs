/*!
Effect & task model for remote collection fetches.

The form session stays synchronous: it never performs IO itself. Methods
that want background work return `Effect::Async(TaskKind)`; the front end
hands those to the [`TaskExecutor`](crate::executor::TaskExecutor), and the
outcome comes back as `InternalEvent::TaskFinished` carrying a
[`TaskResultKind`] that is fed to `ProfileForm::apply`.

Every fetch carries a [`FetchTicket`]. The form only accepts a result whose
ticket still matches the field's current generation.
*/

use std::fmt;

use crate::catalog::Collection;
use crate::field::FieldId;

/// Declarative instruction returned by the form session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Spawn background work.
    Async(TaskKind),
    /// Informational message for the status line.
    Log(String),
}

impl Effect {
    pub fn log<T: Into<String>>(msg: T) -> Self {
        Effect::Log(msg.into())
    }

    pub fn async_task(kind: TaskKind) -> Self {
        Effect::Async(kind)
    }
}

/// Field plus generation a fetch was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    pub field: FieldId,
    pub generation: u64,
}

impl fmt::Display for FetchTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.field, self.generation)
    }
}

/// Asynchronous work units. Each variant carries all of its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    /// `GET {base}/{collection}`.
    FetchCollection {
        ticket: FetchTicket,
        collection: Collection,
    },
}

impl TaskKind {
    pub fn ticket(&self) -> FetchTicket {
        match self {
            TaskKind::FetchCollection { ticket, .. } => *ticket,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::FetchCollection { ticket, collection } => {
                write!(f, "FetchCollection({collection}, ticket={ticket})")
            }
        }
    }
}

/// Outcome of a finished task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResultKind {
    CollectionFetched {
        ticket: FetchTicket,
        collection: Collection,
        items: Vec<String>,
        fetch_time_ms: u64,
        server_time_ms: Option<u64>,
    },
    CollectionFailed {
        ticket: FetchTicket,
        collection: Collection,
        error: String,
    },
}

impl TaskResultKind {
    pub fn ticket(&self) -> FetchTicket {
        match self {
            TaskResultKind::CollectionFetched { ticket, .. }
            | TaskResultKind::CollectionFailed { ticket, .. } => *ticket,
        }
    }
}

/// Task lifecycle events emitted by the executor worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    TaskStarted { id: u64, label: String },
    TaskFinished { id: u64, result: TaskResultKind },
}
