//! Handle to an in-flight call

use crate::error::{Error, Result};
use httprpc_core::protocol::RequestId;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;

/// A call that has been issued but not yet consumed.
///
/// The HTTP exchange runs as its own task from the moment the call is made;
/// awaiting the handle yields its outcome. Dropping it detaches the task.
#[must_use = "a pending call does nothing useful unless awaited"]
pub struct PendingCall<T> {
    ids: Vec<RequestId>,
    state: State<T>,
}

enum State<T> {
    Running(JoinHandle<Result<T>>),
    Failed(Option<Error>),
}

impl<T> PendingCall<T> {
    pub(crate) fn running(ids: Vec<RequestId>, handle: JoinHandle<Result<T>>) -> Self {
        Self {
            ids,
            state: State::Running(handle),
        }
    }

    pub(crate) fn failed(ids: Vec<RequestId>, error: Error) -> Self {
        Self {
            ids,
            state: State::Failed(Some(error)),
        }
    }

    /// Id of the (first) request, if one was assigned.
    pub fn id(&self) -> Option<RequestId> {
        self.ids.first().copied()
    }

    /// Ids assigned to this call, one per batch entry.
    pub fn ids(&self) -> &[RequestId] {
        &self.ids
    }
}

impl<T> Future for PendingCall<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.state {
            State::Running(handle) => match Pin::new(handle).poll(cx) {
                Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
                Poll::Ready(Err(join_error)) => Poll::Ready(Err(Error::Task(join_error))),
                Poll::Pending => Poll::Pending,
            },
            State::Failed(error) => Poll::Ready(Err(error.take().unwrap_or(Error::Completed))),
        }
    }
}
