// Deferred outcome of a play/resume request

use futures::channel::oneshot;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tapvoice_core::{PlaybackError, Result};

pub(crate) type Resolver = oneshot::Sender<Result<()>>;

/// Resolves once the engine accepts (`Ok`) or rejects (`Err`) the request
///
/// Can be awaited, polled with [`PlayHandle::try_result`], or dropped; the
/// controller does not care whether anyone is listening.
#[derive(Debug)]
pub struct PlayHandle {
    rx: oneshot::Receiver<Result<()>>,
    outcome: Option<Result<()>>,
}

impl PlayHandle {
    pub(crate) fn pending() -> (Resolver, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx, outcome: None })
    }

    pub(crate) fn resolved(result: Result<()>) -> Self {
        let (_tx, rx) = oneshot::channel();
        Self {
            rx,
            outcome: Some(result),
        }
    }

    /// The outcome if it is already known, `None` while still pending
    pub fn try_result(&mut self) -> Option<Result<()>> {
        if self.outcome.is_none() {
            self.outcome = match self.rx.try_recv() {
                Ok(Some(result)) => Some(result),
                Ok(None) => None,
                Err(oneshot::Canceled) => Some(Err(dropped())),
            };
        }
        self.outcome.clone()
    }

    pub fn is_pending(&mut self) -> bool {
        self.try_result().is_none()
    }
}

fn dropped() -> PlaybackError {
    PlaybackError::EngineAborted("controller went away before the engine answered".to_string())
}

impl Future for PlayHandle {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(outcome) = &self.outcome {
            return Poll::Ready(outcome.clone());
        }
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => {
                self.outcome = Some(result.clone());
                Poll::Ready(result)
            }
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(dropped())),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_resolved_handle_is_ready() {
        let mut handle = PlayHandle::resolved(Ok(()));
        assert_eq!(handle.try_result(), Some(Ok(())));
        assert_eq!(block_on(handle), Ok(()));
    }

    #[test]
    fn test_pending_until_sent() {
        let (tx, mut handle) = PlayHandle::pending();
        assert!(handle.is_pending());
        tx.send(Err(PlaybackError::EngineDecode("bad".into()))).unwrap();
        let expected = Err(PlaybackError::EngineDecode("bad".into()));
        assert_eq!(handle.try_result(), Some(expected.clone()));
        // The outcome stays readable
        assert_eq!(handle.try_result(), Some(expected.clone()));
        assert_eq!(block_on(handle), expected);
    }

    #[test]
    fn test_dropped_resolver_reads_as_aborted() {
        let (tx, handle) = PlayHandle::pending();
        drop(tx);
        let err = block_on(handle).unwrap_err();
        assert_eq!(err.kind(), tapvoice_core::ErrorKind::EngineAborted);
    }
}
