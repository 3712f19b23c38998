//! Transaction scoping port.

use std::future::Future;

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use super::error::{TxAbort, TxError};

/// Future returned by a unit of transactional work.
pub type TxFuture<'a> = BoxFuture<'a, Result<(), TxAbort>>;

/// A unit of work run at most once inside a transaction.
pub type TxWork<'a> = Box<dyn FnOnce() -> TxFuture<'a> + Send + 'a>;

/// Boxes an async closure as [`TxWork`].
pub fn tx_work<'a, F, Fut>(work: F) -> TxWork<'a>
where
    F: FnOnce() -> Fut + Send + 'a,
    Fut: Future<Output = Result<(), TxAbort>> + Send + 'a,
{
    Box::new(move || -> TxFuture<'a> { Box::pin(work()) })
}

/// All-or-nothing execution of a unit of work.
///
/// Commits when the work returns `Ok`, rolls back otherwise. Dropping the
/// returned future before completion also rolls back.
#[async_trait]
pub trait Transactor: Send + Sync {
    async fn in_transaction(&self, work: TxWork<'_>) -> Result<(), TxError>;
}
