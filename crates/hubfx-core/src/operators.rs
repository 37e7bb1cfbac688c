//! # Stream Operators
//!
//! Flattening strategies for effects and async validators:
//! - [`switch_map`]: keep only the latest inner stream (earlier ones are dropped)
//! - [`merge_map`]: run every inner stream to completion, interleaving results

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{BoxStream, Fuse, FusedStream, Stream, StreamExt};

/// Stream returned by [`switch_map`].
pub struct SwitchMap<T, U> {
    outer: Fuse<BoxStream<'static, T>>,
    project: Box<dyn FnMut(T) -> BoxStream<'static, U> + Send>,
    inner: Option<BoxStream<'static, U>>,
}

impl<T, U> Stream for SwitchMap<T, U> {
    type Item = U;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<U>> {
        let this = &mut *self;

        // Drain every ready outer item; only the last one keeps its inner stream.
        while let Poll::Ready(Some(item)) = this.outer.poll_next_unpin(cx) {
            this.inner = Some((this.project)(item));
        }

        if let Some(inner) = this.inner.as_mut() {
            match inner.poll_next_unpin(cx) {
                Poll::Ready(Some(item)) => return Poll::Ready(Some(item)),
                Poll::Ready(None) => this.inner = None,
                Poll::Pending => return Poll::Pending,
            }
        }

        if this.outer.is_terminated() {
            Poll::Ready(None)
        } else {
            Poll::Pending
        }
    }
}

/// Map each item to a stream and follow only the most recent one.
pub fn switch_map<T, U, S, F>(outer: impl Stream<Item = T> + Send + 'static, mut project: F) -> SwitchMap<T, U>
where
    T: 'static,
    F: FnMut(T) -> S + Send + 'static,
    S: Stream<Item = U> + Send + 'static,
{
    SwitchMap {
        outer: outer.boxed().fuse(),
        project: Box::new(move |item| project(item).boxed()),
        inner: None,
    }
}

/// Map each item to a stream and merge all of them.
pub fn merge_map<T, U, S, F>(outer: impl Stream<Item = T> + Send + 'static, project: F) -> BoxStream<'static, U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnMut(T) -> S + Send + 'static,
    S: Stream<Item = U> + Send + 'static,
{
    let mut project = project;
    outer
        .flat_map_unordered(None, move |item| project(item).boxed())
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::time::Duration;

    fn delayed(value: u32, millis: u64) -> BoxStream<'static, u32> {
        stream::once(async move {
            tokio::time::sleep(Duration::from_millis(millis)).await;
            value
        })
        .boxed()
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_map_keeps_latest() {
        let outer = stream::iter(vec![1u32, 2, 3]);
        let results: Vec<u32> = switch_map(outer, |v| delayed(v * 10, 100)).collect().await;
        assert_eq!(results, vec![30]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_merge_map_keeps_all() {
        let outer = stream::iter(vec![1u32, 2, 3]);
        let mut results: Vec<u32> = merge_map(outer, |v| delayed(v * 10, 100 - u64::from(v))).collect().await;
        results.sort_unstable();
        assert_eq!(results, vec![10, 20, 30]);
    }

    #[tokio::test]
    async fn test_switch_map_empty_outer_completes() {
        let results: Vec<u32> = switch_map(stream::empty::<u32>(), |v| delayed(v, 1)).collect().await;
        assert!(results.is_empty());
    }
}
