use futures_util::future::join_all;
use organizer_core::{FeedReference, PodcastRecord};
use organizer_logging::organizer_info;
use tokio::sync::Semaphore;

use crate::{fetch_record, FetchEvent, Fetcher, ProgressSink};

/// Fetch every reference with at most `max_concurrent` requests in flight.
///
/// The output has the same length and order as `refs`, whatever order the
/// requests complete in. A failing feed only affects its own record.
pub async fn fetch_all(
    fetcher: &dyn Fetcher,
    refs: &[FeedReference],
    max_concurrent: usize,
    sink: &dyn ProgressSink,
) -> Vec<PodcastRecord> {
    let semaphore = Semaphore::new(max_concurrent.max(1));
    sink.emit(FetchEvent::Started { total: refs.len() });

    let tasks = refs.iter().enumerate().map(|(index, reference)| {
        let semaphore = &semaphore;
        async move {
            // The semaphore is never closed, so acquiring always succeeds; the
            // permit is dropped when this block returns.
            let _permit = semaphore.acquire().await;
            let record = fetch_record(fetcher, reference).await;
            sink.emit(FetchEvent::Finished {
                index,
                title: record.display_title().to_string(),
                ok: record.is_resolvable(),
            });
            record
        }
    });

    let records = join_all(tasks).await;
    let fetched = records.iter().filter(|r| r.is_resolvable()).count();
    organizer_info!(
        "fetched {} feeds: {} ok, {} failed",
        records.len(),
        fetched,
        records.len() - fetched
    );
    records
}
