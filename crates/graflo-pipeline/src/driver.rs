use anyhow::Result;
use graflo_core::{BucketMap, DataSource, Resource};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Per-resource totals returned once a `DataSource` has been fully drained.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DriveStats {
    pub records_read: usize,
    pub batches_flushed: usize,
}

fn bucket_len(bucket: &BucketMap) -> usize {
    bucket.vertices.values().map(Vec::len).sum::<usize>() + bucket.edges.values().map(Vec::len).sum::<usize>()
}

/// Pulls batches from `source`, evaluates each record against `resource`'s actor pipeline,
/// and merges the resulting bucket maps into an accumulator. `on_bucket` is called with the
/// accumulated bucket whenever it reaches `batch_size` records, and once more at the end for
/// any remainder, so the caller always sees every record exactly once, vertex and edge rows
/// together in a single bucket.
///
/// `cancel` is checked at each batch boundary (spec's "cooperative at batch boundaries"
/// cancellation rule): once cancelled, the loop stops pulling further batches but still
/// flushes whatever is already accumulated before returning, so no partial write is lost.
pub async fn drive_resource<S, F, Fut>(
    source: &mut S,
    resource: &Resource,
    batch_size: usize,
    cancel: &CancellationToken,
    mut on_bucket: F,
) -> Result<DriveStats>
where
    S: DataSource + ?Sized,
    F: FnMut(BucketMap) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut stats = DriveStats::default();
    let mut accumulated = BucketMap::new();
    let mut pending = 0usize;

    while !cancel.is_cancelled() {
        let Some(records) = source.next_batch(batch_size).await? else {
            break;
        };
        stats.records_read += records.len();
        for record in &records {
            let bucket = resource.evaluate(record);
            pending += bucket_len(&bucket);
            accumulated.merge(bucket);
        }
        if pending >= batch_size {
            tracing::info!(resource = resource.name.as_str(), pending, "flushing accumulated bucket");
            on_bucket(std::mem::take(&mut accumulated)).await?;
            stats.batches_flushed += 1;
            pending = 0;
        }
    }
    if cancel.is_cancelled() {
        tracing::warn!(resource = resource.name.as_str(), "cancelled at batch boundary");
    }

    if pending > 0 {
        tracing::info!(resource = resource.name.as_str(), pending, "flushing final bucket");
        on_bucket(accumulated).await?;
        stats.batches_flushed += 1;
    }

    source.close().await?;
    tracing::info!(
        resource = resource.name.as_str(),
        records = stats.records_read,
        batches = stats.batches_flushed,
        "resource drained"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use graflo_core::{record_from_pairs, Actor, Value, VertexActor};
    use std::sync::Mutex;

    struct VecSource {
        batches: Vec<Vec<graflo_core::Record>>,
        cursor: usize,
    }

    #[async_trait]
    impl DataSource for VecSource {
        fn name(&self) -> &str {
            "vec-source"
        }

        async fn next_batch(&mut self, _batch_size: usize) -> Result<Option<Vec<graflo_core::Record>>> {
            if self.cursor >= self.batches.len() {
                return Ok(None);
            }
            let batch = self.batches[self.cursor].clone();
            self.cursor += 1;
            Ok(Some(batch))
        }
    }

    fn person_resource() -> Resource {
        let pipeline = Actor::Vertex(VertexActor {
            vertex_name: "Person".to_string(),
            map: None,
        });
        Resource::new("people", pipeline)
    }

    #[tokio::test]
    async fn flushes_once_batch_size_is_reached() {
        let mut source = VecSource {
            batches: vec![
                vec![record_from_pairs([("id", Value::String("a".into()))])],
                vec![record_from_pairs([("id", Value::String("b".into()))])],
                vec![record_from_pairs([("id", Value::String("c".into()))])],
            ],
            cursor: 0,
        };
        let resource = person_resource();
        let flushes: Mutex<Vec<usize>> = Mutex::new(Vec::new());
        let cancel = CancellationToken::new();

        let stats = drive_resource(&mut source, &resource, 2, &cancel, |bucket| {
            flushes.lock().unwrap().push(bucket_len(&bucket));
            async { Ok(()) }
        })
        .await
        .unwrap();

        assert_eq!(stats.records_read, 3);
        assert_eq!(stats.batches_flushed, 2);
        assert_eq!(*flushes.lock().unwrap(), vec![2, 1]);
    }

    #[tokio::test]
    async fn empty_source_flushes_nothing() {
        let mut source = VecSource { batches: vec![], cursor: 0 };
        let resource = person_resource();
        let flushed = Mutex::new(false);
        let cancel = CancellationToken::new();

        let stats = drive_resource(&mut source, &resource, 10, &cancel, |_| {
            *flushed.lock().unwrap() = true;
            async { Ok(()) }
        })
        .await
        .unwrap();

        assert_eq!(stats.records_read, 0);
        assert_eq!(stats.batches_flushed, 0);
        assert!(!*flushed.lock().unwrap());
    }

    #[tokio::test]
    async fn stops_pulling_once_cancelled_but_flushes_pending_work() {
        let mut source = VecSource {
            batches: vec![
                vec![record_from_pairs([("id", Value::String("a".into()))])],
                vec![record_from_pairs([("id", Value::String("b".into()))])],
            ],
            cursor: 0,
        };
        let resource = person_resource();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let stats = drive_resource(&mut source, &resource, 10, &cancel, |_| async { Ok(()) })
            .await
            .unwrap();

        assert_eq!(stats.records_read, 0);
        assert_eq!(stats.batches_flushed, 0);
    }
}
