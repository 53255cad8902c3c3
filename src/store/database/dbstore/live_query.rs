use std::time::Duration;

use sqlx::{
  Pool, Postgres,
  postgres::{PgListener, PgNotification},
};
use tokio::{spawn, sync::mpsc, time::sleep};
use tracing::{debug, warn};

use crate::store::database::{
  LiveQuery, Query, Snapshot,
  dbstore::{DocumentStoreImpl, NOTIFY_CHANNEL, document_read::query_snapshot},
  errors::{DBError, handle_db_error},
};

const RECONNECT_DELAY: Duration = Duration::from_secs(1);

pub(super) async fn document_watch(
  s: &DocumentStoreImpl,
  query: Query,
) -> Result<LiveQuery, DBError> {
  let path = "storefront.store.document_watch";

  let mut listener =
    PgListener::connect_with(s.db.as_ref()).await.map_err(|err| handle_db_error(err, path))?;
  listener.listen(NOTIFY_CHANNEL).await.map_err(|err| handle_db_error(err, path))?;

  let db = s.db.clone();
  let (tx, rx) = mpsc::unbounded_channel();

  // listening starts before the first read so no change can slip in between
  let initial = query_snapshot(&db, &query).await?;
  let _ = tx.send(Ok(initial));

  let task = spawn(async move {
    loop {
      let received: Result<Option<PgNotification>, sqlx::Error> = tokio::select! {
        _ = tx.closed() => return,
        received = listener.try_recv() => received,
      };

      let snapshot = match received {
        Ok(Some(n)) if n.payload() == query.collection => query_snapshot(&db, &query).await,
        Ok(Some(_)) => continue,
        // the connection dropped; notifications sent meanwhile are lost
        Ok(None) => {
          debug!(collection = %query.collection, "live query listener reconnecting");
          resync(&mut listener, &db, &query).await
        }
        Err(err) => {
          warn!(collection = %query.collection, err = %err, "live query listener failed");
          if tx.send(Err(handle_db_error(err, path))).is_err() {
            return;
          }
          sleep(RECONNECT_DELAY).await;
          resync(&mut listener, &db, &query).await
        }
      };

      if tx.send(snapshot).is_err() {
        return;
      }
    }
  });

  Ok(LiveQuery::new(rx, Some(task.abort_handle())))
}

/// Reconnects the listener (which re-issues `LISTEN`) before re-reading, so
/// a change made after the read is always notified.
async fn resync(listener: &mut PgListener, db: &Pool<Postgres>, query: &Query) -> Snapshot {
  let path = "storefront.store.document_watch.resync";

  sqlx::query("SELECT 1")
    .execute(&mut *listener)
    .await
    .map_err(|err| handle_db_error(err, path))?;

  query_snapshot(db, query).await
}
