use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use analytics::query;
use common::{now_ts, Candle, Resolution, Result, TickStore};

/// Resolutions kept on disk. `Second` has no candle form.
pub const SNAPSHOT_RESOLUTIONS: [Resolution; 3] =
    [Resolution::Minute, Resolution::Hour, Resolution::Day];

#[derive(Serialize)]
struct SnapshotFile<'a> {
    candles: &'a [Candle],
}

/// Periodically writes `{instrument}_{resolution}.json` candle files.
///
/// A read-through cache for static consumers: candles come from the same
/// query path as the API and the files are never read back.
pub struct SnapshotWriter {
    store: Arc<dyn TickStore>,
    instruments: Vec<String>,
    dir: PathBuf,
    interval: Duration,
}

impl SnapshotWriter {
    pub fn new(
        store: Arc<dyn TickStore>,
        instruments: Vec<String>,
        dir: impl Into<PathBuf>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            instruments,
            dir: dir.into(),
            interval,
        }
    }

    /// Write the candle file for one instrument and resolution. The file is
    /// replaced atomically via a temp file and rename.
    pub async fn write_one(
        &self,
        instrument: &str,
        resolution: Resolution,
        now: i64,
    ) -> Result<PathBuf> {
        let candles = query::ohlc(self.store.as_ref(), instrument, resolution, now).await?;
        let body = serde_json::to_vec_pretty(&SnapshotFile { candles: &candles })?;

        let path = snapshot_path(&self.dir, instrument, resolution);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(instrument, %resolution, candles = candles.len(), path = %path.display(), "Snapshot written");
        Ok(path)
    }

    /// Write every instrument × resolution. Failures are logged and do not
    /// stop the rest. Returns the number of files written.
    pub async fn write_all(&self, now: i64) -> usize {
        let mut written = 0;
        for instrument in &self.instruments {
            for resolution in SNAPSHOT_RESOLUTIONS {
                match self.write_one(instrument, resolution, now).await {
                    Ok(_) => written += 1,
                    Err(e) => {
                        warn!(instrument = %instrument, %resolution, error = %e, "Snapshot failed")
                    }
                }
            }
        }
        written
    }

    /// Regenerate snapshots forever. Call from `tokio::spawn`.
    pub async fn run(self) {
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!(dir = %self.dir.display(), error = %e, "Cannot create snapshot directory, snapshots disabled");
            return;
        }
        info!(dir = %self.dir.display(), interval = ?self.interval, "Snapshot writer running");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.write_all(now_ts()).await;
        }
    }
}

fn snapshot_path(dir: &Path, instrument: &str, resolution: Resolution) -> PathBuf {
    dir.join(format!("{instrument}_{resolution}.json"))
}
