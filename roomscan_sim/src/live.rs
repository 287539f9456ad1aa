//! Live mode: fusion on a tokio interval with a concurrent listing reader.
//!
//! The fusion loop owns the `SimWorld` (and through it the registry). The
//! reader task only ever sees `RegistryListing` snapshots published at the
//! end of a cycle, the way a UI thread would.

use crate::world::SimWorld;
use roomscan_core::RegistryListing;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info};

/// Outcome of a live run.
#[derive(Debug, Clone)]
pub struct LiveSummary {
    /// Frames stepped
    pub frames: u64,

    /// Frames lost to feed failures
    pub dropped_frames: u64,

    /// Snapshots taken by the reader task
    pub snapshots_read: u64,

    /// Largest listing the reader observed
    pub max_listing_len: usize,

    /// Listing published after the last frame
    pub final_listing: RegistryListing,
}

/// Steps `world` once per `frame_interval` for `frames` frames while a
/// reader task samples the shared listing every `read_interval`.
pub async fn run_live(
    mut world: SimWorld,
    frames: u64,
    frame_interval: Duration,
    read_interval: Duration,
) -> LiveSummary {
    let listing = world.engine.shared_listing();
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let reader_listing = listing.clone();
    let reader = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(read_interval);
        let mut reads = 0u64;
        let mut max_len = 0usize;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let snapshot = reader_listing.snapshot();
                    reads += 1;
                    max_len = max_len.max(snapshot.len());
                    debug!("reader: {} objects", snapshot.len());
                }
                _ = &mut stop_rx => break,
            }
        }
        (reads, max_len)
    });

    info!("Live mode: {} frames every {:?}", frames, frame_interval);
    let mut ticker = tokio::time::interval(frame_interval);
    let mut dropped_frames = 0u64;
    for _ in 0..frames {
        ticker.tick().await;
        if let Err(e) = world.step() {
            debug!("frame dropped: {}", e);
            dropped_frames += 1;
        }
    }

    let _ = stop_tx.send(());
    let (snapshots_read, max_listing_len) = reader.await.unwrap_or((0, 0));

    let final_listing = listing.snapshot();
    info!("{}", final_listing);

    LiveSummary {
        frames,
        dropped_frames,
        snapshots_read,
        max_listing_len,
        final_listing,
    }
}
