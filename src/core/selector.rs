//! Best trailer selection.

use crate::core::history::HistoryStore;
use crate::core::quality;
use crate::models::trailer::TrailerRecord;
use crate::Result;

/// Pick the best record from a list: broken records are dropped, then forced
/// first and higher score first. Ties keep list order.
pub fn pick_best(records: Vec<TrailerRecord>) -> Option<TrailerRecord> {
    let mut usable: Vec<TrailerRecord> = records
        .into_iter()
        .filter(|r| !r.details.broken)
        .collect();

    // sort_by is stable
    usable.sort_by(quality::compare);
    usable.into_iter().next()
}

/// Best cached trailer for a movie, if any usable one exists.
pub fn best_trailer(store: &HistoryStore, tmdb_id: u64) -> Result<Option<TrailerRecord>> {
    let records = store.by_tmdb_id(tmdb_id)?;
    let total = records.len();
    let best = pick_best(records);

    match &best {
        Some(record) => tracing::debug!(
            "Best of {} cached trailers for tmdb {}: {} (score {:.4})",
            total,
            tmdb_id,
            record,
            quality::quality_score(record)
        ),
        None => tracing::debug!("No usable trailer among {} cached for tmdb {}", total, tmdb_id),
    }

    Ok(best)
}
