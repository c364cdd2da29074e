//! Language aggregation: flush one cycle's byte-count accumulator into the
//! store.

use std::collections::HashMap;

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::store;

use super::error::SyncError;

/// What one flush did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LanguageFlushOutcome {
    pub created_languages: usize,
    pub updated_associations: usize,
    pub created_associations: usize,
}

/// Flush the per-cycle language accumulator for one user.
///
/// Two phases, in order: create any globally unknown languages first, then
/// update existing (user, language) associations whose count changed -
/// removing them from the pending map - and batch-create associations for
/// whatever remains. Updating before creating avoids duplicate-key
/// conflicts on the association table. Associations are never deleted:
/// stale languages simply stop being refreshed.
pub async fn flush(
    db: &DatabaseConnection,
    user_id: Uuid,
    mut pending: HashMap<String, i64>,
) -> Result<LanguageFlushOutcome, SyncError> {
    let mut outcome = LanguageFlushOutcome::default();

    if pending.is_empty() {
        return Ok(outcome);
    }

    let names: Vec<String> = pending.keys().cloned().collect();

    // Phase 1: create missing global language rows.
    let known: Vec<String> = store::languages::find_by_names(db, &names)
        .await?
        .into_iter()
        .map(|lang| lang.name)
        .collect();
    let missing: Vec<String> = names
        .iter()
        .filter(|name| !known.contains(name))
        .cloned()
        .collect();
    outcome.created_languages = store::languages::insert_many(db, missing).await? as usize;

    // Phase 2: update existing associations, then create the rest.
    let languages = store::languages::find_by_names(db, &names).await?;
    let language_ids: Vec<Uuid> = languages.iter().map(|lang| lang.id).collect();

    for (association, language) in
        store::languages::user_languages(db, user_id, &language_ids).await?
    {
        if let Some(bytes) = pending.remove(&language.name) {
            if association.bytes != bytes {
                store::languages::set_bytes(db, association.id, bytes).await?;
                outcome.updated_associations += 1;
            }
        }
    }

    let id_by_name: HashMap<String, Uuid> = languages
        .into_iter()
        .map(|lang| (lang.name, lang.id))
        .collect();
    let new_pairs: Vec<(Uuid, i64)> = pending
        .into_iter()
        .filter_map(|(name, bytes)| id_by_name.get(&name).map(|id| (*id, bytes)))
        .collect();
    outcome.created_associations = store::languages::link_many(db, user_id, new_pairs).await? as usize;

    Ok(outcome)
}
