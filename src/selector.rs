use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::{Catalog, ChordRecord};
use crate::settings::{SelectionMode, Settings};

/// Chords passing the current filters, in catalog order.
///
/// An empty manual selection yields an empty pool rather than falling back
/// to the whole catalog. An empty type filter restricts nothing.
pub fn available_chords<'a>(catalog: &'a Catalog, settings: &Settings) -> Vec<&'a ChordRecord> {
    catalog
        .chords()
        .iter()
        .filter(|chord| match settings.selection_mode {
            SelectionMode::All => true,
            SelectionMode::Selected => settings.selected_chord_ids.contains(&chord.id),
        })
        .filter(|chord| settings.chord_types.is_empty() || settings.chord_types.contains(&chord.kind))
        .filter(|chord| settings.difficulty.admits(chord.difficulty))
        .collect()
}

/// Picks the next chord uniformly from the pool, never repeating `previous`
/// unless it is the only chord left. `None` means the pool is empty.
pub fn pick_next<R: Rng + ?Sized>(
    catalog: &Catalog,
    settings: &Settings,
    previous: Option<&ChordRecord>,
    rng: &mut R,
) -> Option<ChordRecord> {
    let pool = available_chords(catalog, settings);

    let candidates: Vec<&ChordRecord> = match previous {
        Some(prev) if pool.len() > 1 => pool.iter().copied().filter(|c| c.id != prev.id).collect(),
        _ => pool,
    };

    candidates.choose(rng).map(|chord| (*chord).clone())
}
