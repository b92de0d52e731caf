//! Plain-text rendering of items and playback progress

use elementa_core::Item;
use elementa_playback::{format_millis, PlaybackState, SessionSnapshot};
use std::fmt::Write;

/// One-line listing: id, symbol, name, category
pub fn item_row(item: &Item) -> String {
    format!(
        "{:>3}  {:<3} {:<14} {}",
        item.id.get(),
        item.symbol,
        item.name,
        item.category
    )
}

/// Multi-line detail view
pub fn item_details(item: &Item) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", item.name, item.symbol);
    if let Some(localized) = &item.localized_name {
        let _ = writeln!(out, "  Localized name:  {}", localized);
    }
    let _ = writeln!(out, "  Atomic number:   {}", item.id);
    let _ = writeln!(out, "  Category:        {}", item.category);
    let _ = writeln!(out, "  Atomic mass:     {}", item.atomic_mass);
    let _ = writeln!(out, "  Density:         {}", item.density);
    let _ = writeln!(out, "  Phase:           {}", or_dash(&item.phase));
    let _ = writeln!(out, "  Configuration:   {}", or_dash(&item.electron_configuration));
    let _ = writeln!(out, "  Discovered by:   {}", or_dash(&item.discovered_by));
    let _ = writeln!(
        out,
        "  Grid position:   ({}, {})",
        item.position.x, item.position.y
    );
    let audio = item
        .audio
        .as_ref()
        .map_or_else(|| "none".to_string(), ToString::to_string);
    let _ = writeln!(out, "  Narration:       {}", audio);
    if !item.summary.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", item.summary);
    }
    out
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

/// Progress line for the mini player: `name  m:ss / m:ss  [mode] state`
pub fn progress_line(snapshot: &SessionSnapshot) -> String {
    let name = snapshot
        .active_item
        .as_ref()
        .map_or("-", |item| item.name.as_str());
    let mode = snapshot
        .mode
        .map_or_else(|| "-".to_string(), |mode| mode.to_string());
    let state = match snapshot.state {
        PlaybackState::Stopped => "stopped",
        PlaybackState::Loading => "loading",
        PlaybackState::Playing => "playing",
        PlaybackState::Paused if snapshot.finished => "finished",
        PlaybackState::Paused => "paused",
    };

    format!(
        "{}  {} / {}  [{}] {}",
        name,
        format_millis(snapshot.position_ms),
        format_millis(snapshot.duration_ms),
        mode,
        state
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use elementa_core::{AssetId, AudioReference, ItemId};
    use elementa_playback::PlaybackMode;

    fn gold() -> Item {
        let mut item = Item::new(ItemId::new(79), "Gold", "Au");
        item.category = "transition metal".to_string();
        item.audio = Some(AudioReference::Local(AssetId::Introduction));
        item
    }

    #[test]
    fn row_contains_key_fields() {
        let row = item_row(&gold());
        assert!(row.starts_with(" 79  Au"));
        assert!(row.ends_with("transition metal"));
    }

    #[test]
    fn details_show_narration_and_placeholders() {
        let details = item_details(&gold());
        assert!(details.contains("Narration:       local:introduction"));
        assert!(details.contains("Phase:           -"));
        assert!(!details.contains("Localized name"));
    }

    #[test]
    fn progress_line_formats_times() {
        let snapshot = SessionSnapshot {
            active_item: Some(gold()),
            state: PlaybackState::Playing,
            mode: Some(PlaybackMode::Simulated),
            position_ms: 3000,
            duration_ms: 180_000,
            ..SessionSnapshot::default()
        };

        assert_eq!(progress_line(&snapshot), "Gold  0:03 / 3:00  [simulated] playing");
    }

    #[test]
    fn finished_and_idle_lines() {
        let finished = SessionSnapshot {
            active_item: Some(gold()),
            state: PlaybackState::Paused,
            mode: Some(PlaybackMode::Real),
            position_ms: 10_000,
            duration_ms: 10_000,
            finished: true,
            ..SessionSnapshot::default()
        };
        assert!(progress_line(&finished).ends_with("[real] finished"));

        assert_eq!(
            progress_line(&SessionSnapshot::default()),
            "-  00:00 / 00:00  [-] stopped"
        );
    }
}
