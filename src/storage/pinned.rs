use super::{PINNED_CLIPS_KEY, SettingsStore};
use crate::clip::Clip;
use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Serializes the pinned subset of `clips`, in order, as a JSON array.
pub fn encode_pinned(clips: &[Clip]) -> Result<String> {
    let pinned: Vec<&Clip> = clips.iter().filter(|clip| clip.is_pinned).collect();
    serde_json::to_string(&pinned).context("Failed to encode pinned clips")
}

pub fn decode_pinned(raw: &str) -> Result<Vec<Clip>> {
    let clips: Vec<Clip> = serde_json::from_str(raw).context("Failed to decode pinned clips")?;
    Ok(clips
        .into_iter()
        .map(|mut clip| {
            clip.is_pinned = true;
            clip
        })
        .collect())
}

/// Reads the persisted pinned clips, or `None` if nothing was stored yet.
pub fn read_pinned_clips(settings: &dyn SettingsStore) -> Result<Option<Vec<Clip>>> {
    settings
        .get(PINNED_CLIPS_KEY)?
        .map(|raw| decode_pinned(&raw))
        .transpose()
}

/// Loads persisted pinned clips. Missing or corrupt data yields an empty list.
pub fn load_pinned_clips(settings: &dyn SettingsStore) -> Vec<Clip> {
    match read_pinned_clips(settings) {
        Ok(Some(clips)) => {
            debug!(count = clips.len(), "Loaded pinned clips");
            clips
        }
        Ok(None) => {
            debug!("No pinned clips stored yet");
            Vec::new()
        }
        Err(e) => {
            warn!(error = %e, "Stored pinned clips are unreadable, starting empty");
            Vec::new()
        }
    }
}

pub fn save_pinned_clips(settings: &dyn SettingsStore, clips: &[Clip]) -> Result<()> {
    let encoded = encode_pinned(clips)?;
    settings.set(PINNED_CLIPS_KEY, &encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemorySettings;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_only_pinned() {
        let clips = vec![
            Clip::new("pinned".to_string(), true),
            Clip::new("recent".to_string(), false),
        ];
        let decoded = decode_pinned(&encode_pinned(&clips).unwrap()).unwrap();

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0], clips[0]);
    }

    #[test]
    fn test_save_then_load_preserves_fields_and_order() {
        let settings = MemorySettings::new();
        let date = Utc.with_ymd_and_hms(2026, 2, 2, 9, 30, 0).unwrap();
        let clips = vec![
            Clip::with_date("second".to_string(), true, date),
            Clip::with_date("first".to_string(), true, date - chrono::Duration::hours(1)),
        ];

        save_pinned_clips(&settings, &clips).unwrap();
        let loaded = load_pinned_clips(&settings);

        assert_eq!(loaded, clips);
    }

    #[test]
    fn test_load_missing_is_empty() {
        let settings = MemorySettings::new();
        assert!(load_pinned_clips(&settings).is_empty());
    }

    #[test]
    fn test_load_corrupt_is_empty() {
        let settings = MemorySettings::with_value(PINNED_CLIPS_KEY, "{not json");
        assert!(load_pinned_clips(&settings).is_empty());
    }

    #[test]
    fn test_decode_reads_stored_document() {
        let raw = r#"[{"id":"6f1c1f1e-6a8e-4b8e-9a7c-2d0c3c1e4b5a","text":"hello","isPinned":true,"dateAdded":"2026-02-02T10:00:00Z"}]"#;
        let clips = decode_pinned(raw).unwrap();

        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].text, "hello");
        assert_eq!(
            clips[0].date_added,
            Utc.with_ymd_and_hms(2026, 2, 2, 10, 0, 0).unwrap()
        );
    }
}
