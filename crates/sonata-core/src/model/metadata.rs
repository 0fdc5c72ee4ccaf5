use serde::{Deserialize, Serialize};

/// Typed replacement for the source's untyped metadata map attached to a
/// `QueueItem`. Only custom (cross-catalog) playlists currently carry a
/// payload; everything else carries none.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ItemMetadata {
    #[default]
    #[serde(rename = "none")]
    None,
    /// A playlist imported across catalogs by fuzzy-matching track titles.
    /// `track_ids` are catalog B ids resolved from catalog A's track list,
    /// in playlist order; `cover_url` is an externally-hosted cover image.
    #[serde(rename = "custom_playlist")]
    CustomPlaylist {
        track_ids: Vec<String>,
        cover_url: Option<String>,
    },
}

impl ItemMetadata {
    pub fn as_custom_playlist(&self) -> Option<(&[String], Option<&str>)> {
        match self {
            ItemMetadata::CustomPlaylist {
                track_ids,
                cover_url,
            } => Some((track_ids.as_slice(), cover_url.as_deref())),
            ItemMetadata::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_playlist_json_shape() {
        let m = ItemMetadata::CustomPlaylist {
            track_ids: vec!["t1".into(), "t2".into()],
            cover_url: Some("https://example.com/cover.jpg".into()),
        };
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["kind"], "custom_playlist");
        assert_eq!(json["track_ids"][0], "t1");
    }

    #[test]
    fn default_is_none() {
        assert!(matches!(ItemMetadata::default(), ItemMetadata::None));
    }
}
