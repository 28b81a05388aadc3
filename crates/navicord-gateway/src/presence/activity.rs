//! Presence payload construction.

use navicord_common::PresenceUpdate;
use navicord_config::schema::PresenceConfig;

use crate::assets::AssetRef;
use crate::gateway::{Activity, ActivityAssets, ActivityTimestamps, PresencePayload};

fn to_millis(epoch_secs: i64) -> i64 {
    epoch_secs.saturating_mul(1000)
}

/// Build the activity shown for `update`.
///
/// An empty `activity_name` on the update is replaced by the label the
/// configured mode derives from the track.
pub fn build_activity(
    update: &PresenceUpdate,
    application_id: &str,
    settings: &PresenceConfig,
    asset: &AssetRef,
) -> Activity {
    let name = if update.activity_name.is_empty() {
        settings
            .activity_name
            .label(&update.title, &update.artist, update.album.as_deref())
    } else {
        update.activity_name.clone()
    };

    Activity {
        application_id: application_id.to_string(),
        kind: settings.activity_type,
        name,
        details: update.title.clone(),
        state: update.artist.clone(),
        timestamps: ActivityTimestamps {
            start: to_millis(update.start),
            end: update.end.map(to_millis),
        },
        assets: ActivityAssets {
            large_image: asset.as_str().to_string(),
            large_text: update.album.clone().filter(|album| !album.is_empty()),
        },
    }
}

/// Wrap `activities` in a presence body. An empty list clears the presence.
pub fn presence_payload(activities: Vec<Activity>, settings: &PresenceConfig) -> PresencePayload {
    PresencePayload {
        since: None,
        activities,
        status: settings.status.clone(),
        afk: settings.afk,
    }
}
