use serde::{Deserialize, Serialize};

/// Analytics events handed to the host app's event sink.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PromoEvent {
    /// App row became visible
    Impression {
        #[serde(rename = "appID")]
        app_id: String,
    },
    /// User selected an app row
    Tap {
        #[serde(rename = "appID")]
        app_id: String,
    },
}

impl PromoEvent {
    pub fn app_id(&self) -> &str {
        match self {
            PromoEvent::Impression { app_id } | PromoEvent::Tap { app_id } => app_id,
        }
    }

    pub fn is_impression(&self) -> bool {
        matches!(self, PromoEvent::Impression { .. })
    }
}
