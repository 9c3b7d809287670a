use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresentError {
    #[error("No active display surface to present on")]
    NoActiveSurface,

    #[error("Presentation failed: {0}")]
    Failed(String),
}

/// Host capability for showing a store listing.
pub trait StorePresenter: Send + Sync {
    /// Present the in-app store listing for `app_store_id`.
    fn present_listing(&self, app_store_id: &str) -> Result<(), PresentError>;

    /// Open `url` outside the app, used as the fallback deep link.
    fn open_url(&self, url: &str) -> Result<(), PresentError>;
}
