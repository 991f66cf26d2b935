pub mod cdiscount;
pub mod darty;
pub mod fnac;
pub mod retailer;

pub use cdiscount::{CdiscountSource, CDISCOUNT};
pub use darty::{DartySource, DARTY};
pub use fnac::{FnacSource, FNAC};
pub use retailer::{CardStats, RetailerProfile, RetailerSource};

use crate::browser::BrowserDriver;
use crate::config::ScrapeConfig;
use crate::traits::SourceAdapter;
use std::sync::Arc;

/// Cookie banners seen on French retailers. Plain CSS only, since not every
/// automation back-end supports text or case-insensitive matchers.
pub const CONSENT_SELECTORS: &[&str] = &[
    "button#didomi-notice-agree-button",
    "[id^='didomi'] button[aria-label*='accept']",
    "button[aria-label*='accept']",
    "button[aria-label*='Accept']",
    "#onetrust-accept-btn-handler",
];

/// Every bundled retailer, sharing one driver.
pub fn default_registry(
    driver: Arc<dyn BrowserDriver>,
    config: &ScrapeConfig,
) -> Vec<Arc<dyn SourceAdapter>> {
    vec![
        Arc::new(CdiscountSource::new(Arc::clone(&driver), config.clone())),
        Arc::new(FnacSource::new(Arc::clone(&driver), config.clone())),
        Arc::new(DartySource::new(driver, config.clone())),
    ]
}
