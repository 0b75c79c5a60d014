pub mod config;
pub mod locale;
pub mod logging;
pub mod notifications;

pub use config::HarvestConfig;
pub use locale::{
    format_currency, format_date, format_date_long, format_date_short, format_timestamp,
    parse_date,
};
pub use notifications::{AppNotification, NotificationStore, NotificationType};
