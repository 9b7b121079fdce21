//! Amazon DevOps Guru

pub mod api;
pub mod channel;
pub mod collection;
pub mod insight;
pub mod types;

pub use api::{CliDevOpsGuru, DevOpsGuruApi};
pub use channel::{ensure_notification_channel, remove_matching_channel, remove_notification_channel};
pub use collection::{apply_update, plan_stack_update, plan_tag_update, update_tags, CollectionUpdate};
pub use insight::{enrich_insights, get_insight_type, Enrichment};
pub use types::{CollectionAction, NotificationChannel, ResourceCollection, TagCollection};
