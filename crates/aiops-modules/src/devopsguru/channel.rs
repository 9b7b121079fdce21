//! Notification channel reconciliation

use aiops_core::{snake_dict_to_camel_dict, AiOpsResult};
use serde_json::{json, Value};
use tracing::info;

use super::api::DevOpsGuruApi;
use super::types::NotificationChannel;
use crate::outcome::Outcome;

/// Wire form of a channel config given with module (snake_case) keys
pub fn channel_config(config: &Value) -> Value {
    snake_dict_to_camel_dict(config, true)
}

/// Comparable view of a channel config: only the SNS target and filters
fn normalize(config: &Value) -> Value {
    json!({
        "Sns": config.get("Sns").cloned().unwrap_or_else(|| json!({})),
        "Filters": config.get("Filters").cloned().unwrap_or_else(|| json!({})),
    })
}

/// Live channel whose SNS target and filters match `config` (wire keys)
pub fn find_matching_channel<'a>(channels: &'a [NotificationChannel], config: &Value) -> Option<&'a NotificationChannel> {
    let desired = normalize(config);
    channels.iter().find(|channel| normalize(&channel.config) == desired)
}

/// Add a channel with `config` unless an equivalent one exists
pub async fn ensure_notification_channel(
    api: &dyn DevOpsGuruApi,
    config: &Value,
    check_mode: bool,
) -> AiOpsResult<Outcome> {
    let desired = channel_config(config);
    let channels = api.list_notification_channels().await?;

    if let Some(existing) = find_matching_channel(&channels, &desired) {
        return Ok(Outcome::new(
            false,
            Some(existing.id.clone()),
            format!("Notification channel {} already exists. No changes made.", existing.id),
        ));
    }

    if check_mode {
        return Ok(Outcome::new(true, None, "Check mode: would have added notification channel."));
    }

    let channel_id = api.add_notification_channel(&desired).await?;
    info!(channel_id = %channel_id, "Added notification channel");
    Ok(Outcome::new(
        true,
        Some(channel_id.clone()),
        format!("Notification channel {} added successfully.", channel_id),
    ))
}

/// Remove the channel with `channel_id` if it is registered
pub async fn remove_notification_channel(
    api: &dyn DevOpsGuruApi,
    channel_id: &str,
    check_mode: bool,
) -> AiOpsResult<Outcome> {
    let channels = api.list_notification_channels().await?;

    if !channels.iter().any(|channel| channel.id == channel_id) {
        return Ok(Outcome::new(
            false,
            None,
            format!("Notification channel {} is not associated to DevOps Guru.", channel_id),
        ));
    }

    if check_mode {
        return Ok(Outcome::new(
            true,
            Some(channel_id.to_string()),
            format!("Check mode: would have removed notification channel {}.", channel_id),
        ));
    }

    api.remove_notification_channel(channel_id).await?;
    info!(channel_id = %channel_id, "Removed notification channel");
    Ok(Outcome::new(
        true,
        None,
        format!("Notification channel {} removed.", channel_id),
    ))
}

/// Remove the channel matching `config`, if any
pub async fn remove_matching_channel(
    api: &dyn DevOpsGuruApi,
    config: &Value,
    check_mode: bool,
) -> AiOpsResult<Outcome> {
    let desired = channel_config(config);
    let channels = api.list_notification_channels().await?;

    match find_matching_channel(&channels, &desired) {
        Some(channel) => remove_notification_channel(api, &channel.id, check_mode).await,
        None => Ok(Outcome::new(false, None, "No matching notification channel found.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDevOpsGuru;

    fn sns_config() -> Value {
        json!({"sns": {"topic_arn": "arn:aws:sns:us-east-1:123456789012:guru"}})
    }

    #[test]
    fn test_channel_config_camelizes() {
        assert_eq!(
            channel_config(&json!({"sns": {"topic_arn": "arn"}, "filters": {"severities": ["HIGH"]}})),
            json!({"Sns": {"TopicArn": "arn"}, "Filters": {"Severities": ["HIGH"]}})
        );
    }

    #[test]
    fn test_find_matching_channel_ignores_other_keys() {
        let channels = vec![NotificationChannel {
            id: "c-1".into(),
            config: json!({"Sns": {"TopicArn": "arn"}, "Filters": {}}),
        }];
        let found = find_matching_channel(&channels, &json!({"Sns": {"TopicArn": "arn"}}));
        assert_eq!(found.map(|c| c.id.as_str()), Some("c-1"));
        assert!(find_matching_channel(&channels, &json!({"Sns": {"TopicArn": "other"}})).is_none());
    }

    #[tokio::test]
    async fn test_ensure_adds_then_is_idempotent() {
        let api = FakeDevOpsGuru::default();

        let first = ensure_notification_channel(&api, &sns_config(), false).await.unwrap();
        assert!(first.changed);
        let id = first.id.unwrap();
        assert_eq!(first.msg, format!("Notification channel {} added successfully.", id));

        let second = ensure_notification_channel(&api, &sns_config(), false).await.unwrap();
        assert!(!second.changed);
        assert_eq!(second.id, Some(id));
    }

    #[tokio::test]
    async fn test_ensure_check_mode_does_not_add() {
        let api = FakeDevOpsGuru::default();
        let outcome = ensure_notification_channel(&api, &sns_config(), true).await.unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.msg, "Check mode: would have added notification channel.");
        assert!(api.channels().is_empty());
    }

    #[tokio::test]
    async fn test_remove_channel() {
        let api = FakeDevOpsGuru::default();
        let id = ensure_notification_channel(&api, &sns_config(), false)
            .await
            .unwrap()
            .id
            .unwrap();

        let missing = remove_notification_channel(&api, "nope", false).await.unwrap();
        assert!(!missing.changed);
        assert_eq!(missing.msg, "Notification channel nope is not associated to DevOps Guru.");

        let check = remove_notification_channel(&api, &id, true).await.unwrap();
        assert!(check.changed);
        assert_eq!(api.channels().len(), 1);

        let removed = remove_matching_channel(&api, &sns_config(), false).await.unwrap();
        assert!(removed.changed);
        assert_eq!(removed.msg, format!("Notification channel {} removed.", id));
        assert!(api.channels().is_empty());
    }
}
