type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

use std::sync::Arc;

use palaver_core::app::{ChatController, InboundMessage, OutboundMessage};
use palaver_core::session::{FileSessionStore, Role, SESSION_KEY, SessionStore};
use palaver_core::test_utils::{drain_updates, test_app_config};
use serde_json::{Value, json};
use tempfile::TempDir;

fn file_store(dir: &TempDir) -> Arc<FileSessionStore> {
    Arc::new(FileSessionStore::new(
        dir.path().join("state.json"),
        "grok-2",
    ))
}

#[tokio::test]
async fn conversation_survives_controller_restart() -> Result<()> {
    let dir = TempDir::new()?;
    let config = test_app_config()?;

    let first = ChatController::spawn(&config, file_store(&dir) as Arc<dyn SessionStore>);
    first
        .dispatch(InboundMessage::SetModel {
            id: "mini".to_string(),
        })
        .await?;
    first
        .dispatch(InboundMessage::Send {
            text: "remember me".to_string(),
        })
        .await?;
    first.shutdown();

    let second = ChatController::spawn(&config, file_store(&dir) as Arc<dyn SessionStore>);
    let mut rx = second.subscribe();
    second.dispatch(InboundMessage::RequestState).await?;

    let updates = drain_updates(&mut rx);
    let OutboundMessage::State { messages } = &updates[0] else {
        panic!("expected state, got {:?}", updates[0]);
    };
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].text, "remember me");
    assert_eq!(messages[1].text, "Grok Mini (demo): remember me");
    assert_eq!(
        updates[1],
        OutboundMessage::Model {
            id: "grok-mini".to_string(),
            label: "Grok Mini (demo)".to_string(),
        }
    );
    Ok(())
}

#[tokio::test]
async fn clear_is_persisted_and_keeps_unrelated_keys() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("state.json");
    std::fs::write(&path, r#"{"other.extension": {"keep": true}}"#)?;

    let config = test_app_config()?;
    let handle = ChatController::spawn(&config, file_store(&dir) as Arc<dyn SessionStore>);
    handle
        .dispatch(InboundMessage::Send {
            text: "hello".to_string(),
        })
        .await?;
    handle.dispatch(InboundMessage::Clear).await?;

    let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(raw["other.extension"], json!({"keep": true}));
    assert_eq!(raw[SESSION_KEY]["messages"], json!([]));
    assert_eq!(raw[SESSION_KEY]["model_id"], json!("grok-2"));

    assert!(file_store(&dir).load().await.messages.is_empty());
    Ok(())
}

#[tokio::test]
async fn corrupt_state_file_starts_fresh() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("state.json"), "{ not json")?;

    let config = test_app_config()?;
    let handle = ChatController::spawn(&config, file_store(&dir) as Arc<dyn SessionStore>);
    let session = handle.snapshot().await?;
    assert!(session.messages.is_empty());
    assert_eq!(session.model_id, "grok-2");

    handle
        .dispatch(InboundMessage::Send {
            text: "fresh start".to_string(),
        })
        .await?;
    assert_eq!(file_store(&dir).load().await.messages.len(), 2);
    Ok(())
}
