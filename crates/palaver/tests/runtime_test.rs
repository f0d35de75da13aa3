type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

use palaver::RuntimeOptions;
use palaver::commands::send::{post_and_wait, send_and_wait};
use palaver_core::app::InboundMessage;
use palaver_core::preferences::Preferences;
use palaver_core::session::Role;
use tempfile::TempDir;

fn instant_options(dir: &TempDir) -> RuntimeOptions {
    let mut preferences = Preferences::default();
    preferences.reply.latency_scale = 0.0;
    RuntimeOptions {
        state_file: Some(dir.path().join("state.json")),
        ..RuntimeOptions::new(preferences)
    }
}

#[tokio::test]
async fn send_persists_across_runs() -> Result<()> {
    let dir = TempDir::new()?;
    let options = instant_options(&dir);

    let runtime = options.start().await?;
    assert_eq!(runtime.state_file, Some(dir.path().join("state.json")));
    let reply = send_and_wait(&runtime.handle, "  hello  ").await?;
    assert_eq!(reply.text, "Grok 2 (demo): hello");
    runtime.handle.shutdown();

    let runtime = options.start().await?;
    let session = runtime.handle.snapshot().await?;
    assert_eq!(session.messages.len(), 2);
    assert_eq!(session.messages[0].text, "hello");
    Ok(())
}

#[tokio::test]
async fn model_flag_selects_and_persists_model() -> Result<()> {
    let dir = TempDir::new()?;
    let mut options = instant_options(&dir);
    options.model = Some("mini".to_string());

    let runtime = options.start().await?;
    let reply = send_and_wait(&runtime.handle, "hi").await?;
    assert!(reply.text.starts_with("Grok Mini (demo)"));
    runtime.handle.shutdown();

    options.model = None;
    let runtime = options.start().await?;
    assert_eq!(runtime.handle.snapshot().await?.model_id, "grok-mini");
    Ok(())
}

#[tokio::test]
async fn ephemeral_runs_leave_no_state_file() -> Result<()> {
    let dir = TempDir::new()?;
    let mut options = instant_options(&dir);
    options.ephemeral = true;

    let runtime = options.start().await?;
    assert_eq!(runtime.state_file, None);
    send_and_wait(&runtime.handle, "gone soon").await?;
    runtime.handle.dispatch(InboundMessage::Clear).await?;

    assert!(!dir.path().join("state.json").exists());
    Ok(())
}

#[tokio::test]
async fn preferences_default_model_applies_to_fresh_sessions() -> Result<()> {
    let dir = TempDir::new()?;
    let mut options = instant_options(&dir);
    options.preferences.default_model = Some("grok-mini".to_string());
    options.preferences.reply.max_chars = 20;

    let runtime = options.start().await?;
    let reply = send_and_wait(&runtime.handle, "a fairly long message body").await?;
    assert!(reply.text.starts_with("Grok Mini"));
    assert_eq!(reply.text.chars().count(), 20);
    assert!(reply.text.ends_with('…'));
    Ok(())
}

#[tokio::test]
async fn host_post_appends_reply_without_user_turn() -> Result<()> {
    let dir = TempDir::new()?;
    let options = instant_options(&dir);

    let runtime = options.start().await?;
    let reply = post_and_wait(&runtime.handle, "from   the host").await?;
    assert_eq!(reply.text, "Grok 2 (demo): from the host");
    runtime.handle.shutdown();

    let runtime = options.start().await?;
    let session = runtime.handle.snapshot().await?;
    assert_eq!(session.messages.len(), 1);
    assert_eq!(session.messages[0].role, Role::Assistant);
    Ok(())
}
