use async_trait::async_trait;
use eyre::Result;

pub mod chat;
pub mod models;
pub mod preferences;
pub mod send;

#[async_trait]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}
