use crate::domain::model::Payload;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 所有 agent 的共同介面
///
/// `process` 接收上一步的 payload，回傳交給下一步的 payload。
#[async_trait]
pub trait Agent: Send + Sync {
    async fn process(&self, payload: Payload) -> Result<Payload>;

    /// 註冊時使用的名稱
    fn name(&self) -> &str;
}
