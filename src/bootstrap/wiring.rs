//! # Dependency Injection / 依赖注入模块
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Create infrastructure implementations / 创建基础设施层实现
//! - ✅ Inject all dependencies into [`SessionDeps`] / 将所有依赖注入到 SessionDeps
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No business logic / 禁止包含任何业务逻辑**
//! ❌ **No configuration validation / 禁止做配置验证** (see [`super::init`])

use std::sync::Arc;
use std::time::Duration;

use cm_app::SessionDeps;
use cm_core::AppConfig;
use cm_infra::{
    BackendClient, HttpIngredientRecognizer, HttpRecipeGenerator, ImageCompressor,
    JsonFileRecipeStore, LocalIdentityProvider, SystemClock,
};
use thiserror::Error;

/// Result type for wiring operations
pub type WiringResult<T> = Result<T, WiringError>;

/// Errors during dependency injection
/// 依赖注入期间的错误
#[derive(Debug, Error)]
pub enum WiringError {
    #[error("Backend client initialization failed: {0}")]
    BackendInit(String),
}

/// Wire every port of the session to its adapter.
/// 将会话的每个端口连接到其适配器。
///
/// The identity provider is passed in so the caller keeps the handle it
/// signs in with.
/// 身份提供者由调用方传入，以便调用方保留登录句柄。
///
/// # Errors / 错误
///
/// Returns [`WiringError::BackendInit`] if the HTTP client cannot be built.
pub fn wire_dependencies(
    config: &AppConfig,
    identity: Arc<LocalIdentityProvider>,
) -> WiringResult<SessionDeps> {
    let client = BackendClient::new(&config.api_url, Duration::from_secs(config.timeout_secs))
        .map_err(|e| WiringError::BackendInit(format!("{e:#}")))?;

    Ok(SessionDeps {
        recognizer: Arc::new(HttpIngredientRecognizer::new(client.clone())),
        generator: Arc::new(HttpRecipeGenerator::new(client)),
        image_preparer: Arc::new(ImageCompressor::default()),
        recipe_repo: Arc::new(JsonFileRecipeStore::new(config.recipes_path.clone())),
        identity,
        clock: Arc::new(SystemClock),
    })
}
