//! # Session Dependencies / 会话依赖
//!
//! Parameter grouping for [`Session`](crate::Session) construction.
//! 用于构造会话的参数分组。
//!
//! **Note / 注意**: This is NOT a Builder pattern. No defaults, no hidden logic.
//! **这不是 Builder 模式。** 无默认值，无隐藏逻辑。

use std::sync::Arc;

use cm_core::ports::*;

/// All ports the session talks to. Every field is required.
/// 会话使用的全部端口，均为必填。
pub struct SessionDeps {
    // Backend / 后端
    pub recognizer: Arc<dyn IngredientRecognitionPort>,
    pub generator: Arc<dyn RecipeGenerationPort>,
    pub image_preparer: Arc<dyn ImagePreparePort>,

    // Persistence / 持久化
    pub recipe_repo: Arc<dyn RecipeRepositoryPort>,

    // Identity / 身份
    pub identity: Arc<dyn IdentityPort>,

    // System / 系统
    pub clock: Arc<dyn ClockPort>,
}
