use usecase_domain::domain_event::{BusinessContext, CorrelationId};

/// 应用层上下文（Application Context）
///
/// 承载一次应用层调用（命令/查询）所需的横切信息，例如：
/// - 关联标识（`correlation_id`）：由边界层附加，贯穿调度、工作单元与错误响应；
/// - 业务语境（`BusinessContext`）：因果链 `causation_id`、执行者类型/ID 等；
/// - 幂等键（`idempotency_key`）：用于在基础设施层实现请求幂等（如 API 层重复提交保护）。
///
/// 典型用法：
/// ```rust
/// use usecase_application::context::AppContext;
/// use usecase_domain::domain_event::{BusinessContext, CorrelationId};
///
/// let ctx = AppContext {
///     correlation_id: CorrelationId::from("cor-123"),
///     biz: BusinessContext::builder()
///         .causation_id("cau-abc")
///         .actor_type("user")
///         .actor_id("u-1")
///         .build(),
///     idempotency_key: Some("idem-xyz".into()),
/// };
/// assert_eq!(ctx.correlation_id.as_str(), "cor-123");
/// ```
#[derive(Clone, Debug, Default)]
pub struct AppContext {
    /// 关联标识（仅用于追踪，不参与业务判断）
    pub correlation_id: CorrelationId,
    /// 业务语境（审计主体、操作因果）
    pub biz: BusinessContext,
    /// 幂等键（可选）：为空则由上层或基础设施决定是否参与幂等
    pub idempotency_key: Option<String>,
}

impl AppContext {
    pub fn new(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id,
            ..Self::default()
        }
    }

    pub fn with_biz(mut self, biz: BusinessContext) -> Self {
        self.biz = biz;
        self
    }
}
