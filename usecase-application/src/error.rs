/// 应用层装配错误（配置错误）
///
/// 仅在启动装配阶段产生（例如处理器注册），不会出现在用例调度结果中；
/// 用例执行的失败统一以 [`Failure`](usecase_domain::error::Failure) 返回。
#[non_exhaustive]
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AppError {
    #[error("handler already registered: request={request}")]
    AlreadyRegistered { request: String },

    #[error("handler registry is sealed: request={request}")]
    RegistrySealed { request: String },
}
