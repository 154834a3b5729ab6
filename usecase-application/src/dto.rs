use serde::Serialize;
use serde::de::DeserializeOwned;

/// 数据传输对象（DTO）
///
/// - 作为查询的输出载体，面向接口/外部系统序列化友好；
/// - 与领域模型解耦，避免将领域对象直接暴露到接口层；
/// - 经由调度器回传时会以 JSON 形式中转，因此要求可反序列化。
pub trait Dto: Serialize + DeserializeOwned + Send + Sync + 'static {}
