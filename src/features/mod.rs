/// 健康检查
pub mod health;
/// Logo 生成
pub mod logo;
