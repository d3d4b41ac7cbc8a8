use std::fmt;

use serde::{Deserialize, Serialize};

// =========================================================
// 错误分类枚举
// =========================================================

/// 客户端错误分类
///
/// 按照对应的恢复动作划分：
/// - `Unauthenticated`: 无 / 过期 / 无效令牌，触发"刷新-重试-登出"链
/// - `PremiumRequired`: 会话有效但权益不足，展示订阅引导，绝不自动重试
/// - `NotFound`: 资源不存在
/// - `AlreadyAttempted`: 测验已作答，提供回顾入口而非重试
/// - `Validation`: 表单输入不合法，就地提示
/// - `Transient`: 网络或服务端错误，提供手动重试
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiErrorKind {
    Unauthenticated,
    PremiumRequired,
    NotFound,
    AlreadyAttempted,
    Validation,
    Transient,
}

impl ApiErrorKind {
    /// 根据 HTTP 状态码映射错误分类
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ApiErrorKind::Unauthenticated,
            403 => ApiErrorKind::PremiumRequired,
            404 => ApiErrorKind::NotFound,
            409 => ApiErrorKind::AlreadyAttempted,
            400 | 422 => ApiErrorKind::Validation,
            _ => ApiErrorKind::Transient,
        }
    }
}

// =========================================================
// 传输用错误体
// =========================================================

/// 后端错误响应的 JSON 形状，如 `{"message": "..."}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// =========================================================
// 核心错误类型
// =========================================================

/// API 调用错误
///
/// `Clone` 是刻意的：刷新去重依赖 `Shared` future，
/// 其输出类型必须可克隆给所有等待者。
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// HTTP 状态码；传输层错误（请求未到达服务端）为 0
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, status: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    // --- Convenience constructors ---

    /// 网络层失败（fetch 未完成）
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transient, 0, message)
    }

    /// 响应体解析失败
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transient, 0, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unauthenticated, 401, message)
    }

    /// 从非 2xx 响应构造错误
    ///
    /// 优先解析 `{"message": ...}` 错误体；分类以状态码为主，
    /// 再对原后端的两个消息惯例做修正：
    /// - 含 "already attempted" 的 400 实为"已作答"
    /// - 含 "premium" 的消息实为订阅门槛
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| format!("HTTP {}", status));

        let lower = message.to_lowercase();
        let kind = if lower.contains("already attempted") {
            ApiErrorKind::AlreadyAttempted
        } else if lower.contains("premium") {
            ApiErrorKind::PremiumRequired
        } else {
            ApiErrorKind::from_status(status)
        };

        Self::new(kind, status, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

// =========================================================
// 测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert_eq!(ApiErrorKind::from_status(401), ApiErrorKind::Unauthenticated);
        assert_eq!(ApiErrorKind::from_status(403), ApiErrorKind::PremiumRequired);
        assert_eq!(ApiErrorKind::from_status(404), ApiErrorKind::NotFound);
        assert_eq!(ApiErrorKind::from_status(409), ApiErrorKind::AlreadyAttempted);
        assert_eq!(ApiErrorKind::from_status(400), ApiErrorKind::Validation);
        assert_eq!(ApiErrorKind::from_status(422), ApiErrorKind::Validation);
        assert_eq!(ApiErrorKind::from_status(500), ApiErrorKind::Transient);
        assert_eq!(ApiErrorKind::from_status(502), ApiErrorKind::Transient);
    }

    #[test]
    fn from_response_parses_message_body() {
        let err = ApiError::from_response(404, r#"{"message":"Course not found"}"#);
        assert_eq!(err.kind, ApiErrorKind::NotFound);
        assert_eq!(err.message, "Course not found");
    }

    #[test]
    fn from_response_falls_back_to_status_line() {
        let err = ApiError::from_response(500, "<html>oops</html>");
        assert_eq!(err.kind, ApiErrorKind::Transient);
        assert_eq!(err.message, "HTTP 500");
    }

    #[test]
    fn already_attempted_message_overrides_status() {
        // 原后端以 400 + 消息表示"已作答"
        let err = ApiError::from_response(
            400,
            r#"{"message":"You have already attempted this quiz"}"#,
        );
        assert_eq!(err.kind, ApiErrorKind::AlreadyAttempted);
    }

    #[test]
    fn premium_message_overrides_status() {
        let err = ApiError::from_response(
            400,
            r#"{"message":"This quiz is premium. Subscribe to unlock."}"#,
        );
        assert_eq!(err.kind, ApiErrorKind::PremiumRequired);
    }

    #[test]
    fn conflict_status_maps_to_already_attempted() {
        let err = ApiError::from_response(409, r#"{"message":"Attempt exists"}"#);
        assert_eq!(err.kind, ApiErrorKind::AlreadyAttempted);
    }
}
