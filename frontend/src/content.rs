//! 内容访问模块
//!
//! 播放页的访问裁决。服务端是权限的唯一事实来源：客户端不比较
//! `is_free` / 订阅状态做本地判断，只把内容接口的拒绝翻译成
//! 对应的引导页面。

use learnhub_shared::CourseContentItem;
use learnhub_shared::error::{ApiError, ApiErrorKind};

/// 内容访问裁决
#[derive(Debug, Clone, PartialEq)]
pub enum ContentAccess {
    /// 可以播放
    Available(CourseContentItem),
    /// 匿名访问受限内容，引导登录
    RequiresLogin,
    /// 已登录但未订阅的付费内容，引导订阅页
    RequiresSubscription,
    /// 其余失败（不存在 / 网络）
    Failed(String),
}

/// 把内容接口的响应翻译为访问裁决
pub fn classify_access(result: Result<CourseContentItem, ApiError>) -> ContentAccess {
    match result {
        Ok(item) => ContentAccess::Available(item),
        Err(err) => match err.kind {
            ApiErrorKind::Unauthenticated => ContentAccess::RequiresLogin,
            ApiErrorKind::PremiumRequired => ContentAccess::RequiresSubscription,
            _ => ContentAccess::Failed(err.message),
        },
    }
}

// =========================================================
// 测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use learnhub_shared::ContentType;

    fn item() -> CourseContentItem {
        CourseContentItem {
            id: "l1".to_string(),
            course_id: "c1".to_string(),
            title: "Intro".to_string(),
            content_type: ContentType::Video,
            content_url: "https://cdn.example.com/intro.mp4".to_string(),
            is_free: true,
            is_accessible: true,
        }
    }

    #[test]
    fn distinguishes_login_from_subscription_denials() {
        assert_eq!(
            classify_access(Err(ApiError::unauthenticated("authentication required"))),
            ContentAccess::RequiresLogin
        );
        assert_eq!(
            classify_access(Err(ApiError::new(
                ApiErrorKind::PremiumRequired,
                403,
                "Premium subscription required",
            ))),
            ContentAccess::RequiresSubscription
        );
    }

    #[test]
    fn passes_through_accessible_items_and_other_failures() {
        assert!(matches!(
            classify_access(Ok(item())),
            ContentAccess::Available(_)
        ));
        assert!(matches!(
            classify_access(Err(ApiError::new(
                ApiErrorKind::NotFound,
                404,
                "Content not found",
            ))),
            ContentAccess::Failed(_)
        ));
    }
}
