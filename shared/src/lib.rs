//! LearnHub 共享类型库
//!
//! 领域模型、API 端点定义 (`protocol`) 与错误分类 (`error`)。
//! 本 crate 不依赖任何浏览器 API，可在原生环境下完整测试。
//!
//! 所有与后端交换的字段均使用 camelCase 命名（REST 后端为 JS 实现）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod error;
pub mod protocol;

pub use protocol::*;

// =========================================================
// 用户与会话 (Users & Session)
// =========================================================

/// 当前登录用户的档案，随每次成功的认证操作整体替换。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_subscribed: bool,
}

/// 登录 / 注册 / 刷新端点的统一响应。
///
/// `refresh_token` 在刷新响应中可能缺省（服务端未轮换时）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: UserProfile,
}

/// 通用确认响应（登出 / 忘记密码 / 重置密码 / 删除操作）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

// =========================================================
// 课程与内容 (Courses & Content)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// 内容单元类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Pdf,
    Quiz,
}

/// 课程内的单个内容单元。
///
/// `is_accessible` 由服务端根据免费 / 订阅 / 认证状态计算，
/// 客户端只读，绝不在本地重算。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseContentItem {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub content_type: ContentType,
    #[serde(default)]
    pub content_url: String,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub is_accessible: bool,
}

// =========================================================
// 测验 (Quizzes)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub time_limit_minutes: Option<u32>,
    #[serde(default)]
    pub total_marks: u32,
}

/// 测验题目。`correct_answer` 仅在管理端查询 (`?admin=true`) 时返回。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub marks: u32,
}

/// 作答中的单条答案，以 `question_id` 为键，同题后选覆盖先选。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: String,
    pub user_answer: String,
}

/// 题目拉取响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestionsResponse {
    #[serde(default)]
    pub quiz_title: Option<String>,
    #[serde(default)]
    pub time_limit_minutes: Option<u32>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// 单题判分明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedAnswer {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub user_answer: Option<String>,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// 服务端判分后的完整成绩单。仅在导航状态中短暂持有，不做客户端持久化。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    pub score: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub percentage: f32,
    #[serde(default)]
    pub answers: Vec<ReviewedAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizResponse {
    pub attempt: AttemptResult,
}

/// 历史成绩回顾（独立于提交的幂等读取路径）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizReview {
    #[serde(default)]
    pub quiz_title: Option<String>,
    pub score: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub answers: Vec<ReviewedAnswer>,
}

// =========================================================
// 订阅 (Subscriptions)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub duration_days: u32,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionState {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockVerifyResponse {
    #[serde(default)]
    pub subscription: Option<SubscriptionState>,
}
