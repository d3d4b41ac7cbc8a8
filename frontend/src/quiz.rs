//! 测验应试模块
//!
//! 应试会话的全部纯状态逻辑：答题纸、加载阶段分类、单次提交闸门、
//! 倒计时换算。组件层（quiz_pages）只负责把这些状态接到信号和
//! 定时器上，逻辑本身不依赖 DOM，可在原生目标下直接测试。

use learnhub_shared::error::{ApiError, ApiErrorKind};
use learnhub_shared::{AttemptResult, Question, QuizQuestionsResponse, SubmittedAnswer};
use leptos::prelude::RwSignal;

/// 服务端未给出时限时的默认应试时长（分钟）
pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 10;

// =========================================================
// 答题纸
// =========================================================

/// 应试期间的作答记录
///
/// 每题至多一条记录，重复作答覆盖旧值（last-write-wins）。
/// 未作答的题目不出现在提交载荷中。
#[derive(Clone, Default)]
pub struct AnswerSheet {
    answers: Vec<SubmittedAnswer>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次选择；同题重选就地覆盖
    pub fn select(&mut self, question_id: &str, option: &str) {
        if let Some(existing) = self
            .answers
            .iter_mut()
            .find(|a| a.question_id == question_id)
        {
            existing.user_answer = option.to_string();
        } else {
            self.answers.push(SubmittedAnswer {
                question_id: question_id.to_string(),
                user_answer: option.to_string(),
            });
        }
    }

    /// 某题当前的选择
    pub fn selected(&self, question_id: &str) -> Option<&str> {
        self.answers
            .iter()
            .find(|a| a.question_id == question_id)
            .map(|a| a.user_answer.as_str())
    }

    /// 提交载荷；空纸提交合法（计 0 分）
    pub fn answers(&self) -> &[SubmittedAnswer] {
        &self.answers
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }
}

// =========================================================
// 加载阶段
// =========================================================

/// 应试页面的互斥阶段
///
/// 拒绝原因必须区分：付费锁定引导订阅页，已作答引导成绩回顾，
/// 两者都不是简单的错误提示。
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptPhase {
    Loading,
    Ready {
        quiz_title: String,
        time_limit_minutes: u32,
        questions: Vec<Question>,
    },
    /// 需要订阅才能应试
    PremiumLocked,
    /// 该测验已有成绩，一人一次
    AlreadyAttempted,
    LoadFailed(String),
}

/// 把题目加载结果归类为页面阶段
pub fn classify_load(result: Result<QuizQuestionsResponse, ApiError>) -> AttemptPhase {
    match result {
        Ok(response) => AttemptPhase::Ready {
            quiz_title: response.quiz_title.unwrap_or_else(|| "Quiz".to_string()),
            time_limit_minutes: response
                .time_limit_minutes
                .unwrap_or(DEFAULT_TIME_LIMIT_MINUTES),
            questions: response.questions,
        },
        Err(err) => match err.kind {
            ApiErrorKind::PremiumRequired => AttemptPhase::PremiumLocked,
            ApiErrorKind::AlreadyAttempted => AttemptPhase::AlreadyAttempted,
            _ => AttemptPhase::LoadFailed(err.message),
        },
    }
}

// =========================================================
// 提交闸门
// =========================================================

/// 单次提交闸门
///
/// 手动提交与计时器到点可能竞争同一次提交，闸门保证恰好一条
/// 提交请求发出。失败后 `release` 允许重试；成功后保持关闭。
#[derive(Default)]
pub struct SubmitGate {
    fired: bool,
}

impl SubmitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 尝试获取提交权；首次调用返回 true，此后 false
    pub fn try_acquire(&mut self) -> bool {
        if self.fired {
            return false;
        }
        self.fired = true;
        true
    }

    /// 提交失败后重新开放
    pub fn release(&mut self) {
        self.fired = false;
    }
}

// =========================================================
// 倒计时
// =========================================================

/// 剩余秒数渲染为 `m:ss`
pub fn format_clock(remaining_seconds: u32) -> String {
    format!("{}:{:02}", remaining_seconds / 60, remaining_seconds % 60)
}

// =========================================================
// 成绩交接
// =========================================================

/// 提交成功后向成绩页传递结果的一次性信道
///
/// 成绩页取走（take）后信道归空；刷新或直接访问成绩页时
/// 信道为空，页面展示兜底文案而不是陈旧成绩。
#[derive(Clone, Copy)]
pub struct AttemptHandoff(pub RwSignal<Option<AttemptResult>>);

impl AttemptHandoff {
    pub fn new() -> Self {
        Self(RwSignal::new(None))
    }
}

impl Default for AttemptHandoff {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================
// 测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use learnhub_shared::error::ApiError;

    fn question(id: &str) -> Question {
        Question {
            id: id.to_string(),
            text: format!("question {}", id),
            options: vec![
                "A".to_string(),
                "B".to_string(),
                "C".to_string(),
                "D".to_string(),
            ],
            correct_answer: None,
            marks: 1,
        }
    }

    #[test]
    fn reselecting_overwrites_instead_of_appending() {
        let mut sheet = AnswerSheet::new();
        sheet.select("q1", "A");
        sheet.select("q1", "C");
        sheet.select("q2", "B");

        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.selected("q1"), Some("C"));
        assert_eq!(sheet.selected("q2"), Some("B"));
        assert_eq!(sheet.selected("q3"), None);
    }

    #[test]
    fn empty_sheet_is_a_valid_payload() {
        let sheet = AnswerSheet::new();
        assert!(sheet.is_empty());
        assert!(sheet.answers().is_empty());
    }

    #[test]
    fn gate_admits_exactly_one_submission() {
        let mut gate = SubmitGate::new();
        // 到点的计时器与点击提交按钮同帧到达
        assert!(gate.try_acquire());
        assert!(!gate.try_acquire());
        assert!(!gate.try_acquire());
    }

    #[test]
    fn gate_reopens_after_failed_submission() {
        let mut gate = SubmitGate::new();
        assert!(gate.try_acquire());
        gate.release();
        assert!(gate.try_acquire());
    }

    #[test]
    fn classifies_load_outcomes_into_distinct_phases() {
        let ready = classify_load(Ok(QuizQuestionsResponse {
            quiz_title: Some("Rust Basics".to_string()),
            time_limit_minutes: Some(15),
            questions: vec![question("q1")],
        }));
        match ready {
            AttemptPhase::Ready {
                quiz_title,
                time_limit_minutes,
                questions,
            } => {
                assert_eq!(quiz_title, "Rust Basics");
                assert_eq!(time_limit_minutes, 15);
                assert_eq!(questions.len(), 1);
            }
            _ => panic!("expected Ready"),
        }

        assert_eq!(
            classify_load(Err(ApiError::new(
                ApiErrorKind::PremiumRequired,
                403,
                "Premium subscription required",
            ))),
            AttemptPhase::PremiumLocked
        );
        assert_eq!(
            classify_load(Err(ApiError::new(
                ApiErrorKind::AlreadyAttempted,
                409,
                "You have already attempted this quiz",
            ))),
            AttemptPhase::AlreadyAttempted
        );
        assert!(matches!(
            classify_load(Err(ApiError::network("connection refused"))),
            AttemptPhase::LoadFailed(_)
        ));
    }

    #[test]
    fn missing_time_limit_falls_back_to_default() {
        let phase = classify_load(Ok(QuizQuestionsResponse {
            quiz_title: None,
            time_limit_minutes: None,
            questions: vec![],
        }));
        match phase {
            AttemptPhase::Ready {
                time_limit_minutes, ..
            } => assert_eq!(time_limit_minutes, DEFAULT_TIME_LIMIT_MINUTES),
            _ => panic!("expected Ready"),
        }
    }

    #[test]
    fn clock_renders_minutes_and_padded_seconds() {
        assert_eq!(format_clock(600), "10:00");
        assert_eq!(format_clock(61), "1:01");
        assert_eq!(format_clock(9), "0:09");
        assert_eq!(format_clock(0), "0:00");
    }
}
