use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    AuthResponse, ContentType, Course, CourseContentItem, MessageResponse, MockVerifyResponse,
    Question, Quiz, QuizQuestionsResponse, QuizReview, SubmitQuizResponse, SubmittedAnswer,
    SubscriptionPlan,
};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether requests with this method carry a JSON body.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// Path parameters live in `#[serde(skip)]` fields so they never leak into
/// request bodies; `path()` renders them into the URL.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// Whether the bearer access token is attached (when one is held).
    /// The auth endpoints themselves must not carry it.
    const AUTHENTICATED: bool = true;
    /// Whether a 401 response may be absorbed by a refresh-and-retry.
    /// Disabled for the auth endpoints to keep the interceptor non-recursive.
    const RETRY_ON_UNAUTHORIZED: bool = true;
    /// The URL path (without base URL).
    fn path(&self) -> String;
}

// =========================================================
// Auth
// =========================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for LoginRequest {
    type Response = AuthResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const AUTHENTICATED: bool = false;
    const RETRY_ON_UNAUTHORIZED: bool = false;
    fn path(&self) -> String {
        "/api/auth/login".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl ApiRequest for RegisterRequest {
    type Response = AuthResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const AUTHENTICATED: bool = false;
    const RETRY_ON_UNAUTHORIZED: bool = false;
    fn path(&self) -> String {
        "/api/auth/register".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl ApiRequest for RefreshRequest {
    type Response = AuthResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const AUTHENTICATED: bool = false;
    const RETRY_ON_UNAUTHORIZED: bool = false;
    fn path(&self) -> String {
        "/api/auth/refresh".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: String,
}

impl ApiRequest for LogoutRequest {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    // 登出是尽力而为：过期令牌不值得触发刷新链
    const RETRY_ON_UNAUTHORIZED: bool = false;
    fn path(&self) -> String {
        "/api/auth/logout".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
}

impl ApiRequest for ForgotPasswordRequest {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const AUTHENTICATED: bool = false;
    const RETRY_ON_UNAUTHORIZED: bool = false;
    fn path(&self) -> String {
        "/api/auth/forgot-password".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    /// 单次使用的重置令牌，来自邮件链接，仅出现在路径中
    #[serde(skip)]
    pub token: String,
    pub password: String,
}

impl ApiRequest for ResetPasswordRequest {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const AUTHENTICATED: bool = false;
    const RETRY_ON_UNAUTHORIZED: bool = false;
    fn path(&self) -> String {
        format!("/api/auth/reset-password/{}", self.token)
    }
}

// =========================================================
// Courses
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct ListCoursesRequest;

impl ApiRequest for ListCoursesRequest {
    type Response = Vec<Course>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/v1/courses".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetCourseRequest {
    #[serde(skip)]
    pub course_id: String,
}

impl ApiRequest for GetCourseRequest {
    type Response = Course;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/api/v1/courses/{}", self.course_id)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub is_premium: bool,
}

impl ApiRequest for CreateCourseRequest {
    type Response = Course;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/v1/courses".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    #[serde(skip)]
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub is_premium: bool,
}

impl ApiRequest for UpdateCourseRequest {
    type Response = Course;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/api/v1/courses/{}", self.course_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteCourseRequest {
    #[serde(skip)]
    pub course_id: String,
}

impl ApiRequest for DeleteCourseRequest {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/api/v1/courses/{}", self.course_id)
    }
}

// =========================================================
// Course content
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct ListCourseContentRequest {
    #[serde(skip)]
    pub course_id: String,
}

impl ApiRequest for ListCourseContentRequest {
    type Response = Vec<CourseContentItem>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/api/v1/courses/{}/content", self.course_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetContentItemRequest {
    #[serde(skip)]
    pub course_id: String,
    #[serde(skip)]
    pub content_id: String,
}

impl ApiRequest for GetContentItemRequest {
    type Response = CourseContentItem;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!(
            "/api/v1/courses/{}/content/{}",
            self.course_id, self.content_id
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddContentItemRequest {
    #[serde(skip)]
    pub course_id: String,
    pub title: String,
    pub content_type: ContentType,
    pub content_url: String,
    pub is_free: bool,
}

impl ApiRequest for AddContentItemRequest {
    type Response = CourseContentItem;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        format!("/api/v1/courses/{}/content", self.course_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteContentItemRequest {
    #[serde(skip)]
    pub course_id: String,
    #[serde(skip)]
    pub content_id: String,
}

impl ApiRequest for DeleteContentItemRequest {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!(
            "/api/v1/courses/{}/content/{}",
            self.course_id, self.content_id
        )
    }
}

// =========================================================
// Quizzes
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct ListQuizzesRequest;

impl ApiRequest for ListQuizzesRequest {
    type Response = Vec<Quiz>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/v1/quizzes".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListCourseQuizzesRequest {
    #[serde(skip)]
    pub course_id: String,
}

impl ApiRequest for ListCourseQuizzesRequest {
    type Response = Vec<Quiz>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/api/v1/quizzes/course/{}", self.course_id)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    pub title: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    pub is_premium: bool,
    pub time_limit_minutes: u32,
    pub total_marks: u32,
}

impl ApiRequest for CreateQuizRequest {
    type Response = Quiz;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/v1/quizzes".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuizRequest {
    #[serde(skip)]
    pub quiz_id: String,
    pub title: String,
    pub category: String,
    pub is_premium: bool,
    pub time_limit_minutes: u32,
    pub total_marks: u32,
}

impl ApiRequest for UpdateQuizRequest {
    type Response = Quiz;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/api/v1/quizzes/{}", self.quiz_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteQuizRequest {
    #[serde(skip)]
    pub quiz_id: String,
}

impl ApiRequest for DeleteQuizRequest {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/api/v1/quizzes/{}", self.quiz_id)
    }
}

// =========================================================
// Questions & attempts
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct GetQuizQuestionsRequest {
    #[serde(skip)]
    pub quiz_id: String,
    /// 管理端查询附带 `?admin=true`，响应才包含正确答案
    #[serde(skip)]
    pub admin: bool,
}

impl ApiRequest for GetQuizQuestionsRequest {
    type Response = QuizQuestionsResponse;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        if self.admin {
            format!("/api/v1/quizzes/{}/questions?admin=true", self.quiz_id)
        } else {
            format!("/api/v1/quizzes/{}/questions", self.quiz_id)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddQuestionRequest {
    #[serde(skip)]
    pub quiz_id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub marks: u32,
}

impl ApiRequest for AddQuestionRequest {
    type Response = Question;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        format!("/api/v1/quizzes/{}/questions", self.quiz_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteQuestionRequest {
    #[serde(skip)]
    pub quiz_id: String,
    #[serde(skip)]
    pub question_id: String,
}

impl ApiRequest for DeleteQuestionRequest {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!(
            "/api/v1/quizzes/{}/questions/{}",
            self.quiz_id, self.question_id
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    #[serde(skip)]
    pub quiz_id: String,
    pub answers: Vec<SubmittedAnswer>,
}

impl ApiRequest for SubmitQuizRequest {
    type Response = SubmitQuizResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        format!("/api/v1/quizzes/{}/submit", self.quiz_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewQuizRequest {
    #[serde(skip)]
    pub quiz_id: String,
}

impl ApiRequest for ReviewQuizRequest {
    type Response = QuizReview;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/api/v1/quizzes/{}/review", self.quiz_id)
    }
}

// =========================================================
// Subscriptions
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct ListPlansRequest;

impl ApiRequest for ListPlansRequest {
    type Response = Vec<SubscriptionPlan>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/v1/subscriptions".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockVerifyRequest {
    pub plan_id: String,
    pub mock_payment_id: String,
}

impl ApiRequest for MockVerifyRequest {
    type Response = MockVerifyResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/v1/subscriptions/mock-verify".to_string()
    }
}

// =========================================================
// 测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_password_token_goes_into_path_not_body() {
        let req = ResetPasswordRequest {
            token: "tok123".to_string(),
            password: "hunter2".to_string(),
        };
        assert_eq!(req.path(), "/api/auth/reset-password/tok123");
        let body = serde_json::to_string(&req).unwrap();
        assert!(!body.contains("tok123"));
        assert!(body.contains("hunter2"));
    }

    #[test]
    fn admin_flag_switches_question_path() {
        let learner = GetQuizQuestionsRequest {
            quiz_id: "q1".to_string(),
            admin: false,
        };
        let admin = GetQuizQuestionsRequest {
            quiz_id: "q1".to_string(),
            admin: true,
        };
        assert_eq!(learner.path(), "/api/v1/quizzes/q1/questions");
        assert_eq!(admin.path(), "/api/v1/quizzes/q1/questions?admin=true");
    }

    #[test]
    fn submit_body_is_keyed_answers_only() {
        let req = SubmitQuizRequest {
            quiz_id: "q1".to_string(),
            answers: vec![SubmittedAnswer {
                question_id: "a".to_string(),
                user_answer: "Paris".to_string(),
            }],
        };
        let body = serde_json::to_string(&req).unwrap();
        assert_eq!(
            body,
            r#"{"answers":[{"questionId":"a","userAnswer":"Paris"}]}"#
        );
    }

    #[test]
    fn auth_endpoints_never_carry_bearer_or_retry() {
        assert!(!LoginRequest::AUTHENTICATED);
        assert!(!RefreshRequest::AUTHENTICATED);
        assert!(!RefreshRequest::RETRY_ON_UNAUTHORIZED);
        assert!(!LogoutRequest::RETRY_ON_UNAUTHORIZED);
        // 受保护端点保持默认
        assert!(ListCoursesRequest::AUTHENTICATED);
        assert!(ListCoursesRequest::RETRY_ON_UNAUTHORIZED);
    }

    #[test]
    fn methods_with_bodies() {
        assert!(HttpMethod::Post.has_body());
        assert!(HttpMethod::Put.has_body());
        assert!(!HttpMethod::Get.has_body());
        assert!(!HttpMethod::Delete.has_body());
    }

    #[test]
    fn course_scoped_quiz_list_path() {
        let req = ListCourseQuizzesRequest {
            course_id: "c9".to_string(),
        };
        assert_eq!(req.path(), "/api/v1/quizzes/course/c9");
    }

    /// 经由关联类型反序列化响应，端点与响应模型保持绑定
    #[test]
    fn response_types_deserialize_through_the_trait() {
        let attempt: <SubmitQuizRequest as ApiRequest>::Response = serde_json::from_str(
            r#"{"attempt":{"score":1,"totalQuestions":2,"percentage":50.0,"answers":[]}}"#,
        )
        .unwrap();
        assert_eq!(attempt.attempt.score, 1);

        let plans: <ListPlansRequest as ApiRequest>::Response = serde_json::from_str(
            r#"[{"id":"p1","name":"Monthly","price":9.99,"durationDays":30,"features":[]}]"#,
        )
        .unwrap();
        assert_eq!(plans[0].duration_days, 30);
    }
}
