//! 路由定义模块 - 领域模型
//!
//! 纯业务逻辑层，不依赖 DOM 或 web_sys。
//! 定义应用的所有路由、路径解析以及访问守卫规则。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 课程目录（默认路由）
    #[default]
    Home,
    Login,
    Register,
    ForgotPassword,
    ResetPassword {
        token: String,
    },
    CourseDetail {
        course_id: String,
    },
    ContentPlayer {
        course_id: String,
        content_id: String,
    },
    QuizList,
    QuizStart {
        quiz_id: String,
    },
    QuizResult {
        quiz_id: String,
    },
    QuizReview {
        quiz_id: String,
    },
    Subscribe,
    AdminDashboard,
    AdminCourseManage {
        course_id: String,
    },
    AdminQuizEditor {
        quiz_id: String,
    },
    NotFound,
}

/// 守卫裁决
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// 放行
    Allow,
    /// 会话状态尚未就绪，不做任何导航决定
    Wait,
    /// 拒绝并重定向
    RedirectTo(AppRoute),
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] | ["courses"] => Self::Home,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["forgot-password"] => Self::ForgotPassword,
            ["reset-password", token] => Self::ResetPassword {
                token: (*token).to_string(),
            },
            ["course", id] => Self::CourseDetail {
                course_id: (*id).to_string(),
            },
            ["course", course_id, "content", content_id] => Self::ContentPlayer {
                course_id: (*course_id).to_string(),
                content_id: (*content_id).to_string(),
            },
            ["quizzes"] => Self::QuizList,
            ["quiz", id] => Self::QuizStart {
                quiz_id: (*id).to_string(),
            },
            ["quiz", id, "result"] => Self::QuizResult {
                quiz_id: (*id).to_string(),
            },
            ["quiz", id, "review"] => Self::QuizReview {
                quiz_id: (*id).to_string(),
            },
            ["subscribe"] => Self::Subscribe,
            ["admin"] => Self::AdminDashboard,
            ["admin", "courses", id] => Self::AdminCourseManage {
                course_id: (*id).to_string(),
            },
            ["admin", "quizzes", id] => Self::AdminQuizEditor {
                quiz_id: (*id).to_string(),
            },
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::ForgotPassword => "/forgot-password".to_string(),
            Self::ResetPassword { token } => format!("/reset-password/{}", token),
            Self::CourseDetail { course_id } => format!("/course/{}", course_id),
            Self::ContentPlayer {
                course_id,
                content_id,
            } => format!("/course/{}/content/{}", course_id, content_id),
            Self::QuizList => "/quizzes".to_string(),
            Self::QuizStart { quiz_id } => format!("/quiz/{}", quiz_id),
            Self::QuizResult { quiz_id } => format!("/quiz/{}/result", quiz_id),
            Self::QuizReview { quiz_id } => format!("/quiz/{}/review", quiz_id),
            Self::Subscribe => "/subscribe".to_string(),
            Self::AdminDashboard => "/admin".to_string(),
            Self::AdminCourseManage { course_id } => format!("/admin/courses/{}", course_id),
            Self::AdminQuizEditor { quiz_id } => format!("/admin/quizzes/{}", quiz_id),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// 该路由是否要求已认证会话
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::QuizStart { .. }
                | Self::QuizResult { .. }
                | Self::QuizReview { .. }
                | Self::Subscribe
        ) || self.requires_admin()
    }

    /// 该路由是否要求管理员会话
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Self::AdminDashboard | Self::AdminCourseManage { .. } | Self::AdminQuizEditor { .. }
        )
    }

    /// 已认证用户是否应该离开此路由（登录 / 注册页）
    pub fn redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }
}

/// **核心守卫逻辑**
///
/// 纯函数：由当前会话快照决定目标路由的裁决。
/// 加载中对所有受守卫路由返回 `Wait`，不做导航决定；
/// 管理路由拒绝时，已登录的普通用户回首页，匿名用户去登录页。
pub fn guard(
    route: &AppRoute,
    is_loading: bool,
    is_authenticated: bool,
    is_admin: bool,
) -> GuardOutcome {
    let guarded = route.requires_auth() || route.redirect_when_authenticated();
    if is_loading && guarded {
        return GuardOutcome::Wait;
    }

    if route.requires_admin() && !(is_authenticated && is_admin) {
        let target = if is_authenticated {
            AppRoute::Home
        } else {
            AppRoute::Login
        };
        return GuardOutcome::RedirectTo(target);
    }

    if route.requires_auth() && !is_authenticated {
        return GuardOutcome::RedirectTo(AppRoute::Login);
    }

    if route.redirect_when_authenticated() && is_authenticated {
        return GuardOutcome::RedirectTo(AppRoute::Home);
    }

    GuardOutcome::Allow
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

// =========================================================
// 测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_parameterized_paths() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Home);
        assert_eq!(AppRoute::from_path("/courses"), AppRoute::Home);
        assert_eq!(
            AppRoute::from_path("/course/c1"),
            AppRoute::CourseDetail {
                course_id: "c1".to_string()
            }
        );
        assert_eq!(
            AppRoute::from_path("/course/c1/content/l7"),
            AppRoute::ContentPlayer {
                course_id: "c1".to_string(),
                content_id: "l7".to_string()
            }
        );
        assert_eq!(
            AppRoute::from_path("/quiz/q1/review"),
            AppRoute::QuizReview {
                quiz_id: "q1".to_string()
            }
        );
        assert_eq!(
            AppRoute::from_path("/reset-password/tok"),
            AppRoute::ResetPassword {
                token: "tok".to_string()
            }
        );
        assert_eq!(AppRoute::from_path("/no/such/page"), AppRoute::NotFound);
    }

    #[test]
    fn query_strings_are_ignored() {
        assert_eq!(AppRoute::from_path("/quizzes?page=2"), AppRoute::QuizList);
    }

    #[test]
    fn round_trips_through_to_path() {
        let routes = [
            AppRoute::QuizStart {
                quiz_id: "q9".to_string(),
            },
            AppRoute::AdminCourseManage {
                course_id: "c3".to_string(),
            },
            AppRoute::Subscribe,
            AppRoute::Login,
        ];
        for route in routes {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn loading_session_defers_all_guarded_decisions() {
        let quiz = AppRoute::QuizStart {
            quiz_id: "q1".to_string(),
        };
        assert_eq!(guard(&quiz, true, false, false), GuardOutcome::Wait);
        assert_eq!(guard(&AppRoute::Login, true, false, false), GuardOutcome::Wait);
        // 无守卫的路由在加载期也照常放行
        assert_eq!(guard(&AppRoute::Home, true, false, false), GuardOutcome::Allow);
    }

    #[test]
    fn anonymous_sessions_are_sent_to_login() {
        let quiz = AppRoute::QuizStart {
            quiz_id: "q1".to_string(),
        };
        assert_eq!(
            guard(&quiz, false, false, false),
            GuardOutcome::RedirectTo(AppRoute::Login)
        );
        assert_eq!(
            guard(&AppRoute::AdminDashboard, false, false, false),
            GuardOutcome::RedirectTo(AppRoute::Login)
        );
    }

    #[test]
    fn admin_routes_reject_non_admin_users() {
        // 已登录但非管理员：回首页
        assert_eq!(
            guard(&AppRoute::AdminDashboard, false, true, false),
            GuardOutcome::RedirectTo(AppRoute::Home)
        );
        // 管理员放行
        assert_eq!(
            guard(&AppRoute::AdminDashboard, false, true, true),
            GuardOutcome::Allow
        );
    }

    #[test]
    fn authenticated_users_leave_auth_pages() {
        assert_eq!(
            guard(&AppRoute::Login, false, true, false),
            GuardOutcome::RedirectTo(AppRoute::Home)
        );
        assert_eq!(
            guard(&AppRoute::ForgotPassword, false, true, false),
            GuardOutcome::Allow
        );
    }
}
