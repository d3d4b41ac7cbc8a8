//! LearnHub 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `session` / `api`: 会话核心与带刷新拦截的 API 客户端
//! - `auth`: 认证状态管理
//! - `quiz` / `content` / `admin`: 页面背后的纯状态逻辑
//! - `components`: UI 组件层

mod admin;
mod api;
mod auth;
mod content;
mod quiz;
mod session;

mod components {
    pub mod admin;
    pub mod auth_pages;
    pub mod content_player;
    pub mod course_detail;
    pub mod course_library;
    pub mod layout;
    pub mod quiz_pages;
    pub mod subscription;
}

use leptos::prelude::*;

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    pub mod http;
    pub mod route;
    pub mod router;
    mod storage;
    mod timer;

    pub use storage::LocalStorage;
    pub use timer::Interval;
}

use crate::api::{Api, FetchHttpClient, provide_api};
use crate::auth::{AuthContext, init_auth};
use crate::components::admin::{AdminCourseManagePage, AdminDashboardPage, AdminQuizEditorPage};
use crate::components::auth_pages::{
    ForgotPasswordPage, LoginPage, RegisterPage, ResetPasswordPage,
};
use crate::components::content_player::ContentPlayerPage;
use crate::components::course_detail::CourseDetailPage;
use crate::components::course_library::HomePage;
use crate::components::quiz_pages::{
    QuizListPage, QuizResultPage, QuizReviewPage, QuizStartPage,
};
use crate::components::subscription::SubscribePage;
use crate::quiz::AttemptHandoff;
use crate::session::{LocalStorageVault, SessionCore};
use crate::web::LocalStorage;
use crate::web::route::AppRoute;
use crate::web::router::{Router, RouterOutlet};

/// 默认后端地址；可用 LocalStorage 的 `learnhub_api_url` 键覆盖
const DEFAULT_API_URL: &str = "http://localhost:5000";
const STORAGE_API_URL_KEY: &str = "learnhub_api_url";

fn api_base_url() -> String {
    LocalStorage::get(STORAGE_API_URL_KEY).unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::ForgotPassword => view! { <ForgotPasswordPage /> }.into_any(),
        AppRoute::ResetPassword { token } => {
            view! { <ResetPasswordPage token=token /> }.into_any()
        }
        AppRoute::CourseDetail { course_id } => {
            view! { <CourseDetailPage course_id=course_id /> }.into_any()
        }
        AppRoute::ContentPlayer {
            course_id,
            content_id,
        } => view! { <ContentPlayerPage course_id=course_id content_id=content_id /> }.into_any(),
        AppRoute::QuizList => view! { <QuizListPage /> }.into_any(),
        AppRoute::QuizStart { quiz_id } => view! { <QuizStartPage quiz_id=quiz_id /> }.into_any(),
        AppRoute::QuizResult { quiz_id } => {
            view! { <QuizResultPage quiz_id=quiz_id /> }.into_any()
        }
        AppRoute::QuizReview { quiz_id } => {
            view! { <QuizReviewPage quiz_id=quiz_id /> }.into_any()
        }
        AppRoute::Subscribe => view! { <SubscribePage /> }.into_any(),
        AppRoute::AdminDashboard => view! { <AdminDashboardPage /> }.into_any(),
        AppRoute::AdminCourseManage { course_id } => {
            view! { <AdminCourseManagePage course_id=course_id /> }.into_any()
        }
        AppRoute::AdminQuizEditor { quiz_id } => {
            view! { <AdminQuizEditorPage quiz_id=quiz_id /> }.into_any()
        }
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建会话核心与 API 客户端
    let session = SessionCore::new(Box::new(LocalStorageVault));
    let api = Api::new(api_base_url(), FetchHttpClient, session);

    // 2. 创建认证上下文并注册会话事件监听
    let auth_ctx = AuthContext::new();
    provide_context(auth_ctx);
    provide_api(api.clone());
    init_auth(&auth_ctx, &api);

    // 3. 成绩交接信道（提交页 -> 成绩页）
    provide_context(AttemptHandoff::new());

    // 4. 路由器组件：注入会话快照信号实现守卫（解耦！）
    let session_signals = auth_ctx.session_signals();

    view! {
        <Router session=session_signals>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
