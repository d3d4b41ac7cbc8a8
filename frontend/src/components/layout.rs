//! 应用外壳：顶部导航栏与页面容器

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::use_api;
use crate::auth::{logout, use_auth};
use crate::web::route::AppRoute;
use crate::web::router::use_router;

/// 页面外壳
///
/// 导航项随会话状态变化：管理入口仅管理员可见，
/// 订阅入口仅已登录且未订阅的用户可见。
#[component]
pub fn Shell(children: Children) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let api = use_api();

    let state = auth.state;
    let is_authenticated = move || state.get().is_authenticated;
    let is_admin = move || state.get().user.as_ref().is_some_and(|u| u.is_admin);
    let show_subscribe = move || {
        state
            .get()
            .user
            .as_ref()
            .is_some_and(|u| !u.is_subscribed)
    };
    let user_name = move || {
        state
            .get()
            .user
            .as_ref()
            .map(|u| u.name.clone())
            .unwrap_or_default()
    };

    let on_logout = move |_| {
        spawn_local(async move {
            let api = api.get_value();
            logout(&auth, &api).await;
            router.navigate_route(AppRoute::Home);
        });
    };

    let go = move |route: AppRoute| move |_| router.navigate_route(route.clone());

    view! {
        <div class="min-h-screen bg-base-200">
            <div class="navbar bg-base-100 shadow-md px-4">
                <div class="flex-1 gap-2">
                    <button class="btn btn-ghost text-xl" on:click=go(AppRoute::Home)>
                        "LearnHub"
                    </button>
                    <button class="btn btn-ghost btn-sm" on:click=go(AppRoute::Home)>
                        "Courses"
                    </button>
                    <button class="btn btn-ghost btn-sm" on:click=go(AppRoute::QuizList)>
                        "Quizzes"
                    </button>
                    <Show when=is_admin>
                        <button class="btn btn-ghost btn-sm" on:click=go(AppRoute::AdminDashboard)>
                            "Admin"
                        </button>
                    </Show>
                    <Show when=show_subscribe>
                        <button class="btn btn-outline btn-warning btn-sm" on:click=go(AppRoute::Subscribe)>
                            "Go Premium"
                        </button>
                    </Show>
                </div>
                <div class="flex-none gap-2">
                    <Show
                        when=is_authenticated
                        fallback=move || view! {
                            <button class="btn btn-ghost btn-sm" on:click=go(AppRoute::Login)>
                                "Log in"
                            </button>
                            <button class="btn btn-primary btn-sm" on:click=go(AppRoute::Register)>
                                "Sign up"
                            </button>
                        }
                    >
                        <span class="text-sm text-base-content/70">{user_name}</span>
                        <button class="btn btn-ghost btn-sm" on:click=on_logout>
                            "Log out"
                        </button>
                    </Show>
                </div>
            </div>
            <main class="max-w-5xl mx-auto p-4 md:p-8">{children()}</main>
        </div>
    }
}

/// 居中的加载转圈
#[component]
pub fn LoadingSpinner() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center py-16">
            <span class="loading loading-spinner loading-lg text-primary"></span>
        </div>
    }
}

/// 错误提示条
#[component]
pub fn ErrorAlert(message: String) -> impl IntoView {
    view! {
        <div role="alert" class="alert alert-error text-sm py-2">
            <span>{message}</span>
        </div>
    }
}
