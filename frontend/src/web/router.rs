//! 路由服务模块 - 核心引擎
//!
//! 封装 web_sys 的 History API，所有对 window.history 的操作都集中在此。
//! 导航流程："请求 -> 守卫裁决 -> 处理 -> 加载"；
//! 守卫本身是 `route::guard` 纯函数，这里只负责执行裁决。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::{AppRoute, GuardOutcome, guard};

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（用于重定向，不污染后退栈）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 会话快照信号，由外部（认证层）注入，实现解耦
#[derive(Clone, Copy)]
pub struct SessionSignals {
    pub is_loading: Signal<bool>,
    pub is_authenticated: Signal<bool>,
    pub is_admin: Signal<bool>,
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    session: SessionSignals,
}

impl RouterService {
    fn new(session: SessionSignals) -> Self {
        let initial_route = AppRoute::from_path(&current_path());
        let (current_route, set_route) = signal(initial_route);

        Self {
            current_route,
            set_route,
            session,
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// **核心方法：导航与守卫**
    pub fn navigate(&self, path: &str) {
        self.navigate_to_route(AppRoute::from_path(path), true);
    }

    pub fn navigate_route(&self, route: AppRoute) {
        self.navigate_to_route(route, true);
    }

    fn snapshot(&self) -> (bool, bool, bool) {
        (
            self.session.is_loading.get_untracked(),
            self.session.is_authenticated.get_untracked(),
            self.session.is_admin.get_untracked(),
        )
    }

    /// 导航到指定路由
    ///
    /// `use_push` 为 true 使用 pushState，否则 replaceState。
    fn navigate_to_route(&self, target_route: AppRoute, use_push: bool) {
        let (is_loading, is_auth, is_admin) = self.snapshot();

        match guard(&target_route, is_loading, is_auth, is_admin) {
            GuardOutcome::RedirectTo(redirect) => {
                web_sys::console::log_1(
                    &format!("[Router] Access denied, redirecting to {}", redirect).into(),
                );
                if use_push {
                    push_history_state(&redirect.to_path());
                } else {
                    replace_history_state(&redirect.to_path());
                }
                self.set_route.set(redirect);
            }
            // Wait: 会话仍在加载，先展示目标路由的等待态；
            // 加载完成后 setup_session_guard 的 Effect 会重新裁决
            GuardOutcome::Allow | GuardOutcome::Wait => {
                if use_push {
                    push_history_state(&target_route.to_path());
                } else {
                    replace_history_state(&target_route.to_path());
                }
                self.set_route.set(target_route);
            }
        }
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let service = *self;

        let closure = Closure::<dyn Fn()>::new(move || {
            // popstate 时同样执行守卫，但不再推入新历史
            service.navigate_to_route(AppRoute::from_path(&current_path()), false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 会话状态变化时对当前路由重新裁决
    ///
    /// 覆盖三种情况：静默刷新完成（Wait -> Allow/Redirect）、
    /// 登出（受保护页 -> 登录页）、登录成功（登录页 -> 首页）。
    fn setup_session_guard(&self) {
        let service = *self;

        Effect::new(move |_| {
            let is_loading = service.session.is_loading.get();
            let is_auth = service.session.is_authenticated.get();
            let is_admin = service.session.is_admin.get();
            let route = service.current_route.get_untracked();

            if let GuardOutcome::RedirectTo(redirect) = guard(&route, is_loading, is_auth, is_admin)
            {
                web_sys::console::log_1(
                    &format!("[Router] Session changed, redirecting to {}", redirect).into(),
                );
                replace_history_state(&redirect.to_path());
                service.set_route.set(redirect);
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(session: SessionSignals) -> RouterService {
    let router = RouterService::new(session);

    router.init_popstate_listener();
    router.setup_session_guard();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件，应在 App 根部使用
#[component]
pub fn Router(
    /// 会话快照信号
    session: SessionSignals,
    /// 子组件
    children: Children,
) -> impl IntoView {
    provide_router(session);

    children()
}

/// 路由出口组件：根据当前路由状态渲染对应的视图
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}
