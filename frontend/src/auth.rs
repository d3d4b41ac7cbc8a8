//! 认证模块（Session Store）
//!
//! 管理会话的响应式状态，与路由系统解耦：路由服务只消费注入的
//! 会话信号。令牌本体存放在 `session::SessionCore`（api 层共享），
//! 这里只持有用户档案与加载标志，并把两边的写入串在同一批操作里。
//!
//! 状态机：`Unknown(loading) -> {Authenticated, Anonymous}`；
//! 登出或刷新失败回到 Anonymous，登录 / 注册 / 刷新进入 Authenticated。

use leptos::prelude::*;
use learnhub_shared::protocol::{
    ForgotPasswordRequest, LoginRequest, LogoutRequest, RegisterRequest, ResetPasswordRequest,
};
use learnhub_shared::{MessageResponse, UserProfile};

use crate::api::Api;
use crate::session::SessionEvent;
use crate::web::router::SessionSignals;

/// 认证状态
#[derive(Clone, Default)]
pub struct AuthState {
    /// 当前用户档案（仅认证后存在），随每次成功认证整体替换
    pub user: Option<UserProfile>,
    /// 是否已认证；与 SessionCore 的访问令牌同步维护
    pub is_authenticated: bool,
    /// 启动时的静默恢复是否仍在进行
    pub is_loading: bool,
}

/// 认证上下文
///
/// 包含读写信号，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    pub state: ReadSignal<AuthState>,
    pub set_state: WriteSignal<AuthState>,
}

impl AuthContext {
    pub fn new() -> Self {
        let (state, set_state) = signal(AuthState {
            user: None,
            is_authenticated: false,
            // 启动为 Unknown，静默恢复解析前不渲染受保护内容
            is_loading: true,
        });
        Self { state, set_state }
    }

    /// 打包给路由服务注入的会话快照信号
    pub fn session_signals(&self) -> SessionSignals {
        let state = self.state;
        SessionSignals {
            is_loading: Signal::derive(move || state.get().is_loading),
            is_authenticated: Signal::derive(move || state.get().is_authenticated),
            is_admin: Signal::derive(move || {
                state.get().user.as_ref().is_some_and(|u| u.is_admin)
            }),
        }
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 初始化认证状态
///
/// 1. 注册会话事件监听：拦截器在任意请求途中刷新或强制登出时，
///    信号随之同步（使用 `try_update`，事件可能在视图树外到达）。
/// 2. 发起启动时的静默恢复；保管库为空时立即以匿名态完成。
pub fn init_auth(ctx: &AuthContext, api: &Api) {
    let set_state = ctx.set_state;
    api.session().set_listener(move |event| match event {
        SessionEvent::TokenRefreshed { user } => {
            let user = user.clone();
            set_state.try_update(|state| {
                state.user = Some(user);
                state.is_authenticated = true;
            });
        }
        SessionEvent::LoggedOut => {
            set_state.try_update(|state| {
                state.user = None;
                state.is_authenticated = false;
            });
        }
    });

    let api = api.clone();
    leptos::task::spawn_local(async move {
        // 档案本身经 TokenRefreshed 事件写入，这里只负责结束加载态
        api.restore_session().await;
        set_state.try_update(|state| state.is_loading = false);
    });
}

/// 登录
///
/// 失败时不触碰既有状态（不在登录途中强制登出）。
pub async fn login(ctx: &AuthContext, api: &Api, email: String, password: String) -> bool {
    match api.send(&LoginRequest { email, password }).await {
        Ok(auth) => {
            api.session().install(&auth);
            ctx.set_state.update(|state| {
                state.user = Some(auth.user);
                state.is_authenticated = true;
            });
            true
        }
        Err(_) => false,
    }
}

/// 注册，契约与登录一致
pub async fn register(
    ctx: &AuthContext,
    api: &Api,
    name: String,
    email: String,
    password: String,
) -> bool {
    match api.send(&RegisterRequest { name, email, password }).await {
        Ok(auth) => {
            api.session().install(&auth);
            ctx.set_state.update(|state| {
                state.user = Some(auth.user);
                state.is_authenticated = true;
            });
            true
        }
        Err(_) => false,
    }
}

/// 注销
///
/// 尽力通知服务端吊销刷新令牌（失败仅记录），本地状态无条件清空。
/// 幂等：已登出时调用安全。
pub async fn logout(ctx: &AuthContext, api: &Api) {
    if let Some(refresh_token) = api.session().refresh_token() {
        if let Err(_err) = api.send(&LogoutRequest { refresh_token }).await {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::warn_1(
                &format!("[Auth] server-side logout failed: {}", _err).into(),
            );
        }
    }
    api.session().clear();
    ctx.set_state.update(|state| {
        state.user = None;
        state.is_authenticated = false;
    });
}

/// 忘记密码：请求重置链接
pub async fn forgot_password(api: &Api, email: String) -> bool {
    match api.send(&ForgotPasswordRequest { email }).await {
        Ok(response) => forgot_password_succeeded(&response),
        Err(_) => false,
    }
}

/// 只有显式的 `success: true` 才算成功。
/// 仅凭 `message` 存在推断成功的旧行为被有意放弃。
pub fn forgot_password_succeeded(response: &MessageResponse) -> bool {
    response.success == Some(true)
}

/// 以单次使用的重置令牌提交新密码；2xx 即成功
pub async fn reset_password(api: &Api, token: String, password: String) -> bool {
    api.send(&ResetPasswordRequest { token, password })
        .await
        .is_ok()
}

/// 订阅购买成功后就地修正缓存档案，省掉一次往返。
/// 这是登录 / 刷新之外唯一允许的档案变更。
pub fn update_subscription_status(ctx: &AuthContext, is_subscribed: bool) {
    ctx.set_state.update(|state| {
        if let Some(user) = &mut state.user {
            user.is_subscribed = is_subscribed;
        }
    });
}

// =========================================================
// 测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forgot_password_requires_explicit_success_flag() {
        assert!(forgot_password_succeeded(&MessageResponse {
            success: Some(true),
            message: None,
        }));
        // 仅有 message 不再视为成功
        assert!(!forgot_password_succeeded(&MessageResponse {
            success: None,
            message: Some("If an account exists, a link was sent".to_string()),
        }));
        assert!(!forgot_password_succeeded(&MessageResponse {
            success: Some(false),
            message: Some("mailer unavailable".to_string()),
        }));
        assert!(!forgot_password_succeeded(&MessageResponse::default()));
    }
}
