//! 会话核心模块
//!
//! 持有访问令牌与刷新去重槽位的进程内单一位置。显式对象 + `Rc` 注入，
//! 不使用环境全局量；写入只发生在登录 / 注册 / 刷新 / 登出四条路径上。
//!
//! 刷新令牌是唯一跨刷新页面存活的状态，放在 `TokenVault` 背后
//! （生产实现为 LocalStorage 固定键）。

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{LocalBoxFuture, Shared};
use learnhub_shared::error::ApiError;
use learnhub_shared::{AuthResponse, UserProfile};

use crate::web::LocalStorage;

/// 刷新令牌在 LocalStorage 中的固定键
pub const STORAGE_REFRESH_TOKEN_KEY: &str = "learnhub_refresh_token";

/// 正在进行的刷新调用：所有遇到 401 的等待者共享同一个 future，
/// 保证同一时刻最多只有一个刷新请求到达服务端。
pub type RefreshFuture = Shared<LocalBoxFuture<'static, Result<String, ApiError>>>;

// =========================================================
// 刷新令牌保管
// =========================================================

/// 刷新令牌的持久化抽象
pub trait TokenVault {
    fn load(&self) -> Option<String>;
    fn store(&self, token: &str);
    fn clear(&self);
}

/// 浏览器 LocalStorage 实现
pub struct LocalStorageVault;

impl TokenVault for LocalStorageVault {
    fn load(&self) -> Option<String> {
        LocalStorage::get(STORAGE_REFRESH_TOKEN_KEY)
    }

    fn store(&self, token: &str) {
        LocalStorage::set(STORAGE_REFRESH_TOKEN_KEY, token);
    }

    fn clear(&self) {
        LocalStorage::delete(STORAGE_REFRESH_TOKEN_KEY);
    }
}

/// 测试用内存实现；`Rc` 共享内部状态便于断言
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemoryVault {
    token: Rc<RefCell<Option<String>>>,
}

#[cfg(test)]
impl MemoryVault {
    pub fn with_token(token: &str) -> Self {
        let vault = Self::default();
        *vault.token.borrow_mut() = Some(token.to_string());
        vault
    }
}

#[cfg(test)]
impl TokenVault for MemoryVault {
    fn load(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn store(&self, token: &str) {
        *self.token.borrow_mut() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.token.borrow_mut() = None;
    }
}

// =========================================================
// 会话事件
// =========================================================

/// 会话层向响应式层广播的事件
///
/// 拦截器在任意请求途中可能刷新令牌或强制登出，
/// 通过事件回调让信号层同步，避免 api 层依赖 leptos。
pub enum SessionEvent {
    /// 刷新成功，档案随刷新响应整体替换
    TokenRefreshed { user: UserProfile },
    /// 强制登出（刷新失败或显式登出）
    LoggedOut,
}

// =========================================================
// 会话核心
// =========================================================

pub struct SessionCore {
    access_token: RefCell<Option<String>>,
    pub(crate) refresh_inflight: RefCell<Option<RefreshFuture>>,
    vault: Box<dyn TokenVault>,
    listener: RefCell<Option<Box<dyn Fn(&SessionEvent)>>>,
}

impl SessionCore {
    pub fn new(vault: Box<dyn TokenVault>) -> Rc<Self> {
        Rc::new(Self {
            access_token: RefCell::new(None),
            refresh_inflight: RefCell::new(None),
            vault,
            listener: RefCell::new(None),
        })
    }

    pub fn access_token(&self) -> Option<String> {
        self.access_token.borrow().clone()
    }

    pub fn set_access_token(&self, token: Option<String>) {
        *self.access_token.borrow_mut() = token;
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.borrow().is_some()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.vault.load()
    }

    /// 安装一次成功认证（登录 / 注册 / 刷新）的凭据。
    /// 刷新响应未轮换刷新令牌时保留原值。
    pub fn install(&self, auth: &AuthResponse) {
        self.set_access_token(Some(auth.access_token.clone()));
        if let Some(refresh_token) = &auth.refresh_token {
            self.vault.store(refresh_token);
        }
    }

    /// 清空会话：内存令牌与持久化刷新令牌一并移除。幂等。
    pub fn clear(&self) {
        *self.access_token.borrow_mut() = None;
        self.vault.clear();
    }

    pub fn set_listener(&self, listener: impl Fn(&SessionEvent) + 'static) {
        *self.listener.borrow_mut() = Some(Box::new(listener));
    }

    pub fn emit(&self, event: &SessionEvent) {
        if let Some(listener) = self.listener.borrow().as_ref() {
            listener(event);
        }
    }
}

// =========================================================
// 测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_is_idempotent_and_empties_both_stores() {
        let vault = MemoryVault::with_token("rt-1");
        let session = SessionCore::new(Box::new(vault.clone()));
        session.set_access_token(Some("at-1".to_string()));

        session.clear();
        assert!(session.access_token().is_none());
        assert!(vault.load().is_none());

        // 再次清空不 panic、状态不变
        session.clear();
        assert!(session.access_token().is_none());
    }

    #[test]
    fn authenticated_iff_access_token_present() {
        let session = SessionCore::new(Box::new(MemoryVault::default()));
        assert!(!session.is_authenticated());
        session.set_access_token(Some("at".to_string()));
        assert!(session.is_authenticated());
        session.set_access_token(None);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn listener_receives_events() {
        use std::cell::Cell;

        let session = SessionCore::new(Box::new(MemoryVault::default()));
        let fired = Rc::new(Cell::new(false));
        let fired_clone = fired.clone();
        session.set_listener(move |event| {
            if matches!(event, SessionEvent::LoggedOut) {
                fired_clone.set(true);
            }
        });

        session.emit(&SessionEvent::LoggedOut);
        assert!(fired.get());
    }
}
