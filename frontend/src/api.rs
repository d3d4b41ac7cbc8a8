//! API 客户端与授权拦截器
//!
//! 类型化客户端：端点即 `ApiRequest` 实现，`send` 负责装配 URL、
//! 附加 Bearer 令牌、JSON 编解码与错误分类。
//!
//! 拦截器契约：每个请求最多吸收一次 401 —— 通过共享的单飞刷新
//! future 换取新令牌并原样重放一次；刷新失败则强制登出并把
//! **原始** 401 错误传给调用方。已重试过的请求再遇 401 不再刷新。

use std::rc::Rc;

use async_trait::async_trait;
use futures::FutureExt;
use leptos::prelude::{LocalStorage, StoredValue, expect_context, provide_context};
use serde::de::DeserializeOwned;

use learnhub_shared::error::{ApiError, ApiResult};
use learnhub_shared::protocol::{ApiRequest, HttpMethod, RefreshRequest};
use learnhub_shared::AuthResponse;

use crate::session::{RefreshFuture, SessionCore, SessionEvent};

// =========================================================
// 传输层抽象
// =========================================================

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::decode(e.to_string()))
    }
}

#[async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse>;
}

// =========================================================
// 实现层: 浏览器 fetch 客户端
// =========================================================

#[derive(Clone)]
pub struct FetchHttpClient;

#[async_trait(?Send)]
impl HttpClient for FetchHttpClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let (status, body) = crate::web::http::fetch(
            req.method.as_str(),
            &req.url,
            &req.headers,
            req.body.as_deref(),
        )
        .await
        .map_err(|e| ApiError::network(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

// =========================================================
// 类型化 API 客户端
// =========================================================

struct ClientInner<C> {
    base_url: String,
    http: C,
    session: Rc<SessionCore>,
}

pub struct ApiClient<C: HttpClient> {
    inner: Rc<ClientInner<C>>,
}

impl<C: HttpClient> Clone for ApiClient<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// 应用里实际使用的客户端类型
pub type Api = ApiClient<FetchHttpClient>;

/// 组件侧持有的客户端句柄
///
/// 客户端内部是 `Rc`，而视图闭包要求捕获物 `Send`；
/// 组件因此只持有本线程 arena 槽位的 Copy 句柄，
/// 在事件回调 / spawn_local 中 `get_value()` 取出克隆使用。
pub type ApiHandle = StoredValue<Api, LocalStorage>;

/// 把客户端放入 Context，返回组件可捕获的句柄
pub fn provide_api(api: Api) -> ApiHandle {
    let handle = StoredValue::new_local(api);
    provide_context(handle);
    handle
}

/// 从 Context 获取 API 客户端句柄
pub fn use_api() -> ApiHandle {
    expect_context::<ApiHandle>()
}

impl<C: HttpClient + 'static> ApiClient<C> {
    pub fn new(base_url: impl Into<String>, http: C, session: Rc<SessionCore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            inner: Rc::new(ClientInner {
                base_url,
                http,
                session,
            }),
        }
    }

    pub fn session(&self) -> &Rc<SessionCore> {
        &self.inner.session
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.inner.base_url, path)
        } else {
            format!("{}/{}", self.inner.base_url, path)
        }
    }

    /// 发送一个类型化请求
    pub async fn send<R: ApiRequest>(&self, request: &R) -> ApiResult<R::Response> {
        let body = if R::METHOD.has_body() {
            Some(
                serde_json::to_string(request)
                    .map_err(|e| ApiError::decode(e.to_string()))?,
            )
        } else {
            None
        };
        let url = self.url(&request.path());

        let mut retried = false;
        loop {
            let mut headers = Vec::new();
            if body.is_some() {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
            }
            if R::AUTHENTICATED {
                if let Some(token) = self.inner.session.access_token() {
                    headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
                }
            }

            let response = self
                .inner
                .http
                .send(HttpRequest {
                    url: url.clone(),
                    method: R::METHOD,
                    headers,
                    body: body.clone(),
                })
                .await?;

            if response.status == 401 && R::RETRY_ON_UNAUTHORIZED && !retried {
                retried = true;
                match self.refresh_access_token().await {
                    // 刷新成功：带新令牌重放原请求
                    Ok(_) => continue,
                    // 刷新失败：登出，向调用方传播原始错误
                    Err(_) => {
                        self.force_logout();
                        return Err(ApiError::from_response(response.status, &response.body));
                    }
                }
            }

            if !response.ok() {
                return Err(ApiError::from_response(response.status, &response.body));
            }

            return response.json::<R::Response>();
        }
    }

    /// 单飞令牌刷新
    ///
    /// 并发的 401 等待者共享同一个 in-flight future（而非布尔标志），
    /// 同一轮故障最多产生一次刷新调用。槽位由刷新 future 在解析时
    /// 自行清空；等待者恢复得再晚也不会误清下一轮刷新的在途槽位。
    pub async fn refresh_access_token(&self) -> ApiResult<String> {
        let shared = {
            let mut slot = self.inner.session.refresh_inflight.borrow_mut();
            match slot.as_ref() {
                Some(existing) => existing.clone(),
                None => {
                    let client = self.clone();
                    let fut: RefreshFuture = async move {
                        let result = client.perform_refresh().await;
                        client.inner.session.refresh_inflight.borrow_mut().take();
                        result
                    }
                    .boxed_local()
                    .shared();
                    *slot = Some(fut.clone());
                    fut
                }
            }
        };

        shared.await
    }

    async fn perform_refresh(&self) -> ApiResult<String> {
        let Some(refresh_token) = self.inner.session.refresh_token() else {
            return Err(ApiError::unauthenticated("no refresh token held"));
        };

        let auth: AuthResponse = self.send(&RefreshRequest { refresh_token }).await?;
        self.inner.session.install(&auth);
        self.inner
            .session
            .emit(&SessionEvent::TokenRefreshed {
                user: auth.user.clone(),
            });
        Ok(auth.access_token)
    }

    /// 强制登出：清空会话并广播。系统中唯一无需用户输入的纠正动作。
    pub fn force_logout(&self) {
        self.inner.session.clear();
        self.inner.session.emit(&SessionEvent::LoggedOut);
    }

    /// 应用启动时的静默会话恢复
    ///
    /// 保管库中存在刷新令牌时恰好尝试一次刷新；失败视为不可恢复，
    /// 清空残留状态。无刷新令牌时立即以匿名态完成。
    pub async fn restore_session(&self) -> bool {
        if self.inner.session.refresh_token().is_none() {
            return false;
        }
        match self.refresh_access_token().await {
            Ok(_) => true,
            Err(_) => {
                self.force_logout();
                false
            }
        }
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(test)]
pub struct MockHttpClient {
    /// URL -> 响应序列；只剩一条时重复返回
    responses: std::cell::RefCell<std::collections::HashMap<String, std::collections::VecDeque<(u16, String)>>>,
    /// 记录发出的请求
    pub requests: std::cell::RefCell<Vec<HttpRequest>>,
    /// 每次 send 先让出一次执行权，用于构造并发交错
    yield_once: std::cell::Cell<bool>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: Default::default(),
            requests: Default::default(),
            yield_once: std::cell::Cell::new(false),
        }
    }

    pub fn mock_response(&self, url: &str, status: u16, body: serde_json::Value) {
        self.responses
            .borrow_mut()
            .entry(url.to_string())
            .or_default()
            .push_back((status, body.to_string()));
    }

    pub fn interleaved(&self) {
        self.yield_once.set(true);
    }

    pub fn requests_to(&self, url_fragment: &str) -> Vec<HttpRequest> {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.url.contains(url_fragment))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        if self.yield_once.get() {
            YieldNow::default().await;
        }

        self.requests.borrow_mut().push(req.clone());

        let mut responses = self.responses.borrow_mut();
        match responses.get_mut(&req.url) {
            Some(queue) if !queue.is_empty() => {
                let (status, body) = if queue.len() > 1 {
                    queue.pop_front().unwrap()
                } else {
                    queue.front().cloned().unwrap()
                };
                Ok(HttpResponse { status, body })
            }
            _ => Ok(HttpResponse {
                status: 404,
                body: r#"{"message":"Not Found"}"#.to_string(),
            }),
        }
    }
}

/// 首次 poll 返回 Pending 并立即唤醒，强制一次调度交错
#[cfg(test)]
#[derive(Default)]
struct YieldNow {
    yielded: bool,
}

#[cfg(test)]
impl std::future::Future for YieldNow {
    type Output = ();

    fn poll(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<()> {
        if self.yielded {
            std::task::Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            std::task::Poll::Pending
        }
    }
}

// =========================================================
// 测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemoryVault, TokenVault};
    use learnhub_shared::protocol::{
        GetQuizQuestionsRequest, ListCoursesRequest, LoginRequest, LogoutRequest,
    };
    use serde_json::json;

    const BASE: &str = "http://api.test";

    fn auth_json(access: &str, refresh: Option<&str>) -> serde_json::Value {
        let mut body = json!({
            "accessToken": access,
            "user": {
                "id": "u1",
                "name": "Ada",
                "email": "a@b.com",
                "isAdmin": false,
                "isSubscribed": false
            }
        });
        if let Some(refresh) = refresh {
            body["refreshToken"] = json!(refresh);
        }
        body
    }

    fn client_with(vault: MemoryVault) -> ApiClient<MockHttpClient> {
        ApiClient::new(BASE, MockHttpClient::new(), SessionCore::new(Box::new(vault)))
    }

    fn mock(client: &ApiClient<MockHttpClient>) -> &MockHttpClient {
        &client.inner.http
    }

    fn bearer_of(req: &HttpRequest) -> Option<&str> {
        req.headers
            .iter()
            .find(|(k, _)| k == "Authorization")
            .map(|(_, v)| v.as_str())
    }

    // ---------------------------------------------------------
    // 基本请求装配
    // ---------------------------------------------------------

    #[tokio::test]
    async fn protected_requests_carry_bearer_after_login_install() {
        let client = client_with(MemoryVault::default());
        mock(&client).mock_response(
            &format!("{}/api/auth/login", BASE),
            200,
            auth_json("at-1", Some("rt-1")),
        );
        mock(&client).mock_response(&format!("{}/api/v1/courses", BASE), 200, json!([]));

        let auth = client
            .send(&LoginRequest {
                email: "a@b.com".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();
        client.session().install(&auth);
        assert!(client.session().is_authenticated());

        client.send(&ListCoursesRequest).await.unwrap();

        let reqs = mock(&client).requests.borrow();
        // 登录请求本身不带 Bearer
        assert_eq!(bearer_of(&reqs[0]), None);
        assert!(reqs[0].body.as_deref().unwrap().contains("a@b.com"));
        // 后续受保护请求携带新令牌
        assert_eq!(bearer_of(&reqs[1]), Some("Bearer at-1"));
        assert_eq!(client.session().refresh_token().as_deref(), Some("rt-1"));
    }

    #[tokio::test]
    async fn get_requests_have_no_body() {
        let client = client_with(MemoryVault::default());
        mock(&client).mock_response(&format!("{}/api/v1/courses", BASE), 200, json!([]));

        client.send(&ListCoursesRequest).await.unwrap();

        let reqs = mock(&client).requests.borrow();
        assert!(reqs[0].body.is_none());
        assert!(!reqs[0].headers.iter().any(|(k, _)| k == "Content-Type"));
    }

    // ---------------------------------------------------------
    // 401 -> 刷新 -> 重放
    // ---------------------------------------------------------

    #[tokio::test]
    async fn unauthorized_is_absorbed_by_refresh_and_retry() {
        let vault = MemoryVault::with_token("rt-old");
        let client = client_with(vault);
        client.session().set_access_token(Some("at-stale".to_string()));

        let courses_url = format!("{}/api/v1/courses", BASE);
        mock(&client).mock_response(&courses_url, 401, json!({"message": "jwt expired"}));
        mock(&client).mock_response(&courses_url, 200, json!([]));
        mock(&client).mock_response(
            &format!("{}/api/auth/refresh", BASE),
            200,
            auth_json("at-new", Some("rt-new")),
        );

        // 调用方只观察到最终成功
        let result = client.send(&ListCoursesRequest).await;
        assert!(result.is_ok());

        let refreshes = mock(&client).requests_to("/api/auth/refresh");
        assert_eq!(refreshes.len(), 1);
        // 刷新请求不带 Bearer，负载是保管库中的刷新令牌
        assert_eq!(bearer_of(&refreshes[0]), None);
        assert!(refreshes[0].body.as_deref().unwrap().contains("rt-old"));

        let replays = mock(&client).requests_to("/api/v1/courses");
        assert_eq!(replays.len(), 2);
        assert_eq!(bearer_of(&replays[0]), Some("Bearer at-stale"));
        assert_eq!(bearer_of(&replays[1]), Some("Bearer at-new"));

        // 凭据已轮换
        assert_eq!(client.session().access_token().as_deref(), Some("at-new"));
        assert_eq!(client.session().refresh_token().as_deref(), Some("rt-new"));
    }

    #[tokio::test]
    async fn refresh_failure_forces_logout_and_propagates_original_error() {
        let vault = MemoryVault::with_token("rt-dead");
        let client = client_with(vault.clone());
        client.session().set_access_token(Some("at-stale".to_string()));

        let courses_url = format!("{}/api/v1/courses", BASE);
        mock(&client).mock_response(&courses_url, 401, json!({"message": "jwt expired"}));
        mock(&client).mock_response(
            &format!("{}/api/auth/refresh", BASE),
            401,
            json!({"message": "refresh token revoked"}),
        );

        let err = client.send(&ListCoursesRequest).await.unwrap_err();
        // 原始错误，而非刷新错误
        assert_eq!(err.message, "jwt expired");
        assert_eq!(err.status, 401);

        // 会话已被清空
        assert!(client.session().access_token().is_none());
        assert!(vault.load().is_none());
    }

    #[tokio::test]
    async fn retried_request_hits_the_single_retry_ceiling() {
        let vault = MemoryVault::with_token("rt-ok");
        let client = client_with(vault);
        client.session().set_access_token(Some("at".to_string()));

        let courses_url = format!("{}/api/v1/courses", BASE);
        // 永远 401
        mock(&client).mock_response(&courses_url, 401, json!({"message": "nope"}));
        mock(&client).mock_response(
            &format!("{}/api/auth/refresh", BASE),
            200,
            auth_json("at-2", None),
        );

        let err = client.send(&ListCoursesRequest).await.unwrap_err();
        assert_eq!(err.status, 401);

        // 恰好一次刷新、两次原请求，无第二轮
        assert_eq!(mock(&client).requests_to("/api/auth/refresh").len(), 1);
        assert_eq!(mock(&client).requests_to("/api/v1/courses").len(), 2);
    }

    #[tokio::test]
    async fn logout_endpoint_never_triggers_refresh() {
        let vault = MemoryVault::with_token("rt");
        let client = client_with(vault);
        client.session().set_access_token(Some("at-stale".to_string()));

        mock(&client).mock_response(
            &format!("{}/api/auth/logout", BASE),
            401,
            json!({"message": "jwt expired"}),
        );

        let result = client
            .send(&LogoutRequest {
                refresh_token: "rt".to_string(),
            })
            .await;
        assert!(result.is_err());
        assert!(mock(&client).requests_to("/api/auth/refresh").is_empty());
    }

    // ---------------------------------------------------------
    // 单飞刷新（§ 并发契约的回归测试）
    // ---------------------------------------------------------

    #[tokio::test]
    async fn concurrent_unauthorized_responses_share_one_refresh() {
        let vault = MemoryVault::with_token("rt");
        let client = client_with(vault);
        client.session().set_access_token(Some("at-stale".to_string()));
        mock(&client).interleaved();

        let courses_url = format!("{}/api/v1/courses", BASE);
        let quiz_url = format!("{}/api/v1/quizzes/q1/questions", BASE);
        mock(&client).mock_response(&courses_url, 401, json!({"message": "jwt expired"}));
        mock(&client).mock_response(&courses_url, 200, json!([]));
        mock(&client).mock_response(&quiz_url, 401, json!({"message": "jwt expired"}));
        mock(&client).mock_response(&quiz_url, 200, json!({"questions": []}));
        mock(&client).mock_response(
            &format!("{}/api/auth/refresh", BASE),
            200,
            auth_json("at-new", None),
        );

        let questions = GetQuizQuestionsRequest {
            quiz_id: "q1".to_string(),
            admin: false,
        };
        let (a, b) = futures::join!(
            client.send(&ListCoursesRequest),
            client.send(&questions)
        );
        assert!(a.is_ok());
        assert!(b.is_ok());

        // 两个 401 等待者共享同一次刷新
        assert_eq!(mock(&client).requests_to("/api/auth/refresh").len(), 1);

        // 两条重放都携带新令牌
        for url in [&courses_url, &quiz_url] {
            let reqs = mock(&client).requests_to(url);
            assert_eq!(reqs.len(), 2);
            assert_eq!(bearer_of(&reqs[1]), Some("Bearer at-new"));
        }
    }

    #[tokio::test]
    async fn late_waiter_resuming_does_not_clobber_a_newer_refresh() {
        let vault = MemoryVault::with_token("rt");
        let client = client_with(vault);
        mock(&client).interleaved();

        let refresh_url = format!("{}/api/auth/refresh", BASE);
        mock(&client).mock_response(&refresh_url, 200, auth_json("at-1", None));
        mock(&client).mock_response(&refresh_url, 200, auth_json("at-2", None));

        // 第一轮开始并悬停在传输层；straggler 捕获了它的共享 future
        let mut straggler = Box::pin(client.refresh_access_token());
        assert!(futures::poll!(&mut straggler).is_pending());

        // 另一个等待者把第一轮推进到完成；straggler 已被唤醒但尚未恢复
        assert_eq!(client.refresh_access_token().await.unwrap(), "at-1");

        // straggler 恢复之前，新的 401 开启第二轮刷新
        let mut second = Box::pin(client.refresh_access_token());
        assert!(futures::poll!(&mut second).is_pending());

        // 晚恢复的等待者拿到第一轮的结果，且不触碰第二轮的槽位
        assert_eq!(straggler.await.unwrap(), "at-1");
        assert!(client.inner.session.refresh_inflight.borrow().is_some());

        // 新等待者共享第二轮，而不是开启并发的第三轮
        assert_eq!(client.refresh_access_token().await.unwrap(), "at-2");
        assert_eq!(second.await.unwrap(), "at-2");
        assert_eq!(mock(&client).requests_to("/api/auth/refresh").len(), 2);
    }

    // ---------------------------------------------------------
    // 登出与会话恢复
    // ---------------------------------------------------------

    #[tokio::test]
    async fn after_forced_logout_no_request_carries_the_old_token() {
        let vault = MemoryVault::with_token("rt");
        let client = client_with(vault.clone());
        client.session().set_access_token(Some("at-1".to_string()));

        mock(&client).mock_response(&format!("{}/api/v1/courses", BASE), 200, json!([]));

        client.send(&ListCoursesRequest).await.unwrap();
        client.force_logout();
        client.send(&ListCoursesRequest).await.unwrap();

        let reqs = mock(&client).requests_to("/api/v1/courses");
        assert_eq!(bearer_of(&reqs[0]), Some("Bearer at-1"));
        assert_eq!(bearer_of(&reqs[1]), None);
        assert!(vault.load().is_none());
    }

    #[tokio::test]
    async fn restore_session_without_refresh_token_is_immediate_and_silent() {
        let client = client_with(MemoryVault::default());
        assert!(!client.restore_session().await);
        assert!(mock(&client).requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn restore_session_refreshes_exactly_once() {
        let vault = MemoryVault::with_token("rt-kept");
        let client = client_with(vault);
        mock(&client).mock_response(
            &format!("{}/api/auth/refresh", BASE),
            200,
            auth_json("at-silent", None),
        );

        assert!(client.restore_session().await);
        assert_eq!(client.session().access_token().as_deref(), Some("at-silent"));
        assert_eq!(mock(&client).requests_to("/api/auth/refresh").len(), 1);
        // 未轮换时保留原刷新令牌
        assert_eq!(client.session().refresh_token().as_deref(), Some("rt-kept"));
    }

    #[tokio::test]
    async fn restore_session_clears_state_on_irrecoverable_refresh() {
        let vault = MemoryVault::with_token("rt-dead");
        let client = client_with(vault.clone());
        mock(&client).mock_response(
            &format!("{}/api/auth/refresh", BASE),
            401,
            json!({"message": "revoked"}),
        );

        assert!(!client.restore_session().await);
        assert!(client.session().access_token().is_none());
        assert!(vault.load().is_none());
    }

    #[tokio::test]
    async fn refresh_events_reach_the_listener() {
        use std::cell::RefCell;

        let vault = MemoryVault::with_token("rt");
        let client = client_with(vault);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        client.session().set_listener(move |event| {
            let tag = match event {
                SessionEvent::TokenRefreshed { user } => format!("refreshed:{}", user.email),
                SessionEvent::LoggedOut => "logged-out".to_string(),
            };
            seen_clone.borrow_mut().push(tag);
        });

        mock(&client).mock_response(
            &format!("{}/api/auth/refresh", BASE),
            200,
            auth_json("at", None),
        );
        client.restore_session().await;
        client.force_logout();

        assert_eq!(
            *seen.borrow(),
            vec!["refreshed:a@b.com".to_string(), "logged-out".to_string()]
        );
    }
}
