//! HTTP 请求封装模块
//!
//! 基于 `web_sys::fetch` 的轻量封装，只返回状态码与响应体文本，
//! 由上层的 `api` 模块负责 JSON 编解码与错误分类。

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

/// 传输层错误
#[derive(Debug)]
pub enum FetchError {
    /// 请求构建失败
    RequestBuildFailed(String),
    /// 网络请求失败
    NetworkError(String),
    /// 响应读取失败
    ResponseReadFailed(String),
}

impl core::fmt::Display for FetchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FetchError::RequestBuildFailed(msg) => write!(f, "请求构建失败: {}", msg),
            FetchError::NetworkError(msg) => write!(f, "网络错误: {}", msg),
            FetchError::ResponseReadFailed(msg) => write!(f, "响应读取失败: {}", msg),
        }
    }
}

/// 发送一次 fetch 请求，返回 (状态码, 响应体文本)。
pub async fn fetch(
    method: &str,
    url: &str,
    headers: &[(String, String)],
    body: Option<&str>,
) -> Result<(u16, String), FetchError> {
    let header_map = Headers::new()
        .map_err(|e| FetchError::RequestBuildFailed(format!("创建 Headers 失败: {:?}", e)))?;

    for (key, value) in headers {
        header_map
            .set(key, value)
            .map_err(|e| FetchError::RequestBuildFailed(format!("设置 Header 失败: {:?}", e)))?;
    }

    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_headers(&header_map.into());

    if let Some(body) = body {
        opts.set_body(&JsValue::from_str(body));
    }

    let request = Request::new_with_str_and_init(url, &opts)
        .map_err(|e| FetchError::RequestBuildFailed(format!("{:?}", e)))?;

    let window = web_sys::window()
        .ok_or_else(|| FetchError::NetworkError("无法获取 window 对象".to_string()))?;

    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| FetchError::NetworkError(format!("{:?}", e)))?;

    let response: Response = resp_value
        .dyn_into()
        .map_err(|e| FetchError::ResponseReadFailed(format!("Response 类型转换失败: {:?}", e)))?;

    let status = response.status();

    let text_promise = response
        .text()
        .map_err(|e| FetchError::ResponseReadFailed(format!("{:?}", e)))?;
    let text = JsFuture::from(text_promise)
        .await
        .map_err(|e| FetchError::ResponseReadFailed(format!("{:?}", e)))?;

    Ok((status, text.as_string().unwrap_or_default()))
}
