//! 内容播放页
//!
//! 按访问裁决渲染：可访问内容按类型播放，付费锁定引导订阅，
//! 匿名访问引导登录。裁决完全来自服务端响应（见 `content` 模块）。

use leptos::prelude::*;
use leptos::task::spawn_local;
use learnhub_shared::protocol::GetContentItemRequest;
use learnhub_shared::{ContentType, CourseContentItem};

use crate::api::use_api;
use crate::components::layout::{LoadingSpinner, Shell};
use crate::content::{ContentAccess, classify_access};
use crate::web::route::AppRoute;
use crate::web::router::use_router;

#[component]
pub fn ContentPlayerPage(course_id: String, content_id: String) -> impl IntoView {
    let router = use_router();
    let api = use_api();

    let (access, set_access) = signal(Option::<ContentAccess>::None);

    spawn_local({
        let course_id = course_id.clone();
        let content_id = content_id.clone();
        async move {
            let api = api.get_value();
            let result = api
                .send(&GetContentItemRequest {
                    course_id,
                    content_id,
                })
                .await;
            set_access.set(Some(classify_access(result)));
        }
    });

    let back_route = AppRoute::CourseDetail { course_id };

    view! {
        <Shell>
            <button
                class="btn btn-ghost btn-sm mb-4"
                on:click={
                    let back = back_route.clone();
                    move |_| router.navigate_route(back.clone())
                }
            >
                "← Back to course"
            </button>

            {move || match access.get() {
                None => view! { <LoadingSpinner /> }.into_any(),
                Some(ContentAccess::Available(item)) => view! { <ContentView item=item /> }.into_any(),
                Some(ContentAccess::RequiresLogin) => view! {
                    <div class="card bg-base-100 shadow-md">
                        <div class="card-body items-center text-center">
                            <h2 class="card-title">"Sign in to continue"</h2>
                            <p class="text-base-content/70">"This lesson requires an account."</p>
                            <button
                                class="btn btn-primary"
                                on:click=move |_| router.navigate_route(AppRoute::Login)
                            >
                                "Log in"
                            </button>
                        </div>
                    </div>
                }.into_any(),
                Some(ContentAccess::RequiresSubscription) => view! {
                    <div class="card bg-base-100 shadow-md">
                        <div class="card-body items-center text-center">
                            <h2 class="card-title">"Premium content"</h2>
                            <p class="text-base-content/70">
                                "Upgrade your plan to unlock this lesson."
                            </p>
                            <button
                                class="btn btn-warning"
                                on:click=move |_| router.navigate_route(AppRoute::Subscribe)
                            >
                                "View plans"
                            </button>
                        </div>
                    </div>
                }.into_any(),
                Some(ContentAccess::Failed(message)) => view! {
                    <div role="alert" class="alert alert-error">
                        <span>{message}</span>
                    </div>
                }.into_any(),
            }}
        </Shell>
    }
}

/// 按内容类型渲染播放器本体
#[component]
fn ContentView(item: CourseContentItem) -> impl IntoView {
    let router = use_router();
    let title = item.title.clone();

    let body = match item.content_type {
        ContentType::Video => view! {
            <video controls class="w-full rounded-lg" src=item.content_url.clone()></video>
        }
        .into_any(),
        ContentType::Pdf => view! {
            <iframe
                src=item.content_url.clone()
                class="w-full h-[75vh] rounded-lg border border-base-300"
                title=item.title.clone()
            ></iframe>
        }
        .into_any(),
        // 测验单元的 content_url 即测验 id
        ContentType::Quiz => {
            let quiz_route = AppRoute::QuizStart {
                quiz_id: item.content_url.clone(),
            };
            view! {
                <div class="card bg-base-100 shadow-md">
                    <div class="card-body items-center text-center">
                        <p class="text-base-content/70">"This lesson is a timed quiz."</p>
                        <button
                            class="btn btn-primary"
                            on:click=move |_| router.navigate_route(quiz_route.clone())
                        >
                            "Start quiz"
                        </button>
                    </div>
                </div>
            }
            .into_any()
        }
    };

    view! {
        <h1 class="text-2xl font-bold mb-4">{title}</h1>
        {body}
    }
}
