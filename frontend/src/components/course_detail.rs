//! 课程详情页：课程信息 + 内容单元列表
//!
//! 列表中的锁定标记只是提示，点击任何单元都会进入播放页，
//! 由播放页根据服务端裁决引导登录或订阅。

use leptos::prelude::*;
use leptos::task::spawn_local;
use learnhub_shared::protocol::{
    GetCourseRequest, ListCourseContentRequest, ListCourseQuizzesRequest,
};
use learnhub_shared::{ContentType, Course, CourseContentItem, Quiz};

use crate::api::use_api;
use crate::components::layout::{ErrorAlert, LoadingSpinner, Shell};
use crate::web::route::AppRoute;
use crate::web::router::use_router;

fn content_type_label(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Video => "Video",
        ContentType::Pdf => "PDF",
        ContentType::Quiz => "Quiz",
    }
}

#[component]
pub fn CourseDetailPage(course_id: String) -> impl IntoView {
    let router = use_router();
    let api = use_api();

    let (course, set_course) = signal(Option::<Course>::None);
    let (items, set_items) = signal(Vec::<CourseContentItem>::new());
    let (quizzes, set_quizzes) = signal(Vec::<Quiz>::new());
    let (loading, set_loading) = signal(true);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    spawn_local({
        let course_id = course_id.clone();
        async move {
            let api = api.get_value();
            let course_result = api
                .send(&GetCourseRequest {
                    course_id: course_id.clone(),
                })
                .await;
            match course_result {
                Ok(data) => set_course.set(Some(data)),
                Err(e) => {
                    set_error_msg.set(Some(format!("Failed to load course: {}", e)));
                    set_loading.set(false);
                    return;
                }
            }
            // 内容列表匿名可见，可访问性由服务端按会话标注
            let content_result = api
                .send(&ListCourseContentRequest {
                    course_id: course_id.clone(),
                })
                .await;
            match content_result {
                Ok(data) => set_items.set(data),
                Err(e) => set_error_msg.set(Some(format!("Failed to load content: {}", e))),
            }
            // 挂在本课程下的测验
            match api.send(&ListCourseQuizzesRequest { course_id }).await {
                Ok(data) => set_quizzes.set(data),
                Err(e) => set_error_msg.set(Some(format!("Failed to load quizzes: {}", e))),
            }
            set_loading.set(false);
        }
    });

    view! {
        <Shell>
            <Show when=move || error_msg.get().is_some()>
                <ErrorAlert message=error_msg.get().unwrap_or_default() />
            </Show>

            <Show when=move || !loading.get() fallback=|| view! { <LoadingSpinner /> }>
                {move || course.get().map(|c| view! {
                    <div class="mb-6">
                        <div class="flex items-center gap-3">
                            <h1 class="text-3xl font-bold">{c.title.clone()}</h1>
                            <Show when={
                                let premium = c.is_premium;
                                move || premium
                            }>
                                <span class="badge badge-warning">"Premium"</span>
                            </Show>
                        </div>
                        <p class="text-base-content/70 mt-2">{c.description.clone()}</p>
                    </div>
                })}

                <div class="card bg-base-100 shadow-md">
                    <div class="card-body p-0">
                        <ul class="menu w-full p-2">
                            <For
                                each=move || items.get()
                                key=|item| item.id.clone()
                                children=move |item: CourseContentItem| {
                                    let route = AppRoute::ContentPlayer {
                                        course_id: item.course_id.clone(),
                                        content_id: item.id.clone(),
                                    };
                                    let locked = !item.is_accessible;
                                    view! {
                                        <li>
                                            <button
                                                class="flex justify-between items-center"
                                                on:click=move |_| router.navigate_route(route.clone())
                                            >
                                                <span class="flex items-center gap-2">
                                                    <span class="badge badge-outline badge-sm">
                                                        {content_type_label(item.content_type)}
                                                    </span>
                                                    {item.title.clone()}
                                                </span>
                                                <span class="flex items-center gap-2">
                                                    <Show when={
                                                        let is_free = item.is_free;
                                                        move || is_free
                                                    }>
                                                        <span class="badge badge-success badge-sm">"Free"</span>
                                                    </Show>
                                                    <Show when=move || locked>
                                                        <span class="text-base-content/50">"🔒"</span>
                                                    </Show>
                                                </span>
                                            </button>
                                        </li>
                                    }
                                }
                            />
                        </ul>
                        <Show when=move || items.with(|i| i.is_empty())>
                            <p class="p-6 text-base-content/70">"This course has no content yet."</p>
                        </Show>
                    </div>
                </div>

                <Show when=move || !quizzes.with(|q| q.is_empty())>
                    <div class="card bg-base-100 shadow-md mt-6">
                        <div class="card-body p-0">
                            <h2 class="card-title px-6 pt-4">"Quizzes"</h2>
                            <ul class="menu w-full p-2">
                                <For
                                    each=move || quizzes.get()
                                    key=|quiz| quiz.id.clone()
                                    children=move |quiz: Quiz| {
                                        let route = AppRoute::QuizStart {
                                            quiz_id: quiz.id.clone(),
                                        };
                                        view! {
                                            <li>
                                                <button
                                                    class="flex justify-between items-center"
                                                    on:click=move |_| router.navigate_route(route.clone())
                                                >
                                                    <span>{quiz.title.clone()}</span>
                                                    <span class="flex items-center gap-2">
                                                        {quiz.time_limit_minutes.map(|m| view! {
                                                            <span class="badge badge-ghost badge-sm">
                                                                {format!("{} min", m)}
                                                            </span>
                                                        })}
                                                        <Show when={
                                                            let premium = quiz.is_premium;
                                                            move || premium
                                                        }>
                                                            <span class="badge badge-warning badge-sm">"Premium"</span>
                                                        </Show>
                                                    </span>
                                                </button>
                                            </li>
                                        }
                                    }
                                />
                            </ul>
                        </div>
                    </div>
                </Show>
            </Show>
        </Shell>
    }
}
