//! 课程目录页（首页）

use leptos::prelude::*;
use leptos::task::spawn_local;
use learnhub_shared::Course;
use learnhub_shared::protocol::ListCoursesRequest;

use crate::api::use_api;
use crate::components::layout::{ErrorAlert, LoadingSpinner, Shell};
use crate::web::route::AppRoute;
use crate::web::router::use_router;

/// 课程目录对所有访客开放，无需认证
#[component]
pub fn HomePage() -> impl IntoView {
    let router = use_router();
    let api = use_api();

    let (courses, set_courses) = signal(Vec::<Course>::new());
    let (loading, set_loading) = signal(true);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    // 初始加载
    spawn_local(async move {
        let api = api.get_value();
        match api.send(&ListCoursesRequest).await {
            Ok(data) => set_courses.set(data),
            Err(e) => set_error_msg.set(Some(format!("Failed to load courses: {}", e))),
        }
        set_loading.set(false);
    });

    view! {
        <Shell>
            <h1 class="text-3xl font-bold mb-6">"Course Library"</h1>

            <Show when=move || error_msg.get().is_some()>
                <ErrorAlert message=error_msg.get().unwrap_or_default() />
            </Show>

            <Show when=move || !loading.get() fallback=|| view! { <LoadingSpinner /> }>
                <Show
                    when=move || !courses.with(|c| c.is_empty())
                    fallback=|| view! {
                        <p class="text-base-content/70">"No courses published yet. Check back soon."</p>
                    }
                >
                    <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-4">
                        <For
                            each=move || courses.get()
                            key=|course| course.id.clone()
                            children=move |course: Course| {
                                let route = AppRoute::CourseDetail {
                                    course_id: course.id.clone(),
                                };
                                view! {
                                    <div
                                        class="card bg-base-100 shadow-md hover:shadow-xl transition-shadow cursor-pointer"
                                        on:click=move |_| router.navigate_route(route.clone())
                                    >
                                        <div class="card-body">
                                            <div class="flex items-start justify-between">
                                                <h2 class="card-title">{course.title.clone()}</h2>
                                                <Show when={
                                                    let premium = course.is_premium;
                                                    move || premium
                                                }>
                                                    <span class="badge badge-warning">"Premium"</span>
                                                </Show>
                                            </div>
                                            <p class="text-sm text-base-content/70 line-clamp-3">
                                                {course.description.clone()}
                                            </p>
                                            <div class="card-actions justify-between items-center mt-2">
                                                <span class="badge badge-ghost">{course.category.clone()}</span>
                                            </div>
                                        </div>
                                    </div>
                                }
                            }
                        />
                    </div>
                </Show>
            </Show>
        </Shell>
    }
}
