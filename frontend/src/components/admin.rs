//! 管理端页面：内容后台
//!
//! 进入这些页面已由路由守卫保证管理员身份，组件内不再查会话。
//! 表单校验在 `admin` 模块，这里只负责绑定输入与调用接口。

use leptos::prelude::*;
use leptos::task::spawn_local;
use learnhub_shared::protocol::{
    AddQuestionRequest, CreateCourseRequest, CreateQuizRequest, DeleteCourseRequest,
    DeleteQuestionRequest, DeleteQuizRequest, GetCourseRequest, GetQuizQuestionsRequest,
    ListCoursesRequest, ListQuizzesRequest,
};
use learnhub_shared::{ContentType, Course, Question, Quiz};

use crate::admin::{CourseForm, QuestionForm, QuizForm};
use crate::api::use_api;
use crate::components::layout::{ErrorAlert, LoadingSpinner, Shell};
use crate::web::route::AppRoute;
use crate::web::router::use_router;

// =========================================================
// 后台首页
// =========================================================

/// 课程与测验两栏总览，就地创建与删除
#[component]
pub fn AdminDashboardPage() -> impl IntoView {
    let router = use_router();
    let api = use_api();

    let (courses, set_courses) = signal(Vec::<Course>::new());
    let (quizzes, set_quizzes) = signal(Vec::<Quiz>::new());
    let (loading, set_loading) = signal(true);
    let (notice, set_notice) = signal(Option::<(String, bool)>::None); // 消息, 是否出错

    let reload = {
        move || {
            spawn_local(async move {
                let api = api.get_value();
                match api.send(&ListCoursesRequest).await {
                    Ok(data) => set_courses.set(data),
                    Err(e) => set_notice.set(Some((format!("Failed to load courses: {}", e), true))),
                }
                match api.send(&ListQuizzesRequest).await {
                    Ok(data) => set_quizzes.set(data),
                    Err(e) => set_notice.set(Some((format!("Failed to load quizzes: {}", e), true))),
                }
                set_loading.set(false);
            });
        }
    };
    reload();

    let delete_course = {
        move |course_id: String| {
            spawn_local(async move {
                let api = api.get_value();
                match api.send(&DeleteCourseRequest { course_id: course_id.clone() }).await {
                    Ok(_) => {
                        set_notice.set(Some(("Course deleted".to_string(), false)));
                        set_courses.update(|list| list.retain(|c| c.id != course_id));
                    }
                    Err(e) => set_notice.set(Some((format!("Delete failed: {}", e), true))),
                }
            });
        }
    };

    let delete_quiz = {
        move |quiz_id: String| {
            spawn_local(async move {
                let api = api.get_value();
                match api.send(&DeleteQuizRequest { quiz_id: quiz_id.clone() }).await {
                    Ok(_) => {
                        set_notice.set(Some(("Quiz deleted".to_string(), false)));
                        set_quizzes.update(|list| list.retain(|q| q.id != quiz_id));
                    }
                    Err(e) => set_notice.set(Some((format!("Delete failed: {}", e), true))),
                }
            });
        }
    };

    view! {
        <Shell>
            <h1 class="text-3xl font-bold mb-6">"Admin"</h1>

            <Show when=move || notice.get().is_some()>
                <div class=move || {
                    let is_err = notice.get().map(|(_, e)| e).unwrap_or(false);
                    if is_err { "alert alert-error mb-4" } else { "alert alert-success mb-4" }
                }>
                    <span>{move || notice.get().map(|(m, _)| m).unwrap_or_default()}</span>
                </div>
            </Show>

            <Show when=move || !loading.get() fallback=|| view! { <LoadingSpinner /> }>
                <div class="grid grid-cols-1 lg:grid-cols-2 gap-6">
                    <div class="card bg-base-100 shadow-md">
                        <div class="card-body">
                            <h2 class="card-title">"Courses"</h2>
                            <CourseCreateForm on_created={
                                let reload = reload.clone();
                                move |_| reload()
                            } />
                            <ul class="divide-y divide-base-200">
                                <For
                                    each=move || courses.get()
                                    key=|course| course.id.clone()
                                    children={
                                        let delete_course = delete_course.clone();
                                        move |course: Course| {
                                            let manage_route = AppRoute::AdminCourseManage {
                                                course_id: course.id.clone(),
                                            };
                                            let course_id = course.id.clone();
                                            let delete_course = delete_course.clone();
                                            view! {
                                                <li class="py-2 flex items-center justify-between">
                                                    <span>{course.title.clone()}</span>
                                                    <span class="flex gap-2">
                                                        <button
                                                            class="btn btn-ghost btn-xs"
                                                            on:click=move |_| router.navigate_route(manage_route.clone())
                                                        >
                                                            "Manage"
                                                        </button>
                                                        <button
                                                            class="btn btn-error btn-xs btn-outline"
                                                            on:click=move |_| delete_course(course_id.clone())
                                                        >
                                                            "Delete"
                                                        </button>
                                                    </span>
                                                </li>
                                            }
                                        }
                                    }
                                />
                            </ul>
                        </div>
                    </div>

                    <div class="card bg-base-100 shadow-md">
                        <div class="card-body">
                            <h2 class="card-title">"Quizzes"</h2>
                            <QuizCreateForm on_created={
                                let reload = reload.clone();
                                move |_| reload()
                            } />
                            <ul class="divide-y divide-base-200">
                                <For
                                    each=move || quizzes.get()
                                    key=|quiz| quiz.id.clone()
                                    children={
                                        let delete_quiz = delete_quiz.clone();
                                        move |quiz: Quiz| {
                                            let edit_route = AppRoute::AdminQuizEditor {
                                                quiz_id: quiz.id.clone(),
                                            };
                                            let quiz_id = quiz.id.clone();
                                            let delete_quiz = delete_quiz.clone();
                                            view! {
                                                <li class="py-2 flex items-center justify-between">
                                                    <span>{quiz.title.clone()}</span>
                                                    <span class="flex gap-2">
                                                        <button
                                                            class="btn btn-ghost btn-xs"
                                                            on:click=move |_| router.navigate_route(edit_route.clone())
                                                        >
                                                            "Edit"
                                                        </button>
                                                        <button
                                                            class="btn btn-error btn-xs btn-outline"
                                                            on:click=move |_| delete_quiz(quiz_id.clone())
                                                        >
                                                            "Delete"
                                                        </button>
                                                    </span>
                                                </li>
                                            }
                                        }
                                    }
                                />
                            </ul>
                        </div>
                    </div>
                </div>
            </Show>
        </Shell>
    }
}

/// 新建课程的内联表单
#[component]
fn CourseCreateForm(on_created: impl Fn(()) + Clone + 'static) -> impl IntoView {
    let api = use_api();

    let (title, set_title) = signal(String::new());
    let (category, set_category) = signal(String::new());
    let (is_premium, set_is_premium) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let form = CourseForm {
            title: title.get_untracked(),
            description: String::new(),
            category: category.get_untracked(),
            is_premium: is_premium.get_untracked(),
        };
        let request: CreateCourseRequest = match form.into_create_request() {
            Ok(r) => r,
            Err(message) => {
                set_error_msg.set(Some(message));
                return;
            }
        };

        let on_created = on_created.clone();
        spawn_local(async move {
            let api = api.get_value();
            match api.send(&request).await {
                Ok(_) => {
                    set_title.set(String::new());
                    set_category.set(String::new());
                    set_error_msg.set(None);
                    on_created(());
                }
                Err(e) => set_error_msg.set(Some(format!("Create failed: {}", e))),
            }
        });
    };

    view! {
        <form class="flex flex-wrap items-end gap-2 mb-4" on:submit=on_submit>
            <input
                type="text"
                placeholder="New course title"
                class="input input-bordered input-sm flex-1"
                on:input=move |ev| set_title.set(event_target_value(&ev))
                prop:value=title
            />
            <input
                type="text"
                placeholder="Category"
                class="input input-bordered input-sm w-28"
                on:input=move |ev| set_category.set(event_target_value(&ev))
                prop:value=category
            />
            <label class="label cursor-pointer gap-1">
                <span class="label-text text-xs">"Premium"</span>
                <input
                    type="checkbox"
                    class="checkbox checkbox-sm"
                    on:change=move |ev| set_is_premium.set(event_target_checked(&ev))
                    prop:checked=is_premium
                />
            </label>
            <button class="btn btn-primary btn-sm">"Add"</button>
            <Show when=move || error_msg.get().is_some()>
                <p class="text-error text-xs w-full">{move || error_msg.get().unwrap_or_default()}</p>
            </Show>
        </form>
    }
}

/// 新建测验的内联表单
#[component]
fn QuizCreateForm(on_created: impl Fn(()) + Clone + 'static) -> impl IntoView {
    let api = use_api();

    let (title, set_title) = signal(String::new());
    let (minutes, set_minutes) = signal("10".to_string());
    let (is_premium, set_is_premium) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let form = QuizForm {
            title: title.get_untracked(),
            category: String::new(),
            course_id: String::new(),
            is_premium: is_premium.get_untracked(),
            time_limit_minutes: minutes.get_untracked(),
            total_marks: "0".to_string(),
        };
        let request: CreateQuizRequest = match form.into_create_request() {
            Ok(r) => r,
            Err(message) => {
                set_error_msg.set(Some(message));
                return;
            }
        };

        let on_created = on_created.clone();
        spawn_local(async move {
            let api = api.get_value();
            match api.send(&request).await {
                Ok(_) => {
                    set_title.set(String::new());
                    set_error_msg.set(None);
                    on_created(());
                }
                Err(e) => set_error_msg.set(Some(format!("Create failed: {}", e))),
            }
        });
    };

    view! {
        <form class="flex flex-wrap items-end gap-2 mb-4" on:submit=on_submit>
            <input
                type="text"
                placeholder="New quiz title"
                class="input input-bordered input-sm flex-1"
                on:input=move |ev| set_title.set(event_target_value(&ev))
                prop:value=title
            />
            <input
                type="number"
                placeholder="Minutes"
                class="input input-bordered input-sm w-24"
                on:input=move |ev| set_minutes.set(event_target_value(&ev))
                prop:value=minutes
            />
            <label class="label cursor-pointer gap-1">
                <span class="label-text text-xs">"Premium"</span>
                <input
                    type="checkbox"
                    class="checkbox checkbox-sm"
                    on:change=move |ev| set_is_premium.set(event_target_checked(&ev))
                    prop:checked=is_premium
                />
            </label>
            <button class="btn btn-primary btn-sm">"Add"</button>
            <Show when=move || error_msg.get().is_some()>
                <p class="text-error text-xs w-full">{move || error_msg.get().unwrap_or_default()}</p>
            </Show>
        </form>
    }
}

// =========================================================
// 课程管理页
// =========================================================

/// 课程资料编辑 + 内容单元增删
#[component]
pub fn AdminCourseManagePage(course_id: String) -> impl IntoView {
    let api = use_api();

    let (course, set_course) = signal(Option::<Course>::None);
    let (items, set_items) = signal(Vec::<learnhub_shared::CourseContentItem>::new());
    let (loading, set_loading) = signal(true);
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);

    let reload = {
        let course_id = course_id.clone();
        move || {
            let course_id = course_id.clone();
            spawn_local(async move {
                let api = api.get_value();
                match api.send(&GetCourseRequest { course_id: course_id.clone() }).await {
                    Ok(data) => set_course.set(Some(data)),
                    Err(e) => set_notice.set(Some((format!("Failed to load course: {}", e), true))),
                }
                match api
                    .send(&learnhub_shared::protocol::ListCourseContentRequest { course_id })
                    .await
                {
                    Ok(data) => set_items.set(data),
                    Err(e) => set_notice.set(Some((format!("Failed to load content: {}", e), true))),
                }
                set_loading.set(false);
            });
        }
    };
    reload();

    let delete_item = {
        let course_id = course_id.clone();
        move |content_id: String| {
            let course_id = course_id.clone();
            spawn_local(async move {
                let api = api.get_value();
                let request = learnhub_shared::protocol::DeleteContentItemRequest {
                    course_id,
                    content_id: content_id.clone(),
                };
                match api.send(&request).await {
                    Ok(_) => set_items.update(|list| list.retain(|i| i.id != content_id)),
                    Err(e) => set_notice.set(Some((format!("Delete failed: {}", e), true))),
                }
            });
        }
    };

    let edit_course_id = course_id.clone();
    let form_course_id = course_id.clone();

    view! {
        <Shell>
            <h1 class="text-3xl font-bold mb-6">"Manage course"</h1>

            <Show when=move || notice.get().is_some()>
                <div class=move || {
                    let is_err = notice.get().map(|(_, e)| e).unwrap_or(false);
                    if is_err { "alert alert-error mb-4" } else { "alert alert-success mb-4" }
                }>
                    <span>{move || notice.get().map(|(m, _)| m).unwrap_or_default()}</span>
                </div>
            </Show>

            <Show when=move || !loading.get() fallback=|| view! { <LoadingSpinner /> }>
                {
                    let edit_course_id = edit_course_id.clone();
                    move || course.get().map(|c| view! {
                        <CourseEditForm
                            course_id=edit_course_id.clone()
                            course=c
                            on_saved=move |updated| set_course.set(Some(updated))
                        />
                    })
                }

                <div class="card bg-base-100 shadow-md mt-6">
                    <div class="card-body">
                        <h2 class="card-title">"Content"</h2>
                        <ContentAddForm course_id=form_course_id.clone() on_added={
                            let reload = reload.clone();
                            move |_| reload()
                        } />
                        <ul class="divide-y divide-base-200">
                            <For
                                each=move || items.get()
                                key=|item| item.id.clone()
                                children={
                                    let delete_item = delete_item.clone();
                                    move |item: learnhub_shared::CourseContentItem| {
                                        let item_id = item.id.clone();
                                        let delete_item = delete_item.clone();
                                        let type_label = match item.content_type {
                                            ContentType::Video => "Video",
                                            ContentType::Pdf => "PDF",
                                            ContentType::Quiz => "Quiz",
                                        };
                                        view! {
                                            <li class="py-2 flex items-center justify-between">
                                                <span class="flex items-center gap-2">
                                                    <span class="badge badge-outline badge-sm">{type_label}</span>
                                                    {item.title.clone()}
                                                    <Show when={
                                                        let is_free = item.is_free;
                                                        move || is_free
                                                    }>
                                                        <span class="badge badge-success badge-sm">"Free"</span>
                                                    </Show>
                                                </span>
                                                <button
                                                    class="btn btn-error btn-xs btn-outline"
                                                    on:click=move |_| delete_item(item_id.clone())
                                                >
                                                    "Delete"
                                                </button>
                                            </li>
                                        }
                                    }
                                }
                            />
                        </ul>
                    </div>
                </div>
            </Show>
        </Shell>
    }
}

/// 课程资料表单（标题 / 描述 / 分类 / 付费标记）
#[component]
fn CourseEditForm(
    course_id: String,
    course: Course,
    on_saved: impl Fn(Course) + Clone + 'static,
) -> impl IntoView {
    let api = use_api();

    let initial = CourseForm::from_course(&course);
    let (title, set_title) = signal(initial.title);
    let (description, set_description) = signal(initial.description);
    let (category, set_category) = signal(initial.category);
    let (is_premium, set_is_premium) = signal(initial.is_premium);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let (saving, set_saving) = signal(false);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let form = CourseForm {
            title: title.get_untracked(),
            description: description.get_untracked(),
            category: category.get_untracked(),
            is_premium: is_premium.get_untracked(),
        };
        let request = match form.into_update_request(course_id.clone()) {
            Ok(r) => r,
            Err(message) => {
                set_error_msg.set(Some(message));
                return;
            }
        };

        set_saving.set(true);
        let on_saved = on_saved.clone();
        spawn_local(async move {
            let api = api.get_value();
            match api.send(&request).await {
                Ok(updated) => {
                    set_error_msg.set(None);
                    on_saved(updated);
                }
                Err(e) => set_error_msg.set(Some(format!("Save failed: {}", e))),
            }
            set_saving.set(false);
        });
    };

    view! {
        <div class="card bg-base-100 shadow-md">
            <form class="card-body" on:submit=on_submit>
                <h2 class="card-title">"Details"</h2>
                <Show when=move || error_msg.get().is_some()>
                    <p class="text-error text-sm">{move || error_msg.get().unwrap_or_default()}</p>
                </Show>
                <input
                    type="text"
                    class="input input-bordered"
                    on:input=move |ev| set_title.set(event_target_value(&ev))
                    prop:value=title
                />
                <textarea
                    class="textarea textarea-bordered"
                    placeholder="Description"
                    on:input=move |ev| set_description.set(event_target_value(&ev))
                    prop:value=description
                ></textarea>
                <div class="flex items-center gap-4">
                    <input
                        type="text"
                        placeholder="Category"
                        class="input input-bordered input-sm"
                        on:input=move |ev| set_category.set(event_target_value(&ev))
                        prop:value=category
                    />
                    <label class="label cursor-pointer gap-2">
                        <span class="label-text">"Premium"</span>
                        <input
                            type="checkbox"
                            class="checkbox"
                            on:change=move |ev| set_is_premium.set(event_target_checked(&ev))
                            prop:checked=is_premium
                        />
                    </label>
                    <button class="btn btn-primary btn-sm" disabled=move || saving.get()>
                        "Save"
                    </button>
                </div>
            </form>
        </div>
    }
}

/// 新增内容单元表单
#[component]
fn ContentAddForm(course_id: String, on_added: impl Fn(()) + Clone + 'static) -> impl IntoView {
    let api = use_api();

    let (title, set_title) = signal(String::new());
    let (content_type, set_content_type) = signal("video".to_string());
    let (url, set_url) = signal(String::new());
    let (is_free, set_is_free) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let parsed_type = match content_type.get_untracked().as_str() {
            "pdf" => ContentType::Pdf,
            "quiz" => ContentType::Quiz,
            _ => ContentType::Video,
        };
        let form = crate::admin::ContentForm {
            title: title.get_untracked(),
            content_type: parsed_type,
            content_url: url.get_untracked(),
            is_free: is_free.get_untracked(),
        };
        let request = match form.into_request(course_id.clone()) {
            Ok(r) => r,
            Err(message) => {
                set_error_msg.set(Some(message));
                return;
            }
        };

        let on_added = on_added.clone();
        spawn_local(async move {
            let api = api.get_value();
            match api.send(&request).await {
                Ok(_) => {
                    set_title.set(String::new());
                    set_url.set(String::new());
                    set_error_msg.set(None);
                    on_added(());
                }
                Err(e) => set_error_msg.set(Some(format!("Create failed: {}", e))),
            }
        });
    };

    view! {
        <form class="flex flex-wrap items-end gap-2 mb-4" on:submit=on_submit>
            <input
                type="text"
                placeholder="Title"
                class="input input-bordered input-sm flex-1"
                on:input=move |ev| set_title.set(event_target_value(&ev))
                prop:value=title
            />
            <select
                class="select select-bordered select-sm"
                on:change=move |ev| set_content_type.set(event_target_value(&ev))
                prop:value=content_type
            >
                <option value="video">"Video"</option>
                <option value="pdf">"PDF"</option>
                <option value="quiz">"Quiz"</option>
            </select>
            <input
                type="text"
                placeholder="URL or quiz id"
                class="input input-bordered input-sm flex-1"
                on:input=move |ev| set_url.set(event_target_value(&ev))
                prop:value=url
            />
            <label class="label cursor-pointer gap-1">
                <span class="label-text text-xs">"Free"</span>
                <input
                    type="checkbox"
                    class="checkbox checkbox-sm"
                    on:change=move |ev| set_is_free.set(event_target_checked(&ev))
                    prop:checked=is_free
                />
            </label>
            <button class="btn btn-primary btn-sm">"Add"</button>
            <Show when=move || error_msg.get().is_some()>
                <p class="text-error text-xs w-full">{move || error_msg.get().unwrap_or_default()}</p>
            </Show>
        </form>
    }
}

// =========================================================
// 测验编辑页
// =========================================================

/// 测验编辑：测验资料表单 + 题库增删。
/// 题目以管理身份拉取（含正确答案）。
#[component]
pub fn AdminQuizEditorPage(quiz_id: String) -> impl IntoView {
    let api = use_api();

    let (quiz, set_quiz) = signal(Option::<Quiz>::None);
    let (quiz_title, set_quiz_title) = signal(String::new());
    let (questions, set_questions) = signal(Vec::<Question>::new());
    let (loading, set_loading) = signal(true);
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);

    let reload = {
        let quiz_id = quiz_id.clone();
        move || {
            let quiz_id = quiz_id.clone();
            spawn_local(async move {
                let api = api.get_value();
                // 没有单个测验的读取端点，从列表中取出本条
                match api.send(&ListQuizzesRequest).await {
                    Ok(list) => set_quiz.set(list.into_iter().find(|q| q.id == quiz_id)),
                    Err(e) => set_notice.set(Some((format!("Failed to load quiz: {}", e), true))),
                }
                let result = api
                    .send(&GetQuizQuestionsRequest {
                        quiz_id,
                        admin: true,
                    })
                    .await;
                match result {
                    Ok(data) => {
                        if let Some(t) = data.quiz_title {
                            set_quiz_title.set(t);
                        }
                        set_questions.set(data.questions);
                    }
                    Err(e) => set_notice.set(Some((format!("Failed to load questions: {}", e), true))),
                }
                set_loading.set(false);
            });
        }
    };
    reload();

    let delete_question = {
        let quiz_id = quiz_id.clone();
        move |question_id: String| {
            let quiz_id = quiz_id.clone();
            spawn_local(async move {
                let api = api.get_value();
                let request = DeleteQuestionRequest {
                    quiz_id,
                    question_id: question_id.clone(),
                };
                match api.send(&request).await {
                    Ok(_) => set_questions.update(|list| list.retain(|q| q.id != question_id)),
                    Err(e) => set_notice.set(Some((format!("Delete failed: {}", e), true))),
                }
            });
        }
    };

    let form_quiz_id = quiz_id.clone();
    let edit_quiz_id = quiz_id.clone();

    view! {
        <Shell>
            <h1 class="text-3xl font-bold mb-2">"Edit quiz"</h1>
            <p class="text-base-content/70 mb-6">{move || quiz_title.get()}</p>

            <Show when=move || notice.get().is_some()>
                <div class=move || {
                    let is_err = notice.get().map(|(_, e)| e).unwrap_or(false);
                    if is_err { "alert alert-error mb-4" } else { "alert alert-success mb-4" }
                }>
                    <span>{move || notice.get().map(|(m, _)| m).unwrap_or_default()}</span>
                </div>
            </Show>

            <Show when=move || !loading.get() fallback=|| view! { <LoadingSpinner /> }>
                {
                    let edit_quiz_id = edit_quiz_id.clone();
                    move || quiz.get().map(|q| view! {
                        <QuizEditForm
                            quiz_id=edit_quiz_id.clone()
                            quiz=q
                            on_saved=move |updated: Quiz| {
                                set_quiz_title.set(updated.title.clone());
                                set_quiz.set(Some(updated));
                            }
                        />
                    })
                }

                <QuestionAddForm quiz_id=form_quiz_id.clone() on_added={
                    let reload = reload.clone();
                    move |_| reload()
                } />

                <div class="space-y-3 mt-4">
                    <For
                        each=move || questions.get()
                        key=|question| question.id.clone()
                        children={
                            let delete_question = delete_question.clone();
                            move |question: Question| {
                                let question_id = question.id.clone();
                                let delete_question = delete_question.clone();
                                let correct = question.correct_answer.clone().unwrap_or_default();
                                view! {
                                    <div class="card bg-base-100 shadow-md">
                                        <div class="card-body py-4">
                                            <div class="flex items-start justify-between">
                                                <h3 class="font-semibold">{question.text.clone()}</h3>
                                                <button
                                                    class="btn btn-error btn-xs btn-outline"
                                                    on:click=move |_| delete_question(question_id.clone())
                                                >
                                                    "Delete"
                                                </button>
                                            </div>
                                            <ul class="text-sm space-y-1">
                                                {question
                                                    .options
                                                    .iter()
                                                    .map(|option| {
                                                        let is_correct = *option == correct;
                                                        view! {
                                                            <li class=if is_correct {
                                                                "text-success font-medium"
                                                            } else {
                                                                ""
                                                            }>
                                                                {option.clone()}
                                                                {is_correct.then_some(" ✓")}
                                                            </li>
                                                        }
                                                    })
                                                    .collect::<Vec<_>>()}
                                            </ul>
                                            <p class="text-xs text-base-content/50">
                                                {format!("{} mark(s)", question.marks)}
                                            </p>
                                        </div>
                                    </div>
                                }
                            }
                        }
                    />
                </div>
            </Show>
        </Shell>
    }
}

/// 测验资料表单（标题 / 分类 / 时限 / 总分 / 付费标记）
#[component]
fn QuizEditForm(
    quiz_id: String,
    quiz: Quiz,
    on_saved: impl Fn(Quiz) + Clone + 'static,
) -> impl IntoView {
    let api = use_api();

    let initial = QuizForm::from_quiz(&quiz);
    let (title, set_title) = signal(initial.title);
    let (category, set_category) = signal(initial.category);
    let (minutes, set_minutes) = signal(initial.time_limit_minutes);
    let (marks, set_marks) = signal(initial.total_marks);
    let (is_premium, set_is_premium) = signal(initial.is_premium);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let (saving, set_saving) = signal(false);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let form = QuizForm {
            title: title.get_untracked(),
            category: category.get_untracked(),
            // 更新载荷不含所属课程
            course_id: String::new(),
            is_premium: is_premium.get_untracked(),
            time_limit_minutes: minutes.get_untracked(),
            total_marks: marks.get_untracked(),
        };
        let request = match form.into_update_request(quiz_id.clone()) {
            Ok(r) => r,
            Err(message) => {
                set_error_msg.set(Some(message));
                return;
            }
        };

        set_saving.set(true);
        let on_saved = on_saved.clone();
        spawn_local(async move {
            let api = api.get_value();
            match api.send(&request).await {
                Ok(updated) => {
                    set_error_msg.set(None);
                    on_saved(updated);
                }
                Err(e) => set_error_msg.set(Some(format!("Save failed: {}", e))),
            }
            set_saving.set(false);
        });
    };

    view! {
        <div class="card bg-base-100 shadow-md mb-4">
            <form class="card-body py-4" on:submit=on_submit>
                <h3 class="font-semibold">"Details"</h3>
                <Show when=move || error_msg.get().is_some()>
                    <p class="text-error text-sm">{move || error_msg.get().unwrap_or_default()}</p>
                </Show>
                <div class="flex flex-wrap items-end gap-2">
                    <input
                        type="text"
                        placeholder="Title"
                        class="input input-bordered input-sm flex-1"
                        on:input=move |ev| set_title.set(event_target_value(&ev))
                        prop:value=title
                    />
                    <input
                        type="text"
                        placeholder="Category"
                        class="input input-bordered input-sm w-28"
                        on:input=move |ev| set_category.set(event_target_value(&ev))
                        prop:value=category
                    />
                    <input
                        type="number"
                        placeholder="Minutes"
                        class="input input-bordered input-sm w-24"
                        on:input=move |ev| set_minutes.set(event_target_value(&ev))
                        prop:value=minutes
                    />
                    <input
                        type="number"
                        placeholder="Total marks"
                        class="input input-bordered input-sm w-28"
                        on:input=move |ev| set_marks.set(event_target_value(&ev))
                        prop:value=marks
                    />
                    <label class="label cursor-pointer gap-1">
                        <span class="label-text text-xs">"Premium"</span>
                        <input
                            type="checkbox"
                            class="checkbox checkbox-sm"
                            on:change=move |ev| set_is_premium.set(event_target_checked(&ev))
                            prop:checked=is_premium
                        />
                    </label>
                    <button class="btn btn-primary btn-sm" disabled=move || saving.get()>
                        "Save"
                    </button>
                </div>
            </form>
        </div>
    }
}

/// 新增题目表单：题干、四个选项、正确答案、分值
#[component]
fn QuestionAddForm(quiz_id: String, on_added: impl Fn(()) + Clone + 'static) -> impl IntoView {
    let api = use_api();

    let (text, set_text) = signal(String::new());
    let options: [(ReadSignal<String>, WriteSignal<String>); 4] = [
        signal(String::new()),
        signal(String::new()),
        signal(String::new()),
        signal(String::new()),
    ];
    let (correct, set_correct) = signal(String::new());
    let (marks, set_marks) = signal("1".to_string());
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = {
        let quiz_id = quiz_id.clone();
        move |ev: leptos::web_sys::SubmitEvent| {
            ev.prevent_default();
            let form = QuestionForm {
                text: text.get_untracked(),
                options: [
                    options[0].0.get_untracked(),
                    options[1].0.get_untracked(),
                    options[2].0.get_untracked(),
                    options[3].0.get_untracked(),
                ],
                correct_answer: correct.get_untracked(),
                marks: marks.get_untracked(),
            };
            let request: AddQuestionRequest = match form.into_request(quiz_id.clone()) {
                Ok(r) => r,
                Err(message) => {
                    set_error_msg.set(Some(message));
                    return;
                }
            };

            let on_added = on_added.clone();
            spawn_local(async move {
                let api = api.get_value();
                match api.send(&request).await {
                    Ok(_) => {
                        set_text.set(String::new());
                        for (_, set_option) in options.iter() {
                            set_option.set(String::new());
                        }
                        set_correct.set(String::new());
                        set_error_msg.set(None);
                        on_added(());
                    }
                    Err(e) => set_error_msg.set(Some(format!("Create failed: {}", e))),
                }
            });
        }
    };

    view! {
        <div class="card bg-base-100 shadow-md">
            <form class="card-body py-4" on:submit=on_submit>
                <h3 class="font-semibold">"New question"</h3>
                <Show when=move || error_msg.get().is_some()>
                    <p class="text-error text-sm">{move || error_msg.get().unwrap_or_default()}</p>
                </Show>
                <textarea
                    class="textarea textarea-bordered"
                    placeholder="Question text"
                    on:input=move |ev| set_text.set(event_target_value(&ev))
                    prop:value=text
                ></textarea>
                <div class="grid grid-cols-2 gap-2">
                    {options
                        .iter()
                        .enumerate()
                        .map(|(i, (option, set_option))| {
                            let option = *option;
                            let set_option = *set_option;
                            view! {
                                <input
                                    type="text"
                                    placeholder=format!("Option {}", i + 1)
                                    class="input input-bordered input-sm"
                                    on:input=move |ev| set_option.set(event_target_value(&ev))
                                    prop:value=option
                                />
                            }
                        })
                        .collect::<Vec<_>>()}
                </div>
                <div class="flex items-end gap-2">
                    <input
                        type="text"
                        placeholder="Correct answer"
                        class="input input-bordered input-sm flex-1"
                        on:input=move |ev| set_correct.set(event_target_value(&ev))
                        prop:value=correct
                    />
                    <input
                        type="number"
                        placeholder="Marks"
                        class="input input-bordered input-sm w-20"
                        on:input=move |ev| set_marks.set(event_target_value(&ev))
                        prop:value=marks
                    />
                    <button class="btn btn-primary btn-sm">"Add question"</button>
                </div>
            </form>
        </div>
    }
}
