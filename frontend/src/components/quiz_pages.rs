//! 测验页面：列表 / 应试 / 成绩 / 回顾
//!
//! 应试页把 `quiz` 模块的纯状态（答题纸、阶段、闸门、倒计时）
//! 接到信号与定时器上。定时器到点与手动提交共用同一条提交路径，
//! 由闸门保证只发出一次请求。

use leptos::prelude::*;
use leptos::task::spawn_local;
use learnhub_shared::error::ApiErrorKind;
use learnhub_shared::protocol::{
    GetQuizQuestionsRequest, ListQuizzesRequest, ReviewQuizRequest, SubmitQuizRequest,
};
use learnhub_shared::{Question, Quiz, QuizReview, ReviewedAnswer};

use crate::api::use_api;
use crate::components::layout::{ErrorAlert, LoadingSpinner, Shell};
use crate::quiz::{
    AnswerSheet, AttemptHandoff, AttemptPhase, SubmitGate, classify_load, format_clock,
};
use crate::web::Interval;
use crate::web::route::AppRoute;
use crate::web::router::use_router;

// =========================================================
// 测验列表
// =========================================================

#[component]
pub fn QuizListPage() -> impl IntoView {
    let router = use_router();
    let api = use_api();

    let (quizzes, set_quizzes) = signal(Vec::<Quiz>::new());
    let (loading, set_loading) = signal(true);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    spawn_local(async move {
        let api = api.get_value();
        match api.send(&ListQuizzesRequest).await {
            Ok(data) => set_quizzes.set(data),
            Err(e) => set_error_msg.set(Some(format!("Failed to load quizzes: {}", e))),
        }
        set_loading.set(false);
    });

    view! {
        <Shell>
            <h1 class="text-3xl font-bold mb-6">"Quizzes"</h1>

            <Show when=move || error_msg.get().is_some()>
                <ErrorAlert message=error_msg.get().unwrap_or_default() />
            </Show>

            <Show when=move || !loading.get() fallback=|| view! { <LoadingSpinner /> }>
                <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                    <For
                        each=move || quizzes.get()
                        key=|quiz| quiz.id.clone()
                        children=move |quiz: Quiz| {
                            let route = AppRoute::QuizStart {
                                quiz_id: quiz.id.clone(),
                            };
                            let minutes = quiz.time_limit_minutes;
                            view! {
                                <div class="card bg-base-100 shadow-md">
                                    <div class="card-body">
                                        <div class="flex items-start justify-between">
                                            <h2 class="card-title">{quiz.title.clone()}</h2>
                                            <Show when={
                                                let premium = quiz.is_premium;
                                                move || premium
                                            }>
                                                <span class="badge badge-warning">"Premium"</span>
                                            </Show>
                                        </div>
                                        <p class="text-sm text-base-content/70">
                                            {quiz.category.clone()}
                                            {minutes
                                                .map(|m| format!(" · {} min", m))
                                                .unwrap_or_default()}
                                        </p>
                                        <div class="card-actions justify-end">
                                            <button
                                                class="btn btn-primary btn-sm"
                                                on:click=move |_| router.navigate_route(route.clone())
                                            >
                                                "Take quiz"
                                            </button>
                                        </div>
                                    </div>
                                </div>
                            }
                        }
                    />
                </div>
                <Show when=move || quizzes.with(|q| q.is_empty())>
                    <p class="text-base-content/70">"No quizzes available yet."</p>
                </Show>
            </Show>
        </Shell>
    }
}

// =========================================================
// 应试
// =========================================================

#[component]
pub fn QuizStartPage(quiz_id: String) -> impl IntoView {
    let router = use_router();
    let api = use_api();
    let handoff = use_context::<AttemptHandoff>().expect("AttemptHandoff should be provided");

    let (phase, set_phase) = signal(AttemptPhase::Loading);
    // None = 计时尚未开始
    let (remaining, set_remaining) = signal(Option::<u32>::None);
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let sheet = RwSignal::new(AnswerSheet::new());
    let gate = StoredValue::new(SubmitGate::new());
    // Interval 持有 JS 闭包，只能存在本线程
    let timer = StoredValue::new_local(Option::<Interval>::None);

    // 加载题目并启动倒计时
    spawn_local({
        let quiz_id = quiz_id.clone();
        async move {
            let api = api.get_value();
            let result = api
                .send(&GetQuizQuestionsRequest {
                    quiz_id,
                    admin: false,
                })
                .await;
            let next = classify_load(result);
            if let AttemptPhase::Ready {
                time_limit_minutes, ..
            } = &next
            {
                set_remaining.set(Some(time_limit_minutes * 60));
                timer.set_value(Some(Interval::new(1_000, move || {
                    set_remaining.update(|r| {
                        if let Some(seconds) = r {
                            *seconds = seconds.saturating_sub(1);
                        }
                    });
                })));
            }
            set_phase.set(next);
        }
    });

    // 离开页面时停表
    on_cleanup(move || timer.set_value(None));

    let submit = {
        let quiz_id = quiz_id.clone();
        move || {
            // 到点与手动点击可能同时到达，闸门只放行一次
            let mut acquired = false;
            gate.update_value(|g| acquired = g.try_acquire());
            if !acquired {
                return;
            }

            set_is_submitting.set(true);
            set_error_msg.set(None);

            let quiz_id = quiz_id.clone();
            spawn_local(async move {
                let api = api.get_value();
                let answers = sheet.with_untracked(|s| s.answers().to_vec());
                match api.send(&SubmitQuizRequest { quiz_id: quiz_id.clone(), answers }).await {
                    Ok(response) => {
                        timer.set_value(None);
                        handoff.0.set(Some(response.attempt));
                        router.navigate_route(AppRoute::QuizResult { quiz_id });
                    }
                    Err(e) if e.kind == ApiErrorKind::AlreadyAttempted => {
                        timer.set_value(None);
                        set_phase.set(AttemptPhase::AlreadyAttempted);
                    }
                    Err(e) => {
                        // 失败后重新开放闸门允许重试
                        gate.update_value(|g| g.release());
                        set_error_msg.set(Some(format!("Submission failed: {}", e)));
                        set_is_submitting.set(false);
                    }
                }
            });
        }
    };

    // 倒计时归零自动提交
    Effect::new({
        let submit = submit.clone();
        move |_| {
            if remaining.get() == Some(0) {
                submit();
            }
        }
    });

    let quiz_route = AppRoute::QuizStart {
        quiz_id: quiz_id.clone(),
    };

    view! {
        <Shell>
            {move || match phase.get() {
                AttemptPhase::Loading => view! { <LoadingSpinner /> }.into_any(),
                AttemptPhase::PremiumLocked => view! {
                    <div class="card bg-base-100 shadow-md">
                        <div class="card-body items-center text-center">
                            <h2 class="card-title">"Premium quiz"</h2>
                            <p class="text-base-content/70">"Subscribe to take this quiz."</p>
                            <button
                                class="btn btn-warning"
                                on:click=move |_| router.navigate_route(AppRoute::Subscribe)
                            >
                                "View plans"
                            </button>
                        </div>
                    </div>
                }.into_any(),
                AttemptPhase::AlreadyAttempted => {
                    let review_route = match &quiz_route {
                        AppRoute::QuizStart { quiz_id } => AppRoute::QuizReview {
                            quiz_id: quiz_id.clone(),
                        },
                        _ => AppRoute::QuizList,
                    };
                    view! {
                        <div class="card bg-base-100 shadow-md">
                            <div class="card-body items-center text-center">
                                <h2 class="card-title">"Already attempted"</h2>
                                <p class="text-base-content/70">
                                    "Each quiz can only be attempted once."
                                </p>
                                <button
                                    class="btn btn-primary"
                                    on:click=move |_| router.navigate_route(review_route.clone())
                                >
                                    "Review your result"
                                </button>
                            </div>
                        </div>
                    }.into_any()
                }
                AttemptPhase::LoadFailed(message) => view! {
                    <div role="alert" class="alert alert-error">
                        <span>{format!("Failed to load quiz: {}", message)}</span>
                    </div>
                }.into_any(),
                AttemptPhase::Ready { quiz_title, questions, .. } => {
                    let submit = submit.clone();
                    view! {
                        <AttemptView
                            quiz_title=quiz_title
                            questions=questions
                            sheet=sheet
                            remaining=remaining
                            is_submitting=is_submitting
                            error_msg=error_msg
                            on_submit=submit
                        />
                    }.into_any()
                }
            }}
        </Shell>
    }
}

/// 应试界面本体：倒计时、题目列表、提交按钮
#[component]
fn AttemptView(
    quiz_title: String,
    questions: Vec<Question>,
    sheet: RwSignal<AnswerSheet>,
    remaining: ReadSignal<Option<u32>>,
    is_submitting: ReadSignal<bool>,
    error_msg: ReadSignal<Option<String>>,
    on_submit: impl Fn() + Clone + Send + 'static,
) -> impl IntoView {
    let clock = move || remaining.get().map(format_clock).unwrap_or_default();
    let urgent = move || remaining.get().is_some_and(|r| r < 60);

    view! {
        <div class="flex items-center justify-between mb-6">
            <h1 class="text-3xl font-bold">{quiz_title}</h1>
            <div class=move || {
                if urgent() {
                    "badge badge-error badge-lg font-mono"
                } else {
                    "badge badge-neutral badge-lg font-mono"
                }
            }>{clock}</div>
        </div>

        <Show when=move || error_msg.get().is_some()>
            <ErrorAlert message=error_msg.get().unwrap_or_default() />
        </Show>

        <div class="space-y-4">
            <For
                each={
                    let questions = questions.clone();
                    move || questions.clone().into_iter().enumerate().collect::<Vec<_>>()
                }
                key=|(_, q)| q.id.clone()
                children=move |(index, question): (usize, Question)| {
                    view! {
                        <QuestionCard index=index question=question sheet=sheet />
                    }
                }
            />
        </div>

        <div class="mt-6 flex justify-end">
            <button
                class="btn btn-primary btn-wide"
                disabled=move || is_submitting.get()
                on:click={
                    let on_submit = on_submit.clone();
                    move |_| on_submit()
                }
            >
                {move || if is_submitting.get() {
                    view! { <span class="loading loading-spinner"></span> "Submitting..." }.into_any()
                } else {
                    "Submit quiz".into_any()
                }}
            </button>
        </div>
    }
}

/// 单题卡片：四选项单选，重选覆盖
#[component]
fn QuestionCard(index: usize, question: Question, sheet: RwSignal<AnswerSheet>) -> impl IntoView {
    let question_id = question.id.clone();
    let group = format!("question-{}", question_id);

    view! {
        <div class="card bg-base-100 shadow-md">
            <div class="card-body">
                <h3 class="font-semibold">
                    {format!("{}. ", index + 1)}
                    {question.text.clone()}
                </h3>
                <div class="space-y-2 mt-2">
                    <For
                        each={
                            let options = question.options.clone();
                            move || options.clone()
                        }
                        key=|option| option.clone()
                        children={
                            let question_id = question_id.clone();
                            let group = group.clone();
                            move |option: String| {
                                let question_id = question_id.clone();
                                let checked = {
                                    let question_id = question_id.clone();
                                    let option = option.clone();
                                    move || {
                                        sheet.with(|s| s.selected(&question_id) == Some(option.as_str()))
                                    }
                                };
                                let on_select = {
                                    let question_id = question_id.clone();
                                    let option = option.clone();
                                    move |_| {
                                        sheet.update(|s| s.select(&question_id, &option));
                                    }
                                };
                                view! {
                                    <label class="flex items-center gap-3 cursor-pointer p-2 rounded-lg hover:bg-base-200">
                                        <input
                                            type="radio"
                                            class="radio radio-primary radio-sm"
                                            name=group.clone()
                                            prop:checked=checked
                                            on:change=on_select
                                        />
                                        <span>{option.clone()}</span>
                                    </label>
                                }
                            }
                        }
                    />
                </div>
            </div>
        </div>
    }
}

// =========================================================
// 成绩页
// =========================================================

/// 成绩页只消费一次性交接信道。
/// 刷新或直接访问时信道为空，展示兜底并引导去回顾页。
#[component]
pub fn QuizResultPage(quiz_id: String) -> impl IntoView {
    let router = use_router();
    let handoff = use_context::<AttemptHandoff>().expect("AttemptHandoff should be provided");

    // 取走即清空，结果只在本次渲染生命周期内存活
    let result = handoff.0.try_update(|slot| slot.take()).flatten();
    let review_route = AppRoute::QuizReview { quiz_id };

    view! {
        <Shell>
            {match result {
                Some(attempt) => {
                    let review_route = review_route.clone();
                    view! {
                        <div class="card bg-base-100 shadow-md max-w-xl mx-auto">
                            <div class="card-body items-center text-center">
                                <h1 class="text-2xl font-bold">"Quiz complete"</h1>
                                <div class="radial-progress text-primary my-4"
                                    style=format!("--value:{};", attempt.percentage as u32)
                                >
                                    {format!("{:.0}%", attempt.percentage)}
                                </div>
                                <p class="text-lg">
                                    {format!("You scored {} out of {} questions", attempt.score, attempt.total_questions)}
                                </p>
                                <button
                                    class="btn btn-primary mt-4"
                                    on:click=move |_| router.navigate_route(review_route.clone())
                                >
                                    "Review answers"
                                </button>
                            </div>
                        </div>
                    }.into_any()
                }
                None => {
                    let review_route = review_route.clone();
                    view! {
                        <div class="card bg-base-100 shadow-md max-w-xl mx-auto">
                            <div class="card-body items-center text-center">
                                <h1 class="text-2xl font-bold">"No fresh result to show"</h1>
                                <p class="text-base-content/70">
                                    "Results are shown right after submission. Your saved attempt is available in the review."
                                </p>
                                <button
                                    class="btn btn-primary mt-4"
                                    on:click=move |_| router.navigate_route(review_route.clone())
                                >
                                    "Open review"
                                </button>
                            </div>
                        </div>
                    }.into_any()
                }
            }}
        </Shell>
    }
}

// =========================================================
// 回顾页
// =========================================================

#[component]
pub fn QuizReviewPage(quiz_id: String) -> impl IntoView {
    let api = use_api();

    let (review, set_review) = signal(Option::<QuizReview>::None);
    let (loading, set_loading) = signal(true);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    spawn_local(async move {
        let api = api.get_value();
        match api.send(&ReviewQuizRequest { quiz_id }).await {
            Ok(data) => set_review.set(Some(data)),
            Err(e) => set_error_msg.set(Some(format!("Failed to load review: {}", e))),
        }
        set_loading.set(false);
    });

    view! {
        <Shell>
            <Show when=move || error_msg.get().is_some()>
                <ErrorAlert message=error_msg.get().unwrap_or_default() />
            </Show>

            <Show when=move || !loading.get() fallback=|| view! { <LoadingSpinner /> }>
                {move || review.get().map(|r| view! {
                    <h1 class="text-3xl font-bold mb-2">
                        {r.quiz_title.clone().unwrap_or_else(|| "Quiz review".to_string())}
                    </h1>
                    <p class="text-base-content/70 mb-6">
                        {format!("Score: {} / {}", r.score, r.total_questions)}
                    </p>
                    <div class="space-y-4">
                        <For
                            each={
                                let answers = r.answers.clone();
                                move || answers.clone().into_iter().enumerate().collect::<Vec<_>>()
                            }
                            key=|(i, _)| *i
                            children=move |(index, answer): (usize, ReviewedAnswer)| {
                                view! { <ReviewCard index=index answer=answer /> }
                            }
                        />
                    </div>
                })}
            </Show>
        </Shell>
    }
}

#[component]
fn ReviewCard(index: usize, answer: ReviewedAnswer) -> impl IntoView {
    let border = if answer.is_correct {
        "card bg-base-100 shadow-md border-l-4 border-success"
    } else {
        "card bg-base-100 shadow-md border-l-4 border-error"
    };
    let user_answer = answer
        .user_answer
        .clone()
        .unwrap_or_else(|| "Not answered".to_string());

    view! {
        <div class=border>
            <div class="card-body">
                <h3 class="font-semibold">
                    {format!("{}. ", index + 1)}
                    {answer.question.clone()}
                </h3>
                <p class="text-sm">
                    "Your answer: "
                    <span class=if answer.is_correct { "text-success" } else { "text-error" }>
                        {user_answer}
                    </span>
                </p>
                <Show when={
                    let correct = answer.is_correct;
                    move || !correct
                }>
                    <p class="text-sm">
                        "Correct answer: "
                        <span class="text-success">{answer.correct_answer.clone()}</span>
                    </p>
                </Show>
                {answer.explanation.clone().map(|text| view! {
                    <p class="text-sm text-base-content/70 mt-1">{text}</p>
                })}
            </div>
        </div>
    }
}
