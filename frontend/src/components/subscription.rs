//! 订阅页：套餐列表与模拟支付
//!
//! 支付是演示用的 mock 流程：生成一个假的支付单号交给服务端校验，
//! 服务端返回 `status == "active"` 才算订阅生效。

use leptos::prelude::*;
use leptos::task::spawn_local;
use learnhub_shared::SubscriptionPlan;
use learnhub_shared::protocol::{ListPlansRequest, MockVerifyRequest};

use crate::api::use_api;
use crate::auth::{update_subscription_status, use_auth};
use crate::components::layout::{ErrorAlert, LoadingSpinner, Shell};
use crate::web::route::AppRoute;
use crate::web::router::use_router;

fn mock_payment_id() -> String {
    format!("mock_pay_{}", js_sys::Date::now() as u64)
}

#[component]
pub fn SubscribePage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let api = use_api();

    let (plans, set_plans) = signal(Vec::<SubscriptionPlan>::new());
    let (loading, set_loading) = signal(true);
    let (purchasing, set_purchasing) = signal(Option::<String>::None);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    // 已订阅用户无需停留
    Effect::new(move |_| {
        let state = auth.state.get();
        if state.user.as_ref().is_some_and(|u| u.is_subscribed) {
            router.navigate_route(AppRoute::Home);
        }
    });

    spawn_local(async move {
        let api = api.get_value();
        match api.send(&ListPlansRequest).await {
            Ok(data) => set_plans.set(data),
            Err(e) => set_error_msg.set(Some(format!("Failed to load plans: {}", e))),
        }
        set_loading.set(false);
    });

    let purchase = move |plan_id: String| {
        set_purchasing.set(Some(plan_id.clone()));
        set_error_msg.set(None);

        spawn_local(async move {
            let api = api.get_value();
            let result = api
                .send(&MockVerifyRequest {
                    plan_id,
                    mock_payment_id: mock_payment_id(),
                })
                .await;
            match result {
                Ok(response)
                    if response
                        .subscription
                        .as_ref()
                        .is_some_and(|s| s.status == "active") =>
                {
                    // 就地修正缓存档案，守卫 Effect 随即把用户带离本页
                    update_subscription_status(&auth, true);
                }
                Ok(_) => {
                    set_error_msg.set(Some("Payment was not confirmed. Try again.".to_string()));
                    set_purchasing.set(None);
                }
                Err(e) => {
                    set_error_msg.set(Some(format!("Payment failed: {}", e)));
                    set_purchasing.set(None);
                }
            }
        });
    };

    view! {
        <Shell>
            <h1 class="text-3xl font-bold mb-2">"Go Premium"</h1>
            <p class="text-base-content/70 mb-6">
                "Unlock every premium course and quiz on LearnHub."
            </p>

            <Show when=move || error_msg.get().is_some()>
                <ErrorAlert message=error_msg.get().unwrap_or_default() />
            </Show>

            <Show when=move || !loading.get() fallback=|| view! { <LoadingSpinner /> }>
                <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
                    <For
                        each=move || plans.get()
                        key=|plan| plan.id.clone()
                        children={
                            let purchase = purchase.clone();
                            move |plan: SubscriptionPlan| {
                                let plan_id = plan.id.clone();
                                let purchase = purchase.clone();
                                let busy = {
                                    let plan_id = plan_id.clone();
                                    move || purchasing.get().as_deref() == Some(plan_id.as_str())
                                };
                                view! {
                                    <div class="card bg-base-100 shadow-md">
                                        <div class="card-body">
                                            <h2 class="card-title">{plan.name.clone()}</h2>
                                            <p class="text-3xl font-bold">
                                                {format!("${:.2}", plan.price)}
                                                <span class="text-sm font-normal text-base-content/70">
                                                    {format!(" / {} days", plan.duration_days)}
                                                </span>
                                            </p>
                                            <ul class="text-sm space-y-1 my-2">
                                                {plan
                                                    .features
                                                    .iter()
                                                    .map(|f| view! { <li>"✓ " {f.clone()}</li> })
                                                    .collect::<Vec<_>>()}
                                            </ul>
                                            <div class="card-actions justify-end">
                                                <button
                                                    class="btn btn-primary"
                                                    disabled=move || purchasing.get().is_some()
                                                    on:click=move |_| purchase(plan_id.clone())
                                                >
                                                    {
                                                        let busy = busy.clone();
                                                        move || if busy() {
                                                            view! { <span class="loading loading-spinner"></span> "Processing..." }.into_any()
                                                        } else {
                                                            "Subscribe".into_any()
                                                        }
                                                    }
                                                </button>
                                            </div>
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
