//! Authentication Forms
//!
//! Sign-in and sign-up forms with inline validation.

use leptos::*;
use leptos_router::use_navigate;

use tween::auth::{self, password_strength, validate_sign_in, validate_sign_up, PasswordStrength};

use crate::state::global::GlobalState;

const INPUT_CLASS: &str = "w-full px-4 py-2 border border-gray-300 rounded-lg \
                           focus:outline-none focus:ring-2 focus:ring-blue-500";
const SUBMIT_CLASS: &str = "w-full py-3 bg-blue-600 hover:bg-blue-700 text-white font-medium \
                            rounded-lg disabled:bg-gray-300 transition-colors";

#[component]
pub fn SignInForm() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let navigate = use_navigate();

    let (login, set_login) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (error, set_error) = create_signal(None::<String>);
    let (submitting, set_submitting) = create_signal(false);

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }

        let login = login.get_untracked();
        let password = password.get_untracked();
        if let Err(e) = validate_sign_in(&login, &password) {
            set_error.set(Some(e.to_string()));
            return;
        }

        set_error.set(None);
        set_submitting.set(true);
        let state = state.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            match auth::sign_in(&*state.api, &state.session, &login, &password).await {
                Ok(_) => {
                    state.authenticated.set(true);
                    navigate("/", Default::default());
                }
                Err(e) => {
                    set_submitting.set(false);
                    set_error.set(Some(e.to_string()));
                }
            }
        });
    };

    view! {
        <form on:submit=on_submit class="space-y-4">
            <div>
                <label class="block text-sm font-medium text-gray-700 mb-1">"Login"</label>
                <input
                    type="text"
                    autocomplete="username"
                    class=INPUT_CLASS
                    prop:value=login
                    on:input=move |ev| set_login.set(event_target_value(&ev))
                />
            </div>
            <div>
                <label class="block text-sm font-medium text-gray-700 mb-1">"Password"</label>
                <input
                    type="password"
                    autocomplete="current-password"
                    class=INPUT_CLASS
                    prop:value=password
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                />
            </div>

            {move || error.get().map(|message| view! {
                <p class="text-sm text-red-600">{message}</p>
            })}

            <button type="submit" disabled=move || submitting.get() class=SUBMIT_CLASS>
                {move || if submitting.get() { "Signing in..." } else { "Sign in" }}
            </button>
        </form>
    }
}

#[component]
pub fn SignUpForm() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let navigate = use_navigate();

    let (login, set_login) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (confirm, set_confirm) = create_signal(String::new());
    let (error, set_error) = create_signal(None::<String>);
    let (submitting, set_submitting) = create_signal(false);

    let strength = create_memo(move |_| password.with(|p| password_strength(p)));

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }

        let login = login.get_untracked();
        let password = password.get_untracked();
        let confirm = confirm.get_untracked();
        if let Err(e) = validate_sign_up(&login, &password, &confirm) {
            set_error.set(Some(e.to_string()));
            return;
        }

        set_error.set(None);
        set_submitting.set(true);
        let state = state.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            match auth::sign_up(&*state.api, &state.session, &login, &password, &confirm).await {
                Ok(_) => {
                    state.authenticated.set(true);
                    state.show_success("Account created");
                    navigate("/", Default::default());
                }
                Err(e) => {
                    set_submitting.set(false);
                    set_error.set(Some(e.to_string()));
                }
            }
        });
    };

    view! {
        <form on:submit=on_submit class="space-y-4">
            <div>
                <label class="block text-sm font-medium text-gray-700 mb-1">"Login"</label>
                <input
                    type="text"
                    autocomplete="username"
                    class=INPUT_CLASS
                    prop:value=login
                    on:input=move |ev| set_login.set(event_target_value(&ev))
                />
            </div>
            <div>
                <label class="block text-sm font-medium text-gray-700 mb-1">"Password"</label>
                <input
                    type="password"
                    autocomplete="new-password"
                    class=INPUT_CLASS
                    prop:value=password
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                />
                <PasswordMeter strength=strength />
            </div>
            <div>
                <label class="block text-sm font-medium text-gray-700 mb-1">"Confirm password"</label>
                <input
                    type="password"
                    autocomplete="new-password"
                    class=INPUT_CLASS
                    prop:value=confirm
                    on:input=move |ev| set_confirm.set(event_target_value(&ev))
                />
            </div>

            {move || error.get().map(|message| view! {
                <p class="text-sm text-red-600">{message}</p>
            })}

            <button type="submit" disabled=move || submitting.get() class=SUBMIT_CLASS>
                {move || if submitting.get() { "Creating account..." } else { "Sign up" }}
            </button>
        </form>
    }
}

/// Strength bar under the password field
#[component]
fn PasswordMeter(#[prop(into)] strength: Signal<PasswordStrength>) -> impl IntoView {
    view! {
        {move || {
            let strength = strength.get();
            let (width, color) = match strength {
                PasswordStrength::Empty => return view! {}.into_view(),
                PasswordStrength::Weak => ("w-1/3", "bg-red-500"),
                PasswordStrength::Medium => ("w-2/3", "bg-yellow-500"),
                PasswordStrength::Strong => ("w-full", "bg-green-500"),
            };
            view! {
                <div class=format!("mt-2 password-strength {}", strength.class())>
                    <div class="h-1 bg-gray-200 rounded">
                        <div class=format!("h-1 rounded transition-all {} {}", width, color) />
                    </div>
                    <span class="text-xs text-gray-500">{strength.label()}</span>
                </div>
            }.into_view()
        }}
    }
}
