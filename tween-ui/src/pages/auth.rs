//! Auth Page
//!
//! Sign-in / sign-up tabs plus the backend address override.

use leptos::*;
use leptos_router::Redirect;

use crate::api;
use crate::components::{SignInForm, SignUpForm};
use crate::state::global::GlobalState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    SignIn,
    SignUp,
}

#[component]
pub fn AuthPage() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let authenticated = state.authenticated;
    let tab = create_rw_signal(Tab::SignIn);

    let tab_class = move |which: Tab| {
        move || {
            if tab.get() == which {
                "flex-1 py-2 font-medium text-blue-600 border-b-2 border-blue-600"
            } else {
                "flex-1 py-2 text-gray-500 border-b-2 border-transparent hover:text-gray-700"
            }
        }
    };

    view! {
        <Show
            when=move || !authenticated.get()
            fallback=|| view! { <Redirect path="/" /> }
        >
            <div class="min-h-screen flex items-center justify-center bg-gray-50 px-4">
                <div class="w-full max-w-md">
                    <div class="text-center mb-8">
                        <h1 class="text-3xl font-bold text-gray-900">"Digital Tween"</h1>
                        <p class="text-gray-500 mt-2">"Talk to the people who matter, any time."</p>
                    </div>

                    <div class="bg-white rounded-2xl shadow p-6">
                        <div class="flex mb-6">
                            <button class=tab_class(Tab::SignIn) on:click=move |_| tab.set(Tab::SignIn)>
                                "Sign in"
                            </button>
                            <button class=tab_class(Tab::SignUp) on:click=move |_| tab.set(Tab::SignUp)>
                                "Sign up"
                            </button>
                        </div>

                        {move || match tab.get() {
                            Tab::SignIn => view! { <SignInForm /> }.into_view(),
                            Tab::SignUp => view! { <SignUpForm /> }.into_view(),
                        }}
                    </div>

                    <ServerSettings />
                </div>
            </div>
        </Show>
    }
}

/// Backend address stored in local storage; applied on reload
#[component]
fn ServerSettings() -> impl IntoView {
    let (open, set_open) = create_signal(false);
    let (api_url, set_api_url) = create_signal(api::get_api_base());

    let save = move |_: web_sys::MouseEvent| {
        api::set_api_base(&api_url.get_untracked());
        if let Some(window) = web_sys::window() {
            let _ = window.location().reload();
        }
    };

    view! {
        <div class="mt-4 text-center text-sm">
            <button class="text-gray-400 hover:text-gray-600" on:click=move |_| set_open.update(|o| *o = !*o)>
                "Server settings"
            </button>
            <Show when=move || open.get() fallback=|| ()>
                <div class="flex space-x-2 mt-2">
                    <input
                        type="url"
                        class="flex-1 px-3 py-2 border border-gray-300 rounded-lg text-sm"
                        prop:value=api_url
                        on:input=move |ev| set_api_url.set(event_target_value(&ev))
                    />
                    <button
                        class="px-3 py-2 bg-gray-100 hover:bg-gray-200 rounded-lg"
                        on:click=save
                    >
                        "Save"
                    </button>
                </div>
            </Show>
        </div>
    }
}
