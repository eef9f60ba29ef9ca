//! Main Page
//!
//! Sidebar plus whichever chat, draft or placeholder is selected.

use leptos::*;
use leptos_router::Redirect;

use tween::resources::EntryKey;

use crate::components::{ChatInterface, SetupModal, Sidebar};
use crate::state::global::GlobalState;

#[component]
pub fn MainPage() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let authenticated = state.authenticated;

    view! {
        <Show
            when=move || authenticated.get()
            fallback=|| view! { <Redirect path="/auth" /> }
        >
            <ChatLayout />
        </Show>
    }
}

#[component]
fn ChatLayout() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    state.refresh_chats();

    let selected = state.selected;
    let selection = create_memo(move |_| selected.get());

    view! {
        <div class="h-screen flex bg-gray-50">
            <Sidebar />

            <main class="flex-1 min-w-0">
                {move || match selection.get() {
                    Some(EntryKey::Chat(chat_id)) => view! { <ChatInterface chat_id=chat_id /> }.into_view(),
                    Some(EntryKey::Draft(draft_id)) => view! {
                        <EmptyState />
                        <SetupModal draft_id=draft_id />
                    }.into_view(),
                    None => view! { <EmptyState /> }.into_view(),
                }}
            </main>
        </div>
    }
}

#[component]
fn EmptyState() -> impl IntoView {
    view! {
        <div class="h-full flex flex-col items-center justify-center text-center text-gray-500">
            <div class="text-6xl mb-4">"💬"</div>
            <h2 class="text-xl font-semibold text-gray-700">"No chat selected"</h2>
            <p class="mt-2">"Pick a chat on the left or start a new one."</p>
        </div>
    }
}
