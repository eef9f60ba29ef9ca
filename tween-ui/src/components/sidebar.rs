//! Sidebar Component
//!
//! Chat list with drafts, delete buttons and logout.

use chrono::Utc;
use leptos::*;
use leptos_router::use_navigate;

use tween::auth;
use tween::resources::{EntryKey, SidebarEntry};
use tween::TweenApi;

use crate::components::loading::ListSkeleton;
use crate::state::global::GlobalState;

#[component]
pub fn Sidebar() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let chats = state.chats;
    let selected = state.selected;
    let navigate = use_navigate();

    let new_chat = move |_| {
        let mut draft_id = String::new();
        chats.update(|store| draft_id = store.add_draft(Utc::now()));
        selected.set(Some(EntryKey::Draft(draft_id)));
    };

    let state_for_logout = state.clone();
    let on_logout = move |_| {
        let state = state_for_logout.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            if let Err(e) = auth::logout(&*state.api, &state.session).await {
                web_sys::console::warn_1(&format!("Logout: {}", e).into());
            }
            state.end_session();
            navigate("/auth", Default::default());
        });
    };

    view! {
        <aside class="w-80 flex-shrink-0 bg-white border-r border-gray-200 flex flex-col h-full">
            <div class="p-4 border-b border-gray-200 flex items-center justify-between">
                <h1 class="text-xl font-bold text-gray-900">"Digital Tween"</h1>
                <button
                    on:click=new_chat
                    class="px-3 py-2 bg-blue-600 hover:bg-blue-700 text-white text-sm rounded-lg transition-colors"
                >
                    "+ New chat"
                </button>
            </div>

            <div class="flex-1 overflow-y-auto">
                {move || {
                    let store = chats.get();
                    if store.loading && store.chats().is_empty() {
                        return view! { <ListSkeleton count=5 /> }.into_view();
                    }
                    if let Some(error) = store.error.clone() {
                        return view! {
                            <p class="p-4 text-sm text-red-600">{error}</p>
                        }.into_view();
                    }

                    let entries = store.sidebar(Utc::now());
                    if entries.is_empty() {
                        return view! {
                            <p class="p-4 text-sm text-gray-500">"No chats yet. Create one to get started."</p>
                        }.into_view();
                    }

                    entries
                        .into_iter()
                        .map(|entry| view! { <SidebarItem entry=entry /> })
                        .collect_view()
                }}
            </div>

            <div class="p-4 border-t border-gray-200">
                <button
                    on:click=on_logout
                    class="w-full px-4 py-2 text-sm text-gray-600 hover:text-gray-900 hover:bg-gray-100 rounded-lg transition-colors"
                >
                    "Log out"
                </button>
            </div>
        </aside>
    }
}

/// One chat or draft row
#[component]
fn SidebarItem(entry: SidebarEntry) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let selected = state.selected;

    let key = entry.key.clone();
    let key_for_select = key.clone();
    let is_selected = move || selected.get().as_ref() == Some(&key);

    let on_select = move |_| selected.set(Some(key_for_select.clone()));

    let key_for_delete = entry.key.clone();
    let on_delete = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        delete_entry(&state, key_for_delete.clone());
    };

    let badge = if !entry.setup_complete {
        Some(("Setup", "bg-yellow-100 text-yellow-800"))
    } else if entry.processing {
        Some(("Processing", "bg-blue-100 text-blue-800"))
    } else {
        None
    };

    view! {
        <div
            on:click=on_select
            class=move || {
                let base = "group px-4 py-3 cursor-pointer border-b border-gray-100 transition-colors";
                if is_selected() {
                    format!("{} bg-blue-50", base)
                } else {
                    format!("{} hover:bg-gray-50", base)
                }
            }
        >
            <div class="flex items-center justify-between">
                <span class="font-medium text-gray-900 truncate">{entry.title.clone()}</span>
                <span class="text-xs text-gray-400 ml-2 whitespace-nowrap">{entry.time_label.clone()}</span>
            </div>
            <div class="flex items-center justify-between mt-1">
                <span class="text-sm text-gray-500 truncate">
                    {entry.preview.clone().unwrap_or_default()}
                </span>
                <div class="flex items-center space-x-2">
                    {badge.map(|(label, class)| view! {
                        <span class=format!("text-xs px-2 py-0.5 rounded-full {}", class)>{label}</span>
                    })}
                    <button
                        on:click=on_delete
                        title="Delete"
                        class="opacity-0 group-hover:opacity-100 text-gray-400 hover:text-red-600 transition-opacity"
                    >
                        "✕"
                    </button>
                </div>
            </div>
        </div>
    }
}

fn delete_entry(state: &GlobalState, key: EntryKey) {
    if state.selected.get_untracked().as_ref() == Some(&key) {
        state.selected.set(None);
    }

    match key {
        EntryKey::Draft(id) => {
            state.chats.update(|store| {
                store.remove_draft(&id);
            });
        }
        EntryKey::Chat(id) => {
            let state = state.clone();
            spawn_local(async move {
                let result = state.api.delete_chat(id).await;
                state.chats.update(|store| {
                    store.settle_delete(id, &result);
                });
                match result {
                    Ok(()) => {
                        state.stop_chat_poll(id);
                        state.show_success("Chat deleted");
                    }
                    Err(e) => state.show_error(&format!("Failed to delete chat: {}", e)),
                }
            });
        }
    }
}
