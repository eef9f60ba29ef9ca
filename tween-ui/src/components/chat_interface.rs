//! Chat Interface Component
//!
//! Bubble timeline for one chat plus the composer.

use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;

use tween::conversation::{send_text, ConversationEvent, Timeline};
use tween::models::{ChatId, Status, UiMessage};
use tween::poll::{cancellable, flatten_cancelled};
use tween::resources::{load_timeline, TimelineStore};
use tween::{ClientError, PollHandle};

use crate::api::GlooSleeper;
use crate::components::input_field::MessageInput;
use crate::components::loading::Loading;
use crate::components::message_bubble::MessageBubble;
use crate::state::global::GlobalState;

#[component]
pub fn ChatInterface(chat_id: ChatId) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let chats = state.chats;

    let timeline = create_rw_signal(Timeline::default());
    let store = create_rw_signal(TimelineStore::default());
    let sending = create_rw_signal(false);
    let in_flight: Rc<RefCell<Option<PollHandle>>> = Rc::new(RefCell::new(None));
    let scroll_ref = create_node_ref::<html::Div>();

    // Initial load, dropped if the view goes away first
    let state_for_load = state.clone();
    store.update(|s| s.begin_fetch(chat_id));
    let (load, load_handle) = cancellable(async move {
        load_timeline(&*state_for_load.api, chat_id).await
    });
    let loading: Rc<RefCell<Option<PollHandle>>> = Rc::new(RefCell::new(Some(load_handle)));
    let state_for_load = state.clone();
    let loading_for_task = Rc::clone(&loading);
    spawn_local(async move {
        let Ok(result) = load.await else {
            return;
        };
        loading_for_task.borrow_mut().take();
        if matches!(&result, Err(e) if e.is_unauthorized()) {
            state_for_load.end_session();
            return;
        }

        let mut loaded = None;
        store.update(|s| loaded = s.finish_fetch(result));
        if let Some(messages) = loaded {
            timeline.update(|t| t.replace(messages));
        }
    });

    // Keep the newest bubble in view
    create_effect(move |_| {
        timeline.with(|_| ());
        if let Some(div) = scroll_ref.get() {
            div.set_scroll_top(div.scroll_height());
        }
    });

    let is_empty = create_memo(move |_| timeline.with(|t| t.is_empty()));
    let chat = move || chats.with(|s| s.get(chat_id).cloned());
    let status = move || chat().map(|c| c.status).unwrap_or(Status::Processing);
    let input_disabled = Signal::derive(move || sending.get() || status() != Status::Completed);

    let state_for_send = state.clone();
    let in_flight_for_send = Rc::clone(&in_flight);
    let on_send = Callback::new(move |text: String| {
        let state = state_for_send.clone();
        let policy = state.config.polling.message_policy();
        sending.set(true);

        let (task, handle) = cancellable(async move {
            let notify_state = state.clone();
            send_text(
                &*state.api,
                &GlooSleeper,
                &policy,
                chat_id,
                &text,
                move |event| {
                    if let ConversationEvent::Notify(notice) = &event {
                        notify_state.notify(notice);
                    }
                    timeline.update(|t| t.apply(&event));
                },
            )
            .await
        });
        *in_flight_for_send.borrow_mut() = Some(handle);

        let in_flight = Rc::clone(&in_flight_for_send);
        spawn_local(async move {
            match flatten_cancelled(task.await) {
                Err(ClientError::Cancelled) => return,
                Ok(outcome) => {
                    if outcome.reply.is_none() {
                        web_sys::console::warn_1(&"Reply polling gave up".into());
                    }
                }
                // Already surfaced as a notice
                Err(_) => {}
            }
            in_flight.borrow_mut().take();
            sending.set(false);
        });
    });

    on_cleanup(move || {
        for slot in [&loading, &in_flight] {
            if let Some(handle) = slot.borrow_mut().take() {
                handle.cancel();
            }
        }
    });

    view! {
        <div class="flex flex-col h-full">
            <ChatHeader chat_id=chat_id />

            {move || {
                let status = status();
                if status == Status::Completed {
                    view! {}.into_view()
                } else {
                    let class = if status == Status::Error {
                        "px-4 py-2 text-sm bg-red-50 text-red-700 border-b border-red-200"
                    } else {
                        "px-4 py-2 text-sm bg-yellow-50 text-yellow-800 border-b border-yellow-200"
                    };
                    view! { <div class=class>{status.chat_banner()}</div> }.into_view()
                }
            }}

            <div node_ref=scroll_ref class="flex-1 overflow-y-auto p-4 space-y-4 bg-gray-50">
                {move || {
                    let s = store.get();
                    if s.loading {
                        return view! { <Loading /> }.into_view();
                    }
                    if let Some(error) = s.error {
                        return view! {
                            <p class="text-center text-red-600">{format!("Failed to load messages: {}", error)}</p>
                        }.into_view();
                    }
                    if is_empty.get() {
                        return view! {
                            <p class="text-center text-gray-400 mt-12">"Say hello to start the conversation."</p>
                        }.into_view();
                    }
                    view! {
                        <For
                            each=move || timeline.get().messages().to_vec()
                            key=|m| m.id.clone()
                            children=|message: UiMessage| view! { <MessageBubble message=message /> }
                        />
                    }.into_view()
                }}
            </div>

            <MessageInput on_send=on_send disabled=input_disabled />
        </div>
    }
}

/// Persona name and photo
#[component]
fn ChatHeader(chat_id: ChatId) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let chats = state.chats;

    view! {
        <div class="flex items-center px-4 py-3 bg-white border-b border-gray-200">
            {move || {
                chats.with(|s| s.get(chat_id).cloned()).map(|chat| {
                    let initial = chat.name.chars().next().unwrap_or('?').to_string();
                    view! {
                        {match chat.image_url.clone() {
                            Some(url) => view! {
                                <img src=url alt="" class="w-10 h-10 rounded-full object-cover" />
                            }.into_view(),
                            None => view! {
                                <div class="w-10 h-10 rounded-full bg-blue-100 text-blue-700 flex items-center justify-center font-semibold">
                                    {initial}
                                </div>
                            }.into_view(),
                        }}
                        <div class="ml-3">
                            <h2 class="font-semibold text-gray-900">{chat.name.clone()}</h2>
                            <p class="text-xs text-gray-500">{chat.description.clone().unwrap_or_default()}</p>
                        </div>
                    }
                })
            }}
        </div>
    }
}
