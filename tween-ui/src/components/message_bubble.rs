//! Message Bubble Component
//!
//! Renders one timeline entry: user text, AI video, voice clip or the
//! loading placeholder.

use leptos::*;
use tween::audio::format_clock;
use tween::models::{Sender, UiKind, UiMessage};

use super::loading::TypingDots;

/// Chat bubble for a single UI message
#[component]
pub fn MessageBubble(message: UiMessage) -> impl IntoView {
    let from_user = message.sender == Sender::User;
    let time = message.timestamp.format("%H:%M").to_string();

    let row_class = if from_user {
        "flex justify-end"
    } else {
        "flex justify-start"
    };
    let bubble_class = if from_user {
        "max-w-md rounded-2xl rounded-br-sm bg-blue-600 text-white px-4 py-3 shadow"
    } else {
        "max-w-md rounded-2xl rounded-bl-sm bg-white text-gray-900 px-4 py-3 shadow"
    };
    let time_class = if from_user {
        "text-xs text-blue-100 mt-1 text-right"
    } else {
        "text-xs text-gray-400 mt-1"
    };

    let body = match message.kind {
        UiKind::Text => view! {
            <p class="whitespace-pre-wrap break-words">{message.content}</p>
        }
        .into_view(),
        UiKind::Video => view! {
            <div class="space-y-1">
                <video
                    src=message.content
                    controls=true
                    playsinline=true
                    class="w-72 rounded-lg bg-black"
                />
                {message.duration_secs.map(|secs| view! {
                    <span class="text-xs text-gray-500">{format_clock(secs)}</span>
                })}
            </div>
        }
        .into_view(),
        UiKind::Voice => view! {
            <audio src=message.content controls=true class="w-64" />
        }
        .into_view(),
        UiKind::Loading => view! {
            <div class="flex items-center space-x-3 text-gray-500">
                <TypingDots />
                <span class="text-sm">{message.content}</span>
            </div>
        }
        .into_view(),
    };

    view! {
        <div class=row_class>
            <div class=bubble_class>
                {body}
                <div class=time_class>
                    {time}
                </div>
            </div>
        </div>
    }
}
