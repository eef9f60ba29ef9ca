//! Loading Component
//!
//! Loading spinners and skeleton states.

use leptos::*;

/// Full-page loading spinner
#[component]
pub fn Loading() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center py-12">
            <div class="loading-spinner w-8 h-8" />
        </div>
    }
}

/// Inline loading spinner
#[component]
pub fn InlineLoading() -> impl IntoView {
    view! {
        <span class="inline-block loading-spinner w-4 h-4" />
    }
}

/// Skeleton loader for list items
#[component]
pub fn ListSkeleton(
    #[prop(default = 3)]
    count: usize,
) -> impl IntoView {
    view! {
        <div class="space-y-3 animate-pulse">
            {(0..count).map(|_| view! {
                <div class="bg-gray-200 rounded h-14" />
            }).collect_view()}
        </div>
    }
}

/// Three bouncing dots shown while a reply renders
#[component]
pub fn TypingDots() -> impl IntoView {
    view! {
        <span class="inline-flex space-x-1">
            <span class="w-2 h-2 bg-blue-400 rounded-full animate-bounce" />
            <span class="w-2 h-2 bg-blue-400 rounded-full animate-bounce [animation-delay:150ms]" />
            <span class="w-2 h-2 bg-blue-400 rounded-full animate-bounce [animation-delay:300ms]" />
        </span>
    }
}
