//! Message Input Component
//!
//! Text area with send button and optional dictation.

use leptos::*;
use tween::audio::{SpeechSettings, SpeechToText};

use crate::media::BrowserSpeech;
use crate::state::global::GlobalState;

/// Chat composer; Enter sends, Shift+Enter adds a line
#[component]
pub fn MessageInput(
    #[prop(into)]
    on_send: Callback<String>,
    #[prop(into)]
    disabled: Signal<bool>,
) -> impl IntoView {
    let state = expect_context::<GlobalState>();

    let (text, set_text) = create_signal(String::new());
    let (listening, set_listening) = create_signal(false);
    let speech_supported = BrowserSpeech.is_supported();
    let lang = state.config.recording.speech_lang.clone();

    let submit = move || {
        let value = text.get_untracked();
        if value.trim().is_empty() || disabled.get_untracked() {
            return;
        }
        on_send.call(value);
        set_text.set(String::new());
    };

    let on_keydown = move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            submit();
        }
    };

    let dictate = move |_: web_sys::MouseEvent| {
        if listening.get_untracked() {
            return;
        }
        set_listening.set(true);

        let result = BrowserSpeech.listen(
            &SpeechSettings::single_utterance(&lang),
            Box::new(move |transcript| {
                if !transcript.is_empty() {
                    set_text.update(|t| {
                        if !t.is_empty() {
                            t.push(' ');
                        }
                        t.push_str(&transcript);
                    });
                }
                set_listening.set(false);
            }),
        );

        if let Err(e) = result {
            set_listening.set(false);
            state.show_error(&e.to_string());
        }
    };

    view! {
        <div class="border-t border-gray-200 bg-white p-4">
            <div class="flex items-end space-x-2">
                <textarea
                    rows="1"
                    placeholder="Type a message..."
                    class="flex-1 resize-none rounded-xl border border-gray-300 px-4 py-3
                           focus:outline-none focus:ring-2 focus:ring-blue-500"
                    prop:value=text
                    prop:disabled=move || disabled.get()
                    on:input=move |ev| set_text.set(event_target_value(&ev))
                    on:keydown=on_keydown
                />

                {speech_supported.then(|| view! {
                    <button
                        type="button"
                        title="Dictate"
                        on:click=dictate
                        class=move || {
                            let base = "rounded-full w-12 h-12 flex items-center justify-center transition-colors";
                            if listening.get() {
                                format!("{} bg-red-500 text-white animate-pulse", base)
                            } else {
                                format!("{} bg-gray-100 text-gray-600 hover:bg-gray-200", base)
                            }
                        }
                    >
                        "🎤"
                    </button>
                })}

                <button
                    type="button"
                    on:click=move |_| submit()
                    disabled=move || disabled.get() || text.get().trim().is_empty()
                    class="rounded-full w-12 h-12 bg-blue-600 hover:bg-blue-700 text-white
                           disabled:bg-gray-300 disabled:cursor-not-allowed transition-colors"
                >
                    "➤"
                </button>
            </div>
        </div>
    }
}
