//! Persona Setup Modal
//!
//! Four-step wizard that turns a draft into a server chat: settings, photo,
//! voice sample, confirmation.

use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, File, HtmlInputElement};

use tween::models::Status;
use tween::persona::{create_persona, PersonaSetup, SetupStep};
use tween::resources::EntryKey;

use crate::api::WebUpload;
use crate::components::loading::InlineLoading;
use crate::components::voice_recorder::VoiceRecorderPanel;
use crate::state::global::GlobalState;

type Setup = PersonaSetup<WebUpload>;

/// First file picked in a file input
fn picked_file(ev: &ev::Event) -> Option<File> {
    ev.target()
        .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
        .and_then(|input| input.files())
        .and_then(|files| files.get(0))
}

/// Object URL that is revoked when replaced or when the owner unmounts
fn preview_signal() -> RwSignal<Option<String>> {
    let preview = create_rw_signal(None::<String>);
    on_cleanup(move || {
        if let Some(url) = preview.get_untracked() {
            let _ = web_sys::Url::revoke_object_url(&url);
        }
    });
    preview
}

fn replace_preview(preview: RwSignal<Option<String>>, upload: &WebUpload) {
    if let Some(old) = preview.get_untracked() {
        let _ = web_sys::Url::revoke_object_url(&old);
    }
    preview.set(upload.preview_url());
}

#[component]
pub fn SetupModal(draft_id: String) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let setup = create_rw_signal(Setup::new());
    let submitting = create_rw_signal(false);
    let step = create_memo(move |_| setup.with(|s| s.step()));

    let on_next = move |_: web_sys::MouseEvent| {
        setup.update(|s| {
            s.next();
        });
    };
    let on_back = move |_: web_sys::MouseEvent| {
        setup.update(|s| {
            s.back();
        });
    };

    let draft_for_cancel = draft_id.clone();
    let state_for_cancel = state.clone();
    let on_cancel = move |_: web_sys::MouseEvent| {
        state_for_cancel.chats.update(|store| {
            store.remove_draft(&draft_for_cancel);
        });
        state_for_cancel.selected.set(None);
    };

    let on_create = move |_: web_sys::MouseEvent| {
        if submitting.get_untracked() {
            return;
        }
        let new_chat = match setup.get_untracked().finish() {
            Ok(new_chat) => new_chat,
            Err(e) => {
                state.show_error(&e.to_string());
                return;
            }
        };

        submitting.set(true);
        let state = state.clone();
        let draft_id = draft_id.clone();
        spawn_local(async move {
            match create_persona(&*state.api, new_chat).await {
                Ok(chat) => {
                    let chat_id = chat.id;
                    let status = chat.status;
                    state.chats.update(|store| store.complete_draft(&draft_id, chat));
                    state.selected.set(Some(EntryKey::Chat(chat_id)));

                    match status {
                        Status::Processing => {
                            state.show_success(status.chat_banner());
                            state.watch_chat_ready(chat_id);
                        }
                        Status::Completed => state.show_success("Chat created"),
                        Status::Error => state.show_error(status.chat_banner()),
                    }
                }
                Err(e) => {
                    submitting.set(false);
                    state.show_error(&format!("Failed to create chat: {}", e));
                }
            }
        });
    };

    view! {
        <div class="fixed inset-0 bg-black/40 flex items-center justify-center z-40">
            <div class="bg-white rounded-2xl shadow-xl w-full max-w-lg p-6">
                <div class="flex items-center justify-between mb-6">
                    <h2 class="text-xl font-semibold text-gray-900">"Create your Digital Tween"</h2>
                    <button on:click=on_cancel class="text-gray-400 hover:text-gray-600" title="Cancel">
                        "✕"
                    </button>
                </div>

                <StepIndicator step=step />

                <div class="min-h-[220px] mt-6">
                    {move || match step.get() {
                        SetupStep::Settings => view! { <SettingsStep setup=setup /> }.into_view(),
                        SetupStep::Photo => view! { <PhotoStep setup=setup /> }.into_view(),
                        SetupStep::Voice => view! { <VoiceStep setup=setup /> }.into_view(),
                        SetupStep::Done => view! { <Summary setup=setup /> }.into_view(),
                    }}
                </div>

                <div class="flex justify-between mt-6">
                    <button
                        on:click=on_back
                        disabled=move || step.get() == SetupStep::Settings || submitting.get()
                        class="px-4 py-2 text-gray-600 hover:bg-gray-100 rounded-lg disabled:opacity-40"
                    >
                        "Back"
                    </button>

                    {move || {
                        if step.get() == SetupStep::Done {
                            view! {
                                <button
                                    on:click=on_create.clone()
                                    disabled=move || submitting.get()
                                    class="px-6 py-2 bg-blue-600 hover:bg-blue-700 text-white rounded-lg disabled:bg-gray-300"
                                >
                                    {move || if submitting.get() {
                                        view! { <InlineLoading /> " Creating..." }.into_view()
                                    } else {
                                        "Create chat".into_view()
                                    }}
                                </button>
                            }.into_view()
                        } else {
                            view! {
                                <button
                                    on:click=on_next
                                    disabled=move || !setup.with(|s| s.is_step_complete())
                                    class="px-6 py-2 bg-blue-600 hover:bg-blue-700 text-white rounded-lg disabled:bg-gray-300"
                                >
                                    "Next"
                                </button>
                            }.into_view()
                        }
                    }}
                </div>
            </div>
        </div>
    }
}

/// Numbered steps with the current one highlighted
#[component]
fn StepIndicator(#[prop(into)] step: Signal<SetupStep>) -> impl IntoView {
    view! {
        <div class="flex items-center justify-between">
            {SetupStep::ALL
                .into_iter()
                .map(|s| {
                    let circle_class = move || {
                        let current = step.get();
                        if s == current {
                            "w-8 h-8 rounded-full flex items-center justify-center text-sm bg-blue-600 text-white"
                        } else if s.number() < current.number() {
                            "w-8 h-8 rounded-full flex items-center justify-center text-sm bg-green-500 text-white"
                        } else {
                            "w-8 h-8 rounded-full flex items-center justify-center text-sm bg-gray-200 text-gray-500"
                        }
                    };
                    view! {
                        <div class="flex flex-col items-center flex-1">
                            <div class=circle_class>{s.number()}</div>
                            <span class="text-xs text-gray-500 mt-1">{s.title()}</span>
                        </div>
                    }
                })
                .collect_view()}
        </div>
    }
}

#[component]
fn SettingsStep(setup: RwSignal<Setup>) -> impl IntoView {
    view! {
        <div class="space-y-4">
            <div>
                <label class="block text-sm font-medium text-gray-700 mb-1">"Name"</label>
                <input
                    type="text"
                    placeholder="Who is this persona?"
                    class="w-full px-4 py-2 border border-gray-300 rounded-lg focus:outline-none focus:ring-2 focus:ring-blue-500"
                    prop:value=move || setup.with(|s| s.name.clone())
                    on:input=move |ev| setup.update(|s| s.name = event_target_value(&ev))
                />
            </div>
            <div>
                <label class="block text-sm font-medium text-gray-700 mb-1">"Description (optional)"</label>
                <textarea
                    rows="3"
                    placeholder="A few words about them"
                    class="w-full px-4 py-2 border border-gray-300 rounded-lg focus:outline-none focus:ring-2 focus:ring-blue-500"
                    prop:value=move || setup.with(|s| s.description.clone())
                    on:input=move |ev| setup.update(|s| s.description = event_target_value(&ev))
                />
            </div>
        </div>
    }
}

#[component]
fn PhotoStep(setup: RwSignal<Setup>) -> impl IntoView {
    let preview = preview_signal();
    if let Some(photo) = setup.with_untracked(|s| s.photo.clone()) {
        replace_preview(preview, &photo);
    }

    let on_change = move |ev: ev::Event| {
        if let Some(file) = picked_file(&ev) {
            let upload = WebUpload::from_file(file);
            replace_preview(preview, &upload);
            setup.update(|s| s.photo = Some(upload));
        }
    };

    view! {
        <div class="flex flex-col items-center space-y-4">
            {move || match preview.get() {
                Some(url) => view! {
                    <img src=url alt="Persona photo" class="w-40 h-40 rounded-full object-cover shadow" />
                }.into_view(),
                None => view! {
                    <div class="w-40 h-40 rounded-full bg-gray-100 flex items-center justify-center text-4xl text-gray-300">
                        "📷"
                    </div>
                }.into_view(),
            }}
            <label class="px-4 py-2 bg-gray-100 hover:bg-gray-200 rounded-lg cursor-pointer text-sm">
                "Choose photo"
                <input type="file" accept="image/*" class="hidden" on:change=on_change />
            </label>
        </div>
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VoiceSource {
    Record,
    Upload,
}

#[component]
fn VoiceStep(setup: RwSignal<Setup>) -> impl IntoView {
    let source = create_rw_signal(VoiceSource::Record);
    let preview = preview_signal();
    if let Some(voice) = setup.with_untracked(|s| s.voice.clone()) {
        replace_preview(preview, &voice);
    }

    let use_voice = move |upload: WebUpload| {
        replace_preview(preview, &upload);
        setup.update(|s| s.voice = Some(upload));
    };

    let on_recorded = Callback::new(move |blob: Blob| use_voice(WebUpload::recording(blob)));

    let on_change = move |ev: ev::Event| {
        if let Some(file) = picked_file(&ev) {
            use_voice(WebUpload::from_file(file));
        }
    };

    let tab_class = move |tab: VoiceSource| {
        move || {
            if source.get() == tab {
                "flex-1 py-2 text-sm rounded-lg bg-blue-600 text-white"
            } else {
                "flex-1 py-2 text-sm rounded-lg bg-gray-100 text-gray-600 hover:bg-gray-200"
            }
        }
    };

    view! {
        <div class="space-y-4">
            <div class="flex space-x-2">
                <button type="button" class=tab_class(VoiceSource::Record) on:click=move |_| source.set(VoiceSource::Record)>
                    "Record"
                </button>
                <button type="button" class=tab_class(VoiceSource::Upload) on:click=move |_| source.set(VoiceSource::Upload)>
                    "Upload file"
                </button>
            </div>

            {move || match source.get() {
                VoiceSource::Record => view! { <VoiceRecorderPanel on_recorded=on_recorded /> }.into_view(),
                VoiceSource::Upload => view! {
                    <label class="block w-full px-4 py-6 border-2 border-dashed border-gray-300 rounded-lg text-center cursor-pointer hover:border-blue-400">
                        <span class="text-sm text-gray-600">"Choose an audio file"</span>
                        <input type="file" accept="audio/*" class="hidden" on:change=on_change />
                    </label>
                }.into_view(),
            }}

            {move || preview.get().map(|url| view! {
                <div class="space-y-1">
                    <p class="text-sm text-green-700">
                        {move || setup.with(|s| s.voice.as_ref().map(|v| format!("Voice sample ready: {}", v.file_name)).unwrap_or_default())}
                    </p>
                    <audio controls src=url class="w-full" />
                </div>
            })}
        </div>
    }
}

#[component]
fn Summary(setup: RwSignal<Setup>) -> impl IntoView {
    let (name, description) = setup.with_untracked(|s| (s.name.trim().to_string(), s.description.trim().to_string()));

    view! {
        <div class="text-center space-y-3">
            <div class="text-5xl">"✨"</div>
            <h3 class="text-lg font-semibold text-gray-900">{name}</h3>
            {(!description.is_empty()).then(move || view! { <p class="text-gray-600">{description}</p> })}
            <p class="text-sm text-gray-500">
                "Photo and voice sample are ready. Creating the chat starts voice cloning, which takes a little while."
            </p>
        </div>
    }
}
