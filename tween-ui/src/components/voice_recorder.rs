//! Voice Recorder Component
//!
//! Records a voice sample from the microphone with a live waveform and a
//! clock that stops at the configured ceiling.

use gloo_timers::callback::Interval;
use leptos::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, CanvasRenderingContext2d, HtmlCanvasElement};

use tween::audio::waveform::{FRAME_BACKGROUND, GRADIENT_STOPS, IDLE_BACKGROUND};
use tween::audio::{format_clock, start_capture, CaptureSettings, VoiceRecorder, WaveFrame};

use crate::media::{BrowserCapture, WebMicrophone};
use crate::state::global::GlobalState;

const CANVAS_WIDTH: u32 = 400;
const CANVAS_HEIGHT: u32 = 96;

/// Recorder plus the browser timers driving it
struct Runtime {
    recorder: RefCell<VoiceRecorder<BrowserCapture>>,
    ticker: RefCell<Option<Interval>>,
    animation: RefCell<Option<Closure<dyn FnMut()>>>,
    animation_id: Cell<Option<i32>>,
}

impl Runtime {
    fn new(max_seconds: u32) -> Self {
        Self {
            recorder: RefCell::new(VoiceRecorder::new(max_seconds)),
            ticker: RefCell::new(None),
            animation: RefCell::new(None),
            animation_id: Cell::new(None),
        }
    }

    /// Stop the capture and both timers
    fn halt(&self) -> bool {
        self.ticker.borrow_mut().take();
        if let Some(id) = self.animation_id.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
        self.animation.borrow_mut().take();
        self.recorder.borrow_mut().stop()
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
}

fn draw_frame(canvas: &HtmlCanvasElement, frame: &WaveFrame) {
    let Some(ctx) = context_2d(canvas) else {
        return;
    };
    let width = canvas.width() as f64;
    let height = canvas.height() as f64;

    ctx.set_fill_style(&FRAME_BACKGROUND.into());
    ctx.fill_rect(0.0, 0.0, width, height);

    let gradient = ctx.create_linear_gradient(0.0, 0.0, 0.0, height);
    for (offset, color) in GRADIENT_STOPS {
        let _ = gradient.add_color_stop(offset as f32, color);
    }
    ctx.set_fill_style(gradient.as_ref());

    for bar in &frame.bars {
        ctx.fill_rect(bar.x, bar.y, bar.width, bar.height);
    }
}

fn clear_canvas(canvas: &HtmlCanvasElement) {
    if let Some(ctx) = context_2d(canvas) {
        ctx.set_fill_style(&IDLE_BACKGROUND.into());
        ctx.fill_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
    }
}

fn request_frame(runtime: &Runtime) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Some(callback) = runtime.animation.borrow().as_ref() {
        match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(id) => runtime.animation_id.set(Some(id)),
            Err(_) => runtime.animation_id.set(None),
        }
    }
}

#[component]
pub fn VoiceRecorderPanel(
    #[prop(into)]
    on_recorded: Callback<Blob>,
) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let max_seconds = state.config.recording.max_seconds;

    let canvas_ref = create_node_ref::<html::Canvas>();
    let recording = create_rw_signal(false);
    let audible = create_rw_signal(false);
    let clock = create_rw_signal(format_clock(0));
    let runtime = Rc::new(Runtime::new(max_seconds));
    let alive = Rc::new(Cell::new(true));

    let finish = {
        let runtime = Rc::clone(&runtime);
        move || {
            if runtime.halt() {
                web_sys::console::log_1(&"Voice recording stopped".into());
            }
            recording.set(false);
            audible.set(false);
            if let Some(canvas) = canvas_ref.get_untracked() {
                clear_canvas(&canvas);
            }
        }
    };

    create_effect(move |_| {
        if let Some(canvas) = canvas_ref.get() {
            clear_canvas(&canvas);
        }
    });

    let runtime_for_start = Rc::clone(&runtime);
    let alive_for_start = Rc::clone(&alive);
    let finish_for_start = finish.clone();
    let start = move |_: web_sys::MouseEvent| {
        if runtime_for_start.recorder.borrow().is_recording() {
            return;
        }
        let runtime = Rc::clone(&runtime_for_start);
        let alive = Rc::clone(&alive_for_start);
        let finish = finish_for_start.clone();
        let state = state.clone();
        let settings = CaptureSettings::from(&state.config.recording);

        spawn_local(async move {
            let alive_for_clip = Rc::clone(&alive);
            let microphone = WebMicrophone::new(move |blob| {
                if alive_for_clip.get() {
                    on_recorded.call(blob);
                }
            });

            let Some(capture) = start_capture(&microphone, &settings).await else {
                state.show_error("Could not access the microphone. Check the browser permissions.");
                return;
            };
            if !alive.get() {
                return;
            }

            runtime.recorder.borrow_mut().begin(capture);
            recording.set(true);
            clock.set(runtime.recorder.borrow().clock_label());

            let runtime_for_tick = Rc::clone(&runtime);
            let finish_for_tick = finish.clone();
            let ticker = Interval::new(1_000, move || {
                let limit_reached = runtime_for_tick.recorder.borrow_mut().tick_second();
                clock.set(runtime_for_tick.recorder.borrow().clock_label());
                if limit_reached {
                    // Drop the interval outside its own callback
                    let finish = finish_for_tick.clone();
                    spawn_local(async move { finish() });
                }
            });
            *runtime.ticker.borrow_mut() = Some(ticker);

            let runtime_for_frame = Rc::clone(&runtime);
            *runtime.animation.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                let Some(canvas) = canvas_ref.get_untracked() else {
                    return;
                };
                let frame = runtime_for_frame
                    .recorder
                    .borrow_mut()
                    .frame(canvas.width() as f64, canvas.height() as f64);
                match frame {
                    Some(frame) => {
                        if audible.get_untracked() != frame.has_audio {
                            audible.set(frame.has_audio);
                        }
                        draw_frame(&canvas, &frame);
                        request_frame(&runtime_for_frame);
                    }
                    None => runtime_for_frame.animation_id.set(None),
                }
            }) as Box<dyn FnMut()>));
            request_frame(&runtime);

            web_sys::console::log_1(&"Voice recording started".into());
        });
    };

    let finish_for_stop = finish.clone();
    let stop = move |_: web_sys::MouseEvent| finish_for_stop();

    on_cleanup(move || {
        alive.set(false);
        runtime.halt();
    });

    view! {
        <div class="space-y-3">
            <canvas
                node_ref=canvas_ref
                width=CANVAS_WIDTH.to_string()
                height=CANVAS_HEIGHT.to_string()
                class="w-full h-24 rounded-lg border border-gray-200"
            />

            <div class="flex items-center justify-between">
                <span class="font-mono text-sm text-gray-600">
                    {move || format!("{} / {}", clock.get(), format_clock(max_seconds))}
                </span>
                {move || {
                    if recording.get() && !audible.get() {
                        view! { <span class="text-xs text-gray-400">"Speak into the microphone"</span> }.into_view()
                    } else {
                        view! {}.into_view()
                    }
                }}
            </div>

            {move || {
                if recording.get() {
                    view! {
                        <button
                            type="button"
                            on:click=stop.clone()
                            class="w-full px-4 py-2 bg-red-600 hover:bg-red-700 text-white rounded-lg transition-colors"
                        >
                            "■ Stop recording"
                        </button>
                    }.into_view()
                } else {
                    view! {
                        <button
                            type="button"
                            on:click=start.clone()
                            class="w-full px-4 py-2 bg-blue-600 hover:bg-blue-700 text-white rounded-lg transition-colors"
                        >
                            "● Start recording"
                        </button>
                    }.into_view()
                }
            }}
        </div>
    }
}
