//! App Root Component
//!
//! Main application component with routing and global providers.

use leptos::*;
use leptos_router::*;

use crate::components::Toast;
use crate::pages::{AuthPage, MainPage};
use crate::state::provide_global_state;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    // Provide global state to all components
    provide_global_state();

    view! {
        <Router>
            <Routes>
                <Route path="/" view=MainPage />
                <Route path="/auth" view=AuthPage />
                <Route path="/*any" view=NotFound />
            </Routes>

            // Toast notifications
            <Toast />
        </Router>
    }
}

/// 404 Not Found page
#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="flex flex-col items-center justify-center min-h-screen text-center bg-gray-50">
            <div class="text-6xl mb-4">"🔍"</div>
            <h1 class="text-3xl font-bold text-gray-900 mb-2">"Page Not Found"</h1>
            <p class="text-gray-500 mb-6">"The page you're looking for doesn't exist."</p>
            <A
                href="/"
                class="px-6 py-3 bg-blue-600 hover:bg-blue-700 text-white rounded-lg font-medium transition-colors"
            >
                "Back to chats"
            </A>
        </div>
    }
}
