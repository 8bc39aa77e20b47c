use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    serve, Form, Json, Router,
};
use minijinja::Environment;
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::constants::{INPUT_PLACEHOLDER, LOADING_TEXT};
use crate::conversation::{ConversationSnapshot, SharedConversation};
use crate::exchange::{HttpReadingClient, ReadingTransport};

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

// Shared application state. One conversation per server process.
struct AppState<T> {
    templates: Arc<Environment<'static>>,
    conversation: SharedConversation,
    transport: Arc<T>,
}

// Derived Clone would require T: Clone.
impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            templates: self.templates.clone(),
            conversation: self.conversation.clone(),
            transport: self.transport.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SendForm {
    #[serde(default)]
    message: String,
}

fn create_minijinja_env() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    // The .html name turns on auto-escaping, so replies render as literal text.
    env.add_template("index.html", INDEX_TEMPLATE)
        .context("Failed to load index template")?;
    Ok(env)
}

fn render_index(env: &Environment<'static>, snapshot: &ConversationSnapshot) -> Result<String, minijinja::Error> {
    let tmpl = env.get_template("index.html")?;
    tmpl.render(minijinja::context! {
        title => "네로의 타로 상담소",
        messages => &snapshot.messages,
        waiting => snapshot.waiting,
        loading_text => LOADING_TEXT,
        placeholder => INPUT_PLACEHOLDER,
    })
}

async fn index_handler<T>(State(state): State<AppState<T>>) -> impl IntoResponse {
    let snapshot = state.conversation.snapshot();
    match render_index(&state.templates, &snapshot) {
        Ok(page) => Ok(Html(page)),
        Err(e) => {
            error!("Failed to render index template: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("Internal Server Error: {}", e)),
            ))
        }
    }
}

// Both the send button and Enter in the text field post here. The reading
// runs on its own task; the redirected page shows the loading line and
// refreshes until it lands.
async fn send_handler<T>(State(state): State<AppState<T>>, Form(form): Form<SendForm>) -> Redirect
where
    T: ReadingTransport + Send + Sync + 'static,
{
    let submitted = state
        .conversation
        .submit_text_in_background(form.message, state.transport.clone());
    if submitted.is_none() {
        info!("Submission dropped (blank or a reading is in flight)");
    }
    Redirect::to("/")
}

async fn conversation_handler<T>(State(state): State<AppState<T>>) -> Json<ConversationSnapshot> {
    Json(state.conversation.snapshot())
}

/// Builds the widget's router around an existing conversation.
pub fn app_router<T>(conversation: SharedConversation, transport: Arc<T>) -> Result<Router>
where
    T: ReadingTransport + Send + Sync + 'static,
{
    let templates = create_minijinja_env().context("Failed to initialize template engine")?;
    let state = AppState {
        templates: Arc::new(templates),
        conversation,
        transport,
    };

    let app = Router::new()
        .route("/", get(index_handler::<T>))
        .route("/send", post(send_handler::<T>))
        .route("/api/conversation", get(conversation_handler::<T>))
        .with_state(state)
        .layer(TraceLayer::new_for_http()); // Add request logging

    Ok(app)
}

pub async fn start_web_server(port: u16, config: &Config) -> Result<()> {
    let transport = Arc::new(HttpReadingClient::new(config));
    let app = app_router(SharedConversation::new(), transport)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(endpoint = %config.endpoint, "Web widget listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Conversation, Message};

    fn snapshot_of(conversation: &Conversation) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: conversation.messages().to_vec(),
            waiting: conversation.is_waiting(),
        }
    }

    #[test]
    fn test_index_lists_greetings_without_loading() {
        let env = create_minijinja_env().unwrap();
        let page = render_index(&env, &snapshot_of(&Conversation::new())).unwrap();
        assert!(page.contains("안냥! 고양이 타로 상담사 네로다냥"));
        assert!(page.contains(INPUT_PLACEHOLDER));
        assert!(!page.contains(LOADING_TEXT));
        assert!(!page.contains("disabled"));
    }

    #[test]
    fn test_index_shows_loading_after_last_message() {
        let env = create_minijinja_env().unwrap();
        let mut conversation = Conversation::new();
        conversation.update_draft("hello");
        let _pending = conversation.begin_submit().unwrap();

        let page = render_index(&env, &snapshot_of(&conversation)).unwrap();
        let question = page.find("hello").unwrap();
        let loading = page.find(LOADING_TEXT).unwrap();
        assert!(question < loading);
        assert!(page.contains("disabled"));
    }

    #[test]
    fn test_index_escapes_reply_text() {
        let env = create_minijinja_env().unwrap();
        let snapshot = ConversationSnapshot {
            messages: vec![Message::cat("<b>카드</b>")],
            waiting: false,
        };
        let page = render_index(&env, &snapshot).unwrap();
        assert!(page.contains("&lt;b&gt;카드&lt;/b&gt;"));
        assert!(!page.contains("<b>카드</b>"));
    }
}
