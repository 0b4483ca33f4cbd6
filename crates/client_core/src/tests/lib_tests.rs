use super::*;
use axum::{extract::State, http::HeaderMap, routing::post, Router};
use serde_json::Value;
use tokio::{net::TcpListener, sync::Mutex};
use url::Url;

#[derive(Debug, Clone)]
struct ReceivedUpdate {
    content_type: Option<String>,
    csrf_token: Option<String>,
    body: String,
}

#[derive(Clone)]
struct ServerState {
    received: Arc<Mutex<Vec<ReceivedUpdate>>>,
    reply: &'static str,
}

async fn handle_update_item(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: String,
) -> ([(axum::http::header::HeaderName, &'static str); 1], &'static str) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.received.lock().await.push(ReceivedUpdate {
        content_type: header("content-type"),
        csrf_token: header("x-csrftoken"),
        body,
    });
    (
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        state.reply,
    )
}

async fn spawn_shop_server(
    reply: &'static str,
) -> anyhow::Result<(String, Arc<Mutex<Vec<ReceivedUpdate>>>)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = ServerState {
        received: received.clone(),
        reply,
    };
    let app = Router::new()
        .route("/update_item/", post(handle_update_item))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), received))
}

fn settings_for(base_url: String, user: &str) -> ClientSettings {
    ClientSettings {
        base_url,
        csrf_token: "csrf-from-page".into(),
        session_user: user.into(),
        ..ClientSettings::default()
    }
}

fn shop_navigator() -> Arc<InMemoryNavigator> {
    Arc::new(InMemoryNavigator::new(
        Url::parse("https://site/shop?category=shoes").expect("url"),
    ))
}

#[tokio::test]
async fn update_cart_posts_json_with_csrf_header() {
    let (base_url, received) = spawn_shop_server("\"added\"").await.expect("spawn server");
    let navigator = shop_navigator();
    let client = ShopClient::from_settings(&settings_for(base_url, "alice"), navigator.clone())
        .expect("client");
    let page = client.bind_page(vec![ControlDescriptor::update_cart("42", "add")]);

    let outcome = page.click(0).await;
    let response = match outcome.cart {
        Some(Ok(DispatchOutcome::Reloaded { response })) => response,
        other => panic!("unexpected outcome: {other:?}"),
    };
    assert_eq!(response, Value::String("added".into()));

    let received = received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].body, r#"{"productId":"42","action":"add"}"#);
    assert_eq!(
        received[0].content_type.as_deref(),
        Some("application/json")
    );
    assert_eq!(received[0].csrf_token.as_deref(), Some("csrf-from-page"));
    assert_eq!(navigator.reload_count(), 1);
}

#[tokio::test]
async fn anonymous_session_never_reaches_server() {
    let (base_url, received) = spawn_shop_server("\"added\"").await.expect("spawn server");
    let navigator = shop_navigator();
    let client =
        ShopClient::from_settings(&settings_for(base_url, "AnonymousUser"), navigator.clone())
            .expect("client");

    let outcome = client
        .dispatcher()
        .handle_click(&ControlDescriptor::update_cart("42", "add"))
        .await
        .expect("dispatch");

    assert_eq!(outcome, DispatchOutcome::SkippedAnonymous);
    assert!(received.lock().await.is_empty());
    assert_eq!(navigator.reload_count(), 0);
}

#[tokio::test]
async fn html_error_page_reaches_error_callback_without_reload() {
    let (base_url, received) = spawn_shop_server("<h1>Server Error (500)</h1>")
        .await
        .expect("spawn server");
    let navigator = shop_navigator();
    let errors = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = errors.clone();
    let settings = settings_for(base_url, "alice");
    let transport = Arc::new(HttpCartTransport::new(
        settings.update_item_url().expect("url"),
    ));
    let client = ShopClient::new(
        &settings,
        transport,
        navigator.clone(),
        Arc::new(move |err: &DispatchError| {
            sink.lock().expect("lock").push(err.to_string());
        }),
    );

    let result = client
        .dispatcher()
        .handle_click(&ControlDescriptor::update_cart("42", "add"))
        .await;

    assert!(matches!(result, Err(DispatchError::InvalidResponse(_))));
    assert_eq!(received.lock().await.len(), 1);
    assert_eq!(navigator.reload_count(), 0);
    assert_eq!(errors.lock().expect("lock").len(), 1);
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let navigator = shop_navigator();
    let client = ShopClient::from_settings(
        &settings_for(format!("http://{addr}"), "alice"),
        navigator.clone(),
    )
    .expect("client");

    let err = client
        .dispatcher()
        .update_user_order(
            shared::domain::ProductId::new("42"),
            shared::domain::CartAction::Add,
        )
        .await
        .expect_err("must fail");

    assert!(matches!(err, DispatchError::Transport(_)));
    assert_eq!(navigator.reload_count(), 0);
}

#[tokio::test]
async fn sort_through_client_uses_current_page() {
    let navigator = shop_navigator();
    let client = ShopClient::from_settings(
        &settings_for("http://127.0.0.1:8000".into(), "alice"),
        navigator.clone(),
    )
    .expect("client");

    let next = client
        .sorter()
        .update_sort_value(&shared::domain::SortValue::new("price_desc"));
    assert_eq!(
        next.as_str(),
        "https://site/shop?category=shoes&sort=price_desc"
    );
    assert_eq!(navigator.current_url(), next);
}
