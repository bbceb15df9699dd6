use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use moviescope::config::AppConfig;
use moviescope::server::{self, AppState};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::runtime::Runtime;

/// One request as the stub store received it.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub operation: String,
    pub collection: String,
    pub body: Value,
}

type Responder = Arc<dyn Fn(&SeenRequest) -> (StatusCode, Value) + Send + Sync>;

#[derive(Clone)]
struct StubState {
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    respond: Responder,
}

/// In-process record store on an ephemeral port. Stops when dropped.
pub struct StubStore {
    pub base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    runtime: Runtime,
}

async fn handle(
    State(state): State<StubState>,
    Path((operation, collection)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let request = SeenRequest {
        operation,
        collection,
        body,
    };
    let (status, response) = (state.respond)(&request);
    state.seen.lock().unwrap().push(request);
    (status, Json(response))
}

fn serve_on(runtime: &Runtime, router: Router) -> String {
    let listener = runtime
        .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("local addr");
    runtime.spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{}", addr)
}

impl StubStore {
    pub fn start<F>(respond: F) -> Self
    where
        F: Fn(&SeenRequest) -> (StatusCode, Value) + Send + Sync + 'static,
    {
        let runtime = Runtime::new().expect("tokio runtime");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            seen: seen.clone(),
            respond: Arc::new(respond),
        };
        let router = Router::new()
            .route("/:operation/:collection", post(handle))
            .with_state(state);
        let base_url = serve_on(&runtime, router);
        Self {
            base_url,
            seen,
            runtime,
        }
    }

    /// Store that answers every request with `body` and HTTP 200.
    pub fn replying(body: Value) -> Self {
        Self::start(move |_| (StatusCode::OK, body.clone()))
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    /// Config pointing at this store.
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        config.store.base_url = self.base_url.clone();
        config.store.collection_id = "movies".to_string();
        config.store.timeout_secs = 5;
        config
    }

    /// Serve the moviescope page, backed by this store, on the stub's runtime.
    pub fn start_app(&self) -> String {
        let router = server::router(AppState::new(self.config()));
        serve_on(&self.runtime, router)
    }
}

/// Six movies covering the filter edge cases.
pub fn sample_movies() -> Value {
    json!([
        {"title": "Arrival", "imdbrating": 7.9, "numericrating": 94, "released": "11 Nov 2016",
         "imdbvotes": "612,000", "genre": "Drama, Mystery, Sci-Fi"},
        {"title": "Airplane!", "imdbrating": 7.7, "numericrating": 97, "released": "02 Jul 1980",
         "imdbvotes": 240000, "genre": "Comedy"},
        {"title": "Obscure", "imdbrating": 5.1, "numericrating": 20, "released": "01 Jan 1999",
         "imdbvotes": 10, "genre": "Drama"},
        {"title": "Metropolis", "imdbrating": 8.3, "numericrating": 97, "released": "13 Mar 1927",
         "imdbvotes": 180000, "genre": "Drama, Sci-Fi"},
        {"title": "Unreleased", "imdbrating": 6.0, "numericrating": 50, "released": null,
         "imdbvotes": 5000, "genre": "Drama"},
        {"title": "Heat", "imdbrating": 8.3, "numericrating": 88, "released": "15 Dec 1995",
         "imdbvotes": 690000, "genre": "Action, Crime, Drama"}
    ])
}
