use crate::config::Config;
use crate::models::SearchCriteria;
use crate::pages::{self, SearchEcho};
use crate::region::Region;
use crate::tmdb::{TmdbApi, TmdbClient};
use anyhow::Result;
use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Form, Path, Query, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{debug, info};

const MAX_FORM_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub tmdb: Arc<dyn TmdbApi>,
    pub default_region: Region,
}

pub async fn run_server(config: Config) -> Result<()> {
    let tmdb: Arc<dyn TmdbApi> = Arc::new(TmdbClient::new(&config)?);
    info!(
        "Using TMDB at {} (language {}, default region {})",
        config.tmdb_base_url, config.language, config.default_region
    );

    let state = AppState {
        tmdb,
        default_region: config.default_region,
    };
    let app = build_router(state);

    info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", post(search))
        .route("/movie/:id", get(movie_detail))
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(MAX_FORM_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let genres = state.tmdb.genres().await;
    Html(pages::index_page(&genres))
}

/// Accepts both naming conventions the search form has used.
#[derive(Debug, Default, Deserialize)]
struct SearchForm {
    title: Option<String>,
    query: Option<String>,
    genre_id: Option<String>,
    genre: Option<String>,
    year: Option<String>,
}

impl SearchForm {
    fn title(&self) -> Option<&str> {
        non_blank(self.title.as_deref()).or_else(|| non_blank(self.query.as_deref()))
    }

    fn genre(&self) -> Option<&str> {
        non_blank(self.genre_id.as_deref()).or_else(|| non_blank(self.genre.as_deref()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A form that cannot be read is treated as an empty search.
async fn search(
    State(state): State<AppState>,
    form: Result<Form<SearchForm>, FormRejection>,
) -> Html<String> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(e) => {
            debug!("Unreadable search form, showing popular titles: {}", e);
            SearchForm::default()
        }
    };
    let criteria = SearchCriteria::from_form(form.title(), form.genre(), form.year.as_deref());
    debug!(?criteria, "Search request");

    let movies_fut = async {
        if criteria.is_empty() {
            state.tmdb.discover_movies(None, None).await
        } else {
            state.tmdb.search_movies(&criteria).await
        }
    };
    let (genres, movies) = tokio::join!(state.tmdb.genres(), movies_fut);
    info!("Search {:?} -> {} movies", criteria, movies.len());

    let echo = SearchEcho {
        query: form.title().unwrap_or_default().to_string(),
        selected_genre: criteria.genre_id,
        selected_year: non_blank(form.year.as_deref())
            .unwrap_or_default()
            .to_string(),
    };
    Html(pages::results_page(&movies, &genres, &echo))
}

#[derive(Debug, Default, Deserialize)]
struct DetailQuery {
    region: Option<String>,
}

async fn movie_detail(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    query: Result<Query<DetailQuery>, QueryRejection>,
) -> Response {
    let Some(id) = raw_id.parse::<i64>().ok().filter(|id| *id > 0) else {
        debug!("Rejecting non-numeric movie id '{}'", raw_id);
        return not_found();
    };

    let query = match query {
        Ok(Query(query)) => query,
        Err(e) => {
            debug!("Unreadable query string, using default region: {}", e);
            DetailQuery::default()
        }
    };
    let region = Region::resolve(query.region.as_deref(), state.default_region);
    if let Some(raw) = query.region.as_deref() {
        if Region::parse(raw).is_none() {
            debug!("Unsupported region '{}', using {}", raw, region);
        }
    }

    let (detail, similar) = tokio::join!(
        state.tmdb.movie_detail(id, region),
        state.tmdb.similar_movies(id)
    );
    let Some(detail) = detail else {
        return not_found();
    };

    info!(
        "Rendering movie {} '{}' for region {}",
        id, detail.summary.title, region
    );
    Html(pages::detail_page(&detail, &similar)).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(pages::not_found_page())).into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
