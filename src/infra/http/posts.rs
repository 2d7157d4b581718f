//! Post handlers: list, show, edit/update, new/create, health.
//!
//! Each handler returns exactly one `Response`; errors are converted with
//! `store_error_to_http` at the single exit.

use axum::{
    extract::{Form, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    application::{
        error::{ErrorReport, HttpError},
        posts::PostForm,
    },
    domain::entities::PostRecord,
    presentation::views::{
        EditPostTemplate, IndexTemplate, NewPostTemplate, PostTemplate, PostView,
        render_template_response,
    },
};

use super::{HttpState, store_error_to_http};

const BLOG_TITLE: &str = "Blog";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct IdQuery {
    id: Option<String>,
}

impl IdQuery {
    fn raw(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

pub(super) async fn list_posts(State(state): State<HttpState>) -> Response {
    match state.posts.list_posts().await {
        Ok(mut posts) => {
            sort_for_display(&mut posts);
            let template = IndexTemplate {
                title: BLOG_TITLE,
                posts: posts.into_iter().map(PostView::from).collect(),
            };
            render_template_response(template, StatusCode::OK)
        }
        Err(err) => store_error_to_http("infra::http::list_posts", err).into_response(),
    }
}

pub(super) async fn show_post(
    State(state): State<HttpState>,
    Query(query): Query<IdQuery>,
) -> Response {
    match state.posts.get_post(query.raw()).await {
        Ok(post) => render_template_response(
            PostTemplate {
                post: PostView::from(post),
            },
            StatusCode::OK,
        ),
        Err(err) => store_error_to_http("infra::http::show_post", err).into_response(),
    }
}

pub(super) async fn edit_post(
    State(state): State<HttpState>,
    Query(query): Query<IdQuery>,
) -> Response {
    match state.posts.get_post(query.raw()).await {
        Ok(post) => render_template_response(
            EditPostTemplate {
                post: PostView::from(post),
            },
            StatusCode::OK,
        ),
        Err(err) => store_error_to_http("infra::http::edit_post", err).into_response(),
    }
}

pub(super) async fn update_post(
    State(state): State<HttpState>,
    Form(form): Form<PostForm>,
) -> Response {
    let raw_id = form.id.clone().unwrap_or_default();
    match state.posts.update_post(&raw_id, form).await {
        Ok(post) => render_template_response(
            PostTemplate {
                post: PostView::from(post),
            },
            StatusCode::OK,
        ),
        Err(err) => store_error_to_http("infra::http::update_post", err).into_response(),
    }
}

pub(super) async fn new_post() -> Response {
    render_template_response(NewPostTemplate { title: BLOG_TITLE }, StatusCode::OK)
}

pub(super) async fn create_post(
    State(state): State<HttpState>,
    Form(form): Form<PostForm>,
) -> Response {
    match state.posts.create_post(form).await {
        Ok(post) => Redirect::to(&format!("/post?id={}", post.id)).into_response(),
        Err(err) => store_error_to_http("infra::http::create_post", err).into_response(),
    }
}

pub(super) async fn health(State(state): State<HttpState>) -> Response {
    match state.posts.check_health().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::capture("infra::http::health", &err).attach(&mut response);
            response
        }
    }
}

pub(super) async fn unknown_route(uri: Uri) -> Response {
    HttpError::new(
        "infra::http::unknown_route",
        StatusCode::NOT_FOUND,
        "Page not found",
        format!("no route for {}", uri.path()),
    )
    .into_response()
}

/// Shorter ids first, then lexical, so decimal ids list in numeric order.
fn sort_for_display(posts: &mut [PostRecord]) {
    posts.sort_by(|a, b| {
        let (a, b) = (a.id.as_str(), b.id.as_str());
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    });
}
