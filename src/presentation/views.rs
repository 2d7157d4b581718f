use crate::application::error::HttpError;
use crate::domain::entities::PostRecord;
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

#[derive(Debug, Clone)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub date: String,
    pub link: String,
    pub content: String,
}

impl From<PostRecord> for PostView {
    fn from(record: PostRecord) -> Self {
        let PostRecord { id, fields } = record;
        Self {
            id: id.into_inner(),
            title: fields.title,
            date: fields.date,
            link: fields.link,
            content: fields.content,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: &'static str,
    pub posts: Vec<PostView>,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub post: PostView,
}

#[derive(Template)]
#[template(path = "edit.html")]
pub struct EditPostTemplate {
    pub post: PostView,
}

#[derive(Template)]
#[template(path = "new.html")]
pub struct NewPostTemplate {
    pub title: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{PostFields, PostId};

    fn view(title: &str) -> PostView {
        PostView::from(PostRecord::new(
            PostId::new("3"),
            PostFields {
                title: title.to_string(),
                date: "21 Feb 2020".to_string(),
                link: "https://example.test/3".to_string(),
                content: "body".to_string(),
            },
        ))
    }

    #[test]
    fn post_fields_are_escaped() {
        let html = PostTemplate {
            post: view("<script>alert(1)</script>"),
        }
        .render()
        .expect("render");
        assert!(!html.contains("<script>"));
        assert!(html.contains("alert(1)"));
    }

    #[test]
    fn index_links_each_post_by_id() {
        let html = IndexTemplate {
            title: "Blog",
            posts: vec![view("First")],
        }
        .render()
        .expect("render");
        assert!(html.contains("/post?id=3"));
        assert!(html.contains("First"));
    }

    #[test]
    fn edit_form_carries_the_id() {
        let html = EditPostTemplate { post: view("Draft") }
            .render()
            .expect("render");
        assert!(html.contains(r#"name="id" value="3""#));
    }
}
