use crate::{error::ErrorPage, templates::TemplateStore};
use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Extension,
};
use minijinja::context;
use std::sync::Arc;

/// Re-render error responses through `page_error.html`.
///
/// Only responses carrying an [`ErrorPage`] extension are touched. When the
/// template fails the inline body produced by [`ErrorPage`] goes out as is.
pub async fn error_page_middleware(
    Extension(templates): Extension<Arc<TemplateStore>>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    let Some(page) = response.extensions().get::<ErrorPage>().cloned() else {
        return response;
    };

    match templates.render("page_error.html", context! { error => &page }) {
        Ok(html) => {
            let (mut parts, _) = response.into_parts();
            parts.headers.remove(header::CONTENT_LENGTH);
            (parts, Html(html)).into_response()
        }
        Err(e) => {
            tracing::error!("Cannot render error page for {}: {:#}", page.code, e);
            response
        }
    }
}
