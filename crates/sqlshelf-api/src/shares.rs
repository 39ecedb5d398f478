use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
};

use sqlshelf_types::api::{Claims, ShareResponse};
use sqlshelf_types::models::SharedSnapshot;

use crate::error::{AppError, Result};
use crate::library::path_id;
use crate::state::AppState;

const NOT_FOUND_PAGE: &str =
    "<h1>Not Found</h1><p>The query you are looking for does not exist.</p>";

/// POST /api/queries/share/{id}
pub async fn create_share(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
) -> Result<Json<ShareResponse>> {
    let snapshot = state.shares.create(claims.sub, path_id(&id)?).await?;

    let base = link_base(state.settings.public_url.as_deref(), &headers);
    Ok(Json(ShareResponse {
        share_link: format!("{}/share/{}", base, snapshot.share_token),
        share_token: snapshot.share_token,
    }))
}

/// GET /api/share/{token} — public.
pub async fn get_share(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<SharedSnapshot>> {
    Ok(Json(state.shares.get(&token).await?))
}

/// GET /share/{token} — public HTML view of a snapshot.
pub async fn share_page(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    match state.shares.get(&token).await {
        Ok(snapshot) => Html(render_share_page(&snapshot)).into_response(),
        Err(AppError::NotFound) => (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response(),
        Err(e) => e.into_response(),
    }
}

fn link_base(public_url: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(url) = public_url {
        return url.trim_end_matches('/').to_string();
    }
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{}", host)
}

pub fn render_share_page(snapshot: &SharedSnapshot) -> String {
    let title = escape_html(&snapshot.title);
    let query = escape_html(&snapshot.query);
    let shared_on = snapshot.created_at.format("%Y-%m-%d %H:%M UTC");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Shared Query: {title}</title>
<style>
body {{ font-family: system-ui, sans-serif; background: #f8f9fa; padding: 2rem 1rem; }}
main {{ max-width: 900px; margin: 0 auto; }}
pre {{ background: #272822; color: #f8f8f2; padding: 1rem; border-radius: 0.5rem; white-space: pre-wrap; word-wrap: break-word; }}
footer {{ color: #6c757d; font-size: 0.9rem; }}
</style>
</head>
<body>
<main>
<h1>{title}</h1>
<pre><code class="language-sql">{query}</code></pre>
<footer>Shared on {shared_on} &middot; <a href="/">Create your own queries</a></footer>
</main>
</body>
</html>
"#
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use uuid::Uuid;

    fn snapshot(title: &str, query: &str) -> SharedSnapshot {
        SharedSnapshot {
            share_token: "tok".into(),
            title: title.into(),
            query: query.into(),
            original_owner_id: Uuid::nil(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn page_escapes_user_content() {
        let page = render_share_page(&snapshot(
            "<script>alert(1)</script>",
            "SELECT * FROM t WHERE a < 1 AND b = 'x'",
        ));
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(page.contains("a &lt; 1 AND b = &#39;x&#39;"));
    }

    #[test]
    fn link_base_prefers_configured_url() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("example.test:3000"));

        assert_eq!(link_base(Some("https://sql.example/"), &headers), "https://sql.example");
        assert_eq!(link_base(None, &headers), "http://example.test:3000");
        assert_eq!(link_base(None, &HeaderMap::new()), "http://localhost");
    }
}
