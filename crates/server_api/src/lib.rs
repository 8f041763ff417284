use shared::{
    domain::UserId,
    error::ApiError,
    ordering::DocumentOrdering,
    protocol::{DocumentSummary, DocumentsPage},
};
use storage::{Storage, StoredDocument};
use tracing::debug;
use url::Url;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
    pub page_size: u32,
    /// Absolute URL of the listing endpoint, used for `next`/`previous` links.
    pub documents_url: Url,
}

/// Lists one page of the viewer's documents.
///
/// Page 1 always exists, even when the viewer has no documents. Any page
/// past the last one is `NotFound`.
pub async fn list_documents(
    ctx: &ApiContext,
    user_id: UserId,
    page: u32,
    ordering: Option<DocumentOrdering>,
) -> Result<DocumentsPage, ApiError> {
    if !ctx.storage.user_exists(user_id).await.map_err(internal)? {
        return Err(ApiError::unauthorized("unknown user"));
    }
    let page_size = ctx.page_size.max(1);
    let count = ctx
        .storage
        .count_documents_for_user(user_id)
        .await
        .map_err(internal)?;
    let last_page = last_page(count, page_size);
    if page == 0 || u64::from(page) > last_page {
        return Err(ApiError::not_found("invalid page"));
    }

    let offset = u64::from(page - 1) * u64::from(page_size);
    let documents = ctx
        .storage
        .list_documents_for_user(user_id, ordering, page_size, offset)
        .await
        .map_err(internal)?;
    debug!(
        user_id = user_id.0,
        page,
        ordering = ordering.map(|o| o.to_string()),
        rows = documents.len(),
        "documents page listed"
    );

    let next = (u64::from(page) < last_page)
        .then(|| page_link(&ctx.documents_url, page + 1, ordering));
    let previous = (page > 1).then(|| page_link(&ctx.documents_url, page - 1, ordering));
    Ok(DocumentsPage {
        count,
        next,
        previous,
        results: documents.into_iter().map(summary_from_stored).collect(),
    })
}

fn last_page(count: u64, page_size: u32) -> u64 {
    count.div_ceil(u64::from(page_size)).max(1)
}

fn page_link(base: &Url, page: u32, ordering: Option<DocumentOrdering>) -> String {
    let mut url = base.clone();
    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("page", &page.to_string());
        if let Some(ordering) = ordering {
            pairs.append_pair("ordering", &ordering.to_string());
        }
    }
    url.to_string()
}

fn summary_from_stored(doc: StoredDocument) -> DocumentSummary {
    DocumentSummary {
        id: doc.document_id,
        title: doc.title,
        created_at: doc.created_at,
        updated_at: doc.updated_at,
        user_role: doc.role,
        member_count: doc.member_count,
    }
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::internal(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use shared::{domain::Role, error::ErrorCode};

    async fn setup(documents: usize) -> (ApiContext, UserId) {
        let storage = Storage::new("sqlite::memory:").await.expect("db");
        let user = storage.create_user("alice").await.expect("user");
        let base = Utc
            .with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
            .single()
            .expect("timestamp");
        for index in 0..documents {
            let stamp = base + Duration::minutes(index as i64);
            storage
                .insert_document(user, &format!("doc {index:02}"), stamp, stamp)
                .await
                .expect("document");
        }
        (
            ApiContext {
                storage,
                page_size: 2,
                documents_url: Url::parse("http://localhost:8000/documents/").expect("url"),
            },
            user,
        )
    }

    #[tokio::test]
    async fn unknown_user_is_unauthorized() {
        let (ctx, user) = setup(0).await;
        let err = list_documents(&ctx, UserId(user.0 + 100), 1, None)
            .await
            .expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn empty_listing_still_has_a_first_page() {
        let (ctx, user) = setup(0).await;
        let page = list_documents(&ctx, user, 1, None).await.expect("page");
        assert_eq!(page.count, 0);
        assert!(page.results.is_empty());
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
    }

    #[tokio::test]
    async fn page_past_the_end_is_not_found() {
        let (ctx, user) = setup(3).await;
        let err = list_documents(&ctx, user, 3, None)
            .await
            .expect_err("should fail");
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "invalid page");

        let err = list_documents(&ctx, user, 0, None)
            .await
            .expect_err("should fail");
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn links_carry_page_and_ordering() {
        let (ctx, user) = setup(5).await;
        let ordering = Some("-title".parse().expect("ordering"));
        let page = list_documents(&ctx, user, 2, ordering).await.expect("page");
        assert_eq!(page.count, 5);
        assert_eq!(page.results.len(), 2);
        assert_eq!(
            page.next.as_deref(),
            Some("http://localhost:8000/documents/?page=3&ordering=-title")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("http://localhost:8000/documents/?page=1&ordering=-title")
        );
        assert_eq!(page.results[0].title, "doc 02");
        assert!(page.results.iter().all(|doc| doc.user_role == Role::Owner));

        let last = list_documents(&ctx, user, 3, ordering).await.expect("page");
        assert_eq!(last.results.len(), 1);
        assert!(last.next.is_none());
    }
}
