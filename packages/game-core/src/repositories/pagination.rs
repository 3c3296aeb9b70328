use std::collections::HashMap;
use std::future::Future;

use aws_sdk_dynamodb::types::AttributeValue;

/// One page of a query and the key to resume from, if there is more.
pub(crate) struct Page<T, K> {
    pub items: Vec<T>,
    pub next: Option<K>,
}

/// Keeps requesting pages until the store stops returning a resume key.
/// Filtered queries can return empty pages that still have a successor.
pub(crate) async fn collect_pages<T, K, E, F, Fut>(mut fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(Option<K>) -> Fut,
    Fut: Future<Output = Result<Page<T, K>, E>>,
{
    let mut items = Vec::new();
    let mut start = None;

    loop {
        let page = fetch(start).await?;
        items.extend(page.items);

        match page.next {
            Some(key) => start = Some(key),
            None => return Ok(items),
        }
    }
}

/// DynamoDB signals the last page with a missing or empty key.
pub(crate) fn resume_key(
    key: Option<HashMap<String, AttributeValue>>,
) -> Option<HashMap<String, AttributeValue>> {
    key.filter(|key| !key.is_empty())
}
