use super::decode::{decode_page, FromResource};
use super::document::Document;
use super::WalkError;

/// Source of raw pages for one collection endpoint. The HTTP client
/// implements this; tests drive the walker with an in-memory source.
pub trait PageSource {
    fn fetch_page(&self, offset: usize) -> Result<Document, WalkError>;
}

/// Pages through a collection from offset 0 until the service returns an
/// empty `data` array, decoding and accumulating as it goes. A short page
/// does not end the walk; only an empty page does, so a collection sized at
/// an exact multiple of `page_size` costs one extra round trip.
pub fn walk_collection<T, S>(source: &S, page_size: usize) -> Result<Vec<T>, WalkError>
where
    T: FromResource,
    S: PageSource,
{
    if page_size == 0 {
        return Err(WalkError::InvalidPageSize);
    }

    let mut elements = Vec::new();
    let mut offset = 0;
    loop {
        let document = source.fetch_page(offset)?;
        if document.data.is_empty() {
            break;
        }
        elements.extend(decode_page(&document));
        offset += page_size;
    }
    Ok(elements)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::models::Actor;

    /// Serves pre-built pages by offset and counts fetches.
    struct ScriptedSource {
        pages: Vec<String>,
        page_size: usize,
        calls: Cell<usize>,
    }

    impl ScriptedSource {
        fn new(sizes: &[usize], page_size: usize) -> Self {
            let pages = sizes
                .iter()
                .enumerate()
                .map(|(page, count)| synthetic_page(page * page_size, *count))
                .collect();
            Self {
                pages,
                page_size,
                calls: Cell::new(0),
            }
        }
    }

    impl PageSource for ScriptedSource {
        fn fetch_page(&self, offset: usize) -> Result<Document, WalkError> {
            self.calls.set(self.calls.get() + 1);
            let page = offset / self.page_size;
            let raw = self
                .pages
                .get(page)
                .unwrap_or_else(|| panic!("unexpected fetch at offset {offset}"));
            serde_json::from_str(raw).map_err(|err| WalkError::Document(err.to_string()))
        }
    }

    fn synthetic_page(offset: usize, count: usize) -> String {
        let resources: Vec<String> = (0..count)
            .map(|index| {
                format!(
                    r#"{{"type": "akteur", "id": "a{}", "attributes": {{"title": "Akteur {}"}}}}"#,
                    offset + index,
                    offset + index
                )
            })
            .collect();
        format!(r#"{{"data": [{}], "included": []}}"#, resources.join(","))
    }

    #[test]
    fn walks_until_empty_page() {
        let source = ScriptedSource::new(&[50, 50, 50, 0], 50);
        let actors: Vec<Actor> = walk_collection(&source, 50).expect("walk succeeds");

        assert_eq!(actors.len(), 150);
        assert_eq!(source.calls.get(), 4);
        assert_eq!(actors[0].core.id, "a0");
        assert_eq!(actors[149].core.id, "a149");
    }

    #[test]
    fn short_page_does_not_end_the_walk() {
        let source = ScriptedSource::new(&[50, 30, 0], 50);
        let actors: Vec<Actor> = walk_collection(&source, 50).expect("walk succeeds");

        assert_eq!(actors.len(), 80);
        assert_eq!(source.calls.get(), 3);
    }

    #[test]
    fn rejects_zero_page_size() {
        let source = ScriptedSource::new(&[0], 50);
        let result: Result<Vec<Actor>, _> = walk_collection(&source, 0);

        assert!(matches!(result, Err(WalkError::InvalidPageSize)));
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn transport_failure_discards_the_walk() {
        struct FailingSource;

        impl PageSource for FailingSource {
            fn fetch_page(&self, offset: usize) -> Result<Document, WalkError> {
                if offset == 0 {
                    serde_json::from_str(&synthetic_page(0, 2))
                        .map_err(|err| WalkError::Document(err.to_string()))
                } else {
                    Err(WalkError::Transport("connection reset".to_string()))
                }
            }
        }

        let result: Result<Vec<Actor>, _> = walk_collection(&FailingSource, 50);
        assert!(matches!(result, Err(WalkError::Transport(_))));
    }
}
