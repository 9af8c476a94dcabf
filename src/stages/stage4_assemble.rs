use std::collections::HashMap;

use tracing::{info, warn};

use crate::models::{PageAsset, StoryDocument, StoryPage, StoryResult};

/// Execute Stage 4: merge each page draft with its assets
///
/// Page order comes from the document. A page without an asset entry gets
/// failed image and audio assets; this stage never fails.
pub fn assemble(doc: StoryDocument, mut assets: HashMap<u32, PageAsset>) -> StoryResult {
    let pages: Vec<StoryPage> = doc
        .pages
        .into_iter()
        .map(|draft| {
            let asset = assets.remove(&draft.page_number).unwrap_or_else(|| {
                warn!("Page {}: no assets found, marking both as failed", draft.page_number);
                PageAsset::missing(draft.page_number)
            });

            StoryPage {
                page_number: draft.page_number,
                text: draft.text,
                image_prompt: draft.image_prompt,
                image: asset.image,
                audio: asset.audio,
            }
        })
        .collect();

    let result = StoryResult {
        title: doc.title,
        pages,
    };

    info!(
        "Stage 4: assembled {} pages ({} illustrations failed, {} narrations failed)",
        result.pages.len(),
        result.illustrations_failed(),
        result.narrations_failed()
    );

    result
}
