use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::join_all;
use tracing::{info, warn};

use crate::io::wav::{parse_sample_rate, pcm_to_wav};
use crate::llm::{Illustrator, Narrator};
use crate::models::{Asset, PageAsset, PageDraft};

/// Produce an illustration data URL; any failure becomes [`Asset::Failed`]
pub async fn generate_illustration(illustrator: &dyn Illustrator, image_prompt: &str) -> Asset {
    match illustrator.illustrate(image_prompt).await {
        Ok(images) => match images.first() {
            Some(image) => Asset::Ready(image.to_data_url()),
            None => Asset::Failed("image service returned no predictions".to_string()),
        },
        Err(e) => Asset::Failed(format!("{:#}", e)),
    }
}

/// Produce a narration WAV data URL; any failure becomes [`Asset::Failed`]
pub async fn generate_narration(narrator: &dyn Narrator, text: &str) -> Asset {
    if text.trim().is_empty() {
        return Asset::Failed("page has no text to narrate".to_string());
    }

    let clip = match narrator.narrate(text).await {
        Ok(clip) => clip,
        Err(e) => return Asset::Failed(format!("{:#}", e)),
    };

    let pcm = match STANDARD.decode(clip.data.trim()) {
        Ok(pcm) if !pcm.is_empty() => pcm,
        Ok(_) => return Asset::Failed("speech service returned empty audio".to_string()),
        Err(e) => return Asset::Failed(format!("speech audio is not valid base64: {}", e)),
    };

    let wav = pcm_to_wav(&pcm, parse_sample_rate(&clip.mime_type));
    Asset::Ready(format!("data:audio/wav;base64,{}", STANDARD.encode(wav)))
}

/// Generate both assets for one page concurrently
pub async fn generate_page_assets(
    illustrator: &dyn Illustrator,
    narrator: &dyn Narrator,
    page: &PageDraft,
) -> PageAsset {
    let (image, audio) = futures::join!(
        generate_illustration(illustrator, &page.image_prompt),
        generate_narration(narrator, &page.text),
    );

    if let Some(reason) = image.failure_reason() {
        warn!("Page {}: illustration failed: {}", page.page_number, reason);
    }
    if let Some(reason) = audio.failure_reason() {
        warn!("Page {}: narration failed: {}", page.page_number, reason);
    }

    PageAsset {
        page_number: page.page_number,
        image,
        audio,
    }
}

/// Execute Stage 3: generate assets for every page concurrently
///
/// Never fails; each page resolves both sub-steps before it is returned.
pub async fn generate_assets(
    illustrator: &dyn Illustrator,
    narrator: &dyn Narrator,
    pages: &[PageDraft],
) -> HashMap<u32, PageAsset> {
    info!("Stage 3: generating assets for {} pages", pages.len());

    let assets = join_all(
        pages
            .iter()
            .map(|page| generate_page_assets(illustrator, narrator, page)),
    )
    .await;

    assets.into_iter().map(|a| (a.page_number, a)).collect()
}
