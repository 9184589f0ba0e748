use crate::types::{Content, ContentPart, ImagePart, Message};

/// Whether an `image_url` URL points at an image the filter should caption
///
/// Matches inline `data:image/...` URIs and URLs ending in one of
/// `extensions`. Both checks ignore case; `extensions` must already be
/// lowercase.
pub fn is_image_url(url: &str, extensions: &[String]) -> bool {
    let url = url.to_lowercase();
    url.starts_with("data:image/") || extensions.iter().any(|ext| url.ends_with(ext.as_str()))
}

/// Collect qualifying image parts in message order, then part order
pub fn find_images<'a>(messages: &'a [Message], extensions: &[String]) -> Vec<&'a ImagePart> {
    messages
        .iter()
        .filter_map(|message| match &message.content {
            Some(Content::Parts(parts)) => Some(parts),
            _ => None,
        })
        .flatten()
        .filter_map(|part| match part {
            ContentPart::ImageUrl(image) if is_image_url(&image.url, extensions) => Some(image),
            _ => None,
        })
        .collect()
}
