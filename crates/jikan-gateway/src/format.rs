//! Display helpers for catalog entries.

use crate::api::AnimeData;

/// Format a count with K/M suffix
pub fn format_count(count: Option<u64>) -> String {
    match count {
        None | Some(0) => "0".to_string(),
        Some(n) if n >= 1_000_000 => format!("{:.1}M", n as f64 / 1_000_000.0),
        Some(n) if n >= 1_000 => format!("{:.1}K", n as f64 / 1_000.0),
        Some(n) => n.to_string(),
    }
}

/// Format score with 1 decimal place
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) if s != 0.0 => format!("{:.1}", s),
        _ => "N/A".to_string(),
    }
}

/// English title when present, original title otherwise
pub fn display_title(anime: &AnimeData) -> &str {
    anime
        .title_english
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(&anime.title)
}

/// Truncate text to `max_chars` characters, marking the cut with "..."
pub fn truncate_text(text: Option<&str>, max_chars: usize) -> String {
    let Some(text) = text else {
        return String::new();
    };
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head.trim())
}

/// Embed URL for a YouTube trailer (autoplay, muted, looping)
pub fn youtube_embed_url(youtube_id: Option<&str>) -> Option<String> {
    let id = youtube_id.filter(|id| !id.is_empty())?;
    Some(format!(
        "https://www.youtube.com/embed/{}?autoplay=1&mute=1&loop=1&controls=0&modestbranding=1",
        id
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AnimeImages, ImageSet};

    fn anime(title: &str, english: Option<&str>) -> AnimeData {
        AnimeData {
            mal_id: 1,
            url: None,
            title: title.to_string(),
            title_english: english.map(str::to_string),
            images: AnimeImages {
                jpg: ImageSet {
                    image_url: None,
                    small_image_url: None,
                    large_image_url: None,
                },
                webp: None,
            },
            trailer: None,
            synopsis: None,
            score: None,
            scored_by: None,
            rank: None,
            popularity: None,
            members: None,
            favorites: None,
            episodes: None,
            status: None,
            airing: None,
            aired: None,
            season: None,
            year: None,
            genres: Vec::new(),
            studios: Vec::new(),
        }
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(None), "0");
        assert_eq!(format_count(Some(0)), "0");
        assert_eq!(format_count(Some(999)), "999");
        assert_eq!(format_count(Some(1_500)), "1.5K");
        assert_eq!(format_count(Some(3_400_000)), "3.4M");
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(Some(9.31)), "9.3");
        assert_eq!(format_score(Some(0.0)), "N/A");
        assert_eq!(format_score(None), "N/A");
    }

    #[test]
    fn test_display_title_prefers_english() {
        assert_eq!(
            display_title(&anime("Sousou no Frieren", Some("Frieren: Beyond Journey's End"))),
            "Frieren: Beyond Journey's End"
        );
        assert_eq!(display_title(&anime("Gintama", None)), "Gintama");
        assert_eq!(display_title(&anime("Gintama", Some(""))), "Gintama");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text(None, 10), "");
        assert_eq!(truncate_text(Some("short"), 10), "short");
        assert_eq!(truncate_text(Some("The quick brown fox"), 10), "The quick...");
        assert_eq!(truncate_text(Some("鋼の錬金術師"), 3), "鋼の錬...");
    }

    #[test]
    fn test_youtube_embed_url() {
        assert_eq!(youtube_embed_url(None), None);
        assert_eq!(youtube_embed_url(Some("")), None);
        assert!(youtube_embed_url(Some("abc123"))
            .unwrap()
            .starts_with("https://www.youtube.com/embed/abc123?autoplay=1"));
    }
}
