use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;

use crate::models::{ImagePlaceholder, Memo, MemoIcon};

pub const DEFAULT_BACKGROUND_COLOR: &str = "hsl(0 0% 100%)";
pub const DEFAULT_BACKGROUND_OPACITY: f32 = 1.0;

pub static SEED_CATEGORIES: Lazy<Vec<String>> = Lazy::new(|| {
    ["Daily", "Work", "Ideas", "Important"]
        .into_iter()
        .map(String::from)
        .collect()
});

pub static BUILTIN_IMAGES: Lazy<Vec<ImagePlaceholder>> = Lazy::new(|| {
    vec![
        builtin("bg-1", "Misty mountain range at dawn", "mountain landscape"),
        builtin("bg-2", "Calm ocean under a clear sky", "ocean horizon"),
        builtin("bg-3", "Forest trail in autumn", "autumn forest"),
        builtin("bg-4", "City skyline at night", "city night"),
        builtin("memo-1", "Notebook and coffee on a desk", "desk notebook"),
    ]
});

pub static SEED_MEMOS: Lazy<Vec<Memo>> = Lazy::new(|| {
    vec![
        Memo {
            id: "1".to_string(),
            title: "Meeting prep".to_string(),
            content: "Agenda for Monday's team meeting. Q1 results and Q2 plan.".to_string(),
            category: Some("Work".to_string()),
            image_urls: vec![builtin_url("memo-1")],
            is_voice_memo: false,
            icon: Some(MemoIcon::Briefcase),
            cover_image_url: Some(builtin_url("bg-1")),
            created_at: at(2023, 10, 26, 10, 0),
        },
        Memo {
            id: "2".to_string(),
            title: "Shopping list".to_string(),
            content: "Milk, eggs, bread, vegetables (onion, tomato)".to_string(),
            category: Some("Daily".to_string()),
            image_urls: Vec::new(),
            is_voice_memo: false,
            icon: Some(MemoIcon::ShoppingCart),
            cover_image_url: None,
            created_at: at(2023, 10, 25, 15, 30),
        },
        Memo {
            id: "3".to_string(),
            title: "Weekend hike".to_string(),
            content: "Look up trail options and ask friends which day works.".to_string(),
            category: Some("Ideas".to_string()),
            image_urls: Vec::new(),
            is_voice_memo: true,
            icon: Some(MemoIcon::Lightbulb),
            cover_image_url: Some(builtin_url("bg-3")),
            created_at: at(2023, 10, 24, 9, 0),
        },
    ]
});

fn builtin(id: &str, description: &str, hint: &str) -> ImagePlaceholder {
    ImagePlaceholder {
        id: id.to_string(),
        description: description.to_string(),
        image_url: builtin_url(id),
        image_hint: hint.to_string(),
    }
}

fn builtin_url(id: &str) -> String {
    format!("/images/{id}.jpg")
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}
