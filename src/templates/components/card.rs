use crate::dashboard::{MoveInTag, PropertyCard};
use crate::domain::category::Category;
use maud::{html, Markup};

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        article class="card" {
            h3 { (title) }
            (body)
        }
    }
}

pub fn stat_tile(label: &str, value: u32, accent: &str) -> Markup {
    html! {
        div class="tile" style=(format!("--accent: {accent}")) {
            div class="label" { (label) }
            div class="value" { (value) "件" }
        }
    }
}

fn tag(t: &MoveInTag) -> Markup {
    let flagged = t.category == Category::Flagged;
    html! {
        span.tag.flagged[flagged] style=(format!("background: {}", t.color)) {
            (t.label) ": " (t.count) "件"
        }
    }
}

pub fn property_card(property: &PropertyCard) -> Markup {
    card(
        &property.name,
        html! {
            @if property.success {
                p { "物件数: " strong { (property.count) "件" } }
                @if property.tags.is_empty() {
                    p { "入居時期データなし" }
                } @else {
                    div class="tags" {
                        @for t in &property.tags { (tag(t)) }
                    }
                }
            } @else {
                p class="error" { "取得失敗: " (property.error.as_deref().unwrap_or("unknown error")) }
            }
            p { a href=(property.url) target="_blank" rel="noopener" { "SUUMOで見る" } }
        },
    )
}
