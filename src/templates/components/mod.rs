use maud::{html, Markup};

pub mod alert;
pub mod card;
pub mod error;

pub use alert::change_alert;
pub use card::{card, property_card, stat_tile};
pub use error::error_page;

pub fn empty_state(message: &str) -> Markup {
    html! {
        section class="card empty" {
            p { (message) }
        }
    }
}
