use crate::dashboard::ChangeAlert;
use maud::{html, Markup};

pub fn change_alert(alert: &ChangeAlert) -> Markup {
    html! {
        section.alert.highlight[alert.highlight] id="change-alert" {
            h3 {
                @if alert.highlight { "🔔 注目月に変更があります" } @else { "前回表示からの変更" }
            }
            ul {
                @for line in &alert.lines {
                    li { (line) }
                }
            }
        }
    }
}
